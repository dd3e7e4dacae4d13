// self
use crate::{
	_prelude::*,
	config::GatewayConfig,
	error::ConfigError,
	http::{CredentialsMode, request},
};

const DEFAULT_REFRESH_PATH: &str = "auth/refresh";
const DEFAULT_SETTLE_DELAY_MS: u64 = 100;

/// Errors raised while constructing or validating gateway configurations.
#[derive(Debug, PartialEq, Eq, ThisError)]
pub enum GatewayConfigError {
	/// The base resource root is mandatory.
	#[error("Missing base URL.")]
	MissingBaseUrl,
	/// The base root must use HTTP or HTTPS.
	#[error("The base URL must use http or https: {url}.")]
	UnsupportedScheme {
		/// Base URL that failed validation.
		url: String,
	},
	/// Query strings and fragments cannot be joined against.
	#[error("The base URL must not carry a query or fragment: {url}.")]
	BaseUrlNotARoot {
		/// Base URL that failed validation.
		url: String,
	},
	/// The refresh route is mandatory.
	#[error("Refresh path must not be empty.")]
	EmptyRefreshPath,
	/// The refresh route cannot be resolved against the base root.
	#[error("Refresh path `{path}` is invalid.")]
	InvalidRefreshPath {
		/// Refresh route that failed to resolve.
		path: String,
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// A default header name is not a valid HTTP token.
	#[error("Default header name `{name}` is invalid.")]
	InvalidHeaderName {
		/// Offending header name.
		name: String,
	},
	/// A default header value contains bytes HTTP forbids.
	#[error("Default header `{name}` carries an invalid value.")]
	InvalidHeaderValue {
		/// Header whose value failed validation.
		name: String,
	},
	/// The settle delay does not fit the supported range.
	#[error("The settle delay exceeds the supported range.")]
	SettleDelayOutOfRange,
}

/// Builder for [`GatewayConfig`] values.
///
/// Every field is public and the type deserializes with defaults for missing keys, so a JSON
/// document such as `{"base_url":"https://hr.example.com/api","settle_delay_ms":0}` is a valid
/// starting point for [`build`](GatewayConfigBuilder::build).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GatewayConfigBuilder {
	/// Base resource root.
	pub base_url: Option<Url>,
	/// Headers attached to every request.
	pub default_headers: BTreeMap<String, String>,
	/// Default credential mode.
	pub credentials: CredentialsMode,
	/// Session-refresh route, relative to the base root or absolute.
	pub refresh_path: String,
	/// Settle delay in milliseconds.
	pub settle_delay_ms: u64,
}
impl GatewayConfigBuilder {
	/// Sets the base resource root.
	pub fn base_url(mut self, url: Url) -> Self {
		self.base_url = Some(url);

		self
	}

	/// Adds (or replaces) a default header.
	pub fn default_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
		self.default_headers.insert(name.into(), value.into());

		self
	}

	/// Overrides the default credential mode.
	pub fn credentials(mut self, mode: CredentialsMode) -> Self {
		self.credentials = mode;

		self
	}

	/// Overrides the session-refresh route (defaults to `auth/refresh`).
	pub fn refresh_path(mut self, path: impl Into<String>) -> Self {
		self.refresh_path = path.into();

		self
	}

	/// Overrides the settle delay (defaults to 100 ms); negative values clamp to zero.
	pub fn settle_delay(mut self, delay: Duration) -> Self {
		let millis = if delay.is_negative() { 0 } else { delay.whole_milliseconds() };

		self.settle_delay_ms = u64::try_from(millis).unwrap_or(u64::MAX);

		self
	}

	/// Consumes the builder and validates the resulting configuration.
	pub fn build(self) -> Result<GatewayConfig, GatewayConfigError> {
		let base_url = self.base_url.ok_or(GatewayConfigError::MissingBaseUrl)?;
		let base_url = normalize_base(base_url)?;
		let refresh_url = resolve_refresh(&base_url, &self.refresh_path)?;
		let mut default_headers = HeaderMap::new();

		for (name, value) in &self.default_headers {
			let (name, value) = request::parse_header(name, value).map_err(|e| match e {
				ConfigError::InvalidHeaderValue { name } =>
					GatewayConfigError::InvalidHeaderValue { name },
				_ => GatewayConfigError::InvalidHeaderName { name: name.to_owned() },
			})?;

			default_headers.append(name, value);
		}

		let settle_delay = i64::try_from(self.settle_delay_ms)
			.map(Duration::milliseconds)
			.map_err(|_| GatewayConfigError::SettleDelayOutOfRange)?;

		Ok(GatewayConfig {
			base_url,
			default_headers,
			credentials: self.credentials,
			refresh_url,
			settle_delay,
		})
	}
}
impl Default for GatewayConfigBuilder {
	fn default() -> Self {
		Self {
			base_url: None,
			default_headers: BTreeMap::new(),
			credentials: CredentialsMode::default(),
			refresh_path: DEFAULT_REFRESH_PATH.into(),
			settle_delay_ms: DEFAULT_SETTLE_DELAY_MS,
		}
	}
}

fn normalize_base(mut url: Url) -> Result<Url, GatewayConfigError> {
	if !matches!(url.scheme(), "http" | "https") {
		return Err(GatewayConfigError::UnsupportedScheme { url: url.to_string() });
	}
	if url.query().is_some() || url.fragment().is_some() {
		return Err(GatewayConfigError::BaseUrlNotARoot { url: url.to_string() });
	}
	if !url.path().ends_with('/') {
		let path = format!("{}/", url.path());

		url.set_path(&path);
	}

	Ok(url)
}

fn resolve_refresh(base: &Url, path: &str) -> Result<Url, GatewayConfigError> {
	let trimmed = path.trim();

	if trimmed.is_empty() {
		return Err(GatewayConfigError::EmptyRefreshPath);
	}

	let invalid =
		|source| GatewayConfigError::InvalidRefreshPath { path: path.to_owned(), source };

	match Url::parse(trimmed) {
		Ok(url) => Ok(url),
		Err(url::ParseError::RelativeUrlWithoutBase) =>
			base.join(trimmed.trim_start_matches('/')).map_err(invalid),
		Err(source) => Err(invalid(source)),
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn base() -> Url {
		Url::parse("https://hr.example.com/api").expect("Fixture URL should parse.")
	}

	#[test]
	fn defaults_fill_refresh_route_and_settle_delay() {
		let config =
			GatewayConfig::builder().base_url(base()).build().expect("Defaults should be valid.");

		assert_eq!(config.refresh_url.as_str(), "https://hr.example.com/api/auth/refresh");
		assert_eq!(config.settle_delay, Duration::milliseconds(100));
		assert_eq!(config.credentials, CredentialsMode::SameOrigin);
		assert!(config.default_headers.is_empty());
	}

	#[test]
	fn base_url_is_validated() {
		assert_eq!(GatewayConfig::builder().build(), Err(GatewayConfigError::MissingBaseUrl));

		let ftp = Url::parse("ftp://hr.example.com/").expect("Fixture URL should parse.");

		assert!(matches!(
			GatewayConfig::builder().base_url(ftp).build(),
			Err(GatewayConfigError::UnsupportedScheme { .. })
		));

		let with_query =
			Url::parse("https://hr.example.com/api?tenant=7").expect("Fixture URL should parse.");

		assert!(matches!(
			GatewayConfig::builder().base_url(with_query).build(),
			Err(GatewayConfigError::BaseUrlNotARoot { .. })
		));
	}

	#[test]
	fn refresh_path_accepts_relative_and_absolute_routes() {
		let relative = GatewayConfig::builder()
			.base_url(base())
			.refresh_path("/session/renew")
			.build()
			.expect("Relative refresh path should resolve.");

		assert_eq!(relative.refresh_url.as_str(), "https://hr.example.com/api/session/renew");

		let absolute = GatewayConfig::builder()
			.base_url(base())
			.refresh_path("https://auth.example.com/refresh")
			.build()
			.expect("Absolute refresh path should resolve.");

		assert_eq!(absolute.refresh_url.as_str(), "https://auth.example.com/refresh");
		assert_eq!(
			GatewayConfig::builder().base_url(base()).refresh_path("  ").build(),
			Err(GatewayConfigError::EmptyRefreshPath),
		);
	}

	#[test]
	fn default_headers_are_validated() {
		assert!(matches!(
			GatewayConfig::builder().base_url(base()).default_header("x tenant", "7").build(),
			Err(GatewayConfigError::InvalidHeaderName { name }) if name == "x tenant"
		));
		assert!(matches!(
			GatewayConfig::builder().base_url(base()).default_header("x-tenant", "7\r\n").build(),
			Err(GatewayConfigError::InvalidHeaderValue { name }) if name == "x-tenant"
		));
	}

	#[test]
	fn negative_settle_delay_clamps_to_zero() {
		let config = GatewayConfig::builder()
			.base_url(base())
			.settle_delay(Duration::milliseconds(-5))
			.build()
			.expect("Clamped settle delay should be valid.");

		assert_eq!(config.settle_delay, Duration::ZERO);
	}

	#[test]
	fn builder_deserializes_from_json() {
		let builder: GatewayConfigBuilder = serde_json::from_str(
			"{\"base_url\":\"https://hr.example.com/api\",\"credentials\":\"include\",\
			\"default_headers\":{\"accept\":\"application/json\"},\"settle_delay_ms\":0}",
		)
		.expect("Builder JSON should deserialize.");

		assert_eq!(builder.refresh_path, DEFAULT_REFRESH_PATH);

		let config = builder.build().expect("Deserialized builder should be valid.");

		assert_eq!(config.credentials, CredentialsMode::Include);
		assert_eq!(config.settle_delay, Duration::ZERO);
		assert!(config.default_headers.contains_key("accept"));
	}
}
