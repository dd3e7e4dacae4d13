//! Request descriptors handed to the gateway and their resolved wire form.

// self
use crate::{_prelude::*, error::ConfigError};

/// Controls whether session credentials travel with a request.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CredentialsMode {
	/// Always attach credentials.
	Include,
	#[default]
	/// Attach credentials only when the target shares the base root's origin.
	SameOrigin,
	/// Never attach credentials.
	Omit,
}

/// Immutable description of a backend call.
///
/// # Replay Contract
///
/// The gateway may send the same descriptor twice: once originally and once more after a
/// successful session refresh. Callers must not dispatch requests whose side effects are keyed on
/// something the backend only accepts once (a single-use nonce, for example). The gateway does
/// not enforce this.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ApiRequest {
	/// HTTP method.
	pub method: Method,
	/// Path relative to the base root, or an absolute URL.
	pub target: String,
	/// Request-specific headers; these override the gateway's defaults by name.
	pub headers: HeaderMap,
	/// Optional request body.
	pub body: Option<Vec<u8>>,
	/// Credential mode; `None` falls back to the gateway default.
	pub credentials: Option<CredentialsMode>,
}
impl ApiRequest {
	/// Creates a request without headers or body.
	pub fn new(method: Method, target: impl Into<String>) -> Self {
		Self {
			method,
			target: target.into(),
			headers: HeaderMap::new(),
			body: None,
			credentials: None,
		}
	}

	/// Shorthand for a `GET` request.
	pub fn get(target: impl Into<String>) -> Self {
		Self::new(Method::GET, target)
	}

	/// Shorthand for a `POST` request.
	pub fn post(target: impl Into<String>) -> Self {
		Self::new(Method::POST, target)
	}

	/// Shorthand for a `PUT` request.
	pub fn put(target: impl Into<String>) -> Self {
		Self::new(Method::PUT, target)
	}

	/// Shorthand for a `PATCH` request.
	pub fn patch(target: impl Into<String>) -> Self {
		Self::new(Method::PATCH, target)
	}

	/// Shorthand for a `DELETE` request.
	pub fn delete(target: impl Into<String>) -> Self {
		Self::new(Method::DELETE, target)
	}

	/// Builds a request whose body is `payload` serialized as JSON.
	pub fn json<T>(
		method: Method,
		target: impl Into<String>,
		payload: &T,
	) -> Result<Self, ConfigError>
	where
		T: ?Sized + Serialize,
	{
		let body = serde_json::to_vec(payload).map_err(ConfigError::BodyEncode)?;

		Ok(Self::new(method, target)
			.with_header(
				::http::header::CONTENT_TYPE,
				HeaderValue::from_static("application/json"),
			)
			.with_body(body))
	}

	/// Appends a typed header.
	pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
		self.headers.append(name, value);

		self
	}

	/// Appends a header after validating its name and value.
	pub fn try_header(self, name: &str, value: &str) -> Result<Self, ConfigError> {
		let (name, value) = parse_header(name, value)?;

		Ok(self.with_header(name, value))
	}

	/// Sets the request body.
	pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
		self.body = Some(body.into());

		self
	}

	/// Overrides the gateway's default credential mode for this request.
	pub fn with_credentials(mut self, mode: CredentialsMode) -> Self {
		self.credentials = Some(mode);

		self
	}
}

/// Request in wire form: absolute URL, merged headers, and a resolved credential decision.
///
/// Produced once per dispatch so a replay sends exactly what the original attempt sent.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResolvedRequest {
	/// HTTP method.
	pub method: Method,
	/// Absolute request URL.
	pub url: Url,
	/// Default headers merged with request headers.
	pub headers: HeaderMap,
	/// Optional request body.
	pub body: Option<Vec<u8>>,
	/// Whether the transport should send and store session credentials.
	pub include_credentials: bool,
}

/// Validates a header pair supplied as strings.
pub(crate) fn parse_header(
	name: &str,
	value: &str,
) -> Result<(HeaderName, HeaderValue), ConfigError> {
	let header_name = HeaderName::from_bytes(name.as_bytes())
		.map_err(|_| ConfigError::InvalidHeaderName { name: name.to_owned() })?;
	let header_value = HeaderValue::from_str(value)
		.map_err(|_| ConfigError::InvalidHeaderValue { name: name.to_owned() })?;

	Ok((header_name, header_value))
}

/// Overlays `overrides` on `defaults`; every name present in `overrides` replaces the default
/// values for that name.
pub(crate) fn merge_headers(defaults: &HeaderMap, overrides: &HeaderMap) -> HeaderMap {
	let mut merged = defaults.clone();

	for name in overrides.keys() {
		merged.remove(name);
	}
	for (name, value) in overrides.iter() {
		merged.append(name.clone(), value.clone());
	}

	merged
}
