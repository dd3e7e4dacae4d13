//! Gateway configuration fixed at construction time.
//!
//! [`GatewayConfig`] carries the base resource root, the default header set, the default
//! credential mode, the session-refresh route, and the settle delay applied before a replay.
//! Values are assembled and validated through [`GatewayConfigBuilder`], which is also
//! deserializable so deployments can load it from JSON.

/// Builder API for assembling gateway configurations.
pub mod builder;

pub use builder::*;

// self
use crate::{
	_prelude::*,
	error::ConfigError,
	http::{ApiRequest, CredentialsMode, ResolvedRequest, request},
};

/// Immutable, validated gateway configuration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GatewayConfig {
	/// Base resource root; always ends with `/`.
	pub base_url: Url,
	/// Headers attached to every request unless overridden by name.
	pub default_headers: HeaderMap,
	/// Credential mode applied when a request does not pick one.
	pub credentials: CredentialsMode,
	/// Absolute URL of the session-refresh endpoint.
	pub refresh_url: Url,
	/// Pause between a successful refresh and the replay.
	pub settle_delay: Duration,
}
impl GatewayConfig {
	/// Creates a new builder with default settings.
	pub fn builder() -> GatewayConfigBuilder {
		GatewayConfigBuilder::default()
	}

	/// Resolves `target` against the base root.
	///
	/// Absolute URLs are used as-is. Relative targets are joined below the base root; leading
	/// slashes are ignored so `/contracts` and `contracts` address the same resource.
	pub fn resolve_target(&self, target: &str) -> Result<Url, ConfigError> {
		let invalid = |source| ConfigError::InvalidTarget { target: target.to_owned(), source };

		match Url::parse(target) {
			Ok(url) => Ok(url),
			Err(url::ParseError::RelativeUrlWithoutBase) =>
				self.base_url.join(target.trim_start_matches('/')).map_err(invalid),
			Err(source) => Err(invalid(source)),
		}
	}

	/// Produces the wire form of `request` with defaults applied.
	pub fn resolve(&self, request: &ApiRequest) -> Result<ResolvedRequest, ConfigError> {
		let url = self.resolve_target(&request.target)?;
		let include_credentials = self.includes_credentials(
			request.credentials.unwrap_or(self.credentials),
			&url,
		);

		Ok(ResolvedRequest {
			method: request.method.clone(),
			headers: request::merge_headers(&self.default_headers, &request.headers),
			body: request.body.clone(),
			url,
			include_credentials,
		})
	}

	/// Builds the parameterless refresh call; credentials are always included.
	pub fn refresh_request(&self) -> ResolvedRequest {
		ResolvedRequest {
			method: Method::POST,
			url: self.refresh_url.clone(),
			headers: self.default_headers.clone(),
			body: None,
			include_credentials: true,
		}
	}

	fn includes_credentials(&self, mode: CredentialsMode, url: &Url) -> bool {
		match mode {
			CredentialsMode::Include => true,
			CredentialsMode::SameOrigin => url.origin() == self.base_url.origin(),
			CredentialsMode::Omit => false,
		}
	}
}
