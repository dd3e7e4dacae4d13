//! Gateway-level error types shared by dispatch, refresh, and transports.

// self
use crate::_prelude::*;

/// Gateway-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical gateway error exposed by public APIs.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Local configuration problem (bad target, header, or client builder).
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Transport failure (DNS, TCP, TLS); never retried by the gateway.
	#[error(transparent)]
	Transport(#[from] TransportError),
	/// Backend answered with a non-success status.
	#[error(transparent)]
	Status(#[from] StatusError),
	/// Session refresh did not succeed.
	#[error(transparent)]
	Refresh(#[from] RefreshFailure),

	/// Response body could not be decoded into the requested type.
	#[error("Response body from HTTP {status} could not be decoded.")]
	Decode {
		/// Structured parsing failure naming the offending path.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
		/// HTTP status code of the decoded response.
		status: u16,
	},
}
impl Error {
	/// Returns the HTTP status carried by the error, when one exists.
	pub fn status(&self) -> Option<u16> {
		match self {
			Self::Status(e) => Some(e.status),
			Self::Refresh(RefreshFailure::Rejected { status, .. }) => Some(*status),
			Self::Decode { status, .. } => Some(*status),
			_ => None,
		}
	}

	/// Checks whether the error is an authorization failure (`401`).
	pub fn is_unauthorized(&self) -> bool {
		self.status() == Some(StatusCode::UNAUTHORIZED.as_u16())
	}
}

/// Configuration and request-construction failures raised by the gateway.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
	/// Request target cannot be resolved against the base root.
	#[error("Request target `{target}` is not a valid URL.")]
	InvalidTarget {
		/// Target supplied by the caller.
		target: String,
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// Header name is not a valid HTTP token.
	#[error("Header name `{name}` is invalid.")]
	InvalidHeaderName {
		/// Offending header name.
		name: String,
	},
	/// Header value contains bytes HTTP forbids.
	#[error("Header `{name}` carries an invalid value.")]
	InvalidHeaderValue {
		/// Header whose value failed validation.
		name: String,
	},
	/// Request body could not be serialized as JSON.
	#[error("Request body could not be serialized as JSON.")]
	BodyEncode(#[source] serde_json::Error),
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for ConfigError {
	fn from(e: ReqwestError) -> Self {
		Self::http_client_build(e)
	}
}

/// Transport-level failures (network, IO).
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while calling the backend.")]
	Network {
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// Underlying IO failure surfaced during transport.
	#[error("I/O error occurred while calling the backend.")]
	Io(#[from] std::io::Error),
}
impl TransportError {
	/// Wraps a transport-specific network error.
	pub fn network(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Network { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for TransportError {
	fn from(e: ReqwestError) -> Self {
		Self::network(e)
	}
}

/// Non-success HTTP response surfaced as a typed failure.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
#[error("Backend responded with HTTP {status}: {message}.")]
pub struct StatusError {
	/// HTTP status code.
	pub status: u16,
	/// Message extracted from the body, or the canonical reason phrase.
	pub message: String,
	/// Raw response body.
	pub body: Vec<u8>,
	/// Retry-After hint from upstream, if supplied.
	pub retry_after: Option<Duration>,
}
impl StatusError {
	/// Checks whether the failure is an authorization failure (`401`).
	pub fn is_unauthorized(&self) -> bool {
		self.status == StatusCode::UNAUTHORIZED.as_u16()
	}
}

/// Outcome of a failed refresh ticket, shared by every caller attached to it.
#[derive(Clone, Debug, ThisError)]
pub enum RefreshFailure {
	/// The refresh endpoint answered with a non-success status.
	#[error("Session refresh was rejected with HTTP {status}: {message}.")]
	Rejected {
		/// HTTP status code returned by the refresh endpoint.
		status: u16,
		/// Message extracted from the refresh response.
		message: String,
	},
	/// The refresh call never produced a response.
	#[error("Session refresh failed before a response arrived.")]
	Transport {
		/// Transport failure shared by all waiters.
		#[source]
		source: Arc<TransportError>,
	},
}
