//! Transport primitives for gateway dispatches.
//!
//! The module exposes [`HttpTransport`] alongside the request descriptor ([`ApiRequest`]), its
//! resolved form ([`ResolvedRequest`]) and the raw response ([`ApiResponse`]) so downstream
//! crates can plug custom HTTP stacks into the gateway. A transport reports every HTTP status as
//! an [`ApiResponse`]; only failures that never produced a response become
//! [`TransportError`] values, which keeps `401` detection inside the gateway.

pub mod request;
pub mod response;

pub use ::http::{HeaderMap, HeaderName, HeaderValue, Method, StatusCode, header};
pub use request::*;
pub use response::*;

// crates.io
#[cfg(feature = "reqwest")]
use ::http::header::{COOKIE, SET_COOKIE};
#[cfg(feature = "reqwest")]
use reqwest::{
	ClientBuilder,
	cookie::{CookieStore, Jar},
	redirect::Policy,
};
// self
use crate::{_prelude::*, error::TransportError};

/// Boxed future returned by [`HttpTransport::send`].
pub type TransportFuture<'a> =
	Pin<Box<dyn Future<Output = Result<ApiResponse, TransportError>> + 'a + Send>>;

/// Abstraction over HTTP stacks capable of executing gateway requests.
///
/// The trait is the gateway's only dependency on an HTTP client. Implementations must be
/// `Send + Sync + 'static` so a single transport can back every clone of a gateway, and
/// [`send`](HttpTransport::send) may be called twice with the same [`ResolvedRequest`] when
/// the gateway replays it after a session refresh.
///
/// # Credential Contract
///
/// - When [`ResolvedRequest::include_credentials`] is `true`, attach the session credential
///   (cookies, typically) and record any credential the response sets.
/// - When it is `false`, neither send nor store credentials.
pub trait HttpTransport
where
	Self: 'static + Send + Sync,
{
	/// Sends the request and returns the response for any HTTP status.
	fn send<'a>(&'a self, request: &'a ResolvedRequest) -> TransportFuture<'a>;
}

/// Reqwest-backed transport that keeps session cookies in a shared [`Jar`].
///
/// Cookies are managed by the transport rather than by reqwest's built-in cookie store so the
/// per-request credential mode can decide whether they are sent. A `Cookie` header set on the
/// request is kept and the jar's cookies are appended to it. Redirects are never followed;
/// a redirecting backend surfaces as a `3xx` [`StatusError`](crate::error::StatusError).
#[cfg(feature = "reqwest")]
#[derive(Clone)]
pub struct ReqwestTransport {
	client: ReqwestClient,
	jar: Arc<Jar>,
}
#[cfg(feature = "reqwest")]
impl ReqwestTransport {
	/// Builds a transport with reqwest defaults and an empty cookie jar.
	pub fn new() -> Result<Self, crate::error::ConfigError> {
		Self::with_builder(ReqwestClient::builder())
	}

	/// Builds a transport from a caller-tuned [`ClientBuilder`]; redirect following is disabled.
	pub fn with_builder(builder: ClientBuilder) -> Result<Self, crate::error::ConfigError> {
		let client = builder.redirect(Policy::none()).build()?;

		Ok(Self::with_client(client, Default::default()))
	}

	/// Wraps an existing reqwest [`ReqwestClient`] and cookie jar.
	///
	/// The client should not enable its own cookie store; the transport injects cookies from
	/// `jar` itself.
	pub fn with_client(client: ReqwestClient, jar: Arc<Jar>) -> Self {
		Self { client, jar }
	}

	/// Returns the cookie jar holding the session credential.
	pub fn cookie_jar(&self) -> &Arc<Jar> {
		&self.jar
	}

	/// Returns the `Cookie` header the transport would send to `url`, if any.
	pub fn cookies_for(&self, url: &Url) -> Option<HeaderValue> {
		self.jar.cookies(url)
	}
}
#[cfg(feature = "reqwest")]
impl AsRef<ReqwestClient> for ReqwestTransport {
	fn as_ref(&self) -> &ReqwestClient {
		&self.client
	}
}
#[cfg(feature = "reqwest")]
impl HttpTransport for ReqwestTransport {
	fn send<'a>(&'a self, request: &'a ResolvedRequest) -> TransportFuture<'a> {
		Box::pin(async move {
			let mut headers = request.headers.clone();

			if let Some(cookie) =
				request.include_credentials.then(|| self.jar.cookies(&request.url)).flatten()
			{
				merge_cookie_header(&mut headers, cookie);
			}

			let mut builder =
				self.client.request(request.method.clone(), request.url.clone()).headers(headers);

			if let Some(body) = request.body.as_ref() {
				builder = builder.body(body.clone());
			}

			let response = builder.send().await?;
			let status = response.status();
			let headers = response.headers().to_owned();

			if request.include_credentials {
				self.jar.set_cookies(&mut headers.get_all(SET_COOKIE).iter(), &request.url);
			}

			let body = response.bytes().await?.to_vec();

			Ok(ApiResponse { status, headers, body })
		})
	}
}
#[cfg(feature = "reqwest")]
impl Debug for ReqwestTransport {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("ReqwestTransport").finish_non_exhaustive()
	}
}

// Folds every caller-supplied `Cookie` value and the jar's cookies into a single header.
#[cfg(feature = "reqwest")]
fn merge_cookie_header(headers: &mut HeaderMap, jar_cookie: HeaderValue) {
	if !headers.contains_key(COOKIE) {
		headers.insert(COOKIE, jar_cookie);

		return;
	}

	let mut merged = Vec::new();

	for value in headers.get_all(COOKIE).iter().chain([&jar_cookie]) {
		if !merged.is_empty() {
			merged.extend_from_slice(b"; ");
		}

		merged.extend_from_slice(value.as_bytes());
	}

	let merged = HeaderValue::from_bytes(&merged).unwrap_or(jar_cookie);

	headers.insert(COOKIE, merged);
}
