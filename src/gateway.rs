//! Authenticated request gateway: dispatch, single-flight refresh, one-shot replay.

mod metrics;
mod refresh;

pub use metrics::GatewayMetrics;

pub(crate) use refresh::TicketSlot;

// crates.io
use serde::de::DeserializeOwned;
// self
use crate::{
	_prelude::*,
	config::GatewayConfig,
	http::{ApiRequest, ApiResponse, HttpTransport, ResolvedRequest},
	obs::{self, GatewayOp, OpOutcome, OpSpan},
	session::SessionMonitor,
};
#[cfg(feature = "reqwest")]
use crate::{error::ConfigError, http::ReqwestTransport};

#[cfg(feature = "reqwest")]
/// Gateway specialized for the crate's default reqwest transport.
pub type ReqwestGateway = Gateway<ReqwestTransport>;

/// Wraps an [`HttpTransport`] so authorization expiry stays invisible to callers.
///
/// A `401` from the backend makes the gateway join the shared refresh ticket (creating it when
/// none is in flight). When the ticket succeeds the original request is replayed exactly once;
/// when it fails the [`SessionMonitor`] broadcasts one [`SessionEvent::Ended`] and the caller
/// receives the original `401`. Clones share the transport, session monitor and counters. The
/// refresh ticket lives in the [`SessionMonitor`], so every gateway attached to one monitor
/// joins the same in-flight refresh.
///
/// [`SessionEvent::Ended`]: crate::session::SessionEvent::Ended
pub struct Gateway<T>
where
	T: ?Sized + HttpTransport,
{
	/// Transport used for every outbound call, including refreshes.
	pub transport: Arc<T>,
	/// Configuration fixed at construction.
	pub config: Arc<GatewayConfig>,
	session: SessionMonitor,
	metrics: Arc<GatewayMetrics>,
}
impl<T> Gateway<T>
where
	T: ?Sized + HttpTransport,
{
	/// Creates a gateway that reuses the caller-provided transport.
	pub fn with_transport(config: GatewayConfig, transport: impl Into<Arc<T>>) -> Self {
		Self {
			transport: transport.into(),
			config: Arc::new(config),
			session: SessionMonitor::new(),
			metrics: Default::default(),
		}
	}

	/// Replaces the gateway's private session monitor with a process-wide one.
	///
	/// Gateways sharing a monitor also share its refresh ticket: a `401` seen by any of them
	/// joins the refresh already in flight, which runs through the transport and refresh route
	/// of whichever gateway started it.
	pub fn with_session(mut self, session: SessionMonitor) -> Self {
		self.session = session;

		self
	}

	/// Returns the session monitor this gateway reports to.
	pub fn session(&self) -> &SessionMonitor {
		&self.session
	}

	/// Returns the counters shared by every clone of this gateway.
	pub fn metrics(&self) -> &GatewayMetrics {
		&self.metrics
	}

	/// Sends `request`, transparently refreshing the session and replaying once on `401`.
	///
	/// `2xx` responses resolve to `Ok`; every other status resolves to
	/// [`Error::Status`](crate::error::Error::Status). Transport failures are returned as-is and
	/// never trigger a refresh. A replay that fails (even with another `401`) is returned
	/// unchanged; no request is refreshed twice.
	///
	/// The request must be safe to send twice; see [`ApiRequest`].
	pub async fn dispatch(&self, request: &ApiRequest) -> Result<ApiResponse> {
		const OP: GatewayOp = GatewayOp::Dispatch;

		let span = OpSpan::dispatch(&request.method, &request.target);

		obs::record_op_outcome(OP, OpOutcome::Attempt);
		self.metrics.record_dispatch();

		let result = span.instrument(self.dispatch_resolved(request, &span)).await;

		match &result {
			Ok(_) => obs::record_op_outcome(OP, OpOutcome::Success),
			Err(_) => obs::record_op_outcome(OP, OpOutcome::Failure),
		}

		result
	}

	/// Dispatches `request` and decodes the successful body as JSON.
	pub async fn dispatch_json<R>(&self, request: &ApiRequest) -> Result<R>
	where
		R: DeserializeOwned,
	{
		self.dispatch(request).await?.json()
	}

	/// Shorthand for dispatching a `GET` to `target` and decoding the JSON body.
	pub async fn get_json<R>(&self, target: &str) -> Result<R>
	where
		R: DeserializeOwned,
	{
		self.dispatch_json(&ApiRequest::get(target)).await
	}

	async fn dispatch_resolved(&self, request: &ApiRequest, span: &OpSpan) -> Result<ApiResponse> {
		let resolved = self.config.resolve(request)?;
		let response = self.transport.send(&resolved).await?;

		if !response.is_unauthorized() {
			return response.into_outcome();
		}
		if self.join_refresh().await.is_err() {
			return response.into_outcome();
		}

		span.record_replayed();

		self.replay(&resolved).await
	}

	async fn replay(&self, resolved: &ResolvedRequest) -> Result<ApiResponse> {
		const OP: GatewayOp = GatewayOp::Replay;

		let delay = self.config.settle_delay;

		if delay.is_positive() {
			tokio::time::sleep(delay.unsigned_abs()).await;
		}

		obs::record_op_outcome(OP, OpOutcome::Attempt);
		self.metrics.record_replay();

		let result = match self.transport.send(resolved).await {
			Ok(response) => response.into_outcome(),
			Err(e) => Err(e.into()),
		};

		match &result {
			Ok(_) => obs::record_op_outcome(OP, OpOutcome::Success),
			Err(_) => obs::record_op_outcome(OP, OpOutcome::Failure),
		}

		result
	}
}
impl<T> Clone for Gateway<T>
where
	T: ?Sized + HttpTransport,
{
	fn clone(&self) -> Self {
		Self {
			transport: Arc::clone(&self.transport),
			config: Arc::clone(&self.config),
			session: self.session.clone(),
			metrics: Arc::clone(&self.metrics),
		}
	}
}
#[cfg(feature = "reqwest")]
impl Gateway<ReqwestTransport> {
	/// Creates a new gateway with its own reqwest transport and cookie jar.
	pub fn new(config: GatewayConfig) -> Result<Self, ConfigError> {
		Ok(Self::with_transport(config, ReqwestTransport::new()?))
	}
}
impl<T> Debug for Gateway<T>
where
	T: ?Sized + HttpTransport,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Gateway")
			.field("base_url", &self.config.base_url.as_str())
			.field("refresh_url", &self.config.refresh_url.as_str())
			.field("session", &self.session.state())
			.field("refresh_in_flight", &self.refresh_in_flight())
			.finish()
	}
}
