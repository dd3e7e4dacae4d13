// self
use crate::{_prelude::*, obs::GatewayOp};

/// Type alias that resolves to an instrumented future when tracing is enabled.
#[cfg(feature = "tracing")]
pub type InstrumentedOp<F> = tracing::instrument::Instrumented<F>;
/// Passthrough future type when tracing is disabled.
#[cfg(not(feature = "tracing"))]
pub type InstrumentedOp<F> = F;

/// A span builder used by gateway operations.
#[derive(Clone, Debug)]
pub struct OpSpan {
	#[cfg(feature = "tracing")]
	span: tracing::Span,
}
impl OpSpan {
	/// Creates a new span tagged with the provided operation + stage.
	pub fn new(op: GatewayOp, stage: &'static str) -> Self {
		#[cfg(feature = "tracing")]
		{
			let span = tracing::info_span!("session_gateway.op", op = op.as_str(), stage);

			Self { span }
		}
		#[cfg(not(feature = "tracing"))]
		{
			let _ = (op, stage);

			Self {}
		}
	}

	/// Creates the dispatch span, tagged with the request method and target.
	///
	/// The span also carries a `replayed` field, set by [`record_replayed`](Self::record_replayed)
	/// once the request is sent again after a refresh.
	pub fn dispatch(method: &Method, target: &str) -> Self {
		#[cfg(feature = "tracing")]
		{
			let span = tracing::info_span!(
				"session_gateway.op",
				op = GatewayOp::Dispatch.as_str(),
				stage = "dispatch",
				method = method.as_str(),
				path = target,
				replayed = tracing::field::Empty,
			);

			Self { span }
		}
		#[cfg(not(feature = "tracing"))]
		{
			let _ = (method, target);

			Self {}
		}
	}

	/// Marks the span's request as replayed after a session refresh.
	pub fn record_replayed(&self) {
		#[cfg(feature = "tracing")]
		self.span.record("replayed", true);
	}

	/// Instruments an async block without holding a guard across `.await` points.
	pub fn instrument<Fut>(&self, fut: Fut) -> InstrumentedOp<Fut>
	where
		Fut: Future,
	{
		#[cfg(feature = "tracing")]
		{
			use tracing::Instrument;

			fut.instrument(self.span.clone())
		}
		#[cfg(not(feature = "tracing"))]
		{
			fut
		}
	}
}

/// Emits a debug event for a refresh ticket that renewed the session.
pub fn trace_refresh_renewed() {
	#[cfg(feature = "tracing")]
	tracing::debug!("session refresh succeeded");
}

/// Emits a warning for a refresh ticket that ended the session.
pub fn trace_refresh_failed(reason: &str) {
	#[cfg(feature = "tracing")]
	tracing::warn!(reason, "session refresh failed; session ended");
	#[cfg(not(feature = "tracing"))]
	let _ = reason;
}
