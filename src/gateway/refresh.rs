//! Single-flight session refresh.
//!
//! Every [`SessionMonitor`](crate::session::SessionMonitor) keeps at most one refresh ticket in
//! its slot, shared by all gateways attached to it. The first caller that needs a refresh while
//! the slot is empty installs a ticket; every caller arriving while it is installed attaches to
//! it. Whoever initializes the ticket's cell performs the one call to the refresh endpoint and
//! clears the slot *before* publishing the outcome, so the next `401` starts a fresh attempt. It
//! then updates the session and releases the waiters. The "session ended" signal fires once per
//! failed ticket, never once per waiter.
//!
//! The slot's lock is never held across an `.await`. If the initializing future is dropped
//! mid-call, a waiting caller re-runs the refresh for the same ticket. When the last attached
//! caller is dropped before the ticket settles, the ticket leaves the slot with it.

// std
use std::sync::atomic::{AtomicUsize, Ordering};
// crates.io
use async_lock::OnceCell;
// self
use crate::{
	_prelude::*,
	error::RefreshFailure,
	gateway::Gateway,
	http::HttpTransport,
	obs::{self, GatewayOp, OpOutcome, OpSpan},
};

pub(crate) type TicketSlot = Mutex<Option<Arc<RefreshTicket>>>;

type RefreshOutcome = Result<(), RefreshFailure>;

/// Shared handle for one in-flight refresh attempt.
#[derive(Debug, Default)]
pub(crate) struct RefreshTicket {
	outcome: OnceCell<RefreshOutcome>,
	// Callers currently awaiting the outcome; only touched under the slot lock.
	attached: AtomicUsize,
}

impl<T> Gateway<T>
where
	T: ?Sized + HttpTransport,
{
	/// Refreshes the session, joining the in-flight ticket when one exists.
	///
	/// Concurrent callers (including dispatches that observed a `401`, on this gateway or any
	/// gateway sharing its session monitor) share a single call to the refresh endpoint and
	/// observe the same outcome.
	pub async fn refresh(&self) -> Result<()> {
		self.join_refresh().await.map_err(Error::from)
	}

	/// Checks whether a refresh ticket is currently installed.
	pub fn refresh_in_flight(&self) -> bool {
		self.session.ticket_slot().lock().is_some()
	}

	pub(crate) async fn join_refresh(&self) -> RefreshOutcome {
		let ticket = self.attach_ticket();
		let _lease = TicketLease { slot: self.session.ticket_slot(), ticket: &ticket };

		ticket.outcome.get_or_init(|| self.settle_ticket(&ticket)).await.clone()
	}

	fn attach_ticket(&self) -> Arc<RefreshTicket> {
		let mut slot = self.session.ticket_slot().lock();
		let ticket = Arc::clone(slot.get_or_insert_with(Default::default));

		ticket.attached.fetch_add(1, Ordering::Relaxed);

		ticket
	}

	async fn settle_ticket(&self, ticket: &Arc<RefreshTicket>) -> RefreshOutcome {
		const OP: GatewayOp = GatewayOp::Refresh;

		let span = OpSpan::new(OP, "settle_ticket");

		obs::record_op_outcome(OP, OpOutcome::Attempt);
		self.metrics.record_refresh_attempt();

		let outcome = span.instrument(self.call_refresh_endpoint()).await;

		clear_ticket(self.session.ticket_slot(), ticket);

		match &outcome {
			Ok(()) => {
				self.metrics.record_refresh_success();
				self.session.renew();
				obs::trace_refresh_renewed();
				obs::record_op_outcome(OP, OpOutcome::Success);
			},
			Err(failure) => {
				let reason = failure.to_string();

				self.metrics.record_refresh_failure();
				obs::trace_refresh_failed(&reason);
				self.session.end(reason);
				obs::record_op_outcome(OP, OpOutcome::Failure);
			},
		}

		outcome
	}

	async fn call_refresh_endpoint(&self) -> RefreshOutcome {
		let request = self.config.refresh_request();

		match self.transport.send(&request).await {
			Ok(response) if response.is_success() => Ok(()),
			Ok(response) => Err(RefreshFailure::Rejected {
				status: response.status.as_u16(),
				message: response.message(),
			}),
			Err(e) => Err(RefreshFailure::Transport { source: Arc::new(e) }),
		}
	}
}

/// Detaches one caller from a ticket when its refresh future completes or is dropped.
struct TicketLease<'a> {
	slot: &'a TicketSlot,
	ticket: &'a Arc<RefreshTicket>,
}
impl Drop for TicketLease<'_> {
	fn drop(&mut self) {
		let mut slot = self.slot.lock();
		let last = self.ticket.attached.fetch_sub(1, Ordering::Relaxed) == 1;

		// An abandoned, unsettled ticket must not pose as an in-flight refresh.
		if last
			&& !self.ticket.outcome.is_initialized()
			&& slot.as_ref().is_some_and(|current| Arc::ptr_eq(current, self.ticket))
		{
			*slot = None;
		}
	}
}

// Only the ticket that is still installed may be cleared.
fn clear_ticket(slot: &TicketSlot, ticket: &Arc<RefreshTicket>) {
	let mut slot = slot.lock();

	if slot.as_ref().is_some_and(|current| Arc::ptr_eq(current, ticket)) {
		*slot = None;
	}
}
