//! Process-wide session state and the "session ended" broadcast.
//!
//! A [`SessionMonitor`] is cheap to clone; every clone shares the same state, channel and
//! refresh ticket slot. An application creates one at startup and hands it to each
//! [`Gateway`](crate::gateway::Gateway) via
//! [`Gateway::with_session`](crate::gateway::Gateway::with_session). Gateways sharing a monitor
//! share one in-flight refresh, so a failed refresh ends the session once no matter how many
//! gateways observed the `401`. Logout/redirect logic subscribes with
//! [`SessionMonitor::subscribe`].

// crates.io
use tokio::sync::broadcast::{self, Receiver, Sender};
// self
use crate::{_prelude::*, gateway::TicketSlot};

/// Whether the backend session is believed usable.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
	#[default]
	/// No refresh has failed since the session was last established.
	Active,
	/// A refresh failed; the user must sign in again.
	Ended,
}

/// Notification delivered to every [`SessionMonitor`] subscriber.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SessionEvent {
	/// A refresh ticket succeeded and the session credential was renewed.
	Renewed {
		/// Instant the refresh settled.
		at: OffsetDateTime,
	},
	/// The session is over; emitted once per failed refresh ticket or explicit logout.
	Ended {
		/// Instant the session ended.
		at: OffsetDateTime,
		/// Human-readable cause.
		reason: String,
	},
}
impl SessionEvent {
	/// Checks whether the event ends the session.
	pub fn is_ended(&self) -> bool {
		matches!(self, Self::Ended { .. })
	}
}

/// Shared session flag, observer channel and refresh ticket slot.
#[derive(Clone)]
pub struct SessionMonitor(Arc<SessionInner>);
impl SessionMonitor {
	const CHANNEL_CAPACITY: usize = 32;

	/// Creates a monitor in the [`SessionState::Active`] state.
	pub fn new() -> Self {
		let (events, _) = broadcast::channel(Self::CHANNEL_CAPACITY);

		Self(Arc::new(SessionInner {
			state: RwLock::new(SessionState::Active),
			events,
			ticket: Default::default(),
		}))
	}

	/// Subscribes to session events. Events sent before subscribing are not replayed.
	pub fn subscribe(&self) -> Receiver<SessionEvent> {
		self.0.events.subscribe()
	}

	/// Returns the number of live subscribers.
	pub fn subscriber_count(&self) -> usize {
		self.0.events.receiver_count()
	}

	/// Returns the current state.
	pub fn state(&self) -> SessionState {
		*self.0.state.read()
	}

	/// Checks whether the session is [`SessionState::Active`].
	pub fn is_active(&self) -> bool {
		self.state() == SessionState::Active
	}

	/// Marks the session active after a sign-in without broadcasting.
	pub fn mark_authenticated(&self) {
		*self.0.state.write() = SessionState::Active;
	}

	/// Ends the session and notifies every subscriber.
	///
	/// Called by the gateway exactly once per failed refresh ticket; applications may also call
	/// it for an explicit sign-out.
	pub fn end(&self, reason: impl Into<String>) {
		*self.0.state.write() = SessionState::Ended;

		self.emit(SessionEvent::Ended { at: OffsetDateTime::now_utc(), reason: reason.into() });
	}

	pub(crate) fn ticket_slot(&self) -> &TicketSlot {
		&self.0.ticket
	}

	pub(crate) fn renew(&self) {
		*self.0.state.write() = SessionState::Active;

		self.emit(SessionEvent::Renewed { at: OffsetDateTime::now_utc() });
	}

	// No subscribers is not an error.
	fn emit(&self, event: SessionEvent) {
		let _ = self.0.events.send(event);
	}
}
impl Default for SessionMonitor {
	fn default() -> Self {
		Self::new()
	}
}
impl Debug for SessionMonitor {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("SessionMonitor")
			.field("state", &self.state())
			.field("subscribers", &self.subscriber_count())
			.finish()
	}
}

struct SessionInner {
	state: RwLock<SessionState>,
	events: Sender<SessionEvent>,
	ticket: TicketSlot,
}
