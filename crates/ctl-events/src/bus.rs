//! C5: in-process state bus.
//!
//! A minimal synchronous pub/sub used for OR-connection state transitions
//! (§4.5): a publisher calls [`StateBus::publish`] and every registered
//! listener runs on the publisher's own thread, in registration order.
//! Registering the same listener twice (by identity, not value) is a
//! no-op, mirroring how session registration is kept idempotent in
//! `core/session.rs` of the teacher this crate is grounded on.

use std::sync::{Arc, Mutex};

use gossamer_ctl_proto::EventCode;

/// The payload carried on the state bus: an OR-connection's identity
/// moving through a status transition. Kept intentionally minimal — the
/// bus's contract only promises *an* identity and *a* transition, not a
/// rich event type of its own.
#[derive(Clone, Debug)]
pub struct OrConnStateMsg {
	pub identity_digest: [u8; 20],
	pub status: crate::orconn::OrConnStatus,
}

pub trait StateListener: Send + Sync {
	fn on_state_event(&self, msg: &OrConnStateMsg);
}

pub struct StateBus {
	listeners: Mutex<Vec<Arc<dyn StateListener>>>,
}

impl StateBus {
	pub fn new() -> StateBus {
		StateBus { listeners: Mutex::new(Vec::new()) }
	}

	/// Registers a listener. A second registration of the same `Arc` is
	/// ignored rather than invoking it twice per publish.
	pub fn register(&self, listener: Arc<dyn StateListener>) {
		let mut listeners = self.listeners.lock().unwrap();
		if listeners.iter().any(|existing| Arc::ptr_eq(existing, &listener)) {
			tracing::debug!("state bus listener already registered, ignoring");
			return;
		}
		listeners.push(listener);
	}

	pub fn publish(&self, msg: OrConnStateMsg) {
		let listeners = self.listeners.lock().unwrap().clone();
		for listener in &listeners {
			listener.on_state_event(&msg);
		}
	}
}

impl Default for StateBus {
	fn default() -> StateBus {
		StateBus::new()
	}
}

/// The event code this bus's messages are ultimately rendered as, once a
/// subscriber turns them into a wire line via [`crate::orconn::emit_orconn_event`].
pub const CARRIED_EVENT: EventCode = EventCode::OrConn;
