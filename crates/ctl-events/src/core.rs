//! Wiring for the event-delivery core: interest registry, dispatcher,
//! and state bus behind one constructible, `Arc`-shared handle.
//!
//! # Purpose
//!
//! - Bundle the interest registry (C3), event dispatcher (C4), and state
//!   bus (C5) into a single handle a binary constructs once and shares.
//! - Own every external collaborator trait object (§6) so producers never
//!   need their own reference to a socket, the router's tables, or the
//!   log subsystem.
//! - Exclude command dispatch (reading a `SETEVENTS` line off a socket
//!   and writing its reply) and router/circuit bookkeeping; those live in
//!   the binary wiring this core up, not here.
//!
//! # Mental model
//!
//! - [`EventCore`] is constructed once via [`initialize`] and shared behind
//!   an `Arc` with every connection handler and producer.
//! - The registry and dispatcher each hold their own lock; no code path in
//!   this crate holds both at once.
//! - Recomputing the global mask and running a flush are both restricted
//!   to the mainloop thread, per the dispatcher's and registry's own docs.
//!
//! # Key types
//!
//! | Type | Meaning | Constructed in |
//! |---|---|---|
//! | [`EventCore`] | Bundles registry + dispatcher + bus + collaborators | [`initialize`] |
//! | [`crate::registry::InterestRegistry`] | Per-client and global event masks | `EventCore::new` |
//! | [`crate::dispatcher::EventDispatcher`] | Queued, batched event delivery | `EventCore::new` |
//! | [`crate::bus::StateBus`] | In-process OR-connection state pub/sub | `EventCore::new` |
//!
//! # Invariants
//!
//! 1. `recompute_global_mask` and `flush` MUST only run on the mainloop
//!    thread.
//!    - Enforced in: caller discipline via `MainloopHandle::is_on_mainloop_thread`
//!    - Tested by: `tests::reentrancy`
//!    - Failure symptom: a recompute racing a flush on two real threads
//!      could observe a torn client list; nothing in this crate's own
//!      locking prevents calling `flush` off the mainloop thread, so a
//!      misbehaving caller is a bug in the caller, not recoverable here.
//!
//! 2. `shutdown` MUST discard queued events without delivering them, and
//!    MUST zero the global interest mask.
//!    - Enforced in: `EventDispatcher::free_all`, `InterestRegistry::zero_global_mask`
//!    - Tested by: `tests::dispatch_ordering::shutdown_discards_queue`,
//!      `tests::dispatch_ordering::shutdown_zeros_global_mask`

use std::sync::Arc;

use crate::bus::StateBus;
use crate::collab::{Collaborators, MainloopHandle, NodeTable};
use crate::dispatcher::EventDispatcher;
use crate::registry::InterestRegistry;

/// Name this subsystem would register under in a real router's subsystem
/// manager, and the priority it would register at (low priority so it
/// initializes after the log subsystem it reads from but before anything
/// that might publish an event during its own startup).
pub const SUBSYSTEM_NAME: &str = "orconn";
pub const SUBSYSTEM_PRIORITY: i32 = -40;

pub struct EventCore {
	pub registry: InterestRegistry,
	pub dispatcher: EventDispatcher,
	pub bus: StateBus,
	pub node_table: Arc<dyn NodeTable>,
	mainloop: Arc<dyn MainloopHandle>,
}

impl EventCore {
	fn new(collaborators: Collaborators) -> EventCore {
		let Collaborators { connections, mainloop, log_control, log_drain, scheduler, node_table, arming } = collaborators;

		let registry = InterestRegistry::new(connections.clone(), log_control, scheduler, arming);
		let dispatcher = EventDispatcher::new(mainloop.clone(), connections, log_drain);

		EventCore { registry, dispatcher, bus: StateBus::new(), node_table, mainloop }
	}

	/// Whether the calling thread is the one allowed to recompute masks
	/// and run a flush. Exposed so a binary's command handler can assert
	/// it before calling into either.
	pub fn is_on_mainloop_thread(&self) -> bool {
		self.mainloop.is_on_mainloop_thread()
	}

	/// Discards any queued events and zeros the global interest mask, per
	/// §3 Lifecycle and §4.4 Teardown: after shutdown, nothing is
	/// interesting, so a stray post-teardown publish is dropped rather
	/// than queued.
	pub fn shutdown(&self) {
		self.dispatcher.free_all();
		self.registry.zero_global_mask();
		tracing::info!(subsystem = SUBSYSTEM_NAME, "event core shut down");
	}
}

/// Constructs an [`EventCore`] wired to the given collaborators, the way a
/// real router's subsystem manager would at startup.
pub fn initialize(collaborators: Collaborators) -> Arc<EventCore> {
	tracing::info!(subsystem = SUBSYSTEM_NAME, priority = SUBSYSTEM_PRIORITY, "initializing event core");
	Arc::new(EventCore::new(collaborators))
}

#[cfg(test)]
mod tests;
