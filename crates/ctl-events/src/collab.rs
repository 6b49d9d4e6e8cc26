//! External collaborators (§6).
//!
//! This crate never touches a socket, the router's circuit/connection
//! tables, the logging subsystem's own internals, or a real mainloop. It
//! only calls out to them through these traits, all supplied once at
//! [`crate::core::initialize`]. A binary wiring this core to a real daemon
//! provides real implementations; tests provide in-memory fakes (see
//! `tests/helpers.rs`).

use std::sync::Arc;

use gossamer_ctl_proto::EventMask;

/// One connected control client, as seen from the event-delivery core.
///
/// The core never owns a socket; it only ever asks a client for its
/// current mask, tells it to append bytes to its outbound buffer, or asks
/// whether it is already on its way out.
pub trait ControlClient: Send + Sync {
	fn mask(&self) -> EventMask;
	fn set_mask(&self, mask: EventMask);
	fn append_outbound(&self, bytes: &[u8]);
	fn is_marked_for_close(&self) -> bool;
	/// Requests that this client's outbound buffer be flushed to its
	/// socket promptly, used for the `force` variant of [`crate::dispatcher::EventDispatcher::flush`].
	fn request_flush(&self);
}

/// Enumerates the control clients currently open, so the registry can
/// recompute the global mask and the dispatcher can deliver a batch.
pub trait ConnectionSource: Send + Sync {
	fn open_control_clients(&self) -> Vec<Arc<dyn ControlClient>>;
}

/// The single thread allowed to recompute masks and run a flush.
pub trait MainloopHandle: Send + Sync {
	fn is_on_mainloop_thread(&self) -> bool;
	/// Schedules a flush to run soon on the mainloop thread. Must not block
	/// and must not itself run the flush synchronously.
	fn activate(&self);
}

/// Adjusts the log subsystem's own severity window, per §4.3's
/// log-severity-range side effect of a mask recompute.
pub trait LogSeverityControl: Send + Sync {
	fn set_range(&self, min: LogSeverity, max: LogSeverity);
}

/// Drains any log messages the log subsystem buffered while a flush was
/// in progress, run as the first step of every flush (§4.4 step 1).
pub trait LogPendingDrain: Send + Sync {
	fn drain_pending(&self);
}

/// Rescans whatever periodic per-second event sources exist, run when
/// the any-per-second-event-enabled state flips (§4.3).
pub trait PeriodicScheduler: Send + Sync {
	fn rescan(&self);
}

/// Looks up a human-readable nickname for a router identity, used by the
/// OR-connection event formatter (§4.6).
pub trait NodeTable: Send + Sync {
	fn nickname_for(&self, identity_digest: &[u8; 20]) -> Option<String>;
}

/// The side effects that fire the first time an event code transitions
/// from not-subscribed to subscribed (§4.3's "arming" table).
pub trait ArmingEffects: Send + Sync {
	fn on_stream_bw_armed(&self);
	fn on_circ_bw_armed(&self);
	fn on_bw_armed(&self);
}

/// Log severities, ordered least to most severe. Mirrors the five
/// log-level event codes (`DEBUG`..`ERR`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogSeverity {
	Debug,
	Info,
	Notice,
	Warn,
	Err,
}

/// Bundles every collaborator trait object the core needs at construction.
/// A plain struct rather than one mega-trait, so a caller can reuse the
/// same backing type for several of these fields without friction.
pub struct Collaborators {
	pub connections: Arc<dyn ConnectionSource>,
	pub mainloop: Arc<dyn MainloopHandle>,
	pub log_control: Arc<dyn LogSeverityControl>,
	pub log_drain: Arc<dyn LogPendingDrain>,
	pub scheduler: Arc<dyn PeriodicScheduler>,
	pub node_table: Arc<dyn NodeTable>,
	pub arming: Arc<dyn ArmingEffects>,
}
