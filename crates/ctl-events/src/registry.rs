//! C3: interest registry.
//!
//! Tracks each client's subscription mask and maintains a global union
//! mask the dispatcher can check without walking the client list. Also
//! owns the two recompute-time side effects described in §4.3: keeping
//! the log subsystem's severity window in sync with the log-level event
//! bits, and firing arming effects the first time a countable event is
//! subscribed.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use gossamer_ctl_proto::{EventCode, EventMask};

use crate::collab::{ArmingEffects, ConnectionSource, LogSeverity, LogSeverityControl, PeriodicScheduler};

/// Event codes whose first-subscription transition has a side effect
/// beyond the mask itself.
const ARMABLE: &[EventCode] = &[EventCode::StreamBw, EventCode::CircBw, EventCode::Bw];

/// Event codes whose presence implies a periodic per-second source must
/// run; used to decide whether the scheduler needs rescanning.
const PER_SECOND: &[EventCode] = &[EventCode::Bw, EventCode::CellStats, EventCode::CircBw, EventCode::ConnBw, EventCode::StreamBw];

/// The five log-level event codes, paired with the severity they
/// correspond to, ordered `DEBUG` (least severe) to `ERR` (most severe).
const LOG_LEVEL_EVENTS: &[(EventCode, LogSeverity)] = &[
	(EventCode::Debug, LogSeverity::Debug),
	(EventCode::Info, LogSeverity::Info),
	(EventCode::Notice, LogSeverity::Notice),
	(EventCode::Warn, LogSeverity::Warn),
	(EventCode::Err, LogSeverity::Err),
];

pub struct InterestRegistry {
	/// Published union of every open client's mask. Read from arbitrary
	/// threads via [`InterestRegistry::is_interesting`]; only ever written
	/// from the mainloop thread during [`InterestRegistry::recompute_global_mask`].
	global_mask: AtomicU64,
	connections: Arc<dyn ConnectionSource>,
	log_control: Arc<dyn LogSeverityControl>,
	scheduler: Arc<dyn PeriodicScheduler>,
	arming: Arc<dyn ArmingEffects>,
}

impl InterestRegistry {
	pub fn new(
		connections: Arc<dyn ConnectionSource>,
		log_control: Arc<dyn LogSeverityControl>,
		scheduler: Arc<dyn PeriodicScheduler>,
		arming: Arc<dyn ArmingEffects>,
	) -> Self {
		InterestRegistry {
			global_mask: AtomicU64::new(0),
			connections,
			log_control,
			scheduler,
			arming,
		}
	}

	/// Sets a client's mask and recomputes the global union mask from
	/// every still-open client. Must run on the mainloop thread.
	pub fn set_client_mask(&self, client: &dyn crate::collab::ControlClient, mask: EventMask) {
		client.set_mask(mask);
		self.recompute_global_mask();
	}

	/// Recomputes the global mask from every open, not-closing client,
	/// then applies the log-severity-window and arming/scheduler side
	/// effects implied by what changed.
	pub fn recompute_global_mask(&self) {
		let clients = self.connections.open_control_clients();
		let mut new_mask = EventMask::EMPTY;
		for client in &clients {
			if !client.is_marked_for_close() {
				new_mask = new_mask.union(client.mask());
			}
		}

		let old_mask = EventMask::from_bits(self.global_mask.load(Ordering::SeqCst));

		self.adjust_log_severity(new_mask);
		self.fire_arming_effects(old_mask, new_mask);

		let per_second_changed = self.any_per_second_enabled_in(old_mask) != self.any_per_second_enabled_in(new_mask);
		if per_second_changed {
			self.scheduler.rescan();
		}

		self.global_mask.store(new_mask.bits(), Ordering::SeqCst);
		tracing::debug!(mask = ?new_mask, "interest registry recomputed");
	}

	/// Whether anything is currently subscribed to `code`. Safe to call
	/// from any thread; this is the dispatcher's publish-time fast path.
	pub fn is_interesting(&self, code: EventCode) -> bool {
		EventMask::from_bits(self.global_mask.load(Ordering::SeqCst)).contains(code)
	}

	/// Whether the current global mask includes any per-second event.
	pub fn any_per_second_enabled(&self) -> bool {
		self.any_per_second_enabled_in(EventMask::from_bits(self.global_mask.load(Ordering::SeqCst)))
	}

	/// Zeros the global mask outright, bypassing the usual per-client
	/// recompute. Used only at teardown (§3 Lifecycle, §4.4 Teardown): once
	/// shut down, nothing should read as interesting, so a stray
	/// post-teardown publish is dropped rather than queued.
	pub fn zero_global_mask(&self) {
		self.global_mask.store(0, Ordering::SeqCst);
	}

	fn any_per_second_enabled_in(&self, mask: EventMask) -> bool {
		PER_SECOND.iter().any(|&code| mask.contains(code))
	}

	fn fire_arming_effects(&self, old_mask: EventMask, new_mask: EventMask) {
		for &code in ARMABLE {
			if new_mask.contains(code) && !old_mask.contains(code) {
				match code {
					EventCode::StreamBw => self.arming.on_stream_bw_armed(),
					EventCode::CircBw => self.arming.on_circ_bw_armed(),
					EventCode::Bw => self.arming.on_bw_armed(),
					_ => unreachable!("ARMABLE only lists the three codes handled above"),
				}
			}
		}
	}

	/// Narrows or widens the log subsystem's severity window to exactly
	/// the range implied by the subscribed log-level bits, widening to at
	/// least `[NOTICE, ERR]` if `STATUS_GENERAL` is subscribed, and
	/// falling back to the narrowest possible window (`ERR` only) if no
	/// log-level bit is set at all.
	fn adjust_log_severity(&self, mask: EventMask) {
		let mut range: Option<(LogSeverity, LogSeverity)> = None;
		for &(code, sev) in LOG_LEVEL_EVENTS {
			if mask.contains(code) {
				range = Some(match range {
					None => (sev, sev),
					Some((lo, hi)) => (lo.min(sev), hi.max(sev)),
				});
			}
		}
		if mask.contains(EventCode::StatusGeneral) {
			range = Some(match range {
				None => (LogSeverity::Notice, LogSeverity::Err),
				Some((lo, hi)) => (lo.min(LogSeverity::Notice), hi.max(LogSeverity::Err)),
			});
		}
		let (lo, hi) = range.unwrap_or((LogSeverity::Err, LogSeverity::Err));
		self.log_control.set_range(lo, hi);
	}
}
