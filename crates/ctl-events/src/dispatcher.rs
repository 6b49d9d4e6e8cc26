//! C4: the event dispatcher.
//!
//! Producers call [`EventDispatcher::publish`] from whatever thread they
//! run on; the payload is queued, not delivered, and only ever delivered
//! by a [`EventDispatcher::flush`] run on the mainloop thread. This keeps
//! producers (router internals, the OR-connection formatter) decoupled
//! from the client list and from each other.

use std::cell::Cell;
use std::sync::{Arc, Mutex};

use gossamer_ctl_proto::EventCode;

use crate::collab::{ConnectionSource, LogPendingDrain, MainloopHandle};
use crate::registry::InterestRegistry;

thread_local! {
	/// Counts nested entries into `publish`/`flush` on the current thread.
	/// A publish that happens while this thread is already inside a
	/// publish or a flush (for instance, a log message emitted while
	/// formatting another event's payload) is dropped rather than queued,
	/// since draining it here could recurse without bound.
	static REENTRY_DEPTH: Cell<u32> = const { Cell::new(0) };
}

struct QueuedEvent {
	code: EventCode,
	payload: Vec<u8>,
}

struct QueueState {
	queue: Vec<QueuedEvent>,
	flush_scheduled: bool,
}

pub struct EventDispatcher {
	state: Mutex<QueueState>,
	mainloop: Arc<dyn MainloopHandle>,
	connections: Arc<dyn ConnectionSource>,
	log_drain: Arc<dyn LogPendingDrain>,
}

struct ReentryGuard;

impl ReentryGuard {
	fn enter() -> ReentryGuard {
		REENTRY_DEPTH.with(|d| d.set(d.get() + 1));
		ReentryGuard
	}

	fn depth() -> u32 {
		REENTRY_DEPTH.with(|d| d.get())
	}
}

impl Drop for ReentryGuard {
	fn drop(&mut self) {
		REENTRY_DEPTH.with(|d| d.set(d.get() - 1));
	}
}

impl EventDispatcher {
	pub fn new(mainloop: Arc<dyn MainloopHandle>, connections: Arc<dyn ConnectionSource>, log_drain: Arc<dyn LogPendingDrain>) -> Self {
		EventDispatcher {
			state: Mutex::new(QueueState { queue: Vec::new(), flush_scheduled: false }),
			mainloop,
			connections,
			log_drain,
		}
	}

	/// Queues `payload` for delivery as an event of kind `code`, if
	/// anything is currently subscribed to it. Arms a flush on the
	/// mainloop thread the first time anything is queued since the last
	/// flush. Safe to call from any thread; drops the event rather than
	/// queuing it if this thread is already inside a publish or flush.
	pub fn publish(&self, registry: &InterestRegistry, code: EventCode, payload: Vec<u8>) {
		if !registry.is_interesting(code) {
			return;
		}
		if ReentryGuard::depth() > 0 {
			tracing::trace!(?code, "dropping event published while already dispatching");
			return;
		}
		let guard = ReentryGuard::enter();

		let mut activate = false;
		{
			let mut state = self.state.lock().unwrap();
			state.queue.push(QueuedEvent { code, payload });
			if !state.flush_scheduled && self.mainloop.is_on_mainloop_thread() {
				state.flush_scheduled = true;
				activate = true;
			}
		}
		drop(guard);

		if activate {
			self.mainloop.activate();
		}
	}

	/// Delivers every queued event to every open, not-closing client whose
	/// mask contains that event's code, in enqueue order. Must run on the
	/// mainloop thread. If `force`, also asks every delivered-to client to
	/// flush its outbound buffer to its socket promptly.
	pub fn flush(&self, force: bool) {
		self.log_drain.drain_pending();
		let _guard = ReentryGuard::enter();

		let queue = {
			let mut state = self.state.lock().unwrap();
			state.flush_scheduled = false;
			std::mem::take(&mut state.queue)
		};
		if queue.is_empty() && !force {
			return;
		}

		let clients: Vec<_> = self.connections.open_control_clients().into_iter().filter(|c| !c.is_marked_for_close()).collect();

		for event in &queue {
			for client in &clients {
				if client.mask().contains(event.code) {
					client.append_outbound(&event.payload);
				}
			}
		}

		if force {
			for client in &clients {
				client.request_flush();
			}
		}
	}

	/// Discards every queued event without delivering it and clears the
	/// flush-scheduled flag. Used at shutdown.
	pub fn free_all(&self) {
		let mut state = self.state.lock().unwrap();
		state.queue.clear();
		state.flush_scheduled = false;
	}
}
