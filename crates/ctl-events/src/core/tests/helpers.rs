//! In-memory fakes for every collaborator trait, so the core's locking and
//! ordering invariants can be asserted without a real socket or thread
//! pool.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use gossamer_ctl_proto::EventMask;

use crate::collab::{ArmingEffects, Collaborators, ConnectionSource, ControlClient, LogPendingDrain, LogSeverity, LogSeverityControl, MainloopHandle, NodeTable, PeriodicScheduler};
use crate::core::EventCore;

/// A test client: a mask, a close flag, and an outbound byte log instead
/// of a real socket.
pub struct FakeClient {
	mask: Mutex<EventMask>,
	closing: AtomicBool,
	pub outbound: Mutex<Vec<u8>>,
	pub flush_requests: AtomicUsize,
}

impl FakeClient {
	pub fn new(mask: EventMask) -> Arc<FakeClient> {
		Arc::new(FakeClient { mask: Mutex::new(mask), closing: AtomicBool::new(false), outbound: Mutex::new(Vec::new()), flush_requests: AtomicUsize::new(0) })
	}

	pub fn mark_for_close(&self) {
		self.closing.store(true, Ordering::SeqCst);
	}

	pub fn outbound_snapshot(&self) -> Vec<u8> {
		self.outbound.lock().unwrap().clone()
	}
}

impl ControlClient for FakeClient {
	fn mask(&self) -> EventMask {
		*self.mask.lock().unwrap()
	}

	fn set_mask(&self, mask: EventMask) {
		*self.mask.lock().unwrap() = mask;
	}

	fn append_outbound(&self, bytes: &[u8]) {
		self.outbound.lock().unwrap().extend_from_slice(bytes);
	}

	fn is_marked_for_close(&self) -> bool {
		self.closing.load(Ordering::SeqCst)
	}

	fn request_flush(&self) {
		self.flush_requests.fetch_add(1, Ordering::SeqCst);
	}
}

/// Holds whatever clients the test registered, handed out by reference on
/// every call the way a real connection table would be walked afresh.
pub struct FakeConnections {
	clients: Mutex<Vec<Arc<dyn ControlClient>>>,
}

impl FakeConnections {
	pub fn new() -> Arc<FakeConnections> {
		Arc::new(FakeConnections { clients: Mutex::new(Vec::new()) })
	}

	pub fn add(&self, client: Arc<dyn ControlClient>) {
		self.clients.lock().unwrap().push(client);
	}
}

impl ConnectionSource for FakeConnections {
	fn open_control_clients(&self) -> Vec<Arc<dyn ControlClient>> {
		self.clients.lock().unwrap().clone()
	}
}

/// Always claims to be on the mainloop thread (tests run single-threaded
/// unless a test says otherwise) and counts activations instead of waking
/// a real event loop.
pub struct FakeMainloop {
	pub on_mainloop: AtomicBool,
	pub activations: AtomicUsize,
}

impl FakeMainloop {
	pub fn new() -> Arc<FakeMainloop> {
		Arc::new(FakeMainloop { on_mainloop: AtomicBool::new(true), activations: AtomicUsize::new(0) })
	}

	pub fn set_on_mainloop(&self, value: bool) {
		self.on_mainloop.store(value, Ordering::SeqCst);
	}
}

impl MainloopHandle for FakeMainloop {
	fn is_on_mainloop_thread(&self) -> bool {
		self.on_mainloop.load(Ordering::SeqCst)
	}

	fn activate(&self) {
		self.activations.fetch_add(1, Ordering::SeqCst);
	}
}

pub struct FakeLogControl {
	pub last_range: Mutex<Option<(LogSeverity, LogSeverity)>>,
}

impl FakeLogControl {
	pub fn new() -> Arc<FakeLogControl> {
		Arc::new(FakeLogControl { last_range: Mutex::new(None) })
	}
}

impl LogSeverityControl for FakeLogControl {
	fn set_range(&self, min: LogSeverity, max: LogSeverity) {
		*self.last_range.lock().unwrap() = Some((min, max));
	}
}

pub struct FakeLogDrain {
	pub drains: AtomicUsize,
}

impl FakeLogDrain {
	pub fn new() -> Arc<FakeLogDrain> {
		Arc::new(FakeLogDrain { drains: AtomicUsize::new(0) })
	}
}

impl LogPendingDrain for FakeLogDrain {
	fn drain_pending(&self) {
		self.drains.fetch_add(1, Ordering::SeqCst);
	}
}

pub struct FakeScheduler {
	pub rescans: AtomicUsize,
}

impl FakeScheduler {
	pub fn new() -> Arc<FakeScheduler> {
		Arc::new(FakeScheduler { rescans: AtomicUsize::new(0) })
	}
}

impl PeriodicScheduler for FakeScheduler {
	fn rescan(&self) {
		self.rescans.fetch_add(1, Ordering::SeqCst);
	}
}

pub struct FakeNodeTable;

impl NodeTable for FakeNodeTable {
	fn nickname_for(&self, _identity_digest: &[u8; 20]) -> Option<String> {
		None
	}
}

pub struct FakeArming {
	pub stream_bw: AtomicUsize,
	pub circ_bw: AtomicUsize,
	pub bw: AtomicUsize,
}

impl FakeArming {
	pub fn new() -> Arc<FakeArming> {
		Arc::new(FakeArming { stream_bw: AtomicUsize::new(0), circ_bw: AtomicUsize::new(0), bw: AtomicUsize::new(0) })
	}
}

impl ArmingEffects for FakeArming {
	fn on_stream_bw_armed(&self) {
		self.stream_bw.fetch_add(1, Ordering::SeqCst);
	}

	fn on_circ_bw_armed(&self) {
		self.circ_bw.fetch_add(1, Ordering::SeqCst);
	}

	fn on_bw_armed(&self) {
		self.bw.fetch_add(1, Ordering::SeqCst);
	}
}

/// A ready-wired [`EventCore`] plus handles to every fake, for asserting on
/// their observed state after driving the core through a scenario.
pub struct Harness {
	pub core: Arc<EventCore>,
	pub connections: Arc<FakeConnections>,
	pub mainloop: Arc<FakeMainloop>,
	pub log_control: Arc<FakeLogControl>,
	pub log_drain: Arc<FakeLogDrain>,
	pub scheduler: Arc<FakeScheduler>,
	pub arming: Arc<FakeArming>,
}

pub fn harness() -> Harness {
	let connections = FakeConnections::new();
	let mainloop = FakeMainloop::new();
	let log_control = FakeLogControl::new();
	let log_drain = FakeLogDrain::new();
	let scheduler = FakeScheduler::new();
	let arming = FakeArming::new();

	let core = crate::core::initialize(Collaborators {
		connections: connections.clone(),
		mainloop: mainloop.clone(),
		log_control: log_control.clone(),
		log_drain: log_drain.clone(),
		scheduler: scheduler.clone(),
		node_table: Arc::new(FakeNodeTable),
		arming: arming.clone(),
	});

	Harness { core, connections, mainloop, log_control, log_drain, scheduler, arming }
}
