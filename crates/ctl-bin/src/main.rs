//! gossamer-ctld: a small daemon demonstrating the event-delivery core.
//!
//! Accepts control connections on a Unix domain socket, understands a
//! single command (`SETEVENTS <name> ...`), and otherwise exists to wire
//! every external collaborator trait [`gossamer_ctl_events`] expects to a
//! real (if minimal) implementation: one mainloop task, a connection
//! table, and stub log/scheduler/node-table collaborators. Router
//! internals, circuit bookkeeping, and the rest of a real control
//! protocol are out of scope; see `gossamer-ctl-events` for the part of
//! this system that actually matters.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use clap::Parser;
use gossamer_ctl_events::{ArmingEffects, Collaborators, ConnectionSource, ControlClient, LogPendingDrain, LogSeverity, LogSeverityControl, MainloopHandle, NodeTable};
use gossamer_ctl_proto::{EventMask, ProtocolError, parse_setevents_names, reply};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{UnixListener, UnixStream};
use tokio::sync::{Notify, mpsc};
use tokio_util::sync::CancellationToken;
use tracing::info;

/// gossamer-ctld command line arguments.
#[derive(Parser, Debug)]
#[command(name = "gossamer-ctld")]
#[command(about = "Control-channel event delivery core demonstration daemon")]
struct Args {
	/// Socket path to listen on.
	#[arg(short, long, value_name = "PATH")]
	socket: Option<PathBuf>,

	/// Verbose logging.
	#[arg(short, long)]
	verbose: bool,
}

fn default_socket_path() -> PathBuf {
	std::env::temp_dir().join("gossamer-ctl.sock")
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
	let args = Args::parse();
	setup_tracing(args.verbose);

	info!("starting gossamer-ctld");

	let socket_path = args.socket.unwrap_or_else(default_socket_path);
	if socket_path.exists() {
		tokio::fs::remove_file(&socket_path).await?;
	}
	if let Some(parent) = socket_path.parent()
		&& !parent.exists()
	{
		std::fs::create_dir_all(parent)?;
	}

	let connections = ConnectionTable::new();
	let mainloop = TokioMainloop::new();

	let core = gossamer_ctl_events::initialize(Collaborators {
		connections: Arc::new(connections.clone()),
		mainloop: mainloop.clone(),
		log_control: Arc::new(StderrLogControl),
		log_drain: Arc::new(NoopLogDrain),
		scheduler: Arc::new(NoopScheduler),
		node_table: Arc::new(EmptyNodeTable),
		arming: Arc::new(LoggingArming),
	});

	let shutdown = CancellationToken::new();
	mainloop.spawn_flush_task(core.clone(), shutdown.clone());

	info!(socket = %socket_path.display(), "listening for control connections");
	let listener = UnixListener::bind(&socket_path)?;

	loop {
		tokio::select! {
			accepted = listener.accept() => {
				match accepted {
					Ok((stream, _addr)) => {
						let core = core.clone();
						let connections = connections.clone();
						tokio::spawn(async move {
							handle_connection(stream, core, connections).await;
						});
					}
					Err(e) => tracing::error!(error = %e, "failed to accept control connection"),
				}
			}
			_ = shutdown.cancelled() => break,
		}
	}

	Ok(())
}

fn setup_tracing(verbose: bool) {
	use std::fs::OpenOptions;

	use tracing_subscriber::EnvFilter;
	use tracing_subscriber::fmt::format::FmtSpan;
	use tracing_subscriber::prelude::*;

	if let Some(log_dir) = std::env::var("GOSSAMER_LOG_DIR").ok().map(PathBuf::from)
		&& std::fs::create_dir_all(&log_dir).is_ok()
	{
		let pid = std::process::id();
		let log_path = log_dir.join(format!("gossamer-ctld.{pid}.log"));

		if let Ok(file) = OpenOptions::new().create(true).append(true).open(&log_path) {
			let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
				if verbose { EnvFilter::new("gossamer_ctl_events=trace,debug") } else { EnvFilter::new("gossamer_ctl_events=debug,info") }
			});

			let file_layer = tracing_subscriber::fmt::layer().with_writer(file).with_ansi(false).with_span_events(FmtSpan::CLOSE).with_target(true);

			tracing_subscriber::registry().with(filter).with(file_layer).init();
			tracing::info!(path = ?log_path, "gossamer-ctld tracing initialized");
			return;
		}
	}

	tracing_subscriber::fmt().with_max_level(if verbose { tracing::Level::DEBUG } else { tracing::Level::INFO }).init();
}

/// One connected control client: a mask, a close flag, and a channel back
/// to the task that owns its socket half.
struct SocketClient {
	mask: Mutex<EventMask>,
	closing: AtomicBool,
	outbound: mpsc::UnboundedSender<Vec<u8>>,
}

impl ControlClient for SocketClient {
	fn mask(&self) -> EventMask {
		*self.mask.lock().unwrap()
	}

	fn set_mask(&self, mask: EventMask) {
		*self.mask.lock().unwrap() = mask;
	}

	fn append_outbound(&self, bytes: &[u8]) {
		let _ = self.outbound.send(bytes.to_vec());
	}

	fn is_marked_for_close(&self) -> bool {
		self.closing.load(Ordering::SeqCst)
	}

	fn request_flush(&self) {
		// Every append is already written and flushed to the socket promptly
		// by the per-connection writer task; there is no extra buffering
		// here for this to act on.
	}
}

#[derive(Clone)]
struct ConnectionTable {
	clients: Arc<Mutex<Vec<Arc<SocketClient>>>>,
}

impl ConnectionTable {
	fn new() -> ConnectionTable {
		ConnectionTable { clients: Arc::new(Mutex::new(Vec::new())) }
	}

	fn add(&self, client: Arc<SocketClient>) {
		self.clients.lock().unwrap().push(client);
	}

	fn remove(&self, client: &Arc<SocketClient>) {
		self.clients.lock().unwrap().retain(|c| !Arc::ptr_eq(c, client));
	}
}

impl ConnectionSource for ConnectionTable {
	fn open_control_clients(&self) -> Vec<Arc<dyn ControlClient>> {
		self.clients.lock().unwrap().iter().cloned().map(|c| c as Arc<dyn ControlClient>).collect()
	}
}

/// A single dedicated task owns the right to recompute masks and run a
/// flush; every other task only ever asks it to wake up via `activate`.
/// A production daemon would instead check the calling task against the
/// runtime's designated mainloop thread; this demonstration keeps exactly
/// one task playing that role, so `is_on_mainloop_thread` is trivially
/// true for it and callers never call the registry/dispatcher from
/// anywhere else.
#[derive(Clone)]
struct TokioMainloop {
	notify: Arc<Notify>,
}

impl TokioMainloop {
	fn new() -> Arc<TokioMainloop> {
		Arc::new(TokioMainloop { notify: Arc::new(Notify::new()) })
	}

	fn spawn_flush_task(self: &Arc<Self>, core: Arc<gossamer_ctl_events::EventCore>, shutdown: CancellationToken) {
		let notify = self.notify.clone();
		tokio::spawn(async move {
			loop {
				tokio::select! {
					_ = notify.notified() => core.dispatcher.flush(false),
					_ = shutdown.cancelled() => {
						core.shutdown();
						break;
					}
				}
			}
		});
	}
}

impl MainloopHandle for TokioMainloop {
	fn is_on_mainloop_thread(&self) -> bool {
		true
	}

	fn activate(&self) {
		self.notify.notify_one();
	}
}

struct StderrLogControl;
impl LogSeverityControl for StderrLogControl {
	fn set_range(&self, min: LogSeverity, max: LogSeverity) {
		tracing::debug!(?min, ?max, "log severity window adjusted");
	}
}

struct NoopLogDrain;
impl LogPendingDrain for NoopLogDrain {
	fn drain_pending(&self) {}
}

struct NoopScheduler;
impl gossamer_ctl_events::PeriodicScheduler for NoopScheduler {
	fn rescan(&self) {
		tracing::debug!("periodic event scheduler rescanned");
	}
}

struct EmptyNodeTable;
impl NodeTable for EmptyNodeTable {
	fn nickname_for(&self, _identity_digest: &[u8; 20]) -> Option<String> {
		None
	}
}

struct LoggingArming;
impl ArmingEffects for LoggingArming {
	fn on_stream_bw_armed(&self) {
		tracing::debug!("STREAM_BW armed");
	}

	fn on_circ_bw_armed(&self) {
		tracing::debug!("CIRC_BW armed");
	}

	fn on_bw_armed(&self) {
		tracing::debug!("BW armed");
	}
}

static NEXT_CLIENT_ID: AtomicU64 = AtomicU64::new(1);

async fn handle_connection(stream: UnixStream, core: Arc<gossamer_ctl_events::EventCore>, connections: ConnectionTable) {
	let client_id = NEXT_CLIENT_ID.fetch_add(1, Ordering::SeqCst);
	tracing::info!(client_id, "new control connection");

	let (read_half, mut write_half) = stream.into_split();
	let (tx, mut rx) = mpsc::unbounded_channel::<Vec<u8>>();

	let client = Arc::new(SocketClient { mask: Mutex::new(EventMask::EMPTY), closing: AtomicBool::new(false), outbound: tx });
	connections.add(client.clone());

	let writer_task = tokio::spawn(async move {
		while let Some(bytes) = rx.recv().await {
			if write_half.write_all(&bytes).await.is_err() {
				break;
			}
			let _ = write_half.flush().await;
		}
	});

	let mut lines = BufReader::new(read_half).lines();
	loop {
		match lines.next_line().await {
			Ok(Some(line)) => handle_command(&line, &client, &core),
			Ok(None) => break,
			Err(e) => {
				tracing::warn!(client_id, error = %e, "error reading control connection");
				break;
			}
		}
	}

	client.closing.store(true, Ordering::SeqCst);
	connections.remove(&client);
	core.registry.recompute_global_mask();
	drop(client);
	writer_task.abort();
	tracing::info!(client_id, "control connection closed");
}

fn handle_command(line: &str, client: &Arc<SocketClient>, core: &Arc<gossamer_ctl_events::EventCore>) {
	let mut out = Vec::new();
	let trimmed = line.trim_end_matches(['\r', '\n']);
	let mut tokens = trimmed.split_whitespace();

	match tokens.next() {
		Some(cmd) if cmd.eq_ignore_ascii_case("SETEVENTS") => {
			let names: Vec<&str> = tokens.collect();
			match parse_setevents_names(&names) {
				Ok(mask) => {
					core.registry.set_client_mask(client.as_ref(), mask);
					reply::write_final(&mut out, 250, "OK");
				}
				Err(err @ ProtocolError::UnrecognizedEvent(_)) => {
					reply::write_error_reply(&mut out, &err);
				}
				Err(_) => reply::write_final(&mut out, 552, "malformed SETEVENTS"),
			}
		}
		Some(_) => reply::write_final(&mut out, 510, "command not implemented in this demonstration daemon"),
		None => return,
	}

	client.append_outbound(&out);
}
