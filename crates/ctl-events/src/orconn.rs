//! C6: the OR-connection event formatter, a worked example of a producer
//! consuming this crate's dispatcher (§4.6). It owns the single wire-format
//! decision for `ORCONN` events; it does not track OR connections itself —
//! that bookkeeping belongs to the router and is out of scope here.

use std::net::SocketAddr;
use std::sync::Arc;

use gossamer_ctl_proto::EventCode;

use crate::collab::NodeTable;
use crate::core::EventCore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrConnStatus {
	New,
	Launched,
	Connected,
	Failed,
	Closed,
}

impl OrConnStatus {
	fn wire_name(self) -> &'static str {
		match self {
			OrConnStatus::New => "NEW",
			OrConnStatus::Launched => "LAUNCHED",
			OrConnStatus::Connected => "CONNECTED",
			OrConnStatus::Failed => "FAILED",
			OrConnStatus::Closed => "CLOSED",
		}
	}

	/// Whether this status carries a circuit count (`NCIRCS=`), per the
	/// design note resolving the spec's open question: only on the two
	/// statuses where a router would actually have circuits left to report.
	fn carries_ncircs(self) -> bool {
		matches!(self, OrConnStatus::Failed | OrConnStatus::Closed)
	}
}

/// Numeric OR-connection teardown reason codes, as the router's connection
/// layer hands them to this producer, mirroring the internal
/// `END_OR_CONN_REASON_*` enumeration. [`OrConnReason::wire_text`] turns one
/// into the short `REASON=` text a control client expects — the
/// `END_OR_CONN_REASON_` prefix stripped (§8 scenario 4:
/// `END_OR_CONN_REASON_TIMEOUT` in, `TIMEOUT` out).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrConnReason {
	Misc,
	Done,
	ConnectRefused,
	Identity,
	ConnectReset,
	Timeout,
	NoRoute,
	IoError,
	ResourceLimit,
	PtMissing,
}

impl OrConnReason {
	fn wire_text(self) -> &'static str {
		match self {
			OrConnReason::Misc => "MISC",
			OrConnReason::Done => "DONE",
			OrConnReason::ConnectRefused => "CONNECTREFUSED",
			OrConnReason::Identity => "IDENTITY",
			OrConnReason::ConnectReset => "CONNECTRESET",
			OrConnReason::Timeout => "TIMEOUT",
			OrConnReason::NoRoute => "NOROUTE",
			OrConnReason::IoError => "IOERROR",
			OrConnReason::ResourceLimit => "RESOURCELIMIT",
			OrConnReason::PtMissing => "PT_MISSING",
		}
	}
}

/// A connection's identity as known to the OR-connection producer.
pub struct OrConnIdentity {
	pub digest: [u8; 20],
	pub addr: SocketAddr,
}

impl OrConnIdentity {
	/// The display name precedence from §4.6: a known nickname, else
	/// `$<hex identity>` if the digest is non-zero, else the bare address.
	fn display_name(&self, node_table: &dyn NodeTable) -> String {
		if let Some(nickname) = node_table.nickname_for(&self.digest) {
			return nickname;
		}
		if self.digest != [0u8; 20] {
			let mut hex = String::with_capacity(41);
			hex.push('$');
			for byte in self.digest {
				hex.push_str(&format!("{byte:02X}"));
			}
			return hex;
		}
		self.addr.to_string()
	}
}

/// Formats and publishes a `650 ORCONN` line, if anything is subscribed
/// to `ORCONN`. `pending_or_attached_circuits` is supplied by the caller,
/// since circuit bookkeeping lives in the router, not here. `reason` is the
/// numeric teardown reason, translated to wire text via
/// [`OrConnReason::wire_text`].
pub fn emit_orconn_event(
	core: &Arc<EventCore>,
	identity: &OrConnIdentity,
	status: OrConnStatus,
	reason: Option<OrConnReason>,
	pending_or_attached_circuits: usize,
	global_id: u64,
) {
	if !core.registry.is_interesting(EventCode::OrConn) {
		return;
	}

	let name = identity.display_name(core.node_table.as_ref());
	let mut line = format!("650 ORCONN {name} {}", status.wire_name());
	if let Some(reason) = reason {
		line.push_str(" REASON=");
		line.push_str(reason.wire_text());
	}
	if status.carries_ncircs() && pending_or_attached_circuits > 0 {
		line.push_str(&format!(" NCIRCS={pending_or_attached_circuits}"));
	}
	line.push_str(&format!(" ID={global_id}"));
	line.push_str("\r\n");

	core.dispatcher.publish(&core.registry, EventCode::OrConn, line.into_bytes());
}
