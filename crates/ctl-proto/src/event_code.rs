//! Event name table: the bijection between the wire-level event name
//! (`ORCONN`, `STATUS_GENERAL`, ...) and the internal code used to index
//! an [`crate::mask::EventMask`].

use std::fmt;

/// One asynchronous event kind a control client can subscribe to.
///
/// Discriminants are plain sequential values, not the historical numbering
/// used by any particular router implementation — nothing outside this
/// crate observes the numeric value directly, only the name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum EventCode {
	Circ = 1,
	Stream = 2,
	OrConn = 3,
	Bw = 4,
	Debug = 5,
	Info = 6,
	Notice = 7,
	Warn = 8,
	Err = 9,
	NewDesc = 10,
	AddrMap = 11,
	DescChanged = 12,
	Ns = 13,
	StatusClient = 14,
	StatusServer = 15,
	StatusGeneral = 16,
	Guard = 17,
	StreamBw = 18,
	ClientsSeen = 19,
	NewConsensus = 20,
	BuildTimeoutSet = 21,
	Signal = 22,
	ConfChanged = 23,
	ConnBw = 24,
	CellStats = 25,
	CircBw = 26,
	TransportLaunched = 27,
	HsDesc = 28,
	HsDescContent = 29,
	NetworkLiveness = 30,
	CircMinor = 31,
}

/// Every event code, in ascending order. Used to iterate the whole table
/// (`GETINFO events/names`, the bitmask's debug dump).
pub const ALL: &[EventCode] = &[
	EventCode::Circ,
	EventCode::Stream,
	EventCode::OrConn,
	EventCode::Bw,
	EventCode::Debug,
	EventCode::Info,
	EventCode::Notice,
	EventCode::Warn,
	EventCode::Err,
	EventCode::NewDesc,
	EventCode::AddrMap,
	EventCode::DescChanged,
	EventCode::Ns,
	EventCode::StatusClient,
	EventCode::StatusServer,
	EventCode::StatusGeneral,
	EventCode::Guard,
	EventCode::StreamBw,
	EventCode::ClientsSeen,
	EventCode::NewConsensus,
	EventCode::BuildTimeoutSet,
	EventCode::Signal,
	EventCode::ConfChanged,
	EventCode::ConnBw,
	EventCode::CellStats,
	EventCode::CircBw,
	EventCode::TransportLaunched,
	EventCode::HsDesc,
	EventCode::HsDescContent,
	EventCode::NetworkLiveness,
	EventCode::CircMinor,
];

/// Event names accepted by `SETEVENTS` for backward compatibility but
/// carrying no event bit of their own; silently dropped after a warning.
const LEGACY_IGNORED_NAMES: &[&str] = &["EXTENDED", "AUTHDIR_NEWDESCS"];

impl EventCode {
	/// Bit position within an [`crate::mask::EventMask`], zero-based.
	pub const fn bit(self) -> u32 {
		self as u32 - 1
	}

	pub const fn name(self) -> &'static str {
		match self {
			EventCode::Circ => "CIRC",
			EventCode::Stream => "STREAM",
			EventCode::OrConn => "ORCONN",
			EventCode::Bw => "BW",
			EventCode::Debug => "DEBUG",
			EventCode::Info => "INFO",
			EventCode::Notice => "NOTICE",
			EventCode::Warn => "WARN",
			EventCode::Err => "ERR",
			EventCode::NewDesc => "NEWDESC",
			EventCode::AddrMap => "ADDRMAP",
			EventCode::DescChanged => "DESCCHANGED",
			EventCode::Ns => "NS",
			EventCode::StatusClient => "STATUS_CLIENT",
			EventCode::StatusServer => "STATUS_SERVER",
			EventCode::StatusGeneral => "STATUS_GENERAL",
			EventCode::Guard => "GUARD",
			EventCode::StreamBw => "STREAM_BW",
			EventCode::ClientsSeen => "CLIENTS_SEEN",
			EventCode::NewConsensus => "NEWCONSENSUS",
			EventCode::BuildTimeoutSet => "BUILDTIMEOUT_SET",
			EventCode::Signal => "SIGNAL",
			EventCode::ConfChanged => "CONF_CHANGED",
			EventCode::ConnBw => "CONN_BW",
			EventCode::CellStats => "CELL_STATS",
			EventCode::CircBw => "CIRC_BW",
			EventCode::TransportLaunched => "TRANSPORT_LAUNCHED",
			EventCode::HsDesc => "HS_DESC",
			EventCode::HsDescContent => "HS_DESC_CONTENT",
			EventCode::NetworkLiveness => "NETWORK_LIVENESS",
			EventCode::CircMinor => "CIRC_MINOR",
		}
	}

	/// Looks up an event by its wire name, case-insensitively.
	pub fn from_name(name: &str) -> Option<EventCode> {
		ALL.iter().copied().find(|c| c.name().eq_ignore_ascii_case(name))
	}
}

impl fmt::Display for EventCode {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.name())
	}
}

/// Parses the space-separated event name list from a `SETEVENTS` command
/// into the mask of codes it names.
///
/// Legacy names kept for backward compatibility are accepted and ignored
/// (logged at `warn`); an unrecognized name fails the whole parse, since a
/// client sending garbage should see a `552` naming exactly what it got
/// wrong rather than a partially-applied subscription.
pub fn parse_setevents_names(tokens: &[&str]) -> Result<super::mask::EventMask, super::error::ProtocolError> {
	let mut mask = super::mask::EventMask::EMPTY;
	for &tok in tokens {
		if let Some(code) = EventCode::from_name(tok) {
			mask.insert(code);
			continue;
		}
		if LEGACY_IGNORED_NAMES.iter().any(|n| n.eq_ignore_ascii_case(tok)) {
			tracing::warn!(name = tok, "ignoring legacy SETEVENTS name");
			continue;
		}
		return Err(super::error::ProtocolError::UnrecognizedEvent(tok.to_string()));
	}
	Ok(mask)
}
