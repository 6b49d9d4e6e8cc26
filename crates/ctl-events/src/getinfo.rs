//! `GETINFO`-style string helpers (§9 design note). Deliberately minimal:
//! the design note explicitly says not to invent further surface here.

use gossamer_ctl_proto::event_code::ALL;

/// The space-separated list of every event name this core knows about,
/// for `GETINFO events/names`.
pub fn events_list() -> String {
	ALL.iter().map(|c| c.name()).collect::<Vec<_>>().join(" ")
}

/// Formats a `GETINFO orconn-status` body: one `<name> <state>` line per
/// entry, CRLF-separated. Connection bookkeeping lives in the router; this
/// only formats whatever `(name, state)` pairs the caller already has.
pub fn orconn_status<'a>(statuses: impl Iterator<Item = (&'a str, &'a str)>) -> String {
	statuses.map(|(name, state)| format!("{name} {state}")).collect::<Vec<_>>().join("\r\n")
}
