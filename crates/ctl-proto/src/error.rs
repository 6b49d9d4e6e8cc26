//! Structured, recoverable protocol-level errors (§7).
//!
//! These never leave a registry or codec call half-applied; they are
//! produced before any state mutation and surfaced to the client as a
//! numbered reply line, never as a panic.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ProtocolError {
	#[error("Unrecognized event \"{0}\"")]
	UnrecognizedEvent(String),

	#[error("expected a quoted string")]
	NotQuoted,

	#[error("quoted string truncated")]
	QuotedTruncated,
}

impl ProtocolError {
	/// The `552` reply line text for this error, as sent on the wire in
	/// response to a malformed `SETEVENTS`/argument.
	pub fn reply_text(&self) -> String {
		self.to_string()
	}
}
