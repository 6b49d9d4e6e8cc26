//! C2: numbered control-reply line formatting.
//!
//! A reply to a command, or an asynchronous event push, is always one of
//! three line shapes: a final line (` `), a continuation line (`-`), or
//! the introduction of a following data block (`+`). This module only
//! formats bytes; it never touches a socket.

use std::fmt;

use crate::error::ProtocolError;
use crate::escape::write_escaped;

fn push_line(out: &mut Vec<u8>, code: u16, sep: u8, text: &str) {
	out.extend_from_slice(format!("{code:03}").as_bytes());
	out.push(sep);
	out.extend_from_slice(text.as_bytes());
	out.extend_from_slice(b"\r\n");
}

/// Writes a final reply line: `"%03d %s\r\n"`. This ends a reply; no more
/// lines with this status code follow.
pub fn write_final(out: &mut Vec<u8>, code: u16, text: &str) {
	push_line(out, code, b' ', text);
}

/// `write_final`, but the text is produced from a [`fmt::Arguments`],
/// avoiding an intermediate `String` at call sites that already have one.
pub fn write_final_fmt(out: &mut Vec<u8>, code: u16, args: fmt::Arguments<'_>) {
	write_final(out, code, &args.to_string());
}

/// Writes a continuation reply line: `"%03d-%s\r\n"`. More lines with the
/// same logical reply follow.
pub fn write_continuation(out: &mut Vec<u8>, code: u16, text: &str) {
	push_line(out, code, b'-', text);
}

pub fn write_continuation_fmt(out: &mut Vec<u8>, code: u16, args: fmt::Arguments<'_>) {
	write_continuation(out, code, &args.to_string());
}

/// Writes the introduction line of a data reply: `"%03d+%s\r\n"`. The
/// dot-stuffed body follows separately (see [`write_data_reply`]).
pub fn write_data_intro(out: &mut Vec<u8>, code: u16, text: &str) {
	push_line(out, code, b'+', text);
}

pub fn write_data_intro_fmt(out: &mut Vec<u8>, code: u16, args: fmt::Arguments<'_>) {
	write_data_intro(out, code, &args.to_string());
}

/// Writes a complete data reply: the `+` introduction line followed by
/// `data` run through the escaped-data codec (dot-stuffed, terminated).
pub fn write_data_reply(out: &mut Vec<u8>, code: u16, text: &str, data: &[u8]) {
	write_data_intro(out, code, text);
	out.extend_from_slice(&write_escaped(data));
}

/// Writes the standard `552` error reply for a [`ProtocolError`].
pub fn write_error_reply(out: &mut Vec<u8>, err: &ProtocolError) {
	write_final(out, 552, &err.reply_text());
}
