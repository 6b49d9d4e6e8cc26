//! C1: the escaped-data (dot-stuffed) line-oriented codec used for any
//! multi-line payload on the control channel (a data reply body, a
//! multi-line event argument).

/// Upper bound on input length accepted by [`write_escaped`]. Dot-stuffing
/// and CRLF promotion can at most triple a pathological all-dot, bare-LF
/// input; staying well under that against `usize::MAX` keeps the output
/// length computation from ever overflowing.
const MAX_SAFE_LEN: usize = usize::MAX / 4;

/// Encodes `data` as a dot-stuffed, CRLF-terminated block, including the
/// trailing `.\r\n` terminator line.
///
/// Bare `\n` is promoted to `\r\n`. Any line beginning with `.` has that
/// leading byte doubled. The result always ends with the terminator, even
/// if `data` is empty.
///
/// This never fails. An absurdly large `data` (a bug upstream, not a
/// reachable client input) is reported via `tracing::error!` and encoded
/// as an empty body rather than risking an overflowing length computation.
pub fn write_escaped(data: &[u8]) -> Vec<u8> {
	if data.len() > MAX_SAFE_LEN {
		tracing::error!(bug = true, len = data.len(), "escaped write input exceeds safe length, emitting empty body");
		return b".\r\n".to_vec();
	}

	let mut out = Vec::with_capacity(data.len() + data.len() / 40 + 3);
	let mut at_line_start = true;
	let mut prev: Option<u8> = None;

	for &b in data {
		if b == b'\n' {
			if prev != Some(b'\r') {
				out.push(b'\r');
			}
			out.push(b'\n');
			at_line_start = true;
			prev = Some(b'\n');
			continue;
		}
		if at_line_start && b == b'.' {
			out.push(b'.');
		}
		out.push(b);
		at_line_start = false;
		prev = Some(b);
	}

	if !out.ends_with(b"\r\n") {
		out.extend_from_slice(b"\r\n");
	}
	out.extend_from_slice(b".\r\n");
	out
}

/// Decodes a dot-stuffed block, stopping at (and not including) the first
/// terminator line (a line consisting of exactly one `.`). CRLF is
/// normalized to `\n` in the output.
///
/// Never fails: truncated input with no terminator is decoded up to
/// whatever was given, matching the "well-defined output on truncated
/// input" contract — there is no partial-line ambiguity to report back.
pub fn read_escaped(input: &[u8]) -> Vec<u8> {
	let mut out = Vec::with_capacity(input.len());
	let mut i = 0usize;

	while i < input.len() {
		let rel_nl = input[i..].iter().position(|&b| b == b'\n');
		let Some(rel_nl) = rel_nl else {
			// Trailing partial line with no terminator; copy verbatim less
			// any dot-stuffing and stop.
			let line = &input[i..];
			if line != b"." {
				if line.first() == Some(&b'.') {
					out.extend_from_slice(&line[1..]);
				} else {
					out.extend_from_slice(line);
				}
			}
			break;
		};
		let abs_nl = i + rel_nl;
		let line_end = if abs_nl > i && input[abs_nl - 1] == b'\r' { abs_nl - 1 } else { abs_nl };
		let line = &input[i..line_end];

		if line == b"." {
			break;
		}
		if line.first() == Some(&b'.') {
			out.extend_from_slice(&line[1..]);
		} else {
			out.extend_from_slice(line);
		}
		out.push(b'\n');
		i = abs_nl + 1;
	}

	out
}
