// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The per-process event file text format (spec.md §6 "Event file format").
//!
//! One record per line:
//!
//! ```text
//! <absolute-path> [ YYYY-MM-DD HH:MM:SS.ffffffffff ] <mode-tokens> <success-flag>
//! ```
//!
//! `<success-flag>` is `1` or `0`. The bracketed timestamp lets the path
//! component contain spaces (absolute paths legitimately can) without
//! ambiguity: everything before the first `[` is the path, everything
//! between `[` and `]` is the timestamp, and the two tokens after `]` are
//! the mode string and the success flag.

use crate::error::WireError;
use amon_core::{AccessMode, FileTime};
use chrono::{NaiveDateTime, TimeZone, Utc};
use std::path::PathBuf;

/// One record as read back from an event file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedRecord {
    pub path: PathBuf,
    pub mode: AccessMode,
    pub time: FileTime,
    pub success: bool,
}

/// Render one raw event as a line of the event file (no trailing newline;
/// callers append `\n` when writing).
pub fn format_record(path: &std::path::Path, mode: AccessMode, time: FileTime, success: bool) -> String {
    format!(
        "{} [ {} ] {} {}",
        path.display(),
        time,
        mode.to_token_string(),
        if success { 1 } else { 0 }
    )
}

/// Parse one line of an event file.
///
/// Tolerant of nothing beyond the documented shape: a truncated or
/// otherwise malformed line is always an error here. It is the collector's
/// job (spec.md §4.H, §7) to stop folding a file at the first such error
/// rather than abort the whole fold — this function only reports, it does
/// not decide what to do about it.
pub fn parse_record(line: &str) -> Result<ParsedRecord, WireError> {
    let open = line.find('[').ok_or_else(|| WireError::MalformedRecord(line.to_string()))?;
    let close = line.rfind(']').ok_or_else(|| WireError::MalformedRecord(line.to_string()))?;
    if close <= open {
        return Err(WireError::MalformedRecord(line.to_string()));
    }

    let path = line[..open].trim();
    let timestamp = line[open + 1..close].trim();
    let tail = line[close + 1..].trim();

    if path.is_empty() || timestamp.is_empty() {
        return Err(WireError::MalformedRecord(line.to_string()));
    }

    let mut tail_parts = tail.split_whitespace();
    let mode_token = tail_parts.next().ok_or_else(|| WireError::MalformedRecord(line.to_string()))?;
    let success_token = tail_parts.next().ok_or_else(|| WireError::MalformedRecord(line.to_string()))?;
    if tail_parts.next().is_some() {
        return Err(WireError::MalformedRecord(line.to_string()));
    }

    let mode = AccessMode::from_token_string(mode_token);
    let success = match success_token {
        "1" => true,
        "0" => false,
        _ => return Err(WireError::MalformedRecord(line.to_string())),
    };
    let time = parse_timestamp(timestamp)?;

    Ok(ParsedRecord { path: PathBuf::from(path), mode, time, success })
}

fn parse_timestamp(s: &str) -> Result<FileTime, WireError> {
    // "YYYY-MM-DD HH:MM:SS.ffffffffff" — ten fractional digits (100ns
    // ticks, a FILETIME artifact); chrono's finest native resolution is
    // nanoseconds (9 digits), so the trailing digit is always dropped.
    let (whole, frac) = s.split_once('.').ok_or_else(|| WireError::MalformedTimestamp(s.to_string()))?;
    let nanos_str = if frac.len() >= 9 { &frac[..9] } else { frac };
    let padded: String = format!("{nanos_str:0<9}");
    let naive = NaiveDateTime::parse_from_str(
        &format!("{whole}.{padded}"),
        "%Y-%m-%d %H:%M:%S%.f",
    )
    .map_err(|_| WireError::MalformedTimestamp(s.to_string()))?;
    Ok(FileTime::from_utc(Utc.from_utc_datetime(&naive)))
}
