// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The per-session fold (spec.md §4.H "Per-session fold").
//!
//! Run in the root process after `stop_session`: scan the session
//! directory for every participant's event file, parse each record, and
//! apply the §4.A fold to a per-path accumulator map. A malformed record
//! terminates parsing of *that file* but never aborts the whole fold —
//! this is what makes the collector robust to truncation at a participant
//! crash (spec.md §7 "Event-file parse failure during fold"). The result
//! is independent of file order and of line order within any file prefix
//! (spec.md §8 invariant 5), because `fold` is commutative-in-max for
//! `last_write_time` and monotone in the mode lattice.

use amon_core::AccessRecord;
use std::collections::HashMap;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use crate::error::CollectorError;

/// One process's share of a session's raw events, as a finished fold.
/// Returned by [`fold_file`] so callers (tests, `amon-cli`'s `fold`
/// subcommand) can inspect a single participant's contribution before it
/// is merged into the session-wide map.
pub type PathRecordMap = HashMap<PathBuf, AccessRecord>;

/// Fold every `Events_*.log` file in `session_directory` into one
/// session-wide map. Missing or unreadable files are reported as an error
/// only when the directory itself cannot be listed; a single unreadable
/// event file is logged and skipped, since by the time `stop_session`
/// calls this every participant that could write one has already exited
/// (spec.md §5 "stop_session waits for all participant processes to exit
/// before folding event files").
pub fn fold_session(session_directory: &Path) -> Result<PathRecordMap, CollectorError> {
    let mut combined = PathRecordMap::new();
    let entries = match std::fs::read_dir(session_directory) {
        Ok(entries) => entries,
        Err(source) => {
            return Err(CollectorError::SessionDirectoryUnreadable {
                path: session_directory.display().to_string(),
                source,
            })
        }
    };

    let mut event_files: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| is_event_file(path))
        .collect();
    // Deterministic order is not required by the contract (the fold is
    // order-insensitive), but a stable sort makes failures reproducible.
    event_files.sort();

    for path in event_files {
        match fold_file(&path) {
            Ok(per_file) => merge_into(&mut combined, per_file),
            Err(error) => {
                tracing::debug!(path = %path.display(), %error, "event file unreadable; skipping");
            }
        }
    }

    Ok(combined)
}

fn is_event_file(path: &Path) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .map(|name| name.starts_with("Events_") && name.ends_with(".log"))
        .unwrap_or(false)
}

/// Fold a single event file into a path → record map. Stops at the first
/// line that fails to parse (truncated or malformed) and returns whatever
/// was folded up to that point — never an error for a malformed *line*,
/// only for I/O failure reading the file itself (spec.md §7 "Event-file
/// parse failure during fold").
pub fn fold_file(path: &Path) -> Result<PathRecordMap, CollectorError> {
    let file = std::fs::File::open(path)
        .map_err(|source| CollectorError::EventFileUnreadable { path: path.display().to_string(), source })?;
    let reader = BufReader::new(file);
    let mut map = PathRecordMap::new();

    for line in reader.lines() {
        let Ok(line) = line else { break };
        if line.trim().is_empty() {
            continue;
        }
        match amon_wire::parse_record(&line) {
            Ok(record) => {
                map.entry(record.path.clone())
                    .or_insert_with(AccessRecord::empty)
                    .fold(record.mode, record.time, record.success);
            }
            Err(_) => break,
        }
    }

    Ok(map)
}

fn merge_into(combined: &mut PathRecordMap, per_file: PathRecordMap) {
    for (path, record) in per_file {
        combined.entry(path).or_insert_with(AccessRecord::empty).merge(&record);
    }
}

/// Streaming variant of [`fold_session`]: calls `on_record` once per
/// distinct path, in the order paths first complete across the sorted
/// file list, without ever holding the whole session-wide map — used by
/// `amon-cli`'s `fold` subcommand so a standalone tool can process a
/// session directory left behind by a crashed build without needing a
/// live session (matching `original_source/accessMonitor/test/collectEvents.cpp`'s
/// standalone-tool use of the same fold).
///
/// This still holds one `PathRecordMap` in memory (a path can recur across
/// files, so a record can't be finalized until every file has been read),
/// but avoids the caller building a second copy of it just to iterate.
pub fn fold_streaming(
    session_directory: &Path,
    mut on_record: impl FnMut(&Path, &AccessRecord),
) -> Result<(), CollectorError> {
    let map = fold_session(session_directory)?;
    let mut paths: Vec<&PathBuf> = map.keys().collect();
    paths.sort();
    for path in paths {
        on_record(path, &map[path]);
    }
    Ok(())
}
