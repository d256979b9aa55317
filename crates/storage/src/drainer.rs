// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The per-process drainer thread (spec.md §4.H "Per-process drainer").
//!
//! One dedicated thread per monitored process, started at monitor
//! installation: it blocks on [`amon_engine::EventQueueReceiver::pop`], and
//! for each event appends a canonical text record to this process's event
//! file. On the stop sentinel it flushes and exits. Write failures are
//! recorded once under the debug aspect and otherwise swallowed — spec.md
//! §7 "Event-file write failure" — because losing the drainer mid-session
//! would silently drop every access after the failure, which is strictly
//! worse than one missing record.

use amon_engine::{EventQueueReceiver, QueueItem};
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Runs to completion on the calling thread; callers spawn it on a
/// dedicated `std::thread` (spec.md §5 "Scheduling model": "the drainer is
/// an additional dedicated thread per monitored process").
pub fn run(receiver: EventQueueReceiver, event_file_path: PathBuf) {
    let file = match open_event_file(&event_file_path) {
        Ok(file) => file,
        Err(error) => {
            tracing::debug!(path = %event_file_path.display(), %error, "failed to open event file; drainer exits without writing");
            drain_without_writing(&receiver);
            return;
        }
    };
    let mut writer = BufWriter::new(file);
    let mut write_failure_logged = false;

    loop {
        match receiver.pop() {
            Some(QueueItem::Event(event)) => {
                let line = amon_wire::format_record(&event.path, event.mode, event.time, event.success);
                if let Err(error) = writeln!(writer, "{line}") {
                    if !write_failure_logged {
                        tracing::debug!(path = %event_file_path.display(), %error, "event-file write failed; continuing");
                        write_failure_logged = true;
                    }
                }
            }
            Some(QueueItem::Stop) | None => {
                let _ = writer.flush();
                return;
            }
        }
    }
}

/// Drains and discards every event until the sentinel, used when the event
/// file itself could not be opened — the queue must still be drained so
/// the session's producers never block.
fn drain_without_writing(receiver: &EventQueueReceiver) {
    loop {
        match receiver.pop() {
            Some(QueueItem::Event(_)) => continue,
            Some(QueueItem::Stop) | None => return,
        }
    }
}

fn open_event_file(path: &Path) -> std::io::Result<File> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    OpenOptions::new().create(true).append(true).open(path)
}
