// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The event queue (spec.md §3 "RawEvent", §4.B).
//!
//! Bounded single-process, multi-producer/single-consumer: `push` never
//! blocks on space (dropping events under back-pressure would falsify the
//! access summary, spec.md §9 "Unbounded event queue"), `pop` blocks until
//! an item or the stop sentinel arrives. Built directly on
//! `std::sync::mpsc`, which already satisfies this contract without
//! reaching for an extra channel crate (noted in DESIGN.md).

use amon_core::RawEvent;
use std::sync::mpsc;

/// One item popped off the queue by the drainer (component H): either a
/// raw access event or the distinguished stop sentinel signalling the
/// drainer to flush and exit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueueItem {
    Event(RawEvent),
    Stop,
}

/// The producer half, held by every thread inside the monitored process
/// that may emit an event (i.e. every interceptor replacement body).
/// Cheaply cloneable — `mpsc::Sender` already is.
#[derive(Clone)]
pub struct EventQueue {
    sender: mpsc::Sender<QueueItem>,
}

/// The consumer half, held exclusively by the per-process drainer thread
/// (spec.md §4.B "Concurrency").
pub struct EventQueueReceiver {
    receiver: mpsc::Receiver<QueueItem>,
}

impl EventQueue {
    /// Create a fresh queue. Returns the producer handle and the single
    /// consumer handle; the consumer handle is meant to be moved into the
    /// drainer thread and never cloned.
    pub fn new() -> (EventQueue, EventQueueReceiver) {
        let (sender, receiver) = mpsc::channel();
        (EventQueue { sender }, EventQueueReceiver { receiver })
    }

    /// Push an event. Never blocks: the channel is logically unbounded, so
    /// this only fails if the consumer has already been dropped (the
    /// drainer thread exited), in which case the event is silently
    /// discarded — there is nothing left to observe it, and the session is
    /// already tearing down.
    pub fn push(&self, event: RawEvent) {
        let _ = self.sender.send(QueueItem::Event(event));
    }

    /// Push the stop sentinel. Events pushed before this call are
    /// guaranteed to be popped before the sentinel (`mpsc` preserves FIFO
    /// order per sender; see spec.md §4.B).
    pub fn push_stop(&self) {
        let _ = self.sender.send(QueueItem::Stop);
    }
}

impl EventQueueReceiver {
    /// Block until an item is available. Returns `None` only if every
    /// producer handle has been dropped without a stop sentinel ever being
    /// sent, which should not happen in normal operation but is handled
    /// rather than panicking.
    pub fn pop(&self) -> Option<QueueItem> {
        self.receiver.recv().ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use amon_core::{AccessMode, FileTime};
    use std::thread;

    fn event(n: i64) -> RawEvent {
        RawEvent::new(
            std::path::PathBuf::from(format!("/w/{n}.txt")),
            AccessMode::WRITE,
            FileTime::from_epoch_ms(n),
            true,
        )
    }

    #[test]
    fn events_pushed_before_sentinel_pop_before_it() {
        let (queue, rx) = EventQueue::new();
        queue.push(event(1));
        queue.push(event(2));
        queue.push_stop();

        assert_eq!(rx.pop(), Some(QueueItem::Event(event(1))));
        assert_eq!(rx.pop(), Some(QueueItem::Event(event(2))));
        assert_eq!(rx.pop(), Some(QueueItem::Stop));
    }

    #[test]
    fn pop_blocks_until_pushed_from_another_thread() {
        let (queue, rx) = EventQueue::new();
        let producer = queue.clone();
        let handle = thread::spawn(move || {
            producer.push(event(42));
            producer.push_stop();
        });
        assert_eq!(rx.pop(), Some(QueueItem::Event(event(42))));
        assert_eq!(rx.pop(), Some(QueueItem::Stop));
        handle.join().unwrap();
    }

    #[test]
    fn multiple_producers_all_get_drained() {
        let (queue, rx) = EventQueue::new();
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let producer = queue.clone();
                thread::spawn(move || producer.push(event(i)))
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
        queue.push_stop();

        let mut seen = Vec::new();
        loop {
            match rx.pop() {
                Some(QueueItem::Event(e)) => seen.push(e),
                Some(QueueItem::Stop) => break,
                None => panic!("channel closed before sentinel"),
            }
        }
        assert_eq!(seen.len(), 8);
    }
}
