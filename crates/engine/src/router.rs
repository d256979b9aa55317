// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Routes a raw event to the event queue of the session it belongs to.
//!
//! A `Session` exclusively owns its event queue (spec.md §3 "Ownership");
//! interceptor replacement bodies, however, only know the calling thread's
//! `current_session()` id, not a queue handle. `EventRouter` is the
//! process-wide table that closes that gap — it is deliberately *not* part
//! of [`crate::session_registry::SessionRegistry`] itself, since the
//! registry owns session identity/lifecycle while this only owns where a
//! session's events currently go, letting `amon-storage` register and
//! deregister a queue around exactly the span it is draining it.

use crate::queue::EventQueue;
use amon_core::{RawEvent, SessionId};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::OnceLock;

#[derive(Default)]
pub struct EventRouter {
    queues: Mutex<HashMap<SessionId, EventQueue>>,
}

impl EventRouter {
    pub fn global() -> &'static EventRouter {
        static ROUTER: OnceLock<EventRouter> = OnceLock::new();
        ROUTER.get_or_init(EventRouter::default)
    }

    /// Register the producer handle for a session's queue. Called once by
    /// the collector when it starts draining a session.
    pub fn register(&self, id: SessionId, queue: EventQueue) {
        self.queues.lock().insert(id, queue);
    }

    /// Deregister a session's queue. Called after the stop sentinel has
    /// been drained and the session is tearing down.
    pub fn unregister(&self, id: SessionId) {
        self.queues.lock().remove(&id);
    }

    /// Push an event to the named session's queue, if it still has one
    /// registered in this process. Silently dropped otherwise — there is
    /// no session left in this process to attribute it to.
    pub fn push(&self, id: SessionId, event: RawEvent) {
        if let Some(queue) = self.queues.lock().get(&id) {
            queue.push(event);
        }
    }

    pub fn push_stop(&self, id: SessionId) {
        if let Some(queue) = self.queues.lock().get(&id) {
            queue.push_stop();
        }
    }

    pub fn is_registered(&self, id: SessionId) -> bool {
        self.queues.lock().contains_key(&id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use amon_core::{AccessMode, FileTime};

    #[test]
    fn push_routes_to_registered_session_only() {
        let router = EventRouter::default();
        let (queue_a, rx_a) = EventQueue::new();
        let (queue_b, rx_b) = EventQueue::new();
        router.register(SessionId::new(1), queue_a);
        router.register(SessionId::new(2), queue_b);

        let event = RawEvent::new(
            std::path::PathBuf::from("/w/a.txt"),
            AccessMode::WRITE,
            FileTime::from_epoch_ms(0),
            true,
        );
        router.push(SessionId::new(1), event.clone());
        router.push_stop(SessionId::new(1));
        router.push_stop(SessionId::new(2));

        assert_eq!(rx_a.pop(), Some(crate::queue::QueueItem::Event(event)));
        assert_eq!(rx_a.pop(), Some(crate::queue::QueueItem::Stop));
        assert_eq!(rx_b.pop(), Some(crate::queue::QueueItem::Stop));
    }

    #[test]
    fn push_to_unregistered_session_is_a_noop() {
        let router = EventRouter::default();
        let event = RawEvent::new(
            std::path::PathBuf::from("/w/a.txt"),
            AccessMode::READ,
            FileTime::from_epoch_ms(0),
            true,
        );
        router.push(SessionId::new(42), event);
        assert!(!router.is_registered(SessionId::new(42)));
    }
}
