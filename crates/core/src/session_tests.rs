// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use std::path::Path;

#[test]
fn session_directory_names_by_id() {
    let dir = Session::session_directory(Path::new("/tmp/amt"), SessionId::new(1));
    assert_eq!(dir, Path::new("/tmp/amt/AccessMonitorData/Session_1"));
}

#[test]
fn event_file_names_by_pid() {
    let s = Session::new(SessionId::new(1), "/tmp/amt/AccessMonitorData/Session_1", LogAspects::NONE);
    assert_eq!(s.event_file_path(4242), Path::new("/tmp/amt/AccessMonitorData/Session_1/Events_4242.log"));
}

#[test]
fn debug_file_absent_without_aspects() {
    let s = Session::new(SessionId::new(1), "/tmp/amt/AccessMonitorData/Session_1", LogAspects::NONE);
    assert_eq!(s.debug_file_path(4242), None);
}

#[test]
fn debug_file_present_with_aspects() {
    let s = Session::new(
        SessionId::new(1),
        "/tmp/amt/AccessMonitorData/Session_1",
        LogAspects::FILE_ACCESSES,
    );
    assert_eq!(
        s.debug_file_path(4242),
        Some(PathBuf::from("/tmp/amt/AccessMonitorData/Session_1/Debug_4242.log"))
    );
}

#[test]
fn participants_track_join_and_leave() {
    let mut s = Session::new(SessionId::new(1), "/tmp/amt", LogAspects::NONE);
    assert!(s.is_empty());
    s.add_participant(100);
    s.add_participant(200);
    assert!(!s.is_empty());
    s.remove_participant(100);
    assert!(s.participants.contains(&200));
    assert!(!s.participants.contains(&100));
}

#[test]
fn handshake_tokens_differ_by_sequence_even_for_reused_pid() {
    let a = HandshakeToken::new(SessionId::new(1), 4242, 0);
    let b = HandshakeToken::new(SessionId::new(1), 4242, 1);
    assert_ne!(a.object_name(), b.object_name());
}
