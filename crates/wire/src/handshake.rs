// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The named-handshake payload a parent publishes for a child to retrieve
//! at monitor-library load time (spec.md §6 "Named handshake").

use amon_core::{LogAspects, SessionId};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Fields the parent stages for the child (spec.md §4.E, §6): `{session_id,
/// log_aspects, session_directory}`. Serialized as JSON and written to the
/// per-handshake-token object named by `HandshakeToken::object_name`; the
/// child retrieves and removes it on monitor-library load.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HandshakePayload {
    pub session_id: SessionId,
    pub log_aspects: LogAspects,
    pub session_directory: PathBuf,
}

impl HandshakePayload {
    pub fn new(session_id: SessionId, log_aspects: LogAspects, session_directory: PathBuf) -> Self {
        Self { session_id, log_aspects, session_directory }
    }

    pub fn to_json(&self) -> Result<String, crate::error::WireError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(s: &str) -> Result<Self, crate::error::WireError> {
        Ok(serde_json::from_str(s)?)
    }
}
