// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Access mode bit-set and the `None < Read < Write < Delete` lattice.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{BitOr, BitOrAssign};

/// A bit-set over `{Read, Write, Delete}`.
///
/// `AccessMode` is both a set (the bits observed across every access to a
/// path, successful or not — see [`crate::record::AccessRecord::all_modes`])
/// and, through [`AccessMode::dominate`], an element of the strict lattice
/// `None < Read < Write < Delete` used to compute the effective mode of a
/// path. The two uses share one representation because a single bit already
/// *is* the lattice element it stands for; a union of bits is simply the set
/// of lattice elements ever observed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccessMode(u8);

const READ: u8 = 1 << 0;
const WRITE: u8 = 1 << 1;
const DELETE: u8 = 1 << 2;

impl AccessMode {
    pub const NONE: AccessMode = AccessMode(0);
    pub const READ: AccessMode = AccessMode(READ);
    pub const WRITE: AccessMode = AccessMode(WRITE);
    pub const DELETE: AccessMode = AccessMode(DELETE);

    pub const fn empty() -> Self {
        Self::NONE
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub const fn contains(self, other: AccessMode) -> bool {
        self.0 & other.0 == other.0
    }

    pub const fn union(self, other: AccessMode) -> AccessMode {
        AccessMode(self.0 | other.0)
    }

    /// Combine two modes per the lattice: `Delete` dominates `Write`
    /// dominates `Read` dominates `None`.
    pub const fn dominate(self, other: AccessMode) -> AccessMode {
        if self.0 & DELETE != 0 || other.0 & DELETE != 0 {
            AccessMode::DELETE
        } else if self.0 & WRITE != 0 || other.0 & WRITE != 0 {
            AccessMode::WRITE
        } else if self.0 & READ != 0 || other.0 & READ != 0 {
            AccessMode::READ
        } else {
            AccessMode::NONE
        }
    }

    /// Render as the canonical token concatenation (`Read`, `Write`,
    /// `Delete` in that order; empty renders as `None`).
    pub fn to_token_string(self) -> String {
        if self.is_empty() {
            return "None".to_string();
        }
        let mut s = String::new();
        if self.contains(AccessMode::READ) {
            s.push_str("Read");
        }
        if self.contains(AccessMode::WRITE) {
            s.push_str("Write");
        }
        if self.contains(AccessMode::DELETE) {
            s.push_str("Delete");
        }
        s
    }

    /// Parse the canonical token concatenation. Tolerant of an unknown
    /// trailing token: parsing stops at the first token it cannot
    /// recognize rather than failing (spec.md §4.A).
    pub fn from_token_string(s: &str) -> AccessMode {
        if s == "None" {
            return AccessMode::NONE;
        }
        let mut mode = AccessMode::NONE;
        let mut rest = s;
        for (token, bit) in [("Read", READ), ("Write", WRITE), ("Delete", DELETE)] {
            if let Some(stripped) = rest.strip_prefix(token) {
                mode.0 |= bit;
                rest = stripped;
            } else {
                // Tokens after the lattice ordering, or unrecognized trailing
                // garbage, are tolerated: stop here rather than erroring.
                break;
            }
        }
        mode
    }
}

impl BitOr for AccessMode {
    type Output = AccessMode;
    fn bitor(self, rhs: AccessMode) -> AccessMode {
        self.union(rhs)
    }
}

impl BitOrAssign for AccessMode {
    fn bitor_assign(&mut self, rhs: AccessMode) {
        self.0 |= rhs.0;
    }
}

impl fmt::Display for AccessMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_token_string())
    }
}

#[cfg(test)]
#[path = "mode_tests.rs"]
mod tests;
