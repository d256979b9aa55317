// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Diagnostic log aspect bit-set (spec.md §6 "Diagnostic log aspects").

use serde::{Deserialize, Serialize};
use std::fmt;

/// Bit-set selecting which debug categories a session's debug log records.
/// The event log (spec.md §6 "Event file format") is unconditional and not
/// gated by any aspect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LogAspects(u16);

macro_rules! aspects {
    ($($name:ident = $bit:expr => $token:literal),* $(,)?) => {
        impl LogAspects {
            pub const NONE: LogAspects = LogAspects(0);
            $(pub const $name: LogAspects = LogAspects(1 << $bit);)*

            pub fn contains(self, other: LogAspects) -> bool {
                self.0 & other.0 == other.0
            }

            pub fn union(self, other: LogAspects) -> LogAspects {
                LogAspects(self.0 | other.0)
            }

            /// Parse a comma-separated list of aspect names, as found in
            /// `AMON_LOG_ASPECTS` (SPEC_FULL.md §6.3). Unknown names are
            /// ignored rather than rejected, matching the tolerant parsing
            /// policy spec.md §4.A applies to mode tokens.
            pub fn from_names(names: &str) -> LogAspects {
                let mut aspects = LogAspects::NONE;
                for name in names.split(',').map(str::trim).filter(|s| !s.is_empty()) {
                    $(if name.eq_ignore_ascii_case($token) {
                        aspects = aspects.union(LogAspects::$name);
                        continue;
                    })*
                }
                aspects
            }

            fn names(self) -> Vec<&'static str> {
                let mut names = Vec::new();
                $(if self.contains(LogAspects::$name) {
                    names.push($token);
                })*
                names
            }
        }
    };
}

aspects! {
    REGISTERED_FUNCTIONS = 0 => "RegisteredFunctions",
    PARSE_LIBRARY = 1 => "ParseLibrary",
    PATCHED_FUNCTION = 2 => "PatchedFunction",
    PATCH_EXECUTION = 3 => "PatchExecution",
    FILE_ACCESSES = 4 => "FileAccesses",
    WRITE_TIME = 5 => "WriteTime",
}

impl fmt::Display for LogAspects {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.names().join(","))
    }
}

#[cfg(test)]
#[path = "aspects_tests.rs"]
mod tests;
