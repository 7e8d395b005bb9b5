//! crates/diag/src/level.rs
//! Ordered verbosity levels for the diagnostic subsystem.

use std::fmt;

/// Verbosity threshold controlling which record severities are emitted.
///
/// Levels are ordered; a record is eligible only when the configured level is
/// at or above the record's level (see [`enables`](Self::enables)). The
/// numeric representation is stable because the process-wide state stores the
/// configured level in an atomic.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum LogLevel {
    /// Logging disabled; no record passes the filter.
    None = 0,
    /// Version banners only.
    Version = 1,
    /// Warnings about unexpected but survivable conditions.
    Warn = 2,
    /// General progress and configuration output.
    Info = 3,
    /// Conditions that precede a runtime abort.
    Abort = 4,
    /// High-volume tracing, including call tracing.
    Trace = 5,
}

impl LogLevel {
    /// Parses the `MESH_DEBUG` level name.
    ///
    /// Matching is case-insensitive and exact; an absent or unrecognized name
    /// disables logging rather than erroring, so a typo in the environment can
    /// never take the host runtime down.
    #[must_use]
    pub fn from_env_name(name: Option<&str>) -> Self {
        let Some(name) = name else {
            return Self::None;
        };
        if name.eq_ignore_ascii_case("VERSION") {
            Self::Version
        } else if name.eq_ignore_ascii_case("WARN") {
            Self::Warn
        } else if name.eq_ignore_ascii_case("INFO") {
            Self::Info
        } else if name.eq_ignore_ascii_case("ABORT") {
            Self::Abort
        } else if name.eq_ignore_ascii_case("TRACE") {
            Self::Trace
        } else {
            Self::None
        }
    }

    /// Returns the level name as it appears in `MESH_DEBUG`.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::None => "NONE",
            Self::Version => "VERSION",
            Self::Warn => "WARN",
            Self::Info => "INFO",
            Self::Abort => "ABORT",
            Self::Trace => "TRACE",
        }
    }

    /// Whether a configured level of `self` lets a record at `record` through.
    #[must_use]
    pub const fn enables(self, record: Self) -> bool {
        self as u8 >= record as u8
    }

    pub(crate) const fn from_repr(value: u8) -> Self {
        match value {
            1 => Self::Version,
            2 => Self::Warn,
            3 => Self::Info,
            4 => Self::Abort,
            5 => Self::Trace,
            _ => Self::None,
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
