#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

//! # Overview
//!
//! `diag` is the diagnostic subsystem of the mesh collective runtime: a
//! process-wide, lazily configured logging pipeline tuned for distributed
//! jobs. Records carry a severity ([`LogLevel`]) and a subsystem bitmask
//! ([`Subsys`]); operators select what reaches the sink with the
//! `MESH_DEBUG` and `MESH_DEBUG_SUBSYS` environment variables, and optionally
//! redirect output to a per-host file via `MESH_DEBUG_FILE`.
//!
//! # Design
//!
//! Configuration is read exactly once, on the first log call from any
//! thread; there is no explicit init requirement and no reset. The hot path
//! is a pair of atomic loads (level, mask) before any lock or allocation, so
//! disabled logging stays cheap in code that runs per collective operation.
//! Identity strings (hostname, pid, zero-padded rank) live behind an
//! [`Arc`](std::sync::Arc) snapshot that emission clones without holding a
//! lock across formatting. The sink side (stdout, file, or an in-memory
//! capture buffer) lives in the companion `diag-sink` crate.
//!
//! Most call sites use the [`warn_log!`], [`info_log!`], and [`trace_log!`]
//! macros, which capture file and line and route through the process-wide
//! state. Tests and embedding hosts can run isolated [`DiagnosticState`]
//! instances instead.
//!
//! # Invariants
//!
//! - A record is emitted only when its level is enabled and its subsystem
//!   bits intersect the configured mask.
//! - Every emitted line is newline-terminated and at most 2048 bytes.
//! - A WARN record updates [`last_warning`] even when filters drop it.
//! - Thread-local suppression ([`suppress_warnings`]) downgrades WARN to
//!   INFO on the calling thread only.
//!
//! # Errors
//!
//! The pipeline never fails outward: malformed environment values degrade to
//! defaults, an unopenable log file falls back to stdout, and sink write
//! errors are swallowed. Logging is best-effort by contract.
//!
//! # Examples
//!
//! ```
//! use diag::{DebugSink, DiagConfig, DiagnosticState, LogLevel, Subsys};
//!
//! let state = DiagnosticState::new();
//! let config = DiagConfig {
//!     level: LogLevel::Info,
//!     mask: Subsys::INIT | Subsys::NET,
//!     ..DiagConfig::default()
//! };
//! state.initialize_with(config, DebugSink::memory());
//!
//! state.log(LogLevel::Info, Subsys::NET, "net.rs", 33, format_args!("link up"));
//! state.log(LogLevel::Info, Subsys::COLL, "coll.rs", 7, format_args!("masked out"));
//!
//! let output = String::from_utf8(state.sink().and_then(DebugSink::captured).unwrap()).unwrap();
//! assert!(output.contains("MESH INFO link up"));
//! assert!(!output.contains("masked out"));
//! ```

mod config;
mod identity;
mod level;
mod macros;
mod state;
mod subsys;
mod thread_local;

#[cfg(feature = "tracing")]
pub mod tracing_bridge;

use std::fmt;
use std::thread::JoinHandle;

pub use diag_sink::{DebugSink, THREAD_NAME_LEN};

pub use crate::config::{
    DiagConfig, ENV_FILE, ENV_LEVEL, ENV_SET_THREAD_NAME, ENV_SUBSYS, ENV_WARN_SETS_DEBUG_INFO,
    MAX_FILE_PATH, expand_file_template,
};
pub use crate::identity::ProcessIdentity;
pub use crate::level::LogLevel;
pub use crate::state::{DiagnosticState, LAST_WARNING_LEN, LINE_BUF_LEN};
pub use crate::subsys::Subsys;
pub use crate::thread_local::{
    WarnSuppressionGuard, allow_warnings, suppress_warnings, suppress_warnings_scoped,
    suppressed_flags,
};

static STATE: DiagnosticState = DiagnosticState::new();

/// Forces configuration to load now instead of on the first log call.
///
/// Optional; every entry point below initializes lazily on its own.
pub fn init() {
    STATE.initialize();
}

/// Routes one record through the process-wide state.
///
/// Call sites normally go through [`warn_log!`], [`info_log!`], or
/// [`trace_log!`], which fill in the file/line arguments.
pub fn log(level: LogLevel, flags: Subsys, filefunc: &str, line: u32, args: fmt::Arguments<'_>) {
    STATE.log(level, flags, filefunc, line, args);
}

/// Whether a record at `level` with `flags` would currently be emitted.
///
/// Lets callers skip expensive argument formatting when the answer is no.
#[must_use]
pub fn enabled(level: LogLevel, flags: Subsys) -> bool {
    STATE.initialize();
    STATE.level().enables(level) && flags.intersects(STATE.mask())
}

/// Most recently attempted warning text, empty before the first warning.
///
/// Abort paths fold this into their error report so the proximate cause
/// survives even when the warning itself was filtered from the sink.
#[must_use]
pub fn last_warning() -> String {
    STATE.last_warning()
}

/// Publishes the process rank and peer count for log prefixes.
///
/// Expected once, shortly after the launcher assigns ranks; until then
/// prefixes show `[?/?]`.
pub fn set_distributor_params(rank: i32, peer_count: i32) {
    STATE.initialize();
    STATE.set_distributor_params(rank, peer_count);
}

/// Names a spawned thread at the OS level, when `MESH_SET_THREAD_NAME` is on.
pub fn set_thread_name<T>(handle: &JoinHandle<T>, args: fmt::Arguments<'_>) {
    STATE.set_thread_name(handle, args);
}

/// Names the calling thread at the OS level, when `MESH_SET_THREAD_NAME` is on.
pub fn set_current_thread_name(args: fmt::Arguments<'_>) {
    STATE.set_current_thread_name(args);
}
