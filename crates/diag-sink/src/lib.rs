#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

//! # Overview
//!
//! `diag-sink` provides the output side of the oc-mesh diagnostic subsystem:
//! the destination stream that receives rendered log lines, capture of the
//! host identity (hostname, pid, OS thread id) that appears in line prefixes,
//! and best-effort OS-visible thread naming.
//!
//! # Design
//!
//! The crate exposes [`DebugSink`], a line-oriented sink over standard output,
//! an unbuffered file, or an in-memory buffer. Each call to
//! [`write_line`](DebugSink::write_line) performs a single write so concurrent
//! callers can interleave only at line granularity, never mid-line. Platform
//! specifics live behind `cfg(unix)` and use `libc` directly rather than
//! pulling in dedicated hostname or thread-naming crates, keeping the
//! dependency graph minimal.
//!
//! # Errors
//!
//! None of the sink operations surface errors to callers: the diagnostic
//! subsystem must never itself fail, so I/O failures are swallowed and thread
//! naming degrades to a no-op on platforms without the capability.

pub mod host;
mod sink;
pub mod thread_name;

pub use sink::DebugSink;
pub use thread_name::{THREAD_NAME_LEN, name_current_thread, name_thread};
