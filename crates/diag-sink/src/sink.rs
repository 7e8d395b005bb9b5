//! crates/diag-sink/src/sink.rs
//! Line-oriented destination stream for rendered diagnostics.

use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::Path;
use std::sync::Mutex;

/// Destination for rendered log lines.
///
/// The default destination is standard output. When a resolvable log-file
/// path is configured the file replaces stdout and is written unbuffered, so
/// every line reaches the OS immediately (a `File` write in Rust carries no
/// userspace buffering; stdout is explicitly flushed per line). The `Memory`
/// variant collects lines in an internal buffer and exists for tests and for
/// embedding hosts that want to inspect diagnostics without touching process
/// stdout.
///
/// # Examples
///
/// ```
/// use diag_sink::DebugSink;
///
/// let sink = DebugSink::memory();
/// sink.write_line(b"MESH INFO ready\n");
/// assert_eq!(sink.captured().unwrap(), b"MESH INFO ready\n".to_vec());
/// ```
#[derive(Debug)]
pub enum DebugSink {
    /// Standard output, flushed after every line.
    Stdout,
    /// A log file written without userspace buffering.
    File(File),
    /// An in-memory capture buffer.
    Memory(Mutex<Vec<u8>>),
}

impl DebugSink {
    /// Returns the default stdout sink.
    #[must_use]
    pub const fn stdout() -> Self {
        Self::Stdout
    }

    /// Returns an in-memory capture sink.
    #[must_use]
    pub const fn memory() -> Self {
        Self::Memory(Mutex::new(Vec::new()))
    }

    /// Opens (creating or truncating) a log file at `path`.
    pub fn open_file(path: &Path) -> io::Result<Self> {
        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(path)?;
        Ok(Self::File(file))
    }

    /// Writes one fully assembled line to the destination.
    ///
    /// The caller supplies the trailing newline; the sink performs exactly one
    /// write call so separate lines can interleave across threads but a single
    /// line never tears. I/O errors are swallowed: the diagnostic subsystem
    /// reports failures for the rest of the runtime and must not fail itself.
    pub fn write_line(&self, bytes: &[u8]) {
        match self {
            Self::Stdout => {
                let mut out = io::stdout().lock();
                let _ = out.write_all(bytes);
                let _ = out.flush();
            }
            Self::File(file) => {
                let mut handle: &File = file;
                let _ = handle.write_all(bytes);
            }
            Self::Memory(buffer) => {
                if let Ok(mut buffer) = buffer.lock() {
                    buffer.extend_from_slice(bytes);
                }
            }
        }
    }

    /// Returns a copy of everything written so far, for `Memory` sinks.
    ///
    /// Returns `None` for the stdout and file variants.
    #[must_use]
    pub fn captured(&self) -> Option<Vec<u8>> {
        match self {
            Self::Memory(buffer) => buffer.lock().ok().map(|buffer| buffer.clone()),
            _ => None,
        }
    }
}

impl Default for DebugSink {
    fn default() -> Self {
        Self::stdout()
    }
}
