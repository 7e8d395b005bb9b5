//! crates/diag/src/state.rs
//! Process-wide diagnostic state: lazy initialization, record gating,
//! last-warning capture, and line emission.

use std::fmt;
use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicU8, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, Once, OnceLock};
use std::thread::JoinHandle;
use std::time::Instant;

use chrono::Local;
use diag_sink::DebugSink;

use crate::config::DiagConfig;
use crate::identity::ProcessIdentity;
use crate::level::LogLevel;
use crate::subsys::Subsys;
use crate::thread_local;

/// Upper bound on one rendered log line, including the trailing newline.
pub const LINE_BUF_LEN: usize = 2048;
/// Upper bound on the retained last-warning text.
pub const LAST_WARNING_LEN: usize = 1024;

/// All mutable diagnostic state of one process.
///
/// The state moves through `uninitialized → initializing → initialized` and
/// never resets. A [`Once`] guards the transition, so configuration is parsed
/// exactly once no matter how many threads race into the first log call; the
/// configured level is additionally published through a release-ordered
/// atomic so the hot-path filter never takes a lock. Identity strings use
/// snapshot semantics: reconfiguration swaps an [`Arc`] under the mutex and
/// emission clones it, formatting lock-free.
///
/// The host runtime talks to a single `static` instance through the
/// free functions in the crate root ([`log`](crate::log()),
/// [`last_warning`](crate::last_warning()), ...). Tests and embedding hosts
/// can run isolated instances with an explicit config and an in-memory sink:
///
/// ```
/// use diag::{DebugSink, DiagConfig, DiagnosticState, LogLevel, Subsys};
///
/// let state = DiagnosticState::new();
/// let config = DiagConfig {
///     level: LogLevel::Info,
///     ..DiagConfig::default()
/// };
/// state.initialize_with(config, DebugSink::memory());
///
/// state.log(LogLevel::Info, Subsys::INIT, "example.rs", 7, format_args!("ready"));
///
/// let captured = state.sink().and_then(DebugSink::captured).unwrap();
/// let line = String::from_utf8(captured).unwrap();
/// assert!(line.contains("MESH INFO ready"));
/// assert!(line.ends_with('\n'));
/// ```
pub struct DiagnosticState {
    init: Once,
    level: AtomicU8,
    mask: AtomicU64,
    warn_sets_debug_info: AtomicBool,
    thread_names: AtomicBool,
    shared: Mutex<Shared>,
    sink: OnceLock<DebugSink>,
    epoch: OnceLock<Instant>,
}

struct Shared {
    identity: Option<Arc<ProcessIdentity>>,
    last_warning: String,
}

impl DiagnosticState {
    /// Creates an uninitialized state.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            init: Once::new(),
            level: AtomicU8::new(LogLevel::None as u8),
            mask: AtomicU64::new(Subsys::DEFAULT.bits()),
            warn_sets_debug_info: AtomicBool::new(false),
            thread_names: AtomicBool::new(false),
            shared: Mutex::new(Shared {
                identity: None,
                last_warning: String::new(),
            }),
            sink: OnceLock::new(),
            epoch: OnceLock::new(),
        }
    }

    /// Initializes from the process environment; a no-op after the first run.
    ///
    /// Reads the `MESH_DEBUG*` variables, captures the process identity and
    /// the trace epoch, and opens the file sink when one is configured. A
    /// file that cannot be opened leaves the default stdout sink in place.
    pub fn initialize(&self) {
        self.init.call_once(|| {
            let config = DiagConfig::from_env();
            let identity = ensure_identity(&self.shared);
            let sink = identity
                .as_deref()
                .and_then(|id| config.resolved_file_path(id.hostname(), id.pid()))
                .and_then(|path| DebugSink::open_file(Path::new(&path)).ok())
                .unwrap_or_default();
            self.apply(&config, sink);
        });
    }

    /// Initializes with an explicit configuration and sink; a no-op after the
    /// first run.
    ///
    /// This bypasses the environment entirely, which keeps tests and
    /// embedding hosts deterministic.
    pub fn initialize_with(&self, config: DiagConfig, sink: DebugSink) {
        self.init.call_once(|| {
            ensure_identity(&self.shared);
            self.apply(&config, sink);
        });
    }

    fn apply(&self, config: &DiagConfig, sink: DebugSink) {
        let _ = self.sink.set(sink);
        let _ = self.epoch.set(Instant::now());
        self.mask.store(config.mask.bits(), Ordering::Relaxed);
        self.warn_sets_debug_info
            .store(config.warn_sets_debug_info, Ordering::Relaxed);
        self.thread_names
            .store(config.set_thread_name, Ordering::Relaxed);
        // The level is published last: a reader that passes the filter with
        // an acquire load observes every store above.
        self.level.store(config.level as u8, Ordering::Release);
    }

    /// Whether initialization has completed.
    #[must_use]
    pub fn initialized(&self) -> bool {
        self.init.is_completed()
    }

    /// Currently configured verbosity level.
    #[must_use]
    pub fn level(&self) -> LogLevel {
        LogLevel::from_repr(self.level.load(Ordering::Acquire))
    }

    /// Currently configured subsystem mask.
    #[must_use]
    pub fn mask(&self) -> Subsys {
        Subsys::from_bits(self.mask.load(Ordering::Relaxed))
    }

    /// The active sink, once initialized.
    #[must_use]
    pub fn sink(&self) -> Option<&DebugSink> {
        self.sink.get()
    }

    /// Sets the rank/peer-count display strings.
    ///
    /// Expected once per process, shortly after the launcher assigns ranks.
    /// The swap is atomic with respect to concurrent emission: in-flight
    /// records keep the snapshot they already cloned.
    pub fn set_distributor_params(&self, rank: i32, peer_count: i32) {
        if let Ok(mut shared) = self.shared.lock() {
            let base = shared
                .identity
                .clone()
                .unwrap_or_else(|| Arc::new(ProcessIdentity::capture()));
            shared.identity = Some(Arc::new(base.with_distributor_params(rank, peer_count)));
        }
    }

    /// Most recently attempted warning text, empty before the first warning.
    #[must_use]
    pub fn last_warning(&self) -> String {
        self.shared
            .lock()
            .map(|shared| shared.last_warning.clone())
            .unwrap_or_default()
    }

    /// Core emission entry point.
    ///
    /// Never fails and never panics on the caller's behalf; ineligible
    /// records are dropped silently. A WARN record updates the retained
    /// last-warning text even when the filter then drops it.
    pub fn log(
        &self,
        level: LogLevel,
        flags: Subsys,
        filefunc: &str,
        line: u32,
        args: fmt::Arguments<'_>,
    ) {
        self.initialize();

        let (level, flags) = thread_local::remap_suppressed(level, flags);

        let mut message = None;
        if level == LogLevel::Warn {
            let text = args.to_string();
            if let Ok(mut shared) = self.shared.lock() {
                shared.last_warning.clear();
                shared
                    .last_warning
                    .push_str(clamped(&text, LAST_WARNING_LEN - 1));
            }
            message = Some(text);
        }

        if !self.level().enables(level) || !flags.intersects(self.mask()) {
            return;
        }

        // Prime the per-thread id cache while we are already off the fast path.
        let _ = thread_local::os_thread_id();

        let identity = match self.shared.lock() {
            Ok(shared) => shared.identity.clone(),
            Err(_) => None,
        };
        let Some(identity) = identity else {
            return;
        };

        let prefix = self.prefix_for(level, flags, &identity, filefunc, line);
        if prefix.is_empty() {
            return;
        }

        let mut buffer = prefix;
        match message {
            Some(text) => buffer.push_str(&text),
            None => {
                // Writing to a String cannot fail.
                let _ = fmt::Write::write_fmt(&mut buffer, args);
            }
        }
        clamp_line(&mut buffer);
        buffer.push('\n');

        if let Some(sink) = self.sink.get() {
            sink.write_line(buffer.as_bytes());
        }
    }

    fn prefix_for(
        &self,
        level: LogLevel,
        flags: Subsys,
        identity: &ProcessIdentity,
        filefunc: &str,
        line: u32,
    ) -> String {
        match level {
            LogLevel::Warn => {
                let prefix = format!(
                    "[{}/{}][{}] [{}:{}] [{}:pid={}] MESH WARN ",
                    identity.rank(),
                    identity.peer_count(),
                    local_now(),
                    filefunc,
                    line,
                    identity.hostname(),
                    identity.pid(),
                );
                if self.warn_sets_debug_info.load(Ordering::Relaxed) {
                    // Irreversible ratchet: once a warning is emitted, keep
                    // INFO output flowing for the rest of the process.
                    self.level.store(LogLevel::Info as u8, Ordering::Relaxed);
                }
                prefix
            }
            LogLevel::Info => format!(
                "[{}/{}][{}] [{}:{}] [{}:pid={}] MESH INFO ",
                identity.rank(),
                identity.peer_count(),
                local_now(),
                filefunc,
                line,
                identity.hostname(),
                identity.pid(),
            ),
            LogLevel::Trace if flags == Subsys::CALL => format!(
                "[{}:pid={}] MESH CALL ",
                identity.hostname(),
                identity.pid(),
            ),
            LogLevel::Trace => {
                let elapsed_ms = self
                    .epoch
                    .get()
                    .map(|epoch| epoch.elapsed().as_secs_f64() * 1000.0)
                    .unwrap_or_default();
                format!(
                    "[{}:pid={}] {:.6} {}:{} MESH TRACE ",
                    identity.hostname(),
                    identity.pid(),
                    elapsed_ms,
                    filefunc,
                    line,
                )
            }
            // VERSION and ABORT records carry no formatter of their own.
            _ => String::new(),
        }
    }

    /// Applies an OS-visible name to `handle`'s thread when enabled.
    ///
    /// Gated on `MESH_SET_THREAD_NAME`; best-effort and silent either way.
    pub fn set_thread_name<T>(&self, handle: &JoinHandle<T>, args: fmt::Arguments<'_>) {
        self.initialize();
        if !self.thread_names.load(Ordering::Relaxed) {
            return;
        }
        diag_sink::name_thread(handle, &args.to_string());
    }

    /// Applies an OS-visible name to the calling thread when enabled.
    pub fn set_current_thread_name(&self, args: fmt::Arguments<'_>) {
        self.initialize();
        if !self.thread_names.load(Ordering::Relaxed) {
            return;
        }
        diag_sink::name_current_thread(&args.to_string());
    }
}

impl Default for DiagnosticState {
    fn default() -> Self {
        Self::new()
    }
}

fn ensure_identity(shared: &Mutex<Shared>) -> Option<Arc<ProcessIdentity>> {
    let mut shared = shared.lock().ok()?;
    if shared.identity.is_none() {
        shared.identity = Some(Arc::new(ProcessIdentity::capture()));
    }
    shared.identity.clone()
}

fn local_now() -> String {
    Local::now().format("%F %T,%3f").to_string()
}

/// Longest prefix of `text` that fits `max` bytes on a char boundary.
fn clamped(text: &str, max: usize) -> &str {
    if text.len() <= max {
        return text;
    }
    let mut end = max;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    &text[..end]
}

/// Clamps an assembled line so the trailing newline keeps the full line
/// within [`LINE_BUF_LEN`] bytes. Overflow content is dropped, not rejected.
fn clamp_line(buffer: &mut String) {
    if buffer.len() > LINE_BUF_LEN - 1 {
        let mut end = LINE_BUF_LEN - 1;
        while !buffer.is_char_boundary(end) {
            end -= 1;
        }
        buffer.truncate(end);
    }
}
