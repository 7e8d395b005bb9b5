//! crates/diag/src/thread_local.rs
//! Per-thread warning suppression and cached OS thread ids.

use std::cell::Cell;

use crate::level::LogLevel;
use crate::subsys::Subsys;

thread_local! {
    static NO_WARN: Cell<Subsys> = const { Cell::new(Subsys::NONE) };
    static THREAD_ID: Cell<u64> = const { Cell::new(0) };
}

/// Suppresses WARN records on the current thread.
///
/// While suppression is active, a WARN record is rewritten to INFO and its
/// subsystem flags are replaced with `flags`, before the level/mask filter
/// runs. Other threads are unaffected. The rewrite happens ahead of the
/// last-warning capture, so suppressed warnings do not clobber the retained
/// error text either. Call [`allow_warnings`] to restore normal handling, or
/// use [`suppress_warnings_scoped`] for automatic restoration.
pub fn suppress_warnings(flags: Subsys) {
    NO_WARN.with(|cell| cell.set(flags));
}

/// Restores normal WARN handling on the current thread.
pub fn allow_warnings() {
    NO_WARN.with(|cell| cell.set(Subsys::NONE));
}

/// Current suppression flags; [`Subsys::NONE`] means suppression is off.
#[must_use]
pub fn suppressed_flags() -> Subsys {
    NO_WARN.with(Cell::get)
}

/// Suppresses WARN records on the current thread for the guard's lifetime.
#[must_use]
pub fn suppress_warnings_scoped(flags: Subsys) -> WarnSuppressionGuard {
    let previous = NO_WARN.with(|cell| cell.replace(flags));
    WarnSuppressionGuard { previous }
}

/// Restores the previous suppression state when dropped.
#[derive(Debug)]
pub struct WarnSuppressionGuard {
    previous: Subsys,
}

impl Drop for WarnSuppressionGuard {
    fn drop(&mut self) {
        NO_WARN.with(|cell| cell.set(self.previous));
    }
}

pub(crate) fn remap_suppressed(level: LogLevel, flags: Subsys) -> (LogLevel, Subsys) {
    let no_warn = suppressed_flags();
    if level == LogLevel::Warn && no_warn != Subsys::NONE {
        (LogLevel::Info, no_warn)
    } else {
        (level, flags)
    }
}

/// OS thread id of the calling thread, queried once and cached thereafter.
#[must_use]
pub fn os_thread_id() -> u64 {
    THREAD_ID.with(|cell| {
        let cached = cell.get();
        if cached != 0 {
            return cached;
        }
        let id = diag_sink::host::thread_id();
        cell.set(id);
        id
    })
}
