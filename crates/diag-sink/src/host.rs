//! crates/diag-sink/src/host.rs
//! Host identity for log prefixes: hostname, process id, OS thread id.
//!
//! Uses libc directly on unix rather than pulling in a hostname crate,
//! keeping the dependency graph minimal. Values are cheap to capture; the
//! policy layer decides when to cache them.

/// Maximum hostname length considered, matching the prefix buffer bound.
pub const HOSTNAME_LEN: usize = 1024;

const FALLBACK_HOSTNAME: &str = "localhost";

/// Returns the short hostname of this machine.
///
/// The name is truncated at the first `.` so prefixes carry the host label
/// rather than the fully qualified domain name, and is bounded at
/// [`HOSTNAME_LEN`] bytes. Falls back to `"localhost"` when the hostname
/// cannot be determined.
#[must_use]
#[cfg(unix)]
pub fn hostname() -> String {
    let mut buffer = [0u8; HOSTNAME_LEN];
    // SAFETY: the buffer is valid for `buffer.len()` writes and gethostname
    // never writes past the supplied length.
    let rc = unsafe { libc::gethostname(buffer.as_mut_ptr().cast::<libc::c_char>(), buffer.len()) };
    if rc != 0 {
        return FALLBACK_HOSTNAME.to_owned();
    }
    // gethostname is not required to NUL-terminate on truncation.
    buffer[HOSTNAME_LEN - 1] = 0;
    let len = buffer.iter().position(|&b| b == 0).unwrap_or(0);
    if len == 0 {
        return FALLBACK_HOSTNAME.to_owned();
    }
    first_label(&String::from_utf8_lossy(&buffer[..len]))
}

/// Returns the short hostname of this machine.
#[must_use]
#[cfg(not(unix))]
pub fn hostname() -> String {
    std::env::var("COMPUTERNAME")
        .map(|name| first_label(&name))
        .unwrap_or_else(|_| FALLBACK_HOSTNAME.to_owned())
}

fn first_label(name: &str) -> String {
    match name.find('.') {
        Some(dot) => name[..dot].to_owned(),
        None => name.to_owned(),
    }
}

/// Returns the process id.
#[must_use]
pub fn pid() -> u32 {
    std::process::id()
}

/// Returns an identifier for the calling OS thread.
///
/// On Linux this is the kernel thread id; on other unix platforms the pthread
/// handle stands in. Returns 0 where no identifier is available. Callers that
/// want a per-thread cache keep one themselves; this function queries the OS
/// every time.
#[must_use]
#[cfg(target_os = "linux")]
pub fn thread_id() -> u64 {
    // SAFETY: gettid has no preconditions and cannot fail.
    let tid = unsafe { libc::gettid() };
    tid as u64
}

/// Returns an identifier for the calling OS thread.
#[must_use]
#[cfg(all(unix, not(target_os = "linux")))]
pub fn thread_id() -> u64 {
    // SAFETY: pthread_self has no preconditions and cannot fail.
    let handle = unsafe { libc::pthread_self() };
    handle as u64
}

/// Returns an identifier for the calling OS thread.
#[must_use]
#[cfg(not(unix))]
pub fn thread_id() -> u64 {
    0
}
