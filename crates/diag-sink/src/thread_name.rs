//! crates/diag-sink/src/thread_name.rs
//! Best-effort OS-visible thread naming.
//!
//! Naming is a capability: platforms that expose it get a real backend,
//! everything else gets a no-op. Nothing here ever reports an error — a bad
//! handle or an unsupported platform simply leaves the thread unnamed.

use std::ffi::CString;
use std::thread::JoinHandle;

/// Maximum thread name length, including the terminating NUL.
///
/// This matches the pthread limit on Linux; longer names are truncated.
pub const THREAD_NAME_LEN: usize = 16;

#[cfg(unix)]
type RawThreadHandle = libc::pthread_t;
#[cfg(not(unix))]
type RawThreadHandle = u64;

/// Platform capability for applying OS-visible thread names.
trait ThreadNamer: Sync {
    fn name_thread(&self, thread: RawThreadHandle, name: &str);
    fn name_current(&self, name: &str);
}

#[cfg(target_os = "linux")]
struct PthreadNamer;

#[cfg(target_os = "linux")]
impl ThreadNamer for PthreadNamer {
    fn name_thread(&self, thread: RawThreadHandle, name: &str) {
        let Some(name) = bounded_name(name) else {
            return;
        };
        // SAFETY: `name` is NUL-terminated and within the 16-byte limit
        // pthread_setname_np imposes. An invalid handle only yields an error
        // code, which is ignored.
        unsafe {
            libc::pthread_setname_np(thread, name.as_ptr());
        }
    }

    fn name_current(&self, name: &str) {
        // SAFETY: pthread_self has no preconditions and cannot fail.
        let current = unsafe { libc::pthread_self() };
        self.name_thread(current, name);
    }
}

#[cfg(target_os = "macos")]
struct DarwinNamer;

#[cfg(target_os = "macos")]
impl ThreadNamer for DarwinNamer {
    fn name_thread(&self, _thread: RawThreadHandle, _name: &str) {
        // Darwin can only name the calling thread.
    }

    fn name_current(&self, name: &str) {
        let Some(name) = bounded_name(name) else {
            return;
        };
        // SAFETY: `name` is a valid NUL-terminated string; the single-argument
        // Darwin variant names the calling thread and cannot fail fatally.
        unsafe {
            libc::pthread_setname_np(name.as_ptr());
        }
    }
}

#[cfg(not(any(target_os = "linux", target_os = "macos")))]
struct NoopNamer;

#[cfg(not(any(target_os = "linux", target_os = "macos")))]
impl ThreadNamer for NoopNamer {
    fn name_thread(&self, _thread: RawThreadHandle, _name: &str) {}
    fn name_current(&self, _name: &str) {}
}

fn namer() -> &'static dyn ThreadNamer {
    #[cfg(target_os = "linux")]
    return &PthreadNamer;
    #[cfg(target_os = "macos")]
    return &DarwinNamer;
    #[cfg(not(any(target_os = "linux", target_os = "macos")))]
    return &NoopNamer;
}

/// Truncates `name` to fit the OS limit and strips interior NULs.
fn bounded_name(name: &str) -> Option<CString> {
    let bytes: Vec<u8> = name
        .bytes()
        .filter(|&b| b != 0)
        .take(THREAD_NAME_LEN - 1)
        .collect();
    CString::new(bytes).ok()
}

/// Applies `name` to the thread behind `handle`, where the platform allows it.
pub fn name_thread<T>(handle: &JoinHandle<T>, name: &str) {
    #[cfg(unix)]
    {
        use std::os::unix::thread::JoinHandleExt;
        namer().name_thread(handle.as_pthread_t(), name);
    }
    #[cfg(not(unix))]
    {
        let _ = (handle, name);
    }
}

/// Applies `name` to the calling thread, where the platform allows it.
pub fn name_current_thread(name: &str) {
    namer().name_current(name);
}
