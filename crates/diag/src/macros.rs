//! crates/diag/src/macros.rs
//! Call-site macros wrapping [`crate::log`] with file/line capture.

/// Emit a warning record.
///
/// Warnings carry every subsystem bit, so a configured mask never hides
/// them; use [`suppress_warnings`](crate::suppress_warnings) on probe paths
/// where failure is expected instead.
///
/// # Example
/// ```ignore
/// warn_log!("ring {} timed out after {} ms", ring, elapsed);
/// ```
#[macro_export]
macro_rules! warn_log {
    ($($arg:tt)*) => {
        $crate::log(
            $crate::LogLevel::Warn,
            $crate::Subsys::ALL,
            file!(),
            line!(),
            format_args!($($arg)*),
        );
    };
}

/// Emit an informational record for the given subsystems.
///
/// # Example
/// ```ignore
/// info_log!(Subsys::INIT, "communicator {} ready", id);
/// ```
#[macro_export]
macro_rules! info_log {
    ($flags:expr, $($arg:tt)*) => {
        $crate::log(
            $crate::LogLevel::Info,
            $flags,
            file!(),
            line!(),
            format_args!($($arg)*),
        );
    };
}

/// Emit a trace record for the given subsystems.
///
/// With exactly [`Subsys::CALL`](crate::Subsys::CALL) the record takes the
/// short API-tracing prefix instead of the timestamped one.
///
/// # Example
/// ```ignore
/// trace_log!(Subsys::NET, "posted recv seq={}", seq);
/// ```
#[macro_export]
macro_rules! trace_log {
    ($flags:expr, $($arg:tt)*) => {
        $crate::log(
            $crate::LogLevel::Trace,
            $flags,
            file!(),
            line!(),
            format_args!($($arg)*),
        );
    };
}

/// Give a spawned thread an OS-visible name, when naming is enabled.
///
/// # Example
/// ```ignore
/// let handle = std::thread::spawn(worker);
/// name_thread!(&handle, "mesh-proxy-{}", channel);
/// ```
#[macro_export]
macro_rules! name_thread {
    ($handle:expr, $($arg:tt)*) => {
        $crate::set_thread_name($handle, format_args!($($arg)*));
    };
}
