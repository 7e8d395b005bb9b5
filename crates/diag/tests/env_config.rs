//! Integration test for environment-driven configuration.
//!
//! Environment mutation is process-global, so every scenario runs inside a
//! single sequential test function; the default test harness would otherwise
//! interleave `set_var` calls across threads.

use std::env;
use std::path::Path;

use diag::{
    DebugSink, DiagConfig, ENV_FILE, ENV_LEVEL, ENV_SET_THREAD_NAME, ENV_SUBSYS,
    ENV_WARN_SETS_DEBUG_INFO, LogLevel, Subsys,
};
use tempfile::tempdir;

fn set(key: &str, value: &str) {
    // SAFETY: this binary touches the environment from this one test
    // function only, and no other thread is running here.
    unsafe { env::set_var(key, value) };
}

fn unset(key: &str) {
    // SAFETY: see `set`.
    unsafe { env::remove_var(key) };
}

fn clear_all() {
    for key in [
        ENV_LEVEL,
        ENV_SUBSYS,
        ENV_FILE,
        ENV_WARN_SETS_DEBUG_INFO,
        ENV_SET_THREAD_NAME,
    ] {
        unset(key);
    }
}

#[test]
fn environment_configuration_scenarios() {
    // --- Defaults: an empty environment disables logging. ---
    clear_all();
    let config = DiagConfig::from_env();
    assert_eq!(config.level, LogLevel::None);
    assert_eq!(config.mask, Subsys::DEFAULT);
    assert!(config.file_template.is_none());
    assert!(!config.warn_sets_debug_info);
    assert!(!config.set_thread_name);

    // --- Level parsing is case-insensitive; unknown names stay silent. ---
    set(ENV_LEVEL, "INFO");
    assert_eq!(DiagConfig::from_env().level, LogLevel::Info);
    set(ENV_LEVEL, "trace");
    assert_eq!(DiagConfig::from_env().level, LogLevel::Trace);
    set(ENV_LEVEL, "Warn");
    assert_eq!(DiagConfig::from_env().level, LogLevel::Warn);
    set(ENV_LEVEL, "VERBOSE");
    assert_eq!(DiagConfig::from_env().level, LogLevel::None);

    // --- Subsystem list replaces the default mask outright. ---
    set(ENV_LEVEL, "INFO");
    set(ENV_SUBSYS, "COLL,NET");
    let config = DiagConfig::from_env();
    assert_eq!(config.mask, Subsys::COLL | Subsys::NET);
    assert!(!config.mask.intersects(Subsys::INIT));

    set(ENV_SUBSYS, "^INIT");
    let config = DiagConfig::from_env();
    assert!(!config.mask.intersects(Subsys::INIT));
    assert!(config.mask.intersects(Subsys::COLL));

    set(ENV_SUBSYS, "BOGUS,COLL");
    assert_eq!(DiagConfig::from_env().mask, Subsys::COLL);

    // --- Boolean tunables accept 1/true/yes. ---
    set(ENV_WARN_SETS_DEBUG_INFO, "1");
    set(ENV_SET_THREAD_NAME, "true");
    let config = DiagConfig::from_env();
    assert!(config.warn_sets_debug_info);
    assert!(config.set_thread_name);
    set(ENV_WARN_SETS_DEBUG_INFO, "0");
    set(ENV_SET_THREAD_NAME, "nope");
    let config = DiagConfig::from_env();
    assert!(!config.warn_sets_debug_info);
    assert!(!config.set_thread_name);

    // --- File template resolution and sink opening. ---
    let dir = tempdir().expect("tempdir");
    let template = format!("{}/mesh.%h.%p.log", dir.path().display());
    set(ENV_LEVEL, "INFO");
    set(ENV_FILE, &template);
    let config = DiagConfig::from_env();
    let path = config
        .resolved_file_path("node1", 77)
        .expect("resolved path");
    assert!(path.ends_with("mesh.node1.77.log"));
    let sink = DebugSink::open_file(Path::new(&path)).expect("open file sink");
    sink.write_line(b"probe line\n");
    let written = std::fs::read_to_string(&path).expect("read back");
    assert_eq!(written, "probe line\n");

    // A file sink needs a level above VERSION even with a template set.
    set(ENV_LEVEL, "VERSION");
    let config = DiagConfig::from_env();
    assert_eq!(config.resolved_file_path("node1", 77), None);

    // An unopenable path reports the error so init can fall back to stdout.
    let missing = dir.path().join("no-such-dir").join("mesh.log");
    assert!(DebugSink::open_file(&missing).is_err());

    clear_all();
}
