//! Integration tests for record emission and prefix formatting.
//!
//! These tests verify the full pipeline on isolated state instances with an
//! in-memory sink: level/mask filtering, the per-level prefix shapes, rank
//! padding, line termination, and the line-length clamp.

use diag::{DebugSink, DiagConfig, DiagnosticState, LINE_BUF_LEN, LogLevel, Subsys};

fn state_at(level: LogLevel, mask: Subsys) -> DiagnosticState {
    let state = DiagnosticState::new();
    let config = DiagConfig {
        level,
        mask,
        ..DiagConfig::default()
    };
    state.initialize_with(config, DebugSink::memory());
    state
}

fn output(state: &DiagnosticState) -> String {
    let bytes = state
        .sink()
        .and_then(DebugSink::captured)
        .expect("memory sink");
    String::from_utf8(bytes).expect("utf-8 output")
}

// ============================================================================
// Filtering Tests
// ============================================================================

/// Verifies records below the configured level are emitted and above are not.
#[test]
fn level_threshold_gates_emission() {
    let state = state_at(LogLevel::Info, Subsys::ALL);

    state.log(LogLevel::Info, Subsys::INIT, "a.rs", 1, format_args!("kept"));
    state.log(LogLevel::Trace, Subsys::INIT, "a.rs", 2, format_args!("dropped"));

    let out = output(&state);
    assert!(out.contains("kept"));
    assert!(!out.contains("dropped"));
}

/// Verifies a record needs at least one subsystem bit in the mask.
#[test]
fn mask_gates_emission_by_subsystem() {
    let state = state_at(LogLevel::Info, Subsys::NET | Subsys::SHM);

    state.log(LogLevel::Info, Subsys::NET, "a.rs", 1, format_args!("net line"));
    state.log(LogLevel::Info, Subsys::COLL, "a.rs", 2, format_args!("coll line"));
    state.log(
        LogLevel::Info,
        Subsys::COLL | Subsys::SHM,
        "a.rs",
        3,
        format_args!("mixed line"),
    );

    let out = output(&state);
    assert!(out.contains("net line"));
    assert!(!out.contains("coll line"));
    assert!(out.contains("mixed line"));
}

/// Verifies an entirely disabled state emits nothing.
#[test]
fn disabled_state_emits_nothing() {
    let state = state_at(LogLevel::None, Subsys::ALL);
    state.log(LogLevel::Warn, Subsys::ALL, "a.rs", 1, format_args!("silent"));
    assert!(output(&state).is_empty());
}

// ============================================================================
// Prefix Shape Tests
// ============================================================================

/// Verifies the INFO prefix carries rank pair, location, host, and brand tag.
#[test]
fn info_prefix_shape() {
    let state = state_at(LogLevel::Info, Subsys::ALL);
    state.log(
        LogLevel::Info,
        Subsys::INIT,
        "init.rs",
        42,
        format_args!("hello"),
    );

    let out = output(&state);
    let line = out.lines().next().expect("one line");
    assert!(line.starts_with("[?/?]["), "unexpected prefix: {line}");
    assert!(line.contains("[init.rs:42]"));
    assert!(line.contains(":pid="));
    assert!(line.contains("MESH INFO hello"));
}

/// Verifies the WARN prefix matches the INFO shape with the WARN tag.
#[test]
fn warn_prefix_shape() {
    let state = state_at(LogLevel::Warn, Subsys::ALL);
    state.log(
        LogLevel::Warn,
        Subsys::ALL,
        "net.rs",
        7,
        format_args!("link down"),
    );

    let out = output(&state);
    assert!(out.contains("[net.rs:7]"));
    assert!(out.contains("MESH WARN link down"));
}

/// Verifies API-call tracing uses the short host-only prefix.
#[test]
fn call_trace_prefix_is_short() {
    let state = state_at(LogLevel::Trace, Subsys::ALL);
    state.log(
        LogLevel::Trace,
        Subsys::CALL,
        "api.rs",
        3,
        format_args!("all_reduce(count=8)"),
    );

    let out = output(&state);
    let line = out.lines().next().expect("one line");
    assert!(line.starts_with('['));
    assert!(line.contains("MESH CALL all_reduce(count=8)"));
    // The short prefix has no timestamp and no source location.
    assert!(!line.contains("api.rs"));
    assert!(!line.contains("MESH TRACE"));
}

/// Verifies non-call traces carry elapsed milliseconds and the location.
#[test]
fn trace_prefix_has_elapsed_and_location() {
    let state = state_at(LogLevel::Trace, Subsys::ALL);
    state.log(
        LogLevel::Trace,
        Subsys::NET,
        "net.rs",
        55,
        format_args!("posted"),
    );

    let out = output(&state);
    let line = out.lines().next().expect("one line");
    assert!(line.contains("net.rs:55"));
    assert!(line.contains("MESH TRACE posted"));
    // Elapsed time renders with six fractional digits.
    let elapsed = line
        .split_whitespace()
        .find(|tok| tok.contains('.'))
        .expect("elapsed field");
    let (_, frac) = elapsed.rsplit_once('.').expect("fractional part");
    assert_eq!(frac.len(), 6);
}

/// Verifies the CALL prefix applies only when CALL is the sole flag.
#[test]
fn mixed_call_flags_use_the_timestamped_prefix() {
    let state = state_at(LogLevel::Trace, Subsys::ALL);
    state.log(
        LogLevel::Trace,
        Subsys::CALL | Subsys::NET,
        "net.rs",
        9,
        format_args!("mixed"),
    );

    let out = output(&state);
    assert!(out.contains("MESH TRACE mixed"));
    assert!(!out.contains("MESH CALL"));
}

// ============================================================================
// Identity Tests
// ============================================================================

/// Verifies distributor params replace the `?/?` rank pair with padded values.
#[test]
fn rank_pair_is_zero_padded_after_distributor_params() {
    let state = state_at(LogLevel::Info, Subsys::ALL);
    state.set_distributor_params(8, 128);
    state.log(LogLevel::Info, Subsys::INIT, "a.rs", 1, format_args!("ready"));

    let out = output(&state);
    assert!(out.starts_with("[008/128]"), "unexpected output: {out}");
}

/// Verifies lines emitted before the params arrive keep the unknown markers.
#[test]
fn rank_pair_defaults_to_unknown() {
    let state = state_at(LogLevel::Info, Subsys::ALL);
    state.log(LogLevel::Info, Subsys::INIT, "a.rs", 1, format_args!("early"));
    state.set_distributor_params(0, 4);
    state.log(LogLevel::Info, Subsys::INIT, "a.rs", 2, format_args!("late"));

    let out = output(&state);
    let mut lines = out.lines();
    assert!(lines.next().expect("early line").starts_with("[?/?]"));
    assert!(lines.next().expect("late line").starts_with("[0/4]"));
}

// ============================================================================
// Line Framing Tests
// ============================================================================

/// Verifies every emitted line ends with exactly one newline.
#[test]
fn lines_are_newline_terminated() {
    let state = state_at(LogLevel::Info, Subsys::ALL);
    state.log(LogLevel::Info, Subsys::INIT, "a.rs", 1, format_args!("one"));
    state.log(LogLevel::Info, Subsys::INIT, "a.rs", 2, format_args!("two"));

    let out = output(&state);
    assert_eq!(out.lines().count(), 2);
    assert!(out.ends_with('\n'));
    assert!(!out.contains("\n\n"));
}

/// Verifies oversized messages clamp to the fixed line capacity.
#[test]
fn oversized_message_is_clamped() {
    let state = state_at(LogLevel::Info, Subsys::ALL);
    let big = "y".repeat(10 * LINE_BUF_LEN);
    state.log(LogLevel::Info, Subsys::INIT, "a.rs", 1, format_args!("{big}"));

    let bytes = state
        .sink()
        .and_then(DebugSink::captured)
        .expect("memory sink");
    assert_eq!(bytes.len(), LINE_BUF_LEN);
    assert_eq!(bytes.last(), Some(&b'\n'));
}

/// Verifies a message that exactly fills the buffer is not corrupted.
#[test]
fn short_message_is_not_clamped() {
    let state = state_at(LogLevel::Info, Subsys::ALL);
    state.log(LogLevel::Info, Subsys::INIT, "a.rs", 1, format_args!("tiny"));

    let out = output(&state);
    assert!(out.trim_end().ends_with("tiny"));
}
