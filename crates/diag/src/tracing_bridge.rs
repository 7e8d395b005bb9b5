//! crates/diag/src/tracing_bridge.rs
//! Bridge between the tracing crate and the mesh level/mask policy.
//!
//! This module provides a tracing subscriber layer that maps tracing events
//! onto the mesh diagnostic pipeline. It enables using standard Rust tracing
//! macros (trace!, debug!, info!, warn!, error!) in host code while keeping
//! the `MESH_DEBUG`/`MESH_DEBUG_SUBSYS` filters authoritative.
//!
//! # Architecture
//!
//! - [`MeshLayer`]: a tracing-subscriber layer that forwards events
//! - Event targets are mapped to [`Subsys`] bits, event levels to [`LogLevel`]
//! - The process-wide state applies its usual level/mask filtering
//!
//! # Usage
//!
//! ```rust,ignore
//! diag::tracing_bridge::init_tracing();
//!
//! // Now standard tracing macros flow through the mesh pipeline
//! tracing::info!(target: "mesh::init", "communicator ready");
//! tracing::debug!(target: "mesh::net", "posted recv");
//! ```

use tracing::{Level, Subscriber};
use tracing_subscriber::layer::{Context, Layer};
use tracing_subscriber::registry::LookupSpan;

use crate::level::LogLevel;
use crate::subsys::Subsys;

/// A tracing layer that forwards events into the mesh diagnostic pipeline.
///
/// Events whose target does not name a mesh subsystem are ignored, so the
/// layer composes with other subscribers without claiming their traffic.
#[derive(Clone, Copy, Debug, Default)]
pub struct MeshLayer;

impl MeshLayer {
    /// Creates the layer.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Map a tracing target to a subsystem bit.
    fn target_to_subsys(target: &str) -> Option<Subsys> {
        // Match against mesh module paths - look for :: separator or exact
        // word match, so "reinit" does not claim the init bit.
        match target {
            t if t.contains("::init") || t == "init" => Some(Subsys::INIT),
            t if t.contains("::coll") || t == "coll" => Some(Subsys::COLL),
            t if t.contains("::p2p") || t == "p2p" => Some(Subsys::P2P),
            t if t.contains("::shm") || t == "shm" => Some(Subsys::SHM),
            t if t.contains("::net") || t == "net" => Some(Subsys::NET),
            t if t.contains("::graph") || t == "graph" => Some(Subsys::GRAPH),
            t if t.contains("::tuning") || t == "tuning" => Some(Subsys::TUNING),
            t if t.contains("::env") || t == "env" => Some(Subsys::ENV),
            t if t.contains("::alloc") || t == "alloc" => Some(Subsys::ALLOC),
            t if t.contains("::call") || t == "call" => Some(Subsys::CALL),
            t if t.contains("::proxy") || t == "proxy" => Some(Subsys::PROXY),
            t if t.contains("::nvls") || t == "nvls" => Some(Subsys::NVLS),
            t if t.contains("::bootstrap") || t == "bootstrap" => Some(Subsys::BOOTSTRAP),
            t if t.contains("::reg") || t == "reg" => Some(Subsys::REG),
            _ => None,
        }
    }

    /// Map a tracing level to a mesh record level.
    const fn level_to_log_level(level: &Level) -> LogLevel {
        match *level {
            Level::ERROR | Level::WARN => LogLevel::Warn,
            Level::INFO => LogLevel::Info,
            Level::DEBUG | Level::TRACE => LogLevel::Trace,
        }
    }
}

impl<S> Layer<S> for MeshLayer
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
        let metadata = event.metadata();
        let Some(flags) = Self::target_to_subsys(metadata.target()) else {
            return;
        };
        let level = Self::level_to_log_level(metadata.level());
        if !crate::enabled(level, flags) {
            return;
        }

        let mut visitor = MessageVisitor::default();
        event.record(&mut visitor);
        if let Some(message) = visitor.message {
            crate::log(
                level,
                flags,
                metadata.file().unwrap_or_else(|| metadata.target()),
                metadata.line().unwrap_or(0),
                format_args!("{message}"),
            );
        }
    }
}

/// Visitor to extract the message from a tracing event.
#[derive(Default)]
struct MessageVisitor {
    message: Option<String>,
}

impl tracing::field::Visit for MessageVisitor {
    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
        if field.name() == "message" {
            self.message = Some(format!("{value:?}"));
        }
    }

    fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
        if field.name() == "message" {
            self.message = Some(value.to_owned());
        }
    }
}

/// Install a subscriber whose only layer is the mesh bridge.
///
/// The `MESH_DEBUG` filters stay authoritative: the bridge consults them
/// before forwarding, so raising tracing verbosity alone changes nothing.
pub fn init_tracing() {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    crate::init();

    tracing_subscriber::registry().with(MeshLayer::new()).init();
}

/// Install the mesh bridge alongside a caller-supplied filter layer.
///
/// # Example
///
/// ```rust,ignore
/// use tracing_subscriber::EnvFilter;
///
/// diag::tracing_bridge::init_tracing_with_filter(EnvFilter::from_default_env());
/// ```
pub fn init_tracing_with_filter<F>(filter: F)
where
    F: Layer<tracing_subscriber::Registry> + Send + Sync + 'static,
{
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    crate::init();

    tracing_subscriber::registry()
        .with(filter)
        .with(MeshLayer::new())
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn target_maps_to_subsys() {
        assert_eq!(MeshLayer::target_to_subsys("mesh::init"), Some(Subsys::INIT));
        assert_eq!(MeshLayer::target_to_subsys("mesh::net"), Some(Subsys::NET));
        assert_eq!(
            MeshLayer::target_to_subsys("mesh::bootstrap"),
            Some(Subsys::BOOTSTRAP)
        );
        assert_eq!(MeshLayer::target_to_subsys("proxy"), Some(Subsys::PROXY));
        assert_eq!(MeshLayer::target_to_subsys("unknown"), None);
        assert_eq!(MeshLayer::target_to_subsys("reinit"), None);
    }

    #[test]
    fn tracing_levels_map_onto_record_levels() {
        assert_eq!(MeshLayer::level_to_log_level(&Level::ERROR), LogLevel::Warn);
        assert_eq!(MeshLayer::level_to_log_level(&Level::WARN), LogLevel::Warn);
        assert_eq!(MeshLayer::level_to_log_level(&Level::INFO), LogLevel::Info);
        assert_eq!(MeshLayer::level_to_log_level(&Level::DEBUG), LogLevel::Trace);
        assert_eq!(MeshLayer::level_to_log_level(&Level::TRACE), LogLevel::Trace);
    }
}
