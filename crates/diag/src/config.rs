//! crates/diag/src/config.rs
//! Environment-driven configuration, read once at initialization.

use std::env;

use crate::level::LogLevel;
use crate::subsys::Subsys;

/// Level name, e.g. `MESH_DEBUG=INFO`.
pub const ENV_LEVEL: &str = "MESH_DEBUG";
/// Subsystem filter list, e.g. `MESH_DEBUG_SUBSYS=^INIT,COLL`.
pub const ENV_SUBSYS: &str = "MESH_DEBUG_SUBSYS";
/// Log-file path template, e.g. `MESH_DEBUG_FILE=mesh.%h.%p.log`.
pub const ENV_FILE: &str = "MESH_DEBUG_FILE";
/// When set, the first emitted warning raises the level to INFO.
pub const ENV_WARN_SETS_DEBUG_INFO: &str = "MESH_WARN_ENABLE_DEBUG_INFO";
/// Gates OS-visible thread naming.
pub const ENV_SET_THREAD_NAME: &str = "MESH_SET_THREAD_NAME";

/// Upper bound on an expanded log-file path, in bytes.
pub const MAX_FILE_PATH: usize = 4096;

/// Snapshot of the environment configuration.
///
/// Built once by [`from_env`](Self::from_env) during lazy initialization and
/// then applied to the process-wide state; tests and embedding hosts may
/// build one by hand instead.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DiagConfig {
    /// Configured verbosity threshold.
    pub level: LogLevel,
    /// Configured subsystem mask.
    pub mask: Subsys,
    /// Unexpanded log-file path template, if any.
    pub file_template: Option<String>,
    /// One-shot escalation: the first emitted warning raises the level to INFO.
    pub warn_sets_debug_info: bool,
    /// Whether worker threads get OS-visible names.
    pub set_thread_name: bool,
}

impl Default for DiagConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::None,
            mask: Subsys::DEFAULT,
            file_template: None,
            warn_sets_debug_info: false,
            set_thread_name: false,
        }
    }
}

impl DiagConfig {
    /// Reads the configuration from the process environment.
    ///
    /// Every input degrades silently: an unrecognized level name disables
    /// logging, unknown subsystem tokens are skipped, and a malformed boolean
    /// reads as false. Nothing here can fail.
    #[must_use]
    pub fn from_env() -> Self {
        let level = LogLevel::from_env_name(env::var(ENV_LEVEL).ok().as_deref());
        let mask = match env::var(ENV_SUBSYS) {
            Ok(spec) => Subsys::parse_list(&spec),
            Err(_) => Subsys::DEFAULT,
        };
        Self {
            level,
            mask,
            file_template: env::var(ENV_FILE).ok(),
            warn_sets_debug_info: parse_bool(env::var(ENV_WARN_SETS_DEBUG_INFO).ok().as_deref()),
            set_thread_name: parse_bool(env::var(ENV_SET_THREAD_NAME).ok().as_deref()),
        }
    }

    /// Expands the file template for this host, when a file sink applies.
    ///
    /// A file sink only applies when the configured level is above
    /// [`LogLevel::Version`] and a template is present; otherwise (and when
    /// the expansion comes out empty) the default sink stays in place.
    #[must_use]
    pub fn resolved_file_path(&self, hostname: &str, pid: u32) -> Option<String> {
        if self.level <= LogLevel::Version {
            return None;
        }
        let template = self.file_template.as_deref()?;
        let path = expand_file_template(template, hostname, pid);
        if path.is_empty() { None } else { Some(path) }
    }
}

fn parse_bool(value: Option<&str>) -> bool {
    matches!(value, Some(v) if v == "1"
        || v.eq_ignore_ascii_case("true")
        || v.eq_ignore_ascii_case("yes"))
}

/// Expands a log-file path template.
///
/// The template mini-language is deliberately independent of general string
/// formatting: `%h` expands to the hostname, `%p` to the process id, `%%` to
/// a literal `%`, and any other `%X` passes both characters through verbatim.
/// All other characters copy as-is. The result silently truncates at
/// [`MAX_FILE_PATH`] bytes.
#[must_use]
pub fn expand_file_template(template: &str, hostname: &str, pid: u32) -> String {
    let mut out = String::new();
    let mut chars = template.chars();
    while let Some(c) = chars.next() {
        if out.len() >= MAX_FILE_PATH {
            break;
        }
        if c != '%' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('%') => out.push('%'),
            Some('h') => out.push_str(hostname),
            Some('p') => out.push_str(&pid.to_string()),
            Some(other) => {
                out.push('%');
                out.push(other);
            }
            // A trailing '%' copies through like any unrecognized specifier.
            None => out.push('%'),
        }
    }
    if out.len() > MAX_FILE_PATH {
        let mut end = MAX_FILE_PATH;
        while !out.is_char_boundary(end) {
            end -= 1;
        }
        out.truncate(end);
    }
    out
}
