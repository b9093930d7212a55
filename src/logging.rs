//! Unified logging for the index engine.
//!
//! Compact timestamped output with per-module level configuration. `RUST_LOG`
//! overrides the config at runtime, same as the filter precedence most
//! `tracing`-based binaries use.
//!
//! # Configuration
//!
//! ```toml
//! [logging]
//! default = "info"
//!
//! [logging.modules]
//! "codanna_lci::coordinator" = "debug"
//! ```
//!
//! # Environment Variable
//!
//! ```bash
//! RUST_LOG=debug my-bin
//! RUST_LOG=codanna_lci::tracker=trace my-bin
//! ```
//!
//! When the engine is embedded inside a host process that already owns the
//! global subscriber, set `logging.embedded_mode = true`: INFO-level spans
//! are suppressed so the engine only surfaces warnings and errors into the
//! host's log stream, per the coordination contract in `error.rs`.

use std::sync::Once;
use tracing_subscriber::fmt::time::FormatTime;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

use crate::config::LoggingConfig;

static INIT: Once = Once::new();

/// Compact time format: HH:MM:SS.mmm
struct CompactTime;

impl FormatTime for CompactTime {
    fn format_time(&self, w: &mut tracing_subscriber::fmt::format::Writer<'_>) -> std::fmt::Result {
        write!(w, "{}", chrono::Local::now().format("%H:%M:%S%.3f"))
    }
}

/// Initialize logging with configuration. Call once at startup; later calls
/// are no-ops (`std::sync::Once`).
///
/// `RUST_LOG` takes precedence over `config` when set. When `config.embedded_mode`
/// is true and `RUST_LOG` is unset, the effective default level is clamped to
/// `warn` regardless of `config.default`.
pub fn init_with_config(config: &LoggingConfig) {
    INIT.call_once(|| {
        let filter = if std::env::var("RUST_LOG").is_ok() {
            EnvFilter::from_default_env()
        } else {
            let default_level = if config.embedded_mode {
                "warn"
            } else {
                config.default.as_str()
            };
            let mut filter_str = default_level.to_string();
            for (module, level) in &config.modules {
                filter_str.push_str(&format!(",{module}={level}"));
            }
            EnvFilter::new(&filter_str)
        };

        let fmt_layer = tracing_subscriber::fmt::layer()
            .with_target(true)
            .with_timer(CompactTime)
            .with_level(true)
            .with_filter(filter);

        tracing_subscriber::registry().with(fmt_layer).init();
    });
}

/// Initialize logging with default configuration (`default = "info"`, not
/// embedded). Use `RUST_LOG` for ad hoc overrides.
pub fn init() {
    init_with_config(&LoggingConfig::default());
}

/// Log an event with subsystem context.
///
/// ```ignore
/// log_event!("coordinator", "lock_acquired", "{:?}", index_type);
/// log_event!("tracker", "scope_cache_miss");
/// ```
#[macro_export]
macro_rules! log_event {
    ($handler:expr, $event:expr) => {
        tracing::info!("[{}] {}", $handler, $event)
    };
    ($handler:expr, $event:expr, $($arg:tt)*) => {
        tracing::info!("[{}] {}: {}", $handler, $event, format!($($arg)*))
    };
}

/// Debug-only event logging.
///
/// ```ignore
/// debug_event!("semantic_search", "word_split", "{:?}", words);
/// ```
#[macro_export]
macro_rules! debug_event {
    ($handler:expr, $event:expr) => {
        tracing::debug!("[{}] {}", $handler, $event)
    };
    ($handler:expr, $event:expr, $($arg:tt)*) => {
        tracing::debug!("[{}] {}: {}", $handler, $event, format!($($arg)*))
    };
}
