//! Unified logging for debug output, ported from the teacher's
//! `src/logging.rs`: compact timestamped logging with per-module level
//! configuration and `RUST_LOG` precedence over config.

use std::sync::Once;
use tracing_subscriber::fmt::time::FormatTime;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

use crate::config::LoggingConfig;

static INIT: Once = Once::new();

struct CompactTime;

impl FormatTime for CompactTime {
    fn format_time(&self, w: &mut tracing_subscriber::fmt::format::Writer<'_>) -> std::fmt::Result {
        write!(w, "{}", chrono::Local::now().format("%H:%M:%S%.3f"))
    }
}

/// Initialize logging with configuration. Safe to call more than once; only
/// the first call takes effect.
pub fn init_with_config(config: &LoggingConfig) {
    INIT.call_once(|| {
        let filter = if std::env::var("RUST_LOG").is_ok() {
            EnvFilter::from_default_env()
        } else {
            let mut filter_str = config.default.clone();
            for (module, level) in &config.modules {
                filter_str.push_str(&format!(",{module}={level}"));
            }
            EnvFilter::new(filter_str)
        };

        let fmt_layer = tracing_subscriber::fmt::layer()
            .with_target(true)
            .with_timer(CompactTime)
            .with_level(true)
            .with_filter(filter);

        tracing_subscriber::registry().with(fmt_layer).init();
    });
}

pub fn init() {
    init_with_config(&LoggingConfig::default());
}

/// Log an event with phase context, e.g. `log_event!("visibility", "closure computed", "{} files", n)`.
#[macro_export]
macro_rules! log_event {
    ($phase:expr, $event:expr) => {
        tracing::info!("[{}] {}", $phase, $event)
    };
    ($phase:expr, $event:expr, $($arg:tt)*) => {
        tracing::info!("[{}] {}: {}", $phase, $event, format!($($arg)*))
    };
}

#[macro_export]
macro_rules! debug_event {
    ($phase:expr, $event:expr) => {
        tracing::debug!("[{}] {}", $phase, $event)
    };
    ($phase:expr, $event:expr, $($arg:tt)*) => {
        tracing::debug!("[{}] {}: {}", $phase, $event, format!($($arg)*))
    };
}
