//! Logging setup using `tracing` and `tracing-subscriber`.
//!
//! Events go to stderr so stdout stays clean for dumps. `RUST_LOG` overrides
//! the level chosen with `-v`.

use tracing::Level;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Clone)]
pub struct LogConfig {
    pub level: Level,
    pub with_target: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: Level::WARN,
            with_target: false,
        }
    }
}

impl LogConfig {
    /// - 0 (no `-v`): warn
    /// - 1 (`-v`): info
    /// - 2 (`-vv`): debug
    /// - 3+: trace
    pub fn from_verbosity(verbosity: u8) -> Self {
        let level = match verbosity {
            0 => Level::WARN,
            1 => Level::INFO,
            2 => Level::DEBUG,
            _ => Level::TRACE,
        };
        Self {
            level,
            with_target: verbosity >= 2,
        }
    }
}

/// Installs the global subscriber. Later calls are ignored.
pub fn init_logging(config: &LogConfig) {
    let layer = fmt::layer()
        .compact()
        .without_time()
        .with_writer(std::io::stderr)
        .with_target(config.with_target);
    let _ = tracing_subscriber::registry()
        .with(build_env_filter(config.level))
        .with(layer)
        .try_init();
}

fn build_env_filter(level: Level) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let level = level.as_str().to_lowercase();
        // dependencies stay at warn
        EnvFilter::new(format!("warn,mcm_cli={level},mcm_core={level}"))
    })
}
