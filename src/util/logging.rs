//! Structured logging setup for react-pod
//!
//! Logs, the environment report included, go to stderr through a `tracing`
//! subscriber. Output is human readable by default, or JSON with
//! `REACT_POD_LOG_JSON=true`.
//!
//! # Example
//!
//! ```no_run
//! use react_pod::util::logging;
//!
//! logging::init_from_env();
//!
//! use tracing::{info, warn};
//! info!("Conversion started");
//! warn!(dependency = "MyCustomDep", "Link produced warnings");
//! ```

use std::env;
use std::sync::Once;
use tracing::Level;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

pub const LOG_LEVEL_ENV: &str = "REACT_POD_LOG_LEVEL";
pub const LOG_JSON_ENV: &str = "REACT_POD_LOG_JSON";

/// Ensures logging is only initialized once
static INIT: Once = Once::new();

/// Configuration for logging initialization
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Minimum log level to display
    pub level: Level,

    /// Use JSON output format
    pub use_json: bool,

    /// Include the module target (e.g., react_pod::converter) in logs
    pub include_target: bool,

    /// Include file and line number information
    pub include_location: bool,
}

impl Default for LoggingConfig {
    /// INFO level, plain text, no targets or locations
    fn default() -> Self {
        Self {
            level: Level::INFO,
            use_json: false,
            include_target: false,
            include_location: false,
        }
    }
}

impl LoggingConfig {
    pub fn with_level(level: Level) -> Self {
        Self {
            level,
            ..Default::default()
        }
    }

    /// Debug level with module targets and source locations, for `--verbose`
    pub fn development() -> Self {
        Self {
            level: Level::DEBUG,
            use_json: false,
            include_target: true,
            include_location: true,
        }
    }

    /// Resolves the level from command-line flags, then `REACT_POD_LOG_LEVEL`
    ///
    /// Precedence: `--log-level`, `--verbose`, `--quiet`, environment, INFO.
    pub fn from_flags(log_level: Option<&str>, verbose: bool, quiet: bool) -> Self {
        let mut config = if let Some(level_str) = log_level {
            Self::with_level(parse_level(level_str))
        } else if verbose {
            Self::development()
        } else if quiet {
            Self::with_level(Level::ERROR)
        } else {
            let level_str = env::var(LOG_LEVEL_ENV).unwrap_or_else(|_| "info".to_string());
            Self::with_level(parse_level(&level_str))
        };
        config.use_json = json_from_env();
        config
    }
}

/// Parses a log level from a string
///
/// Unknown levels print a warning and fall back to `Level::INFO`.
///
/// ```
/// use react_pod::util::logging::parse_level;
/// use tracing::Level;
///
/// assert_eq!(parse_level("debug"), Level::DEBUG);
/// assert_eq!(parse_level("WARN"), Level::WARN);
/// ```
pub fn parse_level(level_str: &str) -> Level {
    match level_str.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => {
            eprintln!(
                "Invalid log level '{}', defaulting to INFO. Valid levels: trace, debug, info, warn, error",
                level_str
            );
            Level::INFO
        }
    }
}

fn json_from_env() -> bool {
    env::var(LOG_JSON_ENV)
        .ok()
        .and_then(|v| v.parse::<bool>().ok())
        .unwrap_or(false)
}

/// Installs the global subscriber. Only the first call has any effect.
pub fn init_logging(config: LoggingConfig) {
    INIT.call_once(|| {
        let mut filter = EnvFilter::from_default_env();
        if env::var("RUST_LOG").is_err() {
            if let Ok(directive) = format!("react_pod={}", config.level).parse() {
                filter = filter.add_directive(directive);
            }
        }

        let layer = fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(config.include_target)
            .with_file(config.include_location)
            .with_line_number(config.include_location);

        if config.use_json {
            tracing_subscriber::registry()
                .with(filter)
                .with(layer.json())
                .init();
        } else {
            tracing_subscriber::registry()
                .with(filter)
                .with(layer.without_time())
                .init();
        }
    });
}

/// Initializes logging from `REACT_POD_LOG_LEVEL`, `REACT_POD_LOG_JSON` and `RUST_LOG`
pub fn init_from_env() {
    init_logging(LoggingConfig::from_flags(None, false, false));
}
