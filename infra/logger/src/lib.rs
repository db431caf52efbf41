//! # Logger
//!
//! Console logging for jishaku tools.
//!
//! Events go to standard error so that command output on standard output stays machine
//! readable. Use [`LoggerBuilder::env_filter`] to set module-directed filters
//! (e.g., `"jsk_flags=trace"`); without one, `RUST_LOG` is honoured on top of the
//! configured level.
//!
//! ## Example
//!
//! ```rust
//! # use jsk_logger::{Logger, LevelFilter};
//!
//! let _logger = Logger::builder()
//!     .name("my-tool")
//!     .level(LevelFilter::DEBUG)
//!     .init()
//!     .unwrap();
//! ```

mod error;

pub use crate::error::{LoggerError, LoggerErrorExt};
pub use tracing::level_filters::LevelFilter;

use private::Sealed;
use tracing_subscriber::fmt::layer;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

#[derive(Debug)]
pub struct LoggerConfig {
    console: bool,
    level: LevelFilter,
    json: bool,
    ansi: bool,
    env_filter: Option<String>,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self { console: true, level: LevelFilter::INFO, json: false, ansi: true, env_filter: None }
    }
}

#[derive(Debug)]
pub struct NoName;
#[derive(Debug)]
pub struct WithName(String);

mod private {
    pub trait Sealed {}
}
impl Sealed for NoName {}
impl Sealed for WithName {}

/// A builder for configuring and initializing the global tracing subscriber.
#[derive(Debug)]
pub struct LoggerBuilder<N: Sealed = NoName> {
    config: LoggerConfig,
    name: N,
}

impl LoggerBuilder<NoName> {
    /// Sets the name of the logger.
    pub fn name(self, name: impl Into<String>) -> LoggerBuilder<WithName> {
        LoggerBuilder { name: WithName(name.into()), config: self.config }
    }
}

impl LoggerBuilder<WithName> {
    /// Configures the minimum log level to be emitted.
    #[must_use = "The builder must be configured before it can be used to initialize the logger."]
    pub const fn level(mut self, level: LevelFilter) -> Self {
        self.config.level = level;
        self
    }

    /// Adds an explicit env filter (e.g., `jsk_flags=debug`).
    ///
    /// Invalid filters will cause [`LoggerBuilder::init`] to return an error.
    #[must_use = "The builder must be configured before it can be used to initialize the logger."]
    pub fn env_filter(mut self, filter: impl Into<String>) -> Self {
        self.config.env_filter = Some(filter.into());
        self
    }

    /// Enables console logging.
    #[must_use = "The builder must be configured before it can be used to initialize the logger."]
    pub const fn console(mut self, enabled: bool) -> Self {
        self.config.console = enabled;
        self
    }

    /// Emits one JSON object per event instead of the compact format.
    #[must_use = "The builder must be configured before it can be used to initialize the logger."]
    pub const fn json(mut self, enabled: bool) -> Self {
        self.config.json = enabled;
        self
    }

    /// Toggles ANSI colours in the compact format.
    #[must_use = "The builder must be configured before it can be used to initialize the logger."]
    pub const fn ansi(mut self, enabled: bool) -> Self {
        self.config.ansi = enabled;
        self
    }

    /// Consumes the builder and initializes the global tracing subscriber.
    ///
    /// # Errors
    /// Returns [`LoggerError::Subscriber`] if a global subscriber has already been set.
    /// Returns [`LoggerError::InvalidConfiguration`] for invalid builder settings.
    pub fn init(self) -> Result<Logger, LoggerError> {
        validate_config(&self.config, &self.name.0)?;

        let env_filter = build_env_filter(&self.config)?;

        let console = layer().with_writer(std::io::stderr);
        let console = if self.config.json {
            console.json().boxed()
        } else {
            console.compact().with_ansi(self.config.ansi).boxed()
        };

        tracing_subscriber::registry().with(env_filter).with(console).try_init()?;

        tracing::debug!(logger = %self.name.0, "Logger initialized");
        Ok(Logger { name: self.name.0, level: self.config.level })
    }
}

/// A handle to the initialized logging system.
#[must_use = "The handle describes the subscriber that was installed."]
#[derive(Debug)]
pub struct Logger {
    name: String,
    level: LevelFilter,
}

impl Logger {
    /// Returns a new [`LoggerBuilder`] to configure the global tracing subscriber.
    ///
    /// The `name` identifies the tool in its own log lines.
    #[must_use = "The builder must be configured before it can be used to initialize the logger."]
    pub fn builder() -> LoggerBuilder {
        LoggerBuilder { config: LoggerConfig::default(), name: NoName }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The level the subscriber was installed with, before any env filter directives.
    #[must_use]
    pub const fn level(&self) -> LevelFilter {
        self.level
    }
}

/// Maps a `-v` count onto a level, starting from `base`.
#[must_use]
pub fn verbosity(base: LevelFilter, count: u8) -> LevelFilter {
    let ladder = [
        LevelFilter::OFF,
        LevelFilter::ERROR,
        LevelFilter::WARN,
        LevelFilter::INFO,
        LevelFilter::DEBUG,
        LevelFilter::TRACE,
    ];
    let start = ladder.iter().position(|&level| level == base).unwrap_or(2);
    ladder[(start + usize::from(count)).min(ladder.len() - 1)]
}

fn validate_config(config: &LoggerConfig, name: &str) -> Result<(), LoggerError> {
    if name.trim().is_empty() {
        return Err(LoggerError::InvalidConfiguration {
            message: "Logger name cannot be empty".into(),
            context: None,
        });
    }

    if !config.console {
        return Err(LoggerError::InvalidConfiguration {
            message: "No logging layers enabled. Enable console output.".into(),
            context: None,
        });
    }

    Ok(())
}

fn build_env_filter(config: &LoggerConfig) -> Result<EnvFilter, LoggerError> {
    let builder = EnvFilter::builder().with_default_directive(config.level.into());
    config.env_filter.as_ref().map_or_else(
        || Ok(builder.from_env_lossy()),
        |filter| {
            builder.parse(filter).map_err(|e| LoggerError::InvalidConfiguration {
                message: format!("Invalid env filter '{filter}': {e}").into(),
                context: None,
            })
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn test_logger_builder_initial_state() {
        let logger_builder = Logger::builder().name("test-app").env_filter("jsk_flags=debug");
        assert!(logger_builder.config.console);
        assert!(!logger_builder.config.json);
        assert_eq!(logger_builder.config.level, LevelFilter::INFO);
        assert_eq!(logger_builder.config.env_filter.as_deref(), Some("jsk_flags=debug"));
    }

    #[test]
    #[serial]
    fn test_logger_builder_configuration() {
        let logger_builder = Logger::builder()
            .name("test-app")
            .json(true)
            .ansi(false)
            .level(LevelFilter::DEBUG);

        assert!(logger_builder.config.json);
        assert!(!logger_builder.config.ansi);
        assert_eq!(logger_builder.config.level, LevelFilter::DEBUG);
    }

    #[test]
    #[serial]
    fn test_rejects_invalid_configuration() {
        let err = Logger::builder().name("  ").init().expect_err("blank name");
        assert!(matches!(err, LoggerError::InvalidConfiguration { .. }));

        let err = Logger::builder().name("test-app").console(false).init().expect_err("no layers");
        assert!(matches!(err, LoggerError::InvalidConfiguration { .. }));

        let err = Logger::builder()
            .name("test-app")
            .env_filter("jsk_flags=loud")
            .init()
            .expect_err("bad filter");
        assert!(err.to_string().contains("Invalid env filter"));
    }

    #[test]
    fn test_verbosity_ladder() {
        assert_eq!(verbosity(LevelFilter::WARN, 0), LevelFilter::WARN);
        assert_eq!(verbosity(LevelFilter::WARN, 1), LevelFilter::INFO);
        assert_eq!(verbosity(LevelFilter::WARN, 2), LevelFilter::DEBUG);
        assert_eq!(verbosity(LevelFilter::WARN, 9), LevelFilter::TRACE);
    }
}
