//! Logging setup for applications embedding the client.
//!
//! The library itself only emits `tracing` events; installing a subscriber is
//! left to the application. [`setup::init_logging`] is a convenience for
//! programs that have no subscriber of their own.

/// Truncates a string to the maximum field length if needed.
pub fn truncate_field(value: &str, max_length: usize) -> String {
    if value.len() <= max_length {
        return value.to_string();
    }
    let mut end = max_length;
    while !value.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...(truncated)", &value[..end])
}

/// Utilities for setting up structured logging.
pub mod setup {
    use tracing::Level;

    /// Configuration for the subscriber installed by [`init_logging`].
    #[derive(Debug, Clone)]
    pub struct LoggingConfig {
        /// Log level for the application
        pub level: Level,
        /// Log level for this crate specifically
        pub library_level: Level,
        /// Whether to use JSON output format
        pub json_format: bool,
        /// Environment filter override
        pub env_filter: Option<String>,
    }

    impl Default for LoggingConfig {
        fn default() -> Self {
            Self {
                level: Level::INFO,
                library_level: Level::INFO,
                json_format: false,
                env_filter: None,
            }
        }
    }

    impl LoggingConfig {
        /// JSON output, library events from `info` up.
        pub fn production() -> Self {
            Self {
                level: Level::WARN,
                library_level: Level::INFO,
                json_format: true,
                env_filter: None,
            }
        }

        /// Human-readable output with every send logged.
        pub fn development() -> Self {
            Self {
                level: Level::DEBUG,
                library_level: Level::TRACE,
                json_format: false,
                env_filter: None,
            }
        }

        pub fn with_level(mut self, level: Level) -> Self {
            self.level = level;
            self
        }

        pub fn with_library_level(mut self, level: Level) -> Self {
            self.library_level = level;
            self
        }

        pub fn with_json_format(mut self, enabled: bool) -> Self {
            self.json_format = enabled;
            self
        }

        /// Sets a custom environment filter.
        pub fn with_env_filter(mut self, filter: impl Into<String>) -> Self {
            self.env_filter = Some(filter.into());
            self
        }

        /// Builds the environment filter string.
        pub fn env_filter(&self) -> String {
            if let Some(ref filter) = self.env_filter {
                filter.clone()
            } else {
                format!(
                    "{},term_librato={}",
                    self.level.as_str().to_lowercase(),
                    self.library_level.as_str().to_lowercase()
                )
            }
        }
    }

    /// Installs a global `tracing` subscriber.
    ///
    /// `RUST_LOG` takes precedence over the configured filter. Fails if a
    /// subscriber is already installed.
    ///
    /// # Examples
    ///
    /// ```rust,no_run
    /// use term_librato::logging::setup::{init_logging, LoggingConfig};
    ///
    /// init_logging(LoggingConfig::development().with_json_format(true)).unwrap();
    /// ```
    pub fn init_logging(config: LoggingConfig) -> Result<(), Box<dyn std::error::Error>> {
        use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

        let env_filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(config.env_filter()));

        let fmt_layer = if config.json_format {
            tracing_subscriber::fmt::layer().json().boxed()
        } else {
            tracing_subscriber::fmt::layer().boxed()
        };

        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt_layer)
            .try_init()?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::setup::LoggingConfig;
    use super::*;
    use tracing::Level;

    #[test]
    fn test_truncate_field() {
        let short_text = "hello";
        assert_eq!(truncate_field(short_text, 10), "hello");

        let long_text = "this is a very long text that should be truncated";
        assert_eq!(truncate_field(long_text, 10), "this is a ...(truncated)");
    }

    #[test]
    fn test_truncate_field_respects_char_boundaries() {
        assert_eq!(truncate_field("ééé", 3), "é...(truncated)");
    }

    #[test]
    fn test_env_filter() {
        assert_eq!(LoggingConfig::default().env_filter(), "info,term_librato=info");
        assert_eq!(
            LoggingConfig::production().env_filter(),
            "warn,term_librato=info"
        );
        assert_eq!(
            LoggingConfig::default()
                .with_level(Level::ERROR)
                .with_library_level(Level::DEBUG)
                .env_filter(),
            "error,term_librato=debug"
        );
        assert_eq!(
            LoggingConfig::default()
                .with_env_filter("term_librato=trace")
                .env_filter(),
            "term_librato=trace"
        );
    }

    #[test]
    fn test_presets() {
        assert!(LoggingConfig::production().json_format);
        assert!(!LoggingConfig::development().json_format);
        assert_eq!(LoggingConfig::development().library_level, Level::TRACE);
    }
}
