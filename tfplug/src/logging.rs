//! Logging setup for provider processes
//!
//! Stdout belongs to the plugin handshake, so logs always go to stderr.

use std::sync::Once;

/// Log level for provider logging
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    /// Parses TF_LOG style level names, case-insensitively
    pub fn parse(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "trace" => Some(LogLevel::Trace),
            "debug" => Some(LogLevel::Debug),
            "info" => Some(LogLevel::Info),
            "warn" => Some(LogLevel::Warn),
            "error" => Some(LogLevel::Error),
            _ => None,
        }
    }

    /// Level from the TF_LOG environment variable, Info when unset or unknown
    pub fn from_env() -> Self {
        std::env::var("TF_LOG")
            .ok()
            .and_then(|v| Self::parse(&v))
            .unwrap_or(LogLevel::Info)
    }
}

impl From<LogLevel> for tracing::Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Trace => tracing::Level::TRACE,
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Error => tracing::Level::ERROR,
        }
    }
}

static INIT: Once = Once::new();

/// Installs a global fmt subscriber writing to stderr. Later calls are no-ops.
pub fn init(level: LogLevel) {
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::from(level))
            .with_writer(std::io::stderr)
            .with_ansi(false)
            .try_init();
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_level_names() {
        assert_eq!(LogLevel::parse("DEBUG"), Some(LogLevel::Debug));
        assert_eq!(LogLevel::parse("warn"), Some(LogLevel::Warn));
        assert_eq!(LogLevel::parse("verbose"), None);
    }

    #[test]
    fn init_is_idempotent() {
        init(LogLevel::Debug);
        init(LogLevel::Error);
        tracing::debug!("logging initialized");
    }
}
