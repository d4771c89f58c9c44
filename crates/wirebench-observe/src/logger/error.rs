use thiserror::Error;

/// Why the global subscriber could not be installed.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum LoggerError {
    #[error("unknown log format '{0}', use text, json or journald")]
    InvalidFormat(String),

    #[error("unknown colour mode '{0}', use auto, always or never")]
    InvalidColorMode(String),

    #[error("bad log filter '{filter}': {reason}")]
    InvalidFilter { filter: String, reason: String },

    #[error("journald output needs linux and the `journald` feature")]
    JournaldNotSupported,

    #[error("cannot reach journald: {0}")]
    Journald(String),

    #[error("a global tracing subscriber is already set")]
    AlreadyInitialized,
}
