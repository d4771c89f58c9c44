use time::{UtcOffset, format_description::well_known::Rfc3339};
use tracing_subscriber::{
    EnvFilter, Layer, Registry, fmt, fmt::time::OffsetTime, layer::SubscriberExt,
    util::SubscriberInitExt,
};

use crate::logger::{config::LoggerConfig, error::LoggerError, format::LoggerFormat};

type OutputLayer = Box<dyn Layer<Registry> + Send + Sync + 'static>;

/// Build the output layer for `cfg.format`, put the level filter on top and install globally.
pub(crate) fn install(cfg: &LoggerConfig) -> Result<(), LoggerError> {
    let filter = env_filter(&cfg.filter)?;
    let output = match cfg.format {
        LoggerFormat::Text => text_layer(cfg),
        LoggerFormat::Json => json_layer(cfg),
        LoggerFormat::Journald => journald_layer()?,
    };

    tracing_subscriber::registry()
        .with(output)
        .with(filter)
        .try_init()
        .map_err(|_| LoggerError::AlreadyInitialized)
}

fn env_filter(filter: &str) -> Result<EnvFilter, LoggerError> {
    EnvFilter::try_new(filter).map_err(|e| LoggerError::InvalidFilter {
        filter: filter.to_string(),
        reason: e.to_string(),
    })
}

// Local offset lookup can fail in multi-threaded processes; fall back to UTC.
fn timer() -> OffsetTime<Rfc3339> {
    let offset = UtcOffset::current_local_offset().unwrap_or(UtcOffset::UTC);
    OffsetTime::new(offset, Rfc3339)
}

fn text_layer(cfg: &LoggerConfig) -> OutputLayer {
    fmt::layer()
        .with_timer(timer())
        .with_target(cfg.targets)
        .with_ansi(cfg.color.enabled())
        .boxed()
}

/// One object per line; span context is carried in `spans` only.
fn json_layer(cfg: &LoggerConfig) -> OutputLayer {
    fmt::layer()
        .json()
        .with_timer(timer())
        .with_target(cfg.targets)
        .with_current_span(false)
        .with_ansi(false)
        .boxed()
}

#[cfg(all(target_os = "linux", feature = "journald"))]
fn journald_layer() -> Result<OutputLayer, LoggerError> {
    tracing_journald::layer()
        .map(|layer| layer.boxed())
        .map_err(|e| LoggerError::Journald(e.to_string()))
}

#[cfg(not(all(target_os = "linux", feature = "journald")))]
fn journald_layer() -> Result<OutputLayer, LoggerError> {
    Err(LoggerError::JournaldNotSupported)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logger::config::ColorMode;

    #[test]
    fn invalid_filter_is_rejected() {
        let cfg = LoggerConfig::new(LoggerFormat::Text, "wirebench=notalevel");
        assert!(matches!(
            install(&cfg),
            Err(LoggerError::InvalidFilter { filter, .. }) if filter == "wirebench=notalevel"
        ));
    }

    #[test]
    fn directive_lists_are_accepted() {
        assert!(env_filter("wirebench_server=debug,tower_http=warn,info").is_ok());
    }

    #[test]
    fn second_install_reports_already_initialized() {
        let cfg = LoggerConfig::new(LoggerFormat::Json, "info").with_color(ColorMode::Never);
        // Whichever test runs first owns the global default.
        let _ = install(&cfg);
        assert_eq!(install(&cfg), Err(LoggerError::AlreadyInitialized));
    }
}
