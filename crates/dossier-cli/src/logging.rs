//! Subscriber setup from the `logging` config section.
//!
//! `RUST_LOG`, when set, takes precedence over `logging.level`. Output goes to
//! stderr so command output on stdout stays scriptable.

use dossier_config::{LogFormat, LoggingConfig};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Registry};

pub fn init(config: &LoggingConfig) -> Result<(), Box<dyn std::error::Error>> {
    let filter = build_env_filter(config)?;
    let base_subscriber = Registry::default().with(filter);

    match config.format {
        LogFormat::Json => base_subscriber
            .with(
                fmt::layer()
                    .json()
                    .with_target(true)
                    .with_writer(std::io::stderr),
            )
            .try_init()?,
        LogFormat::Text => base_subscriber
            .with(
                fmt::layer()
                    .with_target(true)
                    .with_writer(std::io::stderr),
            )
            .try_init()?,
    }

    Ok(())
}

fn build_env_filter(config: &LoggingConfig) -> Result<EnvFilter, Box<dyn std::error::Error>> {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return Ok(filter);
    }
    EnvFilter::try_new(&config.level)
        .map_err(|e| format!("Invalid logging.level '{}': {}", config.level, e).into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_from_level() {
        // Only meaningful when RUST_LOG is not set for the test run.
        if std::env::var("RUST_LOG").is_ok() {
            return;
        }
        let config = LoggingConfig {
            level: "dossier_core=debug,warn".to_string(),
            ..LoggingConfig::default()
        };
        assert!(build_env_filter(&config).is_ok());
    }

    #[test]
    fn test_invalid_level_rejected() {
        if std::env::var("RUST_LOG").is_ok() {
            return;
        }
        let config = LoggingConfig {
            level: "dossier_core=loud".to_string(),
            ..LoggingConfig::default()
        };
        assert!(build_env_filter(&config).is_err());
    }
}
