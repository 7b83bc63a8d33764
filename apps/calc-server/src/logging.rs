use anyhow::{Context, Result};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

use crate::config::{LogFormat, LoggingConfig};

/// Filter directives to use: `RUST_LOG` when present and non-empty, the configured level otherwise.
#[must_use]
pub fn directives(config: &LoggingConfig, rust_log: Option<String>) -> String {
    rust_log
        .filter(|d| !d.trim().is_empty())
        .unwrap_or_else(|| config.level.clone())
}

/// Install the global subscriber.
///
/// # Errors
/// Invalid filter directives, or a subscriber is already installed.
pub fn init(config: &LoggingConfig, directives: &str) -> Result<()> {
    let filter = EnvFilter::try_new(directives)
        .with_context(|| format!("invalid log filter '{directives}'"))?;
    let registry = tracing_subscriber::registry().with(filter);

    match config.format {
        LogFormat::Json => registry
            .with(fmt::layer().json().with_current_span(true))
            .try_init(),
        LogFormat::Pretty => registry.with(fmt::layer().with_target(true)).try_init(),
    }
    .context("failed to install tracing subscriber")
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn rust_log_wins_when_set() {
        let config = LoggingConfig::default();
        assert_eq!(directives(&config, None), "info");
        assert_eq!(directives(&config, Some("   ".to_owned())), "info");
        assert_eq!(
            directives(&config, Some("calculator=trace".to_owned())),
            "calculator=trace"
        );
    }

    #[test]
    fn bad_directives_are_rejected() {
        let config = LoggingConfig::default();
        assert!(init(&config, "calculator=loud").is_err());
    }
}
