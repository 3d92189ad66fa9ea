use tracing_subscriber::EnvFilter;

use usage_ledger::core::config::LoggingSettings;

/// Install the stderr subscriber. `RUST_LOG` wins, then `--verbose`, then the
/// config's level and filter.
pub fn init(verbose: bool, settings: &LoggingSettings) {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(build_filter(verbose, settings))
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn build_filter(verbose: bool, settings: &LoggingSettings) -> EnvFilter {
    let base_level = if verbose { "debug" } else { settings.level.as_str() };

    if let Ok(env_filter) = std::env::var("RUST_LOG") {
        EnvFilter::try_new(env_filter).unwrap_or_else(|_| EnvFilter::new(base_level))
    } else if let Some(filter) = &settings.filter {
        let combined = format!("{},{}", base_level, filter);
        EnvFilter::try_new(combined).unwrap_or_else(|_| EnvFilter::new(base_level))
    } else {
        EnvFilter::new(base_level)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn verbose_forces_debug() {
        std::env::remove_var("RUST_LOG");
        let filter = build_filter(true, &LoggingSettings::default());
        assert!(filter.to_string().contains("debug"));
    }

    #[test]
    #[serial]
    fn config_filter_is_appended() {
        std::env::remove_var("RUST_LOG");
        let settings = LoggingSettings {
            level: "info".to_string(),
            filter: Some("usage_ledger=trace".to_string()),
        };
        let filter = build_filter(false, &settings).to_string();
        assert!(filter.contains("info"));
        assert!(filter.contains("usage_ledger=trace"));
    }
}
