use tracing_subscriber::EnvFilter;
use crate::util::config::LoggingConfig;

/// Installs the global `tracing` subscriber.
///
/// `RUST_LOG` takes precedence over the configured level. If a subscriber is already
/// installed (e.g. by the host application) this does nothing.
pub fn init(config: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.level));

    let result = match config.format.as_str() {
        "json" => tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .try_init(),
        _ => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .try_init(),
    };

    if result.is_err() {
        tracing::debug!("tracing subscriber already installed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_init_is_harmless() {
        let config = LoggingConfig::default();
        init(&config);
        init(&LoggingConfig { format: String::from("json"), ..config });
        tracing::info!("still logging");
    }
}
