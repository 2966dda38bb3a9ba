use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Where log output goes. Console output is always on; Loki shipping is
/// opt-in through `LOKI_ENABLED` and `LOKI_URL`.
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub loki_enabled: bool,
    pub loki_url: Option<String>,
    pub service_name: String,
    pub environment: String,
    pub log_level: String,
}

impl LoggingConfig {
    pub fn from_env() -> Self {
        Self {
            loki_enabled: std::env::var("LOKI_ENABLED")
                .map(|v| parse_flag(&v))
                .unwrap_or(false),
            loki_url: std::env::var("LOKI_URL").ok().filter(|v| !v.trim().is_empty()),
            service_name: std::env::var("SERVICE_NAME")
                .unwrap_or_else(|_| "portfolio-advisor".to_string()),
            environment: std::env::var("ENVIRONMENT")
                .unwrap_or_else(|_| "development".to_string()),
            log_level: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.loki_enabled && self.loki_url.is_none() {
            return Err("LOKI_ENABLED is true but LOKI_URL is not set".to_string());
        }
        Ok(())
    }

    /// The Loki push URL, only when shipping is switched on.
    pub fn loki_target(&self) -> Option<&str> {
        if self.loki_enabled {
            self.loki_url.as_deref()
        } else {
            None
        }
    }
}

fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

/// Install the global subscriber. Startup messages are emitted only once the
/// subscriber is in place so they are not lost.
pub fn init_logging(config: LoggingConfig) -> Result<(), Box<dyn std::error::Error>> {
    config.validate()?;

    let registry = tracing_subscriber::registry()
        .with(EnvFilter::new(&config.log_level))
        .with(fmt::layer());

    #[cfg(feature = "loki")]
    {
        if let Some(loki_url) = config.loki_target() {
            registry.with(loki_layer(&config, loki_url)?).init();
            tracing::info!(
                "📊 Logging to console and Loki at {} ({})",
                loki_url,
                config.environment
            );
            return Ok(());
        }
    }

    registry.init();
    tracing::info!("📊 Console logging initialized ({})", config.environment);
    Ok(())
}

/// Build the Loki layer and start its background sender.
#[cfg(feature = "loki")]
fn loki_layer(
    config: &LoggingConfig,
    loki_url: &str,
) -> Result<tracing_loki::Layer, Box<dyn std::error::Error>> {
    let (layer, task) = tracing_loki::builder()
        .label("service", &config.service_name)?
        .label("environment", &config.environment)?
        .build_url(url::Url::parse(loki_url)?)?;

    tokio::spawn(task);
    Ok(layer)
}
