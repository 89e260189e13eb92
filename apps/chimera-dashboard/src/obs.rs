use chimera_application::config::{LogFormat, LoggingConfig};
use std::net::SocketAddr;

pub const ENV_LOG: &str = "CHIMERA_LOG";
pub const ENV_METRICS_ADDR: &str = "CHIMERA_METRICS_ADDR";

/// `CHIMERA_LOG` wins over the configured level.
pub fn log_filter(logging: &LoggingConfig, env_value: Option<String>) -> String {
    env_value
        .filter(|value| !value.trim().is_empty())
        .unwrap_or_else(|| logging.level.clone())
}

/// Installs the global subscriber. Logs go to stderr; stdout may carry frames.
pub fn init_tracing(logging: &LoggingConfig) -> Result<(), String> {
    let filter = log_filter(logging, std::env::var(ENV_LOG).ok());
    let env_filter = tracing_subscriber::EnvFilter::try_new(&filter)
        .map_err(|err| format!("invalid log filter {filter:?}: {err}"))?;

    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr);
    let installed = match logging.format {
        LogFormat::Text => builder.try_init(),
        LogFormat::Json => builder.json().try_init(),
    };
    installed.map_err(|err| format!("failed to install tracing subscriber: {err}"))
}

#[cfg(feature = "prometheus")]
pub fn init_metrics() -> Result<Option<SocketAddr>, String> {
    use metrics_exporter_prometheus::PrometheusBuilder;

    let Some(raw) = std::env::var(ENV_METRICS_ADDR).ok() else {
        return Ok(None);
    };
    if raw.trim().is_empty() {
        return Ok(None);
    }

    let addr: SocketAddr = raw
        .trim()
        .parse()
        .map_err(|err| format!("invalid {ENV_METRICS_ADDR} (expected host:port): {err}"))?;

    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .map_err(|err| format!("failed to install prometheus exporter: {err}"))?;

    tracing::info!(metrics_addr = %addr, "prometheus metrics exporter enabled");
    Ok(Some(addr))
}

#[cfg(not(feature = "prometheus"))]
pub fn init_metrics() -> Result<Option<SocketAddr>, String> {
    Ok(None)
}
