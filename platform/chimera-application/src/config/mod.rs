use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

pub const ENV_API_KEY: &str = "ALPACA_API_KEY";
pub const ENV_SECRET_KEY: &str = "ALPACA_SECRET_KEY";
pub const STDOUT_OUTPUT: &str = "-";

#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
#[serde(deny_unknown_fields, default)]
pub struct Config {
    pub broker: BrokerConfig,
    pub market: MarketConfig,
    pub paths: PathsConfig,
    pub refresh: RefreshConfig,
    pub fonts: FontsConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(deny_unknown_fields, default)]
pub struct BrokerConfig {
    pub trading_url: String,
    pub data_url: String,
    pub api_key: Option<String>,
    pub secret_key: Option<String>,
    pub timeout_ms: u64,
}

impl Default for BrokerConfig {
    fn default() -> Self {
        Self {
            trading_url: "https://paper-api.alpaca.markets".to_string(),
            data_url: "https://data.alpaca.markets".to_string(),
            api_key: None,
            secret_key: None,
            timeout_ms: 10_000,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(deny_unknown_fields, default)]
pub struct MarketConfig {
    /// Symbol used for position lookups (`BTCUSD`).
    pub trading_symbol: String,
    /// Pair used for market data (`BTC/USD`).
    pub data_symbol: String,
    /// Unit shown next to the position quantity.
    pub asset_label: String,
    pub lookback_days: u32,
}

impl Default for MarketConfig {
    fn default() -> Self {
        Self {
            trading_symbol: "BTCUSD".to_string(),
            data_symbol: "BTC/USD".to_string(),
            asset_label: "BTC".to_string(),
            lookback_days: 60,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(deny_unknown_fields, default)]
pub struct PathsConfig {
    pub analysis_report: String,
    /// File path for the frame, or `-` for stdout.
    pub output: String,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            analysis_report: "last_cycle_report.json".to_string(),
            output: "live_dashboard.png".to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(deny_unknown_fields, default)]
pub struct RefreshConfig {
    pub interval_seconds: u64,
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self {
            interval_seconds: 30,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(deny_unknown_fields, default)]
pub struct FontsConfig {
    pub bold: String,
    pub medium: String,
    pub regular: String,
}

impl Default for FontsConfig {
    fn default() -> Self {
        Self {
            bold: "Poppins-Bold.ttf".to_string(),
            medium: "Poppins-Medium.ttf".to_string(),
            regular: "Poppins-Regular.ttf".to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(deny_unknown_fields, default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Text,
        }
    }
}

#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub api_key: String,
    pub secret_key: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("api_key", &redact(&self.api_key))
            .field("secret_key", &"***")
            .finish()
    }
}

fn redact(value: &str) -> String {
    let prefix: String = value.chars().take(4).collect();
    format!("{prefix}***")
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputTarget {
    Stdout,
    File(PathBuf),
}

impl Config {
    pub fn chart_caption(&self) -> String {
        format!(
            "{} Price Chart (Last {} Days)",
            self.market.data_symbol, self.market.lookback_days
        )
    }

    pub fn output_target(&self, base_dir: &Path) -> OutputTarget {
        if self.paths.output.trim() == STDOUT_OUTPUT {
            OutputTarget::Stdout
        } else {
            OutputTarget::File(resolve_relative(base_dir, &self.paths.output))
        }
    }

    pub fn analysis_report_path(&self, base_dir: &Path) -> PathBuf {
        resolve_relative(base_dir, &self.paths.analysis_report)
    }

    pub fn font_paths(&self, base_dir: &Path) -> [PathBuf; 3] {
        [
            resolve_relative(base_dir, &self.fonts.bold),
            resolve_relative(base_dir, &self.fonts.medium),
            resolve_relative(base_dir, &self.fonts.regular),
        ]
    }
}

/// Relative paths are anchored at `base_dir` (the config file's directory).
pub fn resolve_relative(base_dir: &Path, raw: &str) -> PathBuf {
    let path = Path::new(raw.trim());
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base_dir.join(path)
    }
}

/// Directory relative paths in `config_path` are resolved against.
pub fn config_base_dir(config_path: &Path) -> PathBuf {
    match config_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

pub fn load_config(path: &Path) -> Result<Config, String> {
    let contents = fs::read_to_string(path)
        .map_err(|err| format!("failed to read config {}: {}", path.display(), err))?;
    let config = parse_config(&contents)
        .map_err(|err| format!("failed to parse TOML {}: {}", path.display(), err))?;
    validate_config(&config)?;
    Ok(config)
}

pub fn parse_config(contents: &str) -> Result<Config, String> {
    toml::from_str(contents).map_err(|err| err.to_string())
}

pub fn validate_config(config: &Config) -> Result<(), String> {
    if config.market.trading_symbol.trim().is_empty() {
        return Err("market.trading_symbol must not be empty".to_string());
    }
    if config.market.data_symbol.trim().is_empty() {
        return Err("market.data_symbol must not be empty".to_string());
    }
    if config.market.lookback_days == 0 {
        return Err("market.lookback_days must be > 0".to_string());
    }
    if config.refresh.interval_seconds == 0 {
        return Err("refresh.interval_seconds must be > 0".to_string());
    }
    if config.broker.timeout_ms == 0 {
        return Err("broker.timeout_ms must be > 0".to_string());
    }
    if config.paths.output.trim().is_empty() {
        return Err("paths.output must not be empty (use \"-\" for stdout)".to_string());
    }
    Ok(())
}

pub fn resolve_credentials(broker: &BrokerConfig) -> Result<Credentials, String> {
    resolve_credentials_with(broker, |key| std::env::var(key).ok())
}

pub fn resolve_credentials_with(
    broker: &BrokerConfig,
    env: impl Fn(&str) -> Option<String>,
) -> Result<Credentials, String> {
    let pick = |configured: Option<&String>, env_key: &str, field: &str| {
        configured
            .filter(|v| !v.trim().is_empty())
            .cloned()
            .or_else(|| env(env_key).filter(|v| !v.trim().is_empty()))
            .ok_or_else(|| {
                format!("missing broker.{field} in config and env {env_key} is not set")
            })
    };
    Ok(Credentials {
        api_key: pick(broker.api_key.as_ref(), ENV_API_KEY, "api_key")?,
        secret_key: pick(broker.secret_key.as_ref(), ENV_SECRET_KEY, "secret_key")?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_config_uses_defaults() {
        let config = parse_config("").expect("empty config");
        assert_eq!(config.market.trading_symbol, "BTCUSD");
        assert_eq!(config.market.data_symbol, "BTC/USD");
        assert_eq!(config.market.lookback_days, 60);
        assert_eq!(config.refresh.interval_seconds, 30);
        assert_eq!(config.paths.output, "live_dashboard.png");
        assert_eq!(config.logging.format, LogFormat::Text);
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn parse_full_config() {
        let toml_str = r#"
[broker]
trading_url = "http://127.0.0.1:9000"
data_url = "http://127.0.0.1:9001"
api_key = "PK123"
secret_key = "shh"
timeout_ms = 2500

[market]
trading_symbol = "ETHUSD"
data_symbol = "ETH/USD"
asset_label = "ETH"
lookback_days = 30

[paths]
analysis_report = "reports/last.json"
output = "-"

[refresh]
interval_seconds = 5

[fonts]
bold = "/usr/share/fonts/Inter-Bold.ttf"
medium = "Inter-Medium.ttf"
regular = "Inter-Regular.ttf"

[logging]
level = "debug"
format = "json"
"#;
        let config = parse_config(toml_str).expect("config should parse");
        assert_eq!(config.broker.timeout_ms, 2500);
        assert_eq!(config.market.asset_label, "ETH");
        assert_eq!(config.logging.format, LogFormat::Json);
        assert_eq!(config.chart_caption(), "ETH/USD Price Chart (Last 30 Days)");
        assert_eq!(config.output_target(Path::new("/srv")), OutputTarget::Stdout);
        assert_eq!(
            config.analysis_report_path(Path::new("/srv")),
            PathBuf::from("/srv/reports/last.json")
        );
        let fonts = config.font_paths(Path::new("/srv"));
        assert_eq!(fonts[0], PathBuf::from("/usr/share/fonts/Inter-Bold.ttf"));
        assert_eq!(fonts[1], PathBuf::from("/srv/Inter-Medium.ttf"));
    }

    #[test]
    fn parse_config_rejects_unknown_fields() {
        let err = parse_config("[market]\nsymbol = \"BTCUSD\"\n").expect_err("unknown field");
        assert!(err.contains("unknown field"));
    }

    #[test]
    fn validate_rejects_zero_interval_and_lookback() {
        let mut config = Config::default();
        config.refresh.interval_seconds = 0;
        assert!(validate_config(&config)
            .expect_err("interval")
            .contains("interval_seconds"));

        let mut config = Config::default();
        config.market.lookback_days = 0;
        assert!(validate_config(&config)
            .expect_err("lookback")
            .contains("lookback_days"));
    }

    #[test]
    fn load_config_missing_file_returns_error() {
        let path = Path::new("/tmp/chimera-dashboard-missing-config.toml");
        let err = load_config(path).expect_err("expected load to fail");
        assert!(err.contains("failed to read config"));
    }

    #[test]
    fn config_base_dir_falls_back_to_cwd() {
        assert_eq!(config_base_dir(Path::new("dashboard.toml")), PathBuf::from("."));
        assert_eq!(
            config_base_dir(Path::new("/etc/chimera/dashboard.toml")),
            PathBuf::from("/etc/chimera")
        );
    }

    #[test]
    fn credentials_prefer_config_then_env() {
        let mut broker = BrokerConfig::default();
        broker.api_key = Some("PKCONFIG".to_string());
        let creds = resolve_credentials_with(&broker, |key| match key {
            ENV_API_KEY => Some("PKENV".to_string()),
            ENV_SECRET_KEY => Some("secret-from-env".to_string()),
            _ => None,
        })
        .expect("credentials");
        assert_eq!(creds.api_key, "PKCONFIG");
        assert_eq!(creds.secret_key, "secret-from-env");
        assert!(!format!("{creds:?}").contains("secret-from-env"));
    }

    #[test]
    fn credentials_missing_everywhere_is_an_error() {
        let err = resolve_credentials_with(&BrokerConfig::default(), |_| None)
            .expect_err("missing credentials");
        assert!(err.contains("ALPACA_API_KEY"));
    }
}
