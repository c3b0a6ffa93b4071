use anyhow::Context;
use chrono::NaiveDate;
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::PathBuf;
use std::time::Duration;
use stockdash::{
    config::Credentials,
    services::{NEWS_API_BASE_URL, REQUEST_TIMEOUT, YAHOO_BASE_URL},
    utils::{MARKET_TIMEZONE, today_in},
};

// YAML-serializable configuration structure; omitted keys take the defaults
#[derive(Serialize, Deserialize, Debug, Default)]
#[serde(default)]
pub struct ConfigYaml {
    pub instance_name: Option<String>,
    pub environment: Option<String>,
    pub port: Option<u16>,
    pub news_api_key: Option<String>,
    pub market_data_api_key: Option<String>,
    pub market_data_base_url: Option<String>,
    pub news_api_base_url: Option<String>,
    pub historical_news_path: Option<String>,
    pub historical_news_symbol: Option<String>,
    pub market_timezone: Option<String>,
    pub request_timeout_secs: Option<u64>,
    pub news_rate_per_second: Option<u64>,
    pub news_burst: Option<u32>,
}

// Holds application-wide settings
#[derive(Clone)]
pub struct AppConfig {
    pub instance_name: String,
    pub environment: String,
    pub port: u16,
    pub news_api_key: Option<String>,
    pub market_data_api_key: Option<String>,
    pub market_data_base_url: String,
    pub news_api_base_url: String,
    pub historical_news_path: PathBuf,
    pub historical_news_symbol: String,
    pub market_timezone: Tz,
    pub request_timeout: Duration,
    pub news_rate_per_second: u64,
    pub news_burst: u32,
}

impl AppConfig {
    // Load configuration from YAML file or environment variables
    pub fn load() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok(); // Load .env file if present

        if let Ok(config_file) = env::var("CONFIG_FILE") {
            Self::from_yaml(&config_file)
        } else {
            Self::from_env()
        }
    }

    pub fn from_yaml(file_path: &str) -> anyhow::Result<Self> {
        let yaml_content = fs::read_to_string(file_path)
            .with_context(|| format!("Failed to read config file {}", file_path))?;
        Self::from_yaml_str(&yaml_content)
    }

    pub fn from_yaml_str(yaml_content: &str) -> anyhow::Result<Self> {
        let yaml_config: ConfigYaml =
            serde_yaml::from_str(yaml_content).context("Failed to parse YAML config")?;
        Self::from_parts(yaml_config)
    }

    // Load all configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_parts(ConfigYaml {
            instance_name: env::var("INSTANCE_NAME").ok(),
            environment: env::var("ENVIRONMENT").ok(),
            port: parse_var("PORT")?,
            news_api_key: env::var("NEWS_API_KEY").ok(),
            market_data_api_key: env::var("MARKET_DATA_API_KEY").ok(),
            market_data_base_url: env::var("MARKET_DATA_BASE_URL").ok(),
            news_api_base_url: env::var("NEWS_API_BASE_URL").ok(),
            historical_news_path: env::var("HISTORICAL_NEWS_PATH").ok(),
            historical_news_symbol: env::var("HISTORICAL_NEWS_SYMBOL").ok(),
            market_timezone: env::var("MARKET_TIMEZONE").ok(),
            request_timeout_secs: parse_var("REQUEST_TIMEOUT_SECS")?,
            news_rate_per_second: parse_var("NEWS_RATE_PER_SECOND")?,
            news_burst: parse_var("NEWS_BURST")?,
        })
    }

    fn from_parts(raw: ConfigYaml) -> anyhow::Result<Self> {
        let market_timezone: Tz = match raw.market_timezone {
            Some(name) => name
                .parse()
                .map_err(|e| anyhow::anyhow!("Invalid market timezone {}: {}", name, e))?,
            None => MARKET_TIMEZONE,
        };

        let news_rate_per_second = raw.news_rate_per_second.unwrap_or(2);
        let news_burst = raw.news_burst.unwrap_or(5);
        if news_rate_per_second == 0 || news_burst == 0 {
            anyhow::bail!("news_rate_per_second and news_burst must be positive");
        }

        Ok(Self {
            instance_name: raw.instance_name.unwrap_or_else(|| "stockdash".to_string()),
            environment: raw.environment.unwrap_or_else(|| "development".to_string()),
            port: raw.port.unwrap_or(8888),
            news_api_key: non_blank(raw.news_api_key),
            market_data_api_key: non_blank(raw.market_data_api_key),
            market_data_base_url: raw
                .market_data_base_url
                .unwrap_or_else(|| YAHOO_BASE_URL.to_string()),
            news_api_base_url: raw
                .news_api_base_url
                .unwrap_or_else(|| NEWS_API_BASE_URL.to_string()),
            historical_news_path: PathBuf::from(
                raw.historical_news_path
                    .unwrap_or_else(|| "apple_historical_news.csv".to_string()),
            ),
            historical_news_symbol: raw
                .historical_news_symbol
                .unwrap_or_else(|| "AAPL".to_string())
                .to_ascii_uppercase(),
            market_timezone,
            request_timeout: raw
                .request_timeout_secs
                .map(Duration::from_secs)
                .unwrap_or(REQUEST_TIMEOUT),
            news_rate_per_second,
            news_burst,
        })
    }

    /// Calendar date at the market's location
    pub fn today_in_market(&self) -> NaiveDate {
        today_in(self.market_timezone)
    }

    pub fn credentials(&self) -> Credentials {
        Credentials {
            news_api_key: self.news_api_key.clone(),
            market_data_api_key: self.market_data_api_key.clone(),
        }
    }

    /// Degraded features, one line each, for the startup log and `/health`
    pub fn startup_notices(&self) -> Vec<String> {
        self.credentials().startup_notices()
    }
}

fn parse_var<T: std::str::FromStr>(name: &str) -> anyhow::Result<Option<T>>
where
    T::Err: std::fmt::Display,
{
    match env::var(name) {
        Ok(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|e| anyhow::anyhow!("Invalid {}={}: {}", name, value, e)),
        Err(_) => Ok(None),
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}
