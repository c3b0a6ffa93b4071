use std::env;

use crate::utils::Logger;

pub const NEWS_API_KEY_VAR: &str = "NEWS_API_KEY";
pub const MARKET_DATA_API_KEY_VAR: &str = "MARKET_DATA_API_KEY";

/// API keys read from the environment (and `.env` when present)
#[derive(Clone, Default)]
pub struct Credentials {
    pub news_api_key: Option<String>,
    pub market_data_api_key: Option<String>,
}

impl Credentials {
    pub fn from_env() -> Self {
        // A missing .env file is normal
        let _ = dotenvy::dotenv();
        Self {
            news_api_key: non_blank_var(NEWS_API_KEY_VAR),
            market_data_api_key: non_blank_var(MARKET_DATA_API_KEY_VAR),
        }
    }

    /// One line per missing credential, describing the degraded behaviour
    pub fn startup_notices(&self) -> Vec<String> {
        let mut notices = Vec::new();
        if self.news_api_key.is_none() {
            notices.push(format!(
                "{} is not set; live headlines are disabled and only the historical archive is available",
                NEWS_API_KEY_VAR
            ));
        }
        if self.market_data_api_key.is_none() {
            notices.push(format!(
                "{} is not set; using the public market data endpoint",
                MARKET_DATA_API_KEY_VAR
            ));
        }
        notices
    }

    pub fn log_startup_notices(&self) {
        let logger = Logger::new("CONFIG");
        for notice in self.startup_notices() {
            logger.warn(&notice);
        }
    }
}

// Keys are never printed
impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("news_api_key", &self.news_api_key.as_ref().map(|_| "***"))
            .field("market_data_api_key", &self.market_data_api_key.as_ref().map(|_| "***"))
            .finish()
    }
}

fn non_blank_var(name: &str) -> Option<String> {
    env::var(name).ok().map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}
