use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::graph::window::DEFAULT_REFERENCE_OFFSET_HOURS;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub api_server: ServerConfig,
    pub graph: GraphConfig,
    pub store: StoreConfig,
    pub app: Option<AppCredentials>,
    pub telegram: Option<TelegramConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphConfig {
    pub base_url: String,
    /// Reference UTC offset (hours) used when translating date presets.
    /// Defaults to +7 for compatibility with legacy deployments.
    pub reference_offset_hours: i32,
    pub request_timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Path of the flat JSON file holding ad-account credentials
    pub accounts_file: String,
}

/// Facebook app credentials, needed only for token exchange and inspection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppCredentials {
    pub app_id: String,
    pub app_secret: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelegramConfig {
    pub bot_token: String,
    pub chat_id: String,
}

impl GraphConfig {
    const fn default_timeout_secs() -> u64 {
        30
    }
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let api_host = std::env::var("API_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let api_port = std::env::var("API_PORT")
            .unwrap_or_else(|_| "8080".to_string())
            .parse::<u16>()
            .context("API_PORT must be a valid port number")?;

        let base_url = std::env::var("GRAPH_API_BASE_URL")
            .unwrap_or_else(|_| "https://graph.facebook.com/v19.0".to_string());

        let reference_offset_hours = match std::env::var("REFERENCE_UTC_OFFSET_HOURS") {
            Ok(raw) => raw.parse::<i32>().unwrap_or_else(|_| {
                tracing::warn!(
                    "Invalid REFERENCE_UTC_OFFSET_HOURS '{raw}', falling back to +{DEFAULT_REFERENCE_OFFSET_HOURS}"
                );
                DEFAULT_REFERENCE_OFFSET_HOURS
            }),
            Err(_) => DEFAULT_REFERENCE_OFFSET_HOURS,
        };

        let request_timeout_secs = std::env::var("GRAPH_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or_else(GraphConfig::default_timeout_secs);

        let accounts_file =
            std::env::var("ACCOUNTS_FILE").unwrap_or_else(|_| "./accounts.json".to_string());

        let app = match (std::env::var("FB_APP_ID"), std::env::var("FB_APP_SECRET")) {
            (Ok(app_id), Ok(app_secret)) => Some(AppCredentials { app_id, app_secret }),
            _ => None,
        };

        let telegram = match (
            std::env::var("TELEGRAM_BOT_TOKEN"),
            std::env::var("TELEGRAM_CHAT_ID"),
        ) {
            (Ok(bot_token), Ok(chat_id)) => Some(TelegramConfig { bot_token, chat_id }),
            (Ok(_), Err(_)) | (Err(_), Ok(_)) => {
                tracing::warn!(
                    "Telegram requires both TELEGRAM_BOT_TOKEN and TELEGRAM_CHAT_ID; notifications disabled"
                );
                None
            }
            _ => None,
        };

        Ok(Config {
            api_server: ServerConfig {
                host: api_host,
                port: api_port,
            },
            graph: GraphConfig {
                base_url,
                reference_offset_hours,
                request_timeout_secs,
            },
            store: StoreConfig { accounts_file },
            app,
            telegram,
        })
    }
}
