use anyhow::{Context, Result};
use dotenvy::dotenv;
use std::env;

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    pub openai_api_key: String,
    pub model_name: String,
    pub content_safety_endpoint: String,
    pub content_safety_key: String,
    pub signalr_endpoint: String,
    pub signalr_access_key: String,
    pub signalr_hub: String,
    pub rate_limit_seconds: u64,
    pub completion_timeout_seconds: u64,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present (development)
        let _ = dotenv();

        Ok(Self {
            database_url: env::var("DATABASE_URL").context("DATABASE_URL must be set")?,
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .context("PORT must be a valid number")?,
            openai_api_key: env::var("OPENAI_API_KEY").context("OPENAI_API_KEY must be set")?,
            model_name: env::var("MODEL_NAME").unwrap_or_else(|_| "gpt-4o".to_string()),
            content_safety_endpoint: env::var("CONTENT_SAFETY_ENDPOINT")
                .context("CONTENT_SAFETY_ENDPOINT must be set")?,
            content_safety_key: env::var("CONTENT_SAFETY_KEY")
                .context("CONTENT_SAFETY_KEY must be set")?,
            signalr_endpoint: env::var("SIGNALR_ENDPOINT")
                .context("SIGNALR_ENDPOINT must be set")?,
            signalr_access_key: env::var("SIGNALR_ACCESS_KEY")
                .context("SIGNALR_ACCESS_KEY must be set")?,
            signalr_hub: env::var("SIGNALR_HUB").unwrap_or_else(|_| "askai".to_string()),
            rate_limit_seconds: env::var("RATE_LIMIT_SECONDS")
                .unwrap_or_else(|_| "20".to_string())
                .parse()
                .context("RATE_LIMIT_SECONDS must be a valid number")?,
            completion_timeout_seconds: env::var("COMPLETION_TIMEOUT_SECONDS")
                .unwrap_or_else(|_| "60".to_string())
                .parse()
                .context("COMPLETION_TIMEOUT_SECONDS must be a valid number")?,
        })
    }
}
