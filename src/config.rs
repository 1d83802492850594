use anyhow::Context;
use serde::Deserialize;

pub const DEFAULT_API_URL: &str = "http://localhost:8000";

#[derive(Clone, Debug, Deserialize)]
pub struct Config {
    pub database_url: String,
    pub server_port: u16,
    pub seed_sample_data: bool,
    pub api_base_url: String,
}

impl Config {
    /// Load configuration from environment variables, applying defaults where appropriate.
    ///
    /// # Errors
    /// Returns an error if `SERVER_PORT` or `SEED_SAMPLE_DATA` is set but cannot be parsed.
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`Config::from_env`], reading variables through `lookup`.
    ///
    /// # Errors
    /// Returns an error if `SERVER_PORT` or `SEED_SAMPLE_DATA` is set but cannot be parsed.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let database_url =
            lookup("DATABASE_URL").unwrap_or_else(|| "sqlite://books.db".to_string());
        let server_port = match lookup("SERVER_PORT") {
            Some(v) => v
                .parse()
                .with_context(|| format!("SERVER_PORT is not a valid port: {v}"))?,
            None => 8000,
        };
        let seed_sample_data = match lookup("SEED_SAMPLE_DATA") {
            Some(v) => parse_flag(&v).with_context(|| format!("SEED_SAMPLE_DATA is not a flag: {v}"))?,
            None => false,
        };
        let api_base_url = lookup("BOOK_API_URL").unwrap_or_else(|| DEFAULT_API_URL.to_string());

        Ok(Self {
            database_url,
            server_port,
            seed_sample_data,
            api_base_url,
        })
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" | "" => Some(false),
        _ => None,
    }
}
