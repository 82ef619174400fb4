// src/config.rs

use serde::Deserialize;
use std::path::PathBuf;

use crate::insights::{DEFAULT_GEMINI_MODEL, GEMINI_API_BASE_URL};
use crate::state::DEFAULT_STATE_FILE;

pub const ENV_PREFIX: &str = "OCCUPANCY_";

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct Config {
    // Server
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,

    // Persistence
    #[serde(default = "default_state_file")]
    pub state_file: PathBuf,

    // Generative insights; the endpoint is disabled without a key
    #[serde(default)]
    pub gemini_api_key: Option<String>,
    #[serde(default = "default_gemini_model")]
    pub gemini_model: String,
    #[serde(default = "default_gemini_base_url")]
    pub gemini_base_url: String,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_state_file() -> PathBuf {
    PathBuf::from(DEFAULT_STATE_FILE)
}

fn default_gemini_model() -> String {
    DEFAULT_GEMINI_MODEL.to_string()
}

fn default_gemini_base_url() -> String {
    GEMINI_API_BASE_URL.to_string()
}

impl Config {
    pub fn from_env() -> Result<Self, envy::Error> {
        // Load .env file if it exists
        dotenv::dotenv().ok();

        envy::prefixed(ENV_PREFIX).from_env::<Config>()
    }

    /// Parse from explicit key/value pairs, unprefixed (`PORT`, `STATE_FILE`, ...).
    pub fn from_pairs<I>(pairs: I) -> Result<Self, envy::Error>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        envy::from_iter(pairs)
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn gemini_api_key(&self) -> Option<&str> {
        self.gemini_api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
    }
}
