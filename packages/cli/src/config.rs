// ABOUTME: Environment-driven configuration for the specgen CLI
// ABOUTME: Resolves database location, pool size and AI provider settings

use std::env;
use std::num::ParseIntError;
use std::path::PathBuf;

use specgen_ai::{AIService, DEFAULT_MODEL};
use specgen_storage::StorageConfig;
use thiserror::Error;

const MAX_CONNECTIONS_LIMIT: u32 = 100;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid max connections: {0}")]
    InvalidMaxConnections(#[from] ParseIntError),
    #[error("Max connections {0} is out of valid range (1-100)")]
    MaxConnectionsOutOfRange(u32),
    #[error("Database path cannot be empty")]
    EmptyDatabasePath,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub db_path: PathBuf,
    pub max_connections: u32,
    pub anthropic_api_key: Option<String>,
    pub anthropic_model: String,
    pub ai_base_url: Option<String>,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        let db_path = match env::var("SPECGEN_DB_PATH") {
            Ok(path) if path.trim().is_empty() => return Err(ConfigError::EmptyDatabasePath),
            Ok(path) => PathBuf::from(path.trim()),
            Err(_) => specgen_core::database_file(),
        };

        let max_connections = env::var("SPECGEN_MAX_CONNECTIONS")
            .unwrap_or_else(|_| "5".to_string())
            .trim()
            .parse::<u32>()?;
        if max_connections == 0 || max_connections > MAX_CONNECTIONS_LIMIT {
            return Err(ConfigError::MaxConnectionsOutOfRange(max_connections));
        }

        let anthropic_api_key = env::var("ANTHROPIC_API_KEY")
            .ok()
            .filter(|key| !key.trim().is_empty());

        let anthropic_model = env::var("ANTHROPIC_MODEL")
            .ok()
            .filter(|model| !model.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_MODEL.to_string());

        let ai_base_url = env::var("SPECGEN_AI_BASE_URL")
            .ok()
            .filter(|url| !url.trim().is_empty());

        Ok(Config {
            db_path,
            max_connections,
            anthropic_api_key,
            anthropic_model,
            ai_base_url,
        })
    }

    pub fn storage_config(&self) -> StorageConfig {
        StorageConfig {
            max_connections: self.max_connections,
            ..StorageConfig::with_path(&self.db_path)
        }
    }

    pub fn ai_service(&self) -> AIService {
        let service = match &self.anthropic_api_key {
            Some(key) => AIService::with_api_key_and_model(key.clone(), self.anthropic_model.clone()),
            None => AIService::new(),
        };
        match &self.ai_base_url {
            Some(url) => service.with_base_url(url.clone()),
            None => service,
        }
    }
}
