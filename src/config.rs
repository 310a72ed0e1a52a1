use std::fs;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

pub const DATABASE_URL_ENV: &str = "EAGRAPH_DATABASE_URL";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub database_url: String,
    pub max_connections: u32,
    /// Upper bound for one clone, version or delete, in milliseconds
    pub operation_timeout_ms: u64,
    /// Fresh-id retries per element before a clone gives up
    pub max_allocation_attempts: usize,
    pub sqlx_logging: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            database_url: "sqlite://eagraph.db?mode=rwc".to_string(),
            max_connections: 10,
            operation_timeout_ms: 30_000,
            max_allocation_attempts: 8,
            sqlx_logging: false,
        }
    }
}

impl EngineConfig {
    /// Load from a TOML file. A missing file yields the defaults; the
    /// database url can always be overridden from the environment.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let mut config = if path.exists() {
            let content = fs::read_to_string(path)
                .with_context(|| format!("Failed to read config {}", path.display()))?;
            Self::from_toml_str(&content)
                .with_context(|| format!("Failed to parse config {}", path.display()))?
        } else {
            Self::default()
        };

        if let Ok(url) = std::env::var(DATABASE_URL_ENV) {
            if !url.trim().is_empty() {
                config.database_url = url;
            }
        }

        Ok(config)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: EngineConfig = toml::from_str(content)?;
        if config.max_allocation_attempts == 0 {
            anyhow::bail!("max_allocation_attempts must be at least 1");
        }
        Ok(config)
    }

    pub fn in_memory() -> Self {
        Self {
            database_url: "sqlite::memory:".to_string(),
            max_connections: 1,
            ..Self::default()
        }
    }

    pub fn operation_timeout(&self) -> Duration {
        Duration::from_millis(self.operation_timeout_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config = EngineConfig::from_toml_str("operation_timeout_ms = 500\n").unwrap();
        assert_eq!(config.operation_timeout(), Duration::from_millis(500));
        assert_eq!(config.max_allocation_attempts, 8);
        assert_eq!(config.database_url, EngineConfig::default().database_url);
    }

    #[test]
    fn test_rejects_zero_allocation_attempts() {
        assert!(EngineConfig::from_toml_str("max_allocation_attempts = 0").is_err());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "database_url = \"sqlite::memory:\"").unwrap();
        writeln!(file, "sqlx_logging = true").unwrap();

        let config = EngineConfig::load(file.path()).unwrap();
        assert!(config.sqlx_logging);
        assert_eq!(config.max_connections, 10);
    }

    #[test]
    fn test_missing_file_falls_back_to_defaults() {
        let config = EngineConfig::load("/definitely/not/here/eagraph.toml").unwrap();
        assert_eq!(config.operation_timeout_ms, 30_000);
    }
}
