//! Configuration for the ledger cache

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Default ledger capacity (entries kept before oldest-first eviction)
pub const DEFAULT_CAPACITY: usize = 10_000;

/// Ledger cache configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Data directory for RocksDB
    pub data_dir: PathBuf,

    /// Maximum number of entries kept in the snapshot
    pub capacity: usize,

    /// Remote ledger / scoring endpoint configuration
    pub remote: RemoteConfig,

    /// RocksDB configuration
    pub rocksdb: RocksDBConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("./data/ledger-cache"),
            capacity: DEFAULT_CAPACITY,
            remote: RemoteConfig::default(),
            rocksdb: RocksDBConfig::default(),
        }
    }
}

/// Remote endpoint configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteConfig {
    /// Base URL of the remote ledger / scoring service
    pub base_url: String,

    /// Request timeout (seconds)
    pub request_timeout_secs: u64,

    /// Maximum number of entries requested on hydrate
    pub fetch_limit: usize,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:10000".to_string(),
            request_timeout_secs: 5,    // Stalled remote must never block local work
            fetch_limit: 50,
        }
    }
}

/// RocksDB configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RocksDBConfig {
    /// Write buffer size (MB)
    pub write_buffer_size_mb: usize,

    /// Max background jobs (compaction + flush)
    pub max_background_jobs: i32,
}

impl Default for RocksDBConfig {
    fn default() -> Self {
        Self {
            write_buffer_size_mb: 32,   // Single-document workload, small buffers suffice
            max_background_jobs: 2,
        }
    }
}

impl Config {
    /// Load from file
    pub fn from_file(path: impl AsRef<std::path::Path>) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)
            .map_err(|e| crate::Error::Config(format!("Failed to parse config: {}", e)))?;
        Ok(config)
    }

    /// Load from environment variables
    pub fn from_env() -> crate::Result<Self> {
        let mut config = Config::default();

        if let Ok(data_dir) = std::env::var("LEDGER_DATA_DIR") {
            config.data_dir = PathBuf::from(data_dir);
        }

        if let Ok(url) = std::env::var("LEDGER_REMOTE_URL") {
            config.remote.base_url = url;
        }

        if let Some(secs) = std::env::var("LEDGER_REMOTE_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
        {
            config.remote.request_timeout_secs = secs;
        }

        if let Some(capacity) = std::env::var("LEDGER_CAPACITY")
            .ok()
            .and_then(|s| s.parse().ok())
        {
            config.capacity = capacity;
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.capacity, 10_000);
        assert_eq!(config.remote.request_timeout_secs, 5);
        assert_eq!(config.remote.fetch_limit, 50);
    }

    #[test]
    fn test_config_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let source = Config {
            capacity: 25,
            ..Config::default()
        };
        std::fs::write(&path, toml::to_string(&source).unwrap()).unwrap();

        let loaded = Config::from_file(&path).unwrap();
        assert_eq!(loaded.capacity, 25);
        assert_eq!(loaded.remote.base_url, source.remote.base_url);
    }
}
