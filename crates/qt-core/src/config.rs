//! Configuration parsing for a strategy process.
//!
//! Each strategy instance reads a single JSON file. Only `contracts_file` is
//! required; every other field has a default.
//!
//! # Example config
//!
//! ```json
//! {
//!   "module": { "module_name": "grid", "log_path": "/tmp/log" },
//!   "strategy_id": "grid",
//!   "contracts_file": "config/contracts.csv",
//!   "bus": { "url": "redis://127.0.0.1:6379", "md_channel_prefix": "" },
//!   "outbound_queue_size": 1024,
//!   "reconnect": { "initial_ms": 100, "max_ms": 30000, "max_retries": 10 },
//!   "cpu_affinity": 2
//! }
//! ```

use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::warn;

use crate::backoff::BackoffConfig;
use crate::error::{QtError, Result};
use crate::types::STRATEGY_ID_LEN;

/// Top-level application config, deserialized from a JSON file.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Module metadata (name, log path).
    #[serde(default)]
    pub module: Option<ModuleMeta>,

    /// Strategy identifier; also the name of the order-response channel.
    /// Empty means the strategy receives no order responses.
    #[serde(default)]
    pub strategy_id: String,

    /// Contract reference file (CSV).
    pub contracts_file: PathBuf,

    #[serde(default)]
    pub bus: BusConfig,

    /// Capacity of the bounded outbound command queue.
    #[serde(default = "default_outbound_queue_size")]
    pub outbound_queue_size: usize,

    #[serde(default)]
    pub reconnect: BackoffConfig,

    /// CPU core to pin the strategy thread to.
    #[serde(default)]
    pub cpu_affinity: Option<usize>,
}

impl AppConfig {
    /// Returns the module name, falling back to the strategy id.
    pub fn module_name(&self) -> String {
        self.module
            .as_ref()
            .and_then(|m| m.module_name.clone())
            .unwrap_or_else(|| {
                if self.strategy_id.is_empty() {
                    "strategy".to_string()
                } else {
                    self.strategy_id.clone()
                }
            })
    }

    /// Returns the log path.
    pub fn log_path(&self) -> Option<String> {
        self.module.as_ref().and_then(|m| m.log_path.clone())
    }

    fn validate(&self) -> Result<()> {
        if self.outbound_queue_size == 0 {
            return Err(QtError::Config("outbound_queue_size must be > 0".into()));
        }
        if self.reconnect.initial_ms == 0 || self.reconnect.max_ms < self.reconnect.initial_ms {
            return Err(QtError::Config(format!(
                "reconnect: need 0 < initial_ms <= max_ms, got {}..{}",
                self.reconnect.initial_ms, self.reconnect.max_ms
            )));
        }
        if self.strategy_id.len() > STRATEGY_ID_LEN {
            warn!(
                "strategy_id '{}' is longer than {STRATEGY_ID_LEN} bytes and will be truncated on the wire",
                self.strategy_id
            );
        }
        Ok(())
    }
}

/// Module metadata block.
#[derive(Debug, Clone, Deserialize)]
pub struct ModuleMeta {
    pub module_name: Option<String>,
    pub log_path: Option<String>,
}

/// Message bus connection settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BusConfig {
    /// Bus endpoint, e.g. `redis://127.0.0.1:6379`.
    pub url: String,
    /// Prepended to a ticker to form its market-data channel.
    pub md_channel_prefix: String,
}

impl Default for BusConfig {
    fn default() -> Self {
        Self { url: "redis://127.0.0.1:6379".to_string(), md_channel_prefix: String::new() }
    }
}

impl BusConfig {
    /// Market-data channel for `ticker`.
    pub fn md_channel(&self, ticker: &str) -> String {
        format!("{}{ticker}", self.md_channel_prefix)
    }
}

fn default_outbound_queue_size() -> usize {
    1024
}

/// Parse and validate a JSON config string.
pub fn parse_config(content: &str) -> Result<AppConfig> {
    let config: AppConfig =
        serde_json::from_str(content).map_err(|e| QtError::Config(e.to_string()))?;
    config.validate()?;
    Ok(config)
}

/// Load and parse a JSON config file.
pub fn load_config(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| QtError::Config(format!("cannot read {}: {e}", path.display())))?;
    parse_config(&content)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimal_config_uses_defaults() {
        let cfg = parse_config(r#"{ "contracts_file": "contracts.csv" }"#).unwrap();
        assert_eq!(cfg.strategy_id, "");
        assert_eq!(cfg.bus.url, "redis://127.0.0.1:6379");
        assert_eq!(cfg.outbound_queue_size, 1024);
        assert_eq!(cfg.reconnect.max_retries, 10);
        assert_eq!(cfg.cpu_affinity, None);
        assert_eq!(cfg.module_name(), "strategy");
    }

    #[test]
    fn full_config() {
        let cfg = parse_config(
            r#"{
                "module": { "module_name": "grid_md", "log_path": "/tmp/log" },
                "strategy_id": "grid",
                "contracts_file": "config/contracts.csv",
                "bus": { "url": "redis://10.0.0.1:6380", "md_channel_prefix": "md-" },
                "outbound_queue_size": 64,
                "reconnect": { "initial_ms": 50, "max_ms": 1000, "max_retries": 3 },
                "cpu_affinity": 2
            }"#,
        )
        .unwrap();
        assert_eq!(cfg.module_name(), "grid_md");
        assert_eq!(cfg.log_path().as_deref(), Some("/tmp/log"));
        assert_eq!(cfg.bus.md_channel("IF2309"), "md-IF2309");
        assert_eq!(cfg.reconnect.initial_ms, 50);
        assert_eq!(cfg.cpu_affinity, Some(2));
    }

    #[test]
    fn missing_contracts_file_rejected() {
        assert!(matches!(parse_config(r#"{ "strategy_id": "x" }"#), Err(QtError::Config(_))));
    }

    #[test]
    fn zero_queue_rejected() {
        let err = parse_config(r#"{ "contracts_file": "c.csv", "outbound_queue_size": 0 }"#);
        assert!(err.is_err());
    }

    #[test]
    fn inverted_backoff_rejected() {
        let err = parse_config(
            r#"{ "contracts_file": "c.csv", "reconnect": { "initial_ms": 500, "max_ms": 100 } }"#,
        );
        assert!(err.is_err());
    }
}
