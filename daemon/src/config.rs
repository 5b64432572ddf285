//! Explorer configuration with TOML file support.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use dagview_explorer::ExplorerSettings;
use dagview_rpc::RpcSettings;
use dagview_types::{Address, WitnessParams};
use dagview_utils::LogFormat;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Configuration for the explorer daemon.
///
/// Loaded from a TOML file via [`ExplorerConfig::from_toml_file`]; every
/// field can then be overridden from the command line or a `DAGVIEW_*`
/// environment variable.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ExplorerConfig {
    /// LMDB directory.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// LMDB map size in MiB.
    #[serde(default = "default_map_size_mb")]
    pub map_size_mb: usize,

    #[serde(default = "default_rpc_host")]
    pub rpc_host: String,

    #[serde(default = "default_rpc_port")]
    pub rpc_port: u16,

    #[serde(default = "default_log_format")]
    pub log_format: LogFormat,

    /// Log level filter: "trace", "debug", "info", "warn", "error".
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Size of every witness list.
    #[serde(default = "default_count_witnesses")]
    pub count_witnesses: usize,

    /// Distinct witnesses that make a majority.
    #[serde(default = "default_majority_of_witnesses")]
    pub majority_of_witnesses: usize,

    /// Witness set for units of protocol version 4 and later.
    #[serde(default)]
    pub op_list: Vec<String>,

    /// Deadline for the ledger work of a single request.
    #[serde(default = "default_query_timeout_ms")]
    pub query_timeout_ms: u64,

    /// Page size of listings that name none.
    #[serde(default = "default_last_units_limit")]
    pub last_units_limit: usize,

    #[serde(default = "default_max_page_limit")]
    pub max_page_limit: usize,
}

// ── Serde default helpers ──────────────────────────────────────────────

fn default_data_dir() -> PathBuf {
    PathBuf::from("./dagview_data")
}

fn default_map_size_mb() -> usize {
    1024
}

fn default_rpc_host() -> String {
    "127.0.0.1".to_string()
}

fn default_rpc_port() -> u16 {
    6611
}

fn default_log_format() -> LogFormat {
    LogFormat::Human
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_count_witnesses() -> usize {
    WitnessParams::MAINNET.count_witnesses
}

fn default_majority_of_witnesses() -> usize {
    WitnessParams::MAINNET.majority_of_witnesses
}

fn default_query_timeout_ms() -> u64 {
    10_000
}

fn default_last_units_limit() -> usize {
    100
}

fn default_max_page_limit() -> usize {
    1000
}

// ── Impl ───────────────────────────────────────────────────────────────

impl ExplorerConfig {
    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(s)?)
    }

    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Check cross-field constraints.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.witness_params()?;
        self.op_list_addresses()?;
        if !self.op_list.is_empty() && self.op_list.len() != self.count_witnesses {
            return Err(ConfigError::Invalid(format!(
                "op_list has {} addresses, expected {}",
                self.op_list.len(),
                self.count_witnesses
            )));
        }
        if self.last_units_limit == 0 || self.max_page_limit == 0 {
            return Err(ConfigError::Invalid("page limits must be at least 1".into()));
        }
        if self.map_size_mb == 0 {
            return Err(ConfigError::Invalid("map_size_mb must be at least 1".into()));
        }
        self.rpc_addr()?;
        Ok(())
    }

    pub fn witness_params(&self) -> Result<WitnessParams, ConfigError> {
        WitnessParams::new(self.count_witnesses, self.majority_of_witnesses)
            .map_err(|e| ConfigError::Invalid(e.to_string()))
    }

    fn op_list_addresses(&self) -> Result<Vec<Address>, ConfigError> {
        self.op_list
            .iter()
            .map(|raw| Address::parse(raw).map_err(|e| ConfigError::Invalid(e.to_string())))
            .collect()
    }

    pub fn explorer_settings(&self) -> Result<ExplorerSettings, ConfigError> {
        Ok(ExplorerSettings {
            witness_params: self.witness_params()?,
            op_list: self.op_list_addresses()?,
        })
    }

    pub fn rpc_settings(&self) -> RpcSettings {
        RpcSettings {
            query_timeout: self.query_timeout(),
            last_units_limit: self.last_units_limit,
            max_page_limit: self.max_page_limit,
        }
    }

    pub fn query_timeout(&self) -> Duration {
        Duration::from_millis(self.query_timeout_ms)
    }

    pub fn map_size_bytes(&self) -> usize {
        self.map_size_mb.saturating_mul(1024 * 1024)
    }

    pub fn rpc_addr(&self) -> Result<SocketAddr, ConfigError> {
        format!("{}:{}", self.rpc_host, self.rpc_port)
            .parse()
            .map_err(|e| ConfigError::Invalid(format!("rpc address: {e}")))
    }
}

impl Default for ExplorerConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            map_size_mb: default_map_size_mb(),
            rpc_host: default_rpc_host(),
            rpc_port: default_rpc_port(),
            log_format: default_log_format(),
            log_level: default_log_level(),
            count_witnesses: default_count_witnesses(),
            majority_of_witnesses: default_majority_of_witnesses(),
            op_list: Vec::new(),
            query_timeout_ms: default_query_timeout_ms(),
            last_units_limit: default_last_units_limit(),
            max_page_limit: default_max_page_limit(),
        }
    }
}
