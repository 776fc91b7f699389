//! Configuration for the Sui DAO SDK
//!
//! Values come from defaults, then `SUIDAO_*` environment variables, then CLI
//! flags merged on top.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::core::constants::{DEFAULT_PACKAGE_ID, DEFAULT_STORAGE_DIR};
use crate::ledger::LedgerBackend;
use crate::types::Network;

pub use crate::logging::LoggingConfig;

/// Chain access configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainConfig {
    pub network: Network,
    /// Fullnode endpoint; follows `network` unless set explicitly
    pub rpc_url: String,
    pub package_id: String,
    /// DAO object ids the RPC backend enumerates
    #[serde(default)]
    pub dao_objects: Vec<String>,
    /// Account the RPC backend reads balances and tokens for
    #[serde(default)]
    pub account: Option<String>,
}

impl Default for ChainConfig {
    fn default() -> Self {
        let network = Network::default();
        Self {
            network,
            rpc_url: network.fullnode_url().to_string(),
            package_id: DEFAULT_PACKAGE_ID.to_string(),
            dao_objects: Vec::new(),
            account: None,
        }
    }
}

/// Main configuration structure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    pub chain: ChainConfig,
    pub ledger: LedgerBackend,
    /// Directory holding one JSON file per persisted store
    pub storage_dir: String,
    pub logging: LoggingConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            chain: ChainConfig::default(),
            ledger: LedgerBackend::default(),
            storage_dir: DEFAULT_STORAGE_DIR.to_string(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set network; the endpoint follows it
    pub fn with_network(mut self, network: Network) -> Self {
        self.chain.network = network;
        self.chain.rpc_url = network.fullnode_url().to_string();
        self
    }

    /// Set the fullnode endpoint directly
    pub fn with_rpc_url(mut self, url: impl Into<String>) -> Self {
        self.chain.rpc_url = url.into();
        self
    }

    pub fn with_package_id(mut self, package_id: impl Into<String>) -> Self {
        self.chain.package_id = package_id.into();
        self
    }

    pub fn with_ledger(mut self, ledger: LedgerBackend) -> Self {
        self.ledger = ledger;
        self
    }

    pub fn with_storage_dir(mut self, dir: impl Into<String>) -> Self {
        self.storage_dir = dir.into();
        self
    }

    pub fn with_account(mut self, address: impl Into<String>) -> Self {
        self.chain.account = Some(address.into());
        self
    }

    pub fn with_dao_objects(mut self, ids: Vec<String>) -> Self {
        self.chain.dao_objects = ids;
        self
    }

    pub fn with_debug(mut self, debug: bool) -> Self {
        self.logging.debug = debug;
        self
    }

    /// Storage directory with `~` expanded
    pub fn storage_path(&self) -> PathBuf {
        expand_home(&self.storage_dir)
    }

    /// Load config from environment variables
    pub fn from_env() -> Self {
        let mut config = Self {
            logging: LoggingConfig::from_env(),
            ..Self::default()
        };

        if let Ok(network) = std::env::var("SUIDAO_NETWORK") {
            match network.parse::<Network>() {
                Ok(n) => config = config.with_network(n),
                Err(e) => tracing::warn!("Ignoring SUIDAO_NETWORK: {}", e),
            }
        }

        if let Ok(endpoint) = std::env::var("SUIDAO_RPC") {
            config.chain.rpc_url = endpoint;
        }

        if let Ok(package_id) = std::env::var("SUIDAO_PACKAGE_ID") {
            config.chain.package_id = package_id;
        }

        if let Ok(objects) = std::env::var("SUIDAO_DAO_OBJECTS") {
            config.chain.dao_objects = parse_id_list(&objects);
        }

        if let Ok(ledger) = std::env::var("SUIDAO_LEDGER") {
            match ledger.parse::<LedgerBackend>() {
                Ok(l) => config.ledger = l,
                Err(e) => tracing::warn!("Ignoring SUIDAO_LEDGER: {}", e),
            }
        }

        if let Ok(dir) = std::env::var("SUIDAO_STORAGE_DIR") {
            config.storage_dir = dir;
        }

        if let Ok(account) = std::env::var("SUIDAO_ACCOUNT") {
            if !account.trim().is_empty() {
                config.chain.account = Some(account.trim().to_string());
            }
        }

        config
    }

    /// Merge with another config (other takes precedence where it differs
    /// from the defaults)
    pub fn merge(mut self, other: Config) -> Self {
        let defaults = Config::default();
        if other.chain.network != defaults.chain.network {
            self.chain.network = other.chain.network;
            self.chain.rpc_url = other.chain.rpc_url.clone();
        }
        if other.chain.rpc_url != other.chain.network.fullnode_url() {
            self.chain.rpc_url = other.chain.rpc_url;
        }
        if other.chain.package_id != defaults.chain.package_id {
            self.chain.package_id = other.chain.package_id;
        }
        if !other.chain.dao_objects.is_empty() {
            self.chain.dao_objects = other.chain.dao_objects;
        }
        if other.chain.account.is_some() {
            self.chain.account = other.chain.account;
        }
        if other.ledger != defaults.ledger {
            self.ledger = other.ledger;
        }
        if other.storage_dir != defaults.storage_dir {
            self.storage_dir = other.storage_dir;
        }
        if other.logging != defaults.logging {
            self.logging = other.logging;
        }
        self
    }
}

fn parse_id_list(s: &str) -> Vec<String> {
    s.split(',')
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(str::to_string)
        .collect()
}

/// Expand a leading `~/` to the user's home directory
pub fn expand_home(path: &str) -> PathBuf {
    match path.strip_prefix("~/") {
        Some(rest) => dirs::home_dir()
            .map(|home| home.join(rest))
            .unwrap_or_else(|| PathBuf::from(path)),
        None => PathBuf::from(path),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::new();
        assert_eq!(config.chain.network, Network::Testnet);
        assert!(config.chain.rpc_url.contains("testnet"));
        assert_eq!(config.ledger, LedgerBackend::Mock);
        assert_eq!(config.storage_dir, "~/.suidao/state");
    }

    #[test]
    fn test_builder_pattern() {
        let config = Config::new()
            .with_network(Network::Devnet)
            .with_ledger(LedgerBackend::Rpc)
            .with_account("0xabc")
            .with_debug(true);

        assert_eq!(config.chain.network, Network::Devnet);
        assert!(config.chain.rpc_url.contains("devnet"));
        assert_eq!(config.ledger, LedgerBackend::Rpc);
        assert_eq!(config.chain.account.as_deref(), Some("0xabc"));
        assert!(config.logging.debug);
    }

    #[test]
    fn test_explicit_rpc_survives_merge() {
        let base = Config::new().with_network(Network::Mainnet);
        let merged = base.merge(Config::new().with_rpc_url("http://localhost:9000"));
        assert_eq!(merged.chain.network, Network::Mainnet);
        assert_eq!(merged.chain.rpc_url, "http://localhost:9000");
    }

    #[test]
    fn test_merge_keeps_base_when_other_is_default() {
        let base = Config::new()
            .with_storage_dir("/tmp/state")
            .with_ledger(LedgerBackend::Rpc);
        let merged = base.clone().merge(Config::new());
        assert_eq!(merged, base);
    }

    #[test]
    fn test_parse_id_list() {
        assert_eq!(parse_id_list("0x1, 0x2,,"), vec!["0x1", "0x2"]);
        assert!(parse_id_list("").is_empty());
    }

    #[test]
    fn test_expand_home() {
        assert_eq!(expand_home("/abs/path"), PathBuf::from("/abs/path"));
        if let Some(home) = dirs::home_dir() {
            assert_eq!(expand_home("~/.suidao"), home.join(".suidao"));
        }
    }
}
