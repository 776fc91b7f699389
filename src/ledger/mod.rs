//! Ledger client boundary
//!
//! Every store reads and writes chain state through [`LedgerClient`]. Reads
//! return typed snapshots, writes return a [`TxReceipt`] carrying the opaque
//! transaction digest. Two implementations ship with the SDK:
//!
//! - [`MockLedger`] serves deterministic fixture data and accepts every write.
//!   It is the default backend until the Move package is deployed.
//! - [`JsonRpcLedger`] reads DAO, proposal and balance objects from a Sui
//!   fullnode. Writes need a transaction signer and are rejected.

pub mod mock;
pub mod rpc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use crate::config::Config;
use crate::errors::DaoResult;
use crate::types::{Dao, GovernanceToken, Network, Proposal, Vote, WalletInfo};
use crate::utils::balance::Mist;

pub use mock::MockLedger;
pub use rpc::JsonRpcLedger;

/// Confirmation returned by a write call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxReceipt {
    /// Transaction digest
    pub digest: String,
    /// Object created by the transaction, if any
    pub created_object: Option<String>,
}

impl TxReceipt {
    pub fn new(digest: impl Into<String>) -> Self {
        Self {
            digest: digest.into(),
            created_object: None,
        }
    }

    pub fn with_object(digest: impl Into<String>, object_id: impl Into<String>) -> Self {
        Self {
            digest: digest.into(),
            created_object: Some(object_id.into()),
        }
    }
}

/// Arguments of the `create_proposal` entry function
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProposalSubmission {
    pub dao_id: String,
    pub title: String,
    pub description: String,
    /// Requested amount in MIST
    pub amount: Mist,
    pub proposer: String,
    /// Deadline in milliseconds since the Unix epoch
    pub deadline: i64,
}

/// Read/write access to DAO state on chain
#[async_trait]
pub trait LedgerClient: Send + Sync {
    /// Short backend name for logs
    fn name(&self) -> &'static str;

    // Reads

    async fn list_daos(&self) -> DaoResult<Vec<Dao>>;

    async fn get_dao(&self, dao_id: &str) -> DaoResult<Dao>;

    /// Enumerate a DAO's proposals
    async fn list_proposals(&self, dao_id: &str) -> DaoResult<Vec<Proposal>>;

    async fn list_tokens(&self, dao_id: &str) -> DaoResult<Vec<GovernanceToken>>;

    async fn list_votes(&self, proposal_id: &str) -> DaoResult<Vec<Vote>>;

    async fn get_balance(&self, address: &str) -> DaoResult<Mist>;

    /// Resolve the account the session acts as on `network`
    async fn connect_account(&self, network: Network) -> DaoResult<WalletInfo>;

    // Writes

    async fn submit_proposal(&self, submission: &ProposalSubmission) -> DaoResult<TxReceipt>;

    async fn cast_vote(
        &self,
        proposal_id: &str,
        support: bool,
        token_id: &str,
    ) -> DaoResult<TxReceipt>;

    async fn execute_proposal(&self, proposal_id: &str) -> DaoResult<TxReceipt>;

    async fn mint_token(
        &self,
        dao_id: &str,
        owner: &str,
        voting_power: u64,
    ) -> DaoResult<TxReceipt>;

    async fn create_dao(&self, name: &str, min_voting_power: u64) -> DaoResult<TxReceipt>;
}

/// Which ledger backend a session talks to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LedgerBackend {
    #[default]
    Mock,
    Rpc,
}

impl fmt::Display for LedgerBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LedgerBackend::Mock => f.write_str("mock"),
            LedgerBackend::Rpc => f.write_str("rpc"),
        }
    }
}

impl FromStr for LedgerBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "mock" => Ok(LedgerBackend::Mock),
            "rpc" | "jsonrpc" | "json-rpc" => Ok(LedgerBackend::Rpc),
            _ => Err(format!(
                "Invalid ledger backend '{}'. Valid options: mock, rpc",
                s
            )),
        }
    }
}

/// Build the ledger client selected by `config`
pub fn from_config(config: &Config) -> DaoResult<Arc<dyn LedgerClient>> {
    match config.ledger {
        LedgerBackend::Mock => Ok(Arc::new(MockLedger::new())),
        LedgerBackend::Rpc => {
            let mut client = JsonRpcLedger::new(&config.chain.rpc_url, &config.chain.package_id)?
                .with_dao_objects(config.chain.dao_objects.clone());
            if let Some(account) = &config.chain.account {
                client = client.with_account(account);
            }
            tracing::debug!(endpoint = %config.chain.rpc_url, "Using JSON-RPC ledger");
            Ok(Arc::new(client))
        }
    }
}
