//! # sui-dao-rs
//!
//! Client SDK and CLI for a funding-proposal DAO on Sui.
//!
//! The SDK keeps the dashboard's client state in five stores (proposals,
//! governance, wallet, DAOs, language), talks to the chain through a
//! [`LedgerClient`](ledger::LedgerClient) and persists a whitelisted subset of
//! each store as JSON between runs. [`DaoSession`] ties them together.
//!
//! ```ignore
//! use sui_dao_rs::{Config, DaoSession, ProposalDraft};
//!
//! let mut session = DaoSession::from_config(Config::from_env())?;
//! session.initialize().await?;
//! session.connect_wallet().await?;
//!
//! let proposal = session
//!     .create_proposal(&ProposalDraft::new("Audit", "Security audit", "5000"))
//!     .await?;
//! session.activate_proposal(&proposal.id)?;
//! session.vote(&proposal.id, true, "0xtoken1").await?;
//! session.save()?;
//! ```

pub mod cli;
pub mod config;
pub mod core;
pub mod errors;
pub mod ledger;
pub mod logging;
pub mod persistence;
pub mod session;
pub mod stores;
pub mod types;
pub mod utils;

pub use config::{ChainConfig, Config};
pub use errors::{DaoError, DaoResult};
pub use ledger::{JsonRpcLedger, LedgerBackend, LedgerClient, MockLedger, TxReceipt};
pub use persistence::{Persist, StateStorage};
pub use session::{DaoSession, DashboardStats, VoteReceipt};
pub use stores::{DaoStore, GovernanceStore, LanguageStore, ProposalStore, WalletStore};

// Re-export logging module
pub use logging::{
    init_default_logging, init_logging, is_initialized, CompactFormatter, DaoFormatter,
    JsonFormatter, LogFormat, LoggingConfig,
};

pub use types::*;

pub use utils::balance::{format_sui, parse_sui_amount, Mist};
