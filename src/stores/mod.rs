//! Client-side state stores
//!
//! Each store owns one collection plus the values derived from it and keeps
//! them consistent on every mutation. Ledger-backed actions are `async`, take
//! the ledger as `&dyn LedgerClient`, record failures in the store's `error`
//! field and also return them.

pub mod dao;
pub mod governance;
pub mod language;
pub mod proposal;
pub mod wallet;

pub use dao::{DaoSnapshot, DaoStore};
pub use governance::{GovernanceSnapshot, GovernanceStore};
pub use language::{translate, LanguageSnapshot, LanguageStore};
pub use proposal::{ProposalSnapshot, ProposalStore};
pub use wallet::{WalletSnapshot, WalletStore};
