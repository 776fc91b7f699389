pub mod dao;
pub mod governance;
pub mod language;
pub mod proposal;
pub mod wallet;

pub use dao::{Dao, DaoPatch};
pub use governance::{sum_voting_power, GovernanceToken, TokenPatch, Vote};
pub use language::Language;
pub use proposal::{
    Proposal, ProposalDraft, ProposalPatch, ProposalStatus, SortKey, SortOrder, StatusFilter,
};
pub use wallet::{ConnectionState, Network, WalletInfo};
