//! DAO session - main interface for the financing platform
//!
//! `DaoSession` ties the five client stores to one ledger backend and one
//! storage directory. Actions that touch more than one store (voting,
//! proposal creation, wallet changes) live here so the stores never reach
//! into each other.
//!
//! # Example
//!
//! ```ignore
//! use sui_dao_rs::{Config, DaoSession};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let mut session = DaoSession::from_config(Config::from_env())?;
//!     session.initialize().await?;
//!
//!     let stats = session.stats();
//!     println!("Treasury: {} SUI", stats.treasury);
//!
//!     session.save()?;
//!     Ok(())
//! }
//! ```

use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::core::constants::ANONYMOUS_PROPOSER;
use crate::errors::{
    DaoError, DaoNotFound, DaoResult, DuplicateVote, InvalidTransition, ProposalNotFound,
    TokenNotFound,
};
use crate::ledger::{self, LedgerClient, TxReceipt};
use crate::persistence::StateStorage;
use crate::stores::{DaoStore, GovernanceStore, LanguageStore, ProposalStore, WalletStore};
use crate::types::{
    Dao, DaoPatch, GovernanceToken, Proposal, ProposalDraft, ProposalStatus, Vote, WalletInfo,
};
use crate::utils::balance::Mist;

/// Outcome of [`DaoSession::vote`]
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VoteReceipt {
    pub vote: Vote,
    /// The proposal with the new weight applied
    pub proposal: Proposal,
}

/// Figures shown on the dashboard header
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DashboardStats {
    pub dao_name: Option<String>,
    /// Treasury of the current DAO, formatted in SUI
    pub treasury: String,
    pub treasury_mist: Mist,
    pub active_proposals: usize,
    pub total_proposals: usize,
    pub token_holders: usize,
    pub total_voting_power: u64,
    /// Voting power the session holds in the current DAO
    pub user_voting_power: u64,
}

/// Client-side DAO session
pub struct DaoSession {
    config: Config,
    ledger: Arc<dyn LedgerClient>,
    storage: Option<StateStorage>,
    proposals: ProposalStore,
    governance: GovernanceStore,
    wallet: WalletStore,
    daos: DaoStore,
    language: LanguageStore,
}

impl DaoSession {
    /// Create a session with empty stores and no persistence
    pub fn new(config: Config, ledger: Arc<dyn LedgerClient>) -> Self {
        let mut wallet = WalletStore::new();
        wallet.set_preferred_network(config.chain.network);
        Self {
            config,
            ledger,
            storage: None,
            proposals: ProposalStore::new(),
            governance: GovernanceStore::new(),
            wallet,
            daos: DaoStore::new(),
            language: LanguageStore::new(),
        }
    }

    /// Persist stores under `storage`
    pub fn with_storage(mut self, storage: StateStorage) -> Self {
        self.storage = Some(storage);
        self
    }

    /// Build the ledger named by `config`, attach its storage directory and
    /// restore whatever was saved there
    pub fn from_config(config: Config) -> DaoResult<Self> {
        let ledger = ledger::from_config(&config)?;
        let storage = StateStorage::new(config.storage_path());
        debug!(
            backend = ledger.name(),
            storage = %storage.dir().display(),
            "Opening DAO session"
        );
        let mut session = Self::new(config, ledger).with_storage(storage);
        session.load();
        Ok(session)
    }

    // ==========================================================================
    // ACCESSORS
    // ==========================================================================

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn ledger(&self) -> &dyn LedgerClient {
        self.ledger.as_ref()
    }

    pub fn storage(&self) -> Option<&StateStorage> {
        self.storage.as_ref()
    }

    pub fn proposals(&self) -> &ProposalStore {
        &self.proposals
    }

    pub fn proposals_mut(&mut self) -> &mut ProposalStore {
        &mut self.proposals
    }

    pub fn governance(&self) -> &GovernanceStore {
        &self.governance
    }

    pub fn governance_mut(&mut self) -> &mut GovernanceStore {
        &mut self.governance
    }

    pub fn wallet(&self) -> &WalletStore {
        &self.wallet
    }

    pub fn wallet_mut(&mut self) -> &mut WalletStore {
        &mut self.wallet
    }

    pub fn daos(&self) -> &DaoStore {
        &self.daos
    }

    pub fn daos_mut(&mut self) -> &mut DaoStore {
        &mut self.daos
    }

    pub fn language(&self) -> &LanguageStore {
        &self.language
    }

    pub fn language_mut(&mut self) -> &mut LanguageStore {
        &mut self.language
    }

    /// Translate `key` in the session language
    pub fn t(&self, key: &str, section: Option<&str>) -> String {
        self.language.t(key, section)
    }

    fn current_dao_id(&self) -> DaoResult<String> {
        self.daos
            .current_dao()
            .map(|d| d.id.clone())
            .ok_or_else(|| DaoNotFound::new("No DAO selected").into())
    }

    /// Connected address, or the anonymous placeholder
    fn acting_address(&self) -> String {
        self.wallet
            .address()
            .unwrap_or(ANONYMOUS_PROPOSER)
            .to_string()
    }

    // ==========================================================================
    // PERSISTENCE
    // ==========================================================================

    /// Restore every store from storage; a no-op without storage
    pub fn load(&mut self) {
        let Some(storage) = &self.storage else {
            return;
        };
        storage.load_into(&mut self.wallet);
        storage.load_into(&mut self.proposals);
        storage.load_into(&mut self.governance);
        storage.load_into(&mut self.daos);
        storage.load_into(&mut self.language);
        debug!(
            proposals = self.proposals.proposals().len(),
            daos = self.daos.daos().len(),
            "Restored session state"
        );
    }

    /// Persist every store; a no-op without storage
    pub fn save(&self) -> DaoResult<()> {
        let Some(storage) = &self.storage else {
            return Ok(());
        };
        storage.save_from(&self.wallet)?;
        storage.save_from(&self.proposals)?;
        storage.save_from(&self.governance)?;
        storage.save_from(&self.daos)?;
        storage.save_from(&self.language)?;
        debug!(dir = %storage.dir().display(), "Saved session state");
        Ok(())
    }

    // ==========================================================================
    // LOADING
    // ==========================================================================

    /// Load DAOs, then the proposals and tokens of the current DAO
    pub async fn initialize(&mut self) -> DaoResult<()> {
        let ledger = self.ledger.as_ref();
        self.daos.refresh_dao_data(ledger).await?;

        let Ok(dao_id) = self.current_dao_id() else {
            warn!("Ledger returned no DAOs");
            return Ok(());
        };
        self.proposals.refresh_proposals(ledger, &dao_id).await?;
        let address = self.wallet.address().map(str::to_string);
        self.governance
            .refresh_tokens(ledger, &dao_id, address.as_deref())
            .await?;
        info!(dao_id = %dao_id, "Session initialized");
        Ok(())
    }

    /// Make `dao_id` current and reload its proposals and tokens
    pub async fn select_dao(&mut self, dao_id: &str) -> DaoResult<()> {
        self.daos.select_dao(dao_id)?;
        let ledger = self.ledger.as_ref();
        self.proposals.refresh_proposals(ledger, dao_id).await?;
        let address = self.wallet.address().map(str::to_string);
        self.governance
            .refresh_tokens(ledger, dao_id, address.as_deref())
            .await
    }

    /// Reload the votes cast on one proposal
    pub async fn refresh_votes(&mut self, proposal_id: &str) -> DaoResult<()> {
        let address = self.wallet.address().map(str::to_string);
        self.governance
            .refresh_votes(self.ledger.as_ref(), proposal_id, address.as_deref())
            .await
    }

    // ==========================================================================
    // VOTING
    // ==========================================================================

    /// Cast a vote with one of the session's tokens.
    ///
    /// The proposal must be ACTIVE and the token's owner must not have voted
    /// on it yet. The vote is submitted to the ledger, recorded in the vote
    /// ledger and then applied to the proposal tally. If the tally update
    /// fails the recorded vote is removed again.
    pub async fn vote(
        &mut self,
        proposal_id: &str,
        support: bool,
        token_id: &str,
    ) -> DaoResult<VoteReceipt> {
        let proposal = self
            .proposals
            .proposal_by_id(proposal_id)
            .ok_or_else(|| DaoError::from(ProposalNotFound::with_id(proposal_id)))?;
        if proposal.status != ProposalStatus::Active {
            return Err(InvalidTransition::new(
                proposal_id,
                proposal.status,
                ProposalStatus::Active,
            )
            .into());
        }

        let token = self
            .governance
            .user_token(token_id)
            .ok_or_else(|| DaoError::from(TokenNotFound::with_id(token_id)))?;
        if self.governance.has_voted(proposal_id, &token.owner) {
            return Err(DuplicateVote::new(proposal_id, &token.owner).into());
        }

        let vote = self
            .governance
            .cast_vote(self.ledger.as_ref(), proposal_id, support, token_id)
            .await?;

        if let Err(e) = self
            .proposals
            .vote_on_proposal(proposal_id, support, vote.voting_power)
        {
            warn!(proposal_id, voter = %vote.voter, error = %e, "Rolling back vote");
            self.governance.remove_vote(proposal_id, &vote.voter);
            return Err(e);
        }

        let proposal = self
            .proposals
            .proposal_by_id(proposal_id)
            .cloned()
            .ok_or_else(|| DaoError::from(ProposalNotFound::with_id(proposal_id)))?;
        Ok(VoteReceipt { vote, proposal })
    }

    // ==========================================================================
    // PROPOSALS
    // ==========================================================================

    /// Validate the form and submit a proposal to the current DAO.
    ///
    /// The proposer is the connected address, or `0xuser` without a wallet.
    pub async fn create_proposal(&mut self, draft: &ProposalDraft) -> DaoResult<Proposal> {
        let amount = draft.amount_mist()?;
        let dao = self
            .daos
            .current_dao()
            .cloned()
            .ok_or_else(|| DaoError::from(DaoNotFound::new("No DAO selected")))?;
        let proposer = self.acting_address();

        let proposal = self
            .proposals
            .create_proposal(
                self.ledger.as_ref(),
                &dao.id,
                &proposer,
                draft.title.trim(),
                draft.description.trim(),
                amount,
            )
            .await?;

        self.daos.update_dao(
            &dao.id,
            &DaoPatch::new().proposal_count(dao.proposal_count.saturating_add(1)),
        )?;
        Ok(proposal)
    }

    /// DRAFT -> ACTIVE
    pub fn activate_proposal(&mut self, proposal_id: &str) -> DaoResult<()> {
        self.proposals.activate_proposal(proposal_id)
    }

    /// ACTIVE -> REJECTED
    pub fn reject_proposal(&mut self, proposal_id: &str) -> DaoResult<()> {
        self.proposals.reject_proposal(proposal_id)
    }

    /// ACTIVE -> EXECUTED through the ledger
    pub async fn execute_proposal(&mut self, proposal_id: &str) -> DaoResult<TxReceipt> {
        self.proposals
            .execute_proposal(self.ledger.as_ref(), proposal_id)
            .await
    }

    // ==========================================================================
    // WALLET
    // ==========================================================================

    /// Connect and pick up the tokens and votes of the new address
    pub async fn connect_wallet(&mut self) -> DaoResult<WalletInfo> {
        let wallet = self.wallet.connect_wallet(self.ledger.as_ref()).await?;
        if let Ok(dao_id) = self.current_dao_id() {
            self.governance
                .refresh_tokens(self.ledger.as_ref(), &dao_id, Some(wallet.address.as_str()))
                .await?;
        }
        let own_votes: Vec<Vote> = self
            .governance
            .votes()
            .filter(|v| v.voter == wallet.address)
            .cloned()
            .collect();
        self.governance.set_user_votes(own_votes);
        Ok(wallet)
    }

    /// Disconnect and forget the session's tokens and votes
    pub fn disconnect_wallet(&mut self) {
        self.wallet.disconnect_wallet();
        self.governance.set_user_tokens(Vec::new());
        self.governance.set_user_votes(Vec::new());
    }

    pub async fn refresh_balance(&mut self) -> DaoResult<Mist> {
        self.wallet.refresh_balance(self.ledger.as_ref()).await
    }

    // ==========================================================================
    // GOVERNANCE & DAOS
    // ==========================================================================

    /// Mint a token in the current DAO for the acting address
    pub async fn mint_token(&mut self, voting_power: u64) -> DaoResult<GovernanceToken> {
        let dao_id = self.current_dao_id()?;
        let owner = self.acting_address();
        self.governance
            .mint_token(self.ledger.as_ref(), &dao_id, &owner, voting_power)
            .await
    }

    pub async fn create_dao(&mut self, name: &str, min_voting_power: u64) -> DaoResult<Dao> {
        let creator = self.acting_address();
        self.daos
            .create_dao(self.ledger.as_ref(), name, min_voting_power, &creator)
            .await
    }

    /// Dashboard figures for the current DAO
    pub fn stats(&self) -> DashboardStats {
        let dao = self.daos.current_dao();
        let treasury_mist = dao.and_then(Dao::treasury_mist).unwrap_or_default();
        let user_voting_power = match dao {
            Some(dao) => self.governance.user_voting_power_for_dao(&dao.id),
            None => self.governance.user_voting_power(),
        };

        DashboardStats {
            dao_name: dao.map(|d| d.name.clone()),
            treasury: treasury_mist.format_sui(),
            treasury_mist,
            active_proposals: self.proposals.active_proposals().len(),
            total_proposals: self.proposals.proposals().len(),
            token_holders: self.governance.holder_count(),
            total_voting_power: self.governance.total_voting_power(),
            user_voting_power,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::mock::{MockLedger, MOCK_ACCOUNT, MOCK_DAO_ID};

    fn session() -> DaoSession {
        DaoSession::new(Config::new(), Arc::new(MockLedger::new()))
    }

    async fn connected() -> DaoSession {
        let mut session = session();
        session.initialize().await.unwrap();
        session.connect_wallet().await.unwrap();
        session
    }

    #[tokio::test]
    async fn test_initialize_loads_current_dao() {
        let mut session = session();
        session.initialize().await.unwrap();

        assert_eq!(session.daos().current_dao().unwrap().id, MOCK_DAO_ID);
        assert_eq!(session.proposals().proposals().len(), 3);
        assert!(session.governance().user_tokens().is_empty());
        assert_eq!(session.stats().treasury, "125,000");
    }

    #[tokio::test]
    async fn test_connect_picks_up_owned_tokens() {
        let session = connected().await;
        assert_eq!(session.wallet().address(), Some(MOCK_ACCOUNT));
        assert_eq!(session.governance().user_voting_power(), 12_500);
        assert_eq!(session.stats().user_voting_power, 12_500);
    }

    #[tokio::test]
    async fn test_disconnect_clears_user_state() {
        let mut session = connected().await;
        session.disconnect_wallet();
        assert!(session.governance().user_tokens().is_empty());
        assert_eq!(session.stats().user_voting_power, 0);
    }

    #[tokio::test]
    async fn test_vote_requires_active_proposal() {
        let mut session = connected().await;
        let draft = session
            .create_proposal(&ProposalDraft::new("Audit", "Security audit", "100"))
            .await
            .unwrap();

        let err = session.vote(&draft.id, true, "0xtoken1").await.unwrap_err();
        assert!(err.is_invalid_transition());
        assert!(session.governance().user_votes().next().is_none());
    }

    #[tokio::test]
    async fn test_vote_applies_weight_and_rejects_repeat() {
        let mut session = connected().await;
        let draft = session
            .create_proposal(&ProposalDraft::new("Audit", "Security audit", "100"))
            .await
            .unwrap();
        session.activate_proposal(&draft.id).unwrap();

        let receipt = session.vote(&draft.id, true, "0xtoken1").await.unwrap();
        assert_eq!(receipt.proposal.votes_for, 12_500);
        assert_eq!(receipt.vote.voter, MOCK_ACCOUNT);
        assert!(session.governance().has_user_voted_on_proposal(&draft.id));

        let err = session.vote(&draft.id, false, "0xtoken1").await.unwrap_err();
        assert!(err.is_duplicate_vote());
        assert_eq!(
            session.proposals().proposal_by_id(&draft.id).unwrap().votes_against,
            0
        );
    }

    #[tokio::test]
    async fn test_vote_with_foreign_token() {
        let mut session = connected().await;
        let err = session.vote("0xproposal1", true, "0xtoken2").await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_failed_submission_records_nothing() {
        let ledger = Arc::new(MockLedger::new());
        let mut session = DaoSession::new(Config::new(), ledger.clone());
        session.initialize().await.unwrap();
        session.connect_wallet().await.unwrap();

        ledger.set_failure(Some("node unavailable".to_string()));
        assert!(session.vote("0xproposal1", true, "0xtoken1").await.is_err());
        assert!(!session.governance().has_user_voted_on_proposal("0xproposal1"));
        assert_eq!(
            session.proposals().proposal_by_id("0xproposal1").unwrap().votes_for,
            156_000
        );
    }

    #[tokio::test]
    async fn test_create_proposal_without_wallet() {
        let mut session = session();
        session.initialize().await.unwrap();

        let proposal = session
            .create_proposal(&ProposalDraft::new("Grant", "Fund it", "50000"))
            .await
            .unwrap();
        assert_eq!(proposal.proposer, ANONYMOUS_PROPOSER);
        assert_eq!(proposal.amount_requested, "50000000000000");
        assert_eq!(proposal.status, ProposalStatus::Draft);
        assert_eq!(session.daos().current_dao().unwrap().proposal_count, 9);
    }

    #[tokio::test]
    async fn test_create_proposal_validates_first() {
        let mut session = session();
        session.initialize().await.unwrap();
        let err = session
            .create_proposal(&ProposalDraft::new("", "Fund it", "-3"))
            .await
            .unwrap_err();
        assert!(err.is_validation());
        assert_eq!(session.proposals().proposals().len(), 3);
    }

    #[tokio::test]
    async fn test_create_proposal_needs_a_dao() {
        let mut session = session();
        let err = session
            .create_proposal(&ProposalDraft::new("Grant", "Fund it", "1"))
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_save_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let storage = StateStorage::new(dir.path());

        let mut session = connected().await.with_storage(storage.clone());
        session.proposals_mut().set_sort_by(crate::types::SortKey::VotesFor);
        session.language_mut().toggle();
        session.save().unwrap();

        let mut restored =
            DaoSession::new(Config::new(), Arc::new(MockLedger::new())).with_storage(storage);
        restored.load();
        assert_eq!(restored.wallet().address(), Some(MOCK_ACCOUNT));
        assert_eq!(restored.proposals().sort_by(), crate::types::SortKey::VotesFor);
        assert_eq!(restored.language().language(), crate::types::Language::En);
        assert_eq!(restored.daos().current_dao().unwrap().id, MOCK_DAO_ID);
    }
}
