//! Governance tokens, voting power and the vote ledger
//!
//! Votes are keyed by `(proposal_id, voter)`, so a voter has at most one
//! recorded vote per proposal. The user ledger is always a subset of the
//! global one.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, info, warn};

use crate::core::constants::GOVERNANCE_STORAGE_KEY;
use crate::errors::{DaoError, DaoResult, DuplicateVote, TokenNotFound};
use crate::ledger::LedgerClient;
use crate::persistence::Persist;
use crate::types::{sum_voting_power, GovernanceToken, TokenPatch, Vote};
use crate::utils::now_millis;

type VoteKey = (String, String);

/// Durable subset of [`GovernanceStore`]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GovernanceSnapshot {
    pub tokens: Vec<GovernanceToken>,
    pub user_tokens: Vec<GovernanceToken>,
    pub votes: Vec<Vote>,
    pub user_votes: Vec<Vote>,
}

#[derive(Debug, Clone, Default)]
pub struct GovernanceStore {
    tokens: Vec<GovernanceToken>,
    user_tokens: Vec<GovernanceToken>,
    total_voting_power: u64,
    user_voting_power: u64,
    votes: BTreeMap<VoteKey, Vote>,
    user_votes: BTreeMap<VoteKey, Vote>,
    is_loading: bool,
    error: Option<String>,
}

fn index_votes(votes: Vec<Vote>) -> BTreeMap<VoteKey, Vote> {
    let mut indexed = BTreeMap::new();
    for vote in votes {
        if let Some(previous) = indexed.insert(vote.key(), vote) {
            warn!(
                proposal_id = %previous.proposal_id,
                voter = %previous.voter,
                "Dropping superseded duplicate vote"
            );
        }
    }
    indexed
}

impl GovernanceStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tokens(&self) -> &[GovernanceToken] {
        &self.tokens
    }

    pub fn user_tokens(&self) -> &[GovernanceToken] {
        &self.user_tokens
    }

    /// Sum of all token weights
    pub fn total_voting_power(&self) -> u64 {
        self.total_voting_power
    }

    /// Sum of the session's token weights
    pub fn user_voting_power(&self) -> u64 {
        self.user_voting_power
    }

    pub fn votes(&self) -> impl Iterator<Item = &Vote> {
        self.votes.values()
    }

    pub fn user_votes(&self) -> impl Iterator<Item = &Vote> {
        self.user_votes.values()
    }

    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    fn fail(&mut self, err: DaoError) -> DaoError {
        warn!(error = %err, "Governance store action failed");
        self.error = Some(err.to_string());
        err
    }

    // Tokens

    pub fn set_tokens(&mut self, tokens: Vec<GovernanceToken>) {
        self.total_voting_power = sum_voting_power(&tokens);
        self.tokens = tokens;
        self.error = None;
    }

    pub fn add_token(&mut self, token: GovernanceToken) {
        self.tokens.push(token);
        self.total_voting_power = sum_voting_power(&self.tokens);
        self.error = None;
    }

    pub fn update_token(&mut self, id: &str, patch: &TokenPatch) -> DaoResult<()> {
        let token = self
            .tokens
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or_else(|| TokenNotFound::with_id(id))?;
        patch.apply_to(token);

        // keep the session's copy in step
        if let Some(user_token) = self.user_tokens.iter_mut().find(|t| t.id == id) {
            patch.apply_to(user_token);
            self.user_voting_power = sum_voting_power(&self.user_tokens);
        }
        self.total_voting_power = sum_voting_power(&self.tokens);
        Ok(())
    }

    pub fn set_user_tokens(&mut self, tokens: Vec<GovernanceToken>) {
        self.user_voting_power = sum_voting_power(&tokens);
        self.user_tokens = tokens;
        self.error = None;
    }

    pub fn user_token(&self, id: &str) -> Option<&GovernanceToken> {
        self.user_tokens.iter().find(|t| t.id == id)
    }

    // Vote ledger

    pub fn set_votes(&mut self, votes: Vec<Vote>) {
        self.votes = index_votes(votes);
        self.error = None;
    }

    pub fn set_user_votes(&mut self, votes: Vec<Vote>) {
        self.user_votes = index_votes(votes);
        for (key, vote) in &self.user_votes {
            self.votes.entry(key.clone()).or_insert_with(|| vote.clone());
        }
        self.error = None;
    }

    /// Record a vote in the global ledger
    pub fn add_vote(&mut self, vote: Vote) -> DaoResult<()> {
        let key = vote.key();
        if self.votes.contains_key(&key) {
            return Err(DuplicateVote::new(key.0, key.1).into());
        }
        self.votes.insert(key, vote);
        self.error = None;
        Ok(())
    }

    /// Record a vote cast by the session in both ledgers
    pub fn add_user_vote(&mut self, vote: Vote) -> DaoResult<()> {
        let key = vote.key();
        self.add_vote(vote.clone())?;
        self.user_votes.insert(key, vote);
        Ok(())
    }

    /// Drop a vote from both ledgers
    pub fn remove_vote(&mut self, proposal_id: &str, voter: &str) -> Option<Vote> {
        let key = (proposal_id.to_string(), voter.to_string());
        self.user_votes.remove(&key);
        self.votes.remove(&key)
    }

    pub fn set_loading(&mut self, loading: bool) {
        self.is_loading = loading;
    }

    pub fn set_error(&mut self, error: Option<String>) {
        self.error = error;
    }

    pub fn clear_error(&mut self) {
        self.error = None;
    }

    // Queries

    /// Session voting power restricted to tokens of `dao_id`
    pub fn user_voting_power_for_dao(&self, dao_id: &str) -> u64 {
        sum_voting_power(self.user_tokens.iter().filter(|t| t.dao_id == dao_id))
    }

    pub fn user_vote_for_proposal(&self, proposal_id: &str) -> Option<&Vote> {
        self.user_votes.values().find(|v| v.proposal_id == proposal_id)
    }

    pub fn has_user_voted_on_proposal(&self, proposal_id: &str) -> bool {
        self.user_vote_for_proposal(proposal_id).is_some()
    }

    pub fn has_voted(&self, proposal_id: &str, voter: &str) -> bool {
        self.votes
            .contains_key(&(proposal_id.to_string(), voter.to_string()))
    }

    pub fn votes_for_proposal(&self, proposal_id: &str) -> Vec<&Vote> {
        self.votes
            .values()
            .filter(|v| v.proposal_id == proposal_id)
            .collect()
    }

    /// Distinct token owners
    pub fn holder_count(&self) -> usize {
        let mut owners: Vec<&str> = self.tokens.iter().map(|t| t.owner.as_str()).collect();
        owners.sort_unstable();
        owners.dedup();
        owners.len()
    }

    // Ledger actions

    /// Vote with one of the session's tokens.
    ///
    /// The voter is the token owner and the weight is the token's voting
    /// power. Nothing is submitted when the token is unknown or the owner
    /// already voted on the proposal.
    pub async fn cast_vote(
        &mut self,
        ledger: &dyn LedgerClient,
        proposal_id: &str,
        support: bool,
        token_id: &str,
    ) -> DaoResult<Vote> {
        self.is_loading = true;
        self.error = None;
        let result = self.cast_vote_inner(ledger, proposal_id, support, token_id).await;
        self.is_loading = false;
        result.map_err(|e| self.fail(e))
    }

    async fn cast_vote_inner(
        &mut self,
        ledger: &dyn LedgerClient,
        proposal_id: &str,
        support: bool,
        token_id: &str,
    ) -> DaoResult<Vote> {
        let token = self
            .user_token(token_id)
            .cloned()
            .ok_or_else(|| TokenNotFound::with_id(token_id))?;
        if self.has_voted(proposal_id, &token.owner) {
            return Err(DuplicateVote::new(proposal_id, &token.owner).into());
        }

        let receipt = ledger.cast_vote(proposal_id, support, token_id).await?;
        let vote = Vote {
            id: receipt.created_object.unwrap_or(receipt.digest),
            proposal_id: proposal_id.to_string(),
            voter: token.owner,
            support,
            voting_power: token.voting_power,
            timestamp: now_millis(),
        };
        self.add_user_vote(vote.clone())?;
        info!(
            proposal_id,
            voter = %vote.voter,
            support,
            weight = vote.voting_power,
            "Vote recorded"
        );
        Ok(vote)
    }

    /// Reload all tokens of `dao_id`; the session's tokens are those owned
    /// by `user_address` (none without an address)
    pub async fn refresh_tokens(
        &mut self,
        ledger: &dyn LedgerClient,
        dao_id: &str,
        user_address: Option<&str>,
    ) -> DaoResult<()> {
        self.is_loading = true;
        self.error = None;
        let result = ledger.list_tokens(dao_id).await;
        self.is_loading = false;
        let tokens = result.map_err(|e| self.fail(e))?;

        let user_tokens = match user_address {
            Some(address) => tokens.iter().filter(|t| t.owner == address).cloned().collect(),
            None => Vec::new(),
        };
        debug!(dao_id, total = tokens.len(), owned = user_tokens.len(), "Loaded tokens");
        self.set_tokens(tokens);
        self.set_user_tokens(user_tokens);
        Ok(())
    }

    /// Replace the votes of one proposal with the ledger's view
    pub async fn refresh_votes(
        &mut self,
        ledger: &dyn LedgerClient,
        proposal_id: &str,
        user_address: Option<&str>,
    ) -> DaoResult<()> {
        self.is_loading = true;
        self.error = None;
        let result = ledger.list_votes(proposal_id).await;
        self.is_loading = false;
        let fetched = result.map_err(|e| self.fail(e))?;

        self.votes.retain(|(p, _), _| p != proposal_id);
        self.user_votes.retain(|(p, _), _| p != proposal_id);
        for vote in fetched {
            if user_address == Some(vote.voter.as_str()) {
                self.user_votes.insert(vote.key(), vote.clone());
            }
            self.votes.insert(vote.key(), vote);
        }
        Ok(())
    }

    /// Mint a token for the session and add it to both token lists
    pub async fn mint_token(
        &mut self,
        ledger: &dyn LedgerClient,
        dao_id: &str,
        owner: &str,
        voting_power: u64,
    ) -> DaoResult<GovernanceToken> {
        self.is_loading = true;
        self.error = None;
        let result = ledger.mint_token(dao_id, owner, voting_power).await;
        self.is_loading = false;
        let receipt = result.map_err(|e| self.fail(e))?;

        let token = GovernanceToken {
            id: receipt.created_object.unwrap_or(receipt.digest),
            dao_id: dao_id.to_string(),
            voting_power,
            owner: owner.to_string(),
            created_at: Some(Utc::now()),
        };
        self.add_token(token.clone());
        let mut user_tokens = std::mem::take(&mut self.user_tokens);
        user_tokens.push(token.clone());
        self.set_user_tokens(user_tokens);
        info!(token_id = %token.id, dao_id, voting_power, "Governance token minted");
        Ok(token)
    }
}

impl Persist for GovernanceStore {
    const KEY: &'static str = GOVERNANCE_STORAGE_KEY;
    type Snapshot = GovernanceSnapshot;

    fn snapshot(&self) -> GovernanceSnapshot {
        GovernanceSnapshot {
            tokens: self.tokens.clone(),
            user_tokens: self.user_tokens.clone(),
            votes: self.votes.values().cloned().collect(),
            user_votes: self.user_votes.values().cloned().collect(),
        }
    }

    fn restore(&mut self, snapshot: GovernanceSnapshot) {
        self.set_tokens(snapshot.tokens);
        self.set_user_tokens(snapshot.user_tokens);
        self.set_votes(snapshot.votes);
        self.set_user_votes(snapshot.user_votes);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::mock::{MockLedger, MOCK_ACCOUNT, MOCK_DAO_ID};

    fn token(id: &str, dao_id: &str, owner: &str, power: u64) -> GovernanceToken {
        GovernanceToken {
            id: id.to_string(),
            dao_id: dao_id.to_string(),
            voting_power: power,
            owner: owner.to_string(),
            created_at: None,
        }
    }

    fn vote(proposal_id: &str, voter: &str, power: u64) -> Vote {
        Vote {
            id: format!("{}-{}", proposal_id, voter),
            proposal_id: proposal_id.to_string(),
            voter: voter.to_string(),
            support: true,
            voting_power: power,
            timestamp: 0,
        }
    }

    #[test]
    fn test_total_voting_power_follows_mutations() {
        let mut store = GovernanceStore::new();
        store.set_tokens(vec![token("t1", "d", "a", 12_500), token("t2", "d", "b", 8_000)]);
        assert_eq!(store.total_voting_power(), 20_500);

        store.add_token(token("t3", "d", "c", 15_000));
        assert_eq!(store.total_voting_power(), 35_500);

        store
            .update_token("t1", &TokenPatch::new().voting_power(500))
            .unwrap();
        assert_eq!(store.total_voting_power(), 23_500);

        assert!(store
            .update_token("nope", &TokenPatch::new().voting_power(1))
            .unwrap_err()
            .is_not_found());
    }

    #[test]
    fn test_user_voting_power_for_dao() {
        let mut store = GovernanceStore::new();
        store.set_user_tokens(vec![
            token("t1", "d1", "me", 100),
            token("t2", "d2", "me", 40),
            token("t3", "d1", "me", 5),
        ]);
        assert_eq!(store.user_voting_power(), 145);
        assert_eq!(store.user_voting_power_for_dao("d1"), 105);
        assert_eq!(store.user_voting_power_for_dao("d3"), 0);
    }

    #[test]
    fn test_duplicate_vote_rejected() {
        let mut store = GovernanceStore::new();
        store.add_vote(vote("p1", "alice", 10)).unwrap();
        let err = store.add_vote(vote("p1", "alice", 99)).unwrap_err();
        assert!(err.is_duplicate_vote());
        assert_eq!(store.votes_for_proposal("p1").len(), 1);
        assert_eq!(store.votes_for_proposal("p1")[0].voting_power, 10);

        // same voter, different proposal is fine
        store.add_vote(vote("p2", "alice", 10)).unwrap();
    }

    #[test]
    fn test_remove_vote_clears_both_ledgers() {
        let mut store = GovernanceStore::new();
        store.add_user_vote(vote("p1", "me", 10)).unwrap();
        assert!(store.has_user_voted_on_proposal("p1"));

        assert!(store.remove_vote("p1", "me").is_some());
        assert!(!store.has_user_voted_on_proposal("p1"));
        assert!(!store.has_voted("p1", "me"));
    }

    #[test]
    fn test_holder_count() {
        let mut store = GovernanceStore::new();
        store.set_tokens(vec![
            token("t1", "d", "a", 1),
            token("t2", "d", "b", 1),
            token("t3", "d", "a", 1),
        ]);
        assert_eq!(store.holder_count(), 2);
    }

    #[tokio::test]
    async fn test_cast_vote_unknown_token() {
        let ledger = MockLedger::new();
        let mut store = GovernanceStore::new();
        let err = store
            .cast_vote(&ledger, "0xproposal1", true, "0xmissing")
            .await
            .unwrap_err();
        assert!(err.is_not_found());
        assert!(store.error().is_some());
        assert_eq!(store.votes().count(), 0);
        assert_eq!(ledger.transactions(), 0);
    }

    #[tokio::test]
    async fn test_cast_vote_records_owner_and_weight() {
        let ledger = MockLedger::new();
        let mut store = GovernanceStore::new();
        store
            .refresh_tokens(&ledger, MOCK_DAO_ID, Some(MOCK_ACCOUNT))
            .await
            .unwrap();
        assert_eq!(store.user_tokens().len(), 1);
        assert_eq!(store.total_voting_power(), 35_500);

        let cast = store
            .cast_vote(&ledger, "0xproposal3", true, "0xtoken1")
            .await
            .unwrap();
        assert_eq!(cast.voter, MOCK_ACCOUNT);
        assert_eq!(cast.voting_power, 12_500);
        assert!(store.has_user_voted_on_proposal("0xproposal3"));

        let err = store
            .cast_vote(&ledger, "0xproposal3", false, "0xtoken1")
            .await
            .unwrap_err();
        assert!(err.is_duplicate_vote());
        assert_eq!(ledger.transactions(), 1);
    }

    #[tokio::test]
    async fn test_refresh_votes_replaces_one_proposal() {
        let ledger = MockLedger::new();
        let mut store = GovernanceStore::new();
        store.add_vote(vote("0xother", "x", 1)).unwrap();
        store.add_vote(vote("0xproposal1", "stale", 1)).unwrap();

        store
            .refresh_votes(&ledger, "0xproposal1", Some("0xuser2"))
            .await
            .unwrap();
        assert_eq!(store.votes_for_proposal("0xproposal1").len(), 3);
        assert!(!store.has_voted("0xproposal1", "stale"));
        assert!(store.has_voted("0xother", "x"));
        assert_eq!(
            store.user_vote_for_proposal("0xproposal1").unwrap().voting_power,
            8_000
        );
    }

    #[tokio::test]
    async fn test_mint_token_adds_to_user_tokens() {
        let ledger = MockLedger::new();
        let mut store = GovernanceStore::new();
        let minted = store.mint_token(&ledger, "d", "me", 1_000).await.unwrap();
        assert_eq!(store.user_token(&minted.id).unwrap().voting_power, 1_000);
        assert_eq!(store.user_voting_power(), 1_000);
        assert_eq!(store.total_voting_power(), 1_000);
    }
}
