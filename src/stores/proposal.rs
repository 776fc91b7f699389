//! Proposal collection with its filter/sort view and lifecycle actions

use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use tracing::{debug, info, warn};

use crate::core::constants::{DEFAULT_PROPOSAL_DEADLINE_MS, PROPOSAL_STORAGE_KEY};
use crate::errors::{DaoError, DaoResult, InvalidTransition, ProposalNotFound, VoteFailed};
use crate::ledger::{LedgerClient, ProposalSubmission, TxReceipt};
use crate::persistence::Persist;
use crate::types::{Proposal, ProposalPatch, ProposalStatus, SortKey, SortOrder, StatusFilter};
use crate::utils::balance::Mist;
use crate::utils::now_millis;

/// Durable subset of [`ProposalStore`]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProposalSnapshot {
    pub proposals: Vec<Proposal>,
    pub status_filter: StatusFilter,
    pub sort_by: SortKey,
    pub sort_order: SortOrder,
}

#[derive(Debug, Clone, Default)]
pub struct ProposalStore {
    proposals: Vec<Proposal>,
    active_proposals: Vec<Proposal>,
    current_proposal: Option<Proposal>,
    status_filter: StatusFilter,
    sort_by: SortKey,
    sort_order: SortOrder,
    is_loading: bool,
    error: Option<String>,
}

impl ProposalStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn proposals(&self) -> &[Proposal] {
        &self.proposals
    }

    /// Proposals with status ACTIVE, in collection order
    pub fn active_proposals(&self) -> &[Proposal] {
        &self.active_proposals
    }

    pub fn current_proposal(&self) -> Option<&Proposal> {
        self.current_proposal.as_ref()
    }

    pub fn status_filter(&self) -> StatusFilter {
        self.status_filter
    }

    pub fn sort_by(&self) -> SortKey {
        self.sort_by
    }

    pub fn sort_order(&self) -> SortOrder {
        self.sort_order
    }

    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    fn recompute_active(&mut self) {
        self.active_proposals = self
            .proposals
            .iter()
            .filter(|p| p.is_active())
            .cloned()
            .collect();
    }

    /// Record a failure in `error` and hand it back
    fn fail(&mut self, err: DaoError) -> DaoError {
        warn!(error = %err, "Proposal store action failed");
        self.error = Some(err.to_string());
        err
    }

    // Basic mutations

    pub fn set_proposals(&mut self, proposals: Vec<Proposal>) {
        self.proposals = proposals;
        self.recompute_active();
        self.error = None;
    }

    /// Append without de-duplicating by id
    pub fn add_proposal(&mut self, proposal: Proposal) {
        self.proposals.push(proposal);
        self.recompute_active();
        self.error = None;
    }

    /// Merge `patch` into the proposal with `id`.
    ///
    /// A status change must be a legal lifecycle step and tallies may only
    /// grow; otherwise nothing is modified.
    pub fn update_proposal(&mut self, id: &str, patch: &ProposalPatch) -> DaoResult<()> {
        let proposal = self
            .proposals
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| ProposalNotFound::with_id(id))?;

        if let Some(next) = patch.status {
            if next != proposal.status && !proposal.status.can_transition_to(next) {
                return Err(InvalidTransition::new(id, proposal.status, next).into());
            }
        }
        let shrinks = patch.votes_for.is_some_and(|v| v < proposal.votes_for)
            || patch.votes_against.is_some_and(|v| v < proposal.votes_against);
        if shrinks {
            return Err(VoteFailed::with_proposal("vote tallies cannot decrease", id).into());
        }

        patch.apply_to(proposal);
        let updated = proposal.clone();

        if let Some(current) = self.current_proposal.as_mut() {
            if current.id == id {
                *current = updated;
            }
        }
        self.recompute_active();
        Ok(())
    }

    pub fn set_current_proposal(&mut self, proposal: Option<Proposal>) {
        self.current_proposal = proposal;
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

    pub fn set_status_filter(&mut self, filter: StatusFilter) {
        self.status_filter = filter;
    }

    pub fn set_sort_by(&mut self, key: SortKey) {
        self.sort_by = key;
    }

    pub fn set_sort_order(&mut self, order: SortOrder) {
        self.sort_order = order;
    }

    // Queries

    /// Proposals passing the status filter, ordered by the sort settings.
    ///
    /// The sort is stable in both directions: equal keys keep collection
    /// order.
    pub fn filtered_proposals(&self) -> Vec<Proposal> {
        let mut filtered: Vec<Proposal> = self
            .proposals
            .iter()
            .filter(|p| self.status_filter.matches(p.status))
            .cloned()
            .collect();

        let key = self.sort_by;
        match self.sort_order {
            SortOrder::Asc => filtered.sort_by(|a, b| compare_by(key, a, b)),
            SortOrder::Desc => filtered.sort_by(|a, b| compare_by(key, b, a)),
        }
        filtered
    }

    pub fn proposal_by_id(&self, id: &str) -> Option<&Proposal> {
        self.proposals.iter().find(|p| p.id == id)
    }

    pub fn proposals_by_status(&self, status: ProposalStatus) -> Vec<&Proposal> {
        self.proposals.iter().filter(|p| p.status == status).collect()
    }

    // Lifecycle

    /// Add `weight` to one side of the tally. Status is not checked here.
    pub fn vote_on_proposal(&mut self, id: &str, support: bool, weight: u64) -> DaoResult<()> {
        self.error = None;
        let Some(proposal) = self.proposal_by_id(id) else {
            return Err(self.fail(ProposalNotFound::with_id(id).into()));
        };

        let patch = if support {
            ProposalPatch::new().votes_for(proposal.votes_for.saturating_add(weight))
        } else {
            ProposalPatch::new().votes_against(proposal.votes_against.saturating_add(weight))
        };
        self.update_proposal(id, &patch).map_err(|e| self.fail(e))?;
        debug!(proposal_id = id, support, weight, "Applied vote weight");
        Ok(())
    }

    /// Strict lifecycle step; re-applying the current status is an error here
    fn transition(&mut self, id: &str, next: ProposalStatus) -> DaoResult<()> {
        self.error = None;
        let result = match self.proposal_by_id(id) {
            None => Err(ProposalNotFound::with_id(id).into()),
            Some(p) if !p.status.can_transition_to(next) => {
                Err(InvalidTransition::new(id, p.status, next).into())
            }
            Some(_) => self.update_proposal(id, &ProposalPatch::new().status(next)),
        };
        result.map_err(|e| self.fail(e))
    }

    /// DRAFT -> ACTIVE
    pub fn activate_proposal(&mut self, id: &str) -> DaoResult<()> {
        self.transition(id, ProposalStatus::Active)?;
        info!(proposal_id = id, "Proposal opened for voting");
        Ok(())
    }

    /// ACTIVE -> REJECTED
    pub fn reject_proposal(&mut self, id: &str) -> DaoResult<()> {
        self.transition(id, ProposalStatus::Rejected)?;
        info!(proposal_id = id, "Proposal rejected");
        Ok(())
    }

    /// ACTIVE -> EXECUTED, submitting the execution to the ledger first
    pub async fn execute_proposal(
        &mut self,
        ledger: &dyn LedgerClient,
        id: &str,
    ) -> DaoResult<TxReceipt> {
        self.is_loading = true;
        self.error = None;
        let result = self.execute_inner(ledger, id).await;
        self.is_loading = false;
        result.map_err(|e| self.fail(e))
    }

    async fn execute_inner(&mut self, ledger: &dyn LedgerClient, id: &str) -> DaoResult<TxReceipt> {
        let proposal = self
            .proposal_by_id(id)
            .ok_or_else(|| ProposalNotFound::with_id(id))?;
        if !proposal.status.can_transition_to(ProposalStatus::Executed) {
            return Err(InvalidTransition::new(id, proposal.status, ProposalStatus::Executed).into());
        }

        let receipt = ledger.execute_proposal(id).await?;
        self.update_proposal(
            id,
            &ProposalPatch::new()
                .executed(true)
                .status(ProposalStatus::Executed),
        )?;
        info!(proposal_id = id, digest = %receipt.digest, "Proposal executed");
        Ok(receipt)
    }

    /// Submit a new proposal and append it locally as a DRAFT
    pub async fn create_proposal(
        &mut self,
        ledger: &dyn LedgerClient,
        dao_id: &str,
        proposer: &str,
        title: &str,
        description: &str,
        amount: Mist,
    ) -> DaoResult<Proposal> {
        self.is_loading = true;
        self.error = None;

        let now = now_millis();
        let submission = ProposalSubmission {
            dao_id: dao_id.to_string(),
            title: title.to_string(),
            description: description.to_string(),
            amount,
            proposer: proposer.to_string(),
            deadline: now + DEFAULT_PROPOSAL_DEADLINE_MS,
        };

        let result = ledger.submit_proposal(&submission).await;
        self.is_loading = false;
        let receipt = result.map_err(|e| self.fail(e))?;

        let proposal = Proposal {
            id: receipt
                .created_object
                .unwrap_or_else(|| format!("0x{:x}", now)),
            dao_id: submission.dao_id,
            title: submission.title,
            description: submission.description,
            amount_requested: amount.to_base_units(),
            proposer: submission.proposer,
            deadline: submission.deadline,
            executed: false,
            votes_for: 0,
            votes_against: 0,
            status: ProposalStatus::Draft,
            created_at: Some(Utc::now()),
        };
        info!(proposal_id = %proposal.id, dao_id, "Proposal created");
        self.add_proposal(proposal.clone());
        Ok(proposal)
    }

    /// Replace the collection with the ledger's view of `dao_id`
    pub async fn refresh_proposals(
        &mut self,
        ledger: &dyn LedgerClient,
        dao_id: &str,
    ) -> DaoResult<()> {
        self.is_loading = true;
        self.error = None;
        let result = ledger.list_proposals(dao_id).await;
        self.is_loading = false;

        let proposals = result.map_err(|e| self.fail(e))?;
        debug!(dao_id, count = proposals.len(), "Loaded proposals");
        self.set_proposals(proposals);
        Ok(())
    }
}

fn compare_by(key: SortKey, a: &Proposal, b: &Proposal) -> Ordering {
    match key {
        SortKey::CreatedAt => a.created_at_millis().cmp(&b.created_at_millis()),
        SortKey::VotesFor => a.votes_for.cmp(&b.votes_for),
        SortKey::AmountRequested => amount_key(a).cmp(&amount_key(b)),
    }
}

/// Unparsable amounts sort as zero
fn amount_key(p: &Proposal) -> u128 {
    p.amount_mist().map(Mist::as_u128).unwrap_or(0)
}

impl Persist for ProposalStore {
    const KEY: &'static str = PROPOSAL_STORAGE_KEY;
    type Snapshot = ProposalSnapshot;

    fn snapshot(&self) -> ProposalSnapshot {
        ProposalSnapshot {
            proposals: self.proposals.clone(),
            status_filter: self.status_filter,
            sort_by: self.sort_by,
            sort_order: self.sort_order,
        }
    }

    fn restore(&mut self, snapshot: ProposalSnapshot) {
        self.proposals = snapshot.proposals;
        self.status_filter = snapshot.status_filter;
        self.sort_by = snapshot.sort_by;
        self.sort_order = snapshot.sort_order;
        self.recompute_active();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::MockLedger;
    use chrono::TimeZone;

    fn proposal(id: &str, status: ProposalStatus, votes_for: u64, amount: &str, day: u32) -> Proposal {
        Proposal {
            id: id.to_string(),
            dao_id: "0xdao".to_string(),
            title: format!("Proposal {}", id),
            description: String::new(),
            amount_requested: amount.to_string(),
            proposer: "0xproposer".to_string(),
            deadline: 0,
            executed: false,
            votes_for,
            votes_against: 0,
            status,
            created_at: Utc.with_ymd_and_hms(2025, 9, day, 0, 0, 0).single(),
        }
    }

    fn seeded() -> ProposalStore {
        let mut store = ProposalStore::new();
        store.set_proposals(vec![
            proposal("a", ProposalStatus::Active, 10, "300", 1),
            proposal("b", ProposalStatus::Draft, 30, "100", 3),
            proposal("c", ProposalStatus::Active, 20, "200", 2),
        ]);
        store
    }

    fn ids(list: &[Proposal]) -> Vec<&str> {
        list.iter().map(|p| p.id.as_str()).collect()
    }

    #[test]
    fn test_active_subset_tracks_mutations() {
        let mut store = seeded();
        assert_eq!(ids(store.active_proposals()), vec!["a", "c"]);

        store.add_proposal(proposal("d", ProposalStatus::Active, 0, "1", 4));
        assert_eq!(store.active_proposals().len(), 3);

        store.activate_proposal("b").unwrap();
        assert_eq!(ids(store.active_proposals()), vec!["a", "b", "c", "d"]);
    }

    #[test]
    fn test_default_view_is_newest_first() {
        let store = seeded();
        assert_eq!(ids(&store.filtered_proposals()), vec!["b", "c", "a"]);
    }

    #[test]
    fn test_filter_and_sort() {
        let mut store = seeded();
        store.set_status_filter(StatusFilter::Only(ProposalStatus::Active));
        store.set_sort_by(SortKey::AmountRequested);
        store.set_sort_order(SortOrder::Asc);
        assert_eq!(ids(&store.filtered_proposals()), vec!["c", "a"]);

        store.set_status_filter(StatusFilter::All);
        store.set_sort_by(SortKey::VotesFor);
        store.set_sort_order(SortOrder::Desc);
        assert_eq!(ids(&store.filtered_proposals()), vec!["b", "c", "a"]);
    }

    #[test]
    fn test_unparsable_amount_sorts_as_zero() {
        let mut store = seeded();
        store.add_proposal(proposal("bad", ProposalStatus::Draft, 0, "n/a", 5));
        store.set_sort_by(SortKey::AmountRequested);
        store.set_sort_order(SortOrder::Asc);
        assert_eq!(store.filtered_proposals()[0].id, "bad");
    }

    #[test]
    fn test_update_unknown_proposal() {
        let mut store = seeded();
        let err = store
            .update_proposal("zzz", &ProposalPatch::new().title("x"))
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_update_rejects_illegal_transition() {
        let mut store = seeded();
        let err = store
            .update_proposal("b", &ProposalPatch::new().status(ProposalStatus::Executed).title("changed"))
            .unwrap_err();
        assert!(err.is_invalid_transition());
        let b = store.proposal_by_id("b").unwrap();
        assert_eq!(b.status, ProposalStatus::Draft);
        assert_eq!(b.title, "Proposal b");
    }

    #[test]
    fn test_update_rejects_shrinking_tally() {
        let mut store = seeded();
        assert!(store
            .update_proposal("a", &ProposalPatch::new().votes_for(5))
            .is_err());
        assert_eq!(store.proposal_by_id("a").unwrap().votes_for, 10);
    }

    #[test]
    fn test_update_refreshes_current_proposal() {
        let mut store = seeded();
        store.set_current_proposal(store.proposal_by_id("a").cloned());
        store
            .update_proposal("a", &ProposalPatch::new().votes_for(99))
            .unwrap();
        assert_eq!(store.current_proposal().unwrap().votes_for, 99);
    }

    #[test]
    fn test_vote_on_proposal() {
        let mut store = seeded();
        store.vote_on_proposal("b", true, 12_500).unwrap();
        store.vote_on_proposal("b", false, 500).unwrap();
        let b = store.proposal_by_id("b").unwrap();
        assert_eq!(b.votes_for, 30 + 12_500);
        assert_eq!(b.votes_against, 500);
    }

    #[test]
    fn test_vote_on_unknown_records_error() {
        let mut store = seeded();
        let err = store.vote_on_proposal("nope", true, 1).unwrap_err();
        assert!(err.is_not_found());
        assert!(store.error().unwrap().contains("nope"));
    }

    #[test]
    fn test_activate_twice_is_rejected() {
        let mut store = seeded();
        store.activate_proposal("b").unwrap();
        assert!(store.activate_proposal("b").unwrap_err().is_invalid_transition());
        assert!(store.activate_proposal("missing").unwrap_err().is_not_found());
    }

    #[test]
    fn test_reject_requires_active() {
        let mut store = seeded();
        assert!(store.reject_proposal("b").unwrap_err().is_invalid_transition());
        store.reject_proposal("a").unwrap();
        assert_eq!(store.proposal_by_id("a").unwrap().status, ProposalStatus::Rejected);
    }

    #[tokio::test]
    async fn test_execute_only_from_active() {
        let ledger = MockLedger::new();
        let mut store = seeded();

        let err = store.execute_proposal(&ledger, "b").await.unwrap_err();
        assert!(err.is_invalid_transition());
        assert_eq!(ledger.transactions(), 0);

        store.execute_proposal(&ledger, "a").await.unwrap();
        let a = store.proposal_by_id("a").unwrap();
        assert!(a.executed);
        assert_eq!(a.status, ProposalStatus::Executed);
        assert!(!store.is_loading());
        assert_eq!(ids(store.active_proposals()), vec!["c"]);
    }

    #[tokio::test]
    async fn test_create_proposal_appends_draft() {
        let ledger = MockLedger::new();
        let mut store = ProposalStore::new();
        let created = store
            .create_proposal(&ledger, "0xdao", "0xme", "Grant", "Fund it", Mist::from_sui(50_000))
            .await
            .unwrap();

        assert_eq!(created.status, ProposalStatus::Draft);
        assert_eq!(created.amount_requested, "50000000000000");
        assert_eq!(created.votes_for + created.votes_against, 0);
        assert!(created.deadline > now_millis() + DEFAULT_PROPOSAL_DEADLINE_MS - 60_000);
        assert_eq!(store.proposals().len(), 1);
    }

    #[tokio::test]
    async fn test_refresh_failure_keeps_collection() {
        let ledger = MockLedger::new();
        let mut store = seeded();
        ledger.set_failure(Some("fullnode down".to_string()));

        assert!(store.refresh_proposals(&ledger, "0xdao").await.is_err());
        assert_eq!(store.proposals().len(), 3);
        assert!(store.error().unwrap().contains("fullnode down"));
        assert!(!store.is_loading());
    }

    #[test]
    fn test_snapshot_restore_recomputes_active() {
        let store = seeded();
        let mut restored = ProposalStore::new();
        restored.restore(store.snapshot());
        assert_eq!(ids(restored.active_proposals()), vec!["a", "c"]);
    }
}
