//! Fixture-backed ledger used until the DAO package is deployed.

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use tracing::debug;

use super::{LedgerClient, ProposalSubmission, TxReceipt};
use crate::core::constants::DAY_MS;
use crate::errors::{DaoError, DaoNotFound, DaoResult, LedgerError};
use crate::types::{Dao, GovernanceToken, Network, Proposal, ProposalStatus, Vote, WalletInfo};
use crate::utils::balance::Mist;
use crate::utils::{new_object_id, now_millis};

/// Address returned by `connect_account`
pub const MOCK_ACCOUNT: &str = "0x1234567890abcdef1234567890abcdef12345678";

/// Id of the primary fixture DAO
pub const MOCK_DAO_ID: &str = "0x1234567890abcdef";

const MOCK_WALLET_BALANCE: u128 = 1_000_000_000_000;
const MOCK_REFRESHED_BALANCE: u128 = 1_500_000_000_000;

/// Deterministic in-memory ledger.
///
/// Reads always return the same fixtures (with deadlines relative to the
/// ledger's clock); writes succeed with a fresh digest unless a failure has
/// been injected with [`MockLedger::set_failure`].
pub struct MockLedger {
    now_ms: Option<i64>,
    failure: Mutex<Option<String>>,
    tx_counter: AtomicU64,
}

impl Default for MockLedger {
    fn default() -> Self {
        Self::new()
    }
}

impl MockLedger {
    pub fn new() -> Self {
        Self {
            now_ms: None,
            failure: Mutex::new(None),
            tx_counter: AtomicU64::new(0),
        }
    }

    /// Pin the clock used for fixture deadlines
    pub fn with_clock(mut self, now_ms: i64) -> Self {
        self.now_ms = Some(now_ms);
        self
    }

    /// Make every subsequent call fail with `message` (or succeed again with `None`)
    pub fn set_failure(&self, message: Option<String>) {
        let mut failure = self.failure.lock().unwrap_or_else(|e| e.into_inner());
        *failure = message;
    }

    /// Number of write calls accepted so far
    pub fn transactions(&self) -> u64 {
        self.tx_counter.load(Ordering::SeqCst)
    }

    fn now(&self) -> i64 {
        self.now_ms.unwrap_or_else(now_millis)
    }

    fn check(&self, method: &str) -> DaoResult<()> {
        let failure = self.failure.lock().unwrap_or_else(|e| e.into_inner());
        match failure.as_ref() {
            Some(message) => Err(LedgerError::with_method(message.clone(), method).into()),
            None => Ok(()),
        }
    }

    fn receipt(&self, method: &str, created_object: Option<String>) -> TxReceipt {
        let n = self.tx_counter.fetch_add(1, Ordering::SeqCst) + 1;
        let digest = format!("mock-{}-{:06}", method, n);
        debug!(method, digest = %digest, "Mock ledger accepted transaction");
        match created_object {
            Some(object_id) => TxReceipt::with_object(digest, object_id),
            None => TxReceipt::new(digest),
        }
    }

    fn fixture_daos(&self) -> Vec<Dao> {
        let now = self.now();
        vec![
            Dao {
                id: MOCK_DAO_ID.to_string(),
                name: "Sui DAO Financing".to_string(),
                treasury: Mist::from_sui(125_000).to_base_units(),
                proposal_count: 8,
                min_voting_power: 1000,
                active: true,
                creator: Some("0xabcdef1234567890".to_string()),
                created_at: utc(2025, 1, 15, 10, 0),
            },
            Dao {
                id: "tech-dao".to_string(),
                name: "Tech Innovation DAO".to_string(),
                treasury: Mist::from_sui(1_250_000).to_base_units(),
                proposal_count: 8,
                min_voting_power: 1000,
                active: true,
                creator: Some("0x1521fb7afe1d0dc171c962".to_string()),
                created_at: DateTime::from_timestamp_millis(now - 30 * DAY_MS),
            },
            Dao {
                id: "defi-dao".to_string(),
                name: "DeFi Protocol DAO".to_string(),
                treasury: Mist::from_sui(890_000).to_base_units(),
                proposal_count: 5,
                min_voting_power: 1000,
                active: true,
                creator: Some("0xf17bca5583ae3f2bb6802c".to_string()),
                created_at: DateTime::from_timestamp_millis(now - 20 * DAY_MS),
            },
            Dao {
                id: "governance-dao".to_string(),
                name: "Governance & Strategy DAO".to_string(),
                treasury: Mist::from_sui(2_100_000).to_base_units(),
                proposal_count: 12,
                min_voting_power: 1000,
                active: true,
                creator: Some("0x69eb64bc9c0c7696336e56".to_string()),
                created_at: DateTime::from_timestamp_millis(now - 45 * DAY_MS),
            },
        ]
    }
}

fn utc(year: i32, month: u32, day: u32, hour: u32, minute: u32) -> Option<DateTime<Utc>> {
    Utc.with_ymd_and_hms(year, month, day, hour, minute, 0).single()
}

#[async_trait]
impl LedgerClient for MockLedger {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn list_daos(&self) -> DaoResult<Vec<Dao>> {
        self.check("list_daos")?;
        Ok(self.fixture_daos())
    }

    async fn get_dao(&self, dao_id: &str) -> DaoResult<Dao> {
        self.check("get_dao")?;
        self.fixture_daos()
            .into_iter()
            .find(|d| d.id == dao_id)
            .ok_or_else(|| DaoError::from(DaoNotFound::with_id(dao_id)))
    }

    async fn list_proposals(&self, dao_id: &str) -> DaoResult<Vec<Proposal>> {
        self.check("list_proposals")?;
        let now = self.now();
        Ok(vec![
            Proposal {
                id: "0xproposal1".to_string(),
                dao_id: dao_id.to_string(),
                title: "Financiamiento para DeFi Protocol".to_string(),
                description: "Propuesta para invertir 50,000 SUI en el desarrollo de un nuevo protocolo DeFi".to_string(),
                amount_requested: Mist::from_sui(50_000).to_base_units(),
                proposer: "0xproposer1".to_string(),
                deadline: now + 7 * DAY_MS,
                executed: false,
                votes_for: 156_000,
                votes_against: 23_000,
                status: ProposalStatus::Active,
                created_at: utc(2025, 9, 1, 10, 0),
            },
            Proposal {
                id: "0xproposal2".to_string(),
                dao_id: dao_id.to_string(),
                title: "Expansión del equipo de desarrollo".to_string(),
                description: "Contratar 3 desarrolladores adicionales especializados en Move y Sui para acelerar el roadmap de la plataforma".to_string(),
                amount_requested: Mist::from_sui(25_000).to_base_units(),
                proposer: "0xproposer2".to_string(),
                deadline: now - DAY_MS,
                executed: true,
                votes_for: 203_000,
                votes_against: 15_000,
                status: ProposalStatus::Executed,
                created_at: utc(2025, 8, 25, 15, 30),
            },
            Proposal {
                id: "0xproposal3".to_string(),
                dao_id: dao_id.to_string(),
                title: "Marketing y partnerships estratégicos".to_string(),
                description: "Campaña de marketing integral y establecimiento de partnerships con otros protocolos DeFi".to_string(),
                amount_requested: Mist::from_sui(15_000).to_base_units(),
                proposer: "0xproposer3".to_string(),
                deadline: now + 10 * DAY_MS,
                executed: false,
                votes_for: 0,
                votes_against: 0,
                status: ProposalStatus::Draft,
                created_at: utc(2025, 9, 5, 8, 0),
            },
        ])
    }

    async fn list_tokens(&self, dao_id: &str) -> DaoResult<Vec<GovernanceToken>> {
        self.check("list_tokens")?;
        Ok(vec![
            GovernanceToken {
                id: "0xtoken1".to_string(),
                dao_id: dao_id.to_string(),
                voting_power: 12_500,
                owner: MOCK_ACCOUNT.to_string(),
                created_at: utc(2025, 8, 15, 10, 0),
            },
            GovernanceToken {
                id: "0xtoken2".to_string(),
                dao_id: dao_id.to_string(),
                voting_power: 8_000,
                owner: "0xuser2".to_string(),
                created_at: utc(2025, 8, 20, 14, 30),
            },
            GovernanceToken {
                id: "0xtoken3".to_string(),
                dao_id: dao_id.to_string(),
                voting_power: 15_000,
                owner: "0xuser3".to_string(),
                created_at: utc(2025, 8, 25, 9, 15),
            },
        ])
    }

    async fn list_votes(&self, proposal_id: &str) -> DaoResult<Vec<Vote>> {
        self.check("list_votes")?;
        let now = self.now();
        let hour_ms = DAY_MS / 24;
        Ok(vec![
            Vote {
                id: "0xvote1".to_string(),
                proposal_id: proposal_id.to_string(),
                voter: "0xuser1".to_string(),
                support: true,
                voting_power: 12_500,
                timestamp: now - 2 * DAY_MS,
            },
            Vote {
                id: "0xvote2".to_string(),
                proposal_id: proposal_id.to_string(),
                voter: "0xuser2".to_string(),
                support: true,
                voting_power: 8_000,
                timestamp: now - DAY_MS,
            },
            Vote {
                id: "0xvote3".to_string(),
                proposal_id: proposal_id.to_string(),
                voter: "0xuser3".to_string(),
                support: false,
                voting_power: 15_000,
                timestamp: now - 3 * hour_ms,
            },
        ])
    }

    async fn get_balance(&self, address: &str) -> DaoResult<Mist> {
        self.check("get_balance")?;
        debug!(address, "Mock balance lookup");
        Ok(Mist(MOCK_REFRESHED_BALANCE))
    }

    async fn connect_account(&self, network: Network) -> DaoResult<WalletInfo> {
        self.check("connect_account")?;
        Ok(WalletInfo {
            address: MOCK_ACCOUNT.to_string(),
            balance: Mist(MOCK_WALLET_BALANCE).to_base_units(),
            network,
            connected: true,
            connecting: false,
        })
    }

    async fn submit_proposal(&self, submission: &ProposalSubmission) -> DaoResult<TxReceipt> {
        self.check("submit_proposal")?;
        debug!(dao_id = %submission.dao_id, title = %submission.title, "Mock proposal submission");
        Ok(self.receipt("submit_proposal", Some(new_object_id())))
    }

    async fn cast_vote(
        &self,
        proposal_id: &str,
        support: bool,
        token_id: &str,
    ) -> DaoResult<TxReceipt> {
        self.check("cast_vote")?;
        debug!(proposal_id, support, token_id, "Mock vote");
        Ok(self.receipt("cast_vote", Some(new_object_id())))
    }

    async fn execute_proposal(&self, proposal_id: &str) -> DaoResult<TxReceipt> {
        self.check("execute_proposal")?;
        debug!(proposal_id, "Mock execution");
        Ok(self.receipt("execute_proposal", None))
    }

    async fn mint_token(
        &self,
        dao_id: &str,
        owner: &str,
        voting_power: u64,
    ) -> DaoResult<TxReceipt> {
        self.check("mint_token")?;
        debug!(dao_id, owner, voting_power, "Mock token mint");
        Ok(self.receipt("mint_token", Some(new_object_id())))
    }

    async fn create_dao(&self, name: &str, min_voting_power: u64) -> DaoResult<TxReceipt> {
        self.check("create_dao")?;
        debug!(name, min_voting_power, "Mock DAO creation");
        Ok(self.receipt("create_dao", Some(new_object_id())))
    }
}
