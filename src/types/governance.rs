use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A voting-weight token held by one owner inside one DAO
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GovernanceToken {
    pub id: String,
    pub dao_id: String,
    pub voting_power: u64,
    pub owner: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

/// Partial update merged into a token by `GovernanceStore::update_token`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPatch {
    pub dao_id: Option<String>,
    pub voting_power: Option<u64>,
    pub owner: Option<String>,
}

impl TokenPatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn voting_power(mut self, voting_power: u64) -> Self {
        self.voting_power = Some(voting_power);
        self
    }

    pub fn owner(mut self, owner: impl Into<String>) -> Self {
        self.owner = Some(owner.into());
        self
    }

    pub fn dao_id(mut self, dao_id: impl Into<String>) -> Self {
        self.dao_id = Some(dao_id.into());
        self
    }

    pub fn apply_to(&self, token: &mut GovernanceToken) {
        if let Some(dao_id) = &self.dao_id {
            token.dao_id = dao_id.clone();
        }
        if let Some(voting_power) = self.voting_power {
            token.voting_power = voting_power;
        }
        if let Some(owner) = &self.owner {
            token.owner = owner.clone();
        }
    }
}

/// A weighted ballot cast by one voter on one proposal
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vote {
    pub id: String,
    pub proposal_id: String,
    pub voter: String,
    pub support: bool,
    pub voting_power: u64,
    /// Milliseconds since the Unix epoch
    pub timestamp: i64,
}

impl Vote {
    /// Ledger key; one vote per (proposal, voter)
    pub fn key(&self) -> (String, String) {
        (self.proposal_id.clone(), self.voter.clone())
    }
}

/// Sum of token weights, saturating instead of overflowing
pub fn sum_voting_power<'a>(tokens: impl IntoIterator<Item = &'a GovernanceToken>) -> u64 {
    tokens
        .into_iter()
        .fold(0u64, |acc, t| acc.saturating_add(t.voting_power))
}
