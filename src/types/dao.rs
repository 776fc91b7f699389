use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::utils::balance::Mist;

/// A governed organization with a treasury
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dao {
    pub id: String,
    pub name: String,
    /// Treasury balance in MIST, kept as a decimal string
    pub treasury: String,
    pub proposal_count: u64,
    pub min_voting_power: u64,
    pub active: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub creator: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl Dao {
    pub fn treasury_mist(&self) -> Option<Mist> {
        self.treasury.trim().parse::<u128>().ok().map(Mist)
    }
}

/// Partial update merged into a DAO by `DaoStore::update_dao`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DaoPatch {
    pub name: Option<String>,
    pub treasury: Option<String>,
    pub proposal_count: Option<u64>,
    pub min_voting_power: Option<u64>,
    pub active: Option<bool>,
}

impl DaoPatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn treasury(mut self, treasury: impl Into<String>) -> Self {
        self.treasury = Some(treasury.into());
        self
    }

    pub fn proposal_count(mut self, count: u64) -> Self {
        self.proposal_count = Some(count);
        self
    }

    pub fn min_voting_power(mut self, power: u64) -> Self {
        self.min_voting_power = Some(power);
        self
    }

    pub fn active(mut self, active: bool) -> Self {
        self.active = Some(active);
        self
    }

    pub fn apply_to(&self, dao: &mut Dao) {
        if let Some(name) = &self.name {
            dao.name = name.clone();
        }
        if let Some(treasury) = &self.treasury {
            dao.treasury = treasury.clone();
        }
        if let Some(count) = self.proposal_count {
            dao.proposal_count = count;
        }
        if let Some(power) = self.min_voting_power {
            dao.min_voting_power = power;
        }
        if let Some(active) = self.active {
            dao.active = active;
        }
    }
}
