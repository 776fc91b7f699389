use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::errors::ValidationError;
use crate::utils::balance::{parse_sui_amount, Mist};

/// Lifecycle status of a proposal.
///
/// The numeric codes mirror the Move package (`0, 3, 4, 5`); the gaps are
/// kept for wire compatibility. Legal transitions are
/// `DRAFT -> ACTIVE -> {EXECUTED, REJECTED}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProposalStatus {
    Active,
    Executed,
    Rejected,
    Draft,
}

impl ProposalStatus {
    pub const ALL: [ProposalStatus; 4] = [
        ProposalStatus::Active,
        ProposalStatus::Executed,
        ProposalStatus::Rejected,
        ProposalStatus::Draft,
    ];

    /// On-chain status code
    pub const fn code(self) -> u8 {
        match self {
            ProposalStatus::Active => 0,
            ProposalStatus::Executed => 3,
            ProposalStatus::Rejected => 4,
            ProposalStatus::Draft => 5,
        }
    }

    /// Decode an on-chain status code
    pub fn from_code(code: u8) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.code() == code)
    }

    /// Whether `self -> next` is an allowed lifecycle step
    pub fn can_transition_to(self, next: ProposalStatus) -> bool {
        matches!(
            (self, next),
            (ProposalStatus::Draft, ProposalStatus::Active)
                | (ProposalStatus::Active, ProposalStatus::Executed)
                | (ProposalStatus::Active, ProposalStatus::Rejected)
        )
    }

    /// No further transitions are possible
    pub fn is_terminal(self) -> bool {
        matches!(self, ProposalStatus::Executed | ProposalStatus::Rejected)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ProposalStatus::Active => "ACTIVE",
            ProposalStatus::Executed => "EXECUTED",
            ProposalStatus::Rejected => "REJECTED",
            ProposalStatus::Draft => "DRAFT",
        }
    }
}

impl fmt::Display for ProposalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProposalStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if let Ok(code) = trimmed.parse::<u8>() {
            return Self::from_code(code).ok_or_else(|| format!("Unknown status code {}", code));
        }
        match trimmed.to_lowercase().as_str() {
            "active" => Ok(ProposalStatus::Active),
            "executed" => Ok(ProposalStatus::Executed),
            "rejected" => Ok(ProposalStatus::Rejected),
            "draft" => Ok(ProposalStatus::Draft),
            _ => Err(format!(
                "Invalid status '{}'. Valid options: active, executed, rejected, draft",
                s
            )),
        }
    }
}

/// A funding request owned by a DAO
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Proposal {
    pub id: String,
    pub dao_id: String,
    pub title: String,
    pub description: String,
    /// Requested amount in MIST, kept as a decimal string
    pub amount_requested: String,
    pub proposer: String,
    /// Voting deadline, milliseconds since the Unix epoch
    pub deadline: i64,
    pub executed: bool,
    pub votes_for: u64,
    pub votes_against: u64,
    pub status: ProposalStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl Proposal {
    /// Requested amount parsed from its MIST string
    pub fn amount_mist(&self) -> Option<Mist> {
        self.amount_requested.trim().parse::<u128>().ok().map(Mist)
    }

    /// Creation time in milliseconds; missing timestamps sort as the epoch
    pub fn created_at_millis(&self) -> i64 {
        self.created_at.map(|t| t.timestamp_millis()).unwrap_or(0)
    }

    pub fn total_votes(&self) -> u64 {
        self.votes_for.saturating_add(self.votes_against)
    }

    /// Share of `votes_for` in all votes, 0.0 when nobody voted
    pub fn support_percentage(&self) -> f64 {
        let total = self.total_votes();
        if total == 0 {
            return 0.0;
        }
        self.votes_for as f64 / total as f64 * 100.0
    }

    pub fn is_active(&self) -> bool {
        self.status == ProposalStatus::Active
    }

    pub fn is_past_deadline(&self, now_ms: i64) -> bool {
        self.deadline <= now_ms
    }
}

/// Partial update merged into a proposal by `ProposalStore::update_proposal`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProposalPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub amount_requested: Option<String>,
    pub deadline: Option<i64>,
    pub executed: Option<bool>,
    pub votes_for: Option<u64>,
    pub votes_against: Option<u64>,
    pub status: Option<ProposalStatus>,
}

impl ProposalPatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn amount_requested(mut self, amount: impl Into<String>) -> Self {
        self.amount_requested = Some(amount.into());
        self
    }

    pub fn deadline(mut self, deadline: i64) -> Self {
        self.deadline = Some(deadline);
        self
    }

    pub fn executed(mut self, executed: bool) -> Self {
        self.executed = Some(executed);
        self
    }

    pub fn votes_for(mut self, votes: u64) -> Self {
        self.votes_for = Some(votes);
        self
    }

    pub fn votes_against(mut self, votes: u64) -> Self {
        self.votes_against = Some(votes);
        self
    }

    pub fn status(mut self, status: ProposalStatus) -> Self {
        self.status = Some(status);
        self
    }

    /// Merge every set field into `proposal`
    pub fn apply_to(&self, proposal: &mut Proposal) {
        if let Some(title) = &self.title {
            proposal.title = title.clone();
        }
        if let Some(description) = &self.description {
            proposal.description = description.clone();
        }
        if let Some(amount) = &self.amount_requested {
            proposal.amount_requested = amount.clone();
        }
        if let Some(deadline) = self.deadline {
            proposal.deadline = deadline;
        }
        if let Some(executed) = self.executed {
            proposal.executed = executed;
        }
        if let Some(votes_for) = self.votes_for {
            proposal.votes_for = votes_for;
        }
        if let Some(votes_against) = self.votes_against {
            proposal.votes_against = votes_against;
        }
        if let Some(status) = self.status {
            proposal.status = status;
        }
    }
}

/// Status filter applied by `ProposalStore::filtered_proposals`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusFilter {
    #[default]
    All,
    Only(ProposalStatus),
}

impl StatusFilter {
    pub fn matches(self, status: ProposalStatus) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Only(wanted) => wanted == status,
        }
    }
}

impl FromStr for StatusFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("all") {
            return Ok(StatusFilter::All);
        }
        s.parse().map(StatusFilter::Only)
    }
}

impl fmt::Display for StatusFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatusFilter::All => f.write_str("all"),
            StatusFilter::Only(status) => write!(f, "{}", status),
        }
    }
}

/// Key used to order the proposal view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    #[default]
    CreatedAt,
    VotesFor,
    AmountRequested,
}

impl FromStr for SortKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "created_at" | "created" => Ok(SortKey::CreatedAt),
            "votes_for" | "votes" => Ok(SortKey::VotesFor),
            "amount_requested" | "amount" => Ok(SortKey::AmountRequested),
            _ => Err(format!(
                "Invalid sort key '{}'. Valid options: created_at, votes_for, amount_requested",
                s
            )),
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortKey::CreatedAt => f.write_str("created_at"),
            SortKey::VotesFor => f.write_str("votes_for"),
            SortKey::AmountRequested => f.write_str("amount_requested"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl FromStr for SortOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "asc" | "ascending" => Ok(SortOrder::Asc),
            "desc" | "descending" => Ok(SortOrder::Desc),
            _ => Err(format!("Invalid sort order '{}'. Valid options: asc, desc", s)),
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortOrder::Asc => f.write_str("asc"),
            SortOrder::Desc => f.write_str("desc"),
        }
    }
}

/// Input of the proposal creation form.
///
/// `amount` is entered in SUI and converted to MIST on submission.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProposalDraft {
    pub title: String,
    pub description: String,
    pub amount: String,
}

impl ProposalDraft {
    pub fn new(
        title: impl Into<String>,
        description: impl Into<String>,
        amount: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            amount: amount.into(),
        }
    }

    /// Check every field and report all failures at once
    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut errors = ValidationError::new();

        if self.title.trim().is_empty() {
            errors.add("title", "title is required");
        }
        if self.description.trim().is_empty() {
            errors.add("description", "description is required");
        }
        if self.amount.trim().is_empty() {
            errors.add("amount", "amount is required");
        } else {
            match parse_sui_amount(&self.amount) {
                Some(mist) if mist.as_u128() > 0 => {}
                _ => errors.add("amount", "amount must be a positive number"),
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Validated amount in MIST
    pub fn amount_mist(&self) -> Result<Mist, ValidationError> {
        self.validate()?;
        parse_sui_amount(&self.amount)
            .ok_or_else(|| ValidationError::field("amount", "amount must be a positive number"))
    }
}
