//! Error types for the Sui DAO SDK
//!
//! Every failure kind is its own small struct carrying the context needed to
//! render a useful message; `DaoError` wraps them all so store actions and the
//! session coordinator can return a single result type.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

use crate::types::ProposalStatus;

// =============================================================================
// Lookup Errors
// =============================================================================

/// Error when a proposal id is not present in the store
#[derive(Debug, Error, Clone, Serialize, Deserialize)]
#[error("Proposal not found: {message}")]
pub struct ProposalNotFound {
    /// Detailed error message
    pub message: String,
    /// The proposal id that was looked up
    pub proposal_id: Option<String>,
}

impl ProposalNotFound {
    /// Create a new proposal not found error
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            proposal_id: None,
        }
    }

    /// Create a new proposal not found error for a specific id
    pub fn with_id(proposal_id: impl Into<String>) -> Self {
        let proposal_id = proposal_id.into();
        Self {
            message: format!("no proposal with id {}", proposal_id),
            proposal_id: Some(proposal_id),
        }
    }
}

/// Error when a governance token cannot be resolved
#[derive(Debug, Error, Clone, Serialize, Deserialize)]
#[error("Token not found: {message}")]
pub struct TokenNotFound {
    /// Detailed error message
    pub message: String,
    /// The token id that was looked up
    pub token_id: Option<String>,
}

impl TokenNotFound {
    /// Create a new token not found error
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            token_id: None,
        }
    }

    /// Create a new token not found error for a specific id
    pub fn with_id(token_id: impl Into<String>) -> Self {
        let token_id = token_id.into();
        Self {
            message: format!("no governance token with id {}", token_id),
            token_id: Some(token_id),
        }
    }
}

/// Error when a DAO id is not known
#[derive(Debug, Error, Clone, Serialize, Deserialize)]
#[error("DAO not found: {message}")]
pub struct DaoNotFound {
    /// Detailed error message
    pub message: String,
    /// The DAO id that was looked up
    pub dao_id: Option<String>,
}

impl DaoNotFound {
    /// Create a new DAO not found error
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            dao_id: None,
        }
    }

    /// Create a new DAO not found error for a specific id
    pub fn with_id(dao_id: impl Into<String>) -> Self {
        let dao_id = dao_id.into();
        Self {
            message: format!("no DAO with id {}", dao_id),
            dao_id: Some(dao_id),
        }
    }
}

// =============================================================================
// Governance Errors
// =============================================================================

/// Error when a voter already has a vote recorded for a proposal
#[derive(Debug, Error, Clone, Serialize, Deserialize)]
#[error("Duplicate vote: {voter} already voted on {proposal_id}")]
pub struct DuplicateVote {
    /// The proposal that was voted on
    pub proposal_id: String,
    /// The voter address
    pub voter: String,
}

impl DuplicateVote {
    /// Create a new duplicate vote error
    pub fn new(proposal_id: impl Into<String>, voter: impl Into<String>) -> Self {
        Self {
            proposal_id: proposal_id.into(),
            voter: voter.into(),
        }
    }
}

/// Error when a proposal status change is not an allowed transition
#[derive(Debug, Error, Clone, Serialize, Deserialize)]
#[error("Invalid status transition for {proposal_id}: {from} -> {to}")]
pub struct InvalidTransition {
    /// The proposal being updated
    pub proposal_id: String,
    /// Current status
    pub from: ProposalStatus,
    /// Requested status
    pub to: ProposalStatus,
}

impl InvalidTransition {
    /// Create a new invalid transition error
    pub fn new(proposal_id: impl Into<String>, from: ProposalStatus, to: ProposalStatus) -> Self {
        Self {
            proposal_id: proposal_id.into(),
            from,
            to,
        }
    }
}

/// Error when a vote cannot be applied for a reason other than lookup
#[derive(Debug, Error, Clone, Serialize, Deserialize)]
#[error("Vote failed: {message}")]
pub struct VoteFailed {
    /// Detailed error message
    pub message: String,
    /// The proposal id if known
    pub proposal_id: Option<String>,
}

impl VoteFailed {
    /// Create a new vote failed error
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            proposal_id: None,
        }
    }

    /// Create a new vote failed error for a proposal
    pub fn with_proposal(message: impl Into<String>, proposal_id: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            proposal_id: Some(proposal_id.into()),
        }
    }
}

// =============================================================================
// Input Errors
// =============================================================================

/// Per-field validation failure, e.g. from the proposal creation form
#[derive(Debug, Error, Clone, Default, Serialize, Deserialize)]
#[error("Validation failed: {}", summarize_fields(.fields))]
pub struct ValidationError {
    /// Field name -> human readable message
    pub fields: BTreeMap<String, String>,
}

impl ValidationError {
    /// Create an empty validation error
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a validation error for a single field
    pub fn field(field: impl Into<String>, message: impl Into<String>) -> Self {
        let mut err = Self::new();
        err.add(field, message);
        err
    }

    /// Record a message for a field
    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.fields.insert(field.into(), message.into());
    }

    /// Message recorded for a field, if any
    pub fn get(&self, field: &str) -> Option<&str> {
        self.fields.get(field).map(String::as_str)
    }

    /// True if no field failed
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

fn summarize_fields(fields: &BTreeMap<String, String>) -> String {
    fields
        .iter()
        .map(|(field, message)| format!("{}: {}", field, message))
        .collect::<Vec<_>>()
        .join("; ")
}

/// Error when an action needs a connected wallet
#[derive(Debug, Error, Clone, Serialize, Deserialize)]
#[error("Wallet not connected: {message}")]
pub struct WalletNotConnected {
    /// Detailed error message
    pub message: String,
}

impl WalletNotConnected {
    /// Create a new wallet not connected error
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

// =============================================================================
// Backend Errors
// =============================================================================

/// Error returned by the ledger client boundary
#[derive(Debug, Error, Clone, Serialize, Deserialize)]
#[error("Ledger error: {message}")]
pub struct LedgerError {
    /// Detailed error message
    pub message: String,
    /// The ledger method that failed
    pub method: Option<String>,
    /// True when the backend does not implement the call at all
    pub unsupported: bool,
}

impl LedgerError {
    /// Create a new ledger error
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            method: None,
            unsupported: false,
        }
    }

    /// Create a new ledger error tagged with the failing method
    pub fn with_method(message: impl Into<String>, method: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            method: Some(method.into()),
            unsupported: false,
        }
    }

    /// Create an error for a call the backend cannot serve
    pub fn unsupported(method: impl Into<String>) -> Self {
        let method = method.into();
        Self {
            message: format!("{} requires a transaction signer", method),
            method: Some(method),
            unsupported: true,
        }
    }
}

/// Error when reading or writing persisted client state
#[derive(Debug, Error, Clone, Serialize, Deserialize)]
#[error("Storage error: {message}")]
pub struct StorageError {
    /// Detailed error message
    pub message: String,
    /// Storage key of the store involved
    pub key: Option<String>,
}

impl StorageError {
    /// Create a new storage error
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            key: None,
        }
    }

    /// Create a new storage error for a store key
    pub fn with_key(message: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            key: Some(key.into()),
        }
    }
}

// =============================================================================
// Unified Error Enum
// =============================================================================

/// Unified error type for all SDK operations
#[derive(Debug, Error, Clone, Serialize, Deserialize)]
pub enum DaoError {
    // Lookup Errors
    #[error(transparent)]
    ProposalNotFound(#[from] ProposalNotFound),
    #[error(transparent)]
    TokenNotFound(#[from] TokenNotFound),
    #[error(transparent)]
    DaoNotFound(#[from] DaoNotFound),

    // Governance Errors
    #[error(transparent)]
    DuplicateVote(#[from] DuplicateVote),
    #[error(transparent)]
    InvalidTransition(#[from] InvalidTransition),
    #[error(transparent)]
    VoteFailed(#[from] VoteFailed),

    // Input Errors
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    WalletNotConnected(#[from] WalletNotConnected),

    // Backend Errors
    #[error(transparent)]
    Ledger(#[from] LedgerError),
    #[error(transparent)]
    Storage(#[from] StorageError),

    // External library errors (converted to String for Serialize/Deserialize)
    #[error("IO error: {0}")]
    Io(String),
    #[error("JSON error: {0}")]
    Json(String),
    #[error("HTTP error: {0}")]
    Http(String),
}

impl From<std::io::Error> for DaoError {
    fn from(err: std::io::Error) -> Self {
        DaoError::Io(err.to_string())
    }
}

impl From<serde_json::Error> for DaoError {
    fn from(err: serde_json::Error) -> Self {
        DaoError::Json(err.to_string())
    }
}

impl From<reqwest::Error> for DaoError {
    fn from(err: reqwest::Error) -> Self {
        DaoError::Http(err.to_string())
    }
}

/// Result type alias for SDK operations
pub type DaoResult<T> = Result<T, DaoError>;

impl DaoError {
    /// Check if this is any of the lookup errors
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            DaoError::ProposalNotFound(_) | DaoError::TokenNotFound(_) | DaoError::DaoNotFound(_)
        )
    }

    /// Check if this is a duplicate vote rejection
    pub fn is_duplicate_vote(&self) -> bool {
        matches!(self, DaoError::DuplicateVote(_))
    }

    /// Check if this is a rejected status transition
    pub fn is_invalid_transition(&self) -> bool {
        matches!(self, DaoError::InvalidTransition(_))
    }

    /// Check if this is a form validation failure
    pub fn is_validation(&self) -> bool {
        matches!(self, DaoError::Validation(_))
    }

    /// Check if the ledger backend refused the call as unsupported
    pub fn is_unsupported(&self) -> bool {
        matches!(self, DaoError::Ledger(e) if e.unsupported)
    }

    /// Check if the failure came from the ledger or transport layer
    pub fn is_backend_error(&self) -> bool {
        matches!(self, DaoError::Ledger(_) | DaoError::Http(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_proposal_not_found_with_id() {
        let err = ProposalNotFound::with_id("0xproposal9");
        assert_eq!(err.proposal_id.as_deref(), Some("0xproposal9"));
        assert!(err.to_string().contains("0xproposal9"));
    }

    #[test]
    fn test_validation_error_fields() {
        let mut err = ValidationError::new();
        assert!(err.is_empty());
        err.add("title", "title is required");
        err.add("amount", "amount must be a positive number");

        assert_eq!(err.get("title"), Some("title is required"));
        assert!(err.get("description").is_none());
        // BTreeMap keeps fields sorted in the summary
        assert_eq!(
            err.to_string(),
            "Validation failed: amount: amount must be a positive number; title: title is required"
        );
    }

    #[test]
    fn test_invalid_transition_message() {
        let err = InvalidTransition::new("0x1", ProposalStatus::Draft, ProposalStatus::Executed);
        assert_eq!(
            err.to_string(),
            "Invalid status transition for 0x1: DRAFT -> EXECUTED"
        );
    }

    #[test]
    fn test_dao_error_helper_methods() {
        let err: DaoError = TokenNotFound::with_id("0xtoken").into();
        assert!(err.is_not_found());
        assert!(!err.is_duplicate_vote());

        let err: DaoError = DuplicateVote::new("0xp", "0xvoter").into();
        assert!(err.is_duplicate_vote());

        let err: DaoError = LedgerError::unsupported("cast_vote").into();
        assert!(err.is_unsupported());
        assert!(err.is_backend_error());

        let err: DaoError = LedgerError::new("timeout").into();
        assert!(!err.is_unsupported());
    }

    #[test]
    fn test_dao_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: DaoError = io_err.into();
        assert!(matches!(err, DaoError::Io(_)));
    }

    #[test]
    fn test_dao_error_serialization() {
        let err = DaoError::DuplicateVote(DuplicateVote::new("0xp", "0xv"));
        let serialized = serde_json::to_string(&err).expect("Should serialize");
        let deserialized: DaoError =
            serde_json::from_str(&serialized).expect("Should deserialize");
        assert!(deserialized.is_duplicate_vote());
    }
}
