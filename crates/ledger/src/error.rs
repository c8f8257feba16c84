//! Ledger errors

use hub_core::{Address, Amount, VoteStatus};
use thiserror::Error;

/// Errors that can occur in ledger operations.
///
/// Every variant rejects the whole operation: nothing is written when one
/// of these is returned.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HubError {
    /// Caller is not the owner, not a requester, or not a voter
    #[error("Permission denied.")]
    PermissionDenied,

    #[error("{what} doesn't exist")]
    NotFound { what: &'static str },

    #[error("Insufficient balance: available {available}, required {required}")]
    InsufficientBalance { available: Amount, required: Amount },

    #[error("Invalid consensus configuration: {0}")]
    InvalidConsensusConfiguration(&'static str),

    #[error("Unknown vote status: {0}")]
    InvalidVoteValue(VoteStatus),

    #[error("Transaction voting is closed.")]
    VotingClosed,

    #[error("Voter has already voted")]
    DuplicateVote,

    #[error("Balance overflow for {0}")]
    AmountOverflow(Address),
}

impl HubError {
    pub(crate) fn not_found(what: &'static str) -> Self {
        HubError::NotFound { what }
    }
}
