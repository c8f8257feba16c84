//! Events emitted by successful calls

use hub_core::{Address, Amount, TxId, TxStatus, VoteStatus};
use serde::{Deserialize, Serialize};

/// Structured notification produced by a committed call.
///
/// A failed call produces no events.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event")]
pub enum HubEvent {
    /// A withdrawal request was opened and its amount escrowed
    TransactionRequest {
        uid: TxId,
        by: Address,
        account: Address,
        to: Address,
        amount: Amount,
        /// Voter snapshot, in profile order
        voters: Vec<Address>,
    },

    /// A voter cast a decision
    TransactionVote {
        uid: TxId,
        voter: Address,
        account: Address,
        status: VoteStatus,
    },

    /// The transaction reached a terminal status
    TransactionResponse {
        uid: TxId,
        account: Address,
        by: Address,
        to: Address,
        status: TxStatus,
    },
}

impl HubEvent {
    /// Event name as seen by external observers
    pub fn name(&self) -> &'static str {
        match self {
            HubEvent::TransactionRequest { .. } => "TransactionRequest",
            HubEvent::TransactionVote { .. } => "TransactionVote",
            HubEvent::TransactionResponse { .. } => "TransactionResponse",
        }
    }

    /// Transaction the event belongs to
    pub fn uid(&self) -> TxId {
        match self {
            HubEvent::TransactionRequest { uid, .. }
            | HubEvent::TransactionVote { uid, .. }
            | HubEvent::TransactionResponse { uid, .. } => *uid,
        }
    }
}
