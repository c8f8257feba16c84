//! Journal record - one committed call

use crate::call::Call;
use crate::event::HubEvent;
use chrono::{DateTime, Utc};
use hub_core::Address;
use serde::{Deserialize, Serialize};

/// A successfully applied call, as written to the journal.
///
/// Failed calls are never journaled, so replaying every record against an
/// empty ledger reproduces the live state exactly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JournalRecord {
    /// 1-based position in the journal
    pub sequence: u64,
    /// Hash of the previous record, `GENESIS` for the first
    pub prev_hash: String,
    /// SHA-256 over every other field
    pub hash: String,
    pub timestamp: DateTime<Utc>,
    pub correlation_id: String,
    pub caller: Address,
    pub call: Call,
    /// Events the call emitted, in order
    pub events: Vec<HubEvent>,
}
