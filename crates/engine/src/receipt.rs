//! Results of mutating operations

use hub_core::{Amount, ProfileId, TxId, TxStatus};
use hub_events::HubEvent;
use serde::Serialize;

/// Return value of a committed operation plus the events it emitted,
/// in emission order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Receipt<T> {
    pub value: T,
    pub events: Vec<HubEvent>,
}

impl<T> Receipt<T> {
    pub fn new(value: T) -> Self {
        Self {
            value,
            events: Vec::new(),
        }
    }

    pub fn with_events(value: T, events: Vec<HubEvent>) -> Self {
        Self { value, events }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Receipt<U> {
        Receipt {
            value: f(self.value),
            events: self.events,
        }
    }
}

/// Return value of `Hub::apply`, one shape per `Call` family
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Outcome {
    /// New balance of the credited account
    Balance(Amount),
    /// Id of the created profile
    Profile(ProfileId),
    /// Id of the created transaction
    Transaction(TxId),
    /// Transaction status after a vote
    Status(TxStatus),
    Done,
}
