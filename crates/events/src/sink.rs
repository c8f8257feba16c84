//! Event sinks - receivers of committed events

use crate::error::EventError;
use crate::event::HubEvent;
use async_trait::async_trait;
use std::sync::{Arc, Mutex};

/// Receiver of committed events.
///
/// Sinks are called after the call is journaled, once per event, in
/// emission order. A failing sink does not undo the call.
#[async_trait]
pub trait EventSink: Send + Sync {
    /// Sink name (for logging)
    fn name(&self) -> &str;

    /// Handle one committed event
    async fn publish(&self, event: &HubEvent) -> Result<(), EventError>;
}

/// Keeps every event in memory. Clones share the same buffer.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    events: Arc<Mutex<Vec<HubEvent>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of everything received so far
    pub fn events(&self) -> Vec<HubEvent> {
        match self.events.lock() {
            Ok(events) => events.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

#[async_trait]
impl EventSink for MemorySink {
    fn name(&self) -> &str {
        "memory"
    }

    async fn publish(&self, event: &HubEvent) -> Result<(), EventError> {
        let mut events = self.events.lock().map_err(|e| EventError::SinkFailed {
            name: self.name().to_string(),
            reason: e.to_string(),
        })?;
        events.push(event.clone());
        Ok(())
    }
}

/// Writes each event to the `tracing` log
#[derive(Debug, Clone, Copy, Default)]
pub struct LogSink;

#[async_trait]
impl EventSink for LogSink {
    fn name(&self) -> &str {
        "log"
    }

    async fn publish(&self, event: &HubEvent) -> Result<(), EventError> {
        match event {
            HubEvent::TransactionRequest {
                uid,
                by,
                account,
                amount,
                voters,
                ..
            } => tracing::info!(
                tx_id = %uid,
                %by,
                %account,
                %amount,
                voters = voters.len(),
                "TransactionRequest"
            ),
            HubEvent::TransactionVote {
                uid, voter, status, ..
            } => tracing::info!(tx_id = %uid, %voter, %status, "TransactionVote"),
            HubEvent::TransactionResponse {
                uid, to, status, ..
            } => tracing::info!(tx_id = %uid, %to, %status, "TransactionResponse"),
        }
        Ok(())
    }
}
