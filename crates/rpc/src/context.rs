//! Application context - a `Hub` kept in step with its call journal

use crate::config::HubConfig;
use chrono::Utc;
use hub_core::Address;
use hub_engine::{Hub, HubError, Outcome};
use hub_events::{
    calculate_record_hash, verify_chain, Call, ChainError, EventError, JournalReader, JournalRecord,
    JournalStore, GENESIS_HASH,
};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// A call that was applied and journaled
#[derive(Debug, Clone)]
pub struct Committed {
    pub outcome: Outcome,
    pub record: JournalRecord,
}

/// Wires the engine to the journal
pub struct AppContext {
    hub: Hub,
    store: JournalStore,
    journal_path: PathBuf,
    last_sequence: u64,
    last_hash: String,
    /// Set when a call was applied but could not be journaled
    poisoned: bool,
    /// Journal has records the hub did not replay
    read_only: bool,
}

impl AppContext {
    /// Open `<data_path>/journal` with default settings
    pub fn new(data_path: impl AsRef<Path>) -> Result<Self, ContextError> {
        let config = HubConfig {
            data_dir: data_path.as_ref().to_path_buf(),
            ..HubConfig::default()
        };
        Self::open(&config)
    }

    /// Open the journal and rebuild state from it
    pub fn open(config: &HubConfig) -> Result<Self, ContextError> {
        let journal_path = config.journal_dir();
        std::fs::create_dir_all(&journal_path)?;

        let store = JournalStore::new(&journal_path)?;
        let records = JournalReader::from_directory(&journal_path)?.read_all()?;

        if config.verify_chain_on_start {
            verify_chain(&records)?;
        }

        let mut hub = Hub::new();
        let read_only = !config.replay_on_start && !records.is_empty();
        if config.replay_on_start {
            replay(&mut hub, &records)?;
        } else if read_only {
            warn!(records = records.len(), "Replay disabled; state is empty and commits are refused");
        }

        let (last_sequence, last_hash) = match records.last() {
            Some(last) => (last.sequence, last.hash.clone()),
            None => (0, GENESIS_HASH.to_string()),
        };

        info!(
            path = %journal_path.display(),
            records = records.len(),
            last_sequence,
            "Journal opened"
        );

        Ok(Self {
            hub,
            store,
            journal_path,
            last_sequence,
            last_hash,
            poisoned: false,
            read_only,
        })
    }

    /// Apply `call` for `caller` and append it to the journal.
    ///
    /// Flow: Apply → Hash → Append. A rejected call is not journaled and
    /// leaves the state untouched.
    pub fn commit(
        &mut self,
        caller: Address,
        call: Call,
        correlation_id: &str,
    ) -> Result<Committed, CommitError> {
        if self.poisoned {
            return Err(CommitError::Poisoned);
        }
        if self.read_only {
            return Err(CommitError::ReadOnly);
        }

        let receipt = match self.hub.apply(caller, &call) {
            Ok(receipt) => receipt,
            Err(e) => {
                debug!(op = call.name(), %caller, error = %e, "Call rejected");
                return Err(CommitError::Rejected(e));
            }
        };

        let mut record = JournalRecord {
            sequence: self.last_sequence + 1,
            prev_hash: self.last_hash.clone(),
            hash: String::new(),
            timestamp: Utc::now(),
            correlation_id: correlation_id.to_string(),
            caller,
            call,
            events: receipt.events,
        };

        let appended = calculate_record_hash(&record).and_then(|hash| {
            record.hash = hash;
            self.store.append(&record)
        });
        if let Err(e) = appended {
            // The hub already holds the effect; only a replay can resync it.
            self.poisoned = true;
            warn!(sequence = record.sequence, error = %e, "Journal append failed");
            return Err(CommitError::Journal(e));
        }

        self.last_sequence = record.sequence;
        self.last_hash = record.hash.clone();

        debug!(
            sequence = record.sequence,
            op = record.call.name(),
            %caller,
            correlation_id,
            events = record.events.len(),
            "Call committed"
        );

        Ok(Committed {
            outcome: receipt.value,
            record,
        })
    }

    /// Re-read the journal from disk and verify its hash chain.
    /// Returns the number of records checked.
    pub fn audit(&self) -> Result<usize, ContextError> {
        let records = JournalReader::from_directory(&self.journal_path)?.read_all()?;
        verify_chain(&records)?;
        Ok(records.len())
    }

    pub fn hub(&self) -> &Hub {
        &self.hub
    }

    pub fn journal_path(&self) -> &Path {
        &self.journal_path
    }

    pub fn last_sequence(&self) -> u64 {
        self.last_sequence
    }
}

/// Re-apply every journaled call and check it emits the journaled events
fn replay(hub: &mut Hub, records: &[JournalRecord]) -> Result<(), ContextError> {
    for record in records {
        let receipt = hub
            .apply(record.caller, &record.call)
            .map_err(|source| ContextError::ReplayFailed {
                sequence: record.sequence,
                source,
            })?;
        if receipt.events != record.events {
            return Err(ContextError::ReplayDiverged {
                sequence: record.sequence,
            });
        }
    }
    debug!(records = records.len(), "Journal replayed");
    Ok(())
}

/// Errors during commit
#[derive(Debug, thiserror::Error)]
pub enum CommitError {
    #[error("{0}")]
    Rejected(#[from] HubError),

    #[error("Journal error: {0}")]
    Journal(#[from] EventError),

    #[error("Context is out of sync with its journal; reopen to replay")]
    Poisoned,

    #[error("Journal was opened without replay; commits are disabled")]
    ReadOnly,
}

/// Errors while opening or auditing the journal
#[derive(Debug, thiserror::Error)]
pub enum ContextError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Journal error: {0}")]
    Journal(#[from] EventError),

    #[error("Hash chain broken: {0}")]
    Chain(#[from] ChainError),

    #[error("Replay failed at sequence {sequence}: {source}")]
    ReplayFailed { sequence: u64, source: HubError },

    #[error("Replay diverged from journaled events at sequence {sequence}")]
    ReplayDiverged { sequence: u64 },
}
