//! Hub Events - what the ledger tells the outside world, and what it remembers
//!
//! - `HubEvent`: `TransactionRequest`, `TransactionVote`, `TransactionResponse`
//! - `EventSink`: async receiver of committed events (`MemorySink`, `LogSink`)
//! - `Call`: a serializable mutating call, the unit of the journal
//! - `JournalStore` / `JournalReader`: append-only, hash-chained JSONL journal.
//!   The journal is the source of truth; in-memory state is rebuilt from it.

pub mod call;
pub mod error;
pub mod event;
pub mod hash;
pub mod reader;
pub mod record;
pub mod sink;
pub mod store;

pub use call::Call;
pub use error::EventError;
pub use event::HubEvent;
pub use hash::{calculate_record_hash, verify_chain, ChainError, GENESIS_HASH};
pub use reader::JournalReader;
pub use record::JournalRecord;
pub use sink::{EventSink, LogSink, MemorySink};
pub use store::JournalStore;
