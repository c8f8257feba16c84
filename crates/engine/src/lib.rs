//! Hub Engine - the voting engine and the full operation surface
//!
//! `Hub` holds the whole ledger state (accounts, profiles, transactions)
//! as one explicit object. Every mutating operation validates all of its
//! preconditions before the first write, so a failed call leaves no trace.
//!
//! The engine itself is single-writer: callers that share a `Hub` across
//! threads must serialize access (see `hub-rpc`'s `HubService`).

pub mod consensus;
pub mod hub;
pub mod receipt;
pub mod view;

pub use consensus::consensus_threshold;
pub use hub::Hub;
pub use hub_ledger::HubError;
pub use receipt::{Outcome, Receipt};
pub use view::{AccountView, ProfileView, TransactionView, VoterView};
