//! Hub Ledger - the three owning stores
//!
//! All custodial state lives here. Stores reference each other only by id
//! (`Address`, `ProfileId`, `TxId`); nothing holds a pointer into another
//! store, so removing a profile can never leave a dangling reference.
//!
//! # Key Types
//! - `AccountLedger`: balances and each owner's profile list
//! - `ProfileStore`: profile records and their requester/voter sets
//! - `TransactionLedger`: transaction records and the per-address index
//! - `HubError`: the error taxonomy shared by every operation

pub mod account;
pub mod error;
pub mod profile;
pub mod transaction;

pub use account::{Account, AccountLedger};
pub use error::HubError;
pub use profile::{Profile, ProfileStore};
pub use transaction::{NewTransaction, Transaction, TransactionLedger, VotePlan};
