//! Hub Core - Domain types
//!
//! This crate contains the fundamental types used across Hub:
//! - `Address`: 20-byte participant identifier
//! - `Amount`: unsigned balance in base units
//! - `ProfileId`, `TxId`, `Title`: record handles and the fixed-width profile title
//! - `Role`, `VoteStatus`, `TxStatus`: wire-coded enums
//! - `IndexedSet`: dense array + reverse map with O(1) swap-remove

pub mod address;
pub mod amount;
pub mod indexed;
pub mod types;

pub use address::{Address, AddressError};
pub use amount::Amount;
pub use indexed::IndexedSet;
pub use types::{CodeError, ProfileId, Role, Title, TxId, TxStatus, VoteStatus, TITLE_LEN};
