//! Hub RPC - journal-backed context, serialized service and CLI
//!
//! `AppContext` replays the call journal into a `Hub` and journals every
//! successful call. `HubService` puts one context behind a tokio mailbox
//! so concurrent callers are applied one at a time.

pub mod commands;
pub mod config;
pub mod context;
pub mod service;

pub use config::{ConfigError, HubConfig};
pub use context::{AppContext, CommitError, Committed, ContextError};
pub use service::{HubHandle, HubService, ServiceError};
