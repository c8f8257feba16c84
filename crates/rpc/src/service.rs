//! Serialized hub service
//!
//! One tokio task owns the `AppContext`. Handles send requests through a
//! bounded mailbox and wait on a oneshot reply, so commits and reads are
//! applied strictly one at a time, in arrival order.

use crate::context::{AppContext, CommitError, Committed, ContextError};
use hub_core::{Address, ProfileId, TxId};
use hub_engine::{AccountView, Hub, HubError, ProfileView, TransactionView};
use hub_events::{Call, EventSink};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

type Query = Box<dyn FnOnce(&Hub) + Send>;

enum Command {
    Commit {
        caller: Address,
        call: Call,
        correlation_id: String,
        response: oneshot::Sender<Result<Committed, CommitError>>,
    },
    Query(Query),
    Audit {
        response: oneshot::Sender<Result<usize, ContextError>>,
    },
}

/// Owner of the context; consumed by `spawn`
pub struct HubService {
    ctx: AppContext,
    sinks: Vec<Arc<dyn EventSink>>,
    commands: mpsc::Receiver<Command>,
}

/// Cloneable front door to a running `HubService`
#[derive(Clone)]
pub struct HubHandle {
    commands: mpsc::Sender<Command>,
}

impl HubService {
    /// Start the service task. It stops once every handle is dropped.
    pub fn spawn(
        ctx: AppContext,
        sinks: Vec<Arc<dyn EventSink>>,
        capacity: usize,
    ) -> (HubHandle, JoinHandle<()>) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        let service = Self {
            ctx,
            sinks,
            commands: rx,
        };
        let task = tokio::spawn(service.run());
        (HubHandle { commands: tx }, task)
    }

    async fn run(mut self) {
        info!(sinks = self.sinks.len(), "Hub service started");
        while let Some(command) = self.commands.recv().await {
            match command {
                Command::Commit {
                    caller,
                    call,
                    correlation_id,
                    response,
                } => {
                    let result = self.ctx.commit(caller, call, &correlation_id);
                    if let Ok(committed) = &result {
                        publish(&self.sinks, committed).await;
                    }
                    if response.send(result).is_err() {
                        debug!(%correlation_id, "Caller went away before the reply");
                    }
                }
                Command::Query(query) => query(self.ctx.hub()),
                Command::Audit { response } => {
                    let _ = response.send(self.ctx.audit());
                }
            }
        }
        info!(last_sequence = self.ctx.last_sequence(), "Hub service stopped");
    }
}

/// Deliver each event to every sink, in order. Sink failures are only logged.
async fn publish(sinks: &[Arc<dyn EventSink>], committed: &Committed) {
    for event in &committed.record.events {
        for sink in sinks {
            if let Err(e) = sink.publish(event).await {
                warn!(
                    sink = sink.name(),
                    event = event.name(),
                    sequence = committed.record.sequence,
                    error = %e,
                    "Event sink failed"
                );
            }
        }
    }
}

impl HubHandle {
    /// Apply and journal `call` on behalf of `caller`
    pub async fn commit(
        &self,
        caller: Address,
        call: Call,
        correlation_id: impl Into<String>,
    ) -> Result<Committed, ServiceError> {
        let (tx, rx) = oneshot::channel();
        self.commands
            .send(Command::Commit {
                caller,
                call,
                correlation_id: correlation_id.into(),
                response: tx,
            })
            .await
            .map_err(|_| ServiceError::Closed)?;
        Ok(rx.await.map_err(|_| ServiceError::Closed)??)
    }

    /// Run a read against the current state, in mailbox order
    pub async fn query<R, F>(&self, f: F) -> Result<R, ServiceError>
    where
        R: Send + 'static,
        F: FnOnce(&Hub) -> R + Send + 'static,
    {
        let (tx, rx) = oneshot::channel();
        let query: Query = Box::new(move |hub| {
            let _ = tx.send(f(hub));
        });
        self.commands
            .send(Command::Query(query))
            .await
            .map_err(|_| ServiceError::Closed)?;
        rx.await.map_err(|_| ServiceError::Closed)
    }

    pub async fn account(&self, address: Address) -> Result<AccountView, ServiceError> {
        self.query(move |hub| hub.account(&address)).await
    }

    pub async fn profile(&self, profile_id: ProfileId) -> Result<ProfileView, ServiceError> {
        self.query(move |hub| hub.profile(&profile_id)).await
    }

    pub async fn transaction(&self, tx_id: TxId) -> Result<TransactionView, ServiceError> {
        Ok(self.query(move |hub| hub.transaction(&tx_id)).await??)
    }

    pub async fn last_uid(&self) -> Result<TxId, ServiceError> {
        self.query(|hub| hub.last_uid()).await
    }

    /// Verify the journal hash chain on disk
    pub async fn audit(&self) -> Result<usize, ServiceError> {
        let (tx, rx) = oneshot::channel();
        self.commands
            .send(Command::Audit { response: tx })
            .await
            .map_err(|_| ServiceError::Closed)?;
        Ok(rx.await.map_err(|_| ServiceError::Closed)??)
    }
}

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Commit(#[from] CommitError),

    #[error(transparent)]
    Query(#[from] HubError),

    #[error(transparent)]
    Audit(#[from] ContextError),

    #[error("Hub service is not running")]
    Closed,
}
