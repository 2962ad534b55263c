//! Event loop that turns UI events into session transitions

use std::collections::HashMap;

use tokio::sync::{mpsc, oneshot};
use tokio::task::{self, JoinError, JoinSet};
use tracing::{debug, warn};

use threedqc_core::FileBlob;

use crate::error::{ExportError, LoadError};
use crate::pending::{LoadOutcome, LoadTicket, PendingLoad};
use crate::session::{ExportArtifact, ExportFormat, Session};
use crate::validator::Validator;

/// Input from the front-end.
#[derive(Debug)]
pub enum UiEvent {
    ModelFiles(Vec<FileBlob>),
    ProductInfoFile(FileBlob),
    SchemaFile(FileBlob),
    EditField { key: String, value: String },
    SaveSchema,
    UseRecommendedSchema,
    Export {
        format: ExportFormat,
        reply: oneshot::Sender<Result<ExportArtifact, ExportError>>,
    },
}

/// Owns a session and keeps any number of loads in flight.
///
/// Loads run as tasks on the current runtime; their outcomes are applied one at a time on the
/// dispatcher's own task, so the session is never touched concurrently. A load task that
/// panics is settled as a failure of its resource.
pub struct Dispatcher<V: Validator> {
    session: Session<V>,
    in_flight: JoinSet<(LoadTicket, LoadOutcome)>,
    tickets: HashMap<task::Id, LoadTicket>,
}

impl<V: Validator> Dispatcher<V> {
    pub fn new(session: Session<V>) -> Self {
        Self {
            session,
            in_flight: JoinSet::new(),
            tickets: HashMap::new(),
        }
    }

    pub fn session(&self) -> &Session<V> {
        &self.session
    }

    /// Number of loads that have not settled.
    pub fn in_flight(&self) -> usize {
        self.in_flight.len()
    }

    pub fn into_session(self) -> Session<V> {
        self.session
    }

    /// Apply one event. Loads are started here and settle later in [`Dispatcher::run`].
    pub fn handle(&mut self, event: UiEvent) {
        match event {
            UiEvent::ModelFiles(files) => {
                let pending = self.session.begin_model_load(files);
                self.spawn(pending);
            }
            UiEvent::ProductInfoFile(file) => {
                let pending = self.session.begin_product_info_load(file);
                self.spawn(pending);
            }
            UiEvent::SchemaFile(file) => {
                let pending = self.session.begin_schema_load(file);
                self.spawn(pending);
            }
            UiEvent::EditField { key, value } => {
                if let Err(err) = self.session.edit_field(&key, &value) {
                    warn!("Rejected schema edit: {}", err);
                }
            }
            UiEvent::SaveSchema => {
                if let Err(err) = self.session.save_schema() {
                    warn!(field = err.field(), "Schema not saved: {}", err);
                }
            }
            UiEvent::UseRecommendedSchema => self.session.use_recommended_schema(),
            UiEvent::Export { format, reply } => {
                let _ = reply.send(self.session.export(format));
            }
        }
    }

    fn spawn(&mut self, pending: PendingLoad) {
        let (ticket, future) = pending.into_parts();
        let handle = self.in_flight.spawn(async move { (ticket, future.await) });
        self.tickets.insert(handle.id(), ticket);
    }

    fn on_settled(&mut self, joined: Result<(task::Id, (LoadTicket, LoadOutcome)), JoinError>) {
        match joined {
            Ok((id, (ticket, outcome))) => {
                self.tickets.remove(&id);
                debug!(kind = %ticket.kind, ok = outcome.is_ok(), "Load settled");
                self.session.settle(ticket, outcome);
            }
            Err(err) => match self.tickets.remove(&err.id()) {
                Some(ticket) => {
                    let outcome =
                        LoadOutcome::failed(ticket.kind, LoadError::Aborted(err.to_string()));
                    self.session.settle(ticket, outcome);
                }
                None => warn!("Unknown load task ended: {}", err),
            },
        }
    }

    /// Wait for every in-flight load to settle.
    pub async fn drain(&mut self) {
        while let Some(joined) = self.in_flight.join_next_with_id().await {
            self.on_settled(joined);
        }
    }

    /// Process events until the sender side closes and every load has settled.
    pub async fn run(mut self, mut events: mpsc::Receiver<UiEvent>) -> Session<V> {
        let mut open = true;
        loop {
            tokio::select! {
                event = events.recv(), if open => match event {
                    Some(event) => self.handle(event),
                    None => {
                        debug!("Event stream closed");
                        open = false;
                    }
                },
                Some(joined) = self.in_flight.join_next_with_id(),
                    if !self.in_flight.is_empty() =>
                {
                    self.on_settled(joined);
                }
                else => break,
            }
        }
        self.session
    }
}
