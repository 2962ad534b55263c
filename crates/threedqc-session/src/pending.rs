use std::future::Future;
use std::pin::Pin;

use threedqc_core::{LoadedModel, ProductInfo, ResourceKind, SchemaConfig};

use crate::error::LoadError;

/// Identifies one submitted load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LoadTicket {
    pub kind: ResourceKind,
    pub generation: u64,
}

/// What a settled load produced.
#[derive(Debug)]
pub enum LoadOutcome {
    Model(Result<LoadedModel, LoadError>),
    ProductInfo(Result<ProductInfo, LoadError>),
    Schema(Result<SchemaConfig, LoadError>),
}

impl LoadOutcome {
    /// A failed outcome for `kind`.
    pub fn failed(kind: ResourceKind, err: LoadError) -> Self {
        match kind {
            ResourceKind::Model => Self::Model(Err(err)),
            ResourceKind::ProductInfo => Self::ProductInfo(Err(err)),
            ResourceKind::Schema => Self::Schema(Err(err)),
        }
    }

    pub fn kind(&self) -> ResourceKind {
        match self {
            Self::Model(_) => ResourceKind::Model,
            Self::ProductInfo(_) => ResourceKind::ProductInfo,
            Self::Schema(_) => ResourceKind::Schema,
        }
    }

    pub fn is_ok(&self) -> bool {
        match self {
            Self::Model(r) => r.is_ok(),
            Self::ProductInfo(r) => r.is_ok(),
            Self::Schema(r) => r.is_ok(),
        }
    }
}

pub type LoadFuture = Pin<Box<dyn Future<Output = LoadOutcome> + Send + 'static>>;

/// A load that has been issued but not yet settled.
///
/// The future owns everything it needs, so it can be awaited inline, spawned, or held while
/// other loads proceed. Feed the result back with `Session::settle`.
pub struct PendingLoad {
    ticket: LoadTicket,
    future: LoadFuture,
}

impl PendingLoad {
    pub(crate) fn new(ticket: LoadTicket, future: LoadFuture) -> Self {
        Self { ticket, future }
    }

    pub fn ticket(&self) -> LoadTicket {
        self.ticket
    }

    /// Wait for the load to settle.
    pub async fn run(self) -> (LoadTicket, LoadOutcome) {
        let outcome = self.future.await;
        (self.ticket, outcome)
    }

    pub fn into_parts(self) -> (LoadTicket, LoadFuture) {
        (self.ticket, self.future)
    }
}

impl std::fmt::Debug for PendingLoad {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PendingLoad")
            .field("ticket", &self.ticket)
            .finish_non_exhaustive()
    }
}
