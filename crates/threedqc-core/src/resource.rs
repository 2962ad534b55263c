//! Load state for the independently submitted inputs

use std::fmt;

use serde::{Deserialize, Serialize};

/// The three inputs a session tracks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ResourceKind {
    Model,
    ProductInfo,
    Schema,
}

impl ResourceKind {
    pub const ALL: [ResourceKind; 3] = [
        ResourceKind::Model,
        ResourceKind::ProductInfo,
        ResourceKind::Schema,
    ];

    /// Human-readable name
    pub fn name(&self) -> &'static str {
        match self {
            Self::Model => "model",
            Self::ProductInfo => "product info",
            Self::Schema => "schema",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Where a resource is in its load lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LoadState {
    /// Nothing submitted yet
    #[default]
    Empty,
    /// A load has been issued and has not settled
    Loading,
    /// The last settled load succeeded
    Loaded,
    /// The last settled load failed
    Failed,
}

/// What a per-resource status badge should show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Indicator {
    Pass,
    Fail,
}

impl LoadState {
    pub fn is_loaded(&self) -> bool {
        matches!(self, Self::Loaded)
    }

    pub fn indicator(&self) -> Option<Indicator> {
        match self {
            Self::Loaded => Some(Indicator::Pass),
            Self::Failed => Some(Indicator::Fail),
            Self::Empty | Self::Loading => None,
        }
    }
}

/// Load-state holder for one resource.
///
/// `generation` counts submissions. A settle records the generation it belongs to, so callers
/// can tell whether the state on display came from the most recent submission.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceSlot {
    state: LoadState,
    error_message: Option<String>,
    generation: u64,
    settled_generation: u64,
}

impl ResourceSlot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> LoadState {
        self.state
    }

    pub fn error_message(&self) -> Option<&str> {
        self.error_message.as_deref()
    }

    pub fn is_loaded(&self) -> bool {
        self.state.is_loaded()
    }

    /// Generation of the most recent submission.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Generation of the load whose outcome is currently shown.
    pub fn settled_generation(&self) -> u64 {
        self.settled_generation
    }

    /// Enter `Loading` for a new submission and return its generation.
    pub fn begin(&mut self) -> u64 {
        self.generation += 1;
        self.state = LoadState::Loading;
        self.error_message = None;
        self.generation
    }

    /// Record the outcome of the load issued as `generation`.
    ///
    /// The last settle always wins. Returns `false` when a newer submission exists.
    pub fn settle(&mut self, generation: u64, outcome: Result<(), String>) -> bool {
        match outcome {
            Ok(()) => {
                self.state = LoadState::Loaded;
                self.error_message = None;
            }
            Err(message) => {
                self.state = LoadState::Failed;
                self.error_message = Some(message);
            }
        }
        self.settled_generation = generation;
        generation == self.generation
    }

    /// Mark loaded without a file submission (recommended defaults, saved form).
    pub fn mark_loaded(&mut self) {
        self.generation += 1;
        self.settle(self.generation, Ok(()));
    }
}
