//! threedqc Session - Orchestration between user input, a validator and the report view
//!
//! A [`Session`] owns the three resource slots, the editable schema form and the current
//! report. Loads are split into explicit `begin`/`settle` transitions so several can be in
//! flight at once; the [`Dispatcher`] drives them from a stream of [`UiEvent`]s.

pub mod dispatch;
pub mod error;
pub mod pending;
pub mod session;
pub mod validator;
pub mod view;

pub use dispatch::{Dispatcher, UiEvent};
pub use error::{ExportError, LoadError, RenderError, ValidatorError};
pub use pending::{LoadOutcome, LoadTicket, PendingLoad};
pub use session::{ExportArtifact, ExportFormat, Session, SessionEvent};
pub use validator::{ReportInput, Validator};
pub use view::{ReportRow, ReportView, SubMessage};
