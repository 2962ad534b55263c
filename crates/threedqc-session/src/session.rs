//! The orchestrator state for one user session

use std::sync::Arc;

use serde::Serialize;
use tokio::sync::broadcast;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use threedqc_core::form::{decode, encode};
use threedqc_core::{
    name_for, Clock, DecodeError, FileBlob, FormError, LoadState, LoadedModel, PreviewSetup,
    ProductInfo, Report, ResourceKind, ResourceSlot, SchemaConfig, SchemaForm, SystemClock,
    SCHEMA_EXPORT_NAME,
};

use crate::error::{ExportError, LoadError, RenderError};
use crate::pending::{LoadOutcome, LoadTicket, PendingLoad};
use crate::validator::{ReportInput, Validator};
use crate::view::ReportView;

const EVENT_CAPACITY: usize = 64;

/// Notifications for whatever front-end is attached.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "camelCase")]
pub enum SessionEvent {
    ResourceChanged {
        kind: ResourceKind,
        state: LoadState,
        error: Option<String>,
    },
    ReportUpdated {
        rows: usize,
        failures: usize,
    },
    ReportCleared,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExportFormat {
    Json,
    Csv,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Csv => "csv",
        }
    }
}

/// A named file ready to be written or downloaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportArtifact {
    pub filename: String,
    pub contents: String,
}

/// The report currently on display, with the model file it describes.
#[derive(Debug, Clone)]
struct CurrentReport {
    report: Report,
    view: ReportView,
    model_filename: String,
}

#[derive(Debug, Default)]
struct Slots {
    model: ResourceSlot,
    product_info: ResourceSlot,
    schema: ResourceSlot,
}

impl Slots {
    fn get(&self, kind: ResourceKind) -> &ResourceSlot {
        match kind {
            ResourceKind::Model => &self.model,
            ResourceKind::ProductInfo => &self.product_info,
            ResourceKind::Schema => &self.schema,
        }
    }

    fn get_mut(&mut self, kind: ResourceKind) -> &mut ResourceSlot {
        match kind {
            ResourceKind::Model => &mut self.model,
            ResourceKind::ProductInfo => &mut self.product_info,
            ResourceKind::Schema => &mut self.schema,
        }
    }
}

/// One user session: three resource slots, the schema editor and the current report.
///
/// All mutation happens through `&mut self`; loads suspend only inside the futures returned
/// by the `begin_*` methods, which never touch the session.
pub struct Session<V: Validator> {
    id: Uuid,
    validator: Arc<V>,
    clock: Arc<dyn Clock>,
    slots: Slots,
    form: SchemaForm,
    config: SchemaConfig,
    model: Option<LoadedModel>,
    product_info: Option<ProductInfo>,
    current: Option<CurrentReport>,
    preview: Option<PreviewSetup>,
    events: broadcast::Sender<SessionEvent>,
}

impl<V: Validator> Session<V> {
    pub fn new(validator: V) -> Self {
        Self::with_clock(validator, Arc::new(SystemClock))
    }

    pub fn with_clock(validator: V, clock: Arc<dyn Clock>) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        let id = Uuid::new_v4();
        info!(session = %id, version = validator.version(), "Session started");
        Self {
            id,
            validator: Arc::new(validator),
            clock,
            slots: Slots::default(),
            form: SchemaForm::default(),
            config: SchemaConfig::default(),
            model: None,
            product_info: None,
            current: None,
            preview: None,
            events,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn version(&self) -> &str {
        self.validator.version()
    }

    pub fn validator(&self) -> &V {
        &self.validator
    }

    /// Receive state-change notifications.
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    pub fn slot(&self, kind: ResourceKind) -> &ResourceSlot {
        self.slots.get(kind)
    }

    pub fn state(&self, kind: ResourceKind) -> LoadState {
        self.slots.get(kind).state()
    }

    pub fn form(&self) -> &SchemaForm {
        &self.form
    }

    /// The live schema used for report generation.
    pub fn schema_config(&self) -> &SchemaConfig {
        &self.config
    }

    pub fn model(&self) -> Option<&LoadedModel> {
        self.model.as_ref()
    }

    pub fn product_info(&self) -> Option<&ProductInfo> {
        self.product_info.as_ref()
    }

    pub fn report(&self) -> Option<&Report> {
        self.current.as_ref().map(|c| &c.report)
    }

    pub fn view(&self) -> Option<&ReportView> {
        self.current.as_ref().map(|c| &c.view)
    }

    pub fn preview(&self) -> Option<&PreviewSetup> {
        self.preview.as_ref()
    }

    fn emit(&self, event: SessionEvent) {
        // No subscribers is fine.
        let _ = self.events.send(event);
    }

    fn emit_slot(&self, kind: ResourceKind) {
        let slot = self.slots.get(kind);
        self.emit(SessionEvent::ResourceChanged {
            kind,
            state: slot.state(),
            error: slot.error_message().map(str::to_string),
        });
    }

    // --- Schema editor ---

    /// Edit one form field. Takes effect on the next save or model load.
    pub fn edit_field(&mut self, key: &str, value: &str) -> Result<(), FormError> {
        self.form.assign(key, value)
    }

    /// Discard unsaved edits by rebuilding the form from the live schema.
    pub fn revert_form(&mut self) {
        self.form = encode(&self.config);
    }

    /// Replace form and live schema with the validator's recommended defaults.
    pub fn use_recommended_schema(&mut self) {
        let recommended = self.validator.recommended_schema();
        self.form = encode(&recommended);
        self.config = recommended;
        self.slots.schema.mark_loaded();
        info!(version = %self.config.version, "Applied recommended schema");
        self.emit_slot(ResourceKind::Schema);
        self.maybe_regenerate();
    }

    /// Decode the form into the live schema and regenerate.
    ///
    /// On a decode error nothing changes and the offending field is reported.
    pub fn save_schema(&mut self) -> Result<(), DecodeError> {
        let config = decode(&self.form)?;
        self.config = config;
        self.slots.schema.mark_loaded();
        info!("Saved schema from form");
        self.emit_slot(ResourceKind::Schema);
        self.clear_view();
        self.maybe_regenerate();
        Ok(())
    }

    /// Serialize the current form as a schema document.
    pub fn export_schema(&self) -> Result<ExportArtifact, ExportError> {
        let config = decode(&self.form)?;
        Ok(ExportArtifact {
            filename: SCHEMA_EXPORT_NAME.to_string(),
            contents: serde_json::to_string(&config)?,
        })
    }

    fn push_form(&mut self) {
        match decode(&self.form) {
            Ok(config) => self.config = config,
            Err(err) => warn!(
                field = err.field(),
                "Schema form has unsaved invalid input, keeping previous schema: {}", err
            ),
        }
    }

    // --- Resource loads ---

    fn begin(&mut self, kind: ResourceKind) -> LoadTicket {
        let generation = self.slots.get_mut(kind).begin();
        debug!(%kind, generation, "Load started");
        self.emit_slot(kind);
        LoadTicket { kind, generation }
    }

    /// Start a model load. One file goes to the binary loader, several to the multi-file one.
    pub fn begin_model_load(&mut self, files: Vec<FileBlob>) -> PendingLoad {
        // Pick up edits the user made without saving.
        self.push_form();
        let ticket = self.begin(ResourceKind::Model);
        let validator = Arc::clone(&self.validator);
        let mut files = files;
        let future = async move {
            let result = match files.len() {
                0 => Err(LoadError::NoFiles),
                1 => validator.load_glb(files.remove(0)).await,
                _ => validator.load_gltf_files(files).await,
            };
            LoadOutcome::Model(result)
        };
        PendingLoad::new(ticket, Box::pin(future))
    }

    pub fn begin_product_info_load(&mut self, file: FileBlob) -> PendingLoad {
        let ticket = self.begin(ResourceKind::ProductInfo);
        let validator = Arc::clone(&self.validator);
        let future =
            async move { LoadOutcome::ProductInfo(validator.load_product_info(file).await) };
        PendingLoad::new(ticket, Box::pin(future))
    }

    pub fn begin_schema_load(&mut self, file: FileBlob) -> PendingLoad {
        let ticket = self.begin(ResourceKind::Schema);
        let validator = Arc::clone(&self.validator);
        let future = async move { LoadOutcome::Schema(validator.load_schema_file(file).await) };
        PendingLoad::new(ticket, Box::pin(future))
    }

    /// Apply a settled load. Never fails; errors become a `Failed` slot.
    pub fn settle(&mut self, ticket: LoadTicket, outcome: LoadOutcome) {
        let kind = outcome.kind();
        if kind != ticket.kind {
            warn!(
                ticket = %ticket.kind,
                outcome = %kind,
                "Outcome does not match its ticket, ignoring"
            );
            return;
        }

        let slot_outcome = match outcome {
            LoadOutcome::Model(Ok(model)) => {
                info!(file = %model.filename, "Model loaded");
                self.preview = PreviewSetup::for_model(&model);
                self.model = Some(model);
                Ok(())
            }
            LoadOutcome::Model(Err(err)) => {
                self.model = None;
                self.preview = None;
                Err(err)
            }
            LoadOutcome::ProductInfo(Ok(info)) => {
                info!("Product info loaded");
                self.product_info = Some(info);
                Ok(())
            }
            LoadOutcome::ProductInfo(Err(err)) => {
                self.product_info = None;
                Err(err)
            }
            LoadOutcome::Schema(Ok(config)) => {
                info!(version = %config.version, "Schema loaded");
                // A loaded file replaces any unsaved edits.
                self.form = encode(&config);
                self.config = config;
                self.clear_view();
                Ok(())
            }
            // The previous schema, form and report stay as they were.
            LoadOutcome::Schema(Err(err)) => Err(err),
        };

        let slot_outcome = slot_outcome.map_err(|err| {
            warn!(%kind, "Load failed: {}", err);
            err.to_string()
        });
        let latest = self.slots.get_mut(kind).settle(ticket.generation, slot_outcome);
        if !latest {
            debug!(%kind, generation = ticket.generation, "Settled a superseded load");
        }
        self.emit_slot(kind);
        self.maybe_regenerate();
    }

    /// Load a model and wait for it to settle.
    pub async fn load_model(&mut self, files: Vec<FileBlob>) -> LoadState {
        let (ticket, outcome) = self.begin_model_load(files).run().await;
        self.settle(ticket, outcome);
        self.state(ResourceKind::Model)
    }

    pub async fn load_product_info(&mut self, file: FileBlob) -> LoadState {
        let (ticket, outcome) = self.begin_product_info_load(file).run().await;
        self.settle(ticket, outcome);
        self.state(ResourceKind::ProductInfo)
    }

    pub async fn load_schema(&mut self, file: FileBlob) -> LoadState {
        let (ticket, outcome) = self.begin_schema_load(file).run().await;
        self.settle(ticket, outcome);
        self.state(ResourceKind::Schema)
    }

    // --- Report pipeline ---

    fn clear_view(&mut self) {
        if self.current.take().is_some() {
            self.emit(SessionEvent::ReportCleared);
        }
    }

    /// Regenerate the report if model and schema are both loaded.
    ///
    /// Returns whether a new view was built. A generation failure is logged and leaves the
    /// previous view in place.
    pub fn maybe_regenerate(&mut self) -> bool {
        if !self.slots.model.is_loaded() || !self.slots.schema.is_loaded() {
            return false;
        }
        match self.regenerate() {
            Ok(()) => true,
            Err(err) => {
                error!("{}", err);
                false
            }
        }
    }

    fn regenerate(&mut self) -> Result<(), RenderError> {
        let Some(model) = self.model.as_ref() else {
            return Ok(());
        };
        let product_info = if self.slots.product_info.is_loaded() {
            self.product_info.as_ref()
        } else {
            None
        };
        let report = self.validator.generate_report(ReportInput {
            model,
            schema: &self.config,
            product_info,
        })?;
        let view = ReportView::build(&report, &model.issues);
        let failures = report.failures();
        info!(rows = view.len(), failures, "Report generated");
        self.emit(SessionEvent::ReportUpdated {
            rows: view.len(),
            failures,
        });
        self.current = Some(CurrentReport {
            report,
            view,
            model_filename: model.filename.clone(),
        });
        Ok(())
    }

    // --- Export ---

    pub fn to_json(&self) -> Result<String, ExportError> {
        let current = self.current.as_ref().ok_or(ExportError::NoReport)?;
        Ok(self.validator.report_json(&current.report)?)
    }

    pub fn to_csv(&self) -> Result<String, ExportError> {
        let current = self.current.as_ref().ok_or(ExportError::NoReport)?;
        Ok(self.validator.report_csv(&current.report)?)
    }

    /// Serialize the current report under a timestamped name derived from the model file.
    pub fn export(&self, format: ExportFormat) -> Result<ExportArtifact, ExportError> {
        let current = self.current.as_ref().ok_or(ExportError::NoReport)?;
        let contents = match format {
            ExportFormat::Json => self.to_json()?,
            ExportFormat::Csv => self.to_csv()?,
        };
        Ok(ExportArtifact {
            filename: name_for(&current.model_filename, format.extension(), self.clock.now()),
            contents,
        })
    }
}
