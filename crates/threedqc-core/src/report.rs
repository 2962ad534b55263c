//! Validation report model as produced by a validator

use std::fmt;

use serde::{Deserialize, Serialize};

/// Name of the rule whose row carries the structural sub-report.
pub const STRUCTURAL_RULE_NAME: &str = "glTF Validator";

/// Outcome of one validation rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportItem {
    pub name: String,
    pub tested: bool,
    pub pass: bool,
    pub message: String,
    #[serde(default)]
    pub component_message: String,
    #[serde(default)]
    pub guidelines_url: String,
}

impl ReportItem {
    pub fn status(&self) -> RowStatus {
        RowStatus::classify(self.tested, self.pass)
    }
}

/// Display state of a report row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RowStatus {
    NotTested,
    Pass,
    Fail,
}

impl RowStatus {
    pub fn classify(tested: bool, pass: bool) -> Self {
        match (tested, pass) {
            (false, _) => Self::NotTested,
            (true, true) => Self::Pass,
            (true, false) => Self::Fail,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::NotTested => "NOT TESTED",
            Self::Pass => "PASS",
            Self::Fail => "FAIL",
        }
    }
}

impl fmt::Display for RowStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Severity of a structural validation message, indexed by its numeric code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Severity {
    Error = 0,
    Warning = 1,
    Info = 2,
    Hint = 3,
}

impl Severity {
    /// Ordered by code.
    pub const ALL: [Severity; 4] = [
        Severity::Error,
        Severity::Warning,
        Severity::Info,
        Severity::Hint,
    ];

    /// `None` for codes outside 0..=3.
    pub fn from_code(code: i64) -> Option<Self> {
        usize::try_from(code)
            .ok()
            .and_then(|index| Self::ALL.get(index).copied())
    }

    pub fn code(&self) -> i64 {
        *self as i64
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Error => "Error",
            Self::Warning => "Warning",
            Self::Info => "Info",
            Self::Hint => "Hint",
        }
    }
}

/// One message from the structural validator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueMessage {
    #[serde(default)]
    pub code: String,
    pub severity: i64,
    pub message: String,
    #[serde(default)]
    pub pointer: String,
}

impl IssueMessage {
    pub fn new(
        code: impl Into<String>,
        severity: Severity,
        message: impl Into<String>,
        pointer: impl Into<String>,
    ) -> Self {
        Self {
            code: code.into(),
            severity: severity.code(),
            message: message.into(),
            pointer: pointer.into(),
        }
    }
}

/// Structural validation sub-report attached to a loaded model.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StructuralReport {
    pub messages: Vec<IssueMessage>,
}

impl StructuralReport {
    pub fn push(&mut self, message: IssueMessage) {
        self.messages.push(message);
    }

    pub fn count(&self, severity: Severity) -> usize {
        self.messages
            .iter()
            .filter(|m| m.severity == severity.code())
            .count()
    }

    pub fn has_errors(&self) -> bool {
        self.count(Severity::Error) > 0
    }
}

/// A generated report, in the validator's rule order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    pub items: Vec<ReportItem>,
}

impl Report {
    pub fn items(&self) -> &[ReportItem] {
        &self.items
    }

    /// Number of rows that were tested and failed.
    pub fn failures(&self) -> usize {
        self.items
            .iter()
            .filter(|i| i.status() == RowStatus::Fail)
            .count()
    }
}
