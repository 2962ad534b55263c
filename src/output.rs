//! Console rendering of a finished check

use std::fmt::Write;

use serde::Serialize;

use threedqc_core::{Indicator, LoadState, ResourceKind, RowStatus};
use threedqc_session::{ReportRow, Session, Validator};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceStatus {
    pub kind: ResourceKind,
    pub state: LoadState,
    pub error: Option<String>,
}

/// Everything printed after a check.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    pub validator: String,
    pub model: Option<String>,
    pub resources: Vec<ResourceStatus>,
    pub rows: Vec<ReportRow>,
    pub failures: usize,
}

impl Summary {
    pub fn from_session<V: Validator>(session: &Session<V>) -> Self {
        let resources = ResourceKind::ALL
            .into_iter()
            .map(|kind| {
                let slot = session.slot(kind);
                ResourceStatus {
                    kind,
                    state: slot.state(),
                    error: slot.error_message().map(str::to_string),
                }
            })
            .collect();
        let rows = session
            .view()
            .map(|view| view.rows().to_vec())
            .unwrap_or_default();
        Self {
            validator: session.version().to_string(),
            model: session.model().map(|m| m.filename.clone()),
            resources,
            failures: rows.iter().filter(|r| r.status == RowStatus::Fail).count(),
            rows,
        }
    }

    /// A report exists, no rule failed and no input failed to load.
    pub fn passed(&self) -> bool {
        !self.rows.is_empty()
            && self.failures == 0
            && self
                .resources
                .iter()
                .all(|r| r.state != LoadState::Failed)
    }

    pub fn render_table(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "Validator: {}", self.validator);
        for resource in &self.resources {
            let mark = match resource.state.indicator() {
                Some(Indicator::Pass) => "ok",
                Some(Indicator::Fail) => "!!",
                None => "--",
            };
            let _ = write!(
                out,
                "  [{}] {:<13}{}",
                mark,
                resource.kind.name(),
                state_name(resource.state)
            );
            if let Some(error) = &resource.error {
                let _ = write!(out, ": {}", error);
            }
            out.push('\n');
        }

        if self.rows.is_empty() {
            out.push_str("\nNo report generated.\n");
            return out;
        }
        out.push('\n');
        for row in &self.rows {
            let _ = writeln!(out, "{:<11}{:<36} {}", row.status.label(), row.name, row.message);
            for detail in &row.details {
                let marker = if detail.is_failure() { '!' } else { '-' };
                let _ = writeln!(out, "{:<11}{} {}", "", marker, detail.text);
            }
        }
        let _ = writeln!(out, "\n{} of {} rules failed", self.failures, self.rows.len());
        out
    }
}

fn state_name(state: LoadState) -> &'static str {
    match state {
        LoadState::Empty => "not supplied",
        LoadState::Loading => "loading",
        LoadState::Loaded => "loaded",
        LoadState::Failed => "failed",
    }
}

#[cfg(test)]
mod tests {
    use threedqc_core::Severity;
    use threedqc_session::SubMessage;

    use super::*;

    fn summary(rows: Vec<ReportRow>) -> Summary {
        Summary {
            validator: "test 1.0".to_string(),
            model: Some("chair.glb".to_string()),
            resources: vec![
                ResourceStatus {
                    kind: ResourceKind::Model,
                    state: LoadState::Loaded,
                    error: None,
                },
                ResourceStatus {
                    kind: ResourceKind::ProductInfo,
                    state: LoadState::Failed,
                    error: Some("bad json".to_string()),
                },
            ],
            failures: rows.iter().filter(|r| r.status == RowStatus::Fail).count(),
            rows,
        }
    }

    fn row(name: &str, status: RowStatus) -> ReportRow {
        ReportRow {
            name: name.to_string(),
            status,
            message: "msg".to_string(),
            component_message: String::new(),
            guidelines_url: String::new(),
            details: vec![SubMessage {
                severity: None,
                text: "Unknown(7): odd /x".to_string(),
            }],
        }
    }

    #[test]
    fn table_lists_resources_and_rows() {
        let table = summary(vec![row("File Size", RowStatus::Fail)]).render_table();
        assert!(table.contains("[!!] product info"));
        assert!(table.contains("failed: bad json"));
        assert!(table.contains("FAIL       File Size"));
        assert!(table.contains("! Unknown(7): odd /x"));
        assert!(table.ends_with("1 of 1 rules failed\n"));
    }

    #[test]
    fn warning_details_are_not_marked_as_failures() {
        let mut warned = row("Texture Size", RowStatus::Pass);
        warned.details = vec![SubMessage {
            severity: Some(Severity::Warning),
            text: "Warning: soft /images/0".to_string(),
        }];
        let table = summary(vec![warned]).render_table();
        assert!(table.contains("- Warning: soft /images/0"));
        assert!(!table.contains("! Warning"));
    }

    #[test]
    fn failed_input_fails_the_check() {
        assert!(!summary(vec![row("File Size", RowStatus::Pass)]).passed());
        assert!(!summary(Vec::new()).passed());
    }
}
