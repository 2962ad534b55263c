//! Renderable projection of a report

use serde::Serialize;

use threedqc_core::{
    IssueMessage, Report, ReportItem, RowStatus, Severity, StructuralReport, STRUCTURAL_RULE_NAME,
};

/// One structural validation message, formatted for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubMessage {
    /// `None` when the validator sent a code outside the known table.
    pub severity: Option<Severity>,
    pub text: String,
}

impl SubMessage {
    pub fn from_issue(issue: &IssueMessage) -> Self {
        let severity = Severity::from_code(issue.severity);
        let label = match severity {
            Some(severity) => severity.name().to_string(),
            None => format!("Unknown({})", issue.severity),
        };
        Self {
            severity,
            text: format!("{}: {} {}", label, issue.message, issue.pointer),
        }
    }

    /// Errors and unknown severities count against the row.
    pub fn is_failure(&self) -> bool {
        matches!(self.severity, None | Some(Severity::Error))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportRow {
    pub name: String,
    pub status: RowStatus,
    pub message: String,
    pub component_message: String,
    pub guidelines_url: String,
    pub details: Vec<SubMessage>,
}

impl ReportRow {
    fn from_item(item: &ReportItem, issues: &StructuralReport) -> Self {
        let details = if item.name == STRUCTURAL_RULE_NAME {
            issues.messages.iter().map(SubMessage::from_issue).collect()
        } else {
            Vec::new()
        };
        Self {
            name: item.name.clone(),
            status: item.status(),
            message: item.message.clone(),
            component_message: item.component_message.clone(),
            guidelines_url: item.guidelines_url.clone(),
            details,
        }
    }
}

/// Rows in the validator's order. Always rebuilt whole, never patched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReportView {
    rows: Vec<ReportRow>,
}

impl ReportView {
    pub fn build(report: &Report, issues: &StructuralReport) -> Self {
        Self {
            rows: report
                .items()
                .iter()
                .map(|item| ReportRow::from_item(item, issues))
                .collect(),
        }
    }

    pub fn rows(&self) -> &[ReportRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn count(&self, status: RowStatus) -> usize {
        self.rows.iter().filter(|r| r.status == status).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(name: &str, tested: bool, pass: bool) -> ReportItem {
        ReportItem {
            name: name.to_string(),
            tested,
            pass,
            message: format!("{name} message"),
            component_message: String::new(),
            guidelines_url: "https://example.com/guidelines".to_string(),
        }
    }

    fn issue(severity: i64, message: &str, pointer: &str) -> IssueMessage {
        IssueMessage {
            code: "TEST".to_string(),
            severity,
            message: message.to_string(),
            pointer: pointer.to_string(),
        }
    }

    #[test]
    fn rows_keep_validator_order_and_classification() {
        let report = Report {
            items: vec![
                item("Triangle Count", true, true),
                item("File Size", true, false),
                item("Beveled Edges", false, false),
            ],
        };
        let view = ReportView::build(&report, &StructuralReport::default());
        let statuses: Vec<_> = view.rows().iter().map(|r| (r.name.as_str(), r.status)).collect();
        assert_eq!(
            statuses,
            [
                ("Triangle Count", RowStatus::Pass),
                ("File Size", RowStatus::Fail),
                ("Beveled Edges", RowStatus::NotTested),
            ]
        );
        assert_eq!(view.count(RowStatus::Fail), 1);
    }

    #[test]
    fn only_structural_row_gets_details() {
        let report = Report {
            items: vec![item(STRUCTURAL_RULE_NAME, true, false), item("File Size", true, true)],
        };
        let issues = StructuralReport {
            messages: vec![
                issue(0, "Accessor overflow.", "/accessors/0"),
                issue(3, "Unused object.", "/meshes/1"),
            ],
        };
        let view = ReportView::build(&report, &issues);
        let texts: Vec<_> = view.rows()[0].details.iter().map(|d| d.text.as_str()).collect();
        assert_eq!(
            texts,
            ["Error: Accessor overflow. /accessors/0", "Hint: Unused object. /meshes/1"]
        );
        assert!(view.rows()[1].details.is_empty());
    }

    #[test]
    fn unknown_severity_is_a_failure_not_a_panic() {
        let detail = SubMessage::from_issue(&issue(9, "Odd.", "/x"));
        assert_eq!(detail.severity, None);
        assert_eq!(detail.text, "Unknown(9): Odd. /x");
        assert!(detail.is_failure());

        let negative = SubMessage::from_issue(&issue(-1, "Odd.", "/x"));
        assert!(negative.is_failure());

        assert!(!SubMessage::from_issue(&issue(1, "w", "/")).is_failure());
    }
}
