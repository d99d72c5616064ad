use super::{DashboardRecord, TestSummary};
use crate::badge::StatusBadge;
use chrono::{DateTime, Utc};
use std::fmt::Write;
use store::{InternalTestingCase, RecordId};

const CSV_HEADERS: &[&str] = &[
    "ID",
    "Test Name",
    "Total Sections",
    "Passed",
    "Failed",
    "Not Tested",
    "Created At",
];

/// `Jan 1, 2024, 09:05` in UTC.
pub fn format_date_time(at: DateTime<Utc>) -> String {
    at.format("%b %-d, %Y, %H:%M").to_string()
}

impl DashboardRecord for InternalTestingCase {
    const EXPORT_PREFIX: &'static str = "internal-testing-reports";

    fn record_id(&self) -> Option<&RecordId> {
        self.id.as_ref()
    }

    fn matches(&self, needle: &str) -> bool {
        self.test_name.to_lowercase().contains(needle)
    }

    fn summary(&self) -> TestSummary {
        TestSummary::from_statuses(self.sections.values().map(|section| &section.status))
    }

    fn stats_date(&self) -> Option<DateTime<Utc>> {
        self.created_at
    }

    fn csv_headers() -> &'static [&'static str] {
        CSV_HEADERS
    }

    fn csv_row(&self) -> Vec<String> {
        let summary = self.summary();
        vec![
            self.id.as_ref().map(ToString::to_string).unwrap_or_default(),
            self.test_name.clone(),
            summary.total.to_string(),
            summary.passed.to_string(),
            summary.failed.to_string(),
            summary.not_tested.to_string(),
            self.created_at
                .map(|at| at.to_rfc3339())
                .unwrap_or_default(),
        ]
    }

    fn list_row(&self) -> String {
        let summary = self.summary();
        format!(
            "{:<38} {:<32} {:<20} {:>2} pass {:>2} fail {:>2} n/t{}",
            self.id.as_ref().map(|id| id.0.as_str()).unwrap_or("-"),
            self.test_name,
            self.created_at
                .map(format_date_time)
                .unwrap_or_else(|| "N/A".to_string()),
            summary.passed,
            summary.failed,
            summary.not_tested,
            summary.other_suffix()
        )
    }

    fn render_detail(&self) -> String {
        let mut out = String::new();

        let _ = writeln!(out, "Basic Information");
        let _ = writeln!(out, "  Test Name: {}", self.test_name);
        let _ = writeln!(
            out,
            "  Created At: {}",
            self.created_at
                .map(format_date_time)
                .unwrap_or_else(|| "N/A".to_string())
        );
        let _ = writeln!(out, "  Total Sections: {}", self.sections.len());

        for (section, record) in &self.sections {
            let _ = writeln!(
                out,
                "\n{:<32} {}",
                section.title(),
                StatusBadge::from(&record.status)
            );
            if !record.text_feedback.is_empty() {
                let _ = writeln!(out, "  Text Feedback: {}", record.text_feedback);
            }
            if let Some(url) = &record.image_url {
                let _ = writeln!(out, "  Screenshot: {}", url);
            }
            if !record.feedback.is_empty() {
                let _ = writeln!(out, "  Additional Notes: {}", record.feedback);
            }
        }

        out
    }
}
