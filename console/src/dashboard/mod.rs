//! Read-only views over stored submissions: list, search, stats, detail and CSV export.

pub mod internal;
pub mod qa;

use chrono::{DateTime, Duration, NaiveDate, Utc};
use std::path::{Path, PathBuf};
use crate::error::ConsoleResult;
use store::{select_records, RecordId, RecordStore, StoreResult, Table, TestStatus};
use tracing::{debug, error, info};

pub use internal::format_date_time;
pub use qa::{display_key, format_date};

pub const LOAD_ERROR_MESSAGE: &str = "Failed to load reports";

/// Pass/fail counts over every tested item of one record.
///
/// `other` counts stored statuses outside the three known values, so
/// `passed + failed + not_tested + other == total`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TestSummary {
    pub passed: usize,
    pub failed: usize,
    pub not_tested: usize,
    pub other: usize,
    pub total: usize,
}

impl TestSummary {
    pub fn from_statuses<'a, I>(statuses: I) -> Self
    where
        I: IntoIterator<Item = &'a TestStatus>,
    {
        statuses
            .into_iter()
            .fold(Self::default(), |mut summary, status| {
                match status {
                    TestStatus::Pass => summary.passed += 1,
                    TestStatus::Fail => summary.failed += 1,
                    TestStatus::NotTested => summary.not_tested += 1,
                    TestStatus::Other(_) => summary.other += 1,
                }
                summary.total += 1;
                summary
            })
    }

    /// `" 2 other"` when any unknown statuses were counted, else empty.
    pub(crate) fn other_suffix(&self) -> String {
        if self.other == 0 {
            String::new()
        } else {
            format!(" {:>2} other", self.other)
        }
    }
}

/// A stored record kind the dashboard can list.
pub trait DashboardRecord: Table + Clone {
    /// File name prefix for CSV exports.
    const EXPORT_PREFIX: &'static str;

    fn record_id(&self) -> Option<&RecordId>;

    /// Case-insensitive match; `needle` is already lowercased and non-empty.
    fn matches(&self, needle: &str) -> bool;

    fn summary(&self) -> TestSummary;

    /// Date the "this week" and "this month" cards count by.
    fn stats_date(&self) -> Option<DateTime<Utc>>;

    fn csv_headers() -> &'static [&'static str];

    fn csv_row(&self) -> Vec<String>;

    /// One line for the list table.
    fn list_row(&self) -> String;

    fn render_detail(&self) -> String;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadState {
    Loading,
    Ready,
    Failed(String),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DashboardStats {
    pub total: usize,
    pub filtered: usize,
    pub this_week: usize,
    pub this_month: usize,
}

/// A CSV file ready to be written out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvExport {
    pub file_name: String,
    pub content: String,
}

impl CsvExport {
    pub fn write_to(&self, dir: &Path) -> std::io::Result<PathBuf> {
        let path = dir.join(&self.file_name);
        std::fs::write(&path, &self.content)?;
        info!("Exported {} bytes to {}", self.content.len(), path.display());
        Ok(path)
    }
}

#[derive(Debug, Clone)]
pub struct Dashboard<R> {
    records: Vec<R>,
    visible: Vec<usize>,
    search: String,
    state: LoadState,
}

impl<R: DashboardRecord> Default for Dashboard<R> {
    fn default() -> Self {
        Self {
            records: Vec::new(),
            visible: Vec::new(),
            search: String::new(),
            state: LoadState::Loading,
        }
    }
}

impl<R: DashboardRecord> Dashboard<R> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Dashboard over records already in memory.
    pub fn from_records(records: Vec<R>) -> Self {
        let mut dashboard = Self::new();
        dashboard.replace(records);
        dashboard
    }

    /// Fetch every row, newest first. A failed fetch leaves the dashboard empty.
    pub async fn refresh<S>(&mut self, store: &S) -> StoreResult<()>
    where
        S: RecordStore + ?Sized,
    {
        self.state = LoadState::Loading;
        match select_records::<R, S>(store).await {
            Ok(records) => {
                debug!("Loaded {} rows from {}", records.len(), R::NAME);
                self.replace(records);
                Ok(())
            }
            Err(e) => {
                error!("Error fetching reports: {}", e);
                self.records.clear();
                self.visible.clear();
                self.state = LoadState::Failed(LOAD_ERROR_MESSAGE.to_string());
                Err(e)
            }
        }
    }

    fn replace(&mut self, records: Vec<R>) {
        self.records = records;
        self.state = LoadState::Ready;
        self.apply_filter();
    }

    pub fn state(&self) -> &LoadState {
        &self.state
    }

    pub fn error(&self) -> Option<&str> {
        match &self.state {
            LoadState::Failed(message) => Some(message),
            _ => None,
        }
    }

    pub fn search(&self) -> &str {
        &self.search
    }

    /// Filter the loaded records. Never fetches.
    pub fn set_search(&mut self, term: impl Into<String>) {
        self.search = term.into();
        self.apply_filter();
    }

    fn apply_filter(&mut self) {
        let needle = self.search.to_lowercase();
        self.visible = self
            .records
            .iter()
            .enumerate()
            .filter(|(_, record)| needle.is_empty() || record.matches(&needle))
            .map(|(index, _)| index)
            .collect();
    }

    pub fn records(&self) -> &[R] {
        &self.records
    }

    pub fn filtered(&self) -> impl Iterator<Item = &R> + '_ {
        self.visible.iter().map(move |&index| &self.records[index])
    }

    pub fn filtered_len(&self) -> usize {
        self.visible.len()
    }

    pub fn find(&self, id: &str) -> Option<&R> {
        self.records
            .iter()
            .find(|record| record.record_id().is_some_and(|rid| rid.0 == id))
    }

    pub fn stats(&self, now: DateTime<Utc>) -> DashboardStats {
        let week_ago = now - Duration::days(7);
        let month_ago = now - Duration::days(30);
        let since = |cutoff: DateTime<Utc>| {
            self.records
                .iter()
                .filter_map(|record| record.stats_date())
                .filter(|date| *date >= cutoff)
                .count()
        };

        DashboardStats {
            total: self.records.len(),
            filtered: self.visible.len(),
            this_week: since(week_ago),
            this_month: since(month_ago),
        }
    }

    /// Header plus one row per record in the current filtered view.
    pub fn export_csv(&self, today: NaiveDate) -> ConsoleResult<CsvExport> {
        let mut writer = csv::WriterBuilder::new()
            .terminator(csv::Terminator::Any(b'\n'))
            .from_writer(Vec::new());
        writer.write_record(R::csv_headers())?;
        for record in self.filtered() {
            writer.write_record(record.csv_row())?;
        }
        let bytes = writer.into_inner().map_err(|e| e.into_error())?;

        Ok(CsvExport {
            file_name: format!("{}-{}.csv", R::EXPORT_PREFIX, today.format("%Y-%m-%d")),
            content: String::from_utf8(bytes)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_counts() {
        let summary = TestSummary::from_statuses(&[
            TestStatus::Pass,
            TestStatus::Fail,
            TestStatus::NotTested,
            TestStatus::Pass,
        ]);
        assert_eq!(summary.passed, 2);
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.not_tested, 1);
        assert_eq!(summary.other, 0);
        assert_eq!(summary.total, 4);
        assert_eq!(summary.other_suffix(), "");
    }

    #[test]
    fn test_summary_counts_unknown_statuses() {
        let summary = TestSummary::from_statuses(&[
            TestStatus::Pass,
            TestStatus::Other("blocked".to_string()),
        ]);
        assert_eq!(summary.other, 1);
        assert_eq!(summary.total, 2);
        assert_eq!(
            summary.passed + summary.failed + summary.not_tested + summary.other,
            summary.total
        );
        assert_eq!(summary.other_suffix(), "  1 other");
    }

    #[test]
    fn test_empty_summary() {
        assert_eq!(
            TestSummary::from_statuses(std::iter::empty()),
            TestSummary::default()
        );
    }
}
