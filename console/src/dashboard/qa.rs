use super::{DashboardRecord, TestSummary};
use crate::badge::StatusBadge;
use chrono::{DateTime, NaiveDate, Utc};
use std::fmt::Write;
use store::{QaTestReport, RecordId, TestResult};

const CSV_HEADERS: &[&str] = &[
    "ID",
    "Tester Name",
    "Test Date",
    "App Version",
    "Environment",
    "Auth Tests",
    "Main Section Tests",
    "Side Mission Tests",
    "Food Print",
    "Leaderboard",
    "Toko",
    "Komunitas",
    "Hasil User",
    "Sertifikat",
    "User Profile",
    "Created At",
];

/// `Jan 1, 2024`
pub fn format_date(date: NaiveDate) -> String {
    date.format("%b %-d, %Y").to_string()
}

/// Turn a camelCase key into a label: `forgotPassword` becomes `Forgot Password`.
pub fn display_key(key: &str) -> String {
    let mut spaced = String::with_capacity(key.len() + 4);
    for c in key.chars() {
        if c.is_ascii_uppercase() {
            spaced.push(' ');
        }
        spaced.push(c);
    }

    spaced
        .split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn json_cell<T: serde::Serialize>(value: &T) -> String {
    serde_json::to_string(value).unwrap_or_default()
}

fn write_result(out: &mut String, label: &str, result: &TestResult) {
    let _ = write!(out, "  {:<22} {:<8}", label, StatusBadge::from(&result.status));
    if !result.notes.is_empty() {
        let _ = write!(out, " {}", result.notes);
    }
    out.push('\n');
}

fn write_group<'a, I>(out: &mut String, title: &str, results: I)
where
    I: IntoIterator<Item = (&'a str, &'a TestResult)>,
{
    let _ = writeln!(out, "{}", title);
    for (key, result) in results {
        write_result(out, &display_key(key), result);
    }
    out.push('\n');
}

fn midnight_utc(date: NaiveDate) -> Option<DateTime<Utc>> {
    date.and_hms_opt(0, 0, 0).map(|dt| dt.and_utc())
}

impl DashboardRecord for QaTestReport {
    const EXPORT_PREFIX: &'static str = "qa-reports";

    fn record_id(&self) -> Option<&RecordId> {
        self.id.as_ref()
    }

    fn matches(&self, needle: &str) -> bool {
        self.tester_name.to_lowercase().contains(needle)
            || self.application_version.to_lowercase().contains(needle)
            || self
                .test_environment
                .as_deref()
                .is_some_and(|env| env.to_lowercase().contains(needle))
    }

    fn summary(&self) -> TestSummary {
        TestSummary::from_statuses(self.results().map(|(_, result)| &result.status))
    }

    fn stats_date(&self) -> Option<DateTime<Utc>> {
        midnight_utc(self.test_date)
    }

    fn csv_headers() -> &'static [&'static str] {
        CSV_HEADERS
    }

    fn csv_row(&self) -> Vec<String> {
        vec![
            self.id.as_ref().map(ToString::to_string).unwrap_or_default(),
            self.tester_name.clone(),
            self.test_date.format("%Y-%m-%d").to_string(),
            self.application_version.clone(),
            self.test_environment.clone().unwrap_or_default(),
            json_cell(&self.auth_tests),
            json_cell(&self.main_section_tests),
            json_cell(&self.side_mission_tests),
            json_cell(&self.food_print_tests),
            json_cell(&self.leaderboard),
            json_cell(&self.toko),
            json_cell(&self.komunitas),
            json_cell(&self.hasil_user),
            json_cell(&self.sertifikat),
            json_cell(&self.user_profile),
            self.created_at
                .map(|at| at.to_rfc3339())
                .unwrap_or_default(),
        ]
    }

    fn list_row(&self) -> String {
        let summary = self.summary();
        format!(
            "{:<38} {:<20} {:<13} {:<10} {:>2} pass {:>2} fail {:>2} n/t{}",
            self.id.as_ref().map(|id| id.0.as_str()).unwrap_or("-"),
            self.tester_name,
            format_date(self.test_date),
            self.application_version,
            summary.passed,
            summary.failed,
            summary.not_tested,
            summary.other_suffix()
        )
    }

    fn render_detail(&self) -> String {
        let mut out = String::new();

        let _ = writeln!(out, "Basic Information");
        let _ = writeln!(out, "  Tester Name: {}", self.tester_name);
        let _ = writeln!(out, "  Test Date: {}", format_date(self.test_date));
        let _ = writeln!(out, "  App Version: {}", self.application_version);
        if let Some(env) = &self.test_environment {
            let _ = writeln!(out, "  Environment: {}", env);
        }
        out.push('\n');

        let auth = &self.auth_tests;
        write_group(
            &mut out,
            "Authentication Tests",
            [
                ("register", &auth.register),
                ("login", &auth.login),
                ("forgotPassword", &auth.forgot_password),
            ],
        );

        let main = &self.main_section_tests;
        write_group(
            &mut out,
            "Main Section Tests",
            [
                ("produksi", &main.produksi),
                ("konsumsi", &main.konsumsi),
                ("menangah", &main.menangah),
            ],
        );

        let side = &self.side_mission_tests;
        write_group(
            &mut out,
            "Side Mission Tests",
            [
                ("misiPilahSampah", &side.misi_pilah_sampah),
                ("ikutAksi", &side.ikut_aksi),
            ],
        );

        write_group(&mut out, "FoodPrint", [("feature", &self.food_print_tests)]);

        let _ = writeln!(out, "Leaderboard");
        write_result(&mut out, "Display", &self.leaderboard.result);
        let kind = self.leaderboard.kind.as_str();
        if !kind.is_empty() {
            let _ = writeln!(out, "  Type: {}", kind);
        }
        out.push('\n');

        for (title, label, result) in [
            ("Toko (Store)", "Listing & Purchase", &self.toko),
            ("Komunitas", "Render", &self.komunitas),
            ("Hasil User", "Edit Avatar", &self.hasil_user),
            ("Sertifikat", "Unlock Missions", &self.sertifikat),
            ("User Profile", "Edit Profile", &self.user_profile),
        ] {
            let _ = writeln!(out, "{}", title);
            write_result(&mut out, label, result);
            out.push('\n');
        }

        let _ = writeln!(out, "Metadata");
        let _ = writeln!(
            out,
            "  Report ID: {}",
            self.id.as_ref().map(|id| id.0.as_str()).unwrap_or("N/A")
        );
        let _ = writeln!(
            out,
            "  Created: {}",
            self.created_at
                .map(super::format_date_time)
                .unwrap_or_else(|| "N/A".to_string())
        );
        if let Some(updated) = self.updated_at {
            let _ = writeln!(out, "  Updated: {}", super::format_date_time(updated));
        }

        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dashboard::Dashboard;
    use chrono::TimeZone;
    use store::{LeaderboardType, TestItem, TestStatus};

    fn report(tester: &str, version: &str, date: (i32, u32, u32)) -> QaTestReport {
        let (y, m, d) = date;
        let mut report = QaTestReport::new(
            tester,
            NaiveDate::from_ymd_opt(y, m, d).unwrap(),
            version,
        );
        report.id = Some(RecordId(format!("{}-{}", tester.to_lowercase(), version)));
        report
    }

    #[test]
    fn test_display_key() {
        assert_eq!(display_key("forgotPassword"), "Forgot Password");
        assert_eq!(display_key("misiPilahSampah"), "Misi Pilah Sampah");
        assert_eq!(display_key("produksi"), "Produksi");
        assert_eq!(display_key(""), "");
    }

    #[test]
    fn test_format_date() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        assert_eq!(format_date(date), "Jan 1, 2024");
    }

    #[test]
    fn test_summary_covers_every_item() {
        let mut r = report("Alice", "v1", (2024, 1, 1));
        r.result_mut(TestItem::Register).status = TestStatus::Pass;
        r.result_mut(TestItem::FoodPrint).status = TestStatus::Fail;
        r.result_mut(TestItem::Leaderboard).status = TestStatus::Pass;

        let summary = r.summary();
        assert_eq!(summary.total, 15);
        assert_eq!(summary.passed, 2);
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.passed + summary.failed + summary.not_tested, summary.total);
    }

    #[test]
    fn test_search_over_name_version_and_environment() {
        let mut staging = report("Budi", "v2.0.0", (2024, 1, 2));
        staging.test_environment = Some("Staging".to_string());
        let mut dashboard = Dashboard::from_records(vec![
            report("Alice", "v1.0.0", (2024, 1, 1)),
            staging,
        ]);

        dashboard.set_search("ALICE");
        assert_eq!(dashboard.filtered_len(), 1);

        dashboard.set_search("v2.0");
        assert_eq!(dashboard.filtered().next().unwrap().tester_name, "Budi");

        dashboard.set_search("staging");
        assert_eq!(dashboard.filtered_len(), 1);

        dashboard.set_search("nobody");
        assert_eq!(dashboard.filtered_len(), 0);
        assert_eq!(dashboard.records().len(), 2);

        dashboard.set_search("");
        assert_eq!(dashboard.filtered_len(), 2);
    }

    #[test]
    fn test_stats_use_test_date() {
        let now = Utc.with_ymd_and_hms(2024, 3, 31, 12, 0, 0).unwrap();
        let dashboard = Dashboard::from_records(vec![
            report("A", "v1", (2024, 3, 30)),
            report("B", "v1", (2024, 3, 20)),
            report("C", "v1", (2024, 1, 1)),
        ]);

        let stats = dashboard.stats(now);
        assert_eq!(stats.total, 3);
        assert_eq!(stats.filtered, 3);
        assert_eq!(stats.this_week, 1);
        assert_eq!(stats.this_month, 2);
    }

    #[test]
    fn test_csv_export() {
        let mut r = report("Smith, Jr.", "v1", (2024, 1, 1));
        r.id = Some(RecordId("7".to_string()));
        r.created_at = Some(Utc.with_ymd_and_hms(2024, 1, 1, 8, 30, 0).unwrap());
        let dashboard = Dashboard::from_records(vec![r]);

        let export = dashboard
            .export_csv(NaiveDate::from_ymd_opt(2024, 2, 3).unwrap())
            .unwrap();
        assert_eq!(export.file_name, "qa-reports-2024-02-03.csv");

        let lines: Vec<&str> = export.content.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], CSV_HEADERS.join(","));
        assert!(lines[1].starts_with("7,\"Smith, Jr.\",2024-01-01,v1,,"));
        assert!(lines[1].contains("\"{\"\"register\"\":{\"\"status\"\":\"\"not-tested\"\""));
        assert!(lines[1].ends_with(",2024-01-01T08:30:00+00:00"));
    }

    #[test]
    fn test_empty_export_is_header_only() {
        let mut dashboard = Dashboard::from_records(vec![report("A", "v1", (2024, 1, 1))]);
        dashboard.set_search("zzz");

        let export = dashboard
            .export_csv(NaiveDate::from_ymd_opt(2024, 2, 3).unwrap())
            .unwrap();
        assert_eq!(export.content, format!("{}\n", CSV_HEADERS.join(",")));
    }

    #[test]
    fn test_export_follows_search() {
        let mut dashboard = Dashboard::from_records(vec![
            report("Alice", "v2.7.9", (2024, 1, 3)),
            report("Budi", "v2.7.9", (2024, 1, 2)),
            report("Citra", "v2.6.0", (2024, 1, 1)),
        ]);
        dashboard.set_search("2.7");
        assert_eq!(dashboard.filtered_len(), 2);

        let export = dashboard
            .export_csv(NaiveDate::from_ymd_opt(2024, 2, 3).unwrap())
            .unwrap();
        let lines: Vec<&str> = export.content.lines().collect();
        assert_eq!(lines.len(), 1 + dashboard.filtered_len());
        assert!(lines[1].starts_with("alice-v2.7.9,Alice,"));
        assert!(lines[2].starts_with("budi-v2.7.9,Budi,"));
        assert!(!export.content.contains("Citra"));
    }

    #[test]
    fn test_unknown_status_renders_raw() {
        let mut r = report("Alice", "v1", (2024, 1, 1));
        r.toko.status = TestStatus::Other("blocked".to_string());
        r.auth_tests.login.status = TestStatus::Pass;

        let summary = r.summary();
        assert_eq!(summary.other, 1);
        assert_eq!(summary.passed, 1);
        assert_eq!(summary.total, 15);

        assert!(r.render_detail().contains("Listing & Purchase     blocked"));
        assert!(r.list_row().ends_with(" 13 n/t  1 other"));
    }

    #[test]
    fn test_detail_rendering() {
        let mut r = report("Alice", "v1", (2024, 1, 1));
        r.auth_tests.forgot_password = TestResult::new(TestStatus::Fail, "no email sent");
        r.leaderboard.kind = LeaderboardType::Full;

        let detail = r.render_detail();
        assert!(detail.contains("Basic Information"));
        assert!(detail.contains("Test Date: Jan 1, 2024"));
        assert!(detail.contains("Forgot Password"));
        assert!(detail.contains("✗ FAIL"));
        assert!(detail.contains("no email sent"));
        assert!(detail.contains("Type: full"));
        assert!(detail.contains("Toko (Store)"));
        assert!(detail.contains("Created: N/A"));
    }
}
