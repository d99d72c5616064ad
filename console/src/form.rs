use crate::error::ValidationError;
use crate::notice::{Notice, SubmitOutcome};
use chrono::{NaiveDate, Utc};
use store::{
    insert_record, LeaderboardType, QaTestReport, RecordStore, TestItem, TestResult, TestStatus,
};
use tracing::{error, info};

pub const DEFAULT_APPLICATION_VERSION: &str = "v2.7.9";

/// Values a fresh or reset form starts from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormDefaults {
    pub application_version: String,
}

impl Default for FormDefaults {
    fn default() -> Self {
        Self {
            application_version: DEFAULT_APPLICATION_VERSION.to_string(),
        }
    }
}

impl FormDefaults {
    pub fn with_application_version(mut self, version: impl Into<String>) -> Self {
        self.application_version = version.into();
        self
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.application_version.trim().is_empty() {
            return Err("Default application version cannot be empty".to_string());
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TutorialStep {
    pub title: &'static str,
    pub content: &'static str,
}

pub const TUTORIAL_STEPS: [TutorialStep; 5] = [
    TutorialStep {
        title: "Welcome to QA Testing Form",
        content: "This form helps you systematically test and document application features. \
                  Fill out each section as you test the corresponding features in the application.",
    },
    TutorialStep {
        title: "Basic Information",
        content: "Start by filling in your name, test date, app version, and environment. \
                  This information will be included in your final report.",
    },
    TutorialStep {
        title: "Test Each Feature",
        content: "For each feature section, actually try the feature in the application first, \
                  then come back here to record your results.",
    },
    TutorialStep {
        title: "Recording Results",
        content: "Select 'Pass' if the feature works correctly, 'Fail' if there are issues, \
                  or 'N/T' if you haven't tested it yet. Always add notes explaining what you observed.",
    },
    TutorialStep {
        title: "Submit Your Report",
        content: "Once you've completed testing, click 'Submit Report' to save your results \
                  to the database.",
    },
];

/// Onboarding walkthrough shown when the form first opens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tutorial {
    visible: bool,
    step: usize,
}

impl Default for Tutorial {
    fn default() -> Self {
        Self {
            visible: true,
            step: 0,
        }
    }
}

impl Tutorial {
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn step_index(&self) -> usize {
        self.step
    }

    pub fn current(&self) -> Option<&'static TutorialStep> {
        if self.visible {
            TUTORIAL_STEPS.get(self.step)
        } else {
            None
        }
    }

    pub fn is_last_step(&self) -> bool {
        self.step + 1 >= TUTORIAL_STEPS.len()
    }

    /// Moves forward; on the last step this finishes the tutorial.
    pub fn advance(&mut self) {
        if self.is_last_step() {
            self.visible = false;
        } else {
            self.step += 1;
        }
    }

    pub fn back(&mut self) {
        self.step = self.step.saturating_sub(1);
    }

    pub fn dismiss(&mut self) {
        self.visible = false;
    }

    fn hide_and_rewind(&mut self) {
        self.visible = false;
        self.step = 0;
    }
}

/// State of the full-app QA form.
#[derive(Debug, Clone)]
pub struct QaReportForm {
    defaults: FormDefaults,
    tester_name: String,
    test_date: Option<NaiveDate>,
    application_version: String,
    test_environment: String,
    results: [TestResult; TestItem::ALL.len()],
    leaderboard_type: LeaderboardType,
    submit_message: String,
    is_submitting: bool,
    has_interacted: bool,
    tutorial: Tutorial,
}

impl Default for QaReportForm {
    fn default() -> Self {
        Self::with_defaults(FormDefaults::default())
    }
}

impl QaReportForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_defaults(defaults: FormDefaults) -> Self {
        Self {
            tester_name: String::new(),
            test_date: Some(today()),
            application_version: defaults.application_version.clone(),
            test_environment: String::new(),
            results: Default::default(),
            leaderboard_type: LeaderboardType::Unset,
            submit_message: String::new(),
            is_submitting: false,
            has_interacted: false,
            tutorial: Tutorial::default(),
            defaults,
        }
    }

    pub fn tester_name(&self) -> &str {
        &self.tester_name
    }

    pub fn set_tester_name(&mut self, name: impl Into<String>) {
        self.mark_interaction();
        self.tester_name = name.into();
    }

    pub fn test_date(&self) -> Option<NaiveDate> {
        self.test_date
    }

    pub fn set_test_date(&mut self, date: Option<NaiveDate>) {
        self.mark_interaction();
        self.test_date = date;
    }

    /// Accepts `YYYY-MM-DD`; a blank value clears the date.
    pub fn set_test_date_str(&mut self, date: &str) -> Result<(), String> {
        let date = date.trim();
        if date.is_empty() {
            self.set_test_date(None);
            return Ok(());
        }
        let parsed = NaiveDate::parse_from_str(date, "%Y-%m-%d")
            .map_err(|e| format!("Invalid test date '{}': {}", date, e))?;
        self.set_test_date(Some(parsed));
        Ok(())
    }

    pub fn application_version(&self) -> &str {
        &self.application_version
    }

    pub fn set_application_version(&mut self, version: impl Into<String>) {
        self.mark_interaction();
        self.application_version = version.into();
    }

    pub fn test_environment(&self) -> &str {
        &self.test_environment
    }

    pub fn set_test_environment(&mut self, environment: impl Into<String>) {
        self.mark_interaction();
        self.test_environment = environment.into();
    }

    pub fn result(&self, item: TestItem) -> &TestResult {
        &self.results[item as usize]
    }

    pub fn set_status(&mut self, item: TestItem, status: TestStatus) {
        self.results[item as usize].status = status;
    }

    pub fn set_notes(&mut self, item: TestItem, notes: impl Into<String>) {
        self.results[item as usize].notes = notes.into();
    }

    pub fn leaderboard_type(&self) -> LeaderboardType {
        self.leaderboard_type
    }

    pub fn set_leaderboard_type(&mut self, kind: LeaderboardType) {
        self.mark_interaction();
        self.leaderboard_type = kind;
    }

    /// Message from the last validation or submission, empty when none.
    pub fn submit_message(&self) -> &str {
        &self.submit_message
    }

    pub fn is_submitting(&self) -> bool {
        self.is_submitting
    }

    pub fn has_interacted(&self) -> bool {
        self.has_interacted
    }

    pub fn tutorial(&self) -> &Tutorial {
        &self.tutorial
    }

    pub fn tutorial_mut(&mut self) -> &mut Tutorial {
        &mut self.tutorial
    }

    /// First touch of any field closes the onboarding walkthrough.
    pub fn mark_interaction(&mut self) {
        if !self.has_interacted {
            self.has_interacted = true;
            self.tutorial.dismiss();
        }
    }

    /// Validation without side effects. Checks run in display order.
    pub fn check(&self) -> Result<(), ValidationError> {
        if self.tester_name.trim().is_empty() {
            return Err(ValidationError::MissingTesterName);
        }
        if self.test_date.is_none() {
            return Err(ValidationError::MissingTestDate);
        }
        if self.application_version.trim().is_empty() {
            return Err(ValidationError::MissingApplicationVersion);
        }
        if self.results.iter().all(TestResult::is_default) {
            return Err(ValidationError::NoTestsCompleted);
        }
        Ok(())
    }

    /// Like [`check`](Self::check), but records the failure as the submit message.
    pub fn validate(&mut self) -> Result<(), ValidationError> {
        let checked = self.check();
        if let Err(e) = &checked {
            self.submit_message = e.to_string();
        }
        checked
    }

    pub fn build_report(&self) -> Result<QaTestReport, ValidationError> {
        self.check()?;
        let test_date = self.test_date.ok_or(ValidationError::MissingTestDate)?;

        let mut report = QaTestReport::new(
            self.tester_name.trim(),
            test_date,
            self.application_version.trim(),
        );
        let environment = self.test_environment.trim();
        if !environment.is_empty() {
            report.test_environment = Some(environment.to_string());
        }
        for item in TestItem::ALL {
            *report.result_mut(item) = self.result(item).clone();
        }
        report.leaderboard.kind = self.leaderboard_type;
        Ok(report)
    }

    pub async fn submit<S>(&mut self, store: &S) -> SubmitOutcome<QaTestReport>
    where
        S: RecordStore + ?Sized,
    {
        if let Err(e) = self.validate() {
            return SubmitOutcome::Rejected(e);
        }
        let report = match self.build_report() {
            Ok(report) => report,
            Err(e) => return SubmitOutcome::Rejected(e),
        };

        self.is_submitting = true;
        self.submit_message.clear();
        let inserted = insert_record(store, &report).await;
        self.is_submitting = false;

        match inserted {
            Ok(record) => {
                info!(
                    "Report saved for {} ({})",
                    record.tester_name, record.application_version
                );
                self.reset();
                SubmitOutcome::Submitted {
                    record,
                    notice: Notice::success("Success!", "Report submitted successfully!"),
                }
            }
            Err(e) => {
                error!("Error submitting report: {}", e);
                let notice = Notice::error("Error!", "Error submitting report. Please try again.");
                self.submit_message = notice.text.clone();
                SubmitOutcome::Failed { error: e, notice }
            }
        }
    }

    /// Back to defaults; the tutorial stays hidden.
    pub fn reset(&mut self) {
        self.tester_name.clear();
        self.test_date = Some(today());
        self.application_version = self.defaults.application_version.clone();
        self.test_environment.clear();
        self.results = Default::default();
        self.leaderboard_type = LeaderboardType::Unset;
        self.submit_message.clear();
        self.has_interacted = false;
        self.tutorial.hide_and_rewind();
    }
}

pub(crate) fn today() -> NaiveDate {
    Utc::now().date_naive()
}
