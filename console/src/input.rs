//! Form submissions described in TOML files, for `qa report submit` and `qa case submit`.
//!
//! ```toml
//! tester_name = "Alice"
//! test_date = "2024-01-01"
//!
//! [results.forgotPassword]
//! status = "fail"
//! notes = "reset mail never arrives"
//! ```

use crate::case_form::InternalCaseForm;
use crate::error::{ConsoleError, ConsoleResult};
use crate::form::QaReportForm;
use crate::item::TestItemEditor;
use attachments::Attachment;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;
use store::{CaseSection, LeaderboardType, TestItem, TestStatus};
use tracing::debug;

fn invalid(message: String) -> ConsoleError {
    ConsoleError::InvalidInput { message }
}

fn parse_status(raw: &str) -> ConsoleResult<TestStatus> {
    raw.parse().map_err(invalid)
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ResultInput {
    pub status: Option<String>,
    pub notes: Option<String>,
}

/// A QA report. Header fields left out keep the form's defaults.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ReportInput {
    pub tester_name: Option<String>,
    /// `YYYY-MM-DD`
    pub test_date: Option<String>,
    pub application_version: Option<String>,
    pub test_environment: Option<String>,
    pub leaderboard_type: Option<String>,
    /// Keyed by item key, e.g. `register` or `misiPilahSampah`.
    #[serde(default)]
    pub results: BTreeMap<String, ResultInput>,
}

impl ReportInput {
    pub fn from_toml(content: &str) -> ConsoleResult<Self> {
        Ok(toml::from_str(content)?)
    }

    pub fn from_path(path: &Path) -> ConsoleResult<Self> {
        debug!("Reading report input from {}", path.display());
        Self::from_toml(&std::fs::read_to_string(path)?)
    }

    /// Fill the form the way a tester would: statuses directly, notes through
    /// each item's editor.
    pub fn apply_to(&self, form: &mut QaReportForm) -> ConsoleResult<()> {
        if let Some(name) = &self.tester_name {
            form.set_tester_name(name.as_str());
        }
        if let Some(date) = &self.test_date {
            form.set_test_date_str(date).map_err(invalid)?;
        }
        if let Some(version) = &self.application_version {
            form.set_application_version(version.as_str());
        }
        if let Some(env) = &self.test_environment {
            form.set_test_environment(env.as_str());
        }
        if let Some(kind) = &self.leaderboard_type {
            let kind: LeaderboardType = kind.parse().map_err(invalid)?;
            form.set_leaderboard_type(kind);
        }

        for (key, result) in &self.results {
            let item: TestItem = key.parse().map_err(invalid)?;
            let mut editor = TestItemEditor::new(item, form);
            if let Some(status) = &result.status {
                editor.set_status(form, parse_status(status)?);
            }
            if let Some(notes) = &result.notes {
                editor.edit_notes(notes.as_str());
                editor.blur(form);
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SectionInput {
    pub status: Option<String>,
    #[serde(default)]
    pub text_feedback: String,
    #[serde(default)]
    pub feedback: String,
    /// Screenshot path, relative to the input file.
    pub image: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CaseInput {
    #[serde(default)]
    pub test_name: String,
    /// Keyed by section title, e.g. `"Logout/Login scenario"`.
    #[serde(default)]
    pub sections: BTreeMap<String, SectionInput>,
}

impl CaseInput {
    pub fn from_toml(content: &str) -> ConsoleResult<Self> {
        Ok(toml::from_str(content)?)
    }

    pub fn from_path(path: &Path) -> ConsoleResult<Self> {
        debug!("Reading case input from {}", path.display());
        Self::from_toml(&std::fs::read_to_string(path)?)
    }

    pub fn apply_to(&self, form: &mut InternalCaseForm, base_dir: &Path) -> ConsoleResult<()> {
        form.set_test_name(self.test_name.as_str());

        for (title, input) in &self.sections {
            let section: CaseSection = title.parse().map_err(invalid)?;
            if let Some(status) = &input.status {
                form.set_status(section, parse_status(status)?);
            }
            form.set_text_feedback(section, input.text_feedback.as_str());
            form.set_feedback(section, input.feedback.as_str());
            if let Some(image) = &input.image {
                let attachment = Attachment::load(&base_dir.join(image))?;
                form.attach_image(section, attachment);
            }
        }
        Ok(())
    }
}
