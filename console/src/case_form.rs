use crate::error::ValidationError;
use crate::notice::{Notice, SubmitOutcome};
use crate::submission::{submit_internal_case, CaseDraft, SectionDraft};
use attachments::Attachment;
use store::{Backend, CaseSection, InternalTestingCase, TestStatus};
use tracing::error;

/// State of the internal testing case checklist.
#[derive(Debug, Clone)]
pub struct InternalCaseForm {
    draft: CaseDraft,
    is_submitting: bool,
}

impl Default for InternalCaseForm {
    fn default() -> Self {
        Self {
            draft: CaseDraft::new(""),
            is_submitting: false,
        }
    }
}

impl InternalCaseForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn test_name(&self) -> &str {
        &self.draft.test_name
    }

    pub fn set_test_name(&mut self, name: impl Into<String>) {
        self.draft.test_name = name.into();
    }

    pub fn section(&self, section: CaseSection) -> Option<&SectionDraft> {
        self.draft.sections.get(&section)
    }

    fn section_mut(&mut self, section: CaseSection) -> &mut SectionDraft {
        self.draft.sections.entry(section).or_default()
    }

    pub fn set_text_feedback(&mut self, section: CaseSection, text: impl Into<String>) {
        self.section_mut(section).text_feedback = text.into();
    }

    pub fn set_feedback(&mut self, section: CaseSection, feedback: impl Into<String>) {
        self.section_mut(section).feedback = feedback.into();
    }

    pub fn set_status(&mut self, section: CaseSection, status: TestStatus) {
        self.section_mut(section).status = status;
    }

    /// Replaces any image already picked for the section.
    pub fn attach_image(&mut self, section: CaseSection, attachment: Attachment) {
        self.section_mut(section).image = Some(attachment);
    }

    pub fn clear_image(&mut self, section: CaseSection) -> Option<Attachment> {
        self.section_mut(section).image.take()
    }

    pub fn draft(&self) -> &CaseDraft {
        &self.draft
    }

    pub fn is_submitting(&self) -> bool {
        self.is_submitting
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.draft.test_name.trim().is_empty() {
            return Err(ValidationError::MissingTestName);
        }
        Ok(())
    }

    pub async fn submit<B>(&mut self, store: &B) -> SubmitOutcome<InternalTestingCase>
    where
        B: Backend + ?Sized,
    {
        if let Err(e) = self.validate() {
            return SubmitOutcome::Rejected(e);
        }

        let mut draft = self.draft.clone();
        draft.test_name = draft.test_name.trim().to_string();

        self.is_submitting = true;
        let stored = submit_internal_case(store, &draft).await;
        self.is_submitting = false;

        match stored {
            Ok(record) => {
                self.reset();
                SubmitOutcome::Submitted {
                    record,
                    notice: Notice::success(
                        "Success!",
                        "All testing cases submitted successfully!",
                    ),
                }
            }
            Err(e) => {
                error!("Error submitting testing cases: {}", e);
                let notice = Notice::error(
                    "Error!",
                    format!("Failed to submit testing cases: {}", e),
                );
                SubmitOutcome::Failed { error: e, notice }
            }
        }
    }

    pub fn reset(&mut self) {
        self.draft = CaseDraft::new("");
    }
}
