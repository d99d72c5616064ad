use crate::form::QaReportForm;
use store::{TestItem, TestStatus};

/// Editor for one test item row.
///
/// Status changes go straight to the form. Notes are typed into a local
/// buffer and only committed on [`blur`](Self::blur), so a long note does not
/// rewrite the whole form on every keystroke.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestItemEditor {
    item: TestItem,
    notes: String,
}

impl TestItemEditor {
    pub fn new(item: TestItem, form: &QaReportForm) -> Self {
        Self {
            item,
            notes: form.result(item).notes.clone(),
        }
    }

    pub fn item(&self) -> TestItem {
        self.item
    }

    /// Current buffer contents, committed or not.
    pub fn notes(&self) -> &str {
        &self.notes
    }

    pub fn edit_notes(&mut self, notes: impl Into<String>) {
        self.notes = notes.into();
    }

    pub fn set_status(&self, form: &mut QaReportForm, status: TestStatus) {
        form.mark_interaction();
        form.set_status(self.item, status);
    }

    /// Push the buffer to the form. Returns `false` when there was nothing to commit.
    pub fn blur(&self, form: &mut QaReportForm) -> bool {
        if form.result(self.item).notes == self.notes {
            return false;
        }
        form.mark_interaction();
        form.set_notes(self.item, self.notes.clone());
        true
    }

    /// Reload the buffer from the committed value, discarding local edits.
    pub fn sync(&mut self, form: &QaReportForm) {
        self.notes.clone_from(&form.result(self.item).notes);
    }

    pub fn is_dirty(&self, form: &QaReportForm) -> bool {
        form.result(self.item).notes != self.notes
    }
}
