use crate::error::ValidationError;
use std::fmt;
use store::StoreError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Success,
    Error,
}

/// A message popped up to the tester after a submission attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub title: String,
    pub text: String,
}

impl Notice {
    pub fn success(title: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            title: title.into(),
            text: text.into(),
        }
    }

    pub fn error(title: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            title: title.into(),
            text: text.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.level == NoticeLevel::Success
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mark = match self.level {
            NoticeLevel::Success => "✓",
            NoticeLevel::Error => "✗",
        };
        write!(f, "{} {} {}", mark, self.title, self.text)
    }
}

/// Result of pressing submit on a form.
#[derive(Debug)]
pub enum SubmitOutcome<T> {
    /// Blocked before any network call; the form is untouched.
    Rejected(ValidationError),
    /// Stored; the form has been reset.
    Submitted { record: T, notice: Notice },
    /// The backend refused the write; the form keeps its state for a retry.
    Failed { error: StoreError, notice: Notice },
}

impl<T> SubmitOutcome<T> {
    pub fn is_submitted(&self) -> bool {
        matches!(self, SubmitOutcome::Submitted { .. })
    }

    pub fn record(&self) -> Option<&T> {
        match self {
            SubmitOutcome::Submitted { record, .. } => Some(record),
            _ => None,
        }
    }

    /// Text shown to the tester for this outcome.
    pub fn message(&self) -> String {
        match self {
            SubmitOutcome::Rejected(e) => e.to_string(),
            SubmitOutcome::Submitted { notice, .. } | SubmitOutcome::Failed { notice, .. } => {
                notice.to_string()
            }
        }
    }
}
