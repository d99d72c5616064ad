use std::borrow::Cow;
use std::fmt;
use store::TestStatus;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BadgeTone {
    Success,
    Destructive,
    Secondary,
    Outline,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusBadge<'a> {
    pub label: Cow<'a, str>,
    pub tone: BadgeTone,
}

impl<'a> StatusBadge<'a> {
    /// Unknown statuses are shown as-is.
    pub fn from_raw(status: &'a str) -> Self {
        match status {
            "pass" => Self::fixed("✓ PASS", BadgeTone::Success),
            "fail" => Self::fixed("✗ FAIL", BadgeTone::Destructive),
            "not-tested" => Self::fixed("○ N/T", BadgeTone::Secondary),
            other => Self {
                label: Cow::Borrowed(other),
                tone: BadgeTone::Outline,
            },
        }
    }

    fn fixed(label: &'static str, tone: BadgeTone) -> Self {
        Self {
            label: Cow::Borrowed(label),
            tone,
        }
    }
}

impl<'a> From<&'a TestStatus> for StatusBadge<'a> {
    fn from(status: &'a TestStatus) -> Self {
        Self::from_raw(status.as_str())
    }
}

impl fmt::Display for StatusBadge<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Pad through the formatter so badges line up in tables.
        f.pad(&self.label)
    }
}
