pub mod badge;
pub mod case_form;
pub mod dashboard;
pub mod error;
pub mod form;
pub mod input;
pub mod interactive;
pub mod item;
pub mod notice;
pub mod submission;

pub use badge::{BadgeTone, StatusBadge};
pub use case_form::InternalCaseForm;
pub use dashboard::{
    CsvExport, Dashboard, DashboardRecord, DashboardStats, LoadState, TestSummary,
    LOAD_ERROR_MESSAGE,
};
pub use error::{ConsoleError, ConsoleResult, ValidationError};
pub use form::{
    FormDefaults, QaReportForm, Tutorial, TutorialStep, DEFAULT_APPLICATION_VERSION,
    TUTORIAL_STEPS,
};
pub use input::{CaseInput, ReportInput};
pub use interactive::{fill_case_form, fill_report_form, show_tutorial, Prompter};
pub use item::TestItemEditor;
pub use notice::{Notice, NoticeLevel, SubmitOutcome};
pub use submission::{submit_internal_case, upload_testing_image, CaseDraft, SectionDraft};
