use attachments::AttachmentError;
use store::StoreError;
use thiserror::Error;

/// Client-side validation failures. The message is what the tester sees.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Please enter tester name")]
    MissingTesterName,

    #[error("Please select test date")]
    MissingTestDate,

    #[error("Please enter application version")]
    MissingApplicationVersion,

    #[error("Please complete at least one test section")]
    NoTestsCompleted,

    #[error("Please enter a test name")]
    MissingTestName,
}

#[derive(Error, Debug)]
pub enum ConsoleError {
    #[error("{0}")]
    Validation(#[from] ValidationError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Attachment error: {0}")]
    Attachment(#[from] AttachmentError),

    #[error("Invalid input file: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Invalid input: {message}")]
    InvalidInput { message: String },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Export is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type ConsoleResult<T> = Result<T, ConsoleError>;
