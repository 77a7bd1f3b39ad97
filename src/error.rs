// Error handling module
// Defines the single failure category of a submission

use thiserror::Error;

/// Everything that can go wrong between pressing submit and having the file on disk.
///
/// The `Display` text is the bare message shown after `Error: ` in the status label.
#[derive(Error, Debug)]
pub enum SubmissionError {
    /// Network failure before any response arrived
    #[error("{0}")]
    Transport(#[from] reqwest::Error),

    /// Backend answered with a non-2xx status
    #[error("{message}")]
    Rejected { status: u16, message: String },

    /// Response arrived but its body could not be read
    #[error("failed to read response body: {0}")]
    Body(String),

    /// Selected template could not be read
    #[error("failed to read template {path}: {source}")]
    Template {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Generated file could not be written
    #[error("failed to save {path}: {source}")]
    Save {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

impl SubmissionError {
    /// Short machine-friendly label used as a log field
    pub fn kind(&self) -> &'static str {
        match self {
            SubmissionError::Transport(e) if e.is_timeout() => "timeout",
            SubmissionError::Transport(e) if e.is_connect() => "connection_failed",
            SubmissionError::Transport(_) => "transport",
            SubmissionError::Rejected { .. } => "rejected",
            SubmissionError::Body(_) => "body_error",
            SubmissionError::Template { .. } => "template_error",
            SubmissionError::Save { .. } => "save_error",
        }
    }
}

/// Result type alias for submission operations
pub type Result<T> = std::result::Result<T, SubmissionError>;
