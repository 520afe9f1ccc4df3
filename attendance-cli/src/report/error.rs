//! Error taxonomy for the report pipeline

use std::path::PathBuf;

use thiserror::Error;

use super::pipeline::RunSummary;

/// Errors raised while generating a period's reports.
///
/// `SourceNotFound`, `Schema`, `Access`, `NoReports` and `Archive` end the
/// run. `TemplateRender` and `Persist` only cost a single document and are
/// collected into the run summary by the render loop.
#[derive(Debug, Error)]
pub enum ReportError {
    #[error("required source file not found: {}", path.display())]
    SourceNotFound { path: PathBuf },

    #[error("schema error: {0}")]
    Schema(String),

    #[error(
        "cannot access {}; it may be open in another program or locked",
        path.display()
    )]
    Access {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to read {}: {message}", path.display())]
    Source { path: PathBuf, message: String },

    #[error("failed to render '{document}': {message}")]
    TemplateRender { document: String, message: String },

    #[error("failed to persist '{document}': {source}")]
    Persist {
        document: String,
        #[source]
        source: std::io::Error,
    },

    #[error("no generated documents to compress")]
    NoReports { summary: Box<RunSummary> },

    #[error("failed to write archive {}: {message}", path.display())]
    Archive { path: PathBuf, message: String },
}

impl ReportError {
    pub fn schema(message: impl Into<String>) -> Self {
        ReportError::Schema(message.into())
    }

    pub fn render(document: impl Into<String>, message: impl Into<String>) -> Self {
        ReportError::TemplateRender {
            document: document.into(),
            message: message.into(),
        }
    }

    /// Whether the run can continue past this error
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            ReportError::TemplateRender { .. } | ReportError::Persist { .. }
        )
    }
}

pub type ReportResult<T> = std::result::Result<T, ReportError>;
