use crate::catalog::CatalogError;
use crate::services::{EditError, EditStage, SubmitError};
use serde::Serialize;
use thiserror::Error;

/// Failures the operator is told about. None of them is retried
/// automatically.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("center/student directory is unavailable: {0}")]
    CatalogUnavailable(String),

    #[error("could not submit the entry: {0}")]
    SubmissionRejected(String),

    #[error("network error, the entry was not submitted: {0}")]
    SubmissionUnreachable(String),

    #[error("entries could not be loaded: {0}")]
    QueryFailed(String),

    #[error("failed to delete the existing entry {record_id}: {reason}")]
    EditDeleteFailed { record_id: String, reason: String },

    #[error("entry {record_id} was deleted but its updated copy was not stored: {reason}")]
    EditInsertFailed { record_id: String, reason: String },
}

impl SessionError {
    pub fn code(&self) -> &'static str {
        match self {
            SessionError::CatalogUnavailable(_) => "catalog_unavailable",
            SessionError::SubmissionRejected(_) => "submission_rejected",
            SessionError::SubmissionUnreachable(_) => "submission_unreachable",
            SessionError::QueryFailed(_) => "query_failed",
            SessionError::EditDeleteFailed { .. } => "edit_delete_failed",
            SessionError::EditInsertFailed { .. } => "edit_insert_failed",
        }
    }

    /// Only a failed insert phase leaves the store worse off than before.
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, SessionError::EditInsertFailed { .. })
    }
}

impl From<CatalogError> for SessionError {
    fn from(err: CatalogError) -> Self {
        SessionError::CatalogUnavailable(err.to_string())
    }
}

impl From<SubmitError> for SessionError {
    fn from(err: SubmitError) -> Self {
        match err {
            SubmitError::Rejected(reason) => SessionError::SubmissionRejected(reason),
            SubmitError::Unreachable(reason) => SessionError::SubmissionUnreachable(reason),
        }
    }
}

impl From<EditError> for SessionError {
    fn from(err: EditError) -> Self {
        let reason = err.cause.to_string();
        match err.stage {
            EditStage::Delete => SessionError::EditDeleteFailed {
                record_id: err.record_id,
                reason,
            },
            EditStage::Insert => SessionError::EditInsertFailed {
                record_id: err.record_id,
                reason,
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    Info,
    Error,
}

/// A blocking notification for the UI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub code: &'static str,
    pub message: String,
    pub recoverable: bool,
}

impl Notice {
    pub fn info(code: &'static str, message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            code,
            message: message.into(),
            recoverable: true,
        }
    }
}

impl From<SessionError> for Notice {
    fn from(err: SessionError) -> Self {
        Self {
            level: NoticeLevel::Error,
            code: err.code(),
            recoverable: err.is_recoverable(),
            message: err.to_string(),
        }
    }
}
