use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("invalid url: {0}")]
    InvalidUrl(String),

    #[error("invalid violation: {0}")]
    InvalidViolation(String),

    #[error("analysis timed out after {0} ms")]
    AnalysisTimeout(u64),

    #[error("analysis failed: {0}")]
    AnalysisFailed(String),

    #[error("a check is already running")]
    AlreadyRunning,

    #[error("duplicate check id: {0}")]
    DuplicateId(String),

    #[error("check not found: {0}")]
    NotFound(String),

    #[error("capability denied: {0}")]
    CapabilityDenied(String),

    #[error("check cancelled")]
    Cancelled,

    #[error("config error: {0}")]
    Config(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
}

pub type CoreResult<T> = Result<T, CoreError>;

#[allow(non_camel_case_types)]
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum ErrorKind {
    INVALID_URL,
    INVALID_VIOLATION,
    ANALYSIS_TIMEOUT,
    ANALYSIS_FAILED,
    ALREADY_RUNNING,
    DUPLICATE_ID,
    NOT_FOUND,
    CAPABILITY_DENIED,
    CANCELLED,
    CONFIG,
    IO,
}

impl CoreError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            CoreError::InvalidUrl(_) => ErrorKind::INVALID_URL,
            CoreError::InvalidViolation(_) => ErrorKind::INVALID_VIOLATION,
            CoreError::AnalysisTimeout(_) => ErrorKind::ANALYSIS_TIMEOUT,
            CoreError::AnalysisFailed(_) => ErrorKind::ANALYSIS_FAILED,
            CoreError::AlreadyRunning => ErrorKind::ALREADY_RUNNING,
            CoreError::DuplicateId(_) => ErrorKind::DUPLICATE_ID,
            CoreError::NotFound(_) => ErrorKind::NOT_FOUND,
            CoreError::CapabilityDenied(_) => ErrorKind::CAPABILITY_DENIED,
            CoreError::Cancelled => ErrorKind::CANCELLED,
            CoreError::Config(_) => ErrorKind::CONFIG,
            CoreError::Io(_) | CoreError::Json(_) | CoreError::Csv(_) => ErrorKind::IO,
        }
    }

    /// Mistakes in what the caller passed in; surfaced as-is, never retried.
    pub fn is_caller_mistake(&self) -> bool {
        matches!(
            self,
            CoreError::InvalidUrl(_)
                | CoreError::InvalidViolation(_)
                | CoreError::DuplicateId(_)
                | CoreError::NotFound(_)
        )
    }

    /// Environment failures a user may retry with a fresh submission.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            CoreError::AnalysisTimeout(_) | CoreError::AnalysisFailed(_)
        )
    }

    /// Expected-path branches (busy, upsell) rather than failures.
    pub fn is_policy_signal(&self) -> bool {
        matches!(
            self,
            CoreError::AlreadyRunning | CoreError::CapabilityDenied(_)
        )
    }
}
