use chrono::NaiveDate;

use crate::workflow::Page;

/// Failure reported by a [`crate::diagnosis::Diagnose`] backend.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DiagnoseError {
    #[error("captured image could not be read")]
    ImageUnreadable,
    #[error("no candidate diseases available")]
    NoCandidates,
    #[error("diagnosis backend error: {0}")]
    Backend(String),
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ScheduleInputError {
    #[error("start date '{0}' is not a valid YYYY-MM-DD date")]
    UnparseableDate(String),
    #[error("start date {start} is before today ({today})")]
    StartDateInPast { start: NaiveDate, today: NaiveDate },
    #[error("treatment '{0}' is not part of the active diagnosis")]
    UnknownTreatment(String),
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WorkflowError {
    #[error("capture unavailable: {0}")]
    CaptureUnavailable(String),
    #[error("diagnosis failed: {0}")]
    DiagnosisFailed(#[from] DiagnoseError),
    #[error("invalid schedule input: {0}")]
    InvalidScheduleInput(#[from] ScheduleInputError),
    #[error("illegal transition from {from:?} to {to:?}")]
    IllegalTransition { from: Page, to: Page },
    #[error("analysis superseded by a newer capture")]
    Superseded,
    #[error("analysis task failed: {0}")]
    TaskFailed(String),
}

impl WorkflowError {
    /// Whether the user can simply try the same action again.
    pub fn is_retryable(&self) -> bool {
        match self {
            WorkflowError::CaptureUnavailable(_) => true,
            WorkflowError::DiagnosisFailed(_) => true,
            WorkflowError::Superseded => true,
            WorkflowError::TaskFailed(_) => true,
            WorkflowError::InvalidScheduleInput(_) => false,
            WorkflowError::IllegalTransition { .. } => false,
        }
    }
}
