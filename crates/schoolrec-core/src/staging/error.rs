use thiserror::Error;

use crate::api::ApiError;

/// Why a candidate row was not accepted into the staged set.
///
/// Checks run in the order the variants are declared and stop at the first
/// failure.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Subject required")]
    MissingSubject,

    #[error("Start time required")]
    MissingStartTime,

    #[error("End time required")]
    MissingEndTime,

    #[error("Invalid time '{0}', expected HH:MM")]
    InvalidTimeFormat(String),

    #[error("Start time must precede end time")]
    InvalidTimeRange,

    #[error("Room required")]
    MissingRoom,

    #[error("Maximum enrolled required")]
    MissingCapacity,

    #[error("This subject has already been added")]
    DuplicateSubject,

    #[error("{subject} already meets {time_from} - {time_to}")]
    ScheduleOverlap {
        subject: String,
        time_from: String,
        time_to: String,
    },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StagingError {
    #[error("No staged row at position {index} (have {len})")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("Finish or cancel the row being edited first")]
    EditInProgress,

    #[error(transparent)]
    Invalid(#[from] ValidationError),
}

/// A dependent dropdown failed to populate. The catalog keeps its previous
/// contents; re-selecting the upstream value retries.
#[derive(Error, Debug)]
#[error("Failed to load choices for {upstream}: {source}")]
pub struct CatalogLoadError {
    pub upstream: String,
    #[source]
    pub source: ApiError,
}

#[derive(Error, Debug)]
pub enum SubmitError {
    #[error("Add at least one subject before saving")]
    NothingStaged,

    #[error("Finish or cancel the row being edited before saving")]
    EditInProgress,

    #[error("Not signed in or session expired")]
    Unauthenticated,

    #[error("{0}")]
    Rejected(String),

    #[error("Something went wrong: {0}")]
    Failed(#[source] ApiError),
}

impl From<ApiError> for SubmitError {
    fn from(err: ApiError) -> Self {
        match err {
            ApiError::Unauthenticated => SubmitError::Unauthenticated,
            ApiError::Rejected(message) => SubmitError::Rejected(message),
            other => SubmitError::Failed(other),
        }
    }
}
