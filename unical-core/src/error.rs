//! Error types for unical.

use thiserror::Error;

/// Errors that can occur while serving a calendar.
#[derive(Error, Debug)]
pub enum UnicalError {
    #[error("Invalid course id: {0}")]
    InvalidCourseId(String),

    #[error("Invalid year: {0}")]
    InvalidYear(String),

    #[error("Course not found: {0}")]
    CourseNotFound(i64),

    #[error("Timetable unavailable: {0}")]
    TimetableUnavailable(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Coarse classification of an [`UnicalError`], used to pick a response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed or out-of-range identifiers supplied by the client.
    InvalidInput,
    /// The requested course does not exist.
    NotFound,
    /// The timetable could not be fetched or turned into a calendar.
    SynthesisFailed,
    /// Startup problems (configuration, filesystem).
    Internal,
}

impl UnicalError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            UnicalError::InvalidCourseId(_) | UnicalError::InvalidYear(_) => {
                ErrorKind::InvalidInput
            }
            UnicalError::CourseNotFound(_) => ErrorKind::NotFound,
            UnicalError::TimetableUnavailable(_) | UnicalError::Serialization(_) => {
                ErrorKind::SynthesisFailed
            }
            UnicalError::Config(_) | UnicalError::Io(_) => ErrorKind::Internal,
        }
    }
}

/// Result type alias for unical operations.
pub type UnicalResult<T> = Result<T, UnicalError>;
