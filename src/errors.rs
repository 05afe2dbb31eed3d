use thiserror::Error;

/// Failures surfaced by the attendance core.
///
/// `InvalidInput` is the caller's fault and never changes the store.
/// `InternalFailure` carries a short human-readable summary only.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AttendanceError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("internal failure: {0}")]
    InternalFailure(String),
}

pub type Result<T> = std::result::Result<T, AttendanceError>;

impl AttendanceError {
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::InternalFailure(message.into())
    }

    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::InvalidInput(_))
    }
}

impl From<csv::Error> for AttendanceError {
    fn from(err: csv::Error) -> Self {
        Self::InternalFailure(format!("csv serialization failed: {err}"))
    }
}

impl From<std::io::Error> for AttendanceError {
    fn from(err: std::io::Error) -> Self {
        Self::InternalFailure(format!("io failure: {err}"))
    }
}
