use thiserror::Error;

/// Non-value outcomes of a variable read.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusCode {
    /// No valid reading exists for the variable yet.
    #[error("BadDataUnavailable: no data has been read yet")]
    BadDataUnavailable,

    /// The variable does not name a configured sensor.
    #[error("BadNodeIdUnknown: no such sensor")]
    BadNodeIdUnknown,
}
