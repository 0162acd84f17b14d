use thiserror::Error;

/// Shared error type for the core domain types. Scheduler- and
/// registry-specific failure modes live in their own crates' error enums;
/// this one only covers malformed-data conditions a caller can hit while
/// constructing core types directly.
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("malformed payload: {0}")]
    MalformedPayload(String),
}

pub type Result<T> = std::result::Result<T, CoreError>;
