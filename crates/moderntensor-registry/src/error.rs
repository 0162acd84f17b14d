use thiserror::Error;

/// Registry/publisher collaborator failures. A registry fetch failure is
/// phase-fatal; a publish failure is a non-fatal warning surfaced to the
/// caller of `run_phase` after scores are already computed.
#[derive(Error, Debug)]
pub enum RegistryError {
    #[error("registry unreachable: {0}")]
    Unreachable(String),

    #[error("registry returned malformed data: {0}")]
    MalformedResponse(String),

    #[error("score publish failed: {0}")]
    PublishFailed(String),
}

pub type Result<T> = std::result::Result<T, RegistryError>;
