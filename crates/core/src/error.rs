#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Missing required configuration: {0}")]
    MissingConfig(&'static str),

    #[error("Internal error: {0}")]
    Internal(String),
}
