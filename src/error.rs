use thiserror::Error;

pub type Result<T> = std::result::Result<T, MondoError>;

#[derive(Debug, Error)]
pub enum MondoError {
    /// A required argument was missing or empty. Raised before any request is sent.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("your request was not sent with a valid token")]
    Unauthenticated,

    #[error("resource not found")]
    NotFound,

    #[error("malformed response: {0}")]
    MalformedResponse(String),

    /// Business error reported by the feed endpoint.
    #[error("{code}: {message}")]
    Feed { code: String, message: String },

    #[error("unexpected response status {status}: {body}")]
    Api { status: u16, body: String },

    #[error(transparent)]
    Transport(#[from] reqwest::Error),
}

impl MondoError {
    pub(crate) fn empty(field: &str) -> Self {
        MondoError::InvalidInput(format!("{} cannot be empty", field))
    }
}

/// Fails with [`MondoError::InvalidInput`] when `value` is empty.
pub(crate) fn require(field: &str, value: &str) -> Result<()> {
    if value.is_empty() {
        return Err(MondoError::empty(field));
    }
    Ok(())
}
