use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// A required field was missing or empty. Raised before any write.
    #[error("{0}")]
    Validation(String),

    /// Store failure; carries the driver message verbatim.
    #[error("{0}")]
    Database(String),

    #[error("not found: {0}")]
    NotFound(String),

    /// The API could not be reached or the response could not be read.
    #[error("network error: {0}")]
    Network(String),

    /// The API answered with a non-success status.
    #[error("request failed with status {status}: {message}")]
    Api { status: u16, message: String },

    #[error("internal error: {0}")]
    Internal(String),
}

impl Error {
    pub fn validation(message: impl Into<String>) -> Self {
        Error::Validation(message.into())
    }

    pub fn database(message: impl ToString) -> Self {
        Error::Database(message.to_string())
    }
}
