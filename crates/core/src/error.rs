//! Document error model.

use thiserror::Error;

/// Result type used when loading or decoding an order document.
pub type DocumentResult<T> = Result<T, DocumentError>;

/// Fatal failure to turn input into an order document.
///
/// Rule failures inside a well-shaped document are never reported through
/// this type; validators return verdicts and issue lists instead. Only a
/// document that does not have the expected top-level shape (or cannot be
/// read at all) ends up here.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DocumentError {
    /// The document was decoded but does not have the expected shape
    /// (e.g. `orders` missing or not a sequence).
    #[error("malformed input: {0}")]
    MalformedInput(String),

    /// The document text is not valid JSON.
    #[error("parse error: {0}")]
    Parse(String),

    /// The document could not be read.
    #[error("io error: {0}")]
    Io(String),
}

impl DocumentError {
    pub fn malformed(msg: impl Into<String>) -> Self {
        Self::MalformedInput(msg.into())
    }

    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse(msg.into())
    }

    pub fn io(msg: impl Into<String>) -> Self {
        Self::Io(msg.into())
    }

    /// True for shape violations of an otherwise readable document.
    pub fn is_malformed(&self) -> bool {
        matches!(self, Self::MalformedInput(_))
    }
}
