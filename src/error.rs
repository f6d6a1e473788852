use thiserror::Error;

/// Failure taxonomy of the core. Every operation either returns a populated
/// result or fails with exactly one of these kinds; the single sanctioned
/// silent degradation is a dangling reference resolving to `null`.
#[derive(Debug, Error)]
pub enum Error {
    /// Referenced aggregate missing (404 equivalent).
    #[error("not found: {0}")]
    NotFound(String),

    /// Ownership violation (403 equivalent).
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// Malformed upload or request body (400 equivalent).
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Storage, inference, or document-store failure (502 equivalent).
    #[error("upstream failure: {0}")]
    Upstream(String),

    /// An invariant the data model guarantees was observed broken
    /// (500 equivalent). Signals corruption, never user error.
    #[error("internal inconsistency: {0}")]
    Inconsistency(String),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub fn not_found(collection: crate::model::Collection, id: &str) -> Self {
        Error::NotFound(format!("document {collection}/{id} does not exist"))
    }

    pub fn forbidden(collection: crate::model::Collection, id: &str) -> Self {
        Error::Forbidden(format!(
            "you are not allowed to read, write or delete {collection}/{id}"
        ))
    }

    /// Stable machine-readable tag for this failure kind.
    pub fn kind(&self) -> &'static str {
        match self {
            Error::NotFound(_) => "not_found",
            Error::Forbidden(_) => "forbidden",
            Error::InvalidInput(_) => "invalid_input",
            Error::Upstream(_) => "upstream_failure",
            Error::Inconsistency(_) => "internal_inconsistency",
        }
    }
}

// Store adapters report through anyhow; everything crossing into the core
// becomes an upstream failure.
impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Error::Upstream(format!("document store: {err:#}"))
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Error::Upstream(err.to_string())
    }
}
