//! CMS adapter errors

use thiserror::Error;

/// Errors raised while talking to the Prismic API
#[derive(Debug, Error)]
pub enum CmsError {
    /// Transport failure (DNS, TLS, timeout, connection reset)
    #[error("CMS request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The API answered with a non-success status
    #[error("CMS returned {status} for {url}")]
    Status {
        status: reqwest::StatusCode,
        url: String,
    },

    /// The response body did not have the expected shape
    #[error("Unexpected CMS payload: {0}")]
    Decode(#[from] serde_json::Error),

    /// No document matched the requested identifier
    #[error("Document not found: {0}")]
    NotFound(String),

    /// The API root did not advertise a master ref
    #[error("CMS API did not return a master ref")]
    MissingMasterRef,

    /// Pagination handed back a cursor that was already followed
    #[error("CMS pagination revisited cursor {0}")]
    CursorLoop(String),

    /// An endpoint or cursor could not be turned into a usable URL
    #[error("Invalid CMS URL {url:?}: {reason}")]
    InvalidUrl { url: String, reason: String },
}

impl CmsError {
    pub fn is_not_found(&self) -> bool {
        match self {
            CmsError::NotFound(_) => true,
            CmsError::Status { status, .. } => *status == reqwest::StatusCode::NOT_FOUND,
            _ => false,
        }
    }
}

pub type CmsResult<T> = std::result::Result<T, CmsError>;
