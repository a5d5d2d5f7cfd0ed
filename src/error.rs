//! Error taxonomy for the reconciliation stores.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    /// The server no longer recognizes the session (401-class response).
    #[error("Session expired")]
    AuthExpired,

    /// A remote operation failed with a server-provided message.
    #[error("{0}")]
    Remote(String),

    /// A well-formed negative outcome (`success: false`), e.g. an invalid
    /// coupon or a duplicate wishlist add. Not a transport failure.
    #[error("{0}")]
    Rejected(String),

    /// The response body did not match the expected shape.
    #[error("Malformed server response: {0}")]
    BadResponse(String),

    #[error("Item not found")]
    NotFound,

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Storage error: {0}")]
    Storage(#[from] std::io::Error),

    #[error("Storage encoding error: {0}")]
    Encoding(#[from] serde_json::Error),
}
