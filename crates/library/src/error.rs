//! Library error types.

use thiserror::Error;

/// Errors raised by a [`ResourceStore`](crate::store::ResourceStore).
#[derive(Debug, Error)]
pub enum StoreError {
    /// The single-row lookup matched nothing.
    #[error("row not found")]
    NotFound,

    #[error("database error: {0}")]
    Database(#[source] sqlx::Error),
}

impl StoreError {
    /// Whether this is the store's "no row" signal.
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound)
    }
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => StoreError::NotFound,
            other => StoreError::Database(other),
        }
    }
}

/// Library errors.
#[derive(Debug, Error)]
pub enum LibraryError {
    /// An embed URL failed the host allowlist.
    #[error("{context}: embed URL is not on the allowed host list: {url}")]
    EmbedNotAllowed { context: String, url: String },

    /// An embed is well-formed but violates a per-variant rule.
    #[error("{context}: {reason}")]
    InvalidEmbed { context: String, reason: String },

    /// Store failure, passed through unchanged.
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("internal error")]
    Internal(#[from] anyhow::Error),
}

/// Result type alias using LibraryError.
pub type LibraryResult<T> = Result<T, LibraryError>;
