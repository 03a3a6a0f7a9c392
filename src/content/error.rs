//! Content error taxonomy
//!
//! A missing document is not an error: accessors return `Ok(None)` and the
//! server turns that into a 404. Errors here are the two cases the server
//! maps to 400 (slug rejected before any filesystem access) and 500.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ContentError {
    /// Slug from untrusted input contained path separators or parent
    /// references
    #[error("invalid slug: {0:?}")]
    InvalidSlug(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ContentError>;
