use thiserror::Error;

/// Errors raised by a `MovieStore`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// The store cannot be reached at all.
    #[error("store unavailable: {0}")]
    Unavailable(String),
    /// A read failed.
    #[error("query failed: {0}")]
    Query(String),
    /// A write was rejected; nothing from it was persisted.
    #[error("commit failed ({kind}): {message}")]
    Commit { kind: String, message: String },
}

impl StoreError {
    pub fn commit(kind: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Commit { kind: kind.into(), message: message.into() }
    }
}
