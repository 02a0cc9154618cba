use thiserror::Error;

/// Errors that can occur inside the execution engine.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The effect endpoint answered with a non-success status.
    #[error("Effect call rejected: {0}")]
    EffectRejected(String),

    /// Transport-level failure of the outbound effect call (connect error,
    /// client timeout, bad URL).
    #[error("Effect call failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The store failed while discovering or recording.
    #[error("Store error: {0}")]
    Store(#[from] tempo_store::StoreError),
}

pub type Result<T> = std::result::Result<T, EngineError>;
