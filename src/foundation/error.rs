/// Result alias used across the crate.
pub type BlurResult<T> = Result<T, BlurError>;

/// Everything a blur pass or one of its collaborators can fail with.
#[derive(thiserror::Error, Debug)]
pub enum BlurError {
    /// Invalid pass configuration, e.g. zero workers or more workers than rows.
    #[error("config error: {0}")]
    Config(String),

    /// A buffer size overflowed or the allocator refused the request.
    #[error("allocation error: {0}")]
    Allocation(String),

    /// Malformed input: bad dimensions, a buffer of the wrong length, an out-of-range
    /// pixel or band.
    #[error("validation error: {0}")]
    Validation(String),

    /// A worker failed, panicked or could not be started.
    #[error("worker error: {0}")]
    Worker(String),

    /// Failure in a collaborator (file I/O, decoding, encoding) carrying its own context.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl BlurError {
    /// Shorthand for [`BlurError::Config`].
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Shorthand for [`BlurError::Allocation`].
    pub fn allocation(msg: impl Into<String>) -> Self {
        Self::Allocation(msg.into())
    }

    /// Shorthand for [`BlurError::Validation`].
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Shorthand for [`BlurError::Worker`].
    pub fn worker(msg: impl Into<String>) -> Self {
        Self::Worker(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
