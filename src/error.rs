//! Error types for the scheduling core.
//!
//! Predicates and priorities are pure and infallible by contract (the
//! "image not yet cached" and "path label absent" situations documented in
//! the priority descriptions simply contribute a score of zero); everything
//! else that can go wrong surfaces here.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SchedulerError {
    #[error("invalid size string: {0}")]
    InvalidSize(String),

    #[error("no nodes host bucket {0}")]
    MissingBucket(String),

    #[error("remote image size lookup not supported for {0}")]
    UnsupportedImageQuery(String),

    #[error("internal scheduler invariant violated: {0}")]
    ProgrammerError(String),
}
