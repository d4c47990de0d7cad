//! Error type shared by every `om-*` crate.
//!
//! Out-of-range sensor indices are not represented here: they are a defect in
//! the producer and surface as an index panic in the analysis code.

use thiserror::Error;

use crate::ModuleId;

#[derive(Debug, Error)]
pub enum HitError {
    /// The owning `HitManager` was shut down (or never created) before the
    /// call was made.
    #[error("hit manager is not initialized or has been shut down")]
    NotInitialized,

    /// The module holds hits but no sensor count was registered for it, so
    /// per-sensor outputs cannot be sized.
    #[error("{0} has hits but no registered sensor count")]
    UnregisteredModule(ModuleId),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("column {what} has length {got}, expected {expected}")]
    ColumnLengthMismatch {
        expected: usize,
        got:      usize,
        what:     &'static str,
    },
}

/// Shorthand result type for all `om-*` crates.
pub type HitResult<T> = Result<T, HitError>;
