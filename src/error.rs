//! Error types for fallible tree operations.
//!
//! Almost nothing in the tree can fail: lookups that miss return `None`, and misuse of a node
//! handle is a contract violation that panics. The one recoverable failure is running out of
//! memory while growing the node arena, which the `try_*` family of methods reports instead of
//! aborting. When such a call fails, the tree is left exactly as it was before the call.

use std::collections::TryReserveError;

use thiserror::Error;

/// Errors returned by the fallible tree and set operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Storage for one or more tree nodes could not be reserved.
    #[error("failed to reserve storage for tree nodes")]
    Alloc(#[from] TryReserveError),
}

/// A `Result` alias using the crate's [`Error`] type.
pub type Result<T> = std::result::Result<T, Error>;
