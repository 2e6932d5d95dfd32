//! Error taxonomy for the storage-engine core.
//!
//! Mirrors the shape of a unified `thiserror` error enum with an `is_*`
//! classification helper: callers match on error kind, wrappers (such as
//! the stat-tracking store) use the classifiers to decide what to count
//! without having to duplicate the matching logic.

use thiserror::Error;

/// Result type alias for storage-engine operations.
pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Errors the storage-engine core can return.
///
/// Propagation policy: every variant except evaluation failures (which are
/// swallowed and folded into a `false` predicate before they ever reach a
/// caller) is surfaced to the caller unchanged. Wrappers may observe and
/// count errors but must not swallow them.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A null or otherwise rejected key.
    #[error("invalid key")]
    InvalidKey,

    /// A put whose version is strictly dominated by an existing version of
    /// that key.
    #[error("obsolete version: new write is dominated by an existing version")]
    ObsoleteVersion,

    /// A capability lookup the store does not implement.
    #[error("no such capability: {0}")]
    NoSuchCapability(String),

    /// Expression-based deletion with no registered key serializer, or an
    /// iterator's `remove`.
    #[error("unsupported operation: {0}")]
    Unsupported(&'static str),

    /// Internal failure of an external expression evaluator. Per the
    /// propagation policy, this is swallowed and folded into a `false`
    /// predicate before it reaches a caller; no expression-evaluator crate
    /// is wired in, so this variant is currently unreachable and exists to
    /// keep the taxonomy complete if one is added.
    #[error("expression evaluation failed: {0}")]
    EvaluationError(String),

    /// Generic wrapping error for callers; always increments the
    /// `Exception` stats kind in any registered stats registry.
    #[error("operation failed: {0}")]
    OperationFailed(String),
}

impl StoreError {
    /// True iff this is an [`StoreError::ObsoleteVersion`].
    ///
    /// Used by the stat-tracking wrapper to decide whether to also bump the
    /// `Obsolete` stats kind in addition to `Exception`.
    #[inline]
    pub fn is_obsolete_version(&self) -> bool {
        matches!(self, StoreError::ObsoleteVersion)
    }

    /// True iff this is an [`StoreError::InvalidKey`].
    #[inline]
    pub fn is_invalid_key(&self) -> bool {
        matches!(self, StoreError::InvalidKey)
    }

    /// True iff this is [`StoreError::Unsupported`] or
    /// [`StoreError::NoSuchCapability`].
    #[inline]
    pub fn is_unsupported(&self) -> bool {
        matches!(self, StoreError::Unsupported(_) | StoreError::NoSuchCapability(_))
    }

    /// True iff this is [`StoreError::EvaluationError`]. Per the
    /// propagation policy this variant never reaches a caller, but the
    /// classifier is kept alongside the others for consistency.
    #[inline]
    pub fn is_evaluation_error(&self) -> bool {
        matches!(self, StoreError::EvaluationError(_))
    }
}
