//! Error types for the Parley framework.

use std::fmt;

use parley_core::{ResolveError, StoreError};
use thiserror::Error;

/// Which side of a registration a predicate belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PredicateKind {
    /// Predicate over the inbound event.
    Content,
    /// Predicate over the persisted conversation state.
    State,
}

impl fmt::Display for PredicateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Content => "content",
            Self::State => "state",
        })
    }
}

/// A predicate could not be evaluated.
///
/// The dispatcher never propagates this: the registration is treated as not
/// matching and dispatch moves on to the next one.
#[derive(Debug, Error)]
pub enum PredicateError {
    /// The predicate returned an error.
    #[error("{kind} predicate failed: {source}")]
    Failed {
        /// Which predicate failed.
        kind: PredicateKind,
        /// The error it returned.
        source: anyhow::Error,
    },

    /// The predicate panicked.
    #[error("{kind} predicate panicked: {message}")]
    Panicked {
        /// Which predicate panicked.
        kind: PredicateKind,
        /// The panic payload, if it was a string.
        message: String,
    },
}

impl PredicateError {
    /// Returns which predicate failed.
    pub fn kind(&self) -> PredicateKind {
        match self {
            Self::Failed { kind, .. } | Self::Panicked { kind, .. } => *kind,
        }
    }
}

/// Errors that abort a dispatch pass.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// The event could not be mapped to an entity id.
    #[error(transparent)]
    Resolve(#[from] ResolveError),

    /// The state store failed.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// The matched handler returned an error.
    #[error("handler '{registration}' failed: {source}")]
    Handler {
        /// Name (or `#index`) of the registration whose handler failed.
        registration: String,
        /// The error the handler returned.
        source: anyhow::Error,
    },

    /// The default handler returned an error.
    #[error("default handler failed: {0}")]
    Fallback(anyhow::Error),
}

/// Result type for dispatch operations.
pub type DispatchResult<T> = Result<T, DispatchError>;
