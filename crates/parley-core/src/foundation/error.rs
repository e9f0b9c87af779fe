//! Unified error types for the Parley core.
//!
//! Dispatch-level errors (which wrap these) are defined in parley-framework.

use thiserror::Error;

// =============================================================================
// Store Errors
// =============================================================================

/// Errors raised by a [`StateBackend`](crate::state::StateBackend) or the
/// [`StateStore`](crate::state::StateStore) layered on top of it.
///
/// A missing record is never an error: stores synthesize the virgin state
/// instead. Everything here means "the store could not be used right now"
/// and is never retried by the engine.
#[derive(Debug, Clone, Error)]
pub enum StoreError {
    /// The backend could not be reached or rejected the operation.
    #[error("state backend '{backend}' unavailable: {reason}")]
    Unavailable {
        /// Name of the backend (e.g. "redis").
        backend: &'static str,
        /// Reason for failure.
        reason: String,
    },

    /// A stored record could not be encoded or decoded.
    #[error("state record serialization failed: {0}")]
    Serialization(String),
}

impl StoreError {
    /// Creates an unavailability error for the named backend.
    pub fn unavailable(backend: &'static str, reason: impl std::fmt::Display) -> Self {
        Self::Unavailable {
            backend,
            reason: reason.to_string(),
        }
    }

    /// Returns `true` for every variant.
    ///
    /// Both variants are the "store unavailable" class of failure; the
    /// method exists so callers can branch on the class without matching.
    pub fn is_unavailable(&self) -> bool {
        matches!(self, Self::Unavailable { .. } | Self::Serialization(_))
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

// =============================================================================
// Resolve Errors
// =============================================================================

/// Errors that can occur while mapping an inbound event to an entity id.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    /// No resolver is registered for the event's platform.
    #[error("no entity id resolver registered for platform '{0}'")]
    UnknownPlatform(String),

    /// The event carries no identifiable sender.
    #[error("{platform} event carries no sender id")]
    MissingSender {
        /// The platform tag of the event.
        platform: &'static str,
    },

    /// The resolver was handed an event type it does not understand.
    #[error("resolver for '{platform}' cannot handle event '{event}'")]
    UnexpectedEvent {
        /// The platform tag the resolver was registered for.
        platform: &'static str,
        /// The name of the event that was passed in.
        event: &'static str,
    },
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Result type for entity id resolution.
pub type ResolveResult<T> = Result<T, ResolveError>;
