//! # Parley Core
//!
//! Core abstractions of the Parley dispatch engine.
//!
//! This crate provides the pieces the dispatcher is built from:
//!
//! - **Event System**: type-erased inbound events ([`Event`], [`BoxedEvent`])
//! - **Entity Ids**: per-platform resolution of the conversation key
//!   ([`EntityIdResolver`], [`entity_id`])
//! - **Conversation State**: records, the pluggable backend contract and the
//!   store layered on top of it ([`StateBackend`], [`StateStore`],
//!   [`StateHandle`], [`MemoryBackend`])
//!
//! Durable backends live in `parley-store`; the dispatcher itself lives in
//! `parley-framework`.
//!
//! ## Example
//!
//! ```rust,ignore
//! use parley_core::{StatePatch, StateStore};
//!
//! let store = StateStore::memory();
//!
//! let state = store.get("telegram_1234").await?;
//! assert!(state.is_virgin());
//!
//! store.set("telegram_1234", StatePatch::new().label("awaiting_reply")).await?;
//! assert!(store.get("telegram_1234").await?.is("awaiting_reply"));
//! ```

pub mod foundation;
pub mod resolver;
pub mod state;

pub use foundation::{BoxedEvent, Event, ResolveError, ResolveResult, StoreError, StoreResult};
pub use resolver::{EntityIdResolver, ResolveFn, entity_id};
pub use state::{
    BoxedBackend, ConversationState, EntityLocks, MemoryBackend, StateBackend, StateData,
    StateHandle, StatePatch, StateRecord, StateStore,
};

/// Prelude for common imports.
pub mod prelude {
    pub use super::foundation::*;
    pub use super::resolver::{EntityIdResolver, entity_id};
    pub use super::state::{
        ConversationState, StateBackend, StateData, StateHandle, StatePatch, StateRecord,
        StateStore,
    };
}
