//! # Parley
//!
//! State-aware event dispatch for chatbots that talk to users over several
//! messaging platforms at once.
//!
//! ## Overview
//!
//! Every inbound event is routed through one pipeline:
//!
//! ```text
//! webhook body ──▶ decode ──▶ resolve entity id ──▶ load state ──▶ first matching handler
//!                 (platforms)    ("telegram_42")      (store)       (or default handler)
//! ```
//!
//! - **Platforms**: typed events for Telegram, VKontakte, Viber and Facebook
//! - **Entity ids**: `<platform>_<user id>`, the key of a user's conversation
//! - **State store**: a label plus a JSON object per entity, kept in memory,
//!   Redis or PostgreSQL
//! - **Registrations**: a content predicate and/or a state predicate plus a
//!   handler; the first registration whose predicates match wins
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use parley::prelude::*;
//!
//! async fn ask_name(_event: BoxedEvent, mut state: StateHandle) -> anyhow::Result<()> {
//!     // send "What's your name?" through the platform API
//!     state.set_label("awaiting_name").await?;
//!     Ok(())
//! }
//!
//! async fn save_name(event: BoxedEvent, mut state: StateHandle) -> anyhow::Result<()> {
//!     let name = event.downcast_ref::<telegram::Update>().and_then(|u| u.text());
//!     state.insert("name", name.into()).await?;
//!     state.set_label("registered").await?;
//!     Ok(())
//! }
//!
//! let registry = HandlerRegistry::new()
//!     .with(Registration::new().state(|s| s.is_virgin()).handler(ask_name))
//!     .with(Registration::new().in_state("awaiting_name").handler(save_name));
//!
//! let dispatcher = Dispatcher::new(registry, StateStore::memory(), default_resolver());
//! dispatcher.dispatch(decode("telegram", &body)?).await?;
//! ```
//!
//! ## Features
//!
//! - `toml-config` (default), `yaml-config`: config file formats
//! - `json-log`: JSON log output
//! - `redis`: Redis state backend
//! - `postgres`: PostgreSQL state backend

pub use parley_core as core;
pub use parley_framework as framework;
pub use parley_platforms as platforms;
pub use parley_runtime as runtime;
pub use parley_store as store;

/// Prelude module for convenient imports.
///
/// ```rust,ignore
/// use parley::prelude::*;
/// ```
pub mod prelude {
    // Events and state
    pub use parley_core::{
        BoxedEvent, ConversationState, Event, StateData, StateHandle, StatePatch, StateStore,
    };

    // Registration and dispatch
    pub use parley_framework::{
        DispatchError, DispatchOutcome, DispatchRecord, Dispatcher, HandlerRegistry,
        Registration, TracingObserver,
    };

    // Platforms
    pub use parley_platforms::{decode, default_resolver, facebook, telegram, viber, vkontakte};

    // Wiring
    pub use parley_runtime::{ConfigLoader, bootstrap, connect_store};
}
