//! Entity id resolution.
//!
//! Every conversation is keyed by an *entity id* of the form
//! `"<platform>_<user-id>"`. The platform prefix keeps ids from different
//! platforms apart even when their numeric user ids coincide.
//!
//! [`EntityIdResolver`] is a lookup table from platform tag to a plain
//! function that extracts the sender from that platform's event shape.
//! Supporting a new platform means registering one more function:
//!
//! ```rust,ignore
//! let resolver = EntityIdResolver::new()
//!     .with("telegram", telegram::resolve_entity_id)
//!     .with("viber", viber::resolve_entity_id);
//!
//! let id = resolver.resolve(&*event)?; // "telegram_1234"
//! ```

use std::collections::HashMap;
use std::fmt::Display;

use tracing::trace;

use crate::foundation::{Event, ResolveError, ResolveResult};

/// A pure function mapping one platform's events to entity ids.
pub type ResolveFn = fn(&dyn Event) -> ResolveResult<String>;

/// Formats the canonical entity id for a platform user.
pub fn entity_id(platform: &str, user_id: impl Display) -> String {
    format!("{platform}_{user_id}")
}

/// Lookup table of per-platform entity id resolvers.
#[derive(Clone, Default)]
pub struct EntityIdResolver {
    resolvers: HashMap<&'static str, ResolveFn>,
}

impl EntityIdResolver {
    /// Creates an empty resolver table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the resolver for `platform`, replacing any previous one.
    pub fn register(&mut self, platform: &'static str, resolve: ResolveFn) {
        self.resolvers.insert(platform, resolve);
    }

    /// Registers the resolver for `platform` (builder pattern).
    pub fn with(mut self, platform: &'static str, resolve: ResolveFn) -> Self {
        self.register(platform, resolve);
        self
    }

    /// Returns `true` if a resolver is registered for `platform`.
    pub fn supports(&self, platform: &str) -> bool {
        self.resolvers.contains_key(platform)
    }

    /// Returns the registered platform tags in no particular order.
    pub fn platforms(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.resolvers.keys().copied()
    }

    /// Resolves the entity id for `event` using its platform's resolver.
    pub fn resolve(&self, event: &dyn Event) -> ResolveResult<String> {
        let platform = event.platform();
        let resolve = self
            .resolvers
            .get(platform)
            .ok_or_else(|| ResolveError::UnknownPlatform(platform.to_string()))?;

        let id = resolve(event)?;
        trace!(platform, entity_id = %id, "Resolved entity id");
        Ok(id)
    }
}

impl std::fmt::Debug for EntityIdResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut platforms: Vec<_> = self.resolvers.keys().collect();
        platforms.sort();
        f.debug_struct("EntityIdResolver")
            .field("platforms", &platforms)
            .finish()
    }
}
