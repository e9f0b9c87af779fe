//! Event dispatcher for Parley.
//!
//! The [`Dispatcher`] receives already-decoded events and runs at most one
//! handler for each of them. For every event:
//!
//! 1. The entity id is resolved from the event's platform and sender
//! 2. The entity's conversation state is loaded from the [`StateStore`]
//! 3. Registrations are evaluated in registration order; the first one whose
//!    content and state predicates match has its handler run, and dispatch
//!    stops there
//! 4. If nothing matched, the default handler runs, if there is one
//!
//! A predicate that fails (returns `Err` or panics) only disqualifies its own
//! registration. Store failures and handler errors abort the pass and are
//! returned to the caller.
//!
//! ```rust,ignore
//! use parley_framework::{Dispatcher, HandlerRegistry, Registration};
//!
//! let registry = HandlerRegistry::new()
//!     .with(Registration::new().state(|s| s.is_virgin()).handler(ask_name))
//!     .with(Registration::new().in_state("awaiting_name").handler(save_name))
//!     .with_default(explain_usage);
//!
//! let dispatcher = Dispatcher::new(registry, StateStore::memory(), default_resolver());
//! dispatcher.dispatch(BoxedEvent::new(update)).await?;
//! ```

use std::sync::Arc;
use std::task::{Context, Poll};

use futures::future::BoxFuture;
use parley_core::{BoxedEvent, EntityIdResolver, StateStore};
use tower::Service;
use tracing::{Instrument, debug, debug_span, field, trace};

use crate::error::{DispatchError, DispatchResult};
use crate::observer::{DispatchObserver, DispatchRecord};
use crate::registry::HandlerRegistry;

/// What a dispatch pass ended up doing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// A registration matched and its handler ran.
    Handled {
        /// Position of the registration in the registry.
        index: usize,
        /// The registration's name, if it has one.
        name: Option<String>,
    },
    /// Nothing matched; the default handler ran.
    Fallback,
    /// Nothing matched and there is no default handler.
    Unhandled,
}

impl DispatchOutcome {
    /// Returns `true` if a registration (not the default handler) matched.
    pub fn is_matched(&self) -> bool {
        matches!(self, Self::Handled { .. })
    }

    /// Returns `true` if any handler ran.
    pub fn is_delivered(&self) -> bool {
        !matches!(self, Self::Unhandled)
    }
}

/// The state-aware event dispatcher.
///
/// Cloning is cheap; clones share the registry, store and resolver.
/// `dispatch` takes `&self`, so one dispatcher can serve many concurrent
/// events. It holds no lock of its own.
#[derive(Clone)]
pub struct Dispatcher {
    registry: Arc<HandlerRegistry>,
    store: StateStore,
    resolver: Arc<EntityIdResolver>,
    observer: Option<Arc<dyn DispatchObserver>>,
}

impl Dispatcher {
    /// Creates a dispatcher.
    pub fn new(registry: HandlerRegistry, store: StateStore, resolver: EntityIdResolver) -> Self {
        Self {
            registry: Arc::new(registry),
            store,
            resolver: Arc::new(resolver),
            observer: None,
        }
    }

    /// Installs an observer told about every matched event (builder
    /// pattern).
    pub fn with_observer<O: DispatchObserver>(mut self, observer: O) -> Self {
        self.observer = Some(Arc::new(observer));
        self
    }

    /// Returns the registry.
    pub fn registry(&self) -> &HandlerRegistry {
        &self.registry
    }

    /// Returns the state store.
    pub fn store(&self) -> &StateStore {
        &self.store
    }

    /// Returns the entity id resolver.
    pub fn resolver(&self) -> &EntityIdResolver {
        &self.resolver
    }

    /// Runs one dispatch pass for `event`.
    pub async fn dispatch(&self, event: BoxedEvent) -> DispatchResult<DispatchOutcome> {
        let span = debug_span!(
            "dispatch",
            platform = event.platform(),
            event = event.event_name(),
            entity_id = field::Empty,
        );
        self.dispatch_inner(event).instrument(span).await
    }

    async fn dispatch_inner(&self, event: BoxedEvent) -> DispatchResult<DispatchOutcome> {
        let entity_id = self.resolver.resolve(&*event)?;
        tracing::Span::current().record("entity_id", entity_id.as_str());

        let state = self.store.get(&entity_id).await?;

        for (index, registration) in self.registry.iter().enumerate() {
            let verdict = match registration.evaluate(&event, &state) {
                Ok(verdict) => verdict,
                Err(e) => {
                    debug!(
                        registration = %registration.label(index),
                        error = %e,
                        "Predicate failed, treating registration as non-matching"
                    );
                    continue;
                }
            };

            if !verdict.is_match() {
                trace!(registration = %registration.label(index), ?verdict, "Registration skipped");
                continue;
            }

            let label = registration.label(index).into_owned();
            debug!(registration = %label, "Registration matched, running handler");

            let before = self.observer.as_ref().map(|_| state.snapshot().clone());
            registration
                .callback()
                .call(event.clone(), state)
                .await
                .map_err(|source| DispatchError::Handler {
                    registration: label.clone(),
                    source,
                })?;

            if let (Some(observer), Some(before)) = (&self.observer, before) {
                let after = self.store.load(&entity_id).await?;
                observer
                    .observe(DispatchRecord {
                        entity_id,
                        platform: event.platform(),
                        event_name: event.event_name(),
                        registration: label,
                        before,
                        after,
                    })
                    .await;
            }

            return Ok(DispatchOutcome::Handled {
                index,
                name: registration.get_name().map(str::to_string),
            });
        }

        if let Some(default) = self.registry.default_handler() {
            debug!("No registration matched, running default handler");
            default
                .call(event, state)
                .await
                .map_err(DispatchError::Fallback)?;
            return Ok(DispatchOutcome::Fallback);
        }

        trace!("No registration matched and no default handler");
        Ok(DispatchOutcome::Unhandled)
    }
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("registrations", &self.registry.len())
            .field("store", &self.store)
            .field("resolver", &self.resolver)
            .field("observer", &self.observer.is_some())
            .finish()
    }
}

// ============================================================================
// Tower Service Implementation for Dispatcher
// ============================================================================

/// Tower Service implementation for Dispatcher.
///
/// Parley defines no timeout or concurrency policy for handlers; callers
/// that want one can stack tower middleware on the dispatcher:
///
/// ```rust,ignore
/// use tower::ServiceBuilder;
///
/// let service = ServiceBuilder::new()
///     .concurrency_limit(64)
///     .service(dispatcher);
/// ```
impl Service<BoxedEvent> for Dispatcher {
    type Response = DispatchOutcome;
    type Error = DispatchError;
    type Future = BoxFuture<'static, DispatchResult<DispatchOutcome>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, event: BoxedEvent) -> Self::Future {
        let dispatcher = self.clone();
        Box::pin(async move { dispatcher.dispatch(event).await })
    }
}
