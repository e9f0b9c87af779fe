//! The ordered list of handler registrations.

use crate::callback::{BoxedCallback, Callback, into_callback};
use crate::registration::Registration;

/// An ordered collection of [`Registration`]s plus an optional default
/// handler.
///
/// Order matters: the dispatcher runs the first registration whose
/// predicates match, so more specific registrations must come first.
///
/// The registry is an ordinary value: build it at composition time and hand
/// it to a [`Dispatcher`](crate::Dispatcher).
#[derive(Clone, Default)]
pub struct HandlerRegistry {
    registrations: Vec<Registration>,
    default: Option<BoxedCallback>,
}

impl HandlerRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a registration.
    pub fn register(&mut self, registration: Registration) {
        self.registrations.push(registration);
    }

    /// Appends a registration (builder pattern).
    pub fn with(mut self, registration: Registration) -> Self {
        self.register(registration);
        self
    }

    /// Sets the handler run when no registration matches.
    pub fn set_default<C: Callback>(&mut self, callback: C) {
        self.default = Some(into_callback(callback));
    }

    /// Sets the default handler (builder pattern).
    pub fn with_default<C: Callback>(mut self, callback: C) -> Self {
        self.set_default(callback);
        self
    }

    /// Returns the default handler, if any.
    pub fn default_handler(&self) -> Option<&BoxedCallback> {
        self.default.as_ref()
    }

    /// Returns the registrations in order.
    pub fn iter(&self) -> std::slice::Iter<'_, Registration> {
        self.registrations.iter()
    }

    /// Returns the number of registrations (excluding the default handler).
    pub fn len(&self) -> usize {
        self.registrations.len()
    }

    /// Returns `true` if there are no registrations.
    pub fn is_empty(&self) -> bool {
        self.registrations.is_empty()
    }
}

impl<'a> IntoIterator for &'a HandlerRegistry {
    type Item = &'a Registration;
    type IntoIter = std::slice::Iter<'a, Registration>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl std::fmt::Debug for HandlerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HandlerRegistry")
            .field("registrations", &self.registrations)
            .field("has_default", &self.default.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use parley_core::{BoxedEvent, StateHandle};

    use super::*;

    async fn noop(_event: BoxedEvent, _state: StateHandle) {}

    #[test]
    fn test_registration_order_is_kept() {
        let registry = HandlerRegistry::new()
            .with(Registration::new().name("first").in_state("a").handler(noop))
            .with(Registration::new().name("second").in_state("b").handler(noop))
            .with(Registration::new().name("third").in_state("c").handler(noop));

        let names: Vec<_> = registry.iter().filter_map(|r| r.get_name()).collect();
        assert_eq!(names, ["first", "second", "third"]);
        assert_eq!(registry.len(), 3);
        assert!(registry.default_handler().is_none());
    }

    #[test]
    fn test_default_handler() {
        let mut registry = HandlerRegistry::new();
        assert!(registry.is_empty());
        registry.set_default(noop);
        assert!(registry.default_handler().is_some());
        assert!(registry.is_empty());
    }
}
