//! Handler registrations.
//!
//! A [`Registration`] pairs up to two predicates with the callback to run
//! when they match:
//!
//! ```rust,ignore
//! use parley_framework::Registration;
//! use parley_platforms::telegram::Update;
//!
//! let ask = Registration::new()
//!     .name("ask_name")
//!     .content_on::<Update, _>(|update| update.text() == Some("/start"))
//!     .state(|state| state.is_virgin())
//!     .handler(ask_name);
//!
//! let save = Registration::new()
//!     .name("save_name")
//!     .state(|state| state.is("awaiting_name"))
//!     .handler(save_name);
//! ```
//!
//! Registrations are cheap to clone; the predicates and callback are shared.

use std::borrow::Cow;
use std::sync::Arc;

use parley_core::{BoxedEvent, ConversationState, Event};

use crate::callback::{BoxedCallback, Callback, into_callback};
use crate::error::{PredicateError, PredicateKind};
use crate::predicate::{ContentPredicate, PredicateResult, StatePredicate, Verdict, evaluate};

/// Builder for a [`Registration`]. Finish it with
/// [`handler`](Self::handler).
#[derive(Clone, Default)]
#[must_use = "a registration builder does nothing until `.handler(..)` is called"]
pub struct RegistrationBuilder {
    name: Option<String>,
    content: Option<ContentPredicate>,
    state: Option<StatePredicate>,
}

impl RegistrationBuilder {
    /// Sets a name for this registration (used in logs and errors).
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Sets the content predicate.
    pub fn content<F>(self, f: F) -> Self
    where
        F: Fn(&BoxedEvent) -> bool + Send + Sync + 'static,
    {
        self.try_content(move |event| Ok(f(event)))
    }

    /// Sets a fallible content predicate. An `Err` counts as "no match".
    pub fn try_content<F>(mut self, f: F) -> Self
    where
        F: Fn(&BoxedEvent) -> PredicateResult + Send + Sync + 'static,
    {
        self.content = Some(Arc::new(f));
        self
    }

    /// Sets a content predicate over events of type `E`.
    ///
    /// Events of any other type do not match.
    pub fn content_on<E, F>(self, f: F) -> Self
    where
        E: Event,
        F: Fn(&E) -> bool + Send + Sync + 'static,
    {
        self.try_content(move |event| Ok(event.downcast_ref::<E>().is_some_and(&f)))
    }

    /// Sets a fallible content predicate over events of type `E`.
    ///
    /// Events of any other type do not match.
    pub fn try_content_on<E, F>(self, f: F) -> Self
    where
        E: Event,
        F: Fn(&E) -> PredicateResult + Send + Sync + 'static,
    {
        self.try_content(move |event| match event.downcast_ref::<E>() {
            Some(event) => f(event),
            None => Ok(false),
        })
    }

    /// Sets the state predicate.
    pub fn state<F>(self, f: F) -> Self
    where
        F: Fn(&ConversationState) -> bool + Send + Sync + 'static,
    {
        self.try_state(move |state| Ok(f(state)))
    }

    /// Sets a fallible state predicate. An `Err` counts as "no match".
    pub fn try_state<F>(mut self, f: F) -> Self
    where
        F: Fn(&ConversationState) -> PredicateResult + Send + Sync + 'static,
    {
        self.state = Some(Arc::new(f));
        self
    }

    /// Shorthand for a state predicate matching one label.
    pub fn in_state(self, label: impl Into<String>) -> Self {
        let label = label.into();
        self.state(move |state| state.is(&label))
    }

    /// Finishes the registration with its callback.
    pub fn handler<C: Callback>(self, callback: C) -> Registration {
        self.handler_boxed(into_callback(callback))
    }

    /// Finishes the registration with a pre-built boxed callback.
    pub fn handler_boxed(self, callback: BoxedCallback) -> Registration {
        Registration {
            inner: Arc::new(RegistrationInner {
                name: self.name,
                content: self.content,
                state: self.state,
                callback,
            }),
        }
    }
}

struct RegistrationInner {
    name: Option<String>,
    content: Option<ContentPredicate>,
    state: Option<StatePredicate>,
    callback: BoxedCallback,
}

/// One entry of a [`HandlerRegistry`](crate::HandlerRegistry).
#[derive(Clone)]
pub struct Registration {
    inner: Arc<RegistrationInner>,
}

impl Registration {
    /// Starts building a registration.
    #[allow(clippy::new_ret_no_self)]
    pub fn new() -> RegistrationBuilder {
        RegistrationBuilder::default()
    }

    /// Returns the name of this registration, if set.
    pub fn get_name(&self) -> Option<&str> {
        self.inner.name.as_deref()
    }

    /// Returns the name, or `#<index>` when unnamed.
    pub fn label(&self, index: usize) -> Cow<'_, str> {
        match &self.inner.name {
            Some(name) => Cow::Borrowed(name),
            None => Cow::Owned(format!("#{index}")),
        }
    }

    /// Returns `true` if a content predicate is set.
    pub fn has_content_predicate(&self) -> bool {
        self.inner.content.is_some()
    }

    /// Returns `true` if a state predicate is set.
    pub fn has_state_predicate(&self) -> bool {
        self.inner.state.is_some()
    }

    /// Returns the callback.
    pub fn callback(&self) -> &BoxedCallback {
        &self.inner.callback
    }

    /// Decides whether this registration applies to `event` in `state`.
    ///
    /// The content predicate runs first; if it rejects the event the state
    /// predicate is not consulted, since the combined verdict cannot match
    /// anyway.
    pub fn evaluate(
        &self,
        event: &BoxedEvent,
        state: &ConversationState,
    ) -> Result<Verdict, PredicateError> {
        let content = evaluate(PredicateKind::Content, self.inner.content.as_deref(), event)?;
        if content == Verdict::NoMatch {
            return Ok(Verdict::NoMatch);
        }
        let state = evaluate(PredicateKind::State, self.inner.state.as_deref(), state)?;
        Ok(content.and(state))
    }
}

impl std::fmt::Debug for Registration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registration")
            .field("name", &self.inner.name)
            .field("content", &self.inner.content.is_some())
            .field("state", &self.inner.state.is_some())
            .finish_non_exhaustive()
    }
}
