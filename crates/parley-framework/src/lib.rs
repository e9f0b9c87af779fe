//! # Parley Framework
//!
//! Handler registration and state-aware dispatch.
//!
//! This layer provides:
//! - Registrations pairing a content predicate and a state predicate with a
//!   handler callback
//! - The ordered [`HandlerRegistry`] with an optional default handler
//! - The [`Dispatcher`], which resolves the sender, loads its state and runs
//!   the first matching handler
//! - Observers told about state transitions after each handled event
//!
//! The dispatcher is also a `tower::Service<BoxedEvent>`, so transport code
//! can wrap it in ordinary tower middleware.

pub mod callback;
pub mod dispatcher;
pub mod error;
pub mod observer;
pub mod predicate;
pub mod registration;
pub mod registry;

pub use callback::{BoxedCallback, Callback, CallbackResult, into_callback};
pub use dispatcher::{DispatchOutcome, Dispatcher};
pub use error::{DispatchError, DispatchResult, PredicateError, PredicateKind};
pub use observer::{DispatchObserver, DispatchRecord, TracingObserver};
pub use predicate::{ContentPredicate, PredicateResult, StatePredicate, Verdict};
pub use registration::{Registration, RegistrationBuilder};
pub use registry::HandlerRegistry;
