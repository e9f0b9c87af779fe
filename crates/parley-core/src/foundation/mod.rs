//! Foundation layer - core abstractions and type system.

pub mod error;
pub mod event;

pub use error::{ResolveError, ResolveResult, StoreError, StoreResult};
pub use event::{BoxedEvent, Event};
