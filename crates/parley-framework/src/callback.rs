//! Handler callbacks.
//!
//! A callback receives the event and a [`StateHandle`] for the sender's
//! conversation. Any async function or closure of that shape works, as long
//! as it returns `()` or `Result<(), E>` with `E: Into<anyhow::Error>`:
//!
//! ```rust,ignore
//! async fn greet(event: BoxedEvent, mut state: StateHandle) -> anyhow::Result<()> {
//!     state.set_label("greeted").await?;
//!     Ok(())
//! }
//!
//! async fn log_only(event: BoxedEvent, _state: StateHandle) {
//!     tracing::info!(event = event.event_name(), "seen");
//! }
//! ```

use std::future::Future;
use std::sync::Arc;

use futures::future::BoxFuture;
use parley_core::{BoxedEvent, StateHandle};

// ============================================================================
// CallbackResult - normalize callback return values
// ============================================================================

/// Return types a callback may have.
pub trait CallbackResult: Send {
    /// Converts the value into the dispatcher's error type.
    fn into_result(self) -> anyhow::Result<()>;
}

impl CallbackResult for () {
    fn into_result(self) -> anyhow::Result<()> {
        Ok(())
    }
}

impl<E> CallbackResult for Result<(), E>
where
    E: Into<anyhow::Error> + Send,
{
    fn into_result(self) -> anyhow::Result<()> {
        self.map_err(Into::into)
    }
}

// ============================================================================
// Callback Trait
// ============================================================================

/// A handler invoked by the dispatcher.
///
/// Implemented automatically for every `Fn(BoxedEvent, StateHandle) -> Fut`
/// whose future resolves to a [`CallbackResult`].
pub trait Callback: Send + Sync + 'static {
    /// Runs the handler.
    fn call(&self, event: BoxedEvent, state: StateHandle) -> BoxFuture<'static, anyhow::Result<()>>;
}

impl<F, Fut, R> Callback for F
where
    F: Fn(BoxedEvent, StateHandle) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: CallbackResult,
{
    fn call(&self, event: BoxedEvent, state: StateHandle) -> BoxFuture<'static, anyhow::Result<()>> {
        let fut = self(event, state);
        Box::pin(async move { fut.await.into_result() })
    }
}

/// A shared, type-erased callback.
pub type BoxedCallback = Arc<dyn Callback>;

/// Erases a callback's type.
pub fn into_callback<C: Callback>(callback: C) -> BoxedCallback {
    Arc::new(callback)
}

#[cfg(test)]
mod tests {
    use std::any::Any;

    use anyhow::anyhow;
    use parley_core::{Event, StateStore};
    use tokio_test::{assert_err, assert_ok};

    use super::*;

    struct Ping;

    impl Event for Ping {
        fn event_name(&self) -> &'static str {
            "ping"
        }

        fn platform(&self) -> &'static str {
            "test"
        }

        fn as_any(&self) -> &dyn Any {
            self
        }
    }

    async fn unit_handler(_event: BoxedEvent, _state: StateHandle) {}

    async fn failing_handler(_event: BoxedEvent, _state: StateHandle) -> anyhow::Result<()> {
        Err(anyhow!("boom"))
    }

    async fn io_handler(_event: BoxedEvent, _state: StateHandle) -> Result<(), std::io::Error> {
        Err(std::io::Error::other("disk full"))
    }

    async fn handle() -> StateHandle {
        StateStore::memory().get("test_1").await.unwrap()
    }

    #[tokio::test]
    async fn test_unit_return() {
        let cb = into_callback(unit_handler);
        assert_ok!(cb.call(BoxedEvent::new(Ping), handle().await).await);
    }

    #[tokio::test]
    async fn test_error_returns() {
        let cb = into_callback(failing_handler);
        let err = assert_err!(cb.call(BoxedEvent::new(Ping), handle().await).await);
        assert_eq!(err.to_string(), "boom");

        let cb = into_callback(io_handler);
        let err = assert_err!(cb.call(BoxedEvent::new(Ping), handle().await).await);
        assert_eq!(err.to_string(), "disk full");
    }

    #[tokio::test]
    async fn test_closure_mutates_state() {
        let cb = into_callback(|_event: BoxedEvent, mut state: StateHandle| async move {
            state.set_label("touched").await
        });
        let store = StateStore::memory();
        let state = store.get("test_1").await.unwrap();

        assert_ok!(cb.call(BoxedEvent::new(Ping), state).await);
        assert!(store.get("test_1").await.unwrap().is("touched"));
    }
}
