//! Conversation state: records, the backend contract, and the store.
//!
//! ```text
//! StateHandle ──▶ StateStore ──▶ dyn StateBackend
//!  (snapshot)     (merge, virgin   (memory / redis / postgres)
//!                  synthesis)
//! ```

pub mod backend;
pub mod handle;
pub mod lock;
pub mod memory;
pub mod record;
pub mod store;

pub use backend::{BoxedBackend, StateBackend};
pub use handle::StateHandle;
pub use lock::EntityLocks;
pub use memory::MemoryBackend;
pub use record::{ConversationState, StateData, StatePatch, StateRecord};
pub use store::StateStore;
