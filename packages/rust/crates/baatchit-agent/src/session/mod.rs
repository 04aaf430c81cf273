//! Session namespace: message types, conversation state, expiring store, per-session gate.

mod gate;
mod message;
mod state;
mod store;

pub use gate::{SessionGate, SessionGuard};
pub use message::{ChatMessage, FunctionCall, ToolCallOut};
pub use state::Session;
pub use store::{SessionStore, SessionStoreStats, SweeperHandle, new_session_id};
