//! Session store for concurrent conversations
//!
//! Threads each conversation's `Session` through the dialogue engine and
//! broadcasts order events to interested listeners.

mod error;
mod store;

pub use error::SessionError;
pub use store::{SessionEvent, SessionId, SessionStore};
