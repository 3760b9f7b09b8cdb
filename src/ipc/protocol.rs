//! IPC message protocol definitions
//!
//! All messages are JSON-encoded, prefixed with a 4-byte little-endian length.

use serde::{Deserialize, Serialize};

use crate::dialogue::{PendingOrder, State};
use crate::session::{SessionEvent, SessionId};

/// Largest accepted message body
pub const MAX_MESSAGE_LEN: usize = 1024 * 1024;

/// Requests from UI to daemon
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Request {
    /// Request current daemon status
    GetStatus,

    /// Open a new conversation
    StartSession,

    /// Send one utterance to a conversation
    Say { session_id: SessionId, text: String },

    /// Report an uploaded image for a conversation
    SendImage { session_id: SessionId, size_bytes: u64 },

    /// Close a conversation
    EndSession { session_id: SessionId },

    /// Ping to check connectivity
    Ping,

    /// Turn this connection into an order event stream
    Subscribe,
}

/// Responses from daemon to UI
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Response {
    /// Current daemon status
    Status(DaemonStatus),

    /// Conversation opened
    SessionStarted { session_id: SessionId },

    /// Bot reply for one turn
    Reply {
        session_id: SessionId,
        text: String,
        state: State,
        order: PendingOrder,
    },

    /// Conversation closed
    SessionEnded { session_id: SessionId },

    /// Pong response to ping
    Pong,

    /// Subscription confirmed
    Subscribed,

    /// Error response
    Error { code: String, message: String },
}

impl Response {
    pub fn error(code: &str, message: impl Into<String>) -> Self {
        Response::Error {
            code: code.to_string(),
            message: message.into(),
        }
    }
}

/// Push notification from daemon to UI (for subscribed clients)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Notification {
    /// An order moved in some conversation
    OrderEvent(SessionEvent),
    /// Subscriber fell behind and missed events
    Lagged { skipped: u64 },
}

/// Full daemon status snapshot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DaemonStatus {
    /// Daemon version
    pub version: String,

    /// Conversations currently open
    pub active_sessions: usize,

    /// Orders confirmed since startup
    pub orders_confirmed: u64,

    /// Uptime in seconds
    pub uptime_secs: u64,
}

impl Default for DaemonStatus {
    fn default() -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
            active_sessions: 0,
            orders_confirmed: 0,
            uptime_secs: 0,
        }
    }
}
