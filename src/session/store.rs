//! In-memory session store
//!
//! Sessions live only for the lifetime of the daemon. Turns for all sessions
//! are serialized behind a single write lock, so no session ever sees two
//! writers at once.

use std::collections::HashMap;

use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use tokio::sync::{broadcast, RwLock};
use tracing::{debug, info};
use uuid::Uuid;

use crate::dialogue::{self, PendingOrder, Session, State};
use crate::events::OrderEvent;

use super::SessionError;

pub type SessionId = Uuid;

/// Order event tagged with the session that produced it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionEvent {
    pub session_id: SessionId,
    pub event: OrderEvent,
}

/// What the shell shows after a turn
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnReply {
    pub text: String,
    pub state: State,
    pub order: PendingOrder,
}

struct Inner {
    sessions: HashMap<SessionId, Session>,
    rng: StdRng,
    orders_confirmed: u64,
}

/// Holds every active conversation
pub struct SessionStore {
    inner: RwLock<Inner>,
    event_tx: broadcast::Sender<SessionEvent>,
}

impl SessionStore {
    /// Create a store; a seed makes replies and order ids reproducible
    pub fn new(seed: Option<u64>, event_tx: broadcast::Sender<SessionEvent>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        Self {
            inner: RwLock::new(Inner {
                sessions: HashMap::new(),
                rng,
                orders_confirmed: 0,
            }),
            event_tx,
        }
    }

    /// Subscribe to order events from all sessions
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.event_tx.subscribe()
    }

    /// Open a new conversation in the Waiting state
    pub async fn start(&self) -> SessionId {
        let id = Uuid::new_v4();
        self.inner.write().await.sessions.insert(id, Session::new());
        info!(session_id = %id, "session started");
        id
    }

    /// Run one dialogue turn for a session
    pub async fn say(&self, id: SessionId, utterance: &str) -> Result<TurnReply, SessionError> {
        if utterance.trim().is_empty() {
            return Err(SessionError::EmptyUtterance);
        }

        let mut inner = self.inner.write().await;
        let Inner {
            sessions,
            rng,
            orders_confirmed,
        } = &mut *inner;

        let session = sessions
            .get_mut(&id)
            .ok_or(SessionError::UnknownSession(id))?;

        let turn = dialogue::handle(session, utterance, rng);
        *session = turn.session;

        if let Some(event) = turn.event {
            if matches!(event, OrderEvent::OrderConfirmed { .. }) {
                *orders_confirmed += 1;
            }
            debug!(session_id = %id, %event, "emitting order event");
            // No subscribers is fine
            let _ = self.event_tx.send(SessionEvent {
                session_id: id,
                event,
            });
        }

        Ok(TurnReply {
            text: turn.reply,
            state: session.state,
            order: session.order.clone(),
        })
    }

    /// Acknowledge an uploaded image for a session
    pub async fn send_image(&self, id: SessionId, size_bytes: u64) -> Result<String, SessionError> {
        let mut inner = self.inner.write().await;
        if !inner.sessions.contains_key(&id) {
            return Err(SessionError::UnknownSession(id));
        }
        Ok(dialogue::acknowledge_image(size_bytes, &mut inner.rng))
    }

    /// Discard a session
    pub async fn end(&self, id: SessionId) -> Result<(), SessionError> {
        match self.inner.write().await.sessions.remove(&id) {
            Some(_) => {
                info!(session_id = %id, "session ended");
                Ok(())
            }
            None => Err(SessionError::UnknownSession(id)),
        }
    }

    /// Current state of a session
    pub async fn snapshot(&self, id: SessionId) -> Option<Session> {
        self.inner.read().await.sessions.get(&id).cloned()
    }

    /// Number of active sessions
    pub async fn len(&self) -> usize {
        self.inner.read().await.sessions.len()
    }

    /// Orders confirmed since startup
    pub async fn orders_confirmed(&self) -> u64 {
        self.inner.read().await.orders_confirmed
    }
}
