//! Unix domain socket server for IPC
//!
//! Provides request-response conversations and push notifications of order
//! events to subscribed clients.

use std::ops::RangeInclusive;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use rand::Rng;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::net::{UnixListener, UnixStream};
use tokio::sync::broadcast;
use tracing::{debug, error, info, warn};

use crate::session::{SessionEvent, SessionId, SessionStore};

use super::protocol::{DaemonStatus, Notification, Request, Response, MAX_MESSAGE_LEN};

/// IPC Server handling client connections
pub struct Server {
    socket_path: PathBuf,
    listener: UnixListener,
    shared: Arc<Shared>,
    shutdown_tx: broadcast::Sender<()>,
}

/// State shared by all client handlers
struct Shared {
    store: Arc<SessionStore>,
    reply_delay: RangeInclusive<Duration>,
    start_time: Instant,
}

impl Shared {
    /// Simulated typing pause before a bot reply
    async fn think(&self) {
        let delay = rand::thread_rng().gen_range(self.reply_delay.clone());
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
    }
}

impl Server {
    /// Create a new IPC server bound to `socket_path`
    pub fn new(
        socket_path: &Path,
        store: Arc<SessionStore>,
        reply_delay: RangeInclusive<Duration>,
    ) -> Result<Self> {
        // Ensure parent directory exists
        if let Some(parent) = socket_path.parent() {
            std::fs::create_dir_all(parent).context("failed to create socket directory")?;
        }

        // Remove stale socket if it exists
        if socket_path.exists() {
            std::fs::remove_file(socket_path).context("failed to remove stale socket")?;
        }

        let listener = UnixListener::bind(socket_path).context("failed to bind Unix socket")?;

        // Owner-only access
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(socket_path, std::fs::Permissions::from_mode(0o600))?;
        }

        let (shutdown_tx, _) = broadcast::channel(1);

        info!(?socket_path, "IPC server listening");

        Ok(Self {
            socket_path: socket_path.to_owned(),
            listener,
            shared: Arc::new(Shared {
                store,
                reply_delay,
                start_time: Instant::now(),
            }),
            shutdown_tx,
        })
    }

    /// Run the server, accepting connections
    pub async fn run(&self) -> Result<()> {
        loop {
            match self.listener.accept().await {
                Ok((stream, _addr)) => {
                    debug!("client connected");
                    let shared = Arc::clone(&self.shared);
                    let mut shutdown_rx = self.shutdown_tx.subscribe();

                    tokio::spawn(async move {
                        tokio::select! {
                            result = Self::handle_client(stream, shared) => {
                                if let Err(e) = result {
                                    warn!(?e, "client handler error");
                                }
                            }
                            _ = shutdown_rx.recv() => {
                                debug!("client handler shutting down");
                            }
                        }
                    });
                }
                Err(e) => {
                    error!(?e, "accept error");
                }
            }
        }
    }

    /// Handle a single client connection
    ///
    /// Sessions opened on this connection and not ended explicitly are
    /// discarded once the client goes away.
    async fn handle_client(stream: UnixStream, shared: Arc<Shared>) -> Result<()> {
        let mut owned = Vec::new();
        let result = Self::serve_client(stream, &shared, &mut owned).await;

        for session_id in owned {
            if shared.store.end(session_id).await.is_ok() {
                debug!(%session_id, "discarded session of disconnected client");
            }
        }

        result
    }

    async fn serve_client(
        mut stream: UnixStream,
        shared: &Shared,
        owned: &mut Vec<SessionId>,
    ) -> Result<()> {
        loop {
            let Some(msg_buf) = read_frame(&mut stream).await? else {
                debug!("client disconnected");
                return Ok(());
            };

            let request: Request = match serde_json::from_slice(&msg_buf) {
                Ok(request) => request,
                Err(e) => {
                    warn!(?e, "malformed request");
                    let response = Response::error("bad_request", e.to_string());
                    write_frame(&mut stream, &response).await?;
                    continue;
                }
            };

            debug!(?request, "received request");

            if matches!(request, Request::Subscribe) {
                // Subscribe before confirming so no event slips between the two
                let events = shared.store.subscribe();
                write_frame(&mut stream, &Response::Subscribed).await?;
                debug!("client subscribed to notifications");
                return Self::stream_events(stream, events).await;
            }

            let response = Self::process_request(request, shared).await;
            match &response {
                Response::SessionStarted { session_id } => owned.push(*session_id),
                Response::SessionEnded { session_id } => owned.retain(|id| id != session_id),
                _ => {}
            }
            write_frame(&mut stream, &response).await?;
        }
    }

    /// Forward order events to a subscribed client until either side closes
    async fn stream_events(
        mut stream: UnixStream,
        mut events: broadcast::Receiver<SessionEvent>,
    ) -> Result<()> {
        loop {
            let notification = match events.recv().await {
                Ok(event) => Notification::OrderEvent(event),
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!(skipped, "subscriber lagged");
                    Notification::Lagged { skipped }
                }
                Err(broadcast::error::RecvError::Closed) => return Ok(()),
            };

            write_frame(&mut stream, &notification).await?;
        }
    }

    /// Process a request and return a response
    async fn process_request(request: Request, shared: &Shared) -> Response {
        let store = &shared.store;

        match request {
            Request::Ping => Response::Pong,

            Request::GetStatus => Response::Status(DaemonStatus {
                active_sessions: store.len().await,
                orders_confirmed: store.orders_confirmed().await,
                uptime_secs: shared.start_time.elapsed().as_secs(),
                ..DaemonStatus::default()
            }),

            Request::StartSession => Response::SessionStarted {
                session_id: store.start().await,
            },

            Request::Say { session_id, text } => {
                shared.think().await;

                match store.say(session_id, &text).await {
                    Ok(reply) => Response::Reply {
                        session_id,
                        text: reply.text,
                        state: reply.state,
                        order: reply.order,
                    },
                    Err(e) => Response::error(e.code(), e.to_string()),
                }
            }

            Request::SendImage {
                session_id,
                size_bytes,
            } => {
                shared.think().await;

                match store.send_image(session_id, size_bytes).await {
                    Ok(text) => {
                        let snapshot = store.snapshot(session_id).await.unwrap_or_default();
                        Response::Reply {
                            session_id,
                            text,
                            state: snapshot.state,
                            order: snapshot.order,
                        }
                    }
                    Err(e) => Response::error(e.code(), e.to_string()),
                }
            }

            Request::EndSession { session_id } => match store.end(session_id).await {
                Ok(()) => Response::SessionEnded { session_id },
                Err(e) => Response::error(e.code(), e.to_string()),
            },

            // Handled by the connection loop
            Request::Subscribe => Response::Subscribed,
        }
    }

    /// Gracefully shutdown the server
    pub async fn shutdown(&self) {
        let _ = self.shutdown_tx.send(());

        // Remove socket file
        if self.socket_path.exists() {
            if let Err(e) = std::fs::remove_file(&self.socket_path) {
                warn!(?e, "failed to remove socket file");
            }
        }

        info!("IPC server shutdown complete");
    }
}

/// Read one length-prefixed message body; `None` on clean EOF or oversize
pub(crate) async fn read_frame<S: AsyncRead + Unpin>(stream: &mut S) -> Result<Option<Vec<u8>>> {
    let mut len_buf = [0u8; 4];

    match stream.read_exact(&mut len_buf).await {
        Ok(_) => {}
        Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => return Ok(None),
        Err(e) => return Err(e.into()),
    }

    let len = u32::from_le_bytes(len_buf) as usize;
    if len > MAX_MESSAGE_LEN {
        warn!(len, "message too large, disconnecting");
        return Ok(None);
    }

    let mut msg_buf = vec![0u8; len];
    stream.read_exact(&mut msg_buf).await?;
    Ok(Some(msg_buf))
}

/// Send a length-prefixed JSON message
pub(crate) async fn write_frame<S, T>(stream: &mut S, msg: &T) -> Result<()>
where
    S: AsyncWrite + Unpin,
    T: serde::Serialize,
{
    let msg_bytes = serde_json::to_vec(msg)?;
    let msg_len = (msg_bytes.len() as u32).to_le_bytes();

    stream.write_all(&msg_len).await?;
    stream.write_all(&msg_bytes).await?;

    Ok(())
}
