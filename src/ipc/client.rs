//! Minimal IPC client used to drive the server in tests

use std::path::Path;

use anyhow::{Context, Result};
use tokio::io::AsyncWriteExt;
use tokio::net::UnixStream;

use super::protocol::{Notification, Request, Response};
use super::server::{read_frame, write_frame};

pub struct Client {
    stream: UnixStream,
}

impl Client {
    pub async fn connect(socket_path: &Path) -> Result<Self> {
        let stream = UnixStream::connect(socket_path)
            .await
            .context("failed to connect to daemon socket")?;
        Ok(Self { stream })
    }

    /// Send a request and wait for its response
    pub async fn request(&mut self, request: &Request) -> Result<Response> {
        write_frame(&mut self.stream, request).await?;
        self.response().await
    }

    /// Send an arbitrary body, bypassing request serialization
    pub async fn send_raw(&mut self, body: &[u8]) -> Result<Response> {
        self.stream
            .write_all(&(body.len() as u32).to_le_bytes())
            .await?;
        self.stream.write_all(body).await?;
        self.response().await
    }

    /// Wait for the next push notification on a subscribed connection
    pub async fn notification(&mut self) -> Result<Notification> {
        let body = read_frame(&mut self.stream)
            .await?
            .context("daemon closed the connection")?;
        Ok(serde_json::from_slice(&body)?)
    }

    async fn response(&mut self) -> Result<Response> {
        let body = read_frame(&mut self.stream)
            .await?
            .context("daemon closed the connection")?;
        Ok(serde_json::from_slice(&body)?)
    }
}
