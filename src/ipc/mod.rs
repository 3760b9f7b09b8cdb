//! IPC module for daemon-UI communication

#[cfg(test)]
mod client;
mod protocol;
mod server;

pub use server::Server;
