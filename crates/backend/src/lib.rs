//! Telegram backend client wrapper
//!
//! This crate provides the file-source side of the streamer: the [`Client`]
//! capability consumed by the HTTP server, the connection pool with per-bot
//! load counters, and a Bot API implementation backed by teloxide.

pub mod client;
pub mod error;
pub mod file;
pub mod pool;
pub mod registry;
pub mod telegram;

pub use client::Client;
pub use error::{BackendError, Result};
pub use file::FileHandle;
pub use pool::{ClientPool, ConnectionHandle, LoadGuard};
pub use registry::Registry;
pub use telegram::{file_from_message, TelegramClient};
