//! HTTP file server for streaming Telegram files
//!
//! This crate serves files stored in the bin channel over HTTP with range
//! request support, balancing requests across a pool of bot connections.

mod balancer;
mod cache;
mod link;
mod range;
mod server;
mod state;
mod streamer;
mod utils;

#[cfg(test)]
mod testing;

pub use balancer::{probe, select_connection};
pub use cache::{AdapterCache, DEFAULT_CACHE_LIMIT};
pub use link::{parse_stream_path, public_base_url, short_hash, short_link, stream_link, StreamPath};
pub use range::{parse_range, ByteRange, RangeError};
pub use server::FileServerApi;
pub use state::{ServerState, StreamSettings};
pub use streamer::{Block, ByteStreamer, ChunkPlan, DEFAULT_CHUNK_SIZE};
pub use utils::format_uptime;

/// Result type alias for file server operations
pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;
