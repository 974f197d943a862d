//! Chunked byte streaming over a backend connection

use backend::{BackendError, Client, ConnectionHandle, FileHandle, LoadGuard};
use bytes::Bytes;
use futures::stream::{self, Stream};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;

use crate::range::ByteRange;

/// Default streaming block size (1 MiB)
pub const DEFAULT_CHUNK_SIZE: u64 = 1024 * 1024;

/// One backend fetch and the part of it that belongs to the response
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Block {
    /// Aligned offset the backend is asked for
    pub offset: u64,
    /// Bytes requested from the backend
    pub length: u64,
    /// Leading bytes of the block before the requested range
    pub skip: usize,
    /// Bytes of the block inside the requested range
    pub take: usize,
}

/// Splits a byte range into `chunk_size`-aligned backend fetches
#[derive(Debug, Clone)]
pub struct ChunkPlan {
    next_offset: u64,
    range: ByteRange,
    chunk_size: u64,
    file_size: u64,
}

impl ChunkPlan {
    /// `range` must already be validated against `file_size`
    pub fn new(range: ByteRange, chunk_size: u64, file_size: u64) -> Self {
        let chunk_size = chunk_size.max(1);
        Self {
            next_offset: range.start - range.start % chunk_size,
            range,
            chunk_size,
            file_size,
        }
    }
}

impl Iterator for ChunkPlan {
    type Item = Block;

    fn next(&mut self) -> Option<Block> {
        if self.next_offset > self.range.end || self.next_offset >= self.file_size {
            return None;
        }

        let offset = self.next_offset;
        let length = self.chunk_size.min(self.file_size - offset);
        let first = self.range.start.max(offset);
        let last = self.range.end.min(offset + length - 1);
        self.next_offset = offset.saturating_add(self.chunk_size);

        Some(Block {
            offset,
            length,
            skip: (first - offset) as usize,
            take: (last - first + 1) as usize,
        })
    }
}

/// Run a backend call under `limit`
pub(crate) async fn with_timeout<T>(
    limit: Duration,
    call: impl Future<Output = backend::Result<T>>,
) -> backend::Result<T> {
    timeout(limit, call).await.map_err(|_| BackendError::Timeout {
        secs: limit.as_secs(),
    })?
}

/// Per-connection adapter that resolves files and streams their bytes
pub struct ByteStreamer<C> {
    connection: Arc<ConnectionHandle<C>>,
    fetch_timeout: Duration,
}

struct StreamState<C> {
    guard: LoadGuard<C>,
    file: FileHandle,
    plan: ChunkPlan,
    fetch_timeout: Duration,
    sent: u64,
    total: u64,
}

impl<C> Drop for StreamState<C> {
    fn drop(&mut self) {
        if self.sent < self.total {
            tracing::debug!(
                "Stream of message {} stopped after {}/{} bytes",
                self.file.message_id,
                self.sent,
                self.total
            );
        }
    }
}

impl<C: Client> ByteStreamer<C> {
    pub fn new(connection: Arc<ConnectionHandle<C>>, fetch_timeout: Duration) -> Self {
        Self {
            connection,
            fetch_timeout,
        }
    }

    pub fn connection(&self) -> &Arc<ConnectionHandle<C>> {
        &self.connection
    }

    /// Resolve the file stored under `message_id`
    pub async fn get_file_properties(&self, message_id: i32) -> backend::Result<FileHandle> {
        with_timeout(
            self.fetch_timeout,
            self.connection.client().resolve_file(message_id),
        )
        .await
    }

    /// Lazily stream the bytes of `range`, one backend fetch per chunk
    ///
    /// Nothing is fetched until the stream is polled. The connection's load
    /// counter stays raised until the stream finishes or is dropped; a
    /// dropped stream issues no further fetches. A failed or short fetch
    /// ends the stream with an error.
    pub fn yield_file(
        &self,
        file: FileHandle,
        range: ByteRange,
        chunk_size: u64,
    ) -> impl Stream<Item = Result<Bytes, BackendError>> + Send + 'static {
        let state = StreamState {
            guard: self.connection.acquire(),
            plan: ChunkPlan::new(range, chunk_size, file.size),
            file,
            fetch_timeout: self.fetch_timeout,
            sent: 0,
            total: range.len(),
        };

        stream::try_unfold(state, |mut state| async move {
            let Some(block) = state.plan.next() else {
                return Ok::<_, BackendError>(None);
            };

            let data = with_timeout(
                state.fetch_timeout,
                state
                    .guard
                    .connection()
                    .client()
                    .fetch(&state.file, block.offset, block.length),
            )
            .await?;

            if (data.len() as u64) < block.length {
                return Err(BackendError::ShortRead {
                    offset: block.offset,
                    expected: block.length,
                    actual: data.len() as u64,
                });
            }

            let chunk = data.slice(block.skip..block.skip + block.take);
            state.sent += chunk.len() as u64;
            Ok(Some((chunk, state)))
        })
    }
}
