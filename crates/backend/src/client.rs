//! The capability every backend connection exposes to the streamer

use bytes::Bytes;
use std::future::Future;

use crate::error::Result;
use crate::file::FileHandle;

/// One authenticated session against the backend
///
/// Implementations are shared by many in-flight requests at once, so every
/// method takes `&self`.
pub trait Client: Send + Sync + 'static {
    /// Cheap round trip used to estimate this connection's latency
    fn ping(&self) -> impl Future<Output = Result<()>> + Send;

    /// Look up the file stored under `message_id`
    ///
    /// Fails with [`BackendError::NotFound`](crate::BackendError::NotFound)
    /// when no such message or media exists.
    fn resolve_file(&self, message_id: i32) -> impl Future<Output = Result<FileHandle>> + Send;

    /// Fetch exactly `length` bytes starting at `offset`
    ///
    /// Implementations return an error instead of a short buffer.
    fn fetch(
        &self,
        file: &FileHandle,
        offset: u64,
        length: u64,
    ) -> impl Future<Output = Result<Bytes>> + Send;
}
