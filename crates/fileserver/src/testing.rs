//! In-memory backend used by the unit tests

use backend::{BackendError, Client, FileHandle};
use bytes::Bytes;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

#[derive(Clone, Default)]
pub(crate) struct MemoryClient {
    files: Arc<HashMap<i32, (FileHandle, Bytes)>>,
    latency: Duration,
    ping_fails: bool,
    fail_fetch_from: Option<u64>,
    truncate: bool,
    fetches: Arc<AtomicUsize>,
}

impl MemoryClient {
    pub(crate) fn empty() -> Self {
        Self::default()
    }

    pub(crate) fn with_file(
        mut self,
        message_id: i32,
        mime_type: Option<&str>,
        file_name: Option<&str>,
        data: impl Into<Bytes>,
    ) -> Self {
        let data = data.into();
        let handle = FileHandle {
            message_id,
            file_id: format!("file-{}", message_id),
            file_unique_id: format!("uniq{:02}xyz", message_id % 100),
            size: data.len() as u64,
            mime_type: mime_type.map(str::to_string),
            file_name: file_name.map(str::to_string),
        };
        Arc::make_mut(&mut self.files).insert(message_id, (handle, data));
        self
    }

    pub(crate) fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    pub(crate) fn failing_ping(mut self) -> Self {
        self.ping_fails = true;
        self
    }

    /// Fail every fetch whose block starts at or after `offset`
    pub(crate) fn failing_fetch_from(mut self, offset: u64) -> Self {
        self.fail_fetch_from = Some(offset);
        self
    }

    /// Return one byte less than asked for
    pub(crate) fn truncating(mut self) -> Self {
        self.truncate = true;
        self
    }

    /// Number of fetch calls served so far
    pub(crate) fn fetches(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

impl Client for MemoryClient {
    async fn ping(&self) -> backend::Result<()> {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        if self.ping_fails {
            return Err(BackendError::Status { status: 503 });
        }
        Ok(())
    }

    async fn resolve_file(&self, message_id: i32) -> backend::Result<FileHandle> {
        self.files
            .get(&message_id)
            .map(|(handle, _)| handle.clone())
            .ok_or(BackendError::NotFound { message_id })
    }

    async fn fetch(&self, file: &FileHandle, offset: u64, length: u64) -> backend::Result<Bytes> {
        self.fetches.fetch_add(1, Ordering::SeqCst);

        if matches!(self.fail_fetch_from, Some(from) if offset >= from) {
            return Err(BackendError::Status { status: 500 });
        }

        let (_, data) = self
            .files
            .get(&file.message_id)
            .ok_or(BackendError::NotFound {
                message_id: file.message_id,
            })?;

        let start = (offset as usize).min(data.len());
        let mut end = ((offset + length) as usize).min(data.len());
        if self.truncate && end > start {
            end -= 1;
        }
        Ok(data.slice(start..end))
    }
}

/// Deterministic test payload: byte `i` is `i % 251`
pub(crate) fn payload(len: usize) -> Vec<u8> {
    (0..len).map(|i| (i % 251) as u8).collect()
}
