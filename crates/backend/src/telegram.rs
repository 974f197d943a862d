//! Bot API implementation of [`Client`]
//!
//! Files live as messages in a private "bin" channel that every bot in the
//! pool is an admin of. Metadata is recovered by forwarding the message back
//! into the channel; bytes are downloaded from the Bot API file endpoint with
//! an HTTP `Range` header.

use bytes::{Bytes, BytesMut};
use chrono::Duration;
use reqwest::{header, StatusCode};
use teloxide::prelude::*;
use teloxide::types::MessageId;
use teloxide::{ApiError, RequestError};

use crate::client::Client;
use crate::error::{BackendError, Result};
use crate::file::FileHandle;
use crate::registry::Registry;

/// How long resolved metadata and download paths are reused
const REGISTRY_TTL_MINUTES: i64 = 60;

/// One bot session against the Telegram Bot API
#[derive(Clone)]
pub struct TelegramClient {
    bot: Bot,
    http: reqwest::Client,
    bin_channel: ChatId,
    files: Registry<i32, FileHandle>,
    paths: Registry<String, String>,
}

impl TelegramClient {
    /// Create a client for `bot` reading files from `bin_channel`
    pub fn new(bot: Bot, bin_channel: ChatId) -> Self {
        let ttl = Duration::minutes(REGISTRY_TTL_MINUTES);
        Self {
            bot,
            http: reqwest::Client::new(),
            bin_channel,
            files: Registry::new(ttl),
            paths: Registry::new(ttl),
        }
    }

    pub fn bot(&self) -> &Bot {
        &self.bot
    }

    pub fn bin_channel(&self) -> ChatId {
        self.bin_channel
    }

    /// Remember a file this bot has just seen, skipping the lookup later
    pub fn register_file(&self, file: FileHandle) {
        self.files.register(file.message_id, file);
    }

    /// Drop expired metadata and download paths
    pub fn cleanup(&self) -> usize {
        self.files.cleanup() + self.paths.cleanup()
    }

    /// Fetch a message's media by forwarding it inside the bin channel
    async fn lookup_file(&self, message_id: i32) -> Result<FileHandle> {
        tracing::debug!("Looking up message {} in bin channel", message_id);

        let forwarded = self
            .bot
            .forward_message(self.bin_channel, self.bin_channel, MessageId(message_id))
            .await
            .map_err(|e| match e {
                RequestError::Api(ApiError::MessageToForwardNotFound)
                | RequestError::Api(ApiError::MessageIdInvalid) => {
                    BackendError::NotFound { message_id }
                }
                other => BackendError::Request(other),
            })?;

        if let Err(e) = self.bot.delete_message(self.bin_channel, forwarded.id).await {
            tracing::warn!("Failed to delete lookup copy of message {}: {}", message_id, e);
        }

        let mut file =
            file_from_message(&forwarded).ok_or(BackendError::NotFound { message_id })?;
        file.message_id = message_id;
        Ok(file)
    }

    /// Resolve the Bot API download path for a file id
    async fn download_path(&self, file_id: &str) -> Result<String> {
        if let Some(path) = self.paths.get(&file_id.to_string()) {
            return Ok(path);
        }

        let file = self.bot.get_file(file_id).await?;
        self.paths.register(file_id.to_string(), file.path.clone());
        Ok(file.path)
    }

    fn file_url(&self, path: &str) -> String {
        let api_url = self.bot.api_url();
        format!(
            "{}/file/bot{}/{}",
            api_url.as_str().trim_end_matches('/'),
            self.bot.token(),
            path
        )
    }
}

impl Client for TelegramClient {
    async fn ping(&self) -> Result<()> {
        self.bot.get_me().await?;
        Ok(())
    }

    async fn resolve_file(&self, message_id: i32) -> Result<FileHandle> {
        if let Some(file) = self.files.get(&message_id) {
            return Ok(file);
        }

        let file = self.lookup_file(message_id).await?;
        self.files.register(message_id, file.clone());
        Ok(file)
    }

    async fn fetch(&self, file: &FileHandle, offset: u64, length: u64) -> Result<Bytes> {
        if length == 0 {
            return Ok(Bytes::new());
        }

        let path = self.download_path(&file.file_id).await?;
        let end = offset + length - 1;

        let response = self
            .http
            .get(self.file_url(&path))
            .header(header::RANGE, format!("bytes={}-{}", offset, end))
            .send()
            .await?;

        let status = response.status();
        let body = match status {
            StatusCode::PARTIAL_CONTENT => response.bytes().await?,
            // server ignored the range, cut it out ourselves
            StatusCode::OK => read_window(response, offset, length).await?,
            StatusCode::NOT_FOUND => {
                self.paths.remove(&file.file_id);
                return Err(BackendError::Status {
                    status: status.as_u16(),
                });
            }
            _ => {
                return Err(BackendError::Status {
                    status: status.as_u16(),
                })
            }
        };

        if body.len() as u64 != length {
            return Err(BackendError::ShortRead {
                offset,
                expected: length,
                actual: body.len() as u64,
            });
        }

        Ok(body)
    }
}

/// Read `offset..offset + length` out of a full-file body, stopping once the
/// window is filled
async fn read_window(mut response: reqwest::Response, offset: u64, length: u64) -> Result<Bytes> {
    let mut skipped = 0u64;
    let mut window = BytesMut::with_capacity(length as usize);

    while (window.len() as u64) < length {
        let Some(mut chunk) = response.chunk().await? else {
            break;
        };
        if skipped < offset {
            let skip = (offset - skipped).min(chunk.len() as u64);
            skipped += skip;
            chunk = chunk.slice(skip as usize..);
        }
        let wanted = (length - window.len() as u64).min(chunk.len() as u64) as usize;
        window.extend_from_slice(&chunk[..wanted]);
    }

    Ok(window.freeze())
}

/// Extract the streamable file carried by a message, if any
pub fn file_from_message(msg: &Message) -> Option<FileHandle> {
    let (meta, mime_type, file_name) = if let Some(doc) = msg.document() {
        (&doc.file, doc.mime_type.as_ref(), doc.file_name.clone())
    } else if let Some(video) = msg.video() {
        (&video.file, video.mime_type.as_ref(), video.file_name.clone())
    } else if let Some(audio) = msg.audio() {
        (&audio.file, audio.mime_type.as_ref(), audio.file_name.clone())
    } else if let Some(animation) = msg.animation() {
        (
            &animation.file,
            animation.mime_type.as_ref(),
            animation.file_name.clone(),
        )
    } else if let Some(voice) = msg.voice() {
        (&voice.file, voice.mime_type.as_ref(), None)
    } else {
        return None;
    };

    Some(FileHandle {
        message_id: msg.id.0,
        file_id: meta.id.clone(),
        file_unique_id: meta.unique_id.clone(),
        size: u64::from(meta.size),
        mime_type: mime_type.map(|m| m.to_string()),
        file_name,
    })
}
