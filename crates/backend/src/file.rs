/// A file stored as a message in the bin channel
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileHandle {
    /// Message id inside the bin channel
    pub message_id: i32,
    /// Bot-specific file id used for downloads
    pub file_id: String,
    /// Stable id shared by every bot, used for short link hashes
    pub file_unique_id: String,
    /// Total size in bytes
    pub size: u64,
    /// MIME type reported by Telegram
    pub mime_type: Option<String>,
    /// Original file name
    pub file_name: Option<String>,
}
