//! Constants used throughout the telegram bot

/// Emoji constants for consistent UI
pub mod emoji {
    pub const ERROR: &str = "❌";
    pub const LINK: &str = "🔗";
    pub const WAVE: &str = "👋";
}

/// Label of the inline button opening a stream link
pub const OPEN_BUTTON_LABEL: &str = "Open";

/// Fallback name used in links for files sent without one
pub const DEFAULT_FILE_NAME: &str = "file";
