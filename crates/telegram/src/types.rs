use teloxide::{macros::BotCommands, types::ChatId};

/// Type alias for handler result types
pub type HandlerResult = Result<(), Box<dyn std::error::Error + Send + Sync>>;

/// Available bot commands
#[derive(BotCommands, Clone)]
#[command(
    rename_rule = "lowercase",
    description = "These commands are supported:"
)]
pub enum Command {
    #[command(description = "Start the bot")]
    Start,
    #[command(description = "Display help information")]
    Help,
}

/// Where files are stored and how links to them are built
#[derive(Debug, Clone)]
pub struct LinkSettings {
    /// Public base URL of the file server, ending in `/`
    pub base_url: String,
    /// Channel every received file is forwarded to
    pub bin_channel: ChatId,
    /// Attach an "Open" button to link replies
    pub show_button: bool,
}

impl LinkSettings {
    /// The button is hidden when the server is only reachable on its bind
    /// address, since Telegram rejects buttons pointing at such hosts.
    pub fn new(base_url: String, bin_channel: ChatId, fqdn: &str, bind_address: &str) -> Self {
        Self {
            base_url,
            bin_channel,
            show_button: fqdn != bind_address,
        }
    }
}
