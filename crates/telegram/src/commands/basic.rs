//! Basic bot commands (start, help)

use crate::constants::emoji;
use crate::types::{Command, HandlerResult};
use teloxide::{prelude::*, utils::command::BotCommands};

/// Welcome message when user starts the bot
pub async fn start(bot: Bot, msg: Message) -> HandlerResult {
    let welcome_text = format!(
        "{} Hi! Send me a video or a document and I will reply with a link \
        you can stream or download it from.\n\n\
        Links support seeking, so they work in VLC, MX Player and browsers.",
        emoji::WAVE
    );

    bot.send_message(msg.chat.id, welcome_text).await?;
    Ok(())
}

/// Display help message with available commands
pub async fn help(bot: Bot, msg: Message) -> HandlerResult {
    bot.send_message(msg.chat.id, Command::descriptions().to_string())
        .await?;
    Ok(())
}
