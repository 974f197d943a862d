use crate::commands;
use crate::types::{Command, HandlerResult};
use teloxide::{dispatching::UpdateHandler, prelude::*, utils::command::BotCommands};

pub use crate::types::LinkSettings;

/// Register bot commands in Telegram menu
pub async fn set_bot_commands(bot: &Bot) -> Result<(), teloxide::RequestError> {
    bot.set_my_commands(Command::bot_commands()).await?;
    Ok(())
}

/// Private chats only, carrying a document or a video
fn is_streamable_upload(msg: &Message) -> bool {
    msg.chat.is_private() && (msg.document().is_some() || msg.video().is_some())
}

pub fn schema() -> UpdateHandler<Box<dyn std::error::Error + Send + Sync + 'static>> {
    use dptree::case;

    let command_handler = teloxide::filter_command::<Command, _>()
        .branch(case![Command::Start].endpoint(commands::start))
        .branch(case![Command::Help].endpoint(commands::help));

    let media_handler =
        dptree::filter(|msg: Message| is_streamable_upload(&msg)).endpoint(commands::media_receive);

    Update::filter_message()
        .branch(command_handler)
        .branch(media_handler)
        .branch(dptree::endpoint(ignore))
}

async fn ignore(msg: Message) -> HandlerResult {
    tracing::debug!("Ignoring message {} in chat {}", msg.id.0, msg.chat.id);
    Ok(())
}
