//! Media handler turning received files into stream links

use crate::constants::{emoji, DEFAULT_FILE_NAME};
use crate::keyboards;
use crate::types::{HandlerResult, LinkSettings};
use backend::{file_from_message, FileHandle, TelegramClient};
use teloxide::{prelude::*, types::ParseMode, utils::html};

/// Accepts a document or video, stores it in the bin channel and replies
/// with its links
pub async fn media_receive(
    bot: Bot,
    msg: Message,
    client: TelegramClient,
    links: LinkSettings,
) -> HandlerResult {
    let stored = match bot
        .forward_message(links.bin_channel, msg.chat.id, msg.id)
        .await
    {
        Ok(stored) => stored,
        Err(err) => {
            tracing::error!("Failed to forward message {} to bin channel: {}", msg.id.0, err);
            bot.send_message(
                msg.chat.id,
                format!("{} Could not store this file, try again later.", emoji::ERROR),
            )
            .reply_to_message_id(msg.id)
            .await?;
            return Ok(());
        }
    };

    let Some(file) = file_from_message(&stored) else {
        tracing::warn!("Forwarded message {} carries no media", stored.id.0);
        bot.send_message(
            msg.chat.id,
            format!("{} This message has no file I can stream.", emoji::ERROR),
        )
        .reply_to_message_id(msg.id)
        .await?;
        return Ok(());
    };

    let (stream, short) = build_links(&links.base_url, &file);
    client.register_file(file);

    tracing::info!(
        "Stored message {} from chat {} as {}",
        msg.id.0,
        msg.chat.id,
        stored.id.0
    );

    let mut reply = bot
        .send_message(msg.chat.id, link_message(&stream, &short))
        .parse_mode(ParseMode::Html)
        .reply_to_message_id(msg.id);

    if links.show_button {
        if let Some(keyboard) = keyboards::open_link_keyboard(&stream) {
            reply = reply.reply_markup(keyboard);
        }
    }

    reply.await?;
    Ok(())
}

/// Long and short links for a stored file
pub fn build_links(base_url: &str, file: &FileHandle) -> (String, String) {
    let name = file
        .file_name
        .clone()
        .unwrap_or_else(|| format!("{}_{}", DEFAULT_FILE_NAME, file.message_id));
    let stream = fileserver::stream_link(base_url, file.message_id, &name);
    let hash = fileserver::short_hash(&file.file_unique_id);
    let short = fileserver::short_link(base_url, &hash, file.message_id);
    (stream, short)
}

/// HTML reply body carrying both links
pub fn link_message(stream: &str, short: &str) -> String {
    format!(
        "{} <code>{}</code>\n(<a href='{}'>Shortlink</a>)",
        emoji::LINK,
        html::escape(stream),
        html::escape(short)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn handle(name: Option<&str>) -> FileHandle {
        FileHandle {
            message_id: 42,
            file_id: "BQACAgQAAxkBAAIB".to_string(),
            file_unique_id: "AgADxyzQ1234".to_string(),
            size: 1024,
            mime_type: Some("video/mp4".to_string()),
            file_name: name.map(str::to_string),
        }
    }

    #[test]
    fn test_build_links() {
        let (stream, short) = build_links("https://files.example.com/", &handle(Some("my clip.mp4")));
        assert_eq!(stream, "https://files.example.com/42/my%20clip.mp4");
        assert_eq!(short, "https://files.example.com/AgADxy42");
    }

    #[test]
    fn test_build_links_without_name() {
        let (stream, _) = build_links("http://0.0.0.0:8080/", &handle(None));
        assert_eq!(stream, "http://0.0.0.0:8080/42/file_42");
    }

    #[test]
    fn test_link_message_escapes_html() {
        let body = link_message("http://host/1/a&b", "http://host/abcdef1");
        assert!(body.contains("<code>http://host/1/a&amp;b</code>"));
        assert!(body.contains("<a href='http://host/abcdef1'>Shortlink</a>"));
    }
}
