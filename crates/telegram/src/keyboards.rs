//! Inline keyboard builders

use teloxide::types::{InlineKeyboardButton, InlineKeyboardMarkup};
use url::Url;

use crate::constants::OPEN_BUTTON_LABEL;

/// Single-button keyboard opening `link`
///
/// # Returns
/// `None` if `link` is not a valid absolute URL
pub fn open_link_keyboard(link: &str) -> Option<InlineKeyboardMarkup> {
    let url = Url::parse(link).ok()?;
    Some(InlineKeyboardMarkup::new(vec![vec![
        InlineKeyboardButton::url(OPEN_BUTTON_LABEL, url),
    ]]))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_link_keyboard() {
        let keyboard = open_link_keyboard("https://files.example.com/42/clip.mp4").unwrap();
        assert_eq!(keyboard.inline_keyboard.len(), 1);
        assert_eq!(keyboard.inline_keyboard[0].len(), 1);
        assert_eq!(keyboard.inline_keyboard[0][0].text, OPEN_BUTTON_LABEL);
    }

    #[test]
    fn test_invalid_link_has_no_keyboard() {
        assert!(open_link_keyboard("not a url").is_none());
    }
}
