//! Common UI Components for Telegram Bot
//!
//! Reusable buttons shared by the keyboards in `ui_builder`.

use std::sync::Arc;
use teloxide::types::{InlineKeyboardButton, InlineKeyboardMarkup, KeyboardButton};

use crate::localization::{t_lang, LocalizationManager};

/// Create a localized inline keyboard button
pub fn create_localized_button(
    localization: &Arc<LocalizationManager>,
    text_key: &str,
    callback_data: &str,
    language_code: Option<&str>,
) -> InlineKeyboardButton {
    InlineKeyboardButton::callback(
        t_lang(localization, text_key, language_code),
        callback_data.to_string(),
    )
}

/// Create a localized reply keyboard button
pub fn create_localized_reply_button(
    localization: &Arc<LocalizationManager>,
    text_key: &str,
    language_code: Option<&str>,
) -> KeyboardButton {
    KeyboardButton::new(t_lang(localization, text_key, language_code))
}

/// Create a two-button dialog on a single row
pub fn create_choice_dialog(
    localization: &Arc<LocalizationManager>,
    (accept_key, accept_callback): (&str, &str),
    (decline_key, decline_callback): (&str, &str),
    language_code: Option<&str>,
) -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![vec![
        create_localized_button(localization, accept_key, accept_callback, language_code),
        create_localized_button(localization, decline_key, decline_callback, language_code),
    ]])
}

#[cfg(test)]
mod tests {
    use super::*;
    use teloxide::types::InlineKeyboardButtonKind;

    #[test]
    fn test_create_localized_button() {
        let localization = Arc::new(LocalizationManager::new().unwrap());

        let button = create_localized_button(&localization, "button-yes", "confirm", Some("en"));

        assert_eq!(button.text, "Yes");
        if let InlineKeyboardButtonKind::CallbackData(data) = &button.kind {
            assert_eq!(data, "confirm");
        } else {
            panic!("Expected callback button");
        }
    }

    #[test]
    fn test_create_choice_dialog() {
        let localization = Arc::new(LocalizationManager::new().unwrap());

        let keyboard = create_choice_dialog(
            &localization,
            ("button-yes", "confirm"),
            ("button-no", "cancel"),
            None,
        );

        let rows = keyboard.inline_keyboard;
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0][0].text, "Да");
        assert_eq!(rows[0][1].text, "Нет");
    }
}
