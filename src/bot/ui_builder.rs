//! UI Builder module for creating keyboards

use std::sync::Arc;
use teloxide::types::{InlineKeyboardButton, InlineKeyboardMarkup, KeyboardButton, KeyboardMarkup};

use super::ui_components::{create_choice_dialog, create_localized_button, create_localized_reply_button};
use super::MenuCommand;
use crate::localization::LocalizationManager;
use crate::quiz::{Direction, Scope, StudyRound};

/// Direction choice shown by /start
pub fn create_start_menu() -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![vec![
        InlineKeyboardButton::callback(Direction::EnRu.label(), Direction::EnRu.callback_data()),
        InlineKeyboardButton::callback(Direction::RuEn.label(), Direction::RuEn.callback_data()),
    ]])
}

/// Dictionary scope choice with a way back to the direction menu
pub fn create_scope_menu(
    localization: &Arc<LocalizationManager>,
    language_code: Option<&str>,
) -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![
        vec![
            create_localized_button(
                localization,
                "button-all-words",
                Scope::AllWords.callback_data(),
                language_code,
            ),
            create_localized_button(
                localization,
                "button-my-words",
                Scope::MyWords.callback_data(),
                language_code,
            ),
        ],
        vec![create_localized_button(
            localization,
            MenuCommand::Back.label_key(),
            "go_back_direction",
            language_code,
        )],
    ])
}

/// Answer options followed by the lesson commands
///
/// Without a round only the commands are shown.
pub fn create_translation_keyboard(
    round: Option<&StudyRound>,
    localization: &Arc<LocalizationManager>,
    language_code: Option<&str>,
) -> KeyboardMarkup {
    let mut rows: Vec<Vec<KeyboardButton>> = round
        .map(|round| {
            round
                .options
                .chunks(2)
                .map(|pair| pair.iter().map(|option| KeyboardButton::new(option.clone())).collect())
                .collect()
        })
        .unwrap_or_default();

    let command = |command: MenuCommand| {
        create_localized_reply_button(localization, command.label_key(), language_code)
    };
    rows.push(vec![command(MenuCommand::AddWord), command(MenuCommand::DeleteWord)]);
    rows.push(vec![command(MenuCommand::NextWord), command(MenuCommand::Back)]);
    rows.push(vec![command(MenuCommand::EndLesson)]);

    KeyboardMarkup::new(rows).resize_keyboard()
}

/// Yes/no for /reset_progress
pub fn create_reset_confirmation_keyboard(
    localization: &Arc<LocalizationManager>,
    language_code: Option<&str>,
) -> InlineKeyboardMarkup {
    create_choice_dialog(
        localization,
        ("button-yes", "confirm"),
        ("button-no", "cancel"),
        language_code,
    )
}

/// Save-as-learned prompt after a correct answer
pub fn create_save_keyboard(
    localization: &Arc<LocalizationManager>,
    language_code: Option<&str>,
) -> InlineKeyboardMarkup {
    create_choice_dialog(
        localization,
        ("button-save", "save"),
        ("button-skip-save", "cancel_save"),
        language_code,
    )
}

/// New lesson or exit after the summary
pub fn create_lesson_end_keyboard(
    localization: &Arc<LocalizationManager>,
    language_code: Option<&str>,
) -> InlineKeyboardMarkup {
    create_choice_dialog(
        localization,
        ("button-new-lesson", "new_lesson"),
        ("button-exit", "exit"),
        language_code,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn localization() -> Arc<LocalizationManager> {
        Arc::new(LocalizationManager::new().unwrap())
    }

    #[test]
    fn test_translation_keyboard_layout() {
        let round = StudyRound::new(
            1,
            2,
            "кот".into(),
            "cat".into(),
            vec!["dog".into(), "house".into(), "tree".into()],
        );
        let keyboard = create_translation_keyboard(Some(&round), &localization(), Some("ru"));

        let texts: Vec<Vec<&str>> = keyboard
            .keyboard
            .iter()
            .map(|row| row.iter().map(|b| b.text.as_str()).collect())
            .collect();

        assert_eq!(texts.len(), 5);
        assert_eq!(texts[0].len() + texts[1].len(), 4);
        assert!(texts[..2].iter().flatten().any(|t| *t == "cat"));
        assert_eq!(texts[2], ["Добавить слово ➕", "Удалить слово ➖"]);
        assert_eq!(texts[4], ["Закончить урок ❌"]);
    }

    #[test]
    fn test_translation_keyboard_without_round() {
        let keyboard = create_translation_keyboard(None, &localization(), Some("en"));
        assert_eq!(keyboard.keyboard.len(), 3);
        assert_eq!(keyboard.keyboard[0][0].text, "Add word ➕");
    }

    #[test]
    fn test_start_and_scope_menus() {
        let start = create_start_menu();
        assert_eq!(start.inline_keyboard[0][0].text, "EN ➡️ RU");

        let scope = create_scope_menu(&localization(), None);
        assert_eq!(scope.inline_keyboard[0][0].text, "Все слова 📚");
        assert_eq!(scope.inline_keyboard[1][0].text, "Назад ↩️");
    }
}
