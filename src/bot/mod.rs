//! Bot module for handling Telegram interactions
//!
//! This module is split into several submodules:
//! - `callbacks`: Inline keyboard callback handling (direction, scope, save, reset, lesson end)
//! - `message_handler`: Routes incoming text to continuations, commands, menu labels and answers
//! - `command_handlers`: Slash commands
//! - `dialogue_manager`: Add/delete word continuations
//! - `quiz_flow`: Drawing rounds and reacting to answers
//! - `ui_builder` / `ui_components`: Keyboards and buttons

pub mod callbacks;
pub mod command_handlers;
pub mod dialogue_manager;
pub mod message_handler;
pub mod quiz_flow;
pub mod ui_builder;
pub mod ui_components;

use std::sync::Arc;

use sqlx::postgres::PgPool;
use teloxide::utils::command::BotCommands;
use teloxide::Bot;

use crate::config::QuizConfig;
use crate::localization::{LocalizationManager, SUPPORTED_LANGUAGES};
use crate::session::{QuizSessions, SessionKey};

/// Dependencies shared by every handler
#[derive(Debug, Clone)]
pub struct BotState {
    pub pool: Arc<PgPool>,
    pub localization: Arc<LocalizationManager>,
    pub sessions: Arc<QuizSessions>,
    pub quiz_config: Arc<QuizConfig>,
    /// Bot username used to recognise `/command@bot` forms
    pub bot_username: String,
}

/// Common context for bot handlers containing shared dependencies
#[derive(Debug)]
pub struct HandlerContext<'a> {
    pub bot: &'a Bot,
    pub state: &'a BotState,
    pub language_code: Option<&'a str>,
    pub session_key: SessionKey,
}

impl HandlerContext<'_> {
    pub fn localization(&self) -> &Arc<LocalizationManager> {
        &self.state.localization
    }

    pub fn user_id(&self) -> i64 {
        self.session_key.user_id
    }

    pub fn chat_id(&self) -> teloxide::types::ChatId {
        teloxide::types::ChatId(self.session_key.chat_id)
    }

    pub fn t(&self, key: &str) -> String {
        crate::localization::t_lang(&self.state.localization, key, self.language_code)
    }

    pub fn t_args(&self, key: &str, args: &[(&str, &str)]) -> String {
        crate::localization::t_args_lang(&self.state.localization, key, args, self.language_code)
    }
}

/// Slash commands understood by the bot
#[derive(BotCommands, Clone, Debug, PartialEq, Eq)]
#[command(rename_rule = "snake_case", description = "Команды бота:")]
pub enum Command {
    #[command(description = "начать урок")]
    Start,
    #[command(description = "справка")]
    Help,
    #[command(description = "сбросить выученные слова")]
    ResetProgress,
    #[command(description = "статистика словаря")]
    Stats,
    #[command(description = "отменить ввод слова")]
    Cancel,
}

/// Reply-keyboard buttons shown during a lesson
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MenuCommand {
    AddWord,
    DeleteWord,
    NextWord,
    Back,
    EndLesson,
}

impl MenuCommand {
    pub const ALL: [MenuCommand; 5] = [
        MenuCommand::AddWord,
        MenuCommand::DeleteWord,
        MenuCommand::NextWord,
        MenuCommand::Back,
        MenuCommand::EndLesson,
    ];

    pub fn label_key(self) -> &'static str {
        match self {
            MenuCommand::AddWord => "button-add-word",
            MenuCommand::DeleteWord => "button-delete-word",
            MenuCommand::NextWord => "button-next-word",
            MenuCommand::Back => "button-back",
            MenuCommand::EndLesson => "button-end-lesson",
        }
    }

    /// Match a label exactly, in any supported language
    pub fn from_label(text: &str, localization: &LocalizationManager) -> Option<Self> {
        Self::ALL.into_iter().find(|command| {
            SUPPORTED_LANGUAGES.iter().any(|language| {
                localization.get_message_in_language(command.label_key(), language, None) == text
            })
        })
    }
}

// Re-export main handler functions for use in main.rs
pub use callbacks::callback_handler::callback_handler;
pub use message_handler::message_handler;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_menu_labels_match_every_language() {
        let localization = LocalizationManager::new().unwrap();

        assert_eq!(
            MenuCommand::from_label("Добавить слово ➕", &localization),
            Some(MenuCommand::AddWord)
        );
        assert_eq!(
            MenuCommand::from_label("End lesson ❌", &localization),
            Some(MenuCommand::EndLesson)
        );
        // Emoji is part of the label
        assert_eq!(MenuCommand::from_label("Добавить слово", &localization), None);
        assert_eq!(MenuCommand::from_label("кот", &localization), None);
    }

    #[test]
    fn test_command_parsing() {
        assert_eq!(Command::parse("/start", "vocab_bot").ok(), Some(Command::Start));
        assert_eq!(
            Command::parse("/reset_progress", "vocab_bot").ok(),
            Some(Command::ResetProgress)
        );
        assert_eq!(
            Command::parse("/stats@vocab_bot", "vocab_bot").ok(),
            Some(Command::Stats)
        );
        assert!(Command::parse("/unknown", "vocab_bot").is_err());
    }
}
