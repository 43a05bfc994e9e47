//! Shared types for callback handlers

use crate::quiz::{Direction, Scope};

/// Every inline-button payload the bot emits
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallbackAction {
    ChooseDirection(Direction),
    GoBackDirection,
    ChooseScope(Scope),
    ConfirmReset,
    CancelReset,
    Save,
    CancelSave,
    NewLesson,
    Exit,
}

impl CallbackAction {
    /// Parse a callback payload; unknown payloads yield `None`
    pub fn parse(data: &str) -> Option<Self> {
        let action = match data {
            "en_ru_direction" => CallbackAction::ChooseDirection(Direction::EnRu),
            "ru_en_direction" => CallbackAction::ChooseDirection(Direction::RuEn),
            "go_back_direction" => CallbackAction::GoBackDirection,
            "all_words" => CallbackAction::ChooseScope(Scope::AllWords),
            "my_words" => CallbackAction::ChooseScope(Scope::MyWords),
            "confirm" => CallbackAction::ConfirmReset,
            "cancel" => CallbackAction::CancelReset,
            "save" => CallbackAction::Save,
            "cancel_save" => CallbackAction::CancelSave,
            "new_lesson" => CallbackAction::NewLesson,
            "exit" => CallbackAction::Exit,
            _ => return None,
        };
        Some(action)
    }

    /// Metric label for the action
    pub fn name(self) -> &'static str {
        match self {
            CallbackAction::ChooseDirection(_) => "choose_direction",
            CallbackAction::GoBackDirection => "go_back_direction",
            CallbackAction::ChooseScope(_) => "choose_scope",
            CallbackAction::ConfirmReset => "confirm_reset",
            CallbackAction::CancelReset => "cancel_reset",
            CallbackAction::Save => "save",
            CallbackAction::CancelSave => "cancel_save",
            CallbackAction::NewLesson => "new_lesson",
            CallbackAction::Exit => "exit",
        }
    }
}

/// How the callback query itself is answered
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CallbackAnswer {
    pub text: Option<String>,
    pub show_alert: bool,
}

impl CallbackAnswer {
    /// Only stop the button's loading indicator
    pub fn silent() -> Self {
        Self::default()
    }

    /// Short toast shown over the chat
    pub fn notice(text: String) -> Self {
        Self {
            text: Some(text),
            show_alert: false,
        }
    }

    /// Modal alert the user has to dismiss
    pub fn alert(text: String) -> Self {
        Self {
            text: Some(text),
            show_alert: true,
        }
    }
}
