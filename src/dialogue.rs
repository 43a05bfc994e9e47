//! Word dialogue module for multi-step add/delete conversations.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use teloxide::dispatching::dialogue::{Dialogue, InMemStorage};

/// Represents the pending continuation of an add/delete flow
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub enum WordDialogueState {
    #[default]
    Idle,
    WaitingForRussianWord {
        user_id: i64,
        started_at: DateTime<Utc>,
    },
    WaitingForEnglishWord {
        user_id: i64,
        russian_word: String,
        started_at: DateTime<Utc>,
    },
    WaitingForWordToDelete {
        user_id: i64,
        started_at: DateTime<Utc>,
    },
}

/// How an incoming message relates to the pending continuation
#[derive(Clone, Debug, PartialEq)]
pub enum Continuation {
    /// Nothing pending, or pending for another user in this chat
    None,
    /// The continuation is too old and should be dropped
    Expired,
    /// The message should resume the flow
    Resume(WordDialogueState),
}

impl WordDialogueState {
    /// User the continuation belongs to
    pub fn owner(&self) -> Option<i64> {
        match self {
            WordDialogueState::Idle => None,
            WordDialogueState::WaitingForRussianWord { user_id, .. }
            | WordDialogueState::WaitingForEnglishWord { user_id, .. }
            | WordDialogueState::WaitingForWordToDelete { user_id, .. } => Some(*user_id),
        }
    }

    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        match self {
            WordDialogueState::Idle => None,
            WordDialogueState::WaitingForRussianWord { started_at, .. }
            | WordDialogueState::WaitingForEnglishWord { started_at, .. }
            | WordDialogueState::WaitingForWordToDelete { started_at, .. } => Some(*started_at),
        }
    }

    /// Decide whether a message from `user_id` at `now` resumes this state
    pub fn continuation_for(&self, user_id: i64, now: DateTime<Utc>, timeout: Duration) -> Continuation {
        match (self.owner(), self.started_at()) {
            (Some(owner), Some(started_at)) if owner == user_id => {
                if now - started_at > timeout {
                    Continuation::Expired
                } else {
                    Continuation::Resume(self.clone())
                }
            }
            _ => Continuation::None,
        }
    }
}

/// Type alias for our word dialogue
pub type WordDialogue = Dialogue<WordDialogueState, InMemStorage<WordDialogueState>>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_continuation_only_for_owner() {
        let now = Utc::now();
        let state = WordDialogueState::WaitingForRussianWord {
            user_id: 7,
            started_at: now,
        };

        assert_eq!(
            state.continuation_for(7, now, Duration::seconds(300)),
            Continuation::Resume(state.clone())
        );
        assert_eq!(
            state.continuation_for(8, now, Duration::seconds(300)),
            Continuation::None
        );
    }

    #[test]
    fn test_continuation_expires() {
        let started_at = Utc::now() - Duration::seconds(301);
        let state = WordDialogueState::WaitingForWordToDelete {
            user_id: 1,
            started_at,
        };

        assert_eq!(
            state.continuation_for(1, Utc::now(), Duration::seconds(300)),
            Continuation::Expired
        );
    }

    #[test]
    fn test_idle_has_no_continuation() {
        let state = WordDialogueState::default();
        assert_eq!(state.owner(), None);
        assert_eq!(
            state.continuation_for(1, Utc::now(), Duration::seconds(300)),
            Continuation::None
        );
    }
}
