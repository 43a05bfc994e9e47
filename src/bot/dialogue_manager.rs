//! Dialogue Manager module for the multi-step add/delete word flows

use anyhow::Result;
use chrono::Utc;
use teloxide::prelude::*;
use teloxide::types::KeyboardRemove;
use tracing::{debug, info};

use super::ui_builder::create_translation_keyboard;
use super::HandlerContext;
use crate::db::{self, DeleteOutcome, InsertOutcome, Language};
use crate::dialogue::{WordDialogue, WordDialogueState};
use crate::errors::error_logging;
use crate::observability::record_dictionary_change;
use crate::validation::{validate_any_word, validate_word};

/// Ask for the Russian half of a new pair
pub async fn begin_add_word(ctx: &HandlerContext<'_>, dialogue: &WordDialogue) -> Result<()> {
    dialogue
        .update(WordDialogueState::WaitingForRussianWord {
            user_id: ctx.user_id(),
            started_at: Utc::now(),
        })
        .await?;

    ctx.bot
        .send_message(ctx.chat_id(), ctx.t("add-enter-russian"))
        .reply_markup(KeyboardRemove::new())
        .await?;
    Ok(())
}

/// Ask for the word to delete
pub async fn begin_delete_word(ctx: &HandlerContext<'_>, dialogue: &WordDialogue) -> Result<()> {
    dialogue
        .update(WordDialogueState::WaitingForWordToDelete {
            user_id: ctx.user_id(),
            started_at: Utc::now(),
        })
        .await?;

    ctx.bot
        .send_message(ctx.chat_id(), ctx.t("delete-enter-word"))
        .reply_markup(KeyboardRemove::new())
        .await?;
    Ok(())
}

/// Drop a pending flow because the user sent a command or menu label instead
pub async fn cancel_interrupted(ctx: &HandlerContext<'_>, dialogue: &WordDialogue) -> Result<()> {
    debug!(user_id = %ctx.user_id(), "Pending word input interrupted");
    dialogue.exit().await?;
    ctx.bot
        .send_message(ctx.chat_id(), ctx.t("continuation-cancelled"))
        .await?;
    Ok(())
}

/// Resume a pending flow with the user's message
pub async fn resume(
    ctx: &HandlerContext<'_>,
    dialogue: &WordDialogue,
    state: WordDialogueState,
    text: &str,
) -> Result<()> {
    match state {
        WordDialogueState::WaitingForRussianWord { user_id, started_at } => {
            let russian_word = match validate_word(text, Language::Russian) {
                Ok(word) => word,
                Err(key) => return reject_input(ctx, key, "russian_word", text, "add-enter-russian").await,
            };

            dialogue
                .update(WordDialogueState::WaitingForEnglishWord {
                    user_id,
                    russian_word,
                    started_at,
                })
                .await?;
            ctx.bot
                .send_message(ctx.chat_id(), ctx.t("add-enter-english"))
                .await?;
            Ok(())
        }
        WordDialogueState::WaitingForEnglishWord { russian_word, .. } => {
            let english_word = match validate_word(text, Language::English) {
                Ok(word) => word,
                Err(key) => return reject_input(ctx, key, "english_word", text, "add-enter-english").await,
            };

            dialogue.exit().await?;
            let reply = add_pair(ctx, &russian_word, &english_word).await;
            finish_flow(ctx, reply).await
        }
        WordDialogueState::WaitingForWordToDelete { .. } => {
            let word = match validate_any_word(text) {
                Ok(word) => word,
                Err(key) => return reject_input(ctx, key, "word_to_delete", text, "delete-enter-word").await,
            };

            dialogue.exit().await?;
            let reply = delete_word(ctx, &word).await;
            finish_flow(ctx, reply).await
        }
        WordDialogueState::Idle => Ok(()),
    }
}

/// Explain what was wrong and ask again; the continuation stays pending
async fn reject_input(
    ctx: &HandlerContext<'_>,
    error_key: &'static str,
    input_type: &str,
    input: &str,
    prompt_key: &str,
) -> Result<()> {
    error_logging::log_validation_error(
        &error_key,
        "word_input",
        Some(ctx.user_id()),
        input_type,
        Some(input),
    );
    ctx.bot
        .send_message(
            ctx.chat_id(),
            format!("{}\n{}", ctx.t(error_key), ctx.t(prompt_key)),
        )
        .await?;
    Ok(())
}

async fn add_pair(ctx: &HandlerContext<'_>, russian: &str, english: &str) -> String {
    let args = [("russian", russian), ("english", english)];

    match db::add_word_pair(&ctx.state.pool, ctx.user_id(), russian, english).await {
        Ok(InsertOutcome::Created(_)) => {
            record_dictionary_change("added", 1);
            info!(user_id = %ctx.user_id(), "Word pair added");
            ctx.t_args("add-success", &args)
        }
        Ok(InsertOutcome::AlreadyExists) => ctx.t_args("add-exists", &args),
        Ok(InsertOutcome::Rejected) => ctx.t("add-rejected"),
        Err(e) => {
            error_logging::log_database_error(
                &e,
                "add_word_pair",
                Some(ctx.user_id()),
                Some(&[
                    ("russian", &russian as &dyn std::fmt::Display),
                    ("english", &english as &dyn std::fmt::Display),
                ]),
            );
            ctx.t_args("error-generic", &[("details", &e.to_string())])
        }
    }
}

async fn delete_word(ctx: &HandlerContext<'_>, word: &str) -> String {
    match db::delete_word_by_text(&ctx.state.pool, word).await {
        Ok(DeleteOutcome::Deleted {
            removed_translations,
            ..
        }) => {
            record_dictionary_change("deleted", 1 + removed_translations.len() as u64);
            ctx.t_args("delete-success", &[("word", word)])
        }
        Ok(DeleteOutcome::NotFound) => ctx.t_args("delete-not-found", &[("word", word)]),
        Err(e) => {
            error_logging::log_database_error(
                &e,
                "delete_word_by_text",
                Some(ctx.user_id()),
                Some(&[("word", &word as &dyn std::fmt::Display)]),
            );
            ctx.t_args("error-generic", &[("details", &e.to_string())])
        }
    }
}

/// Report the outcome and bring the lesson keyboard back
async fn finish_flow(ctx: &HandlerContext<'_>, reply: String) -> Result<()> {
    ctx.bot.send_message(ctx.chat_id(), reply).await?;

    let current = ctx
        .state
        .sessions
        .with_existing(ctx.session_key, |s| s.current_round().cloned())
        .flatten();
    ctx.bot
        .send_message(ctx.chat_id(), ctx.t("next-action"))
        .reply_markup(create_translation_keyboard(
            current.as_ref(),
            ctx.localization(),
            ctx.language_code,
        ))
        .await?;
    Ok(())
}
