//! Lesson navigation callbacks: direction, scope, save prompt and lesson end

use anyhow::Result;
use teloxide::prelude::*;
use teloxide::types::{KeyboardRemove, MessageId};
use tracing::{debug, info, warn};

use super::callback_types::CallbackAnswer;
use crate::bot::quiz_flow::{draw_round, send_round, RoundDraw};
use crate::bot::ui_builder::{create_scope_menu, create_start_menu, create_translation_keyboard};
use crate::bot::HandlerContext;
use crate::db::{self, InsertOutcome};
use crate::observability::record_dictionary_change;
use crate::quiz::{Direction, Scope};

/// Record the direction and offer the scope menu
pub async fn handle_direction(
    ctx: &HandlerContext<'_>,
    message_id: MessageId,
    direction: Direction,
) -> Result<CallbackAnswer> {
    ctx.state
        .sessions
        .with_session(ctx.session_key, |s| s.choose_direction(direction));
    debug!(user_id = %ctx.user_id(), ?direction, "Direction chosen");

    ctx.bot
        .edit_message_text(
            ctx.chat_id(),
            message_id,
            ctx.t_args("direction-chosen", &[("direction", direction.label())]),
        )
        .reply_markup(create_scope_menu(ctx.localization(), ctx.language_code))
        .await?;
    Ok(CallbackAnswer::silent())
}

/// Return from the scope menu to the direction menu
pub async fn handle_go_back(ctx: &HandlerContext<'_>, message_id: MessageId) -> Result<CallbackAnswer> {
    ctx.state.sessions.with_session(ctx.session_key, |s| s.go_back());

    ctx.bot
        .edit_message_text(ctx.chat_id(), message_id, ctx.t("start-prompt"))
        .reply_markup(create_start_menu())
        .await?;
    Ok(CallbackAnswer::silent())
}

/// Draw the first round of the lesson from the chosen dictionary
pub async fn handle_scope(
    ctx: &HandlerContext<'_>,
    message_id: MessageId,
    scope: Scope,
) -> Result<CallbackAnswer> {
    if db::get_or_create_user(&ctx.state.pool, ctx.user_id()).await?.is_none() {
        return Ok(CallbackAnswer::alert(ctx.t("user-create-failed")));
    }

    match draw_round(ctx, scope).await? {
        (RoundDraw::Shown, Some(round)) => {
            send_round(ctx, &round, Some(message_id)).await?;
            Ok(CallbackAnswer::silent())
        }
        (RoundDraw::NoLesson, _) => Ok(CallbackAnswer::alert(ctx.t("quiz-no-active-lesson"))),
        _ => Ok(CallbackAnswer::alert(ctx.t("insufficient-words"))),
    }
}

/// Persist the answered pair as learned
pub async fn handle_save(ctx: &HandlerContext<'_>, message_id: MessageId) -> Result<CallbackAnswer> {
    let pending = ctx
        .state
        .sessions
        .with_existing(ctx.session_key, |s| s.pending_save())
        .flatten();

    let Some((russian_word_id, english_word_id)) = pending else {
        return Ok(CallbackAnswer::notice(ctx.t("quiz-no-active-lesson")));
    };

    let pool = &ctx.state.pool;
    let Some(user) = db::get_or_create_user(pool, ctx.user_id()).await? else {
        return Ok(CallbackAnswer::alert(ctx.t("user-create-failed")));
    };

    let outcome = db::save_learned(pool, russian_word_id, english_word_id, user.id).await?;

    let reply_key = match outcome {
        InsertOutcome::Created(_) => {
            record_dictionary_change("learned", 1);
            info!(user_id = %user.id, russian_word_id, english_word_id, "Word saved as learned");
            "quiz-saved"
        }
        InsertOutcome::AlreadyExists => "quiz-already-learned",
        InsertOutcome::Rejected => {
            warn!(user_id = %user.id, russian_word_id, english_word_id, "Learned marker rejected");
            "quiz-save-rejected"
        }
    };

    ctx.state
        .sessions
        .with_existing(ctx.session_key, |s| s.finish_save());
    finish_save_prompt(ctx, message_id, reply_key).await?;
    Ok(CallbackAnswer::silent())
}

/// Close the save prompt without persisting anything
pub async fn handle_cancel_save(ctx: &HandlerContext<'_>, message_id: MessageId) -> Result<CallbackAnswer> {
    ctx.state
        .sessions
        .with_existing(ctx.session_key, |s| s.finish_save());
    finish_save_prompt(ctx, message_id, "quiz-save-skipped").await?;
    Ok(CallbackAnswer::silent())
}

async fn finish_save_prompt(ctx: &HandlerContext<'_>, message_id: MessageId, reply_key: &str) -> Result<()> {
    ctx.bot
        .edit_message_text(ctx.chat_id(), message_id, ctx.t(reply_key))
        .await?;

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

/// Start over from the direction menu after a lesson summary
pub async fn handle_new_lesson(ctx: &HandlerContext<'_>, message_id: MessageId) -> Result<CallbackAnswer> {
    ctx.state.sessions.with_session(ctx.session_key, |s| s.restart());

    ctx.bot
        .edit_message_text(ctx.chat_id(), message_id, ctx.t("start-prompt"))
        .reply_markup(create_start_menu())
        .await?;
    Ok(CallbackAnswer::silent())
}

/// Leave the bot: forget the session and remove the reply keyboard
pub async fn handle_exit(ctx: &HandlerContext<'_>, message_id: MessageId) -> Result<CallbackAnswer> {
    ctx.state.sessions.remove(ctx.session_key);
    info!(user_id = %ctx.user_id(), "User left the lesson");

    ctx.bot
        .edit_message_reply_markup(ctx.chat_id(), message_id)
        .await?;
    ctx.bot
        .send_message(ctx.chat_id(), ctx.t("lesson-goodbye"))
        .reply_markup(KeyboardRemove::new())
        .await?;
    Ok(CallbackAnswer::silent())
}
