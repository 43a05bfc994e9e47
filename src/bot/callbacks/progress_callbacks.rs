//! Progress reset confirmation callbacks

use anyhow::Result;
use teloxide::prelude::*;
use teloxide::types::MessageId;
use tracing::info;

use super::callback_types::CallbackAnswer;
use crate::bot::ui_builder::create_translation_keyboard;
use crate::bot::HandlerContext;
use crate::db::{self, ResetOutcome};
use crate::observability::record_dictionary_change;

/// Delete every learned marker of the user and report how many went
pub async fn handle_confirm_reset(ctx: &HandlerContext<'_>, message_id: MessageId) -> Result<CallbackAnswer> {
    let outcome = db::reset_progress(&ctx.state.pool, ctx.user_id()).await?;

    let text = match outcome {
        ResetOutcome::UserNotFound => ctx.t("reset-user-not-found"),
        ResetOutcome::Reset(count) => {
            record_dictionary_change("reset", count);
            info!(user_id = %ctx.user_id(), deleted = count, "Learning progress reset");
            ctx.t_args("reset-done", &[("count", &count.to_string())])
        }
    };

    ctx.bot
        .edit_message_text(ctx.chat_id(), message_id, text.clone())
        .await?;

    if matches!(outcome, ResetOutcome::Reset(_)) {
        send_next_action(ctx).await?;
    }
    Ok(CallbackAnswer::notice(text))
}

/// Leave progress untouched
pub async fn handle_cancel_reset(ctx: &HandlerContext<'_>, message_id: MessageId) -> Result<CallbackAnswer> {
    let text = ctx.t("reset-cancelled");
    ctx.bot
        .edit_message_text(ctx.chat_id(), message_id, text.clone())
        .await?;
    send_next_action(ctx).await?;
    Ok(CallbackAnswer::notice(text))
}

async fn send_next_action(ctx: &HandlerContext<'_>) -> Result<()> {
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
