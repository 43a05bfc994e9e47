//! Message Handler module for processing incoming Telegram messages
//!
//! Text is routed in a fixed order: a pending add/delete continuation, a slash
//! command, a reply-keyboard label, a quiz answer, and finally a catch-all
//! that only logs.

use anyhow::Result;
use chrono::Utc;
use teloxide::prelude::*;
use teloxide::utils::command::BotCommands;
use tracing::{debug, info, Instrument};

use super::command_handlers::handle_command;
use super::dialogue_manager::{begin_add_word, begin_delete_word, cancel_interrupted, resume};
use super::quiz_flow::{advance_to_next_word, handle_answer};
use super::ui_builder::{create_lesson_end_keyboard, create_start_menu};
use super::{BotState, Command, HandlerContext, MenuCommand};
use crate::dialogue::{Continuation, WordDialogue};
use crate::errors::error_logging;
use crate::observability;
use crate::quiz::format_accuracy;
use crate::session::SessionKey;

pub async fn message_handler(
    bot: Bot,
    msg: Message,
    state: BotState,
    dialogue: WordDialogue,
) -> Result<()> {
    let span = observability::telegram_span(
        "message_handler",
        msg.from.as_ref().map(|u| u.id.0 as i64),
    );

    async move {
        let start_time = std::time::Instant::now();

        let (Some(user), Some(text)) = (msg.from.as_ref(), msg.text()) else {
            observability::record_telegram_message("unsupported");
            debug!(chat_id = %msg.chat.id, "Ignoring message without sender or text");
            return Ok(());
        };
        observability::record_telegram_message("text");

        let ctx = HandlerContext {
            bot: &bot,
            state: &state,
            language_code: user.language_code.as_deref(),
            session_key: SessionKey::new(user.id.0 as i64, msg.chat.id.0),
        };

        let status = match handle_text_message(&ctx, &dialogue, text).await {
            Ok(()) => 200,
            Err(e) => {
                error_logging::log_internal_error(&e, "message_handler", "handle_text_message", Some(ctx.user_id()));
                let details = e.to_string();
                bot.send_message(
                    msg.chat.id,
                    ctx.t_args("error-generic", &[("details", &details)]),
                )
                .await?;
                500
            }
        };

        observability::record_request_metrics("telegram_message", status, start_time.elapsed());
        Ok(())
    }
    .instrument(span)
    .await
}

async fn handle_text_message(ctx: &HandlerContext<'_>, dialogue: &WordDialogue, text: &str) -> Result<()> {
    let command = Command::parse(text, &ctx.state.bot_username).ok();
    let menu = MenuCommand::from_label(text, &ctx.state.localization);

    let pending = dialogue.get().await?.unwrap_or_default();
    let timeout = ctx.state.quiz_config.continuation_timeout();

    match pending.continuation_for(ctx.user_id(), Utc::now(), timeout) {
        Continuation::Resume(state) => {
            if command.is_none() && menu.is_none() && !text.starts_with('/') {
                return resume(ctx, dialogue, state, text).await;
            }
            // /cancel reports the cancellation itself
            if command != Some(Command::Cancel) {
                cancel_interrupted(ctx, dialogue).await?;
            }
        }
        Continuation::Expired => {
            info!(user_id = %ctx.user_id(), "Pending word input expired");
            dialogue.exit().await?;
        }
        Continuation::None => {}
    }

    if let Some(command) = command {
        return handle_command(ctx, command, dialogue).await;
    }

    if let Some(menu) = menu {
        return handle_menu_command(ctx, dialogue, menu).await;
    }

    if handle_answer(ctx, text).await? {
        return Ok(());
    }

    info!(
        user_id = %ctx.user_id(),
        chat_id = %ctx.session_key.chat_id,
        text = %text,
        "Received unmatched message"
    );
    Ok(())
}

async fn handle_menu_command(ctx: &HandlerContext<'_>, dialogue: &WordDialogue, menu: MenuCommand) -> Result<()> {
    debug!(user_id = %ctx.user_id(), ?menu, "Menu command");

    match menu {
        MenuCommand::AddWord => begin_add_word(ctx, dialogue).await,
        MenuCommand::DeleteWord => begin_delete_word(ctx, dialogue).await,
        MenuCommand::NextWord => advance_to_next_word(ctx).await,
        MenuCommand::Back => {
            ctx.state.sessions.with_session(ctx.session_key, |s| s.go_back());
            ctx.bot
                .send_message(ctx.chat_id(), ctx.t("start-prompt"))
                .reply_markup(create_start_menu())
                .await?;
            Ok(())
        }
        MenuCommand::EndLesson => {
            let summary = ctx.state.sessions.with_session(ctx.session_key, |s| s.end_lesson());
            info!(
                user_id = %ctx.user_id(),
                shown = summary.shown,
                correct = summary.correct,
                "Lesson ended"
            );

            let shown = summary.shown.to_string();
            let correct = summary.correct.to_string();
            let accuracy = format_accuracy(summary.accuracy);
            ctx.bot
                .send_message(
                    ctx.chat_id(),
                    ctx.t_args(
                        "lesson-summary",
                        &[("shown", &shown), ("correct", &correct), ("accuracy", &accuracy)],
                    ),
                )
                .reply_markup(create_lesson_end_keyboard(ctx.localization(), ctx.language_code))
                .await?;
            Ok(())
        }
    }
}
