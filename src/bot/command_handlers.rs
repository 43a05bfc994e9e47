//! Command Handlers module for processing bot commands

use anyhow::Result;
use teloxide::prelude::*;
use tracing::{debug, info};

use super::ui_builder::{create_reset_confirmation_keyboard, create_start_menu, create_translation_keyboard};
use super::{Command, HandlerContext};
use crate::db;
use crate::dialogue::WordDialogue;
use crate::seed::import_seed_dictionary;

/// Dispatch a parsed slash command
pub async fn handle_command(ctx: &HandlerContext<'_>, command: Command, dialogue: &WordDialogue) -> Result<()> {
    match command {
        Command::Start => handle_start_command(ctx).await,
        Command::Help => handle_help_command(ctx).await,
        Command::ResetProgress => handle_reset_progress_command(ctx).await,
        Command::Stats => handle_stats_command(ctx).await,
        Command::Cancel => handle_cancel_command(ctx, dialogue).await,
    }
}

/// Handle the /start command
pub async fn handle_start_command(ctx: &HandlerContext<'_>) -> Result<()> {
    let pool = &ctx.state.pool;

    if db::get_or_create_user(pool, ctx.user_id()).await?.is_none() {
        ctx.bot
            .send_message(ctx.chat_id(), ctx.t("user-create-failed"))
            .await?;
        return Ok(());
    }

    if let Some(path) = ctx.state.quiz_config.seed_dictionary_path.as_deref() {
        if db::dictionary_is_empty(pool).await? {
            info!(path = %path, "Shared dictionary is empty, importing seed dictionary");
            import_seed_dictionary(pool, path, ctx.state.quiz_config.seed_user_id).await;
        }
    }

    ctx.state.sessions.with_session(ctx.session_key, |s| s.restart());

    ctx.bot
        .send_message(ctx.chat_id(), ctx.t("start-prompt"))
        .reply_markup(create_start_menu())
        .await?;
    Ok(())
}

/// Handle the /help command
pub async fn handle_help_command(ctx: &HandlerContext<'_>) -> Result<()> {
    ctx.bot.send_message(ctx.chat_id(), ctx.t("help-text")).await?;
    Ok(())
}

/// Handle the /reset_progress command
pub async fn handle_reset_progress_command(ctx: &HandlerContext<'_>) -> Result<()> {
    debug!(user_id = %ctx.user_id(), "Asking for progress reset confirmation");
    ctx.bot
        .send_message(ctx.chat_id(), ctx.t("reset-confirm"))
        .reply_markup(create_reset_confirmation_keyboard(
            ctx.localization(),
            ctx.language_code,
        ))
        .await?;
    Ok(())
}

/// Handle the /stats command
pub async fn handle_stats_command(ctx: &HandlerContext<'_>) -> Result<()> {
    let stats = db::count_dictionary(&ctx.state.pool, ctx.user_id()).await?;
    let own = stats.own_pairs.to_string();
    let shared = stats.shared_pairs.to_string();
    let learned = stats.learned.to_string();

    ctx.bot
        .send_message(
            ctx.chat_id(),
            ctx.t_args(
                "stats",
                &[("own", &own), ("shared", &shared), ("learned", &learned)],
            ),
        )
        .await?;
    Ok(())
}

/// Handle the /cancel command
pub async fn handle_cancel_command(ctx: &HandlerContext<'_>, dialogue: &WordDialogue) -> Result<()> {
    let state = dialogue.get().await?.unwrap_or_default();

    let key = if state.owner() == Some(ctx.user_id()) {
        dialogue.exit().await?;
        "continuation-cancelled"
    } else {
        "cancel-nothing"
    };

    let current = ctx
        .state
        .sessions
        .with_existing(ctx.session_key, |s| s.current_round().cloned())
        .flatten();
    ctx.bot
        .send_message(ctx.chat_id(), ctx.t(key))
        .reply_markup(create_translation_keyboard(
            current.as_ref(),
            ctx.localization(),
            ctx.language_code,
        ))
        .await?;
    Ok(())
}

