//! Quiz flow: drawing rounds and reacting to picked options

use anyhow::Result;
use teloxide::prelude::*;
use teloxide::types::{FileId, InputFile, MessageId};
use tracing::{debug, info, warn};

use super::ui_builder::{create_save_keyboard, create_translation_keyboard};
use super::HandlerContext;
use crate::db;
use crate::errors::error_logging;
use crate::observability::record_quiz_answer;
use crate::quiz::{choose_phrase_number, choose_sticker, AnswerOutcome, RoundStart, Scope, StudyRound};

/// Number of numbered congratulation / commiseration phrases per language
pub const PHRASE_COUNT: usize = 4;

/// Result of trying to put a new round on screen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundDraw {
    Shown,
    Insufficient,
    /// Direction or scope has not been chosen yet
    NoLesson,
}

/// Draw a round for the session's direction and `scope` and record it
///
/// The session is left untouched when the dictionary cannot fill a round.
pub async fn draw_round(ctx: &HandlerContext<'_>, scope: Scope) -> Result<(RoundDraw, Option<StudyRound>)> {
    let key = ctx.session_key;
    let Some(direction) = ctx.state.sessions.with_session(key, |s| s.direction()) else {
        return Ok((RoundDraw::NoLesson, None));
    };

    let round = db::get_words_for_study(&ctx.state.pool, scope, direction, ctx.user_id())
        .await
        .inspect_err(|e| error_logging::log_quiz_error(e, "draw_round", ctx.user_id(), None))?;

    let started = ctx
        .state
        .sessions
        .with_session(key, |s| s.start_round_in(scope, round.clone()));

    match started {
        RoundStart::Started => {
            debug!(user_id = %ctx.user_id(), ?scope, ?direction, "Round drawn");
            Ok((RoundDraw::Shown, round))
        }
        RoundStart::Insufficient => {
            info!(user_id = %ctx.user_id(), ?scope, "Not enough words for a round");
            Ok((RoundDraw::Insufficient, None))
        }
    }
}

/// Show the prompt and the option keyboard
///
/// With `edit` the prompt replaces the text of that message (the scope menu).
pub async fn send_round(ctx: &HandlerContext<'_>, round: &StudyRound, edit: Option<MessageId>) -> Result<()> {
    let prompt = ctx.t_args("quiz-translate", &[("word", &round.prompt)]);
    match edit {
        Some(message_id) => {
            ctx.bot
                .edit_message_text(ctx.chat_id(), message_id, prompt)
                .await?;
        }
        None => {
            ctx.bot.send_message(ctx.chat_id(), prompt).await?;
        }
    }

    ctx.bot
        .send_message(ctx.chat_id(), ctx.t("quiz-choose"))
        .reply_markup(create_translation_keyboard(
            Some(round),
            ctx.localization(),
            ctx.language_code,
        ))
        .await?;
    Ok(())
}

/// Move on to another word ("next word" or exhausted attempts)
pub async fn advance_to_next_word(ctx: &HandlerContext<'_>) -> Result<()> {
    let scope = ctx
        .state
        .sessions
        .with_existing(ctx.session_key, |s| s.scope())
        .flatten();

    let Some(scope) = scope else {
        ctx.bot
            .send_message(ctx.chat_id(), ctx.t("quiz-no-active-lesson"))
            .await?;
        return Ok(());
    };

    match draw_round(ctx, scope).await? {
        (RoundDraw::Shown, Some(round)) => send_round(ctx, &round, None).await,
        (RoundDraw::NoLesson, _) => {
            ctx.bot
                .send_message(ctx.chat_id(), ctx.t("quiz-no-active-lesson"))
                .await?;
            Ok(())
        }
        _ => {
            let current = ctx
                .state
                .sessions
                .with_existing(ctx.session_key, |s| s.current_round().cloned())
                .flatten();
            ctx.bot
                .send_message(ctx.chat_id(), ctx.t("insufficient-words"))
                .reply_markup(create_translation_keyboard(
                    current.as_ref(),
                    ctx.localization(),
                    ctx.language_code,
                ))
                .await?;
            Ok(())
        }
    }
}

/// Score `text` if it is one of the current round's options
///
/// Returns `false` when the text is not an answer, so the caller can fall
/// through to its catch-all.
pub async fn handle_answer(ctx: &HandlerContext<'_>, text: &str) -> Result<bool> {
    let scored = ctx.state.sessions.with_existing(ctx.session_key, |s| {
        match s.current_round() {
            Some(round) if s.is_playing() && round.is_option(text) => {
                let round = round.clone();
                Some((s.answer(text), round))
            }
            _ => None,
        }
    });

    let Some((outcome, round)) = scored.flatten() else {
        return Ok(false);
    };

    match outcome {
        AnswerOutcome::Correct { first_try } => {
            record_quiz_answer("correct");
            info!(user_id = %ctx.user_id(), first_try, "Correct answer");
            send_reaction(ctx, "quiz-correct", &ctx.state.quiz_config.success_stickers).await?;
            ctx.bot
                .send_message(
                    ctx.chat_id(),
                    ctx.t_args("quiz-save-prompt", &[("word", &round.prompt)]),
                )
                .reply_markup(create_save_keyboard(ctx.localization(), ctx.language_code))
                .await?;
        }
        AnswerOutcome::Incorrect { attempts_left } => {
            record_quiz_answer("wrong");
            debug!(user_id = %ctx.user_id(), attempts_left, "Wrong answer");
            send_reaction(ctx, "quiz-wrong", &ctx.state.quiz_config.failure_stickers).await?;
            let attempts_left = attempts_left.to_string();
            let text = format!(
                "{}\n{}",
                ctx.t_args("quiz-attempts-left", &[("count", &attempts_left)]),
                ctx.t_args("quiz-translate", &[("word", &round.prompt)])
            );
            ctx.bot.send_message(ctx.chat_id(), text).await?;
        }
        AnswerOutcome::Exhausted => {
            record_quiz_answer("exhausted");
            info!(user_id = %ctx.user_id(), "Attempts exhausted, advancing");
            send_reaction(ctx, "quiz-wrong", &ctx.state.quiz_config.failure_stickers).await?;
            ctx.bot
                .send_message(
                    ctx.chat_id(),
                    ctx.t_args("quiz-exhausted", &[("target", &round.target)]),
                )
                .await?;
            advance_to_next_word(ctx).await?;
        }
        AnswerOutcome::SavePending => {
            debug!(user_id = %ctx.user_id(), "Option picked while the save prompt is open");
            ctx.bot
                .send_message(
                    ctx.chat_id(),
                    ctx.t_args("quiz-save-prompt", &[("word", &round.prompt)]),
                )
                .reply_markup(create_save_keyboard(ctx.localization(), ctx.language_code))
                .await?;
        }
        AnswerOutcome::NoActiveRound => return Ok(false),
    }

    Ok(true)
}

/// Send a random phrase of the `prefix-N` family and an optional sticker
async fn send_reaction(ctx: &HandlerContext<'_>, prefix: &str, stickers: &[String]) -> Result<()> {
    let phrase_key = format!("{}-{}", prefix, choose_phrase_number(PHRASE_COUNT));
    let sticker = choose_sticker(stickers).map(str::to_string);

    ctx.bot.send_message(ctx.chat_id(), ctx.t(&phrase_key)).await?;

    if let Some(sticker) = sticker {
        // A missing sticker should not break the lesson
        if let Err(e) = ctx
            .bot
            .send_sticker(ctx.chat_id(), InputFile::file_id(FileId(sticker)))
            .await
        {
            warn!(error = %e, "Failed to send sticker");
        }
    }
    Ok(())
}
