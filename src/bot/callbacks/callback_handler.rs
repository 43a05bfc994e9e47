//! Callback Handler module for processing inline keyboard callback queries

use anyhow::Result;
use teloxide::prelude::*;
use teloxide::types::{MaybeInaccessibleMessage, MessageId};
use tracing::{debug, Instrument};

use super::callback_types::{CallbackAction, CallbackAnswer};
use super::{progress_callbacks, quiz_callbacks};
use crate::bot::{BotState, HandlerContext};
use crate::errors::error_logging;
use crate::observability;
use crate::session::SessionKey;

/// Chat and message the pressed keyboard belongs to
fn callback_origin(q: &CallbackQuery) -> Option<(ChatId, MessageId)> {
    match q.message.as_ref()? {
        MaybeInaccessibleMessage::Regular(msg) => Some((msg.chat.id, msg.id)),
        MaybeInaccessibleMessage::Inaccessible(msg) => Some((msg.chat.id, msg.message_id)),
    }
}

/// Handle callback queries from inline keyboards
pub async fn callback_handler(bot: Bot, q: CallbackQuery, state: BotState) -> Result<()> {
    let user_id = q.from.id.0 as i64;
    let span = observability::telegram_span("callback_handler", Some(user_id));

    async move {
        let start_time = std::time::Instant::now();
        let data = q.data.as_deref().unwrap_or("");

        let (Some((chat_id, message_id)), Some(action)) = (callback_origin(&q), CallbackAction::parse(data))
        else {
            debug!(user_id = %user_id, data = %data, "Ignoring callback without message or with unknown payload");
            bot.answer_callback_query(q.id.clone()).await?;
            return Ok(());
        };

        observability::record_telegram_message(action.name());

        let ctx = HandlerContext {
            bot: &bot,
            state: &state,
            language_code: q.from.language_code.as_deref(),
            session_key: SessionKey::new(user_id, chat_id.0),
        };

        let result = match action {
            CallbackAction::ChooseDirection(direction) => {
                quiz_callbacks::handle_direction(&ctx, message_id, direction).await
            }
            CallbackAction::GoBackDirection => quiz_callbacks::handle_go_back(&ctx, message_id).await,
            CallbackAction::ChooseScope(scope) => {
                quiz_callbacks::handle_scope(&ctx, message_id, scope).await
            }
            CallbackAction::Save => quiz_callbacks::handle_save(&ctx, message_id).await,
            CallbackAction::CancelSave => quiz_callbacks::handle_cancel_save(&ctx, message_id).await,
            CallbackAction::NewLesson => quiz_callbacks::handle_new_lesson(&ctx, message_id).await,
            CallbackAction::Exit => quiz_callbacks::handle_exit(&ctx, message_id).await,
            CallbackAction::ConfirmReset => {
                progress_callbacks::handle_confirm_reset(&ctx, message_id).await
            }
            CallbackAction::CancelReset => {
                progress_callbacks::handle_cancel_reset(&ctx, message_id).await
            }
        };

        let (answer, status) = match result {
            Ok(answer) => (answer, 200),
            Err(e) => {
                error_logging::log_internal_error(&e, "callback_handler", action.name(), Some(user_id));
                let details = e.to_string();
                (
                    CallbackAnswer::alert(ctx.t_args("error-generic", &[("details", &details)])),
                    500,
                )
            }
        };

        let mut reply = bot.answer_callback_query(q.id.clone());
        if let Some(text) = answer.text {
            reply = reply.text(text).show_alert(answer.show_alert);
        }
        reply.await?;

        observability::record_request_metrics("callback_query", status, start_time.elapsed());
        Ok(())
    }
    .instrument(span)
    .await
}
