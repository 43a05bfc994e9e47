use anyhow::Result;
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use std::time::Duration;
use teloxide::dispatching::dialogue::InMemStorage;
use teloxide::prelude::*;
use teloxide::utils::command::BotCommands;
use tracing::{error, info};
use vocab_trainer::bot::{self, BotState, Command};
use vocab_trainer::config::AppConfig;
use vocab_trainer::db;
use vocab_trainer::dialogue::{WordDialogue, WordDialogueState};
use vocab_trainer::localization;
use vocab_trainer::observability;
use vocab_trainer::seed;
use vocab_trainer::session::{spawn_session_reaper, QuizSessions};

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file first
    dotenvy::dotenv().ok();

    let config = AppConfig::from_env()?;

    // Validate before anything binds or connects
    config
        .validate()
        .map_err(|e| anyhow::anyhow!("Configuration validation failed: {}", e))?;

    // The pool connects on first use so the readiness probe can report it
    let pool = PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .min_connections(config.database.min_connections)
        .acquire_timeout(Duration::from_secs(config.database.connect_timeout_secs))
        .connect_lazy(&config.database.url)?;
    let shared_pool = Arc::new(pool);

    observability::init_observability(&config.observability, Some(Arc::clone(&shared_pool))).await?;
    info!("{}", config.summary());

    db::init_database_schema(&shared_pool).await?;

    if let Some(path) = config.quiz.seed_dictionary_path.as_deref() {
        if db::dictionary_is_empty(&shared_pool).await? {
            seed::import_seed_dictionary(&shared_pool, path, config.quiz.seed_user_id).await;
        } else {
            info!("Shared dictionary already populated, skipping seed import");
        }
    }

    let localization_manager = localization::create_localization_manager()?;

    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(config.bot.http_timeout_secs))
        .build()?;
    let bot = Bot::with_client(config.bot.token.clone(), client);

    let me = bot.get_me().await?;
    let bot_username = me.username().to_string();

    match bot.set_my_commands(Command::bot_commands()).await {
        Ok(_) => info!("Bot commands registered"),
        Err(e) => error!(error = %e, "Failed to register bot commands"),
    }

    let sessions = Arc::new(QuizSessions::new(config.quiz.max_attempts));
    let _reaper = spawn_session_reaper(
        Arc::clone(&sessions),
        Duration::from_secs(config.quiz.session_idle_timeout_secs),
    );

    let state = BotState {
        pool: Arc::clone(&shared_pool),
        localization: localization_manager,
        sessions,
        quiz_config: Arc::new(config.quiz.clone()),
        bot_username,
    };

    info!(
        http_timeout_secs = config.bot.http_timeout_secs,
        "Bot initialized, starting dispatcher"
    );

    let dialogue_storage = InMemStorage::<WordDialogueState>::new();

    let handler = dptree::entry()
        .branch(Update::filter_message().endpoint({
            let state = state.clone();
            let storage = dialogue_storage.clone();
            move |bot: Bot, msg: Message| {
                let state = state.clone();
                let dialogue = WordDialogue::new(storage.clone(), msg.chat.id);
                async move { bot::message_handler(bot, msg, state, dialogue).await }
            }
        }))
        .branch(Update::filter_callback_query().endpoint({
            let state = state.clone();
            move |bot: Bot, q: CallbackQuery| {
                let state = state.clone();
                async move { bot::callback_handler(bot, q, state).await }
            }
        }));

    Dispatcher::builder(bot, handler)
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;

    Ok(())
}
