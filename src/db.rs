use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use sqlx::postgres::{PgConnection, PgPool};
use sqlx::Row;
use std::collections::HashSet;
use std::fmt;
use tracing::{debug, info, warn, Instrument};

use crate::observability::{db_span, record_db_metrics};
use crate::quiz::{choose_pair, Direction, Scope, StudyRound};

/// Which side of a translation pair a word belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Language {
    Russian,
    English,
}

impl Language {
    /// Table holding words of this language
    pub fn table(self) -> &'static str {
        match self {
            Language::Russian => "russian_words",
            Language::English => "english_words",
        }
    }

    /// Column of `word_associations` referencing this language's table
    pub fn association_column(self) -> &'static str {
        match self {
            Language::Russian => "russian_word_id",
            Language::English => "english_word_id",
        }
    }

    pub fn opposite(self) -> Language {
        match self {
            Language::Russian => Language::English,
            Language::English => Language::Russian,
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Language::Russian => write!(f, "ru"),
            Language::English => write!(f, "en"),
        }
    }
}

/// Represents a chat participant in the database
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    pub id: i64,
    pub external_id: i64,
    pub created_at: DateTime<Utc>,
}

/// Represents a word in one of the two language tables
#[derive(Debug, Clone, PartialEq)]
pub struct Word {
    pub id: i64,
    pub text: String,
    pub language: Language,
}

/// A user-scoped link between a Russian and an English word
#[derive(Debug, Clone, PartialEq)]
pub struct Association {
    pub russian_word_id: i64,
    pub english_word_id: i64,
    pub user_id: i64,
    pub created_at: DateTime<Utc>,
}

/// Marks an association as mastered by its user
#[derive(Debug, Clone, PartialEq)]
pub struct LearnedWord {
    pub russian_word_id: i64,
    pub english_word_id: i64,
    pub user_id: i64,
    pub learned_at: DateTime<Utc>,
}

/// Result of an insert guarded by a uniqueness check
#[derive(Debug, Clone, PartialEq)]
pub enum InsertOutcome<T> {
    /// The row was inserted
    Created(T),
    /// The exact row was already present
    AlreadyExists,
    /// The database refused the row (concurrent insert or missing parent)
    Rejected,
}

impl<T> InsertOutcome<T> {
    pub fn is_created(&self) -> bool {
        matches!(self, InsertOutcome::Created(_))
    }
}

/// Result of deleting a word by its text
#[derive(Debug, Clone, PartialEq)]
pub enum DeleteOutcome {
    NotFound,
    Deleted {
        language: Language,
        /// Paired words removed because nothing else referenced them
        removed_translations: Vec<String>,
        associations_removed: u64,
    },
}

/// Result of clearing a user's learned words
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResetOutcome {
    UserNotFound,
    Reset(u64),
}

/// Dictionary sizes shown by `/stats`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DictionaryStats {
    pub own_pairs: i64,
    pub shared_pairs: i64,
    pub learned: i64,
}

fn is_foreign_key_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db_err) if db_err.is_foreign_key_violation())
}

/// Initialize the database schema
pub async fn init_database_schema(pool: &PgPool) -> Result<()> {
    info!("Initializing database schema");

    sqlx::query(
        "CREATE TABLE IF NOT EXISTS users (
            id BIGSERIAL PRIMARY KEY,
            external_id BIGINT UNIQUE NOT NULL,
            created_at TIMESTAMPTZ NOT NULL DEFAULT CURRENT_TIMESTAMP
        )",
    )
    .execute(pool)
    .await
    .context("Failed to create users table")?;

    for language in [Language::Russian, Language::English] {
        sqlx::query(&format!(
            "CREATE TABLE IF NOT EXISTS {} (
                id BIGSERIAL PRIMARY KEY,
                word VARCHAR(100) UNIQUE NOT NULL
            )",
            language.table()
        ))
        .execute(pool)
        .await
        .with_context(|| format!("Failed to create {} table", language.table()))?;
    }

    sqlx::query(
        "CREATE TABLE IF NOT EXISTS word_associations (
            russian_word_id BIGINT NOT NULL REFERENCES russian_words(id) ON DELETE CASCADE,
            english_word_id BIGINT NOT NULL REFERENCES english_words(id) ON DELETE CASCADE,
            user_id BIGINT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            created_at TIMESTAMPTZ NOT NULL DEFAULT CURRENT_TIMESTAMP,
            PRIMARY KEY (russian_word_id, english_word_id, user_id)
        )",
    )
    .execute(pool)
    .await
    .context("Failed to create word_associations table")?;

    sqlx::query(
        "CREATE TABLE IF NOT EXISTS learned_words (
            russian_word_id BIGINT NOT NULL,
            english_word_id BIGINT NOT NULL,
            user_id BIGINT NOT NULL,
            learned_at TIMESTAMPTZ NOT NULL DEFAULT CURRENT_TIMESTAMP,
            PRIMARY KEY (russian_word_id, english_word_id, user_id),
            FOREIGN KEY (russian_word_id, english_word_id, user_id)
                REFERENCES word_associations(russian_word_id, english_word_id, user_id)
                ON DELETE CASCADE
        )",
    )
    .execute(pool)
    .await
    .context("Failed to create learned_words table")?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS word_associations_user_id_idx ON word_associations(user_id)",
    )
    .execute(pool)
    .await
    .context("Failed to create word_associations user_id index")?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS word_associations_english_word_id_idx ON word_associations(english_word_id)",
    )
    .execute(pool)
    .await
    .context("Failed to create word_associations english_word_id index")?;

    info!("Database schema initialized successfully");
    Ok(())
}

async fn get_user_by_external_id_in(conn: &mut PgConnection, external_id: i64) -> Result<Option<User>> {
    let row = sqlx::query("SELECT id, external_id, created_at FROM users WHERE external_id = $1")
        .bind(external_id)
        .fetch_optional(&mut *conn)
        .await
        .context("Failed to get user by external_id")?;

    Ok(row.map(|row| User {
        id: row.get(0),
        external_id: row.get(1),
        created_at: row.get(2),
    }))
}

/// Get a user by the chat platform's id
pub async fn get_user_by_external_id(pool: &PgPool, external_id: i64) -> Result<Option<User>> {
    debug!(external_id = %external_id, "Getting user by external_id");
    let mut conn = pool.acquire().await.context("Failed to acquire connection")?;
    get_user_by_external_id_in(&mut conn, external_id).await
}

async fn get_or_create_user_in(conn: &mut PgConnection, external_id: i64) -> Result<Option<User>> {
    if let Some(user) = get_user_by_external_id_in(conn, external_id).await? {
        return Ok(Some(user));
    }

    let row = sqlx::query(
        "INSERT INTO users (external_id) VALUES ($1)
         ON CONFLICT (external_id) DO NOTHING
         RETURNING id, external_id, created_at",
    )
    .bind(external_id)
    .fetch_optional(&mut *conn)
    .await
    .context("Failed to create new user")?;

    match row {
        Some(row) => {
            let user = User {
                id: row.get(0),
                external_id: row.get(1),
                created_at: row.get(2),
            };
            debug!(user_id = %user.id, "User created successfully");
            Ok(Some(user))
        }
        None => {
            // Another request created the row between our lookup and insert
            let winner = get_user_by_external_id_in(conn, external_id).await?;
            if winner.is_none() {
                warn!(external_id = %external_id, "User creation lost a uniqueness race");
            }
            Ok(winner)
        }
    }
}

/// Get or create a user by external id
///
/// Returns `None` only when a concurrent creation claimed the key and its row
/// is not visible to this connection.
pub async fn get_or_create_user(pool: &PgPool, external_id: i64) -> Result<Option<User>> {
    debug!(external_id = %external_id, "Getting or creating user");
    let mut conn = pool.acquire().await.context("Failed to acquire connection")?;
    get_or_create_user_in(&mut conn, external_id).await
}

async fn get_word_by_text_in(
    conn: &mut PgConnection,
    text: &str,
    language: Language,
) -> Result<Option<Word>> {
    let row = sqlx::query(&format!("SELECT id, word FROM {} WHERE word = $1", language.table()))
        .bind(text)
        .fetch_optional(&mut *conn)
        .await
        .with_context(|| format!("Failed to look up word in {}", language.table()))?;

    Ok(row.map(|row| Word {
        id: row.get(0),
        text: row.get(1),
        language,
    }))
}

/// Look up a word by its exact text
pub async fn get_word_by_text(pool: &PgPool, text: &str, language: Language) -> Result<Option<Word>> {
    let mut conn = pool.acquire().await.context("Failed to acquire connection")?;
    get_word_by_text_in(&mut conn, text, language).await
}

async fn get_or_create_word_in(
    conn: &mut PgConnection,
    text: &str,
    language: Language,
) -> Result<Option<Word>> {
    if let Some(word) = get_word_by_text_in(conn, text, language).await? {
        return Ok(Some(word));
    }

    let row = sqlx::query(&format!(
        "INSERT INTO {} (word) VALUES ($1) ON CONFLICT (word) DO NOTHING RETURNING id, word",
        language.table()
    ))
    .bind(text)
    .fetch_optional(&mut *conn)
    .await
    .with_context(|| format!("Failed to insert word into {}", language.table()))?;

    match row {
        Some(row) => Ok(Some(Word {
            id: row.get(0),
            text: row.get(1),
            language,
        })),
        None => {
            let winner = get_word_by_text_in(conn, text, language).await?;
            if winner.is_none() {
                warn!(word = %text, language = %language, "Word creation lost a uniqueness race");
            }
            Ok(winner)
        }
    }
}

/// Get or create a word in the given language table
pub async fn get_or_create_word(pool: &PgPool, text: &str, language: Language) -> Result<Option<Word>> {
    debug!(language = %language, "Getting or creating word");
    let mut conn = pool.acquire().await.context("Failed to acquire connection")?;
    get_or_create_word_in(&mut conn, text, language).await
}

async fn create_association_in(
    conn: &mut PgConnection,
    russian_word_id: i64,
    english_word_id: i64,
    user_id: i64,
) -> Result<InsertOutcome<Association>> {
    let exists: bool = sqlx::query_scalar(
        "SELECT EXISTS(SELECT 1 FROM word_associations
         WHERE russian_word_id = $1 AND english_word_id = $2 AND user_id = $3)",
    )
    .bind(russian_word_id)
    .bind(english_word_id)
    .bind(user_id)
    .fetch_one(&mut *conn)
    .await
    .context("Failed to check existing association")?;

    if exists {
        return Ok(InsertOutcome::AlreadyExists);
    }

    let result = sqlx::query(
        "INSERT INTO word_associations (russian_word_id, english_word_id, user_id)
         VALUES ($1, $2, $3)
         ON CONFLICT DO NOTHING
         RETURNING russian_word_id, english_word_id, user_id, created_at",
    )
    .bind(russian_word_id)
    .bind(english_word_id)
    .bind(user_id)
    .fetch_optional(&mut *conn)
    .await;

    match result {
        Ok(Some(row)) => Ok(InsertOutcome::Created(Association {
            russian_word_id: row.get(0),
            english_word_id: row.get(1),
            user_id: row.get(2),
            created_at: row.get(3),
        })),
        Ok(None) => Ok(InsertOutcome::Rejected),
        Err(e) if is_foreign_key_violation(&e) => {
            warn!(error = %e, "Association rejected by foreign key constraint");
            Ok(InsertOutcome::Rejected)
        }
        Err(e) => Err(e).context("Failed to insert association"),
    }
}

/// Link a Russian and an English word in a user's dictionary
pub async fn create_association(
    pool: &PgPool,
    russian_word_id: i64,
    english_word_id: i64,
    user_id: i64,
) -> Result<InsertOutcome<Association>> {
    debug!(user_id = %user_id, russian_word_id, english_word_id, "Creating association");

    let mut tx = pool.begin().await.context("Failed to begin transaction")?;
    let outcome = create_association_in(&mut tx, russian_word_id, english_word_id, user_id).await?;
    if outcome.is_created() {
        tx.commit().await.context("Failed to commit association")?;
    }
    Ok(outcome)
}

/// Add a word pair to a user's dictionary in one transaction
///
/// Creates the user and both words when missing. Nothing is persisted
/// unless the association itself is created.
pub async fn add_word_pair(
    pool: &PgPool,
    external_id: i64,
    russian: &str,
    english: &str,
) -> Result<InsertOutcome<Association>> {
    let span = db_span("add_word_pair", "word_associations");
    async move {
        let start = std::time::Instant::now();
        let mut tx = pool.begin().await.context("Failed to begin transaction")?;

        let Some(user) = get_or_create_user_in(&mut tx, external_id).await? else {
            return Ok(InsertOutcome::Rejected);
        };
        let Some(ru) = get_or_create_word_in(&mut tx, russian, Language::Russian).await? else {
            return Ok(InsertOutcome::Rejected);
        };
        let Some(en) = get_or_create_word_in(&mut tx, english, Language::English).await? else {
            return Ok(InsertOutcome::Rejected);
        };

        let outcome = create_association_in(&mut tx, ru.id, en.id, user.id).await?;
        if outcome.is_created() {
            tx.commit().await.context("Failed to commit word pair")?;
            info!(user_id = %user.id, "Word pair added to dictionary");
        }

        record_db_metrics("add_word_pair", start.elapsed());
        Ok::<_, anyhow::Error>(outcome)
    }
    .instrument(span)
    .await
}

/// Mark a user's association as learned
pub async fn mark_learned(
    pool: &PgPool,
    russian_word_id: i64,
    english_word_id: i64,
    user_id: i64,
) -> Result<InsertOutcome<LearnedWord>> {
    debug!(user_id = %user_id, russian_word_id, english_word_id, "Marking word as learned");

    let mut conn = pool.acquire().await.context("Failed to acquire connection")?;

    let exists: bool = sqlx::query_scalar(
        "SELECT EXISTS(SELECT 1 FROM learned_words
         WHERE russian_word_id = $1 AND english_word_id = $2 AND user_id = $3)",
    )
    .bind(russian_word_id)
    .bind(english_word_id)
    .bind(user_id)
    .fetch_one(&mut *conn)
    .await
    .context("Failed to check learned word")?;

    if exists {
        return Ok(InsertOutcome::AlreadyExists);
    }

    let result = sqlx::query(
        "INSERT INTO learned_words (russian_word_id, english_word_id, user_id)
         VALUES ($1, $2, $3)
         ON CONFLICT DO NOTHING
         RETURNING russian_word_id, english_word_id, user_id, learned_at",
    )
    .bind(russian_word_id)
    .bind(english_word_id)
    .bind(user_id)
    .fetch_optional(&mut *conn)
    .await;

    match result {
        Ok(Some(row)) => Ok(InsertOutcome::Created(LearnedWord {
            russian_word_id: row.get(0),
            english_word_id: row.get(1),
            user_id: row.get(2),
            learned_at: row.get(3),
        })),
        Ok(None) => Ok(InsertOutcome::Rejected),
        // The pair is not in this user's dictionary
        Err(e) if is_foreign_key_violation(&e) => Ok(InsertOutcome::Rejected),
        Err(e) => Err(e).context("Failed to insert learned word"),
    }
}

/// Mark a pair learned, adding it to the user's dictionary first when needed
///
/// Pairs drawn from the shared dictionary usually belong to another user;
/// learned markers hang off the learner's own association.
pub async fn save_learned(
    pool: &PgPool,
    russian_word_id: i64,
    english_word_id: i64,
    user_id: i64,
) -> Result<InsertOutcome<LearnedWord>> {
    let outcome = mark_learned(pool, russian_word_id, english_word_id, user_id).await?;
    if !matches!(outcome, InsertOutcome::Rejected) {
        return Ok(outcome);
    }

    let adopted = create_association(pool, russian_word_id, english_word_id, user_id).await?;
    if !adopted.is_created() {
        return Ok(outcome);
    }

    debug!(user_id = %user_id, russian_word_id, english_word_id, "Shared pair added to user dictionary");
    mark_learned(pool, russian_word_id, english_word_id, user_id).await
}

/// Remove a single learned marker
pub async fn unmark_learned(
    pool: &PgPool,
    russian_word_id: i64,
    english_word_id: i64,
    user_id: i64,
) -> Result<bool> {
    let result = sqlx::query(
        "DELETE FROM learned_words
         WHERE russian_word_id = $1 AND english_word_id = $2 AND user_id = $3",
    )
    .bind(russian_word_id)
    .bind(english_word_id)
    .bind(user_id)
    .execute(pool)
    .await
    .context("Failed to unmark learned word")?;

    Ok(result.rows_affected() > 0)
}

/// List the learned words of a user; empty when the user is unknown
pub async fn get_learned_words(pool: &PgPool, external_id: i64) -> Result<Vec<LearnedWord>> {
    let rows = sqlx::query(
        "SELECT lw.russian_word_id, lw.english_word_id, lw.user_id, lw.learned_at
         FROM learned_words lw
         JOIN users u ON u.id = lw.user_id
         WHERE u.external_id = $1
         ORDER BY lw.learned_at",
    )
    .bind(external_id)
    .fetch_all(pool)
    .await
    .context("Failed to list learned words")?;

    Ok(rows
        .into_iter()
        .map(|row| LearnedWord {
            russian_word_id: row.get(0),
            english_word_id: row.get(1),
            user_id: row.get(2),
            learned_at: row.get(3),
        })
        .collect())
}

/// Delete every learned marker of a user
pub async fn reset_progress(pool: &PgPool, external_id: i64) -> Result<ResetOutcome> {
    let Some(user) = get_user_by_external_id(pool, external_id).await? else {
        return Ok(ResetOutcome::UserNotFound);
    };

    let result = sqlx::query("DELETE FROM learned_words WHERE user_id = $1")
        .bind(user.id)
        .execute(pool)
        .await
        .context("Failed to reset progress")?;

    info!(user_id = %user.id, deleted = result.rows_affected(), "Progress reset");
    Ok(ResetOutcome::Reset(result.rows_affected()))
}

/// Delete a word by text, together with translations nothing else references
///
/// The word is looked up in the Russian table first, then the English one.
/// All deletions share one transaction.
pub async fn delete_word_by_text(pool: &PgPool, text: &str) -> Result<DeleteOutcome> {
    let span = db_span("delete_word_by_text", "word_associations");
    async move {
        let start = std::time::Instant::now();
        let mut tx = pool.begin().await.context("Failed to begin transaction")?;

        let word = match get_word_by_text_in(&mut tx, text, Language::Russian).await? {
            Some(word) => word,
            None => match get_word_by_text_in(&mut tx, text, Language::English).await? {
                Some(word) => word,
                None => {
                    debug!(word = %text, "Word to delete not found");
                    return Ok(DeleteOutcome::NotFound);
                }
            },
        };

        let own_column = word.language.association_column();
        let paired = word.language.opposite();
        let paired_column = paired.association_column();

        let paired_ids: Vec<i64> = sqlx::query_scalar(&format!(
            "SELECT DISTINCT {paired_column} FROM word_associations WHERE {own_column} = $1"
        ))
        .bind(word.id)
        .fetch_all(&mut *tx)
        .await
        .context("Failed to load associations of word")?;

        let mut removed_translations = Vec::new();
        let mut associations_removed = 0;

        for paired_id in paired_ids {
            let still_referenced: bool = sqlx::query_scalar(&format!(
                "SELECT EXISTS(SELECT 1 FROM word_associations
                 WHERE {paired_column} = $1 AND {own_column} <> $2)"
            ))
            .bind(paired_id)
            .bind(word.id)
            .fetch_one(&mut *tx)
            .await
            .context("Failed to check other references of paired word")?;

            associations_removed += sqlx::query(&format!(
                "DELETE FROM word_associations WHERE {own_column} = $1 AND {paired_column} = $2"
            ))
            .bind(word.id)
            .bind(paired_id)
            .execute(&mut *tx)
            .await
            .context("Failed to delete association")?
            .rows_affected();

            if !still_referenced {
                let removed: Option<String> = sqlx::query_scalar(&format!(
                    "DELETE FROM {} WHERE id = $1 RETURNING word",
                    paired.table()
                ))
                .bind(paired_id)
                .fetch_optional(&mut *tx)
                .await
                .context("Failed to delete orphaned translation")?;
                removed_translations.extend(removed);
            }
        }

        sqlx::query(&format!("DELETE FROM {} WHERE id = $1", word.language.table()))
            .bind(word.id)
            .execute(&mut *tx)
            .await
            .context("Failed to delete word")?;

        tx.commit().await.context("Failed to commit word deletion")?;

        info!(
            word = %text,
            language = %word.language,
            associations_removed,
            translations_removed = removed_translations.len(),
            "Word deleted"
        );
        record_db_metrics("delete_word_by_text", start.elapsed());

        Ok::<_, anyhow::Error>(DeleteOutcome::Deleted {
            language: word.language,
            removed_translations,
            associations_removed,
        })
    }
    .instrument(span)
    .await
}

/// Draw a quiz round for a user
///
/// Returns `None` when the user is unknown or every pair in scope is learned.
/// The returned round may hold fewer than three distractors when the
/// opposite-language table is small; see [`StudyRound::is_complete`].
pub async fn get_words_for_study(
    pool: &PgPool,
    scope: Scope,
    direction: Direction,
    external_id: i64,
) -> Result<Option<StudyRound>> {
    let span = db_span("get_words_for_study", "word_associations");
    async move {
        let start = std::time::Instant::now();
        let mut conn = pool.acquire().await.context("Failed to acquire connection")?;

        let Some(user) = get_user_by_external_id_in(&mut conn, external_id).await? else {
            return Ok(None);
        };

        let learned: HashSet<(i64, i64)> = sqlx::query_as::<_, (i64, i64)>(
            "SELECT russian_word_id, english_word_id FROM learned_words WHERE user_id = $1",
        )
        .bind(user.id)
        .fetch_all(&mut *conn)
        .await
        .context("Failed to load learned pairs")?
        .into_iter()
        .collect();

        let pairs: Vec<(i64, i64)> = match scope {
            Scope::AllWords => {
                sqlx::query_as::<_, (i64, i64)>(
                    "SELECT DISTINCT russian_word_id, english_word_id FROM word_associations",
                )
                .fetch_all(&mut *conn)
                .await
            }
            Scope::MyWords => {
                sqlx::query_as::<_, (i64, i64)>(
                    "SELECT russian_word_id, english_word_id FROM word_associations WHERE user_id = $1",
                )
                .bind(user.id)
                .fetch_all(&mut *conn)
                .await
            }
        }
        .context("Failed to load associations for study")?;

        let available: Vec<(i64, i64)> = pairs
            .into_iter()
            .filter(|pair| !learned.contains(pair))
            .collect();

        let Some((russian_word_id, english_word_id)) = choose_pair(&available) else {
            debug!(user_id = %user.id, ?scope, "No words left to study");
            return Ok(None);
        };

        let russian: String = sqlx::query_scalar("SELECT word FROM russian_words WHERE id = $1")
            .bind(russian_word_id)
            .fetch_one(&mut *conn)
            .await
            .context("Failed to load russian word")?;
        let english: String = sqlx::query_scalar("SELECT word FROM english_words WHERE id = $1")
            .bind(english_word_id)
            .fetch_one(&mut *conn)
            .await
            .context("Failed to load english word")?;

        let (prompt, target, option_language, target_id) = match direction {
            Direction::RuEn => (russian, english, Language::English, english_word_id),
            Direction::EnRu => (english, russian, Language::Russian, russian_word_id),
        };

        let distractors: Vec<String> = sqlx::query_scalar(&format!(
            "SELECT word FROM {} WHERE id <> $1 ORDER BY RANDOM() LIMIT 3",
            option_language.table()
        ))
        .bind(target_id)
        .fetch_all(&mut *conn)
        .await
        .context("Failed to load distractors")?;

        record_db_metrics("get_words_for_study", start.elapsed());

        Ok::<_, anyhow::Error>(Some(StudyRound::new(
            russian_word_id,
            english_word_id,
            prompt,
            target,
            distractors,
        )))
    }
    .instrument(span)
    .await
}

/// Whether the shared dictionary has any pairs at all
pub async fn dictionary_is_empty(pool: &PgPool) -> Result<bool> {
    let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM word_associations)")
        .fetch_one(pool)
        .await
        .context("Failed to check dictionary size")?;
    Ok(!exists)
}

/// Count a user's pairs, the shared pairs and the user's learned pairs
pub async fn count_dictionary(pool: &PgPool, external_id: i64) -> Result<DictionaryStats> {
    let row = sqlx::query(
        "SELECT
            (SELECT COUNT(*) FROM word_associations a JOIN users u ON u.id = a.user_id
             WHERE u.external_id = $1),
            (SELECT COUNT(*) FROM (SELECT DISTINCT russian_word_id, english_word_id
                                   FROM word_associations) pairs),
            (SELECT COUNT(*) FROM learned_words l JOIN users u ON u.id = l.user_id
             WHERE u.external_id = $1)",
    )
    .bind(external_id)
    .fetch_one(pool)
    .await
    .context("Failed to count dictionary")?;

    Ok(DictionaryStats {
        own_pairs: row.get(0),
        shared_pairs: row.get(1),
        learned: row.get(2),
    })
}
