use anyhow::{Context, Result};
use sqlx::PgPool;
use std::collections::HashSet;
use std::env;
use tokio::sync::{Mutex, MutexGuard};
use vocab_trainer::db::*;
use vocab_trainer::quiz::{Direction, Scope};

// Every test rebuilds the same schema, so they must not overlap
static DB_LOCK: Mutex<()> = Mutex::const_new(());

/// Helper macro to skip tests when database is not available
macro_rules! skip_if_no_db {
    ($test_fn:expr) => {
        match setup_test_db().await {
            Ok((pool, _guard)) => $test_fn(&pool).await,
            Err(_) => {
                eprintln!("Skipping test: Database not available");
                Ok(())
            }
        }
    };
}

async fn setup_test_db() -> Result<(PgPool, MutexGuard<'static, ()>)> {
    // Skip tests if no DATABASE_URL is provided
    let database_url = match env::var("DATABASE_URL") {
        Ok(url) => url,
        Err(_) => {
            eprintln!("Skipping database tests: DATABASE_URL not set");
            return Err(anyhow::anyhow!("Test database not configured"));
        }
    };

    let guard = DB_LOCK.lock().await;

    let pool = PgPool::connect(&database_url)
        .await
        .context("Failed to connect to test database")?;

    for table in [
        "learned_words",
        "word_associations",
        "russian_words",
        "english_words",
        "users",
    ] {
        sqlx::query(&format!("DROP TABLE IF EXISTS {} CASCADE", table))
            .execute(&pool)
            .await?;
    }

    init_database_schema(&pool).await?;

    Ok((pool, guard))
}

/// Add pairs to a user's dictionary and return the user's internal id
async fn add_pairs(pool: &PgPool, external_id: i64, pairs: &[(&str, &str)]) -> Result<i64> {
    for (ru, en) in pairs {
        let outcome = add_word_pair(pool, external_id, ru, en).await?;
        assert!(outcome.is_created(), "pair {ru} - {en} should be new");
    }
    let user = get_user_by_external_id(pool, external_id)
        .await?
        .context("user should exist after adding words")?;
    Ok(user.id)
}

async fn word_id(pool: &PgPool, text: &str, language: Language) -> Result<i64> {
    Ok(get_word_by_text(pool, text, language)
        .await?
        .with_context(|| format!("word {text} should exist"))?
        .id)
}

async fn association_count(pool: &PgPool) -> Result<i64> {
    Ok(sqlx::query_scalar("SELECT COUNT(*) FROM word_associations")
        .fetch_one(pool)
        .await?)
}

const FIVE_PAIRS: [(&str, &str); 5] = [
    ("кот", "cat"),
    ("собака", "dog"),
    ("дом", "house"),
    ("дерево", "tree"),
    ("вода", "water"),
];

#[tokio::test]
async fn test_get_or_create_is_idempotent() -> Result<()> {
    skip_if_no_db!(test_get_or_create_is_idempotent_impl)
}

async fn test_get_or_create_is_idempotent_impl(pool: &PgPool) -> Result<()> {
    let first = get_or_create_user(pool, 12345).await?.context("user created")?;
    let second = get_or_create_user(pool, 12345).await?.context("user found")?;
    assert_eq!(first.id, second.id);
    assert_eq!(first.external_id, 12345);

    let users: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
        .fetch_one(pool)
        .await?;
    assert_eq!(users, 1);

    let word = get_or_create_word(pool, "кот", Language::Russian)
        .await?
        .context("word created")?;
    let again = get_or_create_word(pool, "кот", Language::Russian)
        .await?
        .context("word found")?;
    assert_eq!(word.id, again.id);
    assert_eq!(word.language, Language::Russian);

    // Same text in the other language is a different row
    let english = get_or_create_word(pool, "кот", Language::English)
        .await?
        .context("english word created")?;
    assert_eq!(english.language, Language::English);

    let russian_words: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM russian_words")
        .fetch_one(pool)
        .await?;
    assert_eq!(russian_words, 1);

    assert_eq!(get_user_by_external_id(pool, 999).await?, None);
    assert_eq!(get_word_by_text(pool, "dog", Language::English).await?, None);

    Ok(())
}

#[tokio::test]
async fn test_association_is_unique_per_user() -> Result<()> {
    skip_if_no_db!(test_association_is_unique_per_user_impl)
}

async fn test_association_is_unique_per_user_impl(pool: &PgPool) -> Result<()> {
    let user = get_or_create_user(pool, 1).await?.context("user")?;
    let ru = get_or_create_word(pool, "кот", Language::Russian).await?.context("ru")?;
    let en = get_or_create_word(pool, "cat", Language::English).await?.context("en")?;

    let first = create_association(pool, ru.id, en.id, user.id).await?;
    match first {
        InsertOutcome::Created(association) => {
            assert_eq!(association.russian_word_id, ru.id);
            assert_eq!(association.english_word_id, en.id);
            assert_eq!(association.user_id, user.id);
        }
        other => panic!("expected a new association, got {other:?}"),
    }

    let second = create_association(pool, ru.id, en.id, user.id).await?;
    assert_eq!(second, InsertOutcome::AlreadyExists);
    assert_eq!(association_count(pool).await?, 1);

    // Another user may hold the same pair
    let other = get_or_create_user(pool, 2).await?.context("other user")?;
    assert!(create_association(pool, ru.id, en.id, other.id).await?.is_created());
    assert_eq!(association_count(pool).await?, 2);

    // Unknown word ids are rejected by the foreign keys
    let rejected = create_association(pool, ru.id, en.id + 1000, user.id).await?;
    assert_eq!(rejected, InsertOutcome::Rejected);

    Ok(())
}

#[tokio::test]
async fn test_duplicate_add_creates_one_row() -> Result<()> {
    skip_if_no_db!(test_duplicate_add_creates_one_row_impl)
}

async fn test_duplicate_add_creates_one_row_impl(pool: &PgPool) -> Result<()> {
    let first = add_word_pair(pool, 42, "кот", "cat").await?;
    assert!(first.is_created());

    let second = add_word_pair(pool, 42, "кот", "cat").await?;
    assert_eq!(second, InsertOutcome::AlreadyExists);

    assert_eq!(association_count(pool).await?, 1);
    let stats = count_dictionary(pool, 42).await?;
    assert_eq!(stats.own_pairs, 1);
    assert_eq!(stats.shared_pairs, 1);
    assert_eq!(stats.learned, 0);

    Ok(())
}

#[tokio::test]
async fn test_delete_removes_only_orphaned_translations() -> Result<()> {
    skip_if_no_db!(test_delete_removes_only_orphaned_translations_impl)
}

async fn test_delete_removes_only_orphaned_translations_impl(pool: &PgPool) -> Result<()> {
    add_pairs(pool, 1, &[("кот", "cat"), ("кот", "tomcat")]).await?;

    // "cat" is English; "кот" keeps another translation
    match delete_word_by_text(pool, "cat").await? {
        DeleteOutcome::Deleted {
            language,
            removed_translations,
            associations_removed,
        } => {
            assert_eq!(language, Language::English);
            assert!(removed_translations.is_empty());
            assert_eq!(associations_removed, 1);
        }
        DeleteOutcome::NotFound => panic!("cat should have been found"),
    }

    assert_eq!(get_word_by_text(pool, "cat", Language::English).await?, None);
    assert!(get_word_by_text(pool, "кот", Language::Russian).await?.is_some());
    assert!(get_word_by_text(pool, "tomcat", Language::English).await?.is_some());
    assert_eq!(association_count(pool).await?, 1);

    // Deleting "кот" now orphans "tomcat"
    match delete_word_by_text(pool, "кот").await? {
        DeleteOutcome::Deleted {
            language,
            removed_translations,
            associations_removed,
        } => {
            assert_eq!(language, Language::Russian);
            assert_eq!(removed_translations, vec!["tomcat".to_string()]);
            assert_eq!(associations_removed, 1);
        }
        DeleteOutcome::NotFound => panic!("кот should have been found"),
    }

    assert_eq!(get_word_by_text(pool, "tomcat", Language::English).await?, None);
    assert_eq!(association_count(pool).await?, 0);

    assert_eq!(delete_word_by_text(pool, "кот").await?, DeleteOutcome::NotFound);

    Ok(())
}

#[tokio::test]
async fn test_delete_word_shared_by_two_users() -> Result<()> {
    skip_if_no_db!(test_delete_word_shared_by_two_users_impl)
}

async fn test_delete_word_shared_by_two_users_impl(pool: &PgPool) -> Result<()> {
    add_pairs(pool, 1, &[("кот", "cat")]).await?;
    add_pairs(pool, 2, &[("котик", "cat"), ("котик", "kitten")]).await?;

    match delete_word_by_text(pool, "cat").await? {
        DeleteOutcome::Deleted {
            removed_translations,
            associations_removed,
            ..
        } => {
            assert_eq!(associations_removed, 2);
            assert_eq!(removed_translations, vec!["кот".to_string()]);
        }
        DeleteOutcome::NotFound => panic!("cat should have been found"),
    }

    assert_eq!(get_word_by_text(pool, "кот", Language::Russian).await?, None);
    assert!(get_word_by_text(pool, "котик", Language::Russian).await?.is_some());
    assert!(get_word_by_text(pool, "kitten", Language::English).await?.is_some());
    assert_eq!(association_count(pool).await?, 1);

    Ok(())
}

#[tokio::test]
async fn test_learned_pairs_are_never_studied() -> Result<()> {
    skip_if_no_db!(test_learned_pairs_are_never_studied_impl)
}

async fn test_learned_pairs_are_never_studied_impl(pool: &PgPool) -> Result<()> {
    let user_id = add_pairs(pool, 7, &FIVE_PAIRS).await?;

    let mut learned = HashSet::new();
    for (ru, en) in &FIVE_PAIRS[..3] {
        let pair = (
            word_id(pool, ru, Language::Russian).await?,
            word_id(pool, en, Language::English).await?,
        );
        assert!(mark_learned(pool, pair.0, pair.1, user_id).await?.is_created());
        learned.insert(pair);
    }

    for _ in 0..30 {
        let round = get_words_for_study(pool, Scope::MyWords, Direction::RuEn, 7)
            .await?
            .context("two pairs are still unlearned")?;
        assert!(!learned.contains(&(round.russian_word_id, round.english_word_id)));
    }

    for (ru, en) in &FIVE_PAIRS[3..] {
        let ru = word_id(pool, ru, Language::Russian).await?;
        let en = word_id(pool, en, Language::English).await?;
        assert!(mark_learned(pool, ru, en, user_id).await?.is_created());
    }

    assert_eq!(
        get_words_for_study(pool, Scope::MyWords, Direction::RuEn, 7).await?,
        None
    );
    assert_eq!(
        get_words_for_study(pool, Scope::AllWords, Direction::EnRu, 7).await?,
        None
    );

    // Unknown user
    assert_eq!(
        get_words_for_study(pool, Scope::AllWords, Direction::RuEn, 404).await?,
        None
    );

    Ok(())
}

#[tokio::test]
async fn test_study_round_composition() -> Result<()> {
    skip_if_no_db!(test_study_round_composition_impl)
}

async fn test_study_round_composition_impl(pool: &PgPool) -> Result<()> {
    add_pairs(pool, 0, &FIVE_PAIRS).await?;
    get_or_create_user(pool, 8).await?.context("learner")?;

    let mut positions = HashSet::new();
    for _ in 0..100 {
        let round = get_words_for_study(pool, Scope::AllWords, Direction::EnRu, 8)
            .await?
            .context("shared dictionary has words")?;

        assert!(round.is_complete());
        assert_eq!(round.words().len(), 5);
        assert_eq!(round.words()[0], round.prompt);
        assert_eq!(
            round.options.iter().filter(|o| **o == round.target).count(),
            1
        );

        // English prompt, Russian options
        assert!(FIVE_PAIRS.iter().any(|(ru, en)| *en == round.prompt && *ru == round.target));
        assert!(round
            .options
            .iter()
            .all(|option| FIVE_PAIRS.iter().any(|(ru, _)| ru == option)));

        positions.insert(round.target_position().context("target among options")?);
    }

    assert!(positions.len() > 1, "target always at {positions:?}");

    // The learner has no pairs of their own
    assert_eq!(
        get_words_for_study(pool, Scope::MyWords, Direction::RuEn, 8).await?,
        None
    );

    Ok(())
}

#[tokio::test]
async fn test_small_dictionary_gives_incomplete_round() -> Result<()> {
    skip_if_no_db!(test_small_dictionary_gives_incomplete_round_impl)
}

async fn test_small_dictionary_gives_incomplete_round_impl(pool: &PgPool) -> Result<()> {
    add_pairs(pool, 3, &FIVE_PAIRS[..2]).await?;

    let round = get_words_for_study(pool, Scope::MyWords, Direction::RuEn, 3)
        .await?
        .context("round drawn")?;
    assert_eq!(round.options.len(), 2);
    assert!(!round.is_complete());

    Ok(())
}

#[tokio::test]
async fn test_mark_learned_outcomes() -> Result<()> {
    skip_if_no_db!(test_mark_learned_outcomes_impl)
}

async fn test_mark_learned_outcomes_impl(pool: &PgPool) -> Result<()> {
    let owner = add_pairs(pool, 1, &[("кот", "cat")]).await?;
    let stranger = get_or_create_user(pool, 2).await?.context("stranger")?.id;
    let ru = word_id(pool, "кот", Language::Russian).await?;
    let en = word_id(pool, "cat", Language::English).await?;

    assert!(mark_learned(pool, ru, en, owner).await?.is_created());
    assert_eq!(mark_learned(pool, ru, en, owner).await?, InsertOutcome::AlreadyExists);

    // Not in the stranger's dictionary
    assert_eq!(mark_learned(pool, ru, en, stranger).await?, InsertOutcome::Rejected);

    assert!(unmark_learned(pool, ru, en, owner).await?);
    assert!(!unmark_learned(pool, ru, en, owner).await?);
    assert!(get_learned_words(pool, 1).await?.is_empty());

    Ok(())
}

#[tokio::test]
async fn test_reset_progress() -> Result<()> {
    skip_if_no_db!(test_reset_progress_impl)
}

async fn test_reset_progress_impl(pool: &PgPool) -> Result<()> {
    let user_id = add_pairs(pool, 5, &FIVE_PAIRS).await?;
    for (ru, en) in &FIVE_PAIRS[..4] {
        let ru = word_id(pool, ru, Language::Russian).await?;
        let en = word_id(pool, en, Language::English).await?;
        mark_learned(pool, ru, en, user_id).await?;
    }
    assert_eq!(get_learned_words(pool, 5).await?.len(), 4);
    assert_eq!(count_dictionary(pool, 5).await?.learned, 4);

    assert_eq!(reset_progress(pool, 5).await?, ResetOutcome::Reset(4));
    assert!(get_learned_words(pool, 5).await?.is_empty());

    // Nothing left to reset; dictionary untouched
    assert_eq!(reset_progress(pool, 5).await?, ResetOutcome::Reset(0));
    assert_eq!(association_count(pool).await?, 5);

    assert_eq!(reset_progress(pool, 404).await?, ResetOutcome::UserNotFound);

    Ok(())
}

#[tokio::test]
async fn test_deleting_word_cascades_to_learned_marks() -> Result<()> {
    skip_if_no_db!(test_deleting_word_cascades_to_learned_marks_impl)
}

async fn test_deleting_word_cascades_to_learned_marks_impl(pool: &PgPool) -> Result<()> {
    let user_id = add_pairs(pool, 9, &[("кот", "cat")]).await?;
    let ru = word_id(pool, "кот", Language::Russian).await?;
    let en = word_id(pool, "cat", Language::English).await?;
    mark_learned(pool, ru, en, user_id).await?;

    delete_word_by_text(pool, "кот").await?;

    assert!(get_learned_words(pool, 9).await?.is_empty());
    assert!(dictionary_is_empty(pool).await?);

    Ok(())
}

#[tokio::test]
async fn test_saving_shared_pair_adopts_it() -> Result<()> {
    skip_if_no_db!(test_saving_shared_pair_adopts_it_impl)
}

async fn test_saving_shared_pair_adopts_it_impl(pool: &PgPool) -> Result<()> {
    // Seed user 0 owns the shared dictionary
    add_pairs(pool, 0, &FIVE_PAIRS).await?;
    let learner = get_or_create_user(pool, 11).await?.context("learner")?.id;
    let ru = word_id(pool, "кот", Language::Russian).await?;
    let en = word_id(pool, "cat", Language::English).await?;

    assert_eq!(mark_learned(pool, ru, en, learner).await?, InsertOutcome::Rejected);

    match save_learned(pool, ru, en, learner).await? {
        InsertOutcome::Created(learned) => {
            assert_eq!(learned.user_id, learner);
            assert_eq!((learned.russian_word_id, learned.english_word_id), (ru, en));
        }
        other => panic!("expected the pair to be saved, got {other:?}"),
    }
    assert_eq!(save_learned(pool, ru, en, learner).await?, InsertOutcome::AlreadyExists);

    let stats = count_dictionary(pool, 11).await?;
    assert_eq!(stats.own_pairs, 1);
    assert_eq!(stats.learned, 1);
    assert_eq!(stats.shared_pairs, 5);

    for _ in 0..40 {
        let round = get_words_for_study(pool, Scope::AllWords, Direction::RuEn, 11)
            .await?
            .context("four pairs are still unlearned")?;
        assert_ne!((round.russian_word_id, round.english_word_id), (ru, en));
    }

    // Unknown word ids stay rejected
    assert_eq!(save_learned(pool, ru, en + 1000, learner).await?, InsertOutcome::Rejected);

    Ok(())
}
