use anyhow::Result;
use chrono::{Duration, Utc};
use teloxide::dispatching::dialogue::InMemStorage;
use teloxide::types::ChatId;

use vocab_trainer::db::Language;
use vocab_trainer::dialogue::{Continuation, WordDialogue, WordDialogueState};
use vocab_trainer::validation::{validate_any_word, validate_word};

/// A full add-word conversation stored the way the dispatcher stores it
#[tokio::test]
async fn test_add_word_dialogue_steps() -> Result<()> {
    let storage = InMemStorage::<WordDialogueState>::new();
    let dialogue = WordDialogue::new(storage.clone(), ChatId(77));
    let started_at = Utc::now();

    assert_eq!(dialogue.get().await?, None);

    dialogue
        .update(WordDialogueState::WaitingForRussianWord {
            user_id: 5,
            started_at,
        })
        .await?;

    let russian_word = validate_word("  Кот ", Language::Russian).expect("valid russian word");
    assert_eq!(russian_word, "кот");

    dialogue
        .update(WordDialogueState::WaitingForEnglishWord {
            user_id: 5,
            russian_word: russian_word.clone(),
            started_at,
        })
        .await?;

    match dialogue.get().await? {
        Some(WordDialogueState::WaitingForEnglishWord { russian_word, .. }) => {
            assert_eq!(russian_word, "кот");
        }
        other => panic!("Unexpected dialogue state: {other:?}"),
    }

    // Another chat has its own state
    let other_chat = WordDialogue::new(storage, ChatId(78));
    assert_eq!(other_chat.get().await?, None);

    dialogue.exit().await?;
    assert_eq!(dialogue.get().await?, None);

    Ok(())
}

#[tokio::test]
async fn test_continuation_belongs_to_its_user() -> Result<()> {
    let now = Utc::now();
    let state = WordDialogueState::WaitingForWordToDelete {
        user_id: 1,
        started_at: now,
    };
    let timeout = Duration::seconds(300);

    assert_eq!(
        state.continuation_for(1, now + Duration::seconds(10), timeout),
        Continuation::Resume(state.clone())
    );
    // Someone else in the same group chat
    assert_eq!(
        state.continuation_for(2, now + Duration::seconds(10), timeout),
        Continuation::None
    );
    assert_eq!(
        state.continuation_for(1, now + Duration::seconds(301), timeout),
        Continuation::Expired
    );
    assert_eq!(
        WordDialogueState::Idle.continuation_for(1, now, timeout),
        Continuation::None
    );

    Ok(())
}

#[tokio::test]
async fn test_dialogue_state_serialization() -> Result<()> {
    let state = WordDialogueState::WaitingForEnglishWord {
        user_id: 9,
        russian_word: "дом".to_string(),
        started_at: Utc::now(),
    };

    let json = serde_json::to_string(&state)?;
    let restored: WordDialogueState = serde_json::from_str(&json)?;
    assert_eq!(restored, state);
    assert_eq!(restored.owner(), Some(9));

    Ok(())
}

/// Input checks applied at each step of the word dialogues
#[tokio::test]
async fn test_dialogue_input_validation() -> Result<()> {
    assert_eq!(validate_word("cat", Language::Russian), Err("word-wrong-script"));
    assert_eq!(validate_word("кот", Language::English), Err("word-wrong-script"));
    assert_eq!(validate_word("   ", Language::English), Err("word-empty"));
    assert_eq!(validate_word("ice-cream", Language::English), Ok("ice-cream".to_string()));
    assert_eq!(
        validate_word(&"a".repeat(101), Language::English),
        Err("word-too-long")
    );

    // Delete accepts either language
    assert_eq!(validate_any_word("Cat"), Ok("cat".to_string()));
    assert_eq!(validate_any_word("Кот"), Ok("кот".to_string()));
    assert_eq!(validate_any_word("cat!"), Err("word-invalid-chars"));

    Ok(())
}
