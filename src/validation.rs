//! Validation module for user-supplied words
//!
//! Words typed into the add/delete flows are normalized and checked here
//! before they reach the repository. Errors are localization keys so the
//! handlers can reply in the user's language.

use crate::db::Language;
use lazy_static::lazy_static;
use regex::Regex;

/// Maximum length of a stored word, in characters
pub const MAX_WORD_LENGTH: usize = 100;

lazy_static! {
    static ref ALLOWED_CHARS: Regex =
        Regex::new(r"^[\p{L}][\p{L}\s'\-]*$").expect("Invalid word regex pattern");
    static ref CYRILLIC: Regex = Regex::new(r"\p{Cyrillic}").expect("Invalid cyrillic pattern");
    static ref LATIN: Regex = Regex::new(r"\p{Latin}").expect("Invalid latin pattern");
    static ref WHITESPACE: Regex = Regex::new(r"\s+").expect("Invalid whitespace pattern");
}

/// Trim, lower-case and collapse inner whitespace
///
/// # Examples
/// ```
/// use vocab_trainer::validation::normalize_word;
///
/// assert_eq!(normalize_word("  Ice   Cream "), "ice cream");
/// assert_eq!(normalize_word("КОТ"), "кот");
/// ```
pub fn normalize_word(input: &str) -> String {
    WHITESPACE
        .replace_all(input.trim(), " ")
        .to_lowercase()
}

/// Validates a word for the given language and returns its normalized form
///
/// # Returns
/// * `Ok(String)` - The normalized word
/// * `Err(&str)` - Localization key: "word-empty", "word-too-long",
///   "word-invalid-chars" or "word-wrong-script"
///
/// # Examples
/// ```
/// use vocab_trainer::db::Language;
/// use vocab_trainer::validation::validate_word;
///
/// assert_eq!(validate_word("Cat", Language::English), Ok("cat".to_string()));
/// assert_eq!(validate_word("", Language::Russian), Err("word-empty"));
/// assert_eq!(validate_word("cat", Language::Russian), Err("word-wrong-script"));
/// ```
pub fn validate_word(input: &str, language: Language) -> Result<String, &'static str> {
    let word = normalize_word(input);

    if word.is_empty() {
        return Err("word-empty");
    }

    if word.chars().count() > MAX_WORD_LENGTH {
        return Err("word-too-long");
    }

    if !ALLOWED_CHARS.is_match(&word) {
        return Err("word-invalid-chars");
    }

    let script = match language {
        Language::Russian => &*CYRILLIC,
        Language::English => &*LATIN,
    };
    if !script.is_match(&word) {
        return Err("word-wrong-script");
    }

    Ok(word)
}

/// Validates a word that may belong to either language (used for deletion)
pub fn validate_any_word(input: &str) -> Result<String, &'static str> {
    validate_word(input, Language::Russian).or_else(|err| match err {
        "word-wrong-script" => validate_word(input, Language::English),
        other => Err(other),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_word() {
        assert_eq!(normalize_word("\tHello\n World "), "hello world");
        assert_eq!(normalize_word(""), "");
    }

    #[test]
    fn test_validate_russian_word() {
        assert_eq!(validate_word(" Котик ", Language::Russian), Ok("котик".to_string()));
        assert_eq!(
            validate_word("чёрный кот", Language::Russian),
            Ok("чёрный кот".to_string())
        );
        assert_eq!(validate_word("cat", Language::Russian), Err("word-wrong-script"));
    }

    #[test]
    fn test_validate_english_word() {
        assert_eq!(validate_word("Mother-in-law", Language::English), Ok("mother-in-law".to_string()));
        assert_eq!(validate_word("don't", Language::English), Ok("don't".to_string()));
        assert_eq!(validate_word("кот", Language::English), Err("word-wrong-script"));
    }

    #[test]
    fn test_validate_rejects_bad_input() {
        assert_eq!(validate_word("   ", Language::English), Err("word-empty"));
        assert_eq!(validate_word("cat42", Language::English), Err("word-invalid-chars"));
        assert_eq!(validate_word("/start", Language::English), Err("word-invalid-chars"));
        assert_eq!(
            validate_word(&"a".repeat(MAX_WORD_LENGTH + 1), Language::English),
            Err("word-too-long")
        );
        // Length is counted in characters, not bytes
        assert!(validate_word(&"я".repeat(MAX_WORD_LENGTH), Language::Russian).is_ok());
    }

    #[test]
    fn test_validate_any_word() {
        assert_eq!(validate_any_word("Кот"), Ok("кот".to_string()));
        assert_eq!(validate_any_word("Cat"), Ok("cat".to_string()));
        assert_eq!(validate_any_word("123"), Err("word-invalid-chars"));
    }
}
