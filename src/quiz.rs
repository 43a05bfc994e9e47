//! Quiz state machine
//!
//! A [`QuizSession`] holds everything one chat participant's lesson needs:
//! the chosen direction and dictionary scope, the current round, the words
//! shown so far and the ones answered right on the first try. Transitions are
//! plain methods so the bot handlers only translate chat events into calls.
//!
//! All randomness lives in synchronous helpers here; handlers never hold an
//! RNG across an `.await`.

use rand::seq::{IndexedRandom, SliceRandom};
use rand::Rng;
use std::collections::HashSet;
use std::time::Instant;

/// Number of entries in a complete round: prompt, target and three distractors
pub const ROUND_SIZE: usize = 5;

/// Which language is shown as the prompt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Russian prompt, English options
    RuEn,
    /// English prompt, Russian options
    EnRu,
}

impl Direction {
    /// Callback payload of the direction button
    pub fn callback_data(self) -> &'static str {
        match self {
            Direction::RuEn => "ru_en_direction",
            Direction::EnRu => "en_ru_direction",
        }
    }

    /// Button caption, identical in every language
    pub fn label(self) -> &'static str {
        match self {
            Direction::RuEn => "RU ➡️ EN",
            Direction::EnRu => "EN ➡️ RU",
        }
    }
}

/// Which dictionary the words are drawn from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    /// Every pair in the shared dictionary
    AllWords,
    /// Only pairs the user added
    MyWords,
}

impl Scope {
    pub fn callback_data(self) -> &'static str {
        match self {
            Scope::AllWords => "all_words",
            Scope::MyWords => "my_words",
        }
    }
}

/// One quiz presentation: a prompt and four shuffled options
#[derive(Debug, Clone, PartialEq)]
pub struct StudyRound {
    pub russian_word_id: i64,
    pub english_word_id: i64,
    pub prompt: String,
    pub target: String,
    /// The target plus up to three distractors, in display order
    pub options: Vec<String>,
}

impl StudyRound {
    /// Build a round, placing the target among the distractors at random
    pub fn new(
        russian_word_id: i64,
        english_word_id: i64,
        prompt: String,
        target: String,
        distractors: Vec<String>,
    ) -> Self {
        let mut options = Vec::with_capacity(distractors.len() + 1);
        options.push(target.clone());
        options.extend(distractors);
        shuffle_options(&mut options);

        Self {
            russian_word_id,
            english_word_id,
            prompt,
            target,
            options,
        }
    }

    /// The `[prompt, option1, .., option4]` layout
    pub fn words(&self) -> Vec<&str> {
        std::iter::once(self.prompt.as_str())
            .chain(self.options.iter().map(String::as_str))
            .collect()
    }

    /// Whether the round has a prompt and four non-empty options
    pub fn is_complete(&self) -> bool {
        let words = self.words();
        words.len() == ROUND_SIZE && words.iter().all(|word| !word.trim().is_empty())
    }

    /// Position of the target among the options
    pub fn target_position(&self) -> Option<usize> {
        self.options.iter().position(|option| *option == self.target)
    }

    pub fn is_option(&self, text: &str) -> bool {
        self.options.iter().any(|option| option == text)
    }
}

/// Shuffle answer options in place
pub fn shuffle_options(options: &mut [String]) {
    options.shuffle(&mut rand::rng());
}

/// Pick one pair uniformly at random
pub fn choose_pair(pairs: &[(i64, i64)]) -> Option<(i64, i64)> {
    pairs.choose(&mut rand::rng()).copied()
}

/// Pick a sticker id, if any are configured
pub fn choose_sticker(stickers: &[String]) -> Option<&str> {
    stickers.choose(&mut rand::rng()).map(String::as_str)
}

/// Pick a phrase number in `1..=count`
pub fn choose_phrase_number(count: usize) -> usize {
    if count <= 1 {
        return 1;
    }
    rand::rng().random_range(1..=count)
}

/// Accuracy as a percentage; 0 when nothing was shown
pub fn accuracy(correct: usize, shown: usize) -> f64 {
    if shown == 0 {
        return 0.0;
    }
    correct as f64 / shown as f64 * 100.0
}

/// Two-decimal display used in the lesson summary
pub fn format_accuracy(value: f64) -> String {
    format!("{:.2}", value)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum QuizPhase {
    #[default]
    Idle,
    DirectionChosen,
    AwaitingAnswer,
    AnsweredCorrect,
    LessonEnded,
}

/// What happened when a round was offered to the session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundStart {
    Started,
    /// Not enough words for a full round; the session is unchanged
    Insufficient,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnswerOutcome {
    Correct { first_try: bool },
    Incorrect { attempts_left: u32 },
    /// Attempts ran out; the caller should move on to another word
    Exhausted,
    /// The save prompt for the current round is still open; nothing was scored
    SavePending,
    /// No round is being played
    NoActiveRound,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LessonSummary {
    pub shown: usize,
    pub correct: usize,
    pub accuracy: f64,
}

/// Quiz state for one participant in one chat
#[derive(Debug, Clone)]
pub struct QuizSession {
    phase: QuizPhase,
    direction: Option<Direction>,
    scope: Option<Scope>,
    current: Option<StudyRound>,
    used_words: Vec<String>,
    correct_words: HashSet<String>,
    attempts: u32,
    counted: bool,
    max_attempts: u32,
    last_activity: Instant,
}

impl QuizSession {
    pub fn new(max_attempts: u32) -> Self {
        Self {
            phase: QuizPhase::Idle,
            direction: None,
            scope: None,
            current: None,
            used_words: Vec::new(),
            correct_words: HashSet::new(),
            attempts: 0,
            counted: false,
            max_attempts: max_attempts.max(1),
            last_activity: Instant::now(),
        }
    }

    pub fn phase(&self) -> QuizPhase {
        self.phase
    }

    pub fn direction(&self) -> Option<Direction> {
        self.direction
    }

    pub fn scope(&self) -> Option<Scope> {
        self.scope
    }

    pub fn current_round(&self) -> Option<&StudyRound> {
        self.current.as_ref()
    }

    pub fn used_words(&self) -> &[String] {
        &self.used_words
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    pub fn last_activity(&self) -> Instant {
        self.last_activity
    }

    pub fn touch(&mut self) {
        self.last_activity = Instant::now();
    }

    /// Whether the session is waiting for an option to be picked
    pub fn is_playing(&self) -> bool {
        matches!(
            self.phase,
            QuizPhase::AwaitingAnswer | QuizPhase::AnsweredCorrect
        ) && self.current.is_some()
    }

    pub fn choose_direction(&mut self, direction: Direction) {
        self.touch();
        self.direction = Some(direction);
        self.scope = None;
        self.phase = QuizPhase::DirectionChosen;
    }

    /// Return to the direction menu
    pub fn go_back(&mut self) {
        self.touch();
        self.direction = None;
        self.scope = None;
        self.phase = QuizPhase::Idle;
    }

    /// Offer a round drawn from `scope`; the scope is kept only when the round starts
    pub fn start_round_in(&mut self, scope: Scope, round: Option<StudyRound>) -> RoundStart {
        let started = self.start_round(round);
        if started == RoundStart::Started {
            self.scope = Some(scope);
        }
        started
    }

    /// Offer a freshly drawn round to the session
    ///
    /// A prompt that was already shown this lesson means every pair has been
    /// cycled, so the history starts over before the round is recorded.
    pub fn start_round(&mut self, round: Option<StudyRound>) -> RoundStart {
        self.touch();
        let round = match round {
            Some(round) if round.is_complete() => round,
            _ => return RoundStart::Insufficient,
        };

        if self.used_words.contains(&round.prompt) {
            self.used_words.clear();
            self.correct_words.clear();
        }
        self.used_words.push(round.prompt.clone());

        self.current = Some(round);
        self.attempts = 0;
        self.counted = false;
        self.phase = QuizPhase::AwaitingAnswer;
        RoundStart::Started
    }

    /// Score a picked option
    pub fn answer(&mut self, text: &str) -> AnswerOutcome {
        self.touch();
        if !self.is_playing() {
            return AnswerOutcome::NoActiveRound;
        }
        let Some(round) = self.current.as_ref() else {
            return AnswerOutcome::NoActiveRound;
        };
        if self.phase == QuizPhase::AnsweredCorrect {
            return AnswerOutcome::SavePending;
        }

        self.attempts += 1;

        if text == round.target {
            let first_try = self.attempts == 1 && !self.counted;
            if first_try {
                self.correct_words.insert(round.prompt.clone());
            }
            self.counted = true;
            self.attempts = 0;
            self.phase = QuizPhase::AnsweredCorrect;
            return AnswerOutcome::Correct { first_try };
        }

        if self.attempts >= self.max_attempts {
            AnswerOutcome::Exhausted
        } else {
            AnswerOutcome::Incorrect {
                attempts_left: self.max_attempts - self.attempts,
            }
        }
    }

    /// Pair to persist when the user accepts the save prompt
    pub fn pending_save(&self) -> Option<(i64, i64)> {
        match (self.phase, self.current.as_ref()) {
            (QuizPhase::AnsweredCorrect, Some(round)) => {
                Some((round.russian_word_id, round.english_word_id))
            }
            _ => None,
        }
    }

    /// Leave the save prompt, whatever the user chose
    pub fn finish_save(&mut self) {
        self.touch();
        if self.phase == QuizPhase::AnsweredCorrect {
            self.phase = QuizPhase::AwaitingAnswer;
        }
    }

    /// Stop the lesson and report how it went
    pub fn end_lesson(&mut self) -> LessonSummary {
        self.touch();
        let shown = self.used_words.len();
        let correct = self.correct_words.len();
        let summary = LessonSummary {
            shown,
            correct,
            accuracy: accuracy(correct, shown),
        };

        self.used_words.clear();
        self.correct_words.clear();
        self.current = None;
        self.attempts = 0;
        self.counted = false;
        self.phase = QuizPhase::LessonEnded;
        summary
    }

    /// Back to the start menu for a new lesson
    pub fn restart(&mut self) {
        self.end_lesson();
        self.direction = None;
        self.scope = None;
        self.phase = QuizPhase::Idle;
    }
}
