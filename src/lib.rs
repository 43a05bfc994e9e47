//! # Vocabulary Trainer Telegram Bot
//!
//! A Telegram bot that quizzes Russian↔English vocabulary from a shared or
//! personal dictionary stored in PostgreSQL and tracks learned words per user.

pub mod bot;
pub mod config;
pub mod db;
pub mod dialogue;
pub mod errors;
pub mod localization;
pub mod observability;
pub mod observability_config;
pub mod quiz;
pub mod seed;
pub mod session;
pub mod validation;

// Re-export types for easier access
pub use quiz::{Direction, QuizSession, Scope, StudyRound};
