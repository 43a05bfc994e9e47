//! Callbacks module for handling all inline keyboard callback queries
//!
//! - `callback_handler`: Main routing handler for all callback queries
//! - `callback_types`: Payload parsing and callback answers
//! - `quiz_callbacks`: Direction, scope, save prompt and lesson end
//! - `progress_callbacks`: Progress reset confirmation

pub mod callback_handler;
pub mod callback_types;
pub mod progress_callbacks;
pub mod quiz_callbacks;
