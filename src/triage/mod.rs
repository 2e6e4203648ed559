//! Triage text processing for AI answers.

pub mod advice;
pub mod prompts;
pub mod urgency;

pub use advice::{Advice, SMS_MAX_CHARS, split_advice};
pub use urgency::classify_urgency;
