//! Splits the AI answer into full advice and an SMS summary.
//!
//! The AI is asked to answer in two labeled sections:
//!
//! ```text
//! FULL_ADVICE:
//! ...
//! SMS_SUMMARY:
//! ...
//! ```
//!
//! Splitting is pure text processing and never fails.

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

/// Hard cap on the SMS summary, in characters.
pub const SMS_MAX_CHARS: usize = 280;

/// Characters kept before the ellipsis when the summary is over the cap.
const SMS_TRUNCATE_CHARS: usize = 275;

/// Characters of full advice used when the AI gave no summary.
const SMS_FALLBACK_CHARS: usize = 260;

const ELLIPSIS: &str = "...";

static FULL_SECTION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)FULL_ADVICE:\s*(.*?)SMS_SUMMARY:").expect("static regex")
});

static SMS_SECTION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)SMS_SUMMARY:\s*(.*)").expect("static regex"));

/// The two halves of an AI answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Advice {
    /// Long clinical answer, retained for admin review.
    pub full_advice: String,
    /// SMS-safe summary, never longer than [`SMS_MAX_CHARS`].
    pub sms_summary: String,
}

/// Split raw AI output into full advice and SMS summary.
pub fn split_advice(raw: &str) -> Advice {
    let full_advice = FULL_SECTION
        .captures(raw)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().trim().to_string())
        .unwrap_or_else(|| raw.trim().to_string());

    let mut sms_summary = SMS_SECTION
        .captures(raw)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().trim().to_string())
        .unwrap_or_default();

    if sms_summary.is_empty() {
        sms_summary = take_chars(&full_advice, SMS_FALLBACK_CHARS);
    }

    if sms_summary.chars().count() > SMS_MAX_CHARS {
        sms_summary = take_chars(&sms_summary, SMS_TRUNCATE_CHARS) + ELLIPSIS;
    }

    Advice {
        full_advice,
        sms_summary,
    }
}

fn take_chars(s: &str, n: usize) -> String {
    s.chars().take(n).collect()
}
