//! Normalizes the AI's bilingual urgency line.
//!
//! Only the first line starting with the `জরুরিতা` ("Urgency") label is
//! inspected. Keyword sets are tested in precedence order; the first match
//! wins. Anything unparseable is `Unknown`, never an error.

use crate::records::UrgencyLevel;

/// Label token that opens the urgency line in the advice text.
pub const URGENCY_LABEL: &str = "জরুরিতা";

/// Paired English/Bangla keyword sets, in precedence order.
const KEYWORD_RULES: &[(&[&str], UrgencyLevel)] = &[
    (&["emergency", "জরুরি"], UrgencyLevel::Emergency),
    (&["urgent", "দ্রুত"], UrgencyLevel::Urgent),
    (&["routine", "সাধারণ"], UrgencyLevel::Routine),
    (&["self-care", "ঘরে"], UrgencyLevel::SelfCare),
];

/// "hospital" / "immediately" escalate to emergency when no class matched.
const ESCALATION_KEYWORDS: &[&str] = &["হাসপাতাল", "অবিলম্বে"];

/// Extract and normalize the urgency level from full advice text.
pub fn classify_urgency(full_advice: &str) -> UrgencyLevel {
    let Some(line) = full_advice
        .lines()
        .map(str::trim)
        .find(|l| l.starts_with(URGENCY_LABEL))
    else {
        return UrgencyLevel::Unknown;
    };

    let value = strip_label(line).to_lowercase();
    match match_keywords(&value) {
        Some(level) => level,
        None if ESCALATION_KEYWORDS.iter().any(|k| value.contains(k)) => UrgencyLevel::Emergency,
        None => UrgencyLevel::Unknown,
    }
}

/// Normalize a bare urgency value (no label) through the class keywords only.
///
/// Used for urgency strings stored by older revisions.
pub fn normalize_value(value: &str) -> UrgencyLevel {
    match_keywords(&value.to_lowercase()).unwrap_or(UrgencyLevel::Unknown)
}

fn match_keywords(value: &str) -> Option<UrgencyLevel> {
    KEYWORD_RULES
        .iter()
        .find(|(keywords, _)| keywords.iter().any(|k| value.contains(k)))
        .map(|(_, level)| *level)
}

/// `জরুরিতা: x` / `জরুরিতা - x` / `জরুরিতা x` → `x`.
fn strip_label(line: &str) -> &str {
    let rest = line
        .strip_prefix(URGENCY_LABEL)
        .unwrap_or(line)
        .trim_start();
    rest.strip_prefix(':')
        .or_else(|| rest.strip_prefix('-'))
        .unwrap_or(rest)
        .trim()
}
