//! Turns free SMS text into a typed command.
//!
//! Two keywords are understood, case-insensitively, as message prefixes:
//! - `HELP <symptoms>` → triage request
//! - `MED <item qty, item qty, ...>` → medicine order
//!
//! A keyword with too little after it is a malformed command (answered with a
//! usage hint, no AI call). Anything else is unrecognized.

use serde::Serialize;

use crate::records::OrderItem;

const HELP_KEYWORD: &str = "HELP";
const MED_KEYWORD: &str = "MED";

/// Minimum symptom length (characters) worth sending to the AI.
pub const MIN_SYMPTOM_CHARS: usize = 5;

/// Minimum order text length (characters) after the keyword.
const MIN_ORDER_CHARS: usize = 2;

/// A parsed inbound command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Command {
    /// `HELP` with usable symptom text.
    Triage { symptoms: String },
    /// `HELP` with nothing (or too little) after it.
    MalformedTriage,
    /// `MED` with at least one item.
    Order { items: Vec<OrderItem> },
    /// `MED` with no parseable items.
    MalformedOrder,
    /// Not a known command.
    Unrecognized,
}

impl Command {
    /// Short label for logging.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Triage { .. } => "triage",
            Self::MalformedTriage => "malformed_triage",
            Self::Order { .. } => "order",
            Self::MalformedOrder => "malformed_order",
            Self::Unrecognized => "unrecognized",
        }
    }
}

/// Parse raw inbound SMS text.
pub fn parse_command(text: &str) -> Command {
    let text = text.trim();

    if let Some(rest) = strip_keyword(text, HELP_KEYWORD) {
        let symptoms = rest.trim();
        if symptoms.chars().count() < MIN_SYMPTOM_CHARS {
            return Command::MalformedTriage;
        }
        return Command::Triage {
            symptoms: symptoms.to_string(),
        };
    }

    if let Some(rest) = strip_keyword(text, MED_KEYWORD) {
        let order_text = rest.trim();
        if order_text.chars().count() < MIN_ORDER_CHARS {
            return Command::MalformedOrder;
        }
        let items = parse_items(order_text);
        if items.is_empty() {
            return Command::MalformedOrder;
        }
        return Command::Order { items };
    }

    Command::Unrecognized
}

/// Split `ORS 3, Paracetamol 10` into order items.
pub fn parse_items(order_text: &str) -> Vec<OrderItem> {
    order_text
        .split(',')
        .map(str::trim)
        .filter(|phrase| !phrase.is_empty())
        .map(parse_item)
        .collect()
}

/// A trailing integer is the quantity; everything before it is the name.
/// Zero or negative quantities become 1. Without a trailing integer, the
/// whole phrase is the name and the quantity is 1.
fn parse_item(phrase: &str) -> OrderItem {
    let tokens: Vec<&str> = phrase.split_whitespace().collect();
    match tokens.split_last() {
        Some((last, name)) if !name.is_empty() => match parse_qty(last) {
            Some(qty) => OrderItem::new(name.join(" "), qty),
            None => OrderItem::new(tokens.join(" "), 1),
        },
        _ => OrderItem::new(tokens.join(" "), 1),
    }
}

/// Integer in ASCII or Bangla digits, clamped to at least 1.
fn parse_qty(token: &str) -> Option<u32> {
    let ascii: String = token
        .chars()
        .map(|c| match c {
            '০'..='৯' => char::from(b'0' + (c as u32 - '০' as u32) as u8),
            other => other,
        })
        .collect();
    let qty = ascii.parse::<i64>().ok()?;
    Some(u32::try_from(qty).ok().filter(|q| *q > 0).unwrap_or(1))
}

/// Case-insensitive prefix match; returns the text after the keyword.
fn strip_keyword<'a>(text: &'a str, keyword: &str) -> Option<&'a str> {
    let head = text.get(..keyword.len())?;
    if head.eq_ignore_ascii_case(keyword) {
        Some(&text[keyword.len()..])
    } else {
        None
    }
}
