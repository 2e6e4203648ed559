//! Inbound command handling for SMS text and web submissions.

pub mod parser;
pub mod replies;
pub mod validate;

pub use parser::{Command, parse_command, parse_items};
pub use validate::{ItemDraft, OrderDraft, ValidOrder, validate_symptoms};
