//! Fixed SMS reply texts.

use uuid::Uuid;

use super::parser::Command;

pub const TRIAGE_USAGE: &str = "⚠️ লিখুন: HELP <আপনার সমস্যা>\nউদাহরণ: HELP জ্বর ৩ দিন মাথাব্যথা";

pub const ORDER_USAGE: &str = "⚠️ লিখুন: MED ORS 3, Paracetamol 10";

pub const UNRECOGNIZED_HELP: &str = "❓ কমান্ড বুঝতে পারিনি।\n\nডাক্তার পরামর্শ:\nHELP <সমস্যা>\n\nওষুধ অর্ডার:\nMED ORS 3, Paracetamol 10";

/// Sent when processing failed after the message was accepted.
pub const SERVICE_APOLOGY: &str = "⚠️ দুঃখিত, এই মুহূর্তে সেবা দেওয়া যাচ্ছে না। কিছুক্ষণ পর আবার চেষ্টা করুন।";

/// Address recorded for orders placed by SMS; staff call back to confirm.
pub const SMS_ORDER_ADDRESS: &str = "SMS user (call for address)";

/// Confirmation for an accepted SMS order.
pub fn order_confirmation(order_id: Uuid) -> String {
    format!(
        "✅ অর্ডার গ্রহণ করা হয়েছে!\nOrder ID: {order_id}\nআমরা ফোন করে ঠিকানা নিশ্চিত করবো।"
    )
}

impl Command {
    /// Reply for commands answered without any processing.
    ///
    /// `None` for well-formed triage and order commands.
    pub fn usage_hint(&self) -> Option<&'static str> {
        match self {
            Self::MalformedTriage => Some(TRIAGE_USAGE),
            Self::MalformedOrder => Some(ORDER_USAGE),
            Self::Unrecognized => Some(UNRECOGNIZED_HELP),
            Self::Triage { .. } | Self::Order { .. } => None,
        }
    }
}
