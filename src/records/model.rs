//! Triage records, medicine orders and their enums.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

use crate::triage::urgency;

/// Which channel an interaction arrived on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Source {
    /// Browser form posting JSON.
    Web,
    /// Twilio SMS webhook.
    Sms,
    /// Locally-hosted SMS gateway relay.
    SmsLocal,
}

impl Source {
    /// Whether replies on this channel go out as SMS (summary only).
    pub fn is_sms(&self) -> bool {
        matches!(self, Self::Sms | Self::SmsLocal)
    }
}

impl std::fmt::Display for Source {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Web => write!(f, "web"),
            Self::Sms => write!(f, "sms"),
            Self::SmsLocal => write!(f, "sms-local"),
        }
    }
}

/// Normalized triage urgency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum UrgencyLevel {
    Emergency,
    Urgent,
    Routine,
    SelfCare,
    Unknown,
}

impl UrgencyLevel {
    /// Wire key for this level.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Emergency => "emergency",
            Self::Urgent => "urgent",
            Self::Routine => "routine",
            Self::SelfCare => "self-care",
            Self::Unknown => "unknown",
        }
    }
}

impl Default for UrgencyLevel {
    fn default() -> Self {
        Self::Unknown
    }
}

impl std::fmt::Display for UrgencyLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for UrgencyLevel {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "emergency" => Ok(Self::Emergency),
            "urgent" => Ok(Self::Urgent),
            "routine" => Ok(Self::Routine),
            "self-care" => Ok(Self::SelfCare),
            "unknown" => Ok(Self::Unknown),
            _ => Err(format!("Unknown urgency level: {}", s)),
        }
    }
}

/// Accepts normalized keys as well as raw urgency text written by older
/// revisions (e.g. `"জরুরি (Emergency)"`). Never fails on a string value.
impl<'de> Deserialize<'de> for UrgencyLevel {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Option::<String>::deserialize(deserializer)?.unwrap_or_default();
        let trimmed = raw.trim().to_lowercase();
        Ok(trimmed
            .parse()
            .unwrap_or_else(|_| urgency::normalize_value(&trimmed)))
    }
}

/// Fulfilment status of a medicine order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OrderStatus {
    Pending,
    Confirmed,
    OutForDelivery,
    Delivered,
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Confirmed => write!(f, "confirmed"),
            Self::OutForDelivery => write!(f, "out-for-delivery"),
            Self::Delivered => write!(f, "delivered"),
        }
    }
}

impl std::str::FromStr for OrderStatus {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pending" => Ok(Self::Pending),
            "confirmed" => Ok(Self::Confirmed),
            "out-for-delivery" => Ok(Self::OutForDelivery),
            "delivered" => Ok(Self::Delivered),
            _ => Err(format!("Unknown order status: {}", s)),
        }
    }
}

fn default_qty() -> u32 {
    1
}

/// One line of a medicine order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderItem {
    pub name: String,
    #[serde(default = "default_qty")]
    pub qty: u32,
}

impl OrderItem {
    pub fn new(name: impl Into<String>, qty: u32) -> Self {
        Self {
            name: name.into(),
            qty,
        }
    }
}

/// Persisted outcome of one symptom submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TriageRecord {
    pub id: Uuid,
    pub source: Source,
    pub phone: Option<String>,
    pub symptoms: String,
    /// Full AI advice, kept for admin review even when only the summary was sent.
    pub ai_reply: String,
    #[serde(default)]
    pub urgency: UrgencyLevel,
    pub created_at: DateTime<Utc>,
}

impl TriageRecord {
    pub fn new(
        source: Source,
        phone: Option<String>,
        symptoms: impl Into<String>,
        ai_reply: impl Into<String>,
        urgency: UrgencyLevel,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            source,
            phone,
            symptoms: symptoms.into(),
            ai_reply: ai_reply.into(),
            urgency,
            created_at: Utc::now(),
        }
    }
}

/// Persisted medicine order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderRecord {
    pub id: Uuid,
    pub source: Source,
    pub name: Option<String>,
    pub phone: String,
    pub address: String,
    pub items: Vec<OrderItem>,
    pub status: OrderStatus,
    pub assigned_to: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl OrderRecord {
    /// A fresh order: `pending`, unassigned.
    pub fn new(
        source: Source,
        name: Option<String>,
        phone: impl Into<String>,
        address: impl Into<String>,
        items: Vec<OrderItem>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            source,
            name,
            phone: phone.into(),
            address: address.into(),
            items,
            status: OrderStatus::Pending,
            assigned_to: None,
            created_at: Utc::now(),
        }
    }

    /// Items rendered as `name×qty, ...` for logs and search.
    pub fn items_summary(&self) -> String {
        self.items
            .iter()
            .map(|i| format!("{}×{}", i.name, i.qty))
            .collect::<Vec<_>>()
            .join(", ")
    }
}
