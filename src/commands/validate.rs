//! Validation for structured web submissions (no text parsing involved).

use serde::Deserialize;

use super::parser::MIN_SYMPTOM_CHARS;
use crate::error::{Result, ServiceError};
use crate::records::OrderItem;

const SYMPTOMS_REQUIRED: &str = "Please provide symptoms in Bangla.";
const ORDER_FIELDS_REQUIRED: &str = "Missing required fields.";

/// An order as submitted, before it becomes an [`crate::records::OrderRecord`].
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OrderDraft {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub items: Vec<ItemDraft>,
}

/// One order line as submitted. The quantity arrives as a JSON number and
/// may be absent (meaning 1) or fractional (rejected).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ItemDraft {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub qty: Option<f64>,
}

impl ItemDraft {
    fn validate(self) -> Result<OrderItem> {
        let name = non_blank(self.name).ok_or_else(missing_fields)?;
        let qty = match self.qty {
            None => 1,
            Some(q) if q.fract() == 0.0 && q >= 1.0 && q <= f64::from(u32::MAX) => q as u32,
            Some(q) => {
                return Err(ServiceError::validation(format!(
                    "Invalid qty for item \"{name}\": {q} is not a whole number of at least 1."
                )));
            }
        };
        Ok(OrderItem::new(name, qty))
    }
}

/// A draft that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidOrder {
    pub name: Option<String>,
    pub phone: String,
    pub address: String,
    pub items: Vec<OrderItem>,
}

/// Symptoms must be at least [`MIN_SYMPTOM_CHARS`] characters once trimmed.
pub fn validate_symptoms(symptoms: Option<&str>) -> Result<&str> {
    match symptoms.map(str::trim) {
        Some(s) if s.chars().count() >= MIN_SYMPTOM_CHARS => Ok(s),
        _ => Err(ServiceError::validation(SYMPTOMS_REQUIRED)),
    }
}

impl OrderDraft {
    /// Phone, address and at least one item are required; every item needs a
    /// name, and a quantity when given must be a whole number of at least 1.
    /// Blank names become `None`.
    pub fn validate(self) -> Result<ValidOrder> {
        let phone = non_blank(self.phone).ok_or_else(missing_fields)?;
        let address = non_blank(self.address).ok_or_else(missing_fields)?;

        if self.items.is_empty() {
            return Err(missing_fields());
        }

        let items = self
            .items
            .into_iter()
            .map(ItemDraft::validate)
            .collect::<Result<Vec<_>>>()?;

        Ok(ValidOrder {
            name: non_blank(self.name),
            phone,
            address,
            items,
        })
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn missing_fields() -> ServiceError {
    ServiceError::validation(ORDER_FIELDS_REQUIRED)
}
