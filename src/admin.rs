//! Admin review views over the two record collections.
//!
//! An [`AdminSnapshot`] is loaded from the stores on demand and filtered in
//! memory. Nothing is cached between requests.

use serde::Deserialize;

use crate::error::{Result, ServiceError};
use crate::records::{OrderRecord, OrderStatus, TriageRecord, UrgencyLevel};
use crate::service::TriageService;

/// Filter value meaning "no filter".
const ALL: &str = "all";

/// Query for the triage review list.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TriageFilter {
    /// Case-insensitive search over id, phone, symptoms and advice.
    pub q: Option<String>,
    /// Urgency key, or `all`.
    pub urgency: Option<String>,
    pub limit: Option<usize>,
}

/// Query for the order review list.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OrderFilter {
    /// Case-insensitive search over id, phone, address and name.
    pub q: Option<String>,
    /// Order status, or `all`.
    pub status: Option<String>,
    pub limit: Option<usize>,
}

/// Point-in-time copy of both collections.
#[derive(Debug, Clone)]
pub struct AdminSnapshot {
    pub triage: Vec<TriageRecord>,
    pub orders: Vec<OrderRecord>,
}

impl AdminSnapshot {
    /// Reload both collections from the stores.
    pub async fn load(service: &TriageService) -> Result<Self> {
        Ok(Self {
            triage: service.list_triage_records().await?,
            orders: service.list_orders().await?,
        })
    }

    /// Triage records matching `filter`, newest first.
    pub fn triage_view(&self, filter: &TriageFilter) -> Result<Vec<TriageRecord>> {
        let urgency = parse_filter::<UrgencyLevel>(filter.urgency.as_deref(), "urgency")?;
        let query = normalized_query(filter.q.as_deref());

        let matches = self.triage.iter().filter(|r| {
            urgency.is_none_or(|u| r.urgency == u)
                && query.as_deref().is_none_or(|q| {
                    contains(&r.id.to_string(), q)
                        || r.phone.as_deref().is_some_and(|p| contains(p, q))
                        || contains(&r.symptoms, q)
                        || contains(&r.ai_reply, q)
                })
        });

        Ok(take(matches, filter.limit))
    }

    /// Orders matching `filter`, newest first.
    pub fn order_view(&self, filter: &OrderFilter) -> Result<Vec<OrderRecord>> {
        let status = parse_filter::<OrderStatus>(filter.status.as_deref(), "status")?;
        let query = normalized_query(filter.q.as_deref());

        let matches = self.orders.iter().filter(|o| {
            status.is_none_or(|s| o.status == s)
                && query.as_deref().is_none_or(|q| {
                    contains(&o.id.to_string(), q)
                        || contains(&o.phone, q)
                        || contains(&o.address, q)
                        || o.name.as_deref().is_some_and(|n| contains(n, q))
                })
        });

        Ok(take(matches, filter.limit))
    }
}

fn parse_filter<T: std::str::FromStr<Err = String>>(
    value: Option<&str>,
    field: &str,
) -> Result<Option<T>> {
    match value.map(|v| v.trim().to_lowercase()) {
        None => Ok(None),
        Some(v) if v.is_empty() || v == ALL => Ok(None),
        Some(v) => v
            .parse::<T>()
            .map(Some)
            .map_err(|e| ServiceError::validation(format!("Invalid {field} filter: {e}"))),
    }
}

fn normalized_query(q: Option<&str>) -> Option<String> {
    q.map(|q| q.trim().to_lowercase()).filter(|q| !q.is_empty())
}

fn contains(haystack: &str, needle_lower: &str) -> bool {
    haystack.to_lowercase().contains(needle_lower)
}

fn take<'a, T: Clone + 'a>(iter: impl Iterator<Item = &'a T>, limit: Option<usize>) -> Vec<T> {
    iter.take(limit.unwrap_or(usize::MAX)).cloned().collect()
}
