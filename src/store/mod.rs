//! Persistence for triage records and medicine orders.

pub mod json;

pub use json::{RecordStore, StoredRecord};

use std::path::Path;

use uuid::Uuid;

use crate::records::{OrderRecord, TriageRecord};

/// Collection holding triage records.
pub const TRIAGE_COLLECTION: &str = "doctor_requests";

/// Collection holding medicine orders.
pub const ORDER_COLLECTION: &str = "medicine_orders";

impl StoredRecord for TriageRecord {
    fn id(&self) -> Uuid {
        self.id
    }
}

impl StoredRecord for OrderRecord {
    fn id(&self) -> Uuid {
        self.id
    }
}

/// The two collections the service persists.
#[derive(Debug, Clone)]
pub struct Stores {
    pub triage: RecordStore<TriageRecord>,
    pub orders: RecordStore<OrderRecord>,
}

impl Stores {
    /// Open both collections under `data_dir`. Files are created lazily.
    pub fn open(data_dir: &Path) -> Self {
        Self {
            triage: RecordStore::new(data_dir, TRIAGE_COLLECTION),
            orders: RecordStore::new(data_dir, ORDER_COLLECTION),
        }
    }
}
