//! Triage and order records.

pub mod model;

pub use model::*;
