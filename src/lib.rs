//! ShasthoBondhu: symptom triage and medicine orders over web and SMS.

pub mod admin;
pub mod api;
pub mod channels;
pub mod commands;
pub mod config;
pub mod error;
pub mod llm;
pub mod records;
pub mod service;
pub mod store;
pub mod triage;
