//! Channel adapters for message I/O.

pub mod sms;

pub use sms::{NoopSender, SmsDelivery, SmsSender, TwilioConfig, TwilioSender};
