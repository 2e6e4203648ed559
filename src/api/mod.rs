//! HTTP surface.

pub mod routes;

pub use routes::{AppState, app_routes};
