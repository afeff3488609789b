//! Service layer for the dashboard application.
//!
//! - Dashboard tab state (`Dashboard`)

mod dashboard;

pub use dashboard::{Dashboard, Row};
