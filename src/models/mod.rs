// src/models/mod.rs

//! Domain models for the dashboard view layer.
//!
//! This module contains the record representation, the closed status set,
//! configuration and locale structures.

mod config;
mod locale;
mod record;

// Re-export all public types
pub use config::{
    Config, DisplayConfig, FetchConfig, GroupingSpec, SourceSpec, StatKind, StatSpec, ViewConfig,
};
pub use locale::{LocaleConfig, RelativeLabels, StatusLabels};
pub use record::{BadgeTone, Record, Status, field_text, is_present, value_text};
