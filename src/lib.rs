// src/lib.rs

//! dashview library
//!
//! Normalizes loosely-shaped REST responses and derives render-ready view
//! models (filtered lists, groupings, statistics) for dashboard tabs.

pub mod config;
pub mod error;
pub mod models;
pub mod pipeline;
pub mod services;
pub mod sources;
pub mod utils;
