//! Fetch collaborators for dashboard sources.
//!
//! A [`SourceFetcher`] resolves a source path to a decoded JSON body. The
//! body's shape is not assumed; the pipeline normalizes whatever arrives.
//!
//! - [`HttpFetcher`]: the backend REST API
//! - [`DirectoryFetcher`]: JSON fixtures on disk, `{root}/{path}.json`

pub mod http;
pub mod local;

use std::collections::BTreeMap;

use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use serde::Serialize;
use serde_json::Value;

use crate::error::Result;
use crate::models::SourceSpec;

pub use http::HttpFetcher;
pub use local::DirectoryFetcher;

/// Trait for source fetch backends.
#[async_trait]
pub trait SourceFetcher: Send + Sync {
    /// Fetch the JSON body behind `path`.
    async fn request(&self, path: &str) -> Result<Value>;
}

/// A source that could not be fetched in a load cycle.
#[derive(Debug, Clone, Serialize)]
pub struct FetchFailure {
    pub source: String,
    pub message: String,
}

/// Result of fetching every source of a view.
#[derive(Debug, Default)]
pub struct FetchOutcome {
    /// Envelopes of the sources that resolved
    pub envelopes: BTreeMap<String, Value>,
    /// Sources that failed; their collections stay empty
    pub failures: Vec<FetchFailure>,
}

/// Fetch all sources concurrently, bounded by `max_concurrent`.
///
/// No ordering is guaranteed between fetches. A failed fetch is recorded
/// and does not abort the others.
pub async fn fetch_all(
    fetcher: &dyn SourceFetcher,
    sources: &[SourceSpec],
    max_concurrent: usize,
) -> FetchOutcome {
    let mut outcome = FetchOutcome::default();

    let mut results = stream::iter(sources)
        .map(|spec| async move { (spec, fetcher.request(&spec.path).await) })
        .buffer_unordered(max_concurrent.max(1));

    while let Some((spec, result)) = results.next().await {
        match result {
            Ok(body) => {
                outcome.envelopes.insert(spec.name.clone(), body);
            }
            Err(error) => {
                log::warn!("Failed to fetch source {} ({}): {}", spec.name, spec.path, error);
                outcome.failures.push(FetchFailure {
                    source: spec.name.clone(),
                    message: error.to_string(),
                });
            }
        }
    }

    outcome
}
