// src/pipeline/view.rs

//! View-model composition.
//!
//! fetch -> normalize -> reconcile -> index -> filter -> render-ready list.
//! Every derived value is recomputed from the latest source collections; a
//! source that normalizes to nothing only empties its own part of the view.

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::Value;

use crate::models::{Record, StatKind, Status, ViewConfig, field_text};
use crate::pipeline::filter::{FilterEngine, FilterState};
use crate::pipeline::index::{GroupIndex, build_cross_index, build_index, count_by, count_distinct};
use crate::pipeline::normalize::{Shape, ShapeNormalizer};
use crate::pipeline::reconcile::FieldReconciler;

/// One normalized, reconciled source collection.
#[derive(Debug, Clone, Serialize)]
pub struct Collection {
    pub shape: Shape,
    pub records: Vec<Record>,
}

impl Collection {
    pub fn empty() -> Self {
        Self {
            shape: Shape::Unrecognized,
            records: Vec::new(),
        }
    }
}

/// Render-ready state of one dashboard tab.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ViewModel {
    /// Visible records of the primary source, in source order
    pub records: Vec<Record>,
    /// Groupings by name
    pub indexes: BTreeMap<String, GroupIndex>,
    /// Statistics by name
    pub stats: BTreeMap<String, usize>,
    /// All source collections by name
    #[serde(skip)]
    pub collections: BTreeMap<String, Collection>,
}

impl ViewModel {
    /// Records of a named source, or an empty slice.
    pub fn collection(&self, name: &str) -> &[Record] {
        self.collections
            .get(name)
            .map(|c| c.records.as_slice())
            .unwrap_or(&[])
    }

    pub fn stat(&self, name: &str) -> Option<usize> {
        self.stats.get(name).copied()
    }

    /// Re-run only the filter step after a filter state change.
    pub fn refilter(&mut self, config: &ViewConfig, state: &FilterState) {
        self.records = visible_records(&self.collections, config, state);
    }
}

/// Normalize and reconcile one envelope.
pub fn collect_source(
    envelope: &Value,
    normalizer: &ShapeNormalizer,
    reconciler: &FieldReconciler,
) -> Collection {
    let shape = normalizer.detect(envelope);
    let items = normalizer.normalize(envelope);
    Collection {
        shape,
        records: reconciler.reconcile_all(&items),
    }
}

/// Normalize every configured source. Sources absent from `sources` become
/// empty collections.
pub fn collect_sources(
    sources: &BTreeMap<String, Value>,
    config: &ViewConfig,
) -> BTreeMap<String, Collection> {
    let normalizer = ShapeNormalizer::new();
    let reconciler = FieldReconciler::new(config.alias_groups.clone());

    let mut collections = BTreeMap::new();
    for spec in &config.sources {
        let collection = match sources.get(&spec.name) {
            Some(envelope) => collect_source(envelope, &normalizer, &reconciler),
            None => {
                log::warn!("Source '{}' missing, treating as empty", spec.name);
                Collection::empty()
            }
        };
        log::debug!(
            "Source '{}': {:?}, {} record(s)",
            spec.name,
            collection.shape,
            collection.records.len()
        );
        collections.insert(spec.name.clone(), collection);
    }
    collections
}

/// Build every configured grouping.
pub fn derive_indexes(
    collections: &BTreeMap<String, Collection>,
    config: &ViewConfig,
) -> BTreeMap<String, GroupIndex> {
    let records = |name: &str| {
        collections
            .get(name)
            .map(|c| c.records.as_slice())
            .unwrap_or(&[])
    };

    config
        .groupings
        .iter()
        .map(|grouping| {
            let children = records(&grouping.source);
            let index = match &grouping.parent {
                Some(parent) => build_cross_index(
                    children,
                    &grouping.key_field,
                    records(parent),
                    grouping.parent_key(),
                ),
                None => build_index(children, &grouping.key_field),
            };
            (grouping.name.clone(), index)
        })
        .collect()
}

/// Compute every configured statistic.
pub fn compute_stats(
    collections: &BTreeMap<String, Collection>,
    indexes: &BTreeMap<String, GroupIndex>,
    config: &ViewConfig,
) -> BTreeMap<String, usize> {
    let records = |name: &str| {
        collections
            .get(name)
            .map(|c| c.records.as_slice())
            .unwrap_or(&[])
    };

    config
        .stats
        .iter()
        .map(|stat| {
            let value = match &stat.kind {
                StatKind::Total { source } => records(source).len(),
                StatKind::Status { source, status } => count_by(records(source), |r| {
                    Status::of(r, &config.status_field) == *status
                }),
                StatKind::Equals {
                    source,
                    field,
                    value,
                } => count_by(records(source), |r| {
                    field_text(r, field).as_deref() == Some(value.as_str())
                }),
                StatKind::Distinct { source, fields } => {
                    count_distinct(records(source), |r| joined_fields(r, fields))
                }
                StatKind::Groups { grouping } => indexes
                    .get(grouping)
                    .map(GroupIndex::non_empty_count)
                    .unwrap_or(0),
            };
            (stat.name.clone(), value)
        })
        .collect()
}

fn joined_fields(record: &Record, fields: &[String]) -> Option<String> {
    let parts: Vec<String> = fields
        .iter()
        .filter_map(|f| field_text(record, f))
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect();
    (!parts.is_empty()).then(|| parts.join(" "))
}

/// Visible records of the primary source under `state`.
pub fn visible_records(
    collections: &BTreeMap<String, Collection>,
    config: &ViewConfig,
    state: &FilterState,
) -> Vec<Record> {
    let primary = collections
        .get(&config.primary)
        .map(|c| c.records.as_slice())
        .unwrap_or(&[]);

    FilterEngine::new(config.search_fields.clone())
        .apply_state(primary, state)
        .into_iter()
        .cloned()
        .collect()
}

/// Build a view model from already-fetched envelopes.
pub fn build_view_model(
    sources: &BTreeMap<String, Value>,
    config: &ViewConfig,
    state: &FilterState,
) -> ViewModel {
    let collections = collect_sources(sources, config);
    from_collections(collections, config, state)
}

/// Derive a view model from normalized collections.
pub fn from_collections(
    collections: BTreeMap<String, Collection>,
    config: &ViewConfig,
    state: &FilterState,
) -> ViewModel {
    let indexes = derive_indexes(&collections, config);
    let stats = compute_stats(&collections, &indexes, config);
    let records = visible_records(&collections, config, state);

    ViewModel {
        records,
        indexes,
        stats,
        collections,
    }
}
