// src/services/dashboard.rs

//! Dashboard tab service.
//!
//! Owns the latest source collections of one tab, its filter state and the
//! derived view model. Source changes rebuild every derived value; filter
//! changes only re-run the filter step.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;

use crate::models::{BadgeTone, Config, LocaleConfig, Record, Status};
use crate::pipeline::view::{Collection, collect_source, from_collections};
use crate::pipeline::{
    DateResolver, FieldReconciler, FilterState, ResolvedDate, ShapeNormalizer, ViewModel,
};
use crate::sources::{FetchFailure, SourceFetcher, fetch_all};

/// One render-ready row of the primary list.
#[derive(Debug, Clone, Serialize)]
pub struct Row {
    pub record: Record,
    pub status: Status,
    pub status_label: String,
    pub tone: BadgeTone,
    pub date: ResolvedDate,
    pub time_ago: String,
}

/// State of one dashboard tab.
pub struct Dashboard {
    config: Config,
    locale: LocaleConfig,
    resolver: DateResolver,
    normalizer: ShapeNormalizer,
    reconciler: FieldReconciler,
    collections: BTreeMap<String, Collection>,
    state: FilterState,
    view_model: ViewModel,
    failures: Vec<FetchFailure>,
}

impl Dashboard {
    pub fn new(config: Config, locale: LocaleConfig) -> Self {
        let resolver = DateResolver::new(locale.clone(), &config.display);
        let reconciler = FieldReconciler::new(config.view.alias_groups.clone());
        let state = FilterState::with_fields(&config.view.filters);

        let collections = config
            .view
            .sources
            .iter()
            .map(|spec| (spec.name.clone(), Collection::empty()))
            .collect();

        let mut dashboard = Self {
            config,
            locale,
            resolver,
            normalizer: ShapeNormalizer::new(),
            reconciler,
            collections,
            state,
            view_model: ViewModel::default(),
            failures: Vec::new(),
        };
        dashboard.rebuild();
        dashboard
    }

    /// Fetch every source and rebuild the view.
    ///
    /// Failed sources are recorded and keep an empty collection; the rest of
    /// the view is still derived.
    pub async fn load(&mut self, fetcher: &dyn SourceFetcher) -> &ViewModel {
        let outcome = fetch_all(
            fetcher,
            &self.config.view.sources,
            self.config.fetch.max_concurrent,
        )
        .await;

        for spec in &self.config.view.sources {
            let collection = match outcome.envelopes.get(&spec.name) {
                Some(envelope) => collect_source(envelope, &self.normalizer, &self.reconciler),
                None => Collection::empty(),
            };
            self.collections.insert(spec.name.clone(), collection);
        }
        self.failures = outcome.failures;

        log::info!(
            "Loaded {} source(s), {} failed",
            self.config.view.sources.len() - self.failures.len(),
            self.failures.len()
        );

        self.rebuild();
        &self.view_model
    }

    /// Replace one source's envelope, e.g. after a record was edited.
    pub fn set_source(&mut self, name: &str, envelope: &Value) {
        if self.config.view.source(name).is_none() {
            log::warn!("Ignoring update for unknown source '{}'", name);
            return;
        }
        let collection = collect_source(envelope, &self.normalizer, &self.reconciler);
        self.collections.insert(name.to_string(), collection);
        self.failures.retain(|f| f.source != name);
        self.rebuild();
    }

    pub fn set_search(&mut self, term: impl Into<String>) {
        self.state.set_search(term);
        self.refilter();
    }

    pub fn select(&mut self, field: &str, value: impl Into<String>) {
        self.state.select(field, value);
        self.refilter();
    }

    pub fn reset_filters(&mut self) {
        self.state.reset();
        self.refilter();
    }

    pub fn view_model(&self) -> &ViewModel {
        &self.view_model
    }

    pub fn filter_state(&self) -> &FilterState {
        &self.state
    }

    pub fn failures(&self) -> &[FetchFailure] {
        &self.failures
    }

    pub fn resolver(&self) -> &DateResolver {
        &self.resolver
    }

    /// Visible rows with status badges and dates resolved against now.
    pub fn rows(&self) -> Vec<Row> {
        self.rows_at(Utc::now())
    }

    pub fn rows_at(&self, now: DateTime<Utc>) -> Vec<Row> {
        let view = &self.config.view;
        self.view_model
            .records
            .iter()
            .map(|record| {
                let status = Status::of(record, &view.status_field);
                Row {
                    status,
                    status_label: status.label(&self.locale).to_string(),
                    tone: status.tone(),
                    date: self.resolver.resolve(record, &view.date_fields),
                    time_ago: self.resolver.time_ago(record, &view.date_fields, now),
                    record: record.clone(),
                }
            })
            .collect()
    }

    fn rebuild(&mut self) {
        self.view_model = from_collections(self.collections.clone(), &self.config.view, &self.state);
    }

    fn refilter(&mut self) {
        self.view_model.refilter(&self.config.view, &self.state);
    }
}
