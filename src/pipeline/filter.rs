//! Search and categorical filtering.
//!
//! A record is visible when the search term is a case-insensitive substring
//! of any searched field AND every active categorical filter matches exactly.
//! Filtering selects a subsequence; it never reorders.

use serde::{Deserialize, Serialize};

use crate::models::{Record, field_text};

/// Sentinel selection meaning "do not filter on this field".
pub const ALL: &str = "all";

/// An exact-match selection on one field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoricalFilter {
    pub field: String,
    pub value: String,
}

impl CategoricalFilter {
    pub fn new(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            value: value.into(),
        }
    }

    pub fn is_active(&self) -> bool {
        self.value != ALL
    }

    fn matches(&self, record: &Record) -> bool {
        !self.is_active() || field_text(record, &self.field).as_deref() == Some(self.value.as_str())
    }
}

/// Current search term and categorical selections of a view.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterState {
    pub search: String,
    pub selections: Vec<CategoricalFilter>,
}

impl FilterState {
    /// Fresh state with every given field set to [`ALL`].
    pub fn with_fields<S: AsRef<str>>(fields: &[S]) -> Self {
        Self {
            search: String::new(),
            selections: fields
                .iter()
                .map(|f| CategoricalFilter::new(f.as_ref(), ALL))
                .collect(),
        }
    }

    pub fn set_search(&mut self, term: impl Into<String>) {
        self.search = term.into();
    }

    /// Select `value` for `field`, adding the field if it was not offered.
    pub fn select(&mut self, field: &str, value: impl Into<String>) {
        let value = value.into();
        match self.selections.iter_mut().find(|s| s.field == field) {
            Some(selection) => selection.value = value,
            None => self.selections.push(CategoricalFilter::new(field, value)),
        }
    }

    /// Clear the search term and reset every selection to [`ALL`].
    pub fn reset(&mut self) {
        self.search.clear();
        for selection in &mut self.selections {
            selection.value = ALL.to_string();
        }
    }

    pub fn is_active(&self) -> bool {
        !self.search.trim().is_empty() || self.selections.iter().any(CategoricalFilter::is_active)
    }
}

/// Applies search and categorical filters over a collection.
#[derive(Debug, Clone)]
pub struct FilterEngine {
    search_fields: Vec<String>,
}

impl FilterEngine {
    pub fn new(search_fields: Vec<String>) -> Self {
        Self { search_fields }
    }

    /// Whether `record` matches the (already lowercased, trimmed) needle.
    fn matches_search(&self, record: &Record, needle: &str) -> bool {
        needle.is_empty()
            || self.search_fields.iter().any(|field| {
                field_text(record, field)
                    .map(|text| text.to_lowercase().contains(needle))
                    .unwrap_or(false)
            })
    }

    /// Records matching the search term and every active selection.
    pub fn apply<'a>(
        &self,
        records: &'a [Record],
        search: &str,
        filters: &[CategoricalFilter],
    ) -> Vec<&'a Record> {
        let needle = search.trim().to_lowercase();
        let active: Vec<&CategoricalFilter> = filters.iter().filter(|f| f.is_active()).collect();

        records
            .iter()
            .filter(|record| self.matches_search(record, &needle))
            .filter(|record| active.iter().all(|f| f.matches(record)))
            .collect()
    }

    /// Apply a [`FilterState`].
    pub fn apply_state<'a>(&self, records: &'a [Record], state: &FilterState) -> Vec<&'a Record> {
        self.apply(records, &state.search, &state.selections)
    }
}

/// Filter `records` by a search term over `fields` and categorical filters.
pub fn filter<'a>(
    records: &'a [Record],
    search: &str,
    fields: &[String],
    filters: &[CategoricalFilter],
) -> Vec<&'a Record> {
    FilterEngine::new(fields.to_vec()).apply(records, search, filters)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Value, json};

    fn records(value: Value) -> Vec<Record> {
        value
            .as_array()
            .unwrap()
            .iter()
            .map(|v| v.as_object().cloned().unwrap())
            .collect()
    }

    fn fields(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_search_and_filter_are_conjunctive() {
        let input = records(json!([
            {"t": "Math 101", "s": "approved"},
            {"t": "Math 201", "s": "pending"}
        ]));
        let out = filter(&input, "math", &fields(&["t"]), &[CategoricalFilter::new("s", "approved")]);

        assert_eq!(out.len(), 1);
        assert_eq!(out[0]["t"], json!("Math 101"));
    }

    #[test]
    fn test_empty_search_matches_everything() {
        let input = records(json!([{"t": "a"}, {"t": "b"}, {"x": 1}]));
        assert_eq!(filter(&input, "", &fields(&["t"]), &[]).len(), 3);
        assert_eq!(filter(&input, "   ", &fields(&["t"]), &[]).len(), 3);
    }

    #[test]
    fn test_search_is_trimmed_and_case_insensitive() {
        let input = records(json!([{"t": "Introduction à l'Algèbre"}, {"t": "Géométrie"}]));
        let out = filter(&input, "  ALGÈBRE ", &fields(&["t"]), &[]);
        assert_eq!(out.len(), 1);
    }

    #[test]
    fn test_search_any_field_skips_missing() {
        let input = records(json!([
            {"titre_fr": "Chimie", "titre_ar": "كيمياء"},
            {"titre_ar": "فيزياء"},
            {"code": 42}
        ]));
        let search = fields(&["titre_fr", "titre_ar", "code"]);

        assert_eq!(filter(&input, "فيزياء", &search, &[]).len(), 1);
        assert_eq!(filter(&input, "42", &search, &[]).len(), 1);
        assert_eq!(filter(&input, "chim", &fields(&["nope"]), &[]).len(), 0);
    }

    #[test]
    fn test_all_sentinel_disables_filter() {
        let input = records(json!([{"s": "approved"}, {"s": "pending"}]));
        let out = filter(&input, "", &[], &[CategoricalFilter::new("s", ALL)]);
        assert_eq!(out.len(), 2);
    }

    #[test]
    fn test_categorical_on_missing_field_never_matches() {
        let input = records(json!([{"s": "approved"}, {"t": "x"}]));
        let out = filter(&input, "", &[], &[CategoricalFilter::new("s", "approved")]);
        assert_eq!(out.len(), 1);
    }

    #[test]
    fn test_categorical_uses_string_form() {
        let input = records(json!([{"annee": 2024}, {"annee": "2023"}]));
        let out = filter(&input, "", &[], &[CategoricalFilter::new("annee", "2024")]);
        assert_eq!(out.len(), 1);
    }

    #[test]
    fn test_order_is_preserved() {
        let input = records(json!([
            {"id": 3, "t": "algebra"},
            {"id": 1, "t": "geometry"},
            {"id": 2, "t": "linear algebra"}
        ]));
        let out = filter(&input, "algebra", &fields(&["t"]), &[]);
        let ids: Vec<_> = out.iter().map(|r| r["id"].as_i64().unwrap()).collect();
        assert_eq!(ids, vec![3, 2]);
    }

    #[test]
    fn test_filter_state_lifecycle() {
        let mut state = FilterState::with_fields(&["status", "module"]);
        assert!(!state.is_active());

        state.set_search("intro");
        state.select("status", "approved");
        state.select("niveau", "L1");
        assert!(state.is_active());
        assert_eq!(state.selections.len(), 3);

        state.reset();
        assert!(!state.is_active());
        assert!(state.selections.iter().all(|s| s.value == ALL));
    }
}
