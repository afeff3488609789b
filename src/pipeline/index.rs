//! Cross-collection grouping and aggregate counts.
//!
//! Groups records of one collection by a key field that references another
//! collection (courses by module, programmes by specialty). Indexes are
//! rebuilt from scratch whenever either collection changes; they are never
//! patched in place.
//!
//! > Example: `{"5": [{id_cours: 1, id_module: 5}], "7": []}`

use std::collections::{BTreeMap, BTreeSet, HashSet};

use serde::Serialize;

use crate::models::{Record, field_text};

/// Records grouped by the text form of a key field.
#[derive(Debug, Clone, Default, Serialize)]
pub struct GroupIndex {
    /// Field the records were grouped by
    pub key_field: String,
    /// Group key -> records, in input order within each group
    pub groups: BTreeMap<String, Vec<Record>>,
    /// Records with no usable key value
    pub unkeyed: usize,
    /// Keys contributed by the parent collection, if any
    #[serde(skip)]
    parent_keys: Option<BTreeSet<String>>,
}

impl GroupIndex {
    /// Records under `key`; empty when the key is unknown.
    pub fn get(&self, key: &str) -> &[Record] {
        self.groups.get(key).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Number of groups, including empty parent-seeded ones.
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Number of groups holding at least one record.
    pub fn non_empty_count(&self) -> usize {
        self.groups.values().filter(|g| !g.is_empty()).count()
    }

    /// Records whose key matches no parent record.
    ///
    /// Always empty for an index built without a parent collection.
    pub fn orphans(&self) -> Vec<&Record> {
        let Some(parents) = &self.parent_keys else {
            return Vec::new();
        };
        self.groups
            .iter()
            .filter(|(key, _)| !parents.contains(*key))
            .flat_map(|(_, records)| records.iter())
            .collect()
    }
}

/// Builder for constructing a [`GroupIndex`].
pub struct IndexBuilder {
    key_field: String,
    groups: BTreeMap<String, Vec<Record>>,
    parent_keys: Option<BTreeSet<String>>,
    unkeyed: usize,
}

impl IndexBuilder {
    /// Create a builder grouping by `key_field`.
    pub fn new(key_field: impl Into<String>) -> Self {
        Self {
            key_field: key_field.into(),
            groups: BTreeMap::new(),
            parent_keys: None,
            unkeyed: 0,
        }
    }

    /// Seed one (possibly empty) group per parent record.
    pub fn with_parents(mut self, parents: &[Record], parent_key: &str) -> Self {
        let keys = self.parent_keys.get_or_insert_with(BTreeSet::new);
        for parent in parents {
            if let Some(key) = group_key(parent, parent_key) {
                self.groups.entry(key.clone()).or_default();
                keys.insert(key);
            }
        }
        self
    }

    /// Add a record to its group.
    pub fn add_record(&mut self, record: &Record) {
        match group_key(record, &self.key_field) {
            Some(key) => self.groups.entry(key).or_default().push(record.clone()),
            None => self.unkeyed += 1,
        }
    }

    /// Add multiple records, preserving their order.
    pub fn add_records(&mut self, records: &[Record]) {
        for record in records {
            self.add_record(record);
        }
    }

    /// Build the final index.
    pub fn build(self) -> GroupIndex {
        if self.unkeyed > 0 {
            log::debug!(
                "{} record(s) without '{}' left out of the index",
                self.unkeyed,
                self.key_field
            );
        }
        GroupIndex {
            key_field: self.key_field,
            groups: self.groups,
            unkeyed: self.unkeyed,
            parent_keys: self.parent_keys,
        }
    }
}

fn group_key(record: &Record, field: &str) -> Option<String> {
    field_text(record, field).filter(|key| !key.trim().is_empty())
}

/// Group `records` by `key_field`.
pub fn build_index(records: &[Record], key_field: &str) -> GroupIndex {
    let mut builder = IndexBuilder::new(key_field);
    builder.add_records(records);
    builder.build()
}

/// Group `children` by `key_field`, seeding a group for every parent.
pub fn build_cross_index(
    children: &[Record],
    key_field: &str,
    parents: &[Record],
    parent_key: &str,
) -> GroupIndex {
    let mut builder = IndexBuilder::new(key_field).with_parents(parents, parent_key);
    builder.add_records(children);
    builder.build()
}

/// Count records matching a predicate.
pub fn count_by<F>(records: &[Record], predicate: F) -> usize
where
    F: Fn(&Record) -> bool,
{
    records.iter().filter(|r| predicate(*r)).count()
}

/// Count distinct values produced by `extractor`; `None` values are ignored.
pub fn count_distinct<F>(records: &[Record], extractor: F) -> usize
where
    F: Fn(&Record) -> Option<String>,
{
    records
        .iter()
        .filter_map(extractor)
        .collect::<HashSet<_>>()
        .len()
}
