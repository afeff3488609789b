//! Field alias reconciliation.
//!
//! Different endpoints name the same value differently (`created_at` vs
//! `createdAt`, legacy vs current keys). Alias groups are data: each group
//! lists interchangeable names, preferred name first.

use serde_json::Value;

use crate::models::{Record, is_present};

/// Reconciles aliased fields onto every name in their group.
#[derive(Debug, Clone, Default)]
pub struct FieldReconciler {
    alias_groups: Vec<Vec<String>>,
}

impl FieldReconciler {
    pub fn new(alias_groups: Vec<Vec<String>>) -> Self {
        Self { alias_groups }
    }

    pub fn alias_groups(&self) -> &[Vec<String>] {
        &self.alias_groups
    }

    /// Return a copy of `record` where, for each group, every name holds the
    /// first present value found in group order.
    ///
    /// Groups with no present value are left untouched, so the canonical name
    /// stays absent if it was absent.
    pub fn reconcile(&self, record: &Record) -> Record {
        let mut out = record.clone();
        for group in &self.alias_groups {
            let Some(value) = first_present(record, group) else {
                continue;
            };
            for name in group {
                out.insert(name.clone(), value.clone());
            }
        }
        out
    }

    /// Reconcile every object in a normalized collection.
    ///
    /// Items that are not objects cannot carry fields and are skipped.
    pub fn reconcile_all(&self, items: &[Value]) -> Vec<Record> {
        let mut skipped = 0usize;
        let records: Vec<Record> = items
            .iter()
            .filter_map(|item| match item.as_object() {
                Some(record) => Some(self.reconcile(record)),
                None => {
                    skipped += 1;
                    None
                }
            })
            .collect();

        if skipped > 0 {
            log::debug!("Skipped {} non-record item(s) during reconciliation", skipped);
        }
        records
    }
}

fn first_present<'a>(record: &'a Record, group: &[String]) -> Option<&'a Value> {
    group
        .iter()
        .filter_map(|name| record.get(name))
        .find(|value| is_present(value))
}

/// Reconcile a single record against the given alias groups.
pub fn reconcile(record: &Record, alias_groups: &[Vec<String>]) -> Record {
    FieldReconciler::new(alias_groups.to_vec()).reconcile(record)
}
