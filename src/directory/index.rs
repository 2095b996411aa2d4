use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Arc, Mutex};

use super::query::distinct;
use super::store::Snapshot;
use crate::models::employee::EmployeeField;

pub type FieldValues = BTreeMap<&'static str, BTreeSet<String>>;

/// Distinct values of every searchable field, keyed by plural name
/// (`departments`, `locations`, ...).
pub fn distinct_values(snapshot: &Snapshot) -> FieldValues {
    EmployeeField::SEARCHABLE
        .into_iter()
        .map(|field| (field.plural_key(), distinct(&snapshot.records, field)))
        .collect()
}

/// Caches `distinct_values` per snapshot version. A reload produces a new
/// version, so values from an older snapshot are never served.
#[derive(Default)]
pub struct AttributeIndex {
    cached: Mutex<Option<(u64, Arc<FieldValues>)>>,
}

impl AttributeIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn values(&self, snapshot: &Snapshot) -> Arc<FieldValues> {
        let mut cached = match self.cached.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        if let Some((version, values)) = cached.as_ref() {
            if *version == snapshot.version {
                return Arc::clone(values);
            }
        }
        let values = Arc::new(distinct_values(snapshot));
        *cached = Some((snapshot.version, Arc::clone(&values)));
        values
    }
}
