//! Read-only queries over a directory snapshot. All string comparisons are
//! case-insensitive.

use std::collections::{BTreeSet, HashMap};

use serde::Serialize;

use crate::models::employee::{EmployeeField, EmployeeRecord};

pub const MAX_SUGGESTIONS: usize = 10;

#[derive(Serialize, Debug, Default, PartialEq)]
pub struct SearchResult {
    pub suggestions: Vec<String>,
    pub employees: Vec<EmployeeRecord>,
}

/// Records where `query` occurs in any field. An empty query returns everything.
pub fn global_search(records: &[EmployeeRecord], query: &str) -> Vec<EmployeeRecord> {
    let needle = query.to_lowercase();
    if needle.is_empty() {
        return records.to_vec();
    }
    records
        .iter()
        .filter(|r| r.values().any(|v| v.to_lowercase().contains(&needle)))
        .cloned()
        .collect()
}

/// Autocomplete plus result filtering on a single field.
///
/// Unknown or missing fields fall back to a global search with no suggestions.
pub fn field_search(
    records: &[EmployeeRecord],
    query: &str,
    field: Option<&str>,
) -> SearchResult {
    let Some(field) = field.and_then(EmployeeField::searchable) else {
        return SearchResult {
            suggestions: Vec::new(),
            employees: global_search(records, query),
        };
    };

    let values = distinct(records, field);
    let needle = query.to_lowercase();

    if needle.is_empty() {
        return SearchResult {
            suggestions: values.into_iter().take(MAX_SUGGESTIONS).collect(),
            employees: records.to_vec(),
        };
    }

    // BTreeSet iteration keeps both partitions sorted.
    let (prefix, inner): (Vec<String>, Vec<String>) = values
        .into_iter()
        .filter(|v| v.to_lowercase().contains(&needle))
        .partition(|v| v.to_lowercase().starts_with(&needle));

    let suggestions = prefix.into_iter().chain(inner).take(MAX_SUGGESTIONS).collect();

    let employees = records
        .iter()
        .filter(|r| {
            r.get(field)
                .map(|v| v.to_lowercase().contains(&needle))
                .unwrap_or(false)
        })
        .cloned()
        .collect();

    SearchResult { suggestions, employees }
}

/// Exact-match AND filter. Empty criteria values are ignored.
pub fn filter(
    records: &[EmployeeRecord],
    criteria: &HashMap<EmployeeField, String>,
) -> Vec<EmployeeRecord> {
    let active: Vec<(EmployeeField, String)> = criteria
        .iter()
        .map(|(field, value)| (*field, value.trim().to_lowercase()))
        .filter(|(_, value)| !value.is_empty())
        .collect();

    records
        .iter()
        .filter(|r| {
            active.iter().all(|(field, wanted)| {
                r.get(*field)
                    .map(|v| v.to_lowercase() == *wanted)
                    .unwrap_or(false)
            })
        })
        .cloned()
        .collect()
}

pub fn department_employees(records: &[EmployeeRecord], department: &str) -> Vec<EmployeeRecord> {
    let mut criteria = HashMap::new();
    criteria.insert(EmployeeField::Department, department.to_string());
    filter(records, &criteria)
}

/// Distinct non-empty values of `field`, sorted.
pub fn distinct(records: &[EmployeeRecord], field: EmployeeField) -> BTreeSet<String> {
    records
        .iter()
        .filter_map(|r| r.get(field))
        .filter(|v| !v.is_empty())
        .map(|v| v.to_string())
        .collect()
}
