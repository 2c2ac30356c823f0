//! Row filtering and projection.
//!
//! Column visibility only decides which cells are projected; the value
//! allow-lists in [`ActiveDataFilters`] decide which rows survive. The two never
//! interact, so hiding a column keeps its value filter in force.

use crate::column::ColumnSet;
use crate::permit::NOT_AVAILABLE;
use crate::permit::Permit;
use serde::Deserialize;
use serde::Serialize;
use std::collections::BTreeMap;
use std::collections::BTreeSet;

/// Per-field allow-lists. A field without an entry is unconstrained; an entry
/// is never stored empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActiveDataFilters {
    allowed: BTreeMap<String, BTreeSet<String>>,
}

impl ActiveDataFilters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allow (`enabled = true`) or stop allowing `value` for `field`.
    /// Returns whether the filter set changed.
    pub fn toggle(&mut self, field: &str, value: &str, enabled: bool) -> bool {
        if enabled {
            return self
                .allowed
                .entry(field.to_string())
                .or_default()
                .insert(value.to_string());
        }
        let Some(values) = self.allowed.get_mut(field) else {
            return false;
        };
        let removed = values.remove(value);
        if values.is_empty() {
            self.allowed.remove(field);
        }
        removed
    }

    pub fn clear(&mut self) {
        self.allowed.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.allowed.is_empty()
    }

    pub fn allowed(&self, field: &str) -> Option<&BTreeSet<String>> {
        self.allowed.get(field)
    }

    pub fn is_allowed(&self, field: &str, value: &str) -> bool {
        self.allowed
            .get(field)
            .is_some_and(|values| values.contains(value))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &BTreeSet<String>)> {
        self.allowed.iter()
    }

    /// True when `permit` satisfies every allow-list.
    pub fn matches(&self, permit: &Permit) -> bool {
        self.allowed
            .iter()
            .all(|(field, values)| values.contains(&permit.field(field)))
    }
}

/// Distinct values offered for one filterable column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterDomain {
    pub field: String,
    pub label: String,
    pub values: Vec<String>,
}

/// Records that pass `filters`, in their original order.
pub fn apply(
    records: &[Permit],
    _columns: &ColumnSet,
    filters: &ActiveDataFilters,
) -> Vec<Permit> {
    if filters.is_empty() {
        return records.to_vec();
    }
    records
        .iter()
        .filter(|permit| filters.matches(permit))
        .cloned()
        .collect()
}

/// Sorted distinct values of every filterable column over `records`, skipping
/// blanks and the `N/A` placeholder.
pub fn filter_domains(records: &[Permit], columns: &ColumnSet) -> Vec<FilterDomain> {
    columns
        .filterable()
        .filter_map(|column| {
            let field = column.data_key()?;
            let values: BTreeSet<String> = records
                .iter()
                .map(|permit| permit.field(field))
                .filter(|value| value != NOT_AVAILABLE && !value.is_empty())
                .collect();
            Some(FilterDomain {
                field: field.to_string(),
                label: column.label.clone(),
                values: values.into_iter().collect(),
            })
        })
        .collect()
}

/// Visible cells of `permit` in column order.
pub fn project(permit: &Permit, columns: &ColumnSet) -> Vec<String> {
    columns.visible().map(|column| column.render(permit)).collect()
}
