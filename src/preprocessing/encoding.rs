//! One-hot encoding of categorical columns.
//!
//! Two-phase contract: `fit` enumerates the categories of every
//! categorical column once (over the combined table, so train and test end
//! up with the same layout), and `encode` applies that fixed mapping. Each
//! group expands to one indicator per category plus a trailing `_NA`
//! indicator that absorbs missing and unseen values.

use std::collections::BTreeSet;

use crate::data::{Column, RawTable};
use crate::types::Result;

#[derive(Debug, Clone)]
pub struct EncodingGroup {
    pub column: String,
    /// Sorted for a deterministic layout.
    pub categories: Vec<String>,
}

impl EncodingGroup {
    /// Indicator count for this group: one per category plus the NA slot.
    pub fn width(&self) -> usize {
        self.categories.len() + 1
    }
}

#[derive(Debug, Clone, Default)]
pub struct OneHotEncoder {
    groups: Vec<EncodingGroup>,
}

impl OneHotEncoder {
    pub fn fit(table: &RawTable) -> Self {
        let mut groups = Vec::new();
        for (name, column) in table.iter() {
            let values = match column {
                Column::Categorical(values) => values,
                Column::Numeric(_) => continue,
            };
            let categories: BTreeSet<&String> = values.iter().flatten().collect();
            groups.push(EncodingGroup {
                column: name.to_string(),
                categories: categories.into_iter().cloned().collect(),
            });
        }
        Self { groups }
    }

    pub fn groups(&self) -> &[EncodingGroup] {
        &self.groups
    }

    /// Total indicator columns produced by `encode`.
    pub fn output_width(&self) -> usize {
        self.groups.iter().map(EncodingGroup::width).sum()
    }

    /// Expands the fitted groups of `table` into named indicator columns,
    /// in group order. The source categorical columns are not consumed;
    /// the caller drops them when assembling the matrix.
    pub fn encode(&self, table: &RawTable) -> Result<Vec<(String, Vec<f64>)>> {
        let mut out = Vec::with_capacity(self.output_width());
        for group in &self.groups {
            let values = table.categorical(&group.column)?;
            let mut indicators: Vec<Vec<f64>> =
                vec![vec![0.0; values.len()]; group.width()];
            for (row, cell) in values.iter().enumerate() {
                let slot = cell
                    .as_ref()
                    .and_then(|v| group.categories.binary_search(v).ok())
                    .unwrap_or(group.categories.len());
                indicators[slot][row] = 1.0;
            }
            for (slot, indicator) in indicators.into_iter().enumerate() {
                let name = match group.categories.get(slot) {
                    Some(category) => format!("{}_{}", group.column, category),
                    None => format!("{}_NA", group.column),
                };
                out.push((name, indicator));
            }
        }
        Ok(out)
    }
}
