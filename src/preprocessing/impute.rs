//! Missing-value imputation over the combined table.

use std::collections::BTreeMap;

use crate::data::{Column, RawTable};
use crate::types::{PipelineError, Result};

/// Fills every missing cell in place: numeric columns with the column
/// median, categorical columns with the most frequent value (ties go to
/// the lexicographically first mode). Only truly absent cells are
/// missing; non-finite values a `Propagate` ratio policy let through are
/// left alone. A column with nothing observed is a fatal error.
pub fn impute(table: &mut RawTable) -> Result<()> {
    let names: Vec<String> = table.names().to_vec();
    for name in names {
        let fill = match table.column(&name)? {
            Column::Numeric(values) => {
                if values.iter().all(Option::is_some) {
                    continue;
                }
                let observed: Vec<f64> = values.iter().flatten().copied().collect();
                if observed.is_empty() {
                    return Err(PipelineError::EmptyColumn(name));
                }
                Fill::Numeric(median(observed))
            }
            Column::Categorical(values) => {
                if values.iter().all(Option::is_some) {
                    continue;
                }
                let mode = first_mode(values).ok_or_else(|| PipelineError::EmptyColumn(name.clone()))?;
                Fill::Categorical(mode)
            }
        };

        match (table.column_mut(&name)?, fill) {
            (Column::Numeric(values), Fill::Numeric(med)) => {
                for cell in values.iter_mut() {
                    if cell.is_none() {
                        *cell = Some(med);
                    }
                }
            }
            (Column::Categorical(values), Fill::Categorical(mode)) => {
                for cell in values.iter_mut() {
                    if cell.is_none() {
                        *cell = Some(mode.clone());
                    }
                }
            }
            _ => unreachable!("column type cannot change between lookup and fill"),
        }
    }
    Ok(())
}

enum Fill {
    Numeric(f64),
    Categorical(String),
}

/// Median of the observed values (mean of the middle pair for even counts).
fn median(mut values: Vec<f64>) -> f64 {
    values.sort_by(|a, b| a.total_cmp(b));
    let mid = values.len() / 2;
    if values.len() % 2 == 0 {
        (values[mid - 1] + values[mid]) / 2.0
    } else {
        values[mid]
    }
}

fn first_mode(values: &[Option<String>]) -> Option<String> {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for value in values.iter().flatten() {
        *counts.entry(value.as_str()).or_insert(0) += 1;
    }
    let best = counts.values().copied().max()?;
    counts
        .into_iter()
        .find(|(_, count)| *count == best)
        .map(|(value, _)| value.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn median_fill() {
        let mut t = RawTable::new();
        t.push_column(
            "a",
            Column::Numeric(vec![Some(1.0), Some(2.0), None, Some(4.0)]),
        )
        .unwrap();
        impute(&mut t).unwrap();
        assert_eq!(
            t.numeric("a").unwrap(),
            &[Some(1.0), Some(2.0), Some(2.0), Some(4.0)]
        );
    }

    #[test]
    fn even_count_median_is_midpoint() {
        assert_eq!(median(vec![4.0, 1.0, 3.0, 2.0]), 2.5);
        assert_eq!(median(vec![3.0, 1.0, 2.0]), 2.0);
    }

    #[test]
    fn present_non_finite_cells_are_left_alone() {
        let mut t = RawTable::new();
        t.push_column(
            "a",
            Column::Numeric(vec![Some(1.0), Some(f64::INFINITY), None, Some(3.0)]),
        )
        .unwrap();
        impute(&mut t).unwrap();
        // The missing cell takes the median; the infinity propagates.
        assert_eq!(t.numeric("a").unwrap()[2], Some(3.0));
        assert_eq!(t.numeric("a").unwrap()[1], Some(f64::INFINITY));
    }

    #[test]
    fn mode_fill_ties_go_to_first() {
        let mut t = RawTable::new();
        t.push_column(
            "c",
            Column::Categorical(vec![
                Some("b".into()),
                Some("a".into()),
                Some("b".into()),
                Some("a".into()),
                None,
            ]),
        )
        .unwrap();
        impute(&mut t).unwrap();
        assert_eq!(t.categorical("c").unwrap()[4], Some("a".to_string()));
    }

    #[test]
    fn entirely_missing_column_fails() {
        let mut t = RawTable::new();
        t.push_column("a", Column::Numeric(vec![None, None])).unwrap();
        assert!(matches!(
            impute(&mut t).unwrap_err(),
            PipelineError::EmptyColumn(_)
        ));
    }

    #[test]
    fn complete_columns_untouched() {
        let mut t = RawTable::new();
        t.push_column("a", Column::Numeric(vec![Some(5.0), Some(7.0)]))
            .unwrap();
        impute(&mut t).unwrap();
        assert_eq!(t.numeric("a").unwrap(), &[Some(5.0), Some(7.0)]);
    }
}
