//! Column standardization over the combined table.

use crate::data::{Column, RawTable};
use crate::types::{PipelineError, Result};

/// Standardizes every numeric column in place: `(x - mean) / std`, with
/// mean and sample standard deviation computed over the full (train+test)
/// table. Expects imputation to have run first; a remaining missing cell
/// is an error.
pub struct Standardizer;

impl Standardizer {
    pub fn standardize(table: &mut RawTable) -> Result<()> {
        let names: Vec<String> = table.names().to_vec();
        for name in names {
            let column = table.column_mut(&name)?;
            let values = match column {
                Column::Numeric(values) => values,
                Column::Categorical(_) => continue,
            };

            let n = values.len();
            if n == 0 {
                return Err(PipelineError::EmptyTable);
            }
            let mut sum = 0.0;
            for cell in values.iter() {
                sum += cell.ok_or_else(|| PipelineError::UnexpectedMissing(name.clone()))?;
            }
            let mean = sum / n as f64;

            // Sample std (n-1); a single-row table has no spread to scale by.
            let std = if n > 1 {
                let ss: f64 = values
                    .iter()
                    .map(|cell| {
                        let v = cell.unwrap_or(mean);
                        (v - mean) * (v - mean)
                    })
                    .sum();
                (ss / (n - 1) as f64).sqrt()
            } else {
                0.0
            };
            // Zero-variance guard: divide by 1.0 instead of 0.
            let std = if std < 1e-10 { 1.0 } else { std };

            for cell in values.iter_mut() {
                if let Some(v) = cell.as_mut() {
                    *v = (*v - mean) / std;
                }
            }
        }
        Ok(())
    }
}
