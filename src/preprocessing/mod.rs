//! Combined-table preprocessing: sparse-column dropping, imputation,
//! standardization, one-hot encoding, and the train/test re-split.

pub mod encoding;
pub mod feature_engineering;
pub mod impute;
pub mod normalization;

pub use encoding::OneHotEncoder;
pub use feature_engineering::FeatureEngineer;
pub use impute::impute;
pub use normalization::Standardizer;

use ndarray::{s, Array2};

use crate::data::{Column, RawTable};
use crate::types::{PipelineError, Result};

/// Fully numeric train/test matrices with a shared column layout.
#[derive(Debug, Clone)]
pub struct FeatureMatrices {
    pub train: Array2<f64>,
    pub test: Array2<f64>,
    /// Matrix column names: standardized numerics in table order, then
    /// one-hot groups in table order.
    pub column_names: Vec<String>,
}

/// Transforms the engineered combined table into model-ready matrices.
///
/// Order matters: sparse columns are dropped before imputation so their
/// missingness never feeds a median; standardization runs on imputed
/// columns; encoding enumerates categories over the full table so both
/// splits share one layout; the split happens last, at `n_train`.
pub fn preprocess(
    mut combined: RawTable,
    n_train: usize,
    sparse_columns: &[String],
) -> Result<FeatureMatrices> {
    if n_train == 0 || n_train > combined.height() {
        return Err(PipelineError::LengthMismatch {
            expected: combined.height(),
            actual: n_train,
        });
    }

    combined.drop_columns(sparse_columns)?;
    impute(&mut combined)?;
    Standardizer::standardize(&mut combined)?;

    let encoder = OneHotEncoder::fit(&combined);
    let encoded = encoder.encode(&combined)?;

    let numeric_names: Vec<String> = combined
        .iter()
        .filter(|(_, col)| col.is_numeric())
        .map(|(name, _)| name.to_string())
        .collect();

    let height = combined.height();
    let width = numeric_names.len() + encoder.output_width();
    let mut matrix = Array2::zeros((height, width));
    let mut column_names = Vec::with_capacity(width);

    let mut col_idx = 0;
    for name in &numeric_names {
        let values = combined.numeric(name)?;
        for (row, cell) in values.iter().enumerate() {
            matrix[[row, col_idx]] = cell.ok_or_else(|| PipelineError::UnexpectedMissing(name.clone()))?;
        }
        column_names.push(name.clone());
        col_idx += 1;
    }
    for (name, indicator) in encoded {
        for (row, value) in indicator.iter().enumerate() {
            matrix[[row, col_idx]] = *value;
        }
        column_names.push(name);
        col_idx += 1;
    }

    Ok(FeatureMatrices {
        train: matrix.slice(s![..n_train, ..]).to_owned(),
        test: matrix.slice(s![n_train.., ..]).to_owned(),
        column_names,
    })
}

/// Extracts the target vector from the training table, aligned with the
/// train slice of the feature matrix.
pub fn target_vector(train: &RawTable, column: &str) -> Result<ndarray::Array1<f64>> {
    match train.column(column)? {
        Column::Numeric(values) => values
            .iter()
            .map(|cell| cell.ok_or_else(|| PipelineError::UnexpectedMissing(column.to_string())))
            .collect(),
        Column::Categorical(_) => Err(PipelineError::ColumnType {
            column: column.to_string(),
            expected: "numeric",
        }),
    }
}
