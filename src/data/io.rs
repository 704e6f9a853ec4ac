//! CSV loading and submission writing.

use std::path::Path;

use ndarray::Array1;
use serde::Serialize;

use crate::data::table::{Column, RawTable};
use crate::types::{PipelineError, Result};

/// Cell spellings treated as missing.
fn is_missing(cell: &str) -> bool {
    cell.is_empty() || cell == "NA"
}

/// Reads a headered CSV into a [`RawTable`].
///
/// Every column starts as text; a column becomes numeric when all of its
/// present cells parse as `f64`.
pub fn read_csv(path: &Path) -> Result<RawTable> {
    let file = std::fs::File::open(path).map_err(|source| PipelineError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let mut reader = csv::ReaderBuilder::new().has_headers(true).from_reader(file);

    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    let mut cells: Vec<Vec<Option<String>>> = vec![Vec::new(); headers.len()];
    for record in reader.records() {
        let record = record?;
        if record.len() != headers.len() {
            return Err(PipelineError::LengthMismatch {
                expected: headers.len(),
                actual: record.len(),
            });
        }
        for (i, cell) in record.iter().enumerate() {
            let cell = cell.trim();
            cells[i].push(if is_missing(cell) {
                None
            } else {
                Some(cell.to_string())
            });
        }
    }

    let mut table = RawTable::new();
    for (name, raw) in headers.iter().zip(cells.into_iter()) {
        table.push_column(name, type_column(raw))?;
    }

    if table.height() == 0 {
        return Err(PipelineError::EmptyTable);
    }
    Ok(table)
}

fn type_column(raw: Vec<Option<String>>) -> Column {
    let all_numeric = raw
        .iter()
        .flatten()
        .all(|cell| cell.parse::<f64>().is_ok());
    let any_present = raw.iter().any(Option::is_some);
    if all_numeric && any_present {
        Column::Numeric(
            raw.into_iter()
                .map(|cell| cell.map(|c| c.parse::<f64>().unwrap_or(f64::NAN)))
                .collect(),
        )
    } else {
        Column::Categorical(raw)
    }
}

#[derive(Debug, Serialize)]
struct SubmissionRow<'a> {
    #[serde(rename = "Id")]
    id: &'a str,
    #[serde(rename = "SalePrice")]
    sale_price: f64,
}

/// Writes the two-column submission table, one row per prediction, ids
/// copied verbatim from the test table.
pub fn write_submission(path: &Path, ids: &[String], predictions: &Array1<f64>) -> Result<()> {
    if ids.len() != predictions.len() {
        return Err(PipelineError::LengthMismatch {
            expected: ids.len(),
            actual: predictions.len(),
        });
    }
    let mut writer = csv::Writer::from_path(path).map_err(PipelineError::Csv)?;
    for (id, pred) in ids.iter().zip(predictions.iter()) {
        writer.serialize(SubmissionRow {
            id,
            sale_price: *pred,
        })?;
    }
    writer.flush().map_err(|e| PipelineError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;
    Ok(())
}

/// Identifier column rendered back to text for the submission.
pub fn id_strings(table: &RawTable, column: &str) -> Result<Vec<String>> {
    match table.column(column)? {
        Column::Numeric(v) => v
            .iter()
            .map(|cell| {
                cell.map(crate::data::table::format_numeric)
                    .ok_or_else(|| PipelineError::UnexpectedMissing(column.to_string()))
            })
            .collect(),
        Column::Categorical(v) => v
            .iter()
            .map(|cell| {
                cell.clone()
                    .ok_or_else(|| PipelineError::UnexpectedMissing(column.to_string()))
            })
            .collect(),
    }
}
