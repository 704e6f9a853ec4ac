//! In-memory column store for the raw train/test tables.
//!
//! Columns are typed at load time: a column is numeric when every present
//! cell parses as `f64`, otherwise it is categorical. Missing cells are
//! `None` in either representation.

use std::collections::HashMap;

use crate::types::{PipelineError, Result};

#[derive(Debug, Clone, PartialEq)]
pub enum Column {
    Numeric(Vec<Option<f64>>),
    Categorical(Vec<Option<String>>),
}

impl Column {
    pub fn len(&self) -> usize {
        match self {
            Column::Numeric(v) => v.len(),
            Column::Categorical(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, Column::Numeric(_))
    }

    pub fn has_missing(&self) -> bool {
        match self {
            Column::Numeric(v) => v.iter().any(Option::is_none),
            Column::Categorical(v) => v.iter().any(Option::is_none),
        }
    }
}

/// Ordered, named columns of equal length.
#[derive(Debug, Clone, Default)]
pub struct RawTable {
    names: Vec<String>,
    columns: Vec<Column>,
    index: HashMap<String, usize>,
}

impl RawTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn height(&self) -> usize {
        self.columns.first().map_or(0, Column::len)
    }

    pub fn width(&self) -> usize {
        self.columns.len()
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Column names and data in table order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Column)> {
        self.names
            .iter()
            .map(String::as_str)
            .zip(self.columns.iter())
    }

    pub fn column(&self, name: &str) -> Result<&Column> {
        let idx = self
            .index
            .get(name)
            .ok_or_else(|| PipelineError::MissingColumn(name.to_string()))?;
        Ok(&self.columns[*idx])
    }

    pub fn column_mut(&mut self, name: &str) -> Result<&mut Column> {
        let idx = self
            .index
            .get(name)
            .ok_or_else(|| PipelineError::MissingColumn(name.to_string()))?;
        Ok(&mut self.columns[*idx])
    }

    pub fn numeric(&self, name: &str) -> Result<&[Option<f64>]> {
        match self.column(name)? {
            Column::Numeric(v) => Ok(v),
            Column::Categorical(_) => Err(PipelineError::ColumnType {
                column: name.to_string(),
                expected: "numeric",
            }),
        }
    }

    pub fn categorical(&self, name: &str) -> Result<&[Option<String>]> {
        match self.column(name)? {
            Column::Categorical(v) => Ok(v),
            Column::Numeric(_) => Err(PipelineError::ColumnType {
                column: name.to_string(),
                expected: "categorical",
            }),
        }
    }

    pub fn push_column(&mut self, name: &str, column: Column) -> Result<()> {
        if self.index.contains_key(name) {
            return Err(PipelineError::DuplicateColumn(name.to_string()));
        }
        if !self.columns.is_empty() && column.len() != self.height() {
            return Err(PipelineError::LengthMismatch {
                expected: self.height(),
                actual: column.len(),
            });
        }
        self.index.insert(name.to_string(), self.columns.len());
        self.names.push(name.to_string());
        self.columns.push(column);
        Ok(())
    }

    /// Drops the named columns. Asking for a column that does not exist is
    /// a schema error, matching the fatal lookup-failure contract.
    pub fn drop_columns(&mut self, names: &[String]) -> Result<()> {
        for name in names {
            if !self.index.contains_key(name) {
                return Err(PipelineError::MissingColumn(name.clone()));
            }
        }
        let dropped: Vec<usize> = names.iter().map(|n| self.index[n]).collect();
        let mut keep = vec![true; self.columns.len()];
        for idx in dropped {
            keep[idx] = false;
        }
        let mut new_names = Vec::new();
        let mut new_columns = Vec::new();
        for (i, kept) in keep.iter().enumerate() {
            if *kept {
                new_names.push(self.names[i].clone());
                new_columns.push(self.columns[i].clone());
            }
        }
        self.names = new_names;
        self.columns = new_columns;
        self.rebuild_index();
        Ok(())
    }

    /// Returns a table with only the named columns, in the given order.
    pub fn select(&self, names: &[String]) -> Result<RawTable> {
        let mut out = RawTable::new();
        for name in names {
            out.push_column(name, self.column(name)?.clone())?;
        }
        Ok(out)
    }

    /// Row-wise concatenation. Both tables must share this table's column
    /// set; a categorical column in either position makes the combined
    /// column categorical (mixed typing across splits).
    pub fn concat(&self, other: &RawTable) -> Result<RawTable> {
        if self.width() != other.width() {
            return Err(PipelineError::Schema(format!(
                "{} vs {} columns",
                self.width(),
                other.width()
            )));
        }
        let mut out = RawTable::new();
        for (name, col) in self.iter() {
            let other_col = other.column(name)?;
            let combined = match (col, other_col) {
                (Column::Numeric(a), Column::Numeric(b)) => {
                    let mut v = a.clone();
                    v.extend_from_slice(b);
                    Column::Numeric(v)
                }
                (a, b) => {
                    let mut v = to_categorical(a);
                    v.extend(to_categorical(b));
                    Column::Categorical(v)
                }
            };
            out.push_column(name, combined)?;
        }
        Ok(out)
    }

    fn rebuild_index(&mut self) {
        self.index = self
            .names
            .iter()
            .enumerate()
            .map(|(i, n)| (n.clone(), i))
            .collect();
    }
}

fn to_categorical(col: &Column) -> Vec<Option<String>> {
    match col {
        Column::Categorical(v) => v.clone(),
        Column::Numeric(v) => v
            .iter()
            .map(|cell| cell.map(|x| format_numeric(x)))
            .collect(),
    }
}

/// Integer-valued floats print without a trailing fraction so categories
/// built from numeric cells match their original text form.
pub fn format_numeric(x: f64) -> String {
    format!("{}", x)
}
