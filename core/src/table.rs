//! In-memory tabular data

use crate::error::{Result, RowdeltaError};
use crate::value::CellValue;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// A single record keyed by column name, in column order
pub type Record = IndexMap<String, CellValue>;

/// An ordered set of named columns and an ordered sequence of rows.
///
/// Every row holds exactly one value per declared column. Constructors enforce
/// this; [`Table::validate`] re-checks tables that were built some other way
/// (for example deserialized from JSON).
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<CellValue>>,
}

impl Table {
    /// Create an empty table with the given header
    pub fn new<S: Into<String>>(columns: impl IntoIterator<Item = S>) -> Result<Self> {
        let table = Self {
            columns: columns.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        };
        table.check_columns()?;
        Ok(table)
    }

    /// Create a table from positional rows
    pub fn from_rows<S: Into<String>>(
        columns: impl IntoIterator<Item = S>,
        rows: Vec<Vec<CellValue>>,
    ) -> Result<Self> {
        let mut table = Self::new(columns)?;
        table.rows.reserve(rows.len());
        for row in rows {
            table.push_row(row)?;
        }
        Ok(table)
    }

    /// Create a table from records; every record must provide every column
    pub fn from_records<S: Into<String>>(
        columns: impl IntoIterator<Item = S>,
        records: Vec<Record>,
    ) -> Result<Self> {
        let mut table = Self::new(columns)?;
        for (index, mut record) in records.into_iter().enumerate() {
            let mut row = Vec::with_capacity(table.columns.len());
            for column in &table.columns {
                match record.shift_remove(column) {
                    Some(value) => row.push(value),
                    None => {
                        return Err(RowdeltaError::invalid_shape(format!(
                            "record {index} has no value for column '{column}'"
                        )))
                    }
                }
            }
            if let Some((extra, _)) = record.first() {
                return Err(RowdeltaError::invalid_shape(format!(
                    "record {index} has undeclared column '{extra}'"
                )));
            }
            table.rows.push(row);
        }
        Ok(table)
    }

    /// Append a row, checking its width against the header
    pub fn push_row(&mut self, row: Vec<CellValue>) -> Result<()> {
        if row.len() != self.columns.len() {
            return Err(RowdeltaError::invalid_shape(format!(
                "row {} has {} values but the table declares {} columns",
                self.rows.len(),
                row.len(),
                self.columns.len()
            )));
        }
        self.rows.push(row);
        Ok(())
    }

    /// Check that the table is rectangular and its column names are unique
    pub fn validate(&self) -> Result<()> {
        self.check_columns()?;
        for (index, row) in self.rows.iter().enumerate() {
            if row.len() != self.columns.len() {
                return Err(RowdeltaError::invalid_shape(format!(
                    "row {index} has {} values but the table declares {} columns",
                    row.len(),
                    self.columns.len()
                )));
            }
        }
        Ok(())
    }

    fn check_columns(&self) -> Result<()> {
        let mut seen = HashSet::with_capacity(self.columns.len());
        for column in &self.columns {
            if !seen.insert(column.as_str()) {
                return Err(RowdeltaError::invalid_shape(format!(
                    "column '{column}' is declared more than once"
                )));
            }
        }
        Ok(())
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<CellValue>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    pub fn value(&self, row: usize, column: &str) -> Option<&CellValue> {
        let col = self.column_index(column)?;
        self.rows.get(row).and_then(|r| r.get(col))
    }

    /// Row `index` as a column-ordered record
    pub fn record(&self, index: usize) -> Option<Record> {
        let row = self.rows.get(index)?;
        Some(
            self.columns
                .iter()
                .cloned()
                .zip(row.iter().cloned())
                .collect(),
        )
    }

    /// Replace every value for which `f` returns a replacement
    pub fn map_values<F>(&mut self, f: F)
    where
        F: Fn(&CellValue) -> Option<CellValue>,
    {
        for row in &mut self.rows {
            for value in row.iter_mut() {
                if let Some(replacement) = f(value) {
                    *value = replacement;
                }
            }
        }
    }
}
