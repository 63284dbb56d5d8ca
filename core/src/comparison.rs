//! Comparison of two tables into a single ordered change report
//!
//! The result has one row per joined row and a fixed column layout: every new
//! column in its original order, then every deleted column in its original
//! order, then [`ROW_STATUS_COLUMN`] and [`VALUE_CHANGES_COLUMN`].

use crate::differ::{CellDiffer, ChangeMap};
use crate::error::Result;
use crate::matcher::{self, JoinedRow, KeySpec, Membership};
use crate::schema::SchemaDiff;
use crate::status::RowStatus;
use crate::table::Table;
use crate::value::CellValue;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

pub const ROW_STATUS_COLUMN: &str = "Row status";
pub const VALUE_CHANGES_COLUMN: &str = "Value changes";

/// Provenance label used when the caller does not name a table
pub const UNSPECIFIED_TITLE: &str = "Not specified";

/// Options for a comparison run
#[derive(Debug, Clone)]
pub struct CompareOptions {
    /// Column used to match rows; rows are matched by position when `None`
    pub key_column: Option<String>,
    /// Free-text provenance of the new table, carried into the result
    pub new_title: String,
    /// Free-text provenance of the old table, carried into the result
    pub old_title: String,
    /// Diff matched rows on the rayon thread pool
    pub parallel: bool,
}

impl Default for CompareOptions {
    fn default() -> Self {
        Self {
            key_column: None,
            new_title: UNSPECIFIED_TITLE.to_string(),
            old_title: UNSPECIFIED_TITLE.to_string(),
            parallel: true,
        }
    }
}

impl CompareOptions {
    pub fn with_key(mut self, key_column: impl Into<String>) -> Self {
        self.key_column = Some(key_column.into());
        self
    }

    pub fn with_titles(mut self, new_title: impl Into<String>, old_title: impl Into<String>) -> Self {
        self.new_title = new_title.into();
        self.old_title = old_title.into();
        self
    }

    pub fn sequential(mut self) -> Self {
        self.parallel = false;
        self
    }
}

/// One row of the comparison result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonRow {
    /// Matching key: the key column's value, or the row position
    pub key: CellValue,
    pub membership: Membership,
    /// Values for the data columns (new columns, then deleted columns)
    pub values: Vec<CellValue>,
    pub status: RowStatus,
    pub changes: ChangeMap,
}

/// Row counts per status
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComparisonSummary {
    pub added: usize,
    pub deleted: usize,
    pub updated: usize,
    pub unchanged: usize,
}

impl ComparisonSummary {
    pub fn total_changes(&self) -> usize {
        self.added + self.deleted + self.updated
    }

    pub fn total_rows(&self) -> usize {
        self.total_changes() + self.unchanged
    }
}

/// Complete outcome of comparing a new table with an old one
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonResult {
    pub new_title: String,
    pub old_title: String,
    pub key_column: Option<String>,
    /// Data columns: new columns followed by deleted columns
    pub columns: Vec<String>,
    pub schema: SchemaDiff,
    pub rows: Vec<ComparisonRow>,
}

impl ComparisonResult {
    /// Full header including the status and change columns
    pub fn header(&self) -> Vec<String> {
        let mut header = self.columns.clone();
        header.push(ROW_STATUS_COLUMN.to_string());
        header.push(VALUE_CHANGES_COLUMN.to_string());
        header
    }

    pub fn added_columns(&self) -> &[String] {
        &self.schema.added_columns
    }

    pub fn deleted_columns(&self) -> &[String] {
        &self.schema.deleted_columns
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, column: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == column)
    }

    /// Value of a data column in row `row`
    pub fn value(&self, row: usize, column: &str) -> Option<&CellValue> {
        let index = self.column_index(column)?;
        self.rows.get(row).and_then(|r| r.values.get(index))
    }

    /// Find the first row whose key equals `key`
    pub fn row_by_key(&self, key: impl Into<CellValue>) -> Option<&ComparisonRow> {
        let key = key.into();
        self.rows.iter().find(|r| r.key == key)
    }

    pub fn summary(&self) -> ComparisonSummary {
        self.rows
            .iter()
            .fold(ComparisonSummary::default(), |mut summary, row| {
                match row.status {
                    RowStatus::Added => summary.added += 1,
                    RowStatus::Deleted => summary.deleted += 1,
                    RowStatus::Updated => summary.updated += 1,
                    RowStatus::Unchanged => summary.unchanged += 1,
                }
                summary
            })
    }

    pub fn has_changes(&self) -> bool {
        self.schema.has_changes() || self.rows.iter().any(|r| r.status.is_change())
    }

    /// Copy of the result without unchanged rows
    pub fn changes_only(&self) -> Self {
        Self {
            rows: self
                .rows
                .iter()
                .filter(|r| r.status.is_change())
                .cloned()
                .collect(),
            ..self.clone()
        }
    }
}

/// Compares a new table against an old one
pub struct TableComparator {
    options: CompareOptions,
}

impl TableComparator {
    pub fn new(options: CompareOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &CompareOptions {
        &self.options
    }

    pub fn compare(&self, new: &Table, old: &Table) -> Result<ComparisonResult> {
        new.validate()?;
        old.validate()?;

        let key = KeySpec::from_option(self.options.key_column.as_deref());
        let schema = SchemaDiff::between(new.columns(), old.columns());
        let joined = matcher::match_rows(new, old, &key)?;
        let differ = CellDiffer::new(new, old, key.column(), &schema);

        let assembler = RowAssembler::new(new, old, &key, &schema, &differ);
        let rows: Vec<ComparisonRow> = if self.options.parallel {
            joined.par_iter().map(|j| assembler.assemble(j)).collect()
        } else {
            joined.iter().map(|j| assembler.assemble(j)).collect()
        };

        let mut columns = new.columns().to_vec();
        columns.extend(schema.deleted_columns.iter().cloned());

        let result = ComparisonResult {
            new_title: self.options.new_title.clone(),
            old_title: self.options.old_title.clone(),
            key_column: self.options.key_column.clone(),
            columns,
            schema,
            rows,
        };

        let summary = result.summary();
        log::debug!(
            "Comparison finished: {} added, {} deleted, {} updated, {} unchanged",
            summary.added,
            summary.deleted,
            summary.updated,
            summary.unchanged
        );

        Ok(result)
    }
}

/// Builds result rows from joined rows
struct RowAssembler<'a> {
    new: &'a Table,
    old: &'a Table,
    differ: &'a CellDiffer,
    key_index: Option<usize>,
    deleted_indices: Vec<usize>,
}

impl<'a> RowAssembler<'a> {
    fn new(
        new: &'a Table,
        old: &'a Table,
        key: &KeySpec,
        schema: &SchemaDiff,
        differ: &'a CellDiffer,
    ) -> Self {
        let key_index = key.column().and_then(|k| new.column_index(k));
        let deleted_indices = schema
            .deleted_columns
            .iter()
            .filter_map(|c| old.column_index(c))
            .collect();
        Self {
            new,
            old,
            differ,
            key_index,
            deleted_indices,
        }
    }

    fn assemble(&self, joined: &JoinedRow) -> ComparisonRow {
        let new_row = joined.new_row().map(|i| self.new.rows()[i].as_slice());
        let old_row = joined.old_row().map(|i| self.old.rows()[i].as_slice());

        let mut values = Vec::with_capacity(self.new.column_count() + self.deleted_indices.len());
        for index in 0..self.new.column_count() {
            let value = match new_row {
                Some(row) => row[index].canonical(),
                // The join key is shared by both sides
                None if Some(index) == self.key_index => joined.key().clone(),
                None => CellValue::Null,
            };
            values.push(value);
        }
        for &index in &self.deleted_indices {
            values.push(old_row.map(|row| row[index].canonical()).unwrap_or_default());
        }

        let membership = joined.membership();
        let changes = match (new_row, old_row) {
            (Some(new_row), Some(old_row)) => self.differ.diff(new_row, old_row),
            _ => ChangeMap::new(),
        };
        let status = RowStatus::classify(membership, &changes);

        ComparisonRow {
            key: joined.key().clone(),
            membership,
            values,
            status,
            changes,
        }
    }
}

/// Compare `new` against `old`, matching rows on `key_column` or by position
pub fn compare_tables(new: &Table, old: &Table, key_column: Option<&str>) -> Result<ComparisonResult> {
    let options = CompareOptions {
        key_column: key_column.map(str::to_string),
        ..CompareOptions::default()
    };
    TableComparator::new(options).compare(new, old)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::differ::ValueChange;
    use crate::error::RowdeltaError;

    fn table(columns: &[&str], rows: Vec<Vec<CellValue>>) -> Table {
        Table::from_rows(columns.iter().copied(), rows).unwrap()
    }

    #[test]
    fn test_header_layout() {
        let new = table(&["id", "name", "price"], vec![]);
        let old = table(&["id", "cost", "name"], vec![]);
        let result = compare_tables(&new, &old, Some("id")).unwrap();

        assert!(result.is_empty());
        assert_eq!(
            result.header(),
            vec!["id", "name", "price", "cost", "Row status", "Value changes"]
        );
        assert_eq!(result.added_columns(), &["price".to_string()]);
        assert_eq!(result.deleted_columns(), &["cost".to_string()]);
    }

    #[test]
    fn test_deleted_row_keeps_key_and_deleted_values() {
        let new = table(&["id", "name"], vec![]);
        let old = table(&["id", "name", "cost"], vec![vec![7.into(), "G".into(), 3.into()]]);
        let result = compare_tables(&new, &old, Some("id")).unwrap();

        let row = &result.rows[0];
        assert_eq!(row.status, RowStatus::Deleted);
        assert_eq!(row.values, vec![CellValue::from(7), CellValue::Null, CellValue::from(3)]);
        assert!(row.changes.is_empty());
    }

    #[test]
    fn test_values_are_canonical() {
        let new = table(&["a"], vec![vec![CellValue::Number(f64::NAN)]]);
        let old = table(&["a"], vec![vec![CellValue::Null]]);
        let result = compare_tables(&new, &old, None).unwrap();
        assert!(matches!(result.rows[0].values[0], CellValue::Null));
        assert_eq!(result.rows[0].status, RowStatus::Unchanged);
    }

    #[test]
    fn test_updated_row() {
        let new = table(&["id", "qty"], vec![vec!["P-1".into(), 4.into()]]);
        let old = table(&["id", "qty"], vec![vec!["P-1".into(), 3.into()]]);
        let result = compare_tables(&new, &old, Some("id")).unwrap();

        let row = result.row_by_key("P-1").unwrap();
        assert_eq!(row.status, RowStatus::Updated);
        assert_eq!(row.changes.get("qty"), Some(&ValueChange { old: 3.into(), new: 4.into() }));
        assert!(result.has_changes());
    }

    #[test]
    fn test_parallel_and_sequential_agree() {
        let new = table(
            &["k", "v"],
            (0..200).map(|i| vec![CellValue::from(i), CellValue::from(i % 3)]).collect(),
        );
        let old = table(
            &["k", "v"],
            (50..250).map(|i| vec![CellValue::from(i), CellValue::from(i % 5)]).collect(),
        );
        let options = CompareOptions::default().with_key("k");
        let parallel = TableComparator::new(options.clone()).compare(&new, &old).unwrap();
        let sequential = TableComparator::new(options.sequential()).compare(&new, &old).unwrap();
        assert_eq!(parallel, sequential);
    }

    #[test]
    fn test_titles_carried_through() {
        let new = table(&["a"], vec![]);
        let old = table(&["a"], vec![]);
        let result = TableComparator::new(CompareOptions::default().with_titles("Rev 2", "Rev 1"))
            .compare(&new, &old)
            .unwrap();
        assert_eq!(result.new_title, "Rev 2");
        assert_eq!(result.old_title, "Rev 1");

        let defaulted = compare_tables(&new, &old, None).unwrap();
        assert_eq!(defaulted.new_title, UNSPECIFIED_TITLE);
    }

    #[test]
    fn test_missing_key_fails_without_result() {
        let new = table(&["id"], vec![vec![1.into()]]);
        let old = table(&["sku"], vec![vec![1.into()]]);
        assert!(matches!(
            compare_tables(&new, &old, Some("id")),
            Err(RowdeltaError::MissingKeyColumn { .. })
        ));
    }

    #[test]
    fn test_summary_and_changes_only() {
        let new = table(&["id", "v"], vec![
            vec![1.into(), "a".into()],
            vec![2.into(), "b".into()],
            vec![4.into(), "d".into()],
        ]);
        let old = table(&["id", "v"], vec![
            vec![1.into(), "a".into()],
            vec![2.into(), "x".into()],
            vec![3.into(), "c".into()],
        ]);
        let result = compare_tables(&new, &old, Some("id")).unwrap();
        let summary = result.summary();
        assert_eq!(
            summary,
            ComparisonSummary { added: 1, deleted: 1, updated: 1, unchanged: 1 }
        );
        assert_eq!(summary.total_changes(), 3);
        assert_eq!(summary.total_rows(), 4);

        let filtered = result.changes_only();
        assert_eq!(filtered.len(), 3);
        assert_eq!(filtered.header(), result.header());
    }
}
