//! Cell-level comparison of matched rows

use crate::schema::SchemaDiff;
use crate::table::Table;
use crate::value::CellValue;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Old and new value of a changed cell, both canonicalized
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValueChange {
    pub old: CellValue,
    pub new: CellValue,
}

impl ValueChange {
    /// The same change seen from the other side
    pub fn inverted(&self) -> Self {
        Self {
            old: self.new.clone(),
            new: self.old.clone(),
        }
    }
}

/// Changed columns of one row, in report column order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChangeMap(IndexMap<String, ValueChange>);

impl ChangeMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, column: impl Into<String>, change: ValueChange) {
        self.0.insert(column.into(), change);
    }

    pub fn get(&self, column: &str) -> Option<&ValueChange> {
        self.0.get(column)
    }

    pub fn contains(&self, column: &str) -> bool {
        self.0.contains_key(column)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &ValueChange)> {
        self.0.iter()
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }
}

impl<'a> IntoIterator for &'a ChangeMap {
    type Item = (&'a String, &'a ValueChange);
    type IntoIter = indexmap::map::Iter<'a, String, ValueChange>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

#[derive(Debug, Clone)]
struct ComparedColumn {
    name: String,
    /// `None` for a deleted column: the new side is absent
    new_index: Option<usize>,
    old_index: usize,
}

/// Precomputed column plan for diffing rows of two tables.
///
/// Compares every new column that also exists in old (except the key column,
/// which matches by construction), then every deleted column against an absent
/// new side. Columns that only exist in new have nothing to differ against and
/// are never compared.
#[derive(Debug, Clone)]
pub struct CellDiffer {
    columns: Vec<ComparedColumn>,
}

impl CellDiffer {
    pub fn new(new: &Table, old: &Table, key_column: Option<&str>, schema: &SchemaDiff) -> Self {
        let mut columns = Vec::new();

        for (new_index, name) in new.columns().iter().enumerate() {
            if key_column == Some(name.as_str()) {
                continue;
            }
            if let Some(old_index) = old.column_index(name) {
                columns.push(ComparedColumn {
                    name: name.clone(),
                    new_index: Some(new_index),
                    old_index,
                });
            }
        }

        for name in &schema.deleted_columns {
            if let Some(old_index) = old.column_index(name) {
                columns.push(ComparedColumn {
                    name: name.clone(),
                    new_index: None,
                    old_index,
                });
            }
        }

        Self { columns }
    }

    /// Names of the compared columns, in change map order
    pub fn compared_columns(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.name.as_str())
    }

    /// Compare a new row with its matched old row
    pub fn diff(&self, new_row: &[CellValue], old_row: &[CellValue]) -> ChangeMap {
        let mut changes = ChangeMap::new();
        for column in &self.columns {
            let new_value = column
                .new_index
                .and_then(|i| new_row.get(i))
                .map(CellValue::canonical)
                .unwrap_or(CellValue::Null);
            let old_value = old_row
                .get(column.old_index)
                .map(CellValue::canonical)
                .unwrap_or(CellValue::Null);

            if new_value != old_value {
                changes.insert(
                    column.name.clone(),
                    ValueChange {
                        old: old_value,
                        new: new_value,
                    },
                );
            }
        }
        changes
    }
}
