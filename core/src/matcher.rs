//! Row matching: full outer join of the new and old tables on a key

use crate::error::{Result, RowdeltaError, TableSide};
use crate::table::Table;
use crate::value::CellValue;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Which side(s) of the comparison a joined row came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Membership {
    NewOnly,
    OldOnly,
    Both,
}

/// How rows are matched between the two tables
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeySpec {
    /// Match on equal values of a column present in both tables
    Column(String),
    /// Match row `i` of new with row `i` of old
    Position,
}

impl KeySpec {
    pub fn from_option(key_column: Option<&str>) -> Self {
        match key_column {
            Some(column) => KeySpec::Column(column.to_string()),
            None => KeySpec::Position,
        }
    }

    pub fn column(&self) -> Option<&str> {
        match self {
            KeySpec::Column(column) => Some(column),
            KeySpec::Position => None,
        }
    }
}

/// One row of the outer join.
///
/// Holds indices into the input tables rather than copies of their rows. At
/// least one side is always present.
#[derive(Debug, Clone, PartialEq)]
pub struct JoinedRow {
    key: CellValue,
    new_row: Option<usize>,
    old_row: Option<usize>,
}

impl JoinedRow {
    pub fn key(&self) -> &CellValue {
        &self.key
    }

    /// Index of the matched row in the new table
    pub fn new_row(&self) -> Option<usize> {
        self.new_row
    }

    /// Index of the matched row in the old table
    pub fn old_row(&self) -> Option<usize> {
        self.old_row
    }

    pub fn membership(&self) -> Membership {
        match (self.new_row, self.old_row) {
            (Some(_), Some(_)) => Membership::Both,
            (Some(_), None) => Membership::NewOnly,
            (None, Some(_)) => Membership::OldOnly,
            (None, None) => unreachable!("joined row without either side"),
        }
    }
}

/// Check that a key column exists on both sides
pub fn validate_key(new: &Table, old: &Table, key: &KeySpec) -> Result<()> {
    let KeySpec::Column(column) = key else {
        return Ok(());
    };
    let side = match (new.has_column(column), old.has_column(column)) {
        (true, true) => return Ok(()),
        (false, true) => TableSide::New,
        (true, false) => TableSide::Old,
        (false, false) => TableSide::Both,
    };
    Err(RowdeltaError::MissingKeyColumn {
        column: column.clone(),
        side,
    })
}

/// Key value of every row. Positional matching synthesizes the row index.
fn key_values(table: &Table, key: &KeySpec) -> Result<Vec<CellValue>> {
    match key {
        KeySpec::Position => Ok((0..table.len()).map(CellValue::from).collect()),
        KeySpec::Column(column) => {
            let index = table.column_index(column).ok_or_else(|| {
                RowdeltaError::MissingKeyColumn {
                    column: column.clone(),
                    side: TableSide::Both,
                }
            })?;
            Ok(table.rows().iter().map(|row| row[index].canonical()).collect())
        }
    }
}

/// Join new and old on `key`.
///
/// Output order: every new row in table order, each followed by its old matches
/// in old-table order, then the unmatched old rows in old-table order. Duplicate
/// keys are not deduplicated; they produce one joined row per matching pair.
pub fn match_rows(new: &Table, old: &Table, key: &KeySpec) -> Result<Vec<JoinedRow>> {
    validate_key(new, old, key)?;
    let new_keys = key_values(new, key)?;
    let old_keys = key_values(old, key)?;
    Ok(outer_join(new_keys, &old_keys))
}

fn outer_join(new_keys: Vec<CellValue>, old_keys: &[CellValue]) -> Vec<JoinedRow> {
    let mut old_index: HashMap<&CellValue, Vec<usize>> = HashMap::with_capacity(old_keys.len());
    for (i, key) in old_keys.iter().enumerate() {
        old_index.entry(key).or_default().push(i);
    }

    let new_count = new_keys.len();
    let mut old_matched = vec![false; old_keys.len()];
    let mut joined = Vec::with_capacity(new_count.max(old_keys.len()));
    let mut fan_out = 0usize;

    for (new_row, key) in new_keys.into_iter().enumerate() {
        match old_index.get(&key) {
            Some(matches) => {
                if matches.len() > 1 {
                    fan_out += matches.len() - 1;
                }
                for &old_row in matches {
                    old_matched[old_row] = true;
                    joined.push(JoinedRow {
                        key: key.clone(),
                        new_row: Some(new_row),
                        old_row: Some(old_row),
                    });
                }
            }
            None => joined.push(JoinedRow {
                key,
                new_row: Some(new_row),
                old_row: None,
            }),
        }
    }

    for (old_row, matched) in old_matched.into_iter().enumerate() {
        if !matched {
            joined.push(JoinedRow {
                key: old_keys[old_row].clone(),
                new_row: None,
                old_row: Some(old_row),
            });
        }
    }

    if fan_out > 0 {
        log::warn!(
            "Duplicate key values produced {fan_out} extra joined rows; ensure the key column is unique"
        );
    }
    log::debug!(
        "Joined {new_count} new and {} old rows into {} rows",
        old_keys.len(),
        joined.len()
    );

    joined
}
