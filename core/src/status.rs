//! Row status classification

use crate::differ::ChangeMap;
use crate::matcher::Membership;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Outcome of a joined row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RowStatus {
    #[serde(rename = "Row added")]
    Added,
    #[serde(rename = "Row deleted")]
    Deleted,
    #[serde(rename = "Row updated")]
    Updated,
    #[serde(rename = "-")]
    Unchanged,
}

impl RowStatus {
    pub fn classify(membership: Membership, changes: &ChangeMap) -> Self {
        match membership {
            Membership::NewOnly => RowStatus::Added,
            Membership::OldOnly => RowStatus::Deleted,
            Membership::Both if changes.is_empty() => RowStatus::Unchanged,
            Membership::Both => RowStatus::Updated,
        }
    }

    /// Label shown in the "Row status" column
    pub fn label(&self) -> &'static str {
        match self {
            RowStatus::Added => "Row added",
            RowStatus::Deleted => "Row deleted",
            RowStatus::Updated => "Row updated",
            RowStatus::Unchanged => "-",
        }
    }

    pub fn is_change(&self) -> bool {
        !matches!(self, RowStatus::Unchanged)
    }
}

impl fmt::Display for RowStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::differ::ValueChange;
    use crate::value::CellValue;

    #[test]
    fn test_classification() {
        let empty = ChangeMap::new();
        let mut changed = ChangeMap::new();
        changed.insert("a", ValueChange { old: CellValue::Null, new: 1.into() });

        assert_eq!(RowStatus::classify(Membership::NewOnly, &empty), RowStatus::Added);
        assert_eq!(RowStatus::classify(Membership::OldOnly, &empty), RowStatus::Deleted);
        assert_eq!(RowStatus::classify(Membership::Both, &empty), RowStatus::Unchanged);
        assert_eq!(RowStatus::classify(Membership::Both, &changed), RowStatus::Updated);
    }

    #[test]
    fn test_labels_serialize_as_report_text() {
        assert_eq!(serde_json::to_string(&RowStatus::Added).unwrap(), "\"Row added\"");
        assert_eq!(serde_json::to_string(&RowStatus::Unchanged).unwrap(), "\"-\"");
        assert_eq!(RowStatus::Updated.to_string(), "Row updated");
    }
}
