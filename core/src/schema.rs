//! Column-level differences between two table headers

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Columns present on only one side of a comparison
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaDiff {
    /// Columns in new but not in old, in new's column order
    pub added_columns: Vec<String>,
    /// Columns in old but not in new, in old's column order
    pub deleted_columns: Vec<String>,
}

impl SchemaDiff {
    /// Compute the set differences of two headers. Row data plays no part.
    pub fn between(new_columns: &[String], old_columns: &[String]) -> Self {
        let new_names: HashSet<&str> = new_columns.iter().map(String::as_str).collect();
        let old_names: HashSet<&str> = old_columns.iter().map(String::as_str).collect();

        let added_columns = new_columns
            .iter()
            .filter(|c| !old_names.contains(c.as_str()))
            .cloned()
            .collect();
        let deleted_columns = old_columns
            .iter()
            .filter(|c| !new_names.contains(c.as_str()))
            .cloned()
            .collect();

        Self {
            added_columns,
            deleted_columns,
        }
    }

    pub fn has_changes(&self) -> bool {
        !self.added_columns.is_empty() || !self.deleted_columns.is_empty()
    }

    pub fn is_added(&self, column: &str) -> bool {
        self.added_columns.iter().any(|c| c == column)
    }

    pub fn is_deleted(&self, column: &str) -> bool {
        self.deleted_columns.iter().any(|c| c == column)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(cols: &[&str]) -> Vec<String> {
        cols.iter().map(|c| c.to_string()).collect()
    }

    #[test]
    fn test_added_column() {
        let diff = SchemaDiff::between(&names(&["id", "name", "price"]), &names(&["id", "name"]));
        assert_eq!(diff.added_columns, vec!["price"]);
        assert!(diff.deleted_columns.is_empty());
        assert!(diff.has_changes());
        assert!(diff.is_added("price"));
    }

    #[test]
    fn test_orders_follow_each_side() {
        let diff = SchemaDiff::between(
            &names(&["z", "id", "a"]),
            &names(&["q", "id", "b", "c"]),
        );
        assert_eq!(diff.added_columns, vec!["z", "a"]);
        assert_eq!(diff.deleted_columns, vec!["q", "b", "c"]);
    }

    #[test]
    fn test_reordering_is_not_a_change() {
        let diff = SchemaDiff::between(&names(&["b", "a"]), &names(&["a", "b"]));
        assert!(!diff.has_changes());
    }

    #[test]
    fn test_swapping_sides_swaps_sets() {
        let new = names(&["id", "price"]);
        let old = names(&["id", "cost"]);
        let forward = SchemaDiff::between(&new, &old);
        let backward = SchemaDiff::between(&old, &new);
        assert_eq!(forward.added_columns, backward.deleted_columns);
        assert_eq!(forward.deleted_columns, backward.added_columns);
    }
}
