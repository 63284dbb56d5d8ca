//! End-to-end comparison behaviour

use rowdelta_core::error::TableSide;
use rowdelta_core::{
    compare_tables, CellValue, CompareOptions, Membership, RowStatus, RowdeltaError,
    TableComparator, ValueChange,
};

mod common;
use common::{products_new, products_old, table};

#[test]
fn test_added_and_deleted_rows() {
    let result = compare_tables(&products_new(), &products_old(), Some("id")).unwrap();

    assert_eq!(result.len(), 3);
    assert_eq!(result.added_columns(), ["price"]);
    assert!(result.deleted_columns().is_empty());

    let unchanged = result.row_by_key(1).unwrap();
    assert_eq!(unchanged.status, RowStatus::Unchanged);
    assert_eq!(unchanged.status.label(), "-");
    assert!(unchanged.changes.is_empty());

    let added = result.row_by_key(2).unwrap();
    assert_eq!(added.status.label(), "Row added");
    assert_eq!(added.membership, Membership::NewOnly);
    assert!(added.changes.is_empty());

    let deleted = result.row_by_key(3).unwrap();
    assert_eq!(deleted.status.label(), "Row deleted");
    assert_eq!(deleted.membership, Membership::OldOnly);
    assert!(deleted.changes.is_empty());
}

#[test]
fn test_added_column_is_not_a_value_change() {
    let result = compare_tables(&products_new(), &products_old(), Some("id")).unwrap();

    // id 1 gained a price but the column is new, so the row is unchanged
    let row = result.row_by_key(1).unwrap();
    assert!(!row.changes.contains("price"));
    assert_eq!(result.value(0, "price"), Some(&CellValue::from(10)));
}

#[test]
fn test_deleted_column_is_compared_against_null() {
    let new = table(
        &["id", "name"],
        vec![vec![1.into(), "A".into()], vec![2.into(), "B".into()]],
    );
    let old = table(
        &["id", "name", "cost"],
        vec![
            vec![1.into(), "A".into(), 5.into()],
            vec![2.into(), "B".into(), CellValue::Null],
        ],
    );
    let result = compare_tables(&new, &old, Some("id")).unwrap();

    assert_eq!(result.deleted_columns(), ["cost"]);
    assert_eq!(
        result.header(),
        vec!["id", "name", "cost", "Row status", "Value changes"]
    );

    let first = result.row_by_key(1).unwrap();
    assert_eq!(first.status, RowStatus::Updated);
    assert_eq!(
        first.changes.get("cost"),
        Some(&ValueChange {
            old: 5.into(),
            new: CellValue::Null
        })
    );
    assert_eq!(first.values[2], CellValue::from(5));

    // A null old value in a deleted column is not a change
    let second = result.row_by_key(2).unwrap();
    assert_eq!(second.status, RowStatus::Unchanged);
}

#[test]
fn test_only_differing_columns_are_reported() {
    let new = table(
        &["id", "name", "qty"],
        vec![vec![1.into(), "B2".into(), 3.into()]],
    );
    let old = table(
        &["id", "name", "qty"],
        vec![vec![1.into(), "B".into(), 3.into()]],
    );
    let result = compare_tables(&new, &old, Some("id")).unwrap();
    let row = &result.rows[0];

    assert_eq!(row.status, RowStatus::Updated);
    assert_eq!(row.changes.columns().collect::<Vec<_>>(), vec!["name"]);
    assert_eq!(row.changes.get("name").unwrap().old, CellValue::from("B"));
    assert_eq!(row.changes.get("name").unwrap().new, CellValue::from("B2"));
}

#[test]
fn test_comparing_a_table_with_itself() {
    let products = products_new();
    let result = compare_tables(&products, &products, Some("id")).unwrap();

    assert!(!result.has_changes());
    assert!(result.rows.iter().all(|r| r.status == RowStatus::Unchanged));
    assert!(result.schema.added_columns.is_empty());
    assert!(result.changes_only().is_empty());
}

#[test]
fn test_swapping_sides_inverts_changes() {
    let a = table(
        &["id", "name"],
        vec![vec![1.into(), "A".into()], vec![2.into(), "B".into()]],
    );
    let b = table(
        &["id", "name"],
        vec![vec![1.into(), "A1".into()], vec![3.into(), "C".into()]],
    );
    let forward = compare_tables(&a, &b, Some("id")).unwrap();
    let backward = compare_tables(&b, &a, Some("id")).unwrap();

    let summary = forward.summary();
    let reverse = backward.summary();
    assert_eq!(summary.added, reverse.deleted);
    assert_eq!(summary.deleted, reverse.added);
    assert_eq!(summary.updated, reverse.updated);

    let change = forward.row_by_key(1).unwrap().changes.get("name").unwrap();
    let inverse = backward.row_by_key(1).unwrap().changes.get("name").unwrap();
    assert_eq!(&change.inverted(), inverse);
}

#[test]
fn test_null_like_values_are_equal() {
    let new = table(
        &["id", "x", "y"],
        vec![vec![1.into(), f64::NAN.into(), (-0.0).into()]],
    );
    let old = table(
        &["id", "x", "y"],
        vec![vec![1.into(), CellValue::Null, 0.0.into()]],
    );
    let result = compare_tables(&new, &old, Some("id")).unwrap();

    assert_eq!(result.rows[0].status, RowStatus::Unchanged);
    assert_eq!(result.rows[0].values[1], CellValue::Null);
}

#[test]
fn test_positional_matching_without_key() {
    let new = table(
        &["name"],
        vec![vec!["A".into()], vec!["B".into()], vec!["C".into()]],
    );
    let old = table(&["name"], vec![vec!["A".into()], vec!["X".into()]]);
    let result = compare_tables(&new, &old, None).unwrap();

    let statuses: Vec<_> = result.rows.iter().map(|r| r.status.label()).collect();
    assert_eq!(statuses, vec!["-", "Row updated", "Row added"]);
    assert_eq!(result.rows[2].key, CellValue::from(2));
}

#[test]
fn test_positional_matching_with_shorter_new_table() {
    let new = table(&["name"], vec![vec!["A".into()]]);
    let old = table(&["name"], vec![vec!["A".into()], vec!["B".into()]]);
    let result = compare_tables(&new, &old, None).unwrap();

    assert_eq!(result.len(), 2);
    assert_eq!(result.rows[1].status, RowStatus::Deleted);
    assert_eq!(result.rows[1].values[0], CellValue::Null);
}

#[test]
fn test_duplicate_keys_fan_out() {
    let new = table(
        &["id", "name"],
        vec![vec![1.into(), "A".into()], vec![1.into(), "A2".into()]],
    );
    let old = table(&["id", "name"], vec![vec![1.into(), "A".into()]]);
    let result = compare_tables(&new, &old, Some("id")).unwrap();

    assert_eq!(result.len(), 2);
    assert!(result.rows.iter().all(|r| r.membership == Membership::Both));
    assert_eq!(result.rows[0].status, RowStatus::Unchanged);
    assert_eq!(result.rows[1].status, RowStatus::Updated);
}

#[test]
fn test_missing_key_column() {
    let err = compare_tables(&products_new(), &products_old(), Some("price")).unwrap_err();
    match err {
        RowdeltaError::MissingKeyColumn { column, side } => {
            assert_eq!(column, "price");
            assert_eq!(side, TableSide::Old);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_sequential_and_parallel_agree() {
    let new = table(
        &["id", "v"],
        (0..200).map(|i| vec![i.into(), (i % 7).into()]).collect(),
    );
    let old = table(
        &["id", "v"],
        (100..300).map(|i| vec![i.into(), (i % 5).into()]).collect(),
    );

    let options = CompareOptions::default().with_key("id");
    let parallel = TableComparator::new(options.clone()).compare(&new, &old).unwrap();
    let sequential = TableComparator::new(options.sequential())
        .compare(&new, &old)
        .unwrap();

    assert_eq!(parallel, sequential);
    assert_eq!(parallel.summary().total_rows(), 300);
}

#[test]
fn test_titles_are_carried_through() {
    let options = CompareOptions::default()
        .with_key("id")
        .with_titles("export 2021-12-14", "export 2021-11-30");
    let result = TableComparator::new(options)
        .compare(&products_new(), &products_old())
        .unwrap();

    assert_eq!(result.new_title, "export 2021-12-14");
    assert_eq!(result.old_title, "export 2021-11-30");

    let untitled = compare_tables(&products_new(), &products_old(), Some("id")).unwrap();
    assert_eq!(untitled.new_title, "Not specified");
}
