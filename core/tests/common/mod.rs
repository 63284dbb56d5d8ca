//! Common test utilities and fixtures

#![allow(dead_code)]

use rowdelta_core::{CellValue, Table};
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

/// Build a table from a header and positional rows
pub fn table(columns: &[&str], rows: Vec<Vec<CellValue>>) -> Table {
    Table::from_rows(columns.iter().copied(), rows).expect("valid test table")
}

/// The product list used across the scenario tests
pub fn products_new() -> Table {
    table(
        &["id", "name", "price"],
        vec![
            vec![1.into(), "A".into(), 10.into()],
            vec![2.into(), "B".into(), 20.into()],
        ],
    )
}

pub fn products_old() -> Table {
    table(
        &["id", "name"],
        vec![vec![1.into(), "A".into()], vec![3.into(), "C".into()]],
    )
}

/// Temporary directory holding input files for a test
pub struct TestFiles {
    pub temp_dir: TempDir,
}

impl TestFiles {
    pub fn new() -> Self {
        Self {
            temp_dir: TempDir::new().expect("Failed to create temp dir"),
        }
    }

    pub fn path(&self, name: &str) -> PathBuf {
        self.temp_dir.path().join(name)
    }

    /// Write `content` to `name` and return its path
    pub fn write(&self, name: &str, content: &str) -> PathBuf {
        let path = self.path(name);
        fs::write(&path, content).expect("Failed to write test file");
        path
    }
}
