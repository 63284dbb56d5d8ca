//! # rowdelta-core
//!
//! Core library for rowdelta - a tabular data comparison tool that reports
//! added, deleted and updated rows between an old and a new version of a table,
//! together with a per-cell record of what changed.
//!
//! This crate provides the core functionality that can be used by different interfaces
//! (CLI, other frontends, etc.).

pub mod comparison;
pub mod config;
pub mod data;
pub mod differ;
pub mod error;
pub mod export;
pub mod matcher;
pub mod report;
pub mod schema;
pub mod status;
pub mod table;
pub mod value;

// Re-export the most commonly used types for convenience
pub use comparison::{
    compare_tables, CompareOptions, ComparisonResult, ComparisonRow, ComparisonSummary,
    TableComparator, ROW_STATUS_COLUMN, VALUE_CHANGES_COLUMN,
};
pub use config::Config;
pub use data::{DataLoader, SheetSelection};
pub use differ::{ChangeMap, ValueChange};
pub use error::{Result, RowdeltaError};
pub use export::{ExportFormat, ExportOptions, ReportExporter};
pub use matcher::{KeySpec, Membership};
pub use report::{Report, ReportBuilder};
pub use schema::SchemaDiff;
pub use status::RowStatus;
pub use table::Table;
pub use value::CellValue;
