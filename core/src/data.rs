//! Loading tabular files into [`Table`]s using DuckDB

use crate::error::{Result, RowdeltaError};
use crate::table::Table;
use crate::value::CellValue;
use chrono::{DateTime, Timelike};
use duckdb::types::{TimeUnit, ValueRef};
use duckdb::Connection;
use std::path::Path;

/// Loads CSV, TSV, JSON, Parquet and Excel files into tables
pub struct DataLoader {
    connection: Connection,
    null_markers: Vec<String>,
}

/// Where in a workbook to read a table from.
///
/// Tables are addressed by worksheet and cell range only. Named Excel tables
/// (ListObjects) are not resolved; pass the sheet and the table's range instead.
#[derive(Debug, Clone, Default)]
pub struct SheetSelection {
    pub sheet: Option<String>,
    /// Cell range such as `B8:F40`
    pub range: Option<String>,
}

impl DataLoader {
    /// Create a loader backed by an in-memory DuckDB database
    pub fn new() -> Result<Self> {
        let connection = Connection::open_in_memory()?;
        connection.execute("SET enable_progress_bar=false", [])?;
        // Positional matching depends on file order being kept
        connection.execute("SET preserve_insertion_order=true", [])?;
        Ok(Self {
            connection,
            null_markers: Vec::new(),
        })
    }

    /// Treat these text values as null. CSV and TSV files pass them to the
    /// reader so type detection already sees nulls; other formats replace
    /// matching text cells after loading.
    pub fn with_null_markers(mut self, markers: Vec<String>) -> Self {
        self.null_markers = markers;
        self
    }

    /// Check if file format is supported
    pub fn is_supported_format(file_path: &Path) -> bool {
        if let Some(extension) = file_path.extension().and_then(|s| s.to_str()) {
            matches!(
                extension.to_lowercase().as_str(),
                "csv" | "tsv" | "json" | "jsonl" | "ndjson" | "parquet" | "xlsx"
            )
        } else {
            false
        }
    }

    /// Load a whole file. Workbooks are read from their first sheet.
    pub fn load_file(&mut self, file_path: &Path) -> Result<Table> {
        self.load_selection(file_path, &SheetSelection::default())
    }

    /// Load a file, restricting workbooks to a sheet and range
    pub fn load_selection(&mut self, file_path: &Path, selection: &SheetSelection) -> Result<Table> {
        if !file_path.is_file() {
            return Err(RowdeltaError::invalid_input(format!(
                "File not found: {}",
                file_path.display()
            )));
        }
        if !Self::is_supported_format(file_path) {
            return Err(RowdeltaError::invalid_input(format!(
                "Unsupported file format: {}",
                file_path.display()
            )));
        }

        let source = self.source_sql(file_path, selection)?;
        let create_view_sql = format!("CREATE OR REPLACE VIEW source_view AS SELECT * FROM {source}");
        self.connection
            .execute(&create_view_sql, [])
            .map_err(|e| convert_duckdb_error(e, file_path))?;

        let described = self.describe("source_view")?;
        let columns: Vec<String> = described.iter().map(|(name, _)| name.clone()).collect();
        let mut table = Table::new(columns)?;
        let column_count = table.column_count();
        if column_count == 0 {
            return Ok(table);
        }

        let select_list = described
            .iter()
            .map(|(name, data_type)| select_expression(name, data_type))
            .collect::<Vec<_>>()
            .join(", ");
        let mut stmt = self
            .connection
            .prepare(&format!("SELECT {select_list} FROM source_view"))?;
        let mut rows = stmt.query([]).map_err(|e| convert_duckdb_error(e, file_path))?;
        while let Some(row) = rows.next()? {
            let mut values = Vec::with_capacity(column_count);
            for i in 0..column_count {
                values.push(cell_from_ref(row.get_ref(i)?));
            }
            table.push_row(values)?;
        }

        if !self.null_markers.is_empty() && !reads_null_markers(file_path) {
            let markers = &self.null_markers;
            table.map_values(|value| match value {
                CellValue::String(s) if markers.iter().any(|m| m == s) => Some(CellValue::Null),
                _ => None,
            });
        }

        log::info!(
            "Loaded {} rows and {} columns from {}",
            table.len(),
            table.column_count(),
            file_path.display()
        );
        Ok(table)
    }

    fn source_sql(&self, file_path: &Path, selection: &SheetSelection) -> Result<String> {
        let path = quote_literal(&file_path.to_string_lossy());
        let extension = file_path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
            .unwrap_or_default();

        let sql = match extension.as_str() {
            "csv" => format!("read_csv_auto({path}{})", self.nullstr_option()),
            "tsv" => format!("read_csv_auto({path}, delim='\\t'{})", self.nullstr_option()),
            "json" | "jsonl" | "ndjson" => format!("read_json_auto({path})"),
            "parquet" => format!("read_parquet({path})"),
            "xlsx" => {
                self.connection
                    .execute_batch("INSTALL excel; LOAD excel;")
                    .map_err(|e| {
                        RowdeltaError::data_processing(format!(
                            "Failed to load the DuckDB excel extension: {e}"
                        ))
                    })?;
                // The first row of the sheet or range always names the columns
                let mut args = vec![path, "header=true".to_string()];
                if let Some(sheet) = &selection.sheet {
                    args.push(format!("sheet={}", quote_literal(sheet)));
                }
                if let Some(range) = &selection.range {
                    args.push(format!("range={}", quote_literal(range)));
                }
                format!("read_xlsx({})", args.join(", "))
            }
            other => {
                return Err(RowdeltaError::invalid_input(format!(
                    "Unsupported file extension: {other}"
                )))
            }
        };

        if extension != "xlsx" && (selection.sheet.is_some() || selection.range.is_some()) {
            log::warn!(
                "Sheet and range selection only apply to workbooks; ignoring for {}",
                file_path.display()
            );
        }
        Ok(sql)
    }

    /// `nullstr` argument for the CSV reader; empty fields stay null
    fn nullstr_option(&self) -> String {
        if self.null_markers.is_empty() {
            return String::new();
        }
        let markers = std::iter::once("")
            .chain(self.null_markers.iter().map(String::as_str))
            .map(quote_literal)
            .collect::<Vec<_>>()
            .join(", ");
        format!(", nullstr=[{markers}]")
    }

    /// Column names and DuckDB types of a view
    fn describe(&self, view_name: &str) -> Result<Vec<(String, String)>> {
        let mut stmt = self.connection.prepare(&format!("DESCRIBE {view_name}"))?;
        let rows = stmt.query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)))?;
        let mut columns = Vec::new();
        for row in rows {
            columns.push(row?);
        }
        Ok(columns)
    }
}

fn reads_null_markers(file_path: &Path) -> bool {
    file_path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| matches!(e.to_lowercase().as_str(), "csv" | "tsv"))
        .unwrap_or(false)
}

/// Types [`cell_from_ref`] converts directly; anything else is read as text
fn is_scalar_type(data_type: &str) -> bool {
    let data_type = data_type.to_uppercase();
    data_type.starts_with("DECIMAL")
        || matches!(
            data_type.as_str(),
            "BOOLEAN"
                | "TINYINT"
                | "SMALLINT"
                | "INTEGER"
                | "BIGINT"
                | "HUGEINT"
                | "UTINYINT"
                | "USMALLINT"
                | "UINTEGER"
                | "UBIGINT"
                | "FLOAT"
                | "DOUBLE"
                | "VARCHAR"
                | "BLOB"
                | "DATE"
                | "TIME"
                | "TIMESTAMP"
                | "TIMESTAMP_S"
                | "TIMESTAMP_MS"
                | "TIMESTAMP_NS"
        )
}

/// Select a column as-is, or cast nested and exotic types (STRUCT, LIST, MAP,
/// UUID, INTERVAL, ...) to their text form
fn select_expression(name: &str, data_type: &str) -> String {
    let column = quote_identifier(name);
    if is_scalar_type(data_type) {
        column
    } else {
        format!("CAST({column} AS VARCHAR) AS {column}")
    }
}

pub(crate) fn quote_literal(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

pub(crate) fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

fn timestamp_micros(unit: TimeUnit, value: i64) -> i64 {
    match unit {
        TimeUnit::Second => value.saturating_mul(1_000_000),
        TimeUnit::Millisecond => value.saturating_mul(1_000),
        TimeUnit::Microsecond => value,
        TimeUnit::Nanosecond => value / 1_000,
    }
}

/// Convert a DuckDB value to a cell. Timestamps at midnight become dates.
fn cell_from_ref(value: ValueRef<'_>) -> CellValue {
    match value {
        ValueRef::Null => CellValue::Null,
        ValueRef::Boolean(b) => CellValue::Bool(b),
        ValueRef::TinyInt(i) => CellValue::Number(i as f64),
        ValueRef::SmallInt(i) => CellValue::Number(i as f64),
        ValueRef::Int(i) => CellValue::Number(i as f64),
        ValueRef::BigInt(i) => CellValue::Number(i as f64),
        ValueRef::HugeInt(i) => CellValue::Number(i as f64),
        ValueRef::UTinyInt(i) => CellValue::Number(i as f64),
        ValueRef::USmallInt(i) => CellValue::Number(i as f64),
        ValueRef::UInt(i) => CellValue::Number(i as f64),
        ValueRef::UBigInt(i) => CellValue::Number(i as f64),
        ValueRef::Float(f) => CellValue::Number(f as f64),
        ValueRef::Double(f) => CellValue::Number(f),
        ValueRef::Decimal(d) => d
            .to_string()
            .parse::<f64>()
            .map(CellValue::Number)
            .unwrap_or_else(|_| CellValue::String(d.to_string())),
        ValueRef::Text(s) => CellValue::String(String::from_utf8_lossy(s).to_string()),
        ValueRef::Blob(b) => CellValue::String(format!("<blob:{} bytes>", b.len())),
        ValueRef::Date32(days) => DateTime::from_timestamp(days as i64 * 86_400, 0)
            .map(|dt| CellValue::Date(dt.date_naive()))
            .unwrap_or(CellValue::Null),
        ValueRef::Timestamp(unit, ts) => {
            let micros = timestamp_micros(unit, ts);
            match DateTime::from_timestamp_micros(micros) {
                Some(dt) if dt.num_seconds_from_midnight() == 0 && dt.nanosecond() == 0 => {
                    CellValue::Date(dt.date_naive())
                }
                Some(dt) => CellValue::String(dt.format("%Y-%m-%d %H:%M:%S").to_string()),
                None => CellValue::Null,
            }
        }
        ValueRef::Time64(unit, t) => {
            let total_seconds = timestamp_micros(unit, t) / 1_000_000;
            CellValue::String(format!(
                "{:02}:{:02}:{:02}",
                total_seconds / 3600,
                (total_seconds % 3600) / 60,
                total_seconds % 60
            ))
        }
        _ => {
            log::warn!("Unexpected DuckDB value type after text casting, loading as null");
            CellValue::Null
        }
    }
}

/// Convert DuckDB errors to input errors where the cause is the file
fn convert_duckdb_error(error: duckdb::Error, file_path: &Path) -> RowdeltaError {
    let error_msg = error.to_string();

    if error_msg.contains("CSV Error")
        || error_msg.contains("Could not convert")
        || error_msg.contains("Invalid CSV")
        || error_msg.contains("Unterminated quoted field")
    {
        RowdeltaError::invalid_input(format!(
            "Malformed CSV file '{}': {}",
            file_path.display(),
            error_msg
        ))
    } else if error_msg.contains("JSON") {
        RowdeltaError::invalid_input(format!(
            "Malformed JSON file '{}': {}",
            file_path.display(),
            error_msg
        ))
    } else if error_msg.contains("No files found") || error_msg.contains("does not exist") {
        RowdeltaError::invalid_input(format!("File not found: {}", file_path.display()))
    } else if error_msg.contains("Permission denied") {
        RowdeltaError::invalid_input(format!(
            "Permission denied accessing file: {}",
            file_path.display()
        ))
    } else {
        RowdeltaError::DuckDb(error)
    }
}
