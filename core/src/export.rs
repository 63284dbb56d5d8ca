//! Report export using the DuckDB COPY command
//!
//! A rendered [`Report`] is loaded into an in-memory table of text columns and
//! written out as CSV, Parquet, JSON or Excel. CSV and Excel reports can carry
//! the report's header block (title, table descriptions, generation date and
//! link) above the table; Excel reports are written to a worksheet named after
//! the report's worksheet title.

use crate::config::ExportConfig;
use crate::data::{quote_identifier, quote_literal};
use crate::error::{Result, RowdeltaError};
use crate::report::{Report, ReportMetadata};
use duckdb::Connection;
use std::collections::HashSet;
use std::path::Path;

const EXPORT_TABLE: &str = "report_data";

/// Supported export formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    /// Comma-separated values format
    Csv,
    /// Apache Parquet columnar format
    Parquet,
    /// JSON format
    Json,
    /// Microsoft Excel format (XLSX)
    Excel,
}

impl ExportFormat {
    /// Get the DuckDB format string for COPY command
    pub fn duckdb_format(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "CSV",
            ExportFormat::Parquet => "PARQUET",
            ExportFormat::Json => "JSON",
            ExportFormat::Excel => "XLSX",
        }
    }

    /// Determine format from file extension
    pub fn from_extension(path: &Path) -> Result<Self> {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_lowercase());

        match extension.as_deref() {
            Some("csv") => Ok(ExportFormat::Csv),
            Some("parquet") => Ok(ExportFormat::Parquet),
            Some("json") => Ok(ExportFormat::Json),
            Some("xlsx") => Ok(ExportFormat::Excel),
            Some(ext) => Err(RowdeltaError::invalid_input(format!(
                "Unsupported file extension: {ext}"
            ))),
            None => Err(RowdeltaError::invalid_input("No file extension provided")),
        }
    }

    /// Row-oriented documents read by people, which get the header block
    fn takes_metadata(&self) -> bool {
        matches!(self, ExportFormat::Csv | ExportFormat::Excel)
    }
}

/// Export options for customizing output
#[derive(Debug, Clone)]
pub struct ExportOptions {
    /// Whether to include CSV header (only applies to CSV format)
    pub include_header: bool,
    /// CSV delimiter character (only applies to CSV format)
    pub delimiter: char,
    /// Whether to write the report header block (CSV and Excel only)
    pub include_metadata: bool,
    /// Whether to force overwrite existing files
    pub force: bool,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self::from(&ExportConfig::default())
    }
}

impl From<&ExportConfig> for ExportOptions {
    fn from(config: &ExportConfig) -> Self {
        Self {
            include_header: config.include_header,
            delimiter: config.delimiter,
            include_metadata: config.include_metadata,
            force: config.force,
        }
    }
}

/// How the report table is laid out in the export table
struct Layout {
    columns: Vec<String>,
    rows: Vec<Vec<Option<String>>>,
    /// Whether COPY writes the column names as the first line
    copy_header: bool,
}

/// Writes rendered reports to files
pub struct ReportExporter {
    connection: Connection,
}

impl ReportExporter {
    pub fn new() -> Result<Self> {
        let connection = Connection::open_in_memory()?;
        connection.execute("SET enable_progress_bar=false", [])?;
        connection.execute("SET preserve_insertion_order=true", [])?;
        Ok(Self { connection })
    }

    /// Export a report to `output_path`, choosing the format from its extension
    pub fn export(&mut self, report: &Report, output_path: &Path, options: &ExportOptions) -> Result<()> {
        let format = ExportFormat::from_extension(output_path)?;

        if output_path.exists() && !options.force {
            return Err(RowdeltaError::invalid_input(format!(
                "Output file already exists: {}. Use force option to overwrite.",
                output_path.display()
            )));
        }

        let layout = layout_report(report, format, options);
        self.load_layout(&layout)?;

        if format == ExportFormat::Excel {
            self.connection
                .execute_batch("INSTALL excel; LOAD excel;")
                .map_err(|e| RowdeltaError::export(format!("Failed to load the DuckDB excel extension: {e}")))?;
        }

        let copy_command = build_copy_command(
            output_path,
            format,
            options,
            layout.copy_header,
            &report.metadata.worksheet_title,
        );
        self.connection
            .execute(&copy_command, [])
            .map_err(|e| RowdeltaError::export(format!("Export failed: {e}")))?;

        log::info!(
            "Exported {} report rows to {} ({})",
            report.rows.len(),
            output_path.display(),
            format.duckdb_format()
        );
        Ok(())
    }

    fn load_layout(&mut self, layout: &Layout) -> Result<()> {
        let column_defs = layout
            .columns
            .iter()
            .map(|c| format!("{} VARCHAR", quote_identifier(c)))
            .collect::<Vec<_>>()
            .join(", ");

        self.connection.execute_batch(&format!(
            "DROP TABLE IF EXISTS {EXPORT_TABLE}; CREATE TABLE {EXPORT_TABLE} ({column_defs});"
        ))?;

        let placeholders = vec!["?"; layout.columns.len()].join(", ");
        let mut stmt = self
            .connection
            .prepare(&format!("INSERT INTO {EXPORT_TABLE} VALUES ({placeholders})"))?;
        for row in &layout.rows {
            stmt.execute(duckdb::params_from_iter(row.iter().map(Option::as_deref)))?;
        }
        Ok(())
    }
}

/// Header block rows: title, `New:`/`Old:`/`Generated:` pairs, the link, then
/// a blank separator row
fn metadata_rows(metadata: &ReportMetadata) -> Vec<Vec<String>> {
    let mut rows = vec![vec![metadata.title.clone()]];
    for (label, value) in metadata.lines() {
        if label.is_empty() {
            rows.push(vec![value]);
        } else {
            rows.push(vec![label, value]);
        }
    }
    rows.push(Vec::new());
    rows
}

fn pad_row(cells: Vec<String>, width: usize) -> Vec<Option<String>> {
    let mut row: Vec<Option<String>> = cells
        .into_iter()
        .map(|text| (!text.is_empty()).then_some(text))
        .collect();
    row.resize(width, None);
    row
}

fn layout_report(report: &Report, format: ExportFormat, options: &ExportOptions) -> Layout {
    let header: Vec<String> = report.header.iter().map(|c| c.text.clone()).collect();
    let width = header.len();
    let data_rows = report
        .rows
        .iter()
        .map(|row| pad_row(row.iter().map(|c| c.text.clone()).collect(), width));

    if !(options.include_metadata && format.takes_metadata()) {
        return Layout {
            columns: unique_column_names(&report.header_text()),
            rows: data_rows.collect(),
            copy_header: format != ExportFormat::Csv || options.include_header,
        };
    }

    // The header block sits above the table, so column names become a data row
    let mut rows: Vec<Vec<Option<String>>> = metadata_rows(&report.metadata)
        .into_iter()
        .map(|cells| pad_row(cells, width))
        .collect();
    if format == ExportFormat::Excel || options.include_header {
        rows.push(pad_row(header, width));
    }
    rows.extend(data_rows);

    Layout {
        columns: (1..=width).map(|i| format!("column_{i}")).collect(),
        rows,
        copy_header: false,
    }
}

/// Suffix repeated names so every export column is distinct
fn unique_column_names(names: &[&str]) -> Vec<String> {
    let mut seen = HashSet::new();
    names
        .iter()
        .map(|name| {
            let mut candidate = name.to_string();
            let mut n = 2;
            while !seen.insert(candidate.clone()) {
                candidate = format!("{name} ({n})");
                n += 1;
            }
            candidate
        })
        .collect()
}

/// Build the DuckDB COPY command for the specified format and options
fn build_copy_command(
    output_path: &Path,
    format: ExportFormat,
    options: &ExportOptions,
    header: bool,
    sheet: &str,
) -> String {
    let path = quote_literal(&output_path.to_string_lossy());
    let source = format!("SELECT * FROM {EXPORT_TABLE}");
    match format {
        ExportFormat::Csv => format!(
            "COPY ({source}) TO {path} (FORMAT CSV, HEADER {header}, DELIMITER {})",
            quote_literal(&options.delimiter.to_string())
        ),
        ExportFormat::Excel => format!(
            "COPY ({source}) TO {path} (FORMAT XLSX, HEADER {header}, SHEET {})",
            quote_literal(sheet)
        ),
        ExportFormat::Parquet | ExportFormat::Json => {
            format!("COPY ({source}) TO {path} (FORMAT {})", format.duckdb_format())
        }
    }
}

/// Convenience function to export a report with a fresh exporter
pub fn export_report(report: &Report, output_path: &Path, options: &ExportOptions) -> Result<()> {
    let mut exporter = ReportExporter::new()?;
    exporter.export(report, output_path, options)
}
