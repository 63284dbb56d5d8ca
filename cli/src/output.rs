//! Output formatting utilities

use rowdelta_core::config::{Config, ConfigSource};
use rowdelta_core::error::Result;
use rowdelta_core::report::{format_change_value, Emphasis, ReportCell};
use rowdelta_core::{
    ComparisonResult, ComparisonRow, ComparisonSummary, Report, RowStatus, ValueChange,
    ROW_STATUS_COLUMN,
};

const SAMPLE_ROWS: usize = 3;
const SAMPLE_CHANGES: usize = 2;

/// Pretty printer for rowdelta output
pub struct PrettyPrinter;

impl PrettyPrinter {
    /// Print a comparison as a tree. `summary` counts the full result, so it
    /// stays accurate when `result` holds only the changed rows.
    pub fn print_comparison(result: &ComparisonResult, summary: &ComparisonSummary) {
        println!("🔍 Comparison: {} → {}", result.old_title, result.new_title);
        match &result.key_column {
            Some(key) => println!("├─ Key column: {key}"),
            None => println!("├─ Key column: none (rows matched by position)"),
        }

        if result.schema.has_changes() {
            println!("├─ ❌ Schema: CHANGED");
            Self::print_column_list("│  ", "Columns added", result.added_columns(), false);
            Self::print_column_list("│  ", "Columns deleted", result.deleted_columns(), true);
        } else {
            println!("├─ ✅ Schema: unchanged");
        }

        if summary.total_changes() > 0 {
            println!("├─ ❌ Rows: {} changed", summary.total_changes());
            Self::print_updated_rows(result, "│  ");
            Self::print_key_sample(result, RowStatus::Added, "Added rows", "│  ", false);
            Self::print_key_sample(result, RowStatus::Deleted, "Deleted rows", "│  ", true);
        } else {
            println!("├─ ✅ Rows: unchanged");
        }

        println!(
            "└─ Total rows: {} ({} unchanged)",
            summary.total_rows(),
            summary.unchanged
        );
    }

    fn print_column_list(prefix: &str, label: &str, columns: &[String], last: bool) {
        let marker = if last { "└─" } else { "├─" };
        if columns.is_empty() {
            println!("{prefix}{marker} {label}: 0");
            return;
        }
        println!("{prefix}{marker} {label}: {} [{}]", columns.len(), columns.join(", "));
    }

    fn print_updated_rows(result: &ComparisonResult, prefix: &str) {
        let updated: Vec<&ComparisonRow> = rows_with_status(result, RowStatus::Updated).collect();
        println!("{prefix}├─ Updated rows: {}", updated.len());

        let shown = updated.len().min(SAMPLE_ROWS);
        for (i, row) in updated.iter().take(SAMPLE_ROWS).enumerate() {
            let is_last = i == shown - 1 && updated.len() <= SAMPLE_ROWS;
            let row_marker = if is_last { "└─" } else { "├─" };
            let child_prefix = if is_last { "   " } else { "│  " };
            println!(
                "{prefix}│  {row_marker} Row {}: {} columns changed",
                row.key,
                row.changes.len()
            );

            let change_count = row.changes.len().min(SAMPLE_CHANGES);
            for (j, (column, change)) in row.changes.iter().take(SAMPLE_CHANGES).enumerate() {
                let is_last_change = j == change_count - 1 && row.changes.len() <= SAMPLE_CHANGES;
                let change_marker = if is_last_change { "└─" } else { "├─" };
                println!(
                    "{prefix}│  {child_prefix}{change_marker} {}",
                    describe_change(column, change)
                );
            }
            if row.changes.len() > SAMPLE_CHANGES {
                println!(
                    "{prefix}│  {child_prefix}└─ ... and {} more",
                    row.changes.len() - SAMPLE_CHANGES
                );
            }
        }

        if updated.len() > SAMPLE_ROWS {
            println!(
                "{prefix}│  └─ ... and {} more updated rows",
                updated.len() - SAMPLE_ROWS
            );
        }
    }

    fn print_key_sample(
        result: &ComparisonResult,
        status: RowStatus,
        label: &str,
        prefix: &str,
        last: bool,
    ) {
        let keys: Vec<String> = rows_with_status(result, status)
            .map(|row| row.key.to_string())
            .collect();
        let marker = if last { "└─" } else { "├─" };
        println!("{prefix}{marker} {label}: {}", keys.len());
        if keys.is_empty() {
            return;
        }
        let child_prefix = if last { "   " } else { "│  " };
        println!(
            "{prefix}{child_prefix}└─ Keys: {}{}",
            keys.iter().take(SAMPLE_ROWS).cloned().collect::<Vec<_>>().join(", "),
            if keys.len() > SAMPLE_ROWS { "..." } else { "" }
        );
    }

    /// Print the first `limit` report rows, one line each, marked by emphasis
    pub fn print_report_preview(report: &Report, limit: usize) {
        let shown = report.rows.len().min(limit);
        println!("📋 Report preview ({shown} of {} rows)", report.rows.len());
        let header = report
            .header
            .iter()
            .map(decorate_cell)
            .collect::<Vec<_>>()
            .join(" | ");
        println!("   {header}");
        for row in report.rows.iter().take(limit) {
            println!("{}", preview_line(report, row));
        }
    }

    /// Print the effective configuration
    pub fn print_config(config: &Config, source: &ConfigSource) {
        println!("Configuration source: {source}");
        println!("Compare:");
        println!(
            "  Key column: {}",
            config.compare.key_column.as_deref().unwrap_or("(row position)")
        );
        if config.compare.null_markers.is_empty() {
            println!("  Null markers: (none)");
        } else {
            println!("  Null markers: {}", config.compare.null_markers.join(", "));
        }
        println!("  Parallel: {}", config.compare.parallel);
        println!("Report:");
        println!("  Title: {}", config.report.title);
        println!("  Worksheet title: {}", config.report.worksheet_title);
        println!("  Date format: {}", config.report.date_format);
        println!("  Include unchanged rows: {}", config.report.include_unchanged);
        if let Some(link) = &config.report.link {
            println!("  Link: {link}");
        }
        println!("Export:");
        println!("  Delimiter: {:?}", config.export.delimiter);
        println!("  Include header: {}", config.export.include_header);
        println!("  Include metadata: {}", config.export.include_metadata);
        println!("  Force overwrite: {}", config.export.force);
    }
}

/// JSON formatter for machine-readable output
pub struct JsonFormatter;

impl JsonFormatter {
    /// Format a comparison result with the summary counts of the full result
    pub fn format_comparison(
        result: &ComparisonResult,
        summary: &ComparisonSummary,
    ) -> Result<String> {
        let json = serde_json::json!({
            "new_title": result.new_title,
            "old_title": result.old_title,
            "key_column": result.key_column,
            "columns": result.header(),
            "added_columns": result.added_columns(),
            "deleted_columns": result.deleted_columns(),
            "summary": summary,
            "rows": result.rows,
        });
        Ok(serde_json::to_string_pretty(&json)?)
    }
}

fn rows_with_status(
    result: &ComparisonResult,
    status: RowStatus,
) -> impl Iterator<Item = &ComparisonRow> {
    result.rows.iter().filter(move |row| row.status == status)
}

/// One-line description of a cell change
fn describe_change(column: &str, change: &ValueChange) -> String {
    format!(
        "{column}: {} → {}",
        format_change_value(&change.old),
        format_change_value(&change.new)
    )
}

fn emphasis_marker(emphasis: Option<Emphasis>) -> &'static str {
    match emphasis {
        Some(Emphasis::Good) => "🟢",
        Some(Emphasis::Bad) => "🔴",
        Some(Emphasis::Neutral) => "🟡",
        None => "⚪",
    }
}

/// Cell text on one line: `+added`, `-deleted`, `*changed*`
fn decorate_cell(cell: &ReportCell) -> String {
    let text = cell.text.replace('\n', "; ");
    if text.is_empty() {
        return text;
    }
    match cell.emphasis {
        Some(Emphasis::Good) => format!("+{text}"),
        Some(Emphasis::Bad) => format!("-{text}"),
        Some(Emphasis::Neutral) => format!("*{text}*"),
        None => text,
    }
}

/// A report row led by the marker of its status cell. Cells of added and
/// deleted rows are left plain since the marker already covers them.
fn preview_line(report: &Report, row: &[ReportCell]) -> String {
    let row_emphasis = report
        .header
        .iter()
        .rposition(|cell| cell.text == ROW_STATUS_COLUMN)
        .and_then(|i| row.get(i))
        .and_then(|cell| cell.emphasis);

    let cells = row
        .iter()
        .map(|cell| match row_emphasis {
            Some(Emphasis::Good | Emphasis::Bad) => cell.text.replace('\n', "; "),
            _ => decorate_cell(cell),
        })
        .collect::<Vec<_>>()
        .join(" | ");
    format!("{} {cells}", emphasis_marker(row_emphasis))
}
