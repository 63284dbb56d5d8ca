//! Presentation of a comparison result as report cells
//!
//! Turns a [`ComparisonResult`] into text cells with emphasis hints so that any
//! renderer (terminal, spreadsheet, CSV) can style added, deleted and changed
//! data consistently.

use crate::comparison::{ComparisonResult, ComparisonRow, ROW_STATUS_COLUMN, VALUE_CHANGES_COLUMN};
use crate::config::ReportConfig;
use crate::differ::ChangeMap;
use crate::status::RowStatus;
use crate::value::CellValue;
use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};

/// Styling hint for a rendered cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Emphasis {
    /// Added rows and columns
    Good,
    /// Deleted rows and columns
    Bad,
    /// Changed cells and updated rows
    Neutral,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportCell {
    pub text: String,
    pub emphasis: Option<Emphasis>,
}

/// Header block printed above the report table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportMetadata {
    pub title: String,
    pub worksheet_title: String,
    pub new_title: String,
    pub old_title: String,
    pub generated: String,
    pub link: Option<String>,
}

impl ReportMetadata {
    /// Label/value lines in display order
    pub fn lines(&self) -> Vec<(String, String)> {
        let mut lines = vec![
            ("New:".to_string(), self.new_title.clone()),
            ("Old:".to_string(), self.old_title.clone()),
            ("Generated:".to_string(), self.generated.clone()),
        ];
        if let Some(link) = &self.link {
            lines.push((String::new(), link.clone()));
        }
        lines
    }
}

/// A comparison result rendered to text cells
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub metadata: ReportMetadata,
    pub header: Vec<ReportCell>,
    pub rows: Vec<Vec<ReportCell>>,
}

impl Report {
    pub fn header_text(&self) -> Vec<&str> {
        self.header.iter().map(|c| c.text.as_str()).collect()
    }
}

/// Renders a value the way it appears inside a change map entry
pub fn format_change_value(value: &CellValue) -> String {
    match value.canonical() {
        CellValue::Null => "null".to_string(),
        CellValue::String(s) => format!("'{s}'"),
        CellValue::Date(d) => format!("'{}'", d.format("%Y-%m-%d")),
        other => other.to_string(),
    }
}

/// Renders a change map as one `column: {old: new}` entry per line
pub fn format_change_map(changes: &ChangeMap) -> String {
    changes
        .iter()
        .map(|(column, change)| {
            format!(
                "{column}: {{{}: {}}}",
                format_change_value(&change.old),
                format_change_value(&change.new)
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Builds [`Report`]s from comparison results
pub struct ReportBuilder {
    config: ReportConfig,
    generated: NaiveDate,
}

impl ReportBuilder {
    pub fn new(config: ReportConfig) -> Self {
        Self {
            config,
            generated: Local::now().date_naive(),
        }
    }

    /// Fix the generation date instead of using today's date
    pub fn generated_on(mut self, date: NaiveDate) -> Self {
        self.generated = date;
        self
    }

    pub fn build(&self, result: &ComparisonResult) -> Report {
        let metadata = ReportMetadata {
            title: self.config.title.clone(),
            worksheet_title: self.config.worksheet_title.clone(),
            new_title: result.new_title.clone(),
            old_title: result.old_title.clone(),
            generated: self.generated.format(&self.config.date_format).to_string(),
            link: self.config.link.clone(),
        };

        let header = result
            .header()
            .into_iter()
            .map(|name| {
                let emphasis = column_emphasis(result, &name);
                ReportCell {
                    text: name,
                    emphasis,
                }
            })
            .collect();

        let rows = result
            .rows
            .iter()
            .filter(|row| self.config.include_unchanged || row.status.is_change())
            .map(|row| render_row(result, row))
            .collect();

        Report {
            metadata,
            header,
            rows,
        }
    }
}

fn column_emphasis(result: &ComparisonResult, column: &str) -> Option<Emphasis> {
    if result.schema.is_deleted(column) {
        Some(Emphasis::Bad)
    } else if result.schema.is_added(column) {
        Some(Emphasis::Good)
    } else {
        None
    }
}

/// Emphasis precedence: row status, then column emphasis, then changed cells.
/// The status cell of an updated row is always neutral.
fn cell_emphasis(
    result: &ComparisonResult,
    row: &ComparisonRow,
    column: &str,
) -> Option<Emphasis> {
    match row.status {
        RowStatus::Added => return Some(Emphasis::Good),
        RowStatus::Deleted => return Some(Emphasis::Bad),
        RowStatus::Updated if column == ROW_STATUS_COLUMN => return Some(Emphasis::Neutral),
        _ => {}
    }
    if let Some(emphasis) = column_emphasis(result, column) {
        return Some(emphasis);
    }
    let changed = row.changes.contains(column)
        || (column == VALUE_CHANGES_COLUMN && !row.changes.is_empty());
    changed.then_some(Emphasis::Neutral)
}

fn render_row(result: &ComparisonResult, row: &ComparisonRow) -> Vec<ReportCell> {
    let mut cells: Vec<ReportCell> = result
        .columns
        .iter()
        .zip(&row.values)
        .map(|(column, value)| ReportCell {
            text: value.to_string(),
            emphasis: cell_emphasis(result, row, column),
        })
        .collect();

    cells.push(ReportCell {
        text: row.status.label().to_string(),
        emphasis: cell_emphasis(result, row, ROW_STATUS_COLUMN),
    });
    cells.push(ReportCell {
        text: format_change_map(&row.changes),
        emphasis: cell_emphasis(result, row, VALUE_CHANGES_COLUMN),
    });
    cells
}
