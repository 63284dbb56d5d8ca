//! Command implementations for rowdelta CLI

use crate::cli::{Commands, ConfigCommand};
use crate::output::{JsonFormatter, PrettyPrinter};
use crate::progress::ProgressReporter;
use rowdelta_core::config::{self, Config};
use rowdelta_core::error::{Result, RowdeltaError};
use rowdelta_core::export::{export_report, ExportOptions};
use rowdelta_core::{
    CompareOptions, ComparisonResult, ComparisonSummary, DataLoader, Report, ReportBuilder,
    SheetSelection, Table, TableComparator,
};
use std::path::{Path, PathBuf};

/// Arguments of the compare command
#[derive(Debug, Clone, Default)]
pub struct CompareArgs {
    pub new: PathBuf,
    pub old: PathBuf,
    pub key: Option<String>,
    pub new_title: Option<String>,
    pub old_title: Option<String>,
    pub selection: SheetSelection,
    pub output: Option<PathBuf>,
    pub force: bool,
    pub changes_only: bool,
    pub preview: usize,
    pub json: bool,
}

/// Execute a command
pub fn execute_command(command: Commands) -> Result<()> {
    match command {
        Commands::Init { force } => init_command(force),
        Commands::Compare {
            new,
            old,
            key,
            new_title,
            old_title,
            sheet,
            range,
            output,
            force,
            changes_only,
            preview,
            json,
        } => {
            let args = CompareArgs {
                new,
                old,
                key,
                new_title,
                old_title,
                selection: SheetSelection { sheet, range },
                output,
                force,
                changes_only,
                preview,
                json,
            };
            let config = config::get_config()?;
            compare_command(&args, &config)
        }
        Commands::Config { command } => match command {
            ConfigCommand::Show => show_current_config(),
        },
    }
}

fn init_command(force: bool) -> Result<()> {
    let path = config::local_config_path()?;
    write_default_config(&path, force)?;
    println!("✅ Wrote default configuration to: {}", path.display());
    Ok(())
}

fn write_default_config(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        return Err(RowdeltaError::invalid_input(format!(
            "Config file already exists: {}. Use --force to overwrite.",
            path.display()
        )));
    }
    config::save_config_to(&Config::default(), path)?;
    Ok(())
}

/// Load both tables, compare them and print or export the result
fn compare_command(args: &CompareArgs, config: &Config) -> Result<()> {
    let mut progress = ProgressReporter::new(!args.json);
    let mut loader = DataLoader::new()?.with_null_markers(config.compare.null_markers.clone());

    let new = load_table(&mut loader, &mut progress, &args.new, &args.selection)?;
    let old = load_table(&mut loader, &mut progress, &args.old, &args.selection)?;

    let options = CompareOptions {
        key_column: args.key.clone().or_else(|| config.compare.key_column.clone()),
        new_title: args
            .new_title
            .clone()
            .unwrap_or_else(|| args.new.display().to_string()),
        old_title: args
            .old_title
            .clone()
            .unwrap_or_else(|| args.old.display().to_string()),
        parallel: config.compare.parallel,
    };

    progress.start("Comparing tables...");
    let result = TableComparator::new(options).compare(&new, &old)?;
    progress.finish(&format!("Compared {} rows", result.len()));

    let (shown, summary) = displayed_result(result, args.changes_only);

    let report = (args.output.is_some() || args.preview > 0)
        .then(|| build_report(&shown, args, config));
    if let (Some(output), Some(report)) = (&args.output, &report) {
        write_report(report, output, args, config)?;
        if !args.json {
            println!("📄 Report written to '{}'", output.display());
        }
    }

    if args.json {
        println!("{}", JsonFormatter::format_comparison(&shown, &summary)?);
    } else {
        PrettyPrinter::print_comparison(&shown, &summary);
        if let Some(report) = report.filter(|_| args.preview > 0) {
            PrettyPrinter::print_report_preview(&report, args.preview);
        }
    }

    Ok(())
}

/// The rows to show, with counts taken before unchanged rows are dropped
fn displayed_result(
    result: ComparisonResult,
    changes_only: bool,
) -> (ComparisonResult, ComparisonSummary) {
    let summary = result.summary();
    let shown = if changes_only {
        result.changes_only()
    } else {
        result
    };
    (shown, summary)
}

fn load_table(
    loader: &mut DataLoader,
    progress: &mut ProgressReporter,
    path: &Path,
    selection: &SheetSelection,
) -> Result<Table> {
    progress.start(&format!("Loading {}...", path.display()));
    let table = loader.load_selection(path, selection)?;
    progress.finish(&format!(
        "Loaded {} ({} rows, {} columns)",
        path.display(),
        table.len(),
        table.column_count()
    ));
    Ok(table)
}

fn build_report(result: &ComparisonResult, args: &CompareArgs, config: &Config) -> Report {
    let mut report_config = config.report.clone();
    if args.changes_only {
        report_config.include_unchanged = false;
    }
    ReportBuilder::new(report_config).build(result)
}

fn write_report(
    report: &Report,
    output: &Path,
    args: &CompareArgs,
    config: &Config,
) -> Result<()> {
    let mut options = ExportOptions::from(&config.export);
    options.force |= args.force;
    export_report(report, output, &options)
}

fn show_current_config() -> Result<()> {
    let (config, source) = config::get_config_resolution_info()?;
    PrettyPrinter::print_config(&config, &source);
    Ok(())
}
