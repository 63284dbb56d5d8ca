//! Command-line interface for rowdelta

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "rowdelta")]
#[command(about = "Compare two versions of a table and report what changed")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Write a default rowdelta.toml in the current directory
    Init {
        /// Overwrite an existing configuration file
        #[arg(long)]
        force: bool,
    },

    /// Compare a new version of a table against an old one
    Compare {
        /// New table (csv, tsv, json, jsonl, parquet or xlsx)
        new: PathBuf,

        /// Old table (csv, tsv, json, jsonl, parquet or xlsx)
        old: PathBuf,

        /// Column used to match rows (defaults to the configured key, then row position)
        #[arg(long)]
        key: Option<String>,

        /// Description of the new table shown in the report (defaults to its path)
        #[arg(long)]
        new_title: Option<String>,

        /// Description of the old table shown in the report (defaults to its path)
        #[arg(long)]
        old_title: Option<String>,

        /// Worksheet to read from xlsx inputs
        #[arg(long)]
        sheet: Option<String>,

        /// Cell range to read from xlsx inputs (e.g. B8:F40)
        #[arg(long)]
        range: Option<String>,

        /// Write the full report to a file (format determined by extension: .csv, .parquet, .json or .xlsx)
        #[arg(long, short)]
        output: Option<PathBuf>,

        /// Overwrite the output file if it exists
        #[arg(long, requires = "output")]
        force: bool,

        /// Leave unchanged rows out of the output
        #[arg(long)]
        changes_only: bool,

        /// Print the first N report rows, marked as added, deleted or changed
        #[arg(long, value_name = "N", default_value_t = 0, conflicts_with = "json")]
        preview: usize,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Configure rowdelta settings
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

#[derive(Subcommand)]
pub enum ConfigCommand {
    /// Show the effective configuration and where it was loaded from
    Show,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_compare() {
        let cli = Cli::try_parse_from([
            "rowdelta",
            "compare",
            "new.csv",
            "old.csv",
            "--key",
            "id",
            "--output",
            "changes.xlsx",
            "--force",
            "--changes-only",
        ])
        .unwrap();

        match cli.command {
            Commands::Compare {
                new,
                old,
                key,
                output,
                force,
                changes_only,
                json,
                ..
            } => {
                assert_eq!(new, PathBuf::from("new.csv"));
                assert_eq!(old, PathBuf::from("old.csv"));
                assert_eq!(key.as_deref(), Some("id"));
                assert_eq!(output, Some(PathBuf::from("changes.xlsx")));
                assert!(force);
                assert!(changes_only);
                assert!(!json);
            }
            _ => panic!("expected compare command"),
        }
    }

    #[test]
    fn test_parse_preview() {
        let cli = Cli::try_parse_from(["rowdelta", "compare", "a.csv", "b.csv", "--preview", "5"])
            .unwrap();
        match cli.command {
            Commands::Compare { preview, .. } => assert_eq!(preview, 5),
            _ => panic!("expected compare command"),
        }
        assert!(Cli::try_parse_from([
            "rowdelta", "compare", "a.csv", "b.csv", "--preview", "5", "--json"
        ])
        .is_err());
    }

    #[test]
    fn test_force_requires_output() {
        assert!(Cli::try_parse_from(["rowdelta", "compare", "a.csv", "b.csv", "--force"]).is_err());
    }

    #[test]
    fn test_parse_config_show_verbose() {
        let cli = Cli::try_parse_from(["rowdelta", "config", "show", "-v"]).unwrap();
        assert!(cli.verbose);
        assert!(matches!(
            cli.command,
            Commands::Config {
                command: ConfigCommand::Show
            }
        ));
    }
}
