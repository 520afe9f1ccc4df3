//! Command-line interface

pub mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::config::Overrides;
use commands::generate::GenerateArgs;
use commands::history::HistoryCommands;

/// Generate monthly attendance sheets from the course workbook
#[derive(Parser, Debug)]
#[command(name = "attendance-cli")]
#[command(about = "Generate monthly attendance sheets from the course workbook", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Enable verbose logging (-v for info, -vv for debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to a TOML configuration file
    #[arg(short = 'c', long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Workbook with the course and enrollment sheets
    #[arg(long, global = true, value_name = "FILE")]
    pub workbook: Option<PathBuf>,

    /// Attendance-sheet template (.docx)
    #[arg(long, global = true, value_name = "FILE")]
    pub template: Option<PathBuf>,

    /// Directory keeping a copy of every generated document
    #[arg(long, global = true, value_name = "DIR")]
    pub history_dir: Option<PathBuf>,

    /// Directory receiving the month's archive
    #[arg(long, global = true, value_name = "DIR")]
    pub archive_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    pub fn overrides(&self) -> Overrides {
        Overrides {
            workbook: self.workbook.clone(),
            template: self.template.clone(),
            history_dir: self.history_dir.clone(),
            archive_dir: self.archive_dir.clone(),
        }
    }

    /// Log filter for the verbosity count
    pub fn log_filter(&self) -> &'static str {
        match self.verbose {
            0 => "warn",
            1 => "info",
            _ => "debug",
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Generate the attendance sheets of a month and archive them
    Generate(GenerateArgs),

    /// Inspect or clear the history store
    History {
        #[command(subcommand)]
        command: HistoryCommands,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use commands::generate::OutputFormat;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_generate_with_month_and_json() {
        let cli = Cli::try_parse_from(["attendance-cli", "-vv", "generate", "3", "--format", "json"])
            .unwrap();
        assert_eq!(cli.log_filter(), "debug");
        match cli.command {
            Commands::Generate(args) => {
                assert_eq!(args.month.as_deref(), Some("3"));
                assert_eq!(args.format, OutputFormat::Json);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_generate_without_month() {
        let cli = Cli::try_parse_from(["attendance-cli", "generate", "--workbook", "otro.xlsx"])
            .unwrap();
        assert_eq!(cli.log_filter(), "warn");
        assert_eq!(cli.overrides().workbook, Some(PathBuf::from("otro.xlsx")));
        match cli.command {
            Commands::Generate(args) => {
                assert!(args.month.is_none());
                assert_eq!(args.format, OutputFormat::Text);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_history_subcommands() {
        let cli = Cli::try_parse_from(["attendance-cli", "history", "clear"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::History {
                command: HistoryCommands::Clear
            }
        ));
    }
}
