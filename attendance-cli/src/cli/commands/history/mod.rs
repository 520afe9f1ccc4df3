//! `history` commands

pub mod handler;

use clap::Subcommand;

use super::generate::OutputFormat;

pub use handler::handle_history_command;

#[derive(Subcommand, Debug)]
pub enum HistoryCommands {
    /// List retained documents
    List {
        /// Listing format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
    /// Delete every retained document
    Clear,
}
