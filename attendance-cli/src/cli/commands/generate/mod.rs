//! `generate` command

pub mod handler;

use clap::{Args, ValueEnum};

pub use handler::handle_generate_command;

#[derive(Args, Debug)]
pub struct GenerateArgs {
    /// Month to process (1-12); defaults to the current month
    pub month: Option<String>,

    /// Summary format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// The progress summary, line by line
    Text,
    /// The run summary as JSON
    Json,
}
