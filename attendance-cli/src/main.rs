use anyhow::Result;
use clap::Parser;
use colored::*;

use attendance_cli::cli::commands::{generate, history};
use attendance_cli::cli::{Cli, Commands};
use attendance_cli::config::GeneratorConfig;

fn main() {
    let cli = Cli::parse();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(cli.log_filter()))
        .format_timestamp(None)
        .init();

    if let Err(err) = run(cli) {
        eprintln!("{} {:#}", "Error:".bright_red().bold(), err);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let mut config = GeneratorConfig::load(cli.config.as_deref())?;
    config.apply_overrides(cli.overrides());
    log::debug!("Effective configuration: {:?}", config);

    match cli.command {
        Commands::Generate(args) => generate::handle_generate_command(args, &config),
        Commands::History { command } => history::handle_history_command(command, &config),
    }
}
