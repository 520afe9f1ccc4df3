//! History command handlers

use anyhow::{Context, Result};
use colored::*;
use std::io::{self, Write};

use super::HistoryCommands;
use crate::cli::commands::generate::OutputFormat;
use crate::config::GeneratorConfig;
use crate::report::{HistoryEntry, HistoryStore};

pub fn handle_history_command(command: HistoryCommands, config: &GeneratorConfig) -> Result<()> {
    let store = HistoryStore::new(&config.history_dir);

    match command {
        HistoryCommands::List { format } => {
            let entries = store
                .list()
                .with_context(|| format!("Failed to list {}", store.dir().display()))?;

            let stdout = io::stdout();
            let mut out = stdout.lock();
            match format {
                OutputFormat::Text => write_listing(&mut out, &entries)?,
                OutputFormat::Json => {
                    serde_json::to_writer_pretty(&mut out, &entries)?;
                    writeln!(out)?;
                }
            }
        }
        HistoryCommands::Clear => {
            let removed = store
                .clear()
                .with_context(|| format!("Failed to clear {}", store.dir().display()))?;
            println!(
                "{} {} document(s) removed from {}",
                "✓".bright_green(),
                removed,
                store.dir().display()
            );
        }
    }

    Ok(())
}

fn write_listing(out: &mut impl Write, entries: &[HistoryEntry]) -> io::Result<()> {
    if entries.is_empty() {
        writeln!(out, "{}", "History is empty".dimmed())?;
        return Ok(());
    }

    let width = entries.iter().map(|e| e.name.len()).max().unwrap_or(0);
    for entry in entries {
        let modified = entry
            .modified
            .map(|m| m.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|| "-".to_string());
        writeln!(
            out,
            "{:<width$}  {:>10}  {}",
            entry.name.bright_white(),
            entry.size,
            modified.dimmed(),
            width = width
        )?;
    }
    writeln!(out, "{} document(s)", entries.len().to_string().cyan())?;
    Ok(())
}
