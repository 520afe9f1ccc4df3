//! Generate command handler

use anyhow::{Context, Result};
use colored::*;
use std::io::{self, Write};

use super::{GenerateArgs, OutputFormat};
use crate::config::GeneratorConfig;
use crate::report::{Period, ReportError, ReportGenerator, RunOutcome, RunSummary};

pub const NO_COURSES: &str = "No hay cursos disponibles para este mes";

pub fn handle_generate_command(args: GenerateArgs, config: &GeneratorConfig) -> Result<()> {
    let period = Period::from_selector(args.month.as_deref());
    log::info!("Generating attendance sheets for {}", period);

    let generator = ReportGenerator::new(config.settings());
    let stdout = io::stdout();
    let mut out = stdout.lock();

    match generator.run(period) {
        Ok(RunOutcome::Completed(summary)) => {
            print_summary(&mut out, &summary, args.format)?;
            report_failures(&summary);
            Ok(())
        }
        Ok(RunOutcome::NoCourses(period)) => {
            match args.format {
                OutputFormat::Text => writeln!(out, "{}", NO_COURSES)?,
                OutputFormat::Json => write_json(&mut out, &RunSummary::empty(period))?,
            }
            Ok(())
        }
        Err(ReportError::NoReports { summary }) => {
            print_summary(&mut out, &summary, args.format)?;
            report_failures(&summary);
            Err(ReportError::NoReports { summary }.into())
        }
        Err(err) => Err(anyhow::Error::new(err).context(format!("Report generation for {} failed", period))),
    }
}

fn print_summary(out: &mut impl Write, summary: &RunSummary, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Text => write_text(out, summary)?,
        OutputFormat::Json => write_json(out, summary)?,
    }
    out.flush()?;
    Ok(())
}

/// The progress summary read by the calling layer; labels are fixed
pub fn write_text(out: &mut impl Write, summary: &RunSummary) -> io::Result<()> {
    writeln!(out, "--- Resumen de generación de reportes ---")?;
    writeln!(out, "Mes procesado: {}", summary.period)?;
    writeln!(out, "Total de documentos generados: {}", summary.documents_generated)?;
    writeln!(out, "Cursos sin participantes: {}", summary.courses_without_participants)?;
    if let Some(path) = &summary.archive_path {
        writeln!(out, "ZIP generado: {}", path.display())?;
    }
    Ok(())
}

fn write_json(out: &mut impl Write, summary: &RunSummary) -> Result<()> {
    serde_json::to_writer_pretty(&mut *out, summary).context("Failed to serialize run summary")?;
    writeln!(out)?;
    Ok(())
}

fn report_failures(summary: &RunSummary) {
    if summary.failures.is_empty() && summary.omitted_from_archive.is_empty() {
        return;
    }

    eprintln!(
        "{} {} document(s) failed",
        "Warning:".yellow().bold(),
        summary.failures.len()
    );
    for failure in &summary.failures {
        eprintln!("  {} {}", failure.document.bright_white(), failure.error.dimmed());
    }
    for path in &summary.omitted_from_archive {
        eprintln!("  {} {}", "missing from archive:".yellow(), path.display());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::DocumentFailure;
    use std::path::PathBuf;

    fn summary() -> RunSummary {
        let mut summary = RunSummary::empty(Period::new(3).unwrap());
        summary.documents_generated = 3;
        summary.courses_without_participants = 1;
        summary
    }

    fn text(summary: &RunSummary) -> String {
        let mut out = Vec::new();
        write_text(&mut out, summary).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_text_summary_lines() {
        let mut summary = summary();
        summary.archive_path = Some(PathBuf::from("/srv/reportes/Reportes_Marzo.zip"));

        assert_eq!(
            text(&summary),
            "--- Resumen de generación de reportes ---\n\
             Mes procesado: Marzo\n\
             Total de documentos generados: 3\n\
             Cursos sin participantes: 1\n\
             ZIP generado: /srv/reportes/Reportes_Marzo.zip\n"
        );
    }

    #[test]
    fn test_zip_line_omitted_without_archive() {
        let output = text(&summary());
        assert!(!output.contains("ZIP generado"));
        assert!(output.ends_with("Cursos sin participantes: 1\n"));
    }

    #[test]
    fn test_json_summary() {
        let mut summary = summary();
        summary.failures.push(DocumentFailure {
            document: "A_L1.docx".into(),
            error: "boom".into(),
        });

        let mut out = Vec::new();
        write_json(&mut out, &summary).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&out).unwrap();

        assert_eq!(value["period"], "Marzo");
        assert_eq!(value["month"], 3);
        assert_eq!(value["documents_generated"], 3);
        assert!(value["archive_path"].is_null());
        assert_eq!(value["failures"][0]["document"], "A_L1.docx");
    }
}
