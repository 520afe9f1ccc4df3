//! The generation run: workbook in, archive and history copies out

use std::path::{Path, PathBuf};

use serde::Serialize;

use super::archive::{ArchiveAssembler, HistoryStore};
use super::batch::{Batch, plan_batches};
use super::error::{ReportError, ReportResult};
use super::period::{CourseGroup, Period, select_period};
use super::records::{Course, SourceWorkbook, reconcile};
use super::template::{Template, TemplateOptions, document_file_name};

/// Everything a run needs, resolved up front
#[derive(Debug, Clone)]
pub struct GeneratorSettings {
    pub workbook: PathBuf,
    pub course_sheet: String,
    pub enrollment_sheet: String,
    pub template: PathBuf,
    pub template_options: TemplateOptions,
    pub history_dir: PathBuf,
    pub archive_dir: PathBuf,
}

/// A document that could not be produced
#[derive(Debug, Clone, Serialize)]
pub struct DocumentFailure {
    pub document: String,
    pub error: String,
}

/// Counters and artifacts of one run
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub period: String,
    pub month: u32,
    pub documents_generated: usize,
    pub courses_without_participants: usize,
    pub archive_path: Option<PathBuf>,
    pub failures: Vec<DocumentFailure>,
    pub omitted_from_archive: Vec<PathBuf>,
}

impl RunSummary {
    /// Zero counters for `period`
    pub fn empty(period: Period) -> Self {
        Self {
            period: period.display_name().to_string(),
            month: period.month(),
            documents_generated: 0,
            courses_without_participants: 0,
            archive_path: None,
            failures: Vec::new(),
            omitted_from_archive: Vec::new(),
        }
    }
}

#[derive(Debug)]
pub enum RunOutcome {
    /// Documents were generated and archived
    Completed(RunSummary),
    /// No course is scheduled in the period; nothing was written
    NoCourses(Period),
}

pub struct ReportGenerator {
    settings: GeneratorSettings,
}

impl ReportGenerator {
    pub fn new(settings: GeneratorSettings) -> Self {
        Self { settings }
    }

    /// Load the workbook and build the course groups of the period
    pub fn course_groups(&self, period: Period) -> ReportResult<Vec<CourseGroup>> {
        let mut workbook = SourceWorkbook::open(&self.settings.workbook)?;
        let courses = workbook.table(&self.settings.course_sheet)?;
        let enrollments = workbook.table(&self.settings.enrollment_sheet)?;

        let joined = reconcile(&courses, &enrollments)?;
        Ok(select_period(&joined, &courses, period))
    }

    pub fn run(&self, period: Period) -> ReportResult<RunOutcome> {
        let groups = self.course_groups(period)?;
        if groups.is_empty() {
            log::info!("No courses scheduled for {}", period);
            return Ok(RunOutcome::NoCourses(period));
        }

        let template = Template::load(&self.settings.template, self.settings.template_options.clone())?;

        let history = HistoryStore::new(&self.settings.history_dir);
        history.ensure().map_err(|source| ReportError::Access {
            path: self.settings.history_dir.clone(),
            source,
        })?;

        // Removed when dropped, whichever way this function returns
        let workspace = tempfile::Builder::new()
            .prefix("reportes-")
            .tempdir()
            .map_err(|source| ReportError::Access {
                path: std::env::temp_dir(),
                source,
            })?;
        log::debug!("Working directory for this run: {}", workspace.path().display());

        let mut summary = RunSummary::empty(period);
        let mut documents = Vec::new();

        for group in &groups {
            let batches = plan_batches(&group.enrollments);
            if batches.iter().all(Batch::is_empty) {
                log::info!("No participants enrolled in course {}", group.course.name);
                summary.courses_without_participants += 1;
            }

            for batch in &batches {
                match produce(&template, &history, workspace.path(), &group.course, batch) {
                    Ok(path) if documents.contains(&path) => {
                        log::warn!(
                            "{} was generated twice in this run; the later copy replaces the earlier one",
                            path.display()
                        );
                    }
                    Ok(path) => {
                        summary.documents_generated += 1;
                        documents.push(path);
                    }
                    Err(err) if err.is_recoverable() => {
                        let document = document_file_name(&group.course, batch);
                        log::error!("Skipping {}: {}", document, err);
                        summary.failures.push(DocumentFailure {
                            document,
                            error: err.to_string(),
                        });
                    }
                    Err(err) => return Err(err),
                }
            }
        }

        if documents.is_empty() {
            return Err(ReportError::NoReports {
                summary: Box::new(summary),
            });
        }

        let outcome = ArchiveAssembler::new(&self.settings.archive_dir).assemble(period, &documents)?;
        summary.archive_path = Some(outcome.path);
        summary.omitted_from_archive = outcome.skipped;

        Ok(RunOutcome::Completed(summary))
    }
}

/// Render, save into the run's directory and copy to history
fn produce(
    template: &Template,
    history: &HistoryStore,
    dir: &Path,
    course: &Course,
    batch: &Batch,
) -> ReportResult<PathBuf> {
    let rendered = template.render(course, batch)?;
    let path = rendered.save(dir)?;

    history.retain(&path).map_err(|source| ReportError::Persist {
        document: rendered.file_name.clone(),
        source,
    })?;

    Ok(path)
}
