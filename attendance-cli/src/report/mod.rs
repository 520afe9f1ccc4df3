//! Attendance report generation
//!
//! Reads the course and enrollment sheets of a workbook, selects the courses
//! of a month, fills one attendance sheet per batch of ten participants and
//! packs the sheets into a single archive while keeping a copy of each in
//! the history store.

pub mod archive;
pub mod batch;
pub mod error;
pub mod period;
pub mod pipeline;
pub mod records;
pub mod template;

pub use archive::{ArchiveAssembler, ArchiveOutcome, HistoryEntry, HistoryStore, archive_file_name};
pub use batch::{BATCH_SIZE, Batch, dedup_participants, plan_batches};
pub use error::{ReportError, ReportResult};
pub use period::{CourseGroup, Period, select_period};
pub use pipeline::{DocumentFailure, GeneratorSettings, ReportGenerator, RunOutcome, RunSummary};
pub use template::{MatchMode, TableLocator, Template, TemplateOptions};
