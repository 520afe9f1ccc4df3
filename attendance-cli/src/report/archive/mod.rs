//! History retention and the downloadable per-run archive

mod assembler;
mod history;

pub use assembler::{ArchiveAssembler, ArchiveOutcome, archive_file_name};
pub use history::{HistoryEntry, HistoryStore};
