//! Monthly attendance-sheet generation from a course workbook and a Word
//! template.

pub mod cli;
pub mod config;
pub mod report;
