//! Read course and enrollment sheets from an Excel workbook

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use calamine::{Reader, Xlsx, XlsxError, open_workbook};

use super::field::Field;
use crate::report::error::{ReportError, ReportResult};

pub(crate) static EMPTY_FIELD: Field = Field::Empty;

/// A sheet loaded into memory: a header row plus normalized data rows
#[derive(Debug, Clone, Default)]
pub struct Table {
    pub name: String,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<Field>>,
}

impl Table {
    pub fn new(name: impl Into<String>, headers: Vec<String>) -> Self {
        Self {
            name: name.into(),
            headers,
            rows: Vec::new(),
        }
    }

    /// Index of a column by exact header name
    pub fn column(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column(name).is_some()
    }

    /// Fail with a schema error naming every missing column
    pub fn require_columns(&self, names: &[&str]) -> ReportResult<()> {
        let missing: Vec<&str> = names
            .iter()
            .copied()
            .filter(|n| !self.has_column(n))
            .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(ReportError::schema(format!(
                "sheet '{}' is missing required columns: {}",
                self.name,
                missing.join(", ")
            )))
        }
    }

    /// Cell at (row, col), `Empty` for short rows
    pub fn cell<'a>(row: &'a [Field], col: usize) -> &'a Field {
        row.get(col).unwrap_or(&EMPTY_FIELD)
    }

    /// Cell in a named column, `Empty` when the column does not exist
    pub fn value<'a>(&self, row: &'a [Field], column: &str) -> &'a Field {
        match self.column(column) {
            Some(col) => Self::cell(row, col),
            None => &EMPTY_FIELD,
        }
    }
}

/// An opened source workbook
pub struct SourceWorkbook {
    path: PathBuf,
    workbook: Xlsx<BufReader<File>>,
}

impl SourceWorkbook {
    pub fn open(path: &Path) -> ReportResult<Self> {
        if !path.exists() {
            return Err(ReportError::SourceNotFound {
                path: path.to_path_buf(),
            });
        }

        let workbook: Xlsx<_> = open_workbook(path).map_err(|e| map_open_error(path, e))?;

        Ok(Self {
            path: path.to_path_buf(),
            workbook,
        })
    }

    pub fn sheet_names(&self) -> Vec<String> {
        self.workbook.sheet_names().to_vec()
    }

    /// Load a sheet as a table. The first non-empty row is the header.
    pub fn table(&mut self, sheet_name: &str) -> ReportResult<Table> {
        if !self.sheet_names().iter().any(|s| s == sheet_name) {
            return Err(ReportError::schema(format!(
                "workbook {} has no sheet named '{}'",
                self.path.display(),
                sheet_name
            )));
        }

        let range = self
            .workbook
            .worksheet_range(sheet_name)
            .map_err(|e| ReportError::Source {
                path: self.path.clone(),
                message: format!("failed to read sheet '{}': {}", sheet_name, e),
            })?;

        let mut rows = range
            .rows()
            .map(|r| r.iter().map(Field::from).collect::<Vec<_>>())
            .filter(|r| r.iter().any(|c| !c.is_empty()));

        let headers = match rows.next() {
            Some(header) => header.iter().map(|c| c.to_string()).collect(),
            None => Vec::new(),
        };

        let mut table = Table::new(sheet_name, headers);
        table.rows = rows.collect();

        log::debug!(
            "Loaded sheet '{}': {} columns, {} rows",
            sheet_name,
            table.headers.len(),
            table.rows.len()
        );

        Ok(table)
    }
}

fn map_open_error(path: &Path, err: XlsxError) -> ReportError {
    match err {
        XlsxError::Io(source) if source.kind() == std::io::ErrorKind::PermissionDenied => {
            ReportError::Access {
                path: path.to_path_buf(),
                source,
            }
        }
        other => ReportError::Source {
            path: path.to_path_buf(),
            message: other.to_string(),
        },
    }
}
