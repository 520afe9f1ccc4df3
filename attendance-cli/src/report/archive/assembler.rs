//! Archive Assembler: compress a run's documents into one zip

use std::collections::HashSet;
use std::fs;
use std::io::{self, Seek, Write};
use std::path::{Path, PathBuf};

use zip::ZipWriter;
use zip::write::SimpleFileOptions;

use crate::report::error::{ReportError, ReportResult};
use crate::report::period::Period;
use crate::report::template::entry_options;

/// `Reportes_<Mes>.zip`
pub fn archive_file_name(period: Period) -> String {
    format!("Reportes_{}.zip", period.display_name())
}

/// What ended up in the archive
#[derive(Debug, Clone)]
pub struct ArchiveOutcome {
    pub path: PathBuf,
    pub included: Vec<String>,
    /// Documents missing when the archive was written
    pub skipped: Vec<PathBuf>,
}

pub struct ArchiveAssembler {
    dir: PathBuf,
}

impl ArchiveAssembler {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Write every document into `Reportes_<Mes>.zip`, skipping missing ones.
    ///
    /// The archive is built under a temporary name in the same directory and
    /// renamed into place, so a failed run leaves no partial archive behind.
    pub fn assemble(&self, period: Period, documents: &[PathBuf]) -> ReportResult<ArchiveOutcome> {
        let path = self.dir.join(archive_file_name(period));
        let archive_error = |message: String| ReportError::Archive {
            path: path.clone(),
            message,
        };

        fs::create_dir_all(&self.dir).map_err(|e| archive_error(e.to_string()))?;
        let partial = tempfile::Builder::new()
            .prefix(".Reportes_")
            .suffix(".zip.partial")
            .tempfile_in(&self.dir)
            .map_err(|e| archive_error(e.to_string()))?;

        let mut zip = ZipWriter::new(partial);
        let options = entry_options();

        let mut included: Vec<String> = Vec::new();
        let mut skipped = Vec::new();
        let mut seen = HashSet::new();

        for document in documents {
            if !seen.insert(document) {
                log::warn!("{} listed twice, archiving it once", document.display());
                continue;
            }
            let name = match document.file_name() {
                Some(name) => name.to_string_lossy().into_owned(),
                None => continue,
            };
            if included.contains(&name) {
                log::warn!(
                    "Another document named {} is already in the archive, skipping {}",
                    name,
                    document.display()
                );
                skipped.push(document.clone());
                continue;
            }

            match add_file(&mut zip, document, &name, options) {
                Ok(()) => included.push(name),
                Err(e) if e.kind() == io::ErrorKind::NotFound => {
                    log::warn!(
                        "{} not found, it will not be included in the archive",
                        document.display()
                    );
                    skipped.push(document.clone());
                }
                Err(e) => return Err(archive_error(format!("adding {}: {}", name, e))),
            }
        }

        let partial = zip.finish().map_err(|e| archive_error(e.to_string()))?;
        partial
            .as_file()
            .sync_all()
            .map_err(|e| archive_error(e.to_string()))?;
        partial
            .persist(&path)
            .map_err(|e| archive_error(e.error.to_string()))?;

        let path = fs::canonicalize(&path).unwrap_or(path);
        log::info!("Archive written to {} ({} documents)", path.display(), included.len());

        Ok(ArchiveOutcome {
            path,
            included,
            skipped,
        })
    }
}

fn add_file<W: Write + Seek>(
    zip: &mut ZipWriter<W>,
    document: &Path,
    name: &str,
    options: SimpleFileOptions,
) -> io::Result<()> {
    // Read first so a missing file leaves no empty entry behind
    let data = fs::read(document)?;
    zip.start_file(name, options).map_err(io::Error::other)?;
    zip.write_all(&data)
}
