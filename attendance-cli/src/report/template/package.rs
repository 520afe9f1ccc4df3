//! `.docx` package I/O: a zip of XML parts

use std::fs::File;
use std::io::{self, Cursor, Read, Seek, Write};
use std::path::Path;

use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

const DEFAULT_MAIN_PART: &str = "word/document.xml";
const PACKAGE_RELS: &str = "_rels/.rels";
const OFFICE_DOCUMENT_REL: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument";

#[derive(Debug, Clone)]
struct Entry {
    name: String,
    data: Vec<u8>,
    is_dir: bool,
}

/// All parts of a Word package, held in memory
#[derive(Debug, Clone)]
pub struct DocxPackage {
    entries: Vec<Entry>,
}

/// Entry options shared by every write. A fixed timestamp keeps regenerated
/// documents byte-identical.
pub fn entry_options() -> SimpleFileOptions {
    SimpleFileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .last_modified_time(zip::DateTime::default())
}

impl DocxPackage {
    pub fn open(path: &Path) -> io::Result<Self> {
        let file = File::open(path)?;
        Self::from_reader(file)
    }

    pub fn from_bytes(bytes: &[u8]) -> io::Result<Self> {
        Self::from_reader(Cursor::new(bytes))
    }

    pub fn from_reader<R: Read + Seek>(reader: R) -> io::Result<Self> {
        let mut archive = ZipArchive::new(reader).map_err(io::Error::other)?;
        let mut entries = Vec::with_capacity(archive.len());

        for i in 0..archive.len() {
            let mut file = archive.by_index(i).map_err(io::Error::other)?;
            let mut data = Vec::with_capacity(file.size() as usize);
            file.read_to_end(&mut data)?;
            entries.push(Entry {
                name: file.name().to_string(),
                data,
                is_dir: file.is_dir(),
            });
        }

        Ok(Self { entries })
    }

    pub fn part(&self, name: &str) -> Option<&[u8]> {
        self.entries
            .iter()
            .find(|e| e.name == name && !e.is_dir)
            .map(|e| e.data.as_slice())
    }

    pub fn part_names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().filter(|e| !e.is_dir).map(|e| e.name.as_str())
    }

    /// Name of the main document part, read from the package relationships
    pub fn main_document_part(&self) -> String {
        let target = self
            .part(PACKAGE_RELS)
            .and_then(|bytes| std::str::from_utf8(bytes).ok())
            .and_then(|xml| {
                let doc = roxmltree::Document::parse(xml).ok()?;
                doc.descendants()
                    .filter(|n| n.tag_name().name() == "Relationship")
                    .find(|n| n.attribute("Type") == Some(OFFICE_DOCUMENT_REL))
                    .and_then(|n| n.attribute("Target"))
                    .map(|t| t.trim_start_matches('/').to_string())
            });

        target.unwrap_or_else(|| DEFAULT_MAIN_PART.to_string())
    }

    /// Write the package, substituting the given parts
    pub fn write_to<W: Write + Seek>(&self, writer: W, replace: &[(&str, &[u8])]) -> io::Result<W> {
        let mut zip = ZipWriter::new(writer);
        let options = entry_options();

        for entry in &self.entries {
            if entry.is_dir {
                zip.add_directory(entry.name.as_str(), options)
                    .map_err(io::Error::other)?;
                continue;
            }

            let data = replace
                .iter()
                .find(|(name, _)| *name == entry.name)
                .map(|(_, data)| *data)
                .unwrap_or(entry.data.as_slice());

            zip.start_file(entry.name.as_str(), options)
                .map_err(io::Error::other)?;
            zip.write_all(data)?;
        }

        zip.finish().map_err(io::Error::other)
    }
}
