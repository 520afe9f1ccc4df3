//! Template Renderer: fill the attendance-sheet template for one batch

mod package;
mod participants;
mod placeholder;
mod style;
mod xml;

use std::path::{Path, PathBuf};

pub use package::{DocxPackage, entry_options};
pub use participants::{MARK, TableLocator};
pub use placeholder::MatchMode;

use self::xml::Element;
use super::batch::Batch;
use super::error::{ReportError, ReportResult};
use super::records::Course;

pub const TOKEN_COURSE_NAME: &str = "[NOMBRE_CURSO]";
pub const TOKEN_START_DATE: &str = "[FECHA_INICIO]";
pub const TOKEN_END_DATE: &str = "[FECHA_TERMINO]";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TemplateOptions {
    pub match_mode: MatchMode,
    pub table: TableLocator,
}

/// A loaded template; its parsed main part is cloned for every render
#[derive(Debug)]
pub struct Template {
    path: PathBuf,
    package: DocxPackage,
    main_part: String,
    document: Element,
    options: TemplateOptions,
}

impl Template {
    pub fn load(path: &Path, options: TemplateOptions) -> ReportResult<Self> {
        if !path.exists() {
            return Err(ReportError::SourceNotFound {
                path: path.to_path_buf(),
            });
        }

        let invalid = |message: String| ReportError::Source {
            path: path.to_path_buf(),
            message,
        };

        let package = DocxPackage::open(path)
            .map_err(|e| invalid(format!("not a readable .docx package: {}", e)))?;
        let main_part = package.main_document_part();

        let bytes = package
            .part(&main_part)
            .ok_or_else(|| invalid(format!("package has no '{}' part", main_part)))?;
        let text = std::str::from_utf8(bytes)
            .map_err(|e| invalid(format!("'{}' is not UTF-8: {}", main_part, e)))?;
        let document = xml::parse(text)
            .map_err(|e| invalid(format!("'{}' is not well-formed XML: {}", main_part, e)))?;

        log::debug!("Loaded template {} (main part {})", path.display(), main_part);

        Ok(Self {
            path: path.to_path_buf(),
            package,
            main_part,
            document,
            options,
        })
    }

    /// Fill course metadata and the participant rows of one batch
    pub fn render(&self, course: &Course, batch: &Batch) -> ReportResult<RenderedDocument<'_>> {
        let file_name = document_file_name(course, batch);
        let mut document = self.document.clone();

        let fields = [
            (TOKEN_COURSE_NAME, course.name.to_string()),
            (TOKEN_START_DATE, course.start_date.to_string()),
            (TOKEN_END_DATE, course.end_date.to_string()),
        ];
        for (token, value) in &fields {
            let count =
                placeholder::replace_placeholder(&mut document, token, value, self.options.match_mode);
            if count > 0 {
                continue;
            }
            if placeholder::contains_token(&document, token) {
                log::warn!(
                    "Placeholder {} in template {} is split across runs and was left as is ({:?} matching)",
                    token,
                    self.path.display(),
                    self.options.match_mode
                );
            } else {
                log::warn!(
                    "Placeholder {} not found in template {} while rendering {}",
                    token,
                    self.path.display(),
                    file_name
                );
            }
        }

        let table = participants::find_table_mut(&mut document, &self.options.table)
            .ok_or_else(|| {
                ReportError::render(
                    &file_name,
                    "participant table not found in template, check the Word layout",
                )
            })?;
        participants::append_participant_rows(table, &batch.participants)
            .map_err(|message| ReportError::render(&file_name, message))?;

        Ok(RenderedDocument {
            template: self,
            file_name,
            document,
        })
    }
}

/// A filled document, not yet written anywhere
#[derive(Debug)]
pub struct RenderedDocument<'a> {
    template: &'a Template,
    pub file_name: String,
    document: Element,
}

impl RenderedDocument<'_> {
    pub fn to_bytes(&self) -> ReportResult<Vec<u8>> {
        let xml = xml::to_xml(&self.document);
        self.template
            .package
            .write_to(
                std::io::Cursor::new(Vec::new()),
                &[(self.template.main_part.as_str(), xml.as_bytes())],
            )
            .map(|cursor| cursor.into_inner())
            .map_err(|source| ReportError::Persist {
                document: self.file_name.clone(),
                source,
            })
    }

    /// Write into `dir` under the document's file name
    pub fn save(&self, dir: &Path) -> ReportResult<PathBuf> {
        let path = dir.join(&self.file_name);
        let bytes = self.to_bytes()?;
        std::fs::write(&path, bytes).map_err(|source| ReportError::Persist {
            document: self.file_name.clone(),
            source,
        })?;
        Ok(path)
    }

    /// Text of the filled main part
    pub fn text(&self) -> String {
        self.document.text()
    }
}

/// Replace path separators and spaces so the name is a single file name
pub fn sanitize_name(name: &str) -> String {
    name.chars()
        .map(|c| match c {
            '/' | '\\' | ' ' => '_',
            other => other,
        })
        .collect()
}

/// `<name>_<start>_<end>_L<batch>_<activity>.docx`
pub fn document_file_name(course: &Course, batch: &Batch) -> String {
    format!(
        "{}_{}_{}_L{}_{}.docx",
        sanitize_name(&course.name.to_string()),
        sanitize_name(&course.start_date.to_string()),
        sanitize_name(&course.end_date.to_string()),
        batch.index,
        sanitize_name(&course.activity_id.to_string())
    )
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::records::{Field, Participant, SexMarker};

    fn course() -> Course {
        Course {
            id: Field::Int(5),
            name: Field::Text("Seguridad / Higiene".into()),
            scheduled_month: Field::Int(3),
            start_date: Field::Text("2025-03-03".into()),
            end_date: Field::Text("2025-03-04".into()),
            activity_id: Field::Int(77),
        }
    }

    fn batch(n: usize) -> Batch {
        Batch {
            index: 2,
            participants: (0..n)
                .map(|i| Participant::new(format!("R{}", i), format!("P {}", i), SexMarker::Female))
                .collect(),
        }
    }

    fn load(dir: &Path, options: TemplateOptions) -> Template {
        let path = dir.join("plantilla.docx");
        fixtures::write_template(&path);
        Template::load(&path, options).unwrap()
    }

    #[test]
    fn test_file_name_is_sanitized() {
        assert_eq!(
            document_file_name(&course(), &batch(0)),
            "Seguridad___Higiene_2025-03-03_2025-03-04_L2_77.docx"
        );
    }

    #[test]
    fn test_render_fills_placeholders_and_rows() {
        let dir = tempfile::tempdir().unwrap();
        let template = load(dir.path(), TemplateOptions::default());

        let rendered = template.render(&course(), &batch(3)).unwrap();
        let text = rendered.text();
        assert!(text.contains("Curso: Seguridad / Higiene"));
        assert!(text.contains("2025-03-03"));
        assert!(text.contains("2025-03-04"));
        assert!(!text.contains("[FECHA_"));
        assert!(text.contains("R0P 0X"));

        let saved = rendered.save(dir.path()).unwrap();
        let reread = DocxPackage::open(&saved).unwrap();
        let xml = String::from_utf8(reread.part("word/document.xml").unwrap().to_vec()).unwrap();
        // header + 10 appended rows
        assert_eq!(xml.matches("<w:tr>").count(), 1 + 1 + 1 + 10);
        assert!(reread.part("_rels/.rels").is_some());
    }

    #[test]
    fn test_run_local_mode_keeps_split_token() {
        let dir = tempfile::tempdir().unwrap();
        let options = TemplateOptions {
            match_mode: MatchMode::RunLocal,
            ..TemplateOptions::default()
        };
        let template = load(dir.path(), options);

        let text = template.render(&course(), &batch(1)).unwrap().text();
        assert!(text.contains("[NOMBRE_CURSO]"));
        assert!(text.contains("2025-03-03"));
    }

    #[test]
    fn test_missing_table_is_render_error() {
        let dir = tempfile::tempdir().unwrap();
        let options = TemplateOptions {
            table: TableLocator {
                caption: None,
                index: 9,
            },
            ..TemplateOptions::default()
        };
        let template = load(dir.path(), options);

        let err = template.render(&course(), &batch(1)).unwrap_err();
        assert!(matches!(err, ReportError::TemplateRender { .. }));
        assert!(err.is_recoverable());
    }

    #[test]
    fn test_rendering_twice_is_byte_identical() {
        let dir = tempfile::tempdir().unwrap();
        let template = load(dir.path(), TemplateOptions::default());

        let first = template.render(&course(), &batch(4)).unwrap().to_bytes().unwrap();
        let second = template.render(&course(), &batch(4)).unwrap().to_bytes().unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_missing_template() {
        let err = Template::load(Path::new("/no/such/plantilla.docx"), TemplateOptions::default())
            .unwrap_err();
        assert!(matches!(err, ReportError::SourceNotFound { .. }));
    }
}
