//! Generator configuration
//!
//! Values come from a TOML file, then CLI overrides. Every field has a
//! default so an empty or missing file reproduces the legacy layout next to
//! the workbook.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::report::{GeneratorSettings, MatchMode, TableLocator, TemplateOptions};

const APP_DIR: &str = "attendance-cli";
const LOCAL_CONFIG: &str = "attendance.toml";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    pub workbook: PathBuf,
    pub course_sheet: String,
    pub enrollment_sheet: String,
    pub template: PathBuf,
    pub history_dir: PathBuf,
    pub archive_dir: PathBuf,
    pub template_table: TableConfig,
    pub match_mode: MatchMode,
}

/// Where the participant table sits in the template
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TableConfig {
    /// Empty disables the caption lookup
    pub caption: String,
    pub index: usize,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            workbook: PathBuf::from("db_excel.xlsx"),
            course_sheet: "P01".to_string(),
            enrollment_sheet: "PARTIP01".to_string(),
            template: PathBuf::from("FORMATO DE LISTA DE ASISTENCIA enero 2025.docx"),
            history_dir: PathBuf::from("reports_historial"),
            archive_dir: PathBuf::from("."),
            template_table: TableConfig::default(),
            match_mode: MatchMode::default(),
        }
    }
}

impl Default for TableConfig {
    fn default() -> Self {
        let locator = TableLocator::default();
        Self {
            caption: locator.caption.unwrap_or_default(),
            index: locator.index,
        }
    }
}

/// Path overrides given on the command line
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub workbook: Option<PathBuf>,
    pub template: Option<PathBuf>,
    pub history_dir: Option<PathBuf>,
    pub archive_dir: Option<PathBuf>,
}

impl GeneratorConfig {
    /// Load from `explicit` if given, else from the first standard location
    /// that exists, else defaults
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            if !path.is_file() {
                anyhow::bail!("Config file does not exist: {}", path.display());
            }
            return Self::load_from_file(path);
        }

        match Self::find_config_file() {
            Some(path) => Self::load_from_file(&path),
            None => {
                log::debug!("No config file found, using defaults");
                Ok(Self::default())
            }
        }
    }

    pub fn load_from_file(path: &Path) -> Result<Self> {
        log::debug!("Loading config from {}", path.display());
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    fn find_config_file() -> Option<PathBuf> {
        let local = PathBuf::from(LOCAL_CONFIG);
        if local.is_file() {
            return Some(local);
        }

        let user = dirs::config_dir()?.join(APP_DIR).join("config.toml");
        user.is_file().then_some(user)
    }

    pub fn apply_overrides(&mut self, overrides: Overrides) {
        if let Some(workbook) = overrides.workbook {
            self.workbook = workbook;
        }
        if let Some(template) = overrides.template {
            self.template = template;
        }
        if let Some(dir) = overrides.history_dir {
            self.history_dir = dir;
        }
        if let Some(dir) = overrides.archive_dir {
            self.archive_dir = dir;
        }
    }

    pub fn table_locator(&self) -> TableLocator {
        let caption = self.template_table.caption.trim();
        TableLocator {
            caption: (!caption.is_empty()).then(|| caption.to_string()),
            index: self.template_table.index,
        }
    }

    pub fn settings(&self) -> GeneratorSettings {
        GeneratorSettings {
            workbook: self.workbook.clone(),
            course_sheet: self.course_sheet.clone(),
            enrollment_sheet: self.enrollment_sheet.clone(),
            template: self.template.clone(),
            template_options: TemplateOptions {
                match_mode: self.match_mode,
                table: self.table_locator(),
            },
            history_dir: self.history_dir.clone(),
            archive_dir: self.archive_dir.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_file_gives_defaults() {
        let config: GeneratorConfig = toml::from_str("").unwrap();
        assert_eq!(config, GeneratorConfig::default());
        assert_eq!(config.table_locator(), TableLocator::default());
        assert_eq!(config.match_mode, MatchMode::Spanning);
    }

    #[test]
    fn test_partial_file() {
        let config: GeneratorConfig = toml::from_str(
            r#"
            workbook = "datos/cursos.xlsx"
            match_mode = "run-local"

            [template_table]
            caption = ""
            "#,
        )
        .unwrap();

        assert_eq!(config.workbook, PathBuf::from("datos/cursos.xlsx"));
        assert_eq!(config.course_sheet, "P01");
        assert_eq!(config.match_mode, MatchMode::RunLocal);
        assert_eq!(
            config.table_locator(),
            TableLocator {
                caption: None,
                index: 2
            }
        );
    }

    #[test]
    fn test_overrides_win() {
        let mut config = GeneratorConfig::default();
        config.apply_overrides(Overrides {
            template: Some(PathBuf::from("otra.docx")),
            archive_dir: Some(PathBuf::from("/tmp/salida")),
            ..Overrides::default()
        });

        let settings = config.settings();
        assert_eq!(settings.template, PathBuf::from("otra.docx"));
        assert_eq!(settings.archive_dir, PathBuf::from("/tmp/salida"));
        assert_eq!(settings.workbook, PathBuf::from("db_excel.xlsx"));
        assert_eq!(settings.history_dir, PathBuf::from("reports_historial"));
    }

    #[test]
    fn test_load_explicit_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "history_dir = \"historial\"\n").unwrap();

        let config = GeneratorConfig::load(Some(&path)).unwrap();
        assert_eq!(config.history_dir, PathBuf::from("historial"));

        assert!(GeneratorConfig::load(Some(&dir.path().join("nope.toml"))).is_err());
    }

    #[test]
    fn test_malformed_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "workbook = [").unwrap();

        let err = GeneratorConfig::load_from_file(&path).unwrap_err();
        assert!(err.to_string().contains("Failed to parse config file"));
    }
}
