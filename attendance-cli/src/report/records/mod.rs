//! Record Reconciler: load course and enrollment sheets and join them

mod field;
mod model;
mod reader;
mod reconcile;

pub use field::Field;
pub use model::{Course, Participant, SexMarker};
pub use reader::{SourceWorkbook, Table};
pub use reconcile::{Reconciled, Side, reconcile};

/// Column names of the legacy workbook
pub mod columns {
    pub const COURSE_ID: &str = "ID_CURSO";
    pub const COURSE_NAME: &str = "NOMBRE_CURSO";
    pub const SCHEDULED_MONTH: &str = "MES_PROGRAMADO";
    pub const START_DATE: &str = "FECHA_INICIO";
    pub const END_DATE: &str = "FECHA_TERMINO";
    pub const ACTIVITY_ID: &str = "ID_ACTIVIDAD";
    pub const RPE: &str = "RPE";
    pub const FULL_NAME: &str = "NOMBRE_COMPLETO";
    pub const SEX: &str = "SEXO_TRAB";

    /// Required on both sheets
    pub const SCHEDULE_COLUMNS: &[&str] = &[
        COURSE_ID,
        SCHEDULED_MONTH,
        START_DATE,
        END_DATE,
        ACTIVITY_ID,
    ];

    /// Required on the enrollment sheet only
    pub const PARTICIPANT_COLUMNS: &[&str] = &[RPE, FULL_NAME, SEX];
}
