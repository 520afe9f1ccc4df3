//! Join enrollments onto courses by course id
//!
//! Overlapping non-key columns are renamed with a side suffix so the
//! course-scoped and enrollment-scoped versions stay addressable, e.g.
//! `MES_PROGRAMADO_COUR` and `MES_PROGRAMADO_PART`.

use super::columns;
use super::field::Field;
use super::reader::{EMPTY_FIELD, Table};
use crate::report::error::{ReportError, ReportResult};

pub const COURSE_SUFFIX: &str = "_COUR";
pub const ENROLLMENT_SUFFIX: &str = "_PART";

/// Which side of the join a column came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Course,
    Enrollment,
}

/// Result of the course/enrollment join
#[derive(Debug, Clone)]
pub struct Reconciled {
    pub table: Table,
    /// Number of columns contributed by the course side (key included)
    course_width: usize,
}

impl Reconciled {
    /// Resolve a logical column name on one side of the join
    pub fn column(&self, name: &str, side: Side) -> Option<usize> {
        let suffixed = match side {
            Side::Course => format!("{}{}", name, COURSE_SUFFIX),
            Side::Enrollment => format!("{}{}", name, ENROLLMENT_SUFFIX),
        };

        if let Some(idx) = self.table.column(&suffixed) {
            return Some(idx);
        }

        // Non-overlapping columns keep their name; restrict to the right side
        let idx = self.table.column(name)?;
        let on_side = match side {
            Side::Course => idx < self.course_width,
            Side::Enrollment => idx >= self.course_width || name == columns::COURSE_ID,
        };
        on_side.then_some(idx)
    }

    pub fn value<'a>(&self, row: &'a [Field], name: &str, side: Side) -> &'a Field {
        match self.column(name, side) {
            Some(col) => Table::cell(row, col),
            None => &EMPTY_FIELD,
        }
    }

    pub fn rows(&self) -> &[Vec<Field>] {
        &self.table.rows
    }
}

/// Validate both sheets and left-join enrollments onto courses
pub fn reconcile(courses: &Table, enrollments: &Table) -> ReportResult<Reconciled> {
    courses.require_columns(columns::SCHEDULE_COLUMNS)?;
    enrollments.require_columns(columns::SCHEDULE_COLUMNS)?;
    enrollments.require_columns(columns::PARTICIPANT_COLUMNS)?;

    let course_key = key_column(courses)?;
    let enrollment_key = key_column(enrollments)?;

    // Enrollment columns other than the join key
    let enrollment_cols: Vec<usize> = (0..enrollments.headers.len())
        .filter(|&i| i != enrollment_key)
        .collect();

    let mut headers = Vec::with_capacity(courses.headers.len() + enrollment_cols.len());
    for (i, name) in courses.headers.iter().enumerate() {
        if i != course_key && enrollments.has_column(name) {
            headers.push(format!("{}{}", name, COURSE_SUFFIX));
        } else {
            headers.push(name.clone());
        }
    }
    for &i in &enrollment_cols {
        let name = &enrollments.headers[i];
        if courses.has_column(name) {
            headers.push(format!("{}{}", name, ENROLLMENT_SUFFIX));
        } else {
            headers.push(name.clone());
        }
    }

    let mut table = Table::new("reconciled", headers);

    for course in &courses.rows {
        let id = Table::cell(course, course_key);
        let mut matched = false;

        for enrollment in &enrollments.rows {
            if !id.matches(Table::cell(enrollment, enrollment_key)) {
                continue;
            }
            matched = true;

            let mut row = padded(course, courses.headers.len());
            row.extend(
                enrollment_cols
                    .iter()
                    .map(|&i| Table::cell(enrollment, i).clone()),
            );
            table.rows.push(row);
        }

        if !matched {
            let mut row = padded(course, courses.headers.len());
            row.extend(std::iter::repeat_n(Field::Empty, enrollment_cols.len()));
            table.rows.push(row);
        }
    }

    log::debug!(
        "Reconciled {} courses with {} enrollments into {} rows",
        courses.rows.len(),
        enrollments.rows.len(),
        table.rows.len()
    );

    Ok(Reconciled {
        table,
        course_width: courses.headers.len(),
    })
}

fn key_column(table: &Table) -> ReportResult<usize> {
    table.column(columns::COURSE_ID).ok_or_else(|| {
        ReportError::schema(format!(
            "sheet '{}' has no {} column",
            table.name,
            columns::COURSE_ID
        ))
    })
}

fn padded(row: &[Field], width: usize) -> Vec<Field> {
    let mut out: Vec<Field> = row.iter().take(width).cloned().collect();
    out.resize(width, Field::Empty);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::records::columns::*;

    fn text(s: &str) -> Field {
        Field::Text(s.to_string())
    }

    fn course_table() -> Table {
        let mut t = Table::new(
            "P01",
            vec![
                COURSE_ID.into(),
                COURSE_NAME.into(),
                SCHEDULED_MONTH.into(),
                START_DATE.into(),
                END_DATE.into(),
                ACTIVITY_ID.into(),
            ],
        );
        t.rows.push(vec![
            Field::Int(1),
            text("Soldadura"),
            Field::Int(3),
            text("2025-03-01"),
            text("2025-03-05"),
            Field::Int(900),
        ]);
        t.rows.push(vec![
            Field::Int(2),
            text("Ofimatica"),
            Field::Int(3),
            text("2025-03-10"),
            text("2025-03-12"),
            Field::Int(901),
        ]);
        t
    }

    fn enrollment_table() -> Table {
        let mut t = Table::new(
            "PARTIP01",
            vec![
                COURSE_ID.into(),
                SCHEDULED_MONTH.into(),
                START_DATE.into(),
                END_DATE.into(),
                ACTIVITY_ID.into(),
                RPE.into(),
                FULL_NAME.into(),
                SEX.into(),
            ],
        );
        t.rows.push(vec![
            Field::Int(1),
            Field::Int(4),
            text("2025-04-01"),
            text("2025-04-05"),
            Field::Int(950),
            text("A1"),
            text("Ana"),
            text("F"),
        ]);
        t.rows.push(vec![
            Field::Int(1),
            Field::Int(3),
            text("2025-03-01"),
            text("2025-03-05"),
            Field::Int(900),
            text("B2"),
            text("Beto"),
            text("M"),
        ]);
        t
    }

    #[test]
    fn test_overlapping_columns_get_suffixes() {
        let joined = reconcile(&course_table(), &enrollment_table()).unwrap();
        let headers = &joined.table.headers;

        assert!(headers.contains(&"ID_CURSO".to_string()));
        assert!(headers.contains(&"MES_PROGRAMADO_COUR".to_string()));
        assert!(headers.contains(&"MES_PROGRAMADO_PART".to_string()));
        assert!(headers.contains(&"ID_ACTIVIDAD_PART".to_string()));
        assert!(headers.contains(&"NOMBRE_CURSO".to_string()));
        assert!(headers.contains(&"RPE".to_string()));
        assert_eq!(headers.iter().filter(|h| *h == "ID_CURSO").count(), 1);
    }

    #[test]
    fn test_left_join_keeps_unmatched_courses() {
        let joined = reconcile(&course_table(), &enrollment_table()).unwrap();

        // course 1 matches two enrollments, course 2 none
        assert_eq!(joined.rows().len(), 3);

        let unmatched = &joined.rows()[2];
        assert_eq!(joined.value(unmatched, COURSE_ID, Side::Course), &Field::Int(2));
        assert!(joined.value(unmatched, RPE, Side::Enrollment).is_empty());
        assert!(joined
            .value(unmatched, SCHEDULED_MONTH, Side::Enrollment)
            .is_empty());
    }

    #[test]
    fn test_sides_are_independently_addressable() {
        let joined = reconcile(&course_table(), &enrollment_table()).unwrap();
        let first = &joined.rows()[0];

        assert_eq!(joined.value(first, SCHEDULED_MONTH, Side::Course), &Field::Int(3));
        assert_eq!(
            joined.value(first, SCHEDULED_MONTH, Side::Enrollment),
            &Field::Int(4)
        );
        assert_eq!(joined.value(first, COURSE_ID, Side::Enrollment), &Field::Int(1));
        assert!(joined.value(first, RPE, Side::Course).is_empty());
    }

    #[test]
    fn test_missing_columns_fail() {
        let mut courses = course_table();
        courses.headers[5] = "OTRA".into();

        let err = reconcile(&courses, &enrollment_table()).unwrap_err();
        assert!(matches!(err, ReportError::Schema(_)));
    }

    #[test]
    fn test_enrollments_need_participant_columns() {
        let mut enrollments = enrollment_table();
        enrollments.headers[6] = "NOMBRE".into();

        let err = reconcile(&course_table(), &enrollments).unwrap_err();
        assert!(err.to_string().contains("NOMBRE_COMPLETO"));
    }
}
