//! Course and participant entities built from sheet rows

use serde::Serialize;

use super::columns;
use super::field::Field;
use super::reader::Table;
use super::reconcile::{Reconciled, Side};

/// A course offering from the course sheet
#[derive(Debug, Clone, PartialEq)]
pub struct Course {
    pub id: Field,
    pub name: Field,
    pub scheduled_month: Field,
    pub start_date: Field,
    pub end_date: Field,
    pub activity_id: Field,
}

impl Course {
    pub fn from_row(table: &Table, row: &[Field]) -> Self {
        Self {
            id: table.value(row, columns::COURSE_ID).clone(),
            name: table.value(row, columns::COURSE_NAME).clone(),
            scheduled_month: table.value(row, columns::SCHEDULED_MONTH).clone(),
            start_date: table.value(row, columns::START_DATE).clone(),
            end_date: table.value(row, columns::END_DATE).clone(),
            activity_id: table.value(row, columns::ACTIVITY_ID).clone(),
        }
    }

    /// Whether a joined row is an enrollment in this exact offering.
    ///
    /// Matching on the course id alone would pick up enrollments from other
    /// offerings of a reused id, so the schedule window and activity must
    /// agree too. The row's course side must also be this offering, since a
    /// reused id joins every enrollment once per course row.
    pub fn schedules(&self, joined: &Reconciled, row: &[Field]) -> bool {
        let cour = |name| joined.value(row, name, Side::Course);
        let part = |name| joined.value(row, name, Side::Enrollment);

        let same_offering = cour(columns::SCHEDULED_MONTH) == &self.scheduled_month
            && cour(columns::START_DATE) == &self.start_date
            && cour(columns::END_DATE) == &self.end_date
            && cour(columns::ACTIVITY_ID) == &self.activity_id;

        same_offering
            && part(columns::COURSE_ID).matches(&self.id)
            && part(columns::SCHEDULED_MONTH).matches(&self.scheduled_month)
            && part(columns::START_DATE).matches(&self.start_date)
            && part(columns::END_DATE).matches(&self.end_date)
            && part(columns::ACTIVITY_ID).matches(&self.activity_id)
    }
}

/// Sex marker from `SEXO_TRAB`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum SexMarker {
    Male,
    Female,
    #[default]
    Unknown,
}

impl SexMarker {
    pub fn parse(value: &str) -> Self {
        match value.trim() {
            "M" => SexMarker::Male,
            "F" => SexMarker::Female,
            _ => SexMarker::Unknown,
        }
    }
}

/// One participant entry of a course group
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Participant {
    pub rpe: String,
    pub full_name: String,
    pub sex: SexMarker,
}

impl Participant {
    pub fn new(rpe: impl Into<String>, full_name: impl Into<String>, sex: SexMarker) -> Self {
        Self {
            rpe: rpe.into(),
            full_name: full_name.into(),
            sex,
        }
    }

    /// Project the enrollment side of a joined row; missing values become ""
    pub fn from_joined(joined: &Reconciled, row: &[Field]) -> Self {
        let part = |name| joined.value(row, name, Side::Enrollment).to_string();

        Self {
            rpe: part(columns::RPE),
            full_name: part(columns::FULL_NAME),
            sex: SexMarker::parse(&part(columns::SEX)),
        }
    }

    /// Deduplication key
    pub fn key(&self) -> (&str, &str) {
        (&self.rpe, &self.full_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sex_marker_parse() {
        assert_eq!(SexMarker::parse("M"), SexMarker::Male);
        assert_eq!(SexMarker::parse(" F "), SexMarker::Female);
        assert_eq!(SexMarker::parse(""), SexMarker::Unknown);
        assert_eq!(SexMarker::parse("m"), SexMarker::Unknown);
        assert_eq!(SexMarker::parse("X"), SexMarker::Unknown);
    }
}
