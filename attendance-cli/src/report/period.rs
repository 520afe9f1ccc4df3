//! Period Filter: pick the courses of a month and their enrollments

use std::fmt;

use chrono::{Datelike, Local};
use serde::Serialize;

use super::records::{Course, Field, Participant, Reconciled, Table};

const MONTH_NAMES: [&str; 12] = [
    "Enero",
    "Febrero",
    "Marzo",
    "Abril",
    "Mayo",
    "Junio",
    "Julio",
    "Agosto",
    "Septiembre",
    "Octubre",
    "Noviembre",
    "Diciembre",
];

/// A calendar month, 1 = January
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Period {
    month: u32,
}

impl Period {
    pub fn new(month: u32) -> Option<Self> {
        (1..=12).contains(&month).then_some(Self { month })
    }

    pub fn current() -> Self {
        Self {
            month: Local::now().month(),
        }
    }

    /// Interpret an optional selector, falling back to the current month
    pub fn from_selector(selector: Option<&str>) -> Self {
        let Some(raw) = selector.map(str::trim).filter(|s| !s.is_empty()) else {
            return Self::current();
        };

        match raw.parse::<u32>().ok().and_then(Self::new) {
            Some(period) => period,
            None => {
                let current = Self::current();
                log::warn!(
                    "Invalid month selector '{}', using current month ({})",
                    raw,
                    current.display_name()
                );
                current
            }
        }
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    /// Spanish month name, e.g. "Marzo"
    pub fn display_name(&self) -> &'static str {
        MONTH_NAMES[(self.month - 1) as usize]
    }

    /// Whether a `MES_PROGRAMADO` cell names this month
    pub fn contains(&self, scheduled: &Field) -> bool {
        scheduled.as_int() == Some(self.month as i64)
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// A course and its schedule-matched enrollments, in sheet order
#[derive(Debug, Clone)]
pub struct CourseGroup {
    pub course: Course,
    pub enrollments: Vec<Participant>,
}

/// Courses whose own scheduled month is the period, in sheet order
pub fn courses_in_period(courses: &Table, period: Period) -> Vec<Course> {
    courses
        .rows
        .iter()
        .map(|row| Course::from_row(courses, row))
        .filter(|course| period.contains(&course.scheduled_month))
        .collect()
}

/// Build the course group for one course from the reconciled join
pub fn course_group(joined: &Reconciled, course: &Course) -> CourseGroup {
    let enrollments = joined
        .rows()
        .iter()
        .filter(|row| course.schedules(joined, row))
        .map(|row| Participant::from_joined(joined, row))
        .collect();

    CourseGroup {
        course: course.clone(),
        enrollments,
    }
}

/// Course groups for every course of the period; empty when none match
pub fn select_period(joined: &Reconciled, courses: &Table, period: Period) -> Vec<CourseGroup> {
    courses_in_period(courses, period)
        .iter()
        .map(|course| course_group(joined, course))
        .collect()
}
