//! Normalized workbook cell values

use std::fmt;

use calamine::Data;
use chrono::{NaiveDateTime, Timelike};

/// A single cell after normalization.
///
/// Whole floats collapse to `Int` so `3.0` from one sheet matches `3` from
/// another. `Empty` never equals anything through [`Field::matches`].
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Field {
    #[default]
    Empty,
    Text(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    DateTime(NaiveDateTime),
}

impl Field {
    pub fn is_empty(&self) -> bool {
        matches!(self, Field::Empty)
    }

    /// Key equality used by joins and schedule matching
    pub fn matches(&self, other: &Field) -> bool {
        !self.is_empty() && !other.is_empty() && self == other
    }

    /// Integer view, accepting numeric text such as `" 3 "`
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Field::Int(i) => Some(*i),
            Field::Text(s) => s.trim().parse().ok(),
            _ => None,
        }
    }
}

impl From<&Data> for Field {
    fn from(cell: &Data) -> Self {
        match cell {
            Data::Empty | Data::Error(_) => Field::Empty,
            Data::String(s) if s.trim().is_empty() => Field::Empty,
            Data::String(s) => Field::Text(s.trim().to_string()),
            Data::Int(i) => Field::Int(*i),
            Data::Float(f) => {
                if f.fract() == 0.0 && *f >= i64::MIN as f64 && *f <= i64::MAX as f64 {
                    Field::Int(*f as i64)
                } else {
                    Field::Float(*f)
                }
            }
            Data::Bool(b) => Field::Bool(*b),
            Data::DateTime(dt) => match dt.as_datetime() {
                Some(value) => Field::DateTime(value),
                None => Field::Float(dt.as_f64()),
            },
            Data::DateTimeIso(s) => parse_iso(s),
            Data::DurationIso(s) => Field::Text(s.clone()),
        }
    }
}

fn parse_iso(s: &str) -> Field {
    if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S") {
        return Field::DateTime(dt);
    }
    if let Ok(date) = chrono::NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Field::DateTime(date.and_time(chrono::NaiveTime::MIN));
    }
    Field::Text(s.to_string())
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Field::Empty => Ok(()),
            Field::Text(s) => write!(f, "{}", s),
            Field::Int(i) => write!(f, "{}", i),
            Field::Float(v) => write!(f, "{}", v),
            Field::Bool(b) => write!(f, "{}", b),
            Field::DateTime(dt) => {
                if dt.time().num_seconds_from_midnight() == 0 {
                    write!(f, "{}", dt.format("%Y-%m-%d"))
                } else {
                    write!(f, "{}", dt.format("%Y-%m-%d %H:%M:%S"))
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_whole_floats_become_ints() {
        assert_eq!(Field::from(&Data::Float(3.0)), Field::Int(3));
        assert_eq!(Field::from(&Data::Float(2.5)), Field::Float(2.5));
    }

    #[test]
    fn test_blank_strings_are_empty() {
        assert_eq!(Field::from(&Data::String("   ".into())), Field::Empty);
        assert_eq!(
            Field::from(&Data::String(" RPE1 ".into())),
            Field::Text("RPE1".into())
        );
    }

    #[test]
    fn test_empty_never_matches() {
        assert!(!Field::Empty.matches(&Field::Empty));
        assert!(!Field::Int(1).matches(&Field::Empty));
        assert!(Field::Int(1).matches(&Field::Int(1)));
        assert!(!Field::Int(1).matches(&Field::Text("1".into())));
    }

    #[test]
    fn test_date_display() {
        let midnight = NaiveDate::from_ymd_opt(2025, 1, 15)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        assert_eq!(Field::DateTime(midnight).to_string(), "2025-01-15");

        let afternoon = NaiveDate::from_ymd_opt(2025, 1, 15)
            .unwrap()
            .and_hms_opt(14, 30, 0)
            .unwrap();
        assert_eq!(
            Field::DateTime(afternoon).to_string(),
            "2025-01-15 14:30:00"
        );
    }

    #[test]
    fn test_iso_dates_parse() {
        let expected = NaiveDate::from_ymd_opt(2025, 3, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        assert_eq!(
            Field::from(&Data::DateTimeIso("2025-03-01".into())),
            Field::DateTime(expected)
        );
    }

    #[test]
    fn test_numeric_text_as_int() {
        assert_eq!(Field::Text(" 4 ".into()).as_int(), Some(4));
        assert_eq!(Field::Text("abril".into()).as_int(), None);
    }
}
