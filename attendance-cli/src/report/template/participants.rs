//! Participant table: locate it and append one row per participant

use super::style::{TABLE_STYLE, apply_run_style, cell_properties, center_paragraph, set_run_text, w_element};
use super::xml::Element;
use crate::report::batch::BATCH_SIZE;
use crate::report::records::{Participant, SexMarker};

/// Columns filled per row: number, RPE, name, masculine mark, feminine mark
pub const FILLED_COLUMNS: usize = 5;

/// Glyph placed in the matching sex column
pub const MARK: &str = "X";

/// How to find the participant table in the template
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableLocator {
    /// `w:tblCaption` value, tried first
    pub caption: Option<String>,
    /// Position among the body's top-level tables
    pub index: usize,
}

impl Default for TableLocator {
    fn default() -> Self {
        Self {
            caption: Some("PARTICIPANTES".to_string()),
            index: 2,
        }
    }
}

fn body_tables(document: &Element) -> Vec<&Element> {
    document
        .child_w("body")
        .map(|body| body.elements().filter(|e| e.is_w("tbl")).collect())
        .unwrap_or_default()
}

fn caption(table: &Element) -> Option<&str> {
    table
        .child_w("tblPr")
        .and_then(|pr| pr.child_w("tblCaption"))
        .and_then(|c| c.w_attr("val"))
}

/// Position of the participant table among the body tables
pub fn locate_table(document: &Element, locator: &TableLocator) -> Option<usize> {
    let tables = body_tables(document);

    if let Some(wanted) = &locator.caption {
        if let Some(idx) = tables.iter().position(|t| caption(t) == Some(wanted.as_str())) {
            return Some(idx);
        }
        log::debug!(
            "No table captioned '{}', falling back to table index {}",
            wanted,
            locator.index
        );
    }

    (locator.index < tables.len()).then_some(locator.index)
}

pub fn find_table_mut<'a>(document: &'a mut Element, locator: &TableLocator) -> Option<&'a mut Element> {
    let idx = locate_table(document, locator)?;
    document
        .child_w_mut("body")?
        .elements_mut()
        .filter(|e| e.is_w("tbl"))
        .nth(idx)
}

/// Column widths from `w:tblGrid`, or from the last row when the grid is absent
fn column_widths(table: &Element) -> Vec<Option<String>> {
    if let Some(grid) = table.child_w("tblGrid") {
        let widths: Vec<Option<String>> = grid
            .elements()
            .filter(|e| e.is_w("gridCol"))
            .map(|c| c.w_attr("w").map(str::to_string))
            .collect();
        if !widths.is_empty() {
            return widths;
        }
    }

    table
        .elements()
        .filter(|e| e.is_w("tr"))
        .last()
        .map(|row| row.elements().filter(|e| e.is_w("tc")).map(|_| None).collect())
        .unwrap_or_default()
}

/// Cell texts for row `idx`; rows past the participants are blank
pub fn row_values(idx: usize, participant: Option<&Participant>) -> [String; FILLED_COLUMNS] {
    let Some(p) = participant else {
        return Default::default();
    };

    let (masculine, feminine) = match p.sex {
        SexMarker::Male => (MARK, ""),
        SexMarker::Female => ("", MARK),
        SexMarker::Unknown => ("", ""),
    };

    [
        (idx + 1).to_string(),
        p.rpe.clone(),
        p.full_name.clone(),
        masculine.to_string(),
        feminine.to_string(),
    ]
}

/// Append max(10, n) rows to the table
pub fn append_participant_rows(table: &mut Element, participants: &[Participant]) -> Result<usize, String> {
    let widths = column_widths(table);
    if widths.len() < FILLED_COLUMNS {
        return Err(format!(
            "participant table has {} columns, expected at least {}",
            widths.len(),
            FILLED_COLUMNS
        ));
    }

    let total = participants.len().max(BATCH_SIZE);
    for idx in 0..total {
        let values = row_values(idx, participants.get(idx));
        let row = build_row(table, &widths, &values);
        table.push(row);
    }
    Ok(total)
}

fn build_row(table: &Element, widths: &[Option<String>], values: &[String; FILLED_COLUMNS]) -> Element {
    let mut row = w_element(table, "tr");

    for (col, width) in widths.iter().enumerate() {
        let mut cell = w_element(table, "tc");
        if let Some(w) = width {
            let tc_pr = cell_properties(&mut cell);
            let mut tcw = w_element(table, "tcW");
            tcw.set_own_attr("w", w);
            tcw.set_own_attr("type", "dxa");
            tc_pr.push(tcw);
        }

        let mut paragraph = w_element(table, "p");
        if let Some(text) = values.get(col) {
            center_paragraph(&mut paragraph);
            let mut run = w_element(table, "r");
            set_run_text(&mut run, text);
            apply_run_style(&mut run, &TABLE_STYLE);
            paragraph.push(run);
        }
        cell.push(paragraph);
        row.push(cell);
    }

    row
}
