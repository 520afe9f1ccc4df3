//! Run and paragraph formatting
//!
//! Word rejects properties out of schema order, so new property elements are
//! inserted at their schema position instead of appended.

use super::xml::{Element, Node, W_NS, XML_NS};

const RUN_CHILDREN: &[&str] = &["rPr"];
const PARAGRAPH_CHILDREN: &[&str] = &["pPr"];
const CELL_CHILDREN: &[&str] = &["tcPr"];

const RUN_PROPERTIES: &[&str] = &[
    "rStyle", "rFonts", "b", "bCs", "i", "iCs", "caps", "smallCaps", "strike", "dstrike",
    "outline", "shadow", "emboss", "imprint", "noProof", "snapToGrid", "vanish", "webHidden",
    "color", "spacing", "w", "kern", "position", "sz", "szCs", "highlight", "u", "effect", "bdr",
    "shd", "fitText", "vertAlign", "rtl", "cs", "em", "lang", "eastAsianLayout", "specVanish",
    "oMath",
];

const PARAGRAPH_PROPERTIES: &[&str] = &[
    "pStyle", "keepNext", "keepLines", "pageBreakBefore", "framePr", "widowControl", "numPr",
    "suppressLineNumbers", "pBdr", "shd", "tabs", "suppressAutoHyphens", "kinsoku", "wordWrap",
    "overflowPunct", "topLinePunct", "autoSpaceDE", "autoSpaceDN", "bidi", "adjustRightInd",
    "snapToGrid", "spacing", "ind", "contextualSpacing", "mirrorIndents", "suppressOverlap", "jc",
    "textDirection", "textAlignment", "textboxTightWrap", "outlineLvl", "divId", "cnfStyle", "rPr",
    "sectPr", "pPrChange",
];

/// Font settings applied to a run
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RunStyle {
    pub font: &'static str,
    /// Size in half-points, as `w:sz` stores it
    pub half_points: u32,
    pub bold: bool,
}

/// Substituted course metadata: Arial 9 pt bold
pub const PLACEHOLDER_STYLE: RunStyle = RunStyle {
    font: "Arial",
    half_points: 18,
    bold: true,
};

/// Participant rows: Arial 7.5 pt bold
pub const TABLE_STYLE: RunStyle = RunStyle {
    font: "Arial",
    half_points: 15,
    bold: true,
};

fn rank(order: &[&str], name: &str) -> usize {
    order.iter().position(|n| *n == name).unwrap_or(order.len())
}

/// Get or create a w: child, placing a new one at its schema position
pub fn ensure_child<'a>(parent: &'a mut Element, name: &str, order: &[&str]) -> &'a mut Element {
    let existing = parent
        .children
        .iter()
        .position(|n| matches!(n, Node::Element(e) if e.is_w(name)));

    let idx = match existing {
        Some(idx) => idx,
        None => {
            let new_rank = rank(order, name);
            let at = parent
                .children
                .iter()
                .position(|n| matches!(n, Node::Element(e) if rank(order, &e.name) > new_rank))
                .unwrap_or(parent.children.len());

            let child = w_element(parent, name);
            parent.children.insert(at, Node::Element(child));
            at
        }
    };

    match &mut parent.children[idx] {
        Node::Element(e) => e,
        _ => unreachable!("index points at an element"),
    }
}

/// A new w: element, reusing the prefix the document binds to the w namespace
pub fn w_element(context: &Element, name: &str) -> Element {
    if context.is(W_NS, &context.name) {
        context.sibling_kind(name)
    } else {
        Element {
            prefix: Some("w".to_string()),
            namespace: Some(W_NS.to_string()),
            name: name.to_string(),
            declarations: Vec::new(),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }
}

pub fn apply_run_style(run: &mut Element, style: &RunStyle) {
    let rpr = ensure_child(run, "rPr", RUN_CHILDREN);

    let fonts = ensure_child(rpr, "rFonts", RUN_PROPERTIES);
    for slot in ["ascii", "hAnsi", "eastAsia"] {
        fonts.set_own_attr(slot, style.font);
    }
    // Theme fonts take precedence over explicit ones
    for theme in ["asciiTheme", "hAnsiTheme", "eastAsiaTheme"] {
        fonts.remove_attr(W_NS, theme);
    }

    if style.bold {
        ensure_child(rpr, "b", RUN_PROPERTIES).remove_attr(W_NS, "val");
    } else {
        ensure_child(rpr, "b", RUN_PROPERTIES).set_own_attr("val", "0");
    }

    ensure_child(rpr, "sz", RUN_PROPERTIES).set_own_attr("val", &style.half_points.to_string());
}

pub fn center_paragraph(paragraph: &mut Element) {
    let ppr = ensure_child(paragraph, "pPr", PARAGRAPH_CHILDREN);
    ensure_child(ppr, "jc", PARAGRAPH_PROPERTIES).set_own_attr("val", "center");
}

pub fn cell_properties(cell: &mut Element) -> &mut Element {
    ensure_child(cell, "tcPr", CELL_CHILDREN)
}

/// Text of a run's `w:t` elements
pub fn run_text(run: &Element) -> String {
    run.elements()
        .filter(|e| e.is_w("t"))
        .map(|t| t.text())
        .collect()
}

/// Replace a run's text, keeping its first `w:t` and dropping the rest
pub fn set_run_text(run: &mut Element, text: &str) {
    let mut first = true;
    run.children.retain(|n| match n {
        Node::Element(e) if e.is_w("t") => std::mem::replace(&mut first, false),
        _ => true,
    });

    if first {
        let t = w_element(run, "t");
        run.push(t);
    }

    if let Some(t) = run.child_w_mut("t") {
        t.children = vec![Node::Text(text.to_string())];
        if text.starts_with(char::is_whitespace) || text.ends_with(char::is_whitespace) {
            t.set_attr(Some("xml"), Some(XML_NS), "space", "preserve");
        }
    }
}
