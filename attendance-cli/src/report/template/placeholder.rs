//! Placeholder substitution over the paragraphs of a document body

use serde::{Deserialize, Serialize};

use super::style::{PLACEHOLDER_STYLE, apply_run_style, center_paragraph, run_text, set_run_text};
use super::xml::Element;

/// How a placeholder token is located inside a paragraph
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MatchMode {
    /// Tokens may cross run boundaries
    #[default]
    Spanning,
    /// Tokens must sit inside a single run (legacy templates)
    RunLocal,
}

/// Elements whose runs belong to the enclosing paragraph
const RUN_CONTAINERS: &[&str] = &["hyperlink", "smartTag", "ins", "customXml", "fldSimple"];

/// Replace every occurrence of `token` in the body. Runs that receive the
/// value get the placeholder style; paragraphs inside table cells that had a
/// replacement are centered. Returns the number of replacements.
pub fn replace_placeholder(root: &mut Element, token: &str, value: &str, mode: MatchMode) -> usize {
    if token.is_empty() {
        return 0;
    }
    let mut count = 0;
    visit_paragraphs(root, false, &mut |paragraph: &mut Element, in_cell: bool| {
        let replaced = replace_in_paragraph(paragraph, token, value, mode);
        if replaced > 0 && in_cell {
            center_paragraph(paragraph);
        }
        count += replaced;
    });
    count
}

/// Call `f` for every `w:p`, flagging those inside a table cell
pub fn visit_paragraphs(
    element: &mut Element,
    in_cell: bool,
    f: &mut dyn FnMut(&mut Element, bool),
) {
    for child in element.elements_mut() {
        if child.is_w("p") {
            f(child, in_cell);
        } else {
            let nested = in_cell || child.is_w("tc");
            visit_paragraphs(child, nested, f);
        }
    }
}

fn collect_runs<'a>(element: &'a mut Element, out: &mut Vec<&'a mut Element>) {
    for child in element.elements_mut() {
        if child.is_w("r") {
            out.push(child);
        } else if RUN_CONTAINERS.iter().any(|name| child.is_w(name)) {
            collect_runs(child, out);
        }
    }
}

fn replace_in_paragraph(paragraph: &mut Element, token: &str, value: &str, mode: MatchMode) -> usize {
    let mut runs = Vec::new();
    collect_runs(paragraph, &mut runs);

    let original: Vec<String> = runs.iter().map(|r| run_text(r)).collect();
    let mut texts = original.clone();

    let (count, touched) = match mode {
        MatchMode::Spanning => splice_spanning(&mut texts, token, value),
        MatchMode::RunLocal => splice_run_local(&mut texts, token, value),
    };
    if count == 0 {
        return 0;
    }

    for (i, run) in runs.iter_mut().enumerate() {
        if texts[i] != original[i] {
            set_run_text(run, &texts[i]);
        }
        if touched.contains(&i) {
            apply_run_style(run, &PLACEHOLDER_STYLE);
        }
    }
    count
}

fn splice_run_local(texts: &mut [String], token: &str, value: &str) -> (usize, Vec<usize>) {
    let mut count = 0;
    let mut touched = Vec::new();
    for (i, text) in texts.iter_mut().enumerate() {
        let hits = text.matches(token).count();
        if hits > 0 {
            *text = text.replace(token, value);
            count += hits;
            touched.push(i);
        }
    }
    (count, touched)
}

/// Replace tokens in the concatenation of run texts. The value goes into the
/// run where the token starts; the rest of the token is cut from the runs it
/// spilled into.
fn splice_spanning(texts: &mut [String], token: &str, value: &str) -> (usize, Vec<usize>) {
    let mut count = 0;
    let mut touched = Vec::new();
    let mut from = 0;

    loop {
        let joined = texts.concat();
        let Some(found) = joined.get(from..).and_then(|rest| rest.find(token)) else {
            break;
        };
        let start = from + found;
        let end = start + token.len();

        let (first, first_offset) = locate(texts, start, false);
        let (last, last_offset) = locate(texts, end, true);

        if first == last {
            texts[first].replace_range(first_offset..last_offset, value);
        } else {
            texts[first].truncate(first_offset);
            texts[first].push_str(value);
            for text in &mut texts[first + 1..last] {
                text.clear();
            }
            texts[last].replace_range(..last_offset, "");
        }

        if !touched.contains(&first) {
            touched.push(first);
        }
        count += 1;
        from = start + value.len();
    }

    (count, touched)
}

/// Map a byte offset of the joined text to (run, offset in run). With
/// `closing`, an offset on a boundary resolves to the end of the earlier run.
fn locate(texts: &[String], offset: usize, closing: bool) -> (usize, usize) {
    let mut base = 0;
    for (i, text) in texts.iter().enumerate() {
        let len = text.len();
        let inside = if closing {
            offset > base && offset <= base + len
        } else {
            offset >= base && offset < base + len
        };
        if inside {
            return (i, offset - base);
        }
        base += len;
    }
    (texts.len().saturating_sub(1), texts.last().map_or(0, String::len))
}

/// Whether a token is still present anywhere in the document
pub fn contains_token(root: &Element, token: &str) -> bool {
    root.text().contains(token)
}
