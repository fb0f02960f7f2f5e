//! Tolerant line parser for the three-label classification grammar.
//!
//! ```text
//! TITLE: <title>
//! TYPE: <type>
//! DESCRIPTION: <description>
//! ```
//!
//! Labels are case-insensitive, lines may end in `\n` or `\r\n`, blank and
//! unrecognized lines are skipped, and a repeated label overwrites the earlier
//! value. The parser is total: every input produces a [`ParsedFields`].

use crate::ParsedFields;

const TITLE: &str = "TITLE:";
const TYPE: &str = "TYPE:";
const DESCRIPTION: &str = "DESCRIPTION:";

/// Remainder of `line` after a case-insensitive `label`, trimmed.
fn strip_label<'a>(line: &'a str, label: &str) -> Option<&'a str> {
    let head = line.get(..label.len())?;
    if head.eq_ignore_ascii_case(label) {
        line.get(label.len()..).map(str::trim)
    } else {
        None
    }
}

pub fn parse_classification(text: &str) -> ParsedFields {
    let mut fields = ParsedFields::default();
    for line in text.split(['\r', '\n']).map(str::trim) {
        if line.is_empty() {
            continue;
        }
        if let Some(value) = strip_label(line, TITLE) {
            fields.title = value.to_string();
        } else if let Some(value) = strip_label(line, TYPE) {
            fields.kind = value.to_string();
        } else if let Some(value) = strip_label(line, DESCRIPTION) {
            fields.description = value.to_string();
        }
    }
    fields
}
