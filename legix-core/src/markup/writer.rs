//! Markup writer: [`Record`] → XML source.
//!
//! The inverse of reading and flattening, up to layout: attributes are written in record order,
//! child groups follow in record order, comments come back as plain text. Line numbers are not
//! written; they are recomputed when the output is read again.

use crate::record::{FieldValue, Record, END_LINE, START_LINE, TAIL, TEXT};

/// Layout knobs for [`write_document`].
#[derive(Debug, Clone, PartialEq)]
pub struct WriterOptions {
    pub indent_string: String,
    pub xml_declaration: bool,
}

impl Default for WriterOptions {
    fn default() -> Self {
        WriterOptions {
            indent_string: "  ".to_string(),
            xml_declaration: true,
        }
    }
}

/// Writes `record` as the root element `tag`.
pub fn write_document(tag: &str, record: &Record, options: &WriterOptions) -> String {
    let mut output = String::new();
    if options.xml_declaration {
        output.push_str("<?xml version=\"1.0\" encoding=\"utf-8\"?>\n");
    }
    write_element(&mut output, tag, record, 0, options);
    output
}

fn write_element(output: &mut String, tag: &str, record: &Record, depth: usize, options: &WriterOptions) {
    let indent = options.indent_string.repeat(depth);
    let inner_indent = options.indent_string.repeat(depth + 1);

    output.push_str(&indent);
    output.push('<');
    output.push_str(tag);
    for (key, value) in record.fields() {
        if let FieldValue::Text(text) = value {
            if key != TEXT && key != TAIL {
                output.push_str(&format!(" {key}=\"{}\"", escape(text)));
            }
        }
    }

    let text = record.text(TEXT);
    let groups: Vec<(&str, &[Record])> = record
        .fields()
        .filter_map(|(key, value)| match value {
            FieldValue::Records(records) => Some((key, records.as_slice())),
            _ => None,
        })
        .collect();

    if text.is_none() && groups.is_empty() {
        output.push_str("/>\n");
    } else {
        output.push_str(">\n");
        if let Some(text) = text {
            output.push_str(&inner_indent);
            output.push_str(&escape(text));
            output.push('\n');
        }
        for (child_tag, children) in groups {
            for child in children {
                write_element(output, child_tag, child, depth + 1, options);
            }
        }
        output.push_str(&indent);
        output.push_str(&format!("</{tag}>\n"));
    }

    if let Some(tail) = record.text(TAIL) {
        output.push_str(&indent);
        output.push_str(&escape(tail));
        output.push('\n');
    }
}

fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

/// Strips line numbers from a record tree, so records read from different layouts compare equal.
pub fn without_lines(record: &Record) -> Record {
    let mut stripped = Record::new();
    for (key, value) in record.fields() {
        match value {
            FieldValue::Line(_) if key == START_LINE || key == END_LINE => {}
            FieldValue::Records(children) => {
                for child in children {
                    stripped.push_child(key, without_lines(child));
                }
            }
            other => stripped.set(key, other.clone()),
        }
    }
    stripped
}
