//! Tree Flattener: [`RawNode`] → [`Record`]
//!
//! Purely structural. Each element becomes a record holding, in this order:
//!
//! 1. `text`: the element's leading text, cleaned as a comment (see [`clean_comment`])
//! 2. `start_line` / `end_line`
//! 3. every attribute, verbatim
//! 4. one group per child tag, holding the children's records in document order
//! 5. `tail`: the text after the element, cleaned as a comment
//!
//! No coercion happens here and nothing is rejected; unknown attributes or tags travel along
//! so the validator can report them.

use crate::markup::RawNode;
use crate::record::{FieldValue, Record, END_LINE, START_LINE, TAIL, TEXT};

/// Flattens `node` and returns its tag (the key its parent groups it under) with its record.
pub fn flatten(node: &RawNode) -> (String, Record) {
    let mut record = Record::new();

    if let Some(text) = node.text.as_deref().and_then(clean_comment) {
        record.set_text(TEXT, text);
    }
    record.set(START_LINE, FieldValue::Line(node.start_line));
    if let Some(end_line) = node.end_line {
        record.set(END_LINE, FieldValue::Line(end_line));
    }
    for (name, value) in &node.attributes {
        record.set_text(name.clone(), value.clone());
    }
    for child in &node.children {
        let (tag, child_record) = flatten(child);
        record.push_child(&tag, child_record);
    }
    if let Some(tail) = node.tail.as_deref().and_then(clean_comment) {
        record.set_text(TAIL, tail);
    }

    (node.tag.clone(), record)
}

/// Trims whitespace and surrounding `#` markers until none is left; an empty result means no
/// comment.
///
/// Cleaning a cleaned comment changes nothing, so comments survive a write and re-read.
pub fn clean_comment(raw: &str) -> Option<String> {
    let mut cleaned = raw.trim();
    loop {
        let next = cleaned.trim_matches('#').trim();
        if next == cleaned {
            break;
        }
        cleaned = next;
    }
    (!cleaned.is_empty()).then(|| cleaned.to_string())
}
