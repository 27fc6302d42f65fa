//! Markup Reader: XML source → line-annotated [`RawNode`] tree.
//!
//! roxmltree does the actual parsing. This module only walks its DOM and keeps what the later
//! stages need: tag, attributes, the text before the first child element, the text following
//! the element (its tail), children in document order, and line numbers.
//!
//! Line numbers are 1-based. `start_line` is the line on which the opening tag completes (its
//! closing `>`), `end_line` the line on which the closing tag completes. For elements written
//! on a single line, or self-closing ones, `end_line` is left out.

use crate::error::LegixError;
use roxmltree::{Node, NodeType};

/// An element of the source document, before any interpretation.
#[derive(Debug, Clone, PartialEq)]
pub struct RawNode {
    pub tag: String,
    /// Attributes in source order.
    pub attributes: Vec<(String, String)>,
    pub text: Option<String>,
    pub tail: Option<String>,
    /// Child elements in source order.
    pub children: Vec<RawNode>,
    pub start_line: u32,
    pub end_line: Option<u32>,
}

impl RawNode {
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Number of elements in this subtree, this one included.
    pub fn count(&self) -> usize {
        1 + self.children.iter().map(RawNode::count).sum::<usize>()
    }
}

/// Parses `source` and returns its root element.
pub fn read(source: &str) -> Result<RawNode, LegixError> {
    let doc = roxmltree::Document::parse(source).map_err(|e| {
        let pos = e.pos();
        LegixError::Markup {
            message: e.to_string(),
            line: pos.row,
            column: pos.col,
        }
    })?;

    let root = build_node(&doc, source, doc.root_element());
    tracing::debug!(
        elements = root.count(),
        root = %root.tag,
        "read markup"
    );
    Ok(root)
}

fn build_node(doc: &roxmltree::Document, source: &str, node: Node) -> RawNode {
    let range = node.range();
    let start_line = doc.text_pos_at(start_tag_end(source, range.start)).row;
    // `range.end` is one past the final `>`.
    let end_line = doc.text_pos_at(range.end.saturating_sub(1)).row;

    let attributes = node
        .attributes()
        .map(|attr| (attr.name().to_string(), attr.value().to_string()))
        .collect();

    let children = node
        .children()
        .filter(|child| child.is_element())
        .map(|child| build_node(doc, source, child))
        .collect();

    RawNode {
        tag: node.tag_name().name().to_string(),
        attributes,
        text: leading_text(node),
        tail: tail_text(node),
        children,
        start_line,
        end_line: (end_line != start_line).then_some(end_line),
    }
}

/// Text content preceding the first child element. Comments are skipped, not split on.
fn leading_text(node: Node) -> Option<String> {
    collect_text(node.children())
}

/// Text content following the element, up to the next sibling element.
fn tail_text(node: Node) -> Option<String> {
    collect_text(std::iter::successors(node.next_sibling(), |sibling| {
        sibling.next_sibling()
    }))
}

fn collect_text<'a, 'input: 'a>(nodes: impl Iterator<Item = Node<'a, 'input>>) -> Option<String> {
    let mut text: Option<String> = None;
    for node in nodes {
        match node.node_type() {
            NodeType::Element => break,
            NodeType::Text => {
                if let Some(chunk) = node.text() {
                    text.get_or_insert_with(String::new).push_str(chunk);
                }
            }
            _ => {}
        }
    }
    text
}

/// Byte offset of the `>` closing the start tag that begins at `start`.
///
/// Quoted attribute values may contain `>`, so quotes are tracked.
fn start_tag_end(source: &str, start: usize) -> usize {
    let mut quote: Option<u8> = None;
    for (offset, byte) in source.as_bytes()[start..].iter().enumerate() {
        match (quote, *byte) {
            (None, b'"') | (None, b'\'') => quote = Some(*byte),
            (Some(open), byte) if byte == open => quote = None,
            (None, b'>') => return start + offset,
            _ => {}
        }
    }
    start
}
