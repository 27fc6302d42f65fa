//! Normalized legislation document
//!
//! The output of the Semantic Transformer. Keys are semantic (`start`, `threshold`,
//! `children`, ...) rather than tag-derived, children of a Node are keyed and ordered by code,
//! and every element says what it is through its `@type` key.
//!
//! These types only serialize: the document is an export format, never read back. Going back
//! to markup goes through the validated tree instead (see [`crate::model`]).

use chrono::NaiveDate;
use serde::Serialize;
use std::collections::BTreeMap;

/// `@type` of the root element.
const NODE_TYPE: &str = "Node";

/// The whole transformed document: the root Node plus the validity window.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LegislationDocument {
    #[serde(rename = "@context", skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
    #[serde(rename = "@type")]
    element_type: &'static str,
    pub start: NaiveDate,
    pub stop: NaiveDate,
    #[serde(flatten)]
    pub root: NodeDocument,
}

impl LegislationDocument {
    pub fn new(
        context: Option<String>,
        start: NaiveDate,
        stop: NaiveDate,
        root: NodeDocument,
    ) -> Self {
        LegislationDocument {
            context,
            element_type: NODE_TYPE,
            start,
            stop,
            root,
        }
    }
}

/// A child of a Node, tagged with its kind.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "@type")]
pub enum Element {
    Node(NodeDocument),
    Parameter(ParameterDocument),
    Scale(ScaleDocument),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeDocument {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub children: BTreeMap<String, Element>,
    #[serde(flatten)]
    pub source: SourceDocument,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParameterDocument {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub format: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    pub values: Vec<ValueDocument>,
    #[serde(flatten)]
    pub source: SourceDocument,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScaleDocument {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub option: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    pub brackets: Vec<BracketDocument>,
    #[serde(flatten)]
    pub source: SourceDocument,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BracketDocument {
    pub threshold: Vec<ValueDocument>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<Vec<ValueDocument>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rate: Option<Vec<ValueDocument>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base: Option<Vec<ValueDocument>>,
    #[serde(flatten)]
    pub source: SourceDocument,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValueDocument {
    pub start: NaiveDate,
    pub stop: NaiveDate,
    pub value: Scalar,
    #[serde(flatten)]
    pub source: SourceDocument,
}

/// A value read according to its Parameter's format.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Scalar {
    Boolean(bool),
    Integer(i64),
    Float(f64),
}

/// Merged comment and source lines of an element.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SourceDocument {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_line: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_line: Option<u32>,
}
