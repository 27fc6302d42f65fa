//! Accumulated validation diagnostics
//!
//! Validation never stops at the first problem. Every violation is recorded with the path of
//! the field it concerns, so a caller gets the complete picture of a document in one pass.
//!
//! A path is a sequence of steps mirroring the flattened document: keys are the XML field
//! names (`CODE`, `TRANCHE`, `deb`, ...) and indices address items of a same-tag group.
//!
//! ```text
//! NODE/0/BAREME/1/TRANCHE/2/SEUIL/0/VALUE/0/deb: Dates don't belong to valid dates of previous bracket
//! ```
//!
//! The [`Report`] can be rendered either as that flat list or as a nested JSON tree shaped like
//! the document itself.

use serde_json::{Map, Value};
use std::fmt;

/// One step of a [`FieldPath`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PathStep {
    Key(String),
    Index(usize),
}

impl fmt::Display for PathStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathStep::Key(key) => f.write_str(key),
            PathStep::Index(index) => write!(f, "{index}"),
        }
    }
}

/// Location of a field inside the flattened document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct FieldPath(Vec<PathStep>);

impl FieldPath {
    /// The empty path, addressing the document root.
    pub fn root() -> Self {
        FieldPath(Vec::new())
    }

    /// A new path extended with a key step.
    pub fn key(&self, key: &str) -> Self {
        let mut steps = self.0.clone();
        steps.push(PathStep::Key(key.to_string()));
        FieldPath(steps)
    }

    /// A new path extended with an index step.
    pub fn index(&self, index: usize) -> Self {
        let mut steps = self.0.clone();
        steps.push(PathStep::Index(index));
        FieldPath(steps)
    }

    pub fn steps(&self) -> &[PathStep] {
        &self.0
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return f.write_str("/");
        }
        for (position, step) in self.0.iter().enumerate() {
            if position > 0 {
                f.write_str("/")?;
            }
            write!(f, "{step}")?;
        }
        Ok(())
    }
}

/// Category of a violation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ViolationKind {
    /// Unknown, missing or mistyped field.
    Schema,
    /// Interval gap, overlap or containment failure.
    Temporal,
}

/// A single problem found during validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    pub path: FieldPath,
    pub kind: ViolationKind,
    pub message: String,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path, self.message)
    }
}

/// Every violation found in a document, in the order they were detected.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Report {
    violations: Vec<Violation>,
}

impl Report {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schema(&mut self, path: FieldPath, message: impl Into<String>) {
        self.push(path, ViolationKind::Schema, message);
    }

    pub fn temporal(&mut self, path: FieldPath, message: impl Into<String>) {
        self.push(path, ViolationKind::Temporal, message);
    }

    pub fn push(&mut self, path: FieldPath, kind: ViolationKind, message: impl Into<String>) {
        self.violations.push(Violation {
            path,
            kind,
            message: message.into(),
        });
    }

    pub fn is_empty(&self) -> bool {
        self.violations.is_empty()
    }

    pub fn len(&self) -> usize {
        self.violations.len()
    }

    pub fn violations(&self) -> &[Violation] {
        &self.violations
    }

    /// Message recorded at exactly `path`, if any.
    pub fn message_at(&self, path: &FieldPath) -> Option<&str> {
        self.violations
            .iter()
            .find(|violation| &violation.path == path)
            .map(|violation| violation.message.as_str())
    }

    /// Renders the report as one `path: message` line per violation.
    pub fn to_list(&self) -> String {
        let mut output = String::new();
        for violation in &self.violations {
            output.push_str(&violation.to_string());
            output.push('\n');
        }
        output
    }

    /// Renders the report as a nested JSON object mirroring the document shape.
    ///
    /// When two violations collide (one path is a prefix of another) the first recorded one
    /// is kept: a message already placed on a slot is never replaced by a subtree, nor the
    /// reverse.
    pub fn to_tree(&self) -> Value {
        let mut root = Value::Object(Map::new());
        for violation in &self.violations {
            insert_message(&mut root, violation.path.steps(), &violation.message);
        }
        if let Some(message) = self.message_at(&FieldPath::root()) {
            return Value::String(message.to_string());
        }
        root
    }
}

fn insert_message(slot: &mut Value, steps: &[PathStep], message: &str) {
    let Value::Object(map) = slot else {
        return;
    };
    let Some((first, rest)) = steps.split_first() else {
        return;
    };
    let key = first.to_string();
    if rest.is_empty() {
        map.entry(key)
            .or_insert_with(|| Value::String(message.to_string()));
        return;
    }
    let child = map
        .entry(key)
        .or_insert_with(|| Value::Object(Map::new()));
    insert_message(child, rest, message);
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.violations.len() {
            1 => write!(f, "1 violation: {}", self.violations[0]),
            count => write!(f, "{count} violations"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn path_display_joins_steps() {
        let path = FieldPath::root().key("CODE").index(1).key("code");
        assert_eq!(path.to_string(), "CODE/1/code");
        assert_eq!(FieldPath::root().to_string(), "/");
    }

    #[test]
    fn tree_nests_by_path() {
        let mut report = Report::new();
        report.schema(FieldPath::root().key("code"), "Missing value");
        report.temporal(
            FieldPath::root().key("VALUE").index(0).key("deb"),
            "Dates of values overlap",
        );
        assert_eq!(
            report.to_tree(),
            json!({
                "code": "Missing value",
                "VALUE": {"0": {"deb": "Dates of values overlap"}},
            })
        );
    }

    #[test]
    fn tree_keeps_first_message_on_collision() {
        let mut report = Report::new();
        report.schema(FieldPath::root().key("TRANCHE").index(0), "first");
        report.schema(FieldPath::root().key("TRANCHE").index(0).key("SEUIL"), "second");
        assert_eq!(report.to_tree(), json!({"TRANCHE": {"0": "first"}}));
    }

    #[test]
    fn list_renders_one_line_per_violation() {
        let mut report = Report::new();
        report.schema(FieldPath::root().key("a"), "one");
        report.schema(FieldPath::root().key("b").index(3), "two");
        assert_eq!(report.to_list(), "a: one\nb/3: two\n");
        assert_eq!(report.to_string(), "2 violations");
    }
}
