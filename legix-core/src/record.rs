//! Generic flattened record
//!
//! A [`Record`] is the ordered field map produced by the Tree Flattener for one element: comment
//! text, line numbers, attributes and same-tag child groups all live side by side under their
//! field name, the way the source markup exposes them. The Schema Validator consumes records;
//! the markup writer produces source from them.

use serde::ser::{Serialize, SerializeMap, Serializer};

pub const TEXT: &str = "text";
pub const TAIL: &str = "tail";
pub const START_LINE: &str = "start_line";
pub const END_LINE: &str = "end_line";

/// Value stored under a record field.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Text(String),
    Line(u32),
    Records(Vec<Record>),
}

/// Ordered mapping of field name to value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    fields: Vec<(String, FieldValue)>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.fields.iter().map(|(key, value)| (key.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&FieldValue> {
        self.fields
            .iter()
            .find(|(name, _)| name == key)
            .map(|(_, value)| value)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn text(&self, key: &str) -> Option<&str> {
        match self.get(key) {
            Some(FieldValue::Text(text)) => Some(text),
            _ => None,
        }
    }

    pub fn line(&self, key: &str) -> Option<u32> {
        match self.get(key) {
            Some(FieldValue::Line(line)) => Some(*line),
            _ => None,
        }
    }

    pub fn records(&self, key: &str) -> Option<&[Record]> {
        match self.get(key) {
            Some(FieldValue::Records(records)) => Some(records),
            _ => None,
        }
    }

    /// Sets `key`, replacing an existing value in place or appending a new field.
    pub fn set(&mut self, key: impl Into<String>, value: FieldValue) {
        let key = key.into();
        match self.fields.iter_mut().find(|(name, _)| *name == key) {
            Some((_, slot)) => *slot = value,
            None => self.fields.push((key, value)),
        }
    }

    pub fn set_text(&mut self, key: impl Into<String>, text: impl Into<String>) {
        self.set(key, FieldValue::Text(text.into()));
    }

    /// Appends `child` to the `key` group.
    ///
    /// If `key` is already taken by a non-group value (an attribute sharing a child's tag), the
    /// group is added as a second field with the same key; validation reports the duplicate.
    pub fn push_child(&mut self, key: &str, child: Record) {
        let group = self
            .fields
            .iter_mut()
            .find(|(name, value)| name == key && matches!(value, FieldValue::Records(_)));
        match group {
            Some((_, FieldValue::Records(records))) => records.push(child),
            _ => self
                .fields
                .push((key.to_string(), FieldValue::Records(vec![child]))),
        }
    }
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (key, value) in &self.fields {
            match value {
                FieldValue::Text(text) => map.serialize_entry(key, text)?,
                FieldValue::Line(line) => map.serialize_entry(key, line)?,
                FieldValue::Records(records) => map.serialize_entry(key, records)?,
            }
        }
        map.end()
    }
}
