//! Declarative record schemas
//!
//! Each element kind declares the closed set of fields it accepts, their expected shape and
//! whether they are mandatory. [`Schema::check`] enforces closure, presence and shape; the
//! per-kind validators then coerce the individual values.

use super::conv::{cleanup_line, cleanup_text, DUPLICATE_ITEM, MISSING_VALUE, UNEXPECTED_ITEM};
use crate::diagnostics::{FieldPath, Report};
use crate::model::SourceInfo;
use crate::record::{FieldValue, Record, END_LINE, START_LINE, TAIL, TEXT};
use std::collections::HashSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Shape {
    Text,
    Line,
    Records,
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct FieldSpec {
    pub name: &'static str,
    pub shape: Shape,
    pub required: bool,
}

const fn optional(name: &'static str, shape: Shape) -> FieldSpec {
    FieldSpec {
        name,
        shape,
        required: false,
    }
}

const fn required(name: &'static str, shape: Shape) -> FieldSpec {
    FieldSpec {
        name,
        shape,
        required: true,
    }
}

const SOURCE_FIELDS: &[FieldSpec] = &[
    optional(TEXT, Shape::Text),
    optional(TAIL, Shape::Text),
    optional(START_LINE, Shape::Line),
    optional(END_LINE, Shape::Line),
];

const LINE_FIELDS: &[FieldSpec] = &[
    optional(START_LINE, Shape::Line),
    optional(END_LINE, Shape::Line),
];

#[derive(Debug)]
pub(crate) struct Schema {
    pub fields: &'static [FieldSpec],
    /// Comment and line number fields the element also accepts.
    pub extras: &'static [FieldSpec],
}

pub(crate) const ROOT: Schema = Schema {
    fields: &[
        optional("BAREME", Shape::Records),
        optional("CODE", Shape::Records),
        required("code", Shape::Text),
        required("deb", Shape::Text),
        optional("description", Shape::Text),
        required("fin", Shape::Text),
        optional("NODE", Shape::Records),
    ],
    extras: SOURCE_FIELDS,
};

pub(crate) const NODE: Schema = Schema {
    fields: &[
        optional("BAREME", Shape::Records),
        optional("CODE", Shape::Records),
        required("code", Shape::Text),
        optional("description", Shape::Text),
        optional("NODE", Shape::Records),
    ],
    extras: SOURCE_FIELDS,
};

pub(crate) const PARAMETER: Schema = Schema {
    fields: &[
        required("code", Shape::Text),
        optional("description", Shape::Text),
        optional("format", Shape::Text),
        optional("taille", Shape::Text),
        optional("type", Shape::Text),
        required("VALUE", Shape::Records),
    ],
    extras: SOURCE_FIELDS,
};

pub(crate) const SCALE: Schema = Schema {
    fields: &[
        required("code", Shape::Text),
        optional("description", Shape::Text),
        optional("option", Shape::Text),
        required("TRANCHE", Shape::Records),
        optional("type", Shape::Text),
    ],
    extras: SOURCE_FIELDS,
};

pub(crate) const BRACKET: Schema = Schema {
    fields: &[
        optional("ASSIETTE", Shape::Records),
        optional("code", Shape::Text),
        optional("MONTANT", Shape::Records),
        required("SEUIL", Shape::Records),
        optional("TAUX", Shape::Records),
    ],
    extras: SOURCE_FIELDS,
};

pub(crate) const VALUES_HOLDER: Schema = Schema {
    fields: &[required("VALUE", Shape::Records)],
    extras: LINE_FIELDS,
};

pub(crate) const VALUE: Schema = Schema {
    fields: &[
        required("deb", Shape::Text),
        required("fin", Shape::Text),
        required("valeur", Shape::Text),
    ],
    extras: SOURCE_FIELDS,
};

impl Schema {
    fn spec(&self, name: &str) -> Option<FieldSpec> {
        self.fields
            .iter()
            .chain(self.extras)
            .find(|spec| spec.name == name)
            .copied()
    }

    /// Reports unknown, repeated, mistyped and missing fields of `record`.
    pub fn check(&self, record: &Record, path: &FieldPath, report: &mut Report) {
        let mut seen = HashSet::new();
        for (name, value) in record.fields() {
            let slot = path.key(name);
            if !seen.insert(name) {
                report.schema(slot, DUPLICATE_ITEM);
                continue;
            }
            let Some(spec) = self.spec(name) else {
                report.schema(slot, UNEXPECTED_ITEM);
                continue;
            };
            let matches = matches!(
                (spec.shape, value),
                (Shape::Text, FieldValue::Text(_))
                    | (Shape::Line, FieldValue::Line(_))
                    | (Shape::Records, FieldValue::Records(_))
            );
            if !matches {
                report.schema(slot, shape_message(spec.shape));
            }
        }
        for spec in self.fields.iter().filter(|spec| spec.required) {
            if !record.contains(spec.name) {
                report.schema(path.key(spec.name), MISSING_VALUE);
            }
        }
    }
}

fn shape_message(shape: Shape) -> &'static str {
    match shape {
        Shape::Text => "Value must be a string",
        Shape::Line => "Value must be an integer",
        Shape::Records => "Value must be a list of elements",
    }
}

/// Cleaned single-line text of `name`.
///
/// Absence and shape errors are left to [`Schema::check`]; a present but blank value is
/// reported as missing when `mandatory`.
pub(crate) fn line_field(
    record: &Record,
    name: &str,
    mandatory: bool,
    path: &FieldPath,
    report: &mut Report,
) -> Option<String> {
    let raw = record.text(name)?;
    let cleaned = cleanup_line(raw);
    if cleaned.is_none() && mandatory {
        report.schema(path.key(name), MISSING_VALUE);
    }
    cleaned
}

/// Comments and line numbers of `record`.
pub(crate) fn source_info(record: &Record) -> SourceInfo {
    SourceInfo {
        text: record.text(TEXT).and_then(cleanup_text),
        tail: record.text(TAIL).and_then(cleanup_text),
        start_line: record.line(START_LINE),
        end_line: record.line(END_LINE),
    }
}
