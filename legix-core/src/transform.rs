//! Semantic Transformer: [`ValidatedLegislation`] → [`LegislationDocument`]
//!
//! Renames tag-derived fields to their semantic names, merges comments, maps `format` and
//! `type` through their synonym tables and reads every value as a typed scalar.
//!
//! Input is assumed validated. A value that cannot be read in its declared format means the
//! validator let something through it should not have, and is reported as
//! [`LegixError::Internal`].

use crate::document::{
    BracketDocument, Element, LegislationDocument, NodeDocument, ParameterDocument, Scalar,
    ScaleDocument, SourceDocument, ValueDocument,
};
use crate::error::LegixError;
use crate::model::{
    unit_for_type, BracketField, SourceInfo, ValidatedBracket, ValidatedLegislation, ValidatedNode,
    ValidatedParameter, ValidatedScale, ValidatedValue, ValueFormat,
};
use crate::validate::conv::{to_float, to_strict_int};
use std::collections::BTreeMap;

/// Default `@context` of the root element.
pub const DEFAULT_CONTEXT: &str = "http://openfisca.fr/contexts/legislation.jsonld";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransformOptions {
    /// Value of the root `@context` key, omitted when `None`.
    pub context: Option<String>,
    /// Keep `start_line`/`end_line` on every element.
    pub include_line_numbers: bool,
}

impl Default for TransformOptions {
    fn default() -> Self {
        TransformOptions {
            context: Some(DEFAULT_CONTEXT.to_string()),
            include_line_numbers: true,
        }
    }
}

/// Transforms a validated tree into the normalized document.
pub fn transform(
    legislation: &ValidatedLegislation,
    options: &TransformOptions,
) -> Result<LegislationDocument, LegixError> {
    let transformer = Transformer { options };
    let root = transformer.node(&legislation.root)?;
    tracing::debug!(
        elements = legislation.root.element_count(),
        "transformed document"
    );
    Ok(LegislationDocument::new(
        options.context.clone(),
        legislation.start,
        legislation.stop,
        root,
    ))
}

struct Transformer<'a> {
    options: &'a TransformOptions,
}

impl Transformer<'_> {
    fn node(&self, node: &ValidatedNode) -> Result<NodeDocument, LegixError> {
        let mut children = BTreeMap::new();
        for child in &node.nodes {
            children.insert(child.code.clone(), Element::Node(self.node(child)?));
        }
        for scale in &node.scales {
            children.insert(scale.code.clone(), Element::Scale(self.scale(scale)?));
        }
        for parameter in &node.parameters {
            children.insert(
                parameter.code.clone(),
                Element::Parameter(self.parameter(parameter)?),
            );
        }
        Ok(NodeDocument {
            description: node.description.clone(),
            children,
            source: self.source(&node.source),
        })
    }

    fn parameter(&self, parameter: &ValidatedParameter) -> Result<ParameterDocument, LegixError> {
        let format = parameter.effective_format();
        Ok(ParameterDocument {
            description: parameter.description.clone(),
            format: format.json_name(),
            unit: parameter
                .unit_type
                .as_deref()
                .map(|unit_type| unit_for_type(unit_type).to_string()),
            values: self.values(&parameter.values, format)?,
            source: self.source(&parameter.source),
        })
    }

    fn scale(&self, scale: &ValidatedScale) -> Result<ScaleDocument, LegixError> {
        let brackets = scale
            .brackets
            .iter()
            .map(|bracket| self.bracket(bracket))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(ScaleDocument {
            description: scale.description.clone(),
            option: scale.option.map(|option| option.as_str()),
            unit: scale
                .unit_type
                .as_deref()
                .map(|unit_type| unit_for_type(unit_type).to_string()),
            brackets,
            source: self.source(&scale.source),
        })
    }

    fn bracket(&self, bracket: &ValidatedBracket) -> Result<BracketDocument, LegixError> {
        let field = |field: BracketField| -> Result<Option<Vec<ValueDocument>>, LegixError> {
            bracket
                .field(field)
                .map(|holder| self.values(&holder.values, ValueFormat::Float))
                .transpose()
        };
        Ok(BracketDocument {
            threshold: self.values(&bracket.threshold.values, ValueFormat::Float)?,
            amount: field(BracketField::Amount)?,
            rate: field(BracketField::Rate)?,
            base: field(BracketField::Base)?,
            source: self.source(&bracket.source),
        })
    }

    fn values(
        &self,
        values: &[ValidatedValue],
        format: ValueFormat,
    ) -> Result<Vec<ValueDocument>, LegixError> {
        values
            .iter()
            .map(|value| {
                Ok(ValueDocument {
                    start: value.start,
                    stop: value.stop,
                    value: scalar(&value.value, format)?,
                    source: self.source(&value.source),
                })
            })
            .collect()
    }

    fn source(&self, source: &SourceInfo) -> SourceDocument {
        let keep_lines = self.options.include_line_numbers;
        SourceDocument {
            comment: source.comment(),
            start_line: source.start_line.filter(|_| keep_lines),
            end_line: source.end_line.filter(|_| keep_lines),
        }
    }
}

/// Reads the cleaned text of a value in `format`.
pub fn scalar(raw: &str, format: ValueFormat) -> Result<Scalar, LegixError> {
    let scalar = match format {
        ValueFormat::Boolean => match raw {
            "0" => Some(Scalar::Boolean(false)),
            "1" => Some(Scalar::Boolean(true)),
            _ => None,
        },
        ValueFormat::Integer => to_strict_int(raw).ok().map(Scalar::Integer),
        ValueFormat::Float | ValueFormat::Percent => to_float(raw).ok().map(Scalar::Float),
    };
    scalar.ok_or_else(|| {
        tracing::error!(value = raw, format = format.json_name(), "unreadable validated value");
        LegixError::Internal(format!(
            "value {raw:?} is not a valid {}",
            format.json_name()
        ))
    })
}
