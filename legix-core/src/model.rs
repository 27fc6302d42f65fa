//! Validated legislation tree
//!
//! These are the typed records the Schema Validator produces. Each carries exactly the fields
//! its schema declares; nothing unrecognised survives validation. Values keep their cleaned
//! source text: turning it into a typed scalar is the Semantic Transformer's job.
//!
//! Every type can be turned back into a [`Record`], which is what the markup writer consumes.

use crate::record::{FieldValue, Record, END_LINE, START_LINE, TAIL, TEXT};
use chrono::NaiveDate;

/// Declared format of a Parameter's values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ValueFormat {
    Boolean,
    #[default]
    Float,
    Integer,
    Percent,
}

impl ValueFormat {
    pub const ALL: [ValueFormat; 4] = [
        ValueFormat::Boolean,
        ValueFormat::Float,
        ValueFormat::Integer,
        ValueFormat::Percent,
    ];

    /// Spelling used by the `format` attribute.
    pub fn xml_name(self) -> &'static str {
        match self {
            ValueFormat::Boolean => "bool",
            ValueFormat::Float => "float",
            ValueFormat::Integer => "integer",
            ValueFormat::Percent => "percent",
        }
    }

    /// Spelling used in the normalized document.
    pub fn json_name(self) -> &'static str {
        match self {
            ValueFormat::Boolean => "boolean",
            ValueFormat::Float => "float",
            ValueFormat::Integer => "integer",
            ValueFormat::Percent => "rate",
        }
    }

    pub fn from_xml_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|format| format.xml_name() == name)
    }
}

/// Scale `option` attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScaleOption {
    Contrib,
    MainDOeuvre,
    Noncontrib,
}

impl ScaleOption {
    pub const ALL: [ScaleOption; 3] = [
        ScaleOption::Contrib,
        ScaleOption::MainDOeuvre,
        ScaleOption::Noncontrib,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ScaleOption::Contrib => "contrib",
            ScaleOption::MainDOeuvre => "main-d-oeuvre",
            ScaleOption::Noncontrib => "noncontrib",
        }
    }

    pub fn parse(slug: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|option| option.as_str() == slug)
    }
}

/// Parameter `taille` attribute (company size bracket).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Taille {
    MoinsDe20,
    PlusDe20,
}

impl Taille {
    pub fn as_str(self) -> &'static str {
        match self {
            Taille::MoinsDe20 => "moinsde20",
            Taille::PlusDe20 => "plusde20",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        [Taille::MoinsDe20, Taille::PlusDe20]
            .into_iter()
            .find(|taille| taille.as_str() == raw)
    }
}

/// Unit named by a `type` attribute, mapped through the synonym table when known.
pub fn unit_for_type(raw_type: &str) -> &str {
    match raw_type {
        "age" => "year",
        "days" => "day",
        "hours" => "hour",
        "monetary" => "currency",
        "months" => "month",
        other => other,
    }
}

/// Comment text and source lines carried by every element.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SourceInfo {
    pub text: Option<String>,
    pub tail: Option<String>,
    pub start_line: Option<u32>,
    pub end_line: Option<u32>,
}

impl SourceInfo {
    /// Comments joined by a blank line, in document order.
    pub fn comment(&self) -> Option<String> {
        let parts: Vec<&str> = [self.text.as_deref(), self.tail.as_deref()]
            .into_iter()
            .flatten()
            .collect();
        (!parts.is_empty()).then(|| parts.join("\n\n"))
    }

    fn open_record(&self) -> Record {
        let mut record = Record::new();
        if let Some(text) = &self.text {
            record.set_text(TEXT, text.clone());
        }
        if let Some(line) = self.start_line {
            record.set(START_LINE, FieldValue::Line(line));
        }
        if let Some(line) = self.end_line {
            record.set(END_LINE, FieldValue::Line(line));
        }
        record
    }

    fn close_record(&self, record: &mut Record) {
        if let Some(tail) = &self.tail {
            record.set_text(TAIL, tail.clone());
        }
    }
}

/// The root of a validated document: a Node plus the overall validity window.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedLegislation {
    pub start: NaiveDate,
    pub stop: NaiveDate,
    pub root: ValidatedNode,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedNode {
    pub code: String,
    pub description: Option<String>,
    pub nodes: Vec<ValidatedNode>,
    pub scales: Vec<ValidatedScale>,
    pub parameters: Vec<ValidatedParameter>,
    pub source: SourceInfo,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedParameter {
    pub code: String,
    pub description: Option<String>,
    /// Declared format; `None` means the default float format.
    pub format: Option<ValueFormat>,
    pub taille: Option<Taille>,
    /// Slug of the `type` attribute.
    pub unit_type: Option<String>,
    /// Sorted by descending start date.
    pub values: Vec<ValidatedValue>,
    pub source: SourceInfo,
}

impl ValidatedParameter {
    pub fn effective_format(&self) -> ValueFormat {
        self.format.unwrap_or_default()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedScale {
    pub code: String,
    pub description: Option<String>,
    pub option: Option<ScaleOption>,
    /// Slug of the `type` attribute; only `monetary` is accepted.
    pub unit_type: Option<String>,
    pub brackets: Vec<ValidatedBracket>,
    pub source: SourceInfo,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedBracket {
    pub code: Option<String>,
    pub base: Option<ValidatedValuesHolder>,
    pub amount: Option<ValidatedValuesHolder>,
    pub threshold: ValidatedValuesHolder,
    pub rate: Option<ValidatedValuesHolder>,
    pub source: SourceInfo,
}

/// The four dated fields of a bracket.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BracketField {
    Base,
    Amount,
    Threshold,
    Rate,
}

impl BracketField {
    /// Document order of the fields, also the order checks run in.
    pub const ALL: [BracketField; 4] = [
        BracketField::Base,
        BracketField::Amount,
        BracketField::Threshold,
        BracketField::Rate,
    ];

    pub fn tag(self) -> &'static str {
        match self {
            BracketField::Base => "ASSIETTE",
            BracketField::Amount => "MONTANT",
            BracketField::Threshold => "SEUIL",
            BracketField::Rate => "TAUX",
        }
    }

    pub fn json_name(self) -> &'static str {
        match self {
            BracketField::Base => "base",
            BracketField::Amount => "amount",
            BracketField::Threshold => "threshold",
            BracketField::Rate => "rate",
        }
    }
}

impl ValidatedBracket {
    pub fn field(&self, field: BracketField) -> Option<&ValidatedValuesHolder> {
        match field {
            BracketField::Base => self.base.as_ref(),
            BracketField::Amount => self.amount.as_ref(),
            BracketField::Threshold => Some(&self.threshold),
            BracketField::Rate => self.rate.as_ref(),
        }
    }

    /// Values of `field`, empty when the field is absent.
    pub fn values(&self, field: BracketField) -> &[ValidatedValue] {
        self.field(field)
            .map(|holder| holder.values.as_slice())
            .unwrap_or(&[])
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedValuesHolder {
    /// Sorted by descending start date.
    pub values: Vec<ValidatedValue>,
    pub start_line: Option<u32>,
    pub end_line: Option<u32>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedValue {
    pub start: NaiveDate,
    pub stop: NaiveDate,
    /// Cleaned source text, already checked against the owning format.
    pub value: String,
    pub source: SourceInfo,
}

fn date_text(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

impl ValidatedLegislation {
    pub fn to_record(&self) -> Record {
        let mut record = self.root.source.open_record();
        record.set_text("deb", date_text(self.start));
        record.set_text("fin", date_text(self.stop));
        self.root.fill_record(&mut record);
        record
    }
}

impl ValidatedNode {
    pub fn to_record(&self) -> Record {
        let mut record = self.source.open_record();
        self.fill_record(&mut record);
        record
    }

    fn fill_record(&self, record: &mut Record) {
        record.set_text("code", self.code.clone());
        if let Some(description) = &self.description {
            record.set_text("description", description.clone());
        }
        for node in &self.nodes {
            record.push_child("NODE", node.to_record());
        }
        for scale in &self.scales {
            record.push_child("BAREME", scale.to_record());
        }
        for parameter in &self.parameters {
            record.push_child("CODE", parameter.to_record());
        }
        self.source.close_record(record);
    }

    /// Number of Nodes, Scales and Parameters in this subtree, this node included.
    pub fn element_count(&self) -> usize {
        1 + self.scales.len()
            + self.parameters.len()
            + self.nodes.iter().map(ValidatedNode::element_count).sum::<usize>()
    }
}

impl ValidatedParameter {
    pub fn to_record(&self) -> Record {
        let mut record = self.source.open_record();
        record.set_text("code", self.code.clone());
        if let Some(description) = &self.description {
            record.set_text("description", description.clone());
        }
        if let Some(format) = self.format {
            record.set_text("format", format.xml_name());
        }
        if let Some(taille) = self.taille {
            record.set_text("taille", taille.as_str());
        }
        if let Some(unit_type) = &self.unit_type {
            record.set_text("type", unit_type.clone());
        }
        for value in &self.values {
            record.push_child("VALUE", value.to_record());
        }
        self.source.close_record(&mut record);
        record
    }
}

impl ValidatedScale {
    pub fn to_record(&self) -> Record {
        let mut record = self.source.open_record();
        record.set_text("code", self.code.clone());
        if let Some(description) = &self.description {
            record.set_text("description", description.clone());
        }
        if let Some(option) = self.option {
            record.set_text("option", option.as_str());
        }
        if let Some(unit_type) = &self.unit_type {
            record.set_text("type", unit_type.clone());
        }
        for bracket in &self.brackets {
            record.push_child("TRANCHE", bracket.to_record());
        }
        self.source.close_record(&mut record);
        record
    }
}

impl ValidatedBracket {
    pub fn to_record(&self) -> Record {
        let mut record = self.source.open_record();
        if let Some(code) = &self.code {
            record.set_text("code", code.clone());
        }
        for field in BracketField::ALL {
            if let Some(holder) = self.field(field) {
                record.push_child(field.tag(), holder.to_record());
            }
        }
        self.source.close_record(&mut record);
        record
    }
}

impl ValidatedValuesHolder {
    pub fn to_record(&self) -> Record {
        let mut record = Record::new();
        if let Some(line) = self.start_line {
            record.set(START_LINE, FieldValue::Line(line));
        }
        if let Some(line) = self.end_line {
            record.set(END_LINE, FieldValue::Line(line));
        }
        for value in &self.values {
            record.push_child("VALUE", value.to_record());
        }
        record
    }
}

impl ValidatedValue {
    pub fn to_record(&self) -> Record {
        let mut record = self.source.open_record();
        record.set_text("deb", date_text(self.start));
        record.set_text("fin", date_text(self.stop));
        record.set_text("valeur", self.value.clone());
        self.source.close_record(&mut record);
        record
    }
}
