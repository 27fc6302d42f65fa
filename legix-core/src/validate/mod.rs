//! Schema Validator
//!
//!     Walks a flattened [`Record`] tree and turns it into the typed tree of [`crate::model`],
//!     or into a [`Report`] listing everything wrong with it.
//!
//!     Every element kind has one validator here. Each of them:
//!         - checks the record against its declared [`schema::Schema`] (closure, presence, shape)
//!         - coerces its own fields through the helpers in [`conv`]
//!         - recurses into its child groups, at `path/<TAG>/<index>`
//!         - returns `Some` only when nothing was added to the report while validating it
//!
//!     That last point is what lets a container decide whether its post-checks make sense:
//!     a Node only looks for duplicate codes when its children are valid, a Scale only runs the
//!     [`intervals`] checks when all its brackets are.
//!
//!     Values need the format of the Parameter owning them. It is passed down explicitly; values
//!     held by bracket fields use the default float format.

pub(crate) mod conv;
pub mod intervals;
pub(crate) mod schema;

use crate::diagnostics::{FieldPath, Report};
use crate::model::{
    BracketField, ScaleOption, Taille, ValidatedBracket, ValidatedLegislation, ValidatedNode,
    ValidatedParameter, ValidatedScale, ValidatedValue, ValidatedValuesHolder, ValueFormat,
};
use crate::record::{Record, END_LINE, START_LINE};
use chrono::NaiveDate;
use conv::{check_value_text, input_to_slug, iso8601_to_date, test_in, MISSING_VALUE};
use intervals::Continuity;
use schema::{line_field, source_info};
use std::collections::HashSet;

pub const DUPLICATE_VALUE: &str = "Duplicate value";
pub const EMPTY_NODE: &str =
    "At least one of the following items must be present: \"BAREME\", \"CODE\", \"NODE\"";
pub const NOT_SINGLETON: &str = "List must contain one and only one item";
pub const AMOUNT_XOR_RATE: &str = "Either MONTANT or TAUX must be provided";

const NODE_GROUPS: [&str; 3] = ["BAREME", "CODE", "NODE"];
const SCALE_TYPES: &[&str] = &["monetary"];

/// Validates the flattened root record of a document.
///
/// The root is a Node that additionally carries the `deb`/`fin` validity window of the whole
/// document. Either everything validates, or the complete report is returned.
pub fn validate(record: &Record) -> Result<ValidatedLegislation, Report> {
    let path = FieldPath::root();
    let mut report = Report::new();

    schema::ROOT.check(record, &path, &mut report);
    let start = date_field(record, "deb", &path, &mut report);
    let stop = date_field(record, "fin", &path, &mut report);
    let root = node_body(record, &path, &mut report, 0);

    tracing::debug!(violations = report.len(), "validated document");
    match (start, stop, root) {
        (Some(start), Some(stop), Some(root)) if report.is_empty() => {
            Ok(ValidatedLegislation { start, stop, root })
        }
        _ => Err(report),
    }
}

fn validate_node(record: &Record, path: &FieldPath, report: &mut Report) -> Option<ValidatedNode> {
    let before = report.len();
    schema::NODE.check(record, path, report);
    node_body(record, path, report, before)
}

/// Node fields and children, shared by the root and nested Nodes.
///
/// `before` is the report length when validation of this node started.
fn node_body(
    record: &Record,
    path: &FieldPath,
    report: &mut Report,
    before: usize,
) -> Option<ValidatedNode> {
    let code = line_field(record, "code", true, path, report);
    let description = line_field(record, "description", false, path, report);
    let scales = validate_group(record, "BAREME", path, report, validate_scale);
    let parameters = validate_group(record, "CODE", path, report, validate_parameter);
    let nodes = validate_group(record, "NODE", path, report, validate_node);
    if report.len() != before {
        return None;
    }
    let (code, scales, parameters, nodes) = (code?, scales?, parameters?, nodes?);

    if scales.is_empty() && parameters.is_empty() && nodes.is_empty() {
        for group in NODE_GROUPS {
            report.schema(path.key(group), EMPTY_NODE);
        }
        return None;
    }

    let codes = [
        ("BAREME", scales.iter().map(|scale| scale.code.as_str()).collect::<Vec<_>>()),
        ("CODE", parameters.iter().map(|parameter| parameter.code.as_str()).collect()),
        ("NODE", nodes.iter().map(|node| node.code.as_str()).collect()),
    ];
    let mut seen = HashSet::new();
    for (group, group_codes) in &codes {
        for (index, child_code) in group_codes.iter().enumerate() {
            if !seen.insert(*child_code) {
                report.schema(path.key(group).index(index).key("code"), DUPLICATE_VALUE);
            }
        }
    }
    if report.len() != before {
        return None;
    }

    tracing::trace!(code = %code, children = codes.iter().map(|(_, c)| c.len()).sum::<usize>(), "node");
    Some(ValidatedNode {
        code,
        description,
        nodes,
        scales,
        parameters,
        source: source_info(record),
    })
}

fn validate_parameter(
    record: &Record,
    path: &FieldPath,
    report: &mut Report,
) -> Option<ValidatedParameter> {
    let before = report.len();
    schema::PARAMETER.check(record, path, report);
    let code = line_field(record, "code", true, path, report);
    let description = line_field(record, "description", false, path, report);

    let format = slug_field(record, "format").and_then(|slug| {
        let format = ValueFormat::from_xml_name(&slug);
        if format.is_none() {
            let allowed = ValueFormat::ALL.map(ValueFormat::xml_name);
            reject(&slug, &allowed, path.key("format"), report);
        }
        format
    });
    let taille = slug_field(record, "taille").and_then(|slug| {
        let taille = Taille::parse(&slug);
        if taille.is_none() {
            let allowed = [Taille::MoinsDe20.as_str(), Taille::PlusDe20.as_str()];
            reject(&slug, &allowed, path.key("taille"), report);
        }
        taille
    });
    let unit_type = slug_field(record, "type");

    let values = validate_values(
        record,
        path,
        report,
        format.unwrap_or_default(),
        Continuity::Consecutive,
    );
    if report.len() != before {
        return None;
    }

    let code = code?;
    tracing::trace!(code = %code, values = values.as_ref().map_or(0, Vec::len), "parameter");
    Some(ValidatedParameter {
        code,
        description,
        format,
        taille,
        unit_type,
        values: values?,
        source: source_info(record),
    })
}

fn validate_scale(record: &Record, path: &FieldPath, report: &mut Report) -> Option<ValidatedScale> {
    let before = report.len();
    schema::SCALE.check(record, path, report);
    let code = line_field(record, "code", true, path, report);
    let description = line_field(record, "description", false, path, report);

    let option = slug_field(record, "option").and_then(|slug| {
        let option = ScaleOption::parse(&slug);
        if option.is_none() {
            let allowed = ScaleOption::ALL.map(ScaleOption::as_str);
            reject(&slug, &allowed, path.key("option"), report);
        }
        option
    });
    let unit_type = slug_field(record, "type").filter(|slug| {
        let accepted = SCALE_TYPES.contains(&slug.as_str());
        if !accepted {
            reject(slug, SCALE_TYPES, path.key("type"), report);
        }
        accepted
    });

    let brackets = validate_group(record, "TRANCHE", path, report, validate_bracket);
    if report.len() != before {
        return None;
    }
    let (code, brackets) = (code?, brackets?);
    if brackets.is_empty() {
        report.schema(path.key("TRANCHE"), MISSING_VALUE);
        return None;
    }

    let bracket_path = |index: usize, field: BracketField| {
        path.key("TRANCHE").index(index).key(field.tag())
    };
    let mixed = intervals::check_homogeneity(&brackets);
    if !mixed.is_empty() {
        for violation in mixed {
            report.schema(bracket_path(violation.bracket, violation.field), violation.message);
        }
        return None;
    }
    let escaping = intervals::check_containment(&brackets);
    if !escaping.is_empty() {
        for violation in escaping {
            let slot = bracket_path(violation.bracket, violation.field)
                .index(0)
                .key("VALUE")
                .index(violation.value)
                .key("deb");
            report.temporal(slot, violation.message);
        }
        return None;
    }

    tracing::trace!(code = %code, brackets = brackets.len(), "scale");
    Some(ValidatedScale {
        code,
        description,
        option,
        unit_type,
        brackets,
        source: source_info(record),
    })
}

fn validate_bracket(
    record: &Record,
    path: &FieldPath,
    report: &mut Report,
) -> Option<ValidatedBracket> {
    let before = report.len();
    schema::BRACKET.check(record, path, report);
    let code = line_field(record, "code", false, path, report);
    let base = holder_field(record, BracketField::Base, path, report);
    let amount = holder_field(record, BracketField::Amount, path, report);
    let threshold = holder_field(record, BracketField::Threshold, path, report);
    let rate = holder_field(record, BracketField::Rate, path, report);
    if report.len() != before {
        return None;
    }

    if amount.is_some() == rate.is_some() {
        report.schema(path.clone(), AMOUNT_XOR_RATE);
        return None;
    }

    Some(ValidatedBracket {
        code,
        base,
        amount,
        threshold: threshold?,
        rate,
        source: source_info(record),
    })
}

/// The single values holder of a bracket field, when the field is present.
fn holder_field(
    record: &Record,
    field: BracketField,
    path: &FieldPath,
    report: &mut Report,
) -> Option<ValidatedValuesHolder> {
    let holders = record.records(field.tag())?;
    let field_path = path.key(field.tag());
    match holders {
        [holder] => validate_values_holder(holder, &field_path.index(0), report),
        _ => {
            report.schema(field_path, NOT_SINGLETON);
            None
        }
    }
}

fn validate_values_holder(
    record: &Record,
    path: &FieldPath,
    report: &mut Report,
) -> Option<ValidatedValuesHolder> {
    let before = report.len();
    schema::VALUES_HOLDER.check(record, path, report);
    let values = validate_values(
        record,
        path,
        report,
        ValueFormat::default(),
        Continuity::GapsAllowed,
    );
    if report.len() != before {
        return None;
    }
    Some(ValidatedValuesHolder {
        values: values?,
        start_line: record.line(START_LINE),
        end_line: record.line(END_LINE),
    })
}

/// Validates the `VALUE` group of `record`, then its date spans.
///
/// The returned values are sorted by descending start date.
fn validate_values(
    record: &Record,
    path: &FieldPath,
    report: &mut Report,
    format: ValueFormat,
    continuity: Continuity,
) -> Option<Vec<ValidatedValue>> {
    let values = validate_group(record, "VALUE", path, report, |item, item_path, report| {
        validate_value(item, item_path, report, format)
    })?;
    if values.is_empty() {
        if matches!(record.records("VALUE"), Some([])) {
            report.schema(path.key("VALUE"), MISSING_VALUE);
        }
        return None;
    }

    let (sorted, violations) = intervals::check_sequence(values, continuity);
    if violations.is_empty() {
        return Some(sorted);
    }
    for violation in violations {
        let slot = path
            .key("VALUE")
            .index(violation.index)
            .key(violation.field.xml_name());
        report.temporal(slot, violation.message);
    }
    None
}

fn validate_value(
    record: &Record,
    path: &FieldPath,
    report: &mut Report,
    format: ValueFormat,
) -> Option<ValidatedValue> {
    let before = report.len();
    schema::VALUE.check(record, path, report);
    let start = date_field(record, "deb", path, report);
    let stop = date_field(record, "fin", path, report);
    let value = record
        .text("valeur")
        .and_then(|raw| match check_value_text(raw, format) {
            Ok(value) => Some(value),
            Err(message) => {
                report.schema(path.key("valeur"), message);
                None
            }
        });
    if report.len() != before {
        return None;
    }
    Some(ValidatedValue {
        start: start?,
        stop: stop?,
        value: value?,
        source: source_info(record),
    })
}

/// Validates every item of the `tag` group, each at `path/<tag>/<index>`.
///
/// An absent group is an empty one. Returns `None` as soon as one item failed, after all of
/// them have been validated.
fn validate_group<T>(
    record: &Record,
    tag: &str,
    path: &FieldPath,
    report: &mut Report,
    mut validate_item: impl FnMut(&Record, &FieldPath, &mut Report) -> Option<T>,
) -> Option<Vec<T>> {
    let Some(items) = record.records(tag) else {
        return Some(Vec::new());
    };
    let group_path = path.key(tag);
    let mut validated = Vec::with_capacity(items.len());
    let mut clean = true;
    for (index, item) in items.iter().enumerate() {
        match validate_item(item, &group_path.index(index), report) {
            Some(value) => validated.push(value),
            None => clean = false,
        }
    }
    clean.then_some(validated)
}

fn date_field(
    record: &Record,
    name: &str,
    path: &FieldPath,
    report: &mut Report,
) -> Option<NaiveDate> {
    let raw = line_field(record, name, true, path, report)?;
    match iso8601_to_date(&raw) {
        Ok(date) => Some(date),
        Err(message) => {
            report.schema(path.key(name), message);
            None
        }
    }
}

/// Slug of an enum-valued attribute; blank values count as absent.
fn slug_field(record: &Record, name: &str) -> Option<String> {
    record.text(name).and_then(input_to_slug)
}

fn reject(slug: &str, allowed: &[&str], slot: FieldPath, report: &mut Report) {
    if let Err(message) = test_in(slug, allowed) {
        report.schema(slot, message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flatten::flatten;
    use crate::markup::read;

    fn record(source: &str) -> Record {
        flatten(&read(source).unwrap()).1
    }

    fn violations(source: &str) -> Vec<String> {
        let report = validate(&record(source)).unwrap_err();
        report.violations().iter().map(ToString::to_string).collect()
    }

    fn document(body: &str) -> String {
        format!(r#"<NODE code="root" deb="2000-01-01" fin="2020-12-31">{body}</NODE>"#)
    }

    const PARAMETER: &str = r#"<CODE code="p"><VALUE deb="2015-01-01" fin="2015-12-31" valeur="12.5"/></CODE>"#;

    #[test]
    fn minimal_document_validates() {
        let legislation = validate(&record(&document(PARAMETER))).unwrap();
        assert_eq!(legislation.root.code, "root");
        let parameter = &legislation.root.parameters[0];
        assert_eq!(parameter.code, "p");
        assert_eq!(parameter.format, None);
        assert_eq!(parameter.values[0].value, "12.5");
    }

    #[test]
    fn empty_node_is_reported_on_every_group() {
        assert_eq!(
            violations(&document(r#"<NODE code="empty"/>"#)),
            vec![
                format!("NODE/0/BAREME: {EMPTY_NODE}"),
                format!("NODE/0/CODE: {EMPTY_NODE}"),
                format!("NODE/0/NODE: {EMPTY_NODE}"),
            ]
        );
    }

    #[test]
    fn duplicate_code_is_reported_once_on_the_later_item() {
        let body = format!("{PARAMETER}{PARAMETER}");
        assert_eq!(
            violations(&document(&body)),
            vec!["CODE/1/code: Duplicate value"]
        );
    }

    #[test]
    fn duplicate_codes_across_groups() {
        let body = format!(r#"{PARAMETER}<NODE code="p">{PARAMETER}</NODE>"#);
        assert_eq!(
            violations(&document(&body)),
            vec!["NODE/0/code: Duplicate value"]
        );
    }

    #[test]
    fn errors_accumulate_across_fields() {
        let body = r#"<CODE code="p" format="weird" colour="red"><VALUE deb="2015-13-01" fin="2015-12-31" valeur="abc"/></CODE>"#;
        assert_eq!(
            violations(&document(body)),
            vec![
                "CODE/0/colour: Unexpected item",
                "CODE/0/format: Value must be one of: bool, float, integer, percent",
                "CODE/0/VALUE/0/deb: Value must be a date in ISO 8601 format",
                "CODE/0/VALUE/0/valeur: Value must be a float",
            ]
        );
    }

    #[test]
    fn parameter_format_drives_value_coercion() {
        let body = r#"<CODE code="p" format="bool"><VALUE deb="2015-01-01" fin="2015-12-31" valeur="2"/></CODE>"#;
        assert_eq!(
            violations(&document(body)),
            vec!["CODE/0/VALUE/0/valeur: Value must be one of: 0, 1"]
        );
    }

    #[test]
    fn parameter_values_must_be_consecutive() {
        let body = r#"<CODE code="p">
            <VALUE deb="2014-01-01" fin="2014-12-31" valeur="1"/>
            <VALUE deb="2016-01-01" fin="2016-12-31" valeur="2"/>
        </CODE>"#;
        assert_eq!(
            violations(&document(body)),
            vec!["CODE/0/VALUE/0/deb: Dates of values are not consecutive"]
        );
    }

    #[test]
    fn values_come_back_sorted() {
        let body = r#"<CODE code="p">
            <VALUE deb="2014-01-01" fin="2014-12-31" valeur="1"/>
            <VALUE deb="2015-01-01" fin="2015-12-31" valeur="2"/>
        </CODE>"#;
        let legislation = validate(&record(&document(body))).unwrap();
        let values = &legislation.root.parameters[0].values;
        assert_eq!(values[0].value, "2");
        assert_eq!(values[1].value, "1");
    }

    #[test]
    fn bracket_needs_amount_or_rate() {
        let body = r#"<BAREME code="s"><TRANCHE>
            <SEUIL><VALUE deb="2015-01-01" fin="2015-12-31" valeur="0"/></SEUIL>
            <MONTANT><VALUE deb="2015-01-01" fin="2015-12-31" valeur="10"/></MONTANT>
            <TAUX><VALUE deb="2015-01-01" fin="2015-12-31" valeur="0.1"/></TAUX>
        </TRANCHE></BAREME>"#;
        assert_eq!(
            violations(&document(body)),
            vec![format!("BAREME/0/TRANCHE/0: {AMOUNT_XOR_RATE}")]
        );
    }

    #[test]
    fn bracket_fields_hold_exactly_one_holder() {
        let body = r#"<BAREME code="s"><TRANCHE>
            <SEUIL><VALUE deb="2015-01-01" fin="2015-12-31" valeur="0"/></SEUIL>
            <TAUX><VALUE deb="2015-01-01" fin="2015-12-31" valeur="0.1"/></TAUX>
            <TAUX><VALUE deb="2016-01-01" fin="2016-12-31" valeur="0.2"/></TAUX>
        </TRANCHE></BAREME>"#;
        assert_eq!(
            violations(&document(body)),
            vec![format!("BAREME/0/TRANCHE/0/TAUX: {NOT_SINGLETON}")]
        );
    }

    #[test]
    fn scale_enums_are_slugged_and_checked() {
        let body = r#"<BAREME code="s" option="Main d'oeuvre" type="age"><TRANCHE>
            <SEUIL><VALUE deb="2015-01-01" fin="2015-12-31" valeur="0"/></SEUIL>
            <TAUX><VALUE deb="2015-01-01" fin="2015-12-31" valeur="0.1"/></TAUX>
        </TRANCHE></BAREME>"#;
        assert_eq!(
            violations(&document(body)),
            vec!["BAREME/0/type: Value must be one of: monetary"]
        );
    }

    #[test]
    fn root_window_is_required() {
        assert_eq!(
            violations(&format!(r#"<NODE code="root">{PARAMETER}</NODE>"#)),
            vec!["deb: Missing value", "fin: Missing value"]
        );
    }
}
