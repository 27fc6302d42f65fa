//! Documents that must not reach the transformer.

use crate::common::{fixture, fixture_record};
use legix_core::{
    parse_record, validate, xml_to_json, LegixError, TransformOptions, ViolationKind,
};
use serde_json::json;

fn report_list(name: &str) -> String {
    match xml_to_json(&fixture(name), &TransformOptions::default()) {
        Err(LegixError::Validation(report)) => report.to_list(),
        Err(other) => panic!("expected violations in {name}, got {other}"),
        Ok(_) => panic!("expected violations in {name}, document was accepted"),
    }
}

#[test]
fn test_amount_and_rate_together() {
    insta::assert_snapshot!(
        report_list("amount_and_rate.xml"),
        @"BAREME/0/TRANCHE/0: Either MONTANT or TAUX must be provided"
    );
}

#[test]
fn test_mixed_scale() {
    insta::assert_snapshot!(report_list("mixed_scale.xml"), @r"
    BAREME/0/TRANCHE/1/ASSIETTE: A scale can't contain both MONTANT and ASSIETTE
    BAREME/0/TRANCHE/1/TAUX: A scale can't contain both MONTANT and TAUX
    ");
}

#[test]
fn test_duplicate_code() {
    insta::assert_snapshot!(
        report_list("duplicate_code.xml"),
        @"CODE/1/code: Duplicate value"
    );
}

#[test]
fn test_bracket_outside_previous_bracket() {
    let report = validate(&fixture_record("containment.xml")).unwrap_err();
    assert_eq!(report.len(), 1);
    assert_eq!(report.violations()[0].kind, ViolationKind::Temporal);
    assert_eq!(
        report.to_tree(),
        json!({"BAREME": {"0": {"TRANCHE": {"1": {"SEUIL": {"0": {"VALUE": {"0": {
            "deb": "Dates don't belong to valid dates of previous bracket"
        }}}}}}}}})
    );
}

#[test]
fn test_fields_outside_their_governing_fields() {
    insta::assert_snapshot!(report_list("field_containment.xml"), @r"
    BAREME/0/TRANCHE/1/ASSIETTE/0/VALUE/0/deb: Dates don't belong to TAUX dates
    BAREME/0/TRANCHE/1/TAUX/0/VALUE/0/deb: Dates don't belong to SEUIL dates
    ");
}

fn scale(brackets: &str) -> String {
    format!(
        r#"<NODE code="root" deb="2000-01-01" fin="2003-12-31">
  <BAREME code="scale">{brackets}</BAREME>
</NODE>"#
    )
}

fn rate_bracket(threshold: (&str, &str), rate: (&str, &str)) -> String {
    format!(
        r#"<TRANCHE>
      <SEUIL><VALUE deb="{}" fin="{}" valeur="0"/></SEUIL>
      <TAUX><VALUE deb="{}" fin="{}" valeur="0.1"/></TAUX>
    </TRANCHE>"#,
        threshold.0, threshold.1, rate.0, rate.1
    )
}

#[test]
fn test_threshold_outside_rate() {
    let source = scale(&format!(
        "{}{}",
        rate_bracket(("2000-01-01", "2003-12-31"), ("2000-01-01", "2003-12-31")),
        rate_bracket(("2000-01-01", "2003-12-31"), ("2001-01-01", "2003-12-31")),
    ));
    let report = validate(&parse_record(&source).unwrap()).unwrap_err();
    insta::assert_snapshot!(
        report.to_list(),
        @"BAREME/0/TRANCHE/1/SEUIL/0/VALUE/0/deb: Dates don't belong to TAUX or MONTANT dates"
    );
}

#[test]
fn test_first_bracket_may_outlive_its_threshold() {
    let source = scale(&rate_bracket(
        ("2002-01-01", "2003-12-31"),
        ("2000-01-01", "2003-12-31"),
    ));
    assert!(validate(&parse_record(&source).unwrap()).is_ok());
}

#[test]
fn test_previous_bracket_failure_is_reported_alone() {
    let source = scale(&format!(
        "{}{}",
        rate_bracket(("2000-01-01", "2000-12-31"), ("2000-01-01", "2003-12-31")),
        rate_bracket(("2001-01-01", "2001-12-31"), ("2000-01-01", "2003-12-31")),
    ));
    let report = validate(&parse_record(&source).unwrap()).unwrap_err();
    insta::assert_snapshot!(
        report.to_list(),
        @"BAREME/0/TRANCHE/1/SEUIL/0/VALUE/0/deb: Dates don't belong to valid dates of previous bracket"
    );
}

#[test]
fn test_every_field_is_reported() {
    let source = r#"<NODE code="root" deb="2015-01-01" fin="2015-12-31">
  <CODE code="p" format="integer" unit="EUR">
    <VALUE deb="2015-01-01" fin="2014-12-31" valeur="1.5"/>
  </CODE>
  <BAREME code="s">
    <TRANCHE>
      <TAUX>
        <VALUE deb="2015-01-01" fin="2015-12-31" valeur="x"/>
      </TAUX>
    </TRANCHE>
  </BAREME>
</NODE>"#;
    let report = validate(&parse_record(source).unwrap()).unwrap_err();
    insta::assert_snapshot!(report.to_list(), @r"
    BAREME/0/TRANCHE/0/SEUIL: Missing value
    BAREME/0/TRANCHE/0/TAUX/0/VALUE/0/valeur: Value must be a float
    CODE/0/unit: Unexpected item
    CODE/0/VALUE/0/valeur: Value must be an integer
    ");
}

#[test]
fn test_reversed_dates() {
    let source = r#"<NODE code="root" deb="2015-01-01" fin="2015-12-31">
  <CODE code="p">
    <VALUE deb="2015-01-01" fin="2014-12-31" valeur="1"/>
  </CODE>
</NODE>"#;
    let report = validate(&parse_record(source).unwrap()).unwrap_err();
    insta::assert_snapshot!(
        report.to_list(),
        @"CODE/0/VALUE/0/fin: Last date must be greater than first date"
    );
}

#[test]
fn test_malformed_markup() {
    let error = parse_record("<NODE code=\"root\">\n  <CODE>\n</NODE>").unwrap_err();
    assert!(matches!(error, LegixError::Markup { line: 3, .. }), "{error}");
}

#[test]
fn test_invalid_root() {
    let error = parse_record(r#"<CODE code="p"/>"#).unwrap_err();
    assert_eq!(
        error.to_string(),
        r#"Invalid root element in XML: "CODE" instead of "NODE""#
    );
}
