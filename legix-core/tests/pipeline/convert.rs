//! Markup in, normalized document out.

use crate::common::fixture;
use legix_core::document::Element;
use legix_core::transform::DEFAULT_CONTEXT;
use legix_core::{xml_to_json, TransformOptions};
use serde_json::json;

fn bare() -> TransformOptions {
    TransformOptions {
        context: None,
        include_line_numbers: false,
    }
}

#[test]
fn test_minimal_document() {
    let document = xml_to_json(&fixture("minimal.xml"), &bare()).unwrap();
    assert_eq!(
        serde_json::to_value(&document).unwrap(),
        json!({
            "@type": "Node",
            "start": "2015-01-01",
            "stop": "2015-12-31",
            "children": {
                "allowance": {
                    "@type": "Parameter",
                    "format": "float",
                    "values": [{"start": "2015-01-01", "stop": "2015-12-31", "value": 12.5}],
                },
            },
        })
    );
}

#[test]
fn test_default_options_keep_context_and_lines() {
    let document = xml_to_json(&fixture("minimal.xml"), &TransformOptions::default()).unwrap();
    let value = serde_json::to_value(&document).unwrap();
    assert_eq!(value["@context"], json!(DEFAULT_CONTEXT));
    assert_eq!(value["start_line"], json!(2));
    assert_eq!(value["end_line"], json!(6));
    let parameter = &value["children"]["allowance"];
    assert_eq!(parameter["start_line"], json!(3));
    assert_eq!(parameter["end_line"], json!(5));
    assert_eq!(parameter["values"][0]["start_line"], json!(4));
    assert!(parameter["values"][0].get("end_line").is_none());
}

#[test]
fn test_serialized_key_order() {
    let document = xml_to_json(&fixture("minimal.xml"), &TransformOptions::default()).unwrap();
    let text = serde_json::to_string(&document).unwrap();
    assert!(text.starts_with(&format!(
        r#"{{"@context":"{DEFAULT_CONTEXT}","@type":"Node","start":"2015-01-01","stop":"2015-12-31","children":"#
    )));
}

#[test]
fn test_kitchensink() {
    let document = xml_to_json(&fixture("kitchensink.xml"), &bare()).unwrap();
    let codes: Vec<&str> = document.root.children.keys().map(String::as_str).collect();
    assert_eq!(codes, vec!["active", "age_min", "impot", "plafond"]);
    assert!(matches!(document.root.children["impot"], Element::Node(_)));

    let value = serde_json::to_value(&document).unwrap();
    assert_eq!(value["description"], json!("Kitchen sink"));
    assert_eq!(value["comment"], json!("Root comment"));

    let scale = &value["children"]["impot"]["children"]["bareme"];
    assert_eq!(scale["@type"], json!("Scale"));
    assert_eq!(scale["option"], json!("contrib"));
    assert_eq!(scale["unit"], json!("currency"));
    assert!(scale["brackets"][0].get("code").is_none());
    assert_eq!(scale["brackets"][0]["threshold"].as_array().unwrap().len(), 2);
    assert_eq!(scale["brackets"][1]["threshold"][0]["value"], json!(9690.0));
    assert_eq!(scale["brackets"][1]["rate"][0]["value"], json!(0.14));
    assert_eq!(scale["brackets"][1]["base"][0]["value"], json!(0.9));
    assert!(scale["brackets"][1].get("amount").is_none());

    let abattement = &value["children"]["impot"]["children"]["abattement"];
    assert_eq!(abattement["format"], json!("rate"));
    assert_eq!(abattement["values"][0]["value"], json!(0.1));

    let plafond = &value["children"]["plafond"];
    assert_eq!(plafond["comment"], json!("Raised in 2016"));
    assert_eq!(plafond["unit"], json!("currency"));
    assert_eq!(plafond["values"][0]["start"], json!("2016-01-01"));
    assert_eq!(plafond["values"][0]["value"], json!(1500.5));
    assert_eq!(plafond["values"][1]["value"], json!(1400.0));

    let active = &value["children"]["active"];
    assert_eq!(active["format"], json!("boolean"));
    assert_eq!(active["values"][0]["value"], json!(true));
    assert!(active.get("taille").is_none());

    let age_min = &value["children"]["age_min"];
    assert_eq!(age_min["format"], json!("integer"));
    assert_eq!(age_min["unit"], json!("year"));
    assert_eq!(age_min["values"][0]["value"], json!(18));
}
