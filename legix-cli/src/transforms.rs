//! CLI-specific transforms
//!
//! This module defines the views `legix inspect` can show of a document. Each one stops the
//! pipeline at some stage and renders what it has there.
//!
//! ## Transform Pipeline
//!
//! 1. **Reading** - Markup → raw element tree
//!    - `raw-treeviz`: indented tag tree, with source line ranges
//! 2. **Flattening** - raw tree → records
//!    - `raw-json`: the flattened records, as validation sees them
//! 3. **Validation** - records → validated tree or violations
//!    - `errors-json`: violations as a nested tree (`{}` when valid)
//!    - `errors-list`: violations, one `path: message` per line
//!    - `markup`: the validated tree written back as markup
//! 4. **Transformation** - validated tree → normalized document
//!    - `document-json`: the final document
//!
//! ## Extra Parameters
//!
//! - `show-linum`: "false" hides line ranges in `raw-treeviz`
//! - `line-numbers`: "false" drops `start_line`/`end_line` from `document-json`
//! - `context`: `@context` of `document-json`, empty to leave it out
//!
//! Example: `legix inspect law.xml raw-treeviz --extra-show-linum false`

use legix_core::markup::{self, RawNode, WriterOptions};
use legix_core::{transform, validate, TransformOptions};
use std::collections::HashMap;

/// All available CLI transforms
pub const AVAILABLE_TRANSFORMS: &[&str] = &[
    "raw-treeviz",
    "raw-json",
    "errors-json",
    "errors-list",
    "document-json",
    "markup",
];

/// Transform `inspect` runs when none is named.
pub const DEFAULT_TRANSFORM: &str = "raw-treeviz";

/// Execute a named transform on a source document with optional extra parameters
///
/// Violations are the output of the `errors-*` transforms, but an error for the ones that need
/// a valid document.
pub fn execute_transform(
    source: &str,
    transform_name: &str,
    extra_params: &HashMap<String, String>,
) -> Result<String, String> {
    match transform_name {
        "raw-treeviz" => {
            let raw = markup::read(source).map_err(|e| e.to_string())?;
            let show_linum = flag(extra_params, "show-linum", true)?;
            let mut output = String::new();
            treeviz(&raw, 0, show_linum, &mut output);
            Ok(output)
        }
        "raw-json" => {
            let record = legix_core::parse_record(source).map_err(|e| e.to_string())?;
            to_json(&record)
        }
        "errors-json" => {
            let record = legix_core::parse_record(source).map_err(|e| e.to_string())?;
            match validate(&record) {
                Ok(_) => Ok("{}\n".to_string()),
                Err(report) => to_json(&report.to_tree()),
            }
        }
        "errors-list" => {
            let record = legix_core::parse_record(source).map_err(|e| e.to_string())?;
            Ok(validate(&record)
                .err()
                .map(|report| report.to_list())
                .unwrap_or_default())
        }
        "document-json" => {
            let legislation = legix_core::parse_legislation(source).map_err(|e| e.to_string())?;
            let options = TransformOptions {
                include_line_numbers: flag(extra_params, "line-numbers", true)?,
                context: match extra_params.get("context") {
                    Some(context) => (!context.is_empty()).then(|| context.clone()),
                    None => TransformOptions::default().context,
                },
            };
            let document = transform(&legislation, &options).map_err(|e| e.to_string())?;
            to_json(&document)
        }
        "markup" => {
            let legislation = legix_core::parse_legislation(source).map_err(|e| e.to_string())?;
            Ok(legix_core::to_markup(&legislation, &WriterOptions::default()))
        }
        _ => Err(format!(
            "Unknown transform: {transform_name}. Use --list-transforms to see the available ones."
        )),
    }
}

fn to_json<T: serde::Serialize + ?Sized>(value: &T) -> Result<String, String> {
    serde_json::to_string_pretty(value)
        .map(|json| json + "\n")
        .map_err(|e| format!("JSON serialization failed: {e}"))
}

fn flag(params: &HashMap<String, String>, key: &str, default: bool) -> Result<bool, String> {
    match params.get(key).map(|raw| raw.to_lowercase()) {
        None => Ok(default),
        Some(raw) => match raw.as_str() {
            "true" | "1" | "yes" | "y" => Ok(true),
            "false" | "0" | "no" | "n" => Ok(false),
            other => Err(format!("Invalid boolean value '{other}' for --extra-{key}")),
        },
    }
}

fn treeviz(node: &RawNode, depth: usize, show_linum: bool, output: &mut String) {
    output.push_str(&"  ".repeat(depth));
    output.push_str(&node.tag);
    if let Some(code) = node.attribute("code") {
        output.push(' ');
        output.push_str(code);
    }
    if show_linum {
        match node.end_line {
            Some(end_line) => output.push_str(&format!(" [{}-{end_line}]", node.start_line)),
            None => output.push_str(&format!(" [{}]", node.start_line)),
        }
    }
    output.push('\n');
    for child in &node.children {
        treeviz(child, depth + 1, show_linum, output);
    }
}
