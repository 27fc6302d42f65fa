//! Reader, validator and normalizer for time-versioned legislative parameters
//!
//!     This crate takes legislation markup (an XML dialect rooted at `NODE`, describing grouping
//!     nodes, scalar parameters and bracketed scales, every value dated) and turns it into either
//!     a normalized document or the complete list of what is wrong with it.
//!
//!     This is a pure lib: it powers legix-cli but never prints, reads env vars or touches the
//!     file system, save for the explicit [`read_path`] helper.
//!
//! Pipeline
//!
//!     markup ──read──▶ RawNode ──flatten──▶ Record ──validate──▶ Validated* ──transform──▶ Document
//!                                                       │
//!                                                       └──▶ Report (field path → message)
//!
//!     - markup/reader.rs: roxmltree based; attaches source line numbers to every element.
//!     - flatten.rs: RawNode to ordered-field Record, same-tag children grouped under the tag.
//!     - validate/: per element kind schemas, coercion, then the interval checks
//!       (validate/intervals.rs) for value sequences and bracket containment.
//!     - transform.rs: semantic keys, typed scalars, children keyed by code.
//!
//!     Validation accumulates. A document with any violation never reaches the transformer; the
//!     caller gets the whole [`Report`] instead, renderable as a nested tree or a flat list.
//!
//! The Way Back
//!
//!     A validated tree can be written back to markup (markup/writer.rs). Reading that output
//!     again validates with no violation, which is what the `format` command relies on.
//!
//! Testing
//!
//!     tests
//!     ├── lib.rs              # aggregator, rust does not discover tests in subdirectories
//!     ├── common/mod.rs       # fixture loading
//!     ├── fixtures/*.xml
//!     └── <area>.rs

pub mod diagnostics;
pub mod document;
pub mod error;
pub mod flatten;
pub mod markup;
pub mod model;
pub mod record;
pub mod transform;
pub mod validate;

pub use diagnostics::{FieldPath, PathStep, Report, Violation, ViolationKind};
pub use document::LegislationDocument;
pub use error::LegixError;
pub use model::ValidatedLegislation;
pub use record::Record;
pub use transform::{transform, TransformOptions};
pub use validate::validate;

use markup::WriterOptions;
use std::path::Path;

/// Tag every document must be rooted at.
pub const ROOT_TAG: &str = "NODE";

/// Reads a document from disk.
pub fn read_path(path: &Path) -> Result<String, LegixError> {
    std::fs::read_to_string(path).map_err(|source| LegixError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Reads and flattens `source` without validating it.
pub fn parse_record(source: &str) -> Result<Record, LegixError> {
    let raw = markup::read(source)?;
    if raw.tag != ROOT_TAG {
        return Err(LegixError::InvalidRoot(raw.tag));
    }
    let (_, record) = flatten::flatten(&raw);
    tracing::debug!(fields = record.len(), "flattened document");
    Ok(record)
}

/// Reads, flattens and validates `source`.
pub fn parse_legislation(source: &str) -> Result<ValidatedLegislation, LegixError> {
    let record = parse_record(source)?;
    validate(&record).map_err(LegixError::Validation)
}

/// The whole pipeline: markup in, normalized document out.
pub fn xml_to_json(
    source: &str,
    options: &TransformOptions,
) -> Result<LegislationDocument, LegixError> {
    let legislation = parse_legislation(source)?;
    transform(&legislation, options)
}

/// Writes a validated document back to markup.
pub fn to_markup(legislation: &ValidatedLegislation, options: &WriterOptions) -> String {
    markup::write_document(ROOT_TAG, &legislation.to_record(), options)
}
