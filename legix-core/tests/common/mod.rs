//! Fixture loading shared by the integration tests.

use legix_core::Record;
use std::path::PathBuf;

pub fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

/// Source text of `tests/fixtures/<name>`.
pub fn fixture(name: &str) -> String {
    legix_core::read_path(&fixture_path(name))
        .unwrap_or_else(|err| panic!("cannot load fixture {name}: {err}"))
}

/// Flattened record of `tests/fixtures/<name>`.
pub fn fixture_record(name: &str) -> Record {
    legix_core::parse_record(&fixture(name))
        .unwrap_or_else(|err| panic!("cannot parse fixture {name}: {err}"))
}
