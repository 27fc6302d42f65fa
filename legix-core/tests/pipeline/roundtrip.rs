//! Validated documents written back to markup validate again, unchanged.

use crate::common::fixture;
use legix_core::markup::{without_lines, WriterOptions};
use legix_core::{parse_legislation, to_markup};

#[test]
fn test_written_markup_validates_unchanged() {
    for name in ["minimal.xml", "kitchensink.xml"] {
        let legislation = parse_legislation(&fixture(name)).unwrap();
        let written = to_markup(&legislation, &WriterOptions::default());

        let reread = parse_legislation(&written)
            .unwrap_or_else(|err| panic!("{name} no longer validates: {err}\n{written}"));
        assert_eq!(
            without_lines(&legislation.to_record()),
            without_lines(&reread.to_record()),
            "{name}"
        );
    }
}

#[test]
fn test_format_is_a_fixpoint() {
    let options = WriterOptions::default();
    let once = to_markup(&parse_legislation(&fixture("kitchensink.xml")).unwrap(), &options);
    let twice = to_markup(&parse_legislation(&once).unwrap(), &options);
    assert_eq!(once, twice);
}

#[test]
fn test_written_values_are_sorted() {
    let legislation = parse_legislation(&fixture("kitchensink.xml")).unwrap();
    let written = to_markup(&legislation, &WriterOptions::default());
    let newer = written.find(r#"deb="2016-01-01" fin="2016-12-31" valeur="1500.5""#);
    let older = written.find(r#"deb="2014-01-01" fin="2015-12-31" valeur="1400""#);
    assert!(newer.is_some() && older.is_some());
    assert!(newer < older);
}
