//! Properties of the interval algebra over generated timelines.

use chrono::{Days, NaiveDate};
use legix_core::validate::intervals::{
    check_sequence, merged_segments, Continuity, DateField, NOT_CONSECUTIVE, OVERLAP,
};
use proptest::prelude::*;
use proptest::sample::Index;

type Span = (NaiveDate, NaiveDate);

fn origin(offset: u64) -> NaiveDate {
    NaiveDate::from_ymd_opt(1990, 1, 1).unwrap() + Days::new(offset)
}

/// Consecutive spans of the given lengths, oldest first, with `gap` extra days before `gap_at`.
fn timeline(start: NaiveDate, lengths: &[u64], gap_at: usize, gap: u64) -> Vec<Span> {
    let mut cursor = start;
    let mut spans = Vec::with_capacity(lengths.len());
    for (index, length) in lengths.iter().enumerate() {
        if index == gap_at {
            cursor = cursor + Days::new(gap);
        }
        let stop = cursor + Days::new(length - 1);
        spans.push((cursor, stop));
        cursor = stop + Days::new(1);
    }
    spans
}

fn rotated(mut spans: Vec<Span>, by: Index) -> Vec<Span> {
    let len = spans.len();
    spans.rotate_left(by.index(len));
    spans
}

proptest! {
    #[test]
    fn tiling_spans_pass_in_any_order(
        offset in 0u64..20_000,
        lengths in prop::collection::vec(1u64..400, 1..12),
        rotation in any::<Index>(),
    ) {
        let spans = timeline(origin(offset), &lengths, usize::MAX, 0);
        let (sorted, violations) =
            check_sequence(rotated(spans.clone(), rotation), Continuity::Consecutive);

        prop_assert!(violations.is_empty());
        for pair in sorted.windows(2) {
            prop_assert_eq!(pair[1].1 + Days::new(1), pair[0].0);
        }
        let segments = merged_segments(&sorted);
        prop_assert_eq!(segments.len(), 1);
        prop_assert_eq!(segments[0].start, spans[0].0);
        prop_assert_eq!(segments[0].stop, spans[spans.len() - 1].1);
    }

    #[test]
    fn a_gap_is_one_error_only_when_consecutive(
        offset in 0u64..20_000,
        lengths in prop::collection::vec(1u64..400, 2..12),
        at in any::<Index>(),
        gap in 1u64..100,
        rotation in any::<Index>(),
    ) {
        let gap_at = 1 + at.index(lengths.len() - 1);
        let spans = rotated(timeline(origin(offset), &lengths, gap_at, gap), rotation);

        let (_, violations) = check_sequence(spans.clone(), Continuity::Consecutive);
        prop_assert_eq!(violations.len(), 1);
        prop_assert_eq!(violations[0].index, lengths.len() - 1 - gap_at);
        prop_assert_eq!(violations[0].field, DateField::Start);
        prop_assert_eq!(violations[0].message, NOT_CONSECUTIVE);

        let (_, violations) = check_sequence(spans, Continuity::GapsAllowed);
        prop_assert!(violations.is_empty());
    }

    #[test]
    fn an_overlap_is_one_error_in_both_modes(
        offset in 0u64..20_000,
        lengths in prop::collection::vec(2u64..400, 2..12),
        at in any::<Index>(),
        shift in any::<Index>(),
    ) {
        let overlap_at = 1 + at.index(lengths.len() - 1);
        let mut spans = timeline(origin(offset), &lengths, usize::MAX, 0);
        // Pull the start back into the previous span, which stays strictly earlier.
        let back = 1 + shift.index(lengths[overlap_at - 1] as usize - 1) as u64;
        spans[overlap_at].0 = spans[overlap_at].0 - Days::new(back);

        for continuity in [Continuity::Consecutive, Continuity::GapsAllowed] {
            let (_, violations) = check_sequence(spans.clone(), continuity);
            prop_assert_eq!(violations.len(), 1);
            prop_assert_eq!(violations[0].index, lengths.len() - 1 - overlap_at);
            prop_assert_eq!(violations[0].message, OVERLAP);
        }
    }
}
