//! Interval Consistency Checker
//!
//! Date-span arithmetic over dated values. Three checks live here:
//!
//! - [`check_sequence`]: one list of dated values, sorted by descending start, must not
//!   overlap and, for Parameter values, must tile the timeline with no gap either.
//! - [`check_homogeneity`]: a Scale is either an amount scale or a rate scale, never both.
//! - [`check_containment`]: across the brackets of a Scale, each bracket's spans must lie
//!   within what the previous bracket covered, and within each bracket the rate and base spans
//!   must lie within the spans of the fields governing them.
//!
//! Spans are inclusive on both ends. Two spans are adjacent when one stops the day before the
//! other starts; adjacent spans merge into a single [`Segment`].
//!
//! The bracket walk is sequential: bracket `n` is always checked against bracket `n - 1`.

use crate::model::{BracketField, ValidatedBracket, ValidatedValue};
use chrono::{Days, NaiveDate};

pub const LAST_BEFORE_FIRST: &str = "Last date must be greater than first date";
pub const NOT_CONSECUTIVE: &str = "Dates of values are not consecutive";
pub const OVERLAP: &str = "Dates of values overlap";
pub const OUTSIDE_PREVIOUS_BRACKET: &str = "Dates don't belong to valid dates of previous bracket";
pub const OUTSIDE_RATE: &str = "Dates don't belong to TAUX dates";
pub const OUTSIDE_THRESHOLD: &str = "Dates don't belong to SEUIL dates";
pub const OUTSIDE_RATE_OR_AMOUNT: &str = "Dates don't belong to TAUX or MONTANT dates";
pub const AMOUNT_WITH_BASE: &str = "A scale can't contain both MONTANT and ASSIETTE";
pub const AMOUNT_WITH_RATE: &str = "A scale can't contain both MONTANT and TAUX";

/// Anything spanning an inclusive date range.
pub trait Dated {
    fn start(&self) -> NaiveDate;
    fn stop(&self) -> NaiveDate;
}

impl Dated for ValidatedValue {
    fn start(&self) -> NaiveDate {
        self.start
    }

    fn stop(&self) -> NaiveDate {
        self.stop
    }
}

impl Dated for (NaiveDate, NaiveDate) {
    fn start(&self) -> NaiveDate {
        self.0
    }

    fn stop(&self) -> NaiveDate {
        self.1
    }
}

/// How strictly consecutive spans of a sequence must follow each other.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Continuity {
    /// Spans tile the timeline: no gap, no overlap.
    Consecutive,
    /// Gaps are allowed, overlaps are not.
    GapsAllowed,
}

/// Which date of a value a violation concerns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateField {
    Start,
    Stop,
}

impl DateField {
    /// Field name in the source markup.
    pub fn xml_name(self) -> &'static str {
        match self {
            DateField::Start => "deb",
            DateField::Stop => "fin",
        }
    }
}

/// A problem found by [`check_sequence`], addressed by position in the sorted sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SequenceViolation {
    pub index: usize,
    pub field: DateField,
    pub message: &'static str,
}

fn day_after(date: NaiveDate) -> Option<NaiveDate> {
    date.checked_add_days(Days::new(1))
}

/// Sorts `items` by descending start and checks their spans.
///
/// Every item must start no later than it stops. Then, walking from the latest span to the
/// earliest, the day after each earlier span's stop is compared to the start of the span that
/// follows it: before it is a gap (an error only for [`Continuity::Consecutive`]), after it is
/// an overlap. Violations index the returned, sorted sequence; adjacency violations land on the
/// later span's start.
pub fn check_sequence<T: Dated>(
    mut items: Vec<T>,
    continuity: Continuity,
) -> (Vec<T>, Vec<SequenceViolation>) {
    items.sort_by(|a, b| b.start().cmp(&a.start()));

    let mut violations = Vec::new();
    for (index, item) in items.iter().enumerate() {
        if item.start() > item.stop() {
            violations.push(SequenceViolation {
                index,
                field: DateField::Stop,
                message: LAST_BEFORE_FIRST,
            });
        }
    }

    for (index, pair) in items.windows(2).enumerate() {
        let (later, earlier) = (&pair[0], &pair[1]);
        let message = match day_after(earlier.stop()) {
            Some(next_start) if next_start < later.start() => {
                (continuity == Continuity::Consecutive).then_some(NOT_CONSECUTIVE)
            }
            Some(next_start) if next_start == later.start() => None,
            _ => Some(OVERLAP),
        };
        if let Some(message) = message {
            violations.push(SequenceViolation {
                index,
                field: DateField::Start,
                message,
            });
        }
    }

    (items, violations)
}

/// A maximal gap-free date range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Segment {
    pub start: NaiveDate,
    pub stop: NaiveDate,
}

impl Segment {
    pub fn contains<T: Dated>(&self, span: &T) -> bool {
        self.start <= span.start() && span.stop() <= self.stop
    }
}

/// Merges adjacent spans into segments, latest first.
pub fn merged_segments<T: Dated>(items: &[T]) -> Vec<Segment> {
    let mut spans: Vec<(NaiveDate, NaiveDate)> =
        items.iter().map(|item| (item.start(), item.stop())).collect();
    spans.sort_by(|a, b| b.0.cmp(&a.0));

    let mut segments: Vec<Segment> = Vec::new();
    for (start, stop) in spans {
        match segments.last_mut() {
            Some(last) if day_after(stop) == Some(last.start) => last.start = start,
            _ => segments.push(Segment { start, stop }),
        }
    }
    segments
}

fn covered<T: Dated>(span: &T, segments: &[Segment]) -> bool {
    segments.iter().any(|segment| segment.contains(span))
}

/// A problem found on a bracket field as a whole.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldViolation {
    pub bracket: usize,
    pub field: BracketField,
    pub message: &'static str,
}

/// Rejects scales mixing amount brackets with base or rate brackets.
pub fn check_homogeneity(brackets: &[ValidatedBracket]) -> Vec<FieldViolation> {
    let mut violations = Vec::new();
    if !brackets.iter().any(|bracket| bracket.amount.is_some()) {
        return violations;
    }
    for (index, bracket) in brackets.iter().enumerate() {
        if bracket.base.is_some() {
            violations.push(FieldViolation {
                bracket: index,
                field: BracketField::Base,
                message: AMOUNT_WITH_BASE,
            });
        }
        if bracket.rate.is_some() {
            violations.push(FieldViolation {
                bracket: index,
                field: BracketField::Rate,
                message: AMOUNT_WITH_RATE,
            });
        }
    }
    violations
}

/// A value whose span escapes the segments it must belong to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainmentViolation {
    pub bracket: usize,
    pub field: BracketField,
    pub value: usize,
    pub message: &'static str,
}

/// Checks the temporal containment rules across the brackets of one scale.
///
/// First, every span of every field of bracket `n` must lie within a segment of the same field
/// of bracket `n - 1`. Only when that holds everywhere, each bracket but the first is checked on
/// its own: base spans within rate segments, rate spans within threshold segments, threshold
/// spans within rate or amount segments.
pub fn check_containment(brackets: &[ValidatedBracket]) -> Vec<ContainmentViolation> {
    let mut violations = Vec::new();

    for (index, pair) in brackets.windows(2).enumerate() {
        let (previous, bracket) = (&pair[0], &pair[1]);
        for field in BracketField::ALL {
            let segments = merged_segments(previous.values(field));
            for (value_index, value) in bracket.values(field).iter().enumerate() {
                if !covered(value, &segments) {
                    violations.push(ContainmentViolation {
                        bracket: index + 1,
                        field,
                        value: value_index,
                        message: OUTSIDE_PREVIOUS_BRACKET,
                    });
                }
            }
        }
    }
    if !violations.is_empty() {
        return violations;
    }

    for (index, bracket) in brackets.iter().enumerate().skip(1) {
        let amount_segments = merged_segments(bracket.values(BracketField::Amount));
        let rate_segments = merged_segments(bracket.values(BracketField::Rate));
        let threshold_segments = merged_segments(bracket.values(BracketField::Threshold));

        let mut check = |field: BracketField, message: &'static str, allowed: &[&[Segment]]| {
            for (value_index, value) in bracket.values(field).iter().enumerate() {
                if !allowed.iter().any(|segments| covered(value, segments)) {
                    violations.push(ContainmentViolation {
                        bracket: index,
                        field,
                        value: value_index,
                        message,
                    });
                }
            }
        };

        check(BracketField::Base, OUTSIDE_RATE, &[&rate_segments]);
        check(BracketField::Rate, OUTSIDE_THRESHOLD, &[&threshold_segments]);
        check(
            BracketField::Threshold,
            OUTSIDE_RATE_OR_AMOUNT,
            &[&rate_segments, &amount_segments],
        );
    }

    violations
}
