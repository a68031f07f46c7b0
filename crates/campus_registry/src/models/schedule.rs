//! Schedule record and interval overlap.

use campus_core::{Record, RecordId};
use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

/// A single scheduled session of a class.
///
/// Time ranges are half-open `[start, end)`: two sessions that merely
/// touch at a boundary (one ends exactly when the other starts) do not
/// overlap, so back-to-back bookings of the same teacher or room are
/// legal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Schedule {
    /// Surrogate id, unset until first persisted.
    pub id: RecordId,
    /// The class this session belongs to.
    pub class_id: RecordId,
    /// The teacher giving the session.
    pub teacher_id: RecordId,
    /// The room the session takes place in.
    pub room_id: RecordId,
    /// Calendar date of the session.
    pub date: NaiveDate,
    /// Start time (inclusive).
    pub start: NaiveTime,
    /// End time (exclusive). Must be after `start`.
    pub end: NaiveTime,
}

impl Schedule {
    /// Creates an unpersisted schedule.
    #[must_use]
    pub fn new(
        class_id: RecordId,
        teacher_id: RecordId,
        room_id: RecordId,
        date: NaiveDate,
        start: NaiveTime,
        end: NaiveTime,
    ) -> Self {
        Self {
            id: RecordId::UNSET,
            class_id,
            teacher_id,
            room_id,
            date,
            start,
            end,
        }
    }

    /// Whether two sessions overlap in time.
    ///
    /// Sessions on different dates never overlap. On the same date the
    /// half-open test applies: `s1 < e2 && e1 > s2`.
    #[must_use]
    pub fn overlaps(&self, other: &Schedule) -> bool {
        self.date == other.date && self.start < other.end && self.end > other.start
    }
}

impl Record for Schedule {
    const KIND: &'static str = "schedule";

    fn id(&self) -> RecordId {
        self.id
    }

    fn set_id(&mut self, id: RecordId) {
        self.id = id;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 9, 2).unwrap()
    }

    fn session(start: (u32, u32), end: (u32, u32)) -> Schedule {
        Schedule::new(
            RecordId::new(1),
            RecordId::new(1),
            RecordId::new(1),
            date(),
            NaiveTime::from_hms_opt(start.0, start.1, 0).unwrap(),
            NaiveTime::from_hms_opt(end.0, end.1, 0).unwrap(),
        )
    }

    #[test]
    fn overlapping_ranges_overlap() {
        let a = session((9, 0), (10, 0));
        let b = session((9, 30), (10, 30));
        assert!(a.overlaps(&b));
        assert!(b.overlaps(&a));
    }

    #[test]
    fn disjoint_ranges_do_not_overlap() {
        let a = session((9, 0), (10, 0));
        let b = session((11, 0), (12, 0));
        assert!(!a.overlaps(&b));
    }

    #[test]
    fn touching_boundaries_do_not_overlap() {
        let a = session((9, 0), (10, 0));
        let b = session((10, 0), (11, 0));
        assert!(!a.overlaps(&b));
        assert!(!b.overlaps(&a));
    }

    #[test]
    fn containment_overlaps() {
        let outer = session((8, 0), (12, 0));
        let inner = session((9, 0), (10, 0));
        assert!(outer.overlaps(&inner));
        assert!(inner.overlaps(&outer));
    }

    #[test]
    fn different_dates_never_overlap() {
        let a = session((9, 0), (10, 0));
        let mut b = session((9, 0), (10, 0));
        b.date = NaiveDate::from_ymd_opt(2024, 9, 3).unwrap();
        assert!(!a.overlaps(&b));
    }

    fn minute_range() -> impl Strategy<Value = (u32, u32)> {
        // Well-formed ranges within one day, minute resolution.
        (0u32..1439).prop_flat_map(|s| (Just(s), (s + 1)..1440))
    }

    fn at(minute: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(minute / 60, minute % 60, 0).unwrap()
    }

    proptest! {
        #[test]
        fn overlap_is_symmetric(r1 in minute_range(), r2 in minute_range()) {
            let mut a = session((0, 0), (0, 1));
            a.start = at(r1.0);
            a.end = at(r1.1);
            let mut b = a.clone();
            b.start = at(r2.0);
            b.end = at(r2.1);

            prop_assert_eq!(a.overlaps(&b), b.overlaps(&a));
        }

        #[test]
        fn overlap_matches_interval_arithmetic(r1 in minute_range(), r2 in minute_range()) {
            let mut a = session((0, 0), (0, 1));
            a.start = at(r1.0);
            a.end = at(r1.1);
            let mut b = a.clone();
            b.start = at(r2.0);
            b.end = at(r2.1);

            let expected = r1.0.max(r2.0) < r1.1.min(r2.1);
            prop_assert_eq!(a.overlaps(&b), expected);
        }
    }
}
