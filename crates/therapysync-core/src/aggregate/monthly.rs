//! Calendar-month revenue buckets with period-over-period growth.

use std::collections::BTreeMap;

use crate::models::{MonthBucket, StatusClass, VisitRecord, YearMonth};
use crate::pricing::{FeeSchedule, FeeTally};

/// Growth reported when the previous month earned nothing and this one did.
pub const ZERO_BASE_GROWTH_PERCENT: f64 = 100.0;

struct MonthAccumulator<'s> {
    completed: FeeTally<'s>,
    pending: u64,
}

/// Group by `(year, month)` of the visit date, oldest month first.
///
/// Every month that has a visit gets a bucket, even if all of its visits
/// were excluded.
pub(super) fn bucketize(visits: &[&VisitRecord], schedule: &FeeSchedule) -> Vec<MonthBucket> {
    let mut months: BTreeMap<YearMonth, MonthAccumulator<'_>> = BTreeMap::new();

    for visit in visits {
        let month = months
            .entry(visit.year_month())
            .or_insert_with(|| MonthAccumulator {
                completed: FeeTally::new(schedule),
                pending: 0,
            });

        match visit.status_class() {
            StatusClass::Completed => month.completed.record(visit.visit_type.as_deref()),
            StatusClass::PendingLike => month.pending += 1,
            StatusClass::Excluded | StatusClass::Unrecognized => {}
        }
    }

    let mut previous_revenue: Option<f64> = None;
    months
        .into_iter()
        .map(|(period, month)| {
            let revenue = month.completed.billed();
            let growth = previous_revenue.map_or(0.0, |previous| growth_percent(previous, revenue));
            previous_revenue = Some(revenue);

            MonthBucket {
                completed_count: month.completed.count(),
                pending_count: month.pending,
                revenue,
                growth_percent: growth,
                ..MonthBucket::empty(period)
            }
        })
        .collect()
}

/// Percentage change from `previous` to `current`, one decimal place.
///
/// A zero previous revenue yields [`ZERO_BASE_GROWTH_PERCENT`] when the
/// current revenue is non-zero and 0 otherwise.
pub fn growth_percent(previous: f64, current: f64) -> f64 {
    if previous > 0.0 {
        round_to_tenth((current - previous) / previous * 100.0)
    } else if current != 0.0 {
        ZERO_BASE_GROWTH_PERCENT
    } else {
        0.0
    }
}

/// Round to one decimal, halves toward positive infinity.
fn round_to_tenth(value: f64) -> f64 {
    (value * 10.0 + 0.5).floor() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::VisitStatus;
    use crate::pricing::FeeEntry;
    use chrono::NaiveDate;

    fn schedule() -> FeeSchedule {
        FeeSchedule::new("Follow Up", FeeEntry::new(110.0, 55.0).unwrap())
            .with_entry("Initial Evaluation", FeeEntry::new(130.0, 110.0).unwrap())
            .with_entry("SOC OASIS", FeeEntry::new(150.0, 120.0).unwrap())
    }

    fn visit(y: i32, m: u32, d: u32, visit_type: &str, status: VisitStatus) -> VisitRecord {
        VisitRecord::new(
            format!("{y}-{m}-{d}-{visit_type}"),
            "p1",
            NaiveDate::from_ymd_opt(y, m, d).unwrap(),
            visit_type,
            status,
        )
    }

    fn run(visits: &[VisitRecord]) -> Vec<MonthBucket> {
        let refs: Vec<&VisitRecord> = visits.iter().collect();
        bucketize(&refs, &schedule())
    }

    #[test]
    fn test_empty_input() {
        assert!(run(&[]).is_empty());
    }

    #[test]
    fn test_buckets_sorted_with_growth() {
        let buckets = run(&[
            visit(2025, 2, 1, "SOC OASIS", VisitStatus::Completed),
            visit(2025, 1, 10, "Follow Up", VisitStatus::Pending),
            visit(2025, 1, 5, "Initial Evaluation", VisitStatus::Completed),
        ]);

        assert_eq!(buckets.len(), 2);

        assert_eq!(buckets[0].key, "2025-01");
        assert_eq!(buckets[0].completed_count, 1);
        assert_eq!(buckets[0].pending_count, 1);
        assert_eq!(buckets[0].revenue, 130.0);
        assert_eq!(buckets[0].growth_percent, 0.0);

        assert_eq!(buckets[1].key, "2025-02");
        assert_eq!(buckets[1].revenue, 150.0);
        assert_eq!(buckets[1].growth_percent, 15.4);
    }

    #[test]
    fn test_year_boundary_ordering() {
        let buckets = run(&[
            visit(2025, 1, 3, "Follow Up", VisitStatus::Completed),
            visit(2024, 12, 30, "Follow Up", VisitStatus::Completed),
            visit(2024, 12, 31, "Follow Up", VisitStatus::Completed),
        ]);

        let keys: Vec<&str> = buckets.iter().map(|b| b.key.as_str()).collect();
        assert_eq!(keys, vec!["2024-12", "2025-01"]);
        assert_eq!(buckets[1].growth_percent, -50.0);
    }

    #[test]
    fn test_month_with_only_excluded_visits_still_buckets() {
        let buckets = run(&[
            visit(2025, 3, 1, "Follow Up", VisitStatus::Cancelled),
            visit(2025, 4, 1, "Follow Up", VisitStatus::Completed),
        ]);

        assert_eq!(buckets.len(), 2);
        assert_eq!(buckets[0].total_visits(), 0);
        assert_eq!(buckets[1].growth_percent, ZERO_BASE_GROWTH_PERCENT);
    }

    #[test]
    fn test_growth_percent_boundaries() {
        assert_eq!(growth_percent(0.0, 500.0), 100.0);
        assert_eq!(growth_percent(0.0, 0.0), 0.0);
        assert_eq!(growth_percent(200.0, 150.0), -25.0);
        assert_eq!(growth_percent(130.0, 150.0), 15.4);
        assert_eq!(growth_percent(500.0, 0.0), -100.0);
    }

    #[test]
    fn test_round_to_tenth_halves_go_up() {
        assert_eq!(round_to_tenth(0.25), 0.3);
        assert_eq!(round_to_tenth(-0.25), -0.2);
        assert_eq!(round_to_tenth(15.3846), 15.4);
    }
}
