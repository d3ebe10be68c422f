//! Financial summary over a visit collection.

use crate::models::{FinancialSummary, StatusClass, VisitRecord};
use crate::pricing::{FeeSchedule, FeeTally};

/// Partition visits and price each partition.
///
/// Profit is computed once, after accumulation.
pub(super) fn summarize(visits: &[&VisitRecord], schedule: &FeeSchedule) -> FinancialSummary {
    let mut completed = FeeTally::new(schedule);
    let mut pending = FeeTally::new(schedule);
    let mut excluded = 0;

    for visit in visits {
        match visit.status_class() {
            StatusClass::Completed => completed.record(visit.visit_type.as_deref()),
            StatusClass::PendingLike => pending.record(visit.visit_type.as_deref()),
            StatusClass::Excluded | StatusClass::Unrecognized => excluded += 1,
        }
    }

    let total_billed = completed.billed();
    let completed_payments = completed.paid();

    FinancialSummary {
        total_billed,
        completed_payments,
        pending_payments: pending.paid(),
        profit: total_billed - completed_payments,
        completed_visit_count: completed.count(),
        pending_visit_count: pending.count(),
        excluded_visit_count: excluded,
    }
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

    fn visit(visit_type: Option<&str>, status: VisitStatus) -> VisitRecord {
        VisitRecord {
            id: "v".into(),
            patient_id: "p".into(),
            staff_id: None,
            visit_date: NaiveDate::from_ymd_opt(2025, 1, 5).unwrap(),
            visit_type: visit_type.map(String::from),
            status,
            therapy_type: None,
        }
    }

    #[test]
    fn test_empty_input_is_all_zero() {
        let summary = summarize(&[], &schedule());
        assert_eq!(summary, FinancialSummary::default());
    }

    #[test]
    fn test_partitions_and_totals() {
        let visits = vec![
            visit(Some("Initial Evaluation"), VisitStatus::Completed),
            visit(Some("Follow Up"), VisitStatus::Pending),
            visit(Some("SOC OASIS"), VisitStatus::Completed),
            visit(Some("SOC OASIS"), VisitStatus::Scheduled),
            visit(Some("Follow Up"), VisitStatus::Missed),
        ];
        let refs: Vec<&VisitRecord> = visits.iter().collect();
        let summary = summarize(&refs, &schedule());

        assert_eq!(summary.total_billed, 280.0);
        assert_eq!(summary.completed_payments, 230.0);
        assert_eq!(summary.pending_payments, 55.0 + 120.0);
        assert_eq!(summary.profit, 50.0);
        assert_eq!(summary.completed_visit_count, 2);
        assert_eq!(summary.pending_visit_count, 2);
        assert_eq!(summary.excluded_visit_count, 1);
    }

    #[test]
    fn test_missing_visit_type_prices_at_default() {
        let visits = vec![
            visit(None, VisitStatus::Completed),
            visit(Some(""), VisitStatus::Completed),
        ];
        let refs: Vec<&VisitRecord> = visits.iter().collect();
        let summary = summarize(&refs, &schedule());

        assert_eq!(summary.total_billed, 220.0);
        assert_eq!(summary.completed_payments, 110.0);
    }

    #[test]
    fn test_profit_can_be_negative() {
        let schedule = FeeSchedule::new("Follow Up", FeeEntry::new(50.0, 80.0).unwrap());
        let visits = vec![visit(Some("Follow Up"), VisitStatus::Completed)];
        let refs: Vec<&VisitRecord> = visits.iter().collect();

        assert_eq!(summarize(&refs, &schedule).profit, -30.0);
    }
}
