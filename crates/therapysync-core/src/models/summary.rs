//! Aggregated financial outputs.

use serde::{Deserialize, Serialize};

use super::period::YearMonth;

/// Financial totals over one visit collection.
///
/// Amounts keep full precision; formatting is left to the caller.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FinancialSummary {
    /// Billed amount over completed visits
    pub total_billed: f64,
    /// Staff payments over completed visits
    pub completed_payments: f64,
    /// Staff payments owed for pending and scheduled visits
    pub pending_payments: f64,
    /// `total_billed - completed_payments`; may be negative
    pub profit: f64,
    pub completed_visit_count: u64,
    pub pending_visit_count: u64,
    /// Visits counted in neither partition
    pub excluded_visit_count: u64,
}

impl FinancialSummary {
    /// Total visits seen, including excluded ones.
    pub fn visit_count(&self) -> u64 {
        self.billable_visit_count() + self.excluded_visit_count
    }

    /// Visits in the completed or pending-like partitions.
    pub fn billable_visit_count(&self) -> u64 {
        self.completed_visit_count + self.pending_visit_count
    }
}

/// One calendar month of activity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthBucket {
    /// `YYYY-MM`
    pub key: String,
    pub year: i32,
    pub month: u32,
    pub completed_count: u64,
    pub pending_count: u64,
    /// Billed amount over the month's completed visits
    pub revenue: f64,
    /// Change in revenue versus the previous bucket, one decimal place
    pub growth_percent: f64,
}

impl MonthBucket {
    pub(crate) fn empty(period: YearMonth) -> Self {
        Self {
            key: period.key(),
            year: period.year,
            month: period.month,
            completed_count: 0,
            pending_count: 0,
            revenue: 0.0,
            growth_percent: 0.0,
        }
    }

    pub fn period(&self) -> YearMonth {
        YearMonth::new(self.year, self.month)
    }

    pub fn total_visits(&self) -> u64 {
        self.completed_count + self.pending_count
    }

    /// Revenue per completed visit, 0 when nothing was completed.
    pub fn average_revenue_per_visit(&self) -> f64 {
        if self.completed_count == 0 {
            0.0
        } else {
            self.revenue / self.completed_count as f64
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_summary_is_zero() {
        let summary = FinancialSummary::default();
        assert_eq!(summary.total_billed, 0.0);
        assert_eq!(summary.profit, 0.0);
        assert_eq!(summary.visit_count(), 0);
    }

    #[test]
    fn test_visit_counts_split_excluded() {
        let summary = FinancialSummary {
            completed_visit_count: 2,
            pending_visit_count: 1,
            excluded_visit_count: 3,
            ..Default::default()
        };
        assert_eq!(summary.billable_visit_count(), 3);
        assert_eq!(summary.visit_count(), 6);
    }

    #[test]
    fn test_month_bucket_averages() {
        let mut bucket = MonthBucket::empty(YearMonth::new(2025, 3));
        assert_eq!(bucket.key, "2025-03");
        assert_eq!(bucket.average_revenue_per_visit(), 0.0);

        bucket.completed_count = 4;
        bucket.pending_count = 1;
        bucket.revenue = 500.0;
        assert_eq!(bucket.total_visits(), 5);
        assert_eq!(bucket.average_revenue_per_visit(), 125.0);
    }
}
