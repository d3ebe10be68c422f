//! Fee schedules used by the accounting dashboards.

use super::{FeeEntry, FeeSchedule};

/// Visit type every preset falls back to.
pub const DEFAULT_VISIT_TYPE: &str = "Follow Up";

impl FeeSchedule {
    /// Agency-pays / therapist-receives rates used by the clinical,
    /// admin and therapist accounting views.
    pub fn clinical() -> Self {
        FeeSchedule::new(DEFAULT_VISIT_TYPE, FeeEntry::fixed(110.0, 55.0))
            .with_entry("Initial Evaluation", FeeEntry::fixed(130.0, 110.0))
            .with_entry("SOC OASIS", FeeEntry::fixed(140.0, 120.0))
            .with_entry("RA", FeeEntry::fixed(120.0, 100.0))
            .with_entry("DC", FeeEntry::fixed(100.0, 80.0))
    }

    /// Billed-only revenue rates used by the monthly breakdown.
    /// Paid amounts are zero.
    pub fn revenue_rates() -> Self {
        FeeSchedule::new(DEFAULT_VISIT_TYPE, FeeEntry::fixed(110.0, 0.0))
            .with_entry("Initial Evaluation", FeeEntry::fixed(130.0, 0.0))
            .with_entry("SOC OASIS", FeeEntry::fixed(140.0, 0.0))
            .with_entry("RA", FeeEntry::fixed(120.0, 0.0))
            .with_entry("DC", FeeEntry::fixed(100.0, 0.0))
            .with_entry("Re-evaluation", FeeEntry::fixed(125.0, 0.0))
            .with_entry("Discharge", FeeEntry::fixed(100.0, 0.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clinical_rates() {
        let schedule = FeeSchedule::clinical();
        assert_eq!(schedule.default_type(), DEFAULT_VISIT_TYPE);
        assert_eq!(schedule.lookup(Some("SOC OASIS")).billed(), 140.0);
        assert_eq!(schedule.lookup(Some("DC")).paid(), 80.0);
        assert_eq!(schedule.lookup(Some("Progress Review")), FeeEntry::fixed(110.0, 55.0));
    }

    #[test]
    fn test_revenue_rates_are_billed_only() {
        let schedule = FeeSchedule::revenue_rates();
        assert_eq!(schedule.visit_types().count(), 7);
        assert!(schedule.visit_types().all(|t| schedule.lookup(Some(t)).paid() == 0.0));
        assert_eq!(schedule.lookup(Some("Re-evaluation")).billed(), 125.0);
    }
}
