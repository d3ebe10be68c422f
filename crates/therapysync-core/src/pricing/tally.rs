//! Order-independent fee accumulation.

use std::collections::BTreeMap;

use super::FeeSchedule;

/// Visit counts keyed by the label each visit prices under.
///
/// Totals are summed in label order, so the result never depends on the
/// order visits were recorded in.
#[derive(Debug)]
pub(crate) struct FeeTally<'s> {
    schedule: &'s FeeSchedule,
    counts: BTreeMap<&'s str, u64>,
}

impl<'s> FeeTally<'s> {
    pub(crate) fn new(schedule: &'s FeeSchedule) -> Self {
        Self {
            schedule,
            counts: BTreeMap::new(),
        }
    }

    pub(crate) fn record(&mut self, visit_type: Option<&str>) {
        let label = self.schedule.resolve_label(visit_type);
        *self.counts.entry(label).or_insert(0) += 1;
    }

    pub(crate) fn count(&self) -> u64 {
        self.counts.values().sum()
    }

    pub(crate) fn billed(&self) -> f64 {
        self.total(|label| self.schedule.lookup(Some(label)).billed())
    }

    pub(crate) fn paid(&self) -> f64 {
        self.total(|label| self.schedule.lookup(Some(label)).paid())
    }

    fn total(&self, amount: impl Fn(&str) -> f64) -> f64 {
        self.counts
            .iter()
            .map(|(label, count)| amount(label) * *count as f64)
            .sum()
    }
}
