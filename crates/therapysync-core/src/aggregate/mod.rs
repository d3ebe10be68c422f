//! Financial aggregation over visit collections.
//!
//! Pipeline: Filter → Status screening → Partition → Fee tally → Summary / Month buckets
//!
//! Every visit lands in exactly one partition: completed, pending-like
//! (pending or scheduled), or excluded. Excluded visits never reach a
//! total. Inputs are never mutated and no state survives a call.

mod breakdown;
mod filter;
mod metrics;
mod monthly;

pub use breakdown::*;
pub use filter::*;
pub use monthly::{growth_percent, ZERO_BASE_GROWTH_PERCENT};

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::models::{
    FinancialSummary, MonthBucket, StaffMember, StatusClass, VisitRecord,
};
use crate::pricing::FeeSchedule;

/// Aggregation errors.
#[derive(Error, Debug)]
pub enum AggregateError {
    #[error("Visit '{visit_id}' has unrecognized status '{status}'")]
    UnrecognizedStatus { visit_id: String, status: String },
}

pub type AggregateResult<T> = Result<T, AggregateError>;

/// What to do with visits whose status is outside the known set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusPolicy {
    /// Leave them out of every total, count them as excluded and log a warning
    #[default]
    Exclude,
    /// Fail the whole aggregation before any output is produced
    Reject,
}

/// Per-call aggregation settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AggregationConfig {
    pub status_policy: StatusPolicy,
    /// Restricts which visits are aggregated (per-therapist, per-agency, per-month views)
    pub filter: VisitFilter,
}

impl AggregationConfig {
    /// Strict configuration: unrecognized statuses are errors.
    pub fn strict() -> Self {
        Self {
            status_policy: StatusPolicy::Reject,
            ..Self::default()
        }
    }

    pub fn with_filter(mut self, filter: VisitFilter) -> Self {
        self.filter = filter;
        self
    }
}

/// Summarize visits with the default configuration.
///
/// Unrecognized statuses are excluded (and counted); this never fails.
pub fn summarize(visits: &[VisitRecord], schedule: &FeeSchedule) -> FinancialSummary {
    let selected: Vec<&VisitRecord> = visits.iter().collect();
    report_anomalies(&selected, schedule);
    metrics::summarize(&selected, schedule)
}

/// Group visits into calendar months with the default configuration.
pub fn bucketize(visits: &[VisitRecord], schedule: &FeeSchedule) -> Vec<MonthBucket> {
    let selected: Vec<&VisitRecord> = visits.iter().collect();
    report_anomalies(&selected, schedule);
    monthly::bucketize(&selected, schedule)
}

/// Aggregator bound to one fee schedule and configuration.
pub struct Aggregator<'a> {
    schedule: &'a FeeSchedule,
    config: AggregationConfig,
}

impl<'a> Aggregator<'a> {
    /// Create an aggregator with the default configuration.
    pub fn new(schedule: &'a FeeSchedule) -> Self {
        Self::with_config(schedule, AggregationConfig::default())
    }

    pub fn with_config(schedule: &'a FeeSchedule, config: AggregationConfig) -> Self {
        Self { schedule, config }
    }

    pub fn schedule(&self) -> &'a FeeSchedule {
        self.schedule
    }

    pub fn config(&self) -> &AggregationConfig {
        &self.config
    }

    /// Financial totals over the selected visits.
    pub fn summarize(&self, visits: &[VisitRecord]) -> AggregateResult<FinancialSummary> {
        let selected = self.select(visits)?;
        Ok(metrics::summarize(&selected, self.schedule))
    }

    /// Month buckets over the selected visits, oldest first.
    pub fn bucketize(&self, visits: &[VisitRecord]) -> AggregateResult<Vec<MonthBucket>> {
        let selected = self.select(visits)?;
        Ok(monthly::bucketize(&selected, self.schedule))
    }

    /// Per-patient earnings, highest first.
    pub fn by_patient(&self, visits: &[VisitRecord]) -> AggregateResult<Vec<PatientBreakdown>> {
        let selected = self.select(visits)?;
        Ok(breakdown::by_patient(&selected, self.schedule))
    }

    /// Per-staff summaries, ordered by staff ID (unassigned first).
    pub fn by_staff(&self, visits: &[VisitRecord]) -> AggregateResult<Vec<StaffBreakdown>> {
        let selected = self.select(visits)?;
        Ok(breakdown::by_staff(&selected, self.schedule))
    }

    /// Per-discipline statistics using the roster to map visits to disciplines.
    pub fn by_discipline(
        &self,
        visits: &[VisitRecord],
        roster: &[StaffMember],
    ) -> AggregateResult<Vec<DisciplineBreakdown>> {
        let selected = self.select(visits)?;
        Ok(breakdown::by_discipline(&selected, roster, self.schedule))
    }

    /// Summary, month buckets and per-patient earnings from one selection pass.
    pub(crate) fn overview(
        &self,
        visits: &[VisitRecord],
    ) -> AggregateResult<(FinancialSummary, Vec<MonthBucket>, Vec<PatientBreakdown>)> {
        let selected = self.select(visits)?;
        Ok((
            metrics::summarize(&selected, self.schedule),
            monthly::bucketize(&selected, self.schedule),
            breakdown::by_patient(&selected, self.schedule),
        ))
    }

    /// Apply the filter and screen statuses. Fails before any accumulation.
    fn select<'v>(&self, visits: &'v [VisitRecord]) -> AggregateResult<Vec<&'v VisitRecord>> {
        let selected: Vec<&VisitRecord> = visits
            .iter()
            .filter(|visit| self.config.filter.matches(visit))
            .collect();

        debug!(
            total = visits.len(),
            selected = selected.len(),
            policy = ?self.config.status_policy,
            "selected visits for aggregation"
        );

        if self.config.status_policy == StatusPolicy::Reject {
            if let Some(visit) = selected
                .iter()
                .find(|visit| visit.status_class() == StatusClass::Unrecognized)
            {
                return Err(AggregateError::UnrecognizedStatus {
                    visit_id: visit.id.clone(),
                    status: visit.status.as_str().to_string(),
                });
            }
        }

        report_anomalies(&selected, self.schedule);
        Ok(selected)
    }
}

/// Log unrecognized statuses and likely-mistyped visit types.
fn report_anomalies(visits: &[&VisitRecord], schedule: &FeeSchedule) {
    let mut unknown_statuses: BTreeMap<&str, u64> = BTreeMap::new();
    let mut unknown_types: BTreeMap<&str, u64> = BTreeMap::new();

    for visit in visits {
        if visit.status_class() == StatusClass::Unrecognized {
            *unknown_statuses.entry(visit.status.as_str()).or_insert(0) += 1;
        }
        if let Some(visit_type) = visit.visit_type.as_deref() {
            if !visit_type.is_empty() && !schedule.is_known(visit_type) {
                *unknown_types.entry(visit_type).or_insert(0) += 1;
            }
        }
    }

    for (status, count) in unknown_statuses {
        warn!(status, count, "visits with unrecognized status left out of totals");
    }

    for (visit_type, count) in unknown_types {
        match schedule.closest_visit_type(visit_type) {
            Some(suggestion) => warn!(
                visit_type,
                suggestion,
                count,
                default_type = schedule.default_type(),
                "unknown visit type priced at default rate"
            ),
            None => debug!(
                visit_type,
                count,
                default_type = schedule.default_type(),
                "visit type priced at default rate"
            ),
        }
    }
}
