//! TherapySync Accounting Core
//!
//! Visit billing and monthly revenue aggregation for home-healthcare
//! agency dashboards.
//!
//! # Architecture
//!
//! ```text
//! Backend JSON / fixtures → VisitRecord list
//!                                 │
//!                          [VisitFilter: role / period]
//!                                 │
//!                        Status screening (policy)
//!                                 │
//!              ┌──────────────────┼──────────────────┐
//!              ▼                  ▼                  ▼
//!      FinancialSummary     MonthBucket list     Breakdowns
//!       (totals, profit)   (revenue, growth %)  (patient/staff/discipline)
//!              └──────────────────┼──────────────────┘
//!                                 ▼
//!                     AccountingReport (JSON / CSV)
//! ```
//!
//! # Core Principle
//!
//! **Fee schedules are immutable values passed into every call.** Each view
//! (agency-facing, therapist-facing) supplies its own schedule; no
//! aggregation reads shared mutable pricing.
//!
//! # Modules
//!
//! - [`models`]: Domain types (VisitRecord, StaffMember, FinancialSummary, MonthBucket)
//! - [`pricing`]: Fee schedules and preset rate tables
//! - [`aggregate`]: Summaries, month buckets, breakdowns and filters
//! - [`export`]: Report export

pub mod aggregate;
pub mod export;
pub mod models;
pub mod pricing;

// Re-export commonly used types
pub use aggregate::{
    bucketize, summarize, AggregateError, AggregationConfig, Aggregator, StatusPolicy, VisitFilter,
};
pub use export::AccountingReport;
pub use models::{
    Discipline, FinancialSummary, MonthBucket, StaffMember, VisitRecord, VisitStatus, YearMonth,
};
pub use pricing::{FeeEntry, FeeSchedule};

// UniFFI setup - using proc macros
uniffi::setup_scaffolding!();

use std::sync::Arc;

// =========================================================================
// FFI Error Type
// =========================================================================

#[derive(Debug, thiserror::Error, uniffi::Error)]
#[uniffi(flat_error)]
pub enum TherapySyncError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Pricing error: {0}")]
    PricingError(String),

    #[error("Aggregation error: {0}")]
    AggregationError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl From<models::VisitParseError> for TherapySyncError {
    fn from(e: models::VisitParseError) -> Self {
        TherapySyncError::InvalidInput(e.to_string())
    }
}

impl From<pricing::PricingError> for TherapySyncError {
    fn from(e: pricing::PricingError) -> Self {
        TherapySyncError::PricingError(e.to_string())
    }
}

impl From<AggregateError> for TherapySyncError {
    fn from(e: AggregateError) -> Self {
        TherapySyncError::AggregationError(e.to_string())
    }
}

impl From<export::ExportError> for TherapySyncError {
    fn from(e: export::ExportError) -> Self {
        match e {
            export::ExportError::Aggregate(inner) => inner.into(),
            export::ExportError::Json(inner) => inner.into(),
        }
    }
}

impl From<serde_json::Error> for TherapySyncError {
    fn from(e: serde_json::Error) -> Self {
        TherapySyncError::SerializationError(e.to_string())
    }
}

// =========================================================================
// Factory Functions (exported to FFI)
// =========================================================================

/// Open an accounting core priced with the given schedule JSON, or the
/// clinical preset when none is given.
#[uniffi::export]
pub fn open_accounting(
    schedule_json: Option<String>,
    strict: bool,
) -> Result<Arc<AccountingCore>, TherapySyncError> {
    let schedule = match schedule_json {
        Some(json) => FeeSchedule::from_json(&json)?,
        None => FeeSchedule::clinical(),
    };
    let config = if strict {
        AggregationConfig::strict()
    } else {
        AggregationConfig::default()
    };
    Ok(Arc::new(AccountingCore {
        schedule: Arc::new(schedule),
        config,
    }))
}

// =========================================================================
// Main API Object
// =========================================================================

/// Thread-safe accounting facade for FFI. Holds no mutable state.
#[derive(uniffi::Object)]
pub struct AccountingCore {
    schedule: Arc<FeeSchedule>,
    config: AggregationConfig,
}

impl AccountingCore {
    fn aggregator(&self, filter: Option<FfiVisitFilter>) -> Result<Aggregator<'_>, TherapySyncError> {
        let mut config = self.config.clone();
        if let Some(filter) = filter {
            config.filter = filter.try_into()?;
        }
        Ok(Aggregator::with_config(&self.schedule, config))
    }
}

#[uniffi::export]
impl AccountingCore {
    // =========================================================================
    // Pricing
    // =========================================================================

    /// Price a visit type (default entry for unknown types).
    pub fn lookup_fee(&self, visit_type: Option<String>) -> FfiFeeEntry {
        self.schedule.lookup(visit_type.as_deref()).into()
    }

    /// The schedule in use, as JSON.
    pub fn schedule_json(&self) -> Result<String, TherapySyncError> {
        Ok(self.schedule.to_json()?)
    }

    // =========================================================================
    // Aggregation
    // =========================================================================

    /// Financial summary over a JSON visit array.
    pub fn summarize(
        &self,
        visits_json: String,
        filter: Option<FfiVisitFilter>,
    ) -> Result<FfiFinancialSummary, TherapySyncError> {
        let visits = VisitRecord::list_from_json(&visits_json)?;
        let summary = self.aggregator(filter)?.summarize(&visits)?;
        Ok(summary.into())
    }

    /// Month buckets over a JSON visit array, oldest first.
    pub fn bucketize(
        &self,
        visits_json: String,
        filter: Option<FfiVisitFilter>,
    ) -> Result<Vec<FfiMonthBucket>, TherapySyncError> {
        let visits = VisitRecord::list_from_json(&visits_json)?;
        let buckets = self.aggregator(filter)?.bucketize(&visits)?;
        Ok(buckets.into_iter().map(|b| b.into()).collect())
    }

    /// Per-discipline statistics as JSON, given visit and staff roster arrays.
    pub fn discipline_stats_json(
        &self,
        visits_json: String,
        roster_json: String,
    ) -> Result<String, TherapySyncError> {
        let visits = VisitRecord::list_from_json(&visits_json)?;
        let roster: Vec<StaffMember> = serde_json::from_str(&roster_json)?;
        let stats = self.aggregator(None)?.by_discipline(&visits, &roster)?;
        Ok(serde_json::to_string_pretty(&stats)?)
    }

    // =========================================================================
    // Export Operations
    // =========================================================================

    /// Full accounting report as JSON.
    pub fn report_json(
        &self,
        visits_json: String,
        filter: Option<FfiVisitFilter>,
    ) -> Result<String, TherapySyncError> {
        let visits = VisitRecord::list_from_json(&visits_json)?;
        let report = AccountingReport::build(&self.aggregator(filter)?, &visits)?;
        Ok(report.to_json()?)
    }

    /// Month buckets as CSV.
    pub fn report_csv(
        &self,
        visits_json: String,
        filter: Option<FfiVisitFilter>,
    ) -> Result<String, TherapySyncError> {
        let visits = VisitRecord::list_from_json(&visits_json)?;
        let report = AccountingReport::build(&self.aggregator(filter)?, &visits)?;
        Ok(report.to_csv())
    }
}

// =========================================================================
// FFI Types
// =========================================================================

/// FFI-safe fee entry.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiFeeEntry {
    pub billed: f64,
    pub paid: f64,
}

impl From<FeeEntry> for FfiFeeEntry {
    fn from(entry: FeeEntry) -> Self {
        Self {
            billed: entry.billed(),
            paid: entry.paid(),
        }
    }
}

/// FFI-safe visit filter. Dates are `YYYY-MM-DD`.
#[derive(Debug, Clone, Default, uniffi::Record)]
pub struct FfiVisitFilter {
    pub staff_id: Option<String>,
    pub patient_ids: Option<Vec<String>>,
    pub year: Option<i32>,
    pub month: Option<u32>,
    pub from: Option<String>,
    pub to: Option<String>,
}

impl TryFrom<FfiVisitFilter> for VisitFilter {
    type Error = TherapySyncError;

    fn try_from(filter: FfiVisitFilter) -> Result<Self, Self::Error> {
        let month = match (filter.year, filter.month) {
            (Some(year), Some(month)) if (1..=12).contains(&month) => Some(YearMonth::new(year, month)),
            (None, None) => None,
            _ => {
                return Err(TherapySyncError::InvalidInput(
                    "year and month (1-12) must be given together".into(),
                ))
            }
        };

        Ok(VisitFilter {
            staff_id: filter.staff_id,
            patient_ids: filter.patient_ids.map(|ids| ids.into_iter().collect()),
            month,
            from: filter.from.as_deref().map(models::parse_visit_date).transpose()?,
            to: filter.to.as_deref().map(models::parse_visit_date).transpose()?,
        })
    }
}

/// Counts cross the FFI as `u32`, saturating at `u32::MAX`.
fn ffi_count(count: u64) -> u32 {
    u32::try_from(count).unwrap_or(u32::MAX)
}

/// FFI-safe financial summary.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiFinancialSummary {
    pub total_billed: f64,
    pub completed_payments: f64,
    pub pending_payments: f64,
    pub profit: f64,
    pub completed_visit_count: u32,
    pub pending_visit_count: u32,
    pub excluded_visit_count: u32,
}

impl From<FinancialSummary> for FfiFinancialSummary {
    fn from(summary: FinancialSummary) -> Self {
        Self {
            total_billed: summary.total_billed,
            completed_payments: summary.completed_payments,
            pending_payments: summary.pending_payments,
            profit: summary.profit,
            completed_visit_count: ffi_count(summary.completed_visit_count),
            pending_visit_count: ffi_count(summary.pending_visit_count),
            excluded_visit_count: ffi_count(summary.excluded_visit_count),
        }
    }
}

/// FFI-safe month bucket.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiMonthBucket {
    pub key: String,
    pub year: i32,
    pub month: u32,
    pub completed_count: u32,
    pub pending_count: u32,
    pub revenue: f64,
    pub growth_percent: f64,
    pub average_revenue_per_visit: f64,
}

impl From<MonthBucket> for FfiMonthBucket {
    fn from(bucket: MonthBucket) -> Self {
        Self {
            average_revenue_per_visit: bucket.average_revenue_per_visit(),
            completed_count: ffi_count(bucket.completed_count),
            pending_count: ffi_count(bucket.pending_count),
            key: bucket.key,
            year: bucket.year,
            month: bucket.month,
            revenue: bucket.revenue,
            growth_percent: bucket.growth_percent,
        }
    }
}
