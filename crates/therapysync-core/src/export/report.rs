//! Accounting report export for dashboards and spreadsheets.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::aggregate::{AggregateError, Aggregator, PatientBreakdown, StatusPolicy};
use crate::models::{FinancialSummary, MonthBucket, VisitRecord};

/// Export errors.
#[derive(Error, Debug)]
pub enum ExportError {
    #[error("Aggregation error: {0}")]
    Aggregate(#[from] AggregateError),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type ExportResult<T> = Result<T, ExportError>;

/// Report format version.
pub const REPORT_FORMAT_VERSION: &str = "1.0";

/// Full accounting report for one visit collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountingReport {
    /// Report metadata
    pub metadata: ReportMetadata,
    /// Totals over all aggregated visits
    pub summary: FinancialSummary,
    /// Month buckets, oldest first
    pub months: Vec<MonthBucket>,
    /// Per-patient earnings, highest first
    pub patients: Vec<PatientBreakdown>,
}

/// Report metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportMetadata {
    /// Report format version
    pub format_version: String,
    /// Generation timestamp (RFC 3339)
    pub generated_at: String,
    /// Visit type unknown labels were priced as
    pub default_visit_type: String,
    /// Policy applied to unrecognized statuses
    pub status_policy: StatusPolicy,
    /// Visits that passed the filter
    pub visit_count: u64,
}

impl AccountingReport {
    /// Build a report stamped with the current time.
    pub fn build(aggregator: &Aggregator<'_>, visits: &[VisitRecord]) -> ExportResult<Self> {
        Self::build_at(aggregator, visits, Utc::now())
    }

    /// Build a report with an explicit timestamp.
    ///
    /// Visits are filtered and screened once, before anything is computed,
    /// so a rejected collection never yields a partial report.
    pub fn build_at(
        aggregator: &Aggregator<'_>,
        visits: &[VisitRecord],
        generated_at: DateTime<Utc>,
    ) -> ExportResult<Self> {
        let (summary, months, patients) = aggregator.overview(visits)?;

        Ok(Self {
            metadata: ReportMetadata {
                format_version: REPORT_FORMAT_VERSION.to_string(),
                generated_at: generated_at.to_rfc3339(),
                default_visit_type: aggregator.schedule().default_type().to_string(),
                status_policy: aggregator.config().status_policy,
                visit_count: summary.visit_count(),
            },
            summary,
            months,
            patients,
        })
    }

    /// Export to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Export month buckets to CSV.
    pub fn to_csv(&self) -> String {
        let mut csv = String::new();

        // Header
        csv.push_str("month,completed,pending,total_visits,revenue,average_revenue_per_visit,growth_percent\n");

        for month in &self.months {
            csv.push_str(&format!(
                "{},{},{},{},{},{},{}\n",
                month.key,
                month.completed_count,
                month.pending_count,
                month.total_visits(),
                month.revenue,
                month.average_revenue_per_visit(),
                month.growth_percent,
            ));
        }

        csv
    }

    /// Export per-patient earnings to CSV.
    pub fn patients_csv(&self) -> String {
        let mut csv = String::new();

        csv.push_str("patient_id,visit_count,completed_count,earnings\n");

        for patient in &self.patients {
            csv.push_str(&format!(
                "{},{},{},{}\n",
                escape_csv(&patient.patient_id),
                patient.visit_count,
                patient.completed_count,
                patient.earnings,
            ));
        }

        csv
    }
}

/// Escape a string for CSV output.
fn escape_csv(s: &str) -> String {
    if s.contains(',') || s.contains('"') || s.contains('\n') {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}
