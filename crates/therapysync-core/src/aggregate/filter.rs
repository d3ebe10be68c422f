//! Visit selection for role- and period-specific views.

use std::collections::BTreeSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::models::{VisitRecord, YearMonth};

/// Criteria a visit must meet to be aggregated. Empty criteria match everything.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VisitFilter {
    /// Only visits treated by this staff member (therapist view)
    pub staff_id: Option<String>,
    /// Only visits for these patients (agency view)
    pub patient_ids: Option<BTreeSet<String>>,
    /// Only visits in this calendar month (month detail)
    pub month: Option<YearMonth>,
    /// Inclusive lower bound on the visit date
    pub from: Option<NaiveDate>,
    /// Inclusive upper bound on the visit date
    pub to: Option<NaiveDate>,
}

impl VisitFilter {
    /// A filter that matches every visit.
    pub fn all() -> Self {
        Self::default()
    }

    pub fn for_staff(mut self, staff_id: impl Into<String>) -> Self {
        self.staff_id = Some(staff_id.into());
        self
    }

    pub fn for_patients<I, S>(mut self, patient_ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.patient_ids = Some(patient_ids.into_iter().map(Into::into).collect());
        self
    }

    pub fn in_month(mut self, month: YearMonth) -> Self {
        self.month = Some(month);
        self
    }

    pub fn between(mut self, from: NaiveDate, to: NaiveDate) -> Self {
        self.from = Some(from);
        self.to = Some(to);
        self
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    pub fn matches(&self, visit: &VisitRecord) -> bool {
        if let Some(staff_id) = &self.staff_id {
            if visit.staff_id.as_ref() != Some(staff_id) {
                return false;
            }
        }
        if let Some(patient_ids) = &self.patient_ids {
            if !patient_ids.contains(&visit.patient_id) {
                return false;
            }
        }
        if let Some(month) = self.month {
            if visit.year_month() != month {
                return false;
            }
        }
        if self.from.is_some_and(|from| visit.visit_date < from) {
            return false;
        }
        if self.to.is_some_and(|to| visit.visit_date > to) {
            return false;
        }
        true
    }
}
