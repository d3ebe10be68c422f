//! Per-patient, per-staff and per-discipline breakdowns.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use super::metrics;
use crate::models::{Discipline, FinancialSummary, StaffMember, StatusClass, VisitRecord, VisitStatus};
use crate::pricing::{FeeSchedule, FeeTally};

/// Earnings from one patient's visits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatientBreakdown {
    pub patient_id: String,
    /// All visits for the patient, any status
    pub visit_count: u64,
    pub completed_count: u64,
    /// Billed amount over completed visits
    pub earnings: f64,
}

/// Financial summary for one staff member.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StaffBreakdown {
    /// `None` groups visits with no assigned staff
    pub staff_id: Option<String>,
    pub summary: FinancialSummary,
    pub missed_count: u64,
    /// Completed share of completed + missed visits
    pub efficiency_percent: u32,
}

/// Visit and revenue statistics for one discipline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisciplineBreakdown {
    pub discipline: Discipline,
    /// Active roster members with this discipline
    pub staff_count: u64,
    /// All visits treated by this discipline, any status
    pub total_visits: u64,
    pub completed_count: u64,
    /// Billed amount over completed visits
    pub revenue: f64,
}

/// Completed share of completed + missed visits, as a whole percentage.
pub fn efficiency_percent(completed: u64, missed: u64) -> u32 {
    let total = completed + missed;
    if total == 0 {
        0
    } else {
        (completed as f64 / total as f64 * 100.0).round() as u32
    }
}

pub(super) fn by_patient(visits: &[&VisitRecord], schedule: &FeeSchedule) -> Vec<PatientBreakdown> {
    let mut patients: BTreeMap<&str, (u64, FeeTally<'_>)> = BTreeMap::new();

    for visit in visits {
        let (count, completed) = patients
            .entry(visit.patient_id.as_str())
            .or_insert_with(|| (0, FeeTally::new(schedule)));
        *count += 1;
        if visit.status_class() == StatusClass::Completed {
            completed.record(visit.visit_type.as_deref());
        }
    }

    let mut breakdown: Vec<PatientBreakdown> = patients
        .into_iter()
        .map(|(patient_id, (visit_count, completed))| PatientBreakdown {
            patient_id: patient_id.to_string(),
            visit_count,
            completed_count: completed.count(),
            earnings: completed.billed(),
        })
        .collect();

    // Stable sort keeps patient ID order among equal earnings
    breakdown.sort_by(|a, b| b.earnings.total_cmp(&a.earnings));
    breakdown
}

pub(super) fn by_staff(visits: &[&VisitRecord], schedule: &FeeSchedule) -> Vec<StaffBreakdown> {
    let mut groups: BTreeMap<Option<&str>, Vec<&VisitRecord>> = BTreeMap::new();
    for visit in visits {
        groups.entry(visit.staff_id.as_deref()).or_default().push(*visit);
    }

    groups
        .into_iter()
        .map(|(staff_id, group)| {
            let summary = metrics::summarize(&group, schedule);
            let missed_count = group
                .iter()
                .filter(|visit| visit.status == VisitStatus::Missed)
                .count() as u64;

            StaffBreakdown {
                staff_id: staff_id.map(String::from),
                efficiency_percent: efficiency_percent(summary.completed_visit_count, missed_count),
                missed_count,
                summary,
            }
        })
        .collect()
}

pub(super) fn by_discipline(
    visits: &[&VisitRecord],
    roster: &[StaffMember],
    schedule: &FeeSchedule,
) -> Vec<DisciplineBreakdown> {
    let disciplines: HashMap<&str, Discipline> = roster
        .iter()
        .filter_map(|staff| Some((staff.id.as_str(), staff.discipline()?)))
        .collect();

    Discipline::ALL
        .into_iter()
        .map(|discipline| {
            let staff_count = roster
                .iter()
                .filter(|staff| staff.is_active && staff.discipline() == Some(discipline))
                .count() as u64;

            let mut total_visits = 0;
            let mut completed = FeeTally::new(schedule);
            for visit in visits {
                let treated_by = visit
                    .staff_id
                    .as_deref()
                    .and_then(|id| disciplines.get(id).copied());
                if treated_by != Some(discipline) {
                    continue;
                }
                total_visits += 1;
                if visit.status_class() == StatusClass::Completed {
                    completed.record(visit.visit_type.as_deref());
                }
            }

            DisciplineBreakdown {
                discipline,
                staff_count,
                total_visits,
                completed_count: completed.count(),
                revenue: completed.billed(),
            }
        })
        .collect()
}
