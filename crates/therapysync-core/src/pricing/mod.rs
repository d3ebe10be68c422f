//! Fee schedules: per-visit-type billed/paid pricing.
//!
//! A schedule is an immutable value handed to every aggregation call.
//! Unknown, empty or missing visit types price at the schedule's default
//! entry.

mod presets;
mod tally;

pub use presets::DEFAULT_VISIT_TYPE;
pub(crate) use tally::FeeTally;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Pricing errors.
#[derive(Error, Debug)]
pub enum PricingError {
    #[error("Negative {field} amount {amount} for '{visit_type}'")]
    NegativeAmount {
        visit_type: String,
        field: &'static str,
        amount: f64,
    },

    #[error("Non-finite {field} amount for '{visit_type}'")]
    NonFiniteAmount {
        visit_type: String,
        field: &'static str,
    },

    #[error("Default visit type '{0}' has no fee entry")]
    MissingDefault(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type PricingResult<T> = Result<T, PricingError>;

/// Billed/paid pair for one visit type.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeeEntry {
    /// Amount charged to the agency/payer
    #[serde(alias = "agency_pays")]
    billed: f64,
    /// Amount disbursed to the treating staff member
    #[serde(alias = "therapist_receives")]
    paid: f64,
}

impl FeeEntry {
    /// Create a validated fee entry. Both amounts must be finite and non-negative.
    pub fn new(billed: f64, paid: f64) -> PricingResult<Self> {
        let entry = Self { billed, paid };
        entry.validate("")?;
        Ok(entry)
    }

    pub fn billed(&self) -> f64 {
        self.billed
    }

    pub fn paid(&self) -> f64 {
        self.paid
    }

    pub(crate) const fn fixed(billed: f64, paid: f64) -> Self {
        Self { billed, paid }
    }

    fn validate(&self, visit_type: &str) -> PricingResult<()> {
        for (field, amount) in [("billed", self.billed), ("paid", self.paid)] {
            if !amount.is_finite() {
                return Err(PricingError::NonFiniteAmount {
                    visit_type: visit_type.to_string(),
                    field,
                });
            }
            if amount < 0.0 {
                return Err(PricingError::NegativeAmount {
                    visit_type: visit_type.to_string(),
                    field,
                    amount,
                });
            }
        }
        Ok(())
    }
}

/// Serialized shape of a schedule.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ScheduleDocument {
    default_type: String,
    entries: BTreeMap<String, FeeEntry>,
}

/// Immutable visit-type pricing table with a designated default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ScheduleDocument", into = "ScheduleDocument")]
pub struct FeeSchedule {
    entries: BTreeMap<String, FeeEntry>,
    default_type: String,
    default_entry: FeeEntry,
}

impl TryFrom<ScheduleDocument> for FeeSchedule {
    type Error = PricingError;

    fn try_from(doc: ScheduleDocument) -> PricingResult<Self> {
        for (visit_type, entry) in &doc.entries {
            entry.validate(visit_type)?;
        }
        let default_entry = *doc
            .entries
            .get(&doc.default_type)
            .ok_or_else(|| PricingError::MissingDefault(doc.default_type.clone()))?;

        Ok(Self {
            entries: doc.entries,
            default_type: doc.default_type,
            default_entry,
        })
    }
}

impl From<FeeSchedule> for ScheduleDocument {
    fn from(schedule: FeeSchedule) -> Self {
        Self {
            default_type: schedule.default_type,
            entries: schedule.entries,
        }
    }
}

impl FeeSchedule {
    /// Create a schedule holding only its default entry.
    pub fn new(default_type: impl Into<String>, default_entry: FeeEntry) -> Self {
        let default_type = default_type.into();
        let mut entries = BTreeMap::new();
        entries.insert(default_type.clone(), default_entry);
        Self {
            entries,
            default_type,
            default_entry,
        }
    }

    /// Return a copy of this schedule with `visit_type` priced at `entry`.
    pub fn with_entry(mut self, visit_type: impl Into<String>, entry: FeeEntry) -> Self {
        let visit_type = visit_type.into();
        if visit_type == self.default_type {
            self.default_entry = entry;
        }
        self.entries.insert(visit_type, entry);
        self
    }

    /// Load a schedule from JSON.
    ///
    /// ```json
    /// {"default_type": "Follow Up",
    ///  "entries": {"Follow Up": {"billed": 110, "paid": 55}}}
    /// ```
    pub fn from_json(json: &str) -> PricingResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> PricingResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Price a visit type. Exact, case-sensitive match; anything else
    /// (including `None` and the empty string) gets the default entry.
    pub fn lookup(&self, visit_type: Option<&str>) -> FeeEntry {
        visit_type
            .and_then(|t| self.entries.get(t))
            .copied()
            .unwrap_or(self.default_entry)
    }

    /// The configured label a visit type prices under.
    pub fn resolve_label<'s>(&'s self, visit_type: Option<&str>) -> &'s str {
        visit_type
            .and_then(|t| self.entries.get_key_value(t))
            .map(|(label, _)| label.as_str())
            .unwrap_or(&self.default_type)
    }

    /// Entry for an exact visit type, without fallback.
    pub fn get(&self, visit_type: &str) -> Option<FeeEntry> {
        self.entries.get(visit_type).copied()
    }

    pub fn is_known(&self, visit_type: &str) -> bool {
        self.entries.contains_key(visit_type)
    }

    pub fn default_type(&self) -> &str {
        &self.default_type
    }

    pub fn default_entry(&self) -> FeeEntry {
        self.default_entry
    }

    /// Configured visit types in lexical order.
    pub fn visit_types(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Nearest configured label to an unknown one, for diagnostics.
    pub fn closest_visit_type(&self, label: &str) -> Option<&str> {
        let lower = label.to_lowercase();
        self.visit_types()
            .map(|known| (known, strsim::jaro_winkler(&lower, &known.to_lowercase())))
            .filter(|(_, score)| *score >= SUGGESTION_THRESHOLD)
            .max_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal))
            .map(|(known, _)| known)
    }
}

/// Minimum Jaro-Winkler similarity for a label suggestion.
const SUGGESTION_THRESHOLD: f64 = 0.85;

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_schedule() -> FeeSchedule {
        FeeSchedule::new("Follow Up", FeeEntry::new(110.0, 55.0).unwrap())
            .with_entry("Initial Evaluation", FeeEntry::new(130.0, 110.0).unwrap())
            .with_entry("SOC OASIS", FeeEntry::new(150.0, 120.0).unwrap())
    }

    #[test]
    fn test_exact_lookup() {
        let schedule = sample_schedule();
        assert_eq!(
            schedule.lookup(Some("Initial Evaluation")),
            FeeEntry::fixed(130.0, 110.0)
        );
    }

    #[test]
    fn test_fallback_to_default() {
        let schedule = sample_schedule();
        let default = schedule.default_entry();

        assert_eq!(schedule.lookup(Some("Nonexistent Type")), default);
        assert_eq!(schedule.lookup(Some("")), default);
        assert_eq!(schedule.lookup(None), default);
        // Case-sensitive
        assert_eq!(schedule.lookup(Some("soc oasis")), default);

        assert_eq!(schedule.resolve_label(Some("soc oasis")), "Follow Up");
        assert_eq!(schedule.resolve_label(Some("SOC OASIS")), "SOC OASIS");
    }

    #[test]
    fn test_overriding_default_entry() {
        let schedule = sample_schedule().with_entry("Follow Up", FeeEntry::fixed(100.0, 50.0));
        assert_eq!(schedule.lookup(Some("unknown")), FeeEntry::fixed(100.0, 50.0));
    }

    #[test]
    fn test_invalid_amounts() {
        assert!(matches!(
            FeeEntry::new(-1.0, 0.0),
            Err(PricingError::NegativeAmount { field: "billed", .. })
        ));
        assert!(matches!(
            FeeEntry::new(10.0, f64::NAN),
            Err(PricingError::NonFiniteAmount { field: "paid", .. })
        ));
    }

    #[test]
    fn test_from_json() {
        let json = r#"{
            "default_type": "Follow Up",
            "entries": {
                "Follow Up": {"billed": 110, "paid": 55},
                "RA": {"agency_pays": 120, "therapist_receives": 100}
            }
        }"#;
        let schedule = FeeSchedule::from_json(json).unwrap();
        assert_eq!(schedule.lookup(Some("RA")), FeeEntry::fixed(120.0, 100.0));
        assert_eq!(schedule.default_type(), "Follow Up");
    }

    #[test]
    fn test_from_json_requires_default_entry() {
        let json = r#"{"default_type": "Follow Up", "entries": {"RA": {"billed": 120, "paid": 100}}}"#;
        let err = FeeSchedule::from_json(json).unwrap_err();
        assert!(err.to_string().contains("Follow Up"));
    }

    #[test]
    fn test_from_json_rejects_negative_amount() {
        let json = r#"{"default_type": "DC", "entries": {"DC": {"billed": 100, "paid": -80}}}"#;
        let err = FeeSchedule::from_json(json).unwrap_err();
        assert!(err.to_string().contains("Negative paid"));
    }

    #[test]
    fn test_json_round_trip_preserves_default() {
        let schedule = sample_schedule();
        let restored = FeeSchedule::from_json(&schedule.to_json().unwrap()).unwrap();
        assert_eq!(restored, schedule);
    }

    #[test]
    fn test_closest_visit_type() {
        let schedule = sample_schedule();
        assert_eq!(
            schedule.closest_visit_type("Initial Evalution"),
            Some("Initial Evaluation")
        );
        assert_eq!(schedule.closest_visit_type("follow up"), Some("Follow Up"));
        assert_eq!(schedule.closest_visit_type("Telehealth Consult"), None);
    }
}
