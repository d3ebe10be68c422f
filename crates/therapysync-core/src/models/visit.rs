//! Visit records as delivered by the scheduling backend.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

use super::period::YearMonth;

/// Errors raised while reading visit data.
#[derive(Error, Debug)]
pub enum VisitParseError {
    #[error("Invalid visit date '{raw}': {source}")]
    InvalidDate {
        raw: String,
        #[source]
        source: chrono::ParseError,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Lifecycle status of a visit.
///
/// Matching is exact and case-sensitive. Labels outside the known set are
/// kept verbatim in [`VisitStatus::Other`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum VisitStatus {
    Completed,
    Pending,
    Scheduled,
    Missed,
    Cancelled,
    Other(String),
}

/// Billing partition a status falls into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusClass {
    /// Counted as billed and paid
    Completed,
    /// Pending or scheduled; counted toward pending payments
    PendingLike,
    /// Known status that never contributes to totals (missed, cancelled)
    Excluded,
    /// Status label the partition rule does not know
    Unrecognized,
}

impl VisitStatus {
    /// Parse a raw status label.
    pub fn parse(raw: &str) -> Self {
        match raw {
            "completed" => Self::Completed,
            "pending" => Self::Pending,
            "scheduled" => Self::Scheduled,
            "missed" => Self::Missed,
            "cancelled" => Self::Cancelled,
            other => Self::Other(other.to_string()),
        }
    }

    /// The raw label for this status.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Completed => "completed",
            Self::Pending => "pending",
            Self::Scheduled => "scheduled",
            Self::Missed => "missed",
            Self::Cancelled => "cancelled",
            Self::Other(raw) => raw,
        }
    }

    /// Classify into a billing partition.
    pub fn class(&self) -> StatusClass {
        match self {
            Self::Completed => StatusClass::Completed,
            Self::Pending | Self::Scheduled => StatusClass::PendingLike,
            Self::Missed | Self::Cancelled => StatusClass::Excluded,
            Self::Other(_) => StatusClass::Unrecognized,
        }
    }
}

impl From<String> for VisitStatus {
    fn from(raw: String) -> Self {
        Self::parse(&raw)
    }
}

impl From<VisitStatus> for String {
    fn from(status: VisitStatus) -> Self {
        status.as_str().to_string()
    }
}

/// A single therapy visit.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VisitRecord {
    /// Opaque visit ID
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    /// Patient the visit belongs to
    #[serde(deserialize_with = "deserialize_id")]
    pub patient_id: String,
    /// Treating staff member, if assigned
    #[serde(default, deserialize_with = "deserialize_optional_id")]
    pub staff_id: Option<String>,
    /// Calendar date of the visit
    #[serde(deserialize_with = "deserialize_visit_date")]
    pub visit_date: NaiveDate,
    /// Billing label (e.g., "Initial Evaluation", "Follow Up")
    #[serde(default)]
    pub visit_type: Option<String>,
    /// Lifecycle status
    pub status: VisitStatus,
    /// Discipline tag from the backend (PT/OT/ST)
    #[serde(default)]
    pub therapy_type: Option<String>,
}

impl VisitRecord {
    /// Create a visit with required fields.
    pub fn new(
        id: impl Into<String>,
        patient_id: impl Into<String>,
        visit_date: NaiveDate,
        visit_type: impl Into<String>,
        status: VisitStatus,
    ) -> Self {
        Self {
            id: id.into(),
            patient_id: patient_id.into(),
            staff_id: None,
            visit_date,
            visit_type: Some(visit_type.into()),
            status,
            therapy_type: None,
        }
    }

    /// Assign the treating staff member.
    pub fn with_staff(mut self, staff_id: impl Into<String>) -> Self {
        self.staff_id = Some(staff_id.into());
        self
    }

    /// Calendar month this visit falls in.
    pub fn year_month(&self) -> YearMonth {
        YearMonth::new(self.visit_date.year(), self.visit_date.month())
    }

    /// Billing partition of this visit's status.
    pub fn status_class(&self) -> StatusClass {
        self.status.class()
    }

    /// Parse a JSON array of visits.
    pub fn list_from_json(json: &str) -> Result<Vec<Self>, VisitParseError> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Parse a visit date.
///
/// Accepts `YYYY-MM-DD` or an ISO datetime; only the date part of a
/// datetime is used and no timezone conversion is applied.
pub fn parse_visit_date(raw: &str) -> Result<NaiveDate, VisitParseError> {
    let date_part = raw.split_once('T').map_or(raw, |(date, _)| date);
    NaiveDate::parse_from_str(date_part.trim(), "%Y-%m-%d").map_err(|source| {
        VisitParseError::InvalidDate {
            raw: raw.to_string(),
            source,
        }
    })
}

/// Backend IDs arrive as integers or strings.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
    Text(String),
    Number(i64),
}

impl RawId {
    fn into_string(self) -> String {
        match self {
            RawId::Text(s) => s,
            RawId::Number(n) => n.to_string(),
        }
    }
}

pub(crate) fn deserialize_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(RawId::deserialize(deserializer)?.into_string())
}

pub(crate) fn deserialize_optional_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<RawId>::deserialize(deserializer)?.map(RawId::into_string))
}

fn deserialize_visit_date<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_visit_date(&raw).map_err(serde::de::Error::custom)
}
