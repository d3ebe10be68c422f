//! Staff roster models.

use serde::{Deserialize, Serialize};

use super::visit::deserialize_id;

/// Therapy discipline of a staff member.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Discipline {
    #[serde(rename = "PT")]
    PhysicalTherapist,
    #[serde(rename = "OT")]
    OccupationalTherapist,
    #[serde(rename = "ST")]
    SpeechTherapist,
    #[serde(rename = "PTA")]
    PhysicalTherapistAssistant,
    #[serde(rename = "COTA")]
    OccupationalTherapistAssistant,
    #[serde(rename = "STA")]
    SpeechTherapistAssistant,
}

impl Discipline {
    /// Display order used by the accounting views.
    pub const ALL: [Discipline; 6] = [
        Discipline::PhysicalTherapist,
        Discipline::OccupationalTherapist,
        Discipline::SpeechTherapist,
        Discipline::PhysicalTherapistAssistant,
        Discipline::OccupationalTherapistAssistant,
        Discipline::SpeechTherapistAssistant,
    ];

    /// Parse a roster role code. Exact match.
    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|d| d.code() == code)
    }

    /// Short role code (e.g., "PT").
    pub fn code(&self) -> &'static str {
        match self {
            Self::PhysicalTherapist => "PT",
            Self::OccupationalTherapist => "OT",
            Self::SpeechTherapist => "ST",
            Self::PhysicalTherapistAssistant => "PTA",
            Self::OccupationalTherapistAssistant => "COTA",
            Self::SpeechTherapistAssistant => "STA",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Self::PhysicalTherapist => "Physical Therapy",
            Self::OccupationalTherapist => "Occupational Therapy",
            Self::SpeechTherapist => "Speech Therapy",
            Self::PhysicalTherapistAssistant => "Physical Therapist Assistant",
            Self::OccupationalTherapistAssistant => "Certified Occupational Therapist Assistant",
            Self::SpeechTherapistAssistant => "Speech Therapist Assistant",
        }
    }
}

/// A member of the clinical staff roster.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StaffMember {
    /// Staff ID (matches `VisitRecord::staff_id`)
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    /// Display name
    pub name: String,
    /// Role code from the roster (e.g., "PT", "Agency", "Administrator")
    #[serde(default)]
    pub role: Option<String>,
    /// Whether the staff member is currently active
    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_active() -> bool {
    true
}

impl StaffMember {
    /// Create an active staff member.
    pub fn new(id: impl Into<String>, name: impl Into<String>, role: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            role: Some(role.into()),
            is_active: true,
        }
    }

    /// Therapy discipline, if the role is a clinical one.
    pub fn discipline(&self) -> Option<Discipline> {
        self.role.as_deref().and_then(Discipline::from_code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_discipline_codes_round_trip() {
        for discipline in Discipline::ALL {
            assert_eq!(Discipline::from_code(discipline.code()), Some(discipline));
        }
        assert_eq!(Discipline::from_code("pt"), None);
        assert_eq!(Discipline::from_code("Agency"), None);
    }

    #[test]
    fn test_staff_discipline() {
        let therapist = StaffMember::new("7", "Ana Lopez", "COTA");
        assert_eq!(
            therapist.discipline(),
            Some(Discipline::OccupationalTherapistAssistant)
        );

        let admin = StaffMember::new("1", "Front Desk", "Administrator");
        assert_eq!(admin.discipline(), None);
    }

    #[test]
    fn test_staff_from_backend_json() {
        let json = r#"{"id": 12, "name": "Luis Perez", "role": "ST"}"#;
        let staff: StaffMember = serde_json::from_str(json).unwrap();
        assert_eq!(staff.id, "12");
        assert!(staff.is_active);
        assert_eq!(staff.discipline(), Some(Discipline::SpeechTherapist));
    }
}
