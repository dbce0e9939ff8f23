//! Patient models.

use serde::{Deserialize, Serialize};

/// How a patient's sessions are paid for.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PatientKind {
    /// Pays directly
    Private,
    /// Covered by an insurance provider ("obra social")
    Insured,
}

impl PatientKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            PatientKind::Private => "private",
            PatientKind::Insured => "insured",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "private" | "particular" => Some(PatientKind::Private),
            "insured" | "obra_social" => Some(PatientKind::Insured),
            _ => None,
        }
    }
}

/// A patient record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Patient {
    /// UUID generated at creation
    pub id: String,
    /// Full name
    pub name: String,
    /// Private or insured
    pub kind: PatientKind,
    /// Insurance provider, when insured
    pub insurance_provider_id: Option<String>,
    /// Category assigned by staff
    pub category_id: Option<String>,
    /// Free-text note about the injury
    pub injury_note: Option<String>,
    /// Number of sessions prescribed
    pub planned_sessions: u32,
    /// Creation timestamp (RFC 3339)
    pub created_at: String,
}

impl Patient {
    /// Create a new private patient.
    pub fn new(name: String, planned_sessions: u32) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            name,
            kind: PatientKind::Private,
            insurance_provider_id: None,
            category_id: None,
            injury_note: None,
            planned_sessions,
            created_at: chrono::Utc::now().to_rfc3339(),
        }
    }

    /// Mark the patient as covered by the given provider.
    pub fn insured_by(mut self, provider_id: String) -> Self {
        self.kind = PatientKind::Insured;
        self.insurance_provider_id = Some(provider_id);
        self
    }
}

/// A patient together with the number of sessions already logged.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PatientSummary {
    pub patient: Patient,
    pub completed_sessions: u32,
}

impl PatientSummary {
    /// Sessions still pending out of the prescribed total.
    pub fn remaining_sessions(&self) -> u32 {
        self.patient
            .planned_sessions
            .saturating_sub(self.completed_sessions)
    }
}

/// One page of the patient listing.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PatientPage {
    pub patients: Vec<PatientSummary>,
    /// Matching patients across all pages
    pub total: u32,
    pub total_pages: u32,
}
