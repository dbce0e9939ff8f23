//! Staff-maintained lookup tables: patient categories and insurance providers.

use serde::{Deserialize, Serialize};

/// A patient category (e.g. "Deportivo", "Post-quirúrgico").
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Category {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub created_at: String,
}

impl Category {
    pub fn new(name: String, description: Option<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            name,
            description,
            created_at: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// An insurance provider ("obra social") covering insured patients.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InsuranceProvider {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub created_at: String,
}

impl InsuranceProvider {
    pub fn new(name: String, description: Option<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            name,
            description,
            created_at: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// Record counts shown on the administration dashboard.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct AdminCounts {
    pub insurance_providers: u32,
    pub categories: u32,
    pub patients: u32,
}
