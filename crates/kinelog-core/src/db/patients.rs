//! Patient database operations.

use std::collections::HashSet;

use chrono::{Months, NaiveDate, Utc};
use rusqlite::{params, OptionalExtension, Row};

use super::{Database, DbError, DbResult};
use crate::config::{DEFAULT_PAGE_SIZE, PATIENT_LISTING_WINDOW_MONTHS};
use crate::models::{parse_session_date, Patient, PatientKind, PatientPage, PatientSummary};

const PATIENT_COLUMNS: &str = r#"
    p.id, p.name, p.kind, p.insurance_provider_id, p.category_id,
    p.injury_note, p.planned_sessions, p.created_at,
    (SELECT COUNT(*) FROM sessions s WHERE s.patient_id = p.id)
"#;

impl Database {
    /// Insert a new patient.
    pub fn insert_patient(&self, patient: &Patient) -> DbResult<()> {
        self.conn.execute(
            r#"
            INSERT INTO patients (
                id, name, kind, insurance_provider_id, category_id,
                injury_note, planned_sessions, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
            params![
                patient.id,
                patient.name,
                patient.kind.as_str(),
                patient.insurance_provider_id,
                patient.category_id,
                patient.injury_note,
                patient.planned_sessions,
                patient.created_at,
            ],
        )?;
        tracing::debug!(patient_id = %patient.id, "patient inserted");
        Ok(())
    }

    /// Update an existing patient.
    pub fn update_patient(&self, patient: &Patient) -> DbResult<bool> {
        let rows_affected = self.conn.execute(
            r#"
            UPDATE patients SET
                name = ?2,
                kind = ?3,
                insurance_provider_id = ?4,
                category_id = ?5,
                injury_note = ?6,
                planned_sessions = ?7
            WHERE id = ?1
            "#,
            params![
                patient.id,
                patient.name,
                patient.kind.as_str(),
                patient.insurance_provider_id,
                patient.category_id,
                patient.injury_note,
                patient.planned_sessions,
            ],
        )?;
        Ok(rows_affected > 0)
    }

    /// Get a patient by ID.
    pub fn get_patient(&self, id: &str) -> DbResult<Option<Patient>> {
        self.conn
            .query_row(
                &format!("SELECT {} FROM patients p WHERE p.id = ?", PATIENT_COLUMNS),
                [id],
                PatientRow::from_row,
            )
            .optional()?
            .map(Patient::try_from)
            .transpose()
    }

    /// List all patients by name, with their logged session counts.
    pub fn list_patients(&self) -> DbResult<Vec<PatientSummary>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM patients p ORDER BY p.name",
            PATIENT_COLUMNS
        ))?;
        let rows = stmt.query_map([], PatientRow::from_row)?;

        let mut patients = Vec::new();
        for row in rows {
            patients.push(row?.try_into()?);
        }
        Ok(patients)
    }

    /// List the patients assigned to a category.
    pub fn list_patients_by_category(&self, category_id: &str) -> DbResult<Vec<PatientSummary>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM patients p WHERE p.category_id = ? ORDER BY p.name",
            PATIENT_COLUMNS
        ))?;
        let rows = stmt.query_map([category_id], PatientRow::from_row)?;

        let mut patients = Vec::new();
        for row in rows {
            patients.push(row?.try_into()?);
        }
        Ok(patients)
    }

    /// List patients with at least one session between two `DD-MM-YYYY` dates, inclusive.
    ///
    /// Returns an empty list when either bound is not a valid date.
    pub fn list_patients_with_sessions_between(
        &self,
        start: &str,
        end: &str,
    ) -> DbResult<Vec<PatientSummary>> {
        let (Some(start), Some(end)) = (parse_session_date(start), parse_session_date(end)) else {
            return Ok(Vec::new());
        };

        let mut stmt = self.conn.prepare("SELECT patient_id, date FROM sessions")?;
        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;

        let mut active: HashSet<String> = HashSet::new();
        for row in rows {
            let (patient_id, date) = row?;
            if parse_session_date(&date).is_some_and(|d| in_range(d, start, end)) {
                active.insert(patient_id);
            }
        }

        Ok(self
            .list_patients()?
            .into_iter()
            .filter(|summary| active.contains(&summary.patient.id))
            .collect())
    }

    /// One page of the patient listing.
    ///
    /// Only patients created within the listing window are shown. `query` matches the name
    /// case-insensitively. Pages are 1-based; `page_size` 0 falls back to the default.
    pub fn list_patients_page(
        &self,
        query: Option<&str>,
        page: u32,
        page_size: u32,
    ) -> DbResult<PatientPage> {
        let page = page.max(1);
        let page_size = if page_size == 0 {
            DEFAULT_PAGE_SIZE
        } else {
            page_size
        };
        let cutoff = Utc::now()
            .checked_sub_months(Months::new(PATIENT_LISTING_WINDOW_MONTHS))
            .map(|t| t.to_rfc3339())
            .unwrap_or_default();
        let needle = query
            .map(|q| q.trim().to_lowercase())
            .filter(|q| !q.is_empty());

        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM patients p WHERE p.created_at >= ? ORDER BY p.name",
            PATIENT_COLUMNS
        ))?;
        let rows = stmt.query_map([cutoff], PatientRow::from_row)?;

        let mut matching: Vec<PatientSummary> = Vec::new();
        for row in rows {
            let summary: PatientSummary = row?.try_into()?;
            if needle
                .as_deref()
                .map_or(true, |n| summary.patient.name.to_lowercase().contains(n))
            {
                matching.push(summary);
            }
        }

        let total = matching.len() as u32;
        let total_pages = total.div_ceil(page_size);
        let patients = matching
            .into_iter()
            .skip((page as usize - 1).saturating_mul(page_size as usize))
            .take(page_size as usize)
            .collect();

        Ok(PatientPage {
            patients,
            total,
            total_pages,
        })
    }

    /// Delete a patient with all of their sessions and evaluations.
    pub fn delete_patient(&self, id: &str) -> DbResult<bool> {
        let tx = self.conn.unchecked_transaction()?;
        tx.execute("DELETE FROM evaluations WHERE patient_id = ?", [id])?;
        let sessions = tx.execute("DELETE FROM sessions WHERE patient_id = ?", [id])?;
        let rows_affected = tx.execute("DELETE FROM patients WHERE id = ?", [id])?;
        tx.commit()?;

        tracing::debug!(patient_id = %id, sessions, "patient deleted");
        Ok(rows_affected > 0)
    }
}

fn in_range(date: NaiveDate, start: NaiveDate, end: NaiveDate) -> bool {
    start <= date && date <= end
}

/// Intermediate row struct for database mapping.
struct PatientRow {
    id: String,
    name: String,
    kind: String,
    insurance_provider_id: Option<String>,
    category_id: Option<String>,
    injury_note: Option<String>,
    planned_sessions: u32,
    created_at: String,
    completed_sessions: u32,
}

impl PatientRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            name: row.get(1)?,
            kind: row.get(2)?,
            insurance_provider_id: row.get(3)?,
            category_id: row.get(4)?,
            injury_note: row.get(5)?,
            planned_sessions: row.get(6)?,
            created_at: row.get(7)?,
            completed_sessions: row.get(8)?,
        })
    }
}

impl TryFrom<PatientRow> for Patient {
    type Error = DbError;

    fn try_from(row: PatientRow) -> Result<Self, Self::Error> {
        let kind = PatientKind::parse(&row.kind)
            .ok_or_else(|| DbError::Constraint(format!("Unknown patient kind: {}", row.kind)))?;

        Ok(Patient {
            id: row.id,
            name: row.name,
            kind,
            insurance_provider_id: row.insurance_provider_id,
            category_id: row.category_id,
            injury_note: row.injury_note,
            planned_sessions: row.planned_sessions,
            created_at: row.created_at,
        })
    }
}

impl TryFrom<PatientRow> for PatientSummary {
    type Error = DbError;

    fn try_from(row: PatientRow) -> Result<Self, Self::Error> {
        let completed_sessions = row.completed_sessions;
        Ok(PatientSummary {
            patient: row.try_into()?,
            completed_sessions,
        })
    }
}
