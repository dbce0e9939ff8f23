//! Kinelog Core Library
//!
//! Local-first record keeping for a physiotherapy practice: patients, daily sessions with a
//! mood rating, and 0-10 self-report evaluations taken before and after each session.
//!
//! # Architecture
//!
//! ```text
//!   UI (Swift / Kotlin) ──► KinelogCore (FFI) ──► Database (SQLite)
//!                                 │
//!                 ┌───────────────┼────────────────┐
//!                 ▼               ▼                ▼
//!              stats           status           export
//!        (hourly / period) (pre/post status) (daily report)
//! ```
//!
//! # Modules
//!
//! - [`db`]: SQLite database layer
//! - [`models`]: Domain types (Patient, Session, Evaluation, etc.)
//! - [`stats`]: Session histograms by hour of day and by calendar period
//! - [`status`]: Evaluation status of a patient's latest session
//! - [`export`]: Day-by-day session report
//! - [`config`]: Named defaults

pub mod config;
pub mod db;
pub mod export;
pub mod models;
pub mod stats;
pub mod status;

// Re-export commonly used types
pub use db::Database;
pub use export::{DailySessionReport, DaySessions};
pub use models::{
    Category, Evaluation, EvaluationRecord, EvaluationResponse, InsuranceProvider, Mood, Patient,
    PatientKind, Phase, Session,
};
pub use stats::{hourly_histogram, period_histogram, HourlyHistogram, PeriodHistogram, PeriodMode};
pub use status::{resolve_status, EvaluationStatus};

// UniFFI setup - using proc macros
uniffi::setup_scaffolding!();

use std::sync::{Arc, Mutex};

use tracing_subscriber::EnvFilter;

use crate::models::{
    complete_responses, EvaluationHistoryEntry, PatientPage, PatientSummary, Question,
    SessionWithPatient,
};
use crate::stats::{period_histogram_now, HourBucket, PeriodBucket};

// =========================================================================
// FFI Error Type
// =========================================================================

#[derive(Debug, thiserror::Error, uniffi::Error)]
pub enum KinelogError {
    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl From<db::DbError> for KinelogError {
    fn from(e: db::DbError) -> Self {
        match e {
            db::DbError::NotFound(what) => KinelogError::NotFound(what),
            db::DbError::Constraint(reason) => KinelogError::InvalidInput(reason),
            other => KinelogError::DatabaseError(other.to_string()),
        }
    }
}

impl From<serde_json::Error> for KinelogError {
    fn from(e: serde_json::Error) -> Self {
        KinelogError::SerializationError(e.to_string())
    }
}

impl<T> From<std::sync::PoisonError<T>> for KinelogError {
    fn from(e: std::sync::PoisonError<T>) -> Self {
        KinelogError::DatabaseError(format!("Lock poisoned: {}", e))
    }
}

// =========================================================================
// Logging
// =========================================================================

/// Install the global `tracing` subscriber.
///
/// `RUST_LOG` wins over `filter`; without either, [`config::DEFAULT_LOG_FILTER`] applies.
/// Calls after the first are ignored.
#[uniffi::export]
pub fn init_logging(filter: Option<String>) {
    let fallback = filter.as_deref().unwrap_or(config::DEFAULT_LOG_FILTER);
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(fallback))
        .unwrap_or_else(|_| EnvFilter::new(config::DEFAULT_LOG_FILTER));

    if tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .try_init()
        .is_ok()
    {
        tracing::debug!("logging initialized");
    }
}

// =========================================================================
// Factory Functions (exported to FFI)
// =========================================================================

/// Open or create a database at the given path.
#[uniffi::export]
pub fn open_database(path: String) -> Result<Arc<KinelogCore>, KinelogError> {
    let db = Database::open(&path)?;
    Ok(Arc::new(KinelogCore {
        db: Arc::new(Mutex::new(db)),
    }))
}

/// Create an in-memory database (for testing).
#[uniffi::export]
pub fn open_database_in_memory() -> Result<Arc<KinelogCore>, KinelogError> {
    let db = Database::open_in_memory()?;
    Ok(Arc::new(KinelogCore {
        db: Arc::new(Mutex::new(db)),
    }))
}

// =========================================================================
// Status Notifications
// =========================================================================

/// Receives the recomputed evaluation status after an evaluation is submitted.
#[uniffi::export(with_foreign)]
pub trait EvaluationStatusListener: Send + Sync {
    fn on_status_changed(&self, patient_id: String, status: FfiEvaluationStatus);
}

// =========================================================================
// Main API Object
// =========================================================================

/// Thread-safe database wrapper for FFI.
#[derive(uniffi::Object)]
pub struct KinelogCore {
    db: Arc<Mutex<Database>>,
}

#[uniffi::export]
impl KinelogCore {
    // =========================================================================
    // Category Operations
    // =========================================================================

    /// Create a patient category.
    pub fn create_category(
        &self,
        name: String,
        description: Option<String>,
    ) -> Result<FfiCategory, KinelogError> {
        let name = required_name(name)?;
        let db = self.db.lock()?;
        let category = Category::new(name, description);
        db.insert_category(&category)?;
        Ok(category.into())
    }

    /// Rename or re-describe a category.
    pub fn update_category(&self, category: FfiCategory) -> Result<bool, KinelogError> {
        let db = self.db.lock()?;
        Ok(db.update_category(&category.into())?)
    }

    /// List all categories.
    pub fn list_categories(&self) -> Result<Vec<FfiCategory>, KinelogError> {
        let db = self.db.lock()?;
        let categories = db.list_categories()?;
        Ok(categories.into_iter().map(|c| c.into()).collect())
    }

    /// Delete a category that no patient is assigned to.
    pub fn delete_category(&self, id: String) -> Result<bool, KinelogError> {
        let db = self.db.lock()?;
        Ok(db.delete_category(&id)?)
    }

    // =========================================================================
    // Insurance Provider Operations
    // =========================================================================

    /// Create an insurance provider.
    pub fn create_insurance_provider(
        &self,
        name: String,
        description: Option<String>,
    ) -> Result<FfiInsuranceProvider, KinelogError> {
        let name = required_name(name)?;
        let db = self.db.lock()?;
        let provider = InsuranceProvider::new(name, description);
        db.insert_insurance_provider(&provider)?;
        Ok(provider.into())
    }

    /// Rename or re-describe an insurance provider.
    pub fn update_insurance_provider(
        &self,
        provider: FfiInsuranceProvider,
    ) -> Result<bool, KinelogError> {
        let db = self.db.lock()?;
        Ok(db.update_insurance_provider(&provider.into())?)
    }

    /// List all insurance providers.
    pub fn list_insurance_providers(&self) -> Result<Vec<FfiInsuranceProvider>, KinelogError> {
        let db = self.db.lock()?;
        let providers = db.list_insurance_providers()?;
        Ok(providers.into_iter().map(|p| p.into()).collect())
    }

    /// Delete an insurance provider that covers no patient.
    pub fn delete_insurance_provider(&self, id: String) -> Result<bool, KinelogError> {
        let db = self.db.lock()?;
        Ok(db.delete_insurance_provider(&id)?)
    }

    /// Record counts for the administration dashboard.
    pub fn admin_counts(&self) -> Result<FfiAdminCounts, KinelogError> {
        let db = self.db.lock()?;
        Ok(db.admin_counts()?.into())
    }

    // =========================================================================
    // Patient Operations
    // =========================================================================

    /// Create a new patient.
    pub fn create_patient(&self, patient: FfiNewPatient) -> Result<FfiPatient, KinelogError> {
        let patient = Patient::try_from(patient)?;
        let db = self.db.lock()?;
        db.insert_patient(&patient)?;
        Ok(patient.into())
    }

    /// Update an existing patient.
    pub fn update_patient(&self, patient: FfiPatient) -> Result<bool, KinelogError> {
        let patient = Patient::try_from(patient)?;
        let db = self.db.lock()?;
        Ok(db.update_patient(&patient)?)
    }

    /// Get a patient by ID.
    pub fn get_patient(&self, id: String) -> Result<Option<FfiPatient>, KinelogError> {
        let db = self.db.lock()?;
        let patient = db.get_patient(&id)?;
        Ok(patient.map(|p| p.into()))
    }

    /// List all patients with their session progress.
    pub fn list_patients(&self) -> Result<Vec<FfiPatientSummary>, KinelogError> {
        let db = self.db.lock()?;
        let patients = db.list_patients()?;
        Ok(patients.into_iter().map(|p| p.into()).collect())
    }

    /// One page of recent patients, optionally filtered by name.
    pub fn list_patients_page(
        &self,
        query: Option<String>,
        page: u32,
        page_size: u32,
    ) -> Result<FfiPatientPage, KinelogError> {
        let db = self.db.lock()?;
        let page = db.list_patients_page(query.as_deref(), page, page_size)?;
        Ok(page.into())
    }

    /// Patients assigned to a category.
    pub fn list_patients_by_category(
        &self,
        category_id: String,
    ) -> Result<Vec<FfiPatientSummary>, KinelogError> {
        let db = self.db.lock()?;
        let patients = db.list_patients_by_category(&category_id)?;
        Ok(patients.into_iter().map(|p| p.into()).collect())
    }

    /// Patients with a session between two `DD-MM-YYYY` dates.
    pub fn list_patients_with_sessions_between(
        &self,
        start: String,
        end: String,
    ) -> Result<Vec<FfiPatientSummary>, KinelogError> {
        let db = self.db.lock()?;
        let patients = db.list_patients_with_sessions_between(&start, &end)?;
        Ok(patients.into_iter().map(|p| p.into()).collect())
    }

    /// Delete a patient with all sessions and evaluations.
    pub fn delete_patient(&self, id: String) -> Result<bool, KinelogError> {
        let db = self.db.lock()?;
        Ok(db.delete_patient(&id)?)
    }

    // =========================================================================
    // Session Operations
    // =========================================================================

    /// Log a session for a patient, stamped with the current date and time.
    pub fn log_session(&self, patient_id: String, mood: String) -> Result<FfiSession, KinelogError> {
        let mood = parse_mood(&mood)?;
        let db = self.db.lock()?;
        if db.get_patient(&patient_id)?.is_none() {
            return Err(KinelogError::NotFound(format!("patient {}", patient_id)));
        }
        let session = Session::new(patient_id, mood);
        db.insert_session(&session)?;
        Ok(session.into())
    }

    /// Correct the date, time or mood of a session.
    pub fn update_session(&self, session: FfiSession) -> Result<bool, KinelogError> {
        let session = Session::try_from(session)?;
        let db = self.db.lock()?;
        Ok(db.update_session(&session)?)
    }

    /// Delete a session and its evaluations.
    pub fn delete_session(&self, id: String) -> Result<bool, KinelogError> {
        let db = self.db.lock()?;
        Ok(db.delete_session(&id)?)
    }

    /// A patient's sessions, oldest first.
    pub fn list_sessions(&self, patient_id: String) -> Result<Vec<FfiSession>, KinelogError> {
        let db = self.db.lock()?;
        let sessions = db.list_sessions_for_patient(&patient_id)?;
        Ok(sessions.into_iter().map(|s| s.into()).collect())
    }

    /// A patient's most recent session.
    pub fn latest_session(&self, patient_id: String) -> Result<Option<FfiSession>, KinelogError> {
        let db = self.db.lock()?;
        let session = db.latest_session_for_patient(&patient_id)?;
        Ok(session.map(|s| s.into()))
    }

    // =========================================================================
    // Evaluation Operations
    // =========================================================================

    /// Questions asked in the `"pre"` or `"post"` phase.
    pub fn evaluation_questions(&self, phase: String) -> Result<Vec<FfiQuestion>, KinelogError> {
        let phase = parse_phase(&phase)?;
        Ok(phase.questions().iter().map(|q| (*q).into()).collect())
    }

    /// Submit one phase of a session's evaluation.
    ///
    /// Unanswered questions of the phase take their default value. The answers are merged
    /// into the session's evaluation, then `listener` receives the patient's new status.
    pub fn submit_evaluation(
        &self,
        patient_id: String,
        session_id: String,
        phase: String,
        responses: Vec<FfiEvaluationResponse>,
        listener: Option<Arc<dyn EvaluationStatusListener>>,
    ) -> Result<FfiEvaluation, KinelogError> {
        let phase = parse_phase(&phase)?;
        let partial: Vec<EvaluationResponse> = responses.into_iter().map(|r| r.into()).collect();
        let completed = complete_responses(phase, &partial);
        let today = chrono::Local::now().date_naive().to_string();

        let (evaluation, status) = {
            let db = self.db.lock()?;
            let evaluation = db.upsert_evaluation(&patient_id, &session_id, &today, completed)?;
            let status = db.evaluation_status(&patient_id)?;
            (evaluation, status)
        };

        tracing::info!(
            patient_id = %patient_id,
            session_id = %session_id,
            phase = ?phase,
            "evaluation submitted"
        );
        if let Some(listener) = listener {
            listener.on_status_changed(patient_id, status.into());
        }
        Ok(evaluation.into())
    }

    /// A patient's evaluation history, newest first.
    pub fn evaluation_history(
        &self,
        patient_id: String,
    ) -> Result<Vec<FfiEvaluationHistoryEntry>, KinelogError> {
        let db = self.db.lock()?;
        let history = db.list_evaluations_for_patient(&patient_id)?;
        Ok(history.into_iter().map(|h| h.into()).collect())
    }

    /// Evaluation status of the patient's latest session.
    pub fn evaluation_status(&self, patient_id: String) -> Result<FfiEvaluationStatus, KinelogError> {
        let db = self.db.lock()?;
        Ok(db.evaluation_status(&patient_id)?.into())
    }

    // =========================================================================
    // Statistics
    // =========================================================================

    /// Sessions per hour of the day, optionally for one `DD-MM-YYYY` date.
    pub fn hourly_histogram(
        &self,
        date: Option<String>,
    ) -> Result<FfiHourlyHistogram, KinelogError> {
        let db = self.db.lock()?;
        let sessions = db.list_all_sessions()?;
        Ok(hourly_histogram(&sessions, date.as_deref()).into())
    }

    /// Sessions per calendar period ending today.
    pub fn period_histogram(&self, mode: String) -> Result<FfiPeriodHistogram, KinelogError> {
        let mode = PeriodMode::parse(&mode)
            .ok_or_else(|| KinelogError::InvalidInput(format!("Unknown period mode: {}", mode)))?;
        let db = self.db.lock()?;
        let sessions = db.list_all_sessions()?;
        Ok(period_histogram_now(&sessions, mode).into())
    }

    // =========================================================================
    // Export Operations
    // =========================================================================

    /// Day-by-day session report between two `DD-MM-YYYY` dates, as JSON.
    pub fn export_daily_report_json(
        &self,
        start: String,
        end: String,
    ) -> Result<String, KinelogError> {
        let db = self.db.lock()?;
        let rows: Vec<SessionWithPatient> = db.list_sessions_with_patients()?;
        let report = DailySessionReport::build(&rows, &start, &end).ok_or_else(|| {
            KinelogError::InvalidInput(format!("Invalid date range: {} to {}", start, end))
        })?;
        Ok(report.to_json()?)
    }
}

fn required_name(name: String) -> Result<String, KinelogError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(KinelogError::InvalidInput("Name must not be empty".into()));
    }
    Ok(trimmed.to_string())
}

fn parse_mood(s: &str) -> Result<Mood, KinelogError> {
    Mood::parse(s).ok_or_else(|| KinelogError::InvalidInput(format!("Unknown mood: {}", s)))
}

fn parse_phase(s: &str) -> Result<Phase, KinelogError> {
    Phase::parse(s).ok_or_else(|| KinelogError::InvalidInput(format!("Unknown phase: {}", s)))
}

fn parse_kind(s: &str) -> Result<PatientKind, KinelogError> {
    PatientKind::parse(s)
        .ok_or_else(|| KinelogError::InvalidInput(format!("Unknown patient kind: {}", s)))
}

// =========================================================================
// FFI Types
// =========================================================================

/// FFI-safe category.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiCategory {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub created_at: String,
}

impl From<Category> for FfiCategory {
    fn from(category: Category) -> Self {
        Self {
            id: category.id,
            name: category.name,
            description: category.description,
            created_at: category.created_at,
        }
    }
}

impl From<FfiCategory> for Category {
    fn from(category: FfiCategory) -> Self {
        Category {
            id: category.id,
            name: category.name,
            description: category.description,
            created_at: category.created_at,
        }
    }
}

/// FFI-safe insurance provider.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiInsuranceProvider {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub created_at: String,
}

impl From<InsuranceProvider> for FfiInsuranceProvider {
    fn from(provider: InsuranceProvider) -> Self {
        Self {
            id: provider.id,
            name: provider.name,
            description: provider.description,
            created_at: provider.created_at,
        }
    }
}

impl From<FfiInsuranceProvider> for InsuranceProvider {
    fn from(provider: FfiInsuranceProvider) -> Self {
        InsuranceProvider {
            id: provider.id,
            name: provider.name,
            description: provider.description,
            created_at: provider.created_at,
        }
    }
}

/// FFI-safe dashboard counts.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiAdminCounts {
    pub insurance_providers: u32,
    pub categories: u32,
    pub patients: u32,
}

impl From<models::AdminCounts> for FfiAdminCounts {
    fn from(counts: models::AdminCounts) -> Self {
        Self {
            insurance_providers: counts.insurance_providers,
            categories: counts.categories,
            patients: counts.patients,
        }
    }
}

/// Fields needed to register a patient.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiNewPatient {
    pub name: String,
    /// `"private"` or `"insured"`
    pub kind: String,
    pub insurance_provider_id: Option<String>,
    pub category_id: Option<String>,
    pub injury_note: Option<String>,
    pub planned_sessions: u32,
}

impl TryFrom<FfiNewPatient> for Patient {
    type Error = KinelogError;

    fn try_from(new: FfiNewPatient) -> Result<Self, Self::Error> {
        let kind = parse_kind(&new.kind)?;
        let mut patient = Patient::new(required_name(new.name)?, new.planned_sessions);
        patient.category_id = new.category_id;
        patient.injury_note = new.injury_note;
        if kind == PatientKind::Insured {
            let provider_id = new.insurance_provider_id.ok_or_else(|| {
                KinelogError::InvalidInput("Insured patients need an insurance provider".into())
            })?;
            patient = patient.insured_by(provider_id);
        }
        Ok(patient)
    }
}

/// FFI-safe patient.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiPatient {
    pub id: String,
    pub name: String,
    pub kind: String,
    pub insurance_provider_id: Option<String>,
    pub category_id: Option<String>,
    pub injury_note: Option<String>,
    pub planned_sessions: u32,
    pub created_at: String,
}

impl From<Patient> for FfiPatient {
    fn from(patient: Patient) -> Self {
        Self {
            id: patient.id,
            name: patient.name,
            kind: patient.kind.as_str().to_string(),
            insurance_provider_id: patient.insurance_provider_id,
            category_id: patient.category_id,
            injury_note: patient.injury_note,
            planned_sessions: patient.planned_sessions,
            created_at: patient.created_at,
        }
    }
}

impl TryFrom<FfiPatient> for Patient {
    type Error = KinelogError;

    fn try_from(patient: FfiPatient) -> Result<Self, Self::Error> {
        Ok(Patient {
            id: patient.id,
            name: required_name(patient.name)?,
            kind: parse_kind(&patient.kind)?,
            insurance_provider_id: patient.insurance_provider_id,
            category_id: patient.category_id,
            injury_note: patient.injury_note,
            planned_sessions: patient.planned_sessions,
            created_at: patient.created_at,
        })
    }
}

/// FFI-safe patient with session progress.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiPatientSummary {
    pub patient: FfiPatient,
    pub completed_sessions: u32,
    pub remaining_sessions: u32,
}

impl From<PatientSummary> for FfiPatientSummary {
    fn from(summary: PatientSummary) -> Self {
        let remaining_sessions = summary.remaining_sessions();
        Self {
            patient: summary.patient.into(),
            completed_sessions: summary.completed_sessions,
            remaining_sessions,
        }
    }
}

/// FFI-safe patient listing page.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiPatientPage {
    pub patients: Vec<FfiPatientSummary>,
    pub total: u32,
    pub total_pages: u32,
}

impl From<PatientPage> for FfiPatientPage {
    fn from(page: PatientPage) -> Self {
        Self {
            patients: page.patients.into_iter().map(|p| p.into()).collect(),
            total: page.total,
            total_pages: page.total_pages,
        }
    }
}

/// FFI-safe session.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiSession {
    pub id: String,
    pub patient_id: String,
    pub date: String,
    pub time: String,
    /// `"green"`, `"yellow"` or `"red"`
    pub mood: String,
}

impl From<Session> for FfiSession {
    fn from(session: Session) -> Self {
        Self {
            id: session.id,
            patient_id: session.patient_id,
            date: session.date,
            time: session.time,
            mood: session.mood.as_str().to_string(),
        }
    }
}

impl TryFrom<FfiSession> for Session {
    type Error = KinelogError;

    fn try_from(session: FfiSession) -> Result<Self, Self::Error> {
        if models::parse_session_date(&session.date).is_none() {
            return Err(KinelogError::InvalidInput(format!(
                "Session date must be DD-MM-YYYY: {}",
                session.date
            )));
        }
        let parsed = Session {
            id: session.id,
            patient_id: session.patient_id,
            date: session.date,
            time: session.time,
            mood: parse_mood(&session.mood)?,
        };
        if parsed.parsed_time().is_none() {
            return Err(KinelogError::InvalidInput(format!(
                "Session time must be HH:MM: {}",
                parsed.time
            )));
        }
        Ok(parsed)
    }
}

/// FFI-safe evaluation question.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiQuestion {
    pub id: String,
    pub text: String,
    pub description: String,
}

impl From<Question> for FfiQuestion {
    fn from(question: Question) -> Self {
        Self {
            id: question.id.to_string(),
            text: question.text.to_string(),
            description: question.description.to_string(),
        }
    }
}

/// FFI-safe evaluation answer.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiEvaluationResponse {
    pub question_id: String,
    pub value: f64,
}

impl From<FfiEvaluationResponse> for EvaluationResponse {
    fn from(response: FfiEvaluationResponse) -> Self {
        EvaluationResponse::new(response.question_id, response.value)
    }
}

impl From<EvaluationResponse> for FfiEvaluationResponse {
    fn from(response: EvaluationResponse) -> Self {
        Self {
            question_id: response.question_id,
            value: response.value,
        }
    }
}

/// FFI-safe per-category average.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiCategoryAverage {
    pub category: String,
    pub average: f64,
}

/// FFI-safe evaluation.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiEvaluation {
    pub id: String,
    pub patient_id: String,
    pub session_id: String,
    pub date: String,
    pub responses: Vec<FfiEvaluationResponse>,
    /// Scored categories only
    pub category_averages: Vec<FfiCategoryAverage>,
    pub duration_minutes: Option<f64>,
    pub created_at: String,
}

impl From<Evaluation> for FfiEvaluation {
    fn from(evaluation: Evaluation) -> Self {
        let duration_minutes = evaluation.duration_minutes();
        Self {
            id: evaluation.id,
            patient_id: evaluation.patient_id,
            session_id: evaluation.session_id,
            date: evaluation.date,
            responses: evaluation.responses.into_iter().map(|r| r.into()).collect(),
            category_averages: evaluation
                .category_averages
                .into_iter()
                .map(|(category, average)| FfiCategoryAverage { category, average })
                .collect(),
            duration_minutes,
            created_at: evaluation.created_at,
        }
    }
}

/// FFI-safe evaluation history entry.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiEvaluationHistoryEntry {
    pub evaluation: FfiEvaluation,
    pub session_date: String,
    pub session_time: String,
}

impl From<EvaluationHistoryEntry> for FfiEvaluationHistoryEntry {
    fn from(entry: EvaluationHistoryEntry) -> Self {
        Self {
            evaluation: entry.evaluation.into(),
            session_date: entry.session_date,
            session_time: entry.session_time,
        }
    }
}

/// FFI-safe evaluation status.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiEvaluationStatus {
    pub pre_completed: bool,
    pub post_completed: bool,
    pub can_do_post: bool,
    pub pre_average: Option<f64>,
    pub post_average: Option<f64>,
    pub overall_average: Option<f64>,
    pub latest_session: Option<FfiSession>,
}

impl From<EvaluationStatus> for FfiEvaluationStatus {
    fn from(status: EvaluationStatus) -> Self {
        Self {
            pre_completed: status.pre_completed,
            post_completed: status.post_completed,
            can_do_post: status.can_do_post,
            pre_average: status.pre_average,
            post_average: status.post_average,
            overall_average: status.overall_average,
            latest_session: status.latest_session.map(|s| s.into()),
        }
    }
}

/// FFI-safe hour bucket.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiHourBucket {
    pub hour: u32,
    pub label: String,
    pub display_label: String,
    pub count: u32,
}

impl From<HourBucket> for FfiHourBucket {
    fn from(bucket: HourBucket) -> Self {
        Self {
            hour: bucket.hour,
            label: bucket.label,
            display_label: bucket.display_label,
            count: bucket.count,
        }
    }
}

/// FFI-safe hourly histogram.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiHourlyHistogram {
    pub buckets: Vec<FfiHourBucket>,
    pub total: u32,
    pub peak_hour: Option<u32>,
}

impl From<HourlyHistogram> for FfiHourlyHistogram {
    fn from(histogram: HourlyHistogram) -> Self {
        let peak_hour = histogram.peak().map(|b| b.hour);
        Self {
            buckets: histogram.buckets.into_iter().map(|b| b.into()).collect(),
            total: histogram.total,
            peak_hour,
        }
    }
}

/// FFI-safe period bucket. Bounds are `DD-MM-YYYY`.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiPeriodBucket {
    pub label: String,
    pub start: String,
    pub end: String,
    pub count: u32,
}

impl From<PeriodBucket> for FfiPeriodBucket {
    fn from(bucket: PeriodBucket) -> Self {
        Self {
            label: bucket.label,
            start: models::format_session_date(bucket.start),
            end: models::format_session_date(bucket.end),
            count: bucket.count,
        }
    }
}

/// FFI-safe period histogram.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiPeriodHistogram {
    pub mode: String,
    pub buckets: Vec<FfiPeriodBucket>,
    pub total: u32,
}

impl From<PeriodHistogram> for FfiPeriodHistogram {
    fn from(histogram: PeriodHistogram) -> Self {
        Self {
            mode: histogram.mode.as_str().to_string(),
            buckets: histogram.buckets.into_iter().map(|b| b.into()).collect(),
            total: histogram.total,
        }
    }
}
