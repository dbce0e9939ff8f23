//! SQLite schema definition.

/// Complete database schema for kinelog.
pub const SCHEMA: &str = r#"
-- Enable foreign keys
PRAGMA foreign_keys = ON;

-- ============================================================================
-- Lookup Tables
-- ============================================================================

CREATE TABLE IF NOT EXISTS categories (
    id TEXT PRIMARY KEY,
    name TEXT NOT NULL,
    description TEXT,
    created_at TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE TABLE IF NOT EXISTS insurance_providers (
    id TEXT PRIMARY KEY,
    name TEXT NOT NULL,
    description TEXT,
    created_at TEXT NOT NULL DEFAULT (datetime('now'))
);

-- ============================================================================
-- Patients
-- ============================================================================

CREATE TABLE IF NOT EXISTS patients (
    id TEXT PRIMARY KEY,
    name TEXT NOT NULL,
    kind TEXT NOT NULL CHECK (kind IN ('private', 'insured')),
    insurance_provider_id TEXT REFERENCES insurance_providers(id),
    category_id TEXT REFERENCES categories(id),
    injury_note TEXT,
    planned_sessions INTEGER NOT NULL DEFAULT 0 CHECK (planned_sessions >= 0),
    created_at TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE INDEX IF NOT EXISTS idx_patients_name ON patients(name);
CREATE INDEX IF NOT EXISTS idx_patients_category ON patients(category_id);
CREATE INDEX IF NOT EXISTS idx_patients_provider ON patients(insurance_provider_id);

-- ============================================================================
-- Daily Sessions
-- ============================================================================

CREATE TABLE IF NOT EXISTS sessions (
    id TEXT PRIMARY KEY,
    patient_id TEXT NOT NULL REFERENCES patients(id),
    date TEXT NOT NULL,                          -- DD-MM-YYYY
    time TEXT NOT NULL,                          -- HH:MM (24h)
    mood TEXT NOT NULL CHECK (mood IN ('green', 'yellow', 'red'))
);

CREATE INDEX IF NOT EXISTS idx_sessions_patient ON sessions(patient_id);
CREATE INDEX IF NOT EXISTS idx_sessions_date ON sessions(date);

-- ============================================================================
-- Evaluations (one per session, merged on resubmission)
-- ============================================================================

CREATE TABLE IF NOT EXISTS evaluations (
    id TEXT PRIMARY KEY,
    patient_id TEXT NOT NULL REFERENCES patients(id),
    session_id TEXT NOT NULL REFERENCES sessions(id),
    date TEXT NOT NULL,                          -- YYYY-MM-DD
    responses TEXT,                              -- JSON array of {questionId, value}
    category_averages TEXT,                      -- JSON object {category: average}
    created_at TEXT DEFAULT (datetime('now'))
);

CREATE INDEX IF NOT EXISTS idx_evaluations_session ON evaluations(session_id);
CREATE INDEX IF NOT EXISTS idx_evaluations_patient ON evaluations(patient_id);
"#;
