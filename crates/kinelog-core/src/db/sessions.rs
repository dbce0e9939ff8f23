//! Daily session database operations.

use rusqlite::{params, Row};

use super::{Database, DbError, DbResult};
use crate::models::{Mood, Session, SessionWithPatient};

impl Database {
    /// Insert a new session.
    pub fn insert_session(&self, session: &Session) -> DbResult<()> {
        self.conn.execute(
            r#"
            INSERT INTO sessions (id, patient_id, date, time, mood)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
            params![
                session.id,
                session.patient_id,
                session.date,
                session.time,
                session.mood.as_str(),
            ],
        )?;
        tracing::debug!(session_id = %session.id, patient_id = %session.patient_id, "session logged");
        Ok(())
    }

    /// Correct the date, time or mood of a session.
    pub fn update_session(&self, session: &Session) -> DbResult<bool> {
        let rows_affected = self.conn.execute(
            "UPDATE sessions SET date = ?2, time = ?3, mood = ?4 WHERE id = ?1",
            params![
                session.id,
                session.date,
                session.time,
                session.mood.as_str()
            ],
        )?;
        Ok(rows_affected > 0)
    }

    /// Delete a session and its evaluations.
    pub fn delete_session(&self, id: &str) -> DbResult<bool> {
        let tx = self.conn.unchecked_transaction()?;
        tx.execute("DELETE FROM evaluations WHERE session_id = ?", [id])?;
        let rows_affected = tx.execute("DELETE FROM sessions WHERE id = ?", [id])?;
        tx.commit()?;
        Ok(rows_affected > 0)
    }

    /// List a patient's sessions, oldest first.
    pub fn list_sessions_for_patient(&self, patient_id: &str) -> DbResult<Vec<Session>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, patient_id, date, time, mood FROM sessions WHERE patient_id = ?",
        )?;
        let rows = stmt.query_map([patient_id], SessionRow::from_row)?;

        let mut sessions: Vec<Session> = Vec::new();
        for row in rows {
            sessions.push(row?.try_into()?);
        }
        sort_chronologically(&mut sessions);
        Ok(sessions)
    }

    /// The patient's most recent session by date, then time.
    pub fn latest_session_for_patient(&self, patient_id: &str) -> DbResult<Option<Session>> {
        Ok(self.list_sessions_for_patient(patient_id)?.pop())
    }

    /// Every stored session, as consumed by the statistics.
    pub fn list_all_sessions(&self) -> DbResult<Vec<Session>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, patient_id, date, time, mood FROM sessions")?;
        let rows = stmt.query_map([], SessionRow::from_row)?;

        let mut sessions: Vec<Session> = Vec::new();
        for row in rows {
            sessions.push(row?.try_into()?);
        }
        sort_chronologically(&mut sessions);
        Ok(sessions)
    }

    /// Every stored session with its patient's name.
    pub fn list_sessions_with_patients(&self) -> DbResult<Vec<SessionWithPatient>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT s.id, s.patient_id, s.date, s.time, s.mood, p.name
            FROM sessions s
            JOIN patients p ON p.id = s.patient_id
            "#,
        )?;
        let rows = stmt.query_map([], |row| {
            Ok((SessionRow::from_row(row)?, row.get::<_, String>(5)?))
        })?;

        let mut sessions = Vec::new();
        for row in rows {
            let (session, patient_name) = row?;
            sessions.push(SessionWithPatient {
                session: session.try_into()?,
                patient_name,
            });
        }
        Ok(sessions)
    }
}

/// Oldest first. Unparseable dates sort before every valid one.
fn sort_chronologically(sessions: &mut [Session]) {
    sessions.sort_by_key(|s| (s.parsed_date(), s.parsed_time()));
}

/// Intermediate row struct for database mapping.
struct SessionRow {
    id: String,
    patient_id: String,
    date: String,
    time: String,
    mood: String,
}

impl SessionRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            patient_id: row.get(1)?,
            date: row.get(2)?,
            time: row.get(3)?,
            mood: row.get(4)?,
        })
    }
}

impl TryFrom<SessionRow> for Session {
    type Error = DbError;

    fn try_from(row: SessionRow) -> Result<Self, Self::Error> {
        let mood = Mood::parse(&row.mood)
            .ok_or_else(|| DbError::Constraint(format!("Unknown session mood: {}", row.mood)))?;

        Ok(Session {
            id: row.id,
            patient_id: row.patient_id,
            date: row.date,
            time: row.time,
            mood,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Patient;

    fn setup_db() -> (Database, Patient) {
        let db = Database::open_in_memory().unwrap();
        let patient = Patient::new("Ana".into(), 10);
        db.insert_patient(&patient).unwrap();
        (db, patient)
    }

    fn session_at(patient_id: &str, date: &str, time: &str) -> Session {
        let mut session = Session::new(patient_id.into(), Mood::Green);
        session.date = date.into();
        session.time = time.into();
        session
    }

    #[test]
    fn test_insert_and_list() {
        let (db, patient) = setup_db();
        let session = Session::new(patient.id.clone(), Mood::Yellow);
        db.insert_session(&session).unwrap();

        let sessions = db.list_sessions_for_patient(&patient.id).unwrap();
        assert_eq!(sessions, vec![session]);
    }

    #[test]
    fn test_update_session() {
        let (db, patient) = setup_db();
        let mut session = Session::new(patient.id.clone(), Mood::Green);
        db.insert_session(&session).unwrap();

        session.mood = Mood::Red;
        session.time = "08:15".into();
        assert!(db.update_session(&session).unwrap());

        let stored = db.list_sessions_for_patient(&patient.id).unwrap();
        assert_eq!(stored[0].mood, Mood::Red);
        assert_eq!(stored[0].time, "08:15");
    }

    #[test]
    fn test_latest_session_uses_calendar_order() {
        let (db, patient) = setup_db();
        db.insert_session(&session_at(&patient.id, "30-09-2026", "18:00"))
            .unwrap();
        db.insert_session(&session_at(&patient.id, "02-10-2026", "09:00"))
            .unwrap();
        db.insert_session(&session_at(&patient.id, "02-10-2026", "17:30"))
            .unwrap();

        let latest = db.latest_session_for_patient(&patient.id).unwrap().unwrap();
        assert_eq!(latest.date, "02-10-2026");
        assert_eq!(latest.time, "17:30");
    }

    #[test]
    fn test_latest_session_none() {
        let (db, patient) = setup_db();
        assert!(db.latest_session_for_patient(&patient.id).unwrap().is_none());
    }

    #[test]
    fn test_delete_session_removes_evaluations() {
        let (db, patient) = setup_db();
        let session = Session::new(patient.id.clone(), Mood::Green);
        db.insert_session(&session).unwrap();
        db.upsert_evaluation(
            &patient.id,
            &session.id,
            "2026-10-18",
            vec![crate::models::EvaluationResponse::new("eva_post", 2.0)],
        )
        .unwrap();

        assert!(db.delete_session(&session.id).unwrap());
        assert!(db
            .list_evaluation_records_for_session(&session.id)
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_sessions_with_patients() {
        let (db, patient) = setup_db();
        db.insert_session(&Session::new(patient.id.clone(), Mood::Green))
            .unwrap();

        let rows = db.list_sessions_with_patients().unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].patient_name, "Ana");
    }

    #[test]
    fn test_legacy_mood_names_are_read() {
        let (db, patient) = setup_db();
        // Older rows stored Spanish mood names.
        db.conn()
            .execute_batch("PRAGMA ignore_check_constraints = ON;")
            .unwrap();
        db.conn()
            .execute(
                "INSERT INTO sessions (id, patient_id, date, time, mood) VALUES ('s1', ?, '01-10-2026', '10:00', 'rojo')",
                [&patient.id],
            )
            .unwrap();

        let sessions = db.list_sessions_for_patient(&patient.id).unwrap();
        assert_eq!(sessions[0].mood, Mood::Red);
    }
}
