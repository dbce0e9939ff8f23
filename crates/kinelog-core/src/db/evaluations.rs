//! Evaluation database operations.

use std::collections::BTreeMap;

use rusqlite::{params, OptionalExtension, Row};

use super::{Database, DbError, DbResult};
use crate::models::{
    category_averages, is_duration_question, Evaluation, EvaluationHistoryEntry,
    EvaluationRecord, EvaluationResponse,
};
use crate::status::{resolve_status, EvaluationStatus};

const RECORD_COLUMNS: &str =
    "e.id, e.patient_id, e.session_id, e.date, e.responses, e.category_averages, e.created_at";

impl Database {
    /// Store answers for a session, merging into its existing evaluation.
    ///
    /// Answers sharing a question id with the stored ones overwrite them; the rest are
    /// appended. A stored evaluation that cannot be read is replaced.
    pub fn upsert_evaluation(
        &self,
        patient_id: &str,
        session_id: &str,
        date: &str,
        responses: Vec<EvaluationResponse>,
    ) -> DbResult<Evaluation> {
        let tx = self.conn.unchecked_transaction()?;

        let owner: Option<String> = tx
            .query_row(
                "SELECT patient_id FROM sessions WHERE id = ?",
                [session_id],
                |row| row.get(0),
            )
            .optional()?;
        match owner {
            None => return Err(DbError::NotFound(format!("session {}", session_id))),
            Some(owner) if owner != patient_id => {
                return Err(DbError::Constraint(format!(
                    "session {} does not belong to patient {}",
                    session_id, patient_id
                )))
            }
            Some(_) => {}
        }

        let existing = tx
            .query_row(
                &format!(
                    "SELECT {} FROM evaluations e WHERE e.session_id = ? ORDER BY e.created_at, e.rowid LIMIT 1",
                    RECORD_COLUMNS
                ),
                [session_id],
                record_from_row,
            )
            .optional()?;

        let evaluation = match existing {
            Some(record) => {
                let record_id = record.id.clone();
                let evaluation = match Evaluation::try_from(record) {
                    Ok(mut stored) => {
                        stored.merge(responses);
                        stored
                    }
                    Err(e) => {
                        tracing::warn!(evaluation_id = %record_id, error = %e, "replacing unreadable evaluation");
                        let mut fresh = Evaluation::new(
                            patient_id.to_string(),
                            session_id.to_string(),
                            date.to_string(),
                            responses,
                        );
                        fresh.id = record_id;
                        fresh
                    }
                };

                tx.execute(
                    "UPDATE evaluations SET responses = ?2, category_averages = ?3 WHERE id = ?1",
                    params![
                        evaluation.id,
                        evaluation.responses_json()?,
                        evaluation.averages_json()?
                    ],
                )?;
                tracing::debug!(evaluation_id = %evaluation.id, "evaluation merged");
                evaluation
            }
            None => {
                let evaluation = Evaluation::new(
                    patient_id.to_string(),
                    session_id.to_string(),
                    date.to_string(),
                    responses,
                );
                tx.execute(
                    r#"
                    INSERT INTO evaluations (
                        id, patient_id, session_id, date, responses, category_averages, created_at
                    ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                    "#,
                    params![
                        evaluation.id,
                        evaluation.patient_id,
                        evaluation.session_id,
                        evaluation.date,
                        evaluation.responses_json()?,
                        evaluation.averages_json()?,
                        evaluation.created_at,
                    ],
                )?;
                tracing::debug!(evaluation_id = %evaluation.id, "evaluation created");
                evaluation
            }
        };

        tx.commit()?;
        Ok(evaluation)
    }

    /// Raw evaluation rows stored for a session, oldest first.
    pub fn list_evaluation_records_for_session(
        &self,
        session_id: &str,
    ) -> DbResult<Vec<EvaluationRecord>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM evaluations e WHERE e.session_id = ? ORDER BY e.created_at, e.rowid",
            RECORD_COLUMNS
        ))?;
        let rows = stmt.query_map([session_id], record_from_row)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    /// A patient's evaluation history, newest first, with the session each belongs to.
    ///
    /// Rows that cannot be read are skipped.
    pub fn list_evaluations_for_patient(
        &self,
        patient_id: &str,
    ) -> DbResult<Vec<EvaluationHistoryEntry>> {
        let mut stmt = self.conn.prepare(&format!(
            r#"
            SELECT {}, s.date, s.time
            FROM evaluations e
            JOIN sessions s ON s.id = e.session_id
            WHERE e.patient_id = ?
            ORDER BY e.created_at DESC, e.rowid DESC
            "#,
            RECORD_COLUMNS
        ))?;
        let rows = stmt.query_map([patient_id], |row| {
            Ok((
                record_from_row(row)?,
                row.get::<_, String>(7)?,
                row.get::<_, String>(8)?,
            ))
        })?;

        let mut history = Vec::new();
        for row in rows {
            let (record, session_date, session_time) = row?;
            let record_id = record.id.clone();
            match Evaluation::try_from(record) {
                Ok(evaluation) => history.push(EvaluationHistoryEntry {
                    evaluation,
                    session_date,
                    session_time,
                }),
                Err(e) => {
                    tracing::warn!(evaluation_id = %record_id, error = %e, "skipping unreadable evaluation")
                }
            }
        }
        Ok(history)
    }

    /// Evaluation status of the patient's latest session.
    pub fn evaluation_status(&self, patient_id: &str) -> DbResult<EvaluationStatus> {
        let latest = self.latest_session_for_patient(patient_id)?;
        let records = match &latest {
            Some(session) => self.list_evaluation_records_for_session(&session.id)?,
            None => Vec::new(),
        };
        Ok(resolve_status(latest, &records))
    }
}

fn record_from_row(row: &Row<'_>) -> rusqlite::Result<EvaluationRecord> {
    Ok(EvaluationRecord {
        id: row.get(0)?,
        patient_id: row.get(1)?,
        session_id: row.get(2)?,
        date: row.get(3)?,
        responses_json: row.get(4)?,
        averages_json: row.get(5)?,
        created_at: row.get(6)?,
    })
}

impl TryFrom<EvaluationRecord> for Evaluation {
    type Error = DbError;

    fn try_from(record: EvaluationRecord) -> Result<Self, Self::Error> {
        let json = record
            .responses_json
            .as_deref()
            .ok_or_else(|| DbError::Constraint(format!("evaluation {} has no responses", record.id)))?;
        let responses: Vec<EvaluationResponse> = serde_json::from_str(json)?;

        let averages = record
            .averages_json
            .as_deref()
            .and_then(|json| serde_json::from_str::<BTreeMap<String, f64>>(json).ok())
            .map(|mut averages| {
                averages.retain(|category, _| !is_duration_question(category));
                averages
            })
            .unwrap_or_else(|| category_averages(&responses));

        Ok(Evaluation {
            id: record.id,
            patient_id: record.patient_id,
            session_id: record.session_id,
            date: record.date,
            responses,
            category_averages: averages,
            created_at: record.created_at.unwrap_or_default(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Mood, Patient, Session};

    fn setup_db() -> (Database, Patient, Session) {
        let db = Database::open_in_memory().unwrap();
        let patient = Patient::new("Ana".into(), 10);
        db.insert_patient(&patient).unwrap();
        let session = Session::new(patient.id.clone(), Mood::Green);
        db.insert_session(&session).unwrap();
        (db, patient, session)
    }

    fn responses(pairs: &[(&str, f64)]) -> Vec<EvaluationResponse> {
        pairs
            .iter()
            .map(|(id, value)| EvaluationResponse::new(*id, *value))
            .collect()
    }

    #[test]
    fn test_first_submission_inserts() {
        let (db, patient, session) = setup_db();

        let evaluation = db
            .upsert_evaluation(&patient.id, &session.id, "2026-10-18", responses(&[("stress_pre", 6.0)]))
            .unwrap();

        let records = db.list_evaluation_records_for_session(&session.id).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id, evaluation.id);
        assert_eq!(evaluation.category_averages.get("stress"), Some(&6.0));
    }

    #[test]
    fn test_second_submission_merges() {
        let (db, patient, session) = setup_db();

        let first = db
            .upsert_evaluation(
                &patient.id,
                &session.id,
                "2026-10-18",
                responses(&[("stress_pre", 6.0), ("sueno_pre", 8.0)]),
            )
            .unwrap();
        let second = db
            .upsert_evaluation(
                &patient.id,
                &session.id,
                "2026-10-18",
                responses(&[("sueno_pre", 3.0), ("eva_post", 2.0)]),
            )
            .unwrap();

        assert_eq!(first.id, second.id);
        let records = db.list_evaluation_records_for_session(&session.id).unwrap();
        assert_eq!(records.len(), 1);

        let stored = Evaluation::try_from(records[0].clone()).unwrap();
        assert_eq!(
            stored.responses,
            responses(&[("stress_pre", 6.0), ("sueno_pre", 3.0), ("eva_post", 2.0)])
        );
        assert_eq!(stored.category_averages.get("sueno"), Some(&3.0));
    }

    #[test]
    fn test_stored_duration_average_is_dropped() {
        let (db, patient, session) = setup_db();
        db.conn()
            .execute(
                r#"INSERT INTO evaluations (id, patient_id, session_id, date, responses, category_averages)
                   VALUES ('old', ?1, ?2, '2026-10-18',
                           '[{"questionId":"eva_post","value":3},{"questionId":"minutos_sesion_post","value":45}]',
                           '{"eva":3.0,"minutos_sesion":45.0}')"#,
                [&patient.id, &session.id],
            )
            .unwrap();

        let history = db.list_evaluations_for_patient(&patient.id).unwrap();
        let evaluation = &history[0].evaluation;
        assert_eq!(evaluation.category_averages.len(), 1);
        assert_eq!(evaluation.category_averages.get("eva"), Some(&3.0));
        assert_eq!(evaluation.duration_minutes(), Some(45.0));
    }

    #[test]
    fn test_unknown_session_rejected() {
        let (db, patient, _) = setup_db();
        let result = db.upsert_evaluation(&patient.id, "missing", "2026-10-18", vec![]);
        assert!(matches!(result, Err(DbError::NotFound(_))));
    }

    #[test]
    fn test_foreign_session_rejected() {
        let (db, _, session) = setup_db();
        let other = Patient::new("Bruno".into(), 5);
        db.insert_patient(&other).unwrap();

        let result = db.upsert_evaluation(&other.id, &session.id, "2026-10-18", vec![]);
        assert!(matches!(result, Err(DbError::Constraint(_))));
    }

    #[test]
    fn test_unreadable_record_is_replaced() {
        let (db, patient, session) = setup_db();
        db.conn()
            .execute(
                "INSERT INTO evaluations (id, patient_id, session_id, date, responses) VALUES ('bad', ?1, ?2, '2026-10-18', 'garbage')",
                [&patient.id, &session.id],
            )
            .unwrap();

        let evaluation = db
            .upsert_evaluation(&patient.id, &session.id, "2026-10-18", responses(&[("eva_post", 1.0)]))
            .unwrap();
        assert_eq!(evaluation.id, "bad");

        let records = db.list_evaluation_records_for_session(&session.id).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].parse_responses().unwrap(), responses(&[("eva_post", 1.0)]));
    }

    #[test]
    fn test_patient_history_skips_unreadable() {
        let (db, patient, session) = setup_db();
        db.upsert_evaluation(&patient.id, &session.id, "2026-10-18", responses(&[("stress_pre", 4.0)]))
            .unwrap();

        let other_session = Session::new(patient.id.clone(), Mood::Red);
        db.insert_session(&other_session).unwrap();
        db.conn()
            .execute(
                "INSERT INTO evaluations (id, patient_id, session_id, date, responses) VALUES ('bad', ?1, ?2, '2026-10-18', NULL)",
                [&patient.id, &other_session.id],
            )
            .unwrap();

        let history = db.list_evaluations_for_patient(&patient.id).unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].session_date, session.date);
        assert_eq!(history[0].session_time, session.time);
    }

    #[test]
    fn test_status_follows_latest_session() {
        let (db, patient, session) = setup_db();
        assert!(!db.evaluation_status(&patient.id).unwrap().pre_completed);

        db.upsert_evaluation(
            &patient.id,
            &session.id,
            "2026-10-18",
            responses(&[("stress_pre", 8.0), ("sueno_pre", 6.0)]),
        )
        .unwrap();
        let status = db.evaluation_status(&patient.id).unwrap();
        assert!(status.can_do_post);
        assert_eq!(status.pre_average, Some(7.0));
        assert_eq!(status.latest_session.map(|s| s.id), Some(session.id));
    }

    #[test]
    fn test_status_without_sessions() {
        let db = Database::open_in_memory().unwrap();
        let patient = Patient::new("Sin sesiones".into(), 4);
        db.insert_patient(&patient).unwrap();
        assert_eq!(db.evaluation_status(&patient.id).unwrap(), EvaluationStatus::default());
    }
}
