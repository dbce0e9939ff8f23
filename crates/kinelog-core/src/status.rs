//! Pre/post evaluation status of a patient's latest session.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::NEUTRAL_SCORE;
use crate::models::{round_one_decimal, EvaluationRecord, EvaluationResponse, Phase, Session};

/// What has been evaluated for the latest session, and the resulting scores.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct EvaluationStatus {
    pub pre_completed: bool,
    pub post_completed: bool,
    /// The pre half is in and the post half is still missing
    pub can_do_post: bool,
    pub pre_average: Option<f64>,
    pub post_average: Option<f64>,
    pub overall_average: Option<f64>,
    pub latest_session: Option<Session>,
}

/// Derive the evaluation status from the records stored for `latest_session`.
///
/// Records whose answers are missing, unreadable or empty are skipped. Several records
/// for the same session are pooled.
pub fn resolve_status(
    latest_session: Option<Session>,
    records: &[EvaluationRecord],
) -> EvaluationStatus {
    let Some(session) = latest_session else {
        return EvaluationStatus::default();
    };

    let mut pre: Vec<EvaluationResponse> = Vec::new();
    let mut post: Vec<EvaluationResponse> = Vec::new();

    for record in records {
        let responses = match record.parse_responses() {
            Ok(responses) => responses,
            Err(e) => {
                warn!(evaluation_id = %record.id, error = %e, "skipping unreadable evaluation");
                continue;
            }
        };
        if responses.is_empty() {
            debug!(evaluation_id = %record.id, "skipping evaluation without answers");
            continue;
        }

        for response in responses {
            if Phase::Pre.matches(&response.question_id) {
                pre.push(response.clone());
            }
            if Phase::Post.matches(&response.question_id) {
                post.push(response);
            }
        }
    }

    let pre_average = (!pre.is_empty()).then(|| scored_average(&pre));
    let post_average = (!post.is_empty()).then(|| scored_average(&post));

    let overall_average = match (pre_average, post_average) {
        (Some(a), Some(b)) => Some(round_one_decimal((a + b) / 2.0)),
        (a, b) => a.or(b),
    };

    let pre_completed = pre_average.is_some();
    let post_completed = post_average.is_some();

    EvaluationStatus {
        pre_completed,
        post_completed,
        can_do_post: pre_completed && !post_completed,
        pre_average,
        post_average,
        overall_average,
        latest_session: Some(session),
    }
}

/// Mean of the scored answers, rounded to one decimal.
///
/// The duration field is left out. An empty scored set yields the neutral midpoint.
pub fn scored_average(responses: &[EvaluationResponse]) -> f64 {
    let scored: Vec<f64> = responses
        .iter()
        .filter(|r| !r.is_duration())
        .map(|r| r.value)
        .collect();

    if scored.is_empty() {
        return NEUTRAL_SCORE;
    }
    round_one_decimal(scored.iter().sum::<f64>() / scored.len() as f64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Mood;

    fn session() -> Session {
        Session {
            id: "s1".into(),
            patient_id: "p1".into(),
            date: "18-10-2026".into(),
            time: "10:00".into(),
            mood: Mood::Green,
        }
    }

    fn record(id: &str, responses_json: Option<&str>) -> EvaluationRecord {
        EvaluationRecord {
            id: id.into(),
            patient_id: "p1".into(),
            session_id: "s1".into(),
            date: "2026-10-18".into(),
            responses_json: responses_json.map(Into::into),
            averages_json: None,
            created_at: None,
        }
    }

    #[test]
    fn test_no_session() {
        let status = resolve_status(None, &[record("e1", Some(r#"[{"questionId":"a_pre","value":3}]"#))]);
        assert_eq!(status, EvaluationStatus::default());
    }

    #[test]
    fn test_no_evaluations() {
        let status = resolve_status(Some(session()), &[]);
        assert!(!status.pre_completed);
        assert!(!status.post_completed);
        assert!(!status.can_do_post);
        assert_eq!(status.pre_average, None);
        assert_eq!(status.post_average, None);
        assert_eq!(status.overall_average, None);
        assert_eq!(status.latest_session, Some(session()));
    }

    #[test]
    fn test_pre_only() {
        let records = [record(
            "e1",
            Some(r#"[{"questionId":"q_pre","value":8},{"questionId":"q2_pre","value":6}]"#),
        )];
        let status = resolve_status(Some(session()), &records);
        assert!(status.pre_completed);
        assert_eq!(status.pre_average, Some(7.0));
        assert!(!status.post_completed);
        assert!(status.can_do_post);
        assert_eq!(status.overall_average, Some(7.0));
    }

    #[test]
    fn test_duration_excluded_from_average() {
        let records = [record(
            "e1",
            Some(r#"[{"questionId":"minutos_sesion_post","value":45},{"questionId":"dolor_post","value":3}]"#),
        )];
        let status = resolve_status(Some(session()), &records);
        assert!(status.post_completed);
        assert_eq!(status.post_average, Some(3.0));
        assert!(!status.can_do_post);
    }

    #[test]
    fn test_only_duration_defaults_to_neutral() {
        let records = [record("e1", Some(r#"[{"questionId":"minutos_sesion_post","value":50}]"#))];
        let status = resolve_status(Some(session()), &records);
        assert!(status.post_completed);
        assert_eq!(status.post_average, Some(5.0));
    }

    #[test]
    fn test_both_phases_overall_rounded() {
        let records = [record(
            "e1",
            Some(r#"[{"questionId":"a_pre","value":7},{"questionId":"b_pre","value":8},{"questionId":"c_post","value":2}]"#),
        )];
        let status = resolve_status(Some(session()), &records);
        assert_eq!(status.pre_average, Some(7.5));
        assert_eq!(status.post_average, Some(2.0));
        assert_eq!(status.overall_average, Some(4.8));
        assert!(!status.can_do_post);
    }

    #[test]
    fn test_malformed_records_are_skipped() {
        let records = [
            record("broken", Some("{not json")),
            record("missing", None),
            record("empty", Some("[]")),
            record("wrong-shape", Some(r#"{"questionId":"a_pre"}"#)),
            record("ok", Some(r#"[{"questionId":"eva_post","value":4}]"#)),
        ];
        let status = resolve_status(Some(session()), &records);
        assert!(!status.pre_completed);
        assert!(status.post_completed);
        assert_eq!(status.post_average, Some(4.0));
    }

    #[test]
    fn test_multiple_records_are_pooled() {
        let records = [
            record("pre", Some(r#"[{"questionId":"a_pre","value":4}]"#)),
            record("post", Some(r#"[{"questionId":"b_post","value":6},{"questionId":"c_post","value":9}]"#)),
        ];
        let status = resolve_status(Some(session()), &records);
        assert!(status.pre_completed);
        assert!(status.post_completed);
        assert_eq!(status.pre_average, Some(4.0));
        assert_eq!(status.post_average, Some(7.5));
        assert_eq!(status.overall_average, Some(5.8));
    }
}
