//! Pre/post-session evaluation models.
//!
//! An evaluation holds the 0-10 self-report answers a patient gives before and after a
//! session. Both halves live in one record per session; the `_pre` / `_post` suffix of a
//! question id is the only thing telling them apart.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Prefix of the session-duration question. It is recorded but never scored.
pub const DURATION_QUESTION_PREFIX: &str = "minutos_sesion";

/// One answer inside an evaluation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EvaluationResponse {
    pub question_id: String,
    pub value: f64,
}

impl EvaluationResponse {
    pub fn new(question_id: impl Into<String>, value: f64) -> Self {
        Self {
            question_id: question_id.into(),
            value,
        }
    }

    /// Whether this answer is the non-scored duration field.
    pub fn is_duration(&self) -> bool {
        is_duration_question(&self.question_id)
    }
}

/// Which half of the assessment a question belongs to.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Pre,
    Post,
}

impl Phase {
    /// Tag carried by question ids of this phase.
    pub fn tag(&self) -> &'static str {
        match self {
            Phase::Pre => "_pre",
            Phase::Post => "_post",
        }
    }

    /// Whether the question id belongs to this phase.
    pub fn matches(&self, question_id: &str) -> bool {
        question_id.contains(self.tag())
    }

    /// Fixed question set asked in this phase.
    pub fn questions(&self) -> &'static [Question] {
        match self {
            Phase::Pre => PRE_QUESTIONS,
            Phase::Post => POST_QUESTIONS,
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pre" => Some(Phase::Pre),
            "post" => Some(Phase::Post),
            _ => None,
        }
    }
}

/// A question of the evaluation form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Question {
    pub id: &'static str,
    pub text: &'static str,
    pub description: &'static str,
}

pub const PRE_QUESTIONS: &[Question] = &[
    Question {
        id: "stress_pre",
        text: "¿Cuán estresado estás hoy?",
        description: "0 = Sin estrés, 10 = Extremadamente estresado",
    },
    Question {
        id: "sueno_pre",
        text: "¿Cómo dormiste anoche?",
        description: "0 = Muy mal, 10 = Excelente",
    },
    Question {
        id: "fatiga_pre",
        text: "¿Qué tan fatigado estás hoy?",
        description: "0 = Sin fatiga, 10 = Extremadamente fatigado",
    },
    Question {
        id: "dolor_muscular_pre",
        text: "¿Cuánto te duelen los músculos?",
        description: "0 = Sin dolor, 10 = Dolor extremo",
    },
];

pub const POST_QUESTIONS: &[Question] = &[
    Question {
        id: "percepcion_esfuerzo_post",
        text: "¿Qué tan intensa sentiste la sesión de hoy?",
        description: "0 = Muy suave, 10 = Extremadamente intensa",
    },
    Question {
        id: "eva_post",
        text: "¿Con cuánto dolor terminaste?",
        description: "0 = Sin dolor, 10 = Dolor extremo",
    },
    Question {
        id: "minutos_sesion_post",
        text: "Minutos de sesión:",
        description: "Ingresa la duración de la sesión en minutos",
    },
];

/// Whether the question id marks the non-scored session-duration field.
pub fn is_duration_question(question_id: &str) -> bool {
    question_id.starts_with(DURATION_QUESTION_PREFIX)
}

/// Category of a question: its id without the phase tag.
pub fn category_of(question_id: &str) -> &str {
    question_id
        .strip_suffix(Phase::Pre.tag())
        .or_else(|| question_id.strip_suffix(Phase::Post.tag()))
        .unwrap_or(question_id)
}

/// Fill a partial answer set up to the full question list of `phase`.
///
/// Unanswered scored questions default to the neutral 5, the duration question to 0.
/// Answers to questions outside the phase's list are dropped.
pub fn complete_responses(phase: Phase, partial: &[EvaluationResponse]) -> Vec<EvaluationResponse> {
    phase
        .questions()
        .iter()
        .map(|question| {
            partial
                .iter()
                .rev()
                .find(|r| r.question_id == question.id)
                .cloned()
                .unwrap_or_else(|| {
                    let default = if is_duration_question(question.id) {
                        0.0
                    } else {
                        crate::config::NEUTRAL_SCORE
                    };
                    EvaluationResponse::new(question.id, default)
                })
        })
        .collect()
}

/// Mean answer per category, rounded to one decimal.
///
/// The duration field is not a score and gets no entry.
pub fn category_averages(responses: &[EvaluationResponse]) -> BTreeMap<String, f64> {
    let mut sums: BTreeMap<String, (f64, u32)> = BTreeMap::new();
    for response in responses.iter().filter(|r| !r.is_duration()) {
        let entry = sums
            .entry(category_of(&response.question_id).to_string())
            .or_insert((0.0, 0));
        entry.0 += response.value;
        entry.1 += 1;
    }

    sums.into_iter()
        .map(|(category, (sum, count))| (category, round_one_decimal(sum / count as f64)))
        .collect()
}

/// Round half away from zero to one decimal place.
pub fn round_one_decimal(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// A parsed evaluation, one per session in steady state.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Evaluation {
    pub id: String,
    pub patient_id: String,
    pub session_id: String,
    /// Submission date (`YYYY-MM-DD`)
    pub date: String,
    /// Answers in submission order
    pub responses: Vec<EvaluationResponse>,
    pub category_averages: BTreeMap<String, f64>,
    pub created_at: String,
}

impl Evaluation {
    /// Create an evaluation for a session, computing its category averages.
    pub fn new(
        patient_id: String,
        session_id: String,
        date: String,
        responses: Vec<EvaluationResponse>,
    ) -> Self {
        let category_averages = category_averages(&responses);
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            patient_id,
            session_id,
            date,
            responses,
            category_averages,
            created_at: chrono::Utc::now().to_rfc3339(),
        }
    }

    /// Upsert `incoming` answers by question id.
    ///
    /// A shared id takes the incoming value at its original position; new ids are appended.
    pub fn merge(&mut self, incoming: Vec<EvaluationResponse>) {
        for response in incoming {
            match self
                .responses
                .iter_mut()
                .find(|r| r.question_id == response.question_id)
            {
                Some(existing) => existing.value = response.value,
                None => self.responses.push(response),
            }
        }
        self.category_averages = category_averages(&self.responses);
    }

    /// Answers belonging to `phase`.
    pub fn responses_for(&self, phase: Phase) -> impl Iterator<Item = &EvaluationResponse> {
        self.responses
            .iter()
            .filter(move |r| phase.matches(&r.question_id))
    }

    /// Recorded session length in minutes, if the duration question was answered.
    pub fn duration_minutes(&self) -> Option<f64> {
        self.responses
            .iter()
            .rev()
            .find(|r| r.is_duration())
            .map(|r| r.value)
    }

    /// Whether any answer of `phase` was recorded.
    pub fn has_phase(&self, phase: Phase) -> bool {
        self.responses_for(phase).next().is_some()
    }

    /// Serialize the answers as stored in the `responses` column.
    pub fn responses_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(&self.responses)
    }

    /// Serialize the averages as stored in the `category_averages` column.
    pub fn averages_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(&self.category_averages)
    }
}

/// An evaluation row as stored, before its JSON columns are interpreted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EvaluationRecord {
    pub id: String,
    pub patient_id: String,
    pub session_id: String,
    pub date: String,
    pub responses_json: Option<String>,
    pub averages_json: Option<String>,
    pub created_at: Option<String>,
}

impl EvaluationRecord {
    /// Interpret the stored answers.
    ///
    /// A missing column reads as no answers.
    pub fn parse_responses(&self) -> Result<Vec<EvaluationResponse>, serde_json::Error> {
        match self.responses_json.as_deref() {
            Some(json) => serde_json::from_str(json),
            None => Ok(Vec::new()),
        }
    }
}

/// An evaluation listed in a patient's history, with its session's date and time.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EvaluationHistoryEntry {
    pub evaluation: Evaluation,
    pub session_date: String,
    pub session_time: String,
}
