use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use uuid::Uuid;
use validator::Validate;

use crate::models::history::HistoryRow;
use crate::models::problem::AnswerOption;

/// Body of `POST /api/generate-problem`. Every field is optional and the
/// body itself may be absent; unknown difficulties coerce to medium later.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GenerateProblemPayload {
    pub difficulty: Option<String>,
    pub topic: Option<String>,
    pub user_id: Option<String>,
}

/// A submitted answer. Accepts a JSON number or a numeric string
/// ("42" grades the same as 42); anything else is a deserialization error.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnswerValue(pub f64);

impl<'de> Deserialize<'de> for AnswerValue {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = JsonValue::deserialize(deserializer)?;
        match raw {
            JsonValue::Number(n) => n
                .as_f64()
                .map(AnswerValue)
                .ok_or_else(|| serde::de::Error::custom("user_answer is out of numeric range")),
            JsonValue::String(s) => s
                .trim()
                .parse::<f64>()
                .map(AnswerValue)
                .map_err(|_| serde::de::Error::custom("user_answer is not numeric")),
            _ => Err(serde::de::Error::custom("user_answer must be a number")),
        }
    }
}

impl Serialize for AnswerValue {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_f64(self.0)
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SubmitAnswerPayload {
    pub session_id: Option<String>,
    pub user_answer: Option<AnswerValue>,
    #[validate(range(min = 0))]
    pub time_spent_seconds: Option<i32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateProblemResponse {
    pub session_id: Uuid,
    pub problem_text: String,
    pub final_answer: f64,
    pub options: Vec<AnswerOption>,
    pub difficulty: String,
    pub topic: Option<String>,
    pub hint: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitAnswerResponse {
    pub is_correct: bool,
    pub feedback: String,
    pub correct_answer: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HistoryQuery {
    pub user_id: Option<String>,
}

/// One answered problem as served to history views. Mirrors the session
/// row plus the earliest submission, with nullable columns defaulted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub session_id: Uuid,
    pub created_at: Option<DateTime<Utc>>,
    pub problem_text: String,
    pub correct_answer: f64,
    pub options: JsonValue,
    pub difficulty: String,
    pub topic: Option<String>,
    pub hint_text: Option<String>,
    pub user_answer: f64,
    pub is_correct: bool,
    pub feedback_text: String,
    pub hint_used: bool,
    pub time_spent_seconds: i32,
    pub submitted_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryResponse {
    pub history: Vec<HistoryEntry>,
}

impl From<HistoryRow> for HistoryEntry {
    fn from(row: HistoryRow) -> Self {
        HistoryEntry {
            session_id: row.session_id,
            created_at: row.created_at,
            problem_text: row.problem_text,
            correct_answer: row.correct_answer,
            options: row.options,
            difficulty: row.difficulty.unwrap_or_else(|| "medium".to_string()),
            topic: row.topic,
            hint_text: row.hint_text,
            user_answer: row.user_answer,
            is_correct: row.is_correct,
            feedback_text: row.feedback_text,
            hint_used: row.hint_used.unwrap_or(false),
            time_spent_seconds: row.time_spent_seconds,
            submitted_at: row.submitted_at,
        }
    }
}
