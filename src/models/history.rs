use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use sqlx::FromRow;
use uuid::Uuid;

/// A session joined with its earliest submission, as read back by the
/// history query. Only answered sessions appear here.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct HistoryRow {
    pub session_id: Uuid,
    pub problem_text: String,
    pub correct_answer: f64,
    pub options: JsonValue,
    pub difficulty: Option<String>,
    pub topic: Option<String>,
    pub hint_text: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub user_answer: f64,
    pub is_correct: bool,
    pub feedback_text: String,
    pub time_spent_seconds: i32,
    pub hint_used: Option<bool>,
    pub submitted_at: Option<DateTime<Utc>>,
}
