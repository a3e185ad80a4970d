use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// One graded answer against a problem session.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ProblemSubmission {
    pub id: Uuid,
    pub session_id: Uuid,
    pub user_answer: f64,
    pub is_correct: bool,
    pub feedback_text: String,
    pub time_spent_seconds: i32,
    pub hint_used: bool,
    pub created_at: Option<DateTime<Utc>>,
}

/// Insert parameters for a new submission.
#[derive(Debug, Clone)]
pub struct NewProblemSubmission {
    pub session_id: Uuid,
    pub user_answer: f64,
    pub is_correct: bool,
    pub feedback_text: String,
    pub time_spent_seconds: i32,
}
