use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use sqlx::FromRow;
use uuid::Uuid;

/// One generated problem, persisted before the client ever sees it.
/// `correct_answer` and `solution_steps` live only here until a submission
/// comes back for this session.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ProblemSession {
    pub id: Uuid,
    pub problem_text: String,
    pub correct_answer: f64,
    pub options: JsonValue,
    pub difficulty: Option<String>,
    pub topic: Option<String>,
    pub hint_text: Option<String>,
    pub solution_steps: Option<String>,
    pub user_id: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}

/// Insert parameters for a new problem session.
#[derive(Debug, Clone)]
pub struct NewProblemSession {
    pub problem_text: String,
    pub correct_answer: f64,
    pub options: JsonValue,
    pub difficulty: String,
    pub topic: Option<String>,
    pub hint_text: Option<String>,
    pub solution_steps: Option<String>,
    pub user_id: Option<String>,
}
