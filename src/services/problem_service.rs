use crate::error::Result;
use crate::models::history::HistoryRow;
use crate::models::session::{NewProblemSession, ProblemSession};
use crate::models::submission::{NewProblemSubmission, ProblemSubmission};
use sqlx::PgPool;
use uuid::Uuid;

#[derive(Clone)]
pub struct ProblemService {
    pool: PgPool,
}

impl ProblemService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create_session(&self, new: NewProblemSession) -> Result<ProblemSession> {
        let session = sqlx::query_as::<_, ProblemSession>(
            r#"
            INSERT INTO math_problem_sessions (
                problem_text, correct_answer, options, difficulty, topic, hint_text, solution_steps, user_id
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING *
            "#,
        )
        .bind(new.problem_text)
        .bind(new.correct_answer)
        .bind(new.options)
        .bind(new.difficulty)
        .bind(new.topic)
        .bind(new.hint_text)
        .bind(new.solution_steps)
        .bind(new.user_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(session)
    }

    pub async fn get_session(&self, id: Uuid) -> Result<Option<ProblemSession>> {
        let session = sqlx::query_as::<_, ProblemSession>(
            r#"SELECT * FROM math_problem_sessions WHERE id = $1"#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(session)
    }

    pub async fn create_submission(&self, new: NewProblemSubmission) -> Result<ProblemSubmission> {
        let submission = sqlx::query_as::<_, ProblemSubmission>(
            r#"
            INSERT INTO math_problem_submissions (
                session_id, user_answer, is_correct, feedback_text, time_spent_seconds
            ) VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(new.session_id)
        .bind(new.user_answer)
        .bind(new.is_correct)
        .bind(new.feedback_text)
        .bind(new.time_spent_seconds)
        .fetch_one(&self.pool)
        .await?;

        Ok(submission)
    }

    /// Answered sessions, newest first, capped at 50. Each session carries
    /// its earliest submission; unanswered sessions are left out entirely.
    pub async fn list_history(&self, user_id: Option<&str>) -> Result<Vec<HistoryRow>> {
        let rows = sqlx::query_as::<_, HistoryRow>(
            r#"
            SELECT
                s.id AS session_id,
                s.problem_text,
                s.correct_answer,
                s.options,
                s.difficulty,
                s.topic,
                s.hint_text,
                s.created_at,
                sub.user_answer,
                sub.is_correct,
                sub.feedback_text,
                sub.time_spent_seconds,
                sub.hint_used,
                sub.created_at AS submitted_at
            FROM math_problem_sessions s
            JOIN LATERAL (
                SELECT user_answer, is_correct, feedback_text, time_spent_seconds, hint_used, created_at
                FROM math_problem_submissions
                WHERE session_id = s.id
                ORDER BY created_at ASC
                LIMIT 1
            ) sub ON TRUE
            WHERE $1::text IS NULL OR s.user_id = $1
            ORDER BY s.created_at DESC
            LIMIT 50
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }
}
