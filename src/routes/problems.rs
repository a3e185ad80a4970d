use axum::{
    extract::{Query, State},
    response::{IntoResponse, Json, Response},
};
use uuid::Uuid;
use validator::Validate;

use crate::dto::problem_dto::{
    GenerateProblemPayload, GenerateProblemResponse, HistoryEntry, HistoryQuery, HistoryResponse,
    SubmitAnswerPayload, SubmitAnswerResponse,
};
use crate::error::Error;
use crate::models::problem::{
    parse_generated_problem, AnswerOption, Difficulty, ProblemParseError,
};
use crate::models::session::{NewProblemSession, ProblemSession};
use crate::models::submission::NewProblemSubmission;
use crate::AppState;

/// `POST /api/generate-problem`. The body is optional; a bare POST gets a
/// medium problem with no topic restriction. Every downstream failure
/// collapses to one generic 500 so clients only ever see a retry message.
#[axum::debug_handler]
pub async fn generate_problem(
    State(state): State<AppState>,
    payload: Option<Json<GenerateProblemPayload>>,
) -> crate::error::Result<Response> {
    let payload = payload.map(|Json(p)| p).unwrap_or_default();
    let difficulty = Difficulty::coerce(payload.difficulty.as_deref());

    match generate_and_store(&state, difficulty, payload.topic, payload.user_id).await {
        Ok(response) => Ok(Json(response).into_response()),
        Err(e) => {
            tracing::error!("Error generating problem: {:?}", e);
            Err(Error::Internal(
                "Failed to generate problem. Please try again.".to_string(),
            ))
        }
    }
}

async fn generate_and_store(
    state: &AppState,
    difficulty: Difficulty,
    topic: Option<String>,
    user_id: Option<String>,
) -> crate::error::Result<GenerateProblemResponse> {
    let raw = state
        .ai_service
        .generate_problem_text(difficulty, topic.as_deref())
        .await?;

    let problem = match parse_generated_problem(&raw) {
        Ok(problem) => problem,
        Err(e) => {
            if matches!(e, ProblemParseError::Json(_)) {
                tracing::error!("Failed to parse AI response: {}", raw);
            }
            return Err(e.into());
        }
    };

    let session = state
        .problem_service
        .create_session(NewProblemSession {
            problem_text: problem.problem_text,
            correct_answer: problem.correct_answer,
            options: serde_json::to_value(&problem.options)?,
            difficulty: difficulty.as_str().to_string(),
            topic: problem.topic,
            hint_text: problem.hint,
            solution_steps: problem.solution_steps,
            user_id,
        })
        .await?;

    let options: Vec<AnswerOption> = serde_json::from_value(session.options.clone())?;

    Ok(GenerateProblemResponse {
        session_id: session.id,
        problem_text: session.problem_text,
        final_answer: session.correct_answer,
        options,
        difficulty: session
            .difficulty
            .unwrap_or_else(|| difficulty.as_str().to_string()),
        topic: session.topic,
        hint: session.hint_text,
    })
}

/// `POST /api/submit-answer`. Grades by numeric equality, asks the model
/// for feedback, records the submission and reveals the correct answer.
#[axum::debug_handler]
pub async fn submit_answer(
    State(state): State<AppState>,
    Json(payload): Json<SubmitAnswerPayload>,
) -> crate::error::Result<Response> {
    payload.validate()?;

    let session_id = match payload.session_id.as_deref() {
        Some(id) if !id.is_empty() => id.to_string(),
        _ => {
            return Err(Error::BadRequest(
                "Missing session_id or user_answer".to_string(),
            ))
        }
    };
    let user_answer = match payload.user_answer {
        Some(answer) => answer.0,
        None => {
            return Err(Error::BadRequest(
                "Missing session_id or user_answer".to_string(),
            ))
        }
    };
    let time_spent_seconds = payload.time_spent_seconds.unwrap_or(0);

    // Any failure to resolve the session presents as a missing session,
    // including ids that are not UUIDs at all.
    let session = match Uuid::parse_str(&session_id) {
        Ok(id) => match state.problem_service.get_session(id).await {
            Ok(found) => found,
            Err(e) => {
                tracing::error!("Error loading session {}: {:?}", session_id, e);
                None
            }
        },
        Err(_) => None,
    };
    let Some(session) = session else {
        return Err(Error::NotFound("Session not found".to_string()));
    };

    let is_correct = user_answer == session.correct_answer;

    match grade_and_store(&state, &session, user_answer, is_correct, time_spent_seconds).await {
        Ok(feedback) => Ok(Json(SubmitAnswerResponse {
            is_correct,
            feedback,
            correct_answer: session.correct_answer,
        })
        .into_response()),
        Err(e) => {
            tracing::error!("Error submitting answer: {:?}", e);
            Err(Error::Internal(
                "Failed to submit answer. Please try again.".to_string(),
            ))
        }
    }
}

async fn grade_and_store(
    state: &AppState,
    session: &ProblemSession,
    user_answer: f64,
    is_correct: bool,
    time_spent_seconds: i32,
) -> crate::error::Result<String> {
    let feedback = state
        .ai_service
        .generate_feedback(
            &session.problem_text,
            session.correct_answer,
            user_answer,
            is_correct,
        )
        .await?;

    state
        .problem_service
        .create_submission(NewProblemSubmission {
            session_id: session.id,
            user_answer,
            is_correct,
            feedback_text: feedback.clone(),
            time_spent_seconds,
        })
        .await?;

    Ok(feedback)
}

/// `GET /api/problem-history?user_id=...`. Answered problems only, newest
/// first, at most 50. An empty user_id means no filter, same as omitting it.
#[axum::debug_handler]
pub async fn problem_history(
    State(state): State<AppState>,
    Query(query): Query<HistoryQuery>,
) -> crate::error::Result<Response> {
    let user_id = query.user_id.as_deref().filter(|id| !id.is_empty());

    match state.problem_service.list_history(user_id).await {
        Ok(rows) => {
            let history: Vec<HistoryEntry> = rows.into_iter().map(HistoryEntry::from).collect();
            Ok(Json(HistoryResponse { history }).into_response())
        }
        Err(e) => {
            tracing::error!("Error fetching history: {:?}", e);
            Err(Error::Internal("Failed to fetch problem history".to_string()))
        }
    }
}
