use serde::Serialize;
use uuid::Uuid;

use crate::models::problem::{AnswerOption, Difficulty};

/// Where a practice run currently is. One state at a time, no hidden flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowState {
    Idle,
    Generating,
    Answering,
    Evaluating,
    Result,
}

/// How the current question ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuestionOutcome {
    Correct,
    Incorrect,
    TimedOut,
    EvaluationFailed,
}

/// The problem currently on screen, as the host hands it to the flow after
/// a successful generation call.
#[derive(Debug, Clone)]
pub struct ActiveProblem {
    pub session_id: Uuid,
    pub problem_text: String,
    pub options: Vec<AnswerOption>,
    pub difficulty: Difficulty,
    pub hint: Option<String>,
}

/// What the host needs to send to the submit endpoint. Only available while
/// an evaluation is in flight.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PendingSubmission {
    pub session_id: Uuid,
    pub user_answer: f64,
    pub time_spent_seconds: i32,
}

/// Lifetime counters for the score card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ScoreSummary {
    pub questions_answered: u32,
    pub total_correct: u32,
    pub total_incorrect: u32,
    pub hints_used: u32,
}

/// Drives one practice run: Idle → Generating → Answering → Evaluating →
/// Result, then back to Generating on "next". The flow never talks to the
/// network itself; the host calls the endpoints and reports outcomes back
/// through the event methods. Every event method returns whether the event
/// was accepted; events that do not fit the current state are ignored.
#[derive(Debug, Clone)]
pub struct PracticeFlow {
    state: FlowState,
    user_id: String,
    timer_enabled: bool,

    problem: Option<ActiveProblem>,
    selected_answer: Option<f64>,
    hint_used_this_question: bool,
    time_spent_seconds: i32,
    time_remaining: Option<u32>,
    outcome: Option<QuestionOutcome>,
    last_error: Option<String>,

    question_number: u32,
    total_correct: u32,
    total_incorrect: u32,
    total_hints_used: u32,
}

impl PracticeFlow {
    /// `user_id` is the identity persisted by the host from an earlier run;
    /// a fresh one is minted when absent so history grouping works from the
    /// first request.
    pub fn new(user_id: Option<String>, timer_enabled: bool) -> Self {
        Self {
            state: FlowState::Idle,
            user_id: user_id.unwrap_or_else(|| Uuid::new_v4().to_string()),
            timer_enabled,
            problem: None,
            selected_answer: None,
            hint_used_this_question: false,
            time_spent_seconds: 0,
            time_remaining: None,
            outcome: None,
            last_error: None,
            question_number: 1,
            total_correct: 0,
            total_incorrect: 0,
            total_hints_used: 0,
        }
    }

    pub fn state(&self) -> FlowState {
        self.state
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn problem(&self) -> Option<&ActiveProblem> {
        self.problem.as_ref()
    }

    pub fn selected_answer(&self) -> Option<f64> {
        self.selected_answer
    }

    pub fn outcome(&self) -> Option<QuestionOutcome> {
        self.outcome
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn question_number(&self) -> u32 {
        self.question_number
    }

    pub fn time_spent_seconds(&self) -> i32 {
        self.time_spent_seconds
    }

    /// Seconds left on the countdown; None when the timer is disabled or no
    /// question is active.
    pub fn time_remaining(&self) -> Option<u32> {
        self.time_remaining
    }

    pub fn hint_used_this_question(&self) -> bool {
        self.hint_used_this_question
    }

    pub fn summary(&self) -> ScoreSummary {
        ScoreSummary {
            questions_answered: self.total_correct + self.total_incorrect,
            total_correct: self.total_correct,
            total_incorrect: self.total_incorrect,
            hints_used: self.total_hints_used,
        }
    }

    /// Begin the first question. Only meaningful from Idle.
    pub fn start(&mut self) -> bool {
        if self.state != FlowState::Idle {
            return false;
        }
        self.last_error = None;
        self.state = FlowState::Generating;
        true
    }

    /// A generation call came back with a problem.
    pub fn problem_ready(&mut self, problem: ActiveProblem) -> bool {
        if self.state != FlowState::Generating {
            return false;
        }
        self.time_remaining = self
            .timer_enabled
            .then(|| problem.difficulty.time_limit_secs());
        self.problem = Some(problem);
        self.state = FlowState::Answering;
        true
    }

    /// A generation call failed. Back to Idle with a message the host can
    /// show next to a retry button.
    pub fn generation_failed(&mut self, message: impl Into<String>) -> bool {
        if self.state != FlowState::Generating {
            return false;
        }
        self.last_error = Some(message.into());
        self.state = FlowState::Idle;
        true
    }

    /// The student picked an option. The selection is recorded immediately
    /// and locks out further picks, before the evaluation call resolves.
    pub fn select_answer(&mut self, value: f64) -> bool {
        if self.state != FlowState::Answering {
            return false;
        }
        self.selected_answer = Some(value);
        self.state = FlowState::Evaluating;
        true
    }

    /// The submit payload for the selection currently being evaluated.
    pub fn pending_submission(&self) -> Option<PendingSubmission> {
        if self.state != FlowState::Evaluating {
            return None;
        }
        let problem = self.problem.as_ref()?;
        let user_answer = self.selected_answer?;
        Some(PendingSubmission {
            session_id: problem.session_id,
            user_answer,
            time_spent_seconds: self.time_spent_seconds,
        })
    }

    /// The evaluation call resolved with a verdict. Exactly one tally moves.
    pub fn evaluation_succeeded(&mut self, is_correct: bool) -> bool {
        if self.state != FlowState::Evaluating {
            return false;
        }
        let outcome = if is_correct {
            QuestionOutcome::Correct
        } else {
            QuestionOutcome::Incorrect
        };
        self.finish_question(outcome);
        true
    }

    /// The evaluation call failed. The question ends with an error outcome
    /// and neither tally moves.
    pub fn evaluation_failed(&mut self, message: impl Into<String>) -> bool {
        if self.state != FlowState::Evaluating {
            return false;
        }
        self.last_error = Some(message.into());
        self.finish_question(QuestionOutcome::EvaluationFailed);
        true
    }

    /// Reveal the hint. At most once per question, and only while answering
    /// a problem that actually has one.
    pub fn use_hint(&mut self) -> bool {
        if self.state != FlowState::Answering || self.hint_used_this_question {
            return false;
        }
        let has_hint = self
            .problem
            .as_ref()
            .map(|p| p.hint.is_some())
            .unwrap_or(false);
        if !has_hint {
            return false;
        }
        self.hint_used_this_question = true;
        self.total_hints_used += 1;
        true
    }

    /// One second of wall-clock time passed. Accumulates time spent and,
    /// when the countdown is armed, drives it down; hitting zero ends the
    /// question as timed out (counted incorrect, nothing sent to the server).
    pub fn tick(&mut self) -> bool {
        if self.state != FlowState::Answering {
            return false;
        }
        self.time_spent_seconds += 1;
        if let Some(remaining) = self.time_remaining.as_mut() {
            *remaining = remaining.saturating_sub(1);
            if *remaining == 0 {
                self.finish_question(QuestionOutcome::TimedOut);
            }
        }
        true
    }

    /// On to the next question. Only from Result; per-question state resets
    /// and the counter advances.
    pub fn next(&mut self) -> bool {
        if self.state != FlowState::Result {
            return false;
        }
        self.question_number += 1;
        self.problem = None;
        self.selected_answer = None;
        self.hint_used_this_question = false;
        self.time_spent_seconds = 0;
        self.time_remaining = None;
        self.outcome = None;
        self.state = FlowState::Generating;
        true
    }

    fn finish_question(&mut self, outcome: QuestionOutcome) {
        match outcome {
            QuestionOutcome::Correct => self.total_correct += 1,
            QuestionOutcome::Incorrect | QuestionOutcome::TimedOut => self.total_incorrect += 1,
            QuestionOutcome::EvaluationFailed => {}
        }
        self.outcome = Some(outcome);
        self.time_remaining = None;
        self.state = FlowState::Result;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_problem(difficulty: Difficulty, hint: Option<&str>) -> ActiveProblem {
        ActiveProblem {
            session_id: Uuid::new_v4(),
            problem_text: "A shop sells pencils at $2 each. How much do 6 cost?".to_string(),
            options: vec![
                AnswerOption { text: "8".to_string(), value: 8.0 },
                AnswerOption { text: "10".to_string(), value: 10.0 },
                AnswerOption { text: "12".to_string(), value: 12.0 },
                AnswerOption { text: "14".to_string(), value: 14.0 },
            ],
            difficulty,
            hint: hint.map(|h| h.to_string()),
        }
    }

    fn flow_in_answering(timer_enabled: bool) -> PracticeFlow {
        let mut flow = PracticeFlow::new(None, timer_enabled);
        assert!(flow.start());
        assert!(flow.problem_ready(sample_problem(Difficulty::Easy, Some("Multiply."))));
        flow
    }

    #[test]
    fn starts_idle_and_mints_identity() {
        let flow = PracticeFlow::new(None, false);
        assert_eq!(flow.state(), FlowState::Idle);
        assert!(Uuid::parse_str(flow.user_id()).is_ok());
        assert_eq!(flow.question_number(), 1);
    }

    #[test]
    fn adopts_persisted_identity() {
        let flow = PracticeFlow::new(Some("student-7".to_string()), false);
        assert_eq!(flow.user_id(), "student-7");
    }

    #[test]
    fn start_only_from_idle() {
        let mut flow = PracticeFlow::new(None, false);
        assert!(flow.start());
        assert_eq!(flow.state(), FlowState::Generating);
        assert!(!flow.start());
    }

    #[test]
    fn generation_failure_returns_to_idle_with_message() {
        let mut flow = PracticeFlow::new(None, false);
        flow.start();
        assert!(flow.generation_failed("Failed to generate problem. Please try again."));
        assert_eq!(flow.state(), FlowState::Idle);
        assert_eq!(
            flow.last_error(),
            Some("Failed to generate problem. Please try again.")
        );

        // retry is a fresh start and clears the message
        assert!(flow.start());
        assert_eq!(flow.last_error(), None);
    }

    #[test]
    fn problem_ready_only_while_generating() {
        let mut flow = PracticeFlow::new(None, false);
        assert!(!flow.problem_ready(sample_problem(Difficulty::Easy, None)));
        flow.start();
        assert!(flow.problem_ready(sample_problem(Difficulty::Easy, None)));
        assert_eq!(flow.state(), FlowState::Answering);
    }

    #[test]
    fn only_one_selection_per_question() {
        let mut flow = flow_in_answering(false);
        assert!(flow.select_answer(12.0));
        assert_eq!(flow.state(), FlowState::Evaluating);
        assert_eq!(flow.selected_answer(), Some(12.0));

        // locked before the evaluation resolves
        assert!(!flow.select_answer(8.0));
        assert_eq!(flow.selected_answer(), Some(12.0));
    }

    #[test]
    fn pending_submission_carries_answer_and_time() {
        let mut flow = flow_in_answering(false);
        flow.tick();
        flow.tick();
        flow.tick();
        assert!(flow.select_answer(12.0));

        let pending = flow.pending_submission().expect("evaluating");
        assert_eq!(pending.user_answer, 12.0);
        assert_eq!(pending.time_spent_seconds, 3);

        flow.evaluation_succeeded(true);
        assert!(flow.pending_submission().is_none());
    }

    #[test]
    fn correct_verdict_moves_exactly_one_tally() {
        let mut flow = flow_in_answering(false);
        flow.select_answer(12.0);
        assert!(flow.evaluation_succeeded(true));
        assert_eq!(flow.state(), FlowState::Result);
        assert_eq!(flow.outcome(), Some(QuestionOutcome::Correct));

        let summary = flow.summary();
        assert_eq!(summary.total_correct, 1);
        assert_eq!(summary.total_incorrect, 0);
        assert_eq!(summary.questions_answered, 1);

        // a late duplicate resolution is ignored
        assert!(!flow.evaluation_succeeded(true));
        assert_eq!(flow.summary().total_correct, 1);
    }

    #[test]
    fn incorrect_verdict_counts_against() {
        let mut flow = flow_in_answering(false);
        flow.select_answer(8.0);
        flow.evaluation_succeeded(false);
        assert_eq!(flow.outcome(), Some(QuestionOutcome::Incorrect));
        assert_eq!(flow.summary().total_incorrect, 1);
    }

    #[test]
    fn evaluation_failure_leaves_tallies_alone() {
        let mut flow = flow_in_answering(false);
        flow.select_answer(12.0);
        assert!(flow.evaluation_failed("Failed to submit answer. Please try again."));
        assert_eq!(flow.state(), FlowState::Result);
        assert_eq!(flow.outcome(), Some(QuestionOutcome::EvaluationFailed));

        let summary = flow.summary();
        assert_eq!(summary.total_correct, 0);
        assert_eq!(summary.total_incorrect, 0);
        assert_eq!(summary.questions_answered, 0);
    }

    #[test]
    fn next_resets_question_state_and_advances_counter() {
        let mut flow = flow_in_answering(false);
        flow.use_hint();
        flow.tick();
        flow.select_answer(12.0);
        flow.evaluation_succeeded(true);

        assert!(flow.next());
        assert_eq!(flow.state(), FlowState::Generating);
        assert_eq!(flow.question_number(), 2);
        assert!(flow.problem().is_none());
        assert_eq!(flow.selected_answer(), None);
        assert_eq!(flow.outcome(), None);
        assert_eq!(flow.time_spent_seconds(), 0);
        assert!(!flow.hint_used_this_question());
        // lifetime counters survive
        assert_eq!(flow.summary().total_correct, 1);
        assert_eq!(flow.summary().hints_used, 1);
    }

    #[test]
    fn next_only_from_result() {
        let mut flow = flow_in_answering(false);
        assert!(!flow.next());
        assert_eq!(flow.question_number(), 1);
    }

    #[test]
    fn hint_counts_once_per_question() {
        let mut flow = flow_in_answering(false);
        assert!(flow.use_hint());
        assert!(!flow.use_hint());
        assert_eq!(flow.summary().hints_used, 1);

        flow.select_answer(12.0);
        flow.evaluation_succeeded(true);
        flow.next();
        flow.problem_ready(sample_problem(Difficulty::Easy, Some("Multiply.")));
        assert!(flow.use_hint());
        assert_eq!(flow.summary().hints_used, 2);
    }

    #[test]
    fn hint_requires_one_to_exist() {
        let mut flow = PracticeFlow::new(None, false);
        flow.start();
        flow.problem_ready(sample_problem(Difficulty::Easy, None));
        assert!(!flow.use_hint());
        assert_eq!(flow.summary().hints_used, 0);
    }

    #[test]
    fn timer_arms_from_difficulty() {
        let mut easy = PracticeFlow::new(None, true);
        easy.start();
        easy.problem_ready(sample_problem(Difficulty::Easy, None));
        assert_eq!(easy.time_remaining(), Some(60));

        let mut hard = PracticeFlow::new(None, true);
        hard.start();
        hard.problem_ready(sample_problem(Difficulty::Hard, None));
        assert_eq!(hard.time_remaining(), Some(120));
    }

    #[test]
    fn disabled_timer_never_arms() {
        let flow = flow_in_answering(false);
        assert_eq!(flow.time_remaining(), None);
    }

    #[test]
    fn tick_accumulates_time_and_counts_down() {
        let mut flow = flow_in_answering(true);
        assert_eq!(flow.time_remaining(), Some(60));
        assert!(flow.tick());
        assert_eq!(flow.time_spent_seconds(), 1);
        assert_eq!(flow.time_remaining(), Some(59));
    }

    #[test]
    fn tick_ignored_outside_answering() {
        let mut flow = PracticeFlow::new(None, true);
        assert!(!flow.tick());
        flow.start();
        assert!(!flow.tick());
        assert_eq!(flow.time_spent_seconds(), 0);
    }

    #[test]
    fn running_out_of_time_counts_as_incorrect() {
        let mut flow = flow_in_answering(true);
        for _ in 0..60 {
            flow.tick();
        }
        assert_eq!(flow.state(), FlowState::Result);
        assert_eq!(flow.outcome(), Some(QuestionOutcome::TimedOut));
        assert_eq!(flow.summary().total_incorrect, 1);
        // nothing is in flight for a timed-out question
        assert!(flow.pending_submission().is_none());
        // and the clock stops
        assert!(!flow.tick());
    }
}
