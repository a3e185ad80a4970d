use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// Topics from the Primary 5 syllabus the generator may draw on. The prompt
/// enumerates these and clients use them to populate topic pickers.
pub const CURRICULUM_TOPICS: [&str; 10] = [
    "Whole Numbers",
    "Fractions",
    "Decimals",
    "Percentage",
    "Rate",
    "Area",
    "Volume",
    "Angles",
    "Triangles",
    "Quadrilaterals",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    #[default]
    Medium,
    Hard,
}

impl Difficulty {
    /// Coerce free-form client input. Only the exact strings "easy",
    /// "medium" and "hard" are recognized; anything else silently falls
    /// back to medium.
    pub fn coerce(input: Option<&str>) -> Self {
        match input {
            Some("easy") => Difficulty::Easy,
            Some("medium") => Difficulty::Medium,
            Some("hard") => Difficulty::Hard,
            _ => Difficulty::Medium,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        }
    }

    /// Seconds allowed per question when the client timer is enabled.
    pub fn time_limit_secs(&self) -> u32 {
        match self {
            Difficulty::Easy => 60,
            Difficulty::Medium => 90,
            Difficulty::Hard => 120,
        }
    }

    /// The numeric-range and step-count instructions the generation prompt
    /// embeds for this difficulty.
    pub fn prompt_guidance(&self) -> &'static str {
        match self {
            Difficulty::Easy => {
                r#"DIFFICULTY: EASY
- Use smaller numbers (within 100 for whole numbers, simple fractions like 1/2, 1/4)
- Single-step problems or very simple two-step problems
- Clear, straightforward contexts
- Basic operations without complex reasoning"#
            }
            Difficulty::Medium => {
                r#"DIFFICULTY: MEDIUM
- Use moderate numbers (within 10,000 for whole numbers, fractions with denominators up to 12)
- Two to three-step problems
- Realistic contexts requiring some analysis
- May involve multiple operations or concepts"#
            }
            Difficulty::Hard => {
                r#"DIFFICULTY: HARD
- Use larger numbers (up to 10 million for whole numbers, complex fractions)
- Multi-step problems (3-4 steps)
- Complex real-world scenarios requiring deeper reasoning
- May involve order of operations, brackets, or multiple concepts combined"#
            }
        }
    }
}

/// One multiple-choice option as produced by the model and echoed to
/// clients. Values need not be unique across the four options.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnswerOption {
    pub text: String,
    pub value: f64,
}

/// A problem candidate parsed out of the model's reply, before persistence.
#[derive(Debug, Clone)]
pub struct GeneratedProblem {
    pub problem_text: String,
    pub topic: Option<String>,
    pub options: Vec<AnswerOption>,
    pub correct_answer: f64,
    pub solution_steps: Option<String>,
    pub hint: Option<String>,
}

/// Why a model reply was rejected. Parse, structure and semantic failures
/// are distinct so route logging can name the stage that failed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProblemParseError {
    #[error("invalid AI response format: {0}")]
    Json(String),

    #[error("invalid problem data structure: {0}")]
    Shape(&'static str),

    #[error("correct answer does not match any option")]
    AnswerMismatch,
}

/// Remove markdown code-fence markers the model sometimes wraps its JSON in.
fn strip_code_fences(text: &str) -> String {
    text.replace("```json\n", "")
        .replace("```json", "")
        .replace("```\n", "")
        .replace("```", "")
        .trim()
        .to_string()
}

/// Parse and validate a raw model reply into a [`GeneratedProblem`].
///
/// Stages, in order:
/// 1. strip optional code fences, parse JSON ([`ProblemParseError::Json`]);
/// 2. structural checks: non-empty `problem_text`, exactly 4 well-formed
///    options, numeric `correct_answer` ([`ProblemParseError::Shape`]);
/// 3. semantic check: `correct_answer` equals at least one option value
///    ([`ProblemParseError::AnswerMismatch`]).
pub fn parse_generated_problem(text: &str) -> Result<GeneratedProblem, ProblemParseError> {
    let cleaned = strip_code_fences(text);
    let value: JsonValue =
        serde_json::from_str(&cleaned).map_err(|e| ProblemParseError::Json(e.to_string()))?;

    let problem_text = value
        .get("problem_text")
        .and_then(|t| t.as_str())
        .filter(|t| !t.is_empty())
        .ok_or(ProblemParseError::Shape("problem_text missing or empty"))?
        .to_string();

    let raw_options = value
        .get("options")
        .and_then(|o| o.as_array())
        .ok_or(ProblemParseError::Shape("options is not an array"))?;
    if raw_options.len() != 4 {
        return Err(ProblemParseError::Shape("options must have exactly 4 entries"));
    }
    let options: Vec<AnswerOption> = serde_json::from_value(JsonValue::Array(raw_options.clone()))
        .map_err(|_| ProblemParseError::Shape("options entries must be {text, value} pairs"))?;

    let correct_answer = value
        .get("correct_answer")
        .and_then(|c| c.as_f64())
        .ok_or(ProblemParseError::Shape("correct_answer is not numeric"))?;

    if !options.iter().any(|opt| opt.value == correct_answer) {
        return Err(ProblemParseError::AnswerMismatch);
    }

    let opt_string = |key: &str| {
        value
            .get(key)
            .and_then(|v| v.as_str())
            .map(|s| s.to_string())
    };

    Ok(GeneratedProblem {
        problem_text,
        topic: opt_string("topic"),
        options,
        correct_answer,
        solution_steps: opt_string("solution_steps"),
        hint: opt_string("hint"),
    })
}
