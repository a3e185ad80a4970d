use crate::error::Result;
use crate::models::problem::{CURRICULUM_TOPICS, Difficulty};
use reqwest::Client;
use serde_json::Value as JsonValue;

/// Client for an OpenAI-compatible chat completions endpoint. Both the
/// problem generator and the feedback writer go through here.
#[derive(Clone)]
pub struct AIService {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
}

impl AIService {
    pub fn new(api_key: String, base_url: String, model: String, client: Client) -> Self {
        Self {
            client,
            api_key,
            base_url,
            model,
        }
    }

    /// Ask the model for one multiple-choice word problem. Returns the raw
    /// reply text; parsing and validation happen in the caller so a bad
    /// reply can be logged verbatim.
    pub async fn generate_problem_text(
        &self,
        difficulty: Difficulty,
        topic: Option<&str>,
    ) -> Result<String> {
        let prompt = build_problem_prompt(difficulty, topic);

        let payload = serde_json::json!({
            "model": self.model,
            "messages": [
                {"role": "user", "content": prompt}
            ],
            "temperature": 0.8
        });

        self.chat_text(payload).await
    }

    /// Ask the model for pedagogical feedback on a graded answer. The reply
    /// is used as-is after trimming.
    pub async fn generate_feedback(
        &self,
        problem_text: &str,
        correct_answer: f64,
        user_answer: f64,
        is_correct: bool,
    ) -> Result<String> {
        let prompt = build_feedback_prompt(problem_text, correct_answer, user_answer, is_correct);

        let payload = serde_json::json!({
            "model": self.model,
            "messages": [
                {"role": "user", "content": prompt}
            ]
        });

        let text = self.chat_text(payload).await?;
        Ok(text.trim().to_string())
    }

    // No request timeout here: generation latency is open-ended and the
    // product accepts slow rounds rather than cutting them off.
    async fn chat_text(&self, payload: JsonValue) -> Result<String> {
        let res = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&payload)
            .send()
            .await?;

        if !res.status().is_success() {
            let status = res.status();
            let text = res.text().await.unwrap_or_default();
            return Err(anyhow::anyhow!("OpenAI API Error {}: {}", status, text).into());
        }

        let body: JsonValue = res.json().await?;

        body.get("choices")
            .and_then(|c| c.get(0))
            .and_then(|c| c.get("message"))
            .and_then(|m| m.get("content"))
            .and_then(|c| c.as_str())
            .map(|s| s.to_string())
            .ok_or_else(|| anyhow::anyhow!("Invalid OpenAI response format").into())
    }
}

pub(crate) fn build_problem_prompt(difficulty: Difficulty, topic: Option<&str>) -> String {
    let topic_filter = topic
        .map(|t| format!("\nREQUIRED TOPIC: Focus ONLY on \"{}\" problems.\n", t))
        .unwrap_or_default();

    format!(
        r#"Generate a multiple choice math word problem suitable for Primary 5 students (age 10-11) following the Singapore Primary Mathematics Syllabus.

{guidance}
{topic_filter}
CURRICULUM REQUIREMENTS - Choose ONE topic from:

NUMBER & ALGEBRA:
- Whole numbers (up to 10 million, order of operations with brackets)
- Fractions (four operations, especially multiplication by whole numbers and proper fractions)
- Decimals (multiplying/dividing by 10/100/1000, converting measurements)
- Percentage (finding percentage of whole, discount, GST, annual interest)
- Rate problems (quantity per unit of another quantity)

MEASUREMENT & GEOMETRY:
- Area of triangle (using base × height ÷ 2, composite figures)
- Volume of cube/cuboid (including liquid volume, relationship between ℓ and cm³)
- Angles (on straight lines, at points, vertically opposite, finding unknowns)
- Properties of triangles (isosceles, equilateral, right-angled, angle sum)
- Properties of quadrilaterals (parallelogram, rhombus, trapezium)

PROBLEM DESIGN PRINCIPLES:
- Use realistic, age-appropriate contexts from everyday life
- Focus on conceptual understanding, not just procedural skills
- Encourage mathematical reasoning and problem-solving
- Numbers should be within students' computational ability

IMPORTANT: First solve the problem step by step to ensure you get the correct answer.
Then create 3 plausible wrong answers (distractors) based on common student errors.

Return ONLY a valid JSON object with this exact structure (no markdown, no code blocks):
{{
  "problem_text": "A detailed word problem in a real-world context",
  "topic": "One of: {topics}",
  "difficulty": "{difficulty}",
  "options": [
    {{"text": "Option A", "value": 10}},
    {{"text": "Option B", "value": 20}},
    {{"text": "Option C", "value": 30}},
    {{"text": "Option D", "value": 40}}
  ],
  "correct_answer": 20,
  "solution_steps": "Clear step-by-step calculation showing working",
  "hint": "A helpful hint that guides toward the solution without revealing the answer"
}}

VALIDATION CHECKLIST:
- correct_answer MUST match one option value exactly
- All option values are numbers (not strings)
- Distractors represent common misconceptions (e.g., forgetting to carry, wrong operation, partial calculation)
- Answer is mathematically CORRECT per solution_steps
- Problem text is clear, unambiguous, and age-appropriate

Example (Whole Numbers):
Problem: A school library has 2,450 books. During the book fair, they bought 385 new books and donated 127 old books to charity. How many books does the library have now?
Solution: 2,450 + 385 - 127 = 2,835 - 127 = 2,708
Options: [2,562 (forgot donation), 2,708 (correct), 2,835 (forgot subtraction), 2,958 (added all)]

Double-check your arithmetic before responding!"#,
        guidance = difficulty.prompt_guidance(),
        topic_filter = topic_filter,
        difficulty = difficulty.as_str(),
        topics = CURRICULUM_TOPICS.join(", "),
    )
}

pub(crate) fn build_feedback_prompt(
    problem_text: &str,
    correct_answer: f64,
    user_answer: f64,
    is_correct: bool,
) -> String {
    let requirements = if is_correct {
        r#"CORRECT ANSWER - Your feedback should:
- Celebrate their success warmly and specifically
- Briefly explain WHY the solution works (build understanding)
- Encourage them to try more problems
- 2-3 sentences maximum"#
    } else {
        r#"INCORRECT ANSWER - Your feedback should:
- Acknowledge their effort positively
- Identify the specific ERROR or MISCONCEPTION (e.g., "It looks like you added instead of subtracted")
- Give a HINT about the correct approach WITHOUT revealing the full answer
- Encourage them to try again with this new understanding
- 3-4 sentences maximum"#
    };

    format!(
        r#"You are a helpful and encouraging math tutor for Primary 5 students (age 10-11) following Singapore Primary Mathematics pedagogy.

PEDAGOGICAL PRINCIPLES (from Singapore Math Curriculum):
- Build confidence and foster interest in mathematics
- Develop thinking, reasoning, and communication skills
- Focus on conceptual understanding over memorization
- Provide timely, specific feedback that helps students improve
- Be encouraging but honest about errors
- Support metacognition (help students reflect on their thinking)

CONTEXT:
Original Problem: {problem_text}
Correct Answer: {correct_answer}
Student's Answer: {user_answer}
Is Correct: {is_correct}

FEEDBACK REQUIREMENTS:
{requirements}

TONE: Warm, encouraging, age-appropriate (10-11 years old), patient, growth-mindset focused

Return ONLY the feedback text (no JSON, no markdown, no special formatting)."#
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn problem_prompt_embeds_difficulty_guidance() {
        let easy = build_problem_prompt(Difficulty::Easy, None);
        assert!(easy.contains("DIFFICULTY: EASY"));
        assert!(easy.contains(r#""difficulty": "easy""#));

        let hard = build_problem_prompt(Difficulty::Hard, None);
        assert!(hard.contains("DIFFICULTY: HARD"));
        assert!(hard.contains("up to 10 million"));
    }

    #[test]
    fn problem_prompt_topic_filter_is_optional() {
        let without = build_problem_prompt(Difficulty::Medium, None);
        assert!(!without.contains("REQUIRED TOPIC"));

        let with = build_problem_prompt(Difficulty::Medium, Some("Fractions"));
        assert!(with.contains(r#"REQUIRED TOPIC: Focus ONLY on "Fractions" problems."#));
    }

    #[test]
    fn problem_prompt_demands_bare_json() {
        let prompt = build_problem_prompt(Difficulty::Medium, None);
        assert!(prompt.contains("Return ONLY a valid JSON object"));
        assert!(prompt.contains("correct_answer MUST match one option value exactly"));
        assert!(prompt.contains(
            "One of: Whole Numbers, Fractions, Decimals, Percentage, Rate, Area, Volume, Angles, Triangles, Quadrilaterals"
        ));
    }

    #[test]
    fn feedback_prompt_branches_on_verdict() {
        let correct = build_feedback_prompt("What is 2 + 2?", 4.0, 4.0, true);
        assert!(correct.contains("CORRECT ANSWER - Your feedback should:"));
        assert!(correct.contains("Is Correct: true"));

        let incorrect = build_feedback_prompt("What is 2 + 2?", 4.0, 5.0, false);
        assert!(incorrect.contains("INCORRECT ANSWER - Your feedback should:"));
        assert!(incorrect.contains("WITHOUT revealing the full answer"));
        assert!(incorrect.contains("Student's Answer: 5"));
    }

    #[test]
    fn feedback_prompt_embeds_problem_context() {
        let prompt = build_feedback_prompt("A tank holds 24 litres.", 24.0, 12.0, false);
        assert!(prompt.contains("Original Problem: A tank holds 24 litres."));
        assert!(prompt.contains("Correct Answer: 24"));
    }
}
