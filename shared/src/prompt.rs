//! Evaluator prompt templating.
//!
//! The system instruction is deployment configuration; the user instruction is rendered
//! from a validated [`Submission`] and never makes control-flow decisions.

use crate::Submission;

/// Built-in system instruction for the evaluator role.
pub const DEFAULT_SYSTEM_PROMPT: &str = "You are a neutral instructional evaluator. \
Judge the learner's response only against the learning objective and criteria you are given; \
do not reward or penalize anything outside them and do not add new criteria. \
Respond with a single JSON object and nothing else: no prose, no markdown, no code fences.";

/// The two instruction blocks sent upstream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptPair {
    pub system: String,
    pub user: String,
}

/// Prompt template with an injectable system instruction.
#[derive(Debug, Clone)]
pub struct PromptTemplate {
    system: String,
}

impl Default for PromptTemplate {
    fn default() -> Self {
        Self::new(DEFAULT_SYSTEM_PROMPT)
    }
}

impl PromptTemplate {
    /// Create a template with a custom system instruction.
    pub fn new(system: impl Into<String>) -> Self {
        Self {
            system: system.into(),
        }
    }

    pub fn system(&self) -> &str {
        &self.system
    }

    /// Render both instruction blocks for a submission.
    pub fn render(&self, submission: &Submission) -> PromptPair {
        PromptPair {
            system: self.system.clone(),
            user: render_user(submission),
        }
    }
}

fn numbered(criteria: &[String]) -> String {
    if criteria.is_empty() {
        return "(no criteria supplied; judge against the learning objective alone)".to_string();
    }

    criteria
        .iter()
        .enumerate()
        .map(|(i, criterion)| format!("{}. {}", i + 1, criterion))
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_user(submission: &Submission) -> String {
    format!(
        r#"Learning objective:
{objective}

Criteria:
{criteria}

Learner response:
"""
{response}
"""

Classify the response using exactly one verdict:
- "Correct": all criteria are clearly met.
- "Not quite right": some criteria are met, but at least one is missing or unclear.
- "Incorrect": most criteria are not met, or the response is off-topic.

Return a JSON object with exactly these keys:
- "verdict": one of "Correct", "Not quite right", "Incorrect"
- "summary": one or two sentences addressed to the learner
- "criteria_feedback": an array with one object per criterion, each {{"criterion": string, "met": boolean, "comment": string}}
- "next_step": one concrete suggestion for what the learner should do next"#,
        objective = submission.learning_objective,
        criteria = numbered(&submission.criteria),
        response = submission.response_text,
    )
}
