//! Request and verdict models.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use validator::Validate;

use crate::{Error, Result};

/// Returned when `response_text` is too short or too long.
pub const RESPONSE_LENGTH_MESSAGE: &str = "Response length out of range";
/// Returned when `learning_objective` is blank.
pub const MISSING_OBJECTIVE_MESSAGE: &str = "Missing learning_objective";

/// A learner submission after coercion and trimming.
#[derive(Debug, Clone, PartialEq, Validate)]
pub struct Submission {
    /// Learner's free-text answer
    #[validate(length(min = 10, max = 2000))]
    pub response_text: String,
    /// What the learner is expected to demonstrate
    #[validate(length(min = 1))]
    pub learning_objective: String,
    /// Criteria the answer is judged against, in order
    pub criteria: Vec<String>,
}

impl Submission {
    /// Coerce a JSON body into a submission without validating it.
    ///
    /// Missing or null fields become empty strings; non-string scalars use their JSON text.
    /// `criteria` defaults to empty unless it is an array.
    pub fn from_value(value: &Value) -> Self {
        let criteria = value
            .get("criteria")
            .and_then(Value::as_array)
            .map(|items| {
                items
                    .iter()
                    .map(|item| coerce_text(Some(item)))
                    .filter(|item| !item.is_empty())
                    .collect()
            })
            .unwrap_or_default();

        Self {
            response_text: coerce_text(value.get("response_text")),
            learning_objective: coerce_text(value.get("learning_objective")),
            criteria,
        }
    }

    /// Parse and bound-check a raw request body.
    pub fn parse(body: &[u8]) -> Result<Self> {
        let value: Value = serde_json::from_slice(body).map_err(|_| Error::InvalidJson)?;
        let submission = Self::from_value(&value);

        if let Err(errors) = submission.validate() {
            let fields = errors.errors();
            if fields.contains_key("response_text") {
                return Err(Error::Validation(RESPONSE_LENGTH_MESSAGE.to_string()));
            }
            if fields.contains_key("learning_objective") {
                return Err(Error::Validation(MISSING_OBJECTIVE_MESSAGE.to_string()));
            }
            return Err(Error::Validation(errors.to_string()));
        }

        Ok(submission)
    }
}

fn coerce_text(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.trim().to_string(),
        Some(other) => other.to_string().trim().to_string(),
    }
}

/// Overall classification of a learner response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VerdictLabel {
    #[serde(rename = "Correct")]
    Correct,
    #[serde(rename = "Not quite right")]
    NotQuiteRight,
    #[serde(rename = "Incorrect")]
    Incorrect,
}

/// Per-criterion judgement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CriterionFeedback {
    pub criterion: String,
    pub met: bool,
    pub comment: String,
}

/// The JSON object the model is instructed to produce.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Verdict {
    pub verdict: VerdictLabel,
    pub summary: String,
    pub criteria_feedback: Vec<CriterionFeedback>,
    pub next_step: String,
}

impl Verdict {
    /// Check whether a parsed model answer follows the verdict schema.
    pub fn conforms(value: &Value) -> bool {
        Verdict::deserialize(value).is_ok()
    }
}
