//! Pulls the model's answer out of a provider response envelope.
//!
//! Providers nest the generated text in different places. Each strategy looks in one
//! place and returns the trimmed text if it found something non-blank; strategies are
//! tried in order and the first hit wins. Navigation never fails loudly: a missing or
//! mistyped field just means "not here".

use serde_json::Value;
use tracing::debug;

use crate::{Error, Result};

type Strategy = fn(&Value) -> Option<String>;

const STRATEGIES: [(&str, Strategy); 3] = [
    ("output_text", output_text),
    ("output_content", output_content),
    ("chat_choice", chat_choice),
];

fn non_blank(value: &Value) -> Option<String> {
    let text = value.as_str()?.trim();
    if text.is_empty() {
        None
    } else {
        Some(text.to_string())
    }
}

/// Top-level convenience field.
fn output_text(envelope: &Value) -> Option<String> {
    non_blank(envelope.get("output_text")?)
}

/// First non-blank `text` across `output[*].content[*]`.
fn output_content(envelope: &Value) -> Option<String> {
    envelope
        .get("output")?
        .as_array()?
        .iter()
        .filter_map(|item| item.get("content").and_then(Value::as_array))
        .flatten()
        .find_map(|part| part.get("text").and_then(non_blank))
}

/// Chat-completions style `choices[0].message.content`.
fn chat_choice(envelope: &Value) -> Option<String> {
    non_blank(envelope.get("choices")?.get(0)?.get("message")?.get("content")?)
}

/// Extract the model's text, or an empty string if no strategy finds any.
pub fn extract_text(envelope: &Value) -> String {
    for (name, strategy) in STRATEGIES {
        if let Some(text) = strategy(envelope) {
            debug!("Model text found via {}", name);
            return text;
        }
    }

    debug!("No model text found in envelope");
    String::new()
}

/// Extract the model's text and parse it as JSON.
pub fn parse_model_output(envelope: &Value) -> Result<Value> {
    let text = extract_text(envelope);
    serde_json::from_str(&text).map_err(|_| Error::non_json(&text, envelope))
}
