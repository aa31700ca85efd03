//! Shared library for the learner feedback function.
//!
//! This crate holds everything the function needs apart from the runtime wiring:
//! configuration, the origin policy, request validation, prompt rendering, the upstream
//! client and response extraction.

pub mod config;
pub mod error;
pub mod extract;
pub mod http;
pub mod models;
pub mod openai;
pub mod origin;
pub mod prompt;

pub use config::Config;
pub use error::{Error, Result};
pub use extract::{extract_text, parse_model_output};
pub use models::{CriterionFeedback, Submission, Verdict, VerdictLabel};
pub use openai::{CompletionApi, OpenAiClient, UpstreamReply};
pub use origin::OriginPolicy;
pub use prompt::{PromptPair, PromptTemplate};
