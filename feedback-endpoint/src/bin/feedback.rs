//! Learner Feedback Lambda - Evaluates a free-text answer against a learning objective.
//!
//! Endpoints:
//! - OPTIONS / - CORS preflight
//! - POST / - Evaluate `{response_text, learning_objective, criteria?}` and return a verdict

use lambda_http::http::header::ORIGIN;
use lambda_http::http::Method;
use lambda_http::{run, service_fn, Body, Error, Request, Response};
use serde_json::Value;
use shared::http::{empty_response, error_response, json_response};
use shared::{parse_model_output, CompletionApi, Config, Submission, Verdict};
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Application state shared across requests.
struct AppState<C> {
    config: Config,
    client: C,
}

async fn handler<C: CompletionApi>(state: Arc<AppState<C>>, event: Request) -> Result<Response<Body>, Error> {
    let origin = event.headers().get(ORIGIN).and_then(|v| v.to_str().ok());
    let allowed = state.config.origins.allow(origin);

    if *event.method() == Method::OPTIONS {
        return empty_response(204, allowed);
    }

    if *event.method() != Method::POST {
        info!("Rejected method: {}", event.method());
        return error_response(&shared::Error::MethodNotAllowed, None);
    }

    let Some(allowed) = allowed else {
        warn!("Rejected origin: {}", origin.unwrap_or("<none>"));
        return error_response(&shared::Error::OriginNotAllowed(origin.map(String::from)), None);
    };

    match evaluate(&state, event.body()).await {
        Ok(verdict) => json_response(200, &verdict, Some(allowed)),
        Err(e) => {
            warn!("Feedback request failed ({}): {}", e.status_code(), e);
            error_response(&e, Some(allowed))
        }
    }
}

/// Validate the submission, ask the provider, and return the model's parsed answer.
async fn evaluate<C: CompletionApi>(state: &AppState<C>, body: &Body) -> shared::Result<Value> {
    let submission = Submission::parse(body.as_ref())?;

    let api_key = state
        .config
        .openai_api_key
        .as_deref()
        .ok_or_else(|| shared::Error::Config("Missing OPENAI_API_KEY".to_string()))?;

    info!(
        "Evaluating response: chars={} criteria={}",
        submission.response_text.chars().count(),
        submission.criteria.len()
    );

    let prompt = state.config.prompt.render(&submission);
    let reply = state.client.complete(api_key, &prompt).await?;

    if !reply.is_success() {
        return Err(shared::Error::upstream(reply.status, &reply.body));
    }

    // A body that is not JSON still goes through extraction so the preview shows it.
    let envelope = serde_json::from_str(&reply.body).unwrap_or(Value::String(reply.body));
    let verdict = parse_model_output(&envelope)?;

    if !Verdict::conforms(&verdict) {
        warn!("Model answer does not follow the verdict schema; returning it unchanged");
    }

    Ok(verdict)
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .init();

    let config = Config::from_env()?;
    let client = config.openai_client();
    info!(
        "Feedback function starting: model={} exact_origins={}",
        client.model(),
        config.origins.exact_origins().len()
    );

    let state = Arc::new(AppState { config, client });

    run(service_fn(move |event| {
        let state = Arc::clone(&state);
        async move { handler(state, event).await }
    }))
    .await
}
