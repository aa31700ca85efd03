//! Upstream LLM provider client.

use std::future::Future;
use std::time::Instant;

use serde::Serialize;
use tracing::{error, info};

use crate::prompt::PromptPair;
use crate::{Error, Result};

/// Provider endpoint used when none is configured.
pub const DEFAULT_API_URL: &str = "https://api.openai.com/v1/responses";
/// Model used when none is configured.
pub const DEFAULT_MODEL: &str = "gpt-4.1-mini";

/// Status and raw body of one provider round trip.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpstreamReply {
    pub status: u16,
    pub body: String,
}

impl UpstreamReply {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// One blocking call to a completion provider.
///
/// Implementations return `Ok` for any HTTP answer, successful or not; `Err` is reserved
/// for failing to get an answer at all.
pub trait CompletionApi: Send + Sync {
    fn complete(
        &self,
        api_key: &str,
        prompt: &PromptPair,
    ) -> impl Future<Output = Result<UpstreamReply>> + Send;
}

#[derive(Debug, Serialize)]
struct ResponsesRequest<'a> {
    model: &'a str,
    input: [InputMessage<'a>; 2],
    text: TextOptions,
}

#[derive(Debug, Serialize)]
struct InputMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct TextOptions {
    format: TextFormat,
}

#[derive(Debug, Serialize)]
struct TextFormat {
    #[serde(rename = "type")]
    format_type: &'static str,
}

/// Client for the provider's responses endpoint.
#[derive(Debug, Clone)]
pub struct OpenAiClient {
    http: reqwest::Client,
    api_url: String,
    model: String,
}

impl OpenAiClient {
    /// Create a new client.
    pub fn new(http: reqwest::Client, api_url: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            http,
            api_url: api_url.into(),
            model: model.into(),
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn request_body<'a>(&'a self, prompt: &'a PromptPair) -> ResponsesRequest<'a> {
        ResponsesRequest {
            model: &self.model,
            input: [
                InputMessage {
                    role: "system",
                    content: &prompt.system,
                },
                InputMessage {
                    role: "user",
                    content: &prompt.user,
                },
            ],
            text: TextOptions {
                format: TextFormat {
                    format_type: "json_object",
                },
            },
        }
    }
}

impl CompletionApi for OpenAiClient {
    async fn complete(&self, api_key: &str, prompt: &PromptPair) -> Result<UpstreamReply> {
        let start = Instant::now();

        let response = self
            .http
            .post(&self.api_url)
            .bearer_auth(api_key)
            .json(&self.request_body(prompt))
            .send()
            .await
            .map_err(|e| {
                error!("Upstream request failed: {}", e);
                Error::transport(e.to_string())
            })?;

        let status = response.status().as_u16();
        info!(
            "Upstream responded: status={} model={} latency_ms={}",
            status,
            self.model,
            start.elapsed().as_millis()
        );

        let body = if response.status().is_success() {
            response
                .text()
                .await
                .map_err(|e| Error::transport(format!("Failed to read upstream body: {}", e)))?
        } else {
            response.text().await.unwrap_or_default()
        };

        Ok(UpstreamReply { status, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::task::JoinHandle;

    fn prompt() -> PromptPair {
        PromptPair {
            system: "be an evaluator".to_string(),
            user: "grade this".to_string(),
        }
    }

    fn header_end(buf: &[u8]) -> Option<usize> {
        buf.windows(4).position(|w| w == b"\r\n\r\n").map(|p| p + 4)
    }

    fn content_length(head: &str) -> usize {
        head.lines()
            .filter_map(|line| line.split_once(':'))
            .find(|(name, _)| name.trim().eq_ignore_ascii_case("content-length"))
            .and_then(|(_, value)| value.trim().parse().ok())
            .unwrap_or(0)
    }

    // Serve exactly one canned HTTP response and hand back the raw request.
    async fn serve_once(status_line: &'static str, body: &'static str) -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind(("127.0.0.1", 0)).await.unwrap();
        let url = format!("http://{}/v1/responses", listener.local_addr().unwrap());

        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = Vec::new();
            let mut chunk = [0u8; 4096];
            loop {
                let n = socket.read(&mut chunk).await.unwrap();
                if n == 0 {
                    break;
                }
                buf.extend_from_slice(&chunk[..n]);
                if let Some(end) = header_end(&buf) {
                    let head = String::from_utf8_lossy(&buf[..end]).to_string();
                    if buf.len() >= end + content_length(&head) {
                        break;
                    }
                }
            }

            let response = format!(
                "HTTP/1.1 {}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
                status_line,
                body.len(),
                body
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.ok();

            String::from_utf8_lossy(&buf).to_string()
        });

        (url, handle)
    }

    #[tokio::test]
    async fn test_sends_bearer_and_json_directive() {
        let (url, handle) = serve_once("200 OK", r#"{"output_text":"{}"}"#).await;
        let client = OpenAiClient::new(reqwest::Client::new(), url, "test-model");

        let reply = client.complete("sk-test", &prompt()).await.unwrap();
        assert!(reply.is_success());
        assert_eq!(reply.body, r#"{"output_text":"{}"}"#);

        let raw = handle.await.unwrap();
        let lower = raw.to_ascii_lowercase();
        assert!(raw.starts_with("POST /v1/responses"));
        assert!(lower.contains("authorization: bearer sk-test"));
        assert!(lower.contains("content-type: application/json"));

        let body_start = header_end(raw.as_bytes()).unwrap();
        let sent: Value = serde_json::from_str(&raw[body_start..]).unwrap();
        assert_eq!(sent["model"], "test-model");
        assert_eq!(sent["input"][0]["role"], "system");
        assert_eq!(sent["input"][0]["content"], "be an evaluator");
        assert_eq!(sent["input"][1]["role"], "user");
        assert_eq!(sent["input"][1]["content"], "grade this");
        assert_eq!(sent["text"]["format"]["type"], "json_object");
    }

    #[tokio::test]
    async fn test_error_status_is_returned_not_raised() {
        let (url, _handle) =
            serve_once("401 Unauthorized", r#"{"error":{"message":"Incorrect API key"}}"#).await;
        let client = OpenAiClient::new(reqwest::Client::new(), url, "test-model");

        let reply = client.complete("sk-bad", &prompt()).await.unwrap();
        assert_eq!(reply.status, 401);
        assert!(!reply.is_success());
        assert!(reply.body.contains("Incorrect API key"));
    }

    #[tokio::test]
    async fn test_unreachable_provider_is_transport_error() {
        // Bind then drop to get a port with no listener.
        let listener = TcpListener::bind(("127.0.0.1", 0)).await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = OpenAiClient::new(reqwest::Client::new(), format!("http://{}/", addr), "test-model");
        let err = client.complete("sk-test", &prompt()).await.unwrap_err();
        assert!(matches!(err, Error::Transport(_)));
        assert!(!err.body().to_string().contains("sk-test"));
    }
}
