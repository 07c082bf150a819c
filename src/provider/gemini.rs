use super::{Completion, CompletionClient};
use crate::error::ProviderError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tracing::debug;

/// Google Generative Language `generateContent` over HTTPS
pub struct GeminiClient {
    client: reqwest::Client,
    api_key: String,
    model: String,
    endpoint: String,
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
}

#[derive(Serialize)]
struct Content<'a> {
    role: &'static str,
    parts: Vec<RequestPart<'a>>,
}

#[derive(Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Deserialize, Debug, Default)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(default)]
    error: Option<ApiError>,
}

#[derive(Deserialize, Debug)]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
    #[serde(default, rename = "finishReason")]
    finish_reason: Option<String>,
}

#[derive(Deserialize, Debug)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Deserialize, Debug)]
struct ResponsePart {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Deserialize, Debug)]
struct ApiError {
    #[serde(default)]
    message: String,
}

impl GeminiClient {
    pub fn new(
        api_key: impl Into<String>,
        model: impl Into<String>,
        endpoint: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, ProviderError> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("chatgrade/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()?;
        Ok(Self {
            client,
            api_key: api_key.into(),
            model: model.into(),
            endpoint: endpoint.into(),
        })
    }

    fn url(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.endpoint.trim_end_matches('/'),
            self.model
        )
    }
}

#[async_trait]
impl CompletionClient for GeminiClient {
    fn name(&self) -> &'static str {
        "gemini"
    }

    async fn complete(&self, payload: &str) -> Result<Completion, ProviderError> {
        let body = GenerateRequest {
            contents: vec![Content {
                role: "user",
                parts: vec![RequestPart { text: payload }],
            }],
        };

        debug!(
            "Gemini request: model={}, payload={} bytes",
            self.model,
            payload.len()
        );
        let start = Instant::now();

        let resp = self
            .client
            .post(self.url())
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = resp.status();
        let text = resp.text().await?;

        debug!(
            "Gemini response: HTTP {} in {:.1}s ({} bytes)",
            status,
            start.elapsed().as_secs_f64(),
            text.len()
        );

        Ok(Completion {
            text: read_reply(status, text)?,
            duration: start.elapsed(),
        })
    }
}

/// Map a `generateContent` response to the model text
fn read_reply(status: reqwest::StatusCode, body: String) -> Result<String, ProviderError> {
    if !status.is_success() {
        return Err(ProviderError::Status {
            status: status.as_u16(),
            body,
        });
    }
    extract_text(&body)
}

/// Concatenate the text parts of the first candidate
fn extract_text(body: &str) -> Result<String, ProviderError> {
    let parsed: GenerateResponse = serde_json::from_str(body)
        .map_err(|e| ProviderError::Response(format!("invalid JSON: {e}")))?;

    if let Some(err) = parsed.error {
        return Err(ProviderError::Response(err.message));
    }

    let candidate = parsed
        .candidates
        .into_iter()
        .next()
        .ok_or_else(|| ProviderError::Response("no candidates".to_string()))?;

    let text: String = candidate
        .content
        .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
        .unwrap_or_default();

    if text.is_empty() {
        return Err(ProviderError::Response(format!(
            "empty candidate (finish reason: {})",
            candidate.finish_reason.as_deref().unwrap_or("unknown")
        )));
    }

    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_text_joins_parts() {
        let body = r#"{"candidates": [{"content": {"parts": [{"text": "{\"Empathy\": \"1\"}\n"}, {"text": "-----\n{}"}], "role": "model"}, "finishReason": "STOP"}]}"#;
        assert_eq!(extract_text(body).unwrap(), "{\"Empathy\": \"1\"}\n-----\n{}");
    }

    #[test]
    fn test_extract_text_error_body() {
        let body = r#"{"error": {"code": 429, "message": "Resource has been exhausted"}}"#;
        assert!(matches!(
            extract_text(body),
            Err(ProviderError::Response(msg)) if msg.contains("exhausted")
        ));
    }

    #[test]
    fn test_extract_text_blocked_candidate() {
        let body = r#"{"candidates": [{"finishReason": "SAFETY"}]}"#;
        assert!(matches!(
            extract_text(body),
            Err(ProviderError::Response(msg)) if msg.contains("SAFETY")
        ));
    }

    #[test]
    fn test_rejected_key_is_a_final_status_error() {
        let body = r#"{"error": {"code": 401, "message": "API key not valid"}}"#.to_string();
        let err = read_reply(reqwest::StatusCode::UNAUTHORIZED, body).unwrap_err();
        assert!(matches!(
            err,
            ProviderError::Status { status: 401, ref body } if body.contains("not valid")
        ));
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_overload_is_retryable_status() {
        let err =
            read_reply(reqwest::StatusCode::SERVICE_UNAVAILABLE, String::new()).unwrap_err();
        assert!(matches!(err, ProviderError::Status { status: 503, .. }));
        assert!(err.is_retryable());

        let err = read_reply(reqwest::StatusCode::TOO_MANY_REQUESTS, String::new()).unwrap_err();
        assert!(err.is_retryable());
    }

    #[test]
    fn test_success_status_extracts_text() {
        let body = r#"{"candidates": [{"content": {"parts": [{"text": "ok"}]}}]}"#.to_string();
        assert_eq!(read_reply(reqwest::StatusCode::OK, body).unwrap(), "ok");
    }

    #[test]
    fn test_url() {
        let client = GeminiClient::new(
            "key",
            "gemini-2.0-flash",
            "https://example.test/v1beta/",
            Duration::from_secs(5),
        )
        .unwrap();
        assert_eq!(
            client.url(),
            "https://example.test/v1beta/models/gemini-2.0-flash:generateContent"
        );
    }
}
