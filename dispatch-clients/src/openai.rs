//! Auth bootstrap and OpenAI-compatible streaming chat client (spec §4.7,
//! §6).

use async_trait::async_trait;
use futures::stream::{BoxStream, Stream, StreamExt};
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// One streamed chat-completion chunk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatChunk {
    /// Text content of this chunk.
    pub content: String,
}

/// Credentials used for the one-time auth bootstrap.
#[derive(Debug, Clone)]
pub struct Credentials {
    /// Sign-in email.
    pub email: String,
    /// Sign-in password.
    pub password: String,
}

#[derive(Serialize)]
struct SigninRequest<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Deserialize)]
struct SigninResponse {
    token: String,
}

#[derive(Deserialize)]
struct ApiKeyResponse {
    api_key: String,
}

/// Auth bootstrap + streaming chat, the surface `dispatch-orchestrator`
/// drives a request through. Implemented by [`OpenAiClient`] for production
/// use and by test fakes for unit tests (spec §8's "explicit, testable
/// construction" requirement).
#[async_trait]
pub trait ChatSource: Send + Sync {
    /// Sign in with `credentials`, returning a bearer token.
    async fn auth_signin(&self, credentials: &Credentials) -> Result<String>;

    /// Exchange a bearer token for an API key.
    async fn generate_api_key(&self, token: &str) -> Result<String>;

    /// Open a streaming chat completion.
    async fn chat_completions(
        &self,
        model: &str,
        system_prompt: &str,
        user_prompt: &str,
        api_key: &str,
        temperature: f64,
        max_tokens: Option<u32>,
    ) -> Result<BoxStream<'static, Result<ChatChunk>>>;
}

/// Client for the OpenAI-compatible endpoint fronted by the webui (auth +
/// chat completions).
pub struct OpenAiClient {
    http: reqwest::Client,
    webui_url: String,
    base_url: String,
    timeout: std::time::Duration,
}

impl OpenAiClient {
    /// Build a client. `webui_url` fronts `/auths/signin` and
    /// `/auths/api_key`; `base_url` fronts the chat-completion stream.
    pub fn new(
        http: reqwest::Client,
        webui_url: impl Into<String>,
        base_url: impl Into<String>,
        timeout: std::time::Duration,
    ) -> Self {
        Self {
            http,
            webui_url: webui_url.into(),
            base_url: base_url.into(),
            timeout,
        }
    }

    /// Sign in with `credentials`, returning a bearer token.
    pub async fn auth_signin(&self, credentials: &Credentials) -> Result<String> {
        let url = format!("{}/auths/signin", self.webui_url.trim_end_matches('/'));
        let response = self
            .http
            .post(&url)
            .json(&SigninRequest {
                email: &credentials.email,
                password: &credentials.password,
            })
            .send()
            .await
            .map_err(|e| Error::AuthFailed(e.to_string()))?;

        if !response.status().is_success() {
            return Err(Error::AuthFailed(format!("signin returned {}", response.status())));
        }

        let body: SigninResponse = response
            .json()
            .await
            .map_err(|e| Error::AuthFailed(e.to_string()))?;
        Ok(body.token)
    }

    /// Exchange a bearer token for an API key. Callers fall back to the
    /// bearer token itself when this fails (spec §4.7).
    pub async fn generate_api_key(&self, token: &str) -> Result<String> {
        let url = format!("{}/auths/api_key", self.webui_url.trim_end_matches('/'));
        let response = self
            .http
            .post(&url)
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| Error::AuthFailed(e.to_string()))?;

        if !response.status().is_success() {
            return Err(Error::AuthFailed(format!("api_key returned {}", response.status())));
        }

        let body: ApiKeyResponse = response
            .json()
            .await
            .map_err(|e| Error::AuthFailed(e.to_string()))?;
        Ok(body.api_key)
    }

    /// Open a streaming chat completion. Each item is one text chunk, in
    /// server-emitted order; the stream ends when the upstream closes it.
    /// Neither restartable nor seekable (spec §9).
    pub async fn chat_completions(
        &self,
        model: &str,
        system_prompt: &str,
        user_prompt: &str,
        api_key: &str,
        temperature: f64,
        max_tokens: Option<u32>,
    ) -> Result<impl Stream<Item = Result<ChatChunk>>> {
        let url = format!("{}/chat/completions", self.base_url.trim_end_matches('/'));
        let body = serde_json::json!({
            "model": model,
            "stream": true,
            "temperature": temperature,
            "max_tokens": max_tokens,
            "messages": [
                {"role": "system", "content": system_prompt},
                {"role": "user", "content": user_prompt},
            ],
        });

        let response = self
            .http
            .post(&url)
            .timeout(self.timeout)
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| Error::StreamFailed(e.to_string()))?;

        if !response.status().is_success() {
            return Err(Error::StreamFailed(format!("chat endpoint returned {}", response.status())));
        }

        let byte_stream = response.bytes_stream();
        Ok(parse_sse_chunks(byte_stream))
    }
}

#[async_trait]
impl ChatSource for OpenAiClient {
    async fn auth_signin(&self, credentials: &Credentials) -> Result<String> {
        OpenAiClient::auth_signin(self, credentials).await
    }

    async fn generate_api_key(&self, token: &str) -> Result<String> {
        OpenAiClient::generate_api_key(self, token).await
    }

    async fn chat_completions(
        &self,
        model: &str,
        system_prompt: &str,
        user_prompt: &str,
        api_key: &str,
        temperature: f64,
        max_tokens: Option<u32>,
    ) -> Result<BoxStream<'static, Result<ChatChunk>>> {
        let stream = OpenAiClient::chat_completions(
            self,
            model,
            system_prompt,
            user_prompt,
            api_key,
            temperature,
            max_tokens,
        )
        .await?;
        Ok(Box::pin(stream))
    }
}

/// Parse a `text/event-stream` byte stream of `data: {...}` lines into
/// [`ChatChunk`]s, stopping at the `data: [DONE]` sentinel.
fn parse_sse_chunks(
    byte_stream: impl Stream<Item = reqwest::Result<bytes::Bytes>>,
) -> impl Stream<Item = Result<ChatChunk>> {
    let mut buf = String::new();
    byte_stream
        .map(|chunk| chunk.map_err(|e| Error::StreamFailed(e.to_string())))
        .flat_map(move |chunk| {
            let lines: Vec<Result<ChatChunk>> = match chunk {
                Ok(bytes) => {
                    buf.push_str(&String::from_utf8_lossy(&bytes));
                    let mut out = Vec::new();
                    while let Some(pos) = buf.find('\n') {
                        let line = buf[..pos].trim().to_string();
                        buf.drain(..=pos);
                        if let Some(event) = parse_sse_line(&line) {
                            out.push(event);
                        }
                    }
                    out
                }
                Err(e) => vec![Err(e)],
            };
            futures::stream::iter(lines)
        })
}

fn parse_sse_line(line: &str) -> Option<Result<ChatChunk>> {
    let payload = line.strip_prefix("data:")?.trim();
    if payload.is_empty() {
        return None;
    }
    if payload == "[DONE]" {
        return None;
    }

    let parsed: serde_json::Value = match serde_json::from_str(payload) {
        Ok(v) => v,
        Err(e) => return Some(Err(Error::StreamFailed(e.to_string()))),
    };

    let content = parsed
        .pointer("/choices/0/delta/content")
        .and_then(|v| v.as_str())
        .unwrap_or_default()
        .to_string();

    if content.is_empty() {
        None
    } else {
        Some(Ok(ChatChunk { content }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_content_delta() {
        let line = r#"data: {"choices":[{"delta":{"content":"hello"}}]}"#;
        let chunk = parse_sse_line(line).unwrap().unwrap();
        assert_eq!(chunk.content, "hello");
    }

    #[test]
    fn ignores_done_sentinel() {
        assert!(parse_sse_line("data: [DONE]").is_none());
    }

    #[test]
    fn ignores_empty_delta() {
        let line = r#"data: {"choices":[{"delta":{}}]}"#;
        assert!(parse_sse_line(line).is_none());
    }
}
