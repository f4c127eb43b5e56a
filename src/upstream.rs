use serde_json::Value;
use std::time::Instant;
use thiserror::Error;
use tracing::debug;

use crate::config::Config;
use crate::error::AppError;
use crate::metrics::{UPSTREAM_ERRORS_TOTAL, UPSTREAM_LATENCY};
use crate::models::{ChatMessage, ChatReply, CompletionRequest, CompletionResponse, UpstreamErrorBody};

pub const FALLBACK_MESSAGE: &str = "No response generated";

#[derive(Error, Debug)]
pub enum UpstreamError {
    #[error("Request failed: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("Upstream returned {status}: {message}")]
    Status {
        status: reqwest::StatusCode,
        message: String,
    },

    #[error("Parse error: {0}")]
    Decode(#[source] reqwest::Error),
}

// Forwards conversations to an OpenAI compatible chat completions API
// with fixed model and generation parameters. Stateless: the caller sends
// the whole history, system message included, on every call.
pub struct ChatProxy {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
    temperature: f32,
    max_tokens: u32,
}

impl ChatProxy {
    pub fn new(client: reqwest::Client, config: &Config) -> Self {
        Self {
            client,
            base_url: config.upstream_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
        }
    }

    pub fn client(config: &Config) -> reqwest::Result<reqwest::Client> {
        reqwest::Client::builder()
            .timeout(config.upstream_timeout())
            .build()
    }

    // Validate the inbound body, then make exactly one upstream attempt
    pub async fn handle_chat(&self, payload: &Value) -> Result<ChatReply, AppError> {
        let messages = parse_messages(payload)?;
        Ok(self.complete(&messages).await?)
    }

    pub async fn complete(&self, messages: &[ChatMessage]) -> Result<ChatReply, UpstreamError> {
        let start_time = Instant::now();
        let result = self.send(messages).await;
        UPSTREAM_LATENCY.observe(start_time.elapsed().as_secs_f64());

        if result.is_err() {
            UPSTREAM_ERRORS_TOTAL.inc();
        }
        result.map(reply_from)
    }

    async fn send(&self, messages: &[ChatMessage]) -> Result<CompletionResponse, UpstreamError> {
        debug!(
            "Forwarding {} messages to {} ({})",
            messages.len(),
            self.base_url,
            self.model
        );

        let res = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&CompletionRequest {
                model: &self.model,
                messages,
                temperature: self.temperature,
                max_tokens: self.max_tokens,
            })
            .send()
            .await
            .map_err(|e| UpstreamError::Transport(e.without_url()))?;

        let status = res.status();
        if !status.is_success() {
            let body = res.text().await.unwrap_or_default();
            let message = serde_json::from_str::<UpstreamErrorBody>(&body)
                .map(|b| b.error.message)
                .unwrap_or_else(|_| status.canonical_reason().unwrap_or("unknown error").to_string());
            return Err(UpstreamError::Status { status, message });
        }

        res.json::<CompletionResponse>()
            .await
            .map_err(|e| UpstreamError::Decode(e.without_url()))
    }
}

// `messages` must be present and be an array of {role, content} objects
pub fn parse_messages(payload: &Value) -> Result<Vec<ChatMessage>, AppError> {
    let Some(Value::Array(items)) = payload.get("messages") else {
        return Err(AppError::InvalidRequest("messages array required".to_string()));
    };

    items
        .iter()
        .map(|item| serde_json::from_value::<ChatMessage>(item.clone()))
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| {
            debug!("Rejected malformed chat message: {e}");
            AppError::InvalidRequest("messages array required".to_string())
        })
}

// First completion's text, or the fallback when it is missing or empty
pub fn reply_from(completion: CompletionResponse) -> ChatReply {
    let message = completion
        .choices
        .into_iter()
        .next()
        .flatten()
        .and_then(|choice| choice.message)
        .and_then(|message| message.content)
        .filter(|content| !content.is_empty())
        .unwrap_or_else(|| FALLBACK_MESSAGE.to_string());

    ChatReply {
        message,
        usage: completion.usage,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Role;
    use serde_json::json;

    fn completion(body: Value) -> CompletionResponse {
        serde_json::from_value(body).unwrap()
    }

    #[test]
    fn messages_must_be_an_array() {
        for payload in [json!({}), json!({ "messages": "not-an-array" }), json!({ "messages": null }), json!([])] {
            let err = parse_messages(&payload).unwrap_err();
            assert_eq!(err.to_string(), "Invalid request: messages array required");
        }
    }

    #[test]
    fn unknown_role_is_rejected() {
        let payload = json!({ "messages": [{ "role": "tool", "content": "hi" }] });
        let err = parse_messages(&payload).unwrap_err();

        assert!(matches!(err, AppError::InvalidRequest(_)));
        assert_eq!(err.to_string(), "Invalid request: messages array required");
    }

    #[test]
    fn history_is_kept_in_order() {
        let payload = json!({ "messages": [
            { "role": "system", "content": "ctx" },
            { "role": "user", "content": "hi" },
            { "role": "assistant", "content": "hello" },
        ]});

        let messages = parse_messages(&payload).unwrap();
        assert_eq!(
            messages,
            vec![
                ChatMessage::new(Role::System, "ctx"),
                ChatMessage::new(Role::User, "hi"),
                ChatMessage::new(Role::Assistant, "hello"),
            ]
        );
    }

    #[test]
    fn missing_content_uses_fallback() {
        let cases = [
            json!({ "choices": [] }),
            json!({ "choices": [{ "message": { "content": null } }] }),
            json!({ "choices": [{ "message": { "content": "" } }] }),
            json!({ "choices": [{}] }),
            json!({ "choices": [null] }),
        ];

        for body in cases {
            assert_eq!(reply_from(completion(body)).message, FALLBACK_MESSAGE);
        }
    }

    #[test]
    fn body_without_choices_is_not_a_completion() {
        for body in [json!({}), json!({ "id": "x", "object": "error" })] {
            assert!(serde_json::from_value::<CompletionResponse>(body).is_err());
        }
    }

    #[test]
    fn usage_is_passed_through() {
        let reply = reply_from(completion(json!({
            "choices": [{ "message": { "role": "assistant", "content": "Rust, mostly." } }],
            "usage": { "prompt_tokens": 12, "completion_tokens": 3, "total_tokens": 15 }
        })));

        assert_eq!(reply.message, "Rust, mostly.");
        assert_eq!(reply.usage.unwrap().total_tokens, 15);
    }
}
