use serde::{Deserialize, Serialize};

// Speaker of a chat message
#[derive(Deserialize, Serialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
    System,
}

// One turn of a conversation, as sent by the front end and forwarded upstream
#[derive(Deserialize, Serialize, Clone, Debug, PartialEq, Eq)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }
}

// Token accounting reported by the upstream API
#[derive(Deserialize, Serialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct TokenUsage {
    pub prompt_tokens: u64,
    pub completion_tokens: u64,
    pub total_tokens: u64,
}

// Body returned by POST /api/chat
#[derive(Deserialize, Serialize, Clone, Debug, PartialEq, Eq)]
pub struct ChatReply {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usage: Option<TokenUsage>,
}

#[derive(Serialize, Debug)]
pub struct SystemPromptResponse {
    #[serde(rename = "systemPrompt")]
    pub system_prompt: String,
}

#[derive(Serialize, Debug)]
pub struct ResumeResponse {
    pub content: String,
}

// Upstream (OpenAI compatible) request format
#[derive(Serialize, Debug)]
pub struct CompletionRequest<'a> {
    pub model: &'a str,
    pub messages: &'a [ChatMessage],
    pub temperature: f32,
    pub max_tokens: u32,
}

// Upstream response format, only the fields we read
#[derive(Deserialize, Debug)]
pub struct CompletionResponse {
    // required: a body without `choices` is not a completion
    pub choices: Vec<Option<CompletionChoice>>,
    #[serde(default)]
    pub usage: Option<TokenUsage>,
}

#[derive(Deserialize, Debug)]
pub struct CompletionChoice {
    #[serde(default)]
    pub message: Option<CompletionMessage>,
}

#[derive(Deserialize, Debug)]
pub struct CompletionMessage {
    #[serde(default)]
    pub content: Option<String>,
}

// Error envelope some upstream failures carry
#[derive(Deserialize, Debug)]
pub struct UpstreamErrorBody {
    pub error: UpstreamErrorDetail,
}

#[derive(Deserialize, Debug)]
pub struct UpstreamErrorDetail {
    pub message: String,
}
