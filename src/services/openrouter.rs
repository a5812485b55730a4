use serde::{Deserialize, Serialize};

use crate::services::advice::{AdviceError, AdviceService};

const OPENROUTER_ENDPOINT: &str = "https://openrouter.ai/api/v1/chat/completions";

/// Fixed system turn for every advice request.
const SYSTEM_PROMPT: &str = "You are a health advisor.";

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
    error: Option<ApiError>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: Option<MessageContent>,
}

#[derive(Debug, Deserialize)]
struct MessageContent {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    message: Option<String>,
}

pub struct OpenRouterService {
    api_key: String,
    model: String,
    client: reqwest::Client,
}

impl OpenRouterService {
    pub fn new(api_key: String, model: String) -> Self {
        Self {
            api_key,
            model,
            client: reqwest::Client::new(),
        }
    }

    fn build_request(&self, prompt: &str) -> ChatRequest {
        ChatRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: SYSTEM_PROMPT.to_string(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: prompt.to_string(),
                },
            ],
        }
    }
}

#[async_trait::async_trait]
impl AdviceService for OpenRouterService {
    async fn fetch_advice(&self, prompt: &str) -> Result<String, AdviceError> {
        log::info!("🤖 Requesting advice from OpenRouter with model: {}", self.model);

        let response = self
            .client
            .post(OPENROUTER_ENDPOINT)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&self.build_request(prompt))
            .send()
            .await
            .map_err(|e| AdviceError::RequestFailed(e.to_string()))?;

        let status = response.status();
        log::debug!("📥 OpenRouter response status: {}", status);

        let body = response
            .text()
            .await
            .map_err(|e| AdviceError::RequestFailed(e.to_string()))?;

        if !status.is_success() {
            log::error!("❌ OpenRouter API error ({}): {}", status, body);
            let detail = service_error_message(&body).unwrap_or_else(|| body.clone());
            return Err(AdviceError::RequestFailed(format!("{}: {}", status, detail)));
        }

        extract_content(&body)
    }
}

/// Pulls the assistant text out of a chat-completion body. A body without
/// the expected content field surfaces the service's own error message
/// when it carries one; a body that is not JSON at all falls through to
/// the catch-all.
fn extract_content(body: &str) -> Result<String, AdviceError> {
    let parsed: ChatResponse =
        serde_json::from_str(body).map_err(|e| AdviceError::Unexpected(e.to_string()))?;

    if let Some(content) = parsed
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message)
        .and_then(|message| message.content)
    {
        return Ok(content);
    }

    let detail = parsed.error.and_then(|e| e.message);
    Err(AdviceError::InvalidAdvice { detail })
}

fn service_error_message(body: &str) -> Option<String> {
    serde_json::from_str::<ChatResponse>(body)
        .ok()
        .and_then(|r| r.error)
        .and_then(|e| e.message)
}
