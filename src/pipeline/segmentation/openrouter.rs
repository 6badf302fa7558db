use std::sync::{Mutex, PoisonError};

use serde::{Deserialize, Serialize};

use super::types::{CompletionRequest, LlmClient};
use super::LlmError;
use crate::config::{LlmSettings, APP_NAME};

/// Sent as `HTTP-Referer` so requests are attributed on the provider dashboard.
const REFERER: &str = "https://github.com/codeforces-editorial";

/// OpenRouter chat-completions client (blocking).
pub struct OpenRouterClient {
    base_url: String,
    api_key: String,
    model: String,
    client: reqwest::blocking::Client,
    timeout_secs: u64,
}

impl OpenRouterClient {
    /// Build a client from settings. Fails without an API key.
    pub fn new(settings: &LlmSettings) -> Result<Self, LlmError> {
        let api_key = settings
            .api_key
            .clone()
            .filter(|k| !k.trim().is_empty())
            .ok_or(LlmError::MissingApiKey)?;

        let client = reqwest::blocking::Client::builder()
            .timeout(std::time::Duration::from_secs(settings.timeout_secs))
            .build()
            .map_err(|e| LlmError::HttpClient(e.to_string()))?;

        Ok(Self {
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            api_key,
            model: settings.model.clone(),
            client,
            timeout_secs: settings.timeout_secs,
        })
    }

    fn map_send_error(&self, e: reqwest::Error) -> LlmError {
        if e.is_timeout() {
            LlmError::Timeout(self.timeout_secs)
        } else if e.is_connect() {
            LlmError::Connection(self.base_url.clone())
        } else {
            LlmError::HttpClient(e.to_string())
        }
    }
}

/// Request body for `/chat/completions`
#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    temperature: f32,
    max_tokens: u32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

/// Response body from `/chat/completions`
#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
    usage: Option<ChatUsage>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}

#[derive(Deserialize)]
struct ChatUsage {
    #[serde(default)]
    prompt_tokens: u64,
    #[serde(default)]
    completion_tokens: u64,
}

fn build_chat_request<'a>(model: &'a str, request: &CompletionRequest<'a>) -> ChatRequest<'a> {
    ChatRequest {
        model,
        messages: [
            ChatMessage {
                role: "system",
                content: request.system,
            },
            ChatMessage {
                role: "user",
                content: request.prompt,
            },
        ],
        temperature: request.temperature,
        max_tokens: request.max_tokens,
    }
}

/// First choice's content; empty content is an error.
fn first_choice_content(response: ChatResponse) -> Result<String, LlmError> {
    if let Some(usage) = &response.usage {
        tracing::debug!(
            prompt_tokens = usage.prompt_tokens,
            completion_tokens = usage.completion_tokens,
            "Chat completion usage"
        );
    }

    let choice = response
        .choices
        .into_iter()
        .next()
        .ok_or(LlmError::NoChoices)?;

    match choice.message.content {
        Some(content) if !content.trim().is_empty() => Ok(content),
        _ => Err(LlmError::EmptyContent),
    }
}

impl LlmClient for OpenRouterClient {
    fn complete(&self, request: &CompletionRequest<'_>) -> Result<String, LlmError> {
        let url = format!("{}/chat/completions", self.base_url);
        let body = build_chat_request(&self.model, request);

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .header("HTTP-Referer", REFERER)
            .header("X-Title", APP_NAME)
            .json(&body)
            .send()
            .map_err(|e| self.map_send_error(e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(LlmError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: ChatResponse = response
            .json()
            .map_err(|e| LlmError::ResponseParsing(e.to_string()))?;

        first_choice_content(parsed)
    }

    fn model(&self) -> &str {
        &self.model
    }
}

/// Mock LLM client for testing: returns a configured response and records prompts.
pub struct MockLlmClient {
    response: String,
    failure: Option<(u16, String)>,
    prompts: Mutex<Vec<String>>,
}

impl MockLlmClient {
    pub fn new(response: &str) -> Self {
        Self {
            response: response.to_string(),
            failure: None,
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// Every call fails with an HTTP status error.
    pub fn failing(status: u16, body: &str) -> Self {
        Self {
            failure: Some((status, body.to_string())),
            ..Self::new("")
        }
    }

    /// Prompts received so far, oldest first.
    pub fn prompts(&self) -> Vec<String> {
        self.prompts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn call_count(&self) -> usize {
        self.prompts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

impl LlmClient for MockLlmClient {
    fn complete(&self, request: &CompletionRequest<'_>) -> Result<String, LlmError> {
        self.prompts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(request.prompt.to_string());

        match &self.failure {
            Some((status, body)) => Err(LlmError::Status {
                status: *status,
                body: body.clone(),
            }),
            None => Ok(self.response.clone()),
        }
    }

    fn model(&self) -> &str {
        "mock"
    }
}
