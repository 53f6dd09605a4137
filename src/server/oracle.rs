//! Fortune and answer generation
//!
//! `OpenAiOracle` calls the chat-completions API; `CannedOracle` answers with
//! fixed text and is used offline or when no API key is configured.

use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use crate::error::{Result, VibesError};
use crate::server::prompts::{self, PromptMessage, EXAMPLE_ANSWER, EXAMPLE_FORTUNE};

/// OpenAI API base URL
const OPENAI_API_BASE: &str = "https://api.openai.com/v1";

const OPENAI_API_KEY_ENV: &str = "OPENAI_API_KEY";
const OPENAI_ORG_ENV: &str = "OPENAI_ORG";

const TEMPERATURE: f32 = 1.0;
const MAX_TOKENS: u32 = 75;

/// Source of fortunes and answers
#[async_trait]
pub trait Oracle: Send + Sync {
    /// Produce a new fortune
    async fn foretell(&self) -> Result<String>;

    /// Answer `question` in the light of `fortune`
    async fn clarify(&self, fortune: &str, question: &str) -> Result<String>;

    /// Name used in logs
    fn name(&self) -> &str;
}

/// Fixed responses, no network
#[derive(Debug, Default, Clone)]
pub struct CannedOracle;

#[async_trait]
impl Oracle for CannedOracle {
    async fn foretell(&self) -> Result<String> {
        Ok(EXAMPLE_FORTUNE.to_string())
    }

    async fn clarify(&self, _fortune: &str, _question: &str) -> Result<String> {
        Ok(EXAMPLE_ANSWER.to_string())
    }

    fn name(&self) -> &str {
        "canned"
    }
}

/// OpenAI chat-completions client
pub struct OpenAiOracle {
    client: Client,
    api_key: SecretString,
    organization: Option<String>,
    model: String,
    base_url: String,
}

impl OpenAiOracle {
    pub fn new(api_key: SecretString, model: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key,
            organization: None,
            model: model.into(),
            base_url: OPENAI_API_BASE.to_string(),
        }
    }

    /// Build from `OPENAI_API_KEY` / `OPENAI_ORG`; `None` when no key is set
    pub fn from_env(model: &str) -> Option<Self> {
        let key = std::env::var(OPENAI_API_KEY_ENV)
            .ok()
            .filter(|k| !k.trim().is_empty())?;

        let mut oracle = Self::new(SecretString::from(key), model);
        oracle.organization = std::env::var(OPENAI_ORG_ENV)
            .ok()
            .filter(|o| !o.trim().is_empty());
        Some(oracle)
    }

    /// Point the client at another OpenAI-compatible endpoint
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    async fn complete(&self, messages: Vec<PromptMessage>) -> Result<String> {
        let url = format!("{}/chat/completions", self.base_url);

        let request_body = ChatRequest {
            model: &self.model,
            messages: messages
                .iter()
                .map(|m| ChatMessage {
                    role: m.role.as_str().to_string(),
                    content: m.content.clone(),
                })
                .collect(),
            temperature: TEMPERATURE,
            max_tokens: MAX_TOKENS,
        };

        let mut request = self
            .client
            .post(&url)
            .bearer_auth(self.api_key.expose_secret())
            .json(&request_body);
        if let Some(org) = &self.organization {
            request = request.header("OpenAI-Organization", org);
        }

        let response = request
            .send()
            .await
            .map_err(|e| VibesError::Oracle(format!("Request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(VibesError::Oracle(format!(
                "API error ({}): {}",
                status, error_text
            )));
        }

        let chat_response: ChatResponse = response
            .json()
            .await
            .map_err(|e| VibesError::Oracle(format!("Failed to parse response: {}", e)))?;

        chat_response
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content.trim().to_string())
            .filter(|text| !text.is_empty())
            .ok_or_else(|| VibesError::Oracle("Empty response from API".to_string()))
    }
}

#[async_trait]
impl Oracle for OpenAiOracle {
    async fn foretell(&self) -> Result<String> {
        // The rng is not Send; build the prompt before awaiting
        let messages = prompts::fortune_messages(&mut rand::thread_rng());
        self.complete(messages).await
    }

    async fn clarify(&self, fortune: &str, question: &str) -> Result<String> {
        let messages = prompts::clarify_messages(&mut rand::thread_rng(), fortune, question);
        self.complete(messages).await
    }

    fn name(&self) -> &str {
        &self.model
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// OpenAI API Request/Response types
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChatMessage,
}
