//! # Remote Genre Classifier
//!
//! Client per la classificazione del genere tramite un endpoint
//! chat-completions compatibile OpenAI (default: Grok di x.ai).
//!
//! ## Responsabilità:
//! - Definisce il trait `RemoteClassifier` usato dallo stage 4 del resolver
//! - Implementa `ChatCompletionClassifier` con `reqwest` e timeout limitato
//! - Assenza di API key = "non chiamare", non è un errore
//! - Risposte vuote, errori HTTP e timeout diventano `ClassificationUnavailable`

use crate::config::ClassifierSettings;
use crate::error::{OrganizeError, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

/// System prompt sent when none is configured
pub const DEFAULT_SYSTEM_PROMPT: &str = "You are an expert in music classification. \
Determine the musical genre of this album/artist. \
Answer ONLY with the name of the genre (e.g. Pop, Rock, Rap & Hip-Hop).";

/// Genre classification service used as the last fallback stage.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RemoteClassifier: Send + Sync {
    /// Whether a credential is available. `false` means the classifier must not be called.
    fn is_configured(&self) -> bool;

    /// Ask the service for the genre of an artist/album pair.
    async fn classify(&self, artist: &str, album: &str) -> Result<String>;
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: Option<ChatChoiceMessage>,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}

/// `reqwest` client for chat-completions style classification endpoints
pub struct ChatCompletionClassifier {
    http: Client,
    settings: ClassifierSettings,
}

impl ChatCompletionClassifier {
    pub fn new(settings: ClassifierSettings) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .connect_timeout(Duration::from_secs(settings.timeout_secs.min(10)))
            .user_agent(format!("tag-organizer/{}", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| OrganizeError::Config(format!("cannot build HTTP client: {}", e)))?;

        Ok(Self { http, settings })
    }

    fn api_key(&self) -> Option<&str> {
        self.settings
            .api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
    }

    fn system_prompt(&self) -> &str {
        self.settings
            .system_prompt
            .as_deref()
            .filter(|p| !p.trim().is_empty())
            .unwrap_or(DEFAULT_SYSTEM_PROMPT)
    }
}

#[async_trait]
impl RemoteClassifier for ChatCompletionClassifier {
    fn is_configured(&self) -> bool {
        self.api_key().is_some()
    }

    async fn classify(&self, artist: &str, album: &str) -> Result<String> {
        let api_key = self.api_key().ok_or_else(|| {
            OrganizeError::ClassificationUnavailable("no API key configured".to_string())
        })?;

        let user_content = format!("Artist: {}, Album: {}", artist, album);
        let request = ChatRequest {
            model: &self.settings.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: self.system_prompt(),
                },
                ChatMessage {
                    role: "user",
                    content: &user_content,
                },
            ],
            max_tokens: self.settings.max_tokens,
            temperature: 0.3,
        };

        debug!(
            endpoint = %self.settings.endpoint,
            model = %self.settings.model,
            "Requesting genre classification"
        );

        let response = self
            .http
            .post(&self.settings.endpoint)
            .bearer_auth(api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    OrganizeError::ClassificationUnavailable(format!("request timed out: {}", e))
                } else {
                    OrganizeError::ClassificationUnavailable(format!("request failed: {}", e))
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(OrganizeError::ClassificationUnavailable(format!(
                "endpoint returned HTTP {}",
                status
            )));
        }

        let body: ChatResponse = response.json().await.map_err(|e| {
            OrganizeError::ClassificationUnavailable(format!("invalid response body: {}", e))
        })?;

        body.choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message)
            .and_then(|message| message.content)
            .map(|content| content.trim().to_string())
            .filter(|content| !content.is_empty())
            .ok_or_else(|| OrganizeError::ClassificationUnavailable("empty response".to_string()))
    }
}
