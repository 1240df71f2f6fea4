//! OpenAI-compatible chat-completions client.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::SuggesterConfig;
use crate::negotiator::{SuggestError, Suggester, SuggestionRequest};

#[derive(Serialize, Debug)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

#[derive(Serialize, Debug)]
struct ChatCompletionRequest<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    model: Option<&'a str>,
    messages: Vec<ChatMessage>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Deserialize, Debug)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize, Debug)]
struct ChatChoice {
    message: ChatMessageResponse,
}

/// Reasoning models may put the answer outside `content`.
#[derive(Deserialize, Debug)]
struct ChatMessageResponse {
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    reasoning_content: Option<String>,
}

impl ChatMessageResponse {
    fn into_text(self) -> Option<String> {
        self.content
            .filter(|text| !text.trim().is_empty())
            .or(self.reasoning_content)
            .filter(|text| !text.trim().is_empty())
    }
}

/// Suggester backed by a `/v1/chat/completions` endpoint.
pub struct HttpSuggester {
    config: SuggesterConfig,
    api_key: Option<String>,
    client: reqwest::blocking::Client,
}

impl HttpSuggester {
    /// Build a client with the configured request timeout.
    ///
    /// The bearer token is read once from the `api_key_env` variable; when
    /// it is unset requests go out unauthenticated.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new(config: SuggesterConfig) -> Result<Self, SuggestError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| SuggestError::Transport(e.to_string()))?;
        let api_key = std::env::var(&config.api_key_env)
            .ok()
            .filter(|key| !key.is_empty());

        Ok(Self {
            config,
            api_key,
            client,
        })
    }

    /// Endpoint requests are sent to.
    #[must_use]
    pub fn endpoint(&self) -> String {
        format!(
            "{}/v1/chat/completions",
            self.config.base_url.trim_end_matches('/')
        )
    }
}

impl fmt::Debug for HttpSuggester {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpSuggester")
            .field("endpoint", &self.endpoint())
            .field("model", &self.config.model)
            .field("authenticated", &self.api_key.is_some())
            .finish_non_exhaustive()
    }
}

impl Suggester for HttpSuggester {
    fn suggest(&mut self, request: &SuggestionRequest<'_>) -> Result<String, SuggestError> {
        let mut user = request.prompt.to_string();
        if let Some(feedback) = request.feedback {
            user.push_str("\n\n");
            user.push_str(feedback);
        }

        let body = ChatCompletionRequest {
            model: self.config.model.as_deref(),
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: request.system.to_string(),
                },
                ChatMessage {
                    role: "user",
                    content: user,
                },
            ],
            max_tokens: self.config.max_tokens,
            temperature: self.config.temperature,
        };

        let url = self.endpoint();
        debug!(%url, side = %request.side, attempt = request.attempt, "requesting suggestion");

        let mut builder = self.client.post(&url).json(&body);
        if let Some(key) = &self.api_key {
            builder = builder.bearer_auth(key);
        }

        let response = builder.send().map_err(|e| {
            if e.is_timeout() {
                SuggestError::Timeout
            } else {
                SuggestError::Transport(e.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(SuggestError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let completion: ChatCompletionResponse = response.json().map_err(|e| {
            if e.is_timeout() {
                SuggestError::Timeout
            } else {
                SuggestError::Response(e.to_string())
            }
        })?;

        completion
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.into_text())
            .ok_or(SuggestError::Empty)
    }
}
