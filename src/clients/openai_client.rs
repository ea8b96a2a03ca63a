use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::clients::transport::{CompletionTransport, ReqwestTransport};
use crate::error::SuggestionError;
use crate::models::event::{CalendarEvent, PROMPT_TIME_FORMAT, SuggestedEvent};
use crate::models::window::DateWindow;

pub const DEFAULT_API_URL: &str = "https://api.openai.com/v1/chat/completions";
pub const DEFAULT_MODEL: &str = "gpt-3.5-turbo";
pub const SYSTEM_INSTRUCTION: &str = "You are a helpful assistant that schedules events.";

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct OpenAIMessage {
    pub role: String,
    pub content: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct OpenAIRequest {
    pub model: String,
    pub messages: Vec<OpenAIMessage>,
}

#[derive(Debug, Deserialize)]
pub struct OpenAIResponse {
    pub choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
pub struct Choice {
    pub message: Message,
}

#[derive(Debug, Deserialize)]
pub struct Message {
    pub content: String,
}

/// Newline-joined event descriptions, in input order.
pub fn describe_events(events: &[CalendarEvent]) -> String {
    events
        .iter()
        .map(CalendarEvent::describe)
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn build_prompt(events: &[CalendarEvent], window: &DateWindow) -> String {
    format!(
        "Here are my existing events:\n\
         {descriptions}\n\
         Suggest additional events for the upcoming week ({from} to {to}) in JSON format as an array of \
         {{\"title\": String, \"startDate\": \"ISO8601\", \"endDate\": \"ISO8601\"}}. \
         Respond only with the JSON array.",
        descriptions = describe_events(events),
        from = window.start.format(PROMPT_TIME_FORMAT),
        to = window.end.format(PROMPT_TIME_FORMAT),
    )
}

pub fn build_request(model: &str, events: &[CalendarEvent], window: &DateWindow) -> OpenAIRequest {
    OpenAIRequest {
        model: model.to_string(),
        messages: vec![
            OpenAIMessage {
                role: "system".to_string(),
                content: SYSTEM_INSTRUCTION.to_string(),
            },
            OpenAIMessage {
                role: "user".to_string(),
                content: build_prompt(events, window),
            },
        ],
    }
}

/// Stage 1: decode the completion envelope and pull out the first choice's text.
pub fn parse_envelope(status: u16, body: &[u8]) -> Result<String, SuggestionError> {
    let parsed: OpenAIResponse = serde_json::from_slice(body)
        .map_err(|source| SuggestionError::Envelope { status, source })?;
    parsed
        .choices
        .into_iter()
        .next()
        .map(|choice| choice.message.content)
        .ok_or(SuggestionError::NoChoices)
}

/// Stage 2: the model output must itself be a JSON array of suggestions.
pub fn parse_suggestions(content: &str) -> Result<Vec<SuggestedEvent>, SuggestionError> {
    serde_json::from_str(content).map_err(SuggestionError::Content)
}

/// Chat-completion client for event suggestions. Holds no per-call state.
#[derive(Clone)]
pub struct SuggestionClient {
    api_key: String,
    model: String,
    api_url: String,
    transport: Arc<dyn CompletionTransport>,
}

impl fmt::Debug for SuggestionClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SuggestionClient")
            .field("api_key", &"<redacted>")
            .field("model", &self.model)
            .field("api_url", &self.api_url)
            .finish()
    }
}

impl SuggestionClient {
    pub fn new(api_key: String) -> Self {
        Self::with_transport(api_key, Arc::new(ReqwestTransport::new()))
    }

    pub fn with_transport(api_key: String, transport: Arc<dyn CompletionTransport>) -> Self {
        Self {
            api_key,
            model: DEFAULT_MODEL.to_string(),
            api_url: DEFAULT_API_URL.to_string(),
            transport,
        }
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into();
        self
    }

    pub async fn fetch_suggestions(
        &self,
        events: &[CalendarEvent],
        window: &DateWindow,
    ) -> Result<Vec<SuggestedEvent>, SuggestionError> {
        let request = build_request(&self.model, events, window);
        let body = serde_json::to_vec(&request).map_err(SuggestionError::Encode)?;
        debug!(events = events.len(), bytes = body.len(), "built completion request");

        let response = self
            .transport
            .post_json(&self.api_url, &self.api_key, body)
            .await
            .map_err(SuggestionError::Transport)?;
        if response.body.is_empty() {
            return Err(SuggestionError::Transport(format!(
                "empty response body (status {})",
                response.status
            )));
        }

        let content = parse_envelope(response.status, &response.body)?;
        let suggestions = parse_suggestions(&content)?;
        info!(count = suggestions.len(), "received event suggestions");
        Ok(suggestions)
    }

    /// Same as `fetch_suggestions`, with every failure reported as no suggestions.
    pub async fn fetch_suggestions_or_empty(
        &self,
        events: &[CalendarEvent],
        window: &DateWindow,
    ) -> Vec<SuggestedEvent> {
        match self.fetch_suggestions(events, window).await {
            Ok(suggestions) => suggestions,
            Err(err) => {
                warn!(kind = ?err.kind(), "suggestion request failed: {}", err);
                Vec::new()
            }
        }
    }
}
