//! Gemini API client for text generation.

use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, info, warn};

/// Model the bot is pinned to.
pub const GEMINI_MODEL: &str = "gemini-2.5-pro";

const GENERATE_URL: &str =
    "https://generativelanguage.googleapis.com/v1beta/models/gemini-2.5-pro:generateContent";
const LIST_MODELS_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models";

/// Why a generation attempt produced no reply text.
#[derive(Debug)]
pub enum GenerateError {
    /// No API key was configured; the client never goes online.
    Disabled,
    /// The request failed in transit or the API reported an error.
    Transport(String),
    /// The response body could not be decoded.
    Malformed(String),
    /// The response decoded fine but carried no text (filtered or empty).
    Empty,
}

impl GenerateError {
    /// Text sent back to the chat in place of a model reply.
    pub fn user_reply(&self) -> String {
        match self {
            Self::Disabled => "عذرًا، حدث خطأ داخلي. (model is None)".to_string(),
            Self::Transport(e) => format!("حدث خطأ: {e}"),
            Self::Malformed(e) => format!("حدث خطأ أثناء معالجة الرد: {e}"),
            Self::Empty => {
                "عذراً، لم يتم إرجاع نص من الذكاء الاصطناعي. قد يكون السبب فلترة أو مشكلة في اللغة."
                    .to_string()
            }
        }
    }
}

impl fmt::Display for GenerateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Disabled => write!(f, "no model available (missing API key)"),
            Self::Transport(e) => write!(f, "request failed: {e}"),
            Self::Malformed(e) => write!(f, "unreadable response: {e}"),
            Self::Empty => write!(f, "response contained no text"),
        }
    }
}

impl std::error::Error for GenerateError {}

#[derive(Serialize)]
struct GenerateRequest {
    contents: Vec<Content>,
}

#[derive(Serialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Serialize)]
struct Part {
    text: String,
}

#[derive(Deserialize, Debug)]
struct GenerateResponse {
    candidates: Option<Vec<Candidate>>,
    #[serde(rename = "promptFeedback")]
    prompt_feedback: Option<PromptFeedback>,
    error: Option<ApiError>,
}

#[derive(Deserialize, Debug)]
struct ApiError {
    message: String,
}

#[derive(Deserialize, Debug)]
struct Candidate {
    content: Option<CandidateContent>,
    #[serde(rename = "finishReason")]
    finish_reason: Option<String>,
    #[serde(rename = "safetyRatings")]
    safety_ratings: Option<Vec<SafetyRating>>,
}

#[derive(Deserialize, Debug)]
struct CandidateContent {
    parts: Option<Vec<ResponsePart>>,
}

#[derive(Deserialize, Debug)]
struct ResponsePart {
    text: Option<String>,
}

#[derive(Deserialize, Debug)]
#[allow(dead_code)]
struct SafetyRating {
    category: Option<String>,
    probability: Option<String>,
}

#[derive(Deserialize, Debug)]
struct PromptFeedback {
    #[serde(rename = "blockReason")]
    block_reason: Option<String>,
    #[serde(rename = "safetyRatings")]
    safety_ratings: Option<Vec<SafetyRating>>,
}

/// A model visible to the configured API key.
#[derive(Deserialize, Debug)]
pub struct ModelInfo {
    pub name: String,
    #[serde(rename = "supportedGenerationMethods", default)]
    pub supported_generation_methods: Vec<String>,
}

#[derive(Deserialize, Debug)]
struct ListModelsResponse {
    models: Option<Vec<ModelInfo>>,
}

struct Handle {
    api_key: String,
    client: reqwest::Client,
}

/// Gemini text-generation client. Without an API key the handle stays unset
/// for the lifetime of the process and every call degrades to an error reply.
pub struct GeminiClient {
    handle: Option<Handle>,
}

impl GeminiClient {
    pub fn new(api_key: Option<String>) -> Self {
        let handle = match api_key {
            Some(key) => {
                info!("Using model: {GEMINI_MODEL}");
                let client = reqwest::Client::builder()
                    .timeout(std::time::Duration::from_secs(60))
                    .build()
                    .expect("Failed to build HTTP client");
                Some(Handle { api_key: key, client })
            }
            None => {
                warn!("GOOGLE_API_KEY not set, Gemini client disabled");
                None
            }
        };

        Self { handle }
    }

    pub fn is_enabled(&self) -> bool {
        self.handle.is_some()
    }

    /// Send one prompt to Gemini and extract the first candidate's text.
    ///
    /// Never panics and never propagates a raw transport or parse error:
    /// every failure maps to a [`GenerateError`] the caller can render.
    pub async fn generate(&self, prompt: &str) -> Result<String, GenerateError> {
        let Some(handle) = &self.handle else {
            warn!("Gemini model is None, skipping remote call");
            return Err(GenerateError::Disabled);
        };

        info!("Sending message to Gemini AI ({} chars)", prompt.chars().count());

        let request = GenerateRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: prompt.to_string(),
                }],
            }],
        };

        let url = format!("{}?key={}", GENERATE_URL, handle.api_key);

        let response = handle.client.post(&url).json(&request).send().await.map_err(|e| {
            warn!("Gemini request failed: {e}");
            GenerateError::Transport(format!("HTTP error: {e}"))
        })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| {
            warn!("Failed to read Gemini response: {e}");
            GenerateError::Transport(format!("Failed to read response: {e}"))
        })?;

        debug!("Gemini response status: {status}");

        if !status.is_success() {
            warn!("Gemini API error {status}: {body}");
            return Err(GenerateError::Transport(format!("API error {status}: {body}")));
        }

        let parsed: GenerateResponse = serde_json::from_str(&body).map_err(|e| {
            warn!("Failed to parse Gemini response: {e}");
            debug!("Gemini full response: {body}");
            GenerateError::Malformed(format!("Failed to parse response: {e}"))
        })?;

        if let Some(error) = parsed.error {
            warn!("Gemini error: {}", error.message);
            return Err(GenerateError::Transport(format!("Gemini error: {}", error.message)));
        }

        extract_reply(parsed)
    }

    /// List models available to the configured key, for startup diagnostics.
    pub async fn list_models(&self) -> Result<Vec<ModelInfo>, GenerateError> {
        let Some(handle) = &self.handle else {
            return Err(GenerateError::Disabled);
        };

        let url = format!("{}?key={}", LIST_MODELS_URL, handle.api_key);

        let response = handle
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| GenerateError::Transport(format!("HTTP error: {e}")))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| GenerateError::Transport(format!("Failed to read response: {e}")))?;

        if !status.is_success() {
            return Err(GenerateError::Transport(format!("API error {status}: {body}")));
        }

        let parsed: ListModelsResponse = serde_json::from_str(&body)
            .map_err(|e| GenerateError::Malformed(format!("Failed to parse response: {e}")))?;

        Ok(parsed.models.unwrap_or_default())
    }
}

/// Pull the first candidate's first text part out of a decoded response.
///
/// When there is no text, any blocking metadata the API attached goes to the
/// log and the caller gets [`GenerateError::Empty`].
fn extract_reply(response: GenerateResponse) -> Result<String, GenerateError> {
    let candidate = response.candidates.as_ref().and_then(|c| c.first());

    let text = candidate
        .and_then(|c| c.content.as_ref())
        .and_then(|content| content.parts.as_ref())
        .and_then(|parts| parts.first())
        .and_then(|part| part.text.as_ref());

    match text {
        Some(text) => {
            info!("Gemini AI response: {} chars", text.chars().count());
            Ok(text.clone())
        }
        None => {
            warn!("Gemini returned no text");
            if let Some(candidate) = candidate {
                if let Some(reason) = &candidate.finish_reason {
                    warn!("Finish reason: {reason}");
                }
                if let Some(ratings) = &candidate.safety_ratings {
                    warn!("Safety ratings: {ratings:?}");
                }
            }
            if let Some(feedback) = &response.prompt_feedback {
                if let Some(reason) = &feedback.block_reason {
                    warn!("Prompt blocked: {reason}");
                }
                if let Some(ratings) = &feedback.safety_ratings {
                    warn!("Prompt safety ratings: {ratings:?}");
                }
            }
            Err(GenerateError::Empty)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(value: serde_json::Value) -> GenerateResponse {
        serde_json::from_value(value).expect("test payload should decode")
    }

    #[test]
    fn test_extracts_first_candidate_first_part() {
        let response = parse(json!({
            "candidates": [
                { "content": { "parts": [ { "text": "4" }, { "text": "ignored" } ] } },
                { "content": { "parts": [ { "text": "other candidate" } ] } }
            ]
        }));
        assert_eq!(extract_reply(response).unwrap(), "4");
    }

    #[test]
    fn test_empty_candidates_is_no_text() {
        let response = parse(json!({ "candidates": [] }));
        assert!(matches!(extract_reply(response), Err(GenerateError::Empty)));
    }

    #[test]
    fn test_missing_candidates_is_no_text() {
        let response = parse(json!({}));
        assert!(matches!(extract_reply(response), Err(GenerateError::Empty)));
    }

    #[test]
    fn test_blocked_candidate_is_no_text() {
        let response = parse(json!({
            "candidates": [
                {
                    "finishReason": "SAFETY",
                    "safetyRatings": [
                        { "category": "HARM_CATEGORY_HARASSMENT", "probability": "HIGH" }
                    ]
                }
            ],
            "promptFeedback": { "blockReason": "SAFETY" }
        }));
        assert!(matches!(extract_reply(response), Err(GenerateError::Empty)));
    }

    #[test]
    fn test_part_without_text_is_no_text() {
        let response = parse(json!({
            "candidates": [ { "content": { "parts": [ {} ] } } ]
        }));
        assert!(matches!(extract_reply(response), Err(GenerateError::Empty)));
    }

    #[tokio::test]
    async fn test_disabled_client_returns_internal_error_without_network() {
        let client = GeminiClient::new(None);
        assert!(!client.is_enabled());

        let err = client.generate("hello").await.expect_err("must be disabled");
        assert!(matches!(err, GenerateError::Disabled));
        assert_eq!(err.user_reply(), "عذرًا، حدث خطأ داخلي. (model is None)");
    }

    #[tokio::test]
    async fn test_disabled_client_cannot_list_models() {
        let client = GeminiClient::new(None);
        let err = client.list_models().await.expect_err("must be disabled");
        assert!(matches!(err, GenerateError::Disabled));
    }

    #[test]
    fn test_transport_reply_embeds_error_detail() {
        let err = GenerateError::Transport("HTTP error: operation timed out".to_string());
        let reply = err.user_reply();
        assert!(reply.contains("operation timed out"));
        assert!(reply.starts_with("حدث خطأ:"));
    }

    #[test]
    fn test_malformed_reply_embeds_error_detail() {
        let err = GenerateError::Malformed("expected value at line 1".to_string());
        let reply = err.user_reply();
        assert!(reply.contains("expected value at line 1"));
        assert!(reply.starts_with("حدث خطأ أثناء معالجة الرد:"));
    }

    #[test]
    fn test_empty_reply_is_the_fixed_fallback() {
        assert_eq!(
            GenerateError::Empty.user_reply(),
            "عذراً، لم يتم إرجاع نص من الذكاء الاصطناعي. قد يكون السبب فلترة أو مشكلة في اللغة."
        );
    }
}
