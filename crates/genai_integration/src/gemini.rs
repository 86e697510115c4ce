//! Gemini REST implementation of [`GenerativeModel`].

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::{GenerationError, GenerativeModel, StructuredPrompt};

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models";
pub const DEFAULT_TEXT_MODEL: &str = "gemini-2.0-flash";
pub const DEFAULT_IMAGE_MODEL: &str = "gemini-2.0-flash-preview-image-generation";

#[derive(Debug, Clone)]
pub struct GeminiConfig {
    pub api_key: String,
    pub base_url: String,
    pub text_model: String,
    pub image_model: String,
}

impl GeminiConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            text_model: DEFAULT_TEXT_MODEL.to_string(),
            image_model: DEFAULT_IMAGE_MODEL.to_string(),
        }
    }
}

#[derive(Clone)]
pub struct GeminiModel {
    client: Client,
    config: GeminiConfig,
}

impl GeminiModel {
    pub fn new(config: GeminiConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    async fn send_request(
        &self,
        model: &str,
        body: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse, GenerationError> {
        let url = format!(
            "{}/{model}:generateContent",
            self.config.base_url.trim_end_matches('/')
        );

        let response = self
            .client
            .post(url)
            .query(&[("key", self.config.api_key.as_str())])
            .json(body)
            .send()
            .await
            .map_err(|err| GenerationError::Transport(err.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body_text = response
                .text()
                .await
                .unwrap_or_else(|_| "failed to read provider error body".to_string());
            return Err(map_http_error(status, body_text));
        }

        response
            .json()
            .await
            .map_err(|err| GenerationError::Transport(format!("failed to parse response: {err}")))
    }
}

#[async_trait]
impl GenerativeModel for GeminiModel {
    async fn generate(&self, prompt: StructuredPrompt) -> Result<Value, GenerationError> {
        debug!(prompt = prompt.name, model = %self.config.text_model, "requesting structured completion");
        let request = GenerateContentRequest {
            contents: vec![Content::user_text(prompt.text)],
            generation_config: GenerationConfig {
                response_mime_type: Some("application/json".to_string()),
                response_schema: Some(prompt.output_schema),
                response_modalities: None,
            },
        };
        let response = self
            .send_request(&self.config.text_model, &request)
            .await?;
        let text = extract_text(response).ok_or(GenerationError::EmptyResponse("text"))?;
        serde_json::from_str(&text).map_err(|err| GenerationError::Shape(err.to_string()))
    }

    async fn generate_image(&self, prompt: &str) -> Result<String, GenerationError> {
        debug!(model = %self.config.image_model, "requesting image");
        let request = GenerateContentRequest {
            contents: vec![Content::user_text(prompt.to_string())],
            generation_config: GenerationConfig {
                response_mime_type: None,
                response_schema: None,
                response_modalities: Some(vec!["TEXT".to_string(), "IMAGE".to_string()]),
            },
        };
        let response = self
            .send_request(&self.config.image_model, &request)
            .await?;
        let image = extract_inline_image(response).ok_or(GenerationError::EmptyResponse("image"))?;
        Ok(format!("data:{};base64,{}", image.mime_type, image.data))
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content {
    role: String,
    parts: Vec<TextPart>,
}

impl Content {
    fn user_text(text: String) -> Self {
        Self {
            role: "user".to_string(),
            parts: vec![TextPart { text }],
        }
    }
}

#[derive(Debug, Serialize)]
struct TextPart {
    text: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    response_mime_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_schema: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_modalities: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    candidates: Option<Vec<Candidate>>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<ContentResponse>,
}

#[derive(Debug, Deserialize)]
struct ContentResponse {
    #[serde(default)]
    parts: Vec<PartResponse>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PartResponse {
    text: Option<String>,
    inline_data: Option<InlineData>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    mime_type: String,
    data: String,
}

#[derive(Deserialize)]
struct ErrorWrapper {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: Option<String>,
    status: Option<String>,
}

fn first_parts(response: GenerateContentResponse) -> Vec<PartResponse> {
    response
        .candidates
        .and_then(|candidates| candidates.into_iter().next())
        .and_then(|candidate| candidate.content)
        .map(|content| content.parts)
        .unwrap_or_default()
}

fn extract_text(response: GenerateContentResponse) -> Option<String> {
    let text: String = first_parts(response)
        .into_iter()
        .filter_map(|part| part.text)
        .collect();
    (!text.trim().is_empty()).then_some(text)
}

fn extract_inline_image(response: GenerateContentResponse) -> Option<InlineData> {
    first_parts(response)
        .into_iter()
        .find_map(|part| part.inline_data)
        .filter(|image| image.mime_type.starts_with("image/") && !image.data.is_empty())
}

fn map_http_error(status: StatusCode, body: String) -> GenerationError {
    let message = serde_json::from_str::<ErrorWrapper>(&body)
        .map(|wrapper| {
            let status_text = wrapper.error.status.unwrap_or_default();
            let msg = wrapper.error.message.unwrap_or_else(|| body.clone());
            if status_text.is_empty() {
                msg
            } else {
                format!("{status_text}: {msg}")
            }
        })
        .unwrap_or_else(|_| body.clone());

    GenerationError::Provider {
        status: status.as_u16(),
        message,
    }
}

#[cfg(test)]
#[path = "tests/gemini_tests.rs"]
mod tests;
