use async_trait::async_trait;
use serde_json::Value;

mod error;
pub mod gemini;
pub mod prompts;

pub use error::GenerationError;
pub use gemini::{GeminiConfig, GeminiModel};

/// A prompt plus the JSON shape the model's answer must conform to.
#[derive(Debug, Clone, PartialEq)]
pub struct StructuredPrompt {
    pub name: &'static str,
    pub text: String,
    pub output_schema: Value,
}

#[async_trait]
pub trait GenerativeModel: Send + Sync {
    /// Runs a text completion constrained to `prompt.output_schema` and
    /// returns the decoded JSON object.
    async fn generate(&self, prompt: StructuredPrompt) -> Result<Value, GenerationError>;

    /// Produces an image for `prompt` and returns a URL the browser can load.
    async fn generate_image(&self, prompt: &str) -> Result<String, GenerationError>;
}

/// Stand-in used when no provider credentials are configured.
pub struct MissingGenerativeModel;

#[async_trait]
impl GenerativeModel for MissingGenerativeModel {
    async fn generate(&self, prompt: StructuredPrompt) -> Result<Value, GenerationError> {
        Err(GenerationError::Unavailable(format!(
            "no generative model configured for {}",
            prompt.name
        )))
    }

    async fn generate_image(&self, _prompt: &str) -> Result<String, GenerationError> {
        Err(GenerationError::Unavailable(
            "no generative model configured for image generation".into(),
        ))
    }
}
