use std::sync::Arc;

use async_trait::async_trait;
use genai_integration::{prompts, GenerationError, GenerativeModel};
use shared::protocol::{
    ActivityInput, ActivitySuggestion, ImageGeneration, ImageInput, MusicInput, MusicSuggestion,
    OperationOutcome, WeatherInput, WeatherSuggestion,
};
use tracing::error;

use crate::SuggestionClient;

pub const ACTIVITY_FAILURE: &str = "Failed to get activity suggestion. Please try again.";
pub const MUSIC_FAILURE: &str = "Failed to get music suggestion. Please try again.";
pub const IMAGE_FAILURE: &str = "Failed to generate image. Please try again.";
pub const WEATHER_FAILURE: &str = "Failed to get weather suggestion. Please try again.";

/// Forwards each capability to a [`GenerativeModel`].
#[derive(Clone)]
pub struct SuggestionService {
    model: Arc<dyn GenerativeModel>,
}

impl SuggestionService {
    pub fn new(model: Arc<dyn GenerativeModel>) -> Self {
        Self { model }
    }

    async fn activity(&self, input: &ActivityInput) -> Result<ActivitySuggestion, GenerationError> {
        let output = self.model.generate(prompts::activity_prompt(input)).await?;
        prompts::decode_activity(output)
    }

    async fn music(&self, input: &MusicInput) -> Result<MusicSuggestion, GenerationError> {
        let output = self.model.generate(prompts::music_prompt(input)).await?;
        prompts::decode_music(output)
    }

    async fn image(&self, input: &ImageInput) -> Result<ImageGeneration, GenerationError> {
        if input.prompt.trim().is_empty() {
            return Err(GenerationError::Shape("image prompt is empty".into()));
        }
        let image_url = self.model.generate_image(&input.prompt).await?;
        Ok(ImageGeneration { image_url })
    }

    async fn weather(&self, input: &WeatherInput) -> Result<WeatherSuggestion, GenerationError> {
        let output = self.model.generate(prompts::weather_prompt(input)).await?;
        prompts::decode_weather(output)
    }
}

#[async_trait]
impl SuggestionClient for SuggestionService {
    async fn activity_suggestion(
        &self,
        input: ActivityInput,
    ) -> OperationOutcome<ActivitySuggestion> {
        settle("activity suggestion", self.activity(&input).await, ACTIVITY_FAILURE)
    }

    async fn music_suggestion(&self, input: MusicInput) -> OperationOutcome<MusicSuggestion> {
        settle("music suggestion", self.music(&input).await, MUSIC_FAILURE)
    }

    async fn image_generation(&self, input: ImageInput) -> OperationOutcome<ImageGeneration> {
        settle("image generation", self.image(&input).await, IMAGE_FAILURE)
    }

    async fn weather_suggestion(&self, input: WeatherInput) -> OperationOutcome<WeatherSuggestion> {
        settle("weather suggestion", self.weather(&input).await, WEATHER_FAILURE)
    }
}

fn settle<T>(
    operation: &'static str,
    result: Result<T, GenerationError>,
    failure_message: &str,
) -> OperationOutcome<T> {
    match result {
        Ok(data) => OperationOutcome::Success(data),
        Err(err) => {
            error!(operation, error = %err, "generation call failed");
            OperationOutcome::failure(failure_message)
        }
    }
}

#[cfg(test)]
#[path = "tests/service_tests.rs"]
mod tests;
