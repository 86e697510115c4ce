//! Scripted provider used by the server's unit tests.

use std::{
    collections::HashSet,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    },
};

use async_trait::async_trait;
use client_core::{SuggestionClient, SuggestionService};
use genai_integration::{prompts, GenerationError, GenerativeModel, StructuredPrompt};
use serde_json::{json, Value};
use shared::domain::PLACEHOLDER_IMAGE_URL;

use crate::api::ApiContext;

pub(crate) const ACTIVITY: &str = "Evening walk along the Seine";
pub(crate) const IMAGE_URL: &str = "data:image/png;base64,iVBORw0KGgo=";

pub(crate) struct StubModel {
    pub weather: &'static str,
    pub failing: HashSet<&'static str>,
    pub calls: AtomicUsize,
}

impl Default for StubModel {
    fn default() -> Self {
        Self {
            weather: "Rainy",
            failing: HashSet::new(),
            calls: AtomicUsize::new(0),
        }
    }
}

impl StubModel {
    pub(crate) fn failing(prompt: &'static str) -> Self {
        Self {
            failing: [prompt].into(),
            ..Self::default()
        }
    }

    pub(crate) fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl GenerativeModel for StubModel {
    async fn generate(&self, prompt: StructuredPrompt) -> Result<Value, GenerationError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.failing.contains(prompt.name) {
            return Err(GenerationError::Provider {
                status: 503,
                message: "UNAVAILABLE: overloaded".into(),
            });
        }
        match prompt.name {
            prompts::ACTIVITY_PROMPT => Ok(json!({ "suggestion": ACTIVITY })),
            prompts::MUSIC_PROMPT => Ok(json!({
                "playlistSuggestion": [
                    "La Vie en Rose - Edith Piaf",
                    "Clair de Lune - Claude Debussy",
                    "Riptide - Vance Joy",
                    "Set Fire to the Rain - Adele",
                    "Banana Pancakes - Jack Johnson"
                ]
            })),
            prompts::WEATHER_PROMPT => Ok(json!({ "weather": self.weather })),
            other => Err(GenerationError::Shape(format!("unexpected prompt {other}"))),
        }
    }

    async fn generate_image(&self, _prompt: &str) -> Result<String, GenerationError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.failing.contains("image") {
            return Err(GenerationError::EmptyResponse("image"));
        }
        Ok(IMAGE_URL.to_string())
    }
}

pub(crate) fn api_context(model: Arc<StubModel>) -> ApiContext {
    let client: Arc<dyn SuggestionClient> = Arc::new(SuggestionService::new(model));
    ApiContext {
        client,
        placeholder_image_url: PLACEHOLDER_IMAGE_URL.to_string(),
    }
}

pub(crate) fn app_state(model: Arc<StubModel>) -> crate::app_state::AppState {
    crate::app_state::AppState {
        api: api_context(model),
        renderer: crate::render::Renderer::new().expect("templates"),
        live: crate::app_state::LiveSettings {
            debounce: std::time::Duration::from_millis(500),
            weather_source: client_core::WeatherSource::Random,
        },
    }
}
