//! Server-side entry points shared by the JSON endpoints and the rendered
//! views. Everything here runs against a [`SuggestionClient`], so tests can
//! swap in a scripted model.

use std::sync::Arc;

use client_core::{CycleOutcome, ImagePolicy, SuggestionClient, SuggestionWorkflow, ViewState};
use shared::{
    domain::{SuggestionRequest, SuggestionResult},
    error::ApiError,
    protocol::{
        ActivityInput, ActivitySuggestion, ImageGeneration, ImageInput, MusicInput,
        MusicSuggestion, Notification, OperationOutcome, WeatherInput, WeatherSuggestion,
    },
    validation::{parse_suggestion_form, FormValues},
};
use tracing::info;

#[derive(Clone)]
pub struct ApiContext {
    pub client: Arc<dyn SuggestionClient>,
    pub placeholder_image_url: String,
}

/// Result of one single-form cycle, ready for either JSON or HTML.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CraftedSuggestions {
    pub request: SuggestionRequest,
    pub view: ViewState,
    pub notification: Option<Notification>,
}

impl CraftedSuggestions {
    pub fn into_outcome(self) -> OperationOutcome<SuggestionResult> {
        match self.notification {
            Some(notification) => OperationOutcome::failure(notification.description),
            None => OperationOutcome::Success(self.view.result),
        }
    }
}

pub async fn suggest_activity(
    ctx: &ApiContext,
    input: ActivityInput,
) -> OperationOutcome<ActivitySuggestion> {
    ctx.client.activity_suggestion(input).await
}

pub async fn suggest_music(ctx: &ApiContext, input: MusicInput) -> OperationOutcome<MusicSuggestion> {
    ctx.client.music_suggestion(input).await
}

pub async fn generate_image(ctx: &ApiContext, input: ImageInput) -> OperationOutcome<ImageGeneration> {
    ctx.client.image_generation(input).await
}

pub async fn suggest_weather(
    ctx: &ApiContext,
    input: WeatherInput,
) -> OperationOutcome<WeatherSuggestion> {
    ctx.client.weather_suggestion(input).await
}

/// Validates a full single-form submission and runs exactly one cycle for
/// it. Nothing reaches the provider when validation fails.
pub async fn craft_suggestions(
    ctx: &ApiContext,
    values: &FormValues,
) -> Result<CraftedSuggestions, ApiError> {
    let request = parse_suggestion_form(values)?;
    info!(location = %request.location, mood = %request.mood, "crafting suggestions");

    let workflow = SuggestionWorkflow::new(
        Arc::clone(&ctx.client),
        ctx.placeholder_image_url.clone(),
        ImagePolicy::ResetOnCycleStart,
    );
    let mut notifications = workflow.subscribe_notifications();
    let report = workflow.run_cycle(request.clone().into()).await;

    let notification = match report.outcome {
        CycleOutcome::Failed { .. } => notifications.try_recv().ok(),
        CycleOutcome::Applied | CycleOutcome::Superseded => None,
    };

    Ok(CraftedSuggestions {
        request,
        view: workflow.view(),
        notification,
    })
}

#[cfg(test)]
#[path = "tests/mod_tests.rs"]
mod tests;
