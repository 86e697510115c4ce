use async_trait::async_trait;
use shared::protocol::{
    ActivityInput, ActivitySuggestion, ImageGeneration, ImageInput, MusicInput, MusicSuggestion,
    OperationOutcome, WeatherInput, WeatherSuggestion,
};

pub mod service;
pub mod session;
pub mod timer;
pub mod workflow;

pub use service::SuggestionService;
pub use session::{FormState, SuggestionSession, WeatherSource};
pub use timer::{Debouncer, TimerDriver, TimerHandle, TokioTimerDriver};
pub use workflow::{
    merge_outcomes, CycleDraft, CycleOutcome, CycleReport, ImagePolicy, SuggestionWorkflow,
    ViewState,
};

/// The four generation capabilities. Implementations never fail: every error
/// is flattened into [`OperationOutcome::Failure`] at this boundary.
#[async_trait]
pub trait SuggestionClient: Send + Sync {
    async fn activity_suggestion(&self, input: ActivityInput)
        -> OperationOutcome<ActivitySuggestion>;
    async fn music_suggestion(&self, input: MusicInput) -> OperationOutcome<MusicSuggestion>;
    async fn image_generation(&self, input: ImageInput) -> OperationOutcome<ImageGeneration>;
    async fn weather_suggestion(&self, input: WeatherInput) -> OperationOutcome<WeatherSuggestion>;
}

#[cfg(test)]
#[path = "tests/fakes.rs"]
pub(crate) mod fakes;
