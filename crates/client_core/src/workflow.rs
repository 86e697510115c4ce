//! Regeneration cycles: three concurrent generation calls, one merge, one
//! state update.

use std::sync::Arc;

use futures::join;
use shared::{
    domain::{Language, Location, Mood, SuggestionRequest, SuggestionResult, TimeOfDay, Weather},
    protocol::{
        ActivityInput, ActivitySuggestion, ImageGeneration, ImageInput, MusicInput,
        MusicSuggestion, Notification, OperationOutcome, WeatherInput,
    },
};
use tokio::sync::{broadcast, watch, Mutex};
use tracing::{debug, info, warn};

use crate::SuggestionClient;

/// What happens to the hero image when a cycle starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImagePolicy {
    /// Single-form flow: show the placeholder while generating.
    ResetOnCycleStart,
    /// Live suggestions view: keep the previous image until replaced.
    KeepUntilReplaced,
}

/// Request fields for one cycle. `weather: None` means it has to be inferred
/// from the location first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CycleDraft {
    pub location: Location,
    pub mood: Mood,
    pub weather: Option<Weather>,
    pub time_of_day: TimeOfDay,
    pub language: Language,
}

impl CycleDraft {
    fn complete(self, weather: Weather) -> SuggestionRequest {
        SuggestionRequest {
            location: self.location,
            mood: self.mood,
            weather,
            time_of_day: self.time_of_day,
            language: self.language,
        }
    }
}

impl From<SuggestionRequest> for CycleDraft {
    fn from(value: SuggestionRequest) -> Self {
        Self {
            location: value.location,
            mood: value.mood,
            weather: Some(value.weather),
            time_of_day: value.time_of_day,
            language: value.language,
        }
    }
}

/// Everything the presentation layer renders.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewState {
    pub request: Option<SuggestionRequest>,
    pub result: SuggestionResult,
    pub loading: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CycleOutcome {
    Applied,
    Failed { message: String },
    /// A newer cycle settled first; this one was dropped without touching the
    /// view.
    Superseded,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CycleReport {
    pub seq: u64,
    pub request: Option<SuggestionRequest>,
    pub outcome: CycleOutcome,
}

#[derive(Default)]
struct Sequencer {
    issued: u64,
    applied: u64,
}

pub struct SuggestionWorkflow {
    client: Arc<dyn SuggestionClient>,
    placeholder_image_url: String,
    image_policy: ImagePolicy,
    sequencer: Mutex<Sequencer>,
    view: watch::Sender<ViewState>,
    notifications: broadcast::Sender<Notification>,
}

impl SuggestionWorkflow {
    pub fn new(
        client: Arc<dyn SuggestionClient>,
        placeholder_image_url: impl Into<String>,
        image_policy: ImagePolicy,
    ) -> Self {
        let (view, _) = watch::channel(ViewState::default());
        let (notifications, _) = broadcast::channel(32);
        Self {
            client,
            placeholder_image_url: placeholder_image_url.into(),
            image_policy,
            sequencer: Mutex::new(Sequencer::default()),
            view,
            notifications,
        }
    }

    pub fn placeholder_image_url(&self) -> &str {
        &self.placeholder_image_url
    }

    pub fn view(&self) -> ViewState {
        self.view.borrow().clone()
    }

    pub fn subscribe_view(&self) -> watch::Receiver<ViewState> {
        self.view.subscribe()
    }

    pub fn subscribe_notifications(&self) -> broadcast::Receiver<Notification> {
        self.notifications.subscribe()
    }

    pub async fn run_cycle(&self, draft: CycleDraft) -> CycleReport {
        let seq = {
            let mut sequencer = self.sequencer.lock().await;
            sequencer.issued += 1;
            sequencer.issued
        };
        info!(
            cycle = seq,
            location = %draft.location,
            mood = %draft.mood,
            language = %draft.language,
            "suggestion cycle started"
        );

        let reset_image = self.image_policy == ImagePolicy::ResetOnCycleStart;
        let placeholder = &self.placeholder_image_url;
        self.view.send_modify(|view| {
            view.loading = true;
            if reset_image {
                view.result = SuggestionResult {
                    image_url: Some(placeholder.clone()),
                    ..view.result.clone()
                };
            }
        });

        let request = match self.resolve_request(draft).await {
            Ok(request) => request,
            Err(message) => return self.settle(seq, None, Err(message)).await,
        };

        let (activity, music, image) = join!(
            self.client.activity_suggestion(ActivityInput {
                location: request.location.clone(),
                mood: request.mood,
                time_of_day: request.time_of_day,
                weather: request.weather,
            }),
            self.client.music_suggestion(MusicInput {
                mood: request.mood,
                weather: request.weather,
                language: request.language,
            }),
            self.client.image_generation(ImageInput {
                prompt: request.image_prompt(),
            })
        );

        let merged = merge_outcomes(activity, music, image);
        self.settle(seq, Some(request), merged).await
    }

    async fn resolve_request(&self, draft: CycleDraft) -> Result<SuggestionRequest, String> {
        if let Some(weather) = draft.weather {
            return Ok(draft.complete(weather));
        }

        debug!(location = %draft.location, "weather unknown; inferring from location");
        let inferred = self
            .client
            .weather_suggestion(WeatherInput {
                location: draft.location.clone(),
            })
            .await
            .into_result()?;
        Ok(draft.complete(inferred.weather))
    }

    async fn settle(
        &self,
        seq: u64,
        request: Option<SuggestionRequest>,
        merged: Result<SuggestionResult, String>,
    ) -> CycleReport {
        let mut sequencer = self.sequencer.lock().await;
        if seq <= sequencer.applied {
            debug!(
                cycle = seq,
                applied = sequencer.applied,
                "discarding result of superseded cycle"
            );
            return CycleReport {
                seq,
                request,
                outcome: CycleOutcome::Superseded,
            };
        }
        sequencer.applied = seq;
        let loading = sequencer.issued > seq;

        let outcome = match merged {
            Ok(result) => {
                let applied_request = request.clone();
                self.view.send_modify(|view| {
                    view.request = applied_request;
                    view.result = result;
                    view.loading = loading;
                });
                info!(cycle = seq, "suggestion cycle applied");
                CycleOutcome::Applied
            }
            Err(message) => {
                warn!(cycle = seq, error = %message, "suggestion cycle failed");
                let cleared = SuggestionResult::cleared(&self.placeholder_image_url);
                let failed_request = request.clone();
                self.view.send_modify(|view| {
                    if failed_request.is_some() {
                        view.request = failed_request;
                    }
                    view.result = cleared;
                    view.loading = loading;
                });
                let _ = self
                    .notifications
                    .send(Notification::error(message.clone()));
                CycleOutcome::Failed { message }
            }
        };

        CycleReport {
            seq,
            request,
            outcome,
        }
    }
}

/// All three succeed → one new result. Any failure → the first failure's
/// message, checked in activity, music, image order; successful siblings are
/// discarded.
pub fn merge_outcomes(
    activity: OperationOutcome<ActivitySuggestion>,
    music: OperationOutcome<MusicSuggestion>,
    image: OperationOutcome<ImageGeneration>,
) -> Result<SuggestionResult, String> {
    match (activity, music, image) {
        (
            OperationOutcome::Success(activity),
            OperationOutcome::Success(music),
            OperationOutcome::Success(image),
        ) => Ok(SuggestionResult {
            activity: Some(activity.suggestion),
            music: Some(music.playlist_suggestion),
            image_url: Some(image.image_url),
        }),
        (OperationOutcome::Failure { error }, _, _) => {
            Err(or_default(error, "Activity suggestion failed."))
        }
        (_, OperationOutcome::Failure { error }, _) => {
            Err(or_default(error, "Music suggestion failed."))
        }
        (_, _, OperationOutcome::Failure { error }) => {
            Err(or_default(error, "Image generation failed."))
        }
    }
}

fn or_default(error: String, fallback: &str) -> String {
    if error.trim().is_empty() {
        fallback.to_string()
    } else {
        error
    }
}

#[cfg(test)]
#[path = "tests/workflow_tests.rs"]
mod tests;
