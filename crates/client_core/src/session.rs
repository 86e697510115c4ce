//! Live suggestions view state: location fixed at construction, mood and
//! language editable, every edit debounced into a new cycle.

use std::{fmt, str::FromStr, sync::Arc};

use futures::FutureExt;
use rand::{seq::SliceRandom, Rng};
use serde::{Deserialize, Serialize};
use shared::{
    domain::{Language, Location, Mood, TimeOfDay, UnknownLabel, Weather},
    protocol::Notification,
};
use tokio::sync::{broadcast, watch, Mutex};
use tracing::debug;

use crate::{
    timer::Debouncer,
    workflow::{CycleDraft, CycleReport, SuggestionWorkflow, ViewState},
};

/// Where the suggestions view gets its weather from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeatherSource {
    /// Pseudo-random pick from the weather labels.
    #[default]
    Random,
    /// Ask the model to infer it from the location.
    Inferred,
}

impl fmt::Display for WeatherSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WeatherSource::Random => f.write_str("random"),
            WeatherSource::Inferred => f.write_str("inferred"),
        }
    }
}

impl FromStr for WeatherSource {
    type Err = UnknownLabel;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "random" => Ok(WeatherSource::Random),
            "inferred" => Ok(WeatherSource::Inferred),
            _ => Err(UnknownLabel {
                kind: "weather source",
                value: raw.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormState {
    pub location: Location,
    pub mood: Mood,
    pub language: Language,
    pub weather: Option<Weather>,
    pub time_of_day: TimeOfDay,
}

impl FormState {
    pub fn new(location: Location, mood: Mood, language: Language, time_of_day: TimeOfDay) -> Self {
        Self {
            location,
            mood,
            language,
            weather: None,
            time_of_day,
        }
    }

    pub fn with_weather(mut self, weather: Weather) -> Self {
        self.weather = Some(weather);
        self
    }

    pub fn assign_weather<R: Rng + ?Sized>(&mut self, source: WeatherSource, rng: &mut R) {
        self.weather = match source {
            WeatherSource::Random => Weather::ALL.choose(rng).copied(),
            WeatherSource::Inferred => None,
        };
    }

    pub fn draft(&self) -> CycleDraft {
        CycleDraft {
            location: self.location.clone(),
            mood: self.mood,
            weather: self.weather,
            time_of_day: self.time_of_day,
            language: self.language,
        }
    }
}

pub struct SuggestionSession {
    form: Arc<Mutex<FormState>>,
    workflow: Arc<SuggestionWorkflow>,
    debouncer: Debouncer,
}

impl SuggestionSession {
    pub fn new(form: FormState, workflow: Arc<SuggestionWorkflow>, debouncer: Debouncer) -> Self {
        Self {
            form: Arc::new(Mutex::new(form)),
            workflow,
            debouncer,
        }
    }

    pub async fn form(&self) -> FormState {
        self.form.lock().await.clone()
    }

    pub fn view(&self) -> ViewState {
        self.workflow.view()
    }

    pub fn subscribe_view(&self) -> watch::Receiver<ViewState> {
        self.workflow.subscribe_view()
    }

    pub fn subscribe_notifications(&self) -> broadcast::Receiver<Notification> {
        self.workflow.subscribe_notifications()
    }

    /// Initial load: runs a cycle right away, bypassing the debouncer.
    pub async fn regenerate_now(&self) -> CycleReport {
        regenerate(Arc::clone(&self.form), Arc::clone(&self.workflow)).await
    }

    pub async fn set_mood(&self, mood: Mood) {
        let changed = {
            let mut form = self.form.lock().await;
            let changed = form.mood != mood;
            form.mood = mood;
            changed
        };
        if changed {
            debug!(%mood, "mood changed");
            self.schedule_regeneration();
        }
    }

    pub async fn set_language(&self, language: Language) {
        let changed = {
            let mut form = self.form.lock().await;
            let changed = form.language != language;
            form.language = language;
            changed
        };
        if changed {
            debug!(%language, "language changed");
            self.schedule_regeneration();
        }
    }

    fn schedule_regeneration(&self) {
        let form = Arc::clone(&self.form);
        let workflow = Arc::clone(&self.workflow);
        self.debouncer.trigger(
            async move {
                regenerate(form, workflow).await;
            }
            .boxed(),
        );
    }
}

/// Snapshots the form when the cycle actually starts, so a debounced cycle
/// sees the latest values.
async fn regenerate(form: Arc<Mutex<FormState>>, workflow: Arc<SuggestionWorkflow>) -> CycleReport {
    let draft = form.lock().await.draft();
    let report = workflow.run_cycle(draft).await;

    if let Some(request) = &report.request {
        let mut form = form.lock().await;
        if form.weather.is_none() {
            form.weather = Some(request.weather);
        }
    }
    report
}

#[cfg(test)]
#[path = "tests/session_tests.rs"]
mod tests;
