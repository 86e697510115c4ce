//! HTML views. Templates are compiled into the binary and rendered with
//! HTML auto-escaping, so user-supplied locations never reach the page raw.

use std::collections::BTreeMap;

use client_core::ViewState;
use minijinja::{context, Environment};
use serde::Serialize;
use shared::{
    domain::{Language, Mood, TimeOfDay, Weather},
    protocol::Notification,
    validation::{FieldError, FormValues},
};

/// What the results area shows for one view state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResultsPanel {
    pub image_url: String,
    pub summary: Option<String>,
    pub activity: Option<String>,
    pub music: Option<Vec<String>>,
    pub activity_skeleton: bool,
    pub music_skeleton: bool,
    pub loading: bool,
}

impl ResultsPanel {
    pub fn from_view(view: &ViewState, placeholder_image_url: &str) -> Self {
        let result = &view.result;
        Self {
            image_url: result
                .image_url
                .clone()
                .unwrap_or_else(|| placeholder_image_url.to_string()),
            summary: view.request.as_ref().map(|request| {
                format!(
                    "{} {} in {}",
                    request.weather, request.time_of_day, request.location
                )
            }),
            activity: result.activity.clone(),
            music: result.music.clone().filter(|songs| !songs.is_empty()),
            activity_skeleton: view.loading && result.activity.is_none(),
            music_skeleton: view.loading && !result.has_music(),
            loading: view.loading,
        }
    }

    /// First paint of the live view, before the session has reported.
    pub fn pending(placeholder_image_url: &str) -> Self {
        Self::from_view(
            &ViewState {
                loading: true,
                ..ViewState::default()
            },
            placeholder_image_url,
        )
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct EntryPage {
    pub location: String,
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SuggestionsPage {
    pub location: String,
    pub mood: Mood,
    pub language: Language,
    pub moods: &'static [&'static str],
    pub languages: &'static [&'static str],
    pub panel: ResultsPanel,
}

impl SuggestionsPage {
    pub fn new(location: String, mood: Mood, language: Language, panel: ResultsPanel) -> Self {
        Self {
            location,
            mood,
            language,
            moods: Mood::LABELS,
            languages: Language::LABELS,
            panel,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SelectField {
    pub name: &'static str,
    pub label: &'static str,
    pub options: &'static [&'static str],
}

pub const CRAFT_SELECTS: &[SelectField] = &[
    SelectField {
        name: "mood",
        label: "Mood",
        options: Mood::LABELS,
    },
    SelectField {
        name: "weather",
        label: "Weather",
        options: Weather::LABELS,
    },
    SelectField {
        name: "timeOfDay",
        label: "Time of Day",
        options: TimeOfDay::LABELS,
    },
    SelectField {
        name: "language",
        label: "Music Language",
        options: Language::LABELS,
    },
];

#[derive(Debug, Clone, Serialize)]
pub struct CraftPage {
    pub values: FormValues,
    pub errors: BTreeMap<String, String>,
    pub selects: &'static [SelectField],
    pub panel: ResultsPanel,
    pub notification: Option<Notification>,
}

impl CraftPage {
    pub fn new(values: FormValues, panel: ResultsPanel) -> Self {
        Self {
            values,
            errors: BTreeMap::new(),
            selects: CRAFT_SELECTS,
            panel,
            notification: None,
        }
    }

    pub fn with_errors(mut self, errors: &[FieldError]) -> Self {
        self.errors = errors
            .iter()
            .map(|field| (field.field.clone(), field.message.clone()))
            .collect();
        self
    }

    pub fn with_notification(mut self, notification: Option<Notification>) -> Self {
        self.notification = notification;
        self
    }
}

/// Field values the single-form view starts with.
pub fn craft_defaults() -> FormValues {
    [
        ("location", "San Francisco"),
        ("mood", "Creative"),
        ("weather", "Sunny"),
        ("timeOfDay", "Afternoon"),
        ("language", "English"),
    ]
    .into_iter()
    .map(|(key, value)| (key.to_string(), value.to_string()))
    .collect()
}

pub struct Renderer {
    env: Environment<'static>,
}

impl Renderer {
    pub fn new() -> Result<Self, minijinja::Error> {
        let mut env = Environment::new();
        env.add_template("base.html", include_str!("../templates/base.html"))?;
        env.add_template("results.html", include_str!("../templates/results.html"))?;
        env.add_template("entry.html", include_str!("../templates/entry.html"))?;
        env.add_template(
            "suggestions.html",
            include_str!("../templates/suggestions.html"),
        )?;
        env.add_template("craft.html", include_str!("../templates/craft.html"))?;
        Ok(Self { env })
    }

    pub fn entry_page(&self, page: &EntryPage) -> Result<String, minijinja::Error> {
        self.env.get_template("entry.html")?.render(page)
    }

    pub fn suggestions_page(&self, page: &SuggestionsPage) -> Result<String, minijinja::Error> {
        self.env.get_template("suggestions.html")?.render(page)
    }

    pub fn craft_page(&self, page: &CraftPage) -> Result<String, minijinja::Error> {
        self.env.get_template("craft.html")?.render(page)
    }

    pub fn results_panel(&self, panel: &ResultsPanel) -> Result<String, minijinja::Error> {
        self.env
            .get_template("results.html")?
            .render(context! { panel => panel })
    }
}

#[cfg(test)]
#[path = "tests/render_tests.rs"]
mod tests;
