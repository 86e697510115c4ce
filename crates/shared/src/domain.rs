use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::validation::{FieldError, LOCATION_FIELD};

pub const PLACEHOLDER_IMAGE_URL: &str = "https://placehold.co/1200x800.png";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {kind} '{value}'")]
pub struct UnknownLabel {
    pub kind: &'static str,
    pub value: String,
}

macro_rules! label_enum {
    ($name:ident, $kind:literal, [$($variant:ident),+ $(,)?]) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];
            pub const LABELS: &'static [&'static str] = &[$(stringify!($variant)),+];

            pub fn as_str(self) -> &'static str {
                match self {
                    $($name::$variant => stringify!($variant)),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = UnknownLabel;

            fn from_str(raw: &str) -> Result<Self, Self::Err> {
                let trimmed = raw.trim();
                Self::ALL
                    .iter()
                    .copied()
                    .find(|candidate| candidate.as_str().eq_ignore_ascii_case(trimmed))
                    .ok_or_else(|| UnknownLabel {
                        kind: $kind,
                        value: raw.to_string(),
                    })
            }
        }
    };
}

label_enum!(Mood, "mood", [Chill, Creative, Romantic, Adventurous]);
label_enum!(
    Weather,
    "weather",
    [Sunny, Rainy, Cloudy, Windy, Drizzle, Snowy, Stormy]
);
label_enum!(TimeOfDay, "time of day", [Morning, Afternoon, Evening, Night]);
label_enum!(
    Language,
    "language",
    [English, Hindi, Telugu, Tamil, Malayalam]
);

impl TimeOfDay {
    /// Buckets a wall-clock hour (0-23).
    pub fn from_hour(hour: u32) -> Self {
        match hour {
            0..=11 => TimeOfDay::Morning,
            12..=17 => TimeOfDay::Afternoon,
            18..=20 => TimeOfDay::Evening,
            _ => TimeOfDay::Night,
        }
    }
}

/// A location string that passed the length constraint of the location field.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Location(String);

impl Location {
    pub fn parse(raw: impl Into<String>) -> Result<Self, FieldError> {
        let raw = raw.into();
        LOCATION_FIELD.check(&raw)?;
        Ok(Self(raw))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Location {
    type Error = FieldError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<Location> for String {
    fn from(value: Location) -> Self {
        value.0
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuggestionRequest {
    pub location: Location,
    pub mood: Mood,
    pub weather: Weather,
    pub time_of_day: TimeOfDay,
    pub language: Language,
}

impl SuggestionRequest {
    /// Prompt used for the hero image, e.g. `"romantic rainy"`.
    pub fn image_prompt(&self) -> String {
        format!("{} {}", self.mood, self.weather).to_lowercase()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuggestionResult {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub activity: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub music: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

impl SuggestionResult {
    /// The state a failed cycle leaves behind.
    pub fn cleared(placeholder_image_url: &str) -> Self {
        Self {
            activity: None,
            music: None,
            image_url: Some(placeholder_image_url.to_string()),
        }
    }

    pub fn has_music(&self) -> bool {
        self.music.as_ref().is_some_and(|songs| !songs.is_empty())
    }
}

#[cfg(test)]
#[path = "tests/domain_tests.rs"]
mod tests;
