use serde::{
    de::Error as _, ser::SerializeStruct, Deserialize, Deserializer, Serialize, Serializer,
};

use crate::{
    domain::{Language, Location, Mood, TimeOfDay, Weather},
    error::ApiError,
};

/// Result of a single generation call: `{success: true, data}` or
/// `{success: false, error}` on the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OperationOutcome<T> {
    Success(T),
    Failure { error: String },
}

impl<T> OperationOutcome<T> {
    pub fn failure(error: impl Into<String>) -> Self {
        Self::Failure {
            error: error.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    pub fn data(&self) -> Option<&T> {
        match self {
            Self::Success(data) => Some(data),
            Self::Failure { .. } => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Success(_) => None,
            Self::Failure { error } => Some(error),
        }
    }

    pub fn into_result(self) -> Result<T, String> {
        match self {
            Self::Success(data) => Ok(data),
            Self::Failure { error } => Err(error),
        }
    }
}

impl<T: Serialize> Serialize for OperationOutcome<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("OperationOutcome", 2)?;
        match self {
            Self::Success(data) => {
                state.serialize_field("success", &true)?;
                state.serialize_field("data", data)?;
            }
            Self::Failure { error } => {
                state.serialize_field("success", &false)?;
                state.serialize_field("error", error)?;
            }
        }
        state.end()
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for OperationOutcome<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        struct Wire<T> {
            success: bool,
            data: Option<T>,
            error: Option<String>,
        }

        let wire = Wire::<T>::deserialize(deserializer)?;
        match (wire.success, wire.data) {
            (true, Some(data)) => Ok(Self::Success(data)),
            (true, None) => Err(D::Error::missing_field("data")),
            (false, _) => Ok(Self::Failure {
                error: wire
                    .error
                    .unwrap_or_else(|| "An unknown error occurred.".to_string()),
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityInput {
    pub location: Location,
    pub mood: Mood,
    pub time_of_day: TimeOfDay,
    pub weather: Weather,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivitySuggestion {
    pub suggestion: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MusicInput {
    pub mood: Mood,
    pub weather: Weather,
    pub language: Language,
}

/// Each entry is formatted `Song Name - Artist`. Five are requested; the count
/// is not enforced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MusicSuggestion {
    pub playlist_suggestion: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageInput {
    pub prompt: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageGeneration {
    pub image_url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeatherInput {
    pub location: Location,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeatherSuggestion {
    pub weather: Weather,
}

/// Transient user-facing message (toast).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub title: String,
    pub description: String,
}

impl Notification {
    pub fn error(description: impl Into<String>) -> Self {
        Self {
            title: "Error".to_string(),
            description: description.into(),
        }
    }
}

/// Messages sent by the suggestions view over its live session socket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum ClientRequest {
    SetMood { mood: Mood },
    SetLanguage { language: Language },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum ServerEvent {
    ViewUpdated { html: String, loading: bool },
    Notification(Notification),
    Error(ApiError),
}

#[cfg(test)]
#[path = "tests/protocol_tests.rs"]
mod tests;
