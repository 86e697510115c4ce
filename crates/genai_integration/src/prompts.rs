//! Fixed instruction templates and declared output shapes for each
//! capability, plus decoders that hold the model's answer to that shape.

use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use shared::{
    domain::Weather,
    protocol::{
        ActivityInput, ActivitySuggestion, MusicInput, MusicSuggestion, WeatherInput,
        WeatherSuggestion,
    },
};

use crate::{GenerationError, StructuredPrompt};

pub const ACTIVITY_PROMPT: &str = "suggestActivityPrompt";
pub const MUSIC_PROMPT: &str = "suggestMusicPrompt";
pub const WEATHER_PROMPT: &str = "suggestWeatherPrompt";

pub fn activity_prompt(input: &ActivityInput) -> StructuredPrompt {
    StructuredPrompt {
        name: ACTIVITY_PROMPT,
        text: format!(
            "Based on the current weather, time of day, your mood and location, suggest a few \
             simple and decent activities. Keep the suggestions concise and easy to do.\n\n\
             Weather: {weather}\n\
             Time of Day: {time_of_day}\n\
             Mood: {mood}\n\
             Location: {location}\n\n\
             Suggestions: ",
            weather = input.weather,
            time_of_day = input.time_of_day,
            mood = input.mood,
            location = input.location,
        ),
        output_schema: json!({
            "type": "OBJECT",
            "properties": {
                "suggestion": {
                    "type": "STRING",
                    "description": "A few simple and decent suggested activities based on the weather, time of day, mood and location."
                }
            },
            "required": ["suggestion"]
        }),
    }
}

pub fn music_prompt(input: &MusicInput) -> StructuredPrompt {
    StructuredPrompt {
        name: MUSIC_PROMPT,
        text: format!(
            "You are a music recommendation expert for Spotify. Given the user's mood, the \
             current weather, and their preferred language, suggest a list of 5 songs that fits \
             these criteria. For each song, provide the song name and artist in the format \
             \"Song Name - Artist\".\n\n\
             Mood: {mood}\n\
             Weather: {weather}\n\
             Language: {language}\n\n\
             Suggest 5 relevant songs:",
            mood = input.mood,
            weather = input.weather,
            language = input.language,
        ),
        output_schema: json!({
            "type": "OBJECT",
            "properties": {
                "playlistSuggestion": {
                    "type": "ARRAY",
                    "items": { "type": "STRING" },
                    "description": "A list of 5 song suggestions that matches the mood, weather, and language. The format should be \"Song Name - Artist\"."
                }
            },
            "required": ["playlistSuggestion"]
        }),
    }
}

pub fn weather_prompt(input: &WeatherInput) -> StructuredPrompt {
    StructuredPrompt {
        name: WEATHER_PROMPT,
        text: format!(
            "Based on the provided location, predict the current weather there. Be as accurate \
             as possible. Choose one of the following weather conditions: {labels}.\n\n\
             Location: {location}\n\n\
             Predicted Weather:",
            labels = Weather::LABELS.join(", "),
            location = input.location,
        ),
        output_schema: json!({
            "type": "OBJECT",
            "properties": {
                "weather": {
                    "type": "STRING",
                    "enum": Weather::LABELS,
                    "description": "The predicted weather conditions."
                }
            },
            "required": ["weather"]
        }),
    }
}

pub fn decode_activity(output: Value) -> Result<ActivitySuggestion, GenerationError> {
    let activity: ActivitySuggestion = decode(output)?;
    if activity.suggestion.trim().is_empty() {
        return Err(GenerationError::Shape("suggestion is empty".into()));
    }
    Ok(activity)
}

pub fn decode_music(output: Value) -> Result<MusicSuggestion, GenerationError> {
    decode(output)
}

/// Accepts any casing of the seven labels; anything else is a contract
/// violation.
pub fn decode_weather(output: Value) -> Result<WeatherSuggestion, GenerationError> {
    let label = output
        .get("weather")
        .and_then(Value::as_str)
        .ok_or_else(|| GenerationError::Shape("missing string field 'weather'".into()))?;
    let weather = label
        .parse::<Weather>()
        .map_err(|error| GenerationError::Shape(error.to_string()))?;
    Ok(WeatherSuggestion { weather })
}

fn decode<T: DeserializeOwned>(output: Value) -> Result<T, GenerationError> {
    serde_json::from_value(output).map_err(|error| GenerationError::Shape(error.to_string()))
}

#[cfg(test)]
#[path = "tests/prompts_tests.rs"]
mod tests;
