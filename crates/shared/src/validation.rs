//! Declarative form schemas.
//!
//! Each form is a static table of field name → constraint. Raw form values
//! are checked against the table before anything is parsed into domain types,
//! so no generation call is ever issued for an invalid form.

use std::{collections::BTreeMap, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::{
    Language, Location, Mood, SuggestionRequest, TimeOfDay, UnknownLabel, Weather,
};

/// Raw form input keyed by field name, as it arrives from a query string or a
/// JSON object.
pub type FormValues = BTreeMap<String, String>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[error("{field}: {message}")]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid form: {}", summarize(.errors))]
pub struct ValidationError {
    pub errors: Vec<FieldError>,
}

impl ValidationError {
    pub fn for_field(&self, field: &str) -> Option<&FieldError> {
        self.errors.iter().find(|error| error.field == field)
    }
}

impl From<FieldError> for ValidationError {
    fn from(value: FieldError) -> Self {
        Self {
            errors: vec![value],
        }
    }
}

fn summarize(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Constraint {
    /// Character count must fall inside `[min, max]`.
    Length {
        min: usize,
        max: usize,
        too_short: &'static str,
        too_long: &'static str,
    },
    /// Value must be exactly one of the listed labels.
    OneOf(&'static [&'static str]),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub constraint: Constraint,
}

impl FieldSpec {
    pub fn check(&self, value: &str) -> Result<(), FieldError> {
        match self.constraint {
            Constraint::Length {
                min,
                max,
                too_short,
                too_long,
            } => {
                let len = value.chars().count();
                if len < min {
                    return Err(FieldError::new(self.name, too_short));
                }
                if len > max {
                    return Err(FieldError::new(self.name, too_long));
                }
                Ok(())
            }
            Constraint::OneOf(allowed) => {
                if allowed.contains(&value) {
                    Ok(())
                } else {
                    Err(FieldError::new(
                        self.name,
                        format!(
                            "Invalid {}. Expected one of {}, received '{value}'.",
                            self.name,
                            allowed.join(", ")
                        ),
                    ))
                }
            }
        }
    }
}

pub const LOCATION_FIELD: FieldSpec = FieldSpec {
    name: "location",
    constraint: Constraint::Length {
        min: 2,
        max: 50,
        too_short: "Location is too short.",
        too_long: "Location is too long.",
    },
};

pub const MOOD_FIELD: FieldSpec = FieldSpec {
    name: "mood",
    constraint: Constraint::OneOf(Mood::LABELS),
};

pub const WEATHER_FIELD: FieldSpec = FieldSpec {
    name: "weather",
    constraint: Constraint::OneOf(Weather::LABELS),
};

pub const TIME_OF_DAY_FIELD: FieldSpec = FieldSpec {
    name: "timeOfDay",
    constraint: Constraint::OneOf(TimeOfDay::LABELS),
};

pub const LANGUAGE_FIELD: FieldSpec = FieldSpec {
    name: "language",
    constraint: Constraint::OneOf(Language::LABELS),
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormSchema {
    pub name: &'static str,
    pub fields: &'static [FieldSpec],
}

/// Entry view: location only.
pub const LOCATION_FORM: FormSchema = FormSchema {
    name: "location",
    fields: &[LOCATION_FIELD],
};

/// Suggestions view: location from navigation plus the live-editable fields.
pub const SUGGESTIONS_VIEW_FORM: FormSchema = FormSchema {
    name: "suggestions_view",
    fields: &[LOCATION_FIELD, MOOD_FIELD, LANGUAGE_FIELD],
};

/// Single-form flow capturing every request field at once.
pub const SUGGESTION_FORM: FormSchema = FormSchema {
    name: "suggestion",
    fields: &[
        LOCATION_FIELD,
        MOOD_FIELD,
        WEATHER_FIELD,
        TIME_OF_DAY_FIELD,
        LANGUAGE_FIELD,
    ],
};

impl FormSchema {
    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|field| field.name == name)
    }

    /// Checks every declared field; unknown extra fields are ignored.
    pub fn validate(&self, values: &FormValues) -> Result<(), ValidationError> {
        let errors: Vec<FieldError> = self
            .fields
            .iter()
            .filter_map(|field| match values.get(field.name) {
                Some(value) => field.check(value).err(),
                None => Some(FieldError::new(field.name, "Required")),
            })
            .collect();

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ValidationError { errors })
        }
    }
}

pub fn parse_location_form(values: &FormValues) -> Result<Location, ValidationError> {
    LOCATION_FORM.validate(values)?;
    Ok(Location::parse(required(values, LOCATION_FIELD.name)?)?)
}

pub fn parse_suggestions_view_form(
    values: &FormValues,
) -> Result<(Location, Mood, Language), ValidationError> {
    SUGGESTIONS_VIEW_FORM.validate(values)?;
    Ok((
        Location::parse(required(values, LOCATION_FIELD.name)?)?,
        label(values, MOOD_FIELD.name)?,
        label(values, LANGUAGE_FIELD.name)?,
    ))
}

pub fn parse_suggestion_form(values: &FormValues) -> Result<SuggestionRequest, ValidationError> {
    SUGGESTION_FORM.validate(values)?;
    Ok(SuggestionRequest {
        location: Location::parse(required(values, LOCATION_FIELD.name)?)?,
        mood: label(values, MOOD_FIELD.name)?,
        weather: label(values, WEATHER_FIELD.name)?,
        time_of_day: label(values, TIME_OF_DAY_FIELD.name)?,
        language: label(values, LANGUAGE_FIELD.name)?,
    })
}

fn required<'a>(values: &'a FormValues, field: &str) -> Result<&'a str, FieldError> {
    values
        .get(field)
        .map(String::as_str)
        .ok_or_else(|| FieldError::new(field, "Required"))
}

fn label<T>(values: &FormValues, field: &str) -> Result<T, FieldError>
where
    T: FromStr<Err = UnknownLabel>,
{
    required(values, field)?
        .parse::<T>()
        .map_err(|error| FieldError::new(field, error.to_string()))
}

#[cfg(test)]
#[path = "tests/validation_tests.rs"]
mod tests;
