use super::*;

fn values(pairs: &[(&str, &str)]) -> FormValues {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

#[test]
fn location_accepts_boundary_lengths() {
    assert!(LOCATION_FIELD.check("NY").is_ok());
    assert!(LOCATION_FIELD.check(&"a".repeat(50)).is_ok());
}

#[test]
fn location_rejects_out_of_range_lengths() {
    let short = LOCATION_FIELD.check("P").expect_err("too short");
    assert_eq!(short.field, "location");
    assert_eq!(short.message, "Location is too short.");

    let long = LOCATION_FIELD.check(&"a".repeat(51)).expect_err("too long");
    assert_eq!(long.message, "Location is too long.");
}

#[test]
fn location_length_counts_characters_not_bytes() {
    assert!(LOCATION_FIELD.check("東京").is_ok());
    assert!(LOCATION_FIELD.check(&"é".repeat(50)).is_ok());
}

#[test]
fn location_form_reports_missing_field() {
    let err = LOCATION_FORM.validate(&FormValues::new()).expect_err("missing");
    assert_eq!(err.errors, vec![FieldError::new("location", "Required")]);
}

#[test]
fn unsupported_language_is_rejected_before_parsing() {
    let form = values(&[
        ("location", "Paris"),
        ("mood", "Romantic"),
        ("weather", "Rainy"),
        ("timeOfDay", "Evening"),
        ("language", "French"),
    ]);
    let err = parse_suggestion_form(&form).expect_err("french is not offered");
    assert_eq!(err.errors.len(), 1);
    let language = err.for_field("language").expect("language error");
    assert!(language.message.contains("English, Hindi, Telugu, Tamil, Malayalam"));
    assert!(language.message.contains("'French'"));
}

#[test]
fn full_form_parses_into_request() {
    let form = values(&[
        ("location", "Paris"),
        ("mood", "Romantic"),
        ("weather", "Rainy"),
        ("timeOfDay", "Evening"),
        ("language", "English"),
        ("ignored", "extra"),
    ]);
    let request = parse_suggestion_form(&form).expect("valid");
    assert_eq!(request.location.as_str(), "Paris");
    assert_eq!(request.mood, Mood::Romantic);
    assert_eq!(request.weather, Weather::Rainy);
    assert_eq!(request.time_of_day, TimeOfDay::Evening);
    assert_eq!(request.language, Language::English);
}

#[test]
fn enum_fields_are_case_sensitive_at_the_form_boundary() {
    let form = values(&[("location", "Paris"), ("mood", "chill"), ("language", "English")]);
    let err = parse_suggestions_view_form(&form).expect_err("lowercase mood");
    assert!(err.for_field("mood").is_some());
}

#[test]
fn all_errors_are_collected() {
    let form = values(&[("location", "x"), ("mood", "Sleepy")]);
    let err = SUGGESTIONS_VIEW_FORM.validate(&form).expect_err("invalid");
    let fields: Vec<&str> = err.errors.iter().map(|e| e.field.as_str()).collect();
    assert_eq!(fields, vec!["location", "mood", "language"]);
    assert!(err.to_string().starts_with("invalid form: location: Location is too short."));
}

#[test]
fn schemas_declare_expected_fields() {
    let names: Vec<&str> = SUGGESTION_FORM.fields.iter().map(|f| f.name).collect();
    assert_eq!(names, vec!["location", "mood", "weather", "timeOfDay", "language"]);
    assert_eq!(
        SUGGESTION_FORM.field("weather").map(|f| f.constraint),
        Some(Constraint::OneOf(Weather::LABELS))
    );
}
