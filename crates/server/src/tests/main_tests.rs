use super::*;
use axum::{
    body::{self, Body},
    http::{header, Request},
};
use client_core::service::{MUSIC_FAILURE, WEATHER_FAILURE};
use genai_integration::prompts::MUSIC_PROMPT;
use serde_json::{json, Value};
use tower::ServiceExt;

use crate::test_support::{app_state, StubModel, ACTIVITY, IMAGE_URL};

fn test_app(model: StubModel) -> (Router, Arc<StubModel>) {
    let model = Arc::new(model);
    let app = build_router(Arc::new(app_state(model.clone())), 64 * 1024);
    (app, model)
}

async fn body_text(response: Response) -> String {
    let bytes = body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    String::from_utf8(bytes.to_vec()).expect("utf8")
}

async fn body_json(response: Response) -> Value {
    let bytes = body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    serde_json::from_slice(&bytes).expect("json")
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::post(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .expect("request")
}

#[tokio::test]
async fn healthz_reports_ok() {
    let (app, _) = test_app(StubModel::default());
    let request = Request::get("/healthz")
        .body(Body::empty())
        .expect("request");
    let response = app.oneshot(request).await.expect("response");
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_text(response).await, "ok");
}

#[tokio::test]
async fn entry_view_asks_for_a_location() {
    let (app, _) = test_app(StubModel::default());
    let request = Request::get("/").body(Body::empty()).expect("request");
    let response = app.oneshot(request).await.expect("response");

    assert_eq!(response.status(), StatusCode::OK);
    let html = body_text(response).await;
    assert!(html.contains("Welcome to AuraView AI"));
    assert!(html.contains(r#"action="/suggestions""#));
}

#[tokio::test]
async fn suggestions_view_without_location_redirects_to_entry() {
    let (app, _) = test_app(StubModel::default());

    for uri in ["/suggestions", "/suggestions?location=", "/suggestions?mood=Chill"] {
        let request = Request::get(uri).body(Body::empty()).expect("request");
        let response = app.clone().oneshot(request).await.expect("response");
        assert_eq!(response.status(), StatusCode::SEE_OTHER, "{uri}");
        assert_eq!(
            response.headers().get(header::LOCATION).map(|v| v.as_bytes()),
            Some(b"/".as_slice())
        );
    }
}

#[tokio::test]
async fn short_location_re_renders_entry_with_field_error() {
    let (app, model) = test_app(StubModel::default());
    let request = Request::get("/suggestions?location=P")
        .body(Body::empty())
        .expect("request");
    let response = app.oneshot(request).await.expect("response");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(body_text(response).await.contains("Location is too short."));
    assert_eq!(model.call_count(), 0);
}

#[tokio::test]
async fn suggestions_view_renders_live_controls_for_the_location() {
    let (app, _) = test_app(StubModel::default());
    let request = Request::get("/suggestions?location=San%20Francisco&mood=Romantic")
        .body(Body::empty())
        .expect("request");
    let response = app.oneshot(request).await.expect("response");

    assert_eq!(response.status(), StatusCode::OK);
    let html = body_text(response).await;
    assert!(html.contains(r#"data-location="San Francisco""#));
    assert!(html.contains(r#"<option value="Romantic" selected>"#));
    assert!(html.contains(r#"<option value="English" selected>"#));
    assert!(html.contains("skeleton"));
}

#[tokio::test]
async fn location_markup_is_escaped() {
    let (app, _) = test_app(StubModel::default());
    let request = Request::get("/suggestions?location=%3Cb%3EParis%3C%2Fb%3E")
        .body(Body::empty())
        .expect("request");
    let response = app.oneshot(request).await.expect("response");

    assert_eq!(response.status(), StatusCode::OK);
    let html = body_text(response).await;
    assert!(!html.contains("<b>Paris</b>"));
    assert!(html.contains("&lt;b&gt;Paris"));
}

#[tokio::test]
async fn craft_view_starts_with_default_values() {
    let (app, model) = test_app(StubModel::default());
    let request = Request::get("/craft").body(Body::empty()).expect("request");
    let response = app.oneshot(request).await.expect("response");

    assert_eq!(response.status(), StatusCode::OK);
    let html = body_text(response).await;
    assert!(html.contains(r#"value="San Francisco""#));
    assert!(html.contains(r#"<option value="Sunny" selected>"#));
    assert_eq!(model.call_count(), 0);
}

#[tokio::test]
async fn craft_submit_renders_generated_suggestions() {
    let (app, _) = test_app(StubModel::default());
    let request = Request::post("/craft")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(
            "location=Paris&mood=Romantic&weather=Rainy&timeOfDay=Evening&language=English",
        ))
        .expect("request");
    let response = app.oneshot(request).await.expect("response");

    assert_eq!(response.status(), StatusCode::OK);
    let html = body_text(response).await;
    assert!(html.contains(ACTIVITY));
    assert!(html.contains("La Vie en Rose - Edith Piaf"));
    assert!(html.contains(IMAGE_URL));
}

#[tokio::test]
async fn craft_submit_with_invalid_language_shows_field_error() {
    let (app, model) = test_app(StubModel::default());
    let request = Request::post("/craft")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(
            "location=Paris&mood=Romantic&weather=Rainy&timeOfDay=Evening&language=French",
        ))
        .expect("request");
    let response = app.oneshot(request).await.expect("response");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(body_text(response).await.contains("Invalid language"));
    assert_eq!(model.call_count(), 0);
}

#[tokio::test]
async fn activity_endpoint_wraps_data_in_success_envelope() {
    let (app, _) = test_app(StubModel::default());
    let request = post_json(
        "/api/activity",
        json!({
            "location": "Paris",
            "mood": "Romantic",
            "timeOfDay": "Evening",
            "weather": "Rainy"
        }),
    );
    let response = app.oneshot(request).await.expect("response");

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        body_json(response).await,
        json!({ "success": true, "data": { "suggestion": ACTIVITY } })
    );
}

#[tokio::test]
async fn weather_endpoint_flattens_contract_violations() {
    let (app, _) = test_app(StubModel {
        weather: "Hail",
        ..StubModel::default()
    });
    let response = app
        .oneshot(post_json("/api/weather", json!({ "location": "Oslo" })))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        body_json(response).await,
        json!({ "success": false, "error": WEATHER_FAILURE })
    );
}

#[tokio::test]
async fn image_endpoint_returns_provider_url() {
    let (app, _) = test_app(StubModel::default());
    let response = app
        .oneshot(post_json("/api/image", json!({ "prompt": "romantic rainy" })))
        .await
        .expect("response");

    let body = body_json(response).await;
    assert_eq!(body["success"], json!(true));
    assert_eq!(body["data"]["imageUrl"], json!(IMAGE_URL));
}

#[tokio::test]
async fn music_endpoint_rejects_unknown_language() {
    let (app, model) = test_app(StubModel::default());
    let response = app
        .oneshot(post_json(
            "/api/music",
            json!({ "mood": "Chill", "weather": "Sunny", "language": "French" }),
        ))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body_json(response).await["code"], json!("validation"));
    assert_eq!(model.call_count(), 0);
}

#[tokio::test]
async fn suggestions_endpoint_rejects_french_with_field_errors() {
    let (app, model) = test_app(StubModel::default());
    let response = app
        .oneshot(post_json(
            "/api/suggestions",
            json!({
                "location": "Paris",
                "mood": "Romantic",
                "weather": "Rainy",
                "timeOfDay": "Evening",
                "language": "French"
            }),
        ))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["code"], json!("validation"));
    assert_eq!(body["fields"][0]["field"], json!("language"));
    assert_eq!(model.call_count(), 0);
}

#[tokio::test]
async fn suggestions_endpoint_runs_one_cycle() {
    let (app, _) = test_app(StubModel::default());
    let response = app
        .oneshot(post_json(
            "/api/suggestions",
            json!({
                "location": "Paris",
                "mood": "Romantic",
                "weather": "Rainy",
                "timeOfDay": "Evening",
                "language": "English"
            }),
        ))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["success"], json!(true));
    assert_eq!(body["data"]["activity"], json!(ACTIVITY));
    assert_eq!(body["data"]["music"].as_array().map(Vec::len), Some(5));
}

#[tokio::test]
async fn suggestions_endpoint_reports_the_first_failure() {
    let (app, _) = test_app(StubModel::failing(MUSIC_PROMPT));
    let response = app
        .oneshot(post_json(
            "/api/suggestions",
            json!({
                "location": "Paris",
                "mood": "Chill",
                "weather": "Cloudy",
                "timeOfDay": "Morning",
                "language": "Telugu"
            }),
        ))
        .await
        .expect("response");

    assert_eq!(
        body_json(response).await,
        json!({ "success": false, "error": MUSIC_FAILURE })
    );
}
