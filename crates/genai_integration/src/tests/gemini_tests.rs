use super::*;
use axum::{
    extract::{Path, Query, State},
    routing::post,
    Json, Router,
};
use serde_json::json;
use std::{collections::HashMap, sync::Arc};
use tokio::{net::TcpListener, sync::Mutex};

type SeenRequests = Arc<Mutex<Vec<(String, HashMap<String, String>, Value)>>>;

#[derive(Clone)]
struct StubState {
    status: u16,
    reply: Value,
    seen: SeenRequests,
}

async fn stub_generate(
    State(state): State<StubState>,
    Path(call): Path<String>,
    Query(query): Query<HashMap<String, String>>,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    state.seen.lock().await.push((call, query, body));
    let status = StatusCode::from_u16(state.status).expect("status");
    (status, Json(state.reply.clone()))
}

async fn spawn_stub(status: u16, reply: Value) -> (GeminiModel, SeenRequests) {
    let seen: SeenRequests = Arc::new(Mutex::new(Vec::new()));
    let state = StubState {
        status,
        reply,
        seen: seen.clone(),
    };
    let app = Router::new()
        .route("/:call", post(stub_generate))
        .with_state(state);
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("serve");
    });

    let mut config = GeminiConfig::new("test-key");
    config.base_url = format!("http://{addr}/");
    (GeminiModel::new(config), seen)
}

fn text_reply(text: &str) -> Value {
    json!({ "candidates": [{ "content": { "parts": [{ "text": text }] } }] })
}

#[tokio::test]
async fn structured_completion_sends_schema_and_decodes_json_text() {
    let (model, seen) = spawn_stub(200, text_reply("{\"suggestion\":\"Walk along the Seine\"}")).await;
    let prompt = StructuredPrompt {
        name: "suggestActivityPrompt",
        text: "Suggest something".into(),
        output_schema: json!({ "type": "OBJECT" }),
    };

    let output = model.generate(prompt).await.expect("generate");
    assert_eq!(output["suggestion"], "Walk along the Seine");

    let seen = seen.lock().await;
    let (call, query, body) = &seen[0];
    assert_eq!(call, "gemini-2.0-flash:generateContent");
    assert_eq!(query.get("key").map(String::as_str), Some("test-key"));
    assert_eq!(body["contents"][0]["parts"][0]["text"], "Suggest something");
    assert_eq!(body["generationConfig"]["responseMimeType"], "application/json");
    assert_eq!(body["generationConfig"]["responseSchema"]["type"], "OBJECT");
}

#[tokio::test]
async fn image_generation_returns_data_url_from_inline_part() {
    let reply = json!({
        "candidates": [{
            "content": {
                "parts": [
                    { "text": "Here is your image" },
                    { "inlineData": { "mimeType": "image/png", "data": "aGVsbG8=" } }
                ]
            }
        }]
    });
    let (model, seen) = spawn_stub(200, reply).await;

    let url = model.generate_image("romantic rainy").await.expect("image");
    assert_eq!(url, "data:image/png;base64,aGVsbG8=");

    let seen = seen.lock().await;
    assert_eq!(seen[0].0, format!("{DEFAULT_IMAGE_MODEL}:generateContent"));
    assert_eq!(
        seen[0].2["generationConfig"]["responseModalities"],
        json!(["TEXT", "IMAGE"])
    );
}

#[tokio::test]
async fn provider_errors_carry_status_and_message() {
    let reply = json!({ "error": { "code": 429, "message": "quota exhausted", "status": "RESOURCE_EXHAUSTED" } });
    let (model, _) = spawn_stub(429, reply).await;

    let err = model.generate_image("chill sunny").await.expect_err("quota");
    match err {
        GenerationError::Provider { status, message } => {
            assert_eq!(status, 429);
            assert_eq!(message, "RESOURCE_EXHAUSTED: quota exhausted");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn missing_candidates_is_an_empty_response() {
    let (model, _) = spawn_stub(200, json!({ "candidates": [] })).await;
    let prompt = StructuredPrompt {
        name: "suggestMusicPrompt",
        text: "songs".into(),
        output_schema: json!({}),
    };
    let err = model.generate(prompt).await.expect_err("empty");
    assert!(matches!(err, GenerationError::EmptyResponse("text")));
}

#[tokio::test]
async fn non_json_text_is_a_shape_error() {
    let (model, _) = spawn_stub(200, text_reply("Sunny, probably")).await;
    let prompt = StructuredPrompt {
        name: "suggestWeatherPrompt",
        text: "weather".into(),
        output_schema: json!({}),
    };
    let err = model.generate(prompt).await.expect_err("not json");
    assert!(matches!(err, GenerationError::Shape(_)));
}
