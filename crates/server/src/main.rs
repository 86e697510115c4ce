use std::{net::SocketAddr, sync::Arc};

use anyhow::Context;
use axum::{
    extract::{rejection::JsonRejection, Form, Query, State, WebSocketUpgrade},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
    Json, Router,
};
use client_core::{SuggestionClient, SuggestionService, ViewState};
use genai_integration::{GeminiConfig, GeminiModel, GenerativeModel, MissingGenerativeModel};
use shared::{
    domain::{Language, Mood, SuggestionResult},
    error::{ApiError, ErrorCode},
    protocol::{
        ActivityInput, ActivitySuggestion, ImageGeneration, ImageInput, MusicInput,
        MusicSuggestion, OperationOutcome, WeatherInput, WeatherSuggestion,
    },
    validation::{
        parse_suggestions_view_form, FormValues, LANGUAGE_FIELD, LOCATION_FIELD, MOOD_FIELD,
    },
};
use tower_http::{limit::RequestBodyLimitLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

mod api;
mod app_state;
mod config;
mod live;
mod render;

use api::ApiContext;
use app_state::{AppState, LiveSettings};
use config::load_settings;
use render::{craft_defaults, CraftPage, EntryPage, Renderer, ResultsPanel, SuggestionsPage};

const DEFAULT_MOOD: Mood = Mood::Creative;
const DEFAULT_LANGUAGE: Language = Language::English;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = load_settings();
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&settings.log_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let model: Arc<dyn GenerativeModel> = match &settings.gemini_api_key {
        Some(api_key) => Arc::new(GeminiModel::new(GeminiConfig {
            api_key: api_key.clone(),
            base_url: settings.gemini_base_url.clone(),
            text_model: settings.text_model.clone(),
            image_model: settings.image_model.clone(),
        })),
        None => {
            warn!("no Gemini API key configured; every generation call will fail");
            Arc::new(MissingGenerativeModel)
        }
    };
    let client: Arc<dyn SuggestionClient> = Arc::new(SuggestionService::new(model));

    let state = AppState {
        api: ApiContext {
            client,
            placeholder_image_url: settings.placeholder_image_url.clone(),
        },
        renderer: Renderer::new().context("failed to compile templates")?,
        live: LiveSettings {
            debounce: settings.debounce(),
            weather_source: settings.weather_source,
        },
    };
    let app = build_router(Arc::new(state), settings.request_body_limit);

    let addr: SocketAddr = settings.server_bind.parse()?;
    info!(
        %addr,
        weather_source = %settings.weather_source,
        debounce_ms = settings.debounce_ms,
        "server listening"
    );
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

fn build_router(state: Arc<AppState>, body_limit: usize) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/", get(entry_page))
        .route("/suggestions", get(suggestions_page))
        .route("/craft", get(craft_page).post(craft_submit))
        .route("/api/activity", post(http_activity))
        .route("/api/music", post(http_music))
        .route("/api/image", post(http_image))
        .route("/api/weather", post(http_weather))
        .route("/api/suggestions", post(http_suggestions))
        .route("/ws", get(ws_handler))
        .layer(RequestBodyLimitLayer::new(body_limit))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn healthz() -> &'static str {
    "ok"
}

async fn entry_page(
    State(state): State<Arc<AppState>>,
) -> Result<Html<String>, (StatusCode, Json<ApiError>)> {
    let html = state
        .renderer
        .entry_page(&EntryPage::default())
        .map_err(render_failed)?;
    Ok(Html(html))
}

async fn suggestions_page(
    State(state): State<Arc<AppState>>,
    Query(mut values): Query<FormValues>,
) -> Result<Response, (StatusCode, Json<ApiError>)> {
    let has_location = values
        .get(LOCATION_FIELD.name)
        .is_some_and(|location| !location.trim().is_empty());
    if !has_location {
        return Ok(Redirect::to("/").into_response());
    }
    values
        .entry(MOOD_FIELD.name.to_string())
        .or_insert_with(|| DEFAULT_MOOD.to_string());
    values
        .entry(LANGUAGE_FIELD.name.to_string())
        .or_insert_with(|| DEFAULT_LANGUAGE.to_string());

    match parse_suggestions_view_form(&values) {
        Ok((location, mood, language)) => {
            let page = SuggestionsPage::new(
                location.to_string(),
                mood,
                language,
                ResultsPanel::pending(&state.api.placeholder_image_url),
            );
            let html = state
                .renderer
                .suggestions_page(&page)
                .map_err(render_failed)?;
            Ok(Html(html).into_response())
        }
        Err(err) => {
            let page = EntryPage {
                location: values.remove(LOCATION_FIELD.name).unwrap_or_default(),
                error: err.errors.first().map(|field| field.message.clone()),
            };
            let html = state.renderer.entry_page(&page).map_err(render_failed)?;
            Ok((StatusCode::BAD_REQUEST, Html(html)).into_response())
        }
    }
}

async fn craft_page(
    State(state): State<Arc<AppState>>,
) -> Result<Html<String>, (StatusCode, Json<ApiError>)> {
    let panel = ResultsPanel::from_view(&ViewState::default(), &state.api.placeholder_image_url);
    let html = state
        .renderer
        .craft_page(&CraftPage::new(craft_defaults(), panel))
        .map_err(render_failed)?;
    Ok(Html(html))
}

async fn craft_submit(
    State(state): State<Arc<AppState>>,
    Form(values): Form<FormValues>,
) -> Result<Response, (StatusCode, Json<ApiError>)> {
    let placeholder = &state.api.placeholder_image_url;
    let (status, page) = match api::craft_suggestions(&state.api, &values).await {
        Ok(crafted) => {
            let panel = ResultsPanel::from_view(&crafted.view, placeholder);
            (
                StatusCode::OK,
                CraftPage::new(values, panel).with_notification(crafted.notification),
            )
        }
        Err(err) => {
            let panel = ResultsPanel::from_view(&ViewState::default(), placeholder);
            (
                StatusCode::BAD_REQUEST,
                CraftPage::new(values, panel).with_errors(&err.fields),
            )
        }
    };
    let html = state.renderer.craft_page(&page).map_err(render_failed)?;
    Ok((status, Html(html)).into_response())
}

async fn http_activity(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<ActivityInput>, JsonRejection>,
) -> Result<Json<OperationOutcome<ActivitySuggestion>>, (StatusCode, Json<ApiError>)> {
    let Json(input) = payload.map_err(rejected)?;
    Ok(Json(api::suggest_activity(&state.api, input).await))
}

async fn http_music(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<MusicInput>, JsonRejection>,
) -> Result<Json<OperationOutcome<MusicSuggestion>>, (StatusCode, Json<ApiError>)> {
    let Json(input) = payload.map_err(rejected)?;
    Ok(Json(api::suggest_music(&state.api, input).await))
}

async fn http_image(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<ImageInput>, JsonRejection>,
) -> Result<Json<OperationOutcome<ImageGeneration>>, (StatusCode, Json<ApiError>)> {
    let Json(input) = payload.map_err(rejected)?;
    Ok(Json(api::generate_image(&state.api, input).await))
}

async fn http_weather(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<WeatherInput>, JsonRejection>,
) -> Result<Json<OperationOutcome<WeatherSuggestion>>, (StatusCode, Json<ApiError>)> {
    let Json(input) = payload.map_err(rejected)?;
    Ok(Json(api::suggest_weather(&state.api, input).await))
}

async fn http_suggestions(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<FormValues>, JsonRejection>,
) -> Result<Json<OperationOutcome<SuggestionResult>>, (StatusCode, Json<ApiError>)> {
    let Json(values) = payload.map_err(rejected)?;
    let crafted = api::craft_suggestions(&state.api, &values)
        .await
        .map_err(|e| (StatusCode::BAD_REQUEST, Json(e)))?;
    Ok(Json(crafted.into_outcome()))
}

async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
    Query(values): Query<FormValues>,
) -> Result<Response, (StatusCode, Json<ApiError>)> {
    let (location, mood, language) = parse_suggestions_view_form(&values)
        .map_err(|e| (StatusCode::BAD_REQUEST, Json(ApiError::from(e))))?;
    let session = live::open_session(&state, location, mood, language);
    Ok(ws.on_upgrade(move |socket| live::live_session(socket, state, session)))
}

fn rejected(rejection: JsonRejection) -> (StatusCode, Json<ApiError>) {
    (
        rejection.status(),
        Json(ApiError::new(ErrorCode::Validation, rejection.body_text())),
    )
}

fn render_failed(err: minijinja::Error) -> (StatusCode, Json<ApiError>) {
    tracing::error!(error = %err, "failed to render page");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ApiError::new(ErrorCode::Internal, "failed to render page")),
    )
}

#[cfg(test)]
#[path = "tests/support.rs"]
mod test_support;

#[cfg(test)]
#[path = "tests/main_tests.rs"]
mod tests;
