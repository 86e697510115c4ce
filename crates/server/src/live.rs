//! Websocket live session behind the suggestions view. One
//! [`SuggestionSession`] per connection; view changes are rendered on the
//! server and pushed as HTML fragments.

use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket};
use chrono::{Local, Timelike};
use client_core::{
    Debouncer, FormState, ImagePolicy, SuggestionSession, SuggestionWorkflow, TokioTimerDriver,
    ViewState,
};
use futures::{SinkExt, StreamExt};
use shared::{
    domain::{Language, Location, Mood, TimeOfDay},
    error::{ApiError, ErrorCode},
    protocol::{ClientRequest, ServerEvent},
};
use tokio::sync::{broadcast::error::RecvError, mpsc};
use tracing::{debug, error, info, warn, Instrument};
use uuid::Uuid;

use crate::{app_state::AppState, render::ResultsPanel};

pub(crate) fn open_session(
    state: &AppState,
    location: Location,
    mood: Mood,
    language: Language,
) -> SuggestionSession {
    let time_of_day = TimeOfDay::from_hour(Local::now().hour());
    let mut form = FormState::new(location, mood, language, time_of_day);
    form.assign_weather(state.live.weather_source, &mut rand::thread_rng());

    let workflow = Arc::new(SuggestionWorkflow::new(
        Arc::clone(&state.api.client),
        state.api.placeholder_image_url.clone(),
        ImagePolicy::KeepUntilReplaced,
    ));
    let debouncer = Debouncer::new(state.live.debounce, Arc::new(TokioTimerDriver));
    SuggestionSession::new(form, workflow, debouncer)
}

pub(crate) async fn live_session(socket: WebSocket, state: Arc<AppState>, session: SuggestionSession) {
    let session_id = Uuid::new_v4();
    let span = tracing::info_span!("live_session", %session_id);
    run(socket, state, Arc::new(session)).instrument(span).await;
}

async fn run(socket: WebSocket, state: Arc<AppState>, session: Arc<SuggestionSession>) {
    let (mut sender, mut receiver) = socket.split();
    let (direct_tx, mut direct_rx) = mpsc::channel::<ServerEvent>(8);
    let mut views = session.subscribe_view();
    let mut notifications = session.subscribe_notifications();
    let form = session.form().await;
    info!(form = ?form, "live session opened");

    let render_state = Arc::clone(&state);
    let send_task = tokio::spawn(
        async move {
            loop {
                let event = tokio::select! {
                    changed = views.changed() => {
                        if changed.is_err() {
                            break;
                        }
                        let view = views.borrow_and_update().clone();
                        view_event(&render_state, &view)
                    }
                    notification = notifications.recv() => match notification {
                        Ok(notification) => ServerEvent::Notification(notification),
                        Err(RecvError::Lagged(skipped)) => {
                            warn!(skipped, "notifications lagged");
                            continue;
                        }
                        Err(RecvError::Closed) => break,
                    },
                    direct = direct_rx.recv() => match direct {
                        Some(event) => event,
                        None => break,
                    },
                };
                let text = match serde_json::to_string(&event) {
                    Ok(v) => v,
                    Err(_) => continue,
                };
                if sender.send(Message::Text(text)).await.is_err() {
                    break;
                }
            }
        }
        .in_current_span(),
    );

    let initial = Arc::clone(&session);
    tokio::spawn(
        async move {
            initial.regenerate_now().await;
        }
        .in_current_span(),
    );

    while let Some(Ok(msg)) = receiver.next().await {
        let text = match msg {
            Message::Text(text) => text,
            Message::Close(_) => break,
            _ => continue,
        };
        if let Some(event) = apply_request(&session, &text).await {
            if direct_tx.send(event).await.is_err() {
                break;
            }
        }
    }

    send_task.abort();
    info!("live session closed");
}

/// Applies one client message; returns an event only when the message was
/// rejected.
pub(crate) async fn apply_request(session: &SuggestionSession, text: &str) -> Option<ServerEvent> {
    match serde_json::from_str::<ClientRequest>(text) {
        Ok(ClientRequest::SetMood { mood }) => {
            session.set_mood(mood).await;
            None
        }
        Ok(ClientRequest::SetLanguage { language }) => {
            session.set_language(language).await;
            None
        }
        Err(err) => {
            debug!(error = %err, "rejecting client message");
            Some(ServerEvent::Error(ApiError::new(
                ErrorCode::Validation,
                format!("invalid message: {err}"),
            )))
        }
    }
}

pub(crate) fn view_event(state: &AppState, view: &ViewState) -> ServerEvent {
    let panel = ResultsPanel::from_view(view, &state.api.placeholder_image_url);
    match state.renderer.results_panel(&panel) {
        Ok(html) => ServerEvent::ViewUpdated {
            html,
            loading: view.loading,
        },
        Err(err) => {
            error!(error = %err, "failed to render results panel");
            ServerEvent::Error(ApiError::new(
                ErrorCode::Internal,
                "failed to render results",
            ))
        }
    }
}

#[cfg(test)]
#[path = "tests/live_tests.rs"]
mod tests;
