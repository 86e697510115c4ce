use std::time::Duration;

use client_core::WeatherSource;

use crate::{api::ApiContext, render::Renderer};

/// Per-connection settings for the live suggestions view.
#[derive(Debug, Clone, Copy)]
pub(crate) struct LiveSettings {
    pub(crate) debounce: Duration,
    pub(crate) weather_source: WeatherSource,
}

pub(crate) struct AppState {
    pub(crate) api: ApiContext,
    pub(crate) renderer: Renderer,
    pub(crate) live: LiveSettings,
}
