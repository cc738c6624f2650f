//! HTTP API endpoints.
//!
//! Used by the UI for persisting the setup configuration, listing
//! categories and requesting a fresh word batch directly.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::i18n::{StaticTranslator, Translator};
use crate::state::persist::PersistedConfig;
use crate::state::{AppState, GameError};
use crate::types::{CategoryId, Locale, WordWithHints, BUILTIN_CATEGORIES};
use crate::words::WordRequest;

/// Largest batch a client may request at once
pub const MAX_GENERATE_COUNT: usize = 50;

/// Current setup configuration.
///
/// GET /api/config
pub async fn get_config(State(state): State<Arc<AppState>>) -> Json<PersistedConfig> {
    Json(state.export_config().await)
}

/// Replace the setup configuration.
///
/// POST /api/config
///
/// Rejected with 409 once a round is running or being dealt.
pub async fn set_config(
    State(state): State<Arc<AppState>>,
    Json(config): Json<PersistedConfig>,
) -> Response {
    match state.import_config(config).await {
        Ok(()) => {
            state.broadcast_state().await;
            (StatusCode::OK, "Configuration imported").into_response()
        }
        Err(e) => {
            tracing::warn!("Config import failed: {}", e);
            let status = match e {
                GameError::NotInSetup(_) | GameError::StartInProgress => StatusCode::CONFLICT,
                _ => StatusCode::BAD_REQUEST,
            };
            (status, format!("Import failed: {}", e)).into_response()
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CategoryInfo {
    pub id: CategoryId,
    /// Display name in the session language
    pub name: String,
    pub custom: bool,
}

/// Built-in and custom categories.
///
/// GET /api/categories
pub async fn list_categories(State(state): State<Arc<AppState>>) -> Json<Vec<CategoryInfo>> {
    let session = state.get_session().await;
    let translator = StaticTranslator::new(session.game.language);

    let builtin = BUILTIN_CATEGORIES.iter().map(|id| CategoryInfo {
        id: id.to_string(),
        name: translator.translate(id),
        custom: false,
    });
    let custom = session.custom_categories.iter().map(|id| CategoryInfo {
        id: id.clone(),
        name: id.clone(),
        custom: true,
    });

    Json(builtin.chain(custom).collect())
}

#[derive(Debug, Clone, Deserialize)]
pub struct GenerateWordsRequest {
    pub category: String,
    pub language: Locale,
    pub count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateWordsResponse {
    pub words_with_hints: Vec<WordWithHints>,
}

/// Generate a batch of words without touching the cache.
///
/// POST /api/generate-words
///
/// Returns 502 when no generator is configured or every provider failed.
pub async fn generate_words(
    State(state): State<Arc<AppState>>,
    Json(request): Json<GenerateWordsRequest>,
) -> Response {
    let category = request.category.trim();
    if category.is_empty() {
        return (StatusCode::BAD_REQUEST, "Category must not be empty").into_response();
    }
    if request.count == 0 || request.count > MAX_GENERATE_COUNT {
        return (
            StatusCode::BAD_REQUEST,
            format!("Count must be between 1 and {}", MAX_GENERATE_COUNT),
        )
            .into_response();
    }

    let Some(generator) = state.words.generator() else {
        return (StatusCode::BAD_GATEWAY, "No word generator configured").into_response();
    };

    let word_request = WordRequest {
        category: category.to_string(),
        language: request.language,
        count: request.count,
    };

    match generator.generate_words(&word_request).await {
        Ok(words_with_hints) => Json(GenerateWordsResponse { words_with_hints }).into_response(),
        Err(e) => {
            tracing::error!("Word generation failed: {}", e);
            (StatusCode::BAD_GATEWAY, format!("Failed to generate words: {}", e)).into_response()
        }
    }
}
