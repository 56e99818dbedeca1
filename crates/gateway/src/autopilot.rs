//! Autopilot flag endpoints.

use axum::{
    extract::{rejection::JsonRejection, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;

use arkaios_core::types::AutopilotMode;
use arkaios_services::AutopilotService;

use crate::kv_health::probe_primary;
use crate::response::{error_body, Meta};
use crate::server::AppState;

#[derive(Debug, Deserialize)]
pub struct FlagQuery {
    /// `?health=kv` turns the read into a backend probe; other values are ignored.
    pub health: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlagUpdate {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub force_stop: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FlagResponse {
    pub enabled: bool,
    pub force_stop: bool,
    pub mode: AutopilotMode,
    pub meta: Meta,
}

pub async fn get_flag(State(state): State<Arc<AppState>>, Query(query): Query<FlagQuery>) -> Response {
    let (_, _, store) = state.backends.resolve().await;

    if query.health.as_deref() == Some("kv") {
        return Json(probe_primary(&store, &state.deployment).await).into_response();
    }

    let current = AutopilotService::new(store, &state.autopilot).read().await;
    Json(FlagResponse {
        enabled: current.enabled,
        force_stop: current.force_stop,
        mode: current.mode(),
        meta: Meta::now(&state.deployment),
    })
    .into_response()
}

pub async fn set_flag(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<FlagUpdate>, JsonRejection>,
) -> Response {
    let update = match payload {
        Ok(Json(update)) => update,
        Err(rejection) => {
            tracing::debug!(error = %rejection, "Rejected autopilot update body");
            return error_body(StatusCode::BAD_REQUEST, "Invalid JSON").into_response();
        }
    };

    let (_, _, store) = state.backends.resolve().await;
    let service = AutopilotService::new(store, &state.autopilot);

    match service.apply(update.enabled, update.force_stop).await {
        Ok(applied) => (
            StatusCode::OK,
            Json(json!({
                "ok": true,
                "enabled": applied.enabled,
                "forceStop": applied.force_stop,
            })),
        )
            .into_response(),
        Err(e) => {
            tracing::error!(error = %e, "Failed to persist autopilot state");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "ok": false,
                    "enabled": update.enabled,
                    "forceStop": update.force_stop && !update.enabled,
                    "error": e.to_string(),
                })),
            )
                .into_response()
        }
    }
}
