//! Per-user API key endpoints.

use axum::{
    extract::{rejection::JsonRejection, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;

use arkaios_services::ApiKeyVault;

use crate::response::{error_body, error_response};
use crate::server::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserQuery {
    #[serde(default)]
    pub user_id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreKeyRequest {
    #[serde(default)]
    pub user_id: String,
    #[serde(default)]
    pub api_key: String,
    pub ttl_seconds: Option<u64>,
}

async fn vault(state: &AppState) -> ApiKeyVault {
    let (_, _, store) = state.backends.resolve().await;
    ApiKeyVault::new(store)
}

pub async fn fetch_key(State(state): State<Arc<AppState>>, Query(query): Query<UserQuery>) -> Response {
    match vault(&state).await.fetch(&query.user_id).await {
        Ok(Some(record)) => Json(json!({
            "ok": true,
            "apiKey": record.api_key,
            "ts": record.ts,
        }))
        .into_response(),
        Ok(None) => (StatusCode::NOT_FOUND, Json(json!({ "ok": false }))).into_response(),
        Err(e) => error_response(&e).into_response(),
    }
}

pub async fn store_key(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<StoreKeyRequest>, JsonRejection>,
) -> Response {
    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => {
            tracing::debug!(error = %rejection, "Rejected API key body");
            return error_body(StatusCode::BAD_REQUEST, "Invalid JSON").into_response();
        }
    };

    match vault(&state)
        .await
        .store(&request.user_id, &request.api_key, request.ttl_seconds)
        .await
    {
        Ok(_) => Json(json!({ "ok": true })).into_response(),
        Err(e) => error_response(&e).into_response(),
    }
}

pub async fn remove_key(State(state): State<Arc<AppState>>, Query(query): Query<UserQuery>) -> Response {
    match vault(&state).await.remove(&query.user_id).await {
        Ok(true) => Json(json!({ "ok": true })).into_response(),
        Ok(false) => (StatusCode::NOT_FOUND, Json(json!({ "ok": false }))).into_response(),
        Err(e) => error_response(&e).into_response(),
    }
}
