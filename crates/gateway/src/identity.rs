//! Google ID-token check endpoint.

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;

use arkaios_governance::{IdentityClaims, Verification};

use crate::response::{error_body, error_response};
use crate::server::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyRequest {
    #[serde(default)]
    pub id_token: String,
}

#[derive(Debug, Serialize)]
struct VerifiedResponse {
    ok: bool,
    #[serde(flatten)]
    claims: IdentityClaims,
}

pub async fn verify_google_id(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<VerifyRequest>, JsonRejection>,
) -> Response {
    let Ok(Json(request)) = payload else {
        return error_body(StatusCode::BAD_REQUEST, "Invalid JSON").into_response();
    };

    match state.verifier.verify(&request.id_token).await {
        Ok(Verification::Valid(claims)) => {
            Json(VerifiedResponse { ok: true, claims }).into_response()
        }
        Ok(Verification::Rejected(checks)) => (
            StatusCode::UNAUTHORIZED,
            Json(json!({
                "ok": false,
                "error": "Token validation failed",
                "details": checks,
            })),
        )
            .into_response(),
        Ok(Verification::InvalidToken) => {
            error_body(StatusCode::BAD_REQUEST, "Invalid token").into_response()
        }
        Err(e) => error_response(&e).into_response(),
    }
}
