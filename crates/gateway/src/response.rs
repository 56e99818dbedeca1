//! Shared response bodies.

use axum::{http::StatusCode, response::IntoResponse, Json};
use serde::Serialize;
use serde_json::{json, Value};

use arkaios_core::{config::DeploymentConfig, types::now_iso, Error};

/// Deployment details echoed back to clients.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentMeta {
    pub env: Option<String>,
    pub git_commit_sha: Option<String>,
    pub git_commit_message: Option<String>,
    pub git_branch: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Meta {
    pub timestamp: String,
    pub deployment: DeploymentMeta,
}

impl Meta {
    pub fn now(deployment: &DeploymentConfig) -> Self {
        Self {
            timestamp: now_iso(),
            deployment: DeploymentMeta {
                env: deployment.env.clone(),
                git_commit_sha: deployment.git_commit_sha.clone(),
                git_commit_message: deployment.git_commit_message.clone(),
                git_branch: deployment.git_branch.clone(),
            },
        }
    }
}

/// `{ ok: false, error }` with the given status.
pub fn error_body(status: StatusCode, message: impl Into<String>) -> (StatusCode, Json<Value>) {
    (status, Json(json!({ "ok": false, "error": message.into() })))
}

/// Map an error that reached the HTTP surface onto a status and body.
pub fn error_response(err: &Error) -> (StatusCode, Json<Value>) {
    match err {
        Error::Validation(msg) => error_body(StatusCode::BAD_REQUEST, msg.clone()),
        Error::NotFound(msg) => error_body(StatusCode::NOT_FOUND, msg.clone()),
        other => {
            tracing::error!(error = %other, "Request failed");
            error_body(StatusCode::INTERNAL_SERVER_ERROR, other.to_string())
        }
    }
}

pub async fn method_not_allowed() -> impl IntoResponse {
    error_body(StatusCode::METHOD_NOT_ALLOWED, "Method not allowed")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_mapping() {
        assert_eq!(
            error_response(&Error::validation("Missing userId")).0,
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            error_response(&Error::not_found("key")).0,
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            error_response(&Error::AllBackendsFailed("set k".into())).0,
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_validation_message_is_bare() {
        let (_, Json(body)) = error_response(&Error::validation("Missing userId"));
        assert_eq!(body["error"], "Missing userId");
        assert_eq!(body["ok"], false);
    }
}
