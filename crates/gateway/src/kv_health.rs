//! Backend health probe endpoint.

use axum::{extract::State, Json};
use serde::Serialize;
use std::sync::Arc;

use arkaios_core::{config::DeploymentConfig, types::BackendKind};
use arkaios_store::{probe, TieredStore};

use crate::response::Meta;
use crate::server::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct KvHealthResponse {
    pub ok: bool,
    pub using_backend: &'static str,
    #[serde(rename = "usingKV")]
    pub using_kv: bool,
    pub using_redis: bool,
    pub set_ok: bool,
    pub get_ok: bool,
    pub roundtrip_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    pub meta: Meta,
}

/// Probe the highest-priority backend of `store`.
pub async fn probe_primary(store: &TieredStore, deployment: &DeploymentConfig) -> KvHealthResponse {
    let meta = Meta::now(deployment);
    let Some(primary) = store.primary() else {
        return KvHealthResponse {
            ok: false,
            using_backend: "none",
            using_kv: false,
            using_redis: false,
            set_ok: false,
            get_ok: false,
            roundtrip_ms: 0,
            error: None,
            reason: Some(
                "No storage backend available: set KV_REST_API_URL/KV_REST_API_TOKEN or REDIS_URL, or allow filesystem writes"
                    .to_string(),
            ),
            meta,
        };
    };

    let kind = primary.kind();
    let report = probe(primary.as_ref()).await;
    if !report.ok {
        tracing::warn!(backend = %kind, error = ?report.error, "Backend probe failed");
    }
    KvHealthResponse {
        ok: report.ok,
        using_backend: kind.as_str(),
        using_kv: kind == BackendKind::RestKv,
        using_redis: kind == BackendKind::Redis,
        set_ok: report.set_ok,
        get_ok: report.get_ok,
        roundtrip_ms: report.roundtrip_ms,
        error: report.error,
        reason: None,
        meta,
    }
}

pub async fn kv_health_handler(State(state): State<Arc<AppState>>) -> Json<KvHealthResponse> {
    let (_, _, store) = state.backends.resolve().await;
    Json(probe_primary(&store, &state.deployment).await)
}
