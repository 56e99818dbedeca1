//! Axum-based HTTP server for the gateway.

use axum::{
    extract::Request,
    http::{header, HeaderValue, Method, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use metrics_exporter_prometheus::PrometheusHandle;
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;
use tower_http::trace::TraceLayer;

use arkaios_core::{
    config::{AppConfig, AutopilotConfig, DeploymentConfig},
    Error, Result,
};
use arkaios_governance::{track_request, GoogleIdVerifier};
use arkaios_store::ConfiguredBackends;

use crate::response::method_not_allowed;
use crate::{autopilot, identity, kv_health, user_key};

/// Gateway configuration.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Host to bind to.
    pub host: String,
    /// Port to bind to.
    pub port: u16,
    /// Enable request tracing.
    pub enable_tracing: bool,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8787,
            enable_tracing: true,
        }
    }
}

/// Shared application state.
///
/// Holds configuration only. Storage backends are resolved afresh for
/// every request.
pub struct AppState {
    pub backends: ConfiguredBackends,
    pub autopilot: AutopilotConfig,
    pub deployment: DeploymentConfig,
    pub verifier: GoogleIdVerifier,
}

impl AppState {
    pub fn from_config(config: &AppConfig) -> Self {
        let http = reqwest::Client::new();
        Self {
            backends: ConfiguredBackends::with_http_client(config.store.clone(), http.clone()),
            autopilot: config.autopilot.clone(),
            deployment: config.deployment.clone(),
            verifier: GoogleIdVerifier::new(http, &config.identity),
        }
    }
}

/// Gateway server.
pub struct GatewayServer {
    config: GatewayConfig,
    state: Arc<AppState>,
    metrics_handle: Option<PrometheusHandle>,
}

impl GatewayServer {
    /// Create a new gateway server.
    pub fn new(config: GatewayConfig, state: AppState) -> Self {
        Self {
            config,
            state: Arc::new(state),
            metrics_handle: None,
        }
    }

    /// Create a server from the layered application config.
    pub fn from_app_config(config: &AppConfig) -> Self {
        let gateway = GatewayConfig {
            host: config.server.host.clone(),
            port: config.server.port,
            enable_tracing: true,
        };
        Self::new(gateway, AppState::from_config(config))
    }

    /// Set metrics handle.
    pub fn with_metrics(mut self, handle: PrometheusHandle) -> Self {
        self.metrics_handle = Some(handle);
        self
    }

    /// Build the Axum router.
    pub fn build_router(&self) -> Router {
        let mut router = Router::new()
            .route("/health", get(health_handler))
            .route("/kv", get(kv_ping_handler).fallback(method_not_allowed))
            .route(
                "/kv-health",
                get(kv_health::kv_health_handler).fallback(method_not_allowed),
            )
            .route(
                "/autopilot-flag",
                get(autopilot::get_flag)
                    .post(autopilot::set_flag)
                    .fallback(method_not_allowed),
            )
            .route(
                "/user-api-key",
                get(user_key::fetch_key)
                    .post(user_key::store_key)
                    .delete(user_key::remove_key)
                    .fallback(method_not_allowed),
            )
            .route(
                "/verify-google-id",
                post(identity::verify_google_id).fallback(method_not_allowed),
            )
            .with_state(self.state.clone());

        if let Some(handle) = &self.metrics_handle {
            let handle = handle.clone();
            router = router.route("/metrics", get(move || async move { handle.render() }));
        }

        router = router
            .layer(middleware::from_fn(cors_middleware))
            .layer(middleware::from_fn(metrics_middleware));

        if self.config.enable_tracing {
            router = router.layer(TraceLayer::new_for_http());
        }

        router
    }

    /// Run the server.
    pub async fn run(self) -> Result<()> {
        let addr = format!("{}:{}", self.config.host, self.config.port);
        let listener = tokio::net::TcpListener::bind(&addr)
            .await
            .map_err(|e| Error::gateway(format!("Failed to bind: {}", e)))?;

        tracing::info!(addr = %addr, "Gateway server starting");

        axum::serve(listener, self.build_router())
            .await
            .map_err(|e| Error::gateway(format!("Server error: {}", e)))?;

        Ok(())
    }
}

/// Open CORS on every response; answer every preflight with 204.
async fn cors_middleware(req: Request, next: Next) -> Response {
    let mut response = if req.method() == Method::OPTIONS {
        StatusCode::NO_CONTENT.into_response()
    } else {
        next.run(req).await
    };

    let headers = response.headers_mut();
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_ORIGIN,
        HeaderValue::from_static("*"),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static("GET,POST,DELETE,OPTIONS"),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static("Content-Type,Authorization"),
    );
    response
}

async fn metrics_middleware(req: Request, next: Next) -> Response {
    let method = req.method().to_string();
    let path = req.uri().path().to_string();
    let start = Instant::now();

    let response = next.run(req).await;

    track_request(
        &method,
        &path,
        response.status().as_u16(),
        start.elapsed().as_secs_f64(),
    );
    response
}

/// Health response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Status.
    pub status: String,
    /// Version.
    pub version: String,
}

/// Health check handler.
async fn health_handler() -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

async fn kv_ping_handler() -> impl IntoResponse {
    Json(serde_json::json!({ "ok": true, "route": "/kv" }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_health_handler() {
        let response = health_handler().await.into_response();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
