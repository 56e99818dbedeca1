use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use arkaios_core::config::{AppConfig, StoreConfig};
use arkaios_gateway::{AppState, GatewayConfig, GatewayServer};
use serde_json::{json, Value};
use tower::ServiceExt;

/// Config with only the filesystem tier, rooted in `dir`.
fn file_config(dir: &tempfile::TempDir) -> AppConfig {
    let mut config = AppConfig::default();
    config.store = StoreConfig {
        file_dir: dir.path().to_path_buf(),
        ..StoreConfig::default()
    };
    config.autopilot.stop_marker_path = Some(dir.path().join("STOP_AUTOPILOT"));
    config.deployment.env = Some("test".to_string());
    config
}

/// Config with no usable backend at all.
fn bare_config() -> AppConfig {
    let mut config = AppConfig::default();
    config.store.filesystem_enabled = false;
    config
}

fn app(config: &AppConfig) -> Router {
    let gateway = GatewayConfig {
        enable_tracing: false,
        ..GatewayConfig::default()
    };
    GatewayServer::new(gateway, AppState::from_config(config)).build_router()
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let request = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => request
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => request.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

#[tokio::test]
async fn test_health_endpoint() {
    let (status, body) = send(&app(&bare_config()), "GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_preflight_is_no_content_with_cors() {
    let app = app(&bare_config());
    for uri in ["/autopilot-flag", "/user-api-key", "/kv-health", "/kv"] {
        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .method("OPTIONS")
                    .uri(uri)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NO_CONTENT, "{}", uri);
        assert_eq!(
            response.headers()["access-control-allow-origin"],
            "*",
            "{}",
            uri
        );
    }
}

#[tokio::test]
async fn test_unsupported_method() {
    let app = app(&bare_config());
    let (status, body) = send(&app, "PUT", "/autopilot-flag", None).await;
    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(body["error"], "Method not allowed");

    let (status, _) = send(&app, "DELETE", "/kv-health", None).await;
    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
}

#[tokio::test]
async fn test_kv_ping() {
    let (status, body) = send(&app(&bare_config()), "GET", "/kv", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"ok": true, "route": "/kv"}));
}

#[tokio::test]
async fn test_flag_defaults_on_without_backends() {
    let (status, body) = send(&app(&bare_config()), "GET", "/autopilot-flag", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["enabled"], true);
    assert_eq!(body["forceStop"], false);
    assert_eq!(body["mode"], "ON");
    assert!(body["meta"]["timestamp"].is_string());
}

#[tokio::test]
async fn test_flag_write_fails_without_backends() {
    let (status, body) = send(
        &app(&bare_config()),
        "POST",
        "/autopilot-flag",
        Some(json!({"enabled": false})),
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["ok"], false);
}

#[tokio::test]
async fn test_flag_read_after_write() {
    let dir = tempfile::tempdir().unwrap();
    let app = app(&file_config(&dir));

    let (status, body) = send(
        &app,
        "POST",
        "/autopilot-flag",
        Some(json!({"enabled": false, "forceStop": false})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"ok": true, "enabled": false, "forceStop": false}));

    let (_, body) = send(&app, "GET", "/autopilot-flag", None).await;
    assert_eq!(body["enabled"], false);
    assert_eq!(body["mode"], "OFF");
    assert_eq!(body["meta"]["deployment"]["env"], "test");
}

#[tokio::test]
async fn test_force_stop_normalized_when_enabled() {
    let dir = tempfile::tempdir().unwrap();
    let app = app(&file_config(&dir));

    let (_, body) = send(
        &app,
        "POST",
        "/autopilot-flag",
        Some(json!({"enabled": true, "forceStop": true})),
    )
    .await;
    assert_eq!(body["enabled"], true);
    assert_eq!(body["forceStop"], false);
}

#[tokio::test]
async fn test_emergency_stop_raises_marker() {
    let dir = tempfile::tempdir().unwrap();
    let app = app(&file_config(&dir));

    let (status, body) = send(
        &app,
        "POST",
        "/autopilot-flag",
        Some(json!({"enabled": false, "forceStop": true})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["forceStop"], true);
    assert!(dir.path().join("STOP_AUTOPILOT").exists());

    let (_, body) = send(&app, "GET", "/autopilot-flag", None).await;
    assert_eq!(body["mode"], "EMERGENCY_STOPPED");
}

#[tokio::test]
async fn test_invalid_json_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let app = app(&file_config(&dir));

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/autopilot-flag")
                .header("content-type", "application/json")
                .body(Body::from("{not json"))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["error"], "Invalid JSON");
}

#[tokio::test]
async fn test_health_query_runs_probe() {
    let dir = tempfile::tempdir().unwrap();
    let app = app(&file_config(&dir));

    for uri in ["/autopilot-flag?health=kv", "/kv-health"] {
        let (status, body) = send(&app, "GET", uri, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["ok"], true, "{}", uri);
        assert_eq!(body["usingBackend"], "filesystem");
        assert_eq!(body["usingKV"], false);
        assert_eq!(body["usingRedis"], false);
        assert_eq!(body["setOk"], true);
        assert_eq!(body["getOk"], true);
        assert!(body["roundtripMs"].is_u64());
    }
}

#[tokio::test]
async fn test_other_health_values_read_the_flag() {
    let dir = tempfile::tempdir().unwrap();
    let app = app(&file_config(&dir));

    for uri in ["/autopilot-flag?health=", "/autopilot-flag?health=foo"] {
        let (status, body) = send(&app, "GET", uri, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["enabled"], true, "{}", uri);
        assert_eq!(body["mode"], "ON", "{}", uri);
        assert!(body.get("usingBackend").is_none(), "{}", uri);
    }
}

#[tokio::test]
async fn test_probe_without_backends() {
    let (status, body) = send(&app(&bare_config()), "GET", "/kv-health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["ok"], false);
    assert_eq!(body["usingBackend"], "none");
    assert!(body["reason"].is_string());
}

#[tokio::test]
async fn test_user_api_key_lifecycle() {
    let dir = tempfile::tempdir().unwrap();
    let app = app(&file_config(&dir));

    let (status, body) = send(
        &app,
        "POST",
        "/user-api-key",
        Some(json!({"userId": "alice", "apiKey": "sk-123"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["ok"], true);

    let (status, body) = send(&app, "GET", "/user-api-key?userId=alice", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["apiKey"], "sk-123");
    assert!(body["ts"].is_u64() || body["ts"].is_i64());

    let (status, _) = send(&app, "DELETE", "/user-api-key?userId=alice", None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(&app, "GET", "/user-api-key?userId=alice", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({"ok": false}));

    let (status, _) = send(&app, "DELETE", "/user-api-key?userId=alice", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_user_api_key_validation() {
    let dir = tempfile::tempdir().unwrap();
    let app = app(&file_config(&dir));

    let (status, body) = send(&app, "GET", "/user-api-key", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Missing userId");

    let (status, _) = send(
        &app,
        "POST",
        "/user-api-key",
        Some(json!({"userId": "alice"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send(
        &app,
        "POST",
        "/user-api-key",
        Some(json!({"userId": "alice", "apiKey": "sk-1", "ttlSeconds": 9_223_372_036_854_775u64})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("ttlSeconds"));

    let (status, _) = send(&app, "GET", "/user-api-key?userId=alice", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_verify_requires_token() {
    let (status, body) = send(
        &app(&bare_config()),
        "POST",
        "/verify-google-id",
        Some(json!({})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Missing idToken");
}
