use axum::{extract::Query, http::StatusCode, routing::get, Json, Router};
use arkaios_core::{config::IdentityConfig, Error};
use arkaios_governance::{GoogleIdVerifier, Verification};
use serde_json::{json, Value};
use std::collections::HashMap;

async fn tokeninfo(Query(params): Query<HashMap<String, String>>) -> (StatusCode, Json<Value>) {
    let far_future = "4102444800"; // 2100-01-01
    match params.get("id_token").map(String::as_str) {
        Some("good") => (
            StatusCode::OK,
            Json(json!({
                "iss": "https://accounts.google.com",
                "aud": "client-1",
                "exp": far_future,
                "iat": "1700000000",
                "email": "dev@example.com",
                "name": "Dev",
                "sub": "1234"
            })),
        ),
        Some("other-audience") => (
            StatusCode::OK,
            Json(json!({
                "iss": "accounts.google.com",
                "aud": "client-2",
                "exp": far_future
            })),
        ),
        _ => (
            StatusCode::BAD_REQUEST,
            Json(json!({"error": "invalid_token"})),
        ),
    }
}

async fn spawn_tokeninfo() -> String {
    let app = Router::new().route("/tokeninfo", get(tokeninfo));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}/tokeninfo", addr)
}

fn verifier(url: String, audience: Option<&str>) -> GoogleIdVerifier {
    GoogleIdVerifier::new(
        reqwest::Client::new(),
        &IdentityConfig {
            tokeninfo_url: url,
            audience: audience.map(String::from),
        },
    )
}

#[tokio::test]
async fn test_valid_token_returns_safe_claims() {
    let url = spawn_tokeninfo().await;
    let result = verifier(url, Some("client-1")).verify("good").await.unwrap();
    match result {
        Verification::Valid(claims) => {
            assert_eq!(claims.email, Some(json!("dev@example.com")));
            assert_eq!(claims.aud, Some(json!("client-1")));
        }
        other => panic!("expected valid, got {:?}", other),
    }
}

#[tokio::test]
async fn test_audience_mismatch_rejected() {
    let url = spawn_tokeninfo().await;
    let result = verifier(url, Some("client-1"))
        .verify("other-audience")
        .await
        .unwrap();
    match result {
        Verification::Rejected(checks) => {
            assert!(checks.iss_valid);
            assert!(!checks.aud_valid);
            assert!(checks.exp_valid);
        }
        other => panic!("expected rejection, got {:?}", other),
    }
}

#[tokio::test]
async fn test_audience_unchecked_when_unconfigured() {
    let url = spawn_tokeninfo().await;
    let result = verifier(url, None).verify("other-audience").await.unwrap();
    assert!(matches!(result, Verification::Valid(_)));
}

#[tokio::test]
async fn test_refused_token() {
    let url = spawn_tokeninfo().await;
    let result = verifier(url, None).verify("bogus").await.unwrap();
    assert_eq!(result, Verification::InvalidToken);
}

#[tokio::test]
async fn test_missing_token() {
    let url = spawn_tokeninfo().await;
    let err = verifier(url, None).verify("").await.unwrap_err();
    assert!(matches!(err, Error::Validation(_)));
}
