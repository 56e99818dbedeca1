//! Google ID-token passthrough check.
//!
//! The token is handed to Google's `tokeninfo` endpoint; we only validate
//! the returned claims (issuer, audience when configured, expiry).

use serde::{Deserialize, Serialize};
use serde_json::Value;

use arkaios_core::{config::IdentityConfig, types::now_millis, Error, Result};

const GOOGLE_ISSUERS: [&str; 2] = ["https://accounts.google.com", "accounts.google.com"];

/// Outcome of each claim check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClaimChecks {
    pub iss_valid: bool,
    pub aud_valid: bool,
    pub exp_valid: bool,
}

impl ClaimChecks {
    pub fn all_valid(&self) -> bool {
        self.iss_valid && self.aud_valid && self.exp_valid
    }
}

/// Claims safe to hand back to the caller.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IdentityClaims {
    pub email: Option<Value>,
    pub name: Option<Value>,
    pub picture: Option<Value>,
    pub aud: Option<Value>,
    pub iss: Option<Value>,
    pub iat: Option<Value>,
    pub exp: Option<Value>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Verification {
    Valid(IdentityClaims),
    /// Google answered but a claim check failed.
    Rejected(ClaimChecks),
    /// Google refused the token.
    InvalidToken,
}

/// Numeric claim that tokeninfo may send as a string.
fn numeric_claim(value: Option<&Value>) -> i64 {
    match value {
        Some(Value::Number(n)) => n.as_i64().unwrap_or(0),
        Some(Value::String(s)) => s.parse().unwrap_or(0),
        _ => 0,
    }
}

/// Validate tokeninfo claims at `now_ms`.
pub fn check_claims(claims: &Value, audience: Option<&str>, now_ms: i64) -> ClaimChecks {
    let iss_valid = claims
        .get("iss")
        .and_then(Value::as_str)
        .is_some_and(|iss| GOOGLE_ISSUERS.contains(&iss));
    let aud_valid = match audience {
        Some(expected) => claims.get("aud").and_then(Value::as_str) == Some(expected),
        None => true,
    };
    let exp_valid = numeric_claim(claims.get("exp")).saturating_mul(1000) > now_ms;
    ClaimChecks {
        iss_valid,
        aud_valid,
        exp_valid,
    }
}

pub struct GoogleIdVerifier {
    client: reqwest::Client,
    tokeninfo_url: String,
    audience: Option<String>,
}

impl GoogleIdVerifier {
    pub fn new(client: reqwest::Client, config: &IdentityConfig) -> Self {
        Self {
            client,
            tokeninfo_url: config.tokeninfo_url.clone(),
            audience: config.audience.clone().filter(|a| !a.is_empty()),
        }
    }

    pub async fn verify(&self, id_token: &str) -> Result<Verification> {
        if id_token.trim().is_empty() {
            return Err(Error::validation("Missing idToken"));
        }

        let response = self
            .client
            .get(&self.tokeninfo_url)
            .query(&[("id_token", id_token)])
            .send()
            .await
            .map_err(|e| Error::identity(format!("tokeninfo request failed: {}", e)))?;

        if !response.status().is_success() {
            tracing::debug!(status = %response.status(), "tokeninfo rejected token");
            return Ok(Verification::InvalidToken);
        }

        let claims: Value = response
            .json()
            .await
            .map_err(|e| Error::identity(format!("tokeninfo reply: {}", e)))?;

        let checks = check_claims(&claims, self.audience.as_deref(), now_millis());
        if !checks.all_valid() {
            tracing::info!(?checks, "ID token failed claim validation");
            return Ok(Verification::Rejected(checks));
        }

        Ok(Verification::Valid(serde_json::from_value(claims)?))
    }
}
