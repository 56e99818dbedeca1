//! REST key-value implementation of StateStore.
//!
//! Speaks the Upstash-style HTTP dialect:
//! - `GET  {base}/get/{key}` -> `{"result": "<value>" | null}`
//! - `POST {base}/set/{key}` with `{"value": "<value>", "ex": <seconds>}`
//! - `POST {base}/del/{key}` -> `{"result": <removed count>}`

use async_trait::async_trait;
use reqwest::{Client, Url};
use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use arkaios_core::{traits::StateStore, types::BackendKind, Error, Result};

/// HTTP key-value backend authenticated with a bearer token.
pub struct RestKvStore {
    client: Client,
    base_url: Url,
    token: Secret<String>,
}

#[derive(Debug, Deserialize)]
struct RestKvReply {
    #[serde(default)]
    result: serde_json::Value,
}

#[derive(Debug, Serialize)]
struct SetBody<'a> {
    value: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    ex: Option<u64>,
}

impl RestKvStore {
    /// Create a new REST-KV store sharing the given HTTP client.
    pub fn new(client: Client, base_url: &str, token: Secret<String>) -> Result<Self> {
        let base_url = Url::parse(base_url).map_err(|e| {
            Error::backend_unavailable(BackendKind::RestKv, format!("invalid endpoint: {}", e))
        })?;
        if base_url.cannot_be_a_base() {
            return Err(Error::backend_unavailable(
                BackendKind::RestKv,
                "endpoint cannot be a base URL",
            ));
        }
        Ok(Self {
            client,
            base_url,
            token,
        })
    }

    fn endpoint(&self, op: &str, key: &str) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push(op).push(key);
        }
        url
    }

    async fn reply(&self, op: &str, response: reqwest::Response) -> Result<RestKvReply> {
        let status = response.status();
        if !status.is_success() {
            return Err(Error::backend_unavailable(
                BackendKind::RestKv,
                format!("{} returned HTTP {}", op, status),
            ));
        }
        response
            .json::<RestKvReply>()
            .await
            .map_err(|e| Error::malformed(BackendKind::RestKv, format!("{} reply: {}", op, e)))
    }
}

fn transport_error(op: &str, e: reqwest::Error) -> Error {
    Error::backend_unavailable(BackendKind::RestKv, format!("{} request failed: {}", op, e))
}

#[async_trait]
impl StateStore for RestKvStore {
    fn kind(&self) -> BackendKind {
        BackendKind::RestKv
    }

    async fn get(&self, key: &str) -> Result<Option<String>> {
        let response = self
            .client
            .get(self.endpoint("get", key))
            .bearer_auth(self.token.expose_secret())
            .send()
            .await
            .map_err(|e| transport_error("get", e))?;

        match self.reply("get", response).await?.result {
            serde_json::Value::Null => Ok(None),
            serde_json::Value::String(s) => Ok(Some(s)),
            other => Err(Error::malformed(
                BackendKind::RestKv,
                format!("expected string result, got {}", other),
            )),
        }
    }

    async fn set(&self, key: &str, value: &str, ttl: Option<Duration>) -> Result<()> {
        let body = SetBody {
            value,
            ex: ttl.map(|t| t.as_secs().max(1)),
        };
        let response = self
            .client
            .post(self.endpoint("set", key))
            .bearer_auth(self.token.expose_secret())
            .json(&body)
            .send()
            .await
            .map_err(|e| transport_error("set", e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::backend_unavailable(
                BackendKind::RestKv,
                format!("set returned HTTP {}", status),
            ));
        }
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<bool> {
        let response = self
            .client
            .post(self.endpoint("del", key))
            .bearer_auth(self.token.expose_secret())
            .send()
            .await
            .map_err(|e| transport_error("del", e))?;

        let removed = self.reply("del", response).await?.result;
        Ok(removed.as_i64().unwrap_or(0) > 0)
    }
}
