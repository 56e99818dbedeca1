//! Client side of the backend health endpoints.
//!
//! Used by the `kv-health-check` binary to poll one or more deployments and
//! decide whether they are healthy.

use serde::Deserialize;
use std::time::Instant;

/// Relevant fields of a `/kv-health` reply. Everything is optional so a
/// partial or foreign body still produces a verdict.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProbeBody {
    pub ok: Option<bool>,
    pub using_backend: Option<String>,
    pub set_ok: Option<bool>,
    pub get_ok: Option<bool>,
    pub roundtrip_ms: Option<u64>,
    pub error: Option<String>,
}

/// One polled endpoint.
#[derive(Debug, Clone)]
pub struct CheckResult {
    pub url: String,
    pub status: Option<u16>,
    pub elapsed_ms: u64,
    pub body: Option<ProbeBody>,
    pub verdict: Verdict,
}

impl CheckResult {
    pub fn passed(&self) -> bool {
        self.verdict.failure.is_none()
    }

    pub fn summary(&self) -> String {
        let verdict = if self.passed() { "OK" } else { "FAIL" };
        let body = self.body.clone().unwrap_or_default();
        let status = self
            .status
            .map(|s| s.to_string())
            .unwrap_or_else(|| "ERR".to_string());
        let roundtrip = body
            .roundtrip_ms
            .map(|ms| format!("{}ms", ms))
            .unwrap_or_else(|| "-".to_string());
        let mut line = format!(
            "[{}] code={} url={} backend={} setOk={:?} getOk={:?} roundtrip={} latency={}ms",
            verdict,
            status,
            self.url,
            body.using_backend.as_deref().unwrap_or("-"),
            body.set_ok,
            body.get_ok,
            roundtrip,
            self.elapsed_ms
        );
        if let Some(reason) = &self.verdict.failure {
            line.push_str(&format!("\n  error: {}", reason));
        }
        if let Some(warning) = &self.verdict.warning {
            line.push_str(&format!("\n  warning: {}", warning));
        }
        line
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Verdict {
    pub failure: Option<String>,
    pub warning: Option<String>,
}

/// Endpoints to check for a deployment base URL.
pub fn endpoints_for_base(base: &str) -> Vec<String> {
    let base = base.trim_end_matches('/');
    vec![
        format!("{}/kv-health", base),
        format!("{}/autopilot-flag?health=kv", base),
    ]
}

/// Decide whether a reply is healthy.
///
/// The reply must be a 200 whose body reports `ok: true`. A roundtrip
/// over `threshold_ms` fails the check with `strict` and only warns
/// without it.
pub fn evaluate(status: u16, body: Option<&ProbeBody>, threshold_ms: u64, strict: bool) -> Verdict {
    let Some(body) = body else {
        return Verdict {
            failure: Some("invalid JSON response".to_string()),
            warning: None,
        };
    };

    let mut verdict = Verdict::default();
    if status != 200 {
        verdict.failure = Some(format!("HTTP {}", status));
    } else if body.ok != Some(true) {
        verdict.failure = Some(
            body.error
                .clone()
                .unwrap_or_else(|| "probe reported not ok".to_string()),
        );
    }

    if let Some(ms) = body.roundtrip_ms.filter(|ms| *ms > threshold_ms) {
        let message = format!("roundtrip {}ms over {}ms", ms, threshold_ms);
        if strict {
            verdict.failure.get_or_insert(message);
        } else {
            verdict.warning = Some(message);
        }
    }
    verdict
}

/// Fetch `url` and evaluate the reply.
pub async fn fetch_check(
    client: &reqwest::Client,
    url: &str,
    threshold_ms: u64,
    strict: bool,
) -> CheckResult {
    let start = Instant::now();
    let response = match client.get(url).send().await {
        Ok(r) => r,
        Err(e) => {
            return CheckResult {
                url: url.to_string(),
                status: None,
                elapsed_ms: start.elapsed().as_millis() as u64,
                body: None,
                verdict: Verdict {
                    failure: Some(format!("request failed: {}", e)),
                    warning: None,
                },
            }
        }
    };

    let status = response.status().as_u16();
    let body = response.json::<ProbeBody>().await.ok();
    let elapsed_ms = start.elapsed().as_millis() as u64;
    let verdict = evaluate(status, body.as_ref(), threshold_ms, strict);

    CheckResult {
        url: url.to_string(),
        status: Some(status),
        elapsed_ms,
        body,
        verdict,
    }
}
