//! Synthetic write-then-read liveness probe.

use serde::Serialize;
use std::time::Instant;

use arkaios_core::{traits::StateStore, types::now_millis};

/// Well-known key the probe writes to.
pub const PROBE_KEY: &str = "kv-health-check";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProbeReport {
    pub ok: bool,
    pub set_ok: bool,
    pub get_ok: bool,
    pub roundtrip_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Write `{"ts": <now>}` under [`PROBE_KEY`] and read it back.
///
/// The read only checks that a numeric `ts` came back. Concurrent probes
/// share the key and may read each other's payload.
pub async fn probe(store: &dyn StateStore) -> ProbeReport {
    let payload = serde_json::json!({ "ts": now_millis() }).to_string();
    let start = Instant::now();

    let mut report = ProbeReport {
        ok: false,
        set_ok: false,
        get_ok: false,
        roundtrip_ms: 0,
        error: None,
    };

    match store.set(PROBE_KEY, &payload, None).await {
        Ok(()) => report.set_ok = true,
        Err(e) => report.error = Some(e.to_string()),
    }

    if report.set_ok {
        match store.get(PROBE_KEY).await {
            Ok(Some(raw)) => {
                report.get_ok = serde_json::from_str::<serde_json::Value>(&raw)
                    .map(|parsed| parsed.get("ts").is_some_and(|ts| ts.is_number()))
                    .unwrap_or(false);
                if !report.get_ok {
                    report.error = Some("probe payload did not round-trip".to_string());
                }
            }
            Ok(None) => report.error = Some("probe key missing after write".to_string()),
            Err(e) => report.error = Some(e.to_string()),
        }
    }

    report.roundtrip_ms = start.elapsed().as_millis() as u64;
    report.ok = report.set_ok && report.get_ok;

    tracing::debug!(
        backend = %store.kind(),
        ok = report.ok,
        roundtrip_ms = report.roundtrip_ms,
        "Backend probe finished"
    );
    crate::record_op(store.kind(), "probe", report.ok);
    report
}
