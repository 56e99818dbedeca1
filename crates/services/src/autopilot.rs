//! Autopilot flag service.
//!
//! Three states: `ON`, `OFF` and `EMERGENCY_STOPPED`. Any state moves to
//! `EMERGENCY_STOPPED` on a force stop; only an explicit enable leaves it.
//! Nothing transitions on its own.

use arkaios_core::{
    config::AutopilotConfig,
    types::{AutopilotMode, AutopilotState, AUTOPILOT_STATE_KEY},
    Result,
};
use arkaios_store::TieredStore;

use crate::marker::{EmergencyMarker, PolicyMirror};

pub struct AutopilotService {
    store: TieredStore,
    default_enabled: bool,
    marker: Option<EmergencyMarker>,
    policy: Option<PolicyMirror>,
}

impl AutopilotService {
    pub fn new(store: TieredStore, config: &AutopilotConfig) -> Self {
        Self {
            store,
            default_enabled: config.default_enabled,
            marker: config.stop_marker_path.clone().map(EmergencyMarker::new),
            policy: config.policy_path.clone().map(PolicyMirror::new),
        }
    }

    /// Current state, or the configured default when nothing readable was persisted.
    pub async fn read(&self) -> AutopilotState {
        let Some(record) = self.store.get(AUTOPILOT_STATE_KEY).await else {
            tracing::debug!(default = self.default_enabled, "No autopilot state persisted, using default");
            return AutopilotState::default_with(self.default_enabled);
        };
        match serde_json::from_value::<AutopilotState>(record.value) {
            Ok(state) => state,
            Err(e) => {
                tracing::warn!(error = %e, "Persisted autopilot state is malformed, using default");
                AutopilotState::default_with(self.default_enabled)
            }
        }
    }

    pub async fn mode(&self) -> AutopilotMode {
        self.read().await.mode()
    }

    /// Persist a new state. `force_stop` is ignored when `enabled` is set.
    pub async fn apply(&self, enabled: bool, force_stop: bool) -> Result<AutopilotState> {
        let state = AutopilotState::new(enabled, force_stop);
        let mode = state.mode();

        // The stop signal must not depend on the store being reachable.
        if mode == AutopilotMode::EmergencyStopped {
            if let Some(marker) = &self.marker {
                match marker.raise().await {
                    Ok(()) => tracing::warn!(path = %marker.path().display(), "Emergency stop marker raised"),
                    Err(e) => tracing::error!(error = %e, "Failed to raise emergency stop marker"),
                }
            }
        }

        let report = self
            .store
            .set(AUTOPILOT_STATE_KEY, serde_json::to_value(&state)?, None)
            .await?;
        tracing::info!(
            enabled = state.enabled,
            force_stop = state.force_stop,
            backends = ?report.outcomes,
            "Autopilot state updated"
        );

        if mode == AutopilotMode::On {
            if let Some(marker) = &self.marker {
                match marker.clear().await {
                    Ok(true) => tracing::info!("Emergency stop marker cleared"),
                    Ok(false) => {}
                    Err(e) => tracing::error!(error = %e, "Failed to clear emergency stop marker"),
                }
            }
        }

        if let Some(policy) = &self.policy {
            if let Err(e) = policy.update(state.enabled).await {
                tracing::warn!(error = %e, "Failed to mirror autopilot policy");
            }
        }

        Ok(state)
    }
}
