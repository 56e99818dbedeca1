//! Autopilot flag state.

use serde::{Deserialize, Serialize};

use super::now_iso;

/// Storage key of the global autopilot flag.
pub const AUTOPILOT_STATE_KEY: &str = "autopilot-state";

/// Persisted autopilot state.
///
/// `force_stop` is only ever true while `enabled` is false.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AutopilotState {
    pub enabled: bool,
    #[serde(default)]
    pub force_stop: bool,
    #[serde(default)]
    pub timestamp: String,
}

/// The three meaningful combinations of the two flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AutopilotMode {
    On,
    Off,
    EmergencyStopped,
}

impl AutopilotState {
    /// Build a state, clearing `force_stop` when `enabled` is set.
    pub fn new(enabled: bool, force_stop: bool) -> Self {
        Self {
            enabled,
            force_stop: force_stop && !enabled,
            timestamp: now_iso(),
        }
    }

    /// State reported when nothing has been persisted yet.
    pub fn default_with(enabled: bool) -> Self {
        Self::new(enabled, false)
    }

    pub fn mode(&self) -> AutopilotMode {
        match (self.enabled, self.force_stop) {
            (true, _) => AutopilotMode::On,
            (false, false) => AutopilotMode::Off,
            (false, true) => AutopilotMode::EmergencyStopped,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_force_stop_cleared_when_enabled() {
        let state = AutopilotState::new(true, true);
        assert!(state.enabled);
        assert!(!state.force_stop);
        assert_eq!(state.mode(), AutopilotMode::On);
    }

    #[test]
    fn test_modes() {
        assert_eq!(AutopilotState::new(false, false).mode(), AutopilotMode::Off);
        assert_eq!(
            AutopilotState::new(false, true).mode(),
            AutopilotMode::EmergencyStopped
        );
    }

    #[test]
    fn test_lenient_deserialization() {
        let state: AutopilotState = serde_json::from_str(r#"{"enabled":false}"#).unwrap();
        assert_eq!(state.mode(), AutopilotMode::Off);
        assert!(state.timestamp.is_empty());
    }
}
