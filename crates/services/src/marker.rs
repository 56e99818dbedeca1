//! Local side effects of autopilot transitions.
//!
//! Processes running next to the server watch these files: the stop marker
//! halts them outright, the policy file tells them whether they may run
//! unattended.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use arkaios_core::{Error, Result};

/// Content of the marker file written on force stop.
pub const EMERGENCY_MESSAGE: &str = "EMERGENCY STOP - Created by force stop action";

/// Sentinel file signalling an emergency stop.
#[derive(Debug, Clone)]
pub struct EmergencyMarker {
    path: PathBuf,
}

impl EmergencyMarker {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn raise(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                Error::storage(format!("Failed to create marker directory: {}", e))
            })?;
        }
        tokio::fs::write(&self.path, EMERGENCY_MESSAGE)
            .await
            .map_err(|e| Error::storage(format!("Failed to write stop marker: {}", e)))
    }

    /// Remove the marker. Returns whether it was present.
    pub async fn clear(&self) -> Result<bool> {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(Error::storage(format!("Failed to remove stop marker: {}", e))),
        }
    }

    pub async fn is_raised(&self) -> bool {
        tokio::fs::try_exists(&self.path).await.unwrap_or(false)
    }
}

/// JSON policy file mirroring the flag as `autopilot` / `allow_auto_run`.
///
/// Other keys in the file are preserved.
#[derive(Debug, Clone)]
pub struct PolicyMirror {
    path: PathBuf,
}

impl PolicyMirror {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Current policy document, or an empty object when missing or unreadable.
    pub async fn read(&self) -> serde_json::Map<String, serde_json::Value> {
        let raw = match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) => raw,
            Err(_) => return serde_json::Map::new(),
        };
        match serde_json::from_str::<serde_json::Value>(&raw) {
            Ok(serde_json::Value::Object(map)) => map,
            _ => {
                tracing::warn!(path = %self.path.display(), "Policy file is not a JSON object, replacing");
                serde_json::Map::new()
            }
        }
    }

    pub async fn update(&self, enabled: bool) -> Result<()> {
        let mut policy = self.read().await;
        policy.insert("autopilot".into(), enabled.into());
        policy.insert("allow_auto_run".into(), enabled.into());
        let content = serde_json::to_string_pretty(&serde_json::Value::Object(policy))?;

        let dir = self
            .path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        tokio::fs::create_dir_all(dir)
            .await
            .map_err(|e| Error::storage(format!("Failed to create policy directory: {}", e)))?;

        let tmp = dir.join(format!(".policy.{}.tmp", uuid::Uuid::new_v4()));
        tokio::fs::write(&tmp, content)
            .await
            .map_err(|e| Error::storage(format!("Failed to write policy file: {}", e)))?;
        if let Err(e) = tokio::fs::rename(&tmp, &self.path).await {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(Error::storage(format!("Failed to replace policy file: {}", e)));
        }
        Ok(())
    }
}
