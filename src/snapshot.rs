use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{fs, path::Path};

use crate::models::ScheduledTreatment;

/// What survives between runs: which diagnosis was active and everything
/// scheduled against it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub active_diagnosis_id: Option<String>,
    #[serde(default)]
    pub scheduled: Vec<ScheduledTreatment>,
}

impl SessionSnapshot {
    /// `Ok(None)` when nothing has been saved yet.
    pub fn load(path: &Path) -> Result<Option<Self>> {
        if !path.exists() {
            return Ok(None);
        }
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read session from {}", path.display()))?;
        let snapshot = serde_json::from_str(&contents)
            .with_context(|| format!("Session at {} is malformed", path.display()))?;
        Ok(Some(snapshot))
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create session directory {}", parent.display())
            })?;
        }
        let serialized = serde_json::to_string_pretty(self)?;
        fs::write(path, serialized)
            .with_context(|| format!("Failed to write session to {}", path.display()))
    }
}
