use anyhow::{Context, Result};
use log::warn;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf, sync::RwLock, time::Duration};

pub const MODE_ENV: &str = "CROPDOC_MODE";

/// Local (offline) vs. remote (online) processing. The workflow only threads
/// this through; the diagnoser and the views decide what it means.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub enum ProcessingMode {
    #[default]
    Offline,
    Online,
}

impl ProcessingMode {
    pub fn toggled(self) -> Self {
        match self {
            ProcessingMode::Offline => ProcessingMode::Online,
            ProcessingMode::Online => ProcessingMode::Offline,
        }
    }

    pub fn status_message(&self) -> &'static str {
        match self {
            ProcessingMode::Offline => "Local AI processing...",
            ProcessingMode::Online => "Cloud AI processing...",
        }
    }

    pub fn allows_external_search(&self) -> bool {
        matches!(self, ProcessingMode::Online)
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "offline" | "local" => Some(ProcessingMode::Offline),
            "online" | "cloud" => Some(ProcessingMode::Online),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct LatencyProfile {
    pub offline_ms: u64,
    pub online_ms: u64,
}

impl Default for LatencyProfile {
    fn default() -> Self {
        Self {
            offline_ms: 1500,
            online_ms: 2500,
        }
    }
}

impl LatencyProfile {
    pub fn for_mode(&self, mode: ProcessingMode) -> Duration {
        match mode {
            ProcessingMode::Offline => Duration::from_millis(self.offline_ms),
            ProcessingMode::Online => Duration::from_millis(self.online_ms),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    pub mode: ProcessingMode,
    pub latency: LatencyProfile,
    pub currency: String,
    /// Raw field-size entry pre-filled in the cost calculator.
    pub default_field_size: String,
    pub recovery_window_days: u32,
    pub checkup_interval_days: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            mode: ProcessingMode::Offline,
            latency: LatencyProfile::default(),
            currency: "KES".into(),
            default_field_size: "1".into(),
            recovery_window_days: 14,
            checkup_interval_days: 2,
        }
    }
}

impl Settings {
    /// Apply `CROPDOC_MODE` if set to a recognised value.
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(value) = std::env::var(MODE_ENV) {
            match ProcessingMode::parse(&value) {
                Some(mode) => self.mode = mode,
                None => warn!("Ignoring unrecognised {MODE_ENV}='{value}'"),
            }
        }
        self
    }
}

pub struct SettingsStore {
    path: Option<PathBuf>,
    data: RwLock<Settings>,
}

impl SettingsStore {
    pub fn new(path: PathBuf) -> Result<Self> {
        let data = if path.exists() {
            let contents = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read settings from {}", path.display()))?;
            serde_json::from_str(&contents).unwrap_or_else(|err| {
                warn!(
                    "Settings at {} are malformed ({err}); using defaults",
                    path.display()
                );
                Settings::default()
            })
        } else {
            Settings::default()
        };

        Ok(Self {
            path: Some(path),
            data: RwLock::new(data.with_env_overrides()),
        })
    }

    /// A store that never touches disk.
    pub fn in_memory(settings: Settings) -> Self {
        Self {
            path: None,
            data: RwLock::new(settings),
        }
    }

    pub fn current(&self) -> Settings {
        self.data.read().unwrap().clone()
    }

    pub fn mode(&self) -> ProcessingMode {
        self.data.read().unwrap().mode
    }

    pub fn set_mode(&self, mode: ProcessingMode) -> Result<()> {
        self.update(|settings| settings.mode = mode)
    }

    pub fn update(&self, apply: impl FnOnce(&mut Settings)) -> Result<()> {
        let mut guard = self.data.write().unwrap();
        apply(&mut guard);
        self.persist(&guard)
    }

    fn persist(&self, data: &Settings) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create settings directory {}", parent.display())
            })?;
        }
        let serialized = serde_json::to_string_pretty(data)?;
        fs::write(path, serialized)
            .with_context(|| format!("Failed to write settings to {}", path.display()))
    }
}
