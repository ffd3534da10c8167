//! Configuration primitives for jamtree provisioning runs.
//!
//! Stored in a TOML file located at:
//!   $JAMTREE_HOME/jamtree.toml when the variable is set
//!   %APPDATA%/jamtree/jamtree.toml on Windows
//!   $XDG_CONFIG_HOME/jamtree/jamtree.toml on Linux
//!   ~/Library/Application Support/jamtree/jamtree.toml on macOS
//!
//! Every field has a default so a partial file (or none at all) still loads.
//! The CLI layers its flags over whatever is loaded here.

use crate::device::layout::{CapacityPolicy, DeviceType};
use crate::documents::DescriptorDefaults;
use crate::error::{ProvisionError, ProvisionResult};
use crate::provisioning::ExistingTreePolicy;
use crate::slots::NamingPolicy;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration persisted per installation.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    /// Device model and optional capacity override.
    #[serde(default)]
    pub device: DeviceSettings,
    /// Target card root and source audio folder.
    #[serde(default)]
    pub paths: PathSettings,
    /// How source files are selected and named on the card.
    #[serde(default)]
    pub placement: PlacementSettings,
    /// Fixed values rendered into every patch/phrase descriptor.
    #[serde(default)]
    pub descriptor: DescriptorDefaults,
    /// Run event log toggle.
    #[serde(default)]
    pub events: EventSettings,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CapacityMode {
    Fixed,
    Demand,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceSettings {
    #[serde(rename = "type", default = "default_device_type")]
    pub device_type: String,
    /// Overrides the device's default fixed capacity when present.
    #[serde(default)]
    pub capacity: Option<CapacityMode>,
    /// Slot count used with `capacity = "fixed"`.
    #[serde(default)]
    pub slots: Option<usize>,
}

impl Default for DeviceSettings {
    fn default() -> Self {
        Self {
            device_type: default_device_type(),
            capacity: None,
            slots: None,
        }
    }
}

fn default_device_type() -> String {
    DeviceType::JamManStereo.as_str().to_string()
}

impl DeviceSettings {
    pub fn device(&self) -> ProvisionResult<DeviceType> {
        self.device_type.parse()
    }

    pub fn capacity_override(&self) -> ProvisionResult<Option<CapacityPolicy>> {
        match (self.capacity, self.slots) {
            (None, None) => Ok(None),
            (None, Some(slots)) | (Some(CapacityMode::Fixed), Some(slots)) => {
                if slots == 0 {
                    return Err(ProvisionError::ConfigInvalid(
                        "device.slots must be at least 1".into(),
                    ));
                }
                Ok(Some(CapacityPolicy::Fixed(slots)))
            }
            (Some(CapacityMode::Fixed), None) => Ok(None),
            (Some(CapacityMode::Demand), None) => Ok(Some(CapacityPolicy::DemandSized)),
            (Some(CapacityMode::Demand), Some(_)) => Err(ProvisionError::ConfigInvalid(
                "device.slots cannot be combined with capacity = \"demand\"".into(),
            )),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PathSettings {
    /// Mounted storage root of the card, e.g. `E:\` or `/media/JAMMAN`.
    #[serde(default)]
    pub target_root: Option<PathBuf>,
    /// Flat folder of audio files to load onto the card.
    #[serde(default)]
    pub source_dir: Option<PathBuf>,
    /// Policy applied when the device root already exists. Prompted for when unset.
    #[serde(default)]
    pub existing_tree: Option<String>,
}

impl PathSettings {
    pub fn existing_tree_policy(&self) -> ProvisionResult<Option<ExistingTreePolicy>> {
        self.existing_tree
            .as_deref()
            .map(str::parse::<ExistingTreePolicy>)
            .transpose()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlacementSettings {
    #[serde(default)]
    pub naming: NamingPolicy,
    /// File name used for every placed file under the canonicalize policy.
    #[serde(default = "default_canonical_name")]
    pub canonical_name: String,
    /// Extension (without dot) a source file needs to be eligible.
    #[serde(default = "default_audio_extension")]
    pub audio_extension: String,
}

impl Default for PlacementSettings {
    fn default() -> Self {
        Self {
            naming: NamingPolicy::default(),
            canonical_name: default_canonical_name(),
            audio_extension: default_audio_extension(),
        }
    }
}

fn default_canonical_name() -> String {
    "phrase.wav".into()
}

fn default_audio_extension() -> String {
    "wav".into()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventSettings {
    #[serde(default = "default_events_enabled")]
    pub enabled: bool,
}

impl Default for EventSettings {
    fn default() -> Self {
        Self {
            enabled: default_events_enabled(),
        }
    }
}

const fn default_events_enabled() -> bool {
    true
}

/// Standard config file name (resolved per OS at runtime).
pub const CONFIG_FILE_NAME: &str = "jamtree.toml";

use anyhow::{Context, Result};
use directories::ProjectDirs;
use std::env;
use std::fs;
use std::path::Path;

/// Returns the directory holding the config file.
///
/// Order of precedence:
/// 1. `JAMTREE_HOME` environment variable.
/// 2. OS-specific config directory via `directories::ProjectDirs`.
pub fn config_dir() -> Result<PathBuf> {
    if let Ok(path) = env::var("JAMTREE_HOME") {
        return Ok(PathBuf::from(path));
    }
    let dirs = ProjectDirs::from("", "", "jamtree")
        .context("Unable to determine OS config directory")?;
    Ok(dirs.config_dir().to_path_buf())
}

/// Path to the config file.
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Loads the configuration from the default location or returns defaults.
pub fn load_or_default() -> Result<AppConfig> {
    let path = config_file_path()?;
    if path.exists() {
        load_from(&path)
    } else {
        Ok(AppConfig::default())
    }
}

/// Loads the configuration from an explicit file.
pub fn load_from(path: &Path) -> Result<AppConfig> {
    let data = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file {:?}", path))?;
    let cfg: AppConfig =
        toml::from_str(&data).with_context(|| format!("Failed to parse config file {:?}", path))?;
    Ok(cfg)
}

/// Persists the configuration to the default location.
pub fn save(config: &AppConfig) -> Result<PathBuf> {
    let dir = config_dir()?;
    fs::create_dir_all(&dir)?;
    let path = dir.join(CONFIG_FILE_NAME);
    let data = toml::to_string_pretty(config)?;
    fs::write(&path, data)?;
    Ok(path)
}
