//! Device layouts and the on-card slot directory scheme.
//!
//! Every slot is a `PatchNN` directory holding `patch.xml` and a single
//! `PhraseA` subdirectory that holds `phrase.xml` plus the placed audio file.
//! Centralizing the names here keeps the materializer, assignor, and
//! descriptor writer agreeing on one layout.

use crate::error::{ProvisionError, ProvisionResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Prefix for slot directory names (`Patch01`, `Patch02`, ...).
pub const SLOT_DIR_PREFIX: &str = "Patch";
/// Name of the sole phrase subdirectory created per slot.
pub const PHRASE_SUBDIR: &str = "PhraseA";
/// Patch descriptor file name inside each slot directory.
pub const PATCH_DESCRIPTOR_FILE: &str = "patch.xml";
/// Phrase descriptor file name inside each phrase subdirectory.
pub const PHRASE_DESCRIPTOR_FILE: &str = "phrase.xml";
/// Manifest file name at the target storage root.
pub const MANIFEST_FILE_NAME: &str = "songs.csv";
/// Run event log file name at the target storage root.
pub const EVENTS_FILE_NAME: &str = "jamtree-events.jsonl";
/// Slot count the supported devices expose.
pub const DEFAULT_SLOT_CAPACITY: usize = 99;

/// Supported looper models.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeviceType {
    JamManStereo,
    JamManSoloXT,
}

impl DeviceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeviceType::JamManStereo => "JamManStereo",
            DeviceType::JamManSoloXT => "JamManSoloXT",
        }
    }
}

impl fmt::Display for DeviceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DeviceType {
    type Err = ProvisionError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim() {
            "JamManStereo" => Ok(DeviceType::JamManStereo),
            "JamManSoloXT" => Ok(DeviceType::JamManSoloXT),
            other => Err(ProvisionError::UnsupportedDevice(other.to_string())),
        }
    }
}

/// How many slot directories a tree gets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CapacityPolicy {
    /// Pre-create slots `1..=n` regardless of how many files are supplied.
    Fixed(usize),
    /// Create exactly one slot per eligible source file.
    DemandSized,
}

impl CapacityPolicy {
    /// Number of slot directories to materialize for `eligible` source files.
    pub fn slot_count(&self, eligible: usize) -> usize {
        match self {
            CapacityPolicy::Fixed(capacity) => *capacity,
            CapacityPolicy::DemandSized => eligible,
        }
    }

    /// Rejects file sets that do not fit under a fixed capacity.
    pub fn check(&self, eligible: usize) -> ProvisionResult<()> {
        match self {
            CapacityPolicy::Fixed(capacity) if eligible > *capacity => {
                Err(ProvisionError::CapacityExceeded {
                    eligible,
                    capacity: *capacity,
                })
            }
            _ => Ok(()),
        }
    }
}

/// Root directory name and capacity derived once per run from the device type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceLayout {
    pub device: DeviceType,
    pub root_dir_name: String,
    pub capacity: CapacityPolicy,
}

impl DeviceLayout {
    /// Resolves the layout for a device, honouring an explicit capacity override.
    pub fn resolve(device: DeviceType, capacity_override: Option<CapacityPolicy>) -> Self {
        Self {
            device,
            root_dir_name: device.as_str().to_string(),
            capacity: capacity_override.unwrap_or(CapacityPolicy::Fixed(DEFAULT_SLOT_CAPACITY)),
        }
    }

    /// Device root under the target storage root, e.g. `<card>/JamManStereo`.
    pub fn root_under(&self, target_root: &Path) -> PathBuf {
        target_root.join(&self.root_dir_name)
    }
}

/// Zero-padded slot directory name for a 1-based slot index.
pub fn slot_dir_name(index: usize) -> String {
    format!("{SLOT_DIR_PREFIX}{index:02}")
}

/// Path builder for the slot directories below one device root.
#[derive(Debug, Clone)]
pub struct SlotLayout {
    pub root: PathBuf,
}

impl SlotLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn slot_dir(&self, index: usize) -> PathBuf {
        self.root.join(slot_dir_name(index))
    }

    pub fn phrase_dir(&self, index: usize) -> PathBuf {
        self.slot_dir(index).join(PHRASE_SUBDIR)
    }

    pub fn patch_descriptor(&self, index: usize) -> PathBuf {
        self.slot_dir(index).join(PATCH_DESCRIPTOR_FILE)
    }

    pub fn phrase_descriptor(&self, index: usize) -> PathBuf {
        self.phrase_dir(index).join(PHRASE_DESCRIPTOR_FILE)
    }
}
