//! Naming and copying of audio files into their phrase directories.

use super::assign::SlotBinding;
use crate::error::{ProvisionError, ProvisionResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Component, Path};
use std::str::FromStr;

/// How the placed audio file is named inside its phrase directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NamingPolicy {
    /// Keep the source file's base name.
    #[default]
    Preserve,
    /// Use one fixed file name in every slot.
    Canonicalize,
}

impl NamingPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            NamingPolicy::Preserve => "preserve",
            NamingPolicy::Canonicalize => "canonicalize",
        }
    }
}

impl fmt::Display for NamingPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NamingPolicy {
    type Err = ProvisionError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "preserve" => Ok(NamingPolicy::Preserve),
            "canonicalize" | "canonical" => Ok(NamingPolicy::Canonicalize),
            other => Err(ProvisionError::ConfigInvalid(format!(
                "unknown naming policy '{other}' (expected preserve or canonicalize)"
            ))),
        }
    }
}

/// Checks that a canonical name is one plain file name, so the placed file
/// stays inside its `PhraseA` directory.
pub fn validate_canonical_name(name: &str) -> ProvisionResult<()> {
    let mut components = Path::new(name).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(_)), None) if !name.trim().is_empty() => Ok(()),
        _ => Err(ProvisionError::ConfigInvalid(format!(
            "placement.canonical_name must be a single file name, got '{name}'"
        ))),
    }
}

/// Copies the bound source file into its slot. Returns the bytes copied.
///
/// A failed copy is not cleaned up; the half-written file stays for the
/// operator to inspect and an Append re-run overwrites it.
pub fn place_file(binding: &SlotBinding) -> ProvisionResult<u64> {
    fs::copy(&binding.source_path, &binding.destination_path).map_err(|err| {
        ProvisionError::slot_io("Copy", &binding.destination_path, binding.slot_index, err)
    })
}
