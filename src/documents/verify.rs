//! Cross-checks a card against its manifest.
//!
//! The manifest keeps every binding ever made, so only the most recent row
//! for each slot describes what should be on the card now.

use super::manifest::{hash_path, read_manifest, ManifestRow};
use crate::device::layout::{DeviceType, MANIFEST_FILE_NAME, PHRASE_SUBDIR};
use crate::error::ProvisionResult;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct VerifyOptions {
    /// Name files were placed under by canonicalizing runs.
    pub canonical_name: String,
    /// Compare placed bytes against the source files.
    pub check_hashes: bool,
}

#[derive(Debug, Clone, Default)]
pub struct VerifyReport {
    pub manifest_path: PathBuf,
    pub rows: usize,
    /// Slots whose latest row was checked.
    pub slots_checked: usize,
    pub failures: Vec<String>,
}

impl VerifyReport {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Checks the latest manifest row of every slot against `<card>/<device>`.
pub fn verify_card(
    card_root: &Path,
    device: DeviceType,
    options: &VerifyOptions,
) -> ProvisionResult<VerifyReport> {
    let manifest_path = card_root.join(MANIFEST_FILE_NAME);
    let rows = read_manifest(&manifest_path)?;
    let device_root = card_root.join(device.as_str());

    let latest = latest_rows(&rows);
    let mut failures = Vec::new();
    for row in &latest {
        let phrase_dir = device_root.join(&row.slot_dir_name).join(PHRASE_SUBDIR);
        if !phrase_dir.is_dir() {
            failures.push(format!("[missing slot] {}", phrase_dir.display()));
            continue;
        }
        let Some(placed) = [
            phrase_dir.join(&row.song_name),
            phrase_dir.join(&options.canonical_name),
        ]
        .into_iter()
        .find(|path| path.is_file()) else {
            failures.push(format!(
                "[missing file] {} ({})",
                row.song_name, row.slot_dir_name
            ));
            continue;
        };
        if !options.check_hashes {
            continue;
        }
        let source = PathBuf::from(&row.source_path);
        if !source.is_file() {
            failures.push(format!("[missing source] {}", source.display()));
            continue;
        }
        let expected = hash_path(&source)?;
        let found = hash_path(&placed)?;
        if expected != found {
            failures.push(format!(
                "[mismatch] {} ({}) expected {}, found {}",
                placed.display(),
                row.slot_dir_name,
                expected,
                found
            ));
        }
    }

    Ok(VerifyReport {
        manifest_path,
        rows: rows.len(),
        slots_checked: latest.len(),
        failures,
    })
}

/// Last row per `patchNumber`, in the order the slots first appear.
fn latest_rows(rows: &[ManifestRow]) -> Vec<&ManifestRow> {
    let mut order: Vec<&str> = Vec::new();
    let mut latest: HashMap<&str, &ManifestRow> = HashMap::new();
    for row in rows {
        if latest.insert(row.slot_dir_name.as_str(), row).is_none() {
            order.push(row.slot_dir_name.as_str());
        }
    }
    order.into_iter().filter_map(|slot| latest.get(slot).copied()).collect()
}
