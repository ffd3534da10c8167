//! Binding eligible source files to numbered device slots.

use super::placement::NamingPolicy;
use crate::device::layout::{slot_dir_name, CapacityPolicy, SlotLayout};
use crate::error::{ProvisionError, ProvisionResult};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Association of one source audio file with one device slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SlotBinding {
    /// 1-based, contiguous within a run.
    pub slot_index: usize,
    pub slot_dir_name: String,
    /// Absolute path of the source file. Never written to.
    pub source_path: PathBuf,
    /// Always under `<root>/<slot_dir_name>/PhraseA/`.
    pub destination_path: PathBuf,
    pub patch_id: String,
    pub phrase_id: String,
}

impl SlotBinding {
    /// Source base name, used as the song/patch name.
    pub fn song_name(&self) -> String {
        file_name_lossy(&self.source_path)
    }

    pub fn placed_file_name(&self) -> String {
        file_name_lossy(&self.destination_path)
    }
}

fn file_name_lossy(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Binds eligible files in a source folder to consecutive slots.
#[derive(Debug, Clone)]
pub struct SlotAssignor {
    layout: SlotLayout,
    capacity: CapacityPolicy,
    naming: NamingPolicy,
    canonical_name: String,
    extension: String,
}

impl SlotAssignor {
    pub fn new(layout: SlotLayout, capacity: CapacityPolicy, naming: NamingPolicy) -> Self {
        Self {
            layout,
            capacity,
            naming,
            canonical_name: "phrase.wav".into(),
            extension: "wav".into(),
        }
    }

    pub fn with_canonical_name(mut self, name: impl Into<String>) -> Self {
        self.canonical_name = name.into();
        self
    }

    /// Accepted extension, compared case-insensitively. A leading dot is ignored.
    pub fn with_extension(mut self, extension: impl AsRef<str>) -> Self {
        self.extension = extension.as_ref().trim_start_matches('.').to_lowercase();
        self
    }

    pub fn is_eligible(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.eq_ignore_ascii_case(&self.extension))
            .unwrap_or(false)
    }

    /// Eligible files directly inside `source_dir`, sorted by file name.
    ///
    /// Subdirectories and their contents are ignored; anything with another
    /// extension is skipped silently.
    pub fn eligible_files(&self, source_dir: &Path) -> ProvisionResult<Vec<PathBuf>> {
        let root = fs::canonicalize(source_dir).map_err(|err| ProvisionError::PathUnavailable {
            path: source_dir.to_path_buf(),
            reason: err.to_string(),
        })?;
        if !root.is_dir() {
            return Err(ProvisionError::PathUnavailable {
                path: source_dir.to_path_buf(),
                reason: "not a directory".into(),
            });
        }

        let mut files = Vec::new();
        for entry in WalkDir::new(&root).min_depth(1).max_depth(1) {
            let entry = entry.map_err(|err| ProvisionError::PathUnavailable {
                path: root.clone(),
                reason: err.to_string(),
            })?;
            if entry.file_type().is_file() && self.is_eligible(entry.path()) {
                files.push(entry.into_path());
            }
        }
        files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
        Ok(files)
    }

    /// Produces one binding per eligible file, numbered from 1 in file-name order.
    pub fn assign(&self, source_dir: &Path) -> ProvisionResult<Vec<SlotBinding>> {
        let files = self.eligible_files(source_dir)?;
        self.capacity.check(files.len())?;
        Ok(files
            .into_iter()
            .enumerate()
            .map(|(position, source_path)| self.bind(position + 1, source_path))
            .collect())
    }

    fn bind(&self, slot_index: usize, source_path: PathBuf) -> SlotBinding {
        let placed_name = match self.naming {
            NamingPolicy::Preserve => source_path
                .file_name()
                .map(|name| name.to_os_string())
                .unwrap_or_else(|| self.canonical_name.clone().into()),
            NamingPolicy::Canonicalize => self.canonical_name.clone().into(),
        };
        SlotBinding {
            slot_index,
            slot_dir_name: slot_dir_name(slot_index),
            destination_path: self.layout.phrase_dir(slot_index).join(placed_name),
            source_path,
            patch_id: format!("patch-{slot_index}"),
            phrase_id: format!("phrase-{slot_index}"),
        }
    }
}
