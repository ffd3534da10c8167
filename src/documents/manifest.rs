//! Append-only manifest (`songs.csv`) of every slot binding made for a card.
//!
//! The header row is written only when the file is new (or empty), so
//! repeated runs against the same card keep appending data rows under one
//! header. Rows are flushed one at a time: after a crash the manifest lists
//! exactly the bindings that finished.

use super::descriptor::DescriptorDefaults;
use crate::error::{ProvisionError, ProvisionResult};
use crate::slots::SlotBinding;
use csv::{Writer, WriterBuilder};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fs::{self, File, OpenOptions};
use std::io::{self, Read};
use std::path::{Path, PathBuf};

/// Column header, in the order rows are written.
pub const MANIFEST_HEADER: [&str; 7] = [
    "songName",
    "bpMeasure",
    "bpMinute",
    "StopMode",
    "RhythmType",
    "patchNumber",
    "wavFileLoc",
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestRow {
    #[serde(rename = "songName")]
    pub song_name: String,
    #[serde(rename = "bpMeasure")]
    pub beats_per_measure: String,
    #[serde(rename = "bpMinute")]
    pub beats_per_minute: String,
    #[serde(rename = "StopMode")]
    pub stop_mode: String,
    #[serde(rename = "RhythmType")]
    pub rhythm_type: String,
    #[serde(rename = "patchNumber")]
    pub slot_dir_name: String,
    #[serde(rename = "wavFileLoc")]
    pub source_path: String,
}

impl ManifestRow {
    pub fn for_binding(binding: &SlotBinding, defaults: &DescriptorDefaults) -> Self {
        Self {
            song_name: binding.song_name(),
            beats_per_measure: defaults.beats_per_measure.to_string(),
            beats_per_minute: defaults.beats_per_minute.to_string(),
            stop_mode: defaults.stop_mode.clone(),
            rhythm_type: defaults.rhythm_type.clone(),
            slot_dir_name: binding.slot_dir_name.clone(),
            source_path: binding.source_path.to_string_lossy().into_owned(),
        }
    }

    fn as_record(&self) -> [&str; 7] {
        [
            &self.song_name,
            &self.beats_per_measure,
            &self.beats_per_minute,
            &self.stop_mode,
            &self.rhythm_type,
            &self.slot_dir_name,
            &self.source_path,
        ]
    }
}

/// Holds the manifest open for the duration of one run.
pub struct ManifestWriter {
    path: PathBuf,
    writer: Writer<File>,
    rows_written: usize,
}

impl ManifestWriter {
    pub fn open(path: impl Into<PathBuf>) -> ProvisionResult<Self> {
        let path = path.into();
        let needs_header = match fs::metadata(&path) {
            Ok(meta) => meta.len() == 0,
            Err(err) if err.kind() == io::ErrorKind::NotFound => true,
            Err(err) => return Err(ProvisionError::io("Inspect manifest", &path, err)),
        };
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|err| ProvisionError::io("Open manifest", &path, err))?;
        let mut writer = WriterBuilder::new().has_headers(false).from_writer(file);
        if needs_header {
            writer
                .write_record(MANIFEST_HEADER)
                .and_then(|_| writer.flush().map_err(csv::Error::from))
                .map_err(|err| ProvisionError::io("Write manifest header", &path, err.into()))?;
        }
        Ok(Self {
            path,
            writer,
            rows_written: 0,
        })
    }

    /// Data rows appended through this handle.
    pub fn rows_written(&self) -> usize {
        self.rows_written
    }

    /// Appends and flushes one row.
    pub fn append(&mut self, row: &ManifestRow, slot: usize) -> ProvisionResult<()> {
        self.writer
            .write_record(row.as_record())
            .map_err(|err| ProvisionError::slot_io("Append manifest row", &self.path, slot, err.into()))?;
        self.writer
            .flush()
            .map_err(|err| ProvisionError::slot_io("Flush manifest", &self.path, slot, err))?;
        self.rows_written += 1;
        Ok(())
    }
}

/// Reads every data row of a manifest.
pub fn read_manifest(path: &Path) -> ProvisionResult<Vec<ManifestRow>> {
    let mut reader = csv::Reader::from_path(path)
        .map_err(|err| ProvisionError::io("Open manifest", path, err.into()))?;
    let mut rows = Vec::new();
    for record in reader.deserialize() {
        let row: ManifestRow =
            record.map_err(|err| ProvisionError::io("Parse manifest", path, err.into()))?;
        rows.push(row);
    }
    Ok(rows)
}

/// SHA-256 of a file's bytes, hex encoded.
pub fn hash_path(path: &Path) -> ProvisionResult<String> {
    let mut file = File::open(path).map_err(|err| ProvisionError::io("Open for hashing", path, err))?;
    let mut hasher = Sha256::new();
    let mut buf = [0_u8; 8192];
    loop {
        let read = file
            .read(&mut buf)
            .map_err(|err| ProvisionError::io("Read for hashing", path, err))?;
        if read == 0 {
            break;
        }
        hasher.update(&buf[..read]);
    }
    Ok(format!("{:x}", hasher.finalize()))
}
