//! Patch and phrase descriptor documents.
//!
//! Rendering is a pure function of the binding, the device type and the
//! configured defaults: no timestamps and no random identifiers, so a
//! regenerated descriptor is byte-identical to the original.

use crate::device::layout::{DeviceType, SlotLayout};
use crate::error::{ProvisionError, ProvisionResult};
use crate::slots::SlotBinding;
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Fixed values rendered into every descriptor and manifest row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DescriptorDefaults {
    #[serde(default = "default_rhythm_type")]
    pub rhythm_type: String,
    #[serde(default = "default_stop_mode")]
    pub stop_mode: String,
    #[serde(default = "default_beats_per_minute")]
    pub beats_per_minute: f64,
    #[serde(default = "default_beats_per_measure")]
    pub beats_per_measure: u32,
    #[serde(default = "default_is_loop")]
    pub is_loop: bool,
}

impl Default for DescriptorDefaults {
    fn default() -> Self {
        Self {
            rhythm_type: default_rhythm_type(),
            stop_mode: default_stop_mode(),
            beats_per_minute: default_beats_per_minute(),
            beats_per_measure: default_beats_per_measure(),
            is_loop: default_is_loop(),
        }
    }
}

impl DescriptorDefaults {
    /// Rejects values no phrase document can carry.
    pub fn validate(&self) -> ProvisionResult<()> {
        if !self.beats_per_minute.is_finite() || self.beats_per_minute <= 0.0 {
            return Err(ProvisionError::ConfigInvalid(format!(
                "descriptor.beats_per_minute must be a positive number, got {}",
                self.beats_per_minute
            )));
        }
        if self.beats_per_measure == 0 {
            return Err(ProvisionError::ConfigInvalid(
                "descriptor.beats_per_measure must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

fn default_rhythm_type() -> String {
    "StudioKickAndHighHat".into()
}

fn default_stop_mode() -> String {
    "StopInstantly".into()
}

const fn default_beats_per_minute() -> f64 {
    124.9213180542
}

const fn default_beats_per_measure() -> u32 {
    4
}

const fn default_is_loop() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatchDescriptor {
    pub patch_name: String,
    pub rhythm_type: String,
    pub stop_mode: String,
    pub id: String,
}

impl PatchDescriptor {
    pub fn for_binding(binding: &SlotBinding, defaults: &DescriptorDefaults) -> Self {
        Self {
            patch_name: binding.song_name(),
            rhythm_type: defaults.rhythm_type.clone(),
            stop_mode: defaults.stop_mode.clone(),
            id: binding.patch_id.clone(),
        }
    }

    pub fn render(&self, device: DeviceType) -> String {
        format!(
            concat!(
                "<?xml version=\"1.0\" encoding=\"UTF-8\" ?>\n",
                "<JamManPatch xmlns=\"http://schemas.digitech.com/JamMan/Patch\" device=\"{device}\" version=\"1\">\n",
                "    <PatchName>{name}</PatchName>\n",
                "    <RhythmType>{rhythm}</RhythmType>\n",
                "    <StopMode>{stop}</StopMode>\n",
                "    <SettingsVersion>1</SettingsVersion>\n",
                "    <ID>{id}</ID>\n",
                "    <Metadata />\n",
                "</JamManPatch>"
            ),
            device = escape_xml(device.as_str()),
            name = escape_xml(&self.patch_name),
            rhythm = escape_xml(&self.rhythm_type),
            stop = escape_xml(&self.stop_mode),
            id = escape_xml(&self.id),
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PhraseDescriptor {
    pub beats_per_minute: f64,
    pub beats_per_measure: u32,
    pub is_loop: bool,
    pub id: String,
}

impl PhraseDescriptor {
    pub fn for_binding(binding: &SlotBinding, defaults: &DescriptorDefaults) -> Self {
        Self {
            beats_per_minute: defaults.beats_per_minute,
            beats_per_measure: defaults.beats_per_measure,
            is_loop: defaults.is_loop,
            id: binding.phrase_id.clone(),
        }
    }

    pub fn render(&self) -> ProvisionResult<String> {
        if !self.beats_per_minute.is_finite() || self.beats_per_minute <= 0.0 {
            return Err(ProvisionError::ConfigInvalid(format!(
                "tempo must be a positive number, got {}",
                self.beats_per_minute
            )));
        }
        Ok(format!(
            concat!(
                "<?xml version=\"1.0\" encoding=\"UTF-8\" ?>\n",
                "<JamManPhrase xmlns=\"http://schemas.digitech.com/JamMan/Phrase\" version=\"1\">\n",
                "    <BeatsPerMinute>{bpm}</BeatsPerMinute>\n",
                "    <BeatsPerMeasure>{meter}</BeatsPerMeasure>\n",
                "    <IsLoop>{is_loop}</IsLoop>\n",
                "    <ID>{id}</ID>\n",
                "    <Metadata />\n",
                "</JamManPhrase>"
            ),
            bpm = self.beats_per_minute,
            meter = self.beats_per_measure,
            is_loop = u8::from(self.is_loop),
            id = escape_xml(&self.id),
        ))
    }
}

/// Paths of the two descriptors written for one slot.
#[derive(Debug, Clone)]
pub struct DescriptorPaths {
    pub patch: PathBuf,
    pub phrase: PathBuf,
}

/// Writes descriptors into the slot directories of one device root.
#[derive(Debug, Clone)]
pub struct DescriptorWriter {
    layout: SlotLayout,
    device: DeviceType,
    defaults: DescriptorDefaults,
}

impl DescriptorWriter {
    pub fn new(layout: SlotLayout, device: DeviceType, defaults: DescriptorDefaults) -> Self {
        Self {
            layout,
            device,
            defaults,
        }
    }

    pub fn write(&self, binding: &SlotBinding) -> ProvisionResult<DescriptorPaths> {
        let index = binding.slot_index;
        let patch_path = self.layout.patch_descriptor(index);
        let phrase_path = self.layout.phrase_descriptor(index);

        let patch = PatchDescriptor::for_binding(binding, &self.defaults).render(self.device);
        write_atomically(&patch_path, index, patch.as_bytes())?;

        let phrase = PhraseDescriptor::for_binding(binding, &self.defaults)
            .render()
            .map_err(|err| ProvisionError::Template {
                path: phrase_path.clone(),
                slot: index,
                reason: err.to_string(),
            })?;
        write_atomically(&phrase_path, index, phrase.as_bytes())?;

        Ok(DescriptorPaths {
            patch: patch_path,
            phrase: phrase_path,
        })
    }
}

/// Writes into a temp file beside `path`, then renames it into place.
fn write_atomically(path: &Path, slot: usize, contents: &[u8]) -> ProvisionResult<()> {
    let template_error = |reason: String| ProvisionError::Template {
        path: path.to_path_buf(),
        slot,
        reason,
    };
    let dir = path
        .parent()
        .ok_or_else(|| template_error("descriptor path has no parent directory".into()))?;
    let mut tmp = NamedTempFile::new_in(dir).map_err(|err| template_error(err.to_string()))?;
    tmp.write_all(contents)
        .and_then(|_| tmp.flush())
        .map_err(|err| template_error(err.to_string()))?;
    tmp.persist(path)
        .map_err(|err| template_error(err.error.to_string()))?;
    Ok(())
}

fn escape_xml(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            other => out.push(other),
        }
    }
    out
}
