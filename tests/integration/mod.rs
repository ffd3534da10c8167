use jamtree::{DeviceType, ProvisionRequest};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Temp card root plus a source folder of fake audio files.
pub struct IntegrationHarness {
    workspace: TempDir,
}

impl IntegrationHarness {
    pub fn new() -> Self {
        let workspace = TempDir::new().expect("failed to create temp workspace");
        fs::create_dir_all(workspace.path().join("card")).expect("failed to create card root");
        fs::create_dir_all(workspace.path().join("music")).expect("failed to create source dir");
        Self { workspace }
    }

    pub fn card_root(&self) -> PathBuf {
        self.workspace.path().join("card")
    }

    pub fn source_dir(&self) -> PathBuf {
        self.workspace.path().join("music")
    }

    pub fn add_source(&self, name: &str, contents: &[u8]) -> PathBuf {
        let path = self.source_dir().join(name);
        fs::write(&path, contents).expect("failed to write source file");
        path
    }

    pub fn request(&self, device: DeviceType) -> ProvisionRequest {
        ProvisionRequest::new(device, self.card_root(), self.source_dir())
    }
}

pub fn read_lines(path: &Path) -> Vec<String> {
    fs::read_to_string(path)
        .expect("failed to read file")
        .lines()
        .map(str::to_string)
        .collect()
}

mod capacity_limits;
mod manifest_append;
mod manifest_verify;
mod pipeline_scenarios;
