//! Creation of the `PatchNN/PhraseA` slot tree under the device root.

use crate::device::layout::SlotLayout;
use crate::error::{ProvisionError, ProvisionResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::PathBuf;
use std::str::FromStr;
use tracing::{debug, info};

/// What to do when the device root already exists on the card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExistingTreePolicy {
    /// Keep existing contents and create only the missing slot directories.
    Append,
    /// Delete the whole device root and start over.
    Overwrite,
}

impl ExistingTreePolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExistingTreePolicy::Append => "append",
            ExistingTreePolicy::Overwrite => "overwrite",
        }
    }
}

impl fmt::Display for ExistingTreePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Accepts the prompt answers `A`/`O` as well as the full words, in any case.
impl FromStr for ExistingTreePolicy {
    type Err = ProvisionError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "a" | "append" => Ok(ExistingTreePolicy::Append),
            "o" | "overwrite" => Ok(ExistingTreePolicy::Overwrite),
            _ => Err(ProvisionError::InvalidPolicy(value.trim().to_string())),
        }
    }
}

/// Result of preparing the slot tree.
#[derive(Debug, Clone)]
pub struct MaterializeOutcome {
    pub root: PathBuf,
    pub root_existed: bool,
    pub policy: Option<ExistingTreePolicy>,
    /// Slot directories that did not exist before this call.
    pub created_slots: usize,
    pub slot_count: usize,
}

/// Creates `<root>/PatchNN/PhraseA` for slots `1..=slot_count`.
#[derive(Debug, Clone)]
pub struct TreeMaterializer {
    layout: SlotLayout,
}

impl TreeMaterializer {
    pub fn new(layout: SlotLayout) -> Self {
        Self { layout }
    }

    pub fn root(&self) -> &PathBuf {
        &self.layout.root
    }

    /// Fails with `PolicyRequired` when the root exists and no policy was given.
    pub fn check_policy(&self, policy: Option<ExistingTreePolicy>) -> ProvisionResult<()> {
        if self.layout.root.exists() && policy.is_none() {
            return Err(ProvisionError::PolicyRequired {
                root: self.layout.root.clone(),
            });
        }
        Ok(())
    }

    /// Stops at the first directory that cannot be created. Whatever was
    /// created before that stays in place and is picked up by an Append run.
    pub fn materialize(
        &self,
        slot_count: usize,
        policy: Option<ExistingTreePolicy>,
    ) -> ProvisionResult<MaterializeOutcome> {
        self.check_policy(policy)?;
        let root = &self.layout.root;
        let root_existed = root.exists();

        if root_existed && policy == Some(ExistingTreePolicy::Overwrite) {
            fs::remove_dir_all(root)
                .map_err(|err| ProvisionError::io("Remove existing tree", root, err))?;
            info!(root = %root.display(), "removed existing tree for overwrite");
        }
        fs::create_dir_all(root).map_err(|err| ProvisionError::io("Create root", root, err))?;

        let mut created_slots = 0;
        for index in 1..=slot_count {
            let phrase_dir = self.layout.phrase_dir(index);
            if phrase_dir.is_dir() {
                continue;
            }
            fs::create_dir_all(&phrase_dir).map_err(|err| {
                ProvisionError::slot_io("Create slot directory", &phrase_dir, index, err)
            })?;
            debug!(path = %phrase_dir.display(), "created slot directory");
            created_slots += 1;
        }

        info!(
            root = %root.display(),
            slot_count,
            created_slots,
            "slot tree ready"
        );
        Ok(MaterializeOutcome {
            root: root.clone(),
            root_existed,
            policy: if root_existed { policy } else { None },
            created_slots,
            slot_count,
        })
    }
}
