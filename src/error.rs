//! Error types for slot-tree provisioning.
//!
//! Every failure is terminal for the current run. Variants carry the path and,
//! where one is being processed, the slot index so the operator can diagnose
//! the problem and re-run with the Append policy.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for provisioning operations.
pub type ProvisionResult<T> = Result<T, ProvisionError>;

/// Coarse error classification reported to the operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    ConfigInvalid,
    PathUnavailable,
    CapacityExceeded,
    IoFailure,
    TemplateError,
}

#[derive(Error, Debug)]
pub enum ProvisionError {
    #[error("Invalid configuration: {0}")]
    ConfigInvalid(String),

    #[error("Unsupported device type '{0}' (expected JamManStereo or JamManSoloXT)")]
    UnsupportedDevice(String),

    #[error("Invalid existing-tree policy '{0}' (expected Append or Overwrite)")]
    InvalidPolicy(String),

    #[error("Root {} already exists; choose Append or Overwrite", .root.display())]
    PolicyRequired { root: PathBuf },

    #[error("Path unavailable: {} ({reason})", .path.display())]
    PathUnavailable { path: PathBuf, reason: String },

    #[error("{eligible} eligible files exceed the {capacity} available slots")]
    CapacityExceeded { eligible: usize, capacity: usize },

    #[error("{action} failed for {}{}: {source}", .path.display(), slot_suffix(.slot))]
    Io {
        action: &'static str,
        path: PathBuf,
        slot: Option<usize>,
        #[source]
        source: io::Error,
    },

    #[error("Descriptor {} for slot {slot} could not be written: {reason}", .path.display())]
    Template {
        path: PathBuf,
        slot: usize,
        reason: String,
    },
}

impl ProvisionError {
    pub fn io(action: &'static str, path: impl Into<PathBuf>, source: io::Error) -> Self {
        ProvisionError::Io {
            action,
            path: path.into(),
            slot: None,
            source,
        }
    }

    pub fn slot_io(
        action: &'static str,
        path: impl Into<PathBuf>,
        slot: usize,
        source: io::Error,
    ) -> Self {
        ProvisionError::Io {
            action,
            path: path.into(),
            slot: Some(slot),
            source,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            ProvisionError::ConfigInvalid(_)
            | ProvisionError::UnsupportedDevice(_)
            | ProvisionError::InvalidPolicy(_)
            | ProvisionError::PolicyRequired { .. } => ErrorKind::ConfigInvalid,
            ProvisionError::PathUnavailable { .. } => ErrorKind::PathUnavailable,
            ProvisionError::CapacityExceeded { .. } => ErrorKind::CapacityExceeded,
            ProvisionError::Io { .. } => ErrorKind::IoFailure,
            ProvisionError::Template { .. } => ErrorKind::TemplateError,
        }
    }

    /// Slot index being processed when the error occurred, if any.
    pub fn slot(&self) -> Option<usize> {
        match self {
            ProvisionError::Io { slot, .. } => *slot,
            ProvisionError::Template { slot, .. } => Some(*slot),
            _ => None,
        }
    }
}

fn slot_suffix(slot: &Option<usize>) -> String {
    match slot {
        Some(index) => format!(" (slot {index})"),
        None => String::new(),
    }
}
