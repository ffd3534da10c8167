//! Provisioning requests and the run that carries one out on a card.

use super::events::{EventLog, EventType};
use super::tree::{ExistingTreePolicy, MaterializeOutcome, TreeMaterializer};
use crate::device::config::AppConfig;
use crate::device::layout::{
    CapacityPolicy, DeviceLayout, DeviceType, SlotLayout, EVENTS_FILE_NAME, MANIFEST_FILE_NAME,
};
use crate::documents::{DescriptorDefaults, DescriptorWriter, ManifestRow, ManifestWriter};
use crate::error::{ProvisionError, ProvisionResult};
use crate::slots::{place_file, validate_canonical_name, NamingPolicy, SlotAssignor, SlotBinding};
use serde_json::json;
use std::path::PathBuf;
use tracing::{info, warn};
use uuid::Uuid;

/// Fully resolved inputs for one provisioning run.
#[derive(Debug, Clone)]
pub struct ProvisionRequest {
    pub device: DeviceType,
    pub capacity: Option<CapacityPolicy>,
    /// Mounted card root; the device root and manifest live directly below it.
    pub target_root: PathBuf,
    pub source_dir: PathBuf,
    pub existing_tree: Option<ExistingTreePolicy>,
    pub naming: NamingPolicy,
    pub canonical_name: String,
    pub audio_extension: String,
    pub defaults: DescriptorDefaults,
    pub record_events: bool,
}

impl ProvisionRequest {
    pub fn new(
        device: DeviceType,
        target_root: impl Into<PathBuf>,
        source_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            device,
            capacity: None,
            target_root: target_root.into(),
            source_dir: source_dir.into(),
            existing_tree: None,
            naming: NamingPolicy::Preserve,
            canonical_name: "phrase.wav".into(),
            audio_extension: "wav".into(),
            defaults: DescriptorDefaults::default(),
            record_events: true,
        }
    }

    pub fn from_config(config: &AppConfig) -> ProvisionResult<Self> {
        let target_root = config.paths.target_root.clone().ok_or_else(|| {
            ProvisionError::ConfigInvalid("paths.target_root is not set".into())
        })?;
        let source_dir = config.paths.source_dir.clone().ok_or_else(|| {
            ProvisionError::ConfigInvalid("paths.source_dir is not set".into())
        })?;
        let request = Self {
            device: config.device.device()?,
            capacity: config.device.capacity_override()?,
            target_root,
            source_dir,
            existing_tree: config.paths.existing_tree_policy()?,
            naming: config.placement.naming,
            canonical_name: config.placement.canonical_name.clone(),
            audio_extension: config.placement.audio_extension.clone(),
            defaults: config.descriptor.clone(),
            record_events: config.events.enabled,
        };
        request.validate()?;
        Ok(request)
    }

    /// Checks the values that end up in paths and descriptors.
    pub fn validate(&self) -> ProvisionResult<()> {
        validate_canonical_name(&self.canonical_name)?;
        self.defaults.validate()
    }

    pub fn layout(&self) -> DeviceLayout {
        DeviceLayout::resolve(self.device, self.capacity)
    }

    pub fn manifest_path(&self) -> PathBuf {
        self.target_root.join(MANIFEST_FILE_NAME)
    }

    pub fn events_path(&self) -> PathBuf {
        self.target_root.join(EVENTS_FILE_NAME)
    }
}

/// Bindings and tree size computed without touching the card.
#[derive(Debug, Clone)]
pub struct ProvisionPlan {
    pub layout: DeviceLayout,
    pub root: PathBuf,
    pub root_exists: bool,
    pub slot_count: usize,
    pub bindings: Vec<SlotBinding>,
}

#[derive(Debug, Clone)]
pub struct ProvisionSummary {
    pub run_id: Uuid,
    pub root: PathBuf,
    pub manifest_path: PathBuf,
    pub tree: MaterializeOutcome,
    pub bindings: Vec<SlotBinding>,
    pub bytes_copied: u64,
}

impl ProvisionSummary {
    pub fn describe(&self) -> String {
        let existing = match self.tree.policy {
            Some(policy) if self.tree.root_existed => format!(", existing tree: {policy}"),
            _ => String::new(),
        };
        format!(
            "Provisioned {} slot(s) under {} ({} new slot directories, {} bytes copied{}); manifest at {}.",
            self.bindings.len(),
            self.root.display(),
            self.tree.created_slots,
            self.bytes_copied,
            existing,
            self.manifest_path.display()
        )
    }
}

/// Runs the pipeline: assign, materialize, then place/describe/record per slot.
pub struct Provisioner {
    request: ProvisionRequest,
    events: EventLog,
}

impl Provisioner {
    pub fn new(request: ProvisionRequest) -> Self {
        let events = if request.record_events {
            EventLog::at(request.events_path())
        } else {
            EventLog::disabled()
        };
        Self { request, events }
    }

    pub fn events(&self) -> &EventLog {
        &self.events
    }

    fn slot_layout(&self, layout: &DeviceLayout) -> SlotLayout {
        SlotLayout::new(layout.root_under(&self.request.target_root))
    }

    /// Validates inputs and computes bindings. Makes no filesystem changes.
    pub fn plan(&self) -> ProvisionResult<ProvisionPlan> {
        self.request.validate()?;
        let target = &self.request.target_root;
        if !target.is_dir() {
            return Err(ProvisionError::PathUnavailable {
                path: target.clone(),
                reason: "target root is not a mounted directory".into(),
            });
        }
        let layout = self.request.layout();
        let slots = self.slot_layout(&layout);
        let assignor = SlotAssignor::new(slots.clone(), layout.capacity, self.request.naming)
            .with_canonical_name(self.request.canonical_name.clone())
            .with_extension(&self.request.audio_extension);
        let bindings = assignor.assign(&self.request.source_dir)?;
        TreeMaterializer::new(slots.clone()).check_policy(self.request.existing_tree)?;
        Ok(ProvisionPlan {
            slot_count: layout.capacity.slot_count(bindings.len()),
            root_exists: slots.root.exists(),
            root: slots.root,
            layout,
            bindings,
        })
    }

    /// The event log is optional; a failed append is logged and the run goes on.
    fn note(&self, run_id: Uuid, event_type: EventType, details: serde_json::Value) {
        if let Err(err) = self.events.record(run_id, event_type, details) {
            warn!(error = %err, ?event_type, "could not record run event");
        }
    }

    pub fn run(&self) -> ProvisionResult<ProvisionSummary> {
        self.run_with_progress(|_| {})
    }

    /// Same as [`Provisioner::run`], calling `on_slot` after each slot completes.
    pub fn run_with_progress<F>(&self, on_slot: F) -> ProvisionResult<ProvisionSummary>
    where
        F: FnMut(&SlotBinding),
    {
        let plan = self.plan()?;
        let run_id = Uuid::new_v4();
        self.note(
            run_id,
            EventType::RunStarted,
            json!({
                "device": plan.layout.device,
                "root": plan.root,
                "source": self.request.source_dir,
                "eligible_files": plan.bindings.len(),
                "slot_count": plan.slot_count,
                "policy": self.request.existing_tree,
                "naming": self.request.naming,
            }),
        );
        info!(%run_id, root = %plan.root.display(), files = plan.bindings.len(), "provisioning run started");

        match self.execute(run_id, plan, on_slot) {
            Ok(summary) => {
                self.note(
                    run_id,
                    EventType::RunCompleted,
                    json!({
                        "slots": summary.bindings.len(),
                        "bytes_copied": summary.bytes_copied,
                    }),
                );
                info!(%run_id, slots = summary.bindings.len(), "provisioning run completed");
                Ok(summary)
            }
            Err(err) => {
                let details = json!({
                    "error": err.to_string(),
                    "kind": format!("{:?}", err.kind()),
                    "slot": err.slot(),
                });
                self.note(run_id, EventType::RunFailed, details);
                Err(err)
            }
        }
    }

    fn execute<F>(
        &self,
        run_id: Uuid,
        plan: ProvisionPlan,
        mut on_slot: F,
    ) -> ProvisionResult<ProvisionSummary>
    where
        F: FnMut(&SlotBinding),
    {
        let slots = SlotLayout::new(&plan.root);
        let tree = TreeMaterializer::new(slots.clone())
            .materialize(plan.slot_count, self.request.existing_tree)?;
        self.note(
            run_id,
            EventType::TreeMaterialized,
            json!({
                "root": tree.root,
                "root_existed": tree.root_existed,
                "created_slots": tree.created_slots,
                "slot_count": tree.slot_count,
            }),
        );

        let descriptors = DescriptorWriter::new(
            slots,
            plan.layout.device,
            self.request.defaults.clone(),
        );
        let manifest_path = self.request.manifest_path();
        let mut manifest = ManifestWriter::open(&manifest_path)?;
        let mut bytes_copied = 0;

        for binding in &plan.bindings {
            bytes_copied += place_file(binding)?;
            descriptors.write(binding)?;
            let row = ManifestRow::for_binding(binding, &self.request.defaults);
            manifest.append(&row, binding.slot_index)?;
            self.note(
                run_id,
                EventType::SlotProvisioned,
                json!({
                    "slot": binding.slot_index,
                    "slot_dir": binding.slot_dir_name,
                    "source": binding.source_path,
                    "destination": binding.destination_path,
                }),
            );
            info!(
                slot = binding.slot_index,
                source = %binding.source_path.display(),
                destination = %binding.destination_path.display(),
                "slot provisioned"
            );
            on_slot(binding);
        }

        Ok(ProvisionSummary {
            run_id,
            root: plan.root,
            manifest_path,
            tree,
            bindings: plan.bindings,
            bytes_copied,
        })
    }
}

/// Device root a request would provision, e.g. `<card>/JamManStereo`.
pub fn device_root(request: &ProvisionRequest) -> PathBuf {
    request.layout().root_under(&request.target_root)
}

/// True when the device root is already on the card and a policy is needed.
pub fn needs_policy(request: &ProvisionRequest) -> bool {
    request.existing_tree.is_none() && device_root(request).exists()
}
