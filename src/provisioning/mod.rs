//! The provisioning pipeline and the pieces it owns on the card.

pub mod events;
pub mod runner;
pub mod tree;

pub use events::{EventLog, EventType, ProvisionEvent};
pub use runner::{
    device_root, needs_policy, ProvisionPlan, ProvisionRequest, ProvisionSummary, Provisioner,
};
pub use tree::{ExistingTreePolicy, MaterializeOutcome, TreeMaterializer};
