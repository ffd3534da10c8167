pub mod device;
pub mod documents;
pub mod error;
pub mod provisioning;
pub mod slots;

// Re-export commonly used types for convenience.
pub use device::{AppConfig, CapacityPolicy, DeviceLayout, DeviceType};
pub use error::{ErrorKind, ProvisionError, ProvisionResult};
pub use provisioning::{ExistingTreePolicy, ProvisionRequest, ProvisionSummary, Provisioner};
pub use slots::{NamingPolicy, SlotBinding};
