pub mod descriptor;
pub mod manifest;
pub mod verify;

pub use descriptor::{
    DescriptorDefaults, DescriptorPaths, DescriptorWriter, PatchDescriptor, PhraseDescriptor,
};
pub use manifest::{hash_path, read_manifest, ManifestRow, ManifestWriter, MANIFEST_HEADER};
pub use verify::{verify_card, VerifyOptions, VerifyReport};
