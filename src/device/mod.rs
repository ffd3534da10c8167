pub mod config;
pub mod layout;

pub use config::{
    config_dir, config_file_path, load_from, load_or_default, save, AppConfig, CapacityMode,
    DeviceSettings, EventSettings, PathSettings, PlacementSettings, CONFIG_FILE_NAME,
};
pub use layout::{
    slot_dir_name, CapacityPolicy, DeviceLayout, DeviceType, SlotLayout, DEFAULT_SLOT_CAPACITY,
    EVENTS_FILE_NAME, MANIFEST_FILE_NAME, PATCH_DESCRIPTOR_FILE, PHRASE_DESCRIPTOR_FILE,
    PHRASE_SUBDIR,
};
