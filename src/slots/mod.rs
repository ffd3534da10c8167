//! Slot assignment and file placement.
//!
//! The assignor turns a flat folder of audio files into an ordered list of
//! [`SlotBinding`]s; placement copies each bound file into its slot.

pub mod assign;
pub mod placement;

pub use assign::{SlotAssignor, SlotBinding};
pub use placement::{place_file, validate_canonical_name, NamingPolicy};
