//! Archive trigger generation

mod trigger;

pub use trigger::{archive_trigger, ArchiveTrigger};
