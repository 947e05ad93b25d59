//! Storage repositories
//!
//! Provides the durable key-value settings layer.

pub mod settings;

pub use settings::{FileSettingsStore, MemorySettingsStore, SettingsStore};
