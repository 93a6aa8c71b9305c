//! Storage layer for Lectern
//!
//! This crate provides the durable key-value store used for device-local
//! persistence, plus the schema of the settings that are persisted in it.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod kv;
pub mod settings;

pub use kv::{DeviceStore, KvConfig, KvError, KvStore};
pub use settings::{ThemeMode, UserRole, KEY_THEME, KEY_USER_ROLE};
