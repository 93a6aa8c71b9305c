//! Reactive client state for Lectern
//!
//! This crate provides the two state primitives the dashboard shell is built
//! on: a shared preference store (display mode + role, persisted with
//! debounced writes) and a generic fetcher that turns any injected async
//! operation into render-ready `{data, loading, error}` state.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod debounce;
pub mod fetch;
pub mod preferences;

pub use debounce::Debouncer;
pub use fetch::{
    DepSet, FetchConfig, FetchState, Fetcher, Operation, OperationFailed,
};
pub use preferences::{
    FixedScheme, PreferenceConfig, PreferenceSnapshot, PreferenceStore,
    PreferenceWatcher, PreferencesError, SystemScheme,
};
