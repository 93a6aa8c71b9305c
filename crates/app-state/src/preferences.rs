//! Shared preference store
//!
//! Single source of truth for the display mode and the active role, shared
//! across the dashboard by handing out cheap clones of the store. Consumers
//! read the current [`PreferenceSnapshot`] or subscribe through a watch
//! channel; every mutation publishes synchronously and schedules a debounced
//! best-effort write to device storage.
//!
//! The store is constructed explicitly at the composition root and injected
//! into whatever needs it. There is no ambient global to reach for, so the
//! classic "used outside its provider" failure cannot be expressed; the one
//! remaining wiring hazard (a subscriber outliving every store handle)
//! surfaces loudly as [`PreferencesError::StoreClosed`].

use crate::debounce::Debouncer;
use parking_lot::RwLock;
use std::sync::Arc;
use std::time::Duration;
use storage::{DeviceStore, KvStore, ThemeMode, UserRole, KEY_THEME, KEY_USER_ROLE};
use thiserror::Error;
use tokio::sync::watch;

/// Preference store errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PreferencesError {
    /// Every handle to the store has been dropped
    #[error("Preference store closed")]
    StoreClosed,
}

/// System color-scheme probe
///
/// Injected so that the first-load fallback can be driven by the platform
/// (and mocked in tests). Consulted only when no mode has been persisted.
#[cfg_attr(test, mockall::automock)]
pub trait SystemScheme: Send + Sync {
    /// Whether the platform currently prefers a dark color scheme
    fn prefers_dark(&self) -> bool;
}

/// A fixed system scheme, for platforms without a probe and for tests
pub struct FixedScheme(pub bool);

impl SystemScheme for FixedScheme {
    fn prefers_dark(&self) -> bool {
        self.0
    }
}

/// The mutable preference state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
struct PreferenceState {
    mode: ThemeMode,
    role: UserRole,
}

/// Read-only view of the current preferences with the derived display values
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreferenceSnapshot {
    /// Current display mode
    pub mode: ThemeMode,
    /// Current role
    pub role: UserRole,
    /// Accent color derived from the role
    pub accent_color: &'static str,
    /// Value for the document-level `color-scheme` marker
    pub color_scheme: &'static str,
    /// CSS class for the role, applied at the document root
    pub role_class: &'static str,
}

impl PreferenceSnapshot {
    fn from_state(state: PreferenceState) -> Self {
        Self {
            mode: state.mode,
            role: state.role,
            accent_color: state.role.accent_color(),
            color_scheme: state.mode.color_scheme(),
            role_class: state.role.css_class(),
        }
    }

    /// Class list to apply at the document root
    pub fn root_classes(&self) -> Vec<&'static str> {
        if self.mode.is_dark() {
            vec!["dark", self.role_class]
        } else {
            vec![self.role_class]
        }
    }
}

/// Preference store configuration
#[derive(Debug, Clone)]
pub struct PreferenceConfig {
    /// Quiet period for coalescing persistence writes
    pub write_debounce: Duration,
}

impl Default for PreferenceConfig {
    fn default() -> Self {
        Self { write_debounce: Duration::from_millis(50) }
    }
}

struct StoreInner {
    state: RwLock<PreferenceState>,
    tx: watch::Sender<PreferenceSnapshot>,
    device: Option<DeviceStore>,
    writer: Debouncer,
}

/// Shared preference store
///
/// Cloning is cheap and every clone operates on the same state. Dropping the
/// last clone cancels any pending persistence write and closes all
/// subscriptions.
pub struct PreferenceStore {
    inner: Arc<StoreInner>,
}

impl PreferenceStore {
    /// Open a store backed by device storage
    ///
    /// Loads the persisted mode and role. A missing mode falls back to the
    /// system color scheme; a missing or unrecognized role falls back to
    /// `Student`. Read failures degrade to those same defaults for the
    /// session rather than failing construction.
    pub fn open(
        kv: Arc<KvStore>,
        system: &dyn SystemScheme,
        config: PreferenceConfig,
    ) -> Self {
        let device = DeviceStore::new(kv);

        let mode = match device.get::<ThemeMode>(KEY_THEME) {
            Ok(Some(mode)) => mode,
            Ok(None) => Self::system_default(system),
            Err(e) => {
                tracing::warn!(error = %e, "stored theme unreadable, using system default");
                Self::system_default(system)
            }
        };

        let role = match device.get::<String>(KEY_USER_ROLE) {
            Ok(Some(raw)) => UserRole::parse_lenient(&raw),
            Ok(None) => UserRole::default(),
            Err(e) => {
                tracing::warn!(error = %e, "stored role unreadable, defaulting to student");
                UserRole::default()
            }
        };

        Self::with_parts(PreferenceState { mode, role }, Some(device), config)
    }

    /// Create a session-only store with no persistence
    ///
    /// Used when device storage is unavailable; preferences live for the
    /// process and are lost on exit.
    pub fn in_memory(system: &dyn SystemScheme, config: PreferenceConfig) -> Self {
        let state = PreferenceState {
            mode: Self::system_default(system),
            role: UserRole::default(),
        };
        Self::with_parts(state, None, config)
    }

    fn with_parts(
        state: PreferenceState,
        device: Option<DeviceStore>,
        config: PreferenceConfig,
    ) -> Self {
        let (tx, _rx) = watch::channel(PreferenceSnapshot::from_state(state));
        Self {
            inner: Arc::new(StoreInner {
                state: RwLock::new(state),
                tx,
                device,
                writer: Debouncer::new(config.write_debounce),
            }),
        }
    }

    fn system_default(system: &dyn SystemScheme) -> ThemeMode {
        if system.prefers_dark() {
            ThemeMode::Dark
        } else {
            ThemeMode::Light
        }
    }

    /// Current preferences with derived display values
    pub fn snapshot(&self) -> PreferenceSnapshot {
        self.inner.tx.borrow().clone()
    }

    /// Current display mode
    pub fn mode(&self) -> ThemeMode {
        self.inner.state.read().mode
    }

    /// Current role
    pub fn role(&self) -> UserRole {
        self.inner.state.read().role
    }

    /// Flip between light and dark, returning the new mode
    pub fn toggle_mode(&self) -> ThemeMode {
        let state = {
            let mut state = self.inner.state.write();
            state.mode = state.mode.toggled();
            *state
        };
        self.publish(state);
        state.mode
    }

    /// Set the display mode
    pub fn set_mode(&self, mode: ThemeMode) {
        let state = {
            let mut state = self.inner.state.write();
            state.mode = mode;
            *state
        };
        self.publish(state);
    }

    /// Set the role, returning the new snapshot with its derived accent color
    pub fn set_role(&self, role: UserRole) -> PreferenceSnapshot {
        let state = {
            let mut state = self.inner.state.write();
            state.role = role;
            *state
        };
        self.publish(state)
    }

    /// Subscribe to preference changes
    pub fn subscribe(&self) -> PreferenceWatcher {
        PreferenceWatcher { rx: self.inner.tx.subscribe() }
    }

    /// Force any pending persistence write through immediately
    pub fn flush(&self) {
        self.inner.writer.flush();
    }

    fn publish(&self, state: PreferenceState) -> PreferenceSnapshot {
        let snapshot = PreferenceSnapshot::from_state(state);
        self.inner.tx.send_replace(snapshot.clone());
        self.schedule_persist(state);
        snapshot
    }

    fn schedule_persist(&self, state: PreferenceState) {
        let Some(device) = self.inner.device.clone() else {
            return;
        };
        self.inner.writer.call(move || {
            if let Err(e) = device.set(KEY_THEME, &state.mode) {
                tracing::warn!(error = %e, "failed to persist theme");
            }
            if let Err(e) = device.set(KEY_USER_ROLE, &state.role) {
                tracing::warn!(error = %e, "failed to persist role");
            }
        });
    }
}

impl Clone for PreferenceStore {
    fn clone(&self) -> Self {
        Self { inner: Arc::clone(&self.inner) }
    }
}

/// Subscription to preference changes
pub struct PreferenceWatcher {
    rx: watch::Receiver<PreferenceSnapshot>,
}

impl PreferenceWatcher {
    /// The most recently published snapshot
    pub fn current(&self) -> PreferenceSnapshot {
        self.rx.borrow().clone()
    }

    /// Wait for the next change and return the new snapshot
    ///
    /// Fails with [`PreferencesError::StoreClosed`] once every store handle
    /// has been dropped; a watcher that hits this has outlived the store it
    /// was wired to.
    pub async fn changed(&mut self) -> Result<PreferenceSnapshot, PreferencesError> {
        self.rx
            .changed()
            .await
            .map_err(|_| PreferencesError::StoreClosed)?;
        Ok(self.rx.borrow_and_update().clone())
    }
}
