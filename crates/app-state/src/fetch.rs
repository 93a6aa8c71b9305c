//! Generic async-operation-to-render-state bridge
//!
//! Every screen that needs server data mounts a [`Fetcher`] over an injected
//! [`Operation`] and renders from the resulting [`FetchState`]: `data`,
//! `loading`, `error`. The fetcher invokes the operation at mount, again on
//! demand through `refetch`, and again whenever the declared dependency set
//! changes its serialized fingerprint.
//!
//! Overlapping invocations are resolved with a monotonic request-id guard:
//! each invocation takes a generation number, and only the invocation that
//! is still newest when it settles may write state. Superseded results are
//! discarded. Once the owning fetcher is dropped, in-flight invocations can
//! no longer write state at all.

use async_trait::async_trait;
use parking_lot::Mutex;
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use thiserror::Error;
use tokio::sync::watch;

/// Failure of an injected operation, as surfaced through fetch state
///
/// Cloneable so the same failure can live in the published state and be
/// returned to a `refetch` caller.
#[derive(Debug, Clone, Error)]
#[error("{0}")]
pub struct OperationFailed(Arc<anyhow::Error>);

impl OperationFailed {
    fn new(err: anyhow::Error) -> Self {
        Self(Arc::new(err))
    }

    /// The failure message
    pub fn message(&self) -> String {
        self.0.to_string()
    }

    /// The underlying rejection reason
    pub fn reason(&self) -> &anyhow::Error {
        &self.0
    }
}

/// An injected asynchronous data operation
///
/// Contract: resolve with the already-parsed domain value on success and
/// return an error on failure — never resolve with an error-shaped value.
#[async_trait]
pub trait Operation: Send + Sync + 'static {
    /// Value produced on success
    type Output: Clone + Send + Sync + 'static;

    /// Arguments accepted on refetch; `()` for fully bound operations
    type Args: Clone + Default + Send + Sync + 'static;

    /// Run the operation
    async fn run(&self, args: Self::Args) -> anyhow::Result<Self::Output>;
}

/// Render-ready fetch state
///
/// After a failure, `data` keeps its last successful value so screens can
/// keep showing stale content next to the error affordance; callers must
/// check `error` before trusting `data`.
#[derive(Debug, Clone)]
pub struct FetchState<T> {
    /// Most recently resolved value, if any
    pub data: Option<T>,
    /// Whether the newest invocation is still outstanding
    pub loading: bool,
    /// Rejection reason of the most recent settled invocation, if it failed
    pub error: Option<OperationFailed>,
}

impl<T> FetchState<T> {
    fn idle(loading: bool) -> Self {
        Self { data: None, loading, error: None }
    }

    /// Whether the latest invocation has settled, success or failure
    pub fn is_settled(&self) -> bool {
        !self.loading && (self.data.is_some() || self.error.is_some())
    }

    /// Whether the latest settled invocation failed
    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}

impl<T> Default for FetchState<T> {
    fn default() -> Self {
        Self::idle(false)
    }
}

/// Declared dependency set of a fetcher
///
/// Values are serialized to JSON and compared by their serialized form, so
/// "changed" means exactly what it meant in the dashboard screens: the
/// fingerprint string differs. A value that fails to serialize participates
/// as JSON null.
#[derive(Debug, Clone, Default)]
pub struct DepSet {
    values: Vec<serde_json::Value>,
}

impl DepSet {
    /// An empty dependency set
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a dependency value
    pub fn with(mut self, value: impl Serialize) -> Self {
        match serde_json::to_value(&value) {
            Ok(v) => self.values.push(v),
            Err(e) => {
                tracing::warn!(error = %e, "dependency failed to serialize, treating as null");
                self.values.push(serde_json::Value::Null);
            }
        }
        self
    }

    /// Number of declared dependencies
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the set is empty
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Canonical serialized form used for change detection
    pub fn fingerprint(&self) -> String {
        serde_json::Value::Array(self.values.clone()).to_string()
    }
}

/// Fetcher configuration
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// Invoke the operation at mount and on dependency changes
    ///
    /// When false, the fetcher idles until `refetch` and dependency changes
    /// are recorded without invoking anything.
    pub immediate: bool,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self { immediate: true }
    }
}

struct Shared<T> {
    tx: watch::Sender<FetchState<T>>,
    generation: AtomicU64,
    deps: Mutex<String>,
}

/// Per-screen fetcher over an injected operation
///
/// Cloning produces another handle to the same fetch state. State lives as
/// long as any handle does; once the last handle is dropped, late
/// settlements from in-flight invocations are suppressed and subscribers
/// observe the channel closing.
pub struct Fetcher<O: Operation> {
    operation: Arc<O>,
    shared: Arc<Shared<O::Output>>,
    immediate: bool,
}

impl<O: Operation> Fetcher<O> {
    /// Mount a fetcher with its dependency set
    ///
    /// With `immediate` set (the default), the initial state is already
    /// `loading` and the first invocation is spawned before this returns.
    /// Must be called from within a tokio runtime.
    pub fn mount(operation: O, deps: DepSet, config: FetchConfig) -> Self {
        let (tx, _rx) = watch::channel(FetchState::idle(config.immediate));
        let fetcher = Self {
            operation: Arc::new(operation),
            shared: Arc::new(Shared {
                tx,
                generation: AtomicU64::new(0),
                deps: Mutex::new(deps.fingerprint()),
            }),
            immediate: config.immediate,
        };
        if config.immediate {
            fetcher.spawn_invocation();
        }
        fetcher
    }

    /// The mounted operation
    ///
    /// Operations with interior state (e.g., bound filters) are updated
    /// through this accessor before resubmitting the dependency set.
    pub fn operation(&self) -> &O {
        &self.operation
    }

    /// Current fetch state
    pub fn state(&self) -> FetchState<O::Output> {
        self.shared.tx.borrow().clone()
    }

    /// Subscribe to fetch state changes
    pub fn subscribe(&self) -> watch::Receiver<FetchState<O::Output>> {
        self.shared.tx.subscribe()
    }

    /// Re-invoke the operation on demand with default arguments
    pub async fn refetch(&self) -> Result<O::Output, OperationFailed> {
        self.refetch_with(O::Args::default()).await
    }

    /// Re-invoke the operation on demand with explicit arguments
    ///
    /// Transitions through `loading` even when data is already populated,
    /// and returns the settled outcome in addition to publishing it.
    pub async fn refetch_with(
        &self,
        args: O::Args,
    ) -> Result<O::Output, OperationFailed> {
        run_tracked(
            Arc::clone(&self.operation),
            Arc::downgrade(&self.shared),
            args,
        )
        .await
    }

    /// Submit the current dependency values
    ///
    /// A changed fingerprint triggers exactly one new invocation (when the
    /// fetcher is `immediate`); an unchanged fingerprint is a no-op no
    /// matter how often it is resubmitted.
    pub fn update_deps(&self, deps: DepSet) {
        let fingerprint = deps.fingerprint();
        {
            let mut current = self.shared.deps.lock();
            if *current == fingerprint {
                return;
            }
            *current = fingerprint;
        }
        if self.immediate {
            self.spawn_invocation();
        }
    }

    fn spawn_invocation(&self) {
        let operation = Arc::clone(&self.operation);
        let shared = Arc::downgrade(&self.shared);
        tokio::spawn(async move {
            let _ = run_tracked(operation, shared, O::Args::default()).await;
        });
    }
}

impl<O: Operation> Clone for Fetcher<O> {
    fn clone(&self) -> Self {
        Self {
            operation: Arc::clone(&self.operation),
            shared: Arc::clone(&self.shared),
            immediate: self.immediate,
        }
    }
}

/// Run one invocation under the request-id guard
///
/// Holds only a weak reference to the fetch state across the await point so
/// that a dropped fetcher cannot receive late updates.
async fn run_tracked<O: Operation>(
    operation: Arc<O>,
    shared: Weak<Shared<O::Output>>,
    args: O::Args,
) -> Result<O::Output, OperationFailed> {
    let generation = match shared.upgrade() {
        Some(state) => {
            let generation = state.generation.fetch_add(1, Ordering::SeqCst) + 1;
            state.tx.send_modify(|s| {
                s.loading = true;
                s.error = None;
            });
            generation
        }
        None => {
            return Err(OperationFailed::new(anyhow::anyhow!(
                "fetcher dropped before invocation started"
            )))
        }
    };

    match operation.run(args).await {
        Ok(value) => {
            if let Some(state) = shared.upgrade() {
                if state.generation.load(Ordering::SeqCst) == generation {
                    tracing::debug!(generation, "fetch settled: success");
                    let value = value.clone();
                    state.tx.send_modify(move |s| {
                        s.loading = false;
                        s.error = None;
                        s.data = Some(value);
                    });
                } else {
                    tracing::debug!(generation, "fetch superseded, result discarded");
                }
            }
            Ok(value)
        }
        Err(err) => {
            let failure = OperationFailed::new(err);
            if let Some(state) = shared.upgrade() {
                if state.generation.load(Ordering::SeqCst) == generation {
                    tracing::debug!(generation, error = %failure, "fetch settled: failure");
                    let failure = failure.clone();
                    state.tx.send_modify(move |s| {
                        s.loading = false;
                        s.error = Some(failure);
                    });
                } else {
                    tracing::debug!(generation, "fetch superseded, error discarded");
                }
            }
            Err(failure)
        }
    }
}
