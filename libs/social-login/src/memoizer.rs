//! Load-once memoization per provider
//!
//! The first caller for a provider creates a shared load future and stores it
//! before anything polls it. Every later caller, concurrent or not, awaits a
//! clone of that same future, so an adapter's `load` runs once per entry and all
//! waiters observe one outcome. The first caller's options win.
//!
//! ```text
//!            ┌──────────┐ first call  ┌─────────┐ Ok  ┌────────┐
//! (absent) ─►│ Unloaded │────────────►│ Loading │────►│ Loaded │
//!            └──────────┘             └─────────┘     └────────┘
//!                  ▲                       │ Err
//!                  │ RetryOnNextCall  ┌────▼───┐
//!                  └──────────────────│ Failed │ (Poison: replayed forever)
//!                                     └────────┘
//! ```

use crate::error::{SocialError, SocialResult};
use crate::host::lock;
use crate::options::LoadOptions;
use crate::provider::ProviderId;
use crate::registry::Adapter;
use futures::FutureExt;
use futures::future::{BoxFuture, Shared};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

/// What happens to a provider whose load failed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadPolicy {
    /// Keep the failed load; every later call gets the same error
    #[default]
    Poison,
    /// Forget the failed load; the next call runs `load` again
    RetryOnNextCall,
}

/// Load lifecycle of a provider
#[derive(Debug, Clone, PartialEq)]
pub enum LoadState {
    Unloaded,
    Loading,
    Loaded,
    Failed(SocialError),
}

impl LoadState {
    pub fn is_loaded(&self) -> bool {
        matches!(self, Self::Loaded)
    }
}

type SharedLoad = Shared<BoxFuture<'static, SocialResult<()>>>;

struct LoadEntry {
    generation: u64,
    load: SharedLoad,
}

/// Per-provider memo of pending or settled loads
///
/// The map lock is only held to look up or insert an entry, never across an
/// await. Providers have independent entries and never wait on each other.
pub struct LoadMemoizer {
    policy: LoadPolicy,
    entries: Mutex<HashMap<ProviderId, LoadEntry>>,
    generations: AtomicU64,
}

impl LoadMemoizer {
    pub fn new(policy: LoadPolicy) -> Self {
        Self {
            policy,
            entries: Mutex::new(HashMap::new()),
            generations: AtomicU64::new(0),
        }
    }

    pub fn policy(&self) -> LoadPolicy {
        self.policy
    }

    /// Load `adapter` unless a load for its provider already exists, then await it
    pub async fn ensure_loaded(
        &self,
        adapter: &Arc<Adapter>,
        options: &LoadOptions,
    ) -> SocialResult<()> {
        let id = adapter.id();
        let (generation, load) = self.entry(id, adapter, options);

        let outcome = load.await;

        if let Err(err) = &outcome
            && self.policy == LoadPolicy::RetryOnNextCall
        {
            let mut entries = lock(&self.entries);
            // A concurrent caller may already have replaced the failed entry
            if entries.get(&id).is_some_and(|e| e.generation == generation) {
                tracing::debug!("Dropping failed {} load: {}", id, err);
                entries.remove(&id);
            }
        }

        outcome
    }

    fn entry(
        &self,
        id: ProviderId,
        adapter: &Arc<Adapter>,
        options: &LoadOptions,
    ) -> (u64, SharedLoad) {
        let mut entries = lock(&self.entries);

        if let Some(entry) = entries.get(&id) {
            if let Some(Err(err)) = entry.load.peek() {
                tracing::debug!("Replaying failed {} load: {}", id, err);
            }
            return (entry.generation, entry.load.clone());
        }

        let generation = self.generations.fetch_add(1, Ordering::Relaxed);
        let adapter = Arc::clone(adapter);
        let options = options.clone();
        let load = async move {
            tracing::debug!("Loading {} provider", id);
            let outcome = adapter.load(&options).await;
            match &outcome {
                Ok(()) => tracing::info!("Loaded {} provider", id),
                Err(err) => tracing::warn!("Failed to load {} provider: {}", id, err),
            }
            outcome
        }
        .boxed()
        .shared();

        entries.insert(
            id,
            LoadEntry {
                generation,
                load: load.clone(),
            },
        );
        (generation, load)
    }

    /// Current load state of a provider
    pub fn state(&self, id: ProviderId) -> LoadState {
        let entries = lock(&self.entries);
        match entries.get(&id).map(|entry| entry.load.peek()) {
            None => LoadState::Unloaded,
            Some(None) => LoadState::Loading,
            Some(Some(Ok(()))) => LoadState::Loaded,
            Some(Some(Err(err))) => LoadState::Failed(err.clone()),
        }
    }
}

impl Default for LoadMemoizer {
    fn default() -> Self {
        Self::new(LoadPolicy::default())
    }
}
