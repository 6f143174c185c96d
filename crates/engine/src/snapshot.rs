//! Read-through cache of the installed plugin list.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use plugbay_core::{InstalledPluginRecord, Result};

use crate::service::PluginRegistry;

/// Shared snapshot of installed plugins.
///
/// Clones share the same slot, so invalidating one handle invalidates all.
#[derive(Debug, Clone, Default)]
pub struct InstalledSnapshot {
    slot: Arc<Mutex<Slot>>,
}

#[derive(Debug, Default)]
struct Slot {
    /// Bumped by every invalidation.
    generation: u64,
    records: Option<Arc<[InstalledPluginRecord]>>,
}

impl InstalledSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached list, fetching it from `registry` if invalid.
    ///
    /// A fetch overtaken by `invalidate` is returned but not cached.
    pub async fn get(&self, registry: &dyn PluginRegistry) -> Result<Arc<[InstalledPluginRecord]>> {
        let generation = {
            let slot = self.lock();
            if let Some(records) = &slot.records {
                return Ok(Arc::clone(records));
            }
            slot.generation
        };

        let records: Arc<[InstalledPluginRecord]> = registry.list_installed().await?.into();

        let mut slot = self.lock();
        if slot.generation == generation {
            tracing::debug!(count = records.len(), "installed plugin snapshot refreshed");
            slot.records = Some(Arc::clone(&records));
        } else {
            tracing::debug!("installed plugin snapshot went stale during fetch");
        }
        Ok(records)
    }

    /// Returns the cached list without fetching.
    pub fn cached(&self) -> Option<Arc<[InstalledPluginRecord]>> {
        self.lock().records.clone()
    }

    /// Drops the cached list so the next read refetches.
    pub fn invalidate(&self) {
        let mut slot = self.lock();
        slot.generation = slot.generation.wrapping_add(1);
        if slot.records.take().is_some() {
            tracing::debug!("installed plugin snapshot invalidated");
        }
    }

    fn lock(&self) -> MutexGuard<'_, Slot> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use plugbay_core::{InstallSource, PluginCategory, PluginIdentity};
    use tokio::sync::Notify;

    use super::*;

    fn record(installation_id: String) -> InstalledPluginRecord {
        InstalledPluginRecord::new(
            installation_id,
            PluginIdentity::new("acme", "search", "1.0.0"),
            PluginCategory::Tool,
            InstallSource::Marketplace,
        )
    }

    #[derive(Default)]
    struct CountingRegistry {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl PluginRegistry for CountingRegistry {
        async fn list_installed(&self) -> Result<Vec<InstalledPluginRecord>> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(vec![record(format!("inst-{n}"))])
        }
    }

    /// Holds each listing until `release` is notified.
    #[derive(Default)]
    struct GatedRegistry {
        entered: Notify,
        release: Notify,
    }

    #[async_trait]
    impl PluginRegistry for GatedRegistry {
        async fn list_installed(&self) -> Result<Vec<InstalledPluginRecord>> {
            self.entered.notify_one();
            self.release.notified().await;
            Ok(vec![record("inst-old".to_string())])
        }
    }

    #[tokio::test]
    async fn test_reads_through_once_until_invalidated() {
        let registry = CountingRegistry::default();
        let snapshot = InstalledSnapshot::new();

        let first = snapshot.get(&registry).await.unwrap();
        let second = snapshot.get(&registry).await.unwrap();
        assert_eq!(registry.calls.load(Ordering::SeqCst), 1);
        assert_eq!(first[0].installation_id, second[0].installation_id);

        snapshot.clone().invalidate();
        assert!(snapshot.cached().is_none());

        let third = snapshot.get(&registry).await.unwrap();
        assert_eq!(registry.calls.load(Ordering::SeqCst), 2);
        assert_eq!(third[0].installation_id, "inst-1");
    }

    #[tokio::test]
    async fn test_invalidation_during_fetch_is_not_lost() {
        let registry = Arc::new(GatedRegistry::default());
        let snapshot = InstalledSnapshot::new();

        let reader = {
            let registry = Arc::clone(&registry);
            let snapshot = snapshot.clone();
            tokio::spawn(async move { snapshot.get(registry.as_ref()).await })
        };

        registry.entered.notified().await;
        snapshot.invalidate();
        registry.release.notify_one();

        let listed = reader.await.unwrap().unwrap();
        assert_eq!(listed[0].installation_id, "inst-old");
        assert!(snapshot.cached().is_none());
    }
}
