//! The topology collector boundary.

use crate::cache::MappingCache;
use async_trait::async_trait;
use corelib::snapshot::RingSnapshot;
use replication::TokenRangeMap;
use std::sync::Arc;
use tracing::debug;

/// Captures ring snapshots from the underlying store.
///
/// Implementations talk to the store's management interface; the engine
/// never does. When the store is unreachable the collector reports
/// `TopologyUnavailable` — the engine must not guess from stale data,
/// so the error is surfaced upward unchanged and never retried here.
#[async_trait]
pub trait TopologyCollector: Send + Sync {
    async fn snapshot(&self, keyspace: &str) -> corelib::Result<RingSnapshot>;
}

/// Capture a fresh snapshot, compute the mapping for `keyspace`, and
/// publish it to the cache.
pub async fn refresh_mapping(
    collector: &dyn TopologyCollector,
    cache: &MappingCache,
    keyspace: &str,
) -> corelib::Result<Arc<TokenRangeMap>> {
    let snapshot = collector.snapshot(keyspace).await?;
    let mapping = Arc::new(replication::compute_mapping(&snapshot, keyspace)?);
    cache.store(keyspace, mapping.clone());
    debug!(keyspace, captured_at = snapshot.captured_at_millis, "refreshed mapping");
    Ok(mapping)
}

#[cfg(test)]
mod tests {
    use super::*;
    use corelib::node::Node;
    use corelib::snapshot::ReplicationConfig;
    use corelib::token::Murmur3Token;
    use corelib::Error;
    use std::collections::BTreeMap;

    struct StaticCollector {
        snapshot: RingSnapshot,
    }

    #[async_trait]
    impl TopologyCollector for StaticCollector {
        async fn snapshot(&self, _keyspace: &str) -> corelib::Result<RingSnapshot> {
            Ok(self.snapshot.clone())
        }
    }

    struct OfflineCollector;

    #[async_trait]
    impl TopologyCollector for OfflineCollector {
        async fn snapshot(&self, _keyspace: &str) -> corelib::Result<RingSnapshot> {
            Err(Error::TopologyUnavailable("store is not reachable".into()))
        }
    }

    fn snapshot() -> RingSnapshot {
        let mut keyspaces = BTreeMap::new();
        keyspaces.insert("ks".to_string(), ReplicationConfig::simple(1));
        RingSnapshot::new(
            vec![Node::new("10.0.0.1", "dc1", "r1", vec![Murmur3Token(0)])],
            keyspaces,
            1_700_000_000_000,
        )
    }

    #[tokio::test]
    async fn test_refresh_publishes_to_cache() {
        let collector = StaticCollector { snapshot: snapshot() };
        let cache = MappingCache::new();

        let mapping = refresh_mapping(&collector, &cache, "ks").await.unwrap();
        assert_eq!(cache.get("ks").as_deref(), Some(&*mapping));
    }

    #[tokio::test]
    async fn test_unavailable_topology_surfaces_unchanged() {
        let cache = MappingCache::new();
        let result = refresh_mapping(&OfflineCollector, &cache, "ks").await;
        assert!(matches!(result, Err(Error::TopologyUnavailable(_))));
        assert!(cache.get("ks").is_none());
    }
}
