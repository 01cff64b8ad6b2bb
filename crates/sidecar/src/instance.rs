//! Metadata for the store instances this sidecar manages.

use crate::error::SidecarError;
use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;

/// Connection to one managed store instance.
///
/// The real implementation speaks the store's management interface; the
/// sidecar only needs it to answer a liveness probe here.
#[async_trait]
pub trait StoreDelegate: Send + Sync {
    /// Probe the instance. An error marks this instance unhealthy but
    /// has no effect on any other instance's check.
    async fn health_check(&self) -> Result<(), SidecarError>;
}

/// Metadata of a managed instance.
///
/// The delegate is optional at construction because the sidecar starts
/// serving before the store process is necessarily reachable; accessing
/// it reports `InstanceUnavailable` until a connection exists.
#[derive(Clone)]
pub struct InstanceMetadata {
    id: u32,
    host: String,
    port: u16,
    delegate: Option<Arc<dyn StoreDelegate>>,
}

impl InstanceMetadata {
    pub fn new(
        id: u32,
        host: impl Into<String>,
        port: u16,
        delegate: Option<Arc<dyn StoreDelegate>>,
    ) -> Self {
        Self {
            id,
            host: host.into(),
            port,
            delegate,
        }
    }

    pub fn id(&self) -> u32 {
        self.id
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// The instance's delegate, or `InstanceUnavailable` when the store
    /// cannot currently be reached.
    pub fn delegate(&self) -> Result<Arc<dyn StoreDelegate>, SidecarError> {
        self.delegate
            .clone()
            .ok_or_else(|| SidecarError::InstanceUnavailable {
                id: self.id,
                reason: "no active connection to the store".into(),
            })
    }
}

impl fmt::Debug for InstanceMetadata {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InstanceMetadata")
            .field("id", &self.id)
            .field("host", &self.host)
            .field("port", &self.port)
            .field("connected", &self.delegate.is_some())
            .finish()
    }
}

/// Enumerates the instances managed by this sidecar.
///
/// Enumeration failure is the one fatal error of a health-check cycle;
/// per-instance failures are isolated by the task itself.
pub trait InstanceList: Send + Sync {
    fn instances(&self) -> Result<Vec<InstanceMetadata>, SidecarError>;
}
