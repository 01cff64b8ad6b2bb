//! Error types for the sidecar collaborators.

/// Errors raised by the sidecar's own plumbing, distinct from the
/// mapping engine's `corelib::Error` taxonomy.
#[derive(Debug, Clone, thiserror::Error)]
pub enum SidecarError {
    /// The managed instance's delegate could not be resolved.
    #[error("instance {id} unavailable: {reason}")]
    InstanceUnavailable { id: u32, reason: String },
    /// A health-check cycle attempted every instance but could not
    /// resolve one or more of them.
    #[error("health check cycle failed: {0}")]
    HealthCheck(String),
    /// The instance list itself could not be enumerated. Fatal to the
    /// enclosing cycle.
    #[error("failed to enumerate instances: {0}")]
    InstanceList(String),
}
