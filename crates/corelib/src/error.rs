//! Error types for the core library.

/// Result type alias for the core library.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while computing a token range mapping.
///
/// All three variants are terminal for a single computation: the engine
/// never returns a partial mapping and never substitutes defaults for
/// missing topology data.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// The snapshot itself is inconsistent: token collision between two
    /// normal nodes, an empty ring, or conflicting transient roles.
    #[error("invalid topology: {0}")]
    InvalidTopology(String),
    /// The replication configuration names a strategy kind the engine
    /// does not implement.
    #[error("unsupported replication strategy: {0}")]
    UnsupportedStrategy(String),
    /// The underlying store could not be reached to capture a snapshot.
    /// Propagated unchanged from the topology collector; retry policy
    /// belongs to the caller.
    #[error("topology unavailable: {0}")]
    TopologyUnavailable(String),
}
