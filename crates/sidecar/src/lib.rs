//! Sidecar collaborators around the mapping engine.
//!
//! The engine itself is a pure function; this crate provides the pieces
//! that feed and consume it next to a running store instance:
//! - Instance metadata and the per-instance store delegate
//! - The topology collector boundary
//! - A fixed-interval periodic task runner and the health-check task
//! - A copy-on-write cache of last-computed mappings

pub mod cache;
pub mod collector;
pub mod config;
pub mod error;
pub mod health;
pub mod instance;
pub mod tasks;

pub use cache::MappingCache;
pub use collector::{refresh_mapping, TopologyCollector};
pub use config::{HealthCheckConfig, SidecarConfig};
pub use error::SidecarError;
pub use health::HealthCheckTask;
pub use instance::{InstanceList, InstanceMetadata, StoreDelegate};
pub use tasks::PeriodicTask;
