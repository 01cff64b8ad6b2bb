//! Replication strategy resolution.
//!
//! Strategies determine how many replicas each range gets and where they
//! are placed on the ring:
//!
//! - **Simple**: the first RF distinct nodes clockwise from the range
//!   start, datacenter-agnostic.
//! - **NetworkTopology**: a per-datacenter replication factor with rack
//!   diversity inside each datacenter.
//!
//! The two variants are closed and stable, so the walk is dispatched with
//! a branch on the tag rather than trait objects.

pub mod network_topology;
pub mod simple;

use corelib::error::{Error, Result};
use corelib::node::Node;
use corelib::snapshot::ReplicationConfig;
use corelib::token::Murmur3Token;
use corelib::TokenRing;
use std::collections::BTreeMap;

/// A parsed, validated replication strategy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Strategy {
    Simple {
        replication_factor: usize,
    },
    NetworkTopology {
        /// Datacenter name to replication factor.
        datacenters: BTreeMap<String, usize>,
    },
}

impl Strategy {
    /// Parse the raw per-keyspace configuration.
    ///
    /// Accepts the short and fully-qualified class names the store uses.
    /// Anything else is `UnsupportedStrategy`; a recognized class with a
    /// malformed factor is `InvalidTopology`.
    pub fn from_config(config: &ReplicationConfig) -> Result<Self> {
        let class = config.class.rsplit('.').next().unwrap_or(&config.class);
        match class {
            "SimpleStrategy" => {
                let replication_factor = config.replication_factor.ok_or_else(|| {
                    Error::InvalidTopology("SimpleStrategy without a replication factor".into())
                })?;
                if replication_factor == 0 {
                    return Err(Error::InvalidTopology(
                        "replication factor must be at least 1".into(),
                    ));
                }
                Ok(Strategy::Simple { replication_factor })
            }
            "NetworkTopologyStrategy" => {
                if config.datacenters.is_empty() {
                    return Err(Error::InvalidTopology(
                        "NetworkTopologyStrategy without datacenter factors".into(),
                    ));
                }
                if let Some((dc, _)) = config.datacenters.iter().find(|(_, rf)| **rf == 0) {
                    return Err(Error::InvalidTopology(format!(
                        "replication factor for {} must be at least 1",
                        dc
                    )));
                }
                Ok(Strategy::NetworkTopology {
                    datacenters: config.datacenters.clone(),
                })
            }
            other => Err(Error::UnsupportedStrategy(other.to_string())),
        }
    }

    /// Natural replicas for the range starting at `range_start`.
    ///
    /// Walks the steady-state ring clockwise starting just after the
    /// boundary. For a fixed snapshot and boundary, the output ordering
    /// is a deterministic function of ring position; clients observe a
    /// stable replica order across repeated computations.
    ///
    /// A ring with fewer distinct nodes (or racks, or datacenters) than
    /// the configured factor yields a shorter list. That is the store's
    /// own placement behavior under under-provisioning, not an error.
    pub fn natural_replicas<'a>(
        &self,
        range_start: Murmur3Token,
        ring: &TokenRing<'a>,
    ) -> Vec<&'a Node> {
        match self {
            Strategy::Simple { replication_factor } => {
                simple::natural_replicas(range_start, *replication_factor, ring)
            }
            Strategy::NetworkTopology { datacenters } => {
                network_topology::natural_replicas(range_start, datacenters, ring)
            }
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Strategy::Simple { .. } => "SimpleStrategy",
            Strategy::NetworkTopology { .. } => "NetworkTopologyStrategy",
        }
    }
}
