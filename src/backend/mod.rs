// Copyright (c) 2025 - Cowboy AI, Inc.
//! Provisioning backend hand-off
//!
//! Assembly stops at a validated [`ResourceGraph`]. Turning that graph into
//! real resources is the job of a [`ProvisioningBackend`], which receives
//! the graph read-only.
//!
//! # Example
//!
//! ```rust,no_run
//! use cim_network_topology::backend::{ProvisioningBackend, RecordingBackend};
//! # async fn run(graph: cim_network_topology::ResourceGraph) {
//! let backend = RecordingBackend::new();
//! backend.submit(&graph).await.unwrap();
//! assert_eq!(backend.submissions().len(), 1);
//! # }
//! ```

pub mod nats;

use async_trait::async_trait;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::debug;

use crate::errors::BackendResult;
use crate::graph::ResourceGraph;

pub use nats::{NatsBackend, NatsConfig};

/// Receiver of assembled topologies
#[async_trait]
pub trait ProvisioningBackend: Send + Sync {
    /// Hand a validated graph to the backend
    ///
    /// Submitting the same graph twice must be safe; backends key on the
    /// topology id.
    async fn submit(&self, graph: &ResourceGraph) -> BackendResult<()>;

    /// Verify the backend is reachable
    async fn health_check(&self) -> BackendResult<()>;

    fn name(&self) -> &str;
}

/// In-memory backend keeping every submitted graph
///
/// Clones share the same record.
#[derive(Debug, Clone, Default)]
pub struct RecordingBackend {
    submissions: Arc<Mutex<Vec<ResourceGraph>>>,
}

impl RecordingBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Graphs received so far, in submission order
    pub fn submissions(&self) -> Vec<ResourceGraph> {
        self.record().clone()
    }

    // The record is append-only, so a panicked holder cannot leave it torn
    fn record(&self) -> MutexGuard<'_, Vec<ResourceGraph>> {
        self.submissions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// The most recent graph for a stack
    pub fn latest(&self, stack_name: &str) -> Option<ResourceGraph> {
        self.submissions()
            .into_iter()
            .rev()
            .find(|g| g.stack_name == stack_name)
    }
}

#[async_trait]
impl ProvisioningBackend for RecordingBackend {
    async fn submit(&self, graph: &ResourceGraph) -> BackendResult<()> {
        let mut graphs = self.record();

        if graphs.iter().any(|g| g == graph) {
            debug!(stack = %graph.stack_name, "graph already recorded");
            return Ok(());
        }
        debug!(stack = %graph.stack_name, topology_id = %graph.id, "recorded graph");
        graphs.push(graph.clone());
        Ok(())
    }

    async fn health_check(&self) -> BackendResult<()> {
        Ok(())
    }

    fn name(&self) -> &str {
        "recording"
    }
}
