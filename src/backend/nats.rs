// Copyright (c) 2025 - Cowboy AI, Inc.
//! NATS provisioning backend
//!
//! Publishes each submitted graph as JSON on `topology.<stack>.submitted`
//! for whatever provisioner subscribes downstream.

use async_nats::connection::State;
use async_nats::{Client, ConnectOptions};
use async_trait::async_trait;
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, info};

use super::ProvisioningBackend;
use crate::domain::TopologyId;
use crate::errors::{BackendError, BackendResult};
use crate::graph::ResourceGraph;
use crate::subjects::{SubjectBuilder, TopologyEvent};

/// Configuration for the NATS connection
#[derive(Debug, Clone)]
pub struct NatsConfig {
    /// NATS server URLs
    pub servers: Vec<String>,
    /// Client name
    pub name: String,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
}

impl Default for NatsConfig {
    fn default() -> Self {
        Self {
            servers: vec!["nats://localhost:4222".to_string()],
            name: "topology-assembler".to_string(),
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(5),
        }
    }
}

impl NatsConfig {
    /// Connect to a comma separated server list such as `NATS_URL`
    pub fn from_url(url: &str) -> Self {
        Self {
            servers: url
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
                .collect(),
            ..Self::default()
        }
    }
}

/// Message published for every submission
#[derive(Debug, Serialize)]
pub struct TopologySubmitted<'a> {
    pub topology_id: TopologyId,
    pub stack_name: &'a str,
    pub graph: &'a ResourceGraph,
}

impl<'a> TopologySubmitted<'a> {
    pub fn new(graph: &'a ResourceGraph) -> Self {
        Self {
            topology_id: graph.id,
            stack_name: &graph.stack_name,
            graph,
        }
    }

    pub fn subject(&self) -> String {
        SubjectBuilder::new(self.stack_name)
            .event(TopologyEvent::Submitted)
            .build()
    }
}

#[derive(Clone)]
pub struct NatsBackend {
    client: Client,
}

impl NatsBackend {
    pub async fn connect(config: NatsConfig) -> BackendResult<Self> {
        let options = ConnectOptions::new()
            .name(&config.name)
            .connection_timeout(config.connect_timeout)
            .request_timeout(Some(config.request_timeout));

        let client = async_nats::connect_with_options(config.servers.join(","), options)
            .await
            .map_err(|e| BackendError::NatsConnection(e.to_string()))?;

        info!("Connected to NATS at {:?}", config.servers);
        Ok(Self { client })
    }

    pub fn inner(&self) -> &Client {
        &self.client
    }
}

#[async_trait]
impl ProvisioningBackend for NatsBackend {
    async fn submit(&self, graph: &ResourceGraph) -> BackendResult<()> {
        let message = TopologySubmitted::new(graph);
        let subject = message.subject();
        let payload = serde_json::to_vec(&message)?;

        self.client
            .publish(subject.clone(), payload.into())
            .await
            .map_err(|e| BackendError::NatsPublish(e.to_string()))?;
        self.client
            .flush()
            .await
            .map_err(|e| BackendError::NatsPublish(e.to_string()))?;

        debug!(subject = %subject, topology_id = %graph.id, "published topology");
        Ok(())
    }

    async fn health_check(&self) -> BackendResult<()> {
        match self.client.connection_state() {
            State::Connected => Ok(()),
            state => Err(BackendError::NatsConnection(format!(
                "client is {:?}",
                state
            ))),
        }
    }

    fn name(&self) -> &str {
        "nats"
    }
}
