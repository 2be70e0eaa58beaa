// Copyright (c) 2025 - Cowboy AI, Inc.
//! Topology Assembler
//!
//! Assembles a topology configuration file and prints the resource graph as
//! JSON. When `NATS_URL` is set the graph is also published for downstream
//! provisioning.
//!
//! Run with: cargo run --bin topology-assembler -- config/web-tier.json
//!
//! Environment:
//! - `TOPOLOGY_CONFIG` - configuration path when no argument is given
//! - `TOPOLOGY_KEY_PAIR` - instance key pair name
//! - `TOPOLOGY_STACK_NAME`, `TOPOLOGY_REGION` - overrides
//! - `NATS_URL` - publish target (optional)

use anyhow::{Context, Result};
use cim_network_topology::{
    NatsBackend, NatsConfig, ProvisioningBackend, TopologyAssembler, TopologyConfig,
};
use std::path::PathBuf;
use tracing::{info, warn};

/// Settings for one run
#[derive(Debug, Clone)]
struct AssemblerSettings {
    config_path: PathBuf,
    nats_url: Option<String>,
}

impl AssemblerSettings {
    /// Load settings from arguments and environment variables
    fn from_env() -> Result<Self> {
        let config_path = std::env::args()
            .nth(1)
            .or_else(|| std::env::var("TOPOLOGY_CONFIG").ok())
            .map(PathBuf::from)
            .context("No configuration given. Pass a path or set TOPOLOGY_CONFIG")?;

        let nats_url = std::env::var("NATS_URL").ok().filter(|url| !url.is_empty());

        Ok(Self {
            config_path,
            nats_url,
        })
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr so stdout stays valid JSON
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let settings = AssemblerSettings::from_env()?;
    info!("Loading topology from {}", settings.config_path.display());

    let config = TopologyConfig::from_file(&settings.config_path)
        .and_then(TopologyConfig::with_env_overrides)
        .context("Failed to load topology configuration")?;

    let graph = TopologyAssembler::new()
        .assemble(&config)
        .with_context(|| format!("Failed to assemble stack {}", config.stack_name))?;

    println!("{}", graph.to_json_pretty()?);

    match settings.nats_url {
        Some(url) => {
            let backend = NatsBackend::connect(NatsConfig::from_url(&url))
                .await
                .context("Failed to connect to NATS")?;
            backend.health_check().await?;
            backend.submit(&graph).await?;
            info!(
                "Submitted {} ({}) to {} backend",
                graph.stack_name,
                graph.id,
                backend.name()
            );
        }
        None => warn!("NATS_URL not set, graph was not submitted"),
    }

    Ok(())
}
