// Copyright (c) 2025 - Cowboy AI, Inc.
//! Declarative network topology assembly
//!
//! Turns a [`TopologyConfig`] into a validated [`ResourceGraph`]: a virtual
//! network carved into per-zone subnets, the route tables and gateways that
//! give each tier its egress, compute instances, and an optional load
//! balancer in front of them.
//!
//! ```text
//! TopologyConfig
//!   → AddressPlanner      (subnets)
//!   → RouteTableBuilder   (gateways, route tables, associations)
//!   → ComputeProvisioner  (instances)
//!   → LoadBalancerWiring  (target group, listener)
//!   → validate_graph      → ResourceGraph → ProvisioningBackend
//! ```
//!
//! Assembly is pure: the same configuration always yields an equal graph.

pub mod assembler;
pub mod backend;
pub mod config;
pub mod domain;
pub mod errors;
pub mod graph;
pub mod planner;
pub mod subjects;

// Re-export commonly used types
pub use assembler::TopologyAssembler;
pub use backend::{NatsBackend, NatsConfig, ProvisioningBackend, RecordingBackend};
pub use config::{
    ComputeSpec, LoadBalancerSpec, NatGatewayPolicy, NetworkConfig, RouteTableScope,
    ScalingBounds, SubnetRequest, TopologyConfig,
};
pub use errors::{AssemblyError, AssemblyResult, BackendError, BackendResult};
pub use graph::ResourceGraph;
