// Copyright (c) 2025 - Cowboy AI, Inc.
//! Topology Domain Models
//!
//! Value objects and entities of a provisioning topology: the network and
//! its subnets, routing, compute and load balancing, plus the pure
//! invariant checks run over an assembled graph.
//!
//! # Value Objects with Invariants
//!
//! - [`ResourceId`] - Logical resource ids (ASCII alphanumeric)
//! - [`Ipv4Network`] - IPv4 CIDR blocks aligned on their prefix
//! - [`AvailabilityZone`] - Lettered zone names derived from a region
//! - [`Port`] - TCP/UDP ports (1-65535)
//! - [`InstanceType`] - `<class>.<size>` instance types
//! - [`KeyPairName`] - Externally supplied key pair names
//!
//! # Entities
//!
//! - [`Network`], [`Subnet`] - Address layout
//! - [`RouteTable`], [`Gateway`] - Routing
//! - [`ComputeInstance`], [`LaunchTemplate`] - Compute
//! - [`LoadBalancer`], [`TargetGroup`], [`Listener`] - Load balancing

pub mod compute;
pub mod invariants;
pub mod load_balancer;
pub mod network;
pub mod routing;
pub mod value_objects;

pub use compute::{
    AutoScalingGroup, BootstrapScript, Capacity, ComputeInstance, ComputePlan, IngressRule,
    InstanceRole, IpProtocol, LaunchTemplate, SecurityGroup,
};
pub use invariants::{TopologyError, ValidationResult};
pub use load_balancer::{
    AttributeRef, Listener, LoadBalancer, Protocol, Scheme, StackOutput, TargetGroup,
};
pub use network::{Ipv4Network, Network, NetworkError, Subnet, SubnetTier};
pub use routing::{
    ElasticIp, Gateway, GatewayKind, Route, RouteTable, RouteTableAssociation, RouteTarget,
};
pub use value_objects::{
    AvailabilityZone, InstanceType, KeyPairName, MachineImage, Port, ResourceId, TopologyId,
    ValueError,
};
