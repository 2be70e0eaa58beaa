// Copyright (c) 2025 - Cowboy AI, Inc.
//! Planning stages of an assembly
//!
//! Each planner is a pure function of its inputs:
//!
//! - [`AddressPlanner`] - carves subnets out of the network block
//! - [`RouteTableBuilder`] - gateways, route tables and associations
//! - [`ComputeProvisioner`] - instances and what they share
//! - [`LoadBalancerWiring`] - target group, listener and balancer

pub mod address;
pub mod compute;
pub mod load_balancer;
pub mod routing;

pub use address::{AddressPlanner, SubnetAllocation};
pub use compute::{ComputeProvisioner, INSTANCE_PRINCIPAL};
pub use load_balancer::LoadBalancerWiring;
pub use routing::{RouteTableBuilder, RoutingPlan};
