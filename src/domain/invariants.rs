// Copyright (c) 2025 - Cowboy AI, Inc.
//! Pure Validation Functions - Topology Invariants
//!
//! Cross-reference and structural checks run over a finished
//! [`ResourceGraph`] before it is handed downstream. All functions are pure
//! and return the first violated invariant.
//!
//! # Invariant Categories
//!
//! 1. **Address Invariants**: subnets inside the network, pairwise disjoint
//! 2. **Routing Invariants**: default routes, gateway references, NAT placement
//! 3. **Association Invariants**: no orphaned subnet
//! 4. **Compute Invariants**: instances placed in existing subnets with room for them
//! 5. **Load Balancing Invariants**: targets exist and are reachable

use std::collections::{BTreeMap, BTreeSet};

use super::network::{Ipv4Network, SubnetTier};
use super::routing::{GatewayKind, RouteTarget};
use super::value_objects::{Port, ResourceId};
use crate::graph::ResourceGraph;

/// Validation result with the violated invariant
pub type ValidationResult = Result<(), TopologyError>;

/// A named topology invariant violation
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TopologyError {
    #[error("Subnet {subnet} ({cidr}) lies outside network {network}")]
    SubnetOutsideNetwork {
        subnet: ResourceId,
        cidr: Ipv4Network,
        network: Ipv4Network,
    },

    #[error("Subnets {first} and {second} overlap")]
    OverlappingSubnets { first: ResourceId, second: ResourceId },

    #[error("Route table {route_table} references missing gateway {gateway}")]
    DanglingGateway {
        route_table: ResourceId,
        gateway: ResourceId,
    },

    #[error("Route table {route_table} ({tier}) has {count} default routes, expected {expected}")]
    DefaultRouteCount {
        route_table: ResourceId,
        tier: SubnetTier,
        count: usize,
        expected: usize,
    },

    #[error("Default route of {route_table} ({tier}) targets {target}")]
    WrongGatewayKind {
        route_table: ResourceId,
        tier: SubnetTier,
        target: String,
    },

    #[error("Private egress requires a public subnet to host the NAT gateway")]
    NatRequiresPublicSubnet,

    #[error("NAT gateway {gateway} sits in {subnet}, which is not a public subnet")]
    NatOutsidePublicSubnet {
        gateway: ResourceId,
        subnet: ResourceId,
    },

    #[error("NAT gateway {gateway} references missing elastic IP {elastic_ip}")]
    DanglingElasticIp {
        gateway: ResourceId,
        elastic_ip: ResourceId,
    },

    #[error("Subnet {subnet} has no route table association")]
    OrphanedSubnet { subnet: ResourceId },

    #[error("Subnet {subnet} is bound to missing route table {route_table}")]
    DanglingRouteTable {
        subnet: ResourceId,
        route_table: ResourceId,
    },

    #[error("No {tier} subnet available for {purpose}")]
    NoSubnetsForTier { tier: SubnetTier, purpose: String },

    #[error("Subnet {subnet} holds {instances} instances but has {usable} usable addresses")]
    SubnetCapacityExceeded {
        subnet: ResourceId,
        instances: u64,
        usable: u64,
    },

    #[error("{resource} references missing subnet {subnet}")]
    DanglingSubnet {
        resource: ResourceId,
        subnet: ResourceId,
    },

    #[error("Target group {target_group} references unknown instance {target}")]
    UnknownTarget {
        target_group: ResourceId,
        target: ResourceId,
    },

    #[error("Target {target} is unreachable from the load balancer: {reason}")]
    UnreachableTarget { target: ResourceId, reason: String },

    #[error("Logical id {0} is used by more than one resource")]
    DuplicateResourceId(ResourceId),
}

/// Every subnet lies inside the network block
pub fn validate_subnets_within_network(graph: &ResourceGraph) -> ValidationResult {
    let network = graph.network.cidr;
    for subnet in &graph.network.subnets {
        if !network.contains(&subnet.cidr) {
            return Err(TopologyError::SubnetOutsideNetwork {
                subnet: subnet.id.clone(),
                cidr: subnet.cidr,
                network,
            });
        }
    }
    Ok(())
}

/// No two subnets share an address
pub fn validate_subnets_disjoint(graph: &ResourceGraph) -> ValidationResult {
    let subnets = &graph.network.subnets;
    for (i, first) in subnets.iter().enumerate() {
        for second in &subnets[i + 1..] {
            if first.cidr.overlaps(&second.cidr) {
                return Err(TopologyError::OverlappingSubnets {
                    first: first.id.clone(),
                    second: second.id.clone(),
                });
            }
        }
    }
    Ok(())
}

/// Route tables reference existing gateways of the kind their tier needs
///
/// # Rules
/// - Public and PrivateApp tables: exactly one default route
/// - Public default route → internet gateway
/// - PrivateApp default route → NAT gateway
/// - PrivateIsolated tables: no default route
pub fn validate_route_tables(graph: &ResourceGraph) -> ValidationResult {
    for table in &graph.route_tables {
        for route in &table.routes {
            if let Some(gateway) = route.target.gateway() {
                if graph.gateway(gateway).is_none() {
                    return Err(TopologyError::DanglingGateway {
                        route_table: table.id.clone(),
                        gateway: gateway.clone(),
                    });
                }
            }
        }

        let expected = usize::from(table.tier.has_egress());
        let count = table.default_routes().count();
        if count != expected {
            return Err(TopologyError::DefaultRouteCount {
                route_table: table.id.clone(),
                tier: table.tier,
                count,
                expected,
            });
        }

        if let Some(route) = table.default_route() {
            let kind_matches = match (&table.tier, &route.target) {
                (SubnetTier::Public, RouteTarget::InternetGateway(_)) => true,
                (SubnetTier::PrivateApp, RouteTarget::NatGateway(_)) => true,
                _ => false,
            };
            if !kind_matches {
                return Err(TopologyError::WrongGatewayKind {
                    route_table: table.id.clone(),
                    tier: table.tier,
                    target: route.target.to_string(),
                });
            }
        }
    }
    Ok(())
}

/// NAT gateways live in public subnets and hold an allocated address
pub fn validate_nat_gateways(graph: &ResourceGraph) -> ValidationResult {
    for gateway in &graph.gateways {
        let GatewayKind::Nat { subnet, elastic_ip } = &gateway.kind else {
            continue;
        };
        match graph.subnet(subnet) {
            Some(s) if s.tier.is_public() => {}
            _ => {
                return Err(TopologyError::NatOutsidePublicSubnet {
                    gateway: gateway.id.clone(),
                    subnet: subnet.clone(),
                })
            }
        }
        if !graph.elastic_ips.iter().any(|e| &e.id == elastic_ip) {
            return Err(TopologyError::DanglingElasticIp {
                gateway: gateway.id.clone(),
                elastic_ip: elastic_ip.clone(),
            });
        }
    }
    Ok(())
}

/// Every subnet is associated with an existing route table
pub fn validate_subnet_associations(graph: &ResourceGraph) -> ValidationResult {
    for subnet in &graph.network.subnets {
        let association = graph
            .associations
            .iter()
            .find(|a| a.subnet == subnet.id)
            .ok_or_else(|| TopologyError::OrphanedSubnet {
                subnet: subnet.id.clone(),
            })?;

        for table in [&association.route_table, &subnet.route_table] {
            if graph.route_table(table).is_none() {
                return Err(TopologyError::DanglingRouteTable {
                    subnet: subnet.id.clone(),
                    route_table: table.clone(),
                });
            }
        }
    }
    Ok(())
}

/// Instances and the scaling group point at existing subnets
///
/// No subnet holds more instances than it has usable addresses.
pub fn validate_compute_placement(graph: &ResourceGraph) -> ValidationResult {
    let Some(compute) = &graph.compute else {
        return Ok(());
    };
    let mut placed: BTreeMap<&ResourceId, u64> = BTreeMap::new();
    for instance in &compute.instances {
        if graph.subnet(&instance.subnet).is_none() {
            return Err(TopologyError::DanglingSubnet {
                resource: instance.id.clone(),
                subnet: instance.subnet.clone(),
            });
        }
        *placed.entry(&instance.subnet).or_default() += 1;
    }
    for (id, instances) in placed {
        let usable = graph.subnet(id).map_or(0, |s| s.usable_addresses());
        if instances > usable {
            return Err(TopologyError::SubnetCapacityExceeded {
                subnet: id.clone(),
                instances,
                usable,
            });
        }
    }
    if let Some(group) = &compute.auto_scaling_group {
        for subnet in &group.subnets {
            if graph.subnet(subnet).is_none() {
                return Err(TopologyError::DanglingSubnet {
                    resource: group.id.clone(),
                    subnet: subnet.clone(),
                });
            }
        }
    }
    Ok(())
}

/// Every target is a known instance reachable from the balancer's subnets
///
/// # Rules
/// - The target id names a described instance
/// - Each balancer subnet's route table routes the instance subnet locally
/// - The instance admits the target group port
pub fn validate_load_balancer_targets(graph: &ResourceGraph) -> ValidationResult {
    let Some(balancer) = &graph.load_balancer else {
        return Ok(());
    };
    for subnet in &balancer.subnets {
        if graph.subnet(subnet).is_none() {
            return Err(TopologyError::DanglingSubnet {
                resource: balancer.id.clone(),
                subnet: subnet.clone(),
            });
        }
    }

    let instances: BTreeMap<&ResourceId, _> = graph
        .compute
        .iter()
        .flat_map(|c| &c.instances)
        .map(|i| (&i.id, i))
        .collect();

    let group = &balancer.target_group;
    for target in &group.targets {
        let instance = instances
            .get(target)
            .copied()
            .ok_or_else(|| TopologyError::UnknownTarget {
                target_group: group.id.clone(),
                target: target.clone(),
            })?;

        let instance_subnet =
            graph
                .subnet(&instance.subnet)
                .ok_or_else(|| TopologyError::DanglingSubnet {
                    resource: instance.id.clone(),
                    subnet: instance.subnet.clone(),
                })?;

        for subnet in balancer.subnets.iter().filter_map(|id| graph.subnet(id)) {
            let routed = graph
                .route_table(&subnet.route_table)
                .is_some_and(|t| t.routes_locally(&instance_subnet.cidr));
            if !routed {
                return Err(TopologyError::UnreachableTarget {
                    target: target.clone(),
                    reason: format!("no local route from {} to {}", subnet.id, instance_subnet.id),
                });
            }
        }

        ensure_port_admitted(target, instance.admits(group.port), group.port)?;
    }
    Ok(())
}

fn ensure_port_admitted(target: &ResourceId, admitted: bool, port: Port) -> ValidationResult {
    if admitted {
        Ok(())
    } else {
        Err(TopologyError::UnreachableTarget {
            target: target.clone(),
            reason: format!("security group does not admit port {}", port),
        })
    }
}

/// Logical ids are unique across the graph
pub fn validate_unique_ids(graph: &ResourceGraph) -> ValidationResult {
    let mut seen = BTreeSet::new();
    for id in graph.resource_ids() {
        if !seen.insert(id) {
            return Err(TopologyError::DuplicateResourceId(id.clone()));
        }
    }
    Ok(())
}

/// Composite validation run before a graph leaves the assembler
pub fn validate_graph(graph: &ResourceGraph) -> ValidationResult {
    validate_unique_ids(graph)?;
    validate_subnets_within_network(graph)?;
    validate_subnets_disjoint(graph)?;
    validate_route_tables(graph)?;
    validate_nat_gateways(graph)?;
    validate_subnet_associations(graph)?;
    validate_compute_placement(graph)?;
    validate_load_balancer_targets(graph)?;
    Ok(())
}
