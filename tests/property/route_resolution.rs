// Copyright (c) 2025 - Cowboy AI, Inc.
//! Property-Based Tests for Default Route Resolution
//!
//! Assembles generated network configurations and follows every subnet's
//! route table to the gateway behind its default route.

use cim_network_topology::domain::invariants::validate_graph;
use cim_network_topology::domain::SubnetTier;
use cim_network_topology::{
    NatGatewayPolicy, NetworkConfig, RouteTableScope, SubnetRequest, TopologyAssembler,
    TopologyConfig,
};
use proptest::prelude::*;

// ============================================================================
// Property Test Strategies
// ============================================================================

fn private_tier() -> impl Strategy<Value = SubnetTier> {
    prop_oneof![Just(SubnetTier::PrivateApp), Just(SubnetTier::PrivateIsolated)]
}

fn nat_policy() -> impl Strategy<Value = NatGatewayPolicy> {
    prop_oneof![
        Just(NatGatewayPolicy::Single),
        Just(NatGatewayPolicy::PerAvailabilityZone),
    ]
}

fn scope() -> impl Strategy<Value = RouteTableScope> {
    prop_oneof![
        Just(RouteTableScope::PerTier),
        Just(RouteTableScope::PerAvailabilityZone),
    ]
}

/// A public tier followed by up to four private groups
fn network_config() -> impl Strategy<Value = TopologyConfig> {
    (
        1usize..=4,
        prop::collection::vec(private_tier(), 0..5),
        nat_policy(),
        scope(),
    )
        .prop_map(|(az_count, private, nat_gateways, route_table_scope)| {
            let mut subnets = vec![SubnetRequest::new("Public", SubnetTier::Public, 24)];
            subnets.extend(
                private
                    .into_iter()
                    .enumerate()
                    .map(|(i, tier)| SubnetRequest::new(format!("Private{}", i), tier, 24)),
            );
            TopologyConfig::network_only(
                "PropertyStack",
                "us-west-2",
                NetworkConfig {
                    cidr: "10.0.0.0/16".parse().unwrap(),
                    az_count,
                    subnets,
                    nat_gateways,
                    route_table_scope,
                },
            )
        })
}

// ============================================================================
// Property Tests
// ============================================================================

proptest! {
    /// Property: Each tier resolves to the gateway kind it needs
    ///
    /// Public subnets reach the internet gateway, private egress subnets a
    /// NAT gateway hosted in a public subnet, isolated subnets nothing.
    #[test]
    fn prop_default_routes_match_tier(config in network_config()) {
        let graph = TopologyAssembler::new().assemble(&config).unwrap();

        for subnet in &graph.network.subnets {
            let gateway = graph.default_gateway_for(&subnet.id);
            match subnet.tier {
                SubnetTier::Public => {
                    prop_assert!(gateway.is_some_and(|g| g.is_internet()), "{}", subnet.id);
                }
                SubnetTier::PrivateApp => {
                    let nat = gateway.filter(|g| g.is_nat());
                    prop_assert!(nat.is_some(), "{} has no NAT route", subnet.id);
                    let host = nat.and_then(|g| g.subnet()).and_then(|id| graph.subnet(id));
                    prop_assert!(host.is_some_and(|h| h.tier == SubnetTier::Public));
                }
                SubnetTier::PrivateIsolated => {
                    prop_assert!(gateway.is_none(), "{} routes out", subnet.id);
                }
            }
        }
    }

    /// Property: Per-zone NAT keeps private egress inside the zone
    #[test]
    fn prop_per_zone_nat_is_zone_local(config in network_config()) {
        let graph = TopologyAssembler::new().assemble(&config).unwrap();
        if config.network.nat_gateways != NatGatewayPolicy::PerAvailabilityZone {
            return Ok(());
        }

        for subnet in graph.subnets_in_tier(SubnetTier::PrivateApp) {
            let host = graph
                .default_gateway_for(&subnet.id)
                .and_then(|g| g.subnet())
                .and_then(|id| graph.subnet(id));
            prop_assert!(host.is_some_and(|h| h.availability_zone == subnet.availability_zone));
        }
    }

    /// Property: Assembled graphs pass validation and are reproducible
    #[test]
    fn prop_assembly_is_valid_and_deterministic(config in network_config()) {
        let first = TopologyAssembler::new().assemble(&config).unwrap();
        let second = TopologyAssembler::new().assemble(&config).unwrap();

        prop_assert_eq!(validate_graph(&first), Ok(()));
        prop_assert_eq!(first, second);
    }
}
