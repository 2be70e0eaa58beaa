// Copyright (c) 2025 - Cowboy AI, Inc.
//! Test Fixtures for cim-network-topology
//!
//! Deterministic topology configurations shared by the integration tests.
//! Key pairs are injected through the override lookup, never written into
//! a fixture.

#![allow(dead_code)]

use std::path::PathBuf;

use cim_network_topology::config::KEY_PAIR_ENV;
use cim_network_topology::domain::{MachineImage, Port, Protocol, Scheme, SubnetTier};
use cim_network_topology::{
    ComputeSpec, LoadBalancerSpec, NatGatewayPolicy, NetworkConfig, RouteTableScope,
    ScalingBounds, SubnetRequest, TopologyConfig,
};

pub const REGION: &str = "us-east-1";
pub const BASE_CIDR: &str = "10.0.0.0/16";
pub const TEST_KEY_PAIR: &str = "integration-key";

/// Path of a checked-in configuration under `config/`
pub fn config_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("config")
        .join(name)
}

pub fn network(az_count: usize, subnets: Vec<SubnetRequest>) -> NetworkConfig {
    NetworkConfig {
        cidr: BASE_CIDR.parse().unwrap(),
        az_count,
        subnets,
        nat_gateways: NatGatewayPolicy::Single,
        route_table_scope: RouteTableScope::PerTier,
    }
}

/// `10.0.0.0/16`, two zones, one public and one private egress tier
pub fn two_tier_vpc() -> TopologyConfig {
    TopologyConfig::network_only(
        "TwoTierStack",
        REGION,
        network(
            2,
            vec![
                SubnetRequest::new("Public", SubnetTier::Public, 24),
                SubnetRequest::new("PrivateApp", SubnetTier::PrivateApp, 24),
            ],
        ),
    )
}

/// Public tier plus two private groups sharing one NAT gateway
pub fn three_tier_vpc() -> TopologyConfig {
    TopologyConfig::network_only(
        "MyVpcStack",
        REGION,
        network(
            2,
            vec![
                SubnetRequest::new("Public", SubnetTier::Public, 24),
                SubnetRequest::new("PrivateApp", SubnetTier::PrivateApp, 24),
                SubnetRequest::new("PrivateDB", SubnetTier::PrivateApp, 24),
            ],
        ),
    )
}

pub fn web_compute(ports: Vec<Port>, count: u32) -> ComputeSpec {
    ComputeSpec {
        image: MachineImage::AmazonLinux2,
        instance_type: "t2.micro".parse().unwrap(),
        placement: SubnetTier::Public,
        ports,
        bootstrap: vec![
            "yum install -y httpd".to_string(),
            "systemctl enable httpd".to_string(),
            "systemctl start httpd".to_string(),
        ],
        count,
        key_pair: None,
        managed_policies: vec!["AmazonSSMManagedInstanceCore".to_string()],
        allow_all_outbound: true,
        scaling: None,
    }
}

pub fn http_balancer(scheme: Scheme) -> LoadBalancerSpec {
    LoadBalancerSpec {
        port: Port::HTTP,
        scheme,
        protocol: Protocol::Http,
        target_port: None,
        health_check_path: "/".to_string(),
    }
}

/// Two web servers behind an internet-facing balancer
pub fn web_tier(ports: Vec<Port>, count: u32) -> TopologyConfig {
    TopologyConfig {
        compute: Some(web_compute(ports, count)),
        load_balancer: Some(http_balancer(Scheme::InternetFacing)),
        ..TopologyConfig::network_only(
            "WebTierStack",
            REGION,
            network(2, vec![SubnetRequest::new("Public", SubnetTier::Public, 24)]),
        )
    }
}

/// Auto scaled web tier with the key pair taken from the override lookup
pub fn scaled_web_tier() -> TopologyConfig {
    let mut config = web_tier(vec![Port::SSH, Port::HTTP], 3);
    if let Some(compute) = config.compute.as_mut() {
        compute.scaling = Some(ScalingBounds { min: 3, max: 6 });
    }
    config
        .with_overrides(|key| (key == KEY_PAIR_ENV).then(|| TEST_KEY_PAIR.to_string()))
        .unwrap()
}
