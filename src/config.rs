// Copyright (c) 2025 - Cowboy AI, Inc.
//! Topology configuration
//!
//! The single input record of an assembly run, loaded from JSON and
//! optionally overridden from the environment.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::Path;
use tracing::warn;

use crate::domain::{
    AvailabilityZone, InstanceType, Ipv4Network, KeyPairName, MachineImage, Port, Protocol,
    ResourceId, Scheme, SubnetTier,
};
use crate::errors::{AssemblyError, AssemblyResult};

/// Environment variable supplying the instance key pair name
pub const KEY_PAIR_ENV: &str = "TOPOLOGY_KEY_PAIR";

/// Environment variable overriding the stack name
pub const STACK_NAME_ENV: &str = "TOPOLOGY_STACK_NAME";

/// Environment variable overriding the region
pub const REGION_ENV: &str = "TOPOLOGY_REGION";

/// Narrowest prefix a network or subnet may use
pub const MIN_PREFIX: u8 = 16;

/// Widest prefix a network or subnet may use
pub const MAX_PREFIX: u8 = 28;

/// Complete input of one assembly
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TopologyConfig {
    pub stack_name: String,
    pub region: String,
    /// Parameter store prefix for outputs, defaults to `/<stack_name>`
    #[serde(default)]
    pub parameter_prefix: Option<String>,
    pub network: NetworkConfig,
    #[serde(default)]
    pub compute: Option<ComputeSpec>,
    #[serde(default)]
    pub load_balancer: Option<LoadBalancerSpec>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NetworkConfig {
    pub cidr: Ipv4Network,
    pub az_count: usize,
    pub subnets: Vec<SubnetRequest>,
    #[serde(default)]
    pub nat_gateways: NatGatewayPolicy,
    #[serde(default)]
    pub route_table_scope: RouteTableScope,
}

/// One subnet group, allocated once per availability zone
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SubnetRequest {
    pub name: String,
    pub tier: SubnetTier,
    pub mask: u8,
}

impl SubnetRequest {
    pub fn new(name: impl Into<String>, tier: SubnetTier, mask: u8) -> Self {
        Self {
            name: name.into(),
            tier,
            mask,
        }
    }
}

/// How many NAT gateways serve private egress subnets
///
/// `Single` is cheaper but ties every private subnet's egress to the zone
/// hosting the gateway. `PerAvailabilityZone` keeps egress zone-local.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NatGatewayPolicy {
    #[default]
    Single,
    PerAvailabilityZone,
}

/// Whether a tier's route table is shared network-wide or per zone
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RouteTableScope {
    #[default]
    PerTier,
    PerAvailabilityZone,
}

/// Description of the instances to run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ComputeSpec {
    pub image: MachineImage,
    pub instance_type: InstanceType,
    #[serde(default = "default_placement")]
    pub placement: SubnetTier,
    #[serde(default)]
    pub ports: Vec<Port>,
    #[serde(default)]
    pub bootstrap: Vec<String>,
    pub count: u32,
    /// Supplied by configuration or `TOPOLOGY_KEY_PAIR`, never hardcoded
    #[serde(default)]
    pub key_pair: Option<KeyPairName>,
    #[serde(default = "default_managed_policies")]
    pub managed_policies: Vec<String>,
    #[serde(default = "default_true")]
    pub allow_all_outbound: bool,
    #[serde(default)]
    pub scaling: Option<ScalingBounds>,
}

/// Auto scaling bounds; the desired capacity is the instance count
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScalingBounds {
    pub min: u32,
    pub max: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoadBalancerSpec {
    pub port: Port,
    pub scheme: Scheme,
    #[serde(default = "default_protocol")]
    pub protocol: Protocol,
    /// Port the targets listen on, defaults to the listener port
    #[serde(default)]
    pub target_port: Option<Port>,
    #[serde(default = "default_health_check_path")]
    pub health_check_path: String,
}

impl LoadBalancerSpec {
    pub fn target_port(&self) -> Port {
        self.target_port.unwrap_or(self.port)
    }
}

fn default_placement() -> SubnetTier {
    SubnetTier::Public
}

fn default_managed_policies() -> Vec<String> {
    vec!["AmazonSSMManagedInstanceCore".to_string()]
}

fn default_true() -> bool {
    true
}

fn default_protocol() -> Protocol {
    Protocol::Http
}

fn default_health_check_path() -> String {
    "/".to_string()
}

impl TopologyConfig {
    /// Network-only configuration with no compute or load balancer
    pub fn network_only(
        stack_name: impl Into<String>,
        region: impl Into<String>,
        network: NetworkConfig,
    ) -> Self {
        Self {
            stack_name: stack_name.into(),
            region: region.into(),
            parameter_prefix: None,
            network,
            compute: None,
            load_balancer: None,
        }
    }

    pub fn from_json_str(json: &str) -> AssemblyResult<Self> {
        serde_json::from_str(json)
            .map_err(|e| AssemblyError::Configuration(format!("invalid topology config: {}", e)))
    }

    pub fn from_file(path: impl AsRef<Path>) -> AssemblyResult<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| {
            AssemblyError::Configuration(format!("cannot read {}: {}", path.display(), e))
        })?;
        Self::from_json_str(&json)
    }

    /// Apply `TOPOLOGY_*` environment overrides
    pub fn with_env_overrides(self) -> AssemblyResult<Self> {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary lookup (the environment in production)
    pub fn with_overrides(
        mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> AssemblyResult<Self> {
        if let Some(stack_name) = lookup(STACK_NAME_ENV) {
            self.stack_name = stack_name;
        }
        if let Some(region) = lookup(REGION_ENV) {
            self.region = region;
        }
        if let Some(key_pair) = lookup(KEY_PAIR_ENV) {
            let key_pair = KeyPairName::new(key_pair)?;
            match self.compute.as_mut() {
                Some(compute) => compute.key_pair = Some(key_pair),
                None => warn!(
                    stack = %self.stack_name,
                    "{} set but the topology has no compute, ignoring it",
                    KEY_PAIR_ENV
                ),
            }
        }
        Ok(self)
    }

    /// Parameter store key for a named output
    pub fn parameter_name(&self, output: &str) -> String {
        let prefix = self
            .parameter_prefix
            .clone()
            .unwrap_or_else(|| format!("/{}", self.stack_name));
        format!("{}/{}", prefix.trim_end_matches('/'), output)
    }

    pub fn availability_zones(&self) -> AssemblyResult<Vec<AvailabilityZone>> {
        Ok(AvailabilityZone::for_region(
            &self.region,
            self.network.az_count,
        )?)
    }

    /// Check everything that can be checked without planning
    pub fn validate(&self) -> AssemblyResult<()> {
        if self.stack_name.trim().is_empty() {
            return Err(config_error("stack name cannot be empty"));
        }
        self.availability_zones()?;
        self.network.validate()?;
        if let Some(compute) = &self.compute {
            compute.validate()?;
        }
        if let Some(prefix) = &self.parameter_prefix {
            if !prefix.starts_with('/') {
                return Err(config_error(format!(
                    "parameter prefix '{}' must start with '/'",
                    prefix
                )));
            }
        }
        Ok(())
    }
}

impl NetworkConfig {
    pub fn validate(&self) -> AssemblyResult<()> {
        let prefix = self.cidr.prefix_len();
        if !(MIN_PREFIX..=MAX_PREFIX).contains(&prefix) {
            return Err(config_error(format!(
                "network prefix /{} outside /{}-/{}",
                prefix, MIN_PREFIX, MAX_PREFIX
            )));
        }
        if self.subnets.is_empty() {
            return Err(config_error("at least one subnet group is required"));
        }

        let mut names = BTreeSet::new();
        for request in &self.subnets {
            // Group names become part of logical ids
            ResourceId::new(format!("{}Subnet1", request.name))?;
            if !names.insert(request.name.as_str()) {
                return Err(config_error(format!(
                    "duplicate subnet group name '{}'",
                    request.name
                )));
            }
            if request.mask > MAX_PREFIX {
                return Err(config_error(format!(
                    "subnet group '{}' mask /{} is narrower than /{}",
                    request.name, request.mask, MAX_PREFIX
                )));
            }
        }
        Ok(())
    }
}

impl ComputeSpec {
    pub fn validate(&self) -> AssemblyResult<()> {
        if let Some(bounds) = self.scaling {
            if !(bounds.min <= self.count && self.count <= bounds.max) {
                return Err(config_error(format!(
                    "instance count {} outside scaling bounds {}..={}",
                    self.count, bounds.min, bounds.max
                )));
            }
        }
        if self.managed_policies.iter().any(|p| p.trim().is_empty()) {
            return Err(config_error("managed policy names cannot be empty"));
        }
        Ok(())
    }
}

fn config_error(message: impl Into<String>) -> AssemblyError {
    AssemblyError::Configuration(message.into())
}
