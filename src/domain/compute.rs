// Copyright (c) 2025 - Cowboy AI, Inc.
//! Compute Entities
//!
//! Instances, the launch template they are stamped from, the security group
//! guarding them and the optional auto scaling group.

use serde::{Deserialize, Serialize};

use super::network::Ipv4Network;
use super::value_objects::{
    AvailabilityZone, InstanceType, KeyPairName, MachineImage, Port, ResourceId,
};

/// Transport protocol of an ingress rule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IpProtocol {
    Tcp,
}

/// One allowed inbound flow
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngressRule {
    pub protocol: IpProtocol,
    pub port: Port,
    pub peer: Ipv4Network,
    pub description: String,
}

impl IngressRule {
    /// TCP from any IPv4 address
    pub fn tcp_from_anywhere(port: Port) -> Self {
        Self {
            protocol: IpProtocol::Tcp,
            port,
            peer: Ipv4Network::DEFAULT_ROUTE,
            description: format!("Allow TCP {} from anywhere", port),
        }
    }
}

/// Security group: everything not listed in `ingress` is denied
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecurityGroup {
    pub id: ResourceId,
    pub description: String,
    pub ingress: Vec<IngressRule>,
    pub allow_all_outbound: bool,
}

impl SecurityGroup {
    pub fn admits(&self, port: Port) -> bool {
        self.ingress.iter().any(|rule| rule.port == port)
    }

    pub fn ingress_ports(&self) -> Vec<Port> {
        self.ingress.iter().map(|rule| rule.port).collect()
    }
}

/// Role assumed by instances
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstanceRole {
    pub id: ResourceId,
    pub assumed_by: String,
    pub managed_policies: Vec<String>,
}

/// Commands executed once at first boot, in order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BootstrapScript(Vec<String>);

impl BootstrapScript {
    pub const SHEBANG: &'static str = "#!/bin/bash";

    pub fn new(commands: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self(
            commands
                .into_iter()
                .map(Into::into)
                .map(|c: String| c.trim().to_string())
                .filter(|c| !c.is_empty())
                .collect(),
        )
    }

    pub fn commands(&self) -> &[String] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Render as user data
    pub fn render(&self) -> String {
        let mut script = String::from(Self::SHEBANG);
        script.push('\n');
        for command in &self.0 {
            script.push_str(command);
            script.push('\n');
        }
        script
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LaunchTemplate {
    pub id: ResourceId,
    pub image: MachineImage,
    pub instance_type: InstanceType,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub key_pair: Option<KeyPairName>,
    pub security_group: ResourceId,
    pub role: ResourceId,
    pub user_data: BootstrapScript,
}

/// One described instance
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComputeInstance {
    pub id: ResourceId,
    pub instance_type: InstanceType,
    pub image: MachineImage,
    pub subnet: ResourceId,
    pub availability_zone: AvailabilityZone,
    pub security_group: ResourceId,
    pub ingress_ports: Vec<Port>,
    pub launch_template: ResourceId,
    pub bootstrap: BootstrapScript,
}

impl ComputeInstance {
    pub fn admits(&self, port: Port) -> bool {
        self.ingress_ports.contains(&port)
    }
}

/// Capacity bounds of an auto scaling group
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Capacity {
    pub min: u32,
    pub max: u32,
    pub desired: u32,
}

impl Capacity {
    pub fn is_consistent(&self) -> bool {
        self.min <= self.desired && self.desired <= self.max
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AutoScalingGroup {
    pub id: ResourceId,
    pub launch_template: ResourceId,
    pub capacity: Capacity,
    pub subnets: Vec<ResourceId>,
}

/// Everything the compute provisioner describes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComputePlan {
    pub security_group: SecurityGroup,
    pub role: InstanceRole,
    pub launch_template: LaunchTemplate,
    pub instances: Vec<ComputeInstance>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub auto_scaling_group: Option<AutoScalingGroup>,
}

impl ComputePlan {
    pub fn instance(&self, id: &ResourceId) -> Option<&ComputeInstance> {
        self.instances.iter().find(|i| &i.id == id)
    }
}
