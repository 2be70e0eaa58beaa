// Copyright (c) 2025 - Cowboy AI, Inc.
//! Compute provisioning
//!
//! Describes the instances of a [`ComputeSpec`] together with the security
//! group, role and launch template they share. Instances are spread
//! round-robin over the subnets of the placement tier.

use tracing::debug;

use crate::config::ComputeSpec;
use crate::domain::{
    AutoScalingGroup, BootstrapScript, Capacity, ComputeInstance, ComputePlan, IngressRule,
    InstanceRole, LaunchTemplate, Port, ResourceId, SecurityGroup, Subnet, TopologyError,
};
use crate::errors::AssemblyResult;

/// Service principal instances assume their role through
pub const INSTANCE_PRINCIPAL: &str = "ec2.amazonaws.com";

#[derive(Debug, Clone)]
pub struct ComputeProvisioner<'a> {
    spec: &'a ComputeSpec,
}

impl<'a> ComputeProvisioner<'a> {
    pub fn new(spec: &'a ComputeSpec) -> Self {
        Self { spec }
    }

    pub fn provision(&self, subnets: &[Subnet]) -> AssemblyResult<ComputePlan> {
        let spec = self.spec;
        let placement: Vec<&Subnet> = subnets
            .iter()
            .filter(|s| s.tier == spec.placement)
            .collect();
        if placement.is_empty() {
            return Err(TopologyError::NoSubnetsForTier {
                tier: spec.placement,
                purpose: "instance placement".to_string(),
            }
            .into());
        }
        ensure_capacity(spec.count, &placement)?;

        let ports = dedup_ports(&spec.ports);
        let security_group = SecurityGroup {
            id: ResourceId::new("InstanceSecurityGroup")?,
            description: format!(
                "Instance ingress on {}",
                if ports.is_empty() {
                    "no ports".to_string()
                } else {
                    ports.iter().map(Port::to_string).collect::<Vec<_>>().join(", ")
                }
            ),
            ingress: ports.iter().copied().map(IngressRule::tcp_from_anywhere).collect(),
            allow_all_outbound: spec.allow_all_outbound,
        };

        let role = InstanceRole {
            id: ResourceId::new("InstanceRole")?,
            assumed_by: INSTANCE_PRINCIPAL.to_string(),
            managed_policies: spec.managed_policies.clone(),
        };

        let bootstrap = BootstrapScript::new(spec.bootstrap.iter().cloned());
        let launch_template = LaunchTemplate {
            id: ResourceId::new("LaunchTemplate")?,
            image: spec.image.clone(),
            instance_type: spec.instance_type.clone(),
            key_pair: spec.key_pair.clone(),
            security_group: security_group.id.clone(),
            role: role.id.clone(),
            user_data: bootstrap.clone(),
        };

        let instances = (0..spec.count as usize)
            .map(|n| -> AssemblyResult<ComputeInstance> {
                let subnet = placement[n % placement.len()];
                let id = ResourceId::new(format!("Instance{}", n + 1))?;
                debug!(instance = %id, subnet = %subnet.id, "placed instance");
                Ok(ComputeInstance {
                    id,
                    instance_type: spec.instance_type.clone(),
                    image: spec.image.clone(),
                    subnet: subnet.id.clone(),
                    availability_zone: subnet.availability_zone.clone(),
                    security_group: security_group.id.clone(),
                    ingress_ports: ports.clone(),
                    launch_template: launch_template.id.clone(),
                    bootstrap: bootstrap.clone(),
                })
            })
            .collect::<AssemblyResult<Vec<_>>>()?;

        let auto_scaling_group = match spec.scaling {
            Some(bounds) => Some(AutoScalingGroup {
                id: ResourceId::new("AutoScalingGroup")?,
                launch_template: launch_template.id.clone(),
                capacity: Capacity {
                    min: bounds.min,
                    max: bounds.max,
                    desired: spec.count,
                },
                subnets: placement.iter().map(|s| s.id.clone()).collect(),
            }),
            None => None,
        };

        Ok(ComputePlan {
            security_group,
            role,
            launch_template,
            instances,
            auto_scaling_group,
        })
    }
}

/// Round-robin placement must leave every subnet enough usable addresses
fn ensure_capacity(count: u32, placement: &[&Subnet]) -> AssemblyResult<()> {
    let count = u64::from(count);
    let slots = placement.len() as u64;
    for (n, subnet) in placement.iter().enumerate() {
        let instances = count / slots + u64::from((n as u64) < count % slots);
        let usable = subnet.usable_addresses();
        if instances > usable {
            return Err(TopologyError::SubnetCapacityExceeded {
                subnet: subnet.id.clone(),
                instances,
                usable,
            }
            .into());
        }
    }
    Ok(())
}

/// Remove repeated ports, keeping first-seen order
fn dedup_ports(ports: &[Port]) -> Vec<Port> {
    let mut unique = Vec::with_capacity(ports.len());
    for port in ports {
        if !unique.contains(port) {
            unique.push(*port);
        }
    }
    unique
}
