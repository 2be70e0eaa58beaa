// Copyright (c) 2025 - Cowboy AI, Inc.
//! Load balancer wiring
//!
//! Staged: the target group exists first, instances are registered into it,
//! and only then can a listener forward to it.

use std::collections::BTreeSet;
use tracing::debug;

use crate::config::LoadBalancerSpec;
use crate::domain::{
    ComputeInstance, IngressRule, Listener, LoadBalancer, ResourceId, Scheme, SecurityGroup,
    Subnet, SubnetTier, TargetGroup, TopologyError,
};
use crate::errors::{AssemblyError, AssemblyResult};

#[derive(Debug, Clone)]
pub struct LoadBalancerWiring<'a> {
    spec: &'a LoadBalancerSpec,
    target_group: TargetGroup,
    registered: BTreeSet<ResourceId>,
}

impl<'a> LoadBalancerWiring<'a> {
    /// Start wiring with an empty target group
    pub fn new(spec: &'a LoadBalancerSpec) -> AssemblyResult<Self> {
        let target_group = TargetGroup {
            id: ResourceId::new("TargetGroup")?,
            protocol: spec.protocol,
            port: spec.target_port(),
            health_check_path: spec.health_check_path.clone(),
            targets: Vec::new(),
        };
        Ok(Self {
            spec,
            target_group,
            registered: BTreeSet::new(),
        })
    }

    pub fn target_group(&self) -> &TargetGroup {
        &self.target_group
    }

    /// Register instances as targets; an instance already registered is skipped
    pub fn register_targets<'i>(
        &mut self,
        instances: impl IntoIterator<Item = &'i ComputeInstance>,
    ) -> &mut Self {
        for instance in instances {
            if self.registered.insert(instance.id.clone()) {
                debug!(
                    target_group = %self.target_group.id,
                    target = %instance.id,
                    "registered target"
                );
                self.target_group.targets.push(instance.id.clone());
            }
        }
        self
    }

    /// Listener forwarding the listener port to the target group
    pub fn listener(&self) -> AssemblyResult<Listener> {
        if self.target_group.is_empty() {
            return Err(AssemblyError::EmptyTargetGroup {
                target_group: self.target_group.id.clone(),
            });
        }
        Ok(Listener {
            id: ResourceId::new("Listener")?,
            port: self.spec.port,
            protocol: self.spec.protocol,
            forward_to: self.target_group.id.clone(),
        })
    }

    /// Finish the balancer inside the subnets matching its scheme
    pub fn wire(self, subnets: &[Subnet]) -> AssemblyResult<LoadBalancer> {
        let listener = self.listener()?;
        let placement = balancer_subnets(self.spec.scheme, subnets)?;

        let security_group = SecurityGroup {
            id: ResourceId::new("LoadBalancerSecurityGroup")?,
            description: format!("Load balancer ingress on {}", self.spec.port),
            ingress: vec![IngressRule::tcp_from_anywhere(self.spec.port)],
            allow_all_outbound: true,
        };

        Ok(LoadBalancer {
            id: ResourceId::new("LoadBalancer")?,
            scheme: self.spec.scheme,
            subnets: placement,
            security_group,
            target_group: self.target_group,
            listener,
        })
    }
}

/// One subnet per zone from the first group of the tier the scheme calls for
fn balancer_subnets(scheme: Scheme, subnets: &[Subnet]) -> AssemblyResult<Vec<ResourceId>> {
    let tiers: &[SubnetTier] = match scheme {
        Scheme::InternetFacing => &[SubnetTier::Public],
        Scheme::Internal => &[SubnetTier::PrivateApp, SubnetTier::PrivateIsolated],
    };

    let first = tiers
        .iter()
        .find_map(|tier| subnets.iter().find(|s| s.tier == *tier))
        .ok_or_else(|| TopologyError::NoSubnetsForTier {
            tier: tiers[0],
            purpose: format!("{} load balancer", scheme),
        })?;

    Ok(subnets
        .iter()
        .filter(|s| s.group == first.group)
        .map(|s| s.id.clone())
        .collect())
}
