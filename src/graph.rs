// Copyright (c) 2025 - Cowboy AI, Inc.
//! Assembled Resource Graph
//!
//! The read-only result of an assembly run. Every cross-reference is a
//! [`ResourceId`], so the graph serializes as plain data for a provisioning
//! backend and can be checked with [`crate::domain::invariants`].

use serde::{Deserialize, Serialize};

use crate::domain::{
    ComputePlan, ElasticIp, Gateway, LoadBalancer, Network, ResourceId, RouteTable,
    RouteTableAssociation, StackOutput, Subnet, SubnetTier, TopologyId,
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceGraph {
    pub id: TopologyId,
    pub stack_name: String,
    pub region: String,
    pub network: Network,
    pub gateways: Vec<Gateway>,
    pub elastic_ips: Vec<ElasticIp>,
    pub route_tables: Vec<RouteTable>,
    pub associations: Vec<RouteTableAssociation>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub compute: Option<ComputePlan>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub load_balancer: Option<LoadBalancer>,
    pub outputs: Vec<StackOutput>,
}

impl ResourceGraph {
    pub fn gateway(&self, id: &ResourceId) -> Option<&Gateway> {
        self.gateways.iter().find(|g| &g.id == id)
    }

    pub fn route_table(&self, id: &ResourceId) -> Option<&RouteTable> {
        self.route_tables.iter().find(|t| &t.id == id)
    }

    pub fn subnet(&self, id: &ResourceId) -> Option<&Subnet> {
        self.network.subnet(id)
    }

    pub fn internet_gateway(&self) -> Option<&Gateway> {
        self.gateways.iter().find(|g| g.is_internet())
    }

    pub fn nat_gateways(&self) -> impl Iterator<Item = &Gateway> {
        self.gateways.iter().filter(|g| g.is_nat())
    }

    pub fn subnets_in_tier(&self, tier: SubnetTier) -> impl Iterator<Item = &Subnet> {
        self.network.subnets_in_tier(tier)
    }

    /// Follow a subnet's route table to the gateway behind its default route
    pub fn default_gateway_for(&self, subnet: &ResourceId) -> Option<&Gateway> {
        let subnet = self.subnet(subnet)?;
        let table = self.route_table(&subnet.route_table)?;
        let gateway = table.default_route()?.target.gateway()?;
        self.gateway(gateway)
    }

    /// Output carrying the load balancer's DNS name, if a balancer exists
    pub fn dns_name_output(&self) -> Option<&StackOutput> {
        let balancer = self.load_balancer.as_ref()?;
        self.outputs.iter().find(|o| o.value.resource == balancer.id)
    }

    /// Every logical id in the graph, in declaration order
    pub fn resource_ids(&self) -> Vec<&ResourceId> {
        let mut ids = vec![&self.network.id];
        ids.extend(self.network.subnets.iter().map(|s| &s.id));
        ids.extend(self.gateways.iter().map(|g| &g.id));
        ids.extend(self.elastic_ips.iter().map(|e| &e.id));
        ids.extend(self.route_tables.iter().map(|t| &t.id));
        ids.extend(self.associations.iter().map(|a| &a.id));
        if let Some(compute) = &self.compute {
            ids.push(&compute.security_group.id);
            ids.push(&compute.role.id);
            ids.push(&compute.launch_template.id);
            ids.extend(compute.instances.iter().map(|i| &i.id));
            if let Some(group) = &compute.auto_scaling_group {
                ids.push(&group.id);
            }
        }
        if let Some(balancer) = &self.load_balancer {
            ids.push(&balancer.id);
            ids.push(&balancer.security_group.id);
            ids.push(&balancer.target_group.id);
            ids.push(&balancer.listener.id);
        }
        ids
    }

    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
