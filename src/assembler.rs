// Copyright (c) 2025 - Cowboy AI, Inc.
//! Topology assembly
//!
//! Runs the planners in dependency order (network, subnets, routing,
//! compute, load balancer) and checks the finished graph before returning
//! it. A failure at any stage returns the error and no graph.

use tracing::{debug, info};

use crate::config::TopologyConfig;
use crate::domain::invariants::validate_graph;
use crate::domain::{
    AttributeRef, Network, ResourceId, StackOutput, Subnet, SubnetTier, TopologyError, TopologyId,
};
use crate::errors::AssemblyResult;
use crate::graph::ResourceGraph;
use crate::planner::{AddressPlanner, ComputeProvisioner, LoadBalancerWiring, RouteTableBuilder};

/// Logical id of the virtual network
pub const NETWORK_ID: &str = "Vpc";

/// Name of the exported load balancer DNS output
pub const DNS_NAME_OUTPUT: &str = "LoadBalancerDnsName";

#[derive(Debug, Clone, Copy, Default)]
pub struct TopologyAssembler;

impl TopologyAssembler {
    pub fn new() -> Self {
        Self
    }

    pub fn assemble(&self, config: &TopologyConfig) -> AssemblyResult<ResourceGraph> {
        config.validate()?;
        info!(
            stack = %config.stack_name,
            region = %config.region,
            cidr = %config.network.cidr,
            "assembling topology"
        );

        let zones = config.availability_zones()?;
        let network_id = ResourceId::new(NETWORK_ID)?;

        let allocations = AddressPlanner::new(config.network.cidr, zones.clone())
            .plan(&config.network.subnets)?;
        debug!(subnets = allocations.len(), "address plan complete");

        let routing = RouteTableBuilder::new(network_id.clone(), config.network.cidr)
            .nat_policy(config.network.nat_gateways)
            .scope(config.network.route_table_scope)
            .build(&allocations)?;
        debug!(
            gateways = routing.gateways.len(),
            route_tables = routing.route_tables.len(),
            "routing plan complete"
        );

        let subnets = allocations
            .into_iter()
            .map(|allocation| -> AssemblyResult<Subnet> {
                let route_table = routing.table_for(&allocation.id).cloned().ok_or_else(|| {
                    TopologyError::OrphanedSubnet {
                        subnet: allocation.id.clone(),
                    }
                })?;
                Ok(Subnet {
                    map_public_ip_on_launch: allocation.tier == SubnetTier::Public,
                    id: allocation.id,
                    group: allocation.group,
                    tier: allocation.tier,
                    availability_zone: allocation.availability_zone,
                    cidr: allocation.cidr,
                    route_table,
                })
            })
            .collect::<AssemblyResult<Vec<_>>>()?;

        let compute = config
            .compute
            .as_ref()
            .map(|spec| ComputeProvisioner::new(spec).provision(&subnets))
            .transpose()?;

        let load_balancer = match &config.load_balancer {
            Some(spec) => {
                let mut wiring = LoadBalancerWiring::new(spec)?;
                if let Some(plan) = &compute {
                    wiring.register_targets(&plan.instances);
                }
                Some(wiring.wire(&subnets)?)
            }
            None => None,
        };

        let outputs = match &load_balancer {
            Some(balancer) => vec![StackOutput {
                name: DNS_NAME_OUTPUT.to_string(),
                parameter_name: config.parameter_name(DNS_NAME_OUTPUT),
                value: AttributeRef::dns_name(balancer.id.clone()),
            }],
            None => Vec::new(),
        };

        let graph = ResourceGraph {
            id: TopologyId::for_stack(&config.stack_name),
            stack_name: config.stack_name.clone(),
            region: config.region.clone(),
            network: Network {
                id: network_id,
                cidr: config.network.cidr,
                availability_zones: zones,
                subnets,
            },
            gateways: routing.gateways,
            elastic_ips: routing.elastic_ips,
            route_tables: routing.route_tables,
            associations: routing.associations,
            compute,
            load_balancer,
            outputs,
        };

        validate_graph(&graph)?;
        info!(
            stack = %graph.stack_name,
            topology_id = %graph.id,
            resources = graph.resource_ids().len(),
            "topology assembled"
        );
        Ok(graph)
    }
}
