// Copyright (c) 2025 - Cowboy AI, Inc.
//! Route table planning
//!
//! Groups subnets into route tables by tier (network-wide or per zone),
//! creates the gateways their default routes need and binds every subnet
//! to its table.

use std::collections::BTreeMap;
use tracing::debug;

use super::address::SubnetAllocation;
use crate::config::{NatGatewayPolicy, RouteTableScope};
use crate::domain::{
    ElasticIp, Gateway, GatewayKind, Ipv4Network, ResourceId, Route, RouteTable,
    RouteTableAssociation, RouteTarget, SubnetTier, TopologyError,
};
use crate::errors::AssemblyResult;

/// Gateways, tables and associations for one network
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutingPlan {
    pub gateways: Vec<Gateway>,
    pub elastic_ips: Vec<ElasticIp>,
    pub route_tables: Vec<RouteTable>,
    pub associations: Vec<RouteTableAssociation>,
}

impl RoutingPlan {
    /// Route table bound to a subnet
    pub fn table_for(&self, subnet: &ResourceId) -> Option<&ResourceId> {
        self.associations
            .iter()
            .find(|a| &a.subnet == subnet)
            .map(|a| &a.route_table)
    }
}

#[derive(Debug, Clone)]
pub struct RouteTableBuilder {
    network: ResourceId,
    cidr: Ipv4Network,
    nat_policy: NatGatewayPolicy,
    scope: RouteTableScope,
}

impl RouteTableBuilder {
    pub fn new(network: ResourceId, cidr: Ipv4Network) -> Self {
        Self {
            network,
            cidr,
            nat_policy: NatGatewayPolicy::default(),
            scope: RouteTableScope::default(),
        }
    }

    pub fn nat_policy(mut self, policy: NatGatewayPolicy) -> Self {
        self.nat_policy = policy;
        self
    }

    pub fn scope(mut self, scope: RouteTableScope) -> Self {
        self.scope = scope;
        self
    }

    pub fn build(&self, allocations: &[SubnetAllocation]) -> AssemblyResult<RoutingPlan> {
        let has_tier = |tier: SubnetTier| allocations.iter().any(|a| a.tier == tier);

        let mut gateways = Vec::new();
        let mut elastic_ips = Vec::new();

        let internet_gateway = if has_tier(SubnetTier::Public) {
            let gateway = Gateway {
                id: ResourceId::new("InternetGateway")?,
                kind: GatewayKind::Internet {
                    network: self.network.clone(),
                },
            };
            let id = gateway.id.clone();
            gateways.push(gateway);
            Some(id)
        } else {
            None
        };

        // NAT gateway ids keyed by zone index; `None` serves every zone
        let mut nat_by_zone: BTreeMap<Option<usize>, ResourceId> = BTreeMap::new();
        if has_tier(SubnetTier::PrivateApp) {
            let zones: Vec<Option<usize>> = match self.nat_policy {
                NatGatewayPolicy::Single => vec![None],
                NatGatewayPolicy::PerAvailabilityZone => {
                    let mut zones: Vec<usize> = allocations
                        .iter()
                        .filter(|a| a.tier == SubnetTier::PrivateApp)
                        .map(|a| a.zone_index)
                        .collect();
                    zones.sort_unstable();
                    zones.dedup();
                    zones.into_iter().map(Some).collect()
                }
            };

            for (n, zone) in zones.into_iter().enumerate() {
                let host = allocations
                    .iter()
                    .find(|a| a.tier.is_public() && zone.map_or(true, |z| a.zone_index == z))
                    .ok_or(TopologyError::NatRequiresPublicSubnet)?;

                let id = ResourceId::new(format!("NatGateway{}", n + 1))?;
                let elastic_ip = ResourceId::new(format!("{}Eip", id))?;
                debug!(gateway = %id, subnet = %host.id, "placed NAT gateway");

                elastic_ips.push(ElasticIp {
                    id: elastic_ip.clone(),
                });
                gateways.push(Gateway {
                    id: id.clone(),
                    kind: GatewayKind::Nat {
                        subnet: host.id.clone(),
                        elastic_ip,
                    },
                });
                nat_by_zone.insert(zone, id);
            }
        }

        let mut route_tables: Vec<RouteTable> = Vec::new();
        let mut associations = Vec::with_capacity(allocations.len());

        for allocation in allocations {
            let zone_scoped = match allocation.tier {
                // A shared table cannot carry one default route per zone
                SubnetTier::PrivateApp => {
                    self.scope == RouteTableScope::PerAvailabilityZone
                        || self.nat_policy == NatGatewayPolicy::PerAvailabilityZone
                }
                _ => self.scope == RouteTableScope::PerAvailabilityZone,
            };

            let table_id = if zone_scoped {
                ResourceId::new(format!(
                    "{}RouteTable{}",
                    allocation.tier,
                    allocation.zone_index + 1
                ))?
            } else {
                ResourceId::new(format!("{}RouteTable", allocation.tier))?
            };

            if !route_tables.iter().any(|t| t.id == table_id) {
                let mut routes = vec![Route::local(self.cidr)];
                match allocation.tier {
                    SubnetTier::Public => {
                        if let Some(igw) = &internet_gateway {
                            routes.push(Route::default_via(RouteTarget::InternetGateway(
                                igw.clone(),
                            )));
                        }
                    }
                    SubnetTier::PrivateApp => {
                        let nat = nat_by_zone
                            .get(&Some(allocation.zone_index))
                            .or_else(|| nat_by_zone.get(&None))
                            .ok_or(TopologyError::NatRequiresPublicSubnet)?;
                        routes.push(Route::default_via(RouteTarget::NatGateway(nat.clone())));
                    }
                    SubnetTier::PrivateIsolated => {}
                }

                debug!(route_table = %table_id, tier = %allocation.tier, "created route table");
                route_tables.push(RouteTable {
                    id: table_id.clone(),
                    tier: allocation.tier,
                    availability_zone: zone_scoped.then(|| allocation.availability_zone.clone()),
                    routes,
                });
            }

            associations.push(RouteTableAssociation {
                id: ResourceId::new(format!("{}RouteTableAssociation", allocation.id))?,
                subnet: allocation.id.clone(),
                route_table: table_id,
            });
        }

        Ok(RoutingPlan {
            gateways,
            elastic_ips,
            route_tables,
            associations,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SubnetRequest;
    use crate::domain::AvailabilityZone;
    use crate::errors::AssemblyError;
    use crate::planner::AddressPlanner;
    use pretty_assertions::assert_eq;

    fn allocate(zone_count: usize, requests: &[SubnetRequest]) -> Vec<SubnetAllocation> {
        let zones = AvailabilityZone::for_region("us-east-1", zone_count).unwrap();
        AddressPlanner::new("10.0.0.0/16".parse().unwrap(), zones)
            .plan(requests)
            .unwrap()
    }

    fn builder() -> RouteTableBuilder {
        RouteTableBuilder::new(
            ResourceId::new("Network").unwrap(),
            "10.0.0.0/16".parse().unwrap(),
        )
    }

    fn table_ids(plan: &RoutingPlan) -> Vec<&str> {
        plan.route_tables.iter().map(|t| t.id.as_str()).collect()
    }

    #[test]
    fn test_shared_tables_single_nat() {
        let allocations = allocate(
            2,
            &[
                SubnetRequest::new("Public", SubnetTier::Public, 24),
                SubnetRequest::new("PrivateApp", SubnetTier::PrivateApp, 24),
            ],
        );
        let plan = builder().build(&allocations).unwrap();

        assert_eq!(table_ids(&plan), vec!["PublicRouteTable", "PrivateAppRouteTable"]);
        assert_eq!(plan.gateways.len(), 2);
        assert_eq!(plan.elastic_ips.len(), 1);
        assert_eq!(plan.associations.len(), 4);

        let nat = plan.gateways.iter().find(|g| g.is_nat()).unwrap();
        assert_eq!(nat.subnet().unwrap().as_str(), "PublicSubnet1");
    }

    #[test]
    fn test_private_groups_share_one_table() {
        let allocations = allocate(
            2,
            &[
                SubnetRequest::new("Public", SubnetTier::Public, 24),
                SubnetRequest::new("PrivateApp", SubnetTier::PrivateApp, 24),
                SubnetRequest::new("PrivateDB", SubnetTier::PrivateApp, 24),
            ],
        );
        let plan = builder().build(&allocations).unwrap();

        assert_eq!(plan.route_tables.len(), 2);
        let db = ResourceId::new("PrivateDBSubnet2").unwrap();
        assert_eq!(plan.table_for(&db).unwrap().as_str(), "PrivateAppRouteTable");
    }

    #[test]
    fn test_nat_per_zone_scopes_private_tables() {
        let allocations = allocate(
            3,
            &[
                SubnetRequest::new("Public", SubnetTier::Public, 24),
                SubnetRequest::new("PrivateApp", SubnetTier::PrivateApp, 24),
            ],
        );
        let plan = builder()
            .nat_policy(NatGatewayPolicy::PerAvailabilityZone)
            .build(&allocations)
            .unwrap();

        assert_eq!(
            table_ids(&plan),
            vec![
                "PublicRouteTable",
                "PrivateAppRouteTable1",
                "PrivateAppRouteTable2",
                "PrivateAppRouteTable3"
            ]
        );
        assert_eq!(plan.gateways.iter().filter(|g| g.is_nat()).count(), 3);

        let table = &plan.route_tables[2];
        assert_eq!(table.availability_zone.as_ref().unwrap().as_str(), "us-east-1b");
        assert_eq!(
            table.default_route().unwrap().target,
            RouteTarget::NatGateway(ResourceId::new("NatGateway2").unwrap())
        );
        let nat2 = plan.gateways.iter().find(|g| g.id.as_str() == "NatGateway2").unwrap();
        assert_eq!(nat2.subnet().unwrap().as_str(), "PublicSubnet2");
    }

    #[test]
    fn test_per_zone_scope() {
        let allocations = allocate(2, &[SubnetRequest::new("Public", SubnetTier::Public, 24)]);
        let plan = builder()
            .scope(RouteTableScope::PerAvailabilityZone)
            .build(&allocations)
            .unwrap();

        assert_eq!(table_ids(&plan), vec!["PublicRouteTable1", "PublicRouteTable2"]);
        assert!(plan.gateways.iter().all(|g| g.is_internet()));
    }

    #[test]
    fn test_isolated_tier_has_no_default_route() {
        let allocations =
            allocate(2, &[SubnetRequest::new("Data", SubnetTier::PrivateIsolated, 24)]);
        let plan = builder().build(&allocations).unwrap();

        assert!(plan.gateways.is_empty());
        assert_eq!(plan.route_tables.len(), 1);
        assert!(plan.route_tables[0].default_route().is_none());
        assert_eq!(
            plan.route_tables[0].routes,
            vec![Route::local("10.0.0.0/16".parse().unwrap())]
        );
    }

    #[test]
    fn test_private_egress_without_public_subnet_fails() {
        let allocations =
            allocate(2, &[SubnetRequest::new("PrivateApp", SubnetTier::PrivateApp, 24)]);
        let result = builder().build(&allocations);

        assert_eq!(
            result,
            Err(AssemblyError::Topology(TopologyError::NatRequiresPublicSubnet))
        );
    }
}
