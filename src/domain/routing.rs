// Copyright (c) 2025 - Cowboy AI, Inc.
//! Routing Entities
//!
//! Gateways, route tables and their subnet associations.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::network::{Ipv4Network, SubnetTier};
use super::value_objects::{AvailabilityZone, ResourceId};

/// Kind of gateway, with the references each kind needs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GatewayKind {
    /// Internet gateway attached to a network
    Internet { network: ResourceId },
    /// NAT gateway living in a public subnet behind a static address
    Nat {
        subnet: ResourceId,
        elastic_ip: ResourceId,
    },
}

/// Gateway entity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Gateway {
    pub id: ResourceId,
    #[serde(flatten)]
    pub kind: GatewayKind,
}

impl Gateway {
    pub fn is_internet(&self) -> bool {
        matches!(self.kind, GatewayKind::Internet { .. })
    }

    pub fn is_nat(&self) -> bool {
        matches!(self.kind, GatewayKind::Nat { .. })
    }

    /// Subnet hosting this gateway (NAT only)
    pub fn subnet(&self) -> Option<&ResourceId> {
        match &self.kind {
            GatewayKind::Nat { subnet, .. } => Some(subnet),
            GatewayKind::Internet { .. } => None,
        }
    }
}

/// Static public address allocated for a NAT gateway
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElasticIp {
    pub id: ResourceId,
}

/// Where a route sends traffic
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "gateway", rename_all = "snake_case")]
pub enum RouteTarget {
    /// Delivered inside the network
    Local,
    InternetGateway(ResourceId),
    NatGateway(ResourceId),
}

impl RouteTarget {
    pub fn gateway(&self) -> Option<&ResourceId> {
        match self {
            RouteTarget::Local => None,
            RouteTarget::InternetGateway(id) | RouteTarget::NatGateway(id) => Some(id),
        }
    }
}

impl fmt::Display for RouteTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RouteTarget::Local => write!(f, "local"),
            RouteTarget::InternetGateway(id) => write!(f, "igw:{}", id),
            RouteTarget::NatGateway(id) => write!(f, "nat:{}", id),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Route {
    pub destination: Ipv4Network,
    pub target: RouteTarget,
}

impl Route {
    pub fn local(network: Ipv4Network) -> Self {
        Self {
            destination: network,
            target: RouteTarget::Local,
        }
    }

    pub fn default_via(target: RouteTarget) -> Self {
        Self {
            destination: Ipv4Network::DEFAULT_ROUTE,
            target,
        }
    }

    pub fn is_default(&self) -> bool {
        self.destination.is_default_route()
    }
}

/// Route table shared by the subnets of one tier, globally or within one AZ
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteTable {
    pub id: ResourceId,
    pub tier: SubnetTier,
    /// Set when the table is scoped to a single availability zone
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub availability_zone: Option<AvailabilityZone>,
    pub routes: Vec<Route>,
}

impl RouteTable {
    pub fn default_routes(&self) -> impl Iterator<Item = &Route> {
        self.routes.iter().filter(|r| r.is_default())
    }

    /// The single default route, if exactly one exists
    pub fn default_route(&self) -> Option<&Route> {
        let mut defaults = self.default_routes();
        match (defaults.next(), defaults.next()) {
            (Some(route), None) => Some(route),
            _ => None,
        }
    }

    /// Whether traffic to `destination` stays inside the network
    pub fn routes_locally(&self, destination: &Ipv4Network) -> bool {
        self.routes
            .iter()
            .any(|r| r.target == RouteTarget::Local && r.destination.contains(destination))
    }
}

/// Binding of one subnet to its route table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteTableAssociation {
    pub id: ResourceId,
    pub subnet: ResourceId,
    pub route_table: ResourceId,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(s: &str) -> ResourceId {
        ResourceId::new(s).unwrap()
    }

    #[test]
    fn test_default_route_requires_exactly_one() {
        let vpc: Ipv4Network = "10.0.0.0/16".parse().unwrap();
        let mut table = RouteTable {
            id: id("PublicRouteTable"),
            tier: SubnetTier::Public,
            availability_zone: None,
            routes: vec![Route::local(vpc)],
        };
        assert!(table.default_route().is_none());

        table
            .routes
            .push(Route::default_via(RouteTarget::InternetGateway(id("InternetGateway"))));
        assert_eq!(
            table.default_route().unwrap().target.gateway(),
            Some(&id("InternetGateway"))
        );

        table
            .routes
            .push(Route::default_via(RouteTarget::NatGateway(id("NatGateway1"))));
        assert!(table.default_route().is_none());
        assert_eq!(table.default_routes().count(), 2);
    }

    #[test]
    fn test_routes_locally() {
        let vpc: Ipv4Network = "10.0.0.0/16".parse().unwrap();
        let table = RouteTable {
            id: id("PrivateAppRouteTable"),
            tier: SubnetTier::PrivateApp,
            availability_zone: None,
            routes: vec![Route::local(vpc)],
        };
        assert!(table.routes_locally(&"10.0.2.0/24".parse().unwrap()));
        assert!(!table.routes_locally(&"10.1.2.0/24".parse().unwrap()));
    }

    #[test]
    fn test_gateway_serialization() {
        let nat = Gateway {
            id: id("NatGateway1"),
            kind: GatewayKind::Nat {
                subnet: id("PublicSubnet1"),
                elastic_ip: id("NatGateway1Eip"),
            },
        };
        let json = serde_json::to_value(&nat).unwrap();
        assert_eq!(json["kind"], "nat");
        assert_eq!(json["subnet"], "PublicSubnet1");

        let back: Gateway = serde_json::from_value(json).unwrap();
        assert_eq!(back, nat);
        assert!(back.is_nat());
    }
}
