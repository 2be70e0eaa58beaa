// Copyright (c) 2025 - Cowboy AI, Inc.
//! Network Value Objects and Entities
//!
//! CIDR arithmetic plus the network, subnet and tier types the address
//! planner and route table builder work with.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::Ipv4Addr;
use std::str::FromStr;
use thiserror::Error;

use super::value_objects::{AvailabilityZone, ResourceId};

/// Network validation error
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum NetworkError {
    #[error("Invalid IP address format: {0}")]
    InvalidIpAddress(String),

    #[error("Invalid CIDR notation: {0}")]
    InvalidCidr(String),

    #[error("Invalid prefix length: {0} (must be 0-32 for IPv4)")]
    InvalidPrefixLength(u8),

    #[error("Host bits set in {0}: address must be the network boundary")]
    HostBitsSet(String),
}

/// IPv4 network with CIDR notation
///
/// Invariants:
/// - Prefix length 0-32
/// - Address is the first address of the block (no host bits set)
///
/// # Examples
///
/// ```rust
/// use cim_network_topology::domain::Ipv4Network;
///
/// let vpc: Ipv4Network = "10.0.0.0/16".parse().unwrap();
/// let subnet: Ipv4Network = "10.0.3.0/24".parse().unwrap();
/// assert!(vpc.contains(&subnet));
/// assert_eq!(subnet.size(), 256);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Ipv4Network {
    address: Ipv4Addr,
    prefix_len: u8,
}

impl Ipv4Network {
    /// Destination of a default route
    pub const DEFAULT_ROUTE: Ipv4Network = Ipv4Network {
        address: Ipv4Addr::UNSPECIFIED,
        prefix_len: 0,
    };

    pub fn new(address: Ipv4Addr, prefix_len: u8) -> Result<Self, NetworkError> {
        if prefix_len > 32 {
            return Err(NetworkError::InvalidPrefixLength(prefix_len));
        }
        let network = Self { address, prefix_len };
        if u32::from(address) & !network.netmask() != 0 {
            return Err(NetworkError::HostBitsSet(format!("{}/{}", address, prefix_len)));
        }
        Ok(network)
    }

    pub fn address(&self) -> Ipv4Addr {
        self.address
    }

    pub fn prefix_len(&self) -> u8 {
        self.prefix_len
    }

    pub fn netmask(&self) -> u32 {
        match self.prefix_len {
            0 => 0,
            p => u32::MAX << (32 - u32::from(p)),
        }
    }

    /// Number of addresses in the block
    pub fn size(&self) -> u64 {
        1u64 << (32 - u32::from(self.prefix_len))
    }

    /// First address as an integer
    pub fn first(&self) -> u32 {
        u32::from(self.address)
    }

    /// Last address as an integer
    pub fn last(&self) -> u32 {
        self.first() | !self.netmask()
    }

    pub fn contains_addr(&self, addr: Ipv4Addr) -> bool {
        u32::from(addr) & self.netmask() == self.first()
    }

    /// Whether `other` lies entirely inside this block
    pub fn contains(&self, other: &Ipv4Network) -> bool {
        other.prefix_len >= self.prefix_len && other.first() & self.netmask() == self.first()
    }

    pub fn overlaps(&self, other: &Ipv4Network) -> bool {
        self.contains(other) || other.contains(self)
    }

    pub fn is_default_route(&self) -> bool {
        self.prefix_len == 0
    }
}

impl fmt::Display for Ipv4Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.address, self.prefix_len)
    }
}

impl FromStr for Ipv4Network {
    type Err = NetworkError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (addr_str, prefix_str) = s
            .split_once('/')
            .ok_or_else(|| NetworkError::InvalidCidr(s.to_string()))?;

        let address = addr_str
            .parse::<Ipv4Addr>()
            .map_err(|_| NetworkError::InvalidIpAddress(addr_str.to_string()))?;

        let prefix_len = prefix_str
            .parse::<u8>()
            .map_err(|_| NetworkError::InvalidCidr(s.to_string()))?;

        Self::new(address, prefix_len)
    }
}

impl TryFrom<String> for Ipv4Network {
    type Error = NetworkError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Ipv4Network> for String {
    fn from(network: Ipv4Network) -> Self {
        network.to_string()
    }
}

/// Subnet classification by reachability
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubnetTier {
    /// Routed to the internet gateway, instances get public addresses
    Public,
    /// Outbound-only internet access through a NAT gateway
    PrivateApp,
    /// No route out of the network
    PrivateIsolated,
}

impl SubnetTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubnetTier::Public => "Public",
            SubnetTier::PrivateApp => "PrivateApp",
            SubnetTier::PrivateIsolated => "PrivateIsolated",
        }
    }

    /// Whether route tables of this tier carry a default route
    pub fn has_egress(&self) -> bool {
        !matches!(self, SubnetTier::PrivateIsolated)
    }

    pub fn is_public(&self) -> bool {
        matches!(self, SubnetTier::Public)
    }
}

impl fmt::Display for SubnetTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A subnet carved out of the network for one (tier group, AZ) pair
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subnet {
    pub id: ResourceId,
    /// Name of the subnet group this subnet belongs to (e.g. `PrivateDB`)
    pub group: String,
    pub tier: SubnetTier,
    pub availability_zone: AvailabilityZone,
    pub cidr: Ipv4Network,
    pub route_table: ResourceId,
    pub map_public_ip_on_launch: bool,
}

impl Subnet {
    /// Addresses the provider keeps in every subnet: network, router, DNS,
    /// one reserved for future use and broadcast
    pub const RESERVED_ADDRESSES: u64 = 5;

    /// Addresses left for instances
    pub fn usable_addresses(&self) -> u64 {
        self.cidr.size().saturating_sub(Self::RESERVED_ADDRESSES)
    }
}

/// The virtual network and its subnets
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Network {
    pub id: ResourceId,
    pub cidr: Ipv4Network,
    pub availability_zones: Vec<AvailabilityZone>,
    pub subnets: Vec<Subnet>,
}

impl Network {
    pub fn subnet(&self, id: &ResourceId) -> Option<&Subnet> {
        self.subnets.iter().find(|s| &s.id == id)
    }

    pub fn subnets_in_tier(&self, tier: SubnetTier) -> impl Iterator<Item = &Subnet> {
        self.subnets.iter().filter(move |s| s.tier == tier)
    }
}
