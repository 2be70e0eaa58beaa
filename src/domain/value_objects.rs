// Copyright (c) 2025 - Cowboy AI, Inc.
//! Topology Value Objects
//!
//! Identity and scalar building blocks of the topology model.
//! All value objects are immutable and validated on construction.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use uuid::Uuid;

/// Validation error for topology value objects
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValueError {
    #[error("Invalid resource ID: {0}")]
    InvalidResourceId(String),

    #[error("Invalid availability zone: {0}")]
    InvalidAvailabilityZone(String),

    #[error("Invalid port: {0} (must be 1-65535)")]
    InvalidPort(u32),

    #[error("Invalid instance type: {0} (expected <class>.<size>)")]
    InvalidInstanceType(String),

    #[error("Invalid machine image reference: {0}")]
    InvalidMachineImage(String),

    #[error("Invalid key pair name: {0}")]
    InvalidKeyPair(String),
}

// ============================================================================
// Identity Value Objects
// ============================================================================

/// Logical identifier of a resource inside the graph
///
/// Mirrors a template logical id: non-empty and ASCII alphanumeric, so ids
/// like `PublicSubnet1` or `NatGateway2` can be used as-is by a backend.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ResourceId(String);

impl ResourceId {
    /// Maximum logical id length accepted by provisioning templates
    pub const MAX_LENGTH: usize = 255;

    pub fn new(id: impl Into<String>) -> Result<Self, ValueError> {
        let id = id.into();
        if id.is_empty() || id.len() > Self::MAX_LENGTH {
            return Err(ValueError::InvalidResourceId(id));
        }
        if !id.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(ValueError::InvalidResourceId(id));
        }
        Ok(Self(id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ResourceId {
    type Err = ValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for ResourceId {
    type Error = ValueError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ResourceId> for String {
    fn from(id: ResourceId) -> Self {
        id.0
    }
}

/// Identifier of one assembled topology
///
/// Derived from the stack name with UUID v5, so assembling the same stack
/// twice yields the same id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TopologyId(Uuid);

impl TopologyId {
    /// Namespace for topology ids
    const NAMESPACE: Uuid = Uuid::from_u128(0x6a1f_4c3e_9b52_4d7a_8e21_03c4_5f6a_7b8c);

    pub fn for_stack(stack_name: &str) -> Self {
        Self(Uuid::new_v5(&Self::NAMESPACE, stack_name.as_bytes()))
    }

    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl fmt::Display for TopologyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// Placement Value Objects
// ============================================================================

/// Availability zone identifier (e.g. `us-east-1a`)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AvailabilityZone(String);

impl AvailabilityZone {
    /// Zones are lettered, so a region offers at most 26 of them
    pub const MAX_PER_REGION: usize = 26;

    pub fn new(zone: impl Into<String>) -> Result<Self, ValueError> {
        let zone = zone.into();
        let valid = !zone.is_empty()
            && zone
                .chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
            && zone.ends_with(|c: char| c.is_ascii_lowercase());
        if !valid {
            return Err(ValueError::InvalidAvailabilityZone(zone));
        }
        Ok(Self(zone))
    }

    /// Derive the first `count` lettered zones of a region
    pub fn for_region(region: &str, count: usize) -> Result<Vec<Self>, ValueError> {
        if count == 0 || count > Self::MAX_PER_REGION {
            return Err(ValueError::InvalidAvailabilityZone(format!(
                "{region}: cannot derive {count} zones"
            )));
        }
        (b'a'..)
            .take(count)
            .map(|letter| Self::new(format!("{region}{}", letter as char)))
            .collect()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AvailabilityZone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// TCP/UDP port number (1-65535)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u16")]
pub struct Port(u16);

impl Port {
    pub const SSH: Port = Port(22);
    pub const HTTP: Port = Port(80);
    pub const HTTPS: Port = Port(443);

    pub fn new(port: u32) -> Result<Self, ValueError> {
        match u16::try_from(port) {
            Ok(p) if p != 0 => Ok(Self(p)),
            _ => Err(ValueError::InvalidPort(port)),
        }
    }

    pub fn value(&self) -> u16 {
        self.0
    }
}

impl fmt::Display for Port {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<u32> for Port {
    type Error = ValueError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Port> for u16 {
    fn from(port: Port) -> Self {
        port.0
    }
}

// ============================================================================
// Compute Value Objects
// ============================================================================

/// Instance class and size, written `<class>.<size>` (e.g. `t2.micro`)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct InstanceType {
    class: String,
    size: String,
}

impl InstanceType {
    pub fn new(class: impl Into<String>, size: impl Into<String>) -> Result<Self, ValueError> {
        let class = class.into();
        let size = size.into();
        let well_formed = |part: &str| {
            !part.is_empty() && part.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
        };
        if !well_formed(&class) || !well_formed(&size) {
            return Err(ValueError::InvalidInstanceType(format!("{class}.{size}")));
        }
        Ok(Self { class, size })
    }

    pub fn class(&self) -> &str {
        &self.class
    }

    pub fn size(&self) -> &str {
        &self.size
    }
}

impl fmt::Display for InstanceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.class, self.size)
    }
}

impl FromStr for InstanceType {
    type Err = ValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (class, size) = s
            .split_once('.')
            .ok_or_else(|| ValueError::InvalidInstanceType(s.to_string()))?;
        Self::new(class, size)
    }
}

impl TryFrom<String> for InstanceType {
    type Error = ValueError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<InstanceType> for String {
    fn from(instance_type: InstanceType) -> Self {
        instance_type.to_string()
    }
}

/// Machine image reference
///
/// Either a named, backend-resolved image family or a pinned image id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "MachineImageRepr", into = "MachineImageRepr")]
pub enum MachineImage {
    /// Latest Amazon Linux 2, resolved by the backend at deploy time
    AmazonLinux2,
    /// Pinned image id (`ami-...`)
    Pinned(String),
}

impl MachineImage {
    pub fn pinned(id: impl Into<String>) -> Result<Self, ValueError> {
        let id = id.into();
        let suffix = id.strip_prefix("ami-").unwrap_or_default();
        if suffix.is_empty() || !suffix.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(ValueError::InvalidMachineImage(id));
        }
        Ok(Self::Pinned(id))
    }
}

/// Wire form of [`MachineImage`]; pinned ids are checked on the way in
#[derive(Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
enum MachineImageRepr {
    AmazonLinux2,
    Pinned(String),
}

impl TryFrom<MachineImageRepr> for MachineImage {
    type Error = ValueError;

    fn try_from(repr: MachineImageRepr) -> Result<Self, Self::Error> {
        match repr {
            MachineImageRepr::AmazonLinux2 => Ok(Self::AmazonLinux2),
            MachineImageRepr::Pinned(id) => Self::pinned(id),
        }
    }
}

impl From<MachineImage> for MachineImageRepr {
    fn from(image: MachineImage) -> Self {
        match image {
            MachineImage::AmazonLinux2 => Self::AmazonLinux2,
            MachineImage::Pinned(id) => Self::Pinned(id),
        }
    }
}

impl fmt::Display for MachineImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MachineImage::AmazonLinux2 => write!(f, "amazon-linux-2"),
            MachineImage::Pinned(id) => write!(f, "{}", id),
        }
    }
}

/// Name of an SSH key pair registered with the provider
///
/// Always supplied by configuration or environment.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct KeyPairName(String);

impl KeyPairName {
    pub fn new(name: impl Into<String>) -> Result<Self, ValueError> {
        let name = name.into();
        if name.trim().is_empty() || name.len() > 255 {
            return Err(ValueError::InvalidKeyPair(name));
        }
        Ok(Self(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

// Key names identify credentials, keep them out of debug logs.
impl fmt::Debug for KeyPairName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("KeyPairName(<redacted>)")
    }
}

impl TryFrom<String> for KeyPairName {
    type Error = ValueError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<KeyPairName> for String {
    fn from(name: KeyPairName) -> Self {
        name.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resource_id_creation() {
        let id = ResourceId::new("PublicSubnet1").unwrap();
        assert_eq!(id.as_str(), "PublicSubnet1");
    }

    #[test]
    fn test_resource_id_rejects_invalid() {
        assert!(ResourceId::new("").is_err());
        assert!(ResourceId::new("Public-Subnet").is_err());
        assert!(ResourceId::new("Public Subnet").is_err());
    }

    #[test]
    fn test_topology_id_is_stable() {
        let a = TopologyId::for_stack("MyVpcStack");
        let b = TopologyId::for_stack("MyVpcStack");
        let c = TopologyId::for_stack("MyEc2Stack");
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(a.as_uuid().get_version_num(), 5);
    }

    #[test]
    fn test_availability_zones_for_region() {
        let zones = AvailabilityZone::for_region("us-east-1", 3).unwrap();
        let names: Vec<&str> = zones.iter().map(|z| z.as_str()).collect();
        assert_eq!(names, vec!["us-east-1a", "us-east-1b", "us-east-1c"]);

        assert!(AvailabilityZone::for_region("us-east-1", 0).is_err());
        assert!(AvailabilityZone::for_region("us-east-1", 27).is_err());
        assert!(AvailabilityZone::new("US-EAST-1A").is_err());
    }

    #[test]
    fn test_port_range() {
        assert_eq!(Port::new(80).unwrap(), Port::HTTP);
        assert!(Port::new(0).is_err());
        assert!(Port::new(70000).is_err());
    }

    #[test]
    fn test_instance_type_parsing() {
        let t: InstanceType = "t2.micro".parse().unwrap();
        assert_eq!(t.class(), "t2");
        assert_eq!(t.size(), "micro");
        assert_eq!(t.to_string(), "t2.micro");

        assert!("t2".parse::<InstanceType>().is_err());
        assert!("T2.Micro".parse::<InstanceType>().is_err());
    }

    #[test]
    fn test_machine_image_pinned() {
        assert!(MachineImage::pinned("ami-0abc123").is_ok());
        assert!(MachineImage::pinned("ami-").is_err());
        assert!(MachineImage::pinned("image-1").is_err());
        assert_eq!(MachineImage::AmazonLinux2.to_string(), "amazon-linux-2");
    }

    #[test]
    fn test_machine_image_deserialization_is_validated() {
        let pinned: MachineImage =
            serde_json::from_str(r#"{"kind":"pinned","value":"ami-0abc123"}"#).unwrap();
        assert_eq!(pinned, MachineImage::Pinned("ami-0abc123".into()));

        let latest: MachineImage = serde_json::from_str(r#"{"kind":"amazon_linux2"}"#).unwrap();
        assert_eq!(latest, MachineImage::AmazonLinux2);

        assert!(serde_json::from_str::<MachineImage>(r#"{"kind":"pinned","value":"garbage"}"#)
            .is_err());
        assert_eq!(
            serde_json::to_value(&pinned).unwrap(),
            serde_json::json!({"kind": "pinned", "value": "ami-0abc123"})
        );
    }

    #[test]
    fn test_key_pair_is_redacted_in_debug() {
        let key = KeyPairName::new("operator-key").unwrap();
        assert_eq!(key.as_str(), "operator-key");
        assert!(!format!("{:?}", key).contains("operator-key"));
    }
}
