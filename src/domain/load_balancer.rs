// Copyright (c) 2025 - Cowboy AI, Inc.
//! Load Balancer Entities

use serde::{Deserialize, Serialize};
use std::fmt;

use super::compute::SecurityGroup;
use super::value_objects::{Port, ResourceId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Scheme {
    InternetFacing,
    Internal,
}

impl Scheme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Scheme::InternetFacing => "internet-facing",
            Scheme::Internal => "internal",
        }
    }
}

impl fmt::Display for Scheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Protocol {
    Http,
    Https,
    Tcp,
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Protocol::Http => write!(f, "HTTP"),
            Protocol::Https => write!(f, "HTTPS"),
            Protocol::Tcp => write!(f, "TCP"),
        }
    }
}

/// Named set of compute endpoints traffic is spread across
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetGroup {
    pub id: ResourceId,
    pub protocol: Protocol,
    pub port: Port,
    pub health_check_path: String,
    pub targets: Vec<ResourceId>,
}

impl TargetGroup {
    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Listener {
    pub id: ResourceId,
    pub port: Port,
    pub protocol: Protocol,
    /// Target group every request is forwarded to
    pub forward_to: ResourceId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadBalancer {
    pub id: ResourceId,
    pub scheme: Scheme,
    pub subnets: Vec<ResourceId>,
    pub security_group: SecurityGroup,
    pub target_group: TargetGroup,
    pub listener: Listener,
}

/// Reference to an attribute only the provisioning backend can resolve
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeRef {
    pub resource: ResourceId,
    pub attribute: String,
}

impl AttributeRef {
    pub fn dns_name(resource: ResourceId) -> Self {
        Self {
            resource,
            attribute: "DNSName".to_string(),
        }
    }
}

impl fmt::Display for AttributeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "${{{}.{}}}", self.resource, self.attribute)
    }
}

/// Named value exported for downstream consumers through a parameter store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StackOutput {
    pub name: String,
    pub parameter_name: String,
    pub value: AttributeRef,
}
