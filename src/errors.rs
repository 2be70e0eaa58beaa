// Copyright (c) 2025 - Cowboy AI, Inc.
//! Error types for topology assembly and hand-off

use thiserror::Error;

use crate::domain::{Ipv4Network, NetworkError, ResourceId, TopologyError, ValueError};

/// Errors that abort a topology assembly
///
/// All variants are configuration errors: none is transient, none is retried,
/// and no partial graph accompanies them.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AssemblyError {
    /// The base block cannot hold every requested subnet
    #[error(
        "Address space exhausted: {base} cannot fit subnet group '{group}' at /{mask} \
         ({allocated} subnets allocated before running out)"
    )]
    AddressSpaceExhausted {
        base: Ipv4Network,
        group: String,
        mask: u8,
        allocated: usize,
    },

    /// A listener was requested for a target group with no targets
    #[error("Target group {target_group} has no registered targets")]
    EmptyTargetGroup { target_group: ResourceId },

    /// The assembled graph violates a topology invariant
    #[error("Topology invariant violated: {0}")]
    Topology(#[from] TopologyError),

    /// The input configuration is malformed
    #[error("Configuration error: {0}")]
    Configuration(String),
}

/// Result type for assembly operations
pub type AssemblyResult<T> = Result<T, AssemblyError>;

impl From<ValueError> for AssemblyError {
    fn from(err: ValueError) -> Self {
        AssemblyError::Configuration(err.to_string())
    }
}

impl From<NetworkError> for AssemblyError {
    fn from(err: NetworkError) -> Self {
        AssemblyError::Configuration(err.to_string())
    }
}

/// Errors raised while handing a graph to a provisioning backend
#[derive(Debug, Error)]
pub enum BackendError {
    /// NATS connection error
    #[error("NATS connection error: {0}")]
    NatsConnection(String),

    /// NATS publish error
    #[error("NATS publish error: {0}")]
    NatsPublish(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Result type for backend operations
pub type BackendResult<T> = Result<T, BackendError>;

impl From<serde_json::Error> for BackendError {
    fn from(err: serde_json::Error) -> Self {
        BackendError::Serialization(err.to_string())
    }
}
