// Copyright (c) 2025 - Cowboy AI, Inc.
//! Address planning
//!
//! Carves the network block into one subnet per (group, zone) pair by
//! sequential, aligned allocation: groups in request order, zones in order
//! within each group.

use std::net::Ipv4Addr;
use tracing::debug;

use crate::config::SubnetRequest;
use crate::domain::{AvailabilityZone, Ipv4Network, ResourceId, SubnetTier};
use crate::errors::{AssemblyError, AssemblyResult};

/// A planned subnet not yet bound to a route table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubnetAllocation {
    pub id: ResourceId,
    pub group: String,
    pub tier: SubnetTier,
    pub zone_index: usize,
    pub availability_zone: AvailabilityZone,
    pub cidr: Ipv4Network,
}

#[derive(Debug, Clone)]
pub struct AddressPlanner {
    base: Ipv4Network,
    zones: Vec<AvailabilityZone>,
}

impl AddressPlanner {
    pub fn new(base: Ipv4Network, zones: Vec<AvailabilityZone>) -> Self {
        Self { base, zones }
    }

    pub fn plan(&self, requests: &[SubnetRequest]) -> AssemblyResult<Vec<SubnetAllocation>> {
        let end = u64::from(self.base.first()) + self.base.size();
        let mut cursor = u64::from(self.base.first());
        let mut allocations = Vec::with_capacity(requests.len() * self.zones.len());

        for request in requests {
            let exhausted = |allocated: usize| AssemblyError::AddressSpaceExhausted {
                base: self.base,
                group: request.name.clone(),
                mask: request.mask,
                allocated,
            };

            if request.mask < self.base.prefix_len() || request.mask > 32 {
                return Err(exhausted(allocations.len()));
            }
            let block = 1u64 << (32 - u32::from(request.mask));

            for (zone_index, zone) in self.zones.iter().enumerate() {
                let start = align_up(cursor, block);
                if start + block > end {
                    return Err(exhausted(allocations.len()));
                }
                // start + block <= end <= 2^32, so start fits in u32
                let cidr = Ipv4Network::new(Ipv4Addr::from(start as u32), request.mask)?;
                let id = ResourceId::new(format!("{}Subnet{}", request.name, zone_index + 1))?;

                debug!(subnet = %id, cidr = %cidr, zone = %zone, "allocated subnet");

                allocations.push(SubnetAllocation {
                    id,
                    group: request.name.clone(),
                    tier: request.tier,
                    zone_index,
                    availability_zone: zone.clone(),
                    cidr,
                });
                cursor = start + block;
            }
        }

        Ok(allocations)
    }
}

fn align_up(value: u64, alignment: u64) -> u64 {
    value.div_ceil(alignment) * alignment
}
