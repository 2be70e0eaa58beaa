// Copyright (c) 2025 - Cowboy AI, Inc.
//! Property-Based Tests for Address Planning

use std::net::Ipv4Addr;

use cim_network_topology::domain::{AvailabilityZone, Ipv4Network, SubnetTier};
use cim_network_topology::planner::AddressPlanner;
use cim_network_topology::{AssemblyError, SubnetRequest};
use proptest::prelude::*;

// ============================================================================
// Property Test Strategies
// ============================================================================

/// A prefix-aligned base block between /16 and /24
fn base_network() -> impl Strategy<Value = Ipv4Network> {
    (any::<u32>(), 16u8..=24).prop_map(|(address, prefix)| {
        let mask = u32::MAX << (32 - u32::from(prefix));
        Ipv4Network::new(Ipv4Addr::from(address & mask), prefix).unwrap()
    })
}

fn tier() -> impl Strategy<Value = SubnetTier> {
    prop_oneof![
        Just(SubnetTier::Public),
        Just(SubnetTier::PrivateApp),
        Just(SubnetTier::PrivateIsolated),
    ]
}

/// Subnet requests with masks at most eight bits narrower than the base
fn requests(base_prefix: u8) -> impl Strategy<Value = Vec<SubnetRequest>> {
    prop::collection::vec((tier(), 0u8..=8), 1..6).prop_map(move |groups| {
        groups
            .into_iter()
            .enumerate()
            .map(|(i, (tier, extra))| {
                SubnetRequest::new(format!("Group{}", i), tier, (base_prefix + extra).min(28))
            })
            .collect()
    })
}

fn planning_input() -> impl Strategy<Value = (Ipv4Network, usize, Vec<SubnetRequest>)> {
    base_network().prop_flat_map(|base| (Just(base), 1usize..=4, requests(base.prefix_len())))
}

fn zones(count: usize) -> Vec<AvailabilityZone> {
    AvailabilityZone::for_region("us-east-1", count).unwrap()
}

// ============================================================================
// Property Tests
// ============================================================================

proptest! {
    /// Property: Successful plans are disjoint subsets of the base block
    #[test]
    fn prop_allocations_disjoint_and_contained((base, zone_count, requests) in planning_input()) {
        let planner = AddressPlanner::new(base, zones(zone_count));

        match planner.plan(&requests) {
            Ok(allocations) => {
                prop_assert_eq!(allocations.len(), requests.len() * zone_count);
                for (i, first) in allocations.iter().enumerate() {
                    prop_assert!(base.contains(&first.cidr), "{} outside {}", first.cidr, base);
                    for second in &allocations[i + 1..] {
                        prop_assert!(
                            !first.cidr.overlaps(&second.cidr),
                            "{} overlaps {}", first.cidr, second.cidr
                        );
                    }
                }
            }
            Err(error) => {
                let exhausted = matches!(error, AssemblyError::AddressSpaceExhausted { .. });
                prop_assert!(exhausted, "unexpected error: {}", error);
            }
        }
    }

    /// Property: Every allocation carries its group's mask and zone
    #[test]
    fn prop_allocations_follow_requests((base, zone_count, requests) in planning_input()) {
        let planner = AddressPlanner::new(base, zones(zone_count));

        if let Ok(allocations) = planner.plan(&requests) {
            for (allocation, (request, zone)) in allocations.iter().zip(
                requests.iter().flat_map(|r| (0..zone_count).map(move |z| (r, z)))
            ) {
                prop_assert_eq!(allocation.cidr.prefix_len(), request.mask);
                prop_assert_eq!(allocation.tier, request.tier);
                prop_assert_eq!(allocation.zone_index, zone);
                prop_assert_eq!(&allocation.group, &request.name);
            }
        }
    }

    /// Property: Equal masks pack without waste
    ///
    /// When every group uses the same mask, the plan succeeds exactly when
    /// the blocks fit in the base by size.
    #[test]
    fn prop_equal_masks_fit_by_size(
        base in base_network(),
        zone_count in 1usize..=4,
        group_count in 1usize..=4,
        extra in 0u8..=4,
    ) {
        let mask = (base.prefix_len() + extra).min(28);
        let requests: Vec<SubnetRequest> = (0..group_count)
            .map(|i| SubnetRequest::new(format!("Group{}", i), SubnetTier::Public, mask))
            .collect();

        let needed = (group_count * zone_count) as u64 * (1u64 << (32 - u32::from(mask)));
        let result = AddressPlanner::new(base, zones(zone_count)).plan(&requests);

        prop_assert_eq!(result.is_ok(), needed <= base.size());
    }
}
