// Copyright (c) 2025 - Cowboy AI, Inc.
//! Property-Based Tests Module
//!
//! - Address planning: allocations are disjoint, aligned and inside the base
//! - Route resolution: every subnet reaches the gateway its tier calls for

mod address_planning;
mod route_resolution;
