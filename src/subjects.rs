// Copyright (c) 2025 - Cowboy AI, Inc.
//! NATS subject hierarchy for topology hand-off
//!
//! Subjects follow `topology.<stack>.<event>`:
//!
//! ```text
//! topology.MyEc2Stack.submitted
//! topology.*.submitted
//! ```
//!
//! # Example
//!
//! ```rust
//! use cim_network_topology::subjects::{SubjectBuilder, TopologyEvent};
//!
//! let subject = SubjectBuilder::new("MyEc2Stack")
//!     .event(TopologyEvent::Submitted)
//!     .build();
//! assert_eq!(subject, "topology.MyEc2Stack.submitted");
//! ```

use std::fmt;

/// Root namespace for all topology subjects
pub const TOPOLOGY_ROOT: &str = "topology";

/// Events published about an assembled topology
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TopologyEvent {
    /// The graph was handed to a provisioning backend
    Submitted,
}

impl fmt::Display for TopologyEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TopologyEvent::Submitted => write!(f, "submitted"),
        }
    }
}

/// Builder for topology NATS subjects
#[derive(Debug, Clone)]
pub struct SubjectBuilder {
    stack: String,
    event: TopologyEvent,
}

impl SubjectBuilder {
    pub fn new(stack_name: &str) -> Self {
        Self {
            stack: stack_token(stack_name),
            event: TopologyEvent::Submitted,
        }
    }

    pub fn event(mut self, event: TopologyEvent) -> Self {
        self.event = event;
        self
    }

    pub fn build(self) -> String {
        format!("{}.{}.{}", TOPOLOGY_ROOT, self.stack, self.event)
    }

    /// Subject matching one event across every stack
    pub fn any_stack(event: TopologyEvent) -> String {
        format!("{}.*.{}", TOPOLOGY_ROOT, event)
    }
}

/// Stack names become a single subject token
fn stack_token(stack_name: &str) -> String {
    stack_name
        .chars()
        .map(|c| match c {
            '.' | '*' | '>' => '_',
            c if c.is_whitespace() => '_',
            c => c,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test]
    fn test_submitted_subject() {
        assert_eq!(
            SubjectBuilder::new("MyVpcStack").build(),
            "topology.MyVpcStack.submitted"
        );
    }

    #[test]
    fn test_any_stack_wildcard() {
        assert_eq!(
            SubjectBuilder::any_stack(TopologyEvent::Submitted),
            "topology.*.submitted"
        );
    }

    #[test_case("web.tier", "web_tier" ; "dots")]
    #[test_case("web tier", "web_tier" ; "spaces")]
    #[test_case("web>*", "web__" ; "wildcards")]
    fn test_stack_token(input: &str, expected: &str) {
        assert_eq!(stack_token(input), expected);
    }
}
