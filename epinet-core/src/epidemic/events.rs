//! Event types of the epidemic process.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::graph::NodeId;

/// Class of a state transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventKind {
    /// An at-risk node becomes infected
    Infection,
    /// An infected node stops transmitting
    Recovery,
}

impl EventKind {
    /// Returns string representation of event kind for metrics.
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::Infection => "Infection",
            EventKind::Recovery => "Recovery",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A sampled transition targeting one node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EpidemicEvent {
    /// Transition class
    pub kind: EventKind,
    /// Node the transition applies to
    pub node: NodeId,
}

impl EpidemicEvent {
    /// Creates an infection event for `node`.
    pub fn infection(node: NodeId) -> Self {
        Self {
            kind: EventKind::Infection,
            node,
        }
    }

    /// Creates a recovery event for `node`.
    pub fn recovery(node: NodeId) -> Self {
        Self {
            kind: EventKind::Recovery,
            node,
        }
    }
}

impl fmt::Display for EpidemicEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} of node {}", self.kind, self.node)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_kind_string_conversion() {
        assert_eq!(EventKind::Infection.as_str(), "Infection");
        assert_eq!(
            EpidemicEvent::recovery(NodeId(3)).to_string(),
            "Recovery of node 3"
        );
    }
}
