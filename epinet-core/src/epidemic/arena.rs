//! Indexed node collections backing the epidemic state.
//!
//! Both collections keep their members in a dense vector plus a per-node slot
//! table, so membership tests, inserts and removals are O(1) and sampling can
//! walk or index the dense vector without rebuilding it on every event.

use crate::graph::NodeId;

/// Dense set of node identifiers with O(1) insert, remove and uniform indexing.
#[derive(Debug, Clone, Default)]
pub struct NodeSet {
    members: Vec<NodeId>,
    positions: Vec<Option<usize>>,
}

impl NodeSet {
    /// Creates an empty set able to hold nodes `0..node_count`.
    pub fn with_node_count(node_count: usize) -> Self {
        Self {
            members: Vec::new(),
            positions: vec![None; node_count],
        }
    }

    /// Inserts `node`. Returns false if it was already present.
    pub fn insert(&mut self, node: NodeId) -> bool {
        let slot = &mut self.positions[node.index()];
        if slot.is_some() {
            return false;
        }
        *slot = Some(self.members.len());
        self.members.push(node);
        true
    }

    /// Removes `node`. Returns false if it was not present.
    pub fn remove(&mut self, node: NodeId) -> bool {
        let Some(position) = self.positions[node.index()].take() else {
            return false;
        };
        self.members.swap_remove(position);
        if let Some(&moved) = self.members.get(position) {
            self.positions[moved.index()] = Some(position);
        }
        true
    }

    /// Returns true if `node` is a member.
    pub fn contains(&self, node: NodeId) -> bool {
        self.positions
            .get(node.index())
            .is_some_and(|slot| slot.is_some())
    }

    /// Returns the number of members.
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Returns true if the set has no members.
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Returns members in slot order. The order changes on removal.
    pub fn as_slice(&self) -> &[NodeId] {
        &self.members
    }
}

/// One at-risk node and its number of infected neighbors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AtRiskEntry {
    /// The exposed node
    pub node: NodeId,
    /// Number of currently infected neighbors, always positive
    pub infected_neighbors: u32,
}

/// Arena of at-risk nodes with stable per-node slots.
///
/// An entry exists exactly while its node has at least one infected
/// neighbor. Removal swaps the last entry into the freed slot.
#[derive(Debug, Clone, Default)]
pub struct AtRiskArena {
    entries: Vec<AtRiskEntry>,
    slots: Vec<Option<usize>>,
}

impl AtRiskArena {
    /// Creates an empty arena able to hold nodes `0..node_count`.
    pub fn with_node_count(node_count: usize) -> Self {
        Self {
            entries: Vec::new(),
            slots: vec![None; node_count],
        }
    }

    /// Returns all entries in slot order.
    pub fn entries(&self) -> &[AtRiskEntry] {
        &self.entries
    }

    /// Returns the number of at-risk nodes.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if no node is at risk.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns true if `node` is at risk.
    pub fn contains(&self, node: NodeId) -> bool {
        self.slots
            .get(node.index())
            .is_some_and(|slot| slot.is_some())
    }

    /// Returns the infected-neighbor count of `node` if it is at risk.
    pub fn infected_neighbors(&self, node: NodeId) -> Option<u32> {
        let slot = (*self.slots.get(node.index())?)?;
        Some(self.entries[slot].infected_neighbors)
    }

    /// Sets the infected-neighbor count of `node`, inserting it if absent.
    ///
    /// A zero count removes the node instead.
    pub fn set(&mut self, node: NodeId, infected_neighbors: u32) {
        if infected_neighbors == 0 {
            self.remove(node);
            return;
        }
        match self.slots[node.index()] {
            Some(slot) => self.entries[slot].infected_neighbors = infected_neighbors,
            None => {
                self.slots[node.index()] = Some(self.entries.len());
                self.entries.push(AtRiskEntry {
                    node,
                    infected_neighbors,
                });
            }
        }
    }

    /// Adds one infected neighbor to `node`, inserting it if absent.
    ///
    /// Returns the new count.
    pub fn increment(&mut self, node: NodeId) -> u32 {
        match self.slots[node.index()] {
            Some(slot) => {
                let entry = &mut self.entries[slot];
                entry.infected_neighbors += 1;
                entry.infected_neighbors
            }
            None => {
                self.set(node, 1);
                1
            }
        }
    }

    /// Removes one infected neighbor from `node`.
    ///
    /// Returns the new count, or `None` if the node was not at risk. A node
    /// whose count reaches zero leaves the arena.
    pub fn decrement(&mut self, node: NodeId) -> Option<u32> {
        let slot = self.slots[node.index()]?;
        let remaining = self.entries[slot].infected_neighbors - 1;
        if remaining == 0 {
            self.remove(node);
        } else {
            self.entries[slot].infected_neighbors = remaining;
        }
        Some(remaining)
    }

    /// Removes `node`, returning its infected-neighbor count if it was present.
    pub fn remove(&mut self, node: NodeId) -> Option<u32> {
        let slot = self.slots[node.index()].take()?;
        let removed = self.entries.swap_remove(slot);
        if let Some(moved) = self.entries.get(slot) {
            self.slots[moved.node.index()] = Some(slot);
        }
        Some(removed.infected_neighbors)
    }
}
