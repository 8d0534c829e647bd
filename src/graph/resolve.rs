//! Resolution of single edge values and node demands from what is already known.
//!
//! Each function returns `None` while a needed value is undetermined. The lifecycle retries on
//! the next sweep.
use super::Graph;
use crate::carrier::Carrier;
use crate::edge::EdgeType;
use crate::slot::{Direction, SlotIdx};
use log::trace;
use petgraph::graph::{EdgeIndex, NodeIndex};

impl Graph {
    /// Calculate the value of an edge from its driving node
    pub(crate) fn calculate_edge(&self, edge: EdgeIndex) -> Option<f64> {
        let this = &self.graph[edge];
        let slot = this.driving_slot();
        let driving_demand = || self.graph[this.driving_node()].demand;

        match this.edge_type {
            EdgeType::Constant => this.share.or_else(driving_demand),
            EdgeType::Share => Some(this.share? * driving_demand()? * self.conversion(slot)),
            EdgeType::Flexible => {
                let total = driving_demand()? * self.conversion(slot);
                let remainder = total - self.sibling_sum(edge, slot)?;

                // Electricity may flow backwards, e.g. when local production exceeds demand
                let is_electricity = self
                    .carriers
                    .get(&this.carrier)
                    .is_some_and(Carrier::is_electricity);
                Some(if is_electricity {
                    remainder
                } else {
                    remainder.max(0.0)
                })
            }
            EdgeType::InversedFlexible => {
                let total = driving_demand()? * self.conversion(slot);
                Some((self.sibling_sum(edge, slot)? - total).max(0.0))
            }
            EdgeType::Dependent => {
                let share = this.share.unwrap_or_else(|| self.conversion(slot));
                Some(share * driving_demand()?)
            }
        }
    }

    /// The sum of the other edges on a slot, once all of them are resolved
    fn sibling_sum(&self, edge: EdgeIndex, slot: SlotIdx) -> Option<f64> {
        self.slots[slot.0]
            .edges
            .iter()
            .filter(|&&other| other != edge)
            .map(|&other| self.graph[other].value)
            .sum()
    }

    /// Calculate the demand of a node from its preset or its resolved edges
    pub(crate) fn calculate_demand(&self, node: NodeIndex) -> Option<f64> {
        if let Some(preset) = self.graph[node].preset_demand {
            return Some(preset);
        }

        self.demand_from_side(node, Direction::Input)
            .or_else(|| self.demand_from_side(node, Direction::Output))
    }

    /// The demand implied by the edges on one side of a node.
    ///
    /// Every non-loss slot with an edge contributing to the node takes part, and every such
    /// edge must be resolved.
    fn demand_from_side(&self, node: NodeIndex, direction: Direction) -> Option<f64> {
        let mut value = 0.0;
        let mut conversion = 0.0;
        let mut any_slot = false;

        for idx in self.graph[node].slots(direction) {
            let slot = &self.slots[idx.0];
            if slot.is_loss() {
                continue;
            }

            let mut contributing = slot
                .edges
                .iter()
                .filter(|edge| self.graph[**edge].contributes_to(node))
                .peekable();
            if contributing.peek().is_none() {
                continue;
            }

            for edge in contributing {
                value += self.graph[*edge].value?;
            }
            conversion += self.conversion(idx);
            any_slot = true;
        }

        (any_slot && conversion > 0.0).then(|| value / conversion)
    }

    /// Resolve a node's demand if possible. Returns whether a new value was set.
    pub(super) fn resolve_demand(&mut self, node: NodeIndex) -> bool {
        if self.graph[node].demand.is_some() {
            return false;
        }
        let Some(demand) = self.calculate_demand(node) else {
            return false;
        };

        trace!("Demand of {} resolved to {demand}", self.graph[node].id);
        self.graph[node].demand = Some(demand);
        true
    }

    /// Resolve an edge's value if possible. Returns whether a new value was set.
    pub(super) fn resolve_edge(&mut self, edge: EdgeIndex) -> bool {
        if self.graph[edge].value.is_some() {
            return false;
        }
        let Some(value) = self.calculate_edge(edge) else {
            return false;
        };

        trace!("Value of {} resolved to {value}", self.graph[edge].id);
        self.graph[edge].value = Some(value);
        true
    }

    /// Assign a value to an unresolved edge outside of the normal rules
    pub(super) fn assume_edge(&mut self, edge: EdgeIndex, value: f64) {
        trace!("Value of {} assumed to be {value}", self.graph[edge].id);
        self.graph[edge].value = Some(value);
    }
}
