//! Checks that resolved slots carry what their node's demand implies.
use super::Graph;
use crate::carrier::CarrierID;
use crate::node::NodeID;
use crate::slot::{Direction, SlotIdx};
use float_cmp::approx_eq;
use std::fmt;

/// A slot whose edges do not add up to its node's demand times its conversion
#[derive(Debug, Clone, PartialEq)]
pub struct Imbalance {
    /// The slot in question
    pub slot: SlotIdx,
    /// The node owning the slot
    pub node: NodeID,
    /// The slot's carrier
    pub carrier: CarrierID,
    /// The slot's direction
    pub direction: Direction,
    /// Node demand times slot conversion
    pub expected: f64,
    /// Sum of the slot's edge values
    pub actual: f64,
}

impl fmt::Display for Imbalance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "The {} {} slot of {} is unbalanced: expected {}, edges carry {}",
            self.carrier, self.direction, self.node, self.expected, self.actual
        )
    }
}

impl Graph {
    /// List every fully resolved slot whose edges differ from its node's demand by more than
    /// `tolerance`
    pub fn imbalances(&self, tolerance: f64) -> Vec<Imbalance> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(idx, slot)| {
                let idx = SlotIdx(idx);
                let demand = self.graph[slot.node].demand?;
                let actual = self.edge_sum(idx)?;
                let expected = demand * self.conversion(idx);
                (!approx_eq!(f64, expected, actual, epsilon = tolerance)).then(|| Imbalance {
                    slot: idx,
                    node: self.graph[slot.node].id.clone(),
                    carrier: slot.carrier.clone(),
                    direction: slot.direction,
                    expected,
                    actual,
                })
            })
            .collect()
    }
}
