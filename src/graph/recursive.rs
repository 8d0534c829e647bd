//! Attributes attributed upstream through the graph, such as primary energy demand.
//!
//! Each formula walks from a node to its suppliers, weighting each supplier by the part of its
//! output the edge carries. Results are memoised. A formula which reaches itself again through a
//! loop in the graph is undetermined for that inner call.
use super::{Graph, MemoKey};
use crate::carrier::{CO2_PER_UNIT, SUSTAINABLE_FRACTION};
use crate::error::GraphResult;
use crate::node::PRIMARY_ENERGY_DEMAND;
use crate::slot::Direction;
use petgraph::graph::{EdgeIndex, NodeIndex};

/// Node attribute overriding the derived sustainability share
pub const SUSTAINABILITY_SHARE: &str = "sustainability_share";

impl Graph {
    /// The fraction of the supplier's useful output which flows through `edge`
    fn supplier_weight(&self, edge: EdgeIndex) -> Option<f64> {
        let this = &self.graph[edge];
        let parent_share = self.parent_share(edge)?;
        let useful: f64 = self.graph[this.supplier]
            .slots(Direction::Output)
            .filter(|slot| !self.slots[slot.0].is_loss())
            .map(|slot| self.conversion(slot))
            .sum();
        if useful == 0.0 {
            return Some(0.0);
        }

        Some(parent_share * self.conversion(this.output_slot) / useful)
    }

    /// Whether a node is where an upstream walk stops
    fn is_leaf(&self, node: NodeIndex) -> bool {
        self.graph[node].in_group(PRIMARY_ENERGY_DEMAND) || self.input_edges(node).is_empty()
    }

    /// Sum `f` over the suppliers of a node, weighted by [`Graph::supplier_weight`]
    fn sum_upstream<F>(&self, node: NodeIndex, f: F) -> Option<f64>
    where
        F: Fn(NodeIndex) -> Option<f64>,
    {
        self.input_edges(node)
            .into_iter()
            .map(|edge| Some(self.supplier_weight(edge)? * f(self.graph[edge].supplier)?))
            .sum()
    }

    /// The primary energy consumed to meet the demand of a node
    pub fn primary_demand(&self, node: NodeIndex) -> Option<f64> {
        self.memoise(MemoKey::node(node, "primary_demand"), || {
            if self.graph[node].in_group(PRIMARY_ENERGY_DEMAND) {
                self.graph[node].demand
            } else if self.input_edges(node).is_empty() {
                Some(0.0)
            } else {
                self.sum_upstream(node, |supplier| self.primary_demand(supplier))
            }
        })
    }

    /// The CO2 emitted by primary energy to meet the demand of a node
    pub fn primary_co2_emission(&self, node: NodeIndex) -> GraphResult<Option<f64>> {
        self.fetch(MemoKey::node(node, "primary_co2_emission"), || {
            if self.is_leaf(node) {
                let co2 = self
                    .output_carrier_attribute(node, CO2_PER_UNIT)?
                    .unwrap_or(0.0);
                return Ok(self.graph[node].demand.map(|demand| demand * co2));
            }

            let mut total = 0.0;
            for edge in self.input_edges(node) {
                let Some(weight) = self.supplier_weight(edge) else {
                    return Ok(None);
                };
                let Some(upstream) = self.primary_co2_emission(self.graph[edge].supplier)? else {
                    return Ok(None);
                };
                total += weight * upstream;
            }

            Ok(Some(total))
        })
    }

    /// The fraction of a node's energy which comes from sustainable sources
    pub fn sustainability_share(&self, node: NodeIndex) -> GraphResult<Option<f64>> {
        self.fetch(MemoKey::node(node, "sustainability_share"), || {
            if let Some(share) = self.node_attribute_opt(node, SUSTAINABILITY_SHARE)? {
                return Ok(Some(share));
            }
            if self.is_leaf(node) {
                return Ok(Some(
                    self.output_carrier_attribute(node, SUSTAINABLE_FRACTION)?
                        .unwrap_or(0.0),
                ));
            }

            let mut total = 0.0;
            for edge in self.input_edges(node) {
                let Some(share) = self.child_share(edge) else {
                    return Ok(None);
                };
                let Some(upstream) = self.sustainability_share(self.graph[edge].supplier)? else {
                    return Ok(None);
                };
                total += share * upstream;
            }

            Ok(Some(total))
        })
    }

    /// An attribute of the carrier on a node's first output slot, if it has one
    fn output_carrier_attribute(&self, node: NodeIndex, key: &str) -> GraphResult<Option<f64>> {
        let Some(slot) = self.graph[node].slots(Direction::Output).next() else {
            return Ok(None);
        };
        match self.carriers.get(&self.slots[slot.0].carrier) {
            Some(carrier) => carrier.attributes.get_opt(key, self.cache_enabled),
            None => Ok(None),
        }
    }
}
