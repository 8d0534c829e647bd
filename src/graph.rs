//! The energy graph: nodes, edges and slots wired once by a [`GraphBuilder`], then resolved by
//! the calculation lifecycle.
//!
//! Nodes and edges live in a [`petgraph`] graph (edges point from supplier to consumer) and are
//! addressed by its stable indices. Slots live in a separate arena addressed by [`SlotIdx`].
//! Everything a calculation pass resolves (node demands and edge values) is owned by the graph
//! instance, so two graphs built from the same topology never share mutable state.
use crate::area::Area;
use crate::carrier::{Carrier, CarrierID, CarrierMap};
use crate::edge::Edge;
use crate::error::{GraphError, GraphResult};
use crate::goal::{Goal, Goals};
use crate::id::define_id_type;
use crate::node::{Node, NodeID};
use crate::slot::{Direction, Slot, SlotIdx, SlotKind};
use log::warn;
use petgraph::graph::{DiGraph, EdgeIndex, NodeIndex};
use petgraph::visit::EdgeRef;
use std::collections::HashMap;

mod balance;
pub use balance::Imbalance;
mod builder;
pub use builder::GraphBuilder;
mod lifecycle;
pub use lifecycle::{DEFAULT_BALANCE_TOLERANCE, DEFAULT_MAX_ITERATIONS, LifecycleState};
use lifecycle::Lifecycle;
mod memo;
use memo::{Memo, MemoKey};
mod recursive;
mod resolve;

define_id_type! {DatasetID}

/// The graph of nodes and edges
type EnergyGraph = DiGraph<Node, Edge>;

/// An energy graph and the state of its current calculation pass
#[derive(Debug)]
pub struct Graph {
    graph: EnergyGraph,
    slots: Vec<Slot>,
    carriers: CarrierMap,
    node_indices: HashMap<NodeID, NodeIndex>,
    area: Area,
    goals: Goals,
    dataset: Option<DatasetID>,
    cache_enabled: bool,
    memo: Memo,
    lifecycle: Lifecycle,
}

/// Node and edge lookups
impl Graph {
    /// The number of nodes in the graph
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// The number of edges in the graph
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Look up a node's index by its key
    pub fn node_index(&self, id: &str) -> Option<NodeIndex> {
        self.node_indices.get(id).copied()
    }

    /// Get a node. Panics if the index does not belong to this graph.
    pub fn node(&self, node: NodeIndex) -> &Node {
        &self.graph[node]
    }

    /// Get mutable access to a node.
    ///
    /// Any change to a node may change derived attributes anywhere in the graph, so every
    /// memoised value is discarded.
    pub fn node_mut(&mut self, node: NodeIndex) -> &mut Node {
        self.memo.clear();
        &mut self.graph[node]
    }

    /// Iterate over the indices of all nodes
    pub fn node_indices(&self) -> impl Iterator<Item = NodeIndex> {
        self.graph.node_indices()
    }

    /// Iterate over all nodes
    pub fn iter_nodes(&self) -> impl Iterator<Item = (NodeIndex, &Node)> {
        self.graph
            .node_indices()
            .map(|idx| (idx, &self.graph[idx]))
    }

    /// Get an edge. Panics if the index does not belong to this graph.
    pub fn edge(&self, edge: EdgeIndex) -> &Edge {
        &self.graph[edge]
    }

    /// Look up an edge by its consumer, supplier and carrier
    pub fn find_edge(&self, consumer: NodeIndex, supplier: NodeIndex, carrier: &str) -> Option<EdgeIndex> {
        self.graph
            .edges_connecting(supplier, consumer)
            .find(|edge| edge.weight().carrier.as_str() == carrier)
            .map(|edge| edge.id())
    }

    /// Iterate over the indices of all edges
    pub fn edge_indices(&self) -> impl Iterator<Item = EdgeIndex> {
        self.graph.edge_indices()
    }

    /// The edges through which a node receives energy
    pub fn input_edges(&self, node: NodeIndex) -> Vec<EdgeIndex> {
        self.adjacent_edges(node, petgraph::Direction::Incoming)
    }

    /// The edges through which a node delivers energy
    pub fn output_edges(&self, node: NodeIndex) -> Vec<EdgeIndex> {
        self.adjacent_edges(node, petgraph::Direction::Outgoing)
    }

    fn adjacent_edges(&self, node: NodeIndex, direction: petgraph::Direction) -> Vec<EdgeIndex> {
        let mut edges: Vec<_> = self
            .graph
            .edges_directed(node, direction)
            .map(|edge| edge.id())
            .collect();

        // petgraph yields the most recently added edge first
        edges.sort();
        edges
    }

    /// Get a slot. Panics if the index does not belong to this graph.
    pub fn slot(&self, slot: SlotIdx) -> &Slot {
        &self.slots[slot.0]
    }

    /// Look up a node's slot for a carrier and direction
    pub fn find_slot(&self, node: NodeIndex, carrier: &str, direction: Direction) -> Option<SlotIdx> {
        self.graph[node].slot(carrier, direction)
    }

    /// Look up a carrier by key
    pub fn carrier(&self, id: &str) -> Option<&Carrier> {
        self.carriers.get(id)
    }

    /// Iterate over all carriers
    pub fn carriers(&self) -> impl Iterator<Item = &Carrier> {
        self.carriers.values()
    }

    /// The regional parameters of the graph
    pub fn area(&self) -> &Area {
        &self.area
    }

    /// The dataset the graph was built from, if recorded
    pub fn dataset(&self) -> Option<&DatasetID> {
        self.dataset.as_ref()
    }
}

/// The read contract: resolved values, or `None` while undetermined
impl Graph {
    /// The resolved demand of a node
    pub fn demand(&self, node: NodeIndex) -> Option<f64> {
        self.graph[node].demand
    }

    /// The resolved value of an edge
    pub fn edge_value(&self, edge: EdgeIndex) -> Option<f64> {
        self.graph[edge].value
    }

    /// The effective conversion of a slot.
    ///
    /// A configured conversion is used as is. An elastic slot takes whatever the other slots on
    /// its side leave over. Otherwise the sole slot on a side converts all of the node's demand
    /// and a slot sharing its side with others converts none.
    pub fn conversion(&self, slot: SlotIdx) -> f64 {
        let this = &self.slots[slot.0];
        if let Some(conversion) = this.conversion {
            return conversion;
        }

        let mut siblings = self.graph[this.node]
            .slots(this.direction)
            .filter(|&other| other != slot)
            .peekable();
        match this.kind {
            SlotKind::Elastic => {
                let taken: f64 = siblings
                    .filter(|other| self.slots[other.0].kind != SlotKind::Elastic)
                    .map(|other| self.fixed_conversion(other))
                    .sum();
                (1.0 - taken).max(0.0)
            }
            _ => {
                if siblings.peek().is_none() {
                    1.0
                } else {
                    0.0
                }
            }
        }
    }

    /// The conversion of a non-elastic slot
    fn fixed_conversion(&self, slot: SlotIdx) -> f64 {
        let this = &self.slots[slot.0];
        this.conversion.unwrap_or_else(|| {
            let alone = self.graph[this.node]
                .slots(this.direction)
                .all(|other| other == slot);
            if alone { 1.0 } else { 0.0 }
        })
    }

    /// The total flow through a slot.
    ///
    /// Computed top-down from the node's demand when known, otherwise bottom-up from the slot's
    /// edges once all of them are resolved.
    pub fn external_value(&self, slot: SlotIdx) -> Option<f64> {
        let node = self.slots[slot.0].node;
        if let Some(demand) = self.graph[node].demand {
            return Some(demand * self.conversion(slot));
        }

        self.edge_sum(slot)
    }

    /// The sum of all edge values on a slot, once every edge on it is resolved
    pub(crate) fn edge_sum(&self, slot: SlotIdx) -> Option<f64> {
        let edges = &self.slots[slot.0].edges;
        if edges.is_empty() {
            return None;
        }

        edges.iter().map(|edge| self.graph[*edge].value).sum()
    }

    /// The fraction of the supplier's output slot that flows through an edge
    pub fn parent_share(&self, edge: EdgeIndex) -> Option<f64> {
        let output_slot = self.graph[edge].output_slot;
        self.memoise(MemoKey::edge(edge, "parent_share"), || {
            self.share_of_slot(edge, output_slot)
        })
    }

    /// The fraction of the consumer's input slot that flows through an edge
    pub fn child_share(&self, edge: EdgeIndex) -> Option<f64> {
        let input_slot = self.graph[edge].input_slot;
        self.memoise(MemoKey::edge(edge, "child_share"), || {
            self.share_of_slot(edge, input_slot)
        })
    }

    fn share_of_slot(&self, edge: EdgeIndex, slot: SlotIdx) -> Option<f64> {
        let value = self.graph[edge].value?;
        let total = self.external_value(slot)?;
        if total == 0.0 {
            Some(0.0)
        } else {
            Some(value / total)
        }
    }
}

/// The write contract and dataset attributes
impl Graph {
    /// Set or clear the preset demand of a node.
    ///
    /// Presets are read at the start of a pass; call [`Graph::reset`] before recalculating.
    pub fn set_preset_demand(&mut self, node: NodeIndex, demand: Option<f64>) {
        if self.lifecycle.state() != LifecycleState::Unstarted {
            warn!(
                "Preset demand of {} changed after calculation started; it only takes effect \
                after a reset",
                self.graph[node].id
            );
        }
        self.node_mut(node).preset_demand = demand;
    }

    /// Read a dataset attribute of a node, honouring the current caching mode
    pub fn node_attribute(&self, node: NodeIndex, key: &str) -> GraphResult<f64> {
        self.read_store(&self.graph[node].attributes, key)
    }

    /// Read a dataset attribute of a node which may be absent
    pub fn node_attribute_opt(&self, node: NodeIndex, key: &str) -> GraphResult<Option<f64>> {
        self.graph[node]
            .attributes
            .get_opt(key, self.cache_enabled)
    }

    /// Set a dataset attribute of a node
    pub fn set_node_attribute(&mut self, node: NodeIndex, key: &str, value: f64) {
        self.node_mut(node).attributes.set(key, value);
    }

    /// Read a dataset attribute of an edge, honouring the current caching mode
    pub fn edge_attribute(&self, edge: EdgeIndex, key: &str) -> GraphResult<f64> {
        self.read_store(&self.graph[edge].attributes, key)
    }

    /// Set a dataset attribute of an edge
    pub fn set_edge_attribute(&mut self, edge: EdgeIndex, key: &str, value: f64) {
        self.memo.clear();
        self.graph[edge].attributes.set(key, value);
    }

    /// Read a dataset attribute of a slot, honouring the current caching mode
    pub fn slot_attribute(&self, slot: SlotIdx, key: &str) -> GraphResult<f64> {
        self.read_store(&self.slots[slot.0].attributes, key)
    }

    /// Set a dataset attribute of a slot
    pub fn set_slot_attribute(&mut self, slot: SlotIdx, key: &str, value: f64) {
        self.memo.clear();
        self.slots[slot.0].attributes.set(key, value);
    }

    /// Read a dataset attribute of a carrier, honouring the current caching mode
    pub fn carrier_attribute(&self, carrier: &str, key: &str) -> GraphResult<f64> {
        let carrier = self
            .carriers
            .get(carrier)
            .ok_or_else(|| GraphError::missing(carrier))?;
        self.read_store(&carrier.attributes, key)
    }

    /// Set a dataset attribute of a carrier, interning the carrier if it is new
    pub fn set_carrier_attribute(&mut self, carrier: &str, key: &str, value: f64) {
        self.memo.clear();
        self.carriers
            .entry(CarrierID::new(carrier))
            .or_insert_with_key(|id| Carrier::new(id.as_str()))
            .attributes
            .set(key, value);
    }

    /// Read a dataset attribute of the area, honouring the current caching mode
    pub fn area_attribute(&self, key: &str) -> GraphResult<f64> {
        self.read_store(&self.area.attributes, key)
    }

    /// Set a dataset attribute of the area
    pub fn set_area_attribute(&mut self, key: &str, value: f64) {
        self.memo.clear();
        self.area.attributes.set(key, value);
    }

    fn read_store(&self, store: &crate::attribute::AttributeStore, key: &str) -> GraphResult<f64> {
        if self.cache_enabled {
            store.get(key)
        } else {
            store.get_uncached(key)
        }
    }

    /// The number of units installed at a node, derived by the node's strategy
    pub fn number_of_units(&self, node: NodeIndex) -> GraphResult<Option<f64>> {
        let strategy = self.graph[node].api().strategy();
        self.fetch(MemoKey::node(node, "number_of_units"), || {
            strategy.number_of_units(self, node)
        })
    }

    /// Assign the number of units installed at a node, if its strategy allows it
    pub fn set_number_of_units(&mut self, node: NodeIndex, value: f64) -> GraphResult<()> {
        self.graph[node]
            .api()
            .strategy()
            .set_number_of_units(self, node, value)
    }

    /// Look up a goal, creating it on first lookup
    pub fn goal_mut(&mut self, key: &str) -> &mut Goal {
        self.goals.find_or_create(key)
    }

    /// The goals of this graph
    pub fn goals(&self) -> &Goals {
        &self.goals
    }

    /// Whether memoisation and attribute caching are currently enabled
    pub fn is_caching(&self) -> bool {
        self.cache_enabled
    }

    /// Memoise an infallible derived value
    fn memoise<F>(&self, key: MemoKey, compute: F) -> Option<f64>
    where
        F: FnOnce() -> Option<f64>,
    {
        self.fetch(key, || Ok::<_, std::convert::Infallible>(compute()))
            .unwrap_or_else(|never| match never {})
    }

    /// Memoise a derived value.
    ///
    /// Only successfully determined values are stored, so a computation which fails or is
    /// undetermined is attempted again on the next call. A computation which re-enters itself
    /// (through a loop in the graph) is undetermined for the inner call.
    pub(crate) fn fetch<F, E>(&self, key: MemoKey, compute: F) -> Result<Option<f64>, E>
    where
        F: FnOnce() -> Result<Option<f64>, E>,
    {
        if self.cache_enabled {
            if let Some(value) = self.memo.get(key) {
                return Ok(Some(value));
            }
        }

        if !self.memo.enter(key) {
            return Ok(None);
        }
        let result = compute();
        self.memo.leave(key);

        if self.cache_enabled {
            if let Ok(Some(value)) = result {
                self.memo.insert(key, value);
            }
        }

        result
    }
}
