//! Construction of a [`Graph`] from nodes, slots and edges.
use super::lifecycle::{DEFAULT_BALANCE_TOLERANCE, DEFAULT_MAX_ITERATIONS, Lifecycle};
use super::{DatasetID, EnergyGraph, Graph, Memo};
use crate::area::Area;
use crate::carrier::{Carrier, CarrierID, CarrierMap};
use crate::edge::{Edge, EdgeID, EdgeSpec};
use crate::error::{GraphError, GraphResult, ensure_non_negative};
use crate::goal::Goals;
use crate::node::{Node, NodeID, NodeSpec};
use crate::slot::{Direction, Slot, SlotIdx, SlotKind, SlotSpec};
use itertools::Itertools;
use log::warn;
use petgraph::graph::{EdgeIndex, NodeIndex};
use std::collections::{HashMap, HashSet};
use strum::IntoEnumIterator;

/// Incrementally wires up the topology of a [`Graph`]
#[derive(Debug)]
pub struct GraphBuilder {
    graph: EnergyGraph,
    slots: Vec<Slot>,
    carriers: CarrierMap,
    declared_carriers: HashSet<CarrierID>,
    node_indices: HashMap<NodeID, NodeIndex>,
    area: Area,
    dataset: Option<DatasetID>,
    max_iterations: u32,
    cache_enabled: bool,
    balance_tolerance: f64,
}

impl Default for GraphBuilder {
    fn default() -> Self {
        Self {
            graph: EnergyGraph::new(),
            slots: Vec::new(),
            carriers: CarrierMap::new(),
            declared_carriers: HashSet::new(),
            node_indices: HashMap::new(),
            area: Area::default(),
            dataset: None,
            max_iterations: DEFAULT_MAX_ITERATIONS,
            cache_enabled: true,
            balance_tolerance: DEFAULT_BALANCE_TOLERANCE,
        }
    }
}

impl GraphBuilder {
    /// Create an empty builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a carrier.
    ///
    /// A carrier already interned by a slot or edge is replaced by the declaration. Declaring the
    /// same carrier twice is an error.
    pub fn add_carrier(&mut self, carrier: Carrier) -> GraphResult<()> {
        if !self.declared_carriers.insert(carrier.id.clone()) {
            return Err(GraphError::DuplicateCarrier(carrier.id));
        }
        self.carriers.insert(carrier.id.clone(), carrier);

        Ok(())
    }

    /// Add a node, returning its index
    pub fn add_node(&mut self, spec: NodeSpec) -> GraphResult<NodeIndex> {
        if self.node_indices.contains_key(&spec.id) {
            return Err(GraphError::DuplicateNode(spec.id));
        }

        let id = spec.id.clone();
        let node = self.graph.add_node(Node::from_spec(spec));
        self.node_indices.insert(id, node);

        Ok(node)
    }

    /// Add a node with no preset, groups or attributes
    pub fn add_node_id(&mut self, id: &str) -> GraphResult<NodeIndex> {
        self.add_node(NodeSpec::new(id))
    }

    /// Look up a node added earlier
    pub fn node_index(&self, id: &str) -> Option<NodeIndex> {
        self.node_indices.get(id).copied()
    }

    /// Declare a slot on a node
    pub fn add_slot(&mut self, node: NodeIndex, spec: SlotSpec) -> GraphResult<SlotIdx> {
        if let Some(conversion) = spec.conversion {
            ensure_non_negative("conversion", conversion)?;
        }
        if self.graph[node].slot(spec.carrier.as_str(), spec.direction).is_some() {
            return Err(GraphError::DuplicateSlot {
                node: self.graph[node].id.clone(),
                carrier: spec.carrier,
                direction: spec.direction,
            });
        }

        let idx = self.insert_slot(node, spec.carrier, spec.direction);
        let slot = &mut self.slots[idx.0];
        slot.conversion = spec.conversion;
        slot.kind = spec.kind;

        Ok(idx)
    }

    /// Connect two nodes, creating any slot the edge needs.
    ///
    /// The edge's key is `consumer-supplier@carrier`.
    pub fn add_edge(&mut self, spec: EdgeSpec) -> GraphResult<EdgeIndex> {
        if let Some(share) = spec.share {
            ensure_non_negative("share", share)?;
        }

        let id = EdgeID::from(format!(
            "{}-{}@{}",
            self.graph[spec.consumer].id, self.graph[spec.supplier].id, spec.carrier
        ));
        let duplicate = self
            .graph
            .edges_connecting(spec.supplier, spec.consumer)
            .any(|edge| edge.weight().carrier == spec.carrier);
        if duplicate {
            return Err(GraphError::DuplicateEdge(id));
        }

        let output_slot = self.slot_or_insert(spec.supplier, &spec.carrier, Direction::Output);
        let input_slot = self.slot_or_insert(spec.consumer, &spec.carrier, Direction::Input);
        let edge = self.graph.add_edge(
            spec.supplier,
            spec.consumer,
            Edge {
                id,
                consumer: spec.consumer,
                supplier: spec.supplier,
                carrier: spec.carrier,
                output_slot,
                input_slot,
                edge_type: spec.edge_type,
                share: spec.share,
                value: None,
                reversed: spec.reversed,
                groups: spec.groups.into_iter().collect(),
                attributes: Default::default(),
            },
        );
        self.slots[output_slot.0].edges.push(edge);
        self.slots[input_slot.0].edges.push(edge);

        Ok(edge)
    }

    /// Set the regional parameters of the graph
    pub fn area(&mut self, area: Area) -> &mut Self {
        self.area = area;
        self
    }

    /// Record the dataset the graph is built from
    pub fn dataset(&mut self, dataset: &str) -> &mut Self {
        self.dataset = Some(dataset.into());
        self
    }

    /// Set the maximum number of sweeps per calculation pass
    pub fn max_iterations(&mut self, max_iterations: u32) -> &mut Self {
        self.max_iterations = max_iterations;
        self
    }

    /// Enable or disable memoisation and attribute caching
    pub fn cache_enabled(&mut self, enabled: bool) -> &mut Self {
        self.cache_enabled = enabled;
        self
    }

    /// Set the tolerance used when checking slots for imbalances after a pass
    pub fn balance_tolerance(&mut self, tolerance: f64) -> &mut Self {
        self.balance_tolerance = tolerance;
        self
    }

    /// Finish construction
    pub fn build(self) -> GraphResult<Graph> {
        if self.max_iterations == 0 {
            return Err(GraphError::IllegalZero {
                attribute: "max_iterations".into(),
            });
        }
        ensure_non_negative("balance_tolerance", self.balance_tolerance)?;
        self.check_conversions()?;

        let lifecycle = Lifecycle::new(&self.graph, self.max_iterations, self.balance_tolerance);
        Ok(Graph {
            graph: self.graph,
            slots: self.slots,
            carriers: self.carriers,
            node_indices: self.node_indices,
            area: self.area,
            goals: Goals::new(),
            dataset: self.dataset,
            cache_enabled: self.cache_enabled,
            memo: Memo::default(),
            lifecycle,
        })
    }

    fn slot_or_insert(&mut self, node: NodeIndex, carrier: &CarrierID, direction: Direction) -> SlotIdx {
        match self.graph[node].slot(carrier.as_str(), direction) {
            Some(slot) => slot,
            None => self.insert_slot(node, carrier.clone(), direction),
        }
    }

    fn insert_slot(&mut self, node: NodeIndex, carrier: CarrierID, direction: Direction) -> SlotIdx {
        self.carriers
            .entry(carrier.clone())
            .or_insert_with_key(|id| Carrier::new(id.as_str()));

        let idx = SlotIdx(self.slots.len());
        self.slots.push(Slot {
            node,
            carrier: carrier.clone(),
            direction,
            conversion: None,
            kind: SlotKind::Ordinary,
            edges: Vec::new(),
            attributes: Default::default(),
        });
        self.graph[node].slots.insert((carrier, direction), idx);

        idx
    }

    /// Warn about slots which share their side with others but were given no conversion
    /// Check the conversions of every side of a node with more than one slot.
    ///
    /// A side on which no slot is configured or elastic would convert nothing at all, so it is
    /// rejected. A side with only some slots unconfigured is allowed, with a warning.
    fn check_conversions(&self) -> GraphResult<()> {
        for node in self.graph.node_weights() {
            for direction in Direction::iter() {
                let slots = node.slots(direction).map(|idx| &self.slots[idx.0]).collect_vec();
                if slots.len() < 2 {
                    continue;
                }

                let unconfigured = slots
                    .iter()
                    .filter(|slot| slot.conversion.is_none() && slot.kind != SlotKind::Elastic)
                    .collect_vec();
                if unconfigured.len() == slots.len() {
                    return Err(GraphError::MissingConversions {
                        node: node.id.clone(),
                        direction,
                    });
                }

                for slot in unconfigured {
                    warn!(
                        "The {direction} slot for {} on node {} has no conversion and shares its \
                        side with other slots; it will convert nothing",
                        slot.carrier, node.id
                    );
                }
            }
        }

        Ok(())
    }
}
