//! Edges carry one carrier's flow from a supplier's output slot to a consumer's input slot.
//!
//! Each edge has one of five types, which determine how its value is calculated. Which end of the
//! edge the value is calculated from (its *driving* end) is a pure function of the type and of
//! whether the edge is reversed, given by [`EdgeType::driver`].
use crate::attribute::AttributeStore;
use crate::carrier::CarrierID;
use crate::id::{Tag, define_id_type};
use crate::slot::SlotIdx;
use petgraph::graph::NodeIndex;
use serde::Serialize;
use std::collections::HashSet;
use strum::{Display, EnumIter, EnumString};

define_id_type! {EdgeID}

/// The strategy used to calculate an edge's value
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, Display, EnumString, EnumIter, Serialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum EdgeType {
    /// A fixed fraction of the driving slot's total
    Share,
    /// Whatever the driving slot's total leaves over after the other edges on the slot
    Flexible,
    /// A fixed value, or the demand of the driving node if no value was configured
    Constant,
    /// A fixed fraction of the driving node's demand, not reconciled with the other edges
    Dependent,
    /// The excess of the other edges on the driving slot over the slot's total
    InversedFlexible,
}

/// The end of an edge whose value the edge is calculated from
#[derive(Clone, Copy, Debug, PartialEq, Eq, Display)]
#[strum(serialize_all = "lowercase")]
pub enum Driver {
    /// The supplier, i.e. the node at the output end of the edge
    Parent,
    /// The consumer, i.e. the node at the input end of the edge
    Child,
}

impl EdgeType {
    /// The driving end of an edge of this type, indexed by whether the edge is reversed.
    ///
    /// Share-like edges are driven by their supplier; constant and dependent edges by their
    /// consumer. Reversing an edge swaps its driving end.
    const fn drivers(self) -> [Driver; 2] {
        use Driver::{Child, Parent};
        match self {
            Self::Share | Self::Flexible | Self::InversedFlexible => [Parent, Child],
            Self::Constant | Self::Dependent => [Child, Parent],
        }
    }

    /// The end of an edge of this type which determines its value
    pub const fn driver(self, reversed: bool) -> Driver {
        self.drivers()[reversed as usize]
    }
}

/// A typed, directed connection carrying one carrier between two nodes
#[derive(Debug, Clone)]
pub struct Edge {
    /// A unique key of the form `consumer-supplier@carrier`
    pub id: EdgeID,
    /// The node receiving the flow
    pub(crate) consumer: NodeIndex,
    /// The node producing the flow
    pub(crate) supplier: NodeIndex,
    /// The carrier flowing along the edge
    pub(crate) carrier: CarrierID,
    /// The supplier's output slot the edge leaves from
    pub(crate) output_slot: SlotIdx,
    /// The consumer's input slot the edge arrives at
    pub(crate) input_slot: SlotIdx,
    pub(crate) edge_type: EdgeType,
    /// The configured share, or for constant edges the configured constant.
    ///
    /// Like slot conversions this is topology, fixed when the graph is built and never read from
    /// `attributes`.
    pub(crate) share: Option<f64>,
    /// The resolved value for the current calculation pass
    pub(crate) value: Option<f64>,
    pub(crate) reversed: bool,
    pub(crate) groups: HashSet<Tag>,
    /// Dataset attributes of the edge
    pub attributes: AttributeStore,
}

impl Edge {
    /// The node receiving the flow
    pub fn consumer(&self) -> NodeIndex {
        self.consumer
    }

    /// The node producing the flow
    pub fn supplier(&self) -> NodeIndex {
        self.supplier
    }

    /// The carrier flowing along the edge
    pub fn carrier(&self) -> &CarrierID {
        &self.carrier
    }

    /// The rule the edge's value is calculated by
    pub fn edge_type(&self) -> EdgeType {
        self.edge_type
    }

    /// The configured share, or for constant edges the configured constant
    pub fn share(&self) -> Option<f64> {
        self.share
    }

    /// The resolved value, or `None` while undetermined
    pub fn value(&self) -> Option<f64> {
        self.value
    }

    /// Whether the edge is driven from its consumer rather than its supplier
    pub fn is_reversed(&self) -> bool {
        self.reversed
    }

    /// The groups the edge belongs to
    pub fn groups(&self) -> &HashSet<Tag> {
        &self.groups
    }

    /// The supplier's output slot
    pub fn output_slot(&self) -> SlotIdx {
        self.output_slot
    }

    /// The consumer's input slot
    pub fn input_slot(&self) -> SlotIdx {
        self.input_slot
    }

    /// The end of the edge whose value it is calculated from
    pub fn driver(&self) -> Driver {
        self.edge_type.driver(self.reversed)
    }

    /// The node at the driving end of the edge
    pub fn driving_node(&self) -> NodeIndex {
        match self.driver() {
            Driver::Parent => self.supplier,
            Driver::Child => self.consumer,
        }
    }

    /// The node at the other end of the edge
    pub fn driven_node(&self) -> NodeIndex {
        match self.driver() {
            Driver::Parent => self.consumer,
            Driver::Child => self.supplier,
        }
    }

    /// The edge's slot on its driving node
    pub fn driving_slot(&self) -> SlotIdx {
        match self.driver() {
            Driver::Parent => self.output_slot,
            Driver::Child => self.input_slot,
        }
    }

    /// Whether this is a constant edge with a configured value
    pub fn is_fixed_constant(&self) -> bool {
        self.edge_type == EdgeType::Constant && self.share.is_some()
    }

    /// Whether the edge's value may be used to derive the demand of `node`.
    ///
    /// A fixed constant only counts towards its driving node, so it never pushes a total
    /// backward onto the node it would otherwise feed. Every other edge only counts towards the
    /// node it does not depend on.
    pub fn contributes_to(&self, node: NodeIndex) -> bool {
        if self.is_fixed_constant() {
            node != self.driven_node()
        } else {
            node != self.driving_node()
        }
    }
}

/// The configuration of an edge supplied to the [`GraphBuilder`](crate::graph::GraphBuilder)
#[derive(Debug, Clone, PartialEq)]
pub struct EdgeSpec {
    /// The node receiving the flow
    pub consumer: NodeIndex,
    /// The node producing the flow
    pub supplier: NodeIndex,
    /// The carrier flowing along the edge
    pub carrier: CarrierID,
    /// The edge type
    pub edge_type: EdgeType,
    /// The share (or, for constant edges, the constant)
    pub share: Option<f64>,
    /// Whether the edge is calculated from its other end
    pub reversed: bool,
    /// Groups the edge belongs to
    pub groups: Vec<Tag>,
}

impl EdgeSpec {
    /// Describe an edge from `supplier` to `consumer`
    pub fn new(
        consumer: NodeIndex,
        supplier: NodeIndex,
        carrier: &str,
        edge_type: EdgeType,
    ) -> Self {
        Self {
            consumer,
            supplier,
            carrier: carrier.into(),
            edge_type,
            share: None,
            reversed: false,
            groups: Vec::new(),
        }
    }

    /// Describe a share edge
    pub fn share_of(consumer: NodeIndex, supplier: NodeIndex, carrier: &str, share: f64) -> Self {
        Self::new(consumer, supplier, carrier, EdgeType::Share).share(share)
    }

    /// Describe a flexible edge
    pub fn flexible(consumer: NodeIndex, supplier: NodeIndex, carrier: &str) -> Self {
        Self::new(consumer, supplier, carrier, EdgeType::Flexible)
    }

    /// Describe a constant edge, with or without a configured value
    pub fn constant(
        consumer: NodeIndex,
        supplier: NodeIndex,
        carrier: &str,
        value: Option<f64>,
    ) -> Self {
        let mut spec = Self::new(consumer, supplier, carrier, EdgeType::Constant);
        spec.share = value;
        spec
    }

    /// Set the share of the edge
    pub fn share(mut self, share: f64) -> Self {
        self.share = Some(share);
        self
    }

    /// Mark the edge as reversed
    pub fn reversed(mut self) -> Self {
        self.reversed = true;
        self
    }

    /// Add the edge to a group
    pub fn group(mut self, group: &str) -> Self {
        self.groups.push(group.into());
        self
    }
}
