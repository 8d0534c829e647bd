//! Slots aggregate all edges of one carrier flowing in one direction at one node.
use crate::attribute::AttributeStore;
use crate::carrier::{CarrierID, LOSS};
use crate::id::define_index_type;
use petgraph::graph::{EdgeIndex, NodeIndex};
use strum::{Display, EnumIter};

define_index_type! {SlotIdx}

/// The side of a node a slot sits on
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Display, EnumIter)]
#[strum(serialize_all = "lowercase")]
pub enum Direction {
    /// Energy flowing into the node from its suppliers
    Input,
    /// Energy flowing out of the node to its consumers
    Output,
}

impl Direction {
    /// The other side of the node
    pub fn opposite(self) -> Self {
        match self {
            Self::Input => Self::Output,
            Self::Output => Self::Input,
        }
    }
}

/// How a slot's conversion and value are treated
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Display)]
#[strum(serialize_all = "snake_case")]
pub enum SlotKind {
    /// A slot with a configured (or defaulted) conversion
    #[default]
    Ordinary,
    /// A slot whose conversion absorbs whatever the other slots on its side leave over
    Elastic,
    /// A slot carrying conversion losses.
    ///
    /// Loss slots never establish the demand of their node.
    Loss,
}

/// The aggregation point for one carrier and direction at a node
#[derive(Debug, Clone)]
pub struct Slot {
    /// The node which owns the slot
    pub(crate) node: NodeIndex,
    /// The carrier of every edge on the slot
    pub(crate) carrier: CarrierID,
    /// Whether the slot is an input or an output of its node
    pub(crate) direction: Direction,
    /// Fraction of the node's demand flowing through this slot, if configured.
    ///
    /// This is part of the graph's topology and is fixed once the graph is built. It is not read
    /// from `attributes`.
    pub(crate) conversion: Option<f64>,
    /// How the slot's conversion is determined
    pub(crate) kind: SlotKind,
    /// The edges connected to the slot, in insertion order
    pub(crate) edges: Vec<EdgeIndex>,
    /// Dataset attributes of the slot
    pub attributes: AttributeStore,
}

impl Slot {
    /// The node which owns the slot
    pub fn node(&self) -> NodeIndex {
        self.node
    }

    /// The carrier flowing through the slot
    pub fn carrier(&self) -> &CarrierID {
        &self.carrier
    }

    /// Whether the slot is an input or an output
    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// How the slot's conversion is determined
    pub fn kind(&self) -> SlotKind {
        self.kind
    }

    /// The configured conversion. See [`Graph::conversion`](crate::graph::Graph::conversion) for
    /// the effective value.
    pub fn configured_conversion(&self) -> Option<f64> {
        self.conversion
    }

    /// The edges connected to this slot
    pub fn edges(&self) -> &[EdgeIndex] {
        &self.edges
    }

    /// Whether the slot carries conversion losses rather than useful energy
    pub fn is_loss(&self) -> bool {
        self.kind == SlotKind::Loss || self.carrier.as_str() == LOSS
    }
}

/// The configuration of a slot supplied to the [`GraphBuilder`](crate::graph::GraphBuilder)
#[derive(Debug, Clone, PartialEq)]
pub struct SlotSpec {
    /// The slot's carrier
    pub carrier: CarrierID,
    /// The slot's direction
    pub direction: Direction,
    /// The slot's conversion, if configured
    pub conversion: Option<f64>,
    /// The slot's kind
    pub kind: SlotKind,
}

impl SlotSpec {
    /// Describe an input slot for `carrier`
    pub fn input(carrier: &str) -> Self {
        Self::new(carrier, Direction::Input)
    }

    /// Describe an output slot for `carrier`
    pub fn output(carrier: &str) -> Self {
        Self::new(carrier, Direction::Output)
    }

    fn new(carrier: &str, direction: Direction) -> Self {
        Self {
            carrier: carrier.into(),
            direction,
            conversion: None,
            kind: SlotKind::Ordinary,
        }
    }

    /// Set the conversion of the slot
    pub fn conversion(mut self, conversion: f64) -> Self {
        self.conversion = Some(conversion);
        self
    }

    /// Set the kind of the slot
    pub fn kind(mut self, kind: SlotKind) -> Self {
        self.kind = kind;
        self
    }
}
