//! Nodes are the conversion technologies of the energy graph.
use crate::attribute::AttributeStore;
use crate::carrier::CarrierID;
use crate::id::{Tag, define_id_type};
use crate::node_api::NodeApiKind;
use crate::slot::{Direction, SlotIdx};
use indexmap::IndexMap;
use std::collections::HashSet;

define_id_type! {NodeID}

/// The group of nodes at which primary energy enters the graph
pub const PRIMARY_ENERGY_DEMAND: &str = "primary_energy_demand";

/// A vertex of the energy graph
#[derive(Debug, Clone)]
pub struct Node {
    /// A unique key for the node (e.g. `households_space_heater_electricity`)
    pub id: NodeID,
    /// The node's resolved demand for the current calculation pass
    pub(crate) demand: Option<f64>,
    /// A demand supplied from outside, which overrides any derived value
    pub(crate) preset_demand: Option<f64>,
    /// The node's slots, keyed by carrier and direction
    pub(crate) slots: IndexMap<(CarrierID, Direction), SlotIdx>,
    groups: HashSet<Tag>,
    sector: Option<Tag>,
    api: NodeApiKind,
    /// Dataset attributes of the node
    pub attributes: AttributeStore,
}

impl Node {
    pub(crate) fn from_spec(spec: NodeSpec) -> Self {
        Self {
            id: spec.id,
            demand: None,
            preset_demand: spec.preset_demand,
            slots: IndexMap::new(),
            groups: spec.groups.into_iter().collect(),
            sector: spec.sector,
            api: spec.api,
            attributes: spec.attributes,
        }
    }

    /// The resolved demand, or `None` while undetermined
    pub fn demand(&self) -> Option<f64> {
        self.demand
    }

    /// The externally supplied demand, if any
    pub fn preset_demand(&self) -> Option<f64> {
        self.preset_demand
    }

    /// Look up the node's slot for a carrier and direction
    pub fn slot(&self, carrier: &str, direction: Direction) -> Option<SlotIdx> {
        self.slots
            .iter()
            .find(|((id, dir), _)| id.as_str() == carrier && *dir == direction)
            .map(|(_, idx)| *idx)
    }

    /// Iterate over the node's slots on one side
    pub fn slots(&self, direction: Direction) -> impl Iterator<Item = SlotIdx> + '_ {
        self.slots
            .iter()
            .filter(move |((_, dir), _)| *dir == direction)
            .map(|(_, idx)| *idx)
    }

    /// The groups the node belongs to
    pub fn groups(&self) -> &HashSet<Tag> {
        &self.groups
    }

    /// Whether the node belongs to `group`
    pub fn in_group(&self, group: &str) -> bool {
        self.groups.contains(group)
    }

    /// Add the node to a group
    pub fn add_group(&mut self, group: &str) {
        self.groups.insert(group.into());
    }

    /// The sector the node is assigned to, if any
    pub fn sector(&self) -> Option<&Tag> {
        self.sector.as_ref()
    }

    /// Assign the node to a sector
    pub fn set_sector(&mut self, sector: &str) {
        self.sector = Some(sector.into());
    }

    /// The strategy used for the node's derived attributes
    pub fn api(&self) -> NodeApiKind {
        self.api
    }

    /// Swap the strategy used for the node's derived attributes
    pub fn set_api(&mut self, api: NodeApiKind) {
        self.api = api;
    }
}

/// The configuration of a node supplied to the [`GraphBuilder`](crate::graph::GraphBuilder)
#[derive(Debug, Clone)]
pub struct NodeSpec {
    /// The node's key
    pub id: NodeID,
    /// An externally supplied demand
    pub preset_demand: Option<f64>,
    /// Groups the node belongs to
    pub groups: Vec<Tag>,
    /// The sector the node belongs to
    pub sector: Option<Tag>,
    /// The node's attribute strategy
    pub api: NodeApiKind,
    /// Initial dataset attributes
    pub attributes: AttributeStore,
}

impl NodeSpec {
    /// Describe a node with the given key
    pub fn new(id: &str) -> Self {
        Self {
            id: id.into(),
            preset_demand: None,
            groups: Vec::new(),
            sector: None,
            api: NodeApiKind::default(),
            attributes: AttributeStore::new(),
        }
    }

    /// Give the node a preset demand
    pub fn preset_demand(mut self, demand: f64) -> Self {
        self.preset_demand = Some(demand);
        self
    }

    /// Add the node to a group
    pub fn group(mut self, group: &str) -> Self {
        self.groups.push(group.into());
        self
    }

    /// Put the node in a sector
    pub fn sector(mut self, sector: &str) -> Self {
        self.sector = Some(sector.into());
        self
    }

    /// Choose the node's attribute strategy
    pub fn api(mut self, api: NodeApiKind) -> Self {
        self.api = api;
        self
    }

    /// Set a dataset attribute
    pub fn attribute(mut self, key: &str, value: f64) -> Self {
        self.attributes.set(key, value);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_from_spec() {
        let node = Node::from_spec(
            NodeSpec::new("households_space_heater_electricity")
                .preset_demand(50.0)
                .group(PRIMARY_ENERGY_DEMAND)
                .sector("households")
                .api(NodeApiKind::DemandDriven)
                .attribute("full_load_hours", 2000.0),
        );

        assert_eq!(node.demand(), None);
        assert_eq!(node.preset_demand(), Some(50.0));
        assert!(node.in_group(PRIMARY_ENERGY_DEMAND));
        assert_eq!(node.sector(), Some(&Tag::new("households")));
        assert_eq!(node.api(), NodeApiKind::DemandDriven);
        assert_eq!(node.attributes.get("full_load_hours"), Ok(2000.0));
        assert_eq!(node.slots(Direction::Input).count(), 0);
    }
}
