//! Strategies for the derived attributes of a node, such as its number of units.
//!
//! Every node carries a [`NodeApiKind`] which selects the strategy. The strategies share the
//! capacity formula in [`input_capacity`] and differ in how they count units.
use crate::error::{GraphResult, ensure_non_negative, ensure_positive};
use crate::graph::Graph;
use petgraph::graph::NodeIndex;
use strum::{Display, EnumIter, EnumString};

pub mod base;
pub use base::BaseApi;
pub mod demand_driven;
pub use demand_driven::DemandDrivenApi;
pub mod inheritable_nou;
pub use inheritable_nou::InheritableNouApi;

/// Attribute holding an explicitly assigned number of units
pub const NUMBER_OF_UNITS: &str = "number_of_units";
/// Attribute holding the hours per year a unit runs at full load
pub const FULL_LOAD_HOURS: &str = "full_load_hours";

/// Seconds per hour, converting MJ demand and hourly load into MW capacity
const SECONDS_PER_HOUR: f64 = 3600.0;

/// How a node derives its attributes
pub trait NodeApi {
    /// The number of units installed at `node`, or `None` while undetermined
    fn number_of_units(&self, graph: &Graph, node: NodeIndex) -> GraphResult<Option<f64>>;

    /// Assign the number of units installed at `node`
    fn set_number_of_units(&self, graph: &mut Graph, node: NodeIndex, value: f64) -> GraphResult<()> {
        let value = ensure_non_negative(NUMBER_OF_UNITS, value)?;
        graph.set_node_attribute(node, NUMBER_OF_UNITS, value);
        Ok(())
    }
}

/// The closed set of node strategies
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Display, EnumString, EnumIter)]
#[strum(serialize_all = "snake_case")]
pub enum NodeApiKind {
    /// Units follow from the node's capacity
    #[default]
    Base,
    /// Units follow from the number of households the node serves
    DemandDriven,
    /// Units are inherited from the single parent node
    InheritableNou,
}

impl NodeApiKind {
    /// The strategy implementing this kind
    pub fn strategy(self) -> &'static dyn NodeApi {
        match self {
            Self::Base => &BaseApi,
            Self::DemandDriven => &DemandDrivenApi,
            Self::InheritableNou => &InheritableNouApi,
        }
    }
}

/// The input capacity of a node in MW, or `None` while its demand is undetermined
pub fn input_capacity(graph: &Graph, node: NodeIndex) -> GraphResult<Option<f64>> {
    let Some(demand) = graph.demand(node) else {
        return Ok(None);
    };
    let full_load_hours = ensure_positive(
        FULL_LOAD_HOURS,
        graph.node_attribute(node, FULL_LOAD_HOURS)?,
    )?;

    Ok(Some(demand / (full_load_hours * SECONDS_PER_HOUR)))
}
