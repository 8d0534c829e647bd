//! Fixtures for tests

use crate::edge::EdgeSpec;
use crate::graph::{Graph, GraphBuilder};
use crate::node::{NodeSpec, PRIMARY_ENERGY_DEMAND};
use crate::slot::{SlotKind, SlotSpec};
use rstest::fixture;

/// Assert that an error with the given message occurs
macro_rules! assert_error {
    ($result:expr, $msg:expr) => {
        assert_eq!($result.unwrap_err().to_string(), $msg);
    };
}
pub(crate) use assert_error;

/// A supplier with a demand of 100 split 30/70 over two consumers. Not yet calculated.
#[fixture]
pub fn share_graph() -> Graph {
    let mut builder = GraphBuilder::new();
    let supplier = builder
        .add_node(NodeSpec::new("supplier").preset_demand(100.0))
        .unwrap();
    let left = builder.add_node_id("left").unwrap();
    let right = builder.add_node_id("right").unwrap();
    builder
        .add_edge(EdgeSpec::share_of(left, supplier, "gas", 0.3))
        .unwrap();
    builder
        .add_edge(EdgeSpec::share_of(right, supplier, "gas", 0.7))
        .unwrap();

    builder.build().unwrap()
}

/// A calculated combined heat and power plant with a demand of 100, fed by a primary gas supply
#[fixture]
pub fn chp_graph() -> Graph {
    let mut builder = GraphBuilder::new();
    let gas = builder
        .add_node(NodeSpec::new("gas_supply").group(PRIMARY_ENERGY_DEMAND))
        .unwrap();
    let chp = builder
        .add_node(NodeSpec::new("chp").preset_demand(100.0))
        .unwrap();
    let grid = builder.add_node_id("grid").unwrap();
    let heat = builder.add_node_id("heat_network").unwrap();

    builder
        .add_slot(chp, SlotSpec::output("electricity").conversion(0.4))
        .unwrap();
    builder
        .add_slot(chp, SlotSpec::output("heat").conversion(0.35))
        .unwrap();
    builder
        .add_slot(chp, SlotSpec::output("loss").kind(SlotKind::Elastic))
        .unwrap();
    builder
        .add_edge(EdgeSpec::share_of(grid, chp, "electricity", 1.0))
        .unwrap();
    builder
        .add_edge(EdgeSpec::share_of(heat, chp, "heat", 1.0))
        .unwrap();
    builder
        .add_edge(EdgeSpec::share_of(chp, gas, "gas", 1.0).reversed())
        .unwrap();

    let mut graph = builder.build().unwrap();
    graph.calculate().unwrap();
    graph
}
