//! Integration tests for calculating demands and edge values through the public API.
use float_cmp::assert_approx_eq;
use petgraph::graph::{EdgeIndex, NodeIndex};
use qernel::carrier::{Carrier, ELECTRICITY};
use qernel::edge::{EdgeSpec, EdgeType};
use qernel::error::GraphError;
use qernel::example::{EXAMPLES, find_example};
use qernel::graph::{Graph, GraphBuilder, LifecycleState};
use qernel::node::{NodeID, NodeSpec};
use qernel::node_api::NodeApiKind;
use qernel::settings::Settings;

fn calculated(builder: GraphBuilder) -> Graph {
    let mut graph = builder.build().unwrap();
    graph.calculate().unwrap();
    graph
}

fn value(graph: &Graph, edge: EdgeIndex) -> f64 {
    graph.edge_value(edge).unwrap()
}

fn demand(graph: &Graph, node: NodeIndex) -> f64 {
    graph.demand(node).unwrap()
}

/// Snapshot of every resolved value, in index order
fn snapshot(graph: &Graph) -> (Vec<Option<f64>>, Vec<Option<f64>>) {
    (
        graph.node_indices().map(|node| graph.demand(node)).collect(),
        graph.edge_indices().map(|edge| graph.edge_value(edge)).collect(),
    )
}

#[test]
fn test_share_split() {
    let mut builder = GraphBuilder::new();
    let supplier = builder
        .add_node(NodeSpec::new("supplier").preset_demand(100.0))
        .unwrap();
    let a = builder.add_node_id("a").unwrap();
    let b = builder.add_node_id("b").unwrap();
    let to_a = builder
        .add_edge(EdgeSpec::share_of(a, supplier, "gas", 0.3))
        .unwrap();
    let to_b = builder
        .add_edge(EdgeSpec::share_of(b, supplier, "gas", 0.7))
        .unwrap();
    let graph = calculated(builder);

    assert_approx_eq!(f64, value(&graph, to_a), 30.0);
    assert_approx_eq!(f64, value(&graph, to_b), 70.0);
    assert_approx_eq!(f64, demand(&graph, a), 30.0);
    assert_approx_eq!(f64, demand(&graph, b), 70.0);
    assert_approx_eq!(f64, graph.parent_share(to_a).unwrap(), 0.3);
}

fn flexible_graph(carrier: &str, share: f64) -> (Graph, EdgeIndex) {
    let mut builder = GraphBuilder::new();
    builder.add_carrier(Carrier::new(carrier)).unwrap();
    let supplier = builder
        .add_node(NodeSpec::new("supplier").preset_demand(100.0))
        .unwrap();
    let fixed = builder.add_node_id("fixed").unwrap();
    let rest = builder.add_node_id("rest").unwrap();
    builder
        .add_edge(EdgeSpec::share_of(fixed, supplier, carrier, share))
        .unwrap();
    let flexible = builder
        .add_edge(EdgeSpec::flexible(rest, supplier, carrier))
        .unwrap();
    (calculated(builder), flexible)
}

#[test]
fn test_flexible_takes_remainder() {
    let (graph, flexible) = flexible_graph("heat", 0.8);
    assert_approx_eq!(f64, value(&graph, flexible), 20.0, epsilon = 1e-9);
}

#[test]
fn test_flexible_clamped_at_zero() {
    let (graph, flexible) = flexible_graph("heat", 1.2);
    assert_eq!(graph.edge_value(flexible), Some(0.0));
}

#[test]
fn test_flexible_electricity_may_be_negative() {
    let (graph, flexible) = flexible_graph(ELECTRICITY, 1.2);
    assert_approx_eq!(f64, value(&graph, flexible), -20.0, epsilon = 1e-9);
}

#[test]
fn test_inversed_flexible_never_negative() {
    // Inputs of 40 and 30 against an output of 70 leave no excess
    let mut builder = GraphBuilder::new();
    let node = builder.add_node_id("node").unwrap();
    let a = builder.add_node(NodeSpec::new("a").preset_demand(40.0)).unwrap();
    let b = builder.add_node(NodeSpec::new("b").preset_demand(30.0)).unwrap();
    let excess = builder.add_node_id("excess").unwrap();
    let consumer = builder
        .add_node(NodeSpec::new("consumer").preset_demand(70.0))
        .unwrap();
    builder.add_edge(EdgeSpec::share_of(node, a, "gas", 1.0)).unwrap();
    builder.add_edge(EdgeSpec::share_of(node, b, "gas", 1.0)).unwrap();
    let inversed = builder
        .add_edge(EdgeSpec::new(node, excess, "gas", EdgeType::InversedFlexible).reversed())
        .unwrap();
    builder
        .add_edge(EdgeSpec::constant(consumer, node, "heat", None))
        .unwrap();
    let graph = calculated(builder);

    assert_approx_eq!(f64, demand(&graph, node), 70.0);
    assert_eq!(graph.edge_value(inversed), Some(0.0));
    assert_eq!(graph.demand(excess), Some(0.0));
}

#[test]
fn test_unset_constant_adopts_demand() {
    let mut builder = GraphBuilder::new();
    let supplier = builder.add_node_id("supplier").unwrap();
    let consumer = builder
        .add_node(NodeSpec::new("consumer").preset_demand(80.0))
        .unwrap();
    let edge = builder
        .add_edge(EdgeSpec::constant(consumer, supplier, "heat", None))
        .unwrap();
    let graph = calculated(builder);

    assert_approx_eq!(f64, value(&graph, edge), 80.0);
    assert_approx_eq!(f64, demand(&graph, supplier), 80.0);
}

#[test]
fn test_fixed_constant_does_not_change_supplier_demand() {
    let mut builder = GraphBuilder::new();
    let supplier = builder.add_node_id("supplier").unwrap();
    let consumer = builder
        .add_node(NodeSpec::new("consumer").preset_demand(80.0))
        .unwrap();
    let other = builder.add_node_id("other").unwrap();
    builder
        .add_edge(EdgeSpec::constant(consumer, supplier, "heat", None))
        .unwrap();
    let fixed = builder
        .add_edge(EdgeSpec::constant(other, supplier, "heat", Some(30.0)))
        .unwrap();
    let graph = calculated(builder);

    assert_approx_eq!(f64, value(&graph, fixed), 30.0);
    assert_approx_eq!(f64, demand(&graph, supplier), 80.0);
    assert_approx_eq!(f64, demand(&graph, other), 30.0);
}

fn inheritance_graph(with_parent: bool) -> (Graph, NodeIndex) {
    let mut builder = GraphBuilder::new();
    let child = builder
        .add_node(NodeSpec::new("child").api(NodeApiKind::InheritableNou))
        .unwrap();
    if with_parent {
        let parent = builder
            .add_node(NodeSpec::new("parent").preset_demand(100.0))
            .unwrap();
        let sibling = builder.add_node_id("sibling").unwrap();
        builder
            .add_edge(EdgeSpec::share_of(child, parent, "heat", 0.25))
            .unwrap();
        builder
            .add_edge(EdgeSpec::share_of(sibling, parent, "heat", 0.75))
            .unwrap();
    }

    let mut graph = builder.build().unwrap();
    if let Some(parent) = graph.node_index("parent") {
        graph.set_number_of_units(parent, 20.0).unwrap();
    }
    graph.calculate().unwrap();
    (graph, child)
}

#[test]
fn test_inherited_units() {
    let (mut graph, child) = inheritance_graph(true);
    assert_approx_eq!(f64, graph.number_of_units(child).unwrap().unwrap(), 5.0);

    assert_eq!(
        graph.set_number_of_units(child, 1.0),
        Err(GraphError::CannotSetInherited {
            node: NodeID::new("child"),
            attribute: "number_of_units".into()
        })
    );
}

#[test]
fn test_inherited_units_without_parent() {
    let (graph, child) = inheritance_graph(false);
    assert_eq!(
        graph.number_of_units(child),
        Err(GraphError::InvalidParents {
            node: NodeID::new("child"),
            count: 0
        })
    );
}

#[test]
fn test_convergence_limit() {
    let mut builder = GraphBuilder::new();
    let supplier = builder
        .add_node(NodeSpec::new("supplier").preset_demand(10.0))
        .unwrap();
    let consumer = builder.add_node_id("consumer").unwrap();
    builder
        .add_edge(EdgeSpec::share_of(consumer, supplier, "gas", 1.0))
        .unwrap();
    builder.max_iterations(1);
    let mut graph = builder.build().unwrap();

    let err = graph.calculate().unwrap_err();
    assert_eq!(err, GraphError::ConvergenceLimitExceeded { iterations: 1 });
    assert_eq!(
        err.to_string(),
        "Calculation did not converge within 1 iterations"
    );
    assert_eq!(graph.lifecycle_state(), LifecycleState::Running);
}

#[test]
fn test_calculate_is_idempotent() {
    for example in EXAMPLES {
        let mut graph = example.build(&Settings::default()).unwrap();
        graph.calculate().unwrap();
        let first = snapshot(&graph);

        graph.calculate().unwrap();
        assert_eq!(snapshot(&graph), first);
    }
}

#[test]
fn test_reset_and_recalculate_is_deterministic() {
    let mut graph = find_example("households_heat")
        .unwrap()
        .build(&Settings::default())
        .unwrap();
    graph.calculate().unwrap();
    let first = snapshot(&graph);

    graph.reset();
    assert_eq!(graph.lifecycle_state(), LifecycleState::Unstarted);
    graph.calculate().unwrap();
    assert_eq!(snapshot(&graph), first);

    // An independently built graph agrees too
    let mut other = find_example("households_heat")
        .unwrap()
        .build(&Settings::default())
        .unwrap();
    other.calculate().unwrap();
    assert_eq!(snapshot(&other), first);
}

#[test]
fn test_preset_change_applies_after_reset() {
    let mut graph = find_example("households_heat")
        .unwrap()
        .build(&Settings::default())
        .unwrap();
    graph.calculate().unwrap();
    let demand_node = graph.node_index("households_space_heating").unwrap();
    let gas = graph.node_index("gas_extraction").unwrap();

    graph.reset();
    graph.set_preset_demand(demand_node, Some(2000.0));
    graph.calculate().unwrap();
    assert_approx_eq!(f64, demand(&graph, gas), 1400.0 / 0.9, epsilon = 1e-9);
}

#[test]
fn test_balanced_examples() {
    for example in EXAMPLES {
        let mut graph = example.build(&Settings::default()).unwrap();
        graph.calculate().unwrap();
        assert!(graph.imbalances(1e-9).is_empty());
    }
}

#[test]
fn test_without_caching_gives_same_shares() {
    let mut graph = find_example("chp").unwrap().build(&Settings::default()).unwrap();
    graph.calculate().unwrap();
    let cached: Vec<_> = graph
        .edge_indices()
        .map(|edge| graph.parent_share(edge))
        .collect();

    let uncached: Vec<_> = graph.without_caching(|graph| {
        graph
            .edge_indices()
            .map(|edge| graph.parent_share(edge))
            .collect()
    });
    assert_eq!(cached, uncached);
    assert!(graph.is_caching());
}
