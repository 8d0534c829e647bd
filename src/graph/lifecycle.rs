//! The calculation lifecycle: repeated sweeps over the graph until nothing more resolves.
use super::{EnergyGraph, Graph};
use crate::edge::EdgeType;
use crate::error::{GraphError, GraphResult};
use itertools::Itertools;
use log::{debug, info};
use petgraph::algo::tarjan_scc;
use petgraph::graph::{DiGraph, EdgeIndex, NodeIndex};
use std::rc::Rc;
use strum::Display;

/// The default cap on sweeps per calculation pass
pub const DEFAULT_MAX_ITERATIONS: u32 = 1000;
/// The default tolerance for the balance check after a pass
pub const DEFAULT_BALANCE_TOLERANCE: f64 = 1e-9;

/// The stage of a graph's calculation pass
#[derive(Clone, Copy, Debug, PartialEq, Eq, Display)]
pub enum LifecycleState {
    /// No values have been resolved
    Unstarted,
    /// A pass is under way, or stopped at the iteration cap
    Running,
    /// Every value which can be resolved has been
    Converged,
}

/// Per-graph state of the calculation
#[derive(Debug)]
pub(super) struct Lifecycle {
    state: LifecycleState,
    /// Nodes in calculation order
    order: Rc<[NodeIndex]>,
    /// For each node, the edges whose value it drives
    driven_edges: Rc<[Vec<EdgeIndex>]>,
    max_iterations: u32,
    iterations: u32,
    balance_tolerance: f64,
}

impl Lifecycle {
    pub(super) fn new(graph: &EnergyGraph, max_iterations: u32, balance_tolerance: f64) -> Self {
        Self {
            state: LifecycleState::Unstarted,
            order: calculation_order(graph).into(),
            driven_edges: driven_edges(graph).into(),
            max_iterations,
            iterations: 0,
            balance_tolerance,
        }
    }

    pub(super) fn state(&self) -> LifecycleState {
        self.state
    }
}

/// Order nodes so that every node comes after the nodes driving its edges.
///
/// Nodes in a loop of driving relations form one strongly connected component; within a
/// component nodes keep their index order.
fn calculation_order(graph: &EnergyGraph) -> Vec<NodeIndex> {
    let mut drives = DiGraph::<(), ()>::with_capacity(graph.node_count(), graph.edge_count());
    for _ in graph.node_indices() {
        drives.add_node(());
    }
    for edge in graph.edge_weights() {
        drives.add_edge(edge.driving_node(), edge.driven_node(), ());
    }

    // Components come out in reverse topological order
    tarjan_scc(&drives)
        .into_iter()
        .rev()
        .flat_map(|component| component.into_iter().sorted())
        .collect()
}

fn driven_edges(graph: &EnergyGraph) -> Vec<Vec<EdgeIndex>> {
    let mut driven = vec![Vec::new(); graph.node_count()];
    for edge in graph.edge_indices() {
        driven[graph[edge].driving_node().index()].push(edge);
    }

    driven
}

/// Restores a graph's caching mode when dropped
struct CachingGuard<'a> {
    graph: &'a mut Graph,
    previous: bool,
}

impl Drop for CachingGuard<'_> {
    fn drop(&mut self) {
        self.graph.cache_enabled = self.previous;
    }
}

impl Graph {
    /// Resolve every node demand and edge value which can be determined.
    ///
    /// Does nothing if the graph has already converged. Fails if the pass does not converge
    /// within the iteration cap, in which case the values resolved so far are kept.
    pub fn calculate(&mut self) -> GraphResult<()> {
        if self.lifecycle.state == LifecycleState::Converged {
            return Ok(());
        }
        self.lifecycle.state = LifecycleState::Running;

        loop {
            if self.lifecycle.iterations >= self.lifecycle.max_iterations {
                return Err(GraphError::ConvergenceLimitExceeded {
                    iterations: self.lifecycle.max_iterations,
                });
            }
            self.lifecycle.iterations += 1;

            let resolved = self.sweep();
            debug!(
                "Sweep {} resolved {resolved} values",
                self.lifecycle.iterations
            );
            if resolved > 0 {
                continue;
            }

            let assumed = self.apply_undetermined_policy();
            if assumed == 0 {
                break;
            }
            debug!("Assumed zero for {assumed} stalled flexible edges");
        }

        self.lifecycle.state = LifecycleState::Converged;
        info!(
            "Calculation converged after {} sweeps",
            self.lifecycle.iterations
        );
        for imbalance in self.imbalances(self.lifecycle.balance_tolerance) {
            debug!("{imbalance}");
        }

        Ok(())
    }

    /// Visit every node in calculation order, resolving its demand and the edges it drives
    fn sweep(&mut self) -> usize {
        let order = Rc::clone(&self.lifecycle.order);
        let driven_edges = Rc::clone(&self.lifecycle.driven_edges);

        let mut resolved = 0;
        for &node in order.iter() {
            resolved += usize::from(self.resolve_demand(node));
            for &edge in &driven_edges[node.index()] {
                resolved += usize::from(self.resolve_edge(edge));
            }
        }

        resolved
    }

    /// Treat the most upstream stalled flexible edges as carrying nothing.
    ///
    /// Only the edges driven by the first node in calculation order with an unknown demand and a
    /// stalled flexible edge are assumed. Nodes further down may still gain a demand once those
    /// edges are known, so they are retried by the next sweep before anything else is assumed.
    fn apply_undetermined_policy(&mut self) -> usize {
        let order = Rc::clone(&self.lifecycle.order);
        let driven_edges = Rc::clone(&self.lifecycle.driven_edges);

        for &node in order.iter() {
            if self.graph[node].demand.is_some() {
                continue;
            }

            let stalled = driven_edges[node.index()]
                .iter()
                .copied()
                .filter(|&edge| {
                    let this = &self.graph[edge];
                    this.edge_type == EdgeType::Flexible && this.value.is_none()
                })
                .collect_vec();
            if stalled.is_empty() {
                continue;
            }

            for &edge in &stalled {
                self.assume_edge(edge, 0.0);
            }
            return stalled.len();
        }

        0
    }

    /// Clear every resolved value so the graph can be calculated afresh.
    ///
    /// Presets, attributes and goals are kept.
    pub fn reset(&mut self) {
        for node in self.graph.node_weights_mut() {
            node.demand = None;
        }
        for edge in self.graph.edge_weights_mut() {
            edge.value = None;
        }
        self.memo.clear();
        self.lifecycle.iterations = 0;
        self.lifecycle.state = LifecycleState::Unstarted;
    }

    /// Run `f` with memoisation and attribute caching disabled, then restore the previous mode.
    ///
    /// The mode is restored even if `f` panics.
    pub fn without_caching<T, F>(&mut self, f: F) -> T
    where
        F: FnOnce(&mut Self) -> T,
    {
        let mut guard = CachingGuard {
            previous: self.cache_enabled,
            graph: self,
        };
        guard.graph.cache_enabled = false;

        f(&mut *guard.graph)
    }

    /// The stage of the current calculation pass
    pub fn lifecycle_state(&self) -> LifecycleState {
        self.lifecycle.state
    }

    /// The number of sweeps made in the current pass
    pub fn iterations(&self) -> u32 {
        self.lifecycle.iterations
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::edge::EdgeSpec;
    use crate::fixture::share_graph;
    use crate::graph::GraphBuilder;
    use crate::node::NodeSpec;
    use rstest::rstest;

    #[rstest]
    fn test_states(mut share_graph: Graph) {
        assert_eq!(share_graph.lifecycle_state(), LifecycleState::Unstarted);
        share_graph.calculate().unwrap();
        assert_eq!(share_graph.lifecycle_state(), LifecycleState::Converged);

        let sweeps = share_graph.iterations();
        share_graph.calculate().unwrap();
        assert_eq!(share_graph.iterations(), sweeps);

        share_graph.reset();
        assert_eq!(share_graph.lifecycle_state(), LifecycleState::Unstarted);
        assert_eq!(share_graph.iterations(), 0);
        assert!(share_graph.iter_nodes().all(|(_, node)| node.demand().is_none()));
        assert!(share_graph.edge_indices().all(|edge| share_graph.edge_value(edge).is_none()));
    }

    #[test]
    fn test_order_follows_drivers() {
        // Added consumer first; the supplier drives the edge so it must come first
        let mut builder = GraphBuilder::new();
        let consumer = builder.add_node_id("consumer").unwrap();
        let supplier = builder
            .add_node(NodeSpec::new("supplier").preset_demand(1.0))
            .unwrap();
        builder
            .add_edge(EdgeSpec::share_of(consumer, supplier, "gas", 1.0))
            .unwrap();
        let mut graph = builder.build().unwrap();
        assert_eq!(&*graph.lifecycle.order, &[supplier, consumer]);

        // Everything resolves in one sweep, the second finds nothing new
        graph.calculate().unwrap();
        assert_eq!(graph.iterations(), 2);
    }

    #[test]
    fn test_iteration_cap() {
        let mut builder = GraphBuilder::new();
        let supplier = builder
            .add_node(NodeSpec::new("supplier").preset_demand(1.0))
            .unwrap();
        let consumer = builder.add_node_id("consumer").unwrap();
        builder
            .add_edge(EdgeSpec::share_of(consumer, supplier, "gas", 1.0))
            .unwrap();
        builder.max_iterations(1);
        let mut graph = builder.build().unwrap();

        assert_eq!(
            graph.calculate(),
            Err(GraphError::ConvergenceLimitExceeded { iterations: 1 })
        );
        assert_eq!(graph.lifecycle_state(), LifecycleState::Running);
    }

    #[test]
    fn test_flexible_policy() {
        // Nothing drives the supplier, so its flexible edge is assumed empty
        let mut builder = GraphBuilder::new();
        let supplier = builder.add_node_id("supplier").unwrap();
        let consumer = builder.add_node_id("consumer").unwrap();
        let edge = builder
            .add_edge(EdgeSpec::flexible(consumer, supplier, "gas"))
            .unwrap();
        let mut graph = builder.build().unwrap();
        graph.calculate().unwrap();

        assert_eq!(graph.edge_value(edge), Some(0.0));
        assert_eq!(graph.demand(consumer), Some(0.0));
        assert_eq!(graph.demand(supplier), None);
    }

    #[test]
    fn test_flexible_policy_retries_downstream() {
        // The heat edge only stalls behind the gas edge from `z`, so it must not be assumed empty
        let mut builder = GraphBuilder::new();
        let z = builder.add_node_id("z").unwrap();
        let p = builder.add_node(NodeSpec::new("p").preset_demand(50.0)).unwrap();
        let d = builder.add_node_id("d").unwrap();
        let c = builder.add_node_id("c").unwrap();
        let from_z = builder.add_edge(EdgeSpec::flexible(d, z, "gas")).unwrap();
        builder.add_edge(EdgeSpec::share_of(d, p, "gas", 1.0)).unwrap();
        let heat = builder.add_edge(EdgeSpec::flexible(c, d, "heat")).unwrap();
        let mut graph = builder.build().unwrap();
        graph.calculate().unwrap();

        assert_eq!(graph.edge_value(from_z), Some(0.0));
        assert_eq!(graph.demand(d), Some(50.0));
        assert_eq!(graph.edge_value(heat), graph.demand(d));
        assert_eq!(graph.demand(c), Some(50.0));
        assert!(graph.imbalances(DEFAULT_BALANCE_TOLERANCE).is_empty());
    }

    #[rstest]
    fn test_without_caching_restores_mode(mut share_graph: Graph) {
        assert!(share_graph.is_caching());
        let inside = share_graph.without_caching(|graph| graph.is_caching());
        assert!(!inside);
        assert!(share_graph.is_caching());
    }

    #[rstest]
    fn test_without_caching_restores_mode_after_panic(mut share_graph: Graph) {
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            share_graph.without_caching::<(), _>(|_| panic!("calculation aborted"));
        }));
        assert!(result.is_err());
        assert!(share_graph.is_caching());
    }
}
