//! Units inherited from the single node upstream.
use super::{NUMBER_OF_UNITS, NodeApi};
use crate::error::{GraphError, GraphResult};
use crate::graph::Graph;
use petgraph::graph::NodeIndex;

/// Takes the parent's units in proportion to the share of the parent's output the node receives
pub struct InheritableNouApi;

impl NodeApi for InheritableNouApi {
    fn number_of_units(&self, graph: &Graph, node: NodeIndex) -> GraphResult<Option<f64>> {
        let parents = graph.input_edges(node);
        let &[edge] = parents.as_slice() else {
            return Err(GraphError::InvalidParents {
                node: graph.node(node).id.clone(),
                count: parents.len(),
            });
        };

        let supplier = graph.edge(edge).supplier();
        let Some(parent_units) = graph.number_of_units(supplier)? else {
            return Ok(None);
        };

        Ok(graph.parent_share(edge).map(|share| parent_units * share))
    }

    fn set_number_of_units(&self, graph: &mut Graph, node: NodeIndex, _value: f64) -> GraphResult<()> {
        Err(GraphError::CannotSetInherited {
            node: graph.node(node).id.clone(),
            attribute: NUMBER_OF_UNITS.into(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::edge::EdgeSpec;
    use crate::graph::GraphBuilder;
    use crate::node::{NodeID, NodeSpec};
    use crate::node_api::NodeApiKind;
    use float_cmp::assert_approx_eq;

    #[test]
    fn test_inherits_share_of_parent_units() {
        let mut builder = GraphBuilder::new();
        let parent = builder
            .add_node(NodeSpec::new("parent").preset_demand(100.0))
            .unwrap();
        let child = builder
            .add_node(NodeSpec::new("child").api(NodeApiKind::InheritableNou))
            .unwrap();
        let other = builder.add_node_id("other").unwrap();
        builder
            .add_edge(EdgeSpec::share_of(child, parent, "heat", 0.25))
            .unwrap();
        builder
            .add_edge(EdgeSpec::share_of(other, parent, "heat", 0.75))
            .unwrap();
        let mut graph = builder.build().unwrap();
        graph.set_number_of_units(parent, 20.0).unwrap();
        graph.calculate().unwrap();

        let units = InheritableNouApi.number_of_units(&graph, child).unwrap().unwrap();
        assert_approx_eq!(f64, units, 5.0);
    }

    #[test]
    fn test_orphan_has_invalid_parents() {
        let mut builder = GraphBuilder::new();
        let node = builder
            .add_node(NodeSpec::new("orphan").api(NodeApiKind::InheritableNou))
            .unwrap();
        let graph = builder.build().unwrap();

        assert_eq!(
            InheritableNouApi.number_of_units(&graph, node),
            Err(GraphError::InvalidParents {
                node: NodeID::new("orphan"),
                count: 0
            })
        );
    }

    #[test]
    fn test_cannot_set() {
        let mut builder = GraphBuilder::new();
        let node = builder
            .add_node(NodeSpec::new("child").api(NodeApiKind::InheritableNou))
            .unwrap();
        let mut graph = builder.build().unwrap();

        assert_eq!(
            graph.set_number_of_units(node, 3.0),
            Err(GraphError::CannotSetInherited {
                node: NodeID::new("child"),
                attribute: NUMBER_OF_UNITS.into()
            })
        );
    }
}
