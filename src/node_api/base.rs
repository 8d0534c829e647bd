//! The default strategy: units follow from capacity.
use super::{NUMBER_OF_UNITS, NodeApi, input_capacity};
use crate::error::{GraphResult, ensure_positive};
use crate::graph::Graph;
use petgraph::graph::NodeIndex;

/// Attribute holding the input capacity of one unit in MW
pub const TYPICAL_INPUT_CAPACITY: &str = "typical_input_capacity";

/// Counts units as input capacity over the capacity of a typical unit
pub struct BaseApi;

impl NodeApi for BaseApi {
    fn number_of_units(&self, graph: &Graph, node: NodeIndex) -> GraphResult<Option<f64>> {
        if let Some(units) = graph.node_attribute_opt(node, NUMBER_OF_UNITS)? {
            return Ok(Some(units));
        }

        let Some(capacity) = input_capacity(graph, node)? else {
            return Ok(None);
        };
        let typical = ensure_positive(
            TYPICAL_INPUT_CAPACITY,
            graph.node_attribute(node, TYPICAL_INPUT_CAPACITY)?,
        )?;

        Ok(Some(capacity / typical))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GraphError;
    use crate::graph::GraphBuilder;
    use crate::node::NodeSpec;
    use crate::node_api::FULL_LOAD_HOURS;
    use float_cmp::assert_approx_eq;

    fn boiler(spec: NodeSpec) -> (Graph, NodeIndex) {
        let mut builder = GraphBuilder::new();
        let node = builder
            .add_node(spec.preset_demand(36_000.0).attribute(FULL_LOAD_HOURS, 1.0))
            .unwrap();
        let mut graph = builder.build().unwrap();
        graph.calculate().unwrap();
        (graph, node)
    }

    #[test]
    fn test_units_from_capacity() {
        // 36 000 MJ over one full load hour is 10 MW
        let (graph, node) = boiler(NodeSpec::new("boiler").attribute(TYPICAL_INPUT_CAPACITY, 2.5));
        let units = BaseApi.number_of_units(&graph, node).unwrap().unwrap();
        assert_approx_eq!(f64, units, 4.0);
    }

    #[test]
    fn test_explicit_units_win() {
        let (graph, node) = boiler(
            NodeSpec::new("boiler")
                .attribute(TYPICAL_INPUT_CAPACITY, 2.5)
                .attribute(NUMBER_OF_UNITS, 7.0),
        );
        assert_eq!(BaseApi.number_of_units(&graph, node), Ok(Some(7.0)));
    }

    #[test]
    fn test_missing_typical_capacity() {
        let (graph, node) = boiler(NodeSpec::new("boiler"));
        assert_eq!(
            BaseApi.number_of_units(&graph, node),
            Err(GraphError::missing(TYPICAL_INPUT_CAPACITY))
        );
    }

    #[test]
    fn test_zero_typical_capacity() {
        let (graph, node) = boiler(NodeSpec::new("boiler").attribute(TYPICAL_INPUT_CAPACITY, 0.0));
        assert_eq!(
            BaseApi.number_of_units(&graph, node),
            Err(GraphError::IllegalZero {
                attribute: TYPICAL_INPUT_CAPACITY.into()
            })
        );
    }
}
