//! Units for technologies sized by the households they serve, such as space heaters.
use super::{NUMBER_OF_UNITS, NodeApi};
use crate::error::{GraphResult, ensure_non_negative, ensure_positive};
use crate::graph::Graph;
use petgraph::graph::NodeIndex;

/// Attribute holding the number of households one unit supplies
pub const HOUSEHOLDS_SUPPLIED_PER_UNIT: &str = "households_supplied_per_unit";
/// Area attribute holding the number of residences
pub const NUMBER_OF_RESIDENCES: &str = "number_of_residences";

/// Counts units as the households served over the households served by one unit
pub struct DemandDrivenApi;

impl NodeApi for DemandDrivenApi {
    fn number_of_units(&self, graph: &Graph, node: NodeIndex) -> GraphResult<Option<f64>> {
        if let Some(units) = graph.node_attribute_opt(node, NUMBER_OF_UNITS)? {
            return Ok(Some(units));
        }

        // The fraction of the downstream demand this node covers
        let share: Option<f64> = graph
            .output_edges(node)
            .into_iter()
            .map(|edge| graph.child_share(edge))
            .sum();
        let Some(share) = share else {
            return Ok(None);
        };

        let residences = ensure_non_negative(
            NUMBER_OF_RESIDENCES,
            graph.area_attribute(NUMBER_OF_RESIDENCES)?,
        )?;
        let per_unit = ensure_positive(
            HOUSEHOLDS_SUPPLIED_PER_UNIT,
            graph.node_attribute(node, HOUSEHOLDS_SUPPLIED_PER_UNIT)?,
        )?;

        Ok(Some(share * residences / per_unit))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::area::Area;
    use crate::edge::EdgeSpec;
    use crate::error::GraphError;
    use crate::graph::GraphBuilder;
    use crate::node::NodeSpec;
    use crate::node_api::NodeApiKind;
    use float_cmp::assert_approx_eq;

    /// Two heaters splitting the space heating demand of 1000 residences 40/60
    fn heaters(per_unit: f64) -> (Graph, NodeIndex) {
        let mut builder = GraphBuilder::new();
        builder.area(Area::new("nl").with(NUMBER_OF_RESIDENCES, 1000.0));
        let demand = builder
            .add_node(NodeSpec::new("space_heating").preset_demand(100.0))
            .unwrap();
        let heat_pump = builder
            .add_node(
                NodeSpec::new("heat_pump")
                    .api(NodeApiKind::DemandDriven)
                    .attribute(HOUSEHOLDS_SUPPLIED_PER_UNIT, per_unit),
            )
            .unwrap();
        let boiler = builder.add_node_id("boiler").unwrap();
        builder
            .add_edge(EdgeSpec::share_of(demand, heat_pump, "heat", 0.4).reversed())
            .unwrap();
        builder
            .add_edge(EdgeSpec::share_of(demand, boiler, "heat", 0.6).reversed())
            .unwrap();
        let mut graph = builder.build().unwrap();
        graph.calculate().unwrap();
        (graph, heat_pump)
    }

    #[test]
    fn test_units_from_households() {
        let (graph, heat_pump) = heaters(2.0);
        let units = DemandDrivenApi
            .number_of_units(&graph, heat_pump)
            .unwrap()
            .unwrap();
        assert_approx_eq!(f64, units, 200.0, epsilon = 1e-9);
    }

    #[test]
    fn test_zero_households_per_unit() {
        let (graph, heat_pump) = heaters(0.0);
        assert_eq!(
            DemandDrivenApi.number_of_units(&graph, heat_pump),
            Err(GraphError::IllegalZero {
                attribute: HOUSEHOLDS_SUPPLIED_PER_UNIT.into()
            })
        );
    }
}
