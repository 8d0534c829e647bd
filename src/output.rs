//! The module responsible for writing output data to disk.
use crate::carrier::CarrierID;
use crate::edge::{EdgeID, EdgeType};
use crate::graph::Graph;
use crate::node::NodeID;
use anyhow::{Context, Result, ensure};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

/// The root folder in which example-specific output folders will be created
const OUTPUT_DIRECTORY_ROOT: &str = "qernel_results";

/// The output file name for node demands
const NODE_DEMANDS_FILE_NAME: &str = "node_demands.csv";

/// The output file name for edge values
const EDGE_VALUES_FILE_NAME: &str = "edge_values.csv";

/// Get the default output directory for the named graph
pub fn get_output_dir(name: &str) -> PathBuf {
    [OUTPUT_DIRECTORY_ROOT, name].iter().collect()
}

/// Create a new output directory.
///
/// A non-empty existing directory is only reused if `allow_overwrite` is set, in which case its
/// contents are removed.
///
/// # Returns
///
/// Whether existing output was deleted
pub fn create_output_directory(output_dir: &Path, allow_overwrite: bool) -> Result<bool> {
    let is_empty = match fs::read_dir(output_dir) {
        Ok(mut entries) => entries.next().is_none(),
        // The directory doesn't exist yet
        Err(_) => {
            fs::create_dir_all(output_dir)?;
            return Ok(false);
        }
    };
    if is_empty {
        return Ok(false);
    }

    ensure!(
        allow_overwrite,
        "Output folder already exists and is not empty. Pass --overwrite to replace it."
    );
    fs::remove_dir_all(output_dir)?;
    fs::create_dir_all(output_dir)?;

    Ok(true)
}

/// Represents a row in the node demands CSV file
#[derive(Serialize, Debug, PartialEq)]
struct NodeDemandRow {
    node: NodeID,
    demand: Option<f64>,
    primary_demand: Option<f64>,
    sustainability_share: Option<f64>,
}

/// Represents a row in the edge values CSV file
#[derive(Serialize, Debug, PartialEq)]
struct EdgeValueRow {
    edge: EdgeID,
    supplier: NodeID,
    consumer: NodeID,
    carrier: CarrierID,
    edge_type: EdgeType,
    value: Option<f64>,
    parent_share: Option<f64>,
}

/// Write the resolved demands and edge values of a graph to CSV files in `output_dir`
pub fn write_graph(output_dir: &Path, graph: &Graph) -> Result<()> {
    let path = output_dir.join(NODE_DEMANDS_FILE_NAME);
    let mut writer = csv::Writer::from_path(&path)
        .with_context(|| format!("Could not create {}", path.display()))?;
    for (idx, node) in graph.iter_nodes() {
        writer.serialize(NodeDemandRow {
            node: node.id.clone(),
            demand: node.demand(),
            primary_demand: graph.primary_demand(idx),
            sustainability_share: graph.sustainability_share(idx)?,
        })?;
    }
    writer.flush()?;

    let path = output_dir.join(EDGE_VALUES_FILE_NAME);
    let mut writer = csv::Writer::from_path(&path)
        .with_context(|| format!("Could not create {}", path.display()))?;
    for idx in graph.edge_indices() {
        let edge = graph.edge(idx);
        writer.serialize(EdgeValueRow {
            edge: edge.id.clone(),
            supplier: graph.node(edge.supplier()).id.clone(),
            consumer: graph.node(edge.consumer()).id.clone(),
            carrier: edge.carrier().clone(),
            edge_type: edge.edge_type(),
            value: edge.value(),
            parent_share: graph.parent_share(idx),
        })?;
    }
    writer.flush()?;

    Ok(())
}
