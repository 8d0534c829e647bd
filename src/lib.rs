//! A demand-propagation engine for energy graphs.
//!
//! An energy graph connects conversion technologies ([nodes](node)) through typed
//! [edges](edge) carrying one [carrier] each. Given a few known demands, [`graph::Graph`]
//! resolves every other demand and flow it can by sweeping the graph until a fixed point is
//! reached.
#![warn(missing_docs)]
use std::path::PathBuf;

pub mod area;
pub mod attribute;
pub mod carrier;
pub mod cli;
pub mod edge;
pub mod error;
pub mod example;
pub mod goal;
pub mod graph;
pub mod id;
pub mod log;
pub mod node;
pub mod node_api;
pub mod output;
pub mod settings;
pub mod slot;

#[cfg(test)]
mod fixture;

/// Get the directory where the program's configuration files are stored
pub fn get_qernel_config_dir() -> PathBuf {
    let mut path = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
    path.push("qernel");

    path
}
