//! Errors raised by the graph engine.
//!
//! Values which are merely not yet known are never errors: they are represented by `None` and
//! retried later in the same calculation pass. The variants here are reserved for reads of
//! attributes which were never set, physically meaningless inputs and passes which fail to
//! converge.
use crate::carrier::CarrierID;
use crate::edge::EdgeID;
use crate::node::NodeID;
use crate::slot::Direction;
use thiserror::Error;

/// An error raised while building or calculating a [`Graph`](crate::graph::Graph)
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GraphError {
    /// An attribute was read before being set and has no computable default
    #[error("Missing attribute: {key}")]
    MissingAttribute {
        /// The attribute name
        key: String,
    },

    /// A strategy requiring exactly one parent edge found zero or several
    #[error("Node {node} must have exactly one parent edge, found {count}")]
    InvalidParents {
        /// The node whose parents were inspected
        node: NodeID,
        /// The number of candidate parent edges
        count: usize,
    },

    /// An attribute is derived from another node and cannot be assigned
    #[error("Cannot set {attribute} on {node}: the value is inherited")]
    CannotSetInherited {
        /// The node the assignment was attempted on
        node: NodeID,
        /// The attribute name
        attribute: String,
    },

    /// A value which must not be negative was negative
    #[error("Illegal negative value for {attribute}: {value}")]
    IllegalNegative {
        /// The attribute name
        attribute: String,
        /// The offending value
        value: f64,
    },

    /// A value used as a divisor was zero
    #[error("Illegal zero value for {attribute}")]
    IllegalZero {
        /// The attribute name
        attribute: String,
    },

    /// A value was outside of its meaningful range
    #[error("Illegal value for {attribute}: {value}")]
    IllegalValue {
        /// The attribute name
        attribute: String,
        /// The offending value
        value: f64,
    },

    /// A side of a node has several slots and none of them has a conversion
    #[error("None of the {direction} slots of node {node} has a conversion")]
    MissingConversions {
        /// The node owning the slots
        node: NodeID,
        /// The side of the node
        direction: Direction,
    },

    /// The calculation did not reach a fixed point within the iteration cap
    #[error("Calculation did not converge within {iterations} iterations")]
    ConvergenceLimitExceeded {
        /// The iteration cap which was hit
        iterations: u32,
    },

    /// Two nodes were added with the same key
    #[error("Duplicate node: {0}")]
    DuplicateNode(NodeID),

    /// A carrier was declared twice
    #[error("Duplicate carrier: {0}")]
    DuplicateCarrier(CarrierID),

    /// A slot was declared twice for the same node, carrier and direction
    #[error("Duplicate {direction} slot for carrier {carrier} on node {node}")]
    DuplicateSlot {
        /// The node owning the slot
        node: NodeID,
        /// The slot's carrier
        carrier: CarrierID,
        /// The slot's direction
        direction: Direction,
    },

    /// Two edges were added between the same nodes for the same carrier
    #[error("Duplicate edge: {0}")]
    DuplicateEdge(EdgeID),
}

impl GraphError {
    /// Create a [`GraphError::MissingAttribute`] error
    pub fn missing(key: &str) -> Self {
        Self::MissingAttribute {
            key: key.to_string(),
        }
    }
}

/// A [`Result`] using [`GraphError`]
pub type GraphResult<T> = Result<T, GraphError>;

/// Check that a value is neither negative nor zero, for use as a divisor
pub fn ensure_positive(attribute: &str, value: f64) -> GraphResult<f64> {
    let value = ensure_non_negative(attribute, value)?;
    if value == 0.0 {
        return Err(GraphError::IllegalZero {
            attribute: attribute.to_string(),
        });
    }

    Ok(value)
}

/// Check that a value is a finite, non-negative number
pub fn ensure_non_negative(attribute: &str, value: f64) -> GraphResult<f64> {
    if !value.is_finite() {
        return Err(GraphError::IllegalValue {
            attribute: attribute.to_string(),
            value,
        });
    }
    if value < 0.0 {
        return Err(GraphError::IllegalNegative {
            attribute: attribute.to_string(),
            value,
        });
    }

    Ok(value)
}
