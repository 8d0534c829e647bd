//! The area holds the regional parameters of the country or region a graph describes.
use crate::attribute::AttributeStore;
use crate::error::GraphResult;
use crate::id::define_id_type;

define_id_type! {AreaID}

/// Regional parameters read by node strategies
#[derive(Debug, Clone)]
pub struct Area {
    /// The area code (e.g. "nl")
    pub id: AreaID,
    /// The area's dataset attributes
    pub attributes: AttributeStore,
}

impl Default for Area {
    fn default() -> Self {
        Self::new("default")
    }
}

impl Area {
    /// Create an area with no attributes
    pub fn new(id: &str) -> Self {
        Self {
            id: id.into(),
            attributes: AttributeStore::new(),
        }
    }

    /// Set an attribute, returning the area
    pub fn with(mut self, key: &str, value: f64) -> Self {
        self.attributes.set(key, value);
        self
    }

    /// The number of residences in the area
    pub fn number_of_residences(&self) -> GraphResult<f64> {
        self.attributes.get("number_of_residences")
    }
}
