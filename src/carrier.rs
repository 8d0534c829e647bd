//! Carriers are the energy or material media (electricity, gas, heat, etc.) which flow along
//! edges.
use crate::attribute::AttributeStore;
use crate::error::GraphResult;
use crate::id::define_id_type;
use indexmap::IndexMap;

define_id_type! {CarrierID}

/// A map of [`Carrier`]s, keyed by carrier ID
pub type CarrierMap = IndexMap<CarrierID, Carrier>;

/// The key of the electricity carrier.
///
/// Flexible edges carrying electricity may resolve to negative values, representing net export.
pub const ELECTRICITY: &str = "electricity";

/// The key of the carrier used for conversion losses
pub const LOSS: &str = "loss";

/// Attribute holding the fraction of a carrier which is produced sustainably
pub const SUSTAINABLE_FRACTION: &str = "sustainable_fraction";
/// Attribute holding the cost of one unit of a carrier
pub const COST_PER_UNIT: &str = "cost_per_unit";
/// Attribute holding the CO2 emitted when one unit of a carrier is used
pub const CO2_PER_UNIT: &str = "co2_per_unit";
/// Attribute holding the biogenic CO2 which could be captured when one unit of a carrier is used
pub const POTENTIAL_BIO_CO2_PER_UNIT: &str = "potential_bio_co2_per_unit";

/// An energy or material medium.
///
/// Every property of a carrier other than its key lives in its attribute store, so values set
/// through [`Graph::set_carrier_attribute`](crate::graph::Graph::set_carrier_attribute) are seen
/// by every formula reading them.
#[derive(Debug, Clone, Default)]
pub struct Carrier {
    /// A unique key for the carrier (e.g. "natural_gas")
    pub id: CarrierID,
    /// The carrier's dataset attributes
    pub attributes: AttributeStore,
}

impl Default for CarrierID {
    fn default() -> Self {
        CarrierID::new("")
    }
}

impl Carrier {
    /// Create a carrier with no attributes
    pub fn new(id: &str) -> Self {
        Self {
            id: id.into(),
            ..Default::default()
        }
    }

    /// Set an attribute, returning the carrier
    pub fn with(mut self, key: &str, value: f64) -> Self {
        self.attributes.set(key, value);
        self
    }

    /// Set the sustainable fraction
    pub fn with_sustainable_fraction(self, value: f64) -> Self {
        self.with(SUSTAINABLE_FRACTION, value)
    }

    /// Set the cost per unit
    pub fn with_cost_per_unit(self, value: f64) -> Self {
        self.with(COST_PER_UNIT, value)
    }

    /// Set the CO2 emissions per unit
    pub fn with_co2_per_unit(self, value: f64) -> Self {
        self.with(CO2_PER_UNIT, value)
    }

    /// Set the biogenic CO2 potential per unit
    pub fn with_potential_bio_co2_per_unit(self, value: f64) -> Self {
        self.with(POTENTIAL_BIO_CO2_PER_UNIT, value)
    }

    /// The fraction of the carrier produced sustainably, if set
    pub fn sustainable_fraction(&self) -> GraphResult<Option<f64>> {
        self.attributes.get_opt(SUSTAINABLE_FRACTION, true)
    }

    /// The cost of one unit of the carrier, if set
    pub fn cost_per_unit(&self) -> GraphResult<Option<f64>> {
        self.attributes.get_opt(COST_PER_UNIT, true)
    }

    /// The CO2 emitted per unit of the carrier, if set
    pub fn co2_per_unit(&self) -> GraphResult<Option<f64>> {
        self.attributes.get_opt(CO2_PER_UNIT, true)
    }

    /// The biogenic CO2 potential per unit of the carrier, if set
    pub fn potential_bio_co2_per_unit(&self) -> GraphResult<Option<f64>> {
        self.attributes.get_opt(POTENTIAL_BIO_CO2_PER_UNIT, true)
    }

    /// Whether this is the electricity carrier
    pub fn is_electricity(&self) -> bool {
        self.id.as_str() == ELECTRICITY
    }

    /// Whether this is the loss carrier
    pub fn is_loss(&self) -> bool {
        self.id.as_str() == LOSS
    }
}
