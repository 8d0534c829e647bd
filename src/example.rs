//! Example graphs bundled with the program.
//!
//! Each example is wired up in code through a [`GraphBuilder`], so examples always match the
//! current construction API.
use crate::area::Area;
use crate::carrier::{Carrier, ELECTRICITY, LOSS};
use crate::edge::{EdgeSpec, EdgeType};
use crate::error::GraphResult;
use crate::graph::{Graph, GraphBuilder};
use crate::node::{NodeSpec, PRIMARY_ENERGY_DEMAND};
use crate::node_api::{FULL_LOAD_HOURS, NodeApiKind};
use crate::node_api::base::TYPICAL_INPUT_CAPACITY;
use crate::node_api::demand_driven::{HOUSEHOLDS_SUPPLIED_PER_UNIT, NUMBER_OF_RESIDENCES};
use crate::settings::Settings;
use crate::slot::{SlotKind, SlotSpec};

/// A bundled example graph
pub struct Example {
    /// The name used to refer to the example on the command line
    pub name: &'static str,
    /// A short description of what the example shows
    pub description: &'static str,
    wire: fn(&mut GraphBuilder) -> GraphResult<()>,
}

/// All bundled examples
pub const EXAMPLES: &[Example] = &[
    Example {
        name: "households_heat",
        description: "Space heating for 1000 households, met by heat pumps and gas boilers. \
            Heat pumps cover a fixed 30% share of the demand and gas boilers cover the rest. \
            Demand propagates back from the households to gas extraction and electricity import.",
        wire: households_heat,
    },
    Example {
        name: "chp",
        description: "A gas-fired combined heat and power plant sized by a district heating \
            network. Its electricity output feeds a grid alongside a fixed solar contribution, \
            with a power plant covering whatever remains.",
        wire: chp,
    },
];

/// Look up an example by name
pub fn find_example(name: &str) -> Option<&'static Example> {
    EXAMPLES.iter().find(|example| example.name == name)
}

impl Example {
    /// Build the example's graph using the calculation settings provided
    pub fn build(&self, settings: &Settings) -> GraphResult<Graph> {
        let mut builder = GraphBuilder::new();
        settings.configure(&mut builder);
        builder.dataset(self.name);
        (self.wire)(&mut builder)?;

        builder.build()
    }
}

fn households_heat(builder: &mut GraphBuilder) -> GraphResult<()> {
    builder.area(Area::new("nl").with(NUMBER_OF_RESIDENCES, 1000.0));
    builder.add_carrier(
        Carrier::new("natural_gas")
            .with_co2_per_unit(0.0564)
            .with_sustainable_fraction(0.0),
    )?;
    builder.add_carrier(
        Carrier::new(ELECTRICITY)
            .with_co2_per_unit(0.1)
            .with_sustainable_fraction(0.3),
    )?;
    builder.add_carrier(Carrier::new("ambient_heat").with_sustainable_fraction(1.0))?;

    let gas = builder.add_node(NodeSpec::new("gas_extraction").group(PRIMARY_ENERGY_DEMAND))?;
    let import = builder.add_node(NodeSpec::new("electricity_import").group(PRIMARY_ENERGY_DEMAND))?;
    let ambient = builder.add_node(NodeSpec::new("ambient_heat").group(PRIMARY_ENERGY_DEMAND))?;
    let heat_pump = builder.add_node(
        NodeSpec::new("households_heat_pump")
            .sector("households")
            .api(NodeApiKind::DemandDriven)
            .attribute(HOUSEHOLDS_SUPPLIED_PER_UNIT, 1.0)
            .attribute(FULL_LOAD_HOURS, 2000.0),
    )?;
    let boiler = builder.add_node(
        NodeSpec::new("households_gas_boiler")
            .sector("households")
            .attribute(FULL_LOAD_HOURS, 2000.0)
            .attribute(TYPICAL_INPUT_CAPACITY, 0.03),
    )?;
    let demand = builder.add_node(
        NodeSpec::new("households_space_heating")
            .sector("households")
            .preset_demand(1000.0),
    )?;

    builder.add_slot(heat_pump, SlotSpec::input(ELECTRICITY).conversion(0.3))?;
    builder.add_slot(heat_pump, SlotSpec::input("ambient_heat").conversion(0.7))?;
    builder.add_slot(boiler, SlotSpec::output("heat").conversion(0.9))?;
    builder.add_slot(boiler, SlotSpec::output(LOSS).kind(SlotKind::Elastic))?;

    builder.add_edge(EdgeSpec::share_of(demand, heat_pump, "heat", 0.3).reversed())?;
    builder.add_edge(EdgeSpec::flexible(demand, boiler, "heat").reversed())?;
    builder.add_edge(EdgeSpec::share_of(heat_pump, import, ELECTRICITY, 1.0).reversed())?;
    builder.add_edge(EdgeSpec::share_of(heat_pump, ambient, "ambient_heat", 1.0).reversed())?;
    builder.add_edge(EdgeSpec::share_of(boiler, gas, "natural_gas", 1.0).reversed())?;

    Ok(())
}

fn chp(builder: &mut GraphBuilder) -> GraphResult<()> {
    builder.add_carrier(Carrier::new("natural_gas").with_co2_per_unit(0.0564))?;
    builder.add_carrier(Carrier::new(ELECTRICITY).with_co2_per_unit(0.1))?;
    builder.add_carrier(Carrier::new("solar_radiation").with_sustainable_fraction(1.0))?;

    let gas = builder.add_node(NodeSpec::new("gas_extraction").group(PRIMARY_ENERGY_DEMAND))?;
    let chp = builder.add_node(
        NodeSpec::new("energy_chp_gas")
            .sector("energy")
            .attribute(FULL_LOAD_HOURS, 5000.0)
            .attribute(TYPICAL_INPUT_CAPACITY, 20.0),
    )?;
    let heat_network = builder.add_node(
        NodeSpec::new("district_heating_network")
            .sector("buildings")
            .preset_demand(350.0),
    )?;
    let solar = builder.add_node(
        NodeSpec::new("energy_solar_pv")
            .group(PRIMARY_ENERGY_DEMAND)
            .sector("energy")
            .preset_demand(50.0),
    )?;
    let power_plant = builder.add_node(NodeSpec::new("energy_power_plant").sector("energy"))?;
    let grid = builder.add_node(
        NodeSpec::new("electricity_grid")
            .sector("energy")
            .preset_demand(600.0),
    )?;

    builder.add_slot(chp, SlotSpec::output(ELECTRICITY).conversion(0.4))?;
    builder.add_slot(chp, SlotSpec::output("heat").conversion(0.35))?;
    builder.add_slot(chp, SlotSpec::output(LOSS).kind(SlotKind::Elastic))?;
    builder.add_slot(solar, SlotSpec::input("solar_radiation"))?;

    builder.add_edge(EdgeSpec::share_of(heat_network, chp, "heat", 1.0).reversed())?;
    builder.add_edge(EdgeSpec::share_of(chp, gas, "natural_gas", 1.0).reversed())?;
    builder.add_edge(EdgeSpec::share_of(grid, chp, ELECTRICITY, 1.0))?;
    builder.add_edge(EdgeSpec::constant(grid, solar, ELECTRICITY, Some(50.0)))?;
    builder.add_edge(EdgeSpec::new(grid, power_plant, ELECTRICITY, EdgeType::Flexible).reversed())?;

    Ok(())
}
