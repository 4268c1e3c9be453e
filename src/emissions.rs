//! Well-to-wheel emissions of the hydrogen pathway against the diesel baseline.
//!
//! The hydrogen pathway counts grid electricity used for production and dispensing plus
//! trucking emissions. Fuel-cell buses have no tailpipe CO2, so the pathway total is the
//! fleet's whole footprint.
use crate::demand::{FleetDemand, KG_PER_TONNE};
use crate::scenario::Scenario;

/// Grams per kilogram
const G_PER_KG: f64 = 1000.0;

/// Emission intensities of the hydrogen pathway and the annual totals they imply.
#[derive(Debug, Clone, PartialEq)]
pub struct EmissionsInventory {
    /// Grid electricity used in production (kg CO2e per kg H2)
    pub production_kg_per_kg: f64,
    /// Station compression and cooling electricity (kg CO2e per kg H2)
    pub hrs_kg_per_kg: f64,
    /// Trucking from production site to stations (kg CO2e per kg H2)
    pub transport_kg_per_kg: f64,
    /// Whole hydrogen pathway (kg CO2e per kg H2)
    pub total_kg_per_kg: f64,
    /// Annual emissions of the hydrogen fleet (tonnes CO2e)
    pub h2_annual_tonnes: f64,
    /// Annual emissions of an equivalent diesel fleet (tonnes CO2e)
    pub diesel_annual_tonnes: f64,
    /// Annual emissions avoided by running on hydrogen (tonnes CO2e)
    pub saving_tonnes_per_year: f64,
    /// Avoided emissions as a percentage of the diesel baseline
    pub reduction_pct: f64,
}

/// Calculate the emissions inventory for `scenario` at its grid intensity.
pub fn calculate_emissions(scenario: &Scenario, demand: &FleetDemand) -> EmissionsInventory {
    let grid_kg_per_kwh = scenario.grid_intensity_g_per_kwh / G_PER_KG;
    let production_kg_per_kg = scenario.electrolyser_efficiency_kwh_per_kg * grid_kg_per_kwh;
    let hrs_kg_per_kg = scenario.hrs_electricity_kwh_per_kg * grid_kg_per_kwh;
    let transport_kg_per_kg = scenario.transport_emissions_kg_per_kg;
    let total_kg_per_kg = production_kg_per_kg + hrs_kg_per_kg + transport_kg_per_kg;

    let h2_annual_tonnes = demand.annual_total_kg * total_kg_per_kg / KG_PER_TONNE;
    let diesel_annual_tonnes =
        demand.annual_fleet_mileage_km * scenario.diesel_emissions_kg_per_km / KG_PER_TONNE;
    let saving_tonnes_per_year = diesel_annual_tonnes - h2_annual_tonnes;

    EmissionsInventory {
        production_kg_per_kg,
        hrs_kg_per_kg,
        transport_kg_per_kg,
        total_kg_per_kg,
        h2_annual_tonnes,
        diesel_annual_tonnes,
        saving_tonnes_per_year,
        reduction_pct: 100.0 * saving_tonnes_per_year / diesel_annual_tonnes,
    }
}
