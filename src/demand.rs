//! Hydrogen demand for the bus fleet, from first principles.
use crate::scenario::Scenario;

/// Kilograms per tonne
pub const KG_PER_TONNE: f64 = 1000.0;

/// Daily and annual hydrogen requirements of the fleet.
///
/// All quantities are unrounded; values are formatted only when reported.
#[derive(Debug, Clone, PartialEq)]
pub struct FleetDemand {
    /// Hydrogen consumed by one bus in a day (kg)
    pub daily_per_bus_kg: f64,
    /// Daily demand of the buses already in service (kg per day)
    pub existing_fleet_daily_kg: f64,
    /// Daily demand of the full planned fleet (kg per day)
    pub full_fleet_daily_kg: f64,
    /// Shortfall between full-fleet demand and existing production (kg per day).
    ///
    /// Zero when existing production already covers the fleet.
    pub supply_gap_kg_per_day: f64,
    /// Annual demand of the full fleet (kg)
    pub annual_total_kg: f64,
    /// Annual demand of the full fleet (tonnes)
    pub annual_total_tonnes: f64,
    /// Distance covered by the full fleet in a year (km)
    pub annual_fleet_mileage_km: f64,
}

/// Calculate the hydrogen demand of the fleet described by `scenario`.
pub fn calculate_demand(scenario: &Scenario) -> FleetDemand {
    let daily_per_bus_kg = scenario.daily_mileage_km / 100.0 * scenario.fuel_economy_kg_per_100km;
    let existing_fleet_daily_kg = f64::from(scenario.existing_buses) * daily_per_bus_kg;
    let full_fleet_daily_kg = f64::from(scenario.total_buses) * daily_per_bus_kg;
    let supply_gap_kg_per_day =
        (full_fleet_daily_kg - scenario.existing_production_kg_per_day).max(0.0);

    let operating_days = f64::from(scenario.operating_days_per_year);
    let annual_total_kg = full_fleet_daily_kg * operating_days;
    let annual_fleet_mileage_km =
        f64::from(scenario.total_buses) * scenario.daily_mileage_km * operating_days;

    FleetDemand {
        daily_per_bus_kg,
        existing_fleet_daily_kg,
        full_fleet_daily_kg,
        supply_gap_kg_per_day,
        annual_total_kg,
        annual_total_tonnes: annual_total_kg / KG_PER_TONNE,
        annual_fleet_mileage_km,
    }
}
