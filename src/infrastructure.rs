//! Sizing and capital costs of the production and refuelling infrastructure.
use crate::demand::FleetDemand;
use crate::scenario::Scenario;

/// Hours in a (non-leap) year
pub const HOURS_PER_YEAR: f64 = 8760.0;

/// Kilowatts per megawatt
pub const KW_PER_MW: f64 = 1000.0;

/// Sizing and upfront cost of the new-build infrastructure.
#[derive(Debug, Clone, PartialEq)]
pub struct InfrastructureCapex {
    /// New electrolyser capacity to build (MWe, whole megawatts)
    pub new_electrolyser_mwe: f64,
    /// Cost of the electrolyser equipment itself (GBP)
    pub electrolyser_equipment_gbp: f64,
    /// Balance of plant: compression, storage and civils (GBP)
    pub electrolyser_bop_gbp: f64,
    /// Electrolyser equipment plus balance of plant (GBP)
    pub electrolyser_total_gbp: f64,
    /// Cost of one new refuelling station (GBP)
    pub hrs_per_station_gbp: f64,
    /// Cost of all new refuelling stations (GBP)
    pub hrs_total_gbp: f64,
    /// Total upfront investment (GBP)
    pub total_capex_gbp: f64,
    /// Nameplate output of the new electrolyser (kg per day)
    pub new_production_kg_per_day: f64,
    /// Existing plus new production (kg per day)
    pub total_production_kg_per_day: f64,
}

/// Size the new electrolyser to close the fleet's supply gap.
///
/// The nameplate yield is derated by the plant's annual operating hours, then the result is
/// rounded up to a whole megawatt. A fleet already covered by existing production needs no
/// new build at all.
pub fn size_electrolyser(scenario: &Scenario, supply_gap_kg_per_day: f64) -> f64 {
    if supply_gap_kg_per_day <= 0.0 {
        return 0.0;
    }

    let derated_yield_kg_per_mwe_day = scenario.electrolyser_yield_kg_per_mwe_day
        * (scenario.operating_hours_per_year / HOURS_PER_YEAR);
    (supply_gap_kg_per_day / derated_yield_kg_per_mwe_day).ceil()
}

/// Calculate the upfront cost of the infrastructure needed by `scenario`.
pub fn calculate_capex(scenario: &Scenario, demand: &FleetDemand) -> InfrastructureCapex {
    let new_electrolyser_mwe = size_electrolyser(scenario, demand.supply_gap_kg_per_day);

    let electrolyser_equipment_gbp =
        new_electrolyser_mwe * KW_PER_MW * scenario.electrolyser_cost_gbp_per_kw;
    let electrolyser_bop_gbp = electrolyser_equipment_gbp * scenario.bop_cost_fraction;
    let electrolyser_total_gbp = electrolyser_equipment_gbp + electrolyser_bop_gbp;

    let hrs_per_station_gbp = scenario.hrs_station_cost_eur / scenario.eur_per_gbp;
    let hrs_total_gbp = hrs_per_station_gbp * f64::from(scenario.new_hrs_stations);

    let new_production_kg_per_day =
        new_electrolyser_mwe * scenario.electrolyser_yield_kg_per_mwe_day;

    InfrastructureCapex {
        new_electrolyser_mwe,
        electrolyser_equipment_gbp,
        electrolyser_bop_gbp,
        electrolyser_total_gbp,
        hrs_per_station_gbp,
        hrs_total_gbp,
        total_capex_gbp: electrolyser_total_gbp + hrs_total_gbp,
        new_production_kg_per_day,
        total_production_kg_per_day: scenario.existing_production_kg_per_day
            + new_production_kg_per_day,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::demand::calculate_demand;
    use crate::fixture::{covered_scenario, scenario};
    use float_cmp::assert_approx_eq;
    use rstest::rstest;

    #[rstest]
    fn test_size_electrolyser_baseline(scenario: Scenario) {
        // 2570 kg/day over a yield derated to 8000/8760 of 267 kg/MWe/day rounds up to 11 MWe
        assert_eq!(size_electrolyser(&scenario, 2570.0), 11.0);
    }

    #[rstest]
    #[case(0.0, 0.0)] // No gap, no build
    #[case(-100.0, 0.0)] // Surplus production, no build
    #[case(1.0, 1.0)] // The smallest gap still needs a whole megawatt
    #[case(243.0, 1.0)] // Just below one derated MWe's output
    #[case(244.0, 2.0)] // Just above it
    fn test_size_electrolyser_rounding(
        scenario: Scenario,
        #[case] supply_gap: f64,
        #[case] expected_mwe: f64,
    ) {
        assert_eq!(size_electrolyser(&scenario, supply_gap), expected_mwe);
    }

    #[rstest]
    fn test_size_electrolyser_full_availability(scenario: Scenario) {
        // At 8760 h/yr there is no derating: 267 kg/day exactly fills one MWe
        let mut scenario = scenario;
        scenario.operating_hours_per_year = 8760.0;
        assert_eq!(size_electrolyser(&scenario, 267.0), 1.0);
        assert_eq!(size_electrolyser(&scenario, 268.0), 2.0);
    }

    #[rstest]
    fn test_calculate_capex_baseline(scenario: Scenario) {
        let demand = calculate_demand(&scenario);
        let capex = calculate_capex(&scenario, &demand);

        assert_eq!(capex.new_electrolyser_mwe, 11.0);
        assert_approx_eq!(f64, capex.electrolyser_equipment_gbp, 8_250_000.0, epsilon = 1e-3);
        assert_approx_eq!(f64, capex.electrolyser_bop_gbp, 6_187_500.0, epsilon = 1e-3);
        assert_approx_eq!(f64, capex.electrolyser_total_gbp, 14_437_500.0, epsilon = 1e-3);
        assert_approx_eq!(f64, capex.hrs_per_station_gbp, 2_415_254.237288136, epsilon = 1e-3);
        assert_approx_eq!(f64, capex.hrs_total_gbp, 7_245_762.711864407, epsilon = 1e-3);
        assert_approx_eq!(f64, capex.total_capex_gbp, 21_683_262.71186441, epsilon = 1e-3);
        assert_approx_eq!(f64, capex.new_production_kg_per_day, 2937.0, epsilon = 1e-9);
        assert_approx_eq!(f64, capex.total_production_kg_per_day, 3937.0, epsilon = 1e-9);
    }

    #[rstest]
    fn test_calculate_capex_no_gap(covered_scenario: Scenario) {
        let demand = calculate_demand(&covered_scenario);
        let capex = calculate_capex(&covered_scenario, &demand);

        // Only the refuelling stations are built
        assert_eq!(capex.new_electrolyser_mwe, 0.0);
        assert_eq!(capex.electrolyser_total_gbp, 0.0);
        assert_eq!(capex.new_production_kg_per_day, 0.0);
        assert_approx_eq!(f64, capex.total_capex_gbp, capex.hrs_total_gbp, epsilon = 1e-9);
        assert_approx_eq!(
            f64,
            capex.total_production_kg_per_day,
            covered_scenario.existing_production_kg_per_day,
            epsilon = 1e-9
        );
    }

    #[rstest]
    fn test_capex_split_follows_bop_fraction(scenario: Scenario) {
        let demand = calculate_demand(&scenario);
        let capex = calculate_capex(&scenario, &demand);
        assert_approx_eq!(
            f64,
            capex.electrolyser_bop_gbp,
            capex.electrolyser_equipment_gbp * scenario.bop_cost_fraction,
            epsilon = 1e-6
        );
    }
}
