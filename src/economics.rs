//! Levelised costs, annual cash flows and investment appraisal for the fleet conversion.
use crate::demand::{FleetDemand, calculate_demand};
use crate::emissions::calculate_emissions;
use crate::finance::{
    IRR_BRACKET, IRR_MAX_ITERATIONS, IRR_NPV_TOLERANCE, IrrOutcome, annuity_present_value,
    capital_recovery_factor, find_irr, net_present_value, project_cash_flows,
};
use crate::infrastructure::{InfrastructureCapex, KW_PER_MW, calculate_capex};
use crate::scenario::Scenario;

/// Kilowatt hours per megawatt hour
const KWH_PER_MWH: f64 = 1000.0;

/// Years between electrolyser stack replacements
const STACK_REPLACEMENT_INTERVAL_YR: f64 = 10.0;

/// Levelised cost of hydrogen at the dispenser, split by component (GBP per kg).
#[derive(Debug, Clone, PartialEq)]
pub struct LcohBreakdown {
    /// Electricity consumed by the electrolyser
    pub electricity_gbp_per_kg: f64,
    /// Electrolyser CAPEX amortised over its lifetime
    pub capex_amortised_gbp_per_kg: f64,
    /// Annual non-energy operating costs
    pub opex_gbp_per_kg: f64,
    /// Stack replacement, spread over the replacement interval
    pub stack_replacement_gbp_per_kg: f64,
    /// Cost of hydrogen at the production gate (the four components above)
    pub production_gbp_per_kg: f64,
    /// Trucking from production site to stations
    pub transport_gbp_per_kg: f64,
    /// Station operating costs
    pub hrs_gbp_per_kg: f64,
    /// Cost of hydrogen at the dispenser
    pub total_gbp_per_kg: f64,
}

/// Calculate the levelised cost of hydrogen for `scenario`.
///
/// CAPEX-derived components are computed per MWe of installed capacity. Cost and output both
/// scale linearly with capacity, so the result holds for any build size and remains defined
/// when existing production already covers the fleet.
pub fn calculate_lcoh(scenario: &Scenario) -> LcohBreakdown {
    let capex_gbp_per_mwe =
        KW_PER_MW * scenario.electrolyser_cost_gbp_per_kw * (1.0 + scenario.bop_cost_fraction);
    let annual_kg_per_mwe = scenario.electrolyser_yield_kg_per_mwe_day
        * f64::from(scenario.operating_days_per_year);
    let crf = capital_recovery_factor(scenario.electrolyser_lifetime_yr, scenario.discount_rate);

    let electricity_gbp_per_kg =
        scenario.electrolyser_efficiency_kwh_per_kg * scenario.electricity_price_gbp_per_mwh
            / KWH_PER_MWH;
    let capex_amortised_gbp_per_kg = capex_gbp_per_mwe * crf / annual_kg_per_mwe;
    let opex_gbp_per_kg =
        capex_gbp_per_mwe * scenario.electrolyser_opex_fraction / annual_kg_per_mwe;
    let stack_replacement_gbp_per_kg = capex_gbp_per_mwe
        * (scenario.stack_replacement_fraction / STACK_REPLACEMENT_INTERVAL_YR)
        / annual_kg_per_mwe;

    let production_gbp_per_kg = electricity_gbp_per_kg
        + capex_amortised_gbp_per_kg
        + opex_gbp_per_kg
        + stack_replacement_gbp_per_kg;

    LcohBreakdown {
        electricity_gbp_per_kg,
        capex_amortised_gbp_per_kg,
        opex_gbp_per_kg,
        stack_replacement_gbp_per_kg,
        production_gbp_per_kg,
        transport_gbp_per_kg: scenario.transport_cost_gbp_per_kg,
        hrs_gbp_per_kg: scenario.hrs_opex_gbp_per_kg,
        total_gbp_per_kg: production_gbp_per_kg
            + scenario.transport_cost_gbp_per_kg
            + scenario.hrs_opex_gbp_per_kg,
    }
}

/// Annual fuel costs of the hydrogen fleet against its diesel counterfactual (GBP per year).
#[derive(Debug, Clone, PartialEq)]
pub struct AnnualCosts {
    /// Hydrogen bought at the levelised cost
    pub h2_fuel_cost_gbp: f64,
    /// Diesel an equivalent fleet would burn
    pub diesel_fuel_cost_gbp: f64,
    /// Diesel cost minus hydrogen cost (negative when hydrogen is dearer)
    pub fuel_saving_gbp: f64,
    /// Avoided emissions valued at the carbon price
    pub carbon_value_gbp: f64,
    /// Fuel saving plus carbon value
    pub total_benefit_gbp: f64,
}

/// Diesel burned by an equivalent fleet in a year (litres)
fn annual_diesel_litres(scenario: &Scenario, demand: &FleetDemand) -> f64 {
    demand.annual_fleet_mileage_km / scenario.diesel_fuel_economy_km_per_litre
}

/// Calculate the annual fuel bill of the fleet and the benefit of converting it.
pub fn calculate_annual_costs(scenario: &Scenario) -> AnnualCosts {
    let demand = calculate_demand(scenario);
    let lcoh = calculate_lcoh(scenario);
    let emissions = calculate_emissions(scenario, &demand);

    let h2_fuel_cost_gbp = demand.annual_total_kg * lcoh.total_gbp_per_kg;
    let diesel_fuel_cost_gbp =
        annual_diesel_litres(scenario, &demand) * scenario.diesel_price_gbp_per_litre;
    let fuel_saving_gbp = diesel_fuel_cost_gbp - h2_fuel_cost_gbp;
    let carbon_value_gbp =
        emissions.saving_tonnes_per_year * scenario.carbon_price_gbp_per_tonne;

    AnnualCosts {
        h2_fuel_cost_gbp,
        diesel_fuel_cost_gbp,
        fuel_saving_gbp,
        carbon_value_gbp,
        total_benefit_gbp: fuel_saving_gbp + carbon_value_gbp,
    }
}

/// Investment appraisal of the fleet conversion over the project horizon.
#[derive(Debug, Clone, PartialEq)]
pub struct InvestmentAppraisal {
    /// Total upfront investment (GBP)
    pub total_capex_gbp: f64,
    /// Net annual benefit of the conversion (GBP per year)
    pub annual_benefit_gbp: f64,
    /// Net present value at the scenario's discount rate (GBP)
    pub npv_gbp: f64,
    /// Internal rate of return of the conversion
    pub irr: IrrOutcome,
    /// Years for the undiscounted benefit to repay the CAPEX (infinite if it never does)
    pub simple_payback_yr: f64,
    /// Present value of the benefits per pound of CAPEX
    pub benefit_cost_ratio: f64,
}

/// Appraise the fleet conversion described by `scenario`.
pub fn appraise_investment(scenario: &Scenario) -> InvestmentAppraisal {
    let demand = calculate_demand(scenario);
    let capex = calculate_capex(scenario, &demand);
    let costs = calculate_annual_costs(scenario);

    appraise_cash_flows(scenario, &capex, &costs)
}

/// Appraise the conversion from already-calculated CAPEX and annual costs.
pub fn appraise_cash_flows(
    scenario: &Scenario,
    capex: &InfrastructureCapex,
    costs: &AnnualCosts,
) -> InvestmentAppraisal {
    let annual_benefit_gbp = costs.total_benefit_gbp;
    let cash_flows = project_cash_flows(
        capex.total_capex_gbp,
        annual_benefit_gbp,
        scenario.project_life_yr,
    );

    let npv_gbp = net_present_value(&cash_flows, scenario.discount_rate);
    let irr = find_irr(&cash_flows, IRR_BRACKET, IRR_NPV_TOLERANCE, IRR_MAX_ITERATIONS);

    let simple_payback_yr = if annual_benefit_gbp > 0.0 {
        capex.total_capex_gbp / annual_benefit_gbp
    } else {
        f64::INFINITY
    };

    let benefits_pv_gbp = annual_benefit_gbp
        * annuity_present_value(scenario.discount_rate, scenario.project_life_yr);

    InvestmentAppraisal {
        total_capex_gbp: capex.total_capex_gbp,
        annual_benefit_gbp,
        npv_gbp,
        irr,
        simple_payback_yr,
        benefit_cost_ratio: benefits_pv_gbp / capex.total_capex_gbp,
    }
}

/// The diesel price at which the annual fuel bills break even (GBP per litre).
///
/// At this pump price, diesel costs plus the carbon penalty on diesel emissions equal the
/// hydrogen fuel bill, so the conversion's annual benefit is zero.
pub fn diesel_breakeven_price(scenario: &Scenario) -> f64 {
    let demand = calculate_demand(scenario);
    let lcoh = calculate_lcoh(scenario);
    let emissions = calculate_emissions(scenario, &demand);

    let h2_fuel_cost_gbp = demand.annual_total_kg * lcoh.total_gbp_per_kg;
    let diesel_carbon_penalty_gbp =
        emissions.diesel_annual_tonnes * scenario.carbon_price_gbp_per_tonne;

    (h2_fuel_cost_gbp - diesel_carbon_penalty_gbp) / annual_diesel_litres(scenario, &demand)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixture::{covered_scenario, scenario};
    use float_cmp::assert_approx_eq;
    use rstest::rstest;

    #[rstest]
    fn test_calculate_lcoh_baseline(scenario: Scenario) {
        let lcoh = calculate_lcoh(&scenario);

        assert_approx_eq!(f64, lcoh.electricity_gbp_per_kg, 3.135, epsilon = 1e-12);
        assert_approx_eq!(
            f64,
            lcoh.capex_amortised_gbp_per_kg,
            1.2616427839075282,
            epsilon = 1e-9
        );
        assert_approx_eq!(f64, lcoh.opex_gbp_per_kg, 0.2693550869632138, epsilon = 1e-9);
        assert_approx_eq!(
            f64,
            lcoh.stack_replacement_gbp_per_kg,
            0.20201631522241034,
            epsilon = 1e-9
        );
        assert_approx_eq!(f64, lcoh.production_gbp_per_kg, 4.868014186093152, epsilon = 1e-9);
        assert_approx_eq!(f64, lcoh.total_gbp_per_kg, 6.758014186093152, epsilon = 1e-9);
    }

    #[rstest]
    fn test_lcoh_components_sum(scenario: Scenario) {
        let lcoh = calculate_lcoh(&scenario);
        assert_approx_eq!(
            f64,
            lcoh.total_gbp_per_kg,
            lcoh.electricity_gbp_per_kg
                + lcoh.capex_amortised_gbp_per_kg
                + lcoh.opex_gbp_per_kg
                + lcoh.stack_replacement_gbp_per_kg
                + lcoh.transport_gbp_per_kg
                + lcoh.hrs_gbp_per_kg,
            epsilon = 1e-12
        );
    }

    #[rstest]
    fn test_lcoh_independent_of_build_size(scenario: Scenario, covered_scenario: Scenario) {
        // LCOH is per MWe, so parameters that only affect sizing don't move it
        assert_eq!(calculate_lcoh(&scenario), calculate_lcoh(&covered_scenario));
    }

    #[rstest]
    fn test_lcoh_linear_in_electricity_price(scenario: Scenario) {
        // Only the electricity component responds to the power price, at 55 kWh/kg
        let low = calculate_lcoh(&scenario.with_electricity_price(20.0));
        let high = calculate_lcoh(&scenario.with_electricity_price(120.0));

        assert_approx_eq!(
            f64,
            high.total_gbp_per_kg - low.total_gbp_per_kg,
            55.0 * 100.0 / 1000.0,
            epsilon = 1e-9
        );
        assert_eq!(low.capex_amortised_gbp_per_kg, high.capex_amortised_gbp_per_kg);
    }

    #[rstest]
    fn test_lcoh_zero_discount_rate(scenario: Scenario) {
        // With no discounting the CAPEX component is a straight-line depreciation
        let mut scenario = scenario;
        scenario.discount_rate = 0.0;

        let lcoh = calculate_lcoh(&scenario);
        let expected = 1000.0 * 750.0 * 1.75 / 25.0 / (267.0 * 365.0);
        assert_approx_eq!(f64, lcoh.capex_amortised_gbp_per_kg, expected, epsilon = 1e-12);
    }

    #[rstest]
    fn test_lcoh_falls_with_production_volume(scenario: Scenario) {
        // More kilograms per MWe spread the fixed costs thinner
        let mut productive = scenario.clone();
        productive.electrolyser_yield_kg_per_mwe_day = 400.0;

        let base = calculate_lcoh(&scenario);
        let cheaper = calculate_lcoh(&productive);
        assert!(cheaper.total_gbp_per_kg < base.total_gbp_per_kg);
        assert!(cheaper.capex_amortised_gbp_per_kg < base.capex_amortised_gbp_per_kg);
        assert_eq!(cheaper.electricity_gbp_per_kg, base.electricity_gbp_per_kg);
    }

    #[rstest]
    fn test_calculate_annual_costs_baseline(scenario: Scenario) {
        let costs = calculate_annual_costs(&scenario);

        assert_approx_eq!(f64, costs.h2_fuel_cost_gbp, 8_806_030.385188682, epsilon = 1e-3);
        assert_approx_eq!(f64, costs.diesel_fuel_cost_gbp, 13_166_221.6, epsilon = 1e-3);
        assert_approx_eq!(f64, costs.fuel_saving_gbp, 4_360_191.214811318, epsilon = 1e-3);
        assert_approx_eq!(f64, costs.carbon_value_gbp, 553_072.099125, epsilon = 1e-3);
        assert_approx_eq!(f64, costs.total_benefit_gbp, 4_913_263.313936318, epsilon = 1e-3);
    }

    #[rstest]
    fn test_appraise_investment_baseline(scenario: Scenario) {
        let appraisal = appraise_investment(&scenario);

        assert_approx_eq!(f64, appraisal.total_capex_gbp, 21_683_262.71186441, epsilon = 1e-3);
        assert_approx_eq!(f64, appraisal.npv_gbp, 26_555_880.75597513, epsilon = 1e-3);
        assert_approx_eq!(f64, appraisal.simple_payback_yr, 4.413209984158698, epsilon = 1e-9);
        assert_approx_eq!(f64, appraisal.benefit_cost_ratio, 2.2247179360809306, epsilon = 1e-9);

        // The IRR must zero the NPV to within the search tolerance
        let rate = appraisal.irr.rate().unwrap();
        assert_approx_eq!(f64, rate, 0.2225172594189644, epsilon = 1e-3);
        let cash_flows = project_cash_flows(
            appraisal.total_capex_gbp,
            appraisal.annual_benefit_gbp,
            scenario.project_life_yr,
        );
        assert!(net_present_value(&cash_flows, rate).abs() < IRR_NPV_TOLERANCE);
    }

    #[rstest]
    fn test_benefit_cost_ratio_linear_in_benefit(scenario: Scenario) {
        // BCR divides the discounted benefit stream by CAPEX, so it scales with the benefit
        let demand = calculate_demand(&scenario);
        let capex = calculate_capex(&scenario, &demand);
        let costs = calculate_annual_costs(&scenario);
        let mut doubled = costs.clone();
        doubled.total_benefit_gbp *= 2.0;

        let base = appraise_cash_flows(&scenario, &capex, &costs);
        let scaled = appraise_cash_flows(&scenario, &capex, &doubled);
        assert_approx_eq!(
            f64,
            scaled.benefit_cost_ratio,
            2.0 * base.benefit_cost_ratio,
            epsilon = 1e-9
        );
    }

    #[rstest]
    fn test_appraise_investment_hopeless_case(scenario: Scenario) {
        // Expensive power and free diesel: the conversion never pays back
        let mut scenario = scenario.with_electricity_price(500.0);
        scenario.diesel_price_gbp_per_litre = 0.0;
        scenario.carbon_price_gbp_per_tonne = 0.0;

        let appraisal = appraise_investment(&scenario);
        assert!(appraisal.annual_benefit_gbp < 0.0);
        assert!(appraisal.npv_gbp < 0.0);
        assert_eq!(appraisal.irr, IrrOutcome::NoRootInRange);
        assert_eq!(appraisal.simple_payback_yr, f64::INFINITY);
        assert!(appraisal.benefit_cost_ratio < 0.0);
    }

    #[rstest]
    #[case(0.0, 0.9363690596901509)]
    #[case(50.0, 0.8630154409116245)]
    fn test_diesel_breakeven_price(
        scenario: Scenario,
        #[case] carbon_price: f64,
        #[case] expected: f64,
    ) {
        let result = diesel_breakeven_price(&scenario.with_carbon_price(carbon_price));
        assert_approx_eq!(f64, result, expected, epsilon = 1e-9);
    }

    #[rstest]
    fn test_breakeven_zeroes_fuel_saving(scenario: Scenario) {
        // Without a carbon price, setting the pump price to breakeven equalises the fuel bills
        let mut scenario = scenario.with_carbon_price(0.0);
        scenario.diesel_price_gbp_per_litre = diesel_breakeven_price(&scenario);

        let costs = calculate_annual_costs(&scenario);
        assert_approx_eq!(f64, costs.fuel_saving_gbp, 0.0, epsilon = 1e-3);
        assert_approx_eq!(f64, costs.total_benefit_gbp, 0.0, epsilon = 1e-3);
    }

    #[rstest]
    fn test_breakeven_identity_with_carbon_price(scenario: Scenario) {
        // At breakeven, diesel spend plus its carbon penalty equals the hydrogen bill
        let scenario = scenario.with_carbon_price(100.0);
        let breakeven = diesel_breakeven_price(&scenario);

        let demand = calculate_demand(&scenario);
        let emissions = calculate_emissions(&scenario, &demand);
        let litres = annual_diesel_litres(&scenario, &demand);
        let diesel_spend = litres * breakeven
            + emissions.diesel_annual_tonnes * scenario.carbon_price_gbp_per_tonne;

        let costs = calculate_annual_costs(&scenario);
        assert_approx_eq!(f64, diesel_spend, costs.h2_fuel_cost_gbp, epsilon = 1e-3);
    }
}
