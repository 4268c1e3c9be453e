//! Functionality for running the full techno-economic analysis.
use crate::demand::{FleetDemand, calculate_demand};
use crate::economics::{
    AnnualCosts, InvestmentAppraisal, LcohBreakdown, appraise_cash_flows, calculate_annual_costs,
    calculate_lcoh, diesel_breakeven_price,
};
use crate::emissions::{EmissionsInventory, calculate_emissions};
use crate::figures;
use crate::infrastructure::{InfrastructureCapex, calculate_capex};
use crate::output::write_outputs;
use crate::scenario::Scenario;
use crate::sensitivity::SensitivityReport;
use crate::settings::Settings;
use crate::summary::print_summary;
use anyhow::Result;
use log::info;
use std::path::Path;

/// Results of every model stage for a single scenario.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisResults {
    /// Fleet hydrogen demand
    pub demand: FleetDemand,
    /// Infrastructure sizing and capital costs
    pub capex: InfrastructureCapex,
    /// Levelised cost of hydrogen at the dispenser
    pub lcoh: LcohBreakdown,
    /// Annual fuel costs against the diesel counterfactual
    pub costs: AnnualCosts,
    /// Well-to-wheel emissions of both fleets
    pub emissions: EmissionsInventory,
    /// Investment appraisal over the project horizon
    pub appraisal: InvestmentAppraisal,
    /// Diesel price at which the conversion's annual benefit is zero
    pub breakeven_diesel_gbp_per_litre: f64,
}

/// Evaluate every model stage for `scenario`.
pub fn evaluate(scenario: &Scenario) -> AnalysisResults {
    let demand = calculate_demand(scenario);
    let capex = calculate_capex(scenario, &demand);
    let lcoh = calculate_lcoh(scenario);
    let costs = calculate_annual_costs(scenario);
    let emissions = calculate_emissions(scenario, &demand);
    let appraisal = appraise_cash_flows(scenario, &capex, &costs);
    let breakeven_diesel_gbp_per_litre = diesel_breakeven_price(scenario);

    AnalysisResults {
        demand,
        capex,
        lcoh,
        costs,
        emissions,
        appraisal,
        breakeven_diesel_gbp_per_litre,
    }
}

/// Run the analysis.
///
/// # Arguments:
///
/// * `scenario` - The scenario to analyse
/// * `output_path` - Folder for CSV and figure output
/// * `skip_figures` - Whether to skip rendering figures
/// * `settings` - Program settings
pub fn run(
    scenario: &Scenario,
    output_path: &Path,
    skip_figures: bool,
    settings: &Settings,
) -> Result<()> {
    let results = evaluate(scenario);
    let report = SensitivityReport::compute(scenario);

    write_outputs(scenario, &results, &report, output_path)?;
    if skip_figures {
        info!("Figure rendering skipped");
    } else {
        figures::generate_all(scenario, &results, &report, output_path, settings)?;
    }

    print_summary(scenario, &results);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixture::scenario;
    use crate::output;
    use float_cmp::assert_approx_eq;
    use rstest::rstest;
    use tempfile::tempdir;

    #[rstest]
    fn test_evaluate_baseline(scenario: Scenario) {
        let results = evaluate(&scenario);

        // Stages agree with one another
        assert_eq!(results.demand, calculate_demand(&scenario));
        assert_eq!(
            results.appraisal.total_capex_gbp,
            results.capex.total_capex_gbp
        );
        assert_eq!(
            results.appraisal.annual_benefit_gbp,
            results.costs.total_benefit_gbp
        );
        assert_approx_eq!(
            f64,
            results.appraisal.npv_gbp,
            26_555_880.75597513,
            epsilon = 1e-3
        );
        assert_eq!(
            results.breakeven_diesel_gbp_per_litre,
            diesel_breakeven_price(&scenario)
        );
    }

    #[rstest]
    fn test_run_writes_outputs(scenario: Scenario) {
        let dir = tempdir().unwrap();
        run(&scenario, dir.path(), true, &Settings::default()).unwrap();

        for file_name in [
            output::SUMMARY_FILE_NAME,
            output::LCOH_COMPONENTS_FILE_NAME,
            output::ANNUAL_FUEL_COSTS_FILE_NAME,
            output::BREAKEVEN_FILE_NAME,
            output::NPV_IRR_SWEEP_FILE_NAME,
            output::NPV_GRID_FILE_NAME,
            output::TORNADO_FILE_NAME,
        ] {
            assert!(dir.path().join(file_name).is_file());
        }
    }
}
