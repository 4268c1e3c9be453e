//! One-at-a-time and grid sensitivity sweeps over the economics of the conversion.
//!
//! Every sweep clones the base scenario, perturbs one or two parameters and re-runs the
//! relevant calculation; nothing here mutates the base scenario itself.
use crate::economics::{
    AnnualCosts, InvestmentAppraisal, LcohBreakdown, appraise_investment, calculate_annual_costs,
    calculate_lcoh, diesel_breakeven_price,
};
use crate::scenario::{Scenario, TornadoMetric};
use crate::utils::linspace;
use derive_more::Display;
use log::info;
use strum::{EnumIter, IntoEnumIterator};

/// Points along the electricity price axis for the 1D sweeps
pub const ELEC_SWEEP_POINTS: usize = 80;

/// Points along the electricity price axis for the diesel breakeven sweep
pub const BREAKEVEN_SWEEP_POINTS: usize = 100;

/// Points per axis of the 2D NPV grid
pub const NPV_GRID_POINTS: usize = 50;

/// Carbon price scenarios for the breakeven and IRR sweeps (GBP per tonne CO2e)
pub const CARBON_SCENARIOS: [f64; 4] = [0.0, 50.0, 100.0, 150.0];

/// Carbon price scenarios for the NPV sweep (GBP per tonne CO2e)
pub const NPV_CARBON_SCENARIOS: [f64; 5] = [0.0, 50.0, 100.0, 150.0, 200.0];

/// Relative perturbation applied to each parameter in the tornado sweep
pub const TORNADO_PERTURBATION: f64 = 0.2;

/// Investment appraisals along the electricity price axis, at one carbon price.
#[derive(Debug, Clone, PartialEq)]
pub struct AppraisalLine {
    /// The carbon price this line was computed at (GBP per tonne CO2e)
    pub carbon_price_gbp_per_tonne: f64,
    /// One appraisal per electricity price
    pub appraisals: Vec<InvestmentAppraisal>,
}

/// Diesel breakeven prices along the electricity price axis, at one carbon price.
#[derive(Debug, Clone, PartialEq)]
pub struct BreakevenLine {
    /// The carbon price this line was computed at (GBP per tonne CO2e)
    pub carbon_price_gbp_per_tonne: f64,
    /// One breakeven pump price per electricity price (GBP per litre)
    pub breakeven_gbp_per_litre: Vec<f64>,
}

/// NPV of the conversion over a grid of electricity and carbon prices.
#[derive(Debug, Clone, PartialEq)]
pub struct NpvGrid {
    /// Electricity price axis (GBP per MWh)
    pub electricity_prices_gbp_per_mwh: Vec<f64>,
    /// Carbon price axis (GBP per tonne CO2e)
    pub carbon_prices_gbp_per_tonne: Vec<f64>,
    /// NPV values indexed by carbon price, then electricity price (GBP)
    pub npv_gbp: Vec<Vec<f64>>,
}

/// The parameters perturbed by the tornado sweep.
///
/// Declaration order is the tie-break order when two parameters have equal swing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumIter)]
pub enum TornadoParameter {
    /// Baseline electricity price
    #[display("Electricity price")]
    ElectricityPrice,
    /// Installed electrolyser cost per kW
    #[display("Electrolyser CAPEX")]
    ElectrolyserCost,
    /// Specific electricity consumption per kg of hydrogen
    #[display("Electrolyser efficiency")]
    ElectrolyserEfficiency,
    /// Balance of plant fraction
    #[display("BoP fraction")]
    BopFraction,
    /// Hydrogen trucking cost per kg
    #[display("Transport cost")]
    TransportCost,
    /// Station operating cost per kg dispensed
    #[display("HRS OPEX")]
    HrsOpex,
    /// Real discount rate
    #[display("Discount rate")]
    DiscountRate,
}

impl TornadoParameter {
    /// A copy of `base` with this parameter scaled by `factor`.
    fn perturbed(self, base: &Scenario, factor: f64) -> Scenario {
        let mut scenario = base.clone();
        match self {
            Self::ElectricityPrice => scenario.electricity_price_gbp_per_mwh *= factor,
            Self::ElectrolyserCost => scenario.electrolyser_cost_gbp_per_kw *= factor,
            Self::ElectrolyserEfficiency => scenario.electrolyser_efficiency_kwh_per_kg *= factor,
            Self::BopFraction => scenario.bop_cost_fraction *= factor,
            Self::TransportCost => scenario.transport_cost_gbp_per_kg *= factor,
            Self::HrsOpex => scenario.hrs_opex_gbp_per_kg *= factor,
            Self::DiscountRate => scenario.discount_rate *= factor,
        }
        scenario
    }
}

/// The effect of one parameter's perturbation on the tornado metric.
#[derive(Debug, Clone, PartialEq)]
pub struct TornadoEntry {
    /// The parameter that was perturbed
    pub parameter: TornadoParameter,
    /// Metric change when the parameter is scaled down
    pub low_delta: f64,
    /// Metric change when the parameter is scaled up
    pub high_delta: f64,
}

impl TornadoEntry {
    /// The total width of this parameter's effect on the metric
    pub fn swing(&self) -> f64 {
        (self.high_delta - self.low_delta).abs()
    }
}

/// The tornado sweep: parameter perturbations ranked by their effect on the metric.
#[derive(Debug, Clone, PartialEq)]
pub struct TornadoReport {
    /// The metric the deltas refer to
    pub metric: TornadoMetric,
    /// The metric's value with every parameter at base
    pub baseline_value: f64,
    /// One entry per parameter, largest swing first
    pub entries: Vec<TornadoEntry>,
}

/// All sweep outputs for one scenario, ready for plotting and CSV export.
#[derive(Debug, Clone, PartialEq)]
pub struct SensitivityReport {
    /// Electricity price axis shared by the LCOH, annual cost and appraisal sweeps
    pub electricity_prices_gbp_per_mwh: Vec<f64>,
    /// One LCOH breakdown per electricity price
    pub lcoh_breakdowns: Vec<LcohBreakdown>,
    /// One set of annual costs per electricity price
    pub annual_costs: Vec<AnnualCosts>,
    /// One appraisal line per carbon price in [`NPV_CARBON_SCENARIOS`]
    pub appraisal_lines: Vec<AppraisalLine>,
    /// Electricity price axis for the breakeven sweep (denser than the shared axis)
    pub breakeven_prices_gbp_per_mwh: Vec<f64>,
    /// One breakeven line per carbon price in [`CARBON_SCENARIOS`]
    pub breakeven_lines: Vec<BreakevenLine>,
    /// NPV over the electricity price x carbon price grid
    pub npv_grid: NpvGrid,
    /// Parameter perturbations ranked by swing
    pub tornado: TornadoReport,
}

impl SensitivityReport {
    /// Run every sweep for `base`.
    pub fn compute(base: &Scenario) -> SensitivityReport {
        let electricity_prices = linspace(
            base.electricity_price_min_gbp_per_mwh,
            base.electricity_price_max_gbp_per_mwh,
            ELEC_SWEEP_POINTS,
        );
        let breakeven_prices = linspace(
            base.electricity_price_min_gbp_per_mwh,
            base.electricity_price_max_gbp_per_mwh,
            BREAKEVEN_SWEEP_POINTS,
        );

        info!(
            "Sweeping electricity prices from {} to {} GBP/MWh",
            base.electricity_price_min_gbp_per_mwh, base.electricity_price_max_gbp_per_mwh
        );

        SensitivityReport {
            lcoh_breakdowns: sweep_lcoh(base, &electricity_prices),
            annual_costs: sweep_annual_costs(base, &electricity_prices),
            appraisal_lines: sweep_appraisals(base, &electricity_prices),
            breakeven_lines: sweep_breakeven(base, &breakeven_prices),
            npv_grid: compute_npv_grid(base),
            tornado: compute_tornado(base),
            electricity_prices_gbp_per_mwh: electricity_prices,
            breakeven_prices_gbp_per_mwh: breakeven_prices,
        }
    }
}

/// LCOH breakdowns along the electricity price axis.
pub fn sweep_lcoh(base: &Scenario, electricity_prices: &[f64]) -> Vec<LcohBreakdown> {
    electricity_prices
        .iter()
        .map(|&price| calculate_lcoh(&base.with_electricity_price(price)))
        .collect()
}

/// Annual fuel costs along the electricity price axis.
pub fn sweep_annual_costs(base: &Scenario, electricity_prices: &[f64]) -> Vec<AnnualCosts> {
    electricity_prices
        .iter()
        .map(|&price| calculate_annual_costs(&base.with_electricity_price(price)))
        .collect()
}

/// Investment appraisals along the electricity price axis, one line per NPV carbon scenario.
pub fn sweep_appraisals(base: &Scenario, electricity_prices: &[f64]) -> Vec<AppraisalLine> {
    NPV_CARBON_SCENARIOS
        .into_iter()
        .map(|carbon_price| {
            let scenario = base.with_carbon_price(carbon_price);
            AppraisalLine {
                carbon_price_gbp_per_tonne: carbon_price,
                appraisals: electricity_prices
                    .iter()
                    .map(|&price| appraise_investment(&scenario.with_electricity_price(price)))
                    .collect(),
            }
        })
        .collect()
}

/// Diesel breakeven prices along the electricity price axis, one line per carbon scenario.
pub fn sweep_breakeven(base: &Scenario, electricity_prices: &[f64]) -> Vec<BreakevenLine> {
    CARBON_SCENARIOS
        .into_iter()
        .map(|carbon_price| {
            let scenario = base.with_carbon_price(carbon_price);
            BreakevenLine {
                carbon_price_gbp_per_tonne: carbon_price,
                breakeven_gbp_per_litre: electricity_prices
                    .iter()
                    .map(|&price| diesel_breakeven_price(&scenario.with_electricity_price(price)))
                    .collect(),
            }
        })
        .collect()
}

/// NPV over the full electricity price x carbon price grid.
pub fn compute_npv_grid(base: &Scenario) -> NpvGrid {
    let electricity_prices = linspace(
        base.electricity_price_min_gbp_per_mwh,
        base.electricity_price_max_gbp_per_mwh,
        NPV_GRID_POINTS,
    );
    let carbon_prices = linspace(
        base.carbon_price_min_gbp_per_tonne,
        base.carbon_price_max_gbp_per_tonne,
        NPV_GRID_POINTS,
    );

    let npv_gbp = carbon_prices
        .iter()
        .map(|&carbon_price| {
            let scenario = base.with_carbon_price(carbon_price);
            electricity_prices
                .iter()
                .map(|&price| appraise_investment(&scenario.with_electricity_price(price)).npv_gbp)
                .collect()
        })
        .collect();

    NpvGrid {
        electricity_prices_gbp_per_mwh: electricity_prices,
        carbon_prices_gbp_per_tonne: carbon_prices,
        npv_gbp,
    }
}

/// The value of the tornado metric for `scenario`.
fn metric_value(scenario: &Scenario, metric: TornadoMetric) -> f64 {
    match metric {
        TornadoMetric::Lcoh => calculate_lcoh(scenario).total_gbp_per_kg,
        TornadoMetric::Npv => appraise_investment(scenario).npv_gbp,
    }
}

/// Perturb each parameter in turn and rank the effects on the scenario's tornado metric.
pub fn compute_tornado(base: &Scenario) -> TornadoReport {
    let metric = base.tornado_metric;
    let baseline_value = metric_value(base, metric);

    let mut entries: Vec<_> = TornadoParameter::iter()
        .map(|parameter| {
            let low = metric_value(
                &parameter.perturbed(base, 1.0 - TORNADO_PERTURBATION),
                metric,
            );
            let high = metric_value(
                &parameter.perturbed(base, 1.0 + TORNADO_PERTURBATION),
                metric,
            );
            TornadoEntry {
                parameter,
                low_delta: low - baseline_value,
                high_delta: high - baseline_value,
            }
        })
        .collect();

    // Stable, so equal swings keep declaration order
    entries.sort_by(|a, b| b.swing().total_cmp(&a.swing()));

    TornadoReport {
        metric,
        baseline_value,
        entries,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixture::scenario;
    use float_cmp::assert_approx_eq;
    use itertools::Itertools;
    use rstest::rstest;

    #[rstest]
    fn test_report_dimensions(scenario: Scenario) {
        let report = SensitivityReport::compute(&scenario);

        assert_eq!(report.electricity_prices_gbp_per_mwh.len(), ELEC_SWEEP_POINTS);
        assert_eq!(report.lcoh_breakdowns.len(), ELEC_SWEEP_POINTS);
        assert_eq!(report.annual_costs.len(), ELEC_SWEEP_POINTS);
        assert_eq!(report.appraisal_lines.len(), NPV_CARBON_SCENARIOS.len());
        for line in &report.appraisal_lines {
            assert_eq!(line.appraisals.len(), ELEC_SWEEP_POINTS);
        }
        assert_eq!(report.breakeven_prices_gbp_per_mwh.len(), BREAKEVEN_SWEEP_POINTS);
        assert_eq!(report.breakeven_lines.len(), CARBON_SCENARIOS.len());
        assert_eq!(report.npv_grid.npv_gbp.len(), NPV_GRID_POINTS);
        assert_eq!(report.npv_grid.npv_gbp[0].len(), NPV_GRID_POINTS);
        assert_eq!(report.tornado.entries.len(), 7);
    }

    #[rstest]
    fn test_sweep_lcoh_matches_direct_calculation(scenario: Scenario) {
        let prices = [20.0, 57.0, 120.0];
        let breakdowns = sweep_lcoh(&scenario, &prices);

        for (price, breakdown) in prices.iter().zip(&breakdowns) {
            assert_eq!(
                *breakdown,
                calculate_lcoh(&scenario.with_electricity_price(*price))
            );
        }
    }

    #[rstest]
    fn test_appraisal_lines_ordered_by_carbon_price(scenario: Scenario) {
        // More valuable carbon savings can only raise the NPV
        let prices = [57.0];
        let lines = sweep_appraisals(&scenario, &prices);

        let npvs: Vec<_> = lines.iter().map(|line| line.appraisals[0].npv_gbp).collect();
        assert!(npvs.iter().tuple_windows().all(|(a, b)| a < b));
    }

    #[rstest]
    fn test_breakeven_falls_with_carbon_price(scenario: Scenario) {
        let prices = [57.0];
        let lines = sweep_breakeven(&scenario, &prices);

        let breakevens: Vec<_> = lines
            .iter()
            .map(|line| line.breakeven_gbp_per_litre[0])
            .collect();
        assert!(breakevens.iter().tuple_windows().all(|(a, b)| a > b));
    }

    #[rstest]
    fn test_npv_grid_monotonic(scenario: Scenario) {
        let grid = compute_npv_grid(&scenario);

        // NPV falls with the electricity price along each row
        for row in &grid.npv_gbp {
            assert!(row.iter().tuple_windows().all(|(a, b)| a > b));
        }

        // And rises with the carbon price down each column
        for column in 0..NPV_GRID_POINTS {
            assert!(
                grid.npv_gbp
                    .iter()
                    .map(|row| row[column])
                    .tuple_windows()
                    .all(|(a, b)| a < b)
            );
        }
    }

    #[rstest]
    fn test_npv_grid_corner_matches_direct_calculation(scenario: Scenario) {
        let grid = compute_npv_grid(&scenario);

        let corner = appraise_investment(
            &scenario
                .with_electricity_price(scenario.electricity_price_min_gbp_per_mwh)
                .with_carbon_price(scenario.carbon_price_min_gbp_per_tonne),
        );
        assert_approx_eq!(f64, grid.npv_gbp[0][0], corner.npv_gbp, epsilon = 1e-6);
    }

    #[rstest]
    fn test_tornado_ranking_for_lcoh(scenario: Scenario) {
        let tornado = compute_tornado(&scenario);
        assert_eq!(tornado.metric, TornadoMetric::Lcoh);
        assert_approx_eq!(f64, tornado.baseline_value, 6.758014186093152, epsilon = 1e-9);

        // Swings are non-increasing
        let swings: Vec<_> = tornado.entries.iter().map(TornadoEntry::swing).collect();
        assert!(swings.iter().tuple_windows().all(|(a, b)| a >= b));

        // Power price and electrolyser efficiency scale the same cost, so they share the
        // top spots; the BoP fraction moves the least
        let top: Vec<_> = tornado.entries[..2].iter().map(|e| e.parameter).collect();
        assert!(top.contains(&TornadoParameter::ElectricityPrice));
        assert!(top.contains(&TornadoParameter::ElectrolyserEfficiency));
        assert_eq!(tornado.entries[2].parameter, TornadoParameter::ElectrolyserCost);
        assert_eq!(
            tornado.entries.last().unwrap().parameter,
            TornadoParameter::BopFraction
        );
    }

    #[rstest]
    fn test_tornado_deltas_for_lcoh(scenario: Scenario) {
        let tornado = compute_tornado(&scenario);

        // Cheaper power lowers the LCOH and dearer power raises it, by 20% of the
        // electricity component each way
        let entry = tornado
            .entries
            .iter()
            .find(|e| e.parameter == TornadoParameter::ElectricityPrice)
            .unwrap();
        assert_approx_eq!(f64, entry.low_delta, -0.627, epsilon = 1e-9);
        assert_approx_eq!(f64, entry.high_delta, 0.627, epsilon = 1e-9);
    }

    #[rstest]
    fn test_tornado_npv_metric(scenario: Scenario) {
        let mut scenario = scenario;
        scenario.tornado_metric = TornadoMetric::Npv;

        let tornado = compute_tornado(&scenario);
        assert_eq!(tornado.metric, TornadoMetric::Npv);
        assert_approx_eq!(f64, tornado.baseline_value, 26_555_880.75597513, epsilon = 1e-3);

        // For NPV the signs flip: cheaper power means a more valuable conversion
        let entry = tornado
            .entries
            .iter()
            .find(|e| e.parameter == TornadoParameter::ElectricityPrice)
            .unwrap();
        assert!(entry.low_delta > 0.0);
        assert!(entry.high_delta < 0.0);
    }

    #[test]
    fn test_tornado_parameter_labels() {
        assert_eq!(
            TornadoParameter::ElectricityPrice.to_string(),
            "Electricity price"
        );
        assert_eq!(TornadoParameter::HrsOpex.to_string(), "HRS OPEX");
        assert_eq!(TornadoParameter::DiscountRate.to_string(), "Discount rate");
    }
}
