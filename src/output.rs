//! The module responsible for writing output data to disk.
use crate::analysis::AnalysisResults;
use crate::economics::{AnnualCosts, LcohBreakdown};
use crate::scenario::Scenario;
use crate::sensitivity::{AppraisalLine, BreakevenLine, NpvGrid, SensitivityReport, TornadoReport};
use anyhow::{Context, Result};
use csv;
use log::info;
use serde::{Deserialize, Serialize};
use std::fs;
use std::fs::File;
use std::path::{Path, PathBuf};

/// The root folder in which scenario-specific output folders will be created
pub const OUTPUT_DIRECTORY_ROOT: &str = "h2fleet_results";

/// The output folder name used when running the built-in baseline scenario
const BASELINE_OUTPUT_DIR_NAME: &str = "baseline";

/// The output file name for headline metrics
pub const SUMMARY_FILE_NAME: &str = "summary.csv";

/// The output file name for the LCOH component sweep
pub const LCOH_COMPONENTS_FILE_NAME: &str = "lcoh_components.csv";

/// The output file name for the annual fuel cost sweep
pub const ANNUAL_FUEL_COSTS_FILE_NAME: &str = "annual_fuel_costs.csv";

/// The output file name for the diesel breakeven sweep
pub const BREAKEVEN_FILE_NAME: &str = "breakeven_diesel.csv";

/// The output file name for the NPV and IRR sweep
pub const NPV_IRR_SWEEP_FILE_NAME: &str = "npv_irr_sweep.csv";

/// The output file name for the 2D NPV grid
pub const NPV_GRID_FILE_NAME: &str = "npv_grid.csv";

/// The output file name for the tornado sweep
pub const TORNADO_FILE_NAME: &str = "tornado.csv";

/// Get the output directory for the given scenario file.
///
/// The directory is named after the scenario file's stem, or "baseline" when the built-in
/// scenario is being run.
pub fn get_output_dir(scenario_path: Option<&Path>) -> Result<PathBuf> {
    let Some(scenario_path) = scenario_path else {
        return Ok([OUTPUT_DIRECTORY_ROOT, BASELINE_OUTPUT_DIR_NAME].iter().collect());
    };

    // Canonicalise in case the user has specified something like "./scenario.toml"
    let scenario_path = scenario_path
        .canonicalize()
        .context("Could not resolve path to scenario file")?;

    let scenario_name = scenario_path
        .file_stem()
        .context("Scenario path has no file name")?
        .to_str()
        .context("Invalid chars in scenario file name")?;

    Ok([OUTPUT_DIRECTORY_ROOT, scenario_name].iter().collect())
}

/// Create the output directory, optionally wiping a previous run's results.
///
/// # Returns
///
/// Whether an existing directory was removed first.
pub fn create_output_directory(output_dir: &Path, overwrite: bool) -> Result<bool> {
    let removed = output_dir.is_dir() && overwrite;
    if removed {
        fs::remove_dir_all(output_dir)?;
    }

    // Try to create the directory, with parents
    fs::create_dir_all(output_dir)?;

    Ok(removed)
}

/// Represents a row in the summary CSV file
#[derive(Serialize, Deserialize, Debug, PartialEq)]
struct SummaryRow {
    metric: String,
    value: Option<f64>,
    unit: String,
}

impl SummaryRow {
    fn new(metric: &str, value: f64, unit: &str) -> Self {
        Self {
            metric: metric.to_string(),
            value: Some(value),
            unit: unit.to_string(),
        }
    }
}

/// Represents a row in the LCOH components CSV file
#[derive(Serialize, Deserialize, Debug, PartialEq)]
struct LcohComponentsRow {
    electricity_price_gbp_per_mwh: f64,
    electricity: f64,
    capex_amortised: f64,
    opex: f64,
    stack_replacement: f64,
    transport: f64,
    hrs: f64,
    total: f64,
}

/// Represents a row in the annual fuel costs CSV file
#[derive(Serialize, Deserialize, Debug, PartialEq)]
struct AnnualFuelCostsRow {
    electricity_price_gbp_per_mwh: f64,
    h2_cost_gbp: f64,
    diesel_cost_gbp: f64,
}

/// Represents a row in the diesel breakeven CSV file
#[derive(Serialize, Deserialize, Debug, PartialEq)]
struct BreakevenRow {
    carbon_price_gbp_per_tonne: f64,
    electricity_price_gbp_per_mwh: f64,
    breakeven_diesel_gbp_per_litre: f64,
}

/// Represents a row in the NPV and IRR sweep CSV file.
///
/// The IRR column is empty where the search found no rate.
#[derive(Serialize, Deserialize, Debug, PartialEq)]
struct NpvIrrRow {
    carbon_price_gbp_per_tonne: f64,
    electricity_price_gbp_per_mwh: f64,
    npv_gbp: f64,
    irr: Option<f64>,
}

/// Represents a row in the NPV grid CSV file (long format, one cell per row)
#[derive(Serialize, Deserialize, Debug, PartialEq)]
struct NpvGridRow {
    electricity_price_gbp_per_mwh: f64,
    carbon_price_gbp_per_tonne: f64,
    npv_gbp: f64,
}

/// Represents a row in the tornado CSV file
#[derive(Serialize, Deserialize, Debug, PartialEq)]
struct TornadoRow {
    parameter: String,
    low_delta: f64,
    high_delta: f64,
    swing: f64,
}

/// An object for writing analysis results to CSV files
pub struct DataWriter {
    summary_writer: csv::Writer<File>,
    lcoh_writer: csv::Writer<File>,
    fuel_costs_writer: csv::Writer<File>,
    breakeven_writer: csv::Writer<File>,
    npv_irr_writer: csv::Writer<File>,
    npv_grid_writer: csv::Writer<File>,
    tornado_writer: csv::Writer<File>,
}

impl DataWriter {
    /// Open CSV files to write output data to
    ///
    /// # Arguments
    ///
    /// * `output_path` - Folder where files will be saved
    pub fn create(output_path: &Path) -> Result<Self> {
        let new_writer = |file_name| {
            let file_path = output_path.join(file_name);
            csv::Writer::from_path(file_path)
        };

        Ok(Self {
            summary_writer: new_writer(SUMMARY_FILE_NAME)?,
            lcoh_writer: new_writer(LCOH_COMPONENTS_FILE_NAME)?,
            fuel_costs_writer: new_writer(ANNUAL_FUEL_COSTS_FILE_NAME)?,
            breakeven_writer: new_writer(BREAKEVEN_FILE_NAME)?,
            npv_irr_writer: new_writer(NPV_IRR_SWEEP_FILE_NAME)?,
            npv_grid_writer: new_writer(NPV_GRID_FILE_NAME)?,
            tornado_writer: new_writer(TORNADO_FILE_NAME)?,
        })
    }

    /// Write the headline metrics to a CSV file
    pub fn write_summary(&mut self, scenario: &Scenario, results: &AnalysisResults) -> Result<()> {
        let rows = [
            SummaryRow::new(
                "full_fleet_daily_demand",
                results.demand.full_fleet_daily_kg,
                "kg/day",
            ),
            SummaryRow::new("annual_h2_demand", results.demand.annual_total_tonnes, "t/yr"),
            SummaryRow::new("supply_gap", results.demand.supply_gap_kg_per_day, "kg/day"),
            SummaryRow::new("new_electrolyser", results.capex.new_electrolyser_mwe, "MWe"),
            SummaryRow::new("total_capex", results.capex.total_capex_gbp, "GBP"),
            SummaryRow::new(
                "lcoh_production",
                results.lcoh.production_gbp_per_kg,
                "GBP/kg",
            ),
            SummaryRow::new("lcoh_dispensed", results.lcoh.total_gbp_per_kg, "GBP/kg"),
            SummaryRow::new("annual_h2_cost", results.costs.h2_fuel_cost_gbp, "GBP/yr"),
            SummaryRow::new(
                "annual_diesel_cost",
                results.costs.diesel_fuel_cost_gbp,
                "GBP/yr",
            ),
            SummaryRow::new("annual_benefit", results.costs.total_benefit_gbp, "GBP/yr"),
            SummaryRow::new("npv", results.appraisal.npv_gbp, "GBP"),
            SummaryRow {
                metric: "irr".to_string(),
                value: results.appraisal.irr.rate().map(|rate| rate * 100.0),
                unit: "%".to_string(),
            },
            SummaryRow {
                metric: "simple_payback".to_string(),
                value: results
                    .appraisal
                    .simple_payback_yr
                    .is_finite()
                    .then_some(results.appraisal.simple_payback_yr),
                unit: "yr".to_string(),
            },
            SummaryRow::new(
                "benefit_cost_ratio",
                results.appraisal.benefit_cost_ratio,
                "",
            ),
            SummaryRow::new(
                "co2_saving",
                results.emissions.saving_tonnes_per_year,
                "t/yr",
            ),
            SummaryRow::new("co2_reduction", results.emissions.reduction_pct, "%"),
            SummaryRow::new(
                "breakeven_diesel_price",
                results.breakeven_diesel_gbp_per_litre,
                "GBP/litre",
            ),
            SummaryRow::new(
                "carbon_price",
                scenario.carbon_price_gbp_per_tonne,
                "GBP/t",
            ),
        ];

        for row in rows {
            self.summary_writer.serialize(row)?;
        }

        Ok(())
    }

    /// Write the LCOH component sweep to a CSV file
    pub fn write_lcoh_components(
        &mut self,
        electricity_prices: &[f64],
        breakdowns: &[LcohBreakdown],
    ) -> Result<()> {
        for (price, breakdown) in electricity_prices.iter().zip(breakdowns) {
            let row = LcohComponentsRow {
                electricity_price_gbp_per_mwh: *price,
                electricity: breakdown.electricity_gbp_per_kg,
                capex_amortised: breakdown.capex_amortised_gbp_per_kg,
                opex: breakdown.opex_gbp_per_kg,
                stack_replacement: breakdown.stack_replacement_gbp_per_kg,
                transport: breakdown.transport_gbp_per_kg,
                hrs: breakdown.hrs_gbp_per_kg,
                total: breakdown.total_gbp_per_kg,
            };
            self.lcoh_writer.serialize(row)?;
        }

        Ok(())
    }

    /// Write the annual fuel cost sweep to a CSV file
    pub fn write_annual_fuel_costs(
        &mut self,
        electricity_prices: &[f64],
        costs: &[AnnualCosts],
    ) -> Result<()> {
        for (price, cost) in electricity_prices.iter().zip(costs) {
            let row = AnnualFuelCostsRow {
                electricity_price_gbp_per_mwh: *price,
                h2_cost_gbp: cost.h2_fuel_cost_gbp,
                diesel_cost_gbp: cost.diesel_fuel_cost_gbp,
            };
            self.fuel_costs_writer.serialize(row)?;
        }

        Ok(())
    }

    /// Write the diesel breakeven sweep to a CSV file
    pub fn write_breakeven(
        &mut self,
        electricity_prices: &[f64],
        lines: &[BreakevenLine],
    ) -> Result<()> {
        for line in lines {
            for (price, breakeven) in electricity_prices.iter().zip(&line.breakeven_gbp_per_litre)
            {
                let row = BreakevenRow {
                    carbon_price_gbp_per_tonne: line.carbon_price_gbp_per_tonne,
                    electricity_price_gbp_per_mwh: *price,
                    breakeven_diesel_gbp_per_litre: *breakeven,
                };
                self.breakeven_writer.serialize(row)?;
            }
        }

        Ok(())
    }

    /// Write the NPV and IRR sweep to a CSV file
    pub fn write_npv_irr(
        &mut self,
        electricity_prices: &[f64],
        lines: &[AppraisalLine],
    ) -> Result<()> {
        for line in lines {
            for (price, appraisal) in electricity_prices.iter().zip(&line.appraisals) {
                let row = NpvIrrRow {
                    carbon_price_gbp_per_tonne: line.carbon_price_gbp_per_tonne,
                    electricity_price_gbp_per_mwh: *price,
                    npv_gbp: appraisal.npv_gbp,
                    irr: appraisal.irr.rate(),
                };
                self.npv_irr_writer.serialize(row)?;
            }
        }

        Ok(())
    }

    /// Write the 2D NPV grid to a CSV file in long format
    pub fn write_npv_grid(&mut self, grid: &NpvGrid) -> Result<()> {
        for (carbon_price, row_values) in
            grid.carbon_prices_gbp_per_tonne.iter().zip(&grid.npv_gbp)
        {
            for (electricity_price, npv) in
                grid.electricity_prices_gbp_per_mwh.iter().zip(row_values)
            {
                let row = NpvGridRow {
                    electricity_price_gbp_per_mwh: *electricity_price,
                    carbon_price_gbp_per_tonne: *carbon_price,
                    npv_gbp: *npv,
                };
                self.npv_grid_writer.serialize(row)?;
            }
        }

        Ok(())
    }

    /// Write the tornado sweep to a CSV file, largest swing first
    pub fn write_tornado(&mut self, tornado: &TornadoReport) -> Result<()> {
        for entry in &tornado.entries {
            let row = TornadoRow {
                parameter: entry.parameter.to_string(),
                low_delta: entry.low_delta,
                high_delta: entry.high_delta,
                swing: entry.swing(),
            };
            self.tornado_writer.serialize(row)?;
        }

        Ok(())
    }

    /// Flush the underlying streams
    pub fn flush(&mut self) -> Result<()> {
        self.summary_writer.flush()?;
        self.lcoh_writer.flush()?;
        self.fuel_costs_writer.flush()?;
        self.breakeven_writer.flush()?;
        self.npv_irr_writer.flush()?;
        self.npv_grid_writer.flush()?;
        self.tornado_writer.flush()?;

        Ok(())
    }
}

/// Write every CSV output for a completed analysis.
///
/// # Arguments
///
/// * `scenario` - The scenario that was analysed
/// * `results` - Point results for the scenario
/// * `report` - Sweep results for the scenario
/// * `output_path` - Folder where files will be saved
pub fn write_outputs(
    scenario: &Scenario,
    results: &AnalysisResults,
    report: &SensitivityReport,
    output_path: &Path,
) -> Result<()> {
    let mut writer = DataWriter::create(output_path)?;
    writer.write_summary(scenario, results)?;
    writer.write_lcoh_components(&report.electricity_prices_gbp_per_mwh, &report.lcoh_breakdowns)?;
    writer.write_annual_fuel_costs(&report.electricity_prices_gbp_per_mwh, &report.annual_costs)?;
    writer.write_breakeven(&report.breakeven_prices_gbp_per_mwh, &report.breakeven_lines)?;
    writer.write_npv_irr(&report.electricity_prices_gbp_per_mwh, &report.appraisal_lines)?;
    writer.write_npv_grid(&report.npv_grid)?;
    writer.write_tornado(&report.tornado)?;
    writer.flush()?;

    info!("Results written to {}", output_path.display());

    Ok(())
}
