//! Defines the `Scenario` struct, which represents the contents of a scenario TOML file.
//!
//! Every parameter has a baseline default, so an empty file (or no file at all) is a valid
//! scenario. Values are validated once, on load; downstream calculations assume they hold.
use crate::input::{deserialise_proportion, input_err_msg, read_toml, to_commented_toml};
use anyhow::{Context, Result, ensure};
use log::warn;
use serde::{Deserialize, Serialize};
use serde_string_enum::{DeserializeLabeledStringEnum, SerializeLabeledStringEnum};
use std::path::Path;

/// The default file name for a scenario written by `h2fleet init`
pub const DEFAULT_SCENARIO_FILE_NAME: &str = "scenario.toml";

const DEFAULT_SCENARIO_FILE_HEADER: &str =
    "# Scenario parameters for the h2fleet techno-economic model.
# Every value below is the baseline default; uncomment a line to override it.
";

macro_rules! define_param_default {
    ($name:ident, $type: ty, $value: expr) => {
        fn $name() -> $type {
            $value
        }
    };
}

define_param_default!(default_existing_buses, u32, 20);
define_param_default!(default_total_buses, u32, 140);
define_param_default!(default_fuel_economy, f64, 8.5);
define_param_default!(default_daily_mileage, f64, 300.0);
define_param_default!(default_operating_days, u32, 365);
define_param_default!(default_existing_production, f64, 1000.0);
define_param_default!(default_electrolyser_yield, f64, 267.0);
define_param_default!(default_electrolyser_cost, f64, 750.0);
define_param_default!(default_bop_fraction, f64, 0.75);
define_param_default!(default_electrolyser_lifetime, u32, 25);
define_param_default!(default_electrolyser_efficiency, f64, 55.0);
define_param_default!(default_stack_fraction, f64, 0.15);
define_param_default!(default_opex_fraction, f64, 0.02);
define_param_default!(default_operating_hours, f64, 8000.0);
define_param_default!(default_electricity_price, f64, 57.0);
define_param_default!(default_electricity_price_min, f64, 20.0);
define_param_default!(default_electricity_price_max, f64, 120.0);
define_param_default!(default_transport_cost, f64, 0.85);
define_param_default!(default_hrs_opex, f64, 1.04);
define_param_default!(default_hrs_station_cost, f64, 2_850_000.0);
define_param_default!(default_eur_per_gbp, f64, 1.18);
define_param_default!(default_new_hrs_stations, u32, 3);
define_param_default!(default_network_dispensing, f64, 3600.0);
define_param_default!(default_discount_rate, f64, 0.08);
define_param_default!(default_project_life, u32, 20);
define_param_default!(default_grid_intensity, f64, 35.0);
define_param_default!(default_hrs_electricity, f64, 4.21);
define_param_default!(default_transport_emissions, f64, 0.027);
define_param_default!(default_diesel_emissions, f64, 0.90);
define_param_default!(default_diesel_price, f64, 1.40);
define_param_default!(default_diesel_fuel_economy, f64, 300.0 / 184.04);
define_param_default!(default_carbon_price, f64, 50.0);
define_param_default!(default_carbon_price_min, f64, 20.0);
define_param_default!(default_carbon_price_max, f64, 200.0);

/// Represents the contents of an entire scenario file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, documented::DocumentedFields)]
pub struct Scenario {
    /// Number of hydrogen buses already in service
    #[serde(default = "default_existing_buses")]
    pub existing_buses: u32,
    /// Planned size of the full hydrogen fleet, including existing buses
    #[serde(default = "default_total_buses")]
    pub total_buses: u32,
    /// Hydrogen consumption of one bus (kg per 100 km)
    #[serde(default = "default_fuel_economy")]
    pub fuel_economy_kg_per_100km: f64,
    /// Distance covered by one bus in a day (km)
    #[serde(default = "default_daily_mileage")]
    pub daily_mileage_km: f64,
    /// Days per year on which the fleet operates
    #[serde(default = "default_operating_days")]
    pub operating_days_per_year: u32,
    /// Hydrogen production capacity already installed (kg per day)
    #[serde(default = "default_existing_production")]
    pub existing_production_kg_per_day: f64,
    /// Nameplate electrolyser output (kg per day per MWe of installed capacity)
    #[serde(default = "default_electrolyser_yield")]
    pub electrolyser_yield_kg_per_mwe_day: f64,
    /// Installed electrolyser equipment cost (GBP per kW)
    #[serde(default = "default_electrolyser_cost")]
    pub electrolyser_cost_gbp_per_kw: f64,
    /// Balance of plant (compression, storage, civils) as a fraction of equipment cost
    #[serde(default = "default_bop_fraction")]
    #[serde(deserialize_with = "deserialise_proportion")]
    pub bop_cost_fraction: f64,
    /// Electrolyser plant lifetime (years), used to amortise its CAPEX
    #[serde(default = "default_electrolyser_lifetime")]
    pub electrolyser_lifetime_yr: u32,
    /// Specific electricity consumption of the electrolyser (kWh per kg of hydrogen)
    #[serde(default = "default_electrolyser_efficiency")]
    pub electrolyser_efficiency_kwh_per_kg: f64,
    /// Stack replacement every decade, as a fraction of equipment cost
    #[serde(default = "default_stack_fraction")]
    #[serde(deserialize_with = "deserialise_proportion")]
    pub stack_replacement_fraction: f64,
    /// Annual non-energy operating cost as a fraction of total electrolyser CAPEX
    #[serde(default = "default_opex_fraction")]
    #[serde(deserialize_with = "deserialise_proportion")]
    pub electrolyser_opex_fraction: f64,
    /// Hours per year the electrolyser runs at nameplate output (max 8760)
    #[serde(default = "default_operating_hours")]
    pub operating_hours_per_year: f64,
    /// Baseline electricity price (GBP per MWh)
    #[serde(default = "default_electricity_price")]
    pub electricity_price_gbp_per_mwh: f64,
    /// Lower bound of the electricity price sweeps (GBP per MWh)
    #[serde(default = "default_electricity_price_min")]
    pub electricity_price_min_gbp_per_mwh: f64,
    /// Upper bound of the electricity price sweeps (GBP per MWh)
    #[serde(default = "default_electricity_price_max")]
    pub electricity_price_max_gbp_per_mwh: f64,
    /// Cost of trucking hydrogen from production site to stations (GBP per kg)
    #[serde(default = "default_transport_cost")]
    pub transport_cost_gbp_per_kg: f64,
    /// Refuelling station operating cost (GBP per kg dispensed)
    #[serde(default = "default_hrs_opex")]
    pub hrs_opex_gbp_per_kg: f64,
    /// Cost of one new 700 bar refuelling station (EUR)
    #[serde(default = "default_hrs_station_cost")]
    pub hrs_station_cost_eur: f64,
    /// Exchange rate applied to station costs (EUR per GBP)
    #[serde(default = "default_eur_per_gbp")]
    pub eur_per_gbp: f64,
    /// Number of new refuelling stations to build
    #[serde(default = "default_new_hrs_stations")]
    pub new_hrs_stations: u32,
    /// Dispensing capacity of the station network once built (kg per day)
    #[serde(default = "default_network_dispensing")]
    pub network_dispensing_kg_per_day: f64,
    /// Real discount rate used for amortisation and present values
    #[serde(default = "default_discount_rate")]
    pub discount_rate: f64,
    /// Appraisal horizon for the fleet conversion (years)
    #[serde(default = "default_project_life")]
    pub project_life_yr: u32,
    /// Carbon intensity of grid electricity (g CO2e per kWh)
    #[serde(default = "default_grid_intensity")]
    pub grid_intensity_g_per_kwh: f64,
    /// Electricity used by a station for compression and cooling (kWh per kg dispensed)
    #[serde(default = "default_hrs_electricity")]
    pub hrs_electricity_kwh_per_kg: f64,
    /// Emissions from trucking hydrogen (kg CO2e per kg delivered)
    #[serde(default = "default_transport_emissions")]
    pub transport_emissions_kg_per_kg: f64,
    /// Tailpipe and upstream emissions of a diesel bus (kg CO2e per km)
    #[serde(default = "default_diesel_emissions")]
    pub diesel_emissions_kg_per_km: f64,
    /// Pump price of diesel (GBP per litre)
    #[serde(default = "default_diesel_price")]
    pub diesel_price_gbp_per_litre: f64,
    /// Fuel economy of a diesel bus (km per litre, from a 300 km route cycle at 184.04 L)
    #[serde(default = "default_diesel_fuel_economy")]
    pub diesel_fuel_economy_km_per_litre: f64,
    /// Baseline carbon price applied to avoided emissions (GBP per tonne CO2e)
    #[serde(default = "default_carbon_price")]
    pub carbon_price_gbp_per_tonne: f64,
    /// Lower bound of the carbon price sweeps (GBP per tonne CO2e)
    #[serde(default = "default_carbon_price_min")]
    pub carbon_price_min_gbp_per_tonne: f64,
    /// Upper bound of the carbon price sweeps (GBP per tonne CO2e)
    #[serde(default = "default_carbon_price_max")]
    pub carbon_price_max_gbp_per_tonne: f64,
    /// Which metric the tornado sweep perturbs ("lcoh" or "npv")
    #[serde(default)]
    pub tornado_metric: TornadoMetric,
}

/// The metric recomputed for each parameter perturbation in the tornado sweep
#[derive(
    DeserializeLabeledStringEnum, SerializeLabeledStringEnum, Debug, Clone, Copy, PartialEq, Eq,
    Default,
)]
pub enum TornadoMetric {
    /// Levelised cost of hydrogen at the dispenser (GBP per kg)
    #[default]
    #[string = "lcoh"]
    Lcoh,
    /// Net present value of the fleet conversion (GBP)
    #[string = "npv"]
    Npv,
}

/// Check that a parameter is a finite number greater than zero
fn check_positive(name: &str, value: f64) -> Result<()> {
    ensure!(
        value.is_finite() && value > 0.0,
        "{name} must be a finite number greater than zero"
    );

    Ok(())
}

/// Check that a parameter is a finite number of at least zero
fn check_non_negative(name: &str, value: f64) -> Result<()> {
    ensure!(
        value.is_finite() && value >= 0.0,
        "{name} must be a finite non-negative number"
    );

    Ok(())
}

/// Check that the fleet size parameters are consistent
fn check_fleet_size(total_buses: u32, existing_buses: u32) -> Result<()> {
    ensure!(total_buses > 0, "total_buses cannot be zero");
    ensure!(
        existing_buses <= total_buses,
        "existing_buses cannot exceed total_buses"
    );

    Ok(())
}

/// Check that the `operating_days_per_year` parameter is valid
fn check_operating_days(days: u32) -> Result<()> {
    ensure!(
        (1..=366).contains(&days),
        "operating_days_per_year must be between 1 and 366"
    );

    Ok(())
}

/// Check that the `operating_hours_per_year` parameter is valid
fn check_operating_hours(hours: f64) -> Result<()> {
    ensure!(
        hours.is_finite() && hours > 0.0 && hours <= 8760.0,
        "operating_hours_per_year must be greater than zero and at most 8760"
    );

    Ok(())
}

/// Check that the `discount_rate` parameter is valid
fn check_discount_rate(rate: f64) -> Result<()> {
    ensure!(
        rate.is_finite() && (0.0..1.0).contains(&rate),
        "discount_rate must be at least zero and less than one"
    );

    Ok(())
}

/// Check that a lifetime parameter is valid
fn check_lifetime(name: &str, years: u32) -> Result<()> {
    ensure!(years > 0, "{name} cannot be zero");

    Ok(())
}

/// Check that a sweep range is valid
fn check_sweep_range(name: &str, min: f64, max: f64) -> Result<()> {
    ensure!(
        min.is_finite() && max.is_finite() && min >= 0.0 && min < max,
        "{name} sweep bounds must be non-negative with min below max"
    );

    Ok(())
}

impl Default for Scenario {
    fn default() -> Scenario {
        Scenario {
            existing_buses: default_existing_buses(),
            total_buses: default_total_buses(),
            fuel_economy_kg_per_100km: default_fuel_economy(),
            daily_mileage_km: default_daily_mileage(),
            operating_days_per_year: default_operating_days(),
            existing_production_kg_per_day: default_existing_production(),
            electrolyser_yield_kg_per_mwe_day: default_electrolyser_yield(),
            electrolyser_cost_gbp_per_kw: default_electrolyser_cost(),
            bop_cost_fraction: default_bop_fraction(),
            electrolyser_lifetime_yr: default_electrolyser_lifetime(),
            electrolyser_efficiency_kwh_per_kg: default_electrolyser_efficiency(),
            stack_replacement_fraction: default_stack_fraction(),
            electrolyser_opex_fraction: default_opex_fraction(),
            operating_hours_per_year: default_operating_hours(),
            electricity_price_gbp_per_mwh: default_electricity_price(),
            electricity_price_min_gbp_per_mwh: default_electricity_price_min(),
            electricity_price_max_gbp_per_mwh: default_electricity_price_max(),
            transport_cost_gbp_per_kg: default_transport_cost(),
            hrs_opex_gbp_per_kg: default_hrs_opex(),
            hrs_station_cost_eur: default_hrs_station_cost(),
            eur_per_gbp: default_eur_per_gbp(),
            new_hrs_stations: default_new_hrs_stations(),
            network_dispensing_kg_per_day: default_network_dispensing(),
            discount_rate: default_discount_rate(),
            project_life_yr: default_project_life(),
            grid_intensity_g_per_kwh: default_grid_intensity(),
            hrs_electricity_kwh_per_kg: default_hrs_electricity(),
            transport_emissions_kg_per_kg: default_transport_emissions(),
            diesel_emissions_kg_per_km: default_diesel_emissions(),
            diesel_price_gbp_per_litre: default_diesel_price(),
            diesel_fuel_economy_km_per_litre: default_diesel_fuel_economy(),
            carbon_price_gbp_per_tonne: default_carbon_price(),
            carbon_price_min_gbp_per_tonne: default_carbon_price_min(),
            carbon_price_max_gbp_per_tonne: default_carbon_price_max(),
            tornado_metric: TornadoMetric::default(),
        }
    }
}

impl Scenario {
    /// Read a scenario from the specified TOML file.
    ///
    /// # Arguments
    ///
    /// * `file_path` - Path to the scenario file
    ///
    /// # Returns
    ///
    /// The file contents as a [`Scenario`] struct or an error if the file is invalid
    pub fn from_path<P: AsRef<Path>>(file_path: P) -> Result<Scenario> {
        let scenario: Scenario = read_toml(file_path.as_ref())?;

        scenario
            .validate()
            .with_context(|| input_err_msg(file_path))?;

        Ok(scenario)
    }

    /// Validate parameters after reading in file
    pub fn validate(&self) -> Result<()> {
        // fleet
        check_fleet_size(self.total_buses, self.existing_buses)?;
        check_positive("fuel_economy_kg_per_100km", self.fuel_economy_kg_per_100km)?;
        check_positive("daily_mileage_km", self.daily_mileage_km)?;
        check_operating_days(self.operating_days_per_year)?;

        // production
        check_non_negative(
            "existing_production_kg_per_day",
            self.existing_production_kg_per_day,
        )?;
        check_positive(
            "electrolyser_yield_kg_per_mwe_day",
            self.electrolyser_yield_kg_per_mwe_day,
        )?;
        check_positive(
            "electrolyser_cost_gbp_per_kw",
            self.electrolyser_cost_gbp_per_kw,
        )?;
        check_lifetime("electrolyser_lifetime_yr", self.electrolyser_lifetime_yr)?;
        check_positive(
            "electrolyser_efficiency_kwh_per_kg",
            self.electrolyser_efficiency_kwh_per_kg,
        )?;
        check_operating_hours(self.operating_hours_per_year)?;

        // fractions are validated on deserialisation with `deserialise_proportion`

        // energy prices
        check_non_negative(
            "electricity_price_gbp_per_mwh",
            self.electricity_price_gbp_per_mwh,
        )?;
        check_sweep_range(
            "electricity_price",
            self.electricity_price_min_gbp_per_mwh,
            self.electricity_price_max_gbp_per_mwh,
        )?;

        // distribution
        check_non_negative("transport_cost_gbp_per_kg", self.transport_cost_gbp_per_kg)?;
        check_non_negative("hrs_opex_gbp_per_kg", self.hrs_opex_gbp_per_kg)?;
        check_non_negative("hrs_station_cost_eur", self.hrs_station_cost_eur)?;
        check_positive("eur_per_gbp", self.eur_per_gbp)?;
        check_non_negative(
            "network_dispensing_kg_per_day",
            self.network_dispensing_kg_per_day,
        )?;

        // finance
        check_discount_rate(self.discount_rate)?;
        check_lifetime("project_life_yr", self.project_life_yr)?;

        // emissions and diesel comparator
        check_non_negative("grid_intensity_g_per_kwh", self.grid_intensity_g_per_kwh)?;
        check_non_negative(
            "hrs_electricity_kwh_per_kg",
            self.hrs_electricity_kwh_per_kg,
        )?;
        check_non_negative(
            "transport_emissions_kg_per_kg",
            self.transport_emissions_kg_per_kg,
        )?;
        check_positive("diesel_emissions_kg_per_km", self.diesel_emissions_kg_per_km)?;
        check_non_negative(
            "diesel_price_gbp_per_litre",
            self.diesel_price_gbp_per_litre,
        )?;
        check_positive(
            "diesel_fuel_economy_km_per_litre",
            self.diesel_fuel_economy_km_per_litre,
        )?;
        check_non_negative(
            "carbon_price_gbp_per_tonne",
            self.carbon_price_gbp_per_tonne,
        )?;
        check_sweep_range(
            "carbon_price",
            self.carbon_price_min_gbp_per_tonne,
            self.carbon_price_max_gbp_per_tonne,
        )?;

        let elec_range =
            self.electricity_price_min_gbp_per_mwh..=self.electricity_price_max_gbp_per_mwh;
        if !elec_range.contains(&self.electricity_price_gbp_per_mwh) {
            warn!(
                "electricity_price_gbp_per_mwh lies outside the sweep range; baseline markers \
                will not appear on sweep figures"
            );
        }

        Ok(())
    }

    /// A copy of this scenario with a different baseline electricity price
    pub fn with_electricity_price(&self, price_gbp_per_mwh: f64) -> Scenario {
        let mut scenario = self.clone();
        scenario.electricity_price_gbp_per_mwh = price_gbp_per_mwh;
        scenario
    }

    /// A copy of this scenario with a different baseline carbon price
    pub fn with_carbon_price(&self, price_gbp_per_tonne: f64) -> Scenario {
        let mut scenario = self.clone();
        scenario.carbon_price_gbp_per_tonne = price_gbp_per_tonne;
        scenario
    }

    /// The contents of the default scenario file written by `h2fleet init`
    pub fn default_file_contents() -> Result<String> {
        to_commented_toml(&Scenario::default(), DEFAULT_SCENARIO_FILE_HEADER)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::fmt::Display;
    use std::fs::File;
    use std::io::Write;
    use tempfile::tempdir;

    /// Helper function to assert validation result based on expected validity
    fn assert_validation_result<T, U: Display>(
        result: Result<T>,
        expected_valid: bool,
        value: U,
        expected_error_fragment: &str,
    ) {
        if expected_valid {
            assert!(
                result.is_ok(),
                "Expected value {} to be valid, but got error: {:?}",
                value,
                result.err()
            );
        } else {
            assert!(
                result.is_err(),
                "Expected value {value} to be invalid, but it was accepted",
            );
            let error_message = result.err().unwrap().to_string();
            assert!(
                error_message.contains(expected_error_fragment),
                "Error message should mention the validation constraint, got: {error_message}",
            );
        }
    }

    #[test]
    fn test_default_matches_empty_file() {
        let scenario: Scenario = toml::from_str("").unwrap();
        assert_eq!(scenario, Scenario::default());
        assert!(scenario.validate().is_ok());
    }

    #[test]
    fn test_scenario_from_path() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join(DEFAULT_SCENARIO_FILE_NAME);
        {
            let mut file = File::create(&file_path).unwrap();
            writeln!(file, "total_buses = 200").unwrap();
            writeln!(file, "electricity_price_gbp_per_mwh = 45.0").unwrap();
            writeln!(file, "tornado_metric = \"npv\"").unwrap();
        }

        let scenario = Scenario::from_path(&file_path).unwrap();
        assert_eq!(scenario.total_buses, 200);
        assert_eq!(scenario.electricity_price_gbp_per_mwh, 45.0);
        assert_eq!(scenario.tornado_metric, TornadoMetric::Npv);

        // Unchanged parameters keep their defaults
        assert_eq!(scenario.existing_buses, 20);
    }

    #[test]
    fn test_scenario_from_path_invalid() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join(DEFAULT_SCENARIO_FILE_NAME);

        // Fails validation
        {
            let mut file = File::create(&file_path).unwrap();
            writeln!(file, "total_buses = 0").unwrap();
        }
        assert!(Scenario::from_path(&file_path).is_err());

        // Fails deserialisation (fraction out of range)
        {
            let mut file = File::create(&file_path).unwrap();
            writeln!(file, "bop_cost_fraction = 1.5").unwrap();
        }
        assert!(Scenario::from_path(&file_path).is_err());

        // Missing file
        assert!(Scenario::from_path(dir.path().join("missing.toml")).is_err());
    }

    #[test]
    fn test_check_fleet_size() {
        // Valid
        assert!(check_fleet_size(140, 20).is_ok());
        assert!(check_fleet_size(1, 0).is_ok());
        assert!(check_fleet_size(20, 20).is_ok());

        // Invalid
        assert!(check_fleet_size(0, 0).is_err());
        assert!(check_fleet_size(10, 20).is_err());
    }

    #[rstest]
    #[case(0.0, true)] // Valid minimum value
    #[case(0.08, true)] // Valid default value
    #[case(0.999, true)] // Valid value just below one
    #[case(1.0, false)] // Invalid: exactly one
    #[case(-0.01, false)] // Invalid: negative value
    #[case(f64::NAN, false)] // Invalid: NaN value
    fn test_check_discount_rate(#[case] value: f64, #[case] expected_valid: bool) {
        let result = check_discount_rate(value);

        assert_validation_result(
            result,
            expected_valid,
            value,
            "discount_rate must be at least zero and less than one",
        );
    }

    #[rstest]
    #[case(1.0, true)] // Valid minimum plausible value
    #[case(8000.0, true)] // Valid default value
    #[case(8760.0, true)] // Valid maximum value
    #[case(0.0, false)] // Invalid: zero
    #[case(8761.0, false)] // Invalid: more hours than a year has
    #[case(f64::INFINITY, false)] // Invalid: infinite value
    fn test_check_operating_hours(#[case] value: f64, #[case] expected_valid: bool) {
        let result = check_operating_hours(value);

        assert_validation_result(
            result,
            expected_valid,
            value,
            "operating_hours_per_year must be greater than zero and at most 8760",
        );
    }

    #[rstest]
    #[case(20.0, 120.0, true)] // Valid default bounds
    #[case(0.0, 1.0, true)] // Valid range starting at zero
    #[case(120.0, 20.0, false)] // Invalid: min above max
    #[case(20.0, 20.0, false)] // Invalid: empty range
    #[case(-10.0, 120.0, false)] // Invalid: negative min
    #[case(20.0, f64::INFINITY, false)] // Invalid: infinite max
    fn test_check_sweep_range(#[case] min: f64, #[case] max: f64, #[case] expected_valid: bool) {
        let result = check_sweep_range("electricity_price", min, max);

        assert_validation_result(
            result,
            expected_valid,
            format!("[{min}, {max}]"),
            "electricity_price sweep bounds must be non-negative with min below max",
        );
    }

    #[test]
    fn test_with_price_helpers() {
        let scenario = Scenario::default();
        assert_eq!(
            scenario.with_electricity_price(99.0).electricity_price_gbp_per_mwh,
            99.0
        );
        assert_eq!(
            scenario.with_carbon_price(150.0).carbon_price_gbp_per_tonne,
            150.0
        );

        // Everything else is untouched
        assert_eq!(scenario.with_electricity_price(99.0).total_buses, 140);
    }

    #[test]
    fn test_default_file_contents() {
        let contents = Scenario::default_file_contents().unwrap();

        // Every parameter should be commented out, so the file should parse as the baseline
        let parsed: Scenario = toml::from_str(&contents).unwrap();
        assert_eq!(parsed, Scenario::default());
        assert!(contents.contains("# total_buses = 140"));
        assert!(contents.contains("# tornado_metric = \"lcoh\""));
    }
}
