//! Integration tests for the `run` command.
use float_cmp::assert_approx_eq;
use h2fleet::cli::{RunOpts, handle_run_command};
use h2fleet::output;
use h2fleet::settings::Settings;
use itertools::Itertools;
use std::path::PathBuf;
use tempfile::tempdir;

fn run_opts(output_dir: PathBuf) -> RunOpts {
    RunOpts {
        output_dir: Some(output_dir),
        overwrite: false,
        // Not rendered here; figures need fonts which CI boxes may not have
        skip_figures: true,
    }
}

/// An integration test for the `run` command with the baseline scenario.
#[test]
fn test_handle_run_command() {
    unsafe { std::env::set_var("H2FLEET_LOG_LEVEL", "off") };

    {
        // Save results to non-existent directory to check that directory creation works
        let tempdir = tempdir().unwrap();
        let output_dir = tempdir.path().join("results");
        handle_run_command(None, &run_opts(output_dir.clone()), Some(Settings::default()))
            .unwrap();

        // Every CSV output is present
        for file_name in [
            output::SUMMARY_FILE_NAME,
            output::LCOH_COMPONENTS_FILE_NAME,
            output::ANNUAL_FUEL_COSTS_FILE_NAME,
            output::BREAKEVEN_FILE_NAME,
            output::NPV_IRR_SWEEP_FILE_NAME,
            output::NPV_GRID_FILE_NAME,
            output::TORNADO_FILE_NAME,
        ] {
            assert!(output_dir.join(file_name).is_file(), "{file_name} missing");
        }

        // Spot-check a headline value in the summary
        let records: Vec<(String, Option<f64>, String)> =
            csv::Reader::from_path(output_dir.join(output::SUMMARY_FILE_NAME))
                .unwrap()
                .into_deserialize()
                .try_collect()
                .unwrap();
        let (_, total_capex, unit) = records
            .iter()
            .find(|(metric, _, _)| metric == "total_capex")
            .unwrap();
        assert_approx_eq!(f64, total_capex.unwrap(), 21_683_262.711864404, epsilon = 1e-3);
        assert_eq!(unit, "GBP");
    }

    // Second time will fail because the logging is already initialised
    assert_eq!(
        handle_run_command(
            None,
            &run_opts(tempdir().unwrap().path().join("results")),
            Some(Settings::default())
        )
        .unwrap_err()
        .chain()
        .next()
        .unwrap()
        .to_string(),
        "Failed to initialise logging."
    );
}
