//! Integration tests for the `validate` command.
use h2fleet::cli::handle_validate_command;
use h2fleet::log::is_logger_initialised;
use h2fleet::settings::Settings;
use std::fs;
use tempfile::tempdir;

/// An integration test for the `validate` command.
///
/// We also check that the logger is initialised after it is run.
#[test]
fn test_handle_validate_command() {
    unsafe { std::env::set_var("H2FLEET_LOG_LEVEL", "off") };

    assert!(!is_logger_initialised());

    let dir = tempdir().unwrap();
    let file_path = dir.path().join("scenario.toml");
    fs::write(&file_path, "total_buses = 150\nelectricity_price_gbp_per_mwh = 65.0\n").unwrap();
    handle_validate_command(&file_path, Some(Settings::default())).unwrap();

    assert!(is_logger_initialised());
}
