//! Fixtures for tests

use crate::scenario::Scenario;
use rstest::fixture;

/// Assert that an error with the given message occurs
macro_rules! assert_error {
    ($result:expr, $msg:expr) => {
        assert_eq!(
            $result.unwrap_err().chain().next().unwrap().to_string(),
            $msg
        );
    };
}
pub(crate) use assert_error;

/// The baseline scenario, with every parameter at its default
#[fixture]
pub fn scenario() -> Scenario {
    Scenario::default()
}

/// A scenario in which existing production already covers the whole fleet.
///
/// No new electrolyser is built, so all CAPEX comes from refuelling stations.
#[fixture]
pub fn covered_scenario(mut scenario: Scenario) -> Scenario {
    scenario.existing_production_kg_per_day = 5000.0;
    scenario
}
