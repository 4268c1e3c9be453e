//! Printing the results summary to the console.
use crate::analysis::AnalysisResults;
use crate::finance::IrrOutcome;
use crate::scenario::Scenario;

/// Width of the section rules
const RULE_WIDTH: usize = 64;

/// Format `value` to `decimals` places with thousands separators in the integer part
fn group_digits(value: f64, decimals: usize) -> String {
    let formatted = format!("{value:.decimals$}");
    let (int_part, frac_part) = match formatted.split_once('.') {
        Some((int_part, frac_part)) => (int_part, Some(frac_part)),
        None => (formatted.as_str(), None),
    };
    let (sign, digits) = match int_part.strip_prefix('-') {
        Some(digits) => ("-", digits),
        None => ("", int_part),
    };

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, digit) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    match frac_part {
        Some(frac_part) => format!("{sign}{grouped}.{frac_part}"),
        None => format!("{sign}{grouped}"),
    }
}

fn print_heading(heading: &str) {
    println!("\n{heading}");
    println!("{}", "-".repeat(RULE_WIDTH));
}

fn print_row(label: &str, value: &str) {
    println!("  {label:<38} {value}");
}

/// Print the sectioned results summary to stdout.
pub fn print_summary(scenario: &Scenario, results: &AnalysisResults) {
    println!("\n{}", "=".repeat(RULE_WIDTH));
    println!("  Hydrogen bus fleet techno-economic analysis");
    println!("{}", "=".repeat(RULE_WIDTH));

    print_heading("1. Hydrogen demand");
    print_row(
        "Per-bus demand",
        &format!("{} kg/day", group_digits(results.demand.daily_per_bus_kg, 1)),
    );
    print_row(
        &format!("Existing fleet ({} buses)", scenario.existing_buses),
        &format!(
            "{} kg/day",
            group_digits(results.demand.existing_fleet_daily_kg, 0)
        ),
    );
    print_row(
        &format!("Full fleet ({} buses)", scenario.total_buses),
        &format!(
            "{} kg/day",
            group_digits(results.demand.full_fleet_daily_kg, 0)
        ),
    );
    print_row(
        "Supply gap",
        &format!(
            "{} kg/day",
            group_digits(results.demand.supply_gap_kg_per_day, 0)
        ),
    );
    print_row(
        "Annual demand",
        &format!("{} t/yr", group_digits(results.demand.annual_total_tonnes, 0)),
    );
    print_row(
        "Annual fleet mileage",
        &format!(
            "{} km",
            group_digits(results.demand.annual_fleet_mileage_km, 0)
        ),
    );

    print_heading("2. Infrastructure and CAPEX");
    print_row(
        "New electrolyser capacity",
        &format!("{} MWe", group_digits(results.capex.new_electrolyser_mwe, 0)),
    );
    print_row(
        "New production capacity",
        &format!(
            "{} kg/day",
            group_digits(results.capex.new_production_kg_per_day, 0)
        ),
    );
    print_row(
        "Total production capacity",
        &format!(
            "{} kg/day",
            group_digits(results.capex.total_production_kg_per_day, 0)
        ),
    );
    print_row(
        "Network dispensing capacity",
        &format!(
            "{} kg/day",
            group_digits(scenario.network_dispensing_kg_per_day, 0)
        ),
    );
    print_row(
        "Electrolyser equipment",
        &format!(
            "GBP {}",
            group_digits(results.capex.electrolyser_equipment_gbp, 0)
        ),
    );
    print_row(
        "Balance of plant",
        &format!("GBP {}", group_digits(results.capex.electrolyser_bop_gbp, 0)),
    );
    print_row(
        "Electrolyser total",
        &format!(
            "GBP {}",
            group_digits(results.capex.electrolyser_total_gbp, 0)
        ),
    );
    print_row(
        &format!("Refuelling stations ({})", scenario.new_hrs_stations),
        &format!("GBP {}", group_digits(results.capex.hrs_total_gbp, 0)),
    );
    print_row(
        "Total CAPEX",
        &format!("GBP {}", group_digits(results.capex.total_capex_gbp, 0)),
    );

    print_heading("3. Levelised cost of hydrogen");
    print_row(
        "Electricity",
        &format!("GBP {}/kg", group_digits(results.lcoh.electricity_gbp_per_kg, 3)),
    );
    print_row(
        "CAPEX (amortised)",
        &format!(
            "GBP {}/kg",
            group_digits(results.lcoh.capex_amortised_gbp_per_kg, 3)
        ),
    );
    print_row(
        "Fixed OPEX",
        &format!("GBP {}/kg", group_digits(results.lcoh.opex_gbp_per_kg, 3)),
    );
    print_row(
        "Stack replacement",
        &format!(
            "GBP {}/kg",
            group_digits(results.lcoh.stack_replacement_gbp_per_kg, 3)
        ),
    );
    print_row(
        "Production subtotal",
        &format!(
            "GBP {}/kg",
            group_digits(results.lcoh.production_gbp_per_kg, 3)
        ),
    );
    print_row(
        "Transport",
        &format!("GBP {}/kg", group_digits(results.lcoh.transport_gbp_per_kg, 3)),
    );
    print_row(
        "Station OPEX",
        &format!("GBP {}/kg", group_digits(results.lcoh.hrs_gbp_per_kg, 3)),
    );
    print_row(
        "Dispensed total",
        &format!("GBP {}/kg", group_digits(results.lcoh.total_gbp_per_kg, 3)),
    );

    print_heading("4. Annual costs");
    print_row(
        "Hydrogen fuel",
        &format!("GBP {}/yr", group_digits(results.costs.h2_fuel_cost_gbp, 0)),
    );
    print_row(
        "Diesel counterfactual",
        &format!(
            "GBP {}/yr",
            group_digits(results.costs.diesel_fuel_cost_gbp, 0)
        ),
    );
    print_row(
        "Fuel saving",
        &format!("GBP {}/yr", group_digits(results.costs.fuel_saving_gbp, 0)),
    );
    print_row(
        &format!(
            "Carbon value (GBP {}/t)",
            group_digits(scenario.carbon_price_gbp_per_tonne, 0)
        ),
        &format!("GBP {}/yr", group_digits(results.costs.carbon_value_gbp, 0)),
    );
    print_row(
        "Total benefit",
        &format!("GBP {}/yr", group_digits(results.costs.total_benefit_gbp, 0)),
    );

    print_heading("5. Well-to-wheel emissions");
    print_row(
        "Production factor",
        &format!(
            "{} kg CO2/kg",
            group_digits(results.emissions.production_kg_per_kg, 3)
        ),
    );
    print_row(
        "Station factor",
        &format!("{} kg CO2/kg", group_digits(results.emissions.hrs_kg_per_kg, 3)),
    );
    print_row(
        "Transport factor",
        &format!(
            "{} kg CO2/kg",
            group_digits(results.emissions.transport_kg_per_kg, 3)
        ),
    );
    print_row(
        "Hydrogen pathway total",
        &format!(
            "{} kg CO2/kg",
            group_digits(results.emissions.total_kg_per_kg, 3)
        ),
    );
    print_row(
        "Hydrogen fleet",
        &format!(
            "{} t CO2/yr",
            group_digits(results.emissions.h2_annual_tonnes, 0)
        ),
    );
    print_row(
        "Diesel fleet",
        &format!(
            "{} t CO2/yr",
            group_digits(results.emissions.diesel_annual_tonnes, 0)
        ),
    );
    print_row(
        "Annual saving",
        &format!(
            "{} t CO2/yr",
            group_digits(results.emissions.saving_tonnes_per_year, 0)
        ),
    );
    print_row(
        "Reduction",
        &format!("{}%", group_digits(results.emissions.reduction_pct, 1)),
    );

    print_heading("6. Financial analysis");
    print_row(
        "Discount rate",
        &format!("{}%", group_digits(scenario.discount_rate * 100.0, 1)),
    );
    print_row("Project life", &format!("{} years", scenario.project_life_yr));
    print_row(
        "Total CAPEX",
        &format!(
            "GBP {}",
            group_digits(results.appraisal.total_capex_gbp, 0)
        ),
    );
    print_row(
        "Annual benefit",
        &format!(
            "GBP {}/yr",
            group_digits(results.appraisal.annual_benefit_gbp, 0)
        ),
    );
    print_row(
        "Net present value",
        &format!("GBP {}", group_digits(results.appraisal.npv_gbp, 0)),
    );
    let irr = match results.appraisal.irr {
        IrrOutcome::Converged(rate) => format!("{}%", group_digits(rate * 100.0, 1)),
        IrrOutcome::NoRootInRange | IrrOutcome::NonConvergence => "not found".to_string(),
    };
    print_row("Internal rate of return", &irr);
    let payback = if results.appraisal.simple_payback_yr.is_finite() {
        format!(
            "{} years",
            group_digits(results.appraisal.simple_payback_yr, 1)
        )
    } else {
        "never".to_string()
    };
    print_row("Simple payback", &payback);
    print_row(
        "Benefit-cost ratio",
        &group_digits(results.appraisal.benefit_cost_ratio, 2),
    );
    print_row(
        "Breakeven diesel price",
        &format!(
            "GBP {}/litre",
            group_digits(results.breakeven_diesel_gbp_per_litre, 2)
        ),
    );

    println!("\n{}", "=".repeat(RULE_WIDTH));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::evaluate;
    use crate::fixture::scenario;
    use rstest::rstest;

    #[rstest]
    #[case(0.0, 0, "0")]
    #[case(25.5, 1, "25.5")]
    #[case(999.0, 0, "999")]
    #[case(1000.0, 0, "1,000")]
    #[case(1_303_050.0, 0, "1,303,050")]
    #[case(21_683_262.7, 0, "21,683,263")]
    #[case(-4_360_191.2, 0, "-4,360,191")]
    #[case(6.758014, 3, "6.758")]
    #[case(999.999, 2, "1,000.00")]
    fn test_group_digits(#[case] value: f64, #[case] decimals: usize, #[case] expected: &str) {
        assert_eq!(group_digits(value, decimals), expected);
    }

    #[rstest]
    fn test_print_summary(scenario: Scenario) {
        // Must not panic for the baseline or for a scenario with no IRR or payback
        print_summary(&scenario, &evaluate(&scenario));

        let mut hopeless = scenario.with_electricity_price(500.0);
        hopeless.diesel_price_gbp_per_litre = 0.01;
        print_summary(&hopeless, &evaluate(&hopeless));
    }
}
