//! Rendering the analysis results as PNG charts.
//!
//! Every chart is written with fixed pixel dimensions taken from the program settings and a
//! fixed file name, so reruns overwrite the previous run's figures.
use crate::analysis::AnalysisResults;
use crate::economics::LcohBreakdown;
use crate::scenario::Scenario;
use crate::sensitivity::{CARBON_SCENARIOS, NpvGrid, SensitivityReport, TornadoReport};
use crate::settings::Settings;
use anyhow::{Context, Result};
use itertools::{Itertools, MinMaxResult};
use log::info;
use plotters::coord::CoordTranslate;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use std::path::Path;

/// The file name for the LCOH component chart
pub const LCOH_FIGURE_FILE_NAME: &str = "lcoh_vs_electricity.png";

/// The file name for the annual fuel cost chart
pub const ANNUAL_COST_FIGURE_FILE_NAME: &str = "annual_cost_vs_elec.png";

/// The file name for the diesel breakeven chart
pub const BREAKEVEN_FIGURE_FILE_NAME: &str = "breakeven_diesel.png";

/// The file name for the NPV sweep chart
pub const NPV_FIGURE_FILE_NAME: &str = "npv_vs_elec_carbon.png";

/// The file name for the IRR sweep chart
pub const IRR_FIGURE_FILE_NAME: &str = "irr_vs_elec.png";

/// The file name for the NPV heatmap
pub const NPV_HEATMAP_FIGURE_FILE_NAME: &str = "npv_heatmap.png";

/// The file name for the emissions comparison chart
pub const EMISSIONS_FIGURE_FILE_NAME: &str = "emissions_comparison.png";

/// The file name for the CAPEX breakdown chart
pub const CAPEX_FIGURE_FILE_NAME: &str = "capex_breakdown.png";

/// The file name for the tornado chart
pub const TORNADO_FIGURE_FILE_NAME: &str = "lcoh_sensitivity_tornado.png";

/// Multiplier applied to the current diesel price for the stressed reference line
const STRESSED_DIESEL_FACTOR: f64 = 1.25;

/// Fraction of the value range left clear above and below line charts
const RANGE_PADDING: f64 = 0.08;

// House palette
const BLUE: RGBColor = RGBColor(0x1a, 0x6c, 0xa8);
const ORANGE: RGBColor = RGBColor(0xe0, 0x7b, 0x39);
const GREEN: RGBColor = RGBColor(0x2e, 0x8b, 0x57);
const RED: RGBColor = RGBColor(0xc0, 0x39, 0x2b);
const PURPLE: RGBColor = RGBColor(0x7d, 0x3c, 0x98);
const GREY: RGBColor = RGBColor(0x7f, 0x8c, 0x8d);
const LIGHT_BLUE: RGBColor = RGBColor(0xae, 0xd6, 0xf1);
const LIGHT_ORANGE: RGBColor = RGBColor(0xfa, 0xd7, 0xa0);
const BACKGROUND: RGBColor = RGBColor(0xf8, 0xf9, 0xfa);

/// Neutral midpoint of the diverging heatmap palette
const NEUTRAL: RGBColor = RGBColor(0xfb, 0xf3, 0xd0);

/// Line colours for the per-carbon-price sweep charts
const SCENARIO_COLOURS: [RGBColor; 5] = [BLUE, ORANGE, GREEN, PURPLE, RED];

const CAPTION_FONT: (&str, u32) = ("sans-serif", 26);
const AXIS_FONT: (&str, u32) = ("sans-serif", 17);
const LABEL_FONT: (&str, u32) = ("sans-serif", 14);

/// The range spanned by `values` plus padding, ignoring non-finite entries.
///
/// Falls back to the unit range when no finite value remains.
fn padded_range(values: impl Iterator<Item = f64>, pad_fraction: f64) -> (f64, f64) {
    let (min, max) = match values.filter(|value| value.is_finite()).minmax() {
        MinMaxResult::NoElements => return (0.0, 1.0),
        MinMaxResult::OneElement(value) => (value, value),
        MinMaxResult::MinMax(min, max) => (min, max),
    };

    let span = max - min;
    if span == 0.0 {
        return (min - 0.5, max + 0.5);
    }
    (min - span * pad_fraction, max + span * pad_fraction)
}

/// Split a sampled line into runs of defined points, breaking at undefined cells.
///
/// Charts draw each run as its own polyline so undefined cells leave visible gaps.
fn line_segments(points: impl Iterator<Item = (f64, Option<f64>)>) -> Vec<Vec<(f64, f64)>> {
    let mut segments = Vec::new();
    let mut current = Vec::new();
    for (x, y) in points {
        match y {
            Some(y) if y.is_finite() => current.push((x, y)),
            _ => {
                if !current.is_empty() {
                    segments.push(std::mem::take(&mut current));
                }
            }
        }
    }
    if !current.is_empty() {
        segments.push(current);
    }

    segments
}

/// Cumulative component curves for the stacked LCOH area chart.
///
/// Curve `k` is the sum of the first `k + 1` dispensed-cost components at each electricity
/// price. Drawing the curves back to front leaves each component's band visible.
fn stacked_curves(prices: &[f64], breakdowns: &[LcohBreakdown]) -> [Vec<(f64, f64)>; 6] {
    let mut curves: [Vec<(f64, f64)>; 6] = Default::default();
    for (price, breakdown) in prices.iter().zip(breakdowns) {
        let components = [
            breakdown.electricity_gbp_per_kg,
            breakdown.capex_amortised_gbp_per_kg,
            breakdown.opex_gbp_per_kg,
            breakdown.stack_replacement_gbp_per_kg,
            breakdown.transport_gbp_per_kg,
            breakdown.hrs_gbp_per_kg,
        ];
        let mut running = 0.0;
        for (curve, component) in curves.iter_mut().zip(components) {
            running += component;
            curve.push((*price, running));
        }
    }

    curves
}

/// Linear interpolation between two palette entries
fn lerp_colour(from: RGBColor, to: RGBColor, t: f64) -> RGBColor {
    let channel = |a: u8, b: u8| {
        let blended = f64::from(a) + (f64::from(b) - f64::from(a)) * t.clamp(0.0, 1.0);
        blended.round() as u8
    };
    RGBColor(
        channel(from.0, to.0),
        channel(from.1, to.1),
        channel(from.2, to.2),
    )
}

/// Colour for one heatmap cell on a diverging scale centred on zero.
///
/// Negative values shade towards red and positive towards green, scaled by the largest
/// absolute value in the grid so the two sides are comparable.
fn diverging_colour(value: f64, limit: f64) -> RGBColor {
    if limit <= 0.0 {
        return NEUTRAL;
    }
    let t = (value / limit).clamp(-1.0, 1.0);
    if t < 0.0 {
        lerp_colour(NEUTRAL, RED, -t)
    } else {
        lerp_colour(NEUTRAL, GREEN, t)
    }
}

/// Draw the stacked LCOH component chart with the dispensed total line.
fn plot_lcoh_components(
    scenario: &Scenario,
    report: &SensitivityReport,
    file_path: &Path,
    size: (u32, u32),
) -> Result<()> {
    let root = BitMapBackend::new(file_path, size).into_drawing_area();
    root.fill(&BACKGROUND)?;

    let prices = &report.electricity_prices_gbp_per_mwh;
    let (x_min, x_max) = (prices[0], prices[prices.len() - 1]);
    let curves = stacked_curves(prices, &report.lcoh_breakdowns);
    let (_, y_max) = padded_range(curves[5].iter().map(|(_, total)| *total), RANGE_PADDING);

    let mut chart = ChartBuilder::on(&root)
        .caption("Levelised cost of hydrogen vs electricity price", CAPTION_FONT)
        .margin(14)
        .x_label_area_size(48)
        .y_label_area_size(64)
        .build_cartesian_2d(x_min..x_max, 0.0..y_max)?;
    chart
        .configure_mesh()
        .x_desc("Electricity price (GBP/MWh)")
        .y_desc("LCOH (GBP/kg)")
        .axis_desc_style(AXIS_FONT)
        .label_style(LABEL_FONT)
        .draw()?;

    // Back to front so each band keeps its own colour
    let bands = [
        ("Station OPEX", GREY),
        ("Transport", LIGHT_ORANGE),
        ("Stack replacement", PURPLE),
        ("Fixed OPEX", GREEN),
        ("CAPEX", ORANGE),
        ("Electricity", BLUE),
    ];
    for ((label, colour), curve) in bands.iter().zip(curves.iter().rev()) {
        let colour = *colour;
        chart
            .draw_series(AreaSeries::new(curve.iter().copied(), 0.0, colour))?
            .label(*label)
            .legend(move |(x, y)| Rectangle::new([(x, y - 5), (x + 12, y + 5)], colour.filled()));
    }

    chart
        .draw_series(LineSeries::new(
            curves[5].iter().copied(),
            BLACK.stroke_width(2),
        ))?
        .label("Dispensed total")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 18, y)], BLACK.stroke_width(2)));

    // Baseline electricity price marker
    chart.draw_series(DashedLineSeries::new(
        [
            (scenario.electricity_price_gbp_per_mwh, 0.0),
            (scenario.electricity_price_gbp_per_mwh, y_max),
        ],
        6,
        4,
        GREY.stroke_width(2),
    ))?;

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperLeft)
        .background_style(WHITE.mix(0.85))
        .border_style(GREY)
        .label_font(LABEL_FONT)
        .draw()?;
    root.present()?;

    Ok(())
}

/// Draw the annual hydrogen fuel bill against the flat diesel counterfactual.
fn plot_annual_costs(
    scenario: &Scenario,
    report: &SensitivityReport,
    file_path: &Path,
    size: (u32, u32),
) -> Result<()> {
    let root = BitMapBackend::new(file_path, size).into_drawing_area();
    root.fill(&BACKGROUND)?;

    let prices = &report.electricity_prices_gbp_per_mwh;
    let (x_min, x_max) = (prices[0], prices[prices.len() - 1]);
    let h2_costs_m: Vec<f64> = report
        .annual_costs
        .iter()
        .map(|costs| costs.h2_fuel_cost_gbp / 1e6)
        .collect();
    let diesel_cost_m = report.annual_costs[0].diesel_fuel_cost_gbp / 1e6;
    let (y_min, y_max) = padded_range(
        h2_costs_m.iter().copied().chain([diesel_cost_m, 0.0]),
        RANGE_PADDING,
    );

    let mut chart = ChartBuilder::on(&root)
        .caption("Annual fuel cost vs electricity price", CAPTION_FONT)
        .margin(14)
        .x_label_area_size(48)
        .y_label_area_size(64)
        .build_cartesian_2d(x_min..x_max, y_min..y_max)?;
    chart
        .configure_mesh()
        .x_desc("Electricity price (GBP/MWh)")
        .y_desc("Annual fuel cost (GBP M)")
        .axis_desc_style(AXIS_FONT)
        .label_style(LABEL_FONT)
        .draw()?;

    chart
        .draw_series(LineSeries::new(
            prices.iter().copied().zip(h2_costs_m),
            BLUE.stroke_width(3),
        ))?
        .label("Hydrogen fleet")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 18, y)], BLUE.stroke_width(3)));

    chart
        .draw_series(DashedLineSeries::new(
            [(x_min, diesel_cost_m), (x_max, diesel_cost_m)],
            8,
            5,
            RED.stroke_width(2),
        ))?
        .label(format!(
            "Diesel fleet (GBP {}/litre)",
            scenario.diesel_price_gbp_per_litre
        ))
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 18, y)], RED.stroke_width(2)));

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperLeft)
        .background_style(WHITE.mix(0.85))
        .border_style(GREY)
        .label_font(LABEL_FONT)
        .draw()?;
    root.present()?;

    Ok(())
}

/// Draw the breakeven diesel pump price per carbon price scenario.
fn plot_breakeven(
    scenario: &Scenario,
    report: &SensitivityReport,
    file_path: &Path,
    size: (u32, u32),
) -> Result<()> {
    let root = BitMapBackend::new(file_path, size).into_drawing_area();
    root.fill(&BACKGROUND)?;

    let prices = &report.breakeven_prices_gbp_per_mwh;
    let (x_min, x_max) = (prices[0], prices[prices.len() - 1]);
    let current_price = scenario.diesel_price_gbp_per_litre;
    let stressed_price = current_price * STRESSED_DIESEL_FACTOR;
    let (y_min, y_max) = padded_range(
        report
            .breakeven_lines
            .iter()
            .flat_map(|line| line.breakeven_gbp_per_litre.iter().copied())
            .chain([current_price, stressed_price]),
        RANGE_PADDING,
    );

    let mut chart = ChartBuilder::on(&root)
        .caption("Breakeven diesel price vs electricity price", CAPTION_FONT)
        .margin(14)
        .x_label_area_size(48)
        .y_label_area_size(64)
        .build_cartesian_2d(x_min..x_max, y_min..y_max)?;
    chart
        .configure_mesh()
        .x_desc("Electricity price (GBP/MWh)")
        .y_desc("Breakeven diesel price (GBP/litre)")
        .axis_desc_style(AXIS_FONT)
        .label_style(LABEL_FONT)
        .draw()?;

    for (line, colour) in report.breakeven_lines.iter().zip(SCENARIO_COLOURS) {
        chart
            .draw_series(LineSeries::new(
                prices
                    .iter()
                    .copied()
                    .zip(line.breakeven_gbp_per_litre.iter().copied()),
                colour.stroke_width(3),
            ))?
            .label(format!("Carbon GBP {}/t", line.carbon_price_gbp_per_tonne))
            .legend(move |(x, y)| {
                PathElement::new(vec![(x, y), (x + 18, y)], colour.stroke_width(3))
            });
    }

    for (price, label) in [
        (current_price, "Current price"),
        (stressed_price, "Stressed price"),
    ] {
        chart
            .draw_series(DashedLineSeries::new(
                [(x_min, price), (x_max, price)],
                8,
                5,
                GREY.stroke_width(2),
            ))?
            .label(format!("{label} (GBP {price:.2}/litre)"))
            .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 18, y)], GREY.stroke_width(2)));
    }

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperLeft)
        .background_style(WHITE.mix(0.85))
        .border_style(GREY)
        .label_font(LABEL_FONT)
        .draw()?;
    root.present()?;

    Ok(())
}

/// Draw the NPV sweep with one line per carbon price scenario.
fn plot_npv(report: &SensitivityReport, file_path: &Path, size: (u32, u32)) -> Result<()> {
    let root = BitMapBackend::new(file_path, size).into_drawing_area();
    root.fill(&BACKGROUND)?;

    let prices = &report.electricity_prices_gbp_per_mwh;
    let (x_min, x_max) = (prices[0], prices[prices.len() - 1]);
    let (y_min, y_max) = padded_range(
        report
            .appraisal_lines
            .iter()
            .flat_map(|line| line.appraisals.iter().map(|appraisal| appraisal.npv_gbp / 1e6))
            .chain([0.0]),
        RANGE_PADDING,
    );

    let mut chart = ChartBuilder::on(&root)
        .caption("Net present value vs electricity price", CAPTION_FONT)
        .margin(14)
        .x_label_area_size(48)
        .y_label_area_size(64)
        .build_cartesian_2d(x_min..x_max, y_min..y_max)?;
    chart
        .configure_mesh()
        .x_desc("Electricity price (GBP/MWh)")
        .y_desc("NPV (GBP M)")
        .axis_desc_style(AXIS_FONT)
        .label_style(LABEL_FONT)
        .draw()?;

    for (line, colour) in report.appraisal_lines.iter().zip(SCENARIO_COLOURS) {
        chart
            .draw_series(LineSeries::new(
                prices
                    .iter()
                    .copied()
                    .zip(line.appraisals.iter().map(|appraisal| appraisal.npv_gbp / 1e6)),
                colour.stroke_width(3),
            ))?
            .label(format!("Carbon GBP {}/t", line.carbon_price_gbp_per_tonne))
            .legend(move |(x, y)| {
                PathElement::new(vec![(x, y), (x + 18, y)], colour.stroke_width(3))
            });
    }

    // Zero axis
    chart.draw_series(DashedLineSeries::new(
        [(x_min, 0.0), (x_max, 0.0)],
        8,
        5,
        BLACK.stroke_width(1),
    ))?;

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::LowerLeft)
        .background_style(WHITE.mix(0.85))
        .border_style(GREY)
        .label_font(LABEL_FONT)
        .draw()?;
    root.present()?;

    Ok(())
}

/// Draw the IRR sweep, leaving gaps where no rate was found.
fn plot_irr(
    scenario: &Scenario,
    report: &SensitivityReport,
    file_path: &Path,
    size: (u32, u32),
) -> Result<()> {
    let root = BitMapBackend::new(file_path, size).into_drawing_area();
    root.fill(&BACKGROUND)?;

    let prices = &report.electricity_prices_gbp_per_mwh;
    let (x_min, x_max) = (prices[0], prices[prices.len() - 1]);
    let hurdle_pct = scenario.discount_rate * 100.0;

    // Only the lower carbon price scenarios; the chart gets crowded beyond those
    let lines: Vec<_> = report
        .appraisal_lines
        .iter()
        .filter(|line| CARBON_SCENARIOS.contains(&line.carbon_price_gbp_per_tonne))
        .collect();
    let (y_min, y_max) = padded_range(
        lines
            .iter()
            .flat_map(|line| {
                line.appraisals
                    .iter()
                    .filter_map(|appraisal| appraisal.irr.rate().map(|rate| rate * 100.0))
            })
            .chain([hurdle_pct, 0.0]),
        RANGE_PADDING,
    );

    let mut chart = ChartBuilder::on(&root)
        .caption("Internal rate of return vs electricity price", CAPTION_FONT)
        .margin(14)
        .x_label_area_size(48)
        .y_label_area_size(64)
        .build_cartesian_2d(x_min..x_max, y_min..y_max)?;
    chart
        .configure_mesh()
        .x_desc("Electricity price (GBP/MWh)")
        .y_desc("IRR (%)")
        .axis_desc_style(AXIS_FONT)
        .label_style(LABEL_FONT)
        .draw()?;

    for (line, colour) in lines.iter().zip(SCENARIO_COLOURS) {
        let segments = line_segments(prices.iter().copied().zip(
            line.appraisals
                .iter()
                .map(|appraisal| appraisal.irr.rate().map(|rate| rate * 100.0)),
        ));
        for (i, segment) in segments.into_iter().enumerate() {
            let series = chart.draw_series(LineSeries::new(segment, colour.stroke_width(3)))?;
            // One legend entry per scenario, not per run
            if i == 0 {
                series
                    .label(format!("Carbon GBP {}/t", line.carbon_price_gbp_per_tonne))
                    .legend(move |(x, y)| {
                        PathElement::new(vec![(x, y), (x + 18, y)], colour.stroke_width(3))
                    });
            }
        }
    }

    chart
        .draw_series(DashedLineSeries::new(
            [(x_min, hurdle_pct), (x_max, hurdle_pct)],
            8,
            5,
            BLACK.stroke_width(2),
        ))?
        .label(format!("Hurdle rate ({hurdle_pct:.0}%)"))
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 18, y)], BLACK.stroke_width(2)));

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperRight)
        .background_style(WHITE.mix(0.85))
        .border_style(GREY)
        .label_font(LABEL_FONT)
        .draw()?;
    root.present()?;

    Ok(())
}

/// Draw the 2D NPV surface on a diverging palette centred on zero.
fn plot_npv_heatmap(
    scenario: &Scenario,
    grid: &NpvGrid,
    file_path: &Path,
    size: (u32, u32),
) -> Result<()> {
    let root = BitMapBackend::new(file_path, size).into_drawing_area();
    root.fill(&BACKGROUND)?;

    let elec = &grid.electricity_prices_gbp_per_mwh;
    let carbon = &grid.carbon_prices_gbp_per_tonne;
    let half_dx = (elec[elec.len() - 1] - elec[0]) / ((elec.len() - 1) as f64) / 2.0;
    let half_dy = (carbon[carbon.len() - 1] - carbon[0]) / ((carbon.len() - 1) as f64) / 2.0;
    let limit = grid
        .npv_gbp
        .iter()
        .flatten()
        .copied()
        .filter(|npv| npv.is_finite())
        .fold(0.0, |acc: f64, npv| acc.max(npv.abs()));

    let mut chart = ChartBuilder::on(&root)
        .caption("NPV over electricity and carbon prices", CAPTION_FONT)
        .margin(14)
        .x_label_area_size(48)
        .y_label_area_size(64)
        .build_cartesian_2d(
            elec[0] - half_dx..elec[elec.len() - 1] + half_dx,
            carbon[0] - half_dy..carbon[carbon.len() - 1] + half_dy,
        )?;
    chart
        .configure_mesh()
        .disable_mesh()
        .x_desc("Electricity price (GBP/MWh)")
        .y_desc("Carbon price (GBP/t)")
        .axis_desc_style(AXIS_FONT)
        .label_style(LABEL_FONT)
        .draw()?;

    chart.draw_series(carbon.iter().zip(&grid.npv_gbp).flat_map(
        |(carbon_price, row)| {
            elec.iter()
                .zip(row)
                .filter(|(_, npv)| npv.is_finite())
                .map(move |(elec_price, npv)| {
                    Rectangle::new(
                        [
                            (elec_price - half_dx, carbon_price - half_dy),
                            (elec_price + half_dx, carbon_price + half_dy),
                        ],
                        diverging_colour(*npv, limit).filled(),
                    )
                })
        },
    ))?;

    // Baseline marker
    let baseline = (
        scenario.electricity_price_gbp_per_mwh,
        scenario.carbon_price_gbp_per_tonne,
    );
    chart.draw_series([Cross::new(baseline, 7, BLACK.stroke_width(3))])?;
    chart.draw_series([Text::new(
        "baseline",
        (baseline.0 + half_dx * 2.0, baseline.1),
        TextStyle::from(LABEL_FONT).pos(Pos::new(HPos::Left, VPos::Center)),
    )])?;

    root.present()?;

    Ok(())
}

/// Draw vertical bars with the value annotated above each one
fn draw_labelled_bars<CT>(
    chart: &mut ChartContext<'_, BitMapBackend<'_>, CT>,
    bars: &[(&str, f64, RGBColor)],
    y_max: f64,
    unit: &str,
) -> Result<()>
where
    CT: CoordTranslate<From = (SegmentValue<i32>, f64)>,
{
    for (i, (_, value, colour)) in bars.iter().enumerate() {
        let i = i as i32;
        chart.draw_series([Rectangle::new(
            [
                (SegmentValue::Exact(i), 0.0),
                (SegmentValue::Exact(i + 1), *value),
            ],
            colour.filled(),
        )])?;
        chart.draw_series([Text::new(
            format!("{value:.2} {unit}"),
            (SegmentValue::CenterOf(i), value + y_max * 0.03),
            TextStyle::from(LABEL_FONT).pos(Pos::new(HPos::Center, VPos::Bottom)),
        )])?;
    }

    Ok(())
}

/// Draw the annual emissions comparison and the hydrogen pathway factor breakdown.
fn plot_emissions(results: &AnalysisResults, file_path: &Path, size: (u32, u32)) -> Result<()> {
    let root = BitMapBackend::new(file_path, size).into_drawing_area();
    root.fill(&BACKGROUND)?;
    let panels = root.split_evenly((1, 2));
    let emissions = &results.emissions;

    // Left panel: annual fleet totals
    let totals = [
        ("Diesel fleet", emissions.diesel_annual_tonnes, RED),
        ("Hydrogen fleet", emissions.h2_annual_tonnes, GREEN),
    ];
    let y_max = emissions.diesel_annual_tonnes.max(emissions.h2_annual_tonnes) * 1.2;
    let mut chart = ChartBuilder::on(&panels[0])
        .caption("Annual well-to-wheel emissions", CAPTION_FONT)
        .margin(14)
        .x_label_area_size(36)
        .y_label_area_size(70)
        .build_cartesian_2d((0..totals.len() as i32).into_segmented(), 0.0..y_max)?;
    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_label_formatter(&|position| match position {
            SegmentValue::CenterOf(i) => totals
                .get(*i as usize)
                .map(|(label, _, _)| (*label).to_string())
                .unwrap_or_default(),
            _ => String::new(),
        })
        .y_desc("CO2e (t/yr)")
        .axis_desc_style(AXIS_FONT)
        .label_style(LABEL_FONT)
        .draw()?;
    draw_labelled_bars(&mut chart, &totals, y_max, "t")?;

    // Right panel: hydrogen pathway factor breakdown
    let factors = [
        ("Production", emissions.production_kg_per_kg, BLUE),
        ("Station", emissions.hrs_kg_per_kg, PURPLE),
        ("Transport", emissions.transport_kg_per_kg, GREY),
        ("Total", emissions.total_kg_per_kg, GREEN),
    ];
    let y_max = emissions.total_kg_per_kg * 1.2;
    let mut chart = ChartBuilder::on(&panels[1])
        .caption("Hydrogen pathway factors", CAPTION_FONT)
        .margin(14)
        .x_label_area_size(36)
        .y_label_area_size(70)
        .build_cartesian_2d((0..factors.len() as i32).into_segmented(), 0.0..y_max)?;
    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_label_formatter(&|position| match position {
            SegmentValue::CenterOf(i) => factors
                .get(*i as usize)
                .map(|(label, _, _)| (*label).to_string())
                .unwrap_or_default(),
            _ => String::new(),
        })
        .y_desc("CO2e (kg per kg H2)")
        .axis_desc_style(AXIS_FONT)
        .label_style(LABEL_FONT)
        .draw()?;
    draw_labelled_bars(&mut chart, &factors, y_max, "kg/kg")?;

    root.present()?;

    Ok(())
}

/// Draw the CAPEX breakdown bars with a total reference line.
fn plot_capex(results: &AnalysisResults, file_path: &Path, size: (u32, u32)) -> Result<()> {
    let root = BitMapBackend::new(file_path, size).into_drawing_area();
    root.fill(&BACKGROUND)?;
    let capex = &results.capex;

    let bars = [
        (
            "Electrolyser equipment",
            capex.electrolyser_equipment_gbp / 1e6,
            BLUE,
        ),
        ("Balance of plant", capex.electrolyser_bop_gbp / 1e6, LIGHT_BLUE),
        ("Refuelling stations", capex.hrs_total_gbp / 1e6, ORANGE),
    ];
    let total_m = capex.total_capex_gbp / 1e6;
    let y_max = total_m * 1.2;

    let mut chart = ChartBuilder::on(&root)
        .caption("Capital cost breakdown", CAPTION_FONT)
        .margin(14)
        .x_label_area_size(36)
        .y_label_area_size(70)
        .build_cartesian_2d((0..bars.len() as i32).into_segmented(), 0.0..y_max)?;
    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_label_formatter(&|position| match position {
            SegmentValue::CenterOf(i) => bars
                .get(*i as usize)
                .map(|(label, _, _)| (*label).to_string())
                .unwrap_or_default(),
            _ => String::new(),
        })
        .y_desc("CAPEX (GBP M)")
        .axis_desc_style(AXIS_FONT)
        .label_style(LABEL_FONT)
        .draw()?;
    draw_labelled_bars(&mut chart, &bars, y_max, "M")?;

    chart
        .draw_series(DashedLineSeries::new(
            [
                (SegmentValue::Exact(0), total_m),
                (SegmentValue::Exact(bars.len() as i32), total_m),
            ],
            8,
            5,
            BLACK.stroke_width(2),
        ))?
        .label(format!("Total GBP {total_m:.1}M"))
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 18, y)], BLACK.stroke_width(2)));

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperRight)
        .background_style(WHITE.mix(0.85))
        .border_style(GREY)
        .label_font(LABEL_FONT)
        .draw()?;
    root.present()?;

    Ok(())
}

/// Draw the tornado chart, largest swing at the top.
fn plot_tornado(tornado: &TornadoReport, file_path: &Path, size: (u32, u32)) -> Result<()> {
    let root = BitMapBackend::new(file_path, size).into_drawing_area();
    root.fill(&BACKGROUND)?;

    let entries = &tornado.entries;
    let (x_min, x_max) = padded_range(
        entries
            .iter()
            .flat_map(|entry| [entry.low_delta, entry.high_delta])
            .chain([0.0]),
        RANGE_PADDING,
    );
    let labels: Vec<String> = entries
        .iter()
        // Reversed so the largest swing lands on the top row
        .rev()
        .map(|entry| entry.parameter.to_string())
        .collect();

    let mut chart = ChartBuilder::on(&root)
        .caption(
            format!("Sensitivity of {} to +/-20% parameter changes", tornado.metric),
            CAPTION_FONT,
        )
        .margin(14)
        .x_label_area_size(48)
        .y_label_area_size(170)
        .build_cartesian_2d(x_min..x_max, (0..entries.len() as i32).into_segmented())?;
    chart
        .configure_mesh()
        .disable_y_mesh()
        .y_label_formatter(&|position| match position {
            SegmentValue::CenterOf(i) => labels.get(*i as usize).cloned().unwrap_or_default(),
            _ => String::new(),
        })
        .x_desc(format!("Change in {} from baseline", tornado.metric))
        .axis_desc_style(AXIS_FONT)
        .label_style(LABEL_FONT)
        .draw()?;

    for (row, entry) in entries.iter().rev().enumerate() {
        let row = row as i32;
        for (delta, colour) in [(entry.low_delta, BLUE), (entry.high_delta, ORANGE)] {
            chart.draw_series([Rectangle::new(
                [
                    (0.0, SegmentValue::Exact(row)),
                    (delta, SegmentValue::Exact(row + 1)),
                ],
                colour.mix(0.85).filled(),
            )])?;
        }
    }

    // Empty series so the direction legend shows
    for (label, colour) in [("-20%", BLUE), ("+20%", ORANGE)] {
        chart
            .draw_series([Rectangle::new(
                [(0.0, SegmentValue::Exact(0)), (0.0, SegmentValue::Exact(0))],
                colour.filled(),
            )])?
            .label(label)
            .legend(move |(x, y)| Rectangle::new([(x, y - 5), (x + 12, y + 5)], colour.filled()));
    }

    // Baseline axis
    chart.draw_series(LineSeries::new(
        [
            (0.0, SegmentValue::Exact(0)),
            (0.0, SegmentValue::Exact(entries.len() as i32)),
        ],
        BLACK.stroke_width(2),
    ))?;

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::LowerRight)
        .background_style(WHITE.mix(0.85))
        .border_style(GREY)
        .label_font(LABEL_FONT)
        .draw()?;
    root.present()?;

    Ok(())
}

/// Render every chart for a completed analysis.
///
/// # Arguments
///
/// * `scenario` - The scenario that was analysed
/// * `results` - Point results for the scenario
/// * `report` - Sweep results for the scenario
/// * `output_path` - Folder where figures will be saved
/// * `settings` - Program settings, for the figure dimensions
pub fn generate_all(
    scenario: &Scenario,
    results: &AnalysisResults,
    report: &SensitivityReport,
    output_path: &Path,
    settings: &Settings,
) -> Result<()> {
    let size = settings.figure_size();
    let path = |file_name: &str| output_path.join(file_name);

    plot_lcoh_components(scenario, report, &path(LCOH_FIGURE_FILE_NAME), size)
        .with_context(|| format!("Error rendering {LCOH_FIGURE_FILE_NAME}"))?;
    plot_annual_costs(scenario, report, &path(ANNUAL_COST_FIGURE_FILE_NAME), size)
        .with_context(|| format!("Error rendering {ANNUAL_COST_FIGURE_FILE_NAME}"))?;
    plot_breakeven(scenario, report, &path(BREAKEVEN_FIGURE_FILE_NAME), size)
        .with_context(|| format!("Error rendering {BREAKEVEN_FIGURE_FILE_NAME}"))?;
    plot_npv(report, &path(NPV_FIGURE_FILE_NAME), size)
        .with_context(|| format!("Error rendering {NPV_FIGURE_FILE_NAME}"))?;
    plot_irr(scenario, report, &path(IRR_FIGURE_FILE_NAME), size)
        .with_context(|| format!("Error rendering {IRR_FIGURE_FILE_NAME}"))?;
    plot_npv_heatmap(scenario, &report.npv_grid, &path(NPV_HEATMAP_FIGURE_FILE_NAME), size)
        .with_context(|| format!("Error rendering {NPV_HEATMAP_FIGURE_FILE_NAME}"))?;
    plot_emissions(results, &path(EMISSIONS_FIGURE_FILE_NAME), size)
        .with_context(|| format!("Error rendering {EMISSIONS_FIGURE_FILE_NAME}"))?;
    plot_capex(results, &path(CAPEX_FIGURE_FILE_NAME), size)
        .with_context(|| format!("Error rendering {CAPEX_FIGURE_FILE_NAME}"))?;
    plot_tornado(&report.tornado, &path(TORNADO_FIGURE_FILE_NAME), size)
        .with_context(|| format!("Error rendering {TORNADO_FIGURE_FILE_NAME}"))?;

    info!("Figures written to {}", output_path.display());

    Ok(())
}
