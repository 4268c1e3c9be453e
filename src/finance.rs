//! General functions related to finance.
//!
//! Cash-flow series are indexed by year, with year zero holding the (undiscounted) upfront
//! outlay and years one onwards the recurring net benefit.

/// Default bisection bracket for the IRR search.
///
/// Wide enough to cover any practically relevant project rate of return.
pub const IRR_BRACKET: (f64, f64) = (-0.5, 2.0);

/// Absolute NPV tolerance (GBP) below which the IRR bisection is considered converged
pub const IRR_NPV_TOLERANCE: f64 = 1.0;

/// Iteration budget for the IRR bisection
pub const IRR_MAX_ITERATIONS: u32 = 100;

/// Calculates the capital recovery factor (CRF) for a given lifetime and discount rate.
///
/// The CRF is used to annualise capital costs over the lifetime of an asset.
pub fn capital_recovery_factor(lifetime: u32, discount_rate: f64) -> f64 {
    if lifetime == 0 {
        return 0.0;
    }
    if discount_rate == 0.0 {
        return 1.0 / lifetime as f64;
    }
    let factor = (1.0 + discount_rate).powi(lifetime as i32);
    (discount_rate * factor) / (factor - 1.0)
}

/// Calculates the present value of a unit payment at the end of each of `years` years.
pub fn annuity_present_value(discount_rate: f64, years: u32) -> f64 {
    if discount_rate == 0.0 {
        return f64::from(years);
    }
    (1.0 - (1.0 + discount_rate).powi(-(years as i32))) / discount_rate
}

/// Calculates the net present value of a cash-flow series at the given discount rate.
pub fn net_present_value(cash_flows: &[f64], discount_rate: f64) -> f64 {
    cash_flows
        .iter()
        .enumerate()
        .map(|(year, flow)| flow / (1.0 + discount_rate).powi(year as i32))
        .sum()
}

/// Builds the cash-flow series for a project with a single upfront outlay.
///
/// Year zero carries the full CAPEX; each of the following `project_life` years carries the
/// same net annual benefit.
pub fn project_cash_flows(capex: f64, annual_benefit: f64, project_life: u32) -> Vec<f64> {
    let mut cash_flows = Vec::with_capacity(project_life as usize + 1);
    cash_flows.push(-capex);
    cash_flows.extend(std::iter::repeat_n(annual_benefit, project_life as usize));
    cash_flows
}

/// Outcome of an IRR search over a cash-flow series
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum IrrOutcome {
    /// A rate at which the series' NPV is within tolerance of zero
    Converged(f64),
    /// NPV has the same sign at both ends of the bracket, so no root can be bisected
    NoRootInRange,
    /// The iteration budget ran out before the tolerance was met
    NonConvergence,
}

impl IrrOutcome {
    /// The converged rate, if there is one
    pub fn rate(&self) -> Option<f64> {
        match self {
            IrrOutcome::Converged(rate) => Some(*rate),
            _ => None,
        }
    }
}

/// Finds the internal rate of return of a cash-flow series by bisection.
///
/// The IRR is the discount rate at which the series' NPV is zero. Bisection requires NPV to
/// change sign across `bracket`; if it doesn't, [`IrrOutcome::NoRootInRange`] is returned
/// rather than a rate.
///
/// # Arguments
///
/// * `cash_flows` - The cash-flow series, indexed by year
/// * `bracket` - Lower and upper rates to search between
/// * `npv_tolerance` - Absolute NPV below which a rate counts as a root
/// * `max_iterations` - Iteration budget for the bisection
pub fn find_irr(
    cash_flows: &[f64],
    bracket: (f64, f64),
    npv_tolerance: f64,
    max_iterations: u32,
) -> IrrOutcome {
    let (mut low, mut high) = bracket;
    let mut npv_low = net_present_value(cash_flows, low);
    let npv_high = net_present_value(cash_flows, high);
    if npv_low * npv_high > 0.0 {
        return IrrOutcome::NoRootInRange;
    }

    for _ in 0..max_iterations {
        let mid = f64::midpoint(low, high);
        let npv_mid = net_present_value(cash_flows, mid);
        if npv_mid.abs() < npv_tolerance {
            return IrrOutcome::Converged(mid);
        }

        if npv_low * npv_mid < 0.0 {
            high = mid;
        } else {
            low = mid;
            npv_low = npv_mid;
        }
    }

    IrrOutcome::NonConvergence
}
