//! XIRR solver
//!
//! Finds the annual rate `r` for which the net present value of an irregular
//! cash-flow series is zero:
//!
//! ```text
//! NPV(r) = Σ amount_i · (1 + r)^(-t_i)      t_i = days since earliest flow / 365
//! ```
//!
//! Newton-Raphson runs first from `SolverConfig::initial_guess`. If it stalls
//! (flat derivative, non-finite values, budget exhausted) the solver scans a
//! fixed grid of rates for a sign change and bisects inside that bracket.
//! Input order does not matter; only the earliest date does.

use chrono::{DateTime, Utc};
use tracing::trace;

use crate::cashflow::CashFlow;
use crate::config::SolverConfig;
use crate::error::ReturnsError;

const DAYS_PER_YEAR: f64 = 365.0;
const SECONDS_PER_DAY: f64 = 86_400.0;

/// Rates probed when looking for a bisection bracket
const BRACKET_GRID: [f64; 17] = [
    -0.999_999, -0.99, -0.9, -0.75, -0.5, -0.25, 0.0, 0.25, 0.5, 1.0, 2.0, 5.0, 10.0, 100.0,
    1_000.0, 10_000.0, 1_000_000.0,
];

/// Cash flows reduced to (years since day zero, amount)
struct Discounting {
    points: Vec<(f64, f64)>,
}

impl Discounting {
    fn new(flows: &[CashFlow], day_zero: DateTime<Utc>) -> Self {
        let points = flows
            .iter()
            .map(|flow| (year_fraction(day_zero, flow.date), flow.amount))
            .collect();
        Self { points }
    }

    fn value(&self, rate: f64) -> f64 {
        let base = 1.0 + rate;
        self.points
            .iter()
            .map(|&(years, amount)| amount * base.powf(-years))
            .sum()
    }

    fn value_and_derivative(&self, rate: f64) -> (f64, f64) {
        let base = 1.0 + rate;
        self.points
            .iter()
            .fold((0.0, 0.0), |(value, derivative), &(years, amount)| {
                let discount = base.powf(-years);
                (
                    value + amount * discount,
                    derivative - years * amount * discount / base,
                )
            })
    }
}

fn year_fraction(day_zero: DateTime<Utc>, date: DateTime<Utc>) -> f64 {
    (date - day_zero).num_seconds() as f64 / SECONDS_PER_DAY / DAYS_PER_YEAR
}

/// Net present value of `flows` at `rate`, discounted to the earliest flow
pub fn npv(flows: &[CashFlow], rate: f64) -> f64 {
    match flows.iter().map(|f| f.date).min() {
        Some(day_zero) => Discounting::new(flows, day_zero).value(rate),
        None => 0.0,
    }
}

/// Solves for the XIRR of `flows`.
///
/// # Errors
///
/// - `InsufficientData` for fewer than two flows
/// - `NoSignChange` unless there is at least one strictly positive and one
///   strictly negative flow
/// - `NonConvergence` when neither Newton nor bisection meets the tolerances
///   within `config.max_iterations` each
pub fn solve(flows: &[CashFlow], config: &SolverConfig) -> Result<f64, ReturnsError> {
    if flows.len() < 2 {
        return Err(ReturnsError::InsufficientData { flows: flows.len() });
    }

    let has_inflow = flows.iter().any(|f| f.amount > 0.0);
    let has_outflow = flows.iter().any(|f| f.amount < 0.0);
    if !(has_inflow && has_outflow) {
        return Err(ReturnsError::NoSignChange);
    }

    let day_zero = flows
        .iter()
        .map(|f| f.date)
        .min()
        .ok_or(ReturnsError::InsufficientData { flows: 0 })?;
    let discounting = Discounting::new(flows, day_zero);

    if let Some(rate) = newton(&discounting, config) {
        return Ok(rate);
    }

    trace!("newton iteration failed, falling back to bisection");
    bisect(&discounting, config)
}

fn newton(discounting: &Discounting, config: &SolverConfig) -> Option<f64> {
    let mut rate = config.initial_guess;

    for iteration in 0..config.max_iterations {
        let (value, derivative) = discounting.value_and_derivative(rate);
        if !value.is_finite() || !derivative.is_finite() {
            return None;
        }
        if value.abs() < config.npv_tolerance {
            trace!(iteration, rate, "newton converged on npv");
            return Some(rate);
        }
        if derivative.abs() < f64::EPSILON {
            return None;
        }

        let mut next = rate - value / derivative;
        // Stay inside the domain; (1 + r) must remain positive.
        if !(next > -1.0) {
            next = (rate - 1.0) / 2.0;
        }

        if (next - rate).abs() < config.rate_tolerance {
            trace!(iteration, rate = next, "newton converged on step");
            return Some(next);
        }
        rate = next;
    }

    None
}

fn bracket(discounting: &Discounting) -> Option<(f64, f64)> {
    let samples: Vec<(f64, f64)> = BRACKET_GRID
        .iter()
        .map(|&rate| (rate, discounting.value(rate)))
        .filter(|(_, value)| value.is_finite())
        .collect();

    samples
        .windows(2)
        .find(|pair| pair[0].1.signum() != pair[1].1.signum() || pair[0].1 == 0.0)
        .map(|pair| (pair[0].0, pair[1].0))
}

fn bisect(discounting: &Discounting, config: &SolverConfig) -> Result<f64, ReturnsError> {
    let non_convergence = ReturnsError::NonConvergence {
        iterations: config.max_iterations,
    };

    let (mut lo, mut hi) = bracket(discounting).ok_or(non_convergence)?;
    let mut value_lo = discounting.value(lo);

    for iteration in 0..config.max_iterations {
        let mid = 0.5 * (lo + hi);
        let value_mid = discounting.value(mid);

        if value_mid.abs() < config.npv_tolerance || 0.5 * (hi - lo) < config.rate_tolerance {
            trace!(iteration, rate = mid, "bisection converged");
            return Ok(mid);
        }

        if value_mid.signum() == value_lo.signum() {
            lo = mid;
            value_lo = value_mid;
        } else {
            hi = mid;
        }
    }

    Err(non_convergence)
}
