//! Newton-Raphson IRR over irregularly dated cash flows.
//!
//! `NPV(r) = Σ sign·amount / (1 + r)^(days_since_first_flow / 365)`

use rust_decimal::{Decimal, MathematicalOps};
use rust_decimal_macros::dec;

use super::cash_flow::CashFlow;
use crate::constants::DAYS_PER_YEAR;

/// Iteration bounds for the solver.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IrrSolverLimits {
    pub initial_guess: Decimal,
    /// Stop when |NPV| or the step size falls below this.
    pub tolerance: Decimal,
    pub max_iterations: u32,
    /// Below this |NPV'| the tangent is treated as flat.
    pub min_derivative: Decimal,
    /// Added to the rate when the tangent is flat.
    pub flat_tangent_nudge: Decimal,
    pub max_rate: Decimal,
    pub min_rate: Decimal,
}

pub const DEFAULT_IRR_LIMITS: IrrSolverLimits = IrrSolverLimits {
    initial_guess: dec!(0.10),
    tolerance: dec!(0.000001),
    max_iterations: 100,
    min_derivative: dec!(0.0000000001),
    flat_tangent_nudge: dec!(0.01),
    max_rate: dec!(10),
    min_rate: dec!(-0.99),
};

/// How a solve ended. Only `Converged` carries a usable rate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum IrrOutcome {
    Converged { rate: Decimal, iterations: u32 },
    /// Fewer than two flows.
    InsufficientData,
    /// The rate left `[min_rate, max_rate]`.
    Diverged { rate: Decimal },
    /// Iteration cap reached.
    NotConverged { rate: Decimal },
    /// Discounting overflowed decimal range.
    Unstable,
    /// All flows share one date with a non-zero net, so no rate zeroes NPV.
    Undefined,
}

impl IrrOutcome {
    pub fn rate(&self) -> Option<Decimal> {
        match self {
            IrrOutcome::Converged { rate, .. } => Some(*rate),
            _ => None,
        }
    }
}

/// Solves for the periodic (annual) rate with the default limits.
///
/// Returns `None` for fewer than two flows or when the iteration fails to
/// settle on a bounded rate.
pub fn solve_irr(flows: &[CashFlow]) -> Option<Decimal> {
    solve_irr_with(flows, &DEFAULT_IRR_LIMITS).rate()
}

pub fn solve_irr_with(flows: &[CashFlow], limits: &IrrSolverLimits) -> IrrOutcome {
    if flows.len() < 2 {
        return IrrOutcome::InsufficientData;
    }

    let Some(base) = flows.iter().map(|f| f.date).min() else {
        return IrrOutcome::InsufficientData;
    };
    let year = Decimal::from(DAYS_PER_YEAR);
    let terms: Vec<(Decimal, Decimal)> = flows
        .iter()
        .map(|f| {
            (
                Decimal::from((f.date - base).num_days()) / year,
                f.signed_amount(),
            )
        })
        .collect();

    if terms.iter().all(|(t, _)| t.is_zero()) {
        let net: Decimal = terms.iter().map(|(_, a)| *a).sum();
        return if net.is_zero() {
            IrrOutcome::Converged {
                rate: Decimal::ZERO,
                iterations: 0,
            }
        } else {
            IrrOutcome::Undefined
        };
    }

    let mut rate = limits.initial_guess;
    for iteration in 0..limits.max_iterations {
        let Some((npv, derivative)) = npv_with_derivative(&terms, rate) else {
            return IrrOutcome::Unstable;
        };

        if npv.abs() < limits.tolerance {
            return IrrOutcome::Converged {
                rate,
                iterations: iteration,
            };
        }

        if derivative.abs() < limits.min_derivative {
            rate += limits.flat_tangent_nudge;
            if rate > limits.max_rate {
                return IrrOutcome::Diverged { rate };
            }
            continue;
        }

        let Some(step) = npv.checked_div(derivative) else {
            return IrrOutcome::Unstable;
        };
        let next = rate - step;
        if next > limits.max_rate || next < limits.min_rate {
            return IrrOutcome::Diverged { rate: next };
        }
        if (next - rate).abs() < limits.tolerance {
            return IrrOutcome::Converged {
                rate: next,
                iterations: iteration + 1,
            };
        }
        rate = next;
    }

    IrrOutcome::NotConverged { rate }
}

/// NPV and dNPV/dr at `rate` for `(years, signed_amount)` terms.
fn npv_with_derivative(terms: &[(Decimal, Decimal)], rate: Decimal) -> Option<(Decimal, Decimal)> {
    let one_plus_r = Decimal::ONE + rate;
    if one_plus_r <= Decimal::ZERO {
        return None;
    }

    let mut npv = Decimal::ZERO;
    let mut derivative = Decimal::ZERO;
    for (years, amount) in terms {
        if years.is_zero() {
            npv = npv.checked_add(*amount)?;
            continue;
        }
        let discount = one_plus_r.checked_powd(*years)?;
        if discount.is_zero() {
            return None;
        }
        npv = npv.checked_add(amount.checked_div(discount)?)?;
        let slope = years
            .checked_mul(*amount)?
            .checked_div(discount.checked_mul(one_plus_r)?)?;
        derivative = derivative.checked_sub(slope)?;
    }
    Some((npv, derivative))
}
