//! Dated, signed monetary flows used by the IRR solver.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlowDirection {
    /// Capital committed or deployed.
    Outflow,
    /// Capital returned.
    Inflow,
}

/// A single flow. `amount` is a non-negative magnitude; `direction` carries the sign.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CashFlow {
    pub date: NaiveDate,
    pub amount: Decimal,
    pub direction: FlowDirection,
}

impl CashFlow {
    pub fn outflow(date: NaiveDate, amount: Decimal) -> Self {
        Self {
            date,
            amount: amount.abs(),
            direction: FlowDirection::Outflow,
        }
    }

    pub fn inflow(date: NaiveDate, amount: Decimal) -> Self {
        Self {
            date,
            amount: amount.abs(),
            direction: FlowDirection::Inflow,
        }
    }

    /// +amount for inflows, -amount for outflows.
    pub fn signed_amount(&self) -> Decimal {
        match self.direction {
            FlowDirection::Inflow => self.amount,
            FlowDirection::Outflow => -self.amount,
        }
    }
}
