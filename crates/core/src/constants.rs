/// Decimal precision used when persisting monetary values
pub const DECIMAL_PRECISION: u32 = 6;

/// Decimal precision for display-oriented figures (rates, day averages)
pub const DISPLAY_DECIMAL_PRECISION: u32 = 2;

/// Trailing window used by the KPI read API when the caller gives no start date
pub const DEFAULT_KPI_WINDOW_DAYS: i64 = 30;

/// Number of funds returned in a portfolio summary's ranking
pub const PORTFOLIO_TOP_FUNDS: usize = 5;

/// Default number of investments returned by the top-investments query
pub const DEFAULT_TOP_INVESTMENTS_LIMIT: usize = 5;

/// Day-count basis for annualising elapsed time
pub const DAYS_PER_YEAR: i64 = 365;

/// Decimal precision for raw multiples such as MOIC
pub const RATIO_DECIMAL_PRECISION: u32 = 4;

/// Loan status for a performing loan
pub const LOAN_STATUS_ACTIVE: &str = "ACTIVE";

/// Loan status for a loan past due; still counts as active
pub const LOAN_STATUS_DELINQUENT: &str = "DELINQUENT";

/// Inspection verdict that raises an alert
pub const INSPECTION_RESULT_FAILED: &str = "FAILED";
