mod engine;
mod error;
mod types;

pub use engine::{annuity_withdrawal, calculate, compound_growth, compute_sweep, summarize};
pub use error::CalcError;
pub use types::{
    AgeRange, Calculation, DEFAULT_AVERAGE_REAL_RETURN, DEFAULT_CURRENT_AGE,
    DEFAULT_CURRENT_PENSION_BENEFIT, DEFAULT_LIFE_AFTER_RETIREMENT, DEFAULT_MONTHLY_CONTRIBUTION,
    DEFAULT_RETIREMENT_AGE, INPUT_FIELDS, InputField, Inputs, MAX_AGE, PENSION_BASE_MONTHS,
    ResultSummary, SWEEP_START_AGE, SweepPoint,
};
