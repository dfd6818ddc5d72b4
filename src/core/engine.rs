use tracing::{debug, warn};

use super::error::CalcError;
use super::types::{
    AgeRange, Calculation, Inputs, MAX_AGE, PENSION_BASE_MONTHS, ResultSummary, SWEEP_START_AGE,
    SweepPoint,
};

/// Below this decimal rate the annuity factor cancels badly; use its limit `years`.
const ZERO_RATE_EPS: f64 = 1e-9;

/// Grows `principal` at `annual_return_percent` for `years`. Negative `years` discounts.
pub fn compound_growth(principal: f64, annual_return_percent: f64, years: i64) -> f64 {
    let rate = annual_return_percent / 100.0;
    principal * (1.0 + rate).powf(years as f64)
}

/// Level end-of-year payment that draws `capital` down to zero over `years`.
pub fn annuity_withdrawal(
    capital: f64,
    annual_return_percent: f64,
    years: i64,
) -> Result<f64, CalcError> {
    if !capital.is_finite() {
        return Err(CalcError::NonFinite { name: "capital" });
    }
    if !annual_return_percent.is_finite() {
        return Err(CalcError::NonFinite {
            name: "annual return",
        });
    }
    if years <= 0 {
        return Err(CalcError::InvalidPayoutHorizon { years });
    }
    if annual_return_percent <= -100.0 {
        return Err(CalcError::ReturnOutOfRange {
            percent: annual_return_percent,
        });
    }

    let years = years as f64;
    let rate = annual_return_percent / 100.0;
    if rate.abs() < ZERO_RATE_EPS {
        return Ok(capital / years);
    }

    // (1 - (1 + r)^-n) / r, via ln_1p/exp_m1 to keep precision for small r.
    let annuity_factor = -(-years * rate.ln_1p()).exp_m1() / rate;
    Ok(capital / annuity_factor)
}

pub fn compute_sweep(inputs: &Inputs) -> Result<Vec<SweepPoint>, CalcError> {
    if inputs.retirement_age > MAX_AGE {
        return Err(CalcError::AgeOutOfRange {
            name: "retirement age",
            age: inputs.retirement_age,
            max: MAX_AGE,
        });
    }

    let horizon = i64::from(inputs.life_after_retirement);
    (SWEEP_START_AGE..inputs.retirement_age)
        .map(|age| {
            let capital = compound_growth(
                inputs.monthly_contribution,
                inputs.average_real_return,
                i64::from(inputs.retirement_age) - i64::from(age),
            );
            let annual_withdrawal =
                annuity_withdrawal(capital, inputs.average_real_return, horizon)?;
            Ok(SweepPoint {
                age,
                annual_withdrawal,
            })
        })
        .collect()
}

pub fn summarize(inputs: &Inputs) -> Result<ResultSummary, CalcError> {
    let years_to_retirement = i64::from(inputs.retirement_age) - i64::from(inputs.current_age);
    if years_to_retirement < 0 {
        warn!(
            current_age = inputs.current_age,
            retirement_age = inputs.retirement_age,
            "current age is past retirement age, contribution will be discounted"
        );
    }

    let capital_at_retirement = compound_growth(
        inputs.monthly_contribution,
        inputs.average_real_return,
        years_to_retirement,
    );
    let annual_withdrawal = annuity_withdrawal(
        capital_at_retirement,
        inputs.average_real_return,
        i64::from(inputs.life_after_retirement),
    )?;

    Ok(ResultSummary {
        pension_increase_per_contribution: inputs.current_pension_benefit / PENSION_BASE_MONTHS,
        capital_at_retirement,
        annual_withdrawal,
    })
}

pub fn calculate(inputs: &Inputs) -> Result<Calculation, CalcError> {
    let summary = summarize(inputs)?;
    let sweep = compute_sweep(inputs)?;
    let beneficial_ages = beneficial_ages(&sweep, summary.pension_increase_per_contribution);

    debug!(
        points = sweep.len(),
        annual_withdrawal = summary.annual_withdrawal,
        ?beneficial_ages,
        "calculation complete"
    );

    Ok(Calculation {
        summary,
        sweep,
        beneficial_ages,
    })
}

/// Withdrawal is monotonic in starting age at a fixed return (falling for positive returns,
/// rising for negative ones), so the winning ages are one contiguous run.
fn beneficial_ages(sweep: &[SweepPoint], pension_increase: f64) -> Option<AgeRange> {
    let mut winners = sweep
        .iter()
        .filter(|point| point.annual_withdrawal >= pension_increase)
        .map(|point| point.age);
    let first = winners.next()?;
    let last = winners.last().unwrap_or(first);
    Some(AgeRange { first, last })
}
