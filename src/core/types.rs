use serde::Serialize;

/// First starting age evaluated by the age sweep.
pub const SWEEP_START_AGE: u32 = 20;

/// Upper bound accepted for any age or year count; keeps the sweep to a few hundred points.
pub const MAX_AGE: u32 = 150;

/// Contribution months the current pension benefit is earned over: 12 payments a year
/// for a 40-year contribution record.
pub const PENSION_BASE_MONTHS: f64 = 12.0 * 40.0;

pub const DEFAULT_MONTHLY_CONTRIBUTION: f64 = 16_520.0;
pub const DEFAULT_CURRENT_PENSION_BENEFIT: f64 = 795_000.0;
pub const DEFAULT_LIFE_AFTER_RETIREMENT: u32 = 40;
pub const DEFAULT_CURRENT_AGE: u32 = 40;
pub const DEFAULT_RETIREMENT_AGE: u32 = 65;
pub const DEFAULT_AVERAGE_REAL_RETURN: f64 = 4.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Inputs {
    pub monthly_contribution: f64,
    pub current_pension_benefit: f64,
    pub life_after_retirement: u32,
    pub current_age: u32,
    pub retirement_age: u32,
    /// Annual real return in percent, e.g. `4.0` for 4%.
    pub average_real_return: f64,
}

impl Default for Inputs {
    fn default() -> Self {
        Self {
            monthly_contribution: DEFAULT_MONTHLY_CONTRIBUTION,
            current_pension_benefit: DEFAULT_CURRENT_PENSION_BENEFIT,
            life_after_retirement: DEFAULT_LIFE_AFTER_RETIREMENT,
            current_age: DEFAULT_CURRENT_AGE,
            retirement_age: DEFAULT_RETIREMENT_AGE,
            average_real_return: DEFAULT_AVERAGE_REAL_RETURN,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SweepPoint {
    pub age: u32,
    pub annual_withdrawal: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultSummary {
    /// Yearly pension gained from one month of contributions.
    pub pension_increase_per_contribution: f64,
    /// One month's contribution compounded from the current age to retirement.
    pub capital_at_retirement: f64,
    pub annual_withdrawal: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Calculation {
    pub summary: ResultSummary,
    pub sweep: Vec<SweepPoint>,
    /// Sweep ages whose withdrawal matches or beats the pension increase.
    pub beneficial_ages: Option<AgeRange>,
}

/// Inclusive range of starting ages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AgeRange {
    pub first: u32,
    pub last: u32,
}

/// A numeric form field as presented to users.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InputField {
    pub key: &'static str,
    pub label: &'static str,
    pub default: f64,
    pub step: f64,
}

pub static INPUT_FIELDS: [InputField; 6] = [
    InputField {
        key: "monthlyContribution",
        label: "Monthly contribution (Yen)",
        default: DEFAULT_MONTHLY_CONTRIBUTION,
        step: 10.0,
    },
    InputField {
        key: "currentPensionBenefit",
        label: "Current pension benefit (Yen)",
        default: DEFAULT_CURRENT_PENSION_BENEFIT,
        step: 1_000.0,
    },
    InputField {
        key: "lifeAfterRetirement",
        label: "Life after retirement (Years)",
        default: DEFAULT_LIFE_AFTER_RETIREMENT as f64,
        step: 1.0,
    },
    InputField {
        key: "currentAge",
        label: "Current age (Years)",
        default: DEFAULT_CURRENT_AGE as f64,
        step: 1.0,
    },
    InputField {
        key: "retirementAge",
        label: "Retirement age (Years)",
        default: DEFAULT_RETIREMENT_AGE as f64,
        step: 1.0,
    },
    InputField {
        key: "averageRealReturn",
        label: "Average real return (%)",
        default: DEFAULT_AVERAGE_REAL_RETURN,
        step: 0.1,
    },
];
