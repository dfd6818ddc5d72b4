use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum CalcError {
    #[error("payout horizon must be at least 1 year, got {years}")]
    InvalidPayoutHorizon { years: i64 },
    #[error("annual return must be greater than -100%, got {percent}%")]
    ReturnOutOfRange { percent: f64 },
    #[error("{name} must be a finite number")]
    NonFinite { name: &'static str },
    #[error("{name} must be <= {max}, got {age}")]
    AgeOutOfRange {
        name: &'static str,
        age: u32,
        max: u32,
    },
}
