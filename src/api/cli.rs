use clap::{Args, Parser, Subcommand};
use std::net::{IpAddr, Ipv4Addr};

use super::{ApiError, build_calculate_response};
use crate::core::{
    AgeRange, Calculation, DEFAULT_AVERAGE_REAL_RETURN, DEFAULT_CURRENT_AGE,
    DEFAULT_CURRENT_PENSION_BENEFIT, DEFAULT_LIFE_AFTER_RETIREMENT, DEFAULT_MONTHLY_CONTRIBUTION,
    DEFAULT_RETIREMENT_AGE, Inputs, MAX_AGE, calculate,
};

#[derive(Parser, Debug)]
#[command(
    name = "nenkin",
    about = "Japanese pension contribution vs. self-investment calculator"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print the result summary and the starting-age sweep
    Calc(CalcArgs),
    /// Serve the interactive calculator page and JSON API
    Serve(ServeArgs),
}

#[derive(Args, Debug, Clone)]
pub struct CalcArgs {
    #[arg(
        long,
        default_value_t = DEFAULT_MONTHLY_CONTRIBUTION,
        help = "Monthly contribution in yen"
    )]
    pub monthly_contribution: f64,
    #[arg(
        long,
        default_value_t = DEFAULT_CURRENT_PENSION_BENEFIT,
        help = "Current full annual pension benefit in yen"
    )]
    pub current_pension_benefit: f64,
    #[arg(
        long,
        default_value_t = DEFAULT_LIFE_AFTER_RETIREMENT,
        help = "Years the invested capital has to last after retirement"
    )]
    pub life_after_retirement: u32,
    #[arg(long, default_value_t = DEFAULT_CURRENT_AGE)]
    pub current_age: u32,
    #[arg(long, default_value_t = DEFAULT_RETIREMENT_AGE)]
    pub retirement_age: u32,
    #[arg(
        long,
        default_value_t = DEFAULT_AVERAGE_REAL_RETURN,
        allow_negative_numbers = true,
        help = "Average inflation-adjusted annual return in percent, e.g. 4"
    )]
    pub average_real_return: f64,
    #[arg(long, help = "Print the API JSON response instead of the text report")]
    pub json: bool,
}

impl Default for CalcArgs {
    fn default() -> Self {
        let inputs = Inputs::default();
        Self {
            monthly_contribution: inputs.monthly_contribution,
            current_pension_benefit: inputs.current_pension_benefit,
            life_after_retirement: inputs.life_after_retirement,
            current_age: inputs.current_age,
            retirement_age: inputs.retirement_age,
            average_real_return: inputs.average_real_return,
            json: false,
        }
    }
}

#[derive(Args, Debug, Clone)]
pub struct ServeArgs {
    #[arg(long, default_value_t = IpAddr::V4(Ipv4Addr::UNSPECIFIED))]
    pub host: IpAddr,
    #[arg(long, default_value_t = 8080)]
    pub port: u16,
}

pub(super) fn build_inputs(args: &CalcArgs) -> Result<Inputs, ApiError> {
    for (name, value) in [
        ("--monthly-contribution", args.monthly_contribution),
        ("--current-pension-benefit", args.current_pension_benefit),
        ("--average-real-return", args.average_real_return),
    ] {
        if !value.is_finite() {
            return Err(ApiError::InvalidInput(format!(
                "{name} must be a finite number"
            )));
        }
    }

    for (name, value) in [
        ("--life-after-retirement", args.life_after_retirement),
        ("--current-age", args.current_age),
        ("--retirement-age", args.retirement_age),
    ] {
        if value > MAX_AGE {
            return Err(ApiError::InvalidInput(format!(
                "{name} must be <= {MAX_AGE}"
            )));
        }
    }

    Ok(Inputs {
        monthly_contribution: args.monthly_contribution,
        current_pension_benefit: args.current_pension_benefit,
        life_after_retirement: args.life_after_retirement,
        current_age: args.current_age,
        retirement_age: args.retirement_age,
        average_real_return: args.average_real_return,
    })
}

/// Runs one calculation and renders it as the text report or, with `--json`, the API body.
pub fn run_calc(args: CalcArgs) -> Result<String, ApiError> {
    let inputs = build_inputs(&args)?;
    let calc = calculate(&inputs)?;

    if args.json {
        let response = build_calculate_response(inputs, calc);
        return Ok(serde_json::to_string_pretty(&response)?);
    }
    Ok(render_report(&inputs, &calc))
}

fn render_report(inputs: &Inputs, calc: &Calculation) -> String {
    let summary = &calc.summary;
    let mut lines = vec![
        "# Results".to_string(),
        format!(
            "A month contribution increases the annual pension by {:.2} yen",
            summary.pension_increase_per_contribution
        ),
        format!(
            "If invested, you can withdraw {:.2} yen annually for {} years after retirement",
            summary.annual_withdrawal, inputs.life_after_retirement
        ),
        String::new(),
        "# Simulation at different ages".to_string(),
        format!(
            "Potential annual withdrawal from a month contribution if invested: \
             Inflation adjusted return = {} %",
            inputs.average_real_return
        ),
    ];

    if calc.sweep.is_empty() {
        lines.push("(no starting ages before retirement)".to_string());
        return lines.join("\n") + "\n";
    }

    lines.push(format!("{:>5}  {:>18}  vs pension", "Age", "Annual withdrawal"));
    lines.extend(calc.sweep.iter().map(|point| {
        let marker = if point.annual_withdrawal >= summary.pension_increase_per_contribution {
            "above"
        } else {
            "below"
        };
        format!("{:>5}  {:>18.2}  {marker}", point.age, point.annual_withdrawal)
    }));

    lines.push(match calc.beneficial_ages {
        Some(AgeRange { first, last }) if first == last => {
            format!("Investing beats the pension increase only for starting age {first}")
        }
        Some(AgeRange { first, last }) => {
            format!("Investing beats the pension increase for starting ages {first} to {last}")
        }
        None => "Investing does not beat the pension increase at any starting age".to_string(),
    });
    lines.join("\n") + "\n"
}
