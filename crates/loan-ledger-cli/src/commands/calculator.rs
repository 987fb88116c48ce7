use chrono::NaiveDate;
use clap::Args;
use rust_decimal::Decimal;
use serde_json::{json, Value};

use loan_ledger_core::amortization::{amortize, AmortizationInput};
use loan_ledger_core::round_money;

use super::Context;
use crate::input;

/// Loan terms given as flags.
#[derive(Args)]
pub struct TermsArgs {
    /// Amount borrowed
    #[arg(long)]
    pub principal: Option<Decimal>,

    /// Annual interest rate in percent (e.g. 5.5)
    #[arg(long, alias = "rate")]
    pub annual_rate: Option<Decimal>,

    /// Term in months
    #[arg(long, alias = "months")]
    pub term_months: Option<u32>,

    /// First day of the loan (YYYY-MM-DD); defaults to today
    #[arg(long)]
    pub start_date: Option<NaiveDate>,

    /// Path to JSON input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,
}

#[derive(Args)]
pub struct PaymentArgs {
    #[command(flatten)]
    pub terms: TermsArgs,
}

#[derive(Args)]
pub struct ScheduleArgs {
    #[command(flatten)]
    pub terms: TermsArgs,

    /// Schedule of a stored loan instead of ad-hoc terms
    #[arg(long)]
    pub loan: Option<String>,
}

impl TermsArgs {
    fn resolve(&self) -> Result<AmortizationInput, Box<dyn std::error::Error>> {
        let (Some(principal), None) = (self.principal, self.input.as_deref()) else {
            return input::read_input(self.input.as_deref(), "loan terms");
        };
        Ok(AmortizationInput {
            principal,
            annual_rate: self.annual_rate.ok_or("--annual-rate is required")?,
            term_months: self.term_months.ok_or("--term-months is required")?,
            start_date: self
                .start_date
                .unwrap_or_else(|| chrono::Local::now().date_naive()),
        })
    }
}

pub fn run_payment(args: PaymentArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let terms = args.terms.resolve()?;
    let output = amortize(&terms)?;
    let report = output.result;
    Ok(json!({
        "result": {
            "monthly_payment": report.monthly_payment,
            "total_payment": report.total_payment,
            "total_interest": report.total_interest,
            "end_date": report.end_date,
        },
        "methodology": output.methodology,
        "warnings": output.warnings,
    }))
}

pub fn run_schedule(args: ScheduleArgs, ctx: &Context) -> Result<Value, Box<dyn std::error::Error>> {
    if let Some(loan_id) = args.loan.as_deref() {
        let rows: Vec<_> = ctx
            .service
            .schedule(&ctx.owner, loan_id)?
            .iter()
            .map(|row| row.rounded())
            .collect();
        let payment = rows.first().map(|r| round_money(r.payment));
        return Ok(json!({
            "result": {
                "loan_id": loan_id,
                "monthly_payment": payment,
                "schedule": rows,
            }
        }));
    }
    let terms = args.terms.resolve()?;
    Ok(serde_json::to_value(amortize(&terms)?)?)
}
