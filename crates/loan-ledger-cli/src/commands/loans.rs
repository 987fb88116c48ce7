use clap::{Args, ValueEnum};
use serde_json::{json, Value};

use loan_ledger_core::loan::{LoanDetailsUpdate, LoanStatus, LoanType, NewLoan};

use super::Context;
use crate::input;

#[derive(Args)]
pub struct CreateArgs {
    /// Path to a JSON loan description (name, principal, annual_rate,
    /// term_months, start_date, loan_type, description)
    #[arg(long)]
    pub input: Option<String>,
}

#[derive(Args)]
pub struct LoanArgs {
    /// Loan id
    #[arg(long)]
    pub loan: String,
}

#[derive(Args)]
pub struct UpdateArgs {
    #[arg(long)]
    pub loan: String,

    #[arg(long)]
    pub name: Option<String>,

    /// personal, mortgage, auto, student, credit_card or other
    #[arg(long = "type", value_parser = parse_loan_type)]
    pub loan_type: Option<LoanType>,

    #[arg(long)]
    pub description: Option<String>,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum StatusTarget {
    Completed,
    Cancelled,
}

#[derive(Args)]
pub struct StatusArgs {
    #[arg(long)]
    pub loan: String,

    #[arg(long)]
    pub to: StatusTarget,
}

fn parse_loan_type(raw: &str) -> Result<LoanType, String> {
    serde_json::from_value(Value::String(raw.to_lowercase()))
        .map_err(|_| format!("unknown loan type '{raw}'"))
}

pub fn run_create(args: CreateArgs, ctx: &Context) -> Result<Value, Box<dyn std::error::Error>> {
    let new_loan: NewLoan = input::read_input(args.input.as_deref(), "loan creation")?;
    let loan = ctx.service.create_loan(&ctx.owner, new_loan)?;
    Ok(serde_json::to_value(ctx.service.loan_view(&ctx.owner, &loan.id)?)?)
}

pub fn run_list(ctx: &Context) -> Result<Value, Box<dyn std::error::Error>> {
    Ok(serde_json::to_value(ctx.service.list_views(&ctx.owner)?)?)
}

pub fn run_show(args: LoanArgs, ctx: &Context) -> Result<Value, Box<dyn std::error::Error>> {
    let loan = ctx.service.get_loan(&ctx.owner, &args.loan)?;
    let mut view = serde_json::to_value(ctx.service.loan_view(&ctx.owner, &args.loan)?)?;
    if let Value::Object(map) = &mut view {
        map.insert("loan_type".into(), serde_json::to_value(loan.loan_type)?);
        map.insert("principal".into(), serde_json::to_value(loan.principal)?);
        map.insert("annual_rate".into(), serde_json::to_value(loan.annual_rate)?);
        map.insert("term_months".into(), json!(loan.term_months));
        map.insert("payments".into(), serde_json::to_value(&loan.ledger.payments)?);
        map.insert(
            "extra_payments".into(),
            serde_json::to_value(&loan.ledger.extra_payments)?,
        );
    }
    Ok(view)
}

pub fn run_update(args: UpdateArgs, ctx: &Context) -> Result<Value, Box<dyn std::error::Error>> {
    let update = LoanDetailsUpdate {
        name: args.name,
        loan_type: args.loan_type,
        description: args.description,
    };
    ctx.service.update_details(&ctx.owner, &args.loan, &update)?;
    Ok(serde_json::to_value(ctx.service.loan_view(&ctx.owner, &args.loan)?)?)
}

pub fn run_status(args: StatusArgs, ctx: &Context) -> Result<Value, Box<dyn std::error::Error>> {
    let status = match args.to {
        StatusTarget::Completed => LoanStatus::Completed,
        StatusTarget::Cancelled => LoanStatus::Cancelled,
    };
    let loan = ctx.service.set_status(&ctx.owner, &args.loan, status)?;
    Ok(json!({ "id": loan.id, "status": loan.status }))
}

pub fn run_delete(args: LoanArgs, ctx: &Context) -> Result<Value, Box<dyn std::error::Error>> {
    ctx.service.delete_loan(&ctx.owner, &args.loan)?;
    Ok(json!({ "deleted": args.loan }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_loan_type_accepts_legacy_names() {
        assert_eq!(parse_loan_type("hipoteca").unwrap(), LoanType::Mortgage);
        assert_eq!(parse_loan_type("Credit_Card").unwrap(), LoanType::CreditCard);
        assert!(parse_loan_type("yacht").is_err());
    }
}
