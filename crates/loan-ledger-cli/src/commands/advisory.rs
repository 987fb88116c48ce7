use clap::{Args, ValueEnum};
use rust_decimal::Decimal;
use serde_json::Value;

use loan_ledger_core::reconciliation::{detect_loan_transaction, Transaction, TransactionEvent};

use super::Context;
use crate::input;

#[derive(Args)]
pub struct SimulateArgs {
    #[arg(long)]
    pub loan: String,

    /// Extra principal to pay now
    #[arg(long)]
    pub amount: Decimal,
}

#[derive(Args)]
pub struct DetectArgs {
    /// Transaction description text
    #[arg(long)]
    pub description: String,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum EventArg {
    Created,
    Deleting,
}

#[derive(Args)]
pub struct ReconcileArgs {
    #[arg(long)]
    pub event: EventArg,

    /// Path to a JSON transaction (id, description, amount, date)
    #[arg(long)]
    pub input: Option<String>,
}

pub fn run_simulate(args: SimulateArgs, ctx: &Context) -> Result<Value, Box<dyn std::error::Error>> {
    let output = ctx
        .service
        .simulate_extra_payment(&ctx.owner, &args.loan, args.amount)?;
    Ok(serde_json::to_value(output)?)
}

pub fn run_detect(args: DetectArgs) -> Result<Value, Box<dyn std::error::Error>> {
    Ok(serde_json::to_value(detect_loan_transaction(&args.description))?)
}

pub fn run_reconcile(args: ReconcileArgs, ctx: &Context) -> Result<Value, Box<dyn std::error::Error>> {
    let transaction: Transaction = input::read_input(args.input.as_deref(), "reconciliation")?;
    let event = match args.event {
        EventArg::Created => TransactionEvent::Created,
        EventArg::Deleting => TransactionEvent::Deleting,
    };
    let hint = ctx
        .service
        .reconcile_transaction(&ctx.owner, event, &transaction)?;
    Ok(serde_json::to_value(hint)?)
}
