use chrono::NaiveDate;
use clap::{Args, ValueEnum};
use rust_decimal::Decimal;
use serde_json::Value;

use loan_ledger_core::ledger::{EntryPatch, LedgerCollection};
use loan_ledger_core::service::LedgerMutation;

use super::Context;

#[derive(Clone, Copy, ValueEnum)]
pub enum EntryKind {
    Payment,
    Extra,
}

impl From<EntryKind> for LedgerCollection {
    fn from(kind: EntryKind) -> Self {
        match kind {
            EntryKind::Payment => LedgerCollection::Payments,
            EntryKind::Extra => LedgerCollection::ExtraPayments,
        }
    }
}

#[derive(Args)]
#[command(allow_hyphen_values = true)]
pub struct PayArgs {
    #[arg(long)]
    pub loan: String,

    /// Amount paid; defaults to the loan's monthly payment
    #[arg(long)]
    pub amount: Option<Decimal>,

    /// Payment date (YYYY-MM-DD); defaults to today
    #[arg(long)]
    pub date: Option<NaiveDate>,
}

#[derive(Args)]
#[command(allow_hyphen_values = true)]
pub struct ExtraArgs {
    #[arg(long)]
    pub loan: String,

    #[arg(long)]
    pub amount: Decimal,

    /// Payment date (YYYY-MM-DD); defaults to today
    #[arg(long)]
    pub date: Option<NaiveDate>,
}

#[derive(Args)]
#[command(allow_hyphen_values = true)]
pub struct EditEntryArgs {
    #[arg(long)]
    pub loan: String,

    #[arg(long)]
    pub kind: EntryKind,

    /// 0-based position in the ledger collection
    #[arg(long)]
    pub index: usize,

    #[arg(long)]
    pub date: Option<NaiveDate>,

    #[arg(long)]
    pub amount: Option<Decimal>,
}

#[derive(Args)]
pub struct DeleteEntryArgs {
    #[arg(long)]
    pub loan: String,

    #[arg(long)]
    pub kind: EntryKind,

    /// 0-based position in the ledger collection
    #[arg(long)]
    pub index: usize,
}

fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

/// The refreshed view, plus the description a matching bank transaction
/// should carry when an entry was added.
fn mutation_output(mutation: LedgerMutation) -> Result<Value, Box<dyn std::error::Error>> {
    let mut view = serde_json::to_value(&mutation.view)?;
    if let (Value::Object(map), Some(description)) = (&mut view, mutation.transaction_description) {
        map.insert("transaction_description".into(), Value::String(description));
    }
    Ok(view)
}

pub fn run_pay(args: PayArgs, ctx: &Context) -> Result<Value, Box<dyn std::error::Error>> {
    let date = args.date.unwrap_or_else(today);
    mutation_output(ctx.service.mark_payment(&ctx.owner, &args.loan, args.amount, date)?)
}

pub fn run_extra(args: ExtraArgs, ctx: &Context) -> Result<Value, Box<dyn std::error::Error>> {
    let date = args.date.unwrap_or_else(today);
    mutation_output(
        ctx.service
            .add_extra_payment(&ctx.owner, &args.loan, args.amount, date)?,
    )
}

pub fn run_edit_entry(args: EditEntryArgs, ctx: &Context) -> Result<Value, Box<dyn std::error::Error>> {
    let patch = EntryPatch {
        date: args.date,
        amount: args.amount,
    };
    if patch.is_empty() {
        return Err("--date or --amount is required".into());
    }
    mutation_output(ctx.service.edit_entry(
        &ctx.owner,
        &args.loan,
        args.kind.into(),
        args.index,
        &patch,
    )?)
}

pub fn run_delete_entry(args: DeleteEntryArgs, ctx: &Context) -> Result<Value, Box<dyn std::error::Error>> {
    mutation_output(
        ctx.service
            .delete_entry(&ctx.owner, &args.loan, args.kind.into(), args.index)?,
    )
}
