mod commands;
mod config;
mod input;
mod logging;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use serde::Deserialize;
use std::process;
use std::sync::Arc;

use loan_ledger_core::service::LoanService;
use loan_ledger_core::store::JsonFileStore;

use commands::advisory::{DetectArgs, ReconcileArgs, SimulateArgs};
use commands::calculator::{PaymentArgs, ScheduleArgs};
use commands::ledger::{DeleteEntryArgs, EditEntryArgs, ExtraArgs, PayArgs};
use commands::loans::{CreateArgs, LoanArgs, StatusArgs, UpdateArgs};
use commands::Context;

/// Loan amortization schedules and payment ledgers
#[derive(Parser)]
#[command(
    name = "loanctl",
    version,
    about = "Loan amortization schedules and payment ledgers",
    long_about = "Tracks fixed-rate loans with decimal precision: amortization schedules, \
                  realized and extra payments, payoff progress, what-if simulation of \
                  extra payments, and matching of bank transactions to loan payments."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format (defaults to the config file, then json)
    #[arg(long, global = true)]
    output: Option<OutputFormat>,

    /// YAML config file
    #[arg(long, global = true)]
    config: Option<String>,

    /// Loan store file (overrides the config file)
    #[arg(long, global = true)]
    store: Option<String>,

    /// Owner whose loans are addressed (overrides the config file)
    #[arg(long, global = true)]
    owner: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Monthly payment and totals for a set of terms
    Payment(PaymentArgs),
    /// Full amortization schedule for terms or a stored loan
    Schedule(ScheduleArgs),
    /// Originate a loan from a JSON description
    Create(CreateArgs),
    /// List loans with their current state
    List,
    /// Current state of one loan
    Show(LoanArgs),
    /// Change a loan's name, type or description
    Update(UpdateArgs),
    /// Record the next scheduled payment
    Pay(PayArgs),
    /// Record a principal-only payment
    Extra(ExtraArgs),
    /// Change the date or amount of a ledger entry
    EditEntry(EditEntryArgs),
    /// Remove a ledger entry
    DeleteEntry(DeleteEntryArgs),
    /// Mark a loan completed or cancelled
    Status(StatusArgs),
    /// Delete a loan and its ledger
    Delete(LoanArgs),
    /// Preview the effect of an extra payment
    Simulate(SimulateArgs),
    /// Recognize a loan payment in a transaction description
    Detect(DetectArgs),
    /// Suggest the ledger change matching a transaction event
    Reconcile(ReconcileArgs),
    /// Print version information
    Version,
}

#[derive(Debug, Clone, Copy, ValueEnum, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Json,
    Table,
    Csv,
    Minimal,
}

fn main() {
    let cli = Cli::parse();
    logging::init_tracing();

    let settings = match config::CliConfig::load(cli.config.as_deref()) {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    };
    let store_path = cli.store.unwrap_or(settings.store_path);
    let owner = cli.owner.unwrap_or(settings.owner);
    let format = cli.output.or(settings.output).unwrap_or(OutputFormat::Json);
    tracing::debug!(store = %store_path, owner = %owner, "loanctl starting");

    let ctx = Context {
        service: LoanService::new(Arc::new(JsonFileStore::new(store_path)))
            .with_reconciler_config(settings.reconciliation),
        owner,
    };

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Payment(args) => commands::calculator::run_payment(args),
        Commands::Schedule(args) => commands::calculator::run_schedule(args, &ctx),
        Commands::Create(args) => commands::loans::run_create(args, &ctx),
        Commands::List => commands::loans::run_list(&ctx),
        Commands::Show(args) => commands::loans::run_show(args, &ctx),
        Commands::Update(args) => commands::loans::run_update(args, &ctx),
        Commands::Pay(args) => commands::ledger::run_pay(args, &ctx),
        Commands::Extra(args) => commands::ledger::run_extra(args, &ctx),
        Commands::EditEntry(args) => commands::ledger::run_edit_entry(args, &ctx),
        Commands::DeleteEntry(args) => commands::ledger::run_delete_entry(args, &ctx),
        Commands::Status(args) => commands::loans::run_status(args, &ctx),
        Commands::Delete(args) => commands::loans::run_delete(args, &ctx),
        Commands::Simulate(args) => commands::advisory::run_simulate(args, &ctx),
        Commands::Detect(args) => commands::advisory::run_detect(args),
        Commands::Reconcile(args) => commands::advisory::run_reconcile(args, &ctx),
        Commands::Version => {
            println!("loanctl {}", env!("CARGO_PKG_VERSION"));
            return;
        }
    };

    match result {
        Ok(value) => {
            output::format_output(&format, &value);
            process::exit(0);
        }
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    }
}
