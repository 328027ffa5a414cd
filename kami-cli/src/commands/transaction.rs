use chrono::NaiveDateTime;
use clap::{Args, Subcommand};

use kami_core::{NewTransaction, Transaction};

use super::{confirm, truncate, OutputFormat};
use crate::app::{failed, App};

#[derive(Args)]
pub struct TransactionCommand {
    #[command(subcommand)]
    pub command: TransactionSubcommand,
}

#[derive(Subcommand)]
pub enum TransactionSubcommand {
    /// List transactions
    List {
        /// Only transactions that have not been cancelled
        #[arg(long, conflicts_with = "cancelled")]
        active: bool,

        /// Only cancelled transactions
        #[arg(long)]
        cancelled: bool,

        /// Output format
        #[arg(long, short, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Show a transaction by ID or code
    Show {
        /// Transaction ID or display code
        id: String,

        /// Output format
        #[arg(long, short, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Record a sale
    Create {
        /// Customer ID
        #[arg(long)]
        customer: String,

        /// Service and quantity as ID or ID:QTY (can be repeated)
        #[arg(
            long = "service",
            value_name = "ID[:QTY]",
            value_parser = parse_line,
            required = true
        )]
        services: Vec<(String, u32)>,
    },

    /// Cancel a transaction
    Cancel {
        /// Transaction ID or display code
        id: String,

        /// Skip confirmation prompt
        #[arg(long, short)]
        force: bool,
    },
}

impl TransactionCommand {
    pub async fn run(&self, app: &App) -> Result<(), Box<dyn std::error::Error>> {
        let store = &app.stores.transactions;

        match &self.command {
            TransactionSubcommand::List {
                active,
                cancelled,
                format,
            } => {
                app.load(store).await;

                let transactions = if *active {
                    store.active()
                } else if *cancelled {
                    store.cancelled()
                } else {
                    store.items()
                };

                if transactions.is_empty() {
                    println!("No transactions found");
                    return Ok(());
                }

                match format {
                    OutputFormat::Json => {
                        println!("{}", serde_json::to_string_pretty(&transactions)?);
                    }
                    OutputFormat::Text => {
                        println!(
                            "{:<18}  {:<16}  {:<20}  {:>10}  STATUS",
                            "CODE", "DATE", "CUSTOMER", "PRICE"
                        );
                        println!("{}", "-".repeat(84));
                        for tx in &transactions {
                            print_row(tx);
                        }
                        println!("\nTotal: {} transaction(s)", transactions.len());
                    }
                }
                Ok(())
            }

            TransactionSubcommand::Show { id, format } => {
                app.load(store).await;

                let tx = store
                    .find_by_id(id)
                    .ok_or_else(|| format!("Transaction not found: {}", id))?;

                match format {
                    OutputFormat::Json => {
                        println!("{}", serde_json::to_string_pretty(&tx)?);
                    }
                    OutputFormat::Text => {
                        println!("{}", tx);
                    }
                }
                Ok(())
            }

            TransactionSubcommand::Create { customer, services } => {
                app.require_login()?;

                let draft = services
                    .iter()
                    .fold(NewTransaction::new(customer.trim()), |draft, (id, qty)| {
                        draft.with_service(id.clone(), *qty)
                    })
                    .selected();
                draft.validate()?;

                app.load(&app.stores.services).await;
                let catalogue = app.stores.services.items();
                println!(
                    "Estimated total: {:.2}",
                    draft.estimated_total(&catalogue)
                );

                let created = store.create(&draft).await?;
                println!("Created transaction:");
                println!("{}", created);
                Ok(())
            }

            TransactionSubcommand::Cancel { id, force } => {
                app.require_login()?;
                store.load_from_cache();

                // The server only knows the record id, not the display code.
                let (target, label) = match store.find_by_id(id) {
                    Some(tx) => {
                        let label = tx.code.clone().unwrap_or_else(|| tx.id.clone());
                        (tx.id, label)
                    }
                    None => (id.clone(), id.clone()),
                };

                if !force && !confirm(&format!("Cancel transaction '{}'?", label))? {
                    println!("Cancellation aborted.");
                    return Ok(());
                }

                if !store.remove(&target).await {
                    return Err(failed("cancel", store));
                }
                println!("Cancelled transaction: {}", label);
                Ok(())
            }
        }
    }
}

fn print_row(tx: &Transaction) {
    let customer = tx
        .customer
        .as_ref()
        .map(|c| truncate(&c.name, 20))
        .unwrap_or_default();
    println!(
        "{:<18}  {:<16}  {:<20}  {:>10.2}  {}",
        tx.code.as_deref().unwrap_or(&tx.id),
        format_date(tx.created_at()),
        customer,
        tx.price,
        tx.status
    );
}

fn format_date(date: Option<NaiveDateTime>) -> String {
    date.map(|d| d.format("%d/%m/%Y %H:%M").to_string())
        .unwrap_or_default()
}

/// Parses `ID` or `ID:QTY`. A bare id means one unit.
fn parse_line(s: &str) -> Result<(String, u32), String> {
    let (id, qty) = match s.split_once(':') {
        Some((id, qty)) => {
            let qty = qty
                .trim()
                .parse()
                .map_err(|_| format!("Invalid quantity in '{}'", s))?;
            (id, qty)
        }
        None => (s, 1),
    };

    let id = id.trim();
    if id.is_empty() {
        return Err(format!("Missing service ID in '{}'", s));
    }
    Ok((id.to_string(), qty))
}
