use clap::{Args, Subcommand};

use kami_core::{Customer, CustomerPatch, Loyalty, NewCustomer};

use super::{confirm, truncate, OutputFormat};
use crate::app::{failed, App};

#[derive(Args)]
pub struct CustomerCommand {
    #[command(subcommand)]
    pub command: CustomerSubcommand,
}

#[derive(Subcommand)]
pub enum CustomerSubcommand {
    /// List all customers
    List {
        /// Output format
        #[arg(long, short, value_enum, default_value = "text")]
        format: OutputFormat,

        /// Filter by loyalty (normal, high, low)
        #[arg(long)]
        loyalty: Option<Loyalty>,
    },

    /// Show a customer with their transactions
    Show {
        /// Customer ID
        id: String,

        /// Output format
        #[arg(long, short, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Add a customer
    Create {
        /// Customer name
        name: String,

        /// Phone number
        #[arg(long)]
        phone: String,

        /// Loyalty (normal, high, low)
        #[arg(long)]
        loyalty: Option<Loyalty>,
    },

    /// Update an existing customer
    Update {
        /// Customer ID
        id: String,

        /// New name
        #[arg(long)]
        name: Option<String>,

        /// New phone number
        #[arg(long)]
        phone: Option<String>,

        /// New loyalty (normal, high, low)
        #[arg(long)]
        loyalty: Option<Loyalty>,
    },

    /// Delete a customer
    Delete {
        /// Customer ID
        id: String,

        /// Skip confirmation prompt
        #[arg(long, short)]
        force: bool,
    },
}

impl CustomerCommand {
    pub async fn run(&self, app: &App) -> Result<(), Box<dyn std::error::Error>> {
        let store = &app.stores.customers;

        match &self.command {
            CustomerSubcommand::List { format, loyalty } => {
                app.load(store).await;

                let customers: Vec<Customer> = store
                    .items()
                    .into_iter()
                    .filter(|c| loyalty.map_or(true, |l| c.loyalty == l))
                    .collect();

                if customers.is_empty() {
                    println!("No customers found");
                    return Ok(());
                }

                match format {
                    OutputFormat::Json => {
                        println!("{}", serde_json::to_string_pretty(&customers)?);
                    }
                    OutputFormat::Text => {
                        println!(
                            "{:<24}  {:<24}  {:<14}  {:<7}  {:>10}",
                            "ID", "NAME", "PHONE", "LOYALTY", "SPENT"
                        );
                        println!("{}", "-".repeat(87));
                        for customer in &customers {
                            println!(
                                "{:<24}  {:<24}  {:<14}  {:<7}  {:>10.2}",
                                customer.id,
                                truncate(&customer.name, 24),
                                customer.phone,
                                customer.loyalty.to_string(),
                                customer.total_spent
                            );
                        }
                        println!("\nTotal: {} customer(s)", customers.len());
                    }
                }
                Ok(())
            }

            CustomerSubcommand::Show { id, format } => {
                if app.offline {
                    store.load_from_cache();
                    let customer = store
                        .find_by_id(id)
                        .ok_or_else(|| format!("Customer not found: {}", id))?;
                    return match format {
                        OutputFormat::Json => {
                            println!("{}", serde_json::to_string_pretty(&customer)?);
                            Ok(())
                        }
                        OutputFormat::Text => {
                            println!("{}", customer);
                            Ok(())
                        }
                    };
                }

                let details = store.fetch_details(id).await?;
                match format {
                    OutputFormat::Json => {
                        println!("{}", serde_json::to_string_pretty(&details)?);
                    }
                    OutputFormat::Text => {
                        println!("{}", details.customer);
                        if details.transactions.is_empty() {
                            println!("No transactions");
                        } else {
                            println!("Transactions:");
                            for tx in &details.transactions {
                                println!(
                                    "  {:<18}  {:>10.2}  {}",
                                    tx.code.as_deref().unwrap_or(&tx.id),
                                    tx.price,
                                    tx.status
                                );
                            }
                        }
                    }
                }
                Ok(())
            }

            CustomerSubcommand::Create {
                name,
                phone,
                loyalty,
            } => {
                app.require_login()?;

                let mut draft = NewCustomer::new(name.trim(), phone.trim());
                if let Some(loyalty) = loyalty {
                    draft = draft.with_loyalty(*loyalty);
                }

                let created = store.create(&draft).await?;
                println!("Created customer:");
                println!("{}", created);
                Ok(())
            }

            CustomerSubcommand::Update {
                id,
                name,
                phone,
                loyalty,
            } => {
                let patch = CustomerPatch {
                    name: name.clone(),
                    phone: phone.clone(),
                    loyalty: *loyalty,
                };
                if patch.is_empty() {
                    return Err("Nothing to update. Provide at least one option.".into());
                }
                patch.validate()?;
                app.require_login()?;

                if !store.update(id, &patch).await {
                    return Err(failed("update", store));
                }

                match store.find_by_id(id) {
                    Some(updated) => {
                        println!("Updated customer:");
                        println!("{}", updated);
                    }
                    None => println!("Updated customer {}", id),
                }
                Ok(())
            }

            CustomerSubcommand::Delete { id, force } => {
                app.require_login()?;
                store.load_from_cache();
                let label = store
                    .find_by_id(id)
                    .map(|c| c.name)
                    .unwrap_or_else(|| id.clone());

                if !force && !confirm(&format!("Delete customer '{}'?", label))? {
                    println!("Deletion cancelled.");
                    return Ok(());
                }

                if !store.remove(id).await {
                    return Err(failed("delete", store));
                }
                println!("Deleted customer: {}", label);
                Ok(())
            }
        }
    }
}
