use clap::{Args, Subcommand};

use kami_core::{NewService, Service, ServicePatch};

use super::{confirm, truncate, OutputFormat};
use crate::app::{failed, App};

#[derive(Args)]
pub struct ServiceCommand {
    #[command(subcommand)]
    pub command: ServiceSubcommand,
}

#[derive(Subcommand)]
pub enum ServiceSubcommand {
    /// List all services
    List {
        /// Output format
        #[arg(long, short, value_enum, default_value = "text")]
        format: OutputFormat,

        /// Filter by category
        #[arg(long)]
        category: Option<String>,
    },

    /// Show a service's details
    Show {
        /// Service ID
        id: String,

        /// Output format
        #[arg(long, short, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Create a new service
    Create {
        /// Name of the service
        name: String,

        /// Price
        #[arg(long)]
        price: f64,

        /// Category
        #[arg(long)]
        category: Option<String>,

        /// Description
        #[arg(long)]
        description: Option<String>,

        /// Image URL
        #[arg(long)]
        image_url: Option<String>,
    },

    /// Update an existing service
    Update {
        /// Service ID
        id: String,

        /// New name
        #[arg(long)]
        name: Option<String>,

        /// New price
        #[arg(long)]
        price: Option<f64>,

        /// New category
        #[arg(long)]
        category: Option<String>,

        /// New description
        #[arg(long)]
        description: Option<String>,

        /// New image URL
        #[arg(long)]
        image_url: Option<String>,
    },

    /// Delete a service
    Delete {
        /// Service ID
        id: String,

        /// Skip confirmation prompt
        #[arg(long, short)]
        force: bool,
    },
}

impl ServiceCommand {
    pub async fn run(&self, app: &App) -> Result<(), Box<dyn std::error::Error>> {
        let store = &app.stores.services;

        match &self.command {
            ServiceSubcommand::List { format, category } => {
                app.load(store).await;

                let services: Vec<Service> = match category {
                    Some(category) => store
                        .items()
                        .into_iter()
                        .filter(|s| {
                            s.category
                                .as_deref()
                                .is_some_and(|c| c.eq_ignore_ascii_case(category))
                        })
                        .collect(),
                    None => store.items(),
                };

                if services.is_empty() {
                    println!("No services found");
                    return Ok(());
                }

                match format {
                    OutputFormat::Json => {
                        println!("{}", serde_json::to_string_pretty(&services)?);
                    }
                    OutputFormat::Text => {
                        println!("{:<24}  {:<30}  {:>10}  CATEGORY", "ID", "NAME", "PRICE");
                        println!("{}", "-".repeat(80));
                        for service in &services {
                            println!(
                                "{:<24}  {:<30}  {:>10.2}  {}",
                                service.id,
                                truncate(&service.name, 30),
                                service.price,
                                service.category.as_deref().unwrap_or("")
                            );
                        }
                        println!("\nTotal: {} service(s)", services.len());
                    }
                }
                Ok(())
            }

            ServiceSubcommand::Show { id, format } => {
                app.load(store).await;

                let service = match store.find_by_id(id) {
                    Some(service) => service,
                    None if !app.offline => store.fetch_one(id).await?,
                    None => return Err(format!("Service not found: {}", id).into()),
                };

                match format {
                    OutputFormat::Json => {
                        println!("{}", serde_json::to_string_pretty(&service)?);
                    }
                    OutputFormat::Text => {
                        println!("{}", service);
                    }
                }
                Ok(())
            }

            ServiceSubcommand::Create {
                name,
                price,
                category,
                description,
                image_url,
            } => {
                app.require_login()?;

                let mut draft = NewService::new(name.trim(), *price);
                if let Some(category) = category {
                    draft = draft.with_category(category);
                }
                if let Some(description) = description {
                    draft = draft.with_description(description);
                }
                if let Some(image_url) = image_url {
                    draft = draft.with_image_url(image_url);
                }

                let created = store.create(&draft).await?;
                println!("Created service:");
                println!("{}", created);
                Ok(())
            }

            ServiceSubcommand::Update {
                id,
                name,
                price,
                category,
                description,
                image_url,
            } => {
                let patch = ServicePatch {
                    name: name.clone(),
                    price: *price,
                    category: category.clone(),
                    description: description.clone(),
                    image_url: image_url.clone(),
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
                        println!("Updated service:");
                        println!("{}", updated);
                    }
                    None => println!("Updated service {}", id),
                }
                Ok(())
            }

            ServiceSubcommand::Delete { id, force } => {
                app.require_login()?;
                store.load_from_cache();
                let label = store
                    .find_by_id(id)
                    .map(|s| s.name)
                    .unwrap_or_else(|| id.clone());

                if !force && !confirm(&format!("Delete service '{}'?", label))? {
                    println!("Deletion cancelled.");
                    return Ok(());
                }

                if !store.remove(id).await {
                    return Err(failed("delete", store));
                }
                println!("Deleted service: {}", label);
                Ok(())
            }
        }
    }
}
