use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod app;
mod commands;
mod config;

use app::App;
use commands::{AuthCommand, ConfigCommand, CustomerCommand, ServiceCommand, TransactionCommand};
use config::Config;

#[derive(Parser)]
#[command(name = "kami")]
#[command(version)]
#[command(about = "Manage Kami services, customers and transactions", long_about = None)]
struct Cli {
    /// Path to config file
    #[arg(long, short, global = true)]
    config: Option<PathBuf>,

    /// Use cached data only; never contact the server
    #[arg(long, global = true)]
    offline: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Log in, register or log out
    Auth(AuthCommand),

    /// Manage services
    Service(ServiceCommand),

    /// Manage customers
    Customer(CustomerCommand),

    /// Record and cancel transactions
    Transaction(TransactionCommand),

    /// Manage configuration
    Config(ConfigCommand),
}

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = Config::load(cli.config)?;

    match cli.command {
        Some(Commands::Config(cmd)) => {
            cmd.run(&config)?;
        }
        Some(Commands::Auth(cmd)) => {
            let app = App::new(&config, cli.offline)?;
            cmd.run(&app).await?;
        }
        Some(Commands::Service(cmd)) => {
            let app = App::new(&config, cli.offline)?;
            cmd.run(&app).await?;
        }
        Some(Commands::Customer(cmd)) => {
            let app = App::new(&config, cli.offline)?;
            cmd.run(&app).await?;
        }
        Some(Commands::Transaction(cmd)) => {
            let app = App::new(&config, cli.offline)?;
            cmd.run(&app).await?;
        }
        None => {
            println!("Use --help to see available commands");
        }
    }

    Ok(())
}
