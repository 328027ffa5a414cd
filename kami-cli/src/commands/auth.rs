//! Login, registration and session status.

use clap::{Args, Subcommand};

use super::{prompt, OutputFormat};
use crate::app::App;

#[derive(Args)]
pub struct AuthCommand {
    #[command(subcommand)]
    pub command: AuthSubcommand,
}

#[derive(Subcommand)]
pub enum AuthSubcommand {
    /// Log in with a phone number and password
    Login {
        /// Phone number
        #[arg(long)]
        phone: String,

        /// Password (prompted when omitted)
        #[arg(long)]
        password: Option<String>,
    },

    /// Create a new account
    Register {
        /// Email address
        #[arg(long)]
        email: String,

        /// Password (prompted when omitted)
        #[arg(long)]
        password: Option<String>,
    },

    /// Forget the saved session
    Logout,

    /// Show who is logged in
    Status {
        /// Output format
        #[arg(long, short, value_enum, default_value = "text")]
        format: OutputFormat,
    },
}

impl AuthCommand {
    pub async fn run(&self, app: &App) -> Result<(), Box<dyn std::error::Error>> {
        let session = &app.stores.session;

        match &self.command {
            AuthSubcommand::Login { phone, password } => {
                let password = match password {
                    Some(p) => p.clone(),
                    None => prompt("Password")?,
                };

                let data = session.login(phone.trim(), &password).await?;
                println!("Logged in as {}", data.identity);
                Ok(())
            }

            AuthSubcommand::Register { email, password } => {
                let password = match password {
                    Some(p) => p.clone(),
                    None => {
                        let first = prompt("Password")?;
                        let again = prompt("Confirm password")?;
                        if first != again {
                            return Err("Passwords do not match".into());
                        }
                        first
                    }
                };

                session.register(email.trim(), &password).await?;
                println!("Account created for {}", email.trim());
                println!("Log in with 'kami auth login --phone <PHONE>'.");
                Ok(())
            }

            AuthSubcommand::Logout => {
                session.logout()?;
                println!("Logged out");
                Ok(())
            }

            AuthSubcommand::Status { format } => {
                let current = session.current();
                match format {
                    OutputFormat::Json => {
                        let status = serde_json::json!({
                            "loggedIn": current.as_ref().is_some_and(|s| s.logged_in),
                            "identity": current.as_ref().map(|s| s.identity.as_str()),
                        });
                        println!("{}", serde_json::to_string_pretty(&status)?);
                    }
                    OutputFormat::Text => match current {
                        Some(data) => println!("Logged in as {}", data.identity),
                        None => println!("Not logged in"),
                    },
                }
                Ok(())
            }
        }
    }
}
