mod auth;
mod config_cmd;
mod customer;
mod service;
mod transaction;

use clap::ValueEnum;
use std::io::{self, Write};

pub use auth::AuthCommand;
pub use config_cmd::ConfigCommand;
pub use customer::CustomerCommand;
pub use service::ServiceCommand;
pub use transaction::TransactionCommand;

#[derive(Clone, ValueEnum, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Asks a yes/no question; anything but `y` is a no.
fn confirm(question: &str) -> io::Result<bool> {
    print!("{} [y/N] ", question);
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    Ok(input.trim().eq_ignore_ascii_case("y"))
}

fn prompt(label: &str) -> io::Result<String> {
    print!("{}: ", label);
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    Ok(input.trim_end_matches(['\r', '\n']).to_string())
}

/// Cuts `text` to `width` characters, marking the cut with `...`.
fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() > width {
        let kept: String = text.chars().take(width.saturating_sub(3)).collect();
        format!("{}...", kept)
    } else {
        text.to_string()
    }
}
