mod commands;
mod render;
mod utils;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use commands::agents::AgentsCommand;
use commands::appointments::AppointmentsCommand;
use commands::config::ConfigCommand;
use commands::contacts::ContactsCommand;
use render::Printer;

#[derive(Parser)]
#[command(name = "airdesk")]
#[command(about = "Browse and edit contacts, agents and appointments stored in Airtable")]
#[command(version)]
struct Cli {
    /// Print raw response envelopes as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// People appointments are booked for
    Contacts {
        #[command(subcommand)]
        command: ContactsCommand,
    },
    /// Staff assigned to appointments
    Agents {
        #[command(subcommand)]
        command: AgentsCommand,
    },
    Appointments {
        #[command(subcommand)]
        command: AppointmentsCommand,
    },
    /// Inspect or create the config file
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "airdesk=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let printer = Printer { json: cli.json };

    let result = match cli.command {
        Commands::Contacts { command } => commands::contacts::run(command, printer).await,
        Commands::Agents { command } => commands::agents::run(command, printer).await,
        Commands::Appointments { command } => {
            commands::appointments::run(command, printer).await
        }
        Commands::Config { command } => commands::config::run(command),
    };

    match result {
        Err(err) if printer.json => {
            printer.error(&err)?;
            std::process::exit(1);
        }
        other => other,
    }
}
