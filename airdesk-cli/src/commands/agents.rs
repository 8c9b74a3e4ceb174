use airdesk_core::{Agent, AgentDirectory, Airdesk};
use anyhow::Result;
use clap::Subcommand;

use crate::render::{AgentLine, Printer, Render, render_lines};

#[derive(Subcommand)]
pub enum AgentsCommand {
    /// List agents with their badges
    List {
        /// Follow every page
        #[arg(long)]
        all: bool,
    },
    Get {
        id: String,
    },
    /// Fetch several agents by record id
    Lookup {
        #[arg(required = true)]
        ids: Vec<String>,
    },
}

pub async fn run(command: AgentsCommand, printer: Printer) -> Result<()> {
    let airdesk = Airdesk::load()?;
    let agents = &airdesk.agents;

    let response = match command {
        AgentsCommand::List { all } => {
            printer
                .spin("Loading agents", async {
                    if all {
                        agents.list_all(None).await
                    } else {
                        agents.list_agents(None).await
                    }
                })
                .await?
        }
        AgentsCommand::Get { id } => {
            let response = printer.spin("Loading agent", agents.get_by_id(&id)).await?;
            response.map(|agent| vec![agent])
        }
        AgentsCommand::Lookup { ids } => {
            let found = printer
                .spin("Loading agents", agents.get_agents_by_ids(&ids))
                .await?;
            if printer.json {
                println!("{}", serde_json::to_string_pretty(&found)?);
            } else {
                println!("{}", render_agents(&found, "No agents found"));
            }
            return Ok(());
        }
    };

    printer.emit(&response, |agents| render_agents(agents, "No agents"))
}

/// Badges are colored against the listed agents themselves.
fn render_agents(agents: &[Agent], empty: &str) -> String {
    let mut directory = AgentDirectory::new();
    directory.set_agents(agents.to_vec());
    render_lines(agents, empty, |agent| {
        AgentLine {
            agent,
            directory: &directory,
        }
        .render()
    })
}
