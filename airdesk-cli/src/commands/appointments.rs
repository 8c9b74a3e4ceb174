use airdesk_core::{
    Airdesk, AppointmentDraft, AppointmentFilter, AppointmentStatus, DateRange,
};
use anyhow::Result;
use chrono::{DateTime, SecondsFormat, Utc};
use clap::{Args, Subcommand};
use owo_colors::OwoColorize;

use super::confirm_delete;
use crate::render::{AppointmentLine, Printer, Render, render_lines};
use crate::utils::parse_datetime;

#[derive(Subcommand)]
pub enum AppointmentsCommand {
    /// List every appointment matching the filters, newest first
    List {
        /// upcoming, completed or cancelled
        #[arg(long)]
        status: Option<AppointmentStatus>,

        /// Only appointments after this date (needs --to)
        #[arg(long, requires = "to", value_parser = parse_datetime)]
        from: Option<DateTime<Utc>>,

        /// Only appointments before this date (needs --from)
        #[arg(long, requires = "from", value_parser = parse_datetime)]
        to: Option<DateTime<Utc>>,

        /// Case-insensitive match on address, contact name or contact email
        #[arg(short, long)]
        search: Option<String>,
    },
    Get {
        id: String,
    },
    Create(AppointmentArgs),
    /// Change fields of an appointment. Assigned agents are kept unless
    /// --agent or --clear-agents is given.
    Update {
        id: String,

        #[command(flatten)]
        fields: AppointmentArgs,

        /// Unassign every agent
        #[arg(long, conflicts_with = "agents")]
        clear_agents: bool,
    },
    Cancel {
        id: String,
    },
    /// Replace the assigned agents
    Assign {
        id: String,

        /// Agent record ids; none unassigns everyone
        agents: Vec<String>,
    },
    Delete {
        id: String,

        /// Don't ask for confirmation
        #[arg(short, long)]
        yes: bool,
    },
}

#[derive(Args)]
pub struct AppointmentArgs {
    #[arg(long)]
    address: Option<String>,

    /// YYYY-MM-DD, YYYY-MM-DDTHH:MM (local time) or RFC 3339
    #[arg(long, value_parser = parse_datetime)]
    date: Option<DateTime<Utc>>,

    /// Contact record id (repeatable)
    #[arg(long = "contact")]
    contacts: Vec<String>,

    /// Agent record id (repeatable)
    #[arg(long = "agent")]
    agents: Vec<String>,
}

impl AppointmentArgs {
    fn into_draft(self) -> AppointmentDraft {
        AppointmentDraft {
            address: self.address,
            date: self.date,
            contact_ids: self.contacts,
            agent_ids: (!self.agents.is_empty()).then_some(self.agents),
            is_cancelled: None,
        }
    }
}

pub async fn run(command: AppointmentsCommand, printer: Printer) -> Result<()> {
    let airdesk = Airdesk::load()?;
    let appointments = &airdesk.appointments;

    match command {
        AppointmentsCommand::List {
            status,
            from,
            to,
            search,
        } => {
            let mut filter = AppointmentFilter::default();
            if let Some(status) = status {
                filter = filter.status(status);
            }
            if let (Some(from), Some(to)) = (from, to) {
                filter = filter.date_range(DateRange::new(
                    from.to_rfc3339_opts(SecondsFormat::Millis, true),
                    to.to_rfc3339_opts(SecondsFormat::Millis, true),
                ));
            }
            if let Some(search) = search {
                filter = filter.search(search);
            }

            let (response, directory) = printer
                .spin("Loading appointments", async {
                    tokio::try_join!(
                        appointments.list_appointments(&filter),
                        airdesk.agent_directory()
                    )
                })
                .await?;

            let now = Utc::now();
            printer.emit(&response, |data| {
                render_lines(data, "No appointments", |appointment| {
                    AppointmentLine {
                        appointment,
                        directory: &directory,
                        now,
                    }
                    .render()
                })
            })
        }
        AppointmentsCommand::Get { id } => {
            let (response, directory) = printer
                .spin("Loading appointment", async {
                    tokio::try_join!(appointments.get_by_id(&id), airdesk.agent_directory())
                })
                .await?;
            let now = Utc::now();
            printer.emit(&response, |appointment| {
                AppointmentLine {
                    appointment,
                    directory: &directory,
                    now,
                }
                .render()
            })
        }
        AppointmentsCommand::Create(args) => {
            let response = appointments.create_appointment(&args.into_draft()).await?;
            printer.emit(&response, |a| format!("{} {}", "Created".green(), a.id))
        }
        AppointmentsCommand::Update {
            id,
            fields,
            clear_agents,
        } => {
            let mut draft = fields.into_draft();
            if draft.agent_ids.is_none() && !clear_agents {
                let current = appointments.get_by_id(&id).await?.into_data();
                tracing::debug!(%id, agents = ?current.agent_ids, "keeping assigned agents");
                draft.agent_ids = Some(current.agent_ids);
            }

            let response = appointments.update_appointment(&id, &draft).await?;
            printer.emit(&response, |a| format!("{} {}", "Updated".yellow(), a.id))
        }
        AppointmentsCommand::Cancel { id } => {
            let response = appointments.cancel_appointment(&id).await?;
            printer.emit(&response, |a| format!("{} {}", "Cancelled".red(), a.id))
        }
        AppointmentsCommand::Assign { id, agents } => {
            let response = appointments
                .assign_agents(&id, serde_json::Value::from(agents))
                .await?;
            printer.emit(&response, |a| {
                format!(
                    "{} {} agent(s) to {}",
                    "Assigned".green(),
                    a.agent_ids.len(),
                    a.id
                )
            })
        }
        AppointmentsCommand::Delete { id, yes } => {
            if !confirm_delete("appointment", &id, yes || printer.json)? {
                return Ok(());
            }
            let response = appointments.delete(&id).await?;
            printer.emit(&response, Render::render)
        }
    }
}
