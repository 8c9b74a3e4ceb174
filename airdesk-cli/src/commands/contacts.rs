use airdesk_core::{Airdesk, ContactDraft, ListQuery};
use anyhow::Result;
use clap::{Args, Subcommand};
use owo_colors::OwoColorize;

use super::confirm_delete;
use crate::render::{Printer, Render, render_lines};

#[derive(Subcommand)]
pub enum ContactsCommand {
    /// List contacts (first page unless --all or --search)
    List {
        /// Follow every page
        #[arg(long)]
        all: bool,

        /// Case-insensitive match on name or email
        #[arg(short, long)]
        search: Option<String>,

        /// Page size, 1 to 100
        #[arg(long)]
        limit: Option<u32>,
    },
    Get {
        id: String,
    },
    Create(ContactArgs),
    Update {
        id: String,

        #[command(flatten)]
        fields: ContactArgs,
    },
    Delete {
        id: String,

        /// Don't ask for confirmation
        #[arg(short, long)]
        yes: bool,
    },
}

#[derive(Args)]
pub struct ContactArgs {
    #[arg(long)]
    name: Option<String>,
    #[arg(long)]
    surname: Option<String>,
    #[arg(long)]
    email: Option<String>,
    #[arg(long)]
    phone: Option<String>,
}

impl From<ContactArgs> for ContactDraft {
    fn from(args: ContactArgs) -> Self {
        ContactDraft {
            name: args.name,
            surname: args.surname,
            email: args.email,
            phone: args.phone,
        }
    }
}

pub async fn run(command: ContactsCommand, printer: Printer) -> Result<()> {
    let airdesk = Airdesk::load()?;
    let contacts = &airdesk.contacts;

    match command {
        ContactsCommand::List { all, search, limit } => {
            let response = printer
                .spin("Loading contacts", async {
                    match search {
                        Some(text) => contacts.search_contacts(&text).await,
                        None if all => contacts.list_all_contacts().await,
                        None => {
                            let query = limit.map(|n| ListQuery::new().page_size(n));
                            contacts.list_contacts(query).await
                        }
                    }
                })
                .await?;
            printer.emit(&response, |data| {
                render_lines(data, "No contacts", Render::render)
            })
        }
        ContactsCommand::Get { id } => {
            let response = printer.spin("Loading contact", contacts.get_by_id(&id)).await?;
            printer.emit(&response, Render::render)
        }
        ContactsCommand::Create(args) => {
            let draft = ContactDraft::from(args);
            let response = contacts.create_contact(&draft).await?;
            printer.emit(&response, |c| format!("{} {}", "Created".green(), c.render()))
        }
        ContactsCommand::Update { id, fields } => {
            let draft = ContactDraft::from(fields);
            let response = contacts.update_contact(&id, &draft).await?;
            printer.emit(&response, |c| format!("{} {}", "Updated".yellow(), c.render()))
        }
        ContactsCommand::Delete { id, yes } => {
            if !confirm_delete("contact", &id, yes || printer.json)? {
                return Ok(());
            }
            let response = contacts.delete(&id).await?;
            printer.emit(&response, Render::render)
        }
    }
}
