//! Typed client for a contacts/agents/appointments base hosted on Airtable.
//!
//! - `client` and `paginate` talk to the REST API
//! - `service` is the generic CRUD facade, with per-table extras in `entities`
//! - `formula` turns appointment filters into `filterByFormula` strings
//! - `store` caches agents for badge colors, initials and display names

pub mod airdesk;
pub mod client;
pub mod config;
pub mod entities;
pub mod error;
pub mod formula;
pub mod paginate;
pub mod query;
pub mod record;
pub mod response;
pub mod service;
pub mod store;

pub use airdesk::Airdesk;
pub use client::AirtableClient;
pub use config::Settings;
pub use entities::{
    Agent, Appointment, AppointmentDraft, AppointmentStatus, Contact, ContactDraft, Entity,
};
pub use error::{AirdeskError, AirdeskResult};
pub use formula::{AppointmentFilter, DateRange};
pub use query::{ListQuery, Sort, SortDirection};
pub use record::{DeletedRecord, Record};
pub use response::ApiResponse;
pub use service::EntityService;
pub use store::{AgentDirectory, AgentRef, BadgeStyle};
