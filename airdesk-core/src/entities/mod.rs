//! Entity schemas: table, writable fields and typed record shape.

pub mod agent;
pub mod appointment;
pub mod contact;

use serde::de::DeserializeOwned;

use crate::config::Tables;

pub use agent::Agent;
pub use appointment::{Appointment, AppointmentDraft, AppointmentStatus};
pub use contact::{Contact, ContactDraft};

/// A table of the base, described as configuration rather than behavior.
pub trait Entity: DeserializeOwned {
    /// Name used in log lines.
    const NAME: &'static str;

    /// Fields clients may write. Everything else is computed server-side.
    const MANUAL_FIELDS: &'static [&'static str];

    /// Manual fields holding linked record ids.
    const LINK_FIELDS: &'static [&'static str] = &[];

    fn table(tables: &Tables) -> &str;
}
