//! Appointments: a visit at an address, linked to contacts and agents.
//!
//! Status is never stored. It is derived at read time from `is_cancelled`
//! and `appointment_date` against the caller's clock.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::Entity;
use super::contact::join_name;
use crate::config::Tables;
use crate::error::{AirdeskError, AirdeskResult};
use crate::formula::AppointmentFilter;
use crate::query::Sort;
use crate::record::{first_of_many, lenient_datetime, one_or_many, valid_ids, valid_record_ids};
use crate::response::ApiResponse;
use crate::service::{EntityService, json_kind, require_id};
use crate::store::AgentRef;

pub mod fields {
    // Manual
    pub const ADDRESS: &str = "appointment_address";
    pub const DATE: &str = "appointment_date";
    pub const IS_CANCELLED: &str = "is_cancelled";
    /// Linked contact records.
    pub const CONTACT_IDS: &str = "contact_id";
    /// Linked agent records.
    pub const AGENT_IDS: &str = "agent_id";

    // Computed
    pub const NUMBER: &str = "appointment_id";
    pub const CONTACT_NAME: &str = "contact_name";
    pub const CONTACT_SURNAME: &str = "contact_surname";
    pub const CONTACT_EMAIL: &str = "contact_email";
    pub const CONTACT_PHONE: &str = "contact_phone";
    pub const AGENT_NAME: &str = "agent_name";
    pub const AGENT_SURNAME: &str = "agent_surname";
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AppointmentStatus {
    Upcoming,
    Completed,
    Cancelled,
}

impl AppointmentStatus {
    /// Cancelled wins; otherwise a date strictly after `now` is upcoming.
    /// An appointment without a date has not happened yet.
    pub fn derive(is_cancelled: bool, date: Option<DateTime<Utc>>, now: DateTime<Utc>) -> Self {
        if is_cancelled {
            return AppointmentStatus::Cancelled;
        }
        match date {
            Some(d) if d <= now => AppointmentStatus::Completed,
            _ => AppointmentStatus::Upcoming,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AppointmentStatus::Upcoming => "upcoming",
            AppointmentStatus::Completed => "completed",
            AppointmentStatus::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AppointmentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "upcoming" => Ok(AppointmentStatus::Upcoming),
            "completed" => Ok(AppointmentStatus::Completed),
            "cancelled" | "canceled" => Ok(AppointmentStatus::Cancelled),
            other => Err(format!(
                "Unknown status '{other}'. Expected upcoming, completed or cancelled"
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Appointment {
    pub id: String,
    #[serde(rename = "createdTime", default)]
    pub created_time: Option<String>,
    #[serde(rename = "appointment_id", default)]
    pub number: Option<Value>,
    #[serde(rename = "appointment_address", default)]
    pub address: Option<String>,
    #[serde(rename = "appointment_date", default, deserialize_with = "lenient_datetime")]
    pub date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub is_cancelled: bool,
    #[serde(rename = "contact_id", default, deserialize_with = "one_or_many")]
    pub contact_ids: Vec<String>,
    #[serde(rename = "agent_id", default, deserialize_with = "one_or_many")]
    pub agent_ids: Vec<String>,
    #[serde(default, deserialize_with = "first_of_many")]
    pub contact_name: Option<String>,
    #[serde(default, deserialize_with = "first_of_many")]
    pub contact_surname: Option<String>,
    #[serde(default, deserialize_with = "first_of_many")]
    pub contact_email: Option<String>,
    #[serde(default, deserialize_with = "first_of_many")]
    pub contact_phone: Option<String>,
    #[serde(rename = "agent_name", default, deserialize_with = "one_or_many")]
    pub agent_names: Vec<String>,
    #[serde(rename = "agent_surname", default, deserialize_with = "one_or_many")]
    pub agent_surnames: Vec<String>,
}

impl Entity for Appointment {
    const NAME: &'static str = "appointment";
    const MANUAL_FIELDS: &'static [&'static str] = &[
        fields::ADDRESS,
        fields::DATE,
        fields::IS_CANCELLED,
        fields::CONTACT_IDS,
        fields::AGENT_IDS,
    ];
    const LINK_FIELDS: &'static [&'static str] = &[fields::CONTACT_IDS, fields::AGENT_IDS];

    fn table(tables: &Tables) -> &str {
        &tables.appointments
    }
}

impl Appointment {
    pub fn status(&self, now: DateTime<Utc>) -> AppointmentStatus {
        AppointmentStatus::derive(self.is_cancelled, self.date, now)
    }

    pub fn contact_full_name(&self) -> String {
        join_name(self.contact_name.as_deref(), self.contact_surname.as_deref())
    }

    /// Assigned agents, pairing the lookup names by position.
    pub fn agents(&self) -> Vec<AgentRef> {
        let count = self.agent_ids.len().max(self.agent_names.len());
        (0..count)
            .map(|i| AgentRef {
                code: None,
                name: self.agent_names.get(i).cloned(),
                surname: self.agent_surnames.get(i).cloned(),
                color: None,
            })
            .collect()
    }
}

/// Input for creating or editing an appointment.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppointmentDraft {
    pub address: Option<String>,
    pub date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub contact_ids: Vec<String>,
    /// `None` on update clears the assignment.
    pub agent_ids: Option<Vec<String>>,
    pub is_cancelled: Option<bool>,
}

impl AppointmentDraft {
    fn base_fields(&self) -> Map<String, Value> {
        let mut out = Map::new();

        if let Some(address) = self.address.as_deref().map(str::trim).filter(|a| !a.is_empty()) {
            out.insert(fields::ADDRESS.into(), Value::String(address.to_string()));
        }
        if let Some(date) = self.date {
            out.insert(
                fields::DATE.into(),
                Value::String(date.to_rfc3339_opts(SecondsFormat::Millis, true)),
            );
        }

        let contacts = valid_ids(self.contact_ids.iter().map(String::as_str));
        if !contacts.is_empty() {
            out.insert(fields::CONTACT_IDS.into(), ids_value(contacts));
        }

        if let Some(cancelled) = self.is_cancelled {
            out.insert(fields::IS_CANCELLED.into(), Value::Bool(cancelled));
        }

        out
    }

    fn valid_agents(&self) -> Vec<String> {
        self.agent_ids
            .as_deref()
            .map(|ids| valid_ids(ids.iter().map(String::as_str)))
            .unwrap_or_default()
    }

    /// Fields for a new record. Date and address are required.
    pub fn to_create_fields(&self) -> AirdeskResult<Map<String, Value>> {
        let mut out = self.base_fields();

        let missing: Vec<&str> = [fields::DATE, fields::ADDRESS]
            .into_iter()
            .filter(|f| !out.contains_key(*f))
            .collect();
        if !missing.is_empty() {
            return Err(AirdeskError::validation(format!(
                "Missing required fields: {}",
                missing.join(", ")
            )));
        }

        let agents = self.valid_agents();
        if !agents.is_empty() {
            out.insert(fields::AGENT_IDS.into(), ids_value(agents));
        }

        Ok(out)
    }

    /// Fields for a patch. The agent assignment is always sent, empty when
    /// no valid agent ids remain.
    pub fn to_update_fields(&self) -> Map<String, Value> {
        let mut out = self.base_fields();
        out.insert(fields::AGENT_IDS.into(), ids_value(self.valid_agents()));
        out
    }
}

fn ids_value(ids: Vec<String>) -> Value {
    Value::Array(ids.into_iter().map(Value::String).collect())
}

impl EntityService<Appointment> {
    /// Every appointment matching `filter`, newest first.
    pub async fn list_appointments(
        &self,
        filter: &AppointmentFilter,
    ) -> AirdeskResult<ApiResponse<Vec<Appointment>>> {
        let query = self
            .default_query()
            .formula(filter.to_formula())
            .sort(Sort::desc(fields::DATE));
        tracing::debug!(formula = ?query.filter_by_formula, "listing appointments");
        self.list_all(Some(query)).await
    }

    pub async fn create_appointment(
        &self,
        draft: &AppointmentDraft,
    ) -> AirdeskResult<ApiResponse<Appointment>> {
        let fields = draft.to_create_fields()?;
        self.create_fields(fields).await
    }

    pub async fn update_appointment(
        &self,
        id: &str,
        draft: &AppointmentDraft,
    ) -> AirdeskResult<ApiResponse<Appointment>> {
        let id = require_id(id)?;
        self.update_fields(id, draft.to_update_fields()).await
    }

    pub async fn cancel_appointment(&self, id: &str) -> AirdeskResult<ApiResponse<Appointment>> {
        let id = require_id(id)?;
        let mut fields = Map::new();
        fields.insert(fields::IS_CANCELLED.into(), Value::Bool(true));
        self.update_fields(id, fields).await
    }

    /// Replace the agent assignment. `agents` must be an array of record ids;
    /// malformed entries are dropped.
    pub async fn assign_agents(
        &self,
        id: &str,
        agents: Value,
    ) -> AirdeskResult<ApiResponse<Appointment>> {
        let id = require_id(id)?;
        if !agents.is_array() {
            return Err(AirdeskError::validation(format!(
                "Agents must be an array, got {}",
                json_kind(&agents)
            )));
        }

        let mut fields = Map::new();
        fields.insert(
            fields::AGENT_IDS.into(),
            ids_value(valid_record_ids(&agents)),
        );
        self.update_fields(id, fields).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::Record;
    use chrono::TimeZone;
    use serde_json::json;

    const CONTACT: &str = "recCCCCCCCCCCCCCC";
    const AGENT_A: &str = "recAAAAAAAAAAAAAA";
    const AGENT_B: &str = "recBBBBBBBBBBBBBB";

    fn at(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap()
    }

    #[test]
    fn test_status_derivation() {
        let now = at(2025, 6, 1, 12);
        assert_eq!(
            AppointmentStatus::derive(true, Some(at(2030, 1, 1, 0)), now),
            AppointmentStatus::Cancelled
        );
        assert_eq!(
            AppointmentStatus::derive(false, Some(at(2025, 6, 1, 13)), now),
            AppointmentStatus::Upcoming
        );
        assert_eq!(
            AppointmentStatus::derive(false, Some(at(2025, 6, 1, 11)), now),
            AppointmentStatus::Completed
        );
        assert_eq!(
            AppointmentStatus::derive(false, Some(now), now),
            AppointmentStatus::Completed
        );
        assert_eq!(
            AppointmentStatus::derive(false, None, now),
            AppointmentStatus::Upcoming
        );
    }

    #[test]
    fn test_status_from_str() {
        assert_eq!("Upcoming".parse::<AppointmentStatus>(), Ok(AppointmentStatus::Upcoming));
        assert_eq!("canceled".parse::<AppointmentStatus>(), Ok(AppointmentStatus::Cancelled));
        assert!("soon".parse::<AppointmentStatus>().is_err());
    }

    #[test]
    fn test_decode_with_lookups() {
        let record: Record = serde_json::from_value(json!({
            "id": "rec11111111111111",
            "createdTime": "2025-01-01T00:00:00.000Z",
            "fields": {
                "appointment_id": 7,
                "appointment_address": "221B Baker Street",
                "appointment_date": "2025-03-20T15:00:00.000Z",
                "contact_id": [CONTACT],
                "agent_id": [AGENT_A, AGENT_B],
                "contact_name": ["Ada"],
                "contact_surname": ["Lovelace"],
                "contact_email": ["ada@example.com"],
                "agent_name": ["Grace", "Alan"],
                "agent_surname": ["Hopper", "Turing"]
            }
        }))
        .unwrap();

        let appt: Appointment = record.decode().unwrap();
        assert_eq!(appt.date, Some(at(2025, 3, 20, 15)));
        assert!(!appt.is_cancelled);
        assert_eq!(appt.contact_full_name(), "Ada Lovelace");
        assert_eq!(appt.contact_ids, vec![CONTACT]);
        assert_eq!(appt.status(at(2025, 1, 1, 0)), AppointmentStatus::Upcoming);

        let agents = appt.agents();
        assert_eq!(agents.len(), 2);
        assert_eq!(agents[1].name.as_deref(), Some("Alan"));
        assert_eq!(agents[1].surname.as_deref(), Some("Turing"));
    }

    #[test]
    fn test_create_requires_date_and_address() {
        let err = AppointmentDraft::default().to_create_fields().unwrap_err();
        assert_eq!(
            err.to_string(),
            "Missing required fields: appointment_date, appointment_address"
        );

        let err = AppointmentDraft {
            date: Some(at(2025, 3, 20, 15)),
            address: Some("   ".into()),
            ..Default::default()
        }
        .to_create_fields()
        .unwrap_err();
        assert_eq!(err.error_type(), "ValidationError");
    }

    #[test]
    fn test_create_fields_filter_ids() {
        let draft = AppointmentDraft {
            address: Some("221B Baker Street".into()),
            date: Some(at(2025, 3, 20, 15)),
            contact_ids: vec![CONTACT.into(), "bogus".into()],
            agent_ids: Some(vec![AGENT_A.into(), "".into(), "recShort".into()]),
            is_cancelled: None,
        };

        let fields = draft.to_create_fields().unwrap();
        assert_eq!(fields["appointment_date"], "2025-03-20T15:00:00.000Z");
        assert_eq!(fields["contact_id"], json!([CONTACT]));
        assert_eq!(fields["agent_id"], json!([AGENT_A]));
        assert!(!fields.contains_key("is_cancelled"));
    }

    #[test]
    fn test_create_omits_agents_when_none_valid() {
        let draft = AppointmentDraft {
            address: Some("x".into()),
            date: Some(at(2025, 3, 20, 15)),
            contact_ids: vec!["bad".into()],
            agent_ids: Some(vec!["bad".into()]),
            is_cancelled: Some(false),
        };
        let fields = draft.to_create_fields().unwrap();
        assert!(!fields.contains_key("agent_id"));
        assert!(!fields.contains_key("contact_id"));
        assert_eq!(fields["is_cancelled"], false);
    }

    #[test]
    fn test_update_always_sends_agents() {
        let draft = AppointmentDraft {
            address: Some("New address".into()),
            ..Default::default()
        };
        let fields = draft.to_update_fields();
        assert_eq!(fields["agent_id"], json!([]));
        assert_eq!(fields["appointment_address"], "New address");
        assert!(!fields.contains_key("appointment_date"));

        let draft = AppointmentDraft {
            agent_ids: Some(vec![AGENT_B.into(), "nope".into()]),
            ..Default::default()
        };
        assert_eq!(draft.to_update_fields()["agent_id"], json!([AGENT_B]));
    }
}
