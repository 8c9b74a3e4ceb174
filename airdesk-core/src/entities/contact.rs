use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::Entity;
use crate::config::Tables;
use crate::error::AirdeskResult;
use crate::formula::search_clause;
use crate::query::{ListQuery, Sort};
use crate::response::ApiResponse;
use crate::service::EntityService;

pub mod fields {
    /// Autonumber, computed.
    pub const NUMBER: &str = "contact_id";
    pub const NAME: &str = "contact_name";
    pub const SURNAME: &str = "contact_surname";
    pub const EMAIL: &str = "contact_email";
    pub const PHONE: &str = "contact_phone";
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contact {
    pub id: String,
    #[serde(rename = "createdTime", default)]
    pub created_time: Option<String>,
    #[serde(rename = "contact_id", default)]
    pub number: Option<Value>,
    #[serde(rename = "contact_name", default)]
    pub name: Option<String>,
    #[serde(rename = "contact_surname", default)]
    pub surname: Option<String>,
    #[serde(rename = "contact_email", default)]
    pub email: Option<String>,
    #[serde(rename = "contact_phone", default)]
    pub phone: Option<String>,
}

impl Entity for Contact {
    const NAME: &'static str = "contact";
    const MANUAL_FIELDS: &'static [&'static str] =
        &[fields::NAME, fields::SURNAME, fields::EMAIL, fields::PHONE];

    fn table(tables: &Tables) -> &str {
        &tables.contacts
    }
}

impl Contact {
    pub fn full_name(&self) -> String {
        join_name(self.name.as_deref(), self.surname.as_deref())
    }
}

/// "First Last", skipping blank parts.
pub(crate) fn join_name(first: Option<&str>, last: Option<&str>) -> String {
    [first, last]
        .into_iter()
        .flatten()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Input for creating or editing a contact. `None` leaves a field untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContactDraft {
    pub name: Option<String>,
    pub surname: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
}

impl ContactDraft {
    pub fn to_fields(&self) -> Map<String, Value> {
        let mut out = Map::new();
        for (key, value) in [
            (fields::NAME, &self.name),
            (fields::SURNAME, &self.surname),
            (fields::EMAIL, &self.email),
            (fields::PHONE, &self.phone),
        ] {
            if let Some(v) = value {
                out.insert(key.into(), Value::String(v.trim().to_string()));
            }
        }
        out
    }
}

impl EntityService<Contact> {
    /// One page through the configured view, with caller overrides.
    pub async fn list_contacts(
        &self,
        query: Option<ListQuery>,
    ) -> AirdeskResult<ApiResponse<Vec<Contact>>> {
        self.list(Some(self.with_default_view(query))).await
    }

    /// Every contact, restricted to the contact fields.
    pub async fn list_all_contacts(&self) -> AirdeskResult<ApiResponse<Vec<Contact>>> {
        let query = self.default_query().fields([
            fields::NUMBER,
            fields::NAME,
            fields::SURNAME,
            fields::EMAIL,
            fields::PHONE,
        ]);
        self.list_all(Some(query)).await
    }

    /// Case-insensitive substring match over name and email.
    pub async fn search_contacts(&self, text: &str) -> AirdeskResult<ApiResponse<Vec<Contact>>> {
        let needle = text.trim().to_lowercase();
        if needle.is_empty() {
            return self.list_all_contacts().await;
        }

        let query = self
            .default_query()
            .formula(Some(search_clause(&needle, &[fields::NAME, fields::EMAIL])))
            .sort(Sort::asc(fields::NAME));
        self.list_all(Some(query)).await
    }

    pub async fn create_contact(&self, draft: &ContactDraft) -> AirdeskResult<ApiResponse<Contact>> {
        self.create_fields(draft.to_fields()).await
    }

    pub async fn update_contact(
        &self,
        id: &str,
        draft: &ContactDraft,
    ) -> AirdeskResult<ApiResponse<Contact>> {
        let id = crate::service::require_id(id)?;
        self.update_fields(id, draft.to_fields()).await
    }
}
