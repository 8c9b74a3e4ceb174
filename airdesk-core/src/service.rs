//! Generic CRUD facade shared by every entity.
//!
//! One `EntityService<E>` per table. Entity-specific operations live next to
//! their entity in `crate::entities` as extra `impl EntityService<E>` blocks.

use std::marker::PhantomData;

use serde_json::{Map, Value};

use crate::client::AirtableClient;
use crate::config::Settings;
use crate::entities::Entity;
use crate::error::{AirdeskError, AirdeskResult};
use crate::paginate::Paginator;
use crate::query::ListQuery;
use crate::record::{DeletedRecord, Record, valid_record_ids};
use crate::response::ApiResponse;

pub struct EntityService<E> {
    client: AirtableClient,
    table: String,
    view: String,
    page_size: u32,
    max_pages: usize,
    entity: PhantomData<fn() -> E>,
}

impl<E> Clone for EntityService<E> {
    fn clone(&self) -> Self {
        Self {
            client: self.client.clone(),
            table: self.table.clone(),
            view: self.view.clone(),
            page_size: self.page_size,
            max_pages: self.max_pages,
            entity: PhantomData,
        }
    }
}

impl<E: Entity> EntityService<E> {
    pub fn new(client: AirtableClient, settings: &Settings) -> Self {
        Self {
            client,
            table: E::table(&settings.tables).to_string(),
            view: settings.view.clone(),
            page_size: settings.effective_page_size(),
            max_pages: settings.max_pages,
            entity: PhantomData,
        }
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    /// Query bound to the configured view.
    pub fn default_query(&self) -> ListQuery {
        ListQuery::new().view(self.view.clone())
    }

    /// `query` (or an empty one) with the configured view filled in when unset.
    pub(crate) fn with_default_view(&self, query: Option<ListQuery>) -> ListQuery {
        let mut query = query.unwrap_or_default();
        if query.view.is_none() {
            query.view = Some(self.view.clone());
        }
        query
    }

    /// One page of the table. With no query the server's defaults apply.
    pub async fn list(&self, query: Option<ListQuery>) -> AirdeskResult<ApiResponse<Vec<E>>> {
        let query = query.unwrap_or_default();
        let response = self.client.list_page(&self.table, &query).await?;
        response.try_map(|page| decode_all(page.records))
    }

    /// Every record, following continuation offsets.
    pub async fn list_all(&self, query: Option<ListQuery>) -> AirdeskResult<ApiResponse<Vec<E>>> {
        let mut query = query.unwrap_or_else(|| self.default_query());
        if query.page_size.is_none() {
            query = query.page_size(self.page_size);
        }

        let response = Paginator::new(&self.client, self.max_pages)
            .fetch_all(&self.table, &query)
            .await?;
        response.try_map(decode_all)
    }

    pub async fn get_by_id(&self, id: &str) -> AirdeskResult<ApiResponse<E>> {
        let id = require_id(id)?;
        let response = self.client.get_record(&self.table, id).await?;
        response.try_map(Record::decode)
    }

    /// Create one record. Keys outside the entity's manual fields are dropped.
    pub async fn create(&self, fields: Value) -> AirdeskResult<ApiResponse<E>> {
        let fields = require_object(fields)?;
        self.create_fields(fields).await
    }

    /// Partial update of one record. Keys outside the entity's manual fields are dropped.
    pub async fn update(&self, id: &str, fields: Value) -> AirdeskResult<ApiResponse<E>> {
        let id = require_id(id)?;
        let fields = require_object(fields)?;
        self.update_fields(id, fields).await
    }

    pub async fn delete(&self, id: &str) -> AirdeskResult<ApiResponse<DeletedRecord>> {
        let id = require_id(id)?;
        self.client.delete_record(&self.table, id).await
    }

    pub(crate) async fn create_fields(
        &self,
        fields: Map<String, Value>,
    ) -> AirdeskResult<ApiResponse<E>> {
        let fields = manual_fields_only::<E>(fields);
        let response = self.client.create_record(&self.table, &fields).await?;
        response.try_map(Record::decode)
    }

    pub(crate) async fn update_fields(
        &self,
        id: &str,
        fields: Map<String, Value>,
    ) -> AirdeskResult<ApiResponse<E>> {
        let fields = manual_fields_only::<E>(fields);
        let response = self.client.update_record(&self.table, id, &fields).await?;
        response.try_map(Record::decode)
    }
}

fn decode_all<E: Entity>(records: Vec<Record>) -> AirdeskResult<Vec<E>> {
    records.into_iter().map(Record::decode).collect()
}

pub(crate) fn require_id(id: &str) -> AirdeskResult<&str> {
    let id = id.trim();
    if id.is_empty() {
        return Err(AirdeskError::validation("ID is required"));
    }
    Ok(id)
}

fn require_object(fields: Value) -> AirdeskResult<Map<String, Value>> {
    match fields {
        Value::Object(map) => Ok(map),
        other => Err(AirdeskError::validation(format!(
            "Invalid data provided: expected an object of fields, got {}",
            json_kind(&other)
        ))),
    }
}

pub(crate) fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Drop every key the entity doesn't accept as direct input, and every
/// malformed record id from its link fields.
pub fn manual_fields_only<E: Entity>(mut fields: Map<String, Value>) -> Map<String, Value> {
    fields.retain(|key, _| {
        let keep = E::MANUAL_FIELDS.contains(&key.as_str());
        if !keep {
            tracing::warn!(entity = E::NAME, field = %key, "stripping non-writable field");
        }
        keep
    });

    for &link in E::LINK_FIELDS {
        if let Some(value) = fields.get_mut(link) {
            let ids = valid_record_ids(value);
            *value = Value::Array(ids.into_iter().map(Value::String).collect());
        }
    }
    fields
}
