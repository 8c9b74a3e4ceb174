//! Record-store wire types.
//!
//! The record store serves schema-less records shaped like
//! `{"id": "rec…", "createdTime": "…", "fields": {…}}`. Typed entities are
//! decoded from the flattened form `{"id", "createdTime", ...fields}`.

use chrono::{DateTime, NaiveDate, Utc};
use serde::de::{self, DeserializeOwned};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::error::{AirdeskError, AirdeskResult};

/// Record ids are `rec` followed by at least 14 characters.
const RECORD_ID_PREFIX: &str = "rec";
const RECORD_ID_MIN_LEN: usize = 17;

/// Whether `id` looks like a record id issued by the record store.
pub fn is_record_id(id: &str) -> bool {
    id.starts_with(RECORD_ID_PREFIX) && id.len() >= RECORD_ID_MIN_LEN
}

/// Keep only well-formed record ids, in order.
pub fn valid_ids<'a>(ids: impl IntoIterator<Item = &'a str>) -> Vec<String> {
    ids.into_iter()
        .map(str::trim)
        .filter(|id| {
            let ok = is_record_id(id);
            if !ok && !id.is_empty() {
                tracing::warn!(id = %id, "dropping malformed record id");
            }
            ok
        })
        .map(str::to_string)
        .collect()
}

/// [`valid_ids`] over untyped input: a single string or an array.
/// Nulls and non-strings are dropped.
pub fn valid_record_ids(value: &Value) -> Vec<String> {
    match value {
        Value::Array(items) => valid_ids(items.iter().filter_map(Value::as_str)),
        Value::String(s) => valid_ids([s.as_str()]),
        _ => Vec::new(),
    }
}

/// A record as returned by the record store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Record {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_time: Option<String>,
    #[serde(default)]
    pub fields: Map<String, Value>,
}

impl Record {
    /// `{"id", "createdTime", ...fields}`. Record metadata wins over same-named fields.
    pub fn flatten(self) -> Value {
        let mut flat = self.fields;
        flat.insert("id".into(), Value::String(self.id));
        if let Some(created) = self.created_time {
            flat.insert("createdTime".into(), Value::String(created));
        }
        Value::Object(flat)
    }

    /// Decode the flattened record into a typed entity.
    pub fn decode<E: DeserializeOwned>(self) -> AirdeskResult<E> {
        let id = self.id.clone();
        serde_json::from_value(self.flatten())
            .map_err(|e| AirdeskError::Decode(format!("record {id}: {e}")))
    }
}

/// One page of a list response.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RecordPage {
    #[serde(default)]
    pub records: Vec<Record>,
    /// Continuation token; absent on the last page.
    #[serde(default)]
    pub offset: Option<String>,
}

/// Batch write response.
#[derive(Debug, Clone, Deserialize)]
pub struct RecordBatch {
    pub records: Vec<Record>,
}

/// Acknowledgement for a deleted record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeletedRecord {
    pub id: String,
    pub deleted: bool,
}

/// Body for a batch create.
#[derive(Debug, Serialize)]
pub(crate) struct CreateBody<'a> {
    pub records: [NewRecord<'a>; 1],
}

#[derive(Debug, Serialize)]
pub(crate) struct NewRecord<'a> {
    pub fields: &'a Map<String, Value>,
}

/// Body for a batch partial update.
#[derive(Debug, Serialize)]
pub(crate) struct UpdateBody<'a> {
    pub records: [RecordPatch<'a>; 1],
}

#[derive(Debug, Serialize)]
pub(crate) struct RecordPatch<'a> {
    pub id: &'a str,
    pub fields: &'a Map<String, Value>,
}

/// Lookup and rollup fields arrive as arrays; plain text fields as scalars.
/// Accept either and always produce a `Vec`.
pub fn one_or_many<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany<T> {
        Many(Vec<T>),
        One(T),
        Null(()),
    }

    Ok(match OneOrMany::<T>::deserialize(deserializer)? {
        OneOrMany::Many(items) => items,
        OneOrMany::One(item) => vec![item],
        OneOrMany::Null(()) => Vec::new(),
    })
}

/// Counterpart of [`one_or_many`] for fields the UI treats as a single value.
pub fn first_of_many<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(one_or_many(deserializer)?.into_iter().next())
}

/// Date fields hold either a full timestamp or, without a time component,
/// a bare `YYYY-MM-DD`. The latter is read as midnight UTC. Blank is `None`.
pub fn lenient_datetime<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let Some(raw) = Option::<String>::deserialize(deserializer)? else {
        return Ok(None);
    };
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(Some(dt.with_timezone(&Utc)));
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| Some(naive.and_utc()))
        .ok_or_else(|| de::Error::custom(format!("invalid date '{raw}'")))
}
