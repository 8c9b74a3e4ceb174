//! In-process stand-in for the record store, served with axum.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use airdesk_core::config::{DEFAULT_MAX_PAGES, DEFAULT_VIEW, Settings, Tables};
use airdesk_core::Airdesk;
use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode, header::AUTHORIZATION};
use axum::routing::get;
use axum::{Json, Router};
use serde_json::{Value, json};

pub const BASE_PATH: &str = "/v0/appTEST";
pub const API_KEY: &str = "patTESTKEY";

type Reply = (StatusCode, Json<Value>);

/// A request as the mock saw it.
#[derive(Debug, Clone)]
pub struct Seen {
    pub method: &'static str,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub authorization: Option<String>,
    pub body: Option<Value>,
}

impl Seen {
    pub fn param(&self, key: &str) -> Option<&str> {
        param(&self.query, key)
    }
}

#[derive(Default)]
pub struct MockBase {
    tables: HashMap<String, Vec<Value>>,
    requests: Vec<Seen>,
    next_id: usize,
}

impl MockBase {
    fn new_id(&mut self) -> String {
        self.next_id += 1;
        format!("recMOCK{:010}", self.next_id)
    }

    fn log(
        &mut self,
        method: &'static str,
        path: String,
        query: Vec<(String, String)>,
        headers: &HeaderMap,
        body: Option<Value>,
    ) {
        self.requests.push(Seen {
            method,
            path,
            query,
            authorization: headers
                .get(AUTHORIZATION)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string),
            body,
        });
    }

    fn find_mut(&mut self, table: &str, id: &str) -> Option<&mut Value> {
        self.tables
            .get_mut(table)?
            .iter_mut()
            .find(|r| r["id"] == id)
    }
}

#[derive(Clone, Default)]
pub struct Mock {
    base: Arc<Mutex<MockBase>>,
    pub api_url: String,
}

impl Mock {
    pub async fn start() -> Self {
        let base: Arc<Mutex<MockBase>> = Arc::default();

        let app = Router::new()
            .route(
                &format!("{BASE_PATH}/{{table}}"),
                get(list_records).post(create_records).patch(update_records),
            )
            .route(
                &format!("{BASE_PATH}/{{table}}/{{id}}"),
                get(get_record).delete(delete_record),
            )
            .with_state(base.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Mock {
            base,
            api_url: format!("http://{addr}{BASE_PATH}"),
        }
    }

    /// Insert a record with the given id and fields.
    pub fn seed(&self, table: &str, id: &str, fields: Value) {
        self.base
            .lock()
            .unwrap()
            .tables
            .entry(table.to_string())
            .or_default()
            .push(json!({
                "id": id,
                "createdTime": "2025-01-01T00:00:00.000Z",
                "fields": fields,
            }));
    }

    pub fn requests(&self) -> Vec<Seen> {
        self.base.lock().unwrap().requests.clone()
    }

    pub fn settings(&self) -> Settings {
        Settings {
            api_url: self.api_url.clone(),
            api_key: API_KEY.to_string(),
            view: DEFAULT_VIEW.to_string(),
            page_size: 100,
            max_pages: DEFAULT_MAX_PAGES,
            tables: Tables::default(),
        }
    }

    pub fn airdesk(&self) -> Airdesk {
        Airdesk::from_settings(self.settings()).unwrap()
    }
}

pub fn record_id(n: usize) -> String {
    format!("rec{n:014}")
}

fn param<'a>(query: &'a [(String, String)], key: &str) -> Option<&'a str> {
    query
        .iter()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.as_str())
}

fn not_found() -> Reply {
    (StatusCode::NOT_FOUND, Json(json!({ "error": "NOT_FOUND" })))
}

async fn list_records(
    State(base): State<Arc<Mutex<MockBase>>>,
    Path(table): Path<String>,
    Query(query): Query<Vec<(String, String)>>,
    headers: HeaderMap,
) -> Reply {
    let mut base = base.lock().unwrap();
    base.log("GET", format!("/{table}"), query.clone(), &headers, None);

    if param(&query, "filterByFormula").is_some_and(|f| f.contains("#broken")) {
        return (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(json!({
                "error": {
                    "type": "INVALID_FILTER_BY_FORMULA",
                    "message": "The formula for filtering records is invalid"
                }
            })),
        );
    }

    let records = base.tables.get(&table).cloned().unwrap_or_default();
    let size: usize = param(&query, "pageSize")
        .and_then(|s| s.parse().ok())
        .unwrap_or(100);
    let start: usize = param(&query, "offset")
        .and_then(|o| o.strip_prefix("itr"))
        .and_then(|n| n.parse().ok())
        .unwrap_or(0)
        .min(records.len());
    let end = (start + size).min(records.len());

    let mut body = json!({ "records": records[start..end].to_vec() });
    if end < records.len() {
        body["offset"] = json!(format!("itr{end}"));
    }
    (StatusCode::OK, Json(body))
}

async fn get_record(
    State(base): State<Arc<Mutex<MockBase>>>,
    Path((table, id)): Path<(String, String)>,
    headers: HeaderMap,
) -> Reply {
    let mut base = base.lock().unwrap();
    base.log("GET", format!("/{table}/{id}"), Vec::new(), &headers, None);

    match base.find_mut(&table, &id) {
        Some(record) => (StatusCode::OK, Json(record.clone())),
        None => not_found(),
    }
}

async fn create_records(
    State(base): State<Arc<Mutex<MockBase>>>,
    Path(table): Path<String>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Reply {
    let mut base = base.lock().unwrap();
    base.log("POST", format!("/{table}"), Vec::new(), &headers, Some(body.clone()));

    let mut fields = body["records"][0]["fields"].clone();
    let number = base.next_id + 1;
    if table == "appointments" {
        fields["appointment_id"] = json!(number);
    }

    let record = json!({
        "id": base.new_id(),
        "createdTime": "2025-02-01T00:00:00.000Z",
        "fields": fields,
    });
    base.tables.entry(table).or_default().push(record.clone());
    (StatusCode::OK, Json(json!({ "records": [record] })))
}

async fn update_records(
    State(base): State<Arc<Mutex<MockBase>>>,
    Path(table): Path<String>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Reply {
    let mut base = base.lock().unwrap();
    base.log("PATCH", format!("/{table}"), Vec::new(), &headers, Some(body.clone()));

    let patch = &body["records"][0];
    let Some(id) = patch["id"].as_str() else {
        return (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(json!({ "error": { "type": "INVALID_RECORDS", "message": "missing id" } })),
        );
    };
    let Some(record) = base.find_mut(&table, id) else {
        return not_found();
    };

    if let (Some(target), Some(changes)) =
        (record["fields"].as_object_mut(), patch["fields"].as_object())
    {
        for (k, v) in changes {
            target.insert(k.clone(), v.clone());
        }
    }
    let record = record.clone();
    (StatusCode::OK, Json(json!({ "records": [record] })))
}

async fn delete_record(
    State(base): State<Arc<Mutex<MockBase>>>,
    Path((table, id)): Path<(String, String)>,
    headers: HeaderMap,
) -> Reply {
    let mut base = base.lock().unwrap();
    base.log("DELETE", format!("/{table}/{id}"), Vec::new(), &headers, None);

    let Some(records) = base.tables.get_mut(&table) else {
        return not_found();
    };
    let before = records.len();
    records.retain(|r| r["id"] != id.as_str());
    if records.len() == before {
        return not_found();
    }
    (StatusCode::OK, Json(json!({ "id": id, "deleted": true })))
}
