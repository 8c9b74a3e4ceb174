//! HTTP client for the record-store REST API.
//!
//! Every request carries the static bearer token from [`Settings`]. Responses
//! are normalized into [`ApiResponse`]; failures into [`AirdeskError`]. Nothing
//! is retried.

use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use reqwest::{RequestBuilder, Response};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use url::Url;

use crate::config::Settings;
use crate::error::{AirdeskError, AirdeskResult};
use crate::query::ListQuery;
use crate::record::{
    CreateBody, DeletedRecord, NewRecord, Record, RecordBatch, RecordPage, RecordPatch, UpdateBody,
};
use crate::response::ApiResponse;

/// Authenticated client bound to one base.
#[derive(Clone)]
pub struct AirtableClient {
    http: reqwest::Client,
    base_url: Url,
}

/// `{"error": {"type": "...", "message": "..."}}` or `{"error": "NOT_FOUND"}`
#[derive(Deserialize)]
struct ErrorBody {
    error: RemoteError,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RemoteError {
    Detailed {
        #[serde(rename = "type")]
        error_type: Option<String>,
        message: Option<String>,
    },
    Code(String),
}

impl AirtableClient {
    pub fn new(api_url: &str, api_key: &str) -> AirdeskResult<Self> {
        let base_url = Url::parse(api_url)
            .map_err(|e| AirdeskError::Config(format!("Invalid api_url '{api_url}': {e}")))?;
        if base_url.cannot_be_a_base() {
            return Err(AirdeskError::Config(format!(
                "api_url '{api_url}' cannot be used as a base URL"
            )));
        }

        let mut auth = HeaderValue::from_str(&format!("Bearer {api_key}"))
            .map_err(|_| AirdeskError::Config("API key contains invalid characters".into()))?;
        auth.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, auth);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .build()
            .map_err(|e| AirdeskError::Config(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self { http, base_url })
    }

    pub fn from_settings(settings: &Settings) -> AirdeskResult<Self> {
        Self::new(&settings.api_url, &settings.api_key)
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// `{base}/{table}` or `{base}/{table}/{id}`, with each segment percent-encoded.
    fn url(&self, table: &str, id: Option<&str>) -> AirdeskResult<Url> {
        let mut url = self.base_url.clone();
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|_| AirdeskError::Config("api_url cannot be a base URL".into()))?;
            segments.pop_if_empty().push(table);
            if let Some(id) = id {
                segments.push(id);
            }
        }
        Ok(url)
    }

    /// GET one page of a table.
    #[tracing::instrument(skip(self))]
    pub async fn list_page(
        &self,
        table: &str,
        query: &ListQuery,
    ) -> AirdeskResult<ApiResponse<RecordPage>> {
        let url = self.url(table, None)?;
        self.execute(self.http.get(url).query(&query.to_pairs()))
            .await
    }

    #[tracing::instrument(skip(self))]
    pub async fn get_record(&self, table: &str, id: &str) -> AirdeskResult<ApiResponse<Record>> {
        let url = self.url(table, Some(id))?;
        self.execute(self.http.get(url)).await
    }

    /// POST a single-record batch.
    #[tracing::instrument(skip(self, fields))]
    pub async fn create_record(
        &self,
        table: &str,
        fields: &Map<String, Value>,
    ) -> AirdeskResult<ApiResponse<Record>> {
        let url = self.url(table, None)?;
        let body = CreateBody {
            records: [NewRecord { fields }],
        };
        let response: ApiResponse<RecordBatch> =
            self.execute(self.http.post(url).json(&body)).await?;
        response.try_map(single_record)
    }

    /// PATCH a single record. Only the given fields change.
    #[tracing::instrument(skip(self, fields))]
    pub async fn update_record(
        &self,
        table: &str,
        id: &str,
        fields: &Map<String, Value>,
    ) -> AirdeskResult<ApiResponse<Record>> {
        let url = self.url(table, None)?;
        let body = UpdateBody {
            records: [RecordPatch { id, fields }],
        };
        let response: ApiResponse<RecordBatch> =
            self.execute(self.http.patch(url).json(&body)).await?;
        response.try_map(single_record)
    }

    #[tracing::instrument(skip(self))]
    pub async fn delete_record(
        &self,
        table: &str,
        id: &str,
    ) -> AirdeskResult<ApiResponse<DeletedRecord>> {
        let url = self.url(table, Some(id))?;
        self.execute(self.http.delete(url)).await
    }

    async fn execute<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
    ) -> AirdeskResult<ApiResponse<T>> {
        let response = request
            .send()
            .await
            .map_err(|e| AirdeskError::Network(e.to_string()))?;
        let response = map_request_error(response).await?;

        let status = response.status();
        let headers = response.headers().clone();
        let data = response
            .json::<T>()
            .await
            .map_err(|e| AirdeskError::Decode(e.to_string()))?;

        Ok(ApiResponse::new(data, status, &headers))
    }
}

fn single_record(batch: RecordBatch) -> AirdeskResult<Record> {
    batch
        .records
        .into_iter()
        .next()
        .ok_or_else(|| AirdeskError::Decode("write response contained no records".into()))
}

/// Turn a non-2xx response into [`AirdeskError::Request`].
async fn map_request_error(response: Response) -> AirdeskResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let status_text = status.canonical_reason().unwrap_or_default().to_string();
    let body = response.text().await.unwrap_or_default();
    let (error_type, message) = match serde_json::from_str::<ErrorBody>(&body) {
        Ok(ErrorBody {
            error: RemoteError::Detailed {
                error_type,
                message,
            },
        }) => (error_type, message),
        Ok(ErrorBody {
            error: RemoteError::Code(code),
        }) => (Some(code), None),
        Err(_) => (None, None),
    };

    let message = message.unwrap_or_else(|| {
        if status_text.is_empty() {
            format!("Request failed with status {}", status.as_u16())
        } else {
            status_text.clone()
        }
    });

    tracing::debug!(status = status.as_u16(), ?error_type, %message, "request rejected");

    Err(AirdeskError::Request {
        status: status.as_u16(),
        status_text,
        error_type,
        message,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_building() {
        let client = AirtableClient::new("https://api.airtable.com/v0/appTEST", "key").unwrap();
        assert_eq!(
            client.url("contacts", None).unwrap().as_str(),
            "https://api.airtable.com/v0/appTEST/contacts"
        );
        assert_eq!(
            client
                .url("My Table", Some("rec0123456789abcd"))
                .unwrap()
                .as_str(),
            "https://api.airtable.com/v0/appTEST/My%20Table/rec0123456789abcd"
        );

        let trailing = AirtableClient::new("https://api.airtable.com/v0/appTEST/", "key").unwrap();
        assert_eq!(
            trailing.url("agents", None).unwrap().as_str(),
            "https://api.airtable.com/v0/appTEST/agents"
        );
    }

    #[test]
    fn test_rejects_bad_base_url() {
        assert!(matches!(
            AirtableClient::new("not a url", "key"),
            Err(AirdeskError::Config(_))
        ));
        assert!(matches!(
            AirtableClient::new("mailto:someone@example.com", "key"),
            Err(AirdeskError::Config(_))
        ));
    }

    #[test]
    fn test_error_body_shapes() {
        let detailed: ErrorBody = serde_json::from_str(
            r#"{"error":{"type":"INVALID_REQUEST_UNKNOWN","message":"Invalid request"}}"#,
        )
        .unwrap();
        assert!(matches!(
            detailed.error,
            RemoteError::Detailed { error_type: Some(ref t), .. } if t == "INVALID_REQUEST_UNKNOWN"
        ));

        let code: ErrorBody = serde_json::from_str(r#"{"error":"NOT_FOUND"}"#).unwrap();
        assert!(matches!(code.error, RemoteError::Code(ref c) if c == "NOT_FOUND"));
    }
}
