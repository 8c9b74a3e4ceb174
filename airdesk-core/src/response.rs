//! Success envelope returned by every client and service call.

use std::collections::BTreeMap;

use reqwest::header::HeaderMap;
use serde::Serialize;

/// `{success: true, data, status, statusText, headers}`
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: T,
    pub status: u16,
    pub status_text: String,
    pub headers: BTreeMap<String, String>,
}

impl<T> ApiResponse<T> {
    pub(crate) fn new(data: T, status: reqwest::StatusCode, headers: &HeaderMap) -> Self {
        ApiResponse {
            success: true,
            data,
            status: status.as_u16(),
            status_text: status.canonical_reason().unwrap_or_default().to_string(),
            headers: headers
                .iter()
                .filter_map(|(name, value)| {
                    value
                        .to_str()
                        .ok()
                        .map(|v| (name.as_str().to_string(), v.to_string()))
                })
                .collect(),
        }
    }

    /// Reshape the payload, keeping the response metadata.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> ApiResponse<U> {
        ApiResponse {
            success: self.success,
            data: f(self.data),
            status: self.status,
            status_text: self.status_text,
            headers: self.headers,
        }
    }

    /// Fallible variant of [`ApiResponse::map`].
    pub fn try_map<U, E>(self, f: impl FnOnce(T) -> Result<U, E>) -> Result<ApiResponse<U>, E> {
        Ok(ApiResponse {
            success: self.success,
            data: f(self.data)?,
            status: self.status,
            status_text: self.status_text,
            headers: self.headers,
        })
    }

    pub fn into_data(self) -> T {
        self.data
    }

    /// Detach the payload from the metadata.
    pub(crate) fn split(self) -> (T, ApiResponse<()>) {
        let ApiResponse {
            success,
            data,
            status,
            status_text,
            headers,
        } = self;
        (
            data,
            ApiResponse {
                success,
                data: (),
                status,
                status_text,
                headers,
            },
        )
    }
}
