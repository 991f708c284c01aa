//! Generic JSON client for the Cureat backend.
//!
//! # Design
//! `HttpJsonClient` holds only a base URL and a shared `Transport`; it keeps
//! no per-call state, so clones can be handed to every gateway and used
//! concurrently. Each call is split into `build_*` (produces an
//! `HttpRequest`), the transport round-trip, and `parse_json` (classifies the
//! `HttpResponse`). The client knows nothing about any endpoint's payload
//! shape; typed records live in the gateways.

use std::fmt;
use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;
use tracing::warn;

use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse, RequestBody, Transport};

const DEFAULT_HEADERS: &[(&str, &str)] = &[("Content-Type", "application/json")];

/// Stateless JSON/form client bound to one backend base URL.
#[derive(Clone)]
pub struct HttpJsonClient {
    base_url: String,
    transport: Arc<dyn Transport>,
}

impl fmt::Debug for HttpJsonClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpJsonClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl HttpJsonClient {
    pub fn new(base_url: &str, transport: Arc<dyn Transport>) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            transport,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Build a JSON request. Caller headers replace defaults of the same name.
    pub fn build_json<T: Serialize + ?Sized>(
        &self,
        method: HttpMethod,
        path: &str,
        body: Option<&T>,
        headers: &[(&str, &str)],
    ) -> Result<HttpRequest, ApiError> {
        let body = body
            .map(|b| serde_json::to_string(b).map_err(|e| ApiError::Serialization(e.to_string())))
            .transpose()?
            .map(RequestBody::Json);

        let mut merged: Vec<(String, String)> = DEFAULT_HEADERS
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        for (name, value) in headers {
            merged.retain(|(k, _)| !k.eq_ignore_ascii_case(name));
            merged.push((name.to_string(), value.to_string()));
        }

        Ok(HttpRequest {
            method,
            url: self.url(path),
            headers: merged,
            body,
            timeout: None,
        })
    }

    /// Build a multipart form request. No `Content-Type` is set here; the
    /// transport supplies the multipart boundary.
    pub fn build_form(&self, method: HttpMethod, path: &str, fields: &[(&str, &str)]) -> HttpRequest {
        HttpRequest {
            method,
            url: self.url(path),
            headers: Vec::new(),
            body: Some(RequestBody::Form(
                fields
                    .iter()
                    .map(|(k, v)| (k.to_string(), v.to_string()))
                    .collect(),
            )),
            timeout: None,
        }
    }

    /// Classify a response: non-2xx becomes `HttpStatus`, otherwise the body
    /// is parsed as JSON. An empty 2xx body parses to `Value::Null`.
    pub fn parse_json(&self, response: HttpResponse) -> Result<Value, ApiError> {
        check_status(&response)?;
        if response.body.trim().is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(&response.body).map_err(|e| ApiError::Decode(e.to_string()))
    }

    pub async fn request_json<T: Serialize + ?Sized>(
        &self,
        method: HttpMethod,
        path: &str,
        body: Option<&T>,
        headers: &[(&str, &str)],
    ) -> Result<Value, ApiError> {
        let request = self.build_json(method, path, body, headers)?;
        let response = self.transport.execute(request).await?;
        self.parse_json(response)
    }

    pub async fn request_form(
        &self,
        method: HttpMethod,
        path: &str,
        fields: &[(&str, &str)],
    ) -> Result<Value, ApiError> {
        let request = self.build_form(method, path, fields);
        let response = self.transport.execute(request).await?;
        self.parse_json(response)
    }
}

fn check_status(response: &HttpResponse) -> Result<(), ApiError> {
    if response.is_success() {
        return Ok(());
    }
    let detail = extract_detail(&response.body);
    warn!(status = response.status, detail = ?detail, "backend rejected request");
    Err(ApiError::HttpStatus {
        status: response.status,
        detail,
    })
}

/// Pull `detail` out of an error body. FastAPI validation errors put an
/// array there; those are rendered as compact JSON.
fn extract_detail(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    match value.get("detail")? {
        Value::String(s) => Some(s.clone()),
        Value::Null => None,
        other => Some(other.to_string()),
    }
}
