//! Oko config REST client
//!
//! `GET  {base}/api/v1/config`        → config document
//! `POST {base}/api/v1/config/patch`  ← `{ "patch": config, "source": "patch" }`

use super::{ConfigBackend, ConfigUpdate, RemoteError};
use crate::config::RemoteConfig;
use crate::tree::DashboardConfig;
use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::Serialize;
use serde_json::Value;

const CONFIG_PATH: &str = "/api/v1/config";
const CONFIG_PATCH_PATH: &str = "/api/v1/config/patch";

const ACTOR_HEADER: &str = "X-Oko-Actor";
const CAPABILITIES_HEADER: &str = "X-Oko-Capabilities";
const REQUEST_ID_HEADER: &str = "X-Request-Id";

/// HTTP implementation of [`ConfigBackend`]
pub struct HttpConfigBackend {
    client: Client,
    base_url: String,
    actor: String,
    capabilities: String,
}

#[derive(Debug, Serialize)]
struct PatchRequest<'a> {
    patch: &'a DashboardConfig,
    source: &'static str,
}

impl HttpConfigBackend {
    /// Create a client for the configured backend
    pub fn new(config: &RemoteConfig) -> Result<Self, RemoteError> {
        let client = Client::builder()
            .timeout(config.request_timeout())
            .build()
            .map_err(|e| RemoteError::Network {
                message: format!("Failed to create HTTP client: {}", e),
            })?;

        Ok(Self {
            client,
            base_url: config.base_url.trim().trim_end_matches('/').to_string(),
            actor: config.actor_header(),
            capabilities: config.capabilities_header(),
        })
    }

    /// Base URL without a trailing slash
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn with_headers(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        request
            .header(reqwest::header::ACCEPT, "application/json")
            .header(ACTOR_HEADER, &self.actor)
            .header(CAPABILITIES_HEADER, &self.capabilities)
            .header(REQUEST_ID_HEADER, uuid::Uuid::new_v4().to_string())
    }

    async fn send(&self, request: reqwest::RequestBuilder, method: &str, path: &str) -> Result<Value, RemoteError> {
        let response = self.with_headers(request).send().await.map_err(|e| {
            tracing::warn!(method, path, error = %e, "Config request failed");
            RemoteError::Network {
                message: if e.is_timeout() {
                    "request timed out".to_string()
                } else if e.is_connect() {
                    "could not connect; check that the server is running".to_string()
                } else {
                    e.to_string()
                },
            }
        })?;

        read_body(response, method, path).await
    }
}

async fn read_body(response: Response, method: &str, path: &str) -> Result<Value, RemoteError> {
    let status = response.status();
    let is_json = response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.contains("application/json"))
        .unwrap_or(false);

    let text = response.text().await.map_err(|e| RemoteError::Parse {
        message: e.to_string(),
    })?;

    if !status.is_success() {
        let body = if is_json {
            serde_json::from_str(&text).unwrap_or(Value::String(text))
        } else {
            Value::String(text)
        };
        let message = resolve_error_message(&body, status.as_u16());
        tracing::warn!(method, path, status = status.as_u16(), %message, "Config request rejected");
        return Err(RemoteError::Http {
            status: status.as_u16(),
            message,
        });
    }

    if is_json {
        serde_json::from_str(&text).map_err(|e| RemoteError::Parse {
            message: e.to_string(),
        })
    } else {
        Ok(Value::String(text))
    }
}

/// Pick the most useful message from an error response body
///
/// Order: `message`, then `detail` (string, or list of `{message}` entries),
/// then a plain-text body, then a generic status line.
pub fn resolve_error_message(body: &Value, status: u16) -> String {
    if let Some(message) = body.get("message").and_then(Value::as_str) {
        if !message.trim().is_empty() {
            return message.to_string();
        }
    }

    match body.get("detail") {
        Some(Value::Array(entries)) => {
            return entries
                .iter()
                .map(|entry| match entry.get("message") {
                    Some(Value::String(message)) => message.clone(),
                    Some(Value::Null) => String::new(),
                    Some(other) => other.to_string(),
                    None => entry.to_string(),
                })
                .collect::<Vec<_>>()
                .join("; ");
        }
        Some(Value::String(detail)) if !detail.is_empty() => return detail.clone(),
        _ => {}
    }

    if let Value::String(text) = body {
        if !text.is_empty() {
            return text.clone();
        }
    }

    if status >= 500 {
        format!("Backend unavailable (HTTP {}); check that the server is running", status)
    } else {
        format!("Request failed: {}", status)
    }
}

/// Config returned by a patch call: `config` or `revision.payload`
fn extract_config_payload(response: &Value) -> Option<&Value> {
    response
        .get("config")
        .filter(|v| v.is_object())
        .or_else(|| {
            response
                .get("revision")
                .and_then(|revision| revision.get("payload"))
                .filter(|v| v.is_object())
        })
}

fn decode_config(value: Value) -> Result<DashboardConfig, RemoteError> {
    serde_json::from_value(value).map_err(|e| RemoteError::Parse {
        message: format!("invalid dashboard config: {}", e),
    })
}

#[async_trait]
impl ConfigBackend for HttpConfigBackend {
    async fn fetch_config(&self) -> Result<DashboardConfig, RemoteError> {
        let body = self.send(self.client.get(self.url(CONFIG_PATH)), "GET", CONFIG_PATH).await?;
        let config = decode_config(body)?;
        tracing::debug!(groups = config.groups.len(), pages = config.layout.pages.len(), "Fetched dashboard config");
        Ok(config)
    }

    async fn update_config(&self, config: &DashboardConfig) -> Result<ConfigUpdate, RemoteError> {
        let request = self.client.post(self.url(CONFIG_PATCH_PATH)).json(&PatchRequest {
            patch: config,
            source: "patch",
        });
        let body = self.send(request, "POST", CONFIG_PATCH_PATH).await?;

        // Already committed remotely; a bad echo keeps the local copy
        let config = match extract_config_payload(&body).map(|payload| decode_config(payload.clone())) {
            Some(Ok(config)) => Some(config),
            Some(Err(e)) => {
                tracing::warn!(error = %e, "Ignoring undecodable config echoed by the service");
                None
            }
            None => None,
        };
        tracing::debug!(echoed = config.is_some(), "Dashboard config saved");
        Ok(ConfigUpdate { config })
    }
}
