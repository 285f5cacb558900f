//! HTTP client adapter for the IdeaHub REST API.
//!
//! Every call goes through one pipeline: build the request against the base
//! address, run the credential stage, send once, then map the response into
//! a decoded body or a [`ClientError`].
//!
//! ERROR HANDLING
//! ==============
//! Non-2xx responses become `ClientError::Http` with the server's message;
//! transport failures become `ClientError::Network`. Nothing is retried.

#[cfg(test)]
#[path = "http_test.rs"]
mod http_test;

use std::time::Duration;

use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

use crate::config::{ClientConfig, Timeouts, normalize_base_address};
use crate::error::ClientError;
use crate::session::SessionStore;

/// Outgoing request payload.
#[derive(Clone, Debug, PartialEq)]
pub enum RequestBody {
    Json(Value),
    /// `application/x-www-form-urlencoded` fields, in order.
    Form(Vec<(String, String)>),
}

impl RequestBody {
    /// Serialize any value as a JSON body.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::InvalidInput`] if `value` cannot be serialized.
    pub fn json(value: &impl serde::Serialize) -> Result<Self, ClientError> {
        serde_json::to_value(value)
            .map(Self::Json)
            .map_err(|e| ClientError::InvalidInput(e.to_string()))
    }

    #[must_use]
    pub fn form(fields: &[(&str, &str)]) -> Self {
        Self::Form(fields.iter().map(|(k, v)| ((*k).to_owned(), (*v).to_owned())).collect())
    }
}

/// Status and raw body of a response that reached the client.
#[derive(Clone, Debug)]
pub(crate) struct RawResponse {
    pub status: StatusCode,
    pub body: String,
}

impl RawResponse {
    pub fn server_message(&self) -> Option<String> {
        server_message(&self.body)
    }

    fn into_result(self) -> Result<Value, ClientError> {
        if !self.status.is_success() {
            let message = self
                .server_message()
                .or_else(|| self.status.canonical_reason().map(ToOwned::to_owned))
                .unwrap_or_else(|| "request failed".to_owned());
            return Err(ClientError::Http { status: self.status.as_u16(), message });
        }
        decode_body(&self.body)
    }
}

/// Request pipeline bound to a base address and the session store.
#[derive(Clone, Debug)]
pub struct HttpClient {
    http: reqwest::Client,
    base_address: String,
    session: SessionStore,
}

impl HttpClient {
    /// Build an adapter rooted at `base_address`.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Config`] for an invalid address, or
    /// [`ClientError::HttpClientBuild`] if the transport cannot be created.
    pub fn configure(base_address: &str, timeouts: Timeouts, session: SessionStore) -> Result<Self, ClientError> {
        let base_address = normalize_base_address(base_address)?;
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeouts.request_secs))
            .connect_timeout(Duration::from_secs(timeouts.connect_secs))
            .build()
            .map_err(|e| ClientError::HttpClientBuild(e.to_string()))?;
        debug!(%base_address, "http client configured");
        Ok(Self { http, base_address, session })
    }

    /// Build an adapter from resolved config.
    ///
    /// # Errors
    ///
    /// See [`HttpClient::configure`].
    pub fn from_config(config: &ClientConfig, session: SessionStore) -> Result<Self, ClientError> {
        Self::configure(&config.api_base, config.timeouts, session)
    }

    #[must_use]
    pub fn base_address(&self) -> &str {
        &self.base_address
    }

    #[must_use]
    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    /// Absolute URL for an API path.
    #[must_use]
    pub fn url(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{path}", self.base_address)
        } else {
            format!("{}/{path}", self.base_address)
        }
    }

    /// Issue one call and return the decoded JSON body (`null` when empty).
    ///
    /// # Errors
    ///
    /// - [`ClientError::Http`] for a non-2xx status
    /// - [`ClientError::Network`] when no response arrives
    /// - [`ClientError::Decode`] when a 2xx body is not JSON
    pub async fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<RequestBody>,
        extra_headers: Option<HeaderMap>,
    ) -> Result<Value, ClientError> {
        self.execute(method, path, body, extra_headers).await?.into_result()
    }

    /// Same as [`HttpClient::request`], decoding into `T`.
    ///
    /// # Errors
    ///
    /// See [`HttpClient::request`]; a shape mismatch is [`ClientError::Decode`].
    pub async fn request_json<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<RequestBody>,
    ) -> Result<T, ClientError> {
        let value = self.request(method, path, body, None).await?;
        serde_json::from_value(value).map_err(|e| ClientError::Decode(format!("{path}: {e}")))
    }

    /// Send a request through the credential stage without interpreting the
    /// status code.
    pub(crate) async fn execute(
        &self,
        method: Method,
        path: &str,
        body: Option<RequestBody>,
        extra_headers: Option<HeaderMap>,
    ) -> Result<RawResponse, ClientError> {
        let mut builder = self.http.request(method.clone(), self.url(path));
        if let Some(headers) = extra_headers {
            builder = builder.headers(headers);
        }
        builder = match body {
            Some(RequestBody::Json(value)) => builder.json(&value),
            Some(RequestBody::Form(fields)) => builder.form(&fields),
            None => builder,
        };
        let request = builder.build().map_err(|e| ClientError::InvalidInput(e.to_string()))?;
        let request = attach_credentials(request, self.session.current_token().as_deref())?;

        let response = self.http.execute(request).await.map_err(|e| {
            debug!(%method, path, error = %e, "api request failed before response");
            ClientError::Network(e.to_string())
        })?;
        let status = response.status();
        let body = response.text().await.map_err(|e| ClientError::Network(e.to_string()))?;
        debug!(%method, path, status = status.as_u16(), "api request");
        Ok(RawResponse { status, body })
    }
}

/// Credential stage: with a token, set `Authorization: Bearer <token>`;
/// without one, make sure no `Authorization` header leaves the client.
///
/// # Errors
///
/// Returns [`ClientError::InvalidHeader`] if the token is not a valid header value.
pub fn attach_credentials(mut request: reqwest::Request, token: Option<&str>) -> Result<reqwest::Request, ClientError> {
    let headers = request.headers_mut();
    match token {
        Some(token) => {
            let mut value = HeaderValue::from_str(&format!("Bearer {token}"))?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }
        None => {
            headers.remove(AUTHORIZATION);
        }
    }
    Ok(request)
}

/// Human-readable message from an error body.
///
/// Understands `{"detail": "..."}`, validation lists
/// `{"detail": [{"msg": "..."}]}`, `{"message": "..."}`, and plain text.
#[must_use]
pub fn server_message(body: &str) -> Option<String> {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return None;
    }
    let Ok(value) = serde_json::from_str::<Value>(trimmed) else {
        return Some(trimmed.to_owned());
    };

    match value.get("detail") {
        Some(Value::String(detail)) => return Some(detail.clone()),
        Some(Value::Array(items)) => {
            let joined = items
                .iter()
                .filter_map(|item| item.get("msg").and_then(Value::as_str).or_else(|| item.as_str()))
                .collect::<Vec<_>>()
                .join("; ");
            if !joined.is_empty() {
                return Some(joined);
            }
        }
        _ => {}
    }
    ["message", "error"]
        .iter()
        .find_map(|key| value.get(key).and_then(Value::as_str))
        .map(ToOwned::to_owned)
        .or_else(|| value.as_str().map(ToOwned::to_owned))
}

fn decode_body(body: &str) -> Result<Value, ClientError> {
    if body.trim().is_empty() {
        return Ok(Value::Null);
    }
    serde_json::from_str(body).map_err(|e| ClientError::Decode(e.to_string()))
}
