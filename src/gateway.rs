// src/gateway.rs
//! Request Gateway: builds and issues a single HTTP call against the
//! backend and turns the outcome into a decoded value or an `ApiError`.
//!
//! The gateway does not notify anyone. Surfacing failures to the user is the
//! job of [`crate::api::Api`].

use crate::config::{Config, TokenTransport};
use crate::error::ApiError;
use log::debug;
use reqwest::header::{HeaderMap, CONTENT_TYPE};
use reqwest::{Client, Method, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

/// Where a request's bearer token ends up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenPlacement {
    Header,
    Query,
}

/// One call against the backend.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    method: Method,
    segments: Vec<String>,
    body: Option<Value>,
    token: Option<String>,
    params: Vec<(String, String)>,
}

impl ApiRequest {
    /// `segments` are raw path segments; an empty final segment yields a
    /// trailing slash.
    pub fn new<I, S>(method: Method, segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            method,
            segments: segments.into_iter().map(Into::into).collect(),
            body: None,
            token: None,
            params: Vec::new(),
        }
    }

    pub fn get<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(Method::GET, segments)
    }

    pub fn post<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(Method::POST, segments)
    }

    pub fn json<B: Serialize>(mut self, body: &B) -> Result<Self, ApiError> {
        let value = serde_json::to_value(body)
            .map_err(|e| ApiError::request_failed(format!("could not encode request body: {e}")))?;
        self.body = Some(value);
        Ok(self)
    }

    pub fn bearer(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Sets a query parameter. Setting the same key twice keeps the last value.
    pub fn param(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        let key = key.into();
        let value = value.to_string();
        match self.params.iter_mut().find(|(k, _)| *k == key) {
            Some(existing) => existing.1 = value,
            None => self.params.push((key, value)),
        }
        self
    }

    pub fn method(&self) -> &Method {
        &self.method
    }
}

#[derive(Debug, Clone)]
pub struct Gateway {
    http: Client,
    base_url: Url,
    transport: TokenTransport,
}

impl Gateway {
    pub fn new(base_url: Url, transport: TokenTransport) -> Self {
        Self::with_client(Client::new(), base_url, transport)
    }

    pub fn with_client(http: Client, base_url: Url, transport: TokenTransport) -> Self {
        Self {
            http,
            base_url,
            transport,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.api_url.clone(), config.token_transport)
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn token_placement(&self, method: &Method) -> TokenPlacement {
        match self.transport {
            TokenTransport::Legacy if *method == Method::GET => TokenPlacement::Query,
            _ => TokenPlacement::Header,
        }
    }

    /// Full URL for `request`: base, encoded path segments, caller params,
    /// then the token when it travels in the query string.
    pub fn url_for(&self, request: &ApiRequest) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(&request.segments);
        }

        let mut pairs = request.params.clone();
        if let Some(token) = &request.token {
            if self.token_placement(&request.method) == TokenPlacement::Query {
                pairs.push(("token".to_string(), token.clone()));
            }
        }

        if pairs.is_empty() {
            url.set_query(None);
        } else {
            url.query_pairs_mut().clear().extend_pairs(pairs);
        }
        url
    }

    /// Issues `request` once. A successful JSON response is decoded into `T`;
    /// a successful non-JSON response yields `T::default()`.
    pub async fn send<T>(&self, request: ApiRequest) -> Result<T, ApiError>
    where
        T: DeserializeOwned + Default,
    {
        let url = self.url_for(&request);
        debug!("{} {}", request.method, url.path());

        let mut builder = self
            .http
            .request(request.method.clone(), url)
            .header(CONTENT_TYPE, "application/json");
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }
        if let Some(token) = &request.token {
            if self.token_placement(&request.method) == TokenPlacement::Header {
                builder = builder.bearer_auth(token);
            }
        }

        let response = builder.send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::RequestFailed(error_message(status, &body)));
        }

        if !is_json(response.headers()) {
            return Ok(T::default());
        }

        response
            .json::<T>()
            .await
            .map_err(|e| ApiError::request_failed(format!("invalid response body: {e}")))
    }
}

fn is_json(headers: &HeaderMap) -> bool {
    headers
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .map(|value| value.contains("application/json"))
        .unwrap_or(false)
}

/// Message for a failed response: the body's `detail` field when present,
/// otherwise `Error <code>: <reason>`.
pub fn error_message(status: StatusCode, body: &str) -> String {
    let detail = serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|json| json.get("detail").cloned());

    match detail {
        Some(Value::String(text)) if !text.is_empty() => text,
        Some(Value::Null) | Some(Value::String(_)) | None => {
            match status.canonical_reason() {
                Some(reason) => format!("Error {}: {}", status.as_u16(), reason),
                None => format!("Error {}", status.as_u16()),
            }
        }
        Some(other) => other.to_string(),
    }
}
