use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use log::debug;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, Method};
use serde::de::DeserializeOwned;

use crate::util::error::{Error, Result};
use crate::util::options::Host;

pub const AUTH_TOKEN_HEADER: &str = "X-Auth-Token";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ContentType {
    #[default]
    Json,
    OctetStream,
}

impl ContentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentType::Json => "application/json",
            ContentType::OctetStream => "application/octet-stream",
        }
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    Empty,
    Json(serde_json::Value),
    Binary(Bytes),
}

impl RequestBody {
    pub fn content_type(&self) -> Option<ContentType> {
        match self {
            RequestBody::Empty => None,
            RequestBody::Json(_) => Some(ContentType::Json),
            RequestBody::Binary(_) => Some(ContentType::OctetStream),
        }
    }
}

/// One call against the device's REST API.
#[derive(Debug, Clone, PartialEq)]
pub struct DeviceRequest {
    pub method: Method,
    pub host: Host,
    pub path: &'static str,
    pub auth_token: Option<String>,
    pub body: RequestBody,
}

impl DeviceRequest {
    pub fn new(method: Method, host: &Host, path: &'static str) -> Self {
        DeviceRequest {
            method,
            host: host.clone(),
            path,
            auth_token: None,
            body: RequestBody::Empty,
        }
    }

    pub fn with_auth_token(mut self, auth_token: &str) -> Self {
        self.auth_token = Some(auth_token.to_string());
        self
    }

    pub fn with_body(mut self, body: RequestBody) -> Self {
        self.body = body;
        self
    }

    pub fn url(&self) -> String {
        format!("http://{}{}", self.host, self.path)
    }
}

/// Performs a single round trip and hands back the raw response body.
///
/// Decoding the body is left to the caller, so implementations only deal with
/// moving bytes and reporting network level failures.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn round_trip(&self, request: DeviceRequest) -> Result<Bytes>;
}

/// [`Transport`] backed by a `reqwest` client.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .connect_timeout(timeout)
            .timeout(timeout)
            .build()
            .map_err(Error::Transport)?;
        Ok(HttpTransport { client })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn round_trip(&self, request: DeviceRequest) -> Result<Bytes> {
        let url = request.url();
        debug!("{} {}", request.method, url);

        let mut builder = self.client.request(request.method.clone(), &url);
        if let Some(auth_token) = &request.auth_token {
            builder = builder.header(AUTH_TOKEN_HEADER, auth_token);
        }
        if let Some(content_type) = request.body.content_type() {
            builder = builder.header(CONTENT_TYPE, content_type.as_str());
        }
        builder = match request.body {
            RequestBody::Empty => builder,
            RequestBody::Json(value) => {
                builder.body(serde_json::to_vec(&value).map_err(|e| {
                    Error::protocol("encoding request", e.to_string())
                })?)
            }
            RequestBody::Binary(data) => builder.body(data),
        };

        let response = builder.send().await.map_err(Error::Transport)?;
        let status = response.status();
        if !status.is_success() {
            return Err(Error::from_status(status));
        }
        let body = response.bytes().await.map_err(Error::Transport)?;
        debug!("{} {} -> {} ({} bytes)", request.method, url, status, body.len());
        Ok(body)
    }
}

/// Decodes a JSON reply; a body of the wrong shape is the device's fault.
pub(crate) fn decode_json<T: DeserializeOwned>(operation: &'static str, body: &[u8]) -> Result<T> {
    serde_json::from_slice(body)
        .map_err(|e| Error::protocol(operation, format!("unexpected response: {}", e)))
}
