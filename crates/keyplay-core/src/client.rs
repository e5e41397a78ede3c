//! Generic JSON request helper
//!
//! The HTTP stack is abstracted behind [`Transport`] so the same helper runs
//! on `fetch` in the browser and on `reqwest` in the terminal client.

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, instrument, warn};
use url::Url;

use crate::{
    config::AppConfig,
    reply::{error_message, DecodeReply, KeysReply},
    types::{DecodeRequest, KeysRequest, Method},
    Error, Result,
};

/// Content type sent with every request
pub const JSON_CONTENT_TYPE: &str = "application/json";

/// A fully resolved request handed to a transport
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: Method,
    pub url: Url,
    /// Serialized JSON body, if any
    pub body: Option<String>,
}

/// Raw status and body returned by a transport
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// HTTP stack seam.
///
/// Implementations must send `Content-Type: application/json` and must only
/// fail when no response was received at all.
#[async_trait(?Send)]
pub trait Transport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse>;
}

/// JSON client bound to a base URL and a pair of endpoints
pub struct ApiClient {
    base_url: Url,
    decode_endpoint: String,
    keys_endpoint: String,
    transport: Box<dyn Transport>,
}

impl ApiClient {
    pub fn new(base_url: Url, config: &AppConfig, transport: impl Transport + 'static) -> Self {
        Self {
            base_url,
            decode_endpoint: config.decode_endpoint.clone(),
            keys_endpoint: config.keys_endpoint.clone(),
            transport: Box::new(transport),
        }
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Perform a request and return the parsed JSON body.
    ///
    /// The body is parsed before the status is looked at; a non-success
    /// status then becomes [`Error::Http`] carrying the backend's message.
    #[instrument(skip(self, body), fields(base = %self.base_url))]
    pub async fn call<B: Serialize + ?Sized>(
        &self,
        endpoint: &str,
        method: Method,
        body: Option<&B>,
    ) -> Result<Value> {
        let request = self.build_request(endpoint, method, body)?;
        debug!(url = %request.url, "Sending request");

        let response = self.transport.send(request).await?;
        let parsed: Value = serde_json::from_str(&response.body).map_err(Error::InvalidBody)?;

        if !response.is_success() {
            let message = error_message(&parsed, response.status);
            warn!(status = response.status, message = %message, "Request failed");
            return Err(Error::Http {
                status: response.status,
                message,
            });
        }

        debug!(status = response.status, "Request succeeded");
        Ok(parsed)
    }

    /// Call the decode endpoint
    pub async fn decode(&self, request: &DecodeRequest) -> Result<DecodeReply> {
        let raw = self
            .call(&self.decode_endpoint, Method::Post, Some(request))
            .await?;
        Ok(DecodeReply::parse(raw))
    }

    /// Call the key-retrieval endpoint
    pub async fn get_keys(&self, request: &KeysRequest) -> Result<KeysReply> {
        let raw = self
            .call(&self.keys_endpoint, Method::Post, Some(request))
            .await?;
        Ok(KeysReply::parse(raw))
    }

    fn build_request<B: Serialize + ?Sized>(
        &self,
        endpoint: &str,
        method: Method,
        body: Option<&B>,
    ) -> Result<HttpRequest> {
        let mut url = self.base_url.join(endpoint)?;
        let body = body
            .map(serde_json::to_value)
            .transpose()
            .map_err(Error::Encode)?;

        match method {
            Method::Post => Ok(HttpRequest {
                method,
                url,
                body: body.map(|b| b.to_string()),
            }),
            Method::Get => {
                // GET carries the flat fields as query parameters
                if let Some(Value::Object(fields)) = &body {
                    let mut query = url.query_pairs_mut();
                    for (key, value) in fields {
                        match value {
                            Value::String(s) => query.append_pair(key, s),
                            Value::Null => continue,
                            other => query.append_pair(key, &other.to_string()),
                        };
                    }
                }
                Ok(HttpRequest {
                    method,
                    url,
                    body: None,
                })
            }
        }
    }
}
