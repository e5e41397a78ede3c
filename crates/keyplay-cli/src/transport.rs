//! reqwest-backed transport

use async_trait::async_trait;
use keyplay_core::{Error, HttpRequest, HttpResponse, Method, Result, Transport, JSON_CONTENT_TYPE};
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;

pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    pub fn new() -> Self {
        Self {
            client: Client::new(),
        }
    }
}

impl Default for ReqwestTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait(?Send)]
impl Transport for ReqwestTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse> {
        let builder = match request.method {
            Method::Get => self.client.get(request.url),
            Method::Post => self.client.post(request.url),
        }
        .header(CONTENT_TYPE, JSON_CONTENT_TYPE);

        let builder = match request.body {
            Some(body) => builder.body(body),
            None => builder,
        };

        let response = builder
            .send()
            .await
            .map_err(|e| Error::transport(e.to_string()))?;
        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| Error::transport(e.to_string()))?;

        Ok(HttpResponse { status, body })
    }
}
