//! `fetch`-backed transport

use async_trait::async_trait;
use keyplay_core::{Error, HttpRequest, HttpResponse, Result, Transport, JSON_CONTENT_TYPE};
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::{Headers, Request, RequestInit, Response};

use crate::js_message;

fn transport_error(e: JsValue) -> Error {
    Error::transport(js_message(&e))
}

/// Sends requests through `window.fetch`
#[derive(Debug, Default, Clone, Copy)]
pub struct FetchTransport;

#[async_trait(?Send)]
impl Transport for FetchTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse> {
        let headers = Headers::new().map_err(transport_error)?;
        headers
            .set("Content-Type", JSON_CONTENT_TYPE)
            .map_err(transport_error)?;

        let opts = RequestInit::new();
        opts.set_method(request.method.as_str());
        opts.set_headers(&headers);
        if let Some(body) = &request.body {
            opts.set_body(&JsValue::from_str(body));
        }

        let js_request = Request::new_with_str_and_init(request.url.as_str(), &opts)
            .map_err(transport_error)?;
        let window = web_sys::window().ok_or_else(|| Error::transport("window is unavailable"))?;

        let response: Response = JsFuture::from(window.fetch_with_request(&js_request))
            .await
            .map_err(transport_error)?
            .dyn_into()
            .map_err(|_| Error::transport("fetch did not resolve to a Response"))?;

        let body = JsFuture::from(response.text().map_err(transport_error)?)
            .await
            .map_err(transport_error)?
            .as_string()
            .unwrap_or_default();

        Ok(HttpResponse {
            status: response.status(),
            body,
        })
    }
}
