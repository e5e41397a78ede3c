//! CLI command implementations

use keyplay_core::{
    render_value, ApiClient, AppConfig, DecodeFlow, DecodeView, HttpRequest, KeysFlow, KeysView,
    Method, SubmitStatus, Transport,
};
use std::rc::Rc;
use url::Url;

use crate::terminal::{ArgInput, PrintPanel, ReportPlayer, SpinnerButton, BUSY_LABEL};
use crate::transport::ReqwestTransport;

fn client(base_url: &Url, config: &AppConfig) -> Rc<ApiClient> {
    Rc::new(ApiClient::new(base_url.clone(), config, ReqwestTransport::new()))
}

fn keys_flow(client: Rc<ApiClient>, token: Rc<ArgInput>, video_url: &str) -> KeysFlow {
    KeysFlow::new(
        KeysView {
            button: Rc::new(SpinnerButton::new("Get Keys")),
            token,
            video_url: Rc::new(ArgInput::new(video_url)),
            panel: Rc::new(PrintPanel::new("Keys")),
        },
        client,
        BUSY_LABEL,
    )
}

/// Decode an encrypted URL, optionally chaining a key request that reuses
/// a refreshed token
pub async fn decode(
    base_url: &Url,
    config: &AppConfig,
    token: &str,
    encrypted_url: &str,
    keys_for: Option<&str>,
) -> anyhow::Result<SubmitStatus> {
    let client = client(base_url, config);
    let drm_token = Rc::new(ArgInput::new(token));

    let flow = DecodeFlow::new(
        DecodeView {
            button: Rc::new(SpinnerButton::new("Decode")),
            token: Rc::new(ArgInput::new(token)),
            encrypted_url: Rc::new(ArgInput::new(encrypted_url)),
            panel: Rc::new(PrintPanel::new("Decode")),
            forward_token: drm_token.clone(),
        },
        client.clone(),
        Rc::new(ReportPlayer::new(config.manifest_marker.clone())),
        BUSY_LABEL,
    );

    let status = flow.submit().await;

    match keys_for {
        Some(video_url) if status == SubmitStatus::Succeeded => {
            Ok(keys_flow(client, drm_token, video_url).submit().await)
        }
        _ => Ok(status),
    }
}

/// Retrieve the keys for a protected video
pub async fn keys(
    base_url: &Url,
    config: &AppConfig,
    token: &str,
    video_url: &str,
) -> anyhow::Result<SubmitStatus> {
    let flow = keys_flow(client(base_url, config), Rc::new(ArgInput::new(token)), video_url);
    Ok(flow.submit().await)
}

/// Parse `key=value` pairs into a flat JSON object
pub fn parse_fields(fields: &[String]) -> anyhow::Result<serde_json::Value> {
    let mut map = serde_json::Map::new();
    for field in fields {
        let (key, value) = field
            .split_once('=')
            .ok_or_else(|| anyhow::anyhow!("expected key=value, got {field:?}"))?;
        map.insert(key.to_string(), serde_json::Value::String(value.to_string()));
    }
    Ok(serde_json::Value::Object(map))
}

/// Raw call through the request helper
pub async fn call(
    base_url: &Url,
    config: &AppConfig,
    endpoint: &str,
    method: Method,
    fields: &[String],
) -> anyhow::Result<SubmitStatus> {
    let body = if fields.is_empty() {
        None
    } else {
        Some(parse_fields(fields)?)
    };

    match client(base_url, config).call(endpoint, method, body.as_ref()).await {
        Ok(value) => {
            println!("{}", render_value(&value));
            Ok(SubmitStatus::Succeeded)
        }
        Err(e) => {
            eprintln!("{} {}", console::style("✗").red().bold(), e);
            Ok(SubmitStatus::Failed)
        }
    }
}

/// Smoke-test a running backend: index page, then both endpoints with bogus
/// credentials, which must be refused with 400 or 401
pub async fn check(base_url: &Url, config: &AppConfig) -> anyhow::Result<SubmitStatus> {
    let transport = ReqwestTransport::new();
    println!("Checking {base_url}");

    let probes: [(&str, Method, &str, Option<serde_json::Value>, &[u16]); 3] = [
        ("Index page", Method::Get, "/", None, &[200]),
        (
            "Decode endpoint",
            Method::Post,
            config.decode_endpoint.as_str(),
            Some(serde_json::json!({ "token": "test", "encrypted_url": "test" })),
            &[400, 401],
        ),
        (
            "Keys endpoint",
            Method::Post,
            config.keys_endpoint.as_str(),
            Some(serde_json::json!({ "token": "test", "video_url": "test" })),
            &[400, 401],
        ),
    ];

    let total = probes.len();
    let mut passed = 0;

    for (name, method, endpoint, body, expected) in probes {
        let request = HttpRequest {
            method,
            url: base_url.join(endpoint)?,
            body: body.map(|b| b.to_string()),
        };

        match transport.send(request).await {
            Ok(response) if expected.contains(&response.status) => {
                passed += 1;
                println!("  {} {name}: {}", console::style("✓").green(), response.status);
            }
            Ok(response) => {
                println!(
                    "  {} {name}: {} (expected {expected:?})",
                    console::style("✗").red(),
                    response.status
                );
            }
            Err(e) => {
                println!("  {} {name}: {e}", console::style("✗").red());
            }
        }
    }

    println!("\nChecks passed: {passed}/{total}");
    Ok(if passed == total {
        SubmitStatus::Succeeded
    } else {
        SubmitStatus::Failed
    })
}
