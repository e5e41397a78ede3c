//! Keyplay CLI - terminal client for the decode and key endpoints
//!
//! Features:
//! - Decode an encrypted URL and report how it would play
//! - Retrieve DRM keys, optionally chained after a decode
//! - Raw JSON calls with GET or POST
//! - Backend smoke test

use clap::{Parser, Subcommand};
use keyplay_core::{AppConfig, Method, SubmitStatus};
use std::process::ExitCode;
use url::Url;

mod commands;
mod terminal;
mod transport;

/// Keyplay CLI - decode URLs and fetch keys from a Keyplay backend
#[derive(Parser)]
#[command(name = "keyplay")]
#[command(author = "Purple Squirrel Media")]
#[command(version)]
#[command(about = "Terminal client for the decode and key-retrieval endpoints", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Backend base URL
    #[arg(short, long, default_value = "http://localhost:5000")]
    base_url: Url,

    /// Decode endpoint path
    #[arg(long, default_value = "/api/decode")]
    decode_endpoint: String,

    /// Key-retrieval endpoint path
    #[arg(long, default_value = "/api/get-keys")]
    keys_endpoint: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Decode an encrypted video URL
    Decode {
        /// Access token
        #[arg(short, long)]
        token: String,

        /// Encrypted URL
        encrypted_url: String,

        /// Fetch keys for this video afterwards, using the refreshed token if any
        #[arg(short, long)]
        keys_for: Option<String>,
    },

    /// Retrieve DRM keys for a video
    Keys {
        /// Access token
        #[arg(short, long)]
        token: String,

        /// Video (MPD) URL
        video_url: String,
    },

    /// Call an endpoint and print the JSON reply
    Call {
        /// Endpoint path, e.g. /api/decode
        endpoint: String,

        /// HTTP method (GET or POST)
        #[arg(short, long, default_value = "POST")]
        method: Method,

        /// Body fields as key=value (query parameters for GET)
        #[arg(short, long = "field")]
        fields: Vec<String>,
    },

    /// Smoke-test a running backend
    Check,
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    // Initialize tracing
    let level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(level)
        .with_writer(std::io::stderr)
        .init();

    let config = AppConfig {
        decode_endpoint: cli.decode_endpoint,
        keys_endpoint: cli.keys_endpoint,
        ..AppConfig::default()
    };
    config.validate()?;

    let base_url = &cli.base_url;
    let status = match cli.command {
        Commands::Decode { token, encrypted_url, keys_for } => {
            commands::decode(base_url, &config, &token, &encrypted_url, keys_for.as_deref()).await?
        }
        Commands::Keys { token, video_url } => {
            commands::keys(base_url, &config, &token, &video_url).await?
        }
        Commands::Call { endpoint, method, fields } => {
            commands::call(base_url, &config, &endpoint, method, &fields).await?
        }
        Commands::Check => commands::check(base_url, &config).await?,
    };

    Ok(match status {
        SubmitStatus::Succeeded => ExitCode::SUCCESS,
        SubmitStatus::Failed | SubmitStatus::Superseded => ExitCode::FAILURE,
    })
}
