//! graph-auth CLI - acquire tokens through the token bridge.
//!
//! Runs against the scripted development provider, so the whole
//! silent/interactive flow can be exercised without an identity service.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use graph_auth::{
    Account, AuthenticationResult, BridgeConfig, ProviderError, Scopes, Screen, TokenBridge,
    DEFAULT_AUTHORITY,
};
use graph_auth_foreground::{LifecycleEvent, LifecycleRegistry};
use graph_auth_provider_static::{ScriptedResponse, StaticIdentityProvider};
use reqwest::{Client, Method};
use serde::Serialize;
use tokio::runtime::Handle;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

// ============================================================================
// CLI Structure
// ============================================================================

#[derive(Parser)]
#[command(name = "graph-auth")]
#[command(about = "Acquire bearer tokens and send authenticated requests")]
#[command(version)]
struct Cli {
    /// Scopes to request
    #[arg(
        long = "scope",
        env = "GRAPH_AUTH_SCOPES",
        value_delimiter = ',',
        default_value = "https://graph.microsoft.com/User.Read"
    )]
    scopes: Vec<String>,

    /// Authority used for silent acquisition
    #[arg(long, env = "GRAPH_AUTH_AUTHORITY", default_value = DEFAULT_AUTHORITY)]
    authority: String,

    /// Accounts known to the development provider (first one is used)
    #[arg(long = "account", env = "GRAPH_AUTH_ACCOUNTS", value_delimiter = ',')]
    accounts: Vec<String>,

    /// Access token handed out by the development provider
    #[arg(long, env = "GRAPH_AUTH_TOKEN")]
    token: String,

    /// Make silent acquisition ask for interaction
    #[arg(long)]
    interaction_required: bool,

    /// Simulated provider latency in milliseconds
    #[arg(long, default_value = "0")]
    latency_ms: u64,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Acquire a token and print its metadata
    Token {
        /// Include the raw access token in the output
        #[arg(long)]
        show_token: bool,
    },
    /// Send an authenticated request
    Request {
        /// Target URL
        url: String,
        /// HTTP method
        #[arg(long, default_value = "GET")]
        method: String,
    },
}

// ============================================================================
// Output Types
// ============================================================================

#[derive(Debug, Serialize)]
struct TokenSummary {
    account: Option<String>,
    expires_at: Option<u64>,
    scopes: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    access_token: Option<String>,
}

impl TokenSummary {
    fn new(result: &AuthenticationResult, show_token: bool) -> Self {
        Self {
            account: result.account.as_ref().map(|account| account.id.clone()),
            expires_at: result.expires_at,
            scopes: result.scopes.clone(),
            access_token: show_token.then(|| result.access_token.secret().to_string()),
        }
    }
}

/// The terminal is the only "screen" a CLI has.
struct TerminalScreen;

impl Screen for TerminalScreen {
    fn name(&self) -> &str {
        "terminal"
    }
}

// ============================================================================
// Setup
// ============================================================================

fn build_provider(cli: &Cli) -> StaticIdentityProvider {
    let mut builder = StaticIdentityProvider::builder(Handle::current())
        .interactive(ScriptedResponse::token(cli.token.clone()));

    builder = if cli.interaction_required {
        builder.silent(ScriptedResponse::Error(ProviderError::interaction_required(
            "interaction_required",
            "silent acquisition requires user interaction",
        )))
    } else {
        builder.silent(ScriptedResponse::token(cli.token.clone()))
    };

    for id in &cli.accounts {
        builder = builder.account(Account::new(id.clone()));
    }
    if cli.latency_ms > 0 {
        builder = builder.latency(Duration::from_millis(cli.latency_ms));
    }

    builder.build()
}

fn build_bridge(
    cli: &Cli,
    host: Arc<LifecycleRegistry>,
    screen: &Arc<dyn Screen>,
) -> Result<TokenBridge> {
    let config = BridgeConfig::new(Scopes::new(cli.scopes.iter().cloned()))
        .with_authority(cli.authority.clone());

    TokenBridge::builder()
        .provider(Arc::new(build_provider(cli)))
        .config(config)
        .lifecycle_host(host, Some(screen))
        .build()
        .context("Failed to configure token bridge")
}

// ============================================================================
// Command Handlers
// ============================================================================

async fn cmd_token(bridge: Arc<TokenBridge>, show_token: bool) -> Result<()> {
    // authenticate() blocks; keep it off the async workers.
    let result = tokio::task::spawn_blocking(move || bridge.authenticate())
        .await
        .context("Authentication task failed")??;

    let summary = TokenSummary::new(&result, show_token);
    println!("{}", serde_json::to_string_pretty(&summary)?);

    Ok(())
}

async fn cmd_request(bridge: Arc<TokenBridge>, url: &str, method: &str) -> Result<()> {
    let client = Client::builder()
        .timeout(Duration::from_secs(30))
        .build()
        .context("Failed to create HTTP client")?;

    let method: Method = method
        .to_uppercase()
        .parse()
        .with_context(|| format!("Invalid HTTP method: {method}"))?;
    let request = client
        .request(method, url)
        .build()
        .context("Failed to build request")?;

    let request = tokio::task::spawn_blocking(move || bridge.decorate(request))
        .await
        .context("Authentication task failed")??;

    let resp = client
        .execute(request)
        .await
        .context("Failed to send request")?;

    let status = resp.status();
    let body = resp.text().await.context("Failed to read response body")?;

    println!("Status: {status}");
    println!("{body}");

    Ok(())
}

// ============================================================================
// Main
// ============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    let host = Arc::new(LifecycleRegistry::new());
    let screen: Arc<dyn Screen> = Arc::new(TerminalScreen);
    let bridge = Arc::new(build_bridge(&cli, host.clone(), &screen)?);
    host.dispatch(LifecycleEvent::Resumed, &screen);

    tracing::debug!(
        scopes = %bridge.scopes(),
        authority = bridge.authority(),
        "Token bridge ready"
    );

    match cli.command {
        Commands::Token { show_token } => cmd_token(bridge, show_token).await,
        Commands::Request { url, method } => cmd_request(bridge, &url, &method).await,
    }
}
