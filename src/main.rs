use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::anyhow;
use axum::Router;
use clap::Parser;
use http::Method;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;

use callbridge::{ServerConfig, routes, state::AppState};

/// Callbridge - telephony voice bridge to a realtime speech model
#[derive(Parser, Debug)]
#[command(name = "callbridge")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Bind host (overrides HOST)
    #[arg(long = "host", value_name = "HOST")]
    host: Option<String>,

    /// Bind port (overrides PORT)
    #[arg(short = 'p', long = "port", value_name = "PORT")]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if it exists (must be done before config loading)
    let _ = dotenvy::dotenv();

    // Initialize tracing
    tracing_subscriber::fmt::init();

    // Initialize crypto provider for TLS connections
    // This must be done before any TLS connections are attempted
    rustls::crypto::ring::default_provider()
        .install_default()
        .map_err(|_| anyhow!("Failed to install default crypto provider"))?;

    let cli = Cli::parse();

    let mut config = ServerConfig::from_env().map_err(|e| anyhow!(e.to_string()))?;
    if let Some(host) = cli.host {
        config.host = host;
    }
    if let Some(port) = cli.port {
        config.port = port;
    }

    if config.openai_api_key.is_none() {
        tracing::warn!("OPENAI_API_KEY not set; model sessions will fail to authenticate");
    }
    if config.biography_url.is_none() {
        tracing::warn!("BIOGRAPHY_URL not set; the biography tool will return fallback text");
    }

    let address = config.address();
    let app_state = Arc::new(AppState::new(config));

    // No cross-origin access: the surface is telephony webhooks, not browsers
    let cors_layer = CorsLayer::new().allow_methods([Method::GET, Method::POST]);

    let app = Router::new()
        .merge(routes::api::create_api_router())
        .merge(routes::media::create_media_router())
        .with_state(app_state)
        .layer(cors_layer);

    let socket_addr: SocketAddr = address
        .parse()
        .map_err(|e| anyhow!("Invalid server address '{}': {}", address, e))?;

    println!("Server listening on http://{}", socket_addr);

    let listener = TcpListener::bind(&socket_addr).await?;
    axum::serve(listener, app.into_make_service()).await?;

    Ok(())
}
