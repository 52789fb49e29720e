//! # Shoplens Server
//!
//! Web service that answers one question: is this site built on Shopify?
//!
//! A submission is normalized to a hostname and redirected to its own
//! page; the first visit kicks off a background check whose outcome lands
//! in an append-only SQLite event log, and the page polls a JSON status
//! endpoint until a verdict exists.

use std::{path::PathBuf, sync::Arc};

use anyhow::Context;
use clap::{Args as ClapArgs, Parser};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use shoplens_core::detect::transport::ReqwestTransport;
use shoplens_core::{Detector, EventStore};
use shoplens_server::{
    AppState, create_app,
    infra::config::{Config, ConfigLoad, ConfigLoader},
};

/// CLI entry point
#[derive(Parser, Debug)]
#[command(name = "shoplens-server")]
#[command(about = "Checks whether a site is built on Shopify")]
struct Cli {
    #[command(flatten)]
    serve: ServeArgs,
}

#[derive(ClapArgs, Debug, Clone)]
struct ServeArgs {
    /// Server port (overrides config)
    #[arg(short, long, env = "SERVER_PORT")]
    port: Option<u16>,

    /// Server host (overrides config)
    #[arg(long, env = "SERVER_HOST")]
    host: Option<String>,

    /// SQLite database URL (overrides config)
    #[arg(long, env = "DATABASE_URL")]
    database_url: Option<String>,

    /// Path to a configuration file
    #[arg(long, env = "SHOPLENS_CONFIG")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    run_server(cli.serve).await
}

struct ConfigBootstrap {
    config: Arc<Config>,
}

fn load_runtime_config(args: &ServeArgs) -> anyhow::Result<ConfigBootstrap> {
    let mut loader = ConfigLoader::new();
    if let Some(path) = &args.config {
        loader = loader.with_config_path(path);
    }
    let ConfigLoad {
        mut config,
        warnings,
    } = loader.load().context("failed to load configuration")?;

    if let Some(port) = args.port {
        config.server.port = port;
    }
    if let Some(host) = args.host.clone() {
        config.server.host = host;
    }
    if let Some(url) = args.database_url.clone() {
        config.database.url = url;
    }

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    if config.metadata.env_file_loaded {
        info!("loaded .env file");
    }
    if let Some(path) = &config.metadata.config_path {
        info!(path = %path.display(), "configuration file loaded");
    }
    for warning in &warnings {
        warn!(message = %warning, "configuration warning");
    }

    info!(
        detector.page_timeout_secs = config.detector.page_timeout_secs,
        detector.checkout_timeout_secs = config.detector.checkout_timeout_secs,
        detector.page_max_redirects = config.detector.page_max_redirects,
        detector.checkout_max_redirects =
            config.detector.checkout_max_redirects,
        "detector configuration in effect"
    );

    Ok(ConfigBootstrap {
        config: Arc::new(config),
    })
}

async fn wire_app_resources(config: Arc<Config>) -> anyhow::Result<AppState> {
    let store = EventStore::connect(&config.database.url)
        .await
        .with_context(|| {
            format!("failed to open event database {}", config.database.url)
        })?;
    store
        .initialize_schema()
        .await
        .context("failed to initialize event database schema")?;
    info!(url = %config.database.url, "event store ready");

    let settings = config.detector.settings();
    let transport = Arc::new(ReqwestTransport::new(settings.user_agent.clone()));
    let detector = Arc::new(Detector::new(store.clone(), transport, settings));

    Ok(AppState::new(store, detector, config))
}

async fn run_server(args: ServeArgs) -> anyhow::Result<()> {
    let ConfigBootstrap { config } = load_runtime_config(&args)?;
    let state = wire_app_resources(Arc::clone(&config)).await?;
    let app = create_app(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);

    info!("Starting Shoplens server on {addr}");
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    axum::serve(listener, app).await?;

    Ok(())
}
