//! Point-data API server
//!
//! Proxies DMI weather, HIP groundwater and MapTiler coordinate requests.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

use point_api::config::{ServiceConfig, ServiceSettings, DEFAULT_ALLOWED_ORIGINS};
use point_api::state::AppState;

/// Point-data API server
#[derive(Parser, Debug)]
#[command(name = "point-api")]
#[command(about = "Point-data proxy for DMI, HIP and MapTiler")]
struct Args {
    /// Listen host
    #[arg(long, default_value = "0.0.0.0", env = "HOST")]
    host: String,

    /// Listen port
    #[arg(short, long, default_value_t = 3000, env = "PORT")]
    port: u16,

    /// Log level
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Number of worker threads
    #[arg(long, env = "POINT_API_WORKER_THREADS")]
    worker_threads: Option<usize>,

    /// Comma separated CORS origins
    #[arg(long, default_value = DEFAULT_ALLOWED_ORIGINS, env = "ALLOWED_ORIGINS")]
    allowed_origins: String,

    #[arg(long, env = "DMI_API_KEY_CLIMATE", hide_env_values = true)]
    dmi_api_key_climate: String,

    #[arg(long, env = "DMI_API_KEY_METOBS", hide_env_values = true)]
    dmi_api_key_metobs: String,

    #[arg(long, env = "HIP_API_KEY", hide_env_values = true)]
    hip_api_key: String,

    #[arg(long, env = "MAPTILER_API_KEY", hide_env_values = true)]
    maptiler_api_key: String,

    #[arg(long, env = "DMI_BASE_URL")]
    dmi_base_url: Option<String>,

    #[arg(long, env = "HIP_BASE_URL")]
    hip_base_url: Option<String>,

    #[arg(long, env = "MAPTILER_BASE_URL")]
    maptiler_base_url: Option<String>,

    /// Upstream request timeout in seconds
    #[arg(long, default_value_t = 30, env = "UPSTREAM_TIMEOUT_SECS")]
    upstream_timeout_secs: u64,
}

impl Args {
    fn settings(&self) -> ServiceSettings {
        ServiceSettings {
            allowed_origins: self.allowed_origins.clone(),
            dmi_api_key_climate: self.dmi_api_key_climate.clone(),
            dmi_api_key_metobs: self.dmi_api_key_metobs.clone(),
            hip_api_key: self.hip_api_key.clone(),
            maptiler_api_key: self.maptiler_api_key.clone(),
            dmi_base_url: self.dmi_base_url.clone(),
            hip_base_url: self.hip_base_url.clone(),
            maptiler_base_url: self.maptiler_base_url.clone(),
            upstream_timeout_secs: self.upstream_timeout_secs,
        }
    }
}

fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let args = Args::parse();

    let mut runtime_builder = tokio::runtime::Builder::new_multi_thread();
    runtime_builder.enable_all();

    if let Some(threads) = args.worker_threads {
        runtime_builder.worker_threads(threads);
    }

    let runtime = runtime_builder
        .build()
        .context("Failed to create Tokio runtime")?;

    runtime.block_on(run_server(args))
}

async fn run_server(args: Args) -> Result<()> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_level(true)
        .json()
        .init();

    let config = ServiceConfig::from_settings(args.settings())?;

    let prometheus_handle = metrics_exporter_prometheus::PrometheusBuilder::new()
        .install_recorder()
        .context("Failed to install Prometheus recorder")?;
    info!("Prometheus metrics exporter initialized");

    info!(
        origins = ?config.allowed_origins,
        timeout_secs = config.upstream.timeout.as_secs(),
        "Starting point-data API server"
    );

    let state = Arc::new(AppState::new(&config, Some(prometheus_handle))?);
    let app = point_api::app(state, config.cors_layer()?);

    let addr: SocketAddr = format!("{}:{}", args.host, args.port)
        .parse()
        .context("Invalid listen address")?;

    info!("Point-data API listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    axum::serve(listener, app).await.context("Server failed")?;
    Ok(())
}
