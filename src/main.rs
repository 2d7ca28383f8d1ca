//! Assay Service Entry Point

use std::sync::Arc;
use std::time::Duration;

use assay::agents::{AnalyticsAgent, SeoAgent};
use assay::api::{self, ApiState};
use assay::config::Config;
use assay::fusion::ResponseFuser;
use assay::oracle::HttpOracle;
use assay::orchestrator::Orchestrator;
use assay::providers::{Ga4ReportProvider, SheetsTableProvider};
use assay::query::IntentRouter;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Assay: natural language analytics and SEO query service
#[derive(Parser, Debug)]
#[command(name = "assay")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long)]
    config: Option<String>,

    /// Bind address (overrides config)
    #[arg(long)]
    host: Option<String>,

    /// HTTP port (overrides config)
    #[arg(short, long)]
    port: Option<u16>,

    /// Enable JSON logging format
    #[arg(long)]
    json_logs: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    if args.json_logs {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }

    tracing::info!("Starting assay v{}", env!("CARGO_PKG_VERSION"));

    // Load configuration
    let mut config = if let Some(path) = &args.config {
        Config::from_file(path)?
    } else {
        Config::load()?
    };

    // Override bind address from CLI args only if explicitly provided
    if let Some(host) = args.host {
        config.server.host = host;
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }

    tracing::info!(
        oracle_model = %config.oracle.model,
        seo_cache_ttl_secs = config.seo.cache_ttl_secs,
        "Configuration loaded"
    );

    // Wire up the pipeline
    let oracle = Arc::new(HttpOracle::from_config(&config.oracle)?);
    let report_provider = Arc::new(Ga4ReportProvider::from_config(&config.analytics)?);
    let table_provider = Arc::new(SheetsTableProvider::from_config(&config.seo)?);

    let router = IntentRouter::new(oracle.clone());
    let analytics = Arc::new(AnalyticsAgent::new(oracle.clone(), report_provider));
    let seo = Arc::new(SeoAgent::new(
        oracle.clone(),
        table_provider,
        Duration::from_secs(config.seo.cache_ttl_secs),
    ));
    let fuser = ResponseFuser::new(oracle);
    let orchestrator = Arc::new(Orchestrator::new(router, analytics, seo, fuser));

    tracing::info!("Orchestrator initialized with analytics and SEO agents");

    let state = Arc::new(ApiState::new(orchestrator));
    api::serve(state, &config.server.host, config.server.port).await?;

    Ok(())
}
