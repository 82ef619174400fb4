// src/main.rs

use anyhow::{Context, Result};
use clap::Parser;
use reqwest::Client;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use occupancy_core::api::{router, ApiState};
use occupancy_core::config::Config;
use occupancy_core::insights::InsightsClient;
use occupancy_core::state::AppState;

#[derive(Parser, Debug)]
#[command(author, version, about = "Consultant occupancy dashboard server", long_about = None)]
struct Cli {
    /// Snapshot file to load on start and write after every change
    #[arg(long)]
    state_file: Option<PathBuf>,

    /// Port to listen on (overrides OCCUPANCY_PORT)
    #[arg(long)]
    port: Option<u16>,

    /// Start with an empty roster instead of the demo data when no snapshot exists
    #[arg(long, default_value_t = false)]
    no_seed: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let mut config = Config::from_env().context("Failed to read OCCUPANCY_* configuration")?;
    if let Some(path) = cli.state_file {
        config.state_file = path;
    }
    if let Some(port) = cli.port {
        config.port = port;
    }

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting occupancy server");

    // --- Load State ---
    let state = match AppState::load_snapshot(&config.state_file)
        .with_context(|| format!("Failed to load state from {}", config.state_file.display()))?
    {
        Some(state) => state,
        None if cli.no_seed => {
            info!("Starting with an empty roster.");
            AppState::default()
        }
        None => {
            info!("Seeding demo data.");
            AppState::sample()
        }
    };
    info!(
        "State ready: {} consultants, {} projects, {} assignments, {} absences",
        state.consultants.len(),
        state.projects.len(),
        state.assignments.len(),
        state.absences.len()
    );

    let mut api_state = ApiState::new(state).with_snapshot_path(config.state_file.clone());

    // --- Insights Client (optional) ---
    match config.gemini_api_key() {
        Some(key) => {
            let http_client = Client::builder()
                .timeout(Duration::from_secs(30))
                .build()
                .context("Failed to build HTTP client")?;
            let client = InsightsClient::new(http_client, key, &config.gemini_model, &config.gemini_base_url)?;
            api_state = api_state.with_insights(client);
            info!("Insights enabled with model {}", config.gemini_model);
        }
        None => warn!("OCCUPANCY_GEMINI_API_KEY not set; /api/insights is disabled."),
    }

    let app = router(api_state);

    // --- Run Web Server ---
    let addr = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("Listening on http://{}", addr);
    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}
