//! Transit Guide server binary.
//!
//! Loads configuration, wires the adapters into the handlers, starts the
//! idle-session sweeper and serves the HTTP API until Ctrl-C.

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing_subscriber::EnvFilter;

use transit_guide::adapters::ai::{OpenAIConfig, OpenAIProvider};
use transit_guide::adapters::geocoding::{NominatimConfig, NominatimGeocoder};
use transit_guide::adapters::http::{build_router, TransitHandlers};
use transit_guide::adapters::ojp::{OjpConfig, OjpTripPlanner};
use transit_guide::adapters::stops::PostgresStopDirectory;
use transit_guide::adapters::storage::InMemorySessionStore;
use transit_guide::application::handlers::{
    PlanTripHandler, ResolveNearestHandler, SearchStopsHandler, StopResolver,
    SubmitMessageHandler, TripSearch,
};
use transit_guide::config::{AppConfig, DialogueConfig};
use transit_guide::ports::SessionStore;

fn init_logging(config: &AppConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.server.log_level));

    if config.is_production() {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = AppConfig::load().context("loading configuration")?;
    config.validate().context("validating configuration")?;
    init_logging(&config);

    let pool = config
        .database
        .pool_options()
        .connect(&config.database.url)
        .await
        .context("connecting to the stop database")?;
    let directory = Arc::new(PostgresStopDirectory::new(pool));

    let api_key = config
        .ai
        .openai_api_key
        .clone()
        .context("OpenAI API key missing")?;
    let ai = Arc::new(OpenAIProvider::new(
        OpenAIConfig::new(api_key)
            .with_model(config.ai.model.clone())
            .with_base_url(config.ai.base_url.clone())
            .with_timeout(config.ai.timeout())
            .with_max_retries(config.ai.max_retries),
    )?);

    let geocoder = Arc::new(NominatimGeocoder::new(NominatimConfig {
        base_url: config.geocoding.base_url.clone(),
        country_codes: config.geocoding.country_codes.clone(),
        language: config.geocoding.language.clone(),
        user_agent: config.geocoding.user_agent.clone(),
        timeout: config.geocoding.timeout(),
    })?);

    let trip_key = config
        .trip_service
        .api_key
        .clone()
        .context("trip service API key missing")?;
    let planner = Arc::new(OjpTripPlanner::new(
        OjpConfig::new(config.trip_service.endpoint.clone(), trip_key)
            .with_requestor_suffix(config.trip_service.requestor_suffix.clone())
            .with_timeout(config.trip_service.timeout()),
    )?);

    let settings = Arc::new(config.dialogue_settings());
    let store = Arc::new(InMemorySessionStore::with_welcome(
        config.dialogue.welcome_message.clone(),
    ));

    let resolver = Arc::new(StopResolver::new(
        directory.clone(),
        geocoder,
        settings.call_timeout,
    ));
    let trips = Arc::new(TripSearch::new(
        directory.clone(),
        planner,
        settings.call_timeout,
    ));

    let handlers = TransitHandlers::new(
        Arc::new(SubmitMessageHandler::new(
            store.clone(),
            ai,
            resolver.clone(),
            trips.clone(),
            settings.clone(),
        )),
        Arc::new(ResolveNearestHandler::new(resolver)),
        Arc::new(SearchStopsHandler::new(directory, settings.call_timeout)),
        Arc::new(PlanTripHandler::new(trips)),
    );

    let sweeper = spawn_idle_sweeper(store, &config.dialogue);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding {}", addr))?;
    tracing::info!(%addr, environment = ?config.server.environment, "Transit guide listening");

    axum::serve(listener, build_router(handlers, &config.server))
        .with_graceful_shutdown(wait_for_shutdown())
        .await?;

    sweeper.abort();
    tracing::info!("Transit guide stopped");
    Ok(())
}

/// Periodically drops sessions idle for longer than the configured TTL.
fn spawn_idle_sweeper(
    store: Arc<InMemorySessionStore>,
    dialogue: &DialogueConfig,
) -> tokio::task::JoinHandle<()> {
    let ttl = dialogue.session_ttl();
    let mut interval = tokio::time::interval(dialogue.sweep_interval());

    tokio::spawn(async move {
        loop {
            interval.tick().await;
            match store.evict_idle(ttl).await {
                Ok(0) => {}
                Ok(evicted) => tracing::info!(evicted, "Idle sessions evicted"),
                Err(e) => tracing::warn!(error = %e, "Idle session sweep failed"),
            }
        }
    })
}

async fn wait_for_shutdown() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
