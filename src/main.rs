mod api;
mod config;
mod domain;
mod job;
mod storage;
mod sync;
mod tracker;

use std::{path::Path, sync::Arc};

use anyhow::Context;
use config::Config;
use job::{NetworkMonitor, WorkScheduler};
use migration::MigratorTrait;
use poem::{
    EndpointExt, Route, Server,
    listener::TcpListener,
    middleware::{Cors, Tracing as PoemTracing},
};
use poem_openapi::OpenApiService;
use sea_orm::Database;
use storage::{PendingUpdateStore, SqliteStore};
use sync::{DelayedSyncScheduler, SyncDrainer};
use tracing_error::ErrorLayer;
use tracing_subscriber::{EnvFilter, fmt::SubscriberBuilder, prelude::*};
use tracker::{HttpTracker, TrackerManager};

type TrackSyncResult<T> = anyhow::Result<T>;

#[tokio::main]
async fn main() -> TrackSyncResult<()> {
    // Initialize tracing (logs). Respect RUST_LOG if set, default to info for our crate and warn for deps.
    let default_filter = format!(
        "{}=info,poem=info,reqwest=warn,sea_orm=warn",
        env!("CARGO_PKG_NAME")
    );
    let env_filter = std::env::var("RUST_LOG").unwrap_or(default_filter);
    SubscriberBuilder::default()
        .with_env_filter(EnvFilter::new(env_filter))
        .with_target(false)
        .with_level(true)
        .pretty()
        .finish()
        .with(ErrorLayer::default())
        .init();
    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        "starting delayed track sync"
    );
    // Load environment variables from .env files
    if Path::new(".env.local").exists() {
        dotenvy::from_filename(".env.local")?;
    } else if Path::new(".env").exists() {
        dotenvy::from_filename(".env")?;
    };
    let config = Config::load()?;
    config.validate().map_err(|e| anyhow::anyhow!(e))?;

    let db_conn = Database::connect(&config.db_connection_string)
        .await
        .with_context(|| "Failed to connect to database")?;

    migration::Migrator::up(&db_conn, None)
        .await
        .with_context(|| "Failed to run database migrations")?;

    let store = Arc::new(SqliteStore::new(db_conn));

    let tracker = HttpTracker::new(
        config.tracker.id,
        config.tracker.name.as_str(),
        config.tracker.base_url.as_str(),
    )?
    .with_api_key(config.tracker.api_key.as_str());
    let trackers = TrackerManager::new().with_tracker(Arc::new(tracker));
    let logged_in = trackers.logged_in().count();
    tracing::info!(tracker_base = %config.tracker.base_url, logged_in, "configured trackers");

    let network = Arc::new(NetworkMonitor::new(false));
    network.clone().spawn_probe(
        config.network_probe_addr.clone(),
        config.network_probe_interval,
    );

    let drainer = SyncDrainer::new(
        store.clone(),
        store.clone(),
        store.clone(),
        Arc::new(trackers),
    )
    .with_failure_policy(config.sync_failure_policy);
    let scheduler = Arc::new(
        DelayedSyncScheduler::new(
            Arc::new(WorkScheduler::new(network.subscribe())),
            Arc::new(drainer),
        )
        .with_backoff_base(config.sync_backoff_base),
    );

    let pending = store.len().await?;
    if pending > 0 {
        tracing::info!(pending, "pending updates found at startup");
        scheduler.schedule();
    }

    run_poem(store, scheduler, network, &config.bind_addr).await?;
    Ok(())
}

pub async fn run_poem(
    store: Arc<dyn PendingUpdateStore>,
    scheduler: Arc<DelayedSyncScheduler>,
    network: Arc<NetworkMonitor>,
    bind_addr: &str,
) -> TrackSyncResult<()> {
    let version = env!("CARGO_PKG_VERSION");
    let api = api::TrackingApi {
        store,
        scheduler,
        network,
    };
    let api_service =
        OpenApiService::new(api, "Delayed Track Sync API", version).server("http://localhost:3000");
    let ui = api_service.rapidoc();
    let spec = api_service.spec();
    let route = Route::new()
        .nest("/", api_service)
        .nest("/ui", ui)
        .nest("/spec", poem::endpoint::make_sync(move |_| spec.clone()))
        .with(Cors::new())
        .with(PoemTracing);

    tracing::info!(%bind_addr, "starting HTTP server");
    Server::new(TcpListener::bind(bind_addr)).run(route).await?;
    Ok(())
}
